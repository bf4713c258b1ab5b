//! Domain entities and storage predicates for role-based access control.

#![forbid(unsafe_code)]

mod filter;
mod rbac;

pub use filter::{PermissionFilter, RoleFilter, RolePermissionFilter, UserRoleFilter};
pub use rbac::{
    NewNamedEntity, Permission, PermissionId, Role, RoleId, RolePermission, RolePermissionId,
    UserRole, UserRoleId,
};
