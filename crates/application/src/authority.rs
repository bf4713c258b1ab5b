use std::sync::Arc;

use warrant_core::{AppError, AppResult, NonEmptyString, UserId};
use warrant_domain::{
    NewNamedEntity, Permission, PermissionFilter, Role, RoleFilter, RolePermission,
    RolePermissionFilter, UserRole, UserRoleFilter,
};

use crate::authority_ports::{AuthorityRepository, AuthorityTransaction};

mod assignment;
mod deletion;
mod lookup;
mod queries;
mod revocation;

use lookup::{resolve_permission, resolve_role, resolve_role_permission, resolve_user_role};

/// Gateway enforcing role-based access control invariants.
///
/// Every operation runs inside a single storage transaction that is committed
/// only when the whole read-validate-write sequence succeeds. An error drops
/// the transaction, discarding any partial change.
#[derive(Clone)]
pub struct Authority {
    repository: Arc<dyn AuthorityRepository>,
}

impl Authority {
    /// Creates an authority bound to one storage configuration.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthorityRepository>) -> Self {
        Self { repository }
    }

    async fn begin(&self) -> AppResult<Box<dyn AuthorityTransaction>> {
        self.repository.begin().await
    }
}
