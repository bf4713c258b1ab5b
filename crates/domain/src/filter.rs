//! Storage predicates for the four authority tables.
//!
//! Each filter is a conjunction of equality or membership conditions. A field
//! left as `None` places no constraint on its column.

use warrant_core::UserId;

use crate::rbac::{Permission, PermissionId, Role, RoleId, RolePermission, UserRole};

/// Exact-match predicate on the roles table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleFilter {
    /// Matches the role with this surrogate key.
    Id(RoleId),
    /// Matches the role with this name.
    Name(String),
}

impl RoleFilter {
    /// Returns whether the role satisfies the predicate.
    #[must_use]
    pub fn matches(&self, role: &Role) -> bool {
        match self {
            Self::Id(id) => role.id() == *id,
            Self::Name(name) => role.name() == name,
        }
    }
}

/// Exact-match predicate on the permissions table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionFilter {
    /// Matches the permission with this surrogate key.
    Id(PermissionId),
    /// Matches the permission with this name.
    Name(String),
}

impl PermissionFilter {
    /// Returns whether the permission satisfies the predicate.
    #[must_use]
    pub fn matches(&self, permission: &Permission) -> bool {
        match self {
            Self::Id(id) => permission.id() == *id,
            Self::Name(name) => permission.name() == name,
        }
    }
}

/// Predicate on the role_permissions table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePermissionFilter {
    /// Membership condition on `role_id`. An empty list matches nothing.
    pub role_ids: Option<Vec<RoleId>>,
    /// Equality condition on `permission_id`.
    pub permission_id: Option<PermissionId>,
}

impl RolePermissionFilter {
    /// Matches the single link between a role and a permission.
    #[must_use]
    pub fn link(role_id: RoleId, permission_id: PermissionId) -> Self {
        Self {
            role_ids: Some(vec![role_id]),
            permission_id: Some(permission_id),
        }
    }

    /// Matches every link of a role.
    #[must_use]
    pub fn for_role(role_id: RoleId) -> Self {
        Self {
            role_ids: Some(vec![role_id]),
            permission_id: None,
        }
    }

    /// Matches every link to a permission.
    #[must_use]
    pub fn for_permission(permission_id: PermissionId) -> Self {
        Self {
            role_ids: None,
            permission_id: Some(permission_id),
        }
    }

    /// Matches links from any of the roles to the permission.
    #[must_use]
    pub fn for_roles_and_permission(role_ids: Vec<RoleId>, permission_id: PermissionId) -> Self {
        Self {
            role_ids: Some(role_ids),
            permission_id: Some(permission_id),
        }
    }

    /// Returns whether the link satisfies the predicate.
    #[must_use]
    pub fn matches(&self, link: &RolePermission) -> bool {
        let role_matches = self
            .role_ids
            .as_ref()
            .is_none_or(|role_ids| role_ids.contains(&link.role_id));
        let permission_matches = self
            .permission_id
            .is_none_or(|permission_id| permission_id == link.permission_id);

        role_matches && permission_matches
    }
}

/// Predicate on the user_roles table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserRoleFilter {
    /// Equality condition on `user_id`.
    pub user_id: Option<UserId>,
    /// Equality condition on `role_id`.
    pub role_id: Option<RoleId>,
}

impl UserRoleFilter {
    /// Matches the single assignment of a role to a user.
    #[must_use]
    pub fn assignment(user_id: UserId, role_id: RoleId) -> Self {
        Self {
            user_id: Some(user_id),
            role_id: Some(role_id),
        }
    }

    /// Matches every assignment of a user.
    #[must_use]
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            role_id: None,
        }
    }

    /// Matches every assignment of a role.
    #[must_use]
    pub fn for_role(role_id: RoleId) -> Self {
        Self {
            user_id: None,
            role_id: Some(role_id),
        }
    }

    /// Returns whether the assignment satisfies the predicate.
    #[must_use]
    pub fn matches(&self, assignment: &UserRole) -> bool {
        self.user_id
            .is_none_or(|user_id| user_id == assignment.user_id)
            && self
                .role_id
                .is_none_or(|role_id| role_id == assignment.role_id)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use warrant_core::UserId;

    use super::{RolePermissionFilter, UserRoleFilter};
    use crate::rbac::{
        PermissionId, RoleId, RolePermission, RolePermissionId, UserRole, UserRoleId,
    };

    fn link(role_id: i64, permission_id: i64) -> RolePermission {
        RolePermission {
            id: RolePermissionId::new(1),
            role_id: RoleId::new(role_id),
            permission_id: PermissionId::new(permission_id),
        }
    }

    #[test]
    fn empty_role_membership_matches_nothing() {
        let filter = RolePermissionFilter::for_roles_and_permission(Vec::new(), PermissionId::new(3));
        assert!(!filter.matches(&link(1, 3)));
    }

    #[test]
    fn default_user_role_filter_matches_everything() {
        let assignment = UserRole {
            id: UserRoleId::new(9),
            user_id: UserId::new(4),
            role_id: RoleId::new(2),
        };
        assert!(UserRoleFilter::default().matches(&assignment));
        assert!(!UserRoleFilter::for_user(UserId::new(5)).matches(&assignment));
    }

    proptest! {
        #[test]
        fn link_filter_matches_only_its_pair(
            role_id in 1_i64..50,
            permission_id in 1_i64..50,
            other_role in 1_i64..50,
            other_permission in 1_i64..50,
        ) {
            let filter = RolePermissionFilter::link(RoleId::new(role_id), PermissionId::new(permission_id));
            prop_assert!(filter.matches(&link(role_id, permission_id)));
            prop_assert_eq!(
                filter.matches(&link(other_role, other_permission)),
                other_role == role_id && other_permission == permission_id
            );
        }

        #[test]
        fn membership_filter_agrees_with_contains(
            role_ids in proptest::collection::vec(1_i64..20, 0..6),
            candidate in 1_i64..20,
        ) {
            let filter = RolePermissionFilter::for_roles_and_permission(
                role_ids.iter().copied().map(RoleId::new).collect(),
                PermissionId::new(1),
            );
            prop_assert_eq!(filter.matches(&link(candidate, 1)), role_ids.contains(&candidate));
        }
    }
}
