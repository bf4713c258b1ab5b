use async_trait::async_trait;

use warrant_core::{AppResult, UserId};
use warrant_domain::{
    NewNamedEntity, Permission, PermissionFilter, PermissionId, Role, RoleFilter, RoleId,
    RolePermission, RolePermissionFilter, RolePermissionId, UserRole, UserRoleFilter, UserRoleId,
};

/// Repository port that opens units of work against authority storage.
#[async_trait]
pub trait AuthorityRepository: Send + Sync {
    /// Begins a storage transaction.
    ///
    /// Dropping the returned transaction without calling
    /// [`AuthorityTransaction::commit`] discards every change made through it.
    async fn begin(&self) -> AppResult<Box<dyn AuthorityTransaction>>;
}

/// One atomic unit of work over the roles, permissions, role_permissions and
/// user_roles tables.
///
/// `find_*` methods return `Ok(None)` for "no matching row"; every other
/// failure is an error.
#[async_trait]
pub trait AuthorityTransaction: Send {
    /// Returns whether any role matches.
    async fn role_exists(&mut self, filter: &RoleFilter) -> AppResult<bool>;

    /// Returns the matching role.
    async fn find_role(&mut self, filter: &RoleFilter) -> AppResult<Option<Role>>;

    /// Lists every role in storage order.
    async fn list_roles(&mut self) -> AppResult<Vec<Role>>;

    /// Inserts a role and returns its surrogate key.
    async fn insert_role(&mut self, role: &NewNamedEntity) -> AppResult<RoleId>;

    /// Deletes matching roles and returns the affected row count.
    async fn delete_roles(&mut self, filter: &RoleFilter) -> AppResult<u64>;

    /// Holds the role row until the transaction ends.
    ///
    /// Concurrent user-role or role-permission inserts that reference the
    /// role wait for this transaction, so an in-use check made afterwards
    /// stays valid until commit.
    async fn lock_role(&mut self, role_id: RoleId) -> AppResult<()>;

    /// Returns whether any permission matches.
    async fn permission_exists(&mut self, filter: &PermissionFilter) -> AppResult<bool>;

    /// Returns the matching permission.
    async fn find_permission(
        &mut self,
        filter: &PermissionFilter,
    ) -> AppResult<Option<Permission>>;

    /// Lists every permission in storage order.
    async fn list_permissions(&mut self) -> AppResult<Vec<Permission>>;

    /// Inserts a permission and returns its surrogate key.
    async fn insert_permission(&mut self, permission: &NewNamedEntity) -> AppResult<PermissionId>;

    /// Deletes matching permissions and returns the affected row count.
    async fn delete_permissions(&mut self, filter: &PermissionFilter) -> AppResult<u64>;

    /// Holds the permission row until the transaction ends.
    async fn lock_permission(&mut self, permission_id: PermissionId) -> AppResult<()>;

    /// Returns whether any role-permission link matches.
    async fn role_permission_exists(&mut self, filter: &RolePermissionFilter) -> AppResult<bool>;

    /// Returns the first matching role-permission link.
    async fn find_role_permission(
        &mut self,
        filter: &RolePermissionFilter,
    ) -> AppResult<Option<RolePermission>>;

    /// Lists matching role-permission links.
    async fn list_role_permissions(
        &mut self,
        filter: &RolePermissionFilter,
    ) -> AppResult<Vec<RolePermission>>;

    /// Inserts a role-permission link.
    async fn insert_role_permission(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<RolePermissionId>;

    /// Deletes matching role-permission links and returns the affected row count.
    async fn delete_role_permissions(&mut self, filter: &RolePermissionFilter) -> AppResult<u64>;

    /// Returns whether any user-role link matches.
    async fn user_role_exists(&mut self, filter: &UserRoleFilter) -> AppResult<bool>;

    /// Returns the first matching user-role link.
    async fn find_user_role(&mut self, filter: &UserRoleFilter) -> AppResult<Option<UserRole>>;

    /// Lists matching user-role links in storage order.
    async fn list_user_roles(&mut self, filter: &UserRoleFilter) -> AppResult<Vec<UserRole>>;

    /// Inserts a user-role link.
    ///
    /// An existing link for the pair is `RoleAlreadyAssigned`;
    /// a role deleted concurrently is `RoleNotFound`.
    async fn insert_user_role(&mut self, user_id: UserId, role: &Role) -> AppResult<UserRoleId>;

    /// Deletes matching user-role links and returns the affected row count.
    async fn delete_user_roles(&mut self, filter: &UserRoleFilter) -> AppResult<u64>;

    /// Commits every change made through this transaction.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}
