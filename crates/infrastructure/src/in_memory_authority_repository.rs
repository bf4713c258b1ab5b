use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use warrant_application::{AuthorityRepository, AuthorityTransaction};
use warrant_core::{AppError, AppResult, UserId};
use warrant_domain::{
    NewNamedEntity, Permission, PermissionFilter, PermissionId, Role, RoleFilter, RoleId,
    RolePermission, RolePermissionFilter, RolePermissionId, UserRole, UserRoleFilter, UserRoleId,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    roles: Vec<Role>,
    permissions: Vec<Permission>,
    role_permissions: Vec<RolePermission>,
    user_roles: Vec<UserRole>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    /// Mirrors the `ON DELETE CASCADE` foreign keys of the SQL schema.
    fn cascade(&mut self) {
        let roles = &self.roles;
        let permissions = &self.permissions;

        self.role_permissions.retain(|link| {
            roles.iter().any(|role| role.id() == link.role_id)
                && permissions
                    .iter()
                    .any(|permission| permission.id() == link.permission_id)
        });
        self.user_roles
            .retain(|assignment| roles.iter().any(|role| role.id() == assignment.role_id));
    }
}

/// In-memory authority storage.
///
/// Transactions are serialised: `begin` holds the store lock until the
/// transaction is committed or dropped, and only `commit` publishes changes.
#[derive(Debug, Default)]
pub struct InMemoryAuthorityRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryAuthorityRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
        }
    }
}

#[async_trait]
impl AuthorityRepository for InMemoryAuthorityRepository {
    async fn begin(&self) -> AppResult<Box<dyn AuthorityTransaction>> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();

        Ok(Box::new(InMemoryAuthorityTransaction { guard, working }))
    }
}

struct InMemoryAuthorityTransaction {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl AuthorityTransaction for InMemoryAuthorityTransaction {
    async fn role_exists(&mut self, filter: &RoleFilter) -> AppResult<bool> {
        Ok(self.working.roles.iter().any(|role| filter.matches(role)))
    }

    async fn find_role(&mut self, filter: &RoleFilter) -> AppResult<Option<Role>> {
        Ok(self
            .working
            .roles
            .iter()
            .find(|role| filter.matches(role))
            .cloned())
    }

    async fn list_roles(&mut self) -> AppResult<Vec<Role>> {
        Ok(self.working.roles.clone())
    }

    async fn insert_role(&mut self, role: &NewNamedEntity) -> AppResult<RoleId> {
        if let Some(existing) = self
            .working
            .roles
            .iter()
            .find(|stored| stored.name() == role.name.as_str())
        {
            return Ok(existing.id());
        }

        let id = RoleId::new(self.working.next_id());
        self.working
            .roles
            .push(Role::new(id, role.name.as_str(), role.title.clone())?);
        Ok(id)
    }

    async fn delete_roles(&mut self, filter: &RoleFilter) -> AppResult<u64> {
        let before = self.working.roles.len();
        self.working.roles.retain(|role| !filter.matches(role));
        let deleted = before - self.working.roles.len();
        self.working.cascade();
        Ok(deleted as u64)
    }

    // The store lock is held for the whole transaction already.
    async fn lock_role(&mut self, _role_id: RoleId) -> AppResult<()> {
        Ok(())
    }

    async fn permission_exists(&mut self, filter: &PermissionFilter) -> AppResult<bool> {
        Ok(self
            .working
            .permissions
            .iter()
            .any(|permission| filter.matches(permission)))
    }

    async fn find_permission(
        &mut self,
        filter: &PermissionFilter,
    ) -> AppResult<Option<Permission>> {
        Ok(self
            .working
            .permissions
            .iter()
            .find(|permission| filter.matches(permission))
            .cloned())
    }

    async fn list_permissions(&mut self) -> AppResult<Vec<Permission>> {
        Ok(self.working.permissions.clone())
    }

    async fn insert_permission(&mut self, permission: &NewNamedEntity) -> AppResult<PermissionId> {
        if let Some(existing) = self
            .working
            .permissions
            .iter()
            .find(|stored| stored.name() == permission.name.as_str())
        {
            return Ok(existing.id());
        }

        let id = PermissionId::new(self.working.next_id());
        self.working.permissions.push(Permission::new(
            id,
            permission.name.as_str(),
            permission.title.clone(),
        )?);
        Ok(id)
    }

    async fn delete_permissions(&mut self, filter: &PermissionFilter) -> AppResult<u64> {
        let before = self.working.permissions.len();
        self.working
            .permissions
            .retain(|permission| !filter.matches(permission));
        let deleted = before - self.working.permissions.len();
        self.working.cascade();
        Ok(deleted as u64)
    }

    async fn lock_permission(&mut self, _permission_id: PermissionId) -> AppResult<()> {
        Ok(())
    }

    async fn role_permission_exists(&mut self, filter: &RolePermissionFilter) -> AppResult<bool> {
        Ok(self
            .working
            .role_permissions
            .iter()
            .any(|link| filter.matches(link)))
    }

    async fn find_role_permission(
        &mut self,
        filter: &RolePermissionFilter,
    ) -> AppResult<Option<RolePermission>> {
        Ok(self
            .working
            .role_permissions
            .iter()
            .find(|link| filter.matches(link))
            .copied())
    }

    async fn list_role_permissions(
        &mut self,
        filter: &RolePermissionFilter,
    ) -> AppResult<Vec<RolePermission>> {
        Ok(self
            .working
            .role_permissions
            .iter()
            .filter(|link| filter.matches(link))
            .copied()
            .collect())
    }

    async fn insert_role_permission(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<RolePermissionId> {
        if !self.working.roles.iter().any(|role| role.id() == role_id) {
            return Err(AppError::Storage(format!(
                "role {role_id} does not exist for permission link"
            )));
        }
        if !self
            .working
            .permissions
            .iter()
            .any(|permission| permission.id() == permission_id)
        {
            return Err(AppError::Storage(format!(
                "permission {permission_id} does not exist for permission link"
            )));
        }

        if let Some(existing) = self
            .working
            .role_permissions
            .iter()
            .find(|link| link.role_id == role_id && link.permission_id == permission_id)
        {
            return Ok(existing.id);
        }

        let id = RolePermissionId::new(self.working.next_id());
        self.working.role_permissions.push(RolePermission {
            id,
            role_id,
            permission_id,
        });
        Ok(id)
    }

    async fn delete_role_permissions(&mut self, filter: &RolePermissionFilter) -> AppResult<u64> {
        let before = self.working.role_permissions.len();
        self.working
            .role_permissions
            .retain(|link| !filter.matches(link));
        Ok((before - self.working.role_permissions.len()) as u64)
    }

    async fn user_role_exists(&mut self, filter: &UserRoleFilter) -> AppResult<bool> {
        Ok(self
            .working
            .user_roles
            .iter()
            .any(|assignment| filter.matches(assignment)))
    }

    async fn find_user_role(&mut self, filter: &UserRoleFilter) -> AppResult<Option<UserRole>> {
        Ok(self
            .working
            .user_roles
            .iter()
            .find(|assignment| filter.matches(assignment))
            .copied())
    }

    async fn list_user_roles(&mut self, filter: &UserRoleFilter) -> AppResult<Vec<UserRole>> {
        Ok(self
            .working
            .user_roles
            .iter()
            .filter(|assignment| filter.matches(assignment))
            .copied()
            .collect())
    }

    async fn insert_user_role(&mut self, user_id: UserId, role: &Role) -> AppResult<UserRoleId> {
        let role_id = role.id();
        if !self.working.roles.iter().any(|stored| stored.id() == role_id) {
            return Err(AppError::RoleNotFound(role.name().to_owned()));
        }

        if self
            .working
            .user_roles
            .iter()
            .any(|assignment| assignment.user_id == user_id && assignment.role_id == role_id)
        {
            return Err(AppError::RoleAlreadyAssigned {
                user_id,
                role: role.name().to_owned(),
            });
        }

        let id = UserRoleId::new(self.working.next_id());
        self.working.user_roles.push(UserRole {
            id,
            user_id,
            role_id,
        });
        Ok(id)
    }

    async fn delete_user_roles(&mut self, filter: &UserRoleFilter) -> AppResult<u64> {
        let before = self.working.user_roles.len();
        self.working
            .user_roles
            .retain(|assignment| !filter.matches(assignment));
        Ok((before - self.working.user_roles.len()) as u64)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let Self {
            mut guard,
            working,
        } = *self;
        *guard = working;
        Ok(())
    }
}
