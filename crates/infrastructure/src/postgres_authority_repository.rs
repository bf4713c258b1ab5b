use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use tracing::debug;

use warrant_application::{AuthorityRepository, AuthorityTransaction};
use warrant_core::{AppError, AppResult, UserId};
use warrant_domain::{
    NewNamedEntity, Permission, PermissionFilter, PermissionId, Role, RoleFilter, RoleId,
    RolePermission, RolePermissionFilter, RolePermissionId, UserRole, UserRoleFilter, UserRoleId,
};

use crate::TableNames;

mod links;
mod named;
mod schema;

/// PostgreSQL-backed storage for the authority tables.
#[derive(Clone)]
pub struct PostgresAuthorityRepository {
    pool: PgPool,
    tables: Arc<TableNames>,
}

impl PostgresAuthorityRepository {
    /// Creates a repository with the provided connection pool and table names.
    #[must_use]
    pub fn new(pool: PgPool, tables: TableNames) -> Self {
        Self {
            pool,
            tables: Arc::new(tables),
        }
    }

    /// Returns the table names this repository writes to.
    #[must_use]
    pub fn tables(&self) -> &TableNames {
        &self.tables
    }
}

#[async_trait]
impl AuthorityRepository for PostgresAuthorityRepository {
    async fn begin(&self) -> AppResult<Box<dyn AuthorityTransaction>> {
        let transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| AppError::Storage(format!("failed to begin transaction: {error}")))?;

        debug!(prefix = self.tables.prefix(), "authority transaction started");

        Ok(Box::new(PostgresAuthorityTransaction {
            transaction,
            tables: self.tables.clone(),
        }))
    }
}

/// One PostgreSQL transaction over the authority tables.
pub struct PostgresAuthorityTransaction {
    transaction: Transaction<'static, Postgres>,
    tables: Arc<TableNames>,
}

#[derive(Debug, FromRow)]
struct NamedRow {
    id: i64,
    name: String,
    title: Option<String>,
}

#[derive(Debug, FromRow)]
struct RolePermissionRow {
    id: i64,
    role_id: i64,
    permission_id: i64,
}

#[derive(Debug, FromRow)]
struct UserRoleRow {
    id: i64,
    user_id: i64,
    role_id: i64,
}

/// Column-level view shared by role and permission filters.
#[derive(Debug, Clone, Copy)]
enum NamedFilter<'a> {
    Id(i64),
    Name(&'a str),
}

impl<'a> From<&'a RoleFilter> for NamedFilter<'a> {
    fn from(filter: &'a RoleFilter) -> Self {
        match filter {
            RoleFilter::Id(id) => Self::Id(id.as_i64()),
            RoleFilter::Name(name) => Self::Name(name.as_str()),
        }
    }
}

impl<'a> From<&'a PermissionFilter> for NamedFilter<'a> {
    fn from(filter: &'a PermissionFilter) -> Self {
        match filter {
            PermissionFilter::Id(id) => Self::Id(id.as_i64()),
            PermissionFilter::Name(name) => Self::Name(name.as_str()),
        }
    }
}

fn push_named_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: NamedFilter<'_>) {
    match filter {
        NamedFilter::Id(id) => {
            builder.push(" WHERE id = ").push_bind(id);
        }
        NamedFilter::Name(name) => {
            builder.push(" WHERE name = ").push_bind(name.to_owned());
        }
    }
}

fn push_role_permission_filter(
    builder: &mut QueryBuilder<'_, Postgres>,
    filter: &RolePermissionFilter,
) {
    builder.push(" WHERE TRUE");
    if let Some(role_ids) = &filter.role_ids {
        builder
            .push(" AND role_id = ANY(")
            .push_bind(role_ids.iter().map(RoleId::as_i64).collect::<Vec<_>>())
            .push(")");
    }
    if let Some(permission_id) = filter.permission_id {
        builder
            .push(" AND permission_id = ")
            .push_bind(permission_id.as_i64());
    }
}

fn push_user_role_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &UserRoleFilter) {
    builder.push(" WHERE TRUE");
    if let Some(user_id) = filter.user_id {
        builder.push(" AND user_id = ").push_bind(user_id.as_i64());
    }
    if let Some(role_id) = filter.role_id {
        builder.push(" AND role_id = ").push_bind(role_id.as_i64());
    }
}

fn quoted(identifier: &str) -> String {
    format!("\"{identifier}\"")
}

fn role_from_row(row: NamedRow) -> AppResult<Role> {
    Role::new(RoleId::new(row.id), row.name, row.title)
        .map_err(|error| AppError::Storage(format!("invalid stored role {}: {error}", row.id)))
}

fn permission_from_row(row: NamedRow) -> AppResult<Permission> {
    Permission::new(PermissionId::new(row.id), row.name, row.title).map_err(|error| {
        AppError::Storage(format!("invalid stored permission {}: {error}", row.id))
    })
}

impl From<RolePermissionRow> for RolePermission {
    fn from(row: RolePermissionRow) -> Self {
        Self {
            id: RolePermissionId::new(row.id),
            role_id: RoleId::new(row.role_id),
            permission_id: PermissionId::new(row.permission_id),
        }
    }
}

impl From<UserRoleRow> for UserRole {
    fn from(row: UserRoleRow) -> Self {
        Self {
            id: UserRoleId::new(row.id),
            user_id: UserId::new(row.user_id),
            role_id: RoleId::new(row.role_id),
        }
    }
}

#[async_trait]
impl AuthorityTransaction for PostgresAuthorityTransaction {
    async fn role_exists(&mut self, filter: &RoleFilter) -> AppResult<bool> {
        let tables = self.tables.clone();
        self.named_exists_impl(tables.roles(), filter.into()).await
    }

    async fn find_role(&mut self, filter: &RoleFilter) -> AppResult<Option<Role>> {
        let tables = self.tables.clone();
        self.find_named_impl(tables.roles(), filter.into())
            .await?
            .map(role_from_row)
            .transpose()
    }

    async fn list_roles(&mut self) -> AppResult<Vec<Role>> {
        let tables = self.tables.clone();
        self.list_named_impl(tables.roles())
            .await?
            .into_iter()
            .map(role_from_row)
            .collect()
    }

    async fn insert_role(&mut self, role: &NewNamedEntity) -> AppResult<RoleId> {
        let tables = self.tables.clone();
        self.insert_named_impl(tables.roles(), role).await.map(RoleId::new)
    }

    async fn delete_roles(&mut self, filter: &RoleFilter) -> AppResult<u64> {
        let tables = self.tables.clone();
        self.delete_named_impl(tables.roles(), filter.into()).await
    }

    async fn lock_role(&mut self, role_id: RoleId) -> AppResult<()> {
        let tables = self.tables.clone();
        self.lock_named_impl(tables.roles(), role_id.as_i64()).await
    }

    async fn permission_exists(&mut self, filter: &PermissionFilter) -> AppResult<bool> {
        let tables = self.tables.clone();
        self.named_exists_impl(tables.permissions(), filter.into()).await
    }

    async fn find_permission(
        &mut self,
        filter: &PermissionFilter,
    ) -> AppResult<Option<Permission>> {
        let tables = self.tables.clone();
        self.find_named_impl(tables.permissions(), filter.into())
            .await?
            .map(permission_from_row)
            .transpose()
    }

    async fn list_permissions(&mut self) -> AppResult<Vec<Permission>> {
        let tables = self.tables.clone();
        self.list_named_impl(tables.permissions())
            .await?
            .into_iter()
            .map(permission_from_row)
            .collect()
    }

    async fn insert_permission(&mut self, permission: &NewNamedEntity) -> AppResult<PermissionId> {
        let tables = self.tables.clone();
        self.insert_named_impl(tables.permissions(), permission)
            .await
            .map(PermissionId::new)
    }

    async fn delete_permissions(&mut self, filter: &PermissionFilter) -> AppResult<u64> {
        let tables = self.tables.clone();
        self.delete_named_impl(tables.permissions(), filter.into()).await
    }

    async fn lock_permission(&mut self, permission_id: PermissionId) -> AppResult<()> {
        let tables = self.tables.clone();
        self.lock_named_impl(tables.permissions(), permission_id.as_i64()).await
    }

    async fn role_permission_exists(&mut self, filter: &RolePermissionFilter) -> AppResult<bool> {
        self.role_permission_exists_impl(filter).await
    }

    async fn find_role_permission(
        &mut self,
        filter: &RolePermissionFilter,
    ) -> AppResult<Option<RolePermission>> {
        Ok(self
            .list_role_permissions_impl(filter, Some(1))
            .await?
            .into_iter()
            .next())
    }

    async fn list_role_permissions(
        &mut self,
        filter: &RolePermissionFilter,
    ) -> AppResult<Vec<RolePermission>> {
        self.list_role_permissions_impl(filter, None).await
    }

    async fn insert_role_permission(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<RolePermissionId> {
        self.insert_role_permission_impl(role_id, permission_id).await
    }

    async fn delete_role_permissions(&mut self, filter: &RolePermissionFilter) -> AppResult<u64> {
        self.delete_role_permissions_impl(filter).await
    }

    async fn user_role_exists(&mut self, filter: &UserRoleFilter) -> AppResult<bool> {
        self.user_role_exists_impl(filter).await
    }

    async fn find_user_role(&mut self, filter: &UserRoleFilter) -> AppResult<Option<UserRole>> {
        Ok(self
            .list_user_roles_impl(filter, Some(1))
            .await?
            .into_iter()
            .next())
    }

    async fn list_user_roles(&mut self, filter: &UserRoleFilter) -> AppResult<Vec<UserRole>> {
        self.list_user_roles_impl(filter, None).await
    }

    async fn insert_user_role(&mut self, user_id: UserId, role: &Role) -> AppResult<UserRoleId> {
        self.insert_user_role_impl(user_id, role).await
    }

    async fn delete_user_roles(&mut self, filter: &UserRoleFilter) -> AppResult<u64> {
        self.delete_user_roles_impl(filter).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let Self {
            transaction,
            tables,
        } = *self;

        transaction.commit().await.map_err(|error| {
            AppError::Storage(format!("failed to commit transaction: {error}"))
        })?;

        debug!(prefix = tables.prefix(), "authority transaction committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
