use super::*;

impl PostgresAuthorityTransaction {
    pub(super) async fn role_permission_exists_impl(
        &mut self,
        filter: &RolePermissionFilter,
    ) -> AppResult<bool> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT EXISTS (SELECT 1 FROM {}",
            quoted(self.tables.role_permissions())
        ));
        push_role_permission_filter(&mut builder, filter);
        builder.push(")");

        builder
            .build_query_scalar::<bool>()
            .fetch_one(&mut *self.transaction)
            .await
            .map_err(|error| {
                AppError::Storage(format!("failed to check role permission: {error}"))
            })
    }

    pub(super) async fn list_role_permissions_impl(
        &mut self,
        filter: &RolePermissionFilter,
        limit: Option<i64>,
    ) -> AppResult<Vec<RolePermission>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT id, role_id, permission_id FROM {}",
            quoted(self.tables.role_permissions())
        ));
        push_role_permission_filter(&mut builder, filter);
        builder.push(" ORDER BY id");
        if let Some(limit) = limit {
            builder.push(" LIMIT ").push_bind(limit);
        }

        let rows = builder
            .build_query_as::<RolePermissionRow>()
            .fetch_all(&mut *self.transaction)
            .await
            .map_err(|error| {
                AppError::Storage(format!("failed to list role permissions: {error}"))
            })?;

        Ok(rows.into_iter().map(RolePermission::from).collect())
    }

    pub(super) async fn insert_role_permission_impl(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<RolePermissionId> {
        sqlx::query_scalar::<_, i64>(&format!(
            r#"
            INSERT INTO {} (role_id, permission_id)
            VALUES ($1, $2)
            ON CONFLICT (role_id, permission_id) DO UPDATE
            SET role_id = EXCLUDED.role_id
            RETURNING id
            "#,
            quoted(self.tables.role_permissions())
        ))
        .bind(role_id.as_i64())
        .bind(permission_id.as_i64())
        .fetch_one(&mut *self.transaction)
        .await
        .map(RolePermissionId::new)
        .map_err(|error| AppError::Storage(format!("failed to assign permission: {error}")))
    }

    pub(super) async fn delete_role_permissions_impl(
        &mut self,
        filter: &RolePermissionFilter,
    ) -> AppResult<u64> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "DELETE FROM {}",
            quoted(self.tables.role_permissions())
        ));
        push_role_permission_filter(&mut builder, filter);

        builder
            .build()
            .execute(&mut *self.transaction)
            .await
            .map(|result| result.rows_affected())
            .map_err(|error| {
                AppError::Storage(format!("failed to revoke role permissions: {error}"))
            })
    }

    pub(super) async fn user_role_exists_impl(
        &mut self,
        filter: &UserRoleFilter,
    ) -> AppResult<bool> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT EXISTS (SELECT 1 FROM {}",
            quoted(self.tables.user_roles())
        ));
        push_user_role_filter(&mut builder, filter);
        builder.push(")");

        builder
            .build_query_scalar::<bool>()
            .fetch_one(&mut *self.transaction)
            .await
            .map_err(|error| AppError::Storage(format!("failed to check user role: {error}")))
    }

    pub(super) async fn list_user_roles_impl(
        &mut self,
        filter: &UserRoleFilter,
        limit: Option<i64>,
    ) -> AppResult<Vec<UserRole>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT id, user_id, role_id FROM {}",
            quoted(self.tables.user_roles())
        ));
        push_user_role_filter(&mut builder, filter);
        builder.push(" ORDER BY id");
        if let Some(limit) = limit {
            builder.push(" LIMIT ").push_bind(limit);
        }

        let rows = builder
            .build_query_as::<UserRoleRow>()
            .fetch_all(&mut *self.transaction)
            .await
            .map_err(|error| AppError::Storage(format!("failed to list user roles: {error}")))?;

        Ok(rows.into_iter().map(UserRole::from).collect())
    }

    pub(super) async fn insert_user_role_impl(
        &mut self,
        user_id: UserId,
        role: &Role,
    ) -> AppResult<UserRoleId> {
        sqlx::query_scalar::<_, i64>(&format!(
            r#"
            INSERT INTO {} (user_id, role_id)
            VALUES ($1, $2)
            RETURNING id
            "#,
            quoted(self.tables.user_roles())
        ))
        .bind(user_id.as_i64())
        .bind(role.id().as_i64())
        .fetch_one(&mut *self.transaction)
        .await
        .map(UserRoleId::new)
        .map_err(|error| map_assignment_error(error, user_id, role))
    }

    pub(super) async fn delete_user_roles_impl(
        &mut self,
        filter: &UserRoleFilter,
    ) -> AppResult<u64> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "DELETE FROM {}",
            quoted(self.tables.user_roles())
        ));
        push_user_role_filter(&mut builder, filter);

        builder
            .build()
            .execute(&mut *self.transaction)
            .await
            .map(|result| result.rows_affected())
            .map_err(|error| AppError::Storage(format!("failed to revoke user roles: {error}")))
    }
}

fn map_assignment_error(error: sqlx::Error, user_id: UserId, role: &Role) -> AppError {
    if let sqlx::Error::Database(database_error) = &error {
        match database_error.code().as_deref() {
            Some("23505") => {
                return AppError::RoleAlreadyAssigned {
                    user_id,
                    role: role.name().to_owned(),
                };
            }
            Some("23503") => return AppError::RoleNotFound(role.name().to_owned()),
            _ => {}
        }
    }

    AppError::Storage(format!("failed to assign role: {error}"))
}
