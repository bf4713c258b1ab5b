use tracing::info;

use super::*;

impl PostgresAuthorityRepository {
    /// Creates the four authority tables for the configured prefix when they
    /// do not exist yet.
    ///
    /// Link tables cascade on delete of their referenced role or permission
    /// and carry unique indexes on their logical keys.
    pub async fn ensure_schema(&self) -> AppResult<()> {
        let roles = quoted(self.tables.roles());
        let permissions = quoted(self.tables.permissions());
        let role_permissions = quoted(self.tables.role_permissions());
        let user_roles = quoted(self.tables.user_roles());
        let prefix = self.tables.prefix();

        let statements = [
            format!(
                r#"
                CREATE TABLE IF NOT EXISTS {roles} (
                    id BIGSERIAL PRIMARY KEY,
                    name TEXT NOT NULL UNIQUE,
                    title TEXT
                )
                "#
            ),
            format!(
                r#"
                CREATE TABLE IF NOT EXISTS {permissions} (
                    id BIGSERIAL PRIMARY KEY,
                    name TEXT NOT NULL UNIQUE,
                    title TEXT
                )
                "#
            ),
            format!(
                r#"
                CREATE TABLE IF NOT EXISTS {role_permissions} (
                    id BIGSERIAL PRIMARY KEY,
                    role_id BIGINT NOT NULL REFERENCES {roles} (id) ON DELETE CASCADE,
                    permission_id BIGINT NOT NULL REFERENCES {permissions} (id) ON DELETE CASCADE
                )
                "#
            ),
            format!(
                r#"
                CREATE UNIQUE INDEX IF NOT EXISTS "{prefix}role_permissions_pair_key"
                ON {role_permissions} (role_id, permission_id)
                "#
            ),
            format!(
                r#"
                CREATE INDEX IF NOT EXISTS "{prefix}role_permissions_permission_idx"
                ON {role_permissions} (permission_id)
                "#
            ),
            format!(
                r#"
                CREATE TABLE IF NOT EXISTS {user_roles} (
                    id BIGSERIAL PRIMARY KEY,
                    user_id BIGINT NOT NULL,
                    role_id BIGINT NOT NULL REFERENCES {roles} (id) ON DELETE CASCADE
                )
                "#
            ),
            format!(
                r#"
                CREATE UNIQUE INDEX IF NOT EXISTS "{prefix}user_roles_pair_key"
                ON {user_roles} (user_id, role_id)
                "#
            ),
            format!(
                r#"
                CREATE INDEX IF NOT EXISTS "{prefix}user_roles_role_idx"
                ON {user_roles} (role_id)
                "#
            ),
        ];

        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Storage(format!("failed to begin transaction: {error}"))
            })?;

        for statement in &statements {
            sqlx::query(statement.as_str())
                .execute(&mut *transaction)
                .await
                .map_err(|error| {
                    AppError::Storage(format!("failed to bootstrap authority tables: {error}"))
                })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Storage(format!("failed to commit transaction: {error}"))
        })?;

        info!(prefix, "authority tables are ready");
        Ok(())
    }
}
