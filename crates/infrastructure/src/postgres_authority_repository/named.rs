use super::*;

impl PostgresAuthorityTransaction {
    pub(super) async fn named_exists_impl(
        &mut self,
        table: &str,
        filter: NamedFilter<'_>,
    ) -> AppResult<bool> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT EXISTS (SELECT 1 FROM {}",
            quoted(table)
        ));
        push_named_filter(&mut builder, filter);
        builder.push(")");

        builder
            .build_query_scalar::<bool>()
            .fetch_one(&mut *self.transaction)
            .await
            .map_err(|error| {
                AppError::Storage(format!("failed to check existence in '{table}': {error}"))
            })
    }

    pub(super) async fn find_named_impl(
        &mut self,
        table: &str,
        filter: NamedFilter<'_>,
    ) -> AppResult<Option<NamedRow>> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT id, name, title FROM {}", quoted(table)));
        push_named_filter(&mut builder, filter);
        builder.push(" LIMIT 1");

        builder
            .build_query_as::<NamedRow>()
            .fetch_optional(&mut *self.transaction)
            .await
            .map_err(|error| AppError::Storage(format!("failed to read '{table}': {error}")))
    }

    pub(super) async fn list_named_impl(&mut self, table: &str) -> AppResult<Vec<NamedRow>> {
        sqlx::query_as::<_, NamedRow>(&format!(
            "SELECT id, name, title FROM {} ORDER BY id",
            quoted(table)
        ))
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(|error| AppError::Storage(format!("failed to list '{table}': {error}")))
    }

    /// Concurrent creators of the same name converge on one row; the loser
    /// receives the existing id.
    pub(super) async fn insert_named_impl(
        &mut self,
        table: &str,
        entity: &NewNamedEntity,
    ) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(&format!(
            r#"
            INSERT INTO {} (name, title)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE
            SET name = EXCLUDED.name
            RETURNING id
            "#,
            quoted(table)
        ))
        .bind(entity.name.as_str())
        .bind(entity.title.as_deref())
        .fetch_one(&mut *self.transaction)
        .await
        .map_err(|error| {
            AppError::Storage(format!(
                "failed to insert '{}' into '{table}': {error}",
                entity.name
            ))
        })
    }

    /// Takes a row lock that conflicts with the `FOR KEY SHARE` lock foreign
    /// key checks on link inserts acquire.
    pub(super) async fn lock_named_impl(&mut self, table: &str, id: i64) -> AppResult<()> {
        sqlx::query_scalar::<_, i64>(&format!(
            "SELECT id FROM {} WHERE id = $1 FOR UPDATE",
            quoted(table)
        ))
        .bind(id)
        .fetch_optional(&mut *self.transaction)
        .await
        .map(|_| ())
        .map_err(|error| AppError::Storage(format!("failed to lock row in '{table}': {error}")))
    }

    pub(super) async fn delete_named_impl(
        &mut self,
        table: &str,
        filter: NamedFilter<'_>,
    ) -> AppResult<u64> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("DELETE FROM {}", quoted(table)));
        push_named_filter(&mut builder, filter);

        builder
            .build()
            .execute(&mut *self.transaction)
            .await
            .map(|result| result.rows_affected())
            .map_err(|error| AppError::Storage(format!("failed to delete from '{table}': {error}")))
    }
}
