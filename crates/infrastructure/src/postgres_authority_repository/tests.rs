use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use warrant_application::{Authority, AuthorityRepository};
use warrant_core::{AppError, UserId};
use warrant_domain::{PermissionFilter, RoleFilter, UserRoleFilter};

use super::PostgresAuthorityRepository;
use crate::TableNames;

async fn test_repository() -> Option<(PgPool, PostgresAuthorityRepository)> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let tables = match TableNames::with_prefix(format!("t{}_", &suffix[..12])) {
        Ok(tables) => tables,
        Err(error) => panic!("invalid generated table prefix: {error}"),
    };

    let repository = PostgresAuthorityRepository::new(pool.clone(), tables);
    if let Err(error) = repository.ensure_schema().await {
        panic!("failed to bootstrap authority tables for postgres tests: {error}");
    }

    Some((pool, repository))
}

async fn drop_tables(pool: &PgPool, tables: &TableNames) {
    for table in [
        tables.user_roles(),
        tables.role_permissions(),
        tables.permissions(),
        tables.roles(),
    ] {
        let dropped = sqlx::query(&format!("DROP TABLE IF EXISTS \"{table}\" CASCADE"))
            .execute(pool)
            .await;
        assert!(dropped.is_ok());
    }
}

#[tokio::test]
async fn ensure_schema_is_idempotent() {
    let Some((pool, repository)) = test_repository().await else {
        return;
    };

    assert!(repository.ensure_schema().await.is_ok());

    drop_tables(&pool, repository.tables()).await;
}

#[tokio::test]
async fn role_lifecycle_is_persisted() {
    let Some((pool, repository)) = test_repository().await else {
        return;
    };
    let tables = repository.tables().clone();
    let authority = Authority::new(Arc::new(repository));
    let user_id = UserId::new(1);

    assert!(authority.create_role("role-1").await.is_ok());
    assert!(authority.create_role("role-1").await.is_ok());
    assert!(authority.create_permission("perm-1").await.is_ok());
    assert!(authority.create_permission("perm-2").await.is_ok());
    assert!(
        authority
            .assign_permissions("role-1", &["perm-1", "perm-2"])
            .await
            .is_ok()
    );
    assert!(authority.assign_role(user_id, "role-1").await.is_ok());

    assert_eq!(authority.get_roles().await, Ok(vec!["role-1".to_owned()]));
    assert_eq!(authority.check_permission(user_id, "perm-2").await, Ok(true));
    assert_eq!(
        authority.assign_role(user_id, "role-1").await,
        Err(AppError::RoleAlreadyAssigned {
            user_id,
            role: "role-1".to_owned(),
        })
    );
    assert_eq!(
        authority.delete_role("role-1").await,
        Err(AppError::RoleInUse("role-1".to_owned()))
    );

    assert!(authority.revoke_role(user_id, "role-1").await.is_ok());
    assert!(authority.delete_role("role-1").await.is_ok());
    assert_eq!(authority.get_roles().await, Ok(Vec::new()));
    assert!(authority.delete_permission("perm-1").await.is_ok());
    assert_eq!(
        authority.get_permissions().await,
        Ok(vec!["perm-2".to_owned()])
    );

    drop_tables(&pool, &tables).await;
}

#[tokio::test]
async fn failed_batch_assignment_is_rolled_back() {
    let Some((pool, repository)) = test_repository().await else {
        return;
    };
    let tables = repository.tables().clone();
    let authority = Authority::new(Arc::new(repository));

    assert!(authority.create_role("editor").await.is_ok());
    assert!(authority.create_permission("posts.write").await.is_ok());

    let result = authority
        .assign_permissions("editor", &["posts.write", "posts.publish"])
        .await;

    assert_eq!(
        result,
        Err(AppError::PermissionNotFound("posts.publish".to_owned()))
    );
    assert_eq!(authority.get_role_permissions("editor").await, Ok(Vec::new()));

    drop_tables(&pool, &tables).await;
}

#[tokio::test]
async fn delete_role_waits_for_pending_assignment() {
    let Some((pool, repository)) = test_repository().await else {
        return;
    };
    let tables = repository.tables().clone();
    let repository = Arc::new(repository);
    let authority = Authority::new(repository.clone());
    assert!(authority.create_role("r").await.is_ok());

    let mut pending = repository.begin().await.unwrap_or_else(|_| unreachable!());
    let role = pending
        .find_role(&RoleFilter::Name("r".to_owned()))
        .await
        .unwrap_or_else(|_| unreachable!())
        .unwrap_or_else(|| unreachable!());
    assert!(pending.insert_user_role(UserId::new(1), &role).await.is_ok());

    let (deleted, committed) = tokio::join!(authority.delete_role("r"), async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        pending.commit().await
    });

    assert_eq!(committed, Ok(()));
    assert_eq!(deleted, Err(AppError::RoleInUse("r".to_owned())));
    assert_eq!(
        authority.get_user_roles(UserId::new(1)).await,
        Ok(vec!["r".to_owned()])
    );

    drop_tables(&pool, &tables).await;
}

#[tokio::test]
async fn assignment_racing_a_committed_delete_is_not_found() {
    let Some((pool, repository)) = test_repository().await else {
        return;
    };
    let tables = repository.tables().clone();
    let repository = Arc::new(repository);
    let authority = Authority::new(repository.clone());
    assert!(authority.create_role("r").await.is_ok());

    let mut deleting = repository.begin().await.unwrap_or_else(|_| unreachable!());
    let role = deleting
        .find_role(&RoleFilter::Name("r".to_owned()))
        .await
        .unwrap_or_else(|_| unreachable!())
        .unwrap_or_else(|| unreachable!());
    assert!(deleting.lock_role(role.id()).await.is_ok());
    assert_eq!(
        deleting
            .user_role_exists(&UserRoleFilter::for_role(role.id()))
            .await,
        Ok(false)
    );

    let (assigned, deleted) = tokio::join!(authority.assign_role(UserId::new(1), "r"), async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        let removed = deleting.delete_roles(&RoleFilter::Id(role.id())).await;
        assert_eq!(removed, Ok(1));
        deleting.commit().await
    });

    assert_eq!(deleted, Ok(()));
    assert_eq!(assigned, Err(AppError::RoleNotFound("r".to_owned())));
    assert_eq!(authority.get_user_roles(UserId::new(1)).await, Ok(Vec::new()));

    drop_tables(&pool, &tables).await;
}

#[tokio::test]
async fn delete_permission_waits_for_pending_grant() {
    let Some((pool, repository)) = test_repository().await else {
        return;
    };
    let tables = repository.tables().clone();
    let repository = Arc::new(repository);
    let authority = Authority::new(repository.clone());
    assert!(authority.create_role("editor").await.is_ok());
    assert!(authority.create_permission("posts.write").await.is_ok());

    let mut pending = repository.begin().await.unwrap_or_else(|_| unreachable!());
    let role = pending
        .find_role(&RoleFilter::Name("editor".to_owned()))
        .await
        .unwrap_or_else(|_| unreachable!())
        .unwrap_or_else(|| unreachable!());
    let permission = pending
        .find_permission(&PermissionFilter::Name("posts.write".to_owned()))
        .await
        .unwrap_or_else(|_| unreachable!())
        .unwrap_or_else(|| unreachable!());
    assert!(
        pending
            .insert_role_permission(role.id(), permission.id())
            .await
            .is_ok()
    );

    let (deleted, committed) = tokio::join!(authority.delete_permission("posts.write"), async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        pending.commit().await
    });

    assert_eq!(committed, Ok(()));
    assert_eq!(
        deleted,
        Err(AppError::PermissionInUse("posts.write".to_owned()))
    );
    assert_eq!(
        authority.get_role_permissions("editor").await,
        Ok(vec!["posts.write".to_owned()])
    );

    drop_tables(&pool, &tables).await;
}
