use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};
use warrant_application::Authority;
use warrant_core::{AppError, AppResult, UserId};

use crate::cli::Command;

#[derive(Debug, Serialize)]
struct DemoReport {
    roles_before_delete: Vec<String>,
    user_roles: Vec<String>,
    role_permissions: Vec<String>,
    delete_error: Option<String>,
    roles_after_delete: Vec<String>,
}

/// Executes one authority command and returns its JSON result.
///
/// `Bootstrap` is handled by the caller because it needs the concrete store.
pub async fn execute(authority: &Authority, command: Command) -> AppResult<Value> {
    let output = match command {
        Command::Bootstrap => {
            return Err(AppError::Validation(
                "bootstrap must run against a concrete store".to_owned(),
            ));
        }
        Command::CreateRole { name, title } => {
            authority
                .create_role_with_title(name.as_str(), title.as_deref())
                .await?;
            done()
        }
        Command::CreatePermission { name, title } => {
            authority
                .create_permission_with_title(name.as_str(), title.as_deref())
                .await?;
            done()
        }
        Command::AssignPermissions { role, permissions } => {
            authority
                .assign_permissions(role.as_str(), permissions.as_slice())
                .await?;
            done()
        }
        Command::RevokeRolePermission { role, permission } => {
            authority
                .revoke_role_permission(role.as_str(), permission.as_str())
                .await?;
            done()
        }
        Command::AssignRole { user_id, role } => {
            authority
                .assign_role(UserId::new(user_id), role.as_str())
                .await?;
            done()
        }
        Command::RevokeRole { user_id, role } => {
            authority
                .revoke_role(UserId::new(user_id), role.as_str())
                .await?;
            done()
        }
        Command::RevokePermission {
            user_id,
            permission,
        } => {
            authority
                .revoke_permission(UserId::new(user_id), permission.as_str())
                .await?;
            done()
        }
        Command::CheckRole { user_id, role } => json!(
            authority
                .check_role(UserId::new(user_id), role.as_str())
                .await?
        ),
        Command::CheckPermission {
            user_id,
            permission,
        } => json!(
            authority
                .check_permission(UserId::new(user_id), permission.as_str())
                .await?
        ),
        Command::CheckRolePermission { role, permission } => json!(
            authority
                .check_role_permission(role.as_str(), permission.as_str())
                .await?
        ),
        Command::Roles => json!(authority.get_roles().await?),
        Command::Permissions => json!(authority.get_permissions().await?),
        Command::UserRoles { user_id } => {
            json!(authority.get_user_roles(UserId::new(user_id)).await?)
        }
        Command::RolePermissions { role } => {
            json!(authority.get_role_permissions(role.as_str()).await?)
        }
        Command::DeleteRole { name } => {
            authority.delete_role(name.as_str()).await?;
            done()
        }
        Command::DeletePermission { name } => {
            authority.delete_permission(name.as_str()).await?;
            done()
        }
        Command::Demo => {
            let report = run_demo(authority).await?;
            serde_json::to_value(report).map_err(|error| {
                AppError::Internal(format!("failed to serialize demo report: {error}"))
            })?
        }
    };

    Ok(output)
}

fn done() -> Value {
    json!({ "status": "ok" })
}

async fn run_demo(authority: &Authority) -> AppResult<DemoReport> {
    let user_id = UserId::new(1);

    authority.create_role("role-1").await?;
    authority.create_permission("perm-1").await?;
    authority.create_permission("perm-2").await?;
    authority
        .assign_permissions("role-1", &["perm-1", "perm-2"])
        .await?;
    authority.assign_role(user_id, "role-1").await?;
    info!(%user_id, "demo role assigned");

    let roles_before_delete = authority.get_roles().await?;
    let user_roles = authority.get_user_roles(user_id).await?;
    let role_permissions = authority.get_role_permissions("role-1").await?;

    let delete_error = match authority.delete_role("role-1").await {
        Ok(()) => None,
        Err(error @ AppError::RoleInUse(_)) => {
            warn!(%error, "demo role deletion refused");
            Some(error.to_string())
        }
        Err(error) => return Err(error),
    };

    let roles_after_delete = authority.get_roles().await?;

    Ok(DemoReport {
        roles_before_delete,
        user_roles,
        role_permissions,
        delete_error,
        roles_after_delete,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use warrant_application::Authority;
    use warrant_core::AppError;
    use warrant_infrastructure::InMemoryAuthorityRepository;

    use super::execute;
    use crate::cli::Command;

    fn authority() -> Authority {
        Authority::new(Arc::new(InMemoryAuthorityRepository::new()))
    }

    #[tokio::test]
    async fn demo_reports_refused_deletion() {
        let authority = authority();

        let output = execute(&authority, Command::Demo)
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(output["roles_before_delete"], json!(["role-1"]));
        assert_eq!(output["user_roles"], json!(["role-1"]));
        assert_eq!(output["role_permissions"], json!(["perm-1", "perm-2"]));
        assert_eq!(output["roles_after_delete"], json!(["role-1"]));
        assert!(output["delete_error"].is_string());
    }

    #[tokio::test]
    async fn checks_print_booleans() {
        let authority = authority();
        assert!(
            execute(
                &authority,
                Command::CreateRole {
                    name: "editor".to_owned(),
                    title: None,
                },
            )
            .await
            .is_ok()
        );

        let output = execute(
            &authority,
            Command::CheckRole {
                user_id: 3,
                role: "editor".to_owned(),
            },
        )
        .await;

        assert_eq!(output, Ok(json!(false)));
    }

    #[tokio::test]
    async fn errors_are_returned_unchanged() {
        let authority = authority();

        let output = execute(
            &authority,
            Command::DeleteRole {
                name: "ghost".to_owned(),
            },
        )
        .await;

        assert_eq!(output, Err(AppError::RoleNotFound("ghost".to_owned())));
    }
}
