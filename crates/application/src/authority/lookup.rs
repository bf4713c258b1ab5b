use super::*;

pub(super) fn normalize_name(value: &str) -> AppResult<String> {
    NonEmptyString::new(value).map(String::from)
}

pub(super) async fn resolve_role(
    transaction: &mut dyn AuthorityTransaction,
    role_name: &str,
) -> AppResult<Role> {
    let role_name = normalize_name(role_name)?;
    transaction
        .find_role(&RoleFilter::Name(role_name.clone()))
        .await?
        .ok_or(AppError::RoleNotFound(role_name))
}

pub(super) async fn resolve_permission(
    transaction: &mut dyn AuthorityTransaction,
    permission_name: &str,
) -> AppResult<Permission> {
    let permission_name = normalize_name(permission_name)?;
    transaction
        .find_permission(&PermissionFilter::Name(permission_name.clone()))
        .await?
        .ok_or(AppError::PermissionNotFound(permission_name))
}

pub(super) async fn resolve_role_permission(
    transaction: &mut dyn AuthorityTransaction,
    role: &Role,
    permission: &Permission,
) -> AppResult<RolePermission> {
    transaction
        .find_role_permission(&RolePermissionFilter::link(role.id(), permission.id()))
        .await?
        .ok_or_else(|| AppError::RolePermissionNotFound {
            role: role.name().to_owned(),
            permission: permission.name().to_owned(),
        })
}

pub(super) async fn resolve_user_role(
    transaction: &mut dyn AuthorityTransaction,
    user_id: UserId,
    role: &Role,
) -> AppResult<UserRole> {
    transaction
        .find_user_role(&UserRoleFilter::assignment(user_id, role.id()))
        .await?
        .ok_or_else(|| AppError::UserRoleNotFound {
            user_id,
            role: role.name().to_owned(),
        })
}
