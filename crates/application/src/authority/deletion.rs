use super::*;

impl Authority {
    /// Deletes a role together with its permission links.
    ///
    /// Fails with [`AppError::RoleInUse`] while any user holds the role. The
    /// role row is locked before the check, so an assignment racing with the
    /// delete either lands first and is seen, or fails once the role is gone.
    pub async fn delete_role(&self, role_name: &str) -> AppResult<()> {
        let mut transaction = self.begin().await?;
        let role = resolve_role(transaction.as_mut(), role_name).await?;
        transaction.lock_role(role.id()).await?;

        if transaction
            .user_role_exists(&UserRoleFilter::for_role(role.id()))
            .await?
        {
            return Err(AppError::RoleInUse(role.name().to_owned()));
        }

        transaction
            .delete_role_permissions(&RolePermissionFilter::for_role(role.id()))
            .await?;
        transaction.delete_roles(&RoleFilter::Id(role.id())).await?;

        transaction.commit().await
    }

    /// Deletes a permission.
    ///
    /// Fails with [`AppError::PermissionInUse`] while any role grants it.
    pub async fn delete_permission(&self, permission_name: &str) -> AppResult<()> {
        let mut transaction = self.begin().await?;
        let permission = resolve_permission(transaction.as_mut(), permission_name).await?;
        transaction.lock_permission(permission.id()).await?;

        if transaction
            .role_permission_exists(&RolePermissionFilter::for_permission(permission.id()))
            .await?
        {
            return Err(AppError::PermissionInUse(permission.name().to_owned()));
        }

        transaction
            .delete_permissions(&PermissionFilter::Id(permission.id()))
            .await?;

        transaction.commit().await
    }
}
