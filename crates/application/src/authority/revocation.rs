use super::*;

impl Authority {
    /// Removes a role from a user. Revoking a role the user does not hold is
    /// not an error.
    pub async fn revoke_role(&self, user_id: UserId, role_name: &str) -> AppResult<()> {
        let mut transaction = self.begin().await?;
        let role = resolve_role(transaction.as_mut(), role_name).await?;

        transaction
            .delete_user_roles(&UserRoleFilter::assignment(user_id, role.id()))
            .await?;

        transaction.commit().await
    }

    /// Removes a permission from every role the user holds.
    ///
    /// This edits the roles themselves, so other holders of those roles lose
    /// the permission too. A user without roles is a no-op.
    pub async fn revoke_permission(
        &self,
        user_id: UserId,
        permission_name: &str,
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        let user_roles = transaction
            .list_user_roles(&UserRoleFilter::for_user(user_id))
            .await?;
        if user_roles.is_empty() {
            return transaction.commit().await;
        }

        let permission = resolve_permission(transaction.as_mut(), permission_name).await?;
        let role_ids = user_roles
            .iter()
            .map(|user_role| user_role.role_id)
            .collect();

        transaction
            .delete_role_permissions(&RolePermissionFilter::for_roles_and_permission(
                role_ids,
                permission.id(),
            ))
            .await?;

        transaction.commit().await
    }

    /// Removes a permission from a role.
    pub async fn revoke_role_permission(
        &self,
        role_name: &str,
        permission_name: &str,
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;
        let role = resolve_role(transaction.as_mut(), role_name).await?;
        let permission = resolve_permission(transaction.as_mut(), permission_name).await?;

        transaction
            .delete_role_permissions(&RolePermissionFilter::link(role.id(), permission.id()))
            .await?;

        transaction.commit().await
    }
}
