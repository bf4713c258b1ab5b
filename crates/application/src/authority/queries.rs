use super::*;

impl Authority {
    /// Returns whether the user holds the role.
    ///
    /// An unknown role is [`AppError::RoleNotFound`]; a missing assignment is
    /// `Ok(false)`.
    pub async fn check_role(&self, user_id: UserId, role_name: &str) -> AppResult<bool> {
        let mut transaction = self.begin().await?;
        let role = resolve_role(transaction.as_mut(), role_name).await?;

        let assigned = match resolve_user_role(transaction.as_mut(), user_id, &role).await {
            Ok(_) => true,
            Err(AppError::UserRoleNotFound { .. }) => false,
            Err(error) => return Err(error),
        };

        transaction.commit().await?;
        Ok(assigned)
    }

    /// Returns whether any role held by the user grants the permission.
    pub async fn check_permission(
        &self,
        user_id: UserId,
        permission_name: &str,
    ) -> AppResult<bool> {
        let mut transaction = self.begin().await?;

        let role_ids = transaction
            .list_user_roles(&UserRoleFilter::for_user(user_id))
            .await?
            .into_iter()
            .map(|user_role| user_role.role_id)
            .collect::<Vec<_>>();
        let permission = resolve_permission(transaction.as_mut(), permission_name).await?;

        let granted = if role_ids.is_empty() {
            false
        } else {
            transaction
                .role_permission_exists(&RolePermissionFilter::for_roles_and_permission(
                    role_ids,
                    permission.id(),
                ))
                .await?
        };

        transaction.commit().await?;
        Ok(granted)
    }

    /// Returns whether the role directly grants the permission.
    pub async fn check_role_permission(
        &self,
        role_name: &str,
        permission_name: &str,
    ) -> AppResult<bool> {
        let mut transaction = self.begin().await?;
        let role = resolve_role(transaction.as_mut(), role_name).await?;
        let permission = resolve_permission(transaction.as_mut(), permission_name).await?;

        let granted = match resolve_role_permission(transaction.as_mut(), &role, &permission).await
        {
            Ok(_) => true,
            Err(AppError::RolePermissionNotFound { .. }) => false,
            Err(error) => return Err(error),
        };

        transaction.commit().await?;
        Ok(granted)
    }

    /// Returns every role name in storage order.
    pub async fn get_roles(&self) -> AppResult<Vec<String>> {
        let mut transaction = self.begin().await?;
        let roles = transaction.list_roles().await?;
        transaction.commit().await?;

        Ok(roles.iter().map(|role| role.name().to_owned()).collect())
    }

    /// Returns the names of the roles held by the user.
    ///
    /// Assignments whose role no longer resolves are skipped.
    pub async fn get_user_roles(&self, user_id: UserId) -> AppResult<Vec<String>> {
        let mut transaction = self.begin().await?;
        let user_roles = transaction
            .list_user_roles(&UserRoleFilter::for_user(user_id))
            .await?;

        let mut role_names = Vec::with_capacity(user_roles.len());
        for user_role in user_roles {
            if let Some(role) = transaction
                .find_role(&RoleFilter::Id(user_role.role_id))
                .await?
            {
                role_names.push(role.name().to_owned());
            }
        }

        transaction.commit().await?;
        Ok(role_names)
    }

    /// Returns every permission name in storage order.
    pub async fn get_permissions(&self) -> AppResult<Vec<String>> {
        let mut transaction = self.begin().await?;
        let permissions = transaction.list_permissions().await?;
        transaction.commit().await?;

        Ok(permissions
            .iter()
            .map(|permission| permission.name().to_owned())
            .collect())
    }

    /// Returns the names of the permissions a role grants.
    pub async fn get_role_permissions(&self, role_name: &str) -> AppResult<Vec<String>> {
        let mut transaction = self.begin().await?;
        let role = resolve_role(transaction.as_mut(), role_name).await?;
        let links = transaction
            .list_role_permissions(&RolePermissionFilter::for_role(role.id()))
            .await?;

        let mut permission_names = Vec::with_capacity(links.len());
        for link in links {
            if let Some(permission) = transaction
                .find_permission(&PermissionFilter::Id(link.permission_id))
                .await?
            {
                permission_names.push(permission.name().to_owned());
            }
        }

        transaction.commit().await?;
        Ok(permission_names)
    }
}
