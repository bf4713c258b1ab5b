use super::*;

impl Authority {
    /// Creates a role unless one with the same name already exists.
    pub async fn create_role(&self, role_name: &str) -> AppResult<()> {
        self.create_role_with_title(role_name, None).await
    }

    /// Creates a titled role unless one with the same name already exists.
    ///
    /// An existing role keeps its stored title.
    pub async fn create_role_with_title(
        &self,
        role_name: &str,
        title: Option<&str>,
    ) -> AppResult<()> {
        let role = NewNamedEntity::new(role_name, title)?;
        let mut transaction = self.begin().await?;

        let exists = transaction
            .role_exists(&RoleFilter::Name(role.name.as_str().to_owned()))
            .await?;
        if !exists {
            transaction.insert_role(&role).await?;
        }

        transaction.commit().await
    }

    /// Creates a permission unless one with the same name already exists.
    pub async fn create_permission(&self, permission_name: &str) -> AppResult<()> {
        self.create_permission_with_title(permission_name, None).await
    }

    /// Creates a titled permission unless one with the same name already exists.
    pub async fn create_permission_with_title(
        &self,
        permission_name: &str,
        title: Option<&str>,
    ) -> AppResult<()> {
        let permission = NewNamedEntity::new(permission_name, title)?;
        let mut transaction = self.begin().await?;

        let exists = transaction
            .permission_exists(&PermissionFilter::Name(
                permission.name.as_str().to_owned(),
            ))
            .await?;
        if !exists {
            transaction.insert_permission(&permission).await?;
        }

        transaction.commit().await
    }

    /// Grants a batch of permissions to a role.
    ///
    /// All names are resolved before anything is written, and the batch is
    /// all-or-nothing. Links that already exist are left untouched.
    pub async fn assign_permissions<S>(
        &self,
        role_name: &str,
        permission_names: &[S],
    ) -> AppResult<()>
    where
        S: AsRef<str> + Sync,
    {
        let mut transaction = self.begin().await?;
        let role = resolve_role(transaction.as_mut(), role_name).await?;

        let mut permissions: Vec<Permission> = Vec::with_capacity(permission_names.len());
        for permission_name in permission_names {
            let permission =
                resolve_permission(transaction.as_mut(), permission_name.as_ref()).await?;
            if !permissions
                .iter()
                .any(|resolved| resolved.id() == permission.id())
            {
                permissions.push(permission);
            }
        }

        for permission in &permissions {
            match resolve_role_permission(transaction.as_mut(), &role, permission).await {
                Ok(_) => {}
                Err(AppError::RolePermissionNotFound { .. }) => {
                    transaction
                        .insert_role_permission(role.id(), permission.id())
                        .await?;
                }
                Err(error) => return Err(error),
            }
        }

        transaction.commit().await
    }

    /// Assigns a role to a user.
    ///
    /// Fails with [`AppError::RoleAlreadyAssigned`] when the user already
    /// holds the role.
    pub async fn assign_role(&self, user_id: UserId, role_name: &str) -> AppResult<()> {
        let mut transaction = self.begin().await?;
        let role = resolve_role(transaction.as_mut(), role_name).await?;

        match resolve_user_role(transaction.as_mut(), user_id, &role).await {
            Ok(_) => {
                return Err(AppError::RoleAlreadyAssigned {
                    user_id,
                    role: role.name().to_owned(),
                });
            }
            Err(AppError::UserRoleNotFound { .. }) => {}
            Err(error) => return Err(error),
        }

        // A concurrent assignment can still win the insert race; storage
        // reports it as the same conflict.
        transaction.insert_user_role(user_id, &role).await?;

        transaction.commit().await
    }
}
