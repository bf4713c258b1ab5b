use warrant_core::{AppError, AppResult};

const MAX_PREFIX_LENGTH: usize = 24;

/// Physical table names for the four authority tables.
///
/// One prefix is applied uniformly so several authorities can share a
/// database. The prefix is spliced into SQL identifiers and is therefore
/// restricted to ASCII letters, digits and underscores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    prefix: String,
    roles: String,
    permissions: String,
    role_permissions: String,
    user_roles: String,
}

impl TableNames {
    /// Builds table names from a validated prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> AppResult<Self> {
        let prefix = prefix.into();

        if prefix.len() > MAX_PREFIX_LENGTH {
            return Err(AppError::Validation(format!(
                "table prefix must not exceed {MAX_PREFIX_LENGTH} characters, got {}",
                prefix.len()
            )));
        }

        if !prefix
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || character == '_')
        {
            return Err(AppError::Validation(format!(
                "table prefix '{prefix}' may only contain ASCII letters, digits and underscores"
            )));
        }

        Ok(Self {
            roles: format!("{prefix}roles"),
            permissions: format!("{prefix}permissions"),
            role_permissions: format!("{prefix}role_permissions"),
            user_roles: format!("{prefix}user_roles"),
            prefix,
        })
    }

    /// Returns the configured prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.prefix.as_str()
    }

    /// Returns the roles table name.
    #[must_use]
    pub fn roles(&self) -> &str {
        self.roles.as_str()
    }

    /// Returns the permissions table name.
    #[must_use]
    pub fn permissions(&self) -> &str {
        self.permissions.as_str()
    }

    /// Returns the role-permission link table name.
    #[must_use]
    pub fn role_permissions(&self) -> &str {
        self.role_permissions.as_str()
    }

    /// Returns the user-role link table name.
    #[must_use]
    pub fn user_roles(&self) -> &str {
        self.user_roles.as_str()
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            roles: "roles".to_owned(),
            permissions: "permissions".to_owned(),
            role_permissions: "role_permissions".to_owned(),
            user_roles: "user_roles".to_owned(),
        }
    }
}
