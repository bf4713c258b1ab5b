use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use warrant_core::{AppResult, NonEmptyString, UserId};

macro_rules! surrogate_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a storage-assigned identifier.
            #[must_use]
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw identifier.
            #[must_use]
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

surrogate_id!(
    /// Surrogate key of a stored role.
    RoleId
);
surrogate_id!(
    /// Surrogate key of a stored permission.
    PermissionId
);
surrogate_id!(
    /// Surrogate key of a role-permission link.
    RolePermissionId
);
surrogate_id!(
    /// Surrogate key of a user-role link.
    UserRoleId
);

/// Named collection of permissions assignable to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: NonEmptyString,
    title: Option<String>,
}

impl Role {
    /// Creates a role from stored values.
    pub fn new(id: RoleId, name: impl Into<String>, title: Option<String>) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            title,
        })
    }

    /// Returns the surrogate key.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the unique role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the optional display title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

/// Named capability that can be granted via a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    name: NonEmptyString,
    title: Option<String>,
}

impl Permission {
    /// Creates a permission from stored values.
    pub fn new(
        id: PermissionId,
        name: impl Into<String>,
        title: Option<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            title,
        })
    }

    /// Returns the surrogate key.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the unique permission name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the optional display title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

/// Link stating that a role grants a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermission {
    /// Surrogate key.
    pub id: RolePermissionId,
    /// Granting role.
    pub role_id: RoleId,
    /// Granted permission.
    pub permission_id: PermissionId,
}

/// Link stating that a user holds a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    /// Surrogate key.
    pub id: UserRoleId,
    /// External user identifier.
    pub user_id: UserId,
    /// Held role.
    pub role_id: RoleId,
}

/// Insert payload for roles and permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNamedEntity {
    /// Unique name.
    pub name: NonEmptyString,
    /// Optional display title.
    pub title: Option<String>,
}

impl NewNamedEntity {
    /// Validates the name and normalizes a blank title to `None`.
    pub fn new(name: &str, title: Option<&str>) -> AppResult<Self> {
        Ok(Self {
            name: NonEmptyString::new(name)?,
            title: title
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned),
        })
    }
}

#[cfg(test)]
mod tests {
    use warrant_core::AppError;

    use super::{NewNamedEntity, Role, RoleId};

    #[test]
    fn role_rejects_blank_name() {
        let result = Role::new(RoleId::new(1), " ", None);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn new_entity_drops_blank_title() {
        let entity = NewNamedEntity::new("editor", Some("  "));
        assert!(entity.is_ok());
        assert_eq!(entity.unwrap_or_else(|_| unreachable!()).title, None);
    }

    #[test]
    fn new_entity_keeps_trimmed_title() {
        let entity = NewNamedEntity::new(" editor ", Some(" Content editor "))
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(entity.name.as_str(), "editor");
        assert_eq!(entity.title.as_deref(), Some("Content editor"));
    }
}
