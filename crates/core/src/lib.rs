//! Shared primitives for all Rust crates in Warrant.

#![forbid(unsafe_code)]

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across Warrant crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
///
/// Surrounding whitespace is trimmed on construction so that `" admin "` and
/// `"admin"` name the same role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        if trimmed.len() == value.len() {
            return Ok(Self(value));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// External user identifier. Users are owned by the caller, not by Warrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(i64);

impl UserId {
    /// Wraps an external user identifier.
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

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for UserId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Error kinds surfaced by the authority and its storage adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Invalid input or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// No role with the given name exists.
    #[error("role '{0}' not found")]
    RoleNotFound(String),

    /// No permission with the given name exists.
    #[error("permission '{0}' not found")]
    PermissionNotFound(String),

    /// The role does not grant the permission.
    #[error("permission '{permission}' for role '{role}' not found")]
    RolePermissionNotFound {
        /// Role name.
        role: String,
        /// Permission name.
        permission: String,
    },

    /// The user does not hold the role.
    #[error("role '{role}' for user '{user_id}' not found")]
    UserRoleNotFound {
        /// User identifier.
        user_id: UserId,
        /// Role name.
        role: String,
    },

    /// The user already holds the role.
    #[error("role '{role}' is already assigned to user '{user_id}'")]
    RoleAlreadyAssigned {
        /// User identifier.
        user_id: UserId,
        /// Role name.
        role: String,
    },

    /// The role is still assigned to at least one user.
    #[error("cannot delete role '{0}' while it is assigned to users")]
    RoleInUse(String),

    /// The permission is still granted by at least one role.
    #[error("cannot delete permission '{0}' while it is assigned to roles")]
    PermissionInUse(String),

    /// Underlying storage failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Unexpected failure outside storage, such as rendering output.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns true for the not-found family.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RoleNotFound(_)
                | Self::PermissionNotFound(_)
                | Self::RolePermissionNotFound { .. }
                | Self::UserRoleNotFound { .. }
        )
    }

    /// Returns true for the conflict family.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::RoleAlreadyAssigned { .. } | Self::RoleInUse(_) | Self::PermissionInUse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString, UserId};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn non_empty_string_trims_surrounding_whitespace() {
        let value = NonEmptyString::new("  editor ").unwrap_or_else(|_| unreachable!());
        assert_eq!(value.as_str(), "editor");
    }

    #[test]
    fn error_families_are_disjoint() {
        let not_found = AppError::UserRoleNotFound {
            user_id: UserId::new(1),
            role: "admin".to_owned(),
        };
        let conflict = AppError::RoleInUse("admin".to_owned());
        let storage = AppError::Storage("connection reset".to_owned());
        let internal = AppError::Internal("failed to render output".to_owned());

        assert!(not_found.is_not_found() && !not_found.is_conflict());
        assert!(conflict.is_conflict() && !conflict.is_not_found());
        assert!(!storage.is_conflict() && !storage.is_not_found());
        assert!(!internal.is_conflict() && !internal.is_not_found());
    }

    #[test]
    fn error_messages_name_the_entity() {
        let error = AppError::RoleAlreadyAssigned {
            user_id: UserId::new(7),
            role: "auditor".to_owned(),
        };
        assert_eq!(
            error.to_string(),
            "role 'auditor' is already assigned to user '7'"
        );
    }
}
