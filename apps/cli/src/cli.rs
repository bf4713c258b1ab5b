use clap::{Parser, Subcommand};

/// Administer role-based access control tables.
#[derive(Parser, Debug)]
#[command(name = "warrant", author, version, about, long_about = None)]
pub struct CliArgs {
    /// Keep all state in process memory instead of PostgreSQL.
    #[arg(long, global = true, env = "WARRANT_IN_MEMORY")]
    pub in_memory: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Authority operations exposed on the command line.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the authority tables for the configured prefix.
    Bootstrap,

    /// Create a role unless it already exists.
    CreateRole {
        /// Role name.
        name: String,

        /// Human readable title.
        #[arg(long)]
        title: Option<String>,
    },

    /// Create a permission unless it already exists.
    CreatePermission {
        /// Permission name.
        name: String,

        /// Human readable title.
        #[arg(long)]
        title: Option<String>,
    },

    /// Grant permissions to a role.
    AssignPermissions {
        /// Role name.
        role: String,

        /// Permission names.
        #[arg(required = true)]
        permissions: Vec<String>,
    },

    /// Remove a permission from a role.
    RevokeRolePermission {
        /// Role name.
        role: String,

        /// Permission name.
        permission: String,
    },

    /// Assign a role to a user.
    AssignRole {
        /// User identifier.
        user_id: i64,

        /// Role name.
        role: String,
    },

    /// Remove a role from a user.
    RevokeRole {
        /// User identifier.
        user_id: i64,

        /// Role name.
        role: String,
    },

    /// Remove a permission from every role a user holds.
    RevokePermission {
        /// User identifier.
        user_id: i64,

        /// Permission name.
        permission: String,
    },

    /// Check whether a user holds a role.
    CheckRole {
        /// User identifier.
        user_id: i64,

        /// Role name.
        role: String,
    },

    /// Check whether a user is granted a permission through any role.
    CheckPermission {
        /// User identifier.
        user_id: i64,

        /// Permission name.
        permission: String,
    },

    /// Check whether a role grants a permission.
    CheckRolePermission {
        /// Role name.
        role: String,

        /// Permission name.
        permission: String,
    },

    /// List all roles.
    Roles,

    /// List all permissions.
    Permissions,

    /// List the roles held by a user.
    UserRoles {
        /// User identifier.
        user_id: i64,
    },

    /// List the permissions granted by a role.
    RolePermissions {
        /// Role name.
        role: String,
    },

    /// Delete a role that no user holds.
    DeleteRole {
        /// Role name.
        name: String,
    },

    /// Delete a permission that no role grants.
    DeletePermission {
        /// Permission name.
        name: String,
    },

    /// Walk through a short role lifecycle.
    Demo,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{CliArgs, Command};

    #[test]
    fn parses_titled_role_creation() {
        let args = CliArgs::try_parse_from(["warrant", "create-role", "auditor", "--title", "Audit"])
            .unwrap_or_else(|_| unreachable!());

        assert!(!args.in_memory);
        assert!(matches!(
            args.command,
            Command::CreateRole { ref name, title: Some(ref title) }
                if name == "auditor" && title == "Audit"
        ));
    }

    #[test]
    fn in_memory_flag_is_global() {
        let args = CliArgs::try_parse_from(["warrant", "roles", "--in-memory"])
            .unwrap_or_else(|_| unreachable!());

        assert!(args.in_memory);
        assert!(matches!(args.command, Command::Roles));
    }

    #[test]
    fn assign_permissions_requires_at_least_one_name() {
        assert!(CliArgs::try_parse_from(["warrant", "assign-permissions", "editor"]).is_err());
    }

    #[test]
    fn user_ids_must_be_integers() {
        assert!(CliArgs::try_parse_from(["warrant", "check-role", "alice", "editor"]).is_err());
    }
}
