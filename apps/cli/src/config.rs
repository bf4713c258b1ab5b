use std::env;

use tracing_subscriber::EnvFilter;
use warrant_core::{AppError, AppResult};
use warrant_infrastructure::TableNames;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Runtime settings read from the environment.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub database_url: Option<String>,
    pub tables: TableNames,
    pub max_connections: u32,
}

impl CliConfig {
    /// Loads settings from process environment variables.
    ///
    /// `DATABASE_URL` is only required when PostgreSQL storage is used.
    pub fn load(in_memory: bool) -> AppResult<Self> {
        Self::from_lookup(in_memory, |name| env::var(name).ok())
    }

    fn from_lookup(in_memory: bool, lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let database_url = lookup("DATABASE_URL").filter(|value| !value.trim().is_empty());
        if !in_memory && database_url.is_none() {
            return Err(AppError::Validation("DATABASE_URL is required".to_owned()));
        }

        let tables = TableNames::with_prefix(lookup("WARRANT_TABLE_PREFIX").unwrap_or_default())?;

        let max_connections = match lookup("WARRANT_MAX_CONNECTIONS") {
            Some(value) => value.parse::<u32>().map_err(|error| {
                AppError::Validation(format!(
                    "invalid WARRANT_MAX_CONNECTIONS value '{value}': {error}"
                ))
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        if max_connections == 0 {
            return Err(AppError::Validation(
                "WARRANT_MAX_CONNECTIONS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            tables,
            max_connections,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use warrant_core::AppError;

    use super::CliConfig;

    fn load(in_memory: bool, vars: &[(&str, &str)]) -> Result<CliConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        CliConfig::from_lookup(in_memory, |name| vars.get(name).cloned())
    }

    #[test]
    fn database_url_is_required_for_postgres() {
        assert!(matches!(load(false, &[]), Err(AppError::Validation(_))));
    }

    #[test]
    fn in_memory_mode_uses_defaults() {
        let config = load(true, &[]).unwrap_or_else(|_| unreachable!());

        assert_eq!(config.database_url, None);
        assert_eq!(config.tables.roles(), "roles");
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn prefix_and_pool_size_are_applied() {
        let config = load(
            false,
            &[
                ("DATABASE_URL", "postgres://localhost/warrant"),
                ("WARRANT_TABLE_PREFIX", "acl_"),
                ("WARRANT_MAX_CONNECTIONS", "12"),
            ],
        )
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(config.tables.user_roles(), "acl_user_roles");
        assert_eq!(config.max_connections, 12);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            load(true, &[("WARRANT_TABLE_PREFIX", "acl-")]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            load(true, &[("WARRANT_MAX_CONNECTIONS", "many")]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            load(true, &[("WARRANT_MAX_CONNECTIONS", "0")]),
            Err(AppError::Validation(_))
        ));
    }
}
