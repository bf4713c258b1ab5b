//! Command line administration for the warrant authority.

#![forbid(unsafe_code)]

mod cli;
mod commands;
mod config;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use warrant_application::Authority;
use warrant_core::{AppError, AppResult};
use warrant_infrastructure::{InMemoryAuthorityRepository, PostgresAuthorityRepository};

use crate::cli::{CliArgs, Command};
use crate::config::{CliConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = CliArgs::parse();

    match run(args).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            error!(%error, "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> AppResult<String> {
    let config = CliConfig::load(args.in_memory)?;

    let authority = if args.in_memory {
        if matches!(args.command, Command::Bootstrap) {
            info!("in-memory store needs no bootstrap");
            return pretty(&serde_json::json!({ "status": "ok" }));
        }
        Authority::new(Arc::new(InMemoryAuthorityRepository::new()))
    } else {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))?;
        let pool = connect_pool(database_url, config.max_connections).await?;
        let repository = PostgresAuthorityRepository::new(pool, config.tables.clone());

        if matches!(args.command, Command::Bootstrap) {
            repository.ensure_schema().await?;
            return pretty(&serde_json::json!({ "status": "ok" }));
        }
        Authority::new(Arc::new(repository))
    };

    let output = commands::execute(&authority, args.command).await?;
    pretty(&output)
}

async fn connect_pool(database_url: &str, max_connections: u32) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Storage(format!("failed to connect to database: {error}")))?;

    info!(max_connections, "connected to database");
    Ok(pool)
}

fn pretty<T: Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|error| AppError::Internal(format!("failed to render output: {error}")))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use warrant_core::AppError;

    use super::pretty;

    #[test]
    fn unrenderable_output_is_an_internal_error() {
        let output = BTreeMap::from([((1, 2), "pair keys are not valid JSON keys")]);

        assert!(matches!(pretty(&output), Err(AppError::Internal(_))));
    }

    #[test]
    fn output_is_pretty_printed_json() {
        let rendered = pretty(&serde_json::json!({ "status": "ok" }));

        assert_eq!(rendered, Ok("{\n  \"status\": \"ok\"\n}".to_owned()));
    }
}
