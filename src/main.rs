//! Perch CLI entrypoint for the pull request review worklist.

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use perch::{GithubError, OperationMode, PerchConfig};

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), GithubError> {
    let config = load_config()?;

    match config.operation_mode() {
        OperationMode::MigrateDatabase => cli::migrations::run(&config),
        OperationMode::PullRequestDetail => cli::single_pr::run(&config).await,
        OperationMode::RepositoryWorklist => cli::repository_listing::run(&config).await,
        OperationMode::Unconfigured => Err(GithubError::Configuration {
            message: "nothing to do: pass --pr-url for a detail view, \
                      --owner and --repo for a worklist, or --migrate-db"
                .to_owned(),
        }),
    }
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`GithubError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<PerchConfig, GithubError> {
    PerchConfig::load().map_err(|error| GithubError::Configuration {
        message: error.to_string(),
    })
}
