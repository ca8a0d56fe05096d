//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.perch.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `PERCH_PR_URL`, `PERCH_TOKEN`, or legacy
//!    `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--pr-url`/`-u` and `--token`/`-t`
//!
//! # Configuration File
//!
//! Place `.perch.toml` in the current directory, home directory, or
//! XDG config directory with:
//!
//! ```toml
//! pr_url = "https://github.com/owner/repo/pull/123"
//! token = "ghp_example"
//! owner = "octocat"
//! repo = "hello-world"
//! database_url = "perch.sqlite"
//! username = "octocat"
//! nitpick_markers = ["nitpick", "nit:"]
//! ```

use std::env;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::github::GithubError;
use crate::review::{WriteCredentialStore, WriteIdentity};

/// Operation mode determined by CLI arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Run pending database migrations and exit.
    MigrateDatabase,
    /// Render the enriched detail view for a single PR by URL.
    PullRequestDetail,
    /// Render the attention-ordered worklist for a repository.
    RepositoryWorklist,
    /// No runnable operation could be derived from the configuration.
    Unconfigured,
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `PERCH_PR_URL` or `--pr-url`: Pull request URL
/// - `PERCH_TOKEN`, `GITHUB_TOKEN`, or `--token`: Authentication token
/// - `PERCH_OWNER` or `--owner`: Repository owner
/// - `PERCH_REPO` or `--repo`: Repository name
/// - `PERCH_DATABASE_URL` or `--database-url`: Local `SQLite` database path
/// - `PERCH_USERNAME` or `--username`: Acting login for write mutations
///
/// # Example
///
/// ```no_run
/// use perch::PerchConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = PerchConfig::load().expect("failed to load configuration");
/// let pr_url = config.require_pr_url().expect("PR URL required");
/// let token = config.resolve_token().expect("token required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "PERCH",
    discovery(
        dotfile_name = ".perch.toml",
        config_file_name = "perch.toml",
        app_name = "perch"
    )
)]
pub struct PerchConfig {
    /// GitHub pull request URL to load.
    ///
    /// Can be provided via:
    /// - CLI: `--pr-url <URL>` or `-u <URL>`
    /// - Environment: `PERCH_PR_URL`
    /// - Config file: `pr_url = "..."`
    #[ortho_config(cli_short = 'u')]
    pub pr_url: Option<String>,

    /// Personal access token for GitHub API authentication.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `PERCH_TOKEN` or `GITHUB_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Repository owner (e.g., "octocat").
    ///
    /// Can be provided via:
    /// - CLI: `--owner <OWNER>` or `-o <OWNER>`
    /// - Environment: `PERCH_OWNER`
    /// - Config file: `owner = "..."`
    #[ortho_config(cli_short = 'o')]
    pub owner: Option<String>,

    /// Repository name (e.g., "hello-world").
    ///
    /// Can be provided via:
    /// - CLI: `--repo <REPO>` or `-r <REPO>`
    /// - Environment: `PERCH_REPO`
    /// - Config file: `repo = "..."`
    #[ortho_config(cli_short = 'r')]
    pub repo: Option<String>,

    /// Local `SQLite` database URL/path used for persistence.
    ///
    /// Diesel uses a filesystem path for `SQLite` connections. The same value
    /// is also used by the Diesel CLI via `DATABASE_URL` when running
    /// migrations.
    ///
    /// Can be provided via:
    /// - CLI: `--database-url <PATH>`
    /// - Environment: `PERCH_DATABASE_URL`
    /// - Config file: `database_url = "..."`
    #[ortho_config()]
    pub database_url: Option<String>,

    /// Runs database migrations and exits.
    ///
    /// When set, Perch initialises the database at `database_url`, applies
    /// any pending Diesel migrations, records the schema version in
    /// telemetry, and exits without performing GitHub operations.
    ///
    /// Can be provided via:
    /// - CLI: `--migrate-db`
    /// - Environment: `PERCH_MIGRATE_DB`
    /// - Config file: `migrate_db = true`
    #[ortho_config()]
    pub migrate_db: bool,

    /// Authenticated GitHub login the configured token belongs to.
    ///
    /// Write mutations need to know who is acting: the draft toggle is
    /// restricted to the pull request author, so the coordinator compares
    /// this login against the PR author before mutating. Without it Perch
    /// stays read-only.
    ///
    /// Can be provided via:
    /// - CLI: `--username <LOGIN>`
    /// - Environment: `PERCH_USERNAME`
    /// - Config file: `username = "..."`
    #[ortho_config()]
    pub username: Option<String>,

    /// Markers that classify a bot-authored comment as a nitpick.
    ///
    /// Matched case-insensitively as substrings of the comment body. An
    /// explicitly empty list disables nitpick classification; leaving the
    /// field unset applies the built-in markers.
    ///
    /// Can be provided via:
    /// - CLI: `--nitpick-markers <MARKER>...`
    /// - Environment: `PERCH_NITPICK_MARKERS`
    /// - Config file: `nitpick_markers = ["nitpick", "nit:"]`
    #[ortho_config()]
    pub nitpick_markers: Option<Vec<String>>,
}

/// Markers applied when no `nitpick_markers` configuration is provided.
pub const DEFAULT_NITPICK_MARKERS: &[&str] = &["nitpick", "nit:"];

impl Default for PerchConfig {
    fn default() -> Self {
        Self {
            pr_url: None,
            token: None,
            owner: None,
            repo: None,
            database_url: None,
            migrate_db: false,
            username: None,
            nitpick_markers: None,
        }
    }
}

impl PerchConfig {
    /// Resolves the token from configuration or the legacy `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// For backward compatibility, if no token is provided via `PERCH_TOKEN`,
    /// the CLI, or a configuration file, this method falls back to reading
    /// `GITHUB_TOKEN` from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::MissingToken`] when no token source provides a
    /// value.
    pub fn resolve_token(&self) -> Result<String, GithubError> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .ok_or(GithubError::MissingToken)
    }

    /// Returns the pull request URL or an error if missing.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::MissingPullRequestUrl`] when no URL is
    /// configured.
    pub fn require_pr_url(&self) -> Result<&str, GithubError> {
        self.pr_url
            .as_deref()
            .ok_or(GithubError::MissingPullRequestUrl)
    }

    /// Determines the operation mode based on provided configuration.
    ///
    /// Migrations take priority so a `--migrate-db` invocation never reaches
    /// GitHub. A PR URL selects the detail view, owner plus repo select the
    /// worklist, and anything else is unconfigured.
    #[must_use]
    pub const fn operation_mode(&self) -> OperationMode {
        if self.migrate_db {
            OperationMode::MigrateDatabase
        } else if self.pr_url.is_some() {
            OperationMode::PullRequestDetail
        } else if self.owner.is_some() && self.repo.is_some() {
            OperationMode::RepositoryWorklist
        } else {
            OperationMode::Unconfigured
        }
    }

    /// Returns owner and repo if both are configured.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::Configuration`] when owner or repo is missing.
    pub fn require_repository_info(&self) -> Result<(&str, &str), GithubError> {
        match (&self.owner, &self.repo) {
            (Some(owner), Some(repo)) => Ok((owner.as_str(), repo.as_str())),
            (None, _) => Err(GithubError::Configuration {
                message: "repository owner is required (use --owner or -o)".to_owned(),
            }),
            (_, None) => Err(GithubError::Configuration {
                message: "repository name is required (use --repo or -r)".to_owned(),
            }),
        }
    }

    /// Returns the effective nitpick marker list.
    ///
    /// Configured markers win; an unset field falls back to
    /// [`DEFAULT_NITPICK_MARKERS`].
    #[must_use]
    pub fn resolve_nitpick_markers(&self) -> Vec<String> {
        self.nitpick_markers.clone().unwrap_or_else(|| {
            DEFAULT_NITPICK_MARKERS
                .iter()
                .map(|marker| (*marker).to_owned())
                .collect()
        })
    }
}

impl WriteCredentialStore for PerchConfig {
    fn write_identity(&self) -> Option<WriteIdentity> {
        if self.resolve_token().is_err() {
            return None;
        }
        self.username
            .clone()
            .map(|username| WriteIdentity { username })
    }
}

#[cfg(test)]
mod tests;
