//! Database migration operations.

use perch::persistence::{PersistenceError, migrate_database};
use perch::telemetry::StderrJsonlTelemetrySink;
use perch::{GithubError, PerchConfig};

/// Runs database migrations.
///
/// # Errors
///
/// Returns [`GithubError::Configuration`] if the database URL is missing or
/// blank. Returns [`GithubError::Io`] for connection or migration failures.
pub fn run(config: &PerchConfig) -> Result<(), GithubError> {
    let database_url =
        config
            .database_url
            .as_deref()
            .ok_or_else(|| GithubError::Configuration {
                message: PersistenceError::MissingDatabaseUrl.to_string(),
            })?;

    let telemetry = StderrJsonlTelemetrySink;
    migrate_database(database_url, &telemetry)
        .map(drop)
        .map_err(|error| map_persistence_error(&error))
}

/// Maps a persistence error to a CLI-facing error.
///
/// Configuration-related errors (blank URL) become
/// [`GithubError::Configuration`], while runtime errors (connection,
/// migration, query failures) become [`GithubError::Io`].
fn map_persistence_error(error: &PersistenceError) -> GithubError {
    if is_configuration_error(error) {
        GithubError::Configuration {
            message: error.to_string(),
        }
    } else {
        GithubError::Io {
            message: error.to_string(),
        }
    }
}

/// Returns true if the persistence error is a configuration problem.
const fn is_configuration_error(error: &PersistenceError) -> bool {
    matches!(error, PersistenceError::BlankDatabaseUrl)
}
