//! Local persistence and database migrations.
//!
//! Perch keeps review thresholds and the reconciled pull request mirror in a
//! local `SQLite` database. The schema is managed with Diesel migrations so
//! the database can be created and upgraded consistently across machines.

mod error;
mod migrator;
mod pr_mirror;
mod settings_store;
mod sqlite;

pub use error::PersistenceError;
pub use migrator::{INITIAL_SCHEMA_VERSION, SchemaVersion, migrate_database};
pub use pr_mirror::{MirroredPullRequest, PullRequestMirror, SqlitePullRequestMirror};
pub use settings_store::SqliteSettingsStore;

#[cfg(test)]
pub use pr_mirror::MockPullRequestMirror;
