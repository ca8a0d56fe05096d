//! SQLite-backed store for global settings and per-repository thresholds.
//!
//! Reads implement [`ThresholdStore`] for the signal engine. Writes manage
//! the singleton settings row and per-repository override rows, with each
//! override field independently nullable so a repository can pin one
//! threshold while inheriting the other.

use diesel::OptionalExtension;
use diesel::QueryableByName;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Bool, Nullable, Text};

use crate::review::thresholds::{GlobalSettings, RepoThreshold, ThresholdStore};

use super::PersistenceError;
use super::sqlite::{establish_connection, map_query_error, map_write_error};

const GLOBAL_SETTINGS_TABLE: &str = "global_settings";
const REPO_THRESHOLDS_TABLE: &str = "repo_thresholds";

/// SQLite-backed settings store.
#[derive(Debug, Clone)]
pub struct SqliteSettingsStore {
    database_url: String,
}

impl SqliteSettingsStore {
    /// Creates a store targeting the configured `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::BlankDatabaseUrl`] when the URL is blank.
    pub fn new(database_url: impl Into<String>) -> Result<Self, PersistenceError> {
        let database_url_string = database_url.into();
        if database_url_string.trim().is_empty() {
            return Err(PersistenceError::BlankDatabaseUrl);
        }
        Ok(Self {
            database_url: database_url_string,
        })
    }

    /// Inserts or replaces the singleton global settings row.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the schema is missing or the write
    /// fails.
    pub fn set_global_settings(&self, settings: &GlobalSettings) -> Result<(), PersistenceError> {
        let mut connection = establish_connection(&self.database_url)?;

        sql_query(
            "INSERT INTO global_settings \
             (id, required_review_count, urgency_days, stale_signal_enabled, ci_signal_enabled) \
             VALUES (1, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
               required_review_count = excluded.required_review_count, \
               urgency_days = excluded.urgency_days, \
               stale_signal_enabled = excluded.stale_signal_enabled, \
               ci_signal_enabled = excluded.ci_signal_enabled, \
               updated_at = CURRENT_TIMESTAMP;",
        )
        .bind::<BigInt, _>(i64::from(settings.required_review_count))
        .bind::<BigInt, _>(i64::from(settings.urgency_days))
        .bind::<Bool, _>(settings.stale_signal_enabled)
        .bind::<Bool, _>(settings.ci_signal_enabled)
        .execute(&mut connection)
        .map(drop)
        .map_err(|error| map_write_error(&mut connection, GLOBAL_SETTINGS_TABLE, &error))
    }

    /// Inserts or replaces the override row for one repository.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the schema is missing or the write
    /// fails.
    pub fn set_repo_threshold(
        &self,
        repository: &str,
        threshold: &RepoThreshold,
    ) -> Result<(), PersistenceError> {
        let mut connection = establish_connection(&self.database_url)?;

        sql_query(
            "INSERT INTO repo_thresholds (repository, required_review_count, urgency_days) \
             VALUES (?, ?, ?) \
             ON CONFLICT(repository) DO UPDATE SET \
               required_review_count = excluded.required_review_count, \
               urgency_days = excluded.urgency_days, \
               updated_at = CURRENT_TIMESTAMP;",
        )
        .bind::<Text, _>(repository)
        .bind::<Nullable<BigInt>, _>(threshold.required_review_count.map(i64::from))
        .bind::<Nullable<BigInt>, _>(threshold.urgency_days.map(i64::from))
        .execute(&mut connection)
        .map(drop)
        .map_err(|error| map_write_error(&mut connection, REPO_THRESHOLDS_TABLE, &error))
    }

    /// Deletes the override row for one repository. Deleting an absent row
    /// is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the schema is missing or the write
    /// fails.
    pub fn delete_repo_threshold(&self, repository: &str) -> Result<(), PersistenceError> {
        let mut connection = establish_connection(&self.database_url)?;

        sql_query("DELETE FROM repo_thresholds WHERE repository = ?;")
            .bind::<Text, _>(repository)
            .execute(&mut connection)
            .map(drop)
            .map_err(|error| map_write_error(&mut connection, REPO_THRESHOLDS_TABLE, &error))
    }
}

impl ThresholdStore for SqliteSettingsStore {
    fn global_settings(&self) -> Result<Option<GlobalSettings>, PersistenceError> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(sql_type = BigInt)]
            required_review_count: i64,
            #[diesel(sql_type = BigInt)]
            urgency_days: i64,
            #[diesel(sql_type = Bool)]
            stale_signal_enabled: bool,
            #[diesel(sql_type = Bool)]
            ci_signal_enabled: bool,
        }

        let mut connection = establish_connection(&self.database_url)?;

        let result: Option<Row> = sql_query(
            "SELECT required_review_count, urgency_days, stale_signal_enabled, \
             ci_signal_enabled \
             FROM global_settings WHERE id = 1 LIMIT 1;",
        )
        .get_result(&mut connection)
        .optional()
        .map_err(|error| map_query_error(&mut connection, GLOBAL_SETTINGS_TABLE, &error))?;

        Ok(result.map(|row| GlobalSettings {
            required_review_count: stored_count(row.required_review_count),
            urgency_days: stored_count(row.urgency_days),
            stale_signal_enabled: row.stale_signal_enabled,
            ci_signal_enabled: row.ci_signal_enabled,
        }))
    }

    fn repo_threshold(&self, repository: &str) -> Result<Option<RepoThreshold>, PersistenceError> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(sql_type = Nullable<BigInt>)]
            required_review_count: Option<i64>,
            #[diesel(sql_type = Nullable<BigInt>)]
            urgency_days: Option<i64>,
        }

        let mut connection = establish_connection(&self.database_url)?;

        let result: Option<Row> = sql_query(
            "SELECT required_review_count, urgency_days FROM repo_thresholds \
             WHERE repository = ? LIMIT 1;",
        )
        .bind::<Text, _>(repository)
        .get_result(&mut connection)
        .optional()
        .map_err(|error| map_query_error(&mut connection, REPO_THRESHOLDS_TABLE, &error))?;

        Ok(result.map(|row| RepoThreshold {
            required_review_count: row.required_review_count.map(stored_count),
            urgency_days: row.urgency_days.map(stored_count),
        }))
    }
}

fn stored_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
