//! Local mirror of reconciled pull requests.
//!
//! The mirror holds the last authoritative state seen for a pull request
//! after a background reconciliation. Rows are keyed by repository full name
//! and number, and every reconciliation replaces the row wholesale.

use diesel::OptionalExtension;
use diesel::QueryableByName;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Bool, Nullable, Text};

use crate::github::models::PullRequest;

use super::PersistenceError;
use super::sqlite::{establish_connection, map_query_error, map_write_error};

const PULL_REQUEST_MIRROR_TABLE: &str = "pull_request_mirror";

/// Port for persisting reconciled pull requests locally.
#[cfg_attr(test, mockall::automock)]
pub trait PullRequestMirror: Send + Sync {
    /// Inserts or replaces the mirrored row for the pull request.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the schema is missing or the write
    /// fails.
    fn record(&self, pull_request: &PullRequest) -> Result<(), PersistenceError>;
}

/// A mirrored pull request row as stored locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredPullRequest {
    /// Repository full name in `owner/repo` form.
    pub repository: String,
    /// Pull request number.
    pub number: u64,
    /// Lifecycle state name at the last reconciliation.
    pub state: Option<String>,
    /// Draft flag at the last reconciliation.
    pub draft: bool,
    /// Head commit SHA at the last reconciliation.
    pub head_sha: Option<String>,
    /// RFC 3339 timestamp of the last recorded activity, if known.
    pub last_activity_at: Option<String>,
}

/// SQLite-backed pull request mirror.
#[derive(Debug, Clone)]
pub struct SqlitePullRequestMirror {
    database_url: String,
}

impl SqlitePullRequestMirror {
    /// Creates a mirror targeting the configured `database_url`.
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

    /// Loads the mirrored row for one pull request, if recorded.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the schema is missing or the query
    /// fails.
    pub fn load(
        &self,
        repository: &str,
        number: u64,
    ) -> Result<Option<MirroredPullRequest>, PersistenceError> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(sql_type = Nullable<Text>)]
            state: Option<String>,
            #[diesel(sql_type = Bool)]
            draft: bool,
            #[diesel(sql_type = Nullable<Text>)]
            head_sha: Option<String>,
            #[diesel(sql_type = Nullable<Text>)]
            last_activity_at: Option<String>,
        }

        let mut connection = establish_connection(&self.database_url)?;

        let result: Option<Row> = sql_query(
            "SELECT state, draft, head_sha, last_activity_at FROM pull_request_mirror \
             WHERE repository = ? AND pr_number = ? LIMIT 1;",
        )
        .bind::<Text, _>(repository)
        .bind::<BigInt, _>(number_to_i64(number))
        .get_result(&mut connection)
        .optional()
        .map_err(|error| map_query_error(&mut connection, PULL_REQUEST_MIRROR_TABLE, &error))?;

        Ok(result.map(|row| MirroredPullRequest {
            repository: repository.to_owned(),
            number,
            state: row.state,
            draft: row.draft,
            head_sha: row.head_sha,
            last_activity_at: row.last_activity_at,
        }))
    }
}

impl PullRequestMirror for SqlitePullRequestMirror {
    fn record(&self, pull_request: &PullRequest) -> Result<(), PersistenceError> {
        let mut connection = establish_connection(&self.database_url)?;

        sql_query(
            "INSERT INTO pull_request_mirror \
             (repository, pr_number, state, draft, head_sha, last_activity_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(repository, pr_number) DO UPDATE SET \
               state = excluded.state, \
               draft = excluded.draft, \
               head_sha = excluded.head_sha, \
               last_activity_at = excluded.last_activity_at, \
               updated_at = CURRENT_TIMESTAMP;",
        )
        .bind::<Text, _>(&pull_request.repository)
        .bind::<BigInt, _>(number_to_i64(pull_request.number))
        .bind::<Nullable<Text>, _>(Some(pull_request.state.as_str()))
        .bind::<Bool, _>(pull_request.draft)
        .bind::<Nullable<Text>, _>(Some(pull_request.head_sha.as_str()))
        .bind::<Nullable<Text>, _>(
            pull_request
                .last_activity_at
                .map(|timestamp| timestamp.to_rfc3339()),
        )
        .execute(&mut connection)
        .map(drop)
        .map_err(|error| map_write_error(&mut connection, PULL_REQUEST_MIRROR_TABLE, &error))
    }
}

fn number_to_i64(number: u64) -> i64 {
    i64::try_from(number).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::{PullRequestMirror, SqlitePullRequestMirror};
    use crate::github::models::PullRequestState;
    use crate::github::models::test_support::pull_request;
    use crate::persistence::{PersistenceError, migrate_database};
    use crate::telemetry::NoopTelemetrySink;

    #[fixture]
    fn temp_db() -> (TempDir, String) {
        let temp_dir =
            TempDir::new().unwrap_or_else(|error| panic!("temp dir should be created: {error}"));
        let db_path = temp_dir.path().join("perch.sqlite");
        (temp_dir, db_path.to_string_lossy().to_string())
    }

    #[fixture]
    fn migrated_mirror(temp_db: (TempDir, String)) -> (TempDir, SqlitePullRequestMirror) {
        let (temp_dir, database_url) = temp_db;
        migrate_database(&database_url, &NoopTelemetrySink)
            .unwrap_or_else(|error| panic!("migrations should run: {error}"));

        let mirror = SqlitePullRequestMirror::new(database_url)
            .unwrap_or_else(|error| panic!("mirror should build: {error}"));
        (temp_dir, mirror)
    }

    fn activity() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-02-01T12:00:00Z")
            .unwrap_or_else(|error| panic!("timestamp should parse: {error}"))
            .with_timezone(&Utc)
    }

    #[rstest]
    fn record_round_trips_the_mirrored_row(migrated_mirror: (TempDir, SqlitePullRequestMirror)) {
        let (_temp_dir, mirror) = migrated_mirror;
        let mut reconciled = pull_request("acme/widgets", 7);
        reconciled.draft = true;
        reconciled.state = PullRequestState::Open;
        reconciled.last_activity_at = Some(activity());

        mirror
            .record(&reconciled)
            .unwrap_or_else(|error| panic!("record should succeed: {error}"));

        let stored = mirror
            .load("acme/widgets", 7)
            .unwrap_or_else(|error| panic!("load should succeed: {error}"))
            .unwrap_or_else(|| panic!("row should exist"));
        assert_eq!(stored.state.as_deref(), Some("open"));
        assert!(stored.draft);
        assert_eq!(stored.head_sha.as_deref(), Some("head000"));
        assert_eq!(
            stored.last_activity_at.as_deref(),
            Some("2026-02-01T12:00:00+00:00")
        );
    }

    #[rstest]
    fn record_replaces_the_existing_row(migrated_mirror: (TempDir, SqlitePullRequestMirror)) {
        let (_temp_dir, mirror) = migrated_mirror;
        let mut reconciled = pull_request("acme/widgets", 7);
        reconciled.draft = true;
        mirror
            .record(&reconciled)
            .unwrap_or_else(|error| panic!("record should succeed: {error}"));

        reconciled.draft = false;
        reconciled.state = PullRequestState::Merged;
        mirror
            .record(&reconciled)
            .unwrap_or_else(|error| panic!("record should succeed: {error}"));

        let stored = mirror
            .load("acme/widgets", 7)
            .unwrap_or_else(|error| panic!("load should succeed: {error}"))
            .unwrap_or_else(|| panic!("row should exist"));
        assert!(!stored.draft);
        assert_eq!(stored.state.as_deref(), Some("merged"));
    }

    #[rstest]
    fn missing_rows_load_as_none(migrated_mirror: (TempDir, SqlitePullRequestMirror)) {
        let (_temp_dir, mirror) = migrated_mirror;

        let stored = mirror
            .load("acme/widgets", 99)
            .unwrap_or_else(|error| panic!("load should succeed: {error}"));

        assert_eq!(stored, None);
    }

    #[rstest]
    fn unmigrated_database_reports_missing_schema(temp_db: (TempDir, String)) {
        let (_temp_dir, database_url) = temp_db;
        let mirror = SqlitePullRequestMirror::new(database_url)
            .unwrap_or_else(|error| panic!("mirror should build: {error}"));

        let error = mirror
            .record(&pull_request("acme/widgets", 7))
            .expect_err("unmigrated database should fail");

        assert_eq!(error, PersistenceError::SchemaNotInitialised);
    }
}
