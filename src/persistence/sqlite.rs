//! Shared `SQLite` connection and error-mapping helpers.
//!
//! Every store in this module opens short-lived connections with foreign
//! keys enabled and maps Diesel failures through a schema-presence check so
//! an unmigrated database surfaces as
//! [`PersistenceError::SchemaNotInitialised`] rather than a raw query error.

use diesel::Connection;
use diesel::OptionalExtension;
use diesel::QueryableByName;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Text};
use diesel::sqlite::SqliteConnection;

use super::PersistenceError;

pub(super) fn establish_connection(
    database_url: &str,
) -> Result<SqliteConnection, PersistenceError> {
    let mut connection = SqliteConnection::establish(database_url).map_err(|error| {
        PersistenceError::ConnectionFailed {
            message: error.to_string(),
        }
    })?;

    sql_query("PRAGMA foreign_keys = ON;")
        .execute(&mut connection)
        .map(drop)
        .map_err(|error| PersistenceError::ForeignKeysEnableFailed {
            message: error.to_string(),
        })?;

    Ok(connection)
}

fn table_exists(
    connection: &mut SqliteConnection,
    table: &str,
) -> Result<bool, diesel::result::Error> {
    #[derive(Debug, QueryableByName)]
    struct Row {
        #[diesel(sql_type = BigInt)]
        one: i64,
    }

    let exists: Option<Row> =
        sql_query("SELECT 1 AS one FROM sqlite_master WHERE type = 'table' AND name = ? LIMIT 1;")
            .bind::<Text, _>(table)
            .get_result(connection)
            .optional()?;

    let _ = exists.as_ref().map(|row| row.one);
    Ok(exists.is_some())
}

fn map_error_with_schema_check<F>(
    connection: &mut SqliteConnection,
    table: &str,
    error: &diesel::result::Error,
    create_error: F,
) -> PersistenceError
where
    F: Fn(String) -> PersistenceError,
{
    match table_exists(connection, table) {
        Ok(false) => PersistenceError::SchemaNotInitialised,
        Ok(true) => create_error(error.to_string()),
        Err(check_error) => create_error(format!(
            "schema presence check failed: {check_error}; original error: {error}"
        )),
    }
}

pub(super) fn map_query_error(
    connection: &mut SqliteConnection,
    table: &str,
    error: &diesel::result::Error,
) -> PersistenceError {
    map_error_with_schema_check(connection, table, error, |message| {
        PersistenceError::QueryFailed { message }
    })
}

pub(super) fn map_write_error(
    connection: &mut SqliteConnection,
    table: &str,
    error: &diesel::result::Error,
) -> PersistenceError {
    map_error_with_schema_check(connection, table, error, |message| {
        PersistenceError::WriteFailed { message }
    })
}
