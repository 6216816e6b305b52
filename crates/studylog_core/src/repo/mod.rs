//! Storage capability contracts and their two backends.
//!
//! # Responsibility
//! - Define the narrow get/put/delete/range-query surface the services need.
//! - Provide a durable SQLite backend and an ephemeral in-memory backend with
//!   identical observable behavior.
//!
//! # Invariants
//! - Items are addressed only by the composite key `(owner_id, item_id)`;
//!   a ranged list under one owner never yields another owner's items.
//! - Repositories report missing rows as `None`/`false`, never as errors.
//!   Turning absence into domain errors is the services' job.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use rusqlite::Connection;

pub mod item_repo;
pub mod memory;
pub mod owner_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Opaque storage failure.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    /// Insert hit an existing primary or unique key.
    #[error("duplicate key: {0}")]
    Duplicate(String),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    #[error("repository requires schema version {expected_version}, got {actual_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Maps unique/primary-key violations to [`RepoError::Duplicate`]. Other
/// constraint failures (CHECK, NOT NULL) stay opaque storage errors.
pub(crate) fn duplicate_or_db(err: rusqlite::Error, key: impl Into<String>) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if matches!(
                failure.extended_code,
                rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            ) =>
        {
            RepoError::Duplicate(key.into())
        }
        _ => err.into(),
    }
}

/// Rejects connections that have not been migrated to this binary's schema.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
