//! PostgreSQL adapters
//!
//! Implementations of the arena ports using SeaORM and PostgreSQL.

pub mod arena_store;
pub mod attendance_log;
pub mod member_roster;


pub use arena_store::{PostgresArenaStore, PostgresArenaTransaction};
pub use attendance_log::PostgresAttendanceLog;
pub use member_roster::PostgresMemberRoster;

use sea_orm::{DbErr, RuntimeErr, SqlErr};

use crate::error::DomainError;

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// SQLSTATE of a database-reported error, if any
fn sqlstate(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(e))
        | DbErr::Query(RuntimeErr::SqlxError(e))
        | DbErr::Conn(RuntimeErr::SqlxError(e)) => e
            .as_database_error()
            .and_then(|db| db.code())
            .map(|code| code.into_owned()),
        _ => None,
    }
}

/// Map a SeaORM error onto the domain taxonomy.
///
/// Lost races (unique violations, serialization failures, deadlocks, rows
/// that vanished before an update) become `Conflict` so the service can
/// retry them. Everything else is a `Database` fault.
pub(crate) fn map_db_err(err: DbErr) -> DomainError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return DomainError::Conflict(detail);
    }
    if matches!(err, DbErr::RecordNotUpdated) {
        return DomainError::Conflict("Row changed or vanished during update".to_string());
    }
    match sqlstate(&err).as_deref() {
        Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => {
            DomainError::Conflict(err.to_string())
        }
        _ => DomainError::Database(err.to_string()),
    }
}
