// ABOUTME: Error types for the data-access layer
// ABOUTME: Splits driver failures into connection problems and query problems

use thiserror::Error;

/// Data-access failures. The presentation layer only ever distinguishes
/// "could not reach or log into the server" from "a read went wrong".
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Query failed: {0}")]
    DataAccess(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    pub fn is_connection(&self) -> bool {
        matches!(self, DbError::Connection(_))
    }
}

/// SQLSTATE values that mean the session itself is unusable:
/// class 08 (connection exception), class 28 (invalid authorization),
/// 57P01..57P03 (server shutting down or not yet accepting connections)
/// and 3D000 (database does not exist).
fn is_connection_sqlstate(code: &str) -> bool {
    code.starts_with("08")
        || code.starts_with("28")
        || code.starts_with("57P0")
        || code == "3D000"
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let msg = err.to_string();
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => DbError::Connection(msg),
            sqlx::Error::Database(db_err) => match db_err.code() {
                Some(code) if is_connection_sqlstate(&code) => DbError::Connection(msg),
                _ => DbError::DataAccess(msg),
            },
            _ => DbError::DataAccess(msg),
        }
    }
}
