use rusqlite::ErrorCode;
use thiserror::Error;

/// Message shared by every authentication failure, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "invalid email or password";

pub type DbResult<T> = Result<T, DbError>;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("cannot reach database: {0}")]
    Connection(#[source] rusqlite::Error),

    #[error("query failed: {0}")]
    Query(#[source] rusqlite::Error),

    /// A statement inside a cascading delete failed. The transaction has
    /// already been rolled back when this is returned.
    #[error("transaction rolled back: {0}")]
    Transaction(#[source] rusqlite::Error),

    #[error("{}", INVALID_CREDENTIALS)]
    Authentication,

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("database connection lock poisoned")]
    Poisoned,
}

impl DbError {
    /// Sort a read-path failure into connection or query trouble.
    pub(crate) fn classify(err: rusqlite::Error) -> Self {
        if is_connection_failure(&err) {
            DbError::Connection(err)
        } else {
            DbError::Query(err)
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, DbError::Connection(_) | DbError::Poisoned)
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        DbError::classify(err)
    }
}

fn is_connection_failure(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => matches!(
            e.code,
            ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::SystemIoFailure
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::PermissionDenied
        ),
        _ => false,
    }
}
