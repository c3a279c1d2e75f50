//! Data access for the darkroom admin console.
//!
//! One long-lived SQLite connection is owned by [`Database`] and shared behind
//! a mutex. Reads map rows into the plain structs in [`models`]; deletes that
//! touch several tables run as a single immediate transaction (see
//! [`cascade`]).

pub mod auth;
pub mod cascade;
pub mod error;
pub mod migrations;
pub mod models;
pub mod queries;

use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};

pub use error::{DbError, DbResult};

/// Opaque connection parameters handed in by whoever bootstraps the process.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub path: PathBuf,
    pub busy_timeout: Duration,
}

impl ConnectOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

pub struct Database {
    conn: Mutex<Connection>,
    label: String,
}

impl Database {
    pub fn open(options: &ConnectOptions) -> DbResult<Self> {
        let conn = Connection::open(&options.path).map_err(DbError::Connection)?;
        conn.busy_timeout(options.busy_timeout)
            .map_err(DbError::Connection)?;

        // WAL so list screens don't block on the service's own writers
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(DbError::Connection)?;

        let db = Self::init(conn, options.path.display().to_string())?;
        info!("Database opened at {}", options.path.display());
        Ok(db)
    }

    /// Open a private in-memory database (tests and local demos).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory().map_err(DbError::Connection)?;
        Self::init(conn, ":memory:".into())
    }

    fn init(conn: Connection, label: String) -> DbResult<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(DbError::Connection)?;
        migrations::run(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            label,
        })
    }

    pub fn path(&self) -> &str {
        &self.label
    }

    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let conn = self.conn.lock().map_err(|_| DbError::Poisoned)?;
        f(&conn)
    }

    /// Exclusive access, needed to start a transaction.
    pub fn with_conn_mut<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&mut Connection) -> DbResult<T>,
    {
        let mut conn = self.conn.lock().map_err(|_| DbError::Poisoned)?;
        f(&mut conn)
    }

    /// Close the connection and report any failure. Dropping a `Database`
    /// also closes it, silently.
    pub fn close(self) -> DbResult<()> {
        let label = self.label;
        let conn = match self.conn.into_inner() {
            Ok(conn) => conn,
            Err(poisoned) => {
                warn!("Closing {} after a poisoned lock", label);
                poisoned.into_inner()
            }
        };

        conn.close().map_err(|(_, e)| DbError::Connection(e))?;
        info!("Database {} closed", label);
        Ok(())
    }
}
