use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::error::SqlTypegenError;

/// Supplies connections to a [`crate::Database`].
///
/// Each acquisition is scoped: the connection is released (returned to its pool
/// or closed) when the [`ScopedConnection`] drops, on every exit path.
pub trait ConnectionSource: Send + Sync {
    /// # Errors
    /// Returns `SqlTypegenError` if no connection can be obtained.
    fn acquire(&self) -> Result<ScopedConnection, SqlTypegenError>;

    /// Short description for diagnostics.
    fn describe(&self) -> String;
}

/// A connection held for the duration of one operation.
pub enum ScopedConnection {
    Pooled(PooledConnection<SqliteConnectionManager>),
    Owned(Connection),
}

impl Deref for ScopedConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        match self {
            ScopedConnection::Pooled(conn) => conn,
            ScopedConnection::Owned(conn) => conn,
        }
    }
}

impl DerefMut for ScopedConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        match self {
            ScopedConnection::Pooled(conn) => &mut *conn,
            ScopedConnection::Owned(conn) => conn,
        }
    }
}

impl fmt::Debug for ScopedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopedConnection::Pooled(_) => f.write_str("ScopedConnection::Pooled"),
            ScopedConnection::Owned(_) => f.write_str("ScopedConnection::Owned"),
        }
    }
}

impl ConnectionSource for Pool<SqliteConnectionManager> {
    fn acquire(&self) -> Result<ScopedConnection, SqlTypegenError> {
        Ok(ScopedConnection::Pooled(self.get()?))
    }

    fn describe(&self) -> String {
        let state = self.state();
        format!(
            "r2d2 SQLite pool ({} connections, {} idle)",
            state.connections, state.idle_connections
        )
    }
}

/// Opens a fresh connection to a database file on every acquisition.
#[derive(Debug, Clone)]
pub struct SqliteFileSource {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteFileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: Duration::from_secs(5),
        }
    }

    #[must_use]
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }
}

impl ConnectionSource for SqliteFileSource {
    fn acquire(&self) -> Result<ScopedConnection, SqlTypegenError> {
        let conn = Connection::open(&self.path).map_err(|e| {
            SqlTypegenError::ConnectionError(format!(
                "cannot open {}: {e}",
                self.path.display()
            ))
        })?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(ScopedConnection::Owned(conn))
    }

    fn describe(&self) -> String {
        format!("SQLite file {}", self.path.display())
    }
}
