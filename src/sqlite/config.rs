use std::time::Duration;

use r2d2_sqlite::SqliteConnectionManager;
use serde::Deserialize;
use tracing::info;

use crate::database::Database;
use crate::error::SqlTypegenError;
use crate::types::Backend;

/// Options for a pooled `SQLite` [`Database`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SqliteOptions {
    pub db_path: String,
    pub pool_size: u32,
    /// Switch the database to WAL journal mode on every new connection
    pub wal: bool,
    #[serde(with = "millis")]
    pub busy_timeout: Duration,
    /// Replaces `$$` in all SQL text
    pub table_prefix: String,
    pub backend: Backend,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            db_path,
            pool_size: 4,
            wal: true,
            busy_timeout: Duration::from_secs(5),
            table_prefix: String::new(),
            backend: Backend::Sqlite,
        }
    }

    /// Open the pool and wrap it in a [`Database`].
    ///
    /// # Errors
    ///
    /// Returns `SqlTypegenError` if the path is empty, pool creation fails, or the
    /// initial smoke test fails.
    pub fn build(self) -> Result<Database, SqlTypegenError> {
        if self.db_path.is_empty() {
            return Err(SqlTypegenError::ConfigError(
                "SQLite database path is empty".to_string(),
            ));
        }
        let wal = self.wal;
        let busy_timeout = self.busy_timeout;
        let manager = SqliteConnectionManager::file(&self.db_path).with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            if wal {
                conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            }
            Ok(())
        });
        let pool = r2d2::Pool::builder()
            .max_size(self.pool_size.max(1))
            .build(manager)?;

        {
            let conn = pool.get()?;
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map_err(|e| {
                    SqlTypegenError::ConnectionError(format!(
                        "SQLite smoke test failed for {}: {e}",
                        self.db_path
                    ))
                })?;
        }
        info!(path = %self.db_path, pool_size = self.pool_size, "SQLite pool ready");

        Ok(Database::builder(pool)
            .backend(self.backend)
            .table_prefix(self.table_prefix)
            .build())
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            opts: SqliteOptions::new(db_path.into()),
        }
    }

    #[must_use]
    pub fn pool_size(mut self, pool_size: u32) -> Self {
        self.opts.pool_size = pool_size;
        self
    }

    #[must_use]
    pub fn wal(mut self, wal: bool) -> Self {
        self.opts.wal = wal;
        self
    }

    #[must_use]
    pub fn busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.opts.busy_timeout = busy_timeout;
        self
    }

    #[must_use]
    pub fn table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.opts.table_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn backend(mut self, backend: Backend) -> Self {
        self.opts.backend = backend;
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    /// Build a pooled [`Database`].
    ///
    /// # Errors
    ///
    /// Returns `SqlTypegenError` if pool creation or the initial smoke test fails.
    pub fn build(self) -> Result<Database, SqlTypegenError> {
        self.finish().build()
    }
}

impl Database {
    #[must_use]
    pub fn sqlite_builder(db_path: impl Into<String>) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(db_path)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: SqliteOptions =
            serde_json::from_str(r#"{"db_path": "x.db", "busy_timeout": 250, "backend": "standard"}"#)
                .unwrap();
        assert_eq!(opts.db_path, "x.db");
        assert_eq!(opts.busy_timeout, Duration::from_millis(250));
        assert_eq!(opts.backend, Backend::Standard);
        assert_eq!(opts.pool_size, 4);
        assert!(opts.wal);
    }

    #[test]
    fn empty_path_is_a_config_error() {
        let err = SqliteOptions::default().build().unwrap_err();
        assert!(matches!(err, SqlTypegenError::ConfigError(_)));
    }
}
