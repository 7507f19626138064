// Database module - transactional statement execution over a connection source
//
// - events: SqlEvent broadcast to registered listeners
// - execute: update/query/value-of execution, on a scoped or supplied connection
// - transaction: transact / use_transaction / process_transaction
// - xact: the same execution surface pinned to one transaction's connection

mod events;
mod execute;
mod transaction;
mod xact;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use rusqlite::Connection;
use tracing::debug;

pub use events::{SqlEvent, SqlEventListener};
pub use transaction::TransactionResult;
pub use xact::Xact;

pub(crate) use events::caller_location;

use crate::customisations::Customisations;
use crate::error::SqlTypegenError;
use crate::parametrise::replace_table_names;
use crate::pool::ConnectionSource;
use crate::types::Backend;

/// Executes statements against a [`ConnectionSource`].
///
/// Safe to share between threads; every top-level call acquires its own
/// connection for its duration. The listener list and key-column cache are the
/// only shared mutable state.
pub struct Database {
    source: Arc<dyn ConnectionSource>,
    customisations: Arc<dyn Customisations>,
    table_prefix: String,
    listeners: RwLock<Vec<Arc<dyn SqlEventListener>>>,
    key_columns: RwLock<HashMap<String, Arc<[String]>>>,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("source", &self.source.describe())
            .field("customisations", &self.customisations)
            .field("table_prefix", &self.table_prefix)
            .finish_non_exhaustive()
    }
}

impl Database {
    #[must_use]
    pub fn builder(source: impl ConnectionSource + 'static) -> DatabaseBuilder {
        DatabaseBuilder::new(source)
    }

    #[must_use]
    pub fn customisations(&self) -> &dyn Customisations {
        self.customisations.as_ref()
    }

    #[must_use]
    pub fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    /// Replace `$$` in `sql` with this database's table-name prefix.
    #[must_use]
    pub fn replace_table_names(&self, sql: &str) -> String {
        replace_table_names(sql, &self.table_prefix)
    }

    /// Register a listener for every subsequently executed statement.
    pub fn add_sql_event_listener(&self, listener: impl SqlEventListener + 'static) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    pub(crate) fn emit(&self, location: &str, sql_text: &str) {
        debug!(location, sql = sql_text, "executed");
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if listeners.is_empty() {
            return;
        }
        let event = SqlEvent {
            location: location.to_string(),
            sql_text: sql_text.to_string(),
        };
        for listener in &listeners {
            listener.on_sql_event(&event);
        }
    }

    /// Run `body` with a connection held for its duration.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` if acquisition fails, or whatever `body` returns.
    pub fn with_connection<R>(
        &self,
        body: impl FnOnce(&mut Connection) -> Result<R, SqlTypegenError>,
    ) -> Result<R, SqlTypegenError> {
        let mut conn = self.source.acquire()?;
        body(&mut *conn)
    }

    /// Primary-key column names of `table`, in key order. Empty if the table declares no key.
    ///
    /// Results are cached per table for the life of the `Database`.
    ///
    /// # Errors
    /// Returns `SqlTypegenError::KeyColumnsUnresolved` if the table does not exist.
    #[track_caller]
    pub fn key_column_names(&self, table: &str) -> Result<Arc<[String]>, SqlTypegenError> {
        let location = caller_location();
        if let Some(cached) = self.cached_key_columns(table) {
            return Ok(cached);
        }
        self.with_connection(|conn| self.load_key_columns(conn, table, &location))
    }

    /// [`Database::key_column_names`] on a supplied connection.
    ///
    /// # Errors
    /// Returns `SqlTypegenError::KeyColumnsUnresolved` if the table does not exist.
    #[track_caller]
    pub fn key_column_names_on(
        &self,
        conn: &Connection,
        table: &str,
    ) -> Result<Arc<[String]>, SqlTypegenError> {
        let location = caller_location();
        match self.cached_key_columns(table) {
            Some(cached) => Ok(cached),
            None => self.load_key_columns(conn, table, &location),
        }
    }

    fn cached_key_columns(&self, table: &str) -> Option<Arc<[String]>> {
        self.key_columns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&self.replace_table_names(table))
            .cloned()
    }

    fn load_key_columns(
        &self,
        conn: &Connection,
        table: &str,
        location: &str,
    ) -> Result<Arc<[String]>, SqlTypegenError> {
        const SQL: &str = "SELECT name, pk FROM pragma_table_info(?1)";
        let table = self.replace_table_names(table);
        let mut stmt = conn.prepare_cached(SQL)?;
        let mut columns: Vec<(i64, String)> = stmt
            .query_map(rusqlite::params![table], |row| {
                Ok((row.get::<_, i64>(1)?, row.get::<_, String>(0)?))
            })?
            .collect::<Result<_, _>>()?;
        self.emit(location, SQL);
        if columns.is_empty() {
            return Err(SqlTypegenError::KeyColumnsUnresolved {
                table,
                reason: "no such table".to_string(),
            });
        }
        columns.retain(|(pk, _)| *pk > 0);
        columns.sort_by_key(|(pk, _)| *pk);
        let keys: Arc<[String]> = columns.into_iter().map(|(_, name)| name).collect();
        self.key_columns
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(table, Arc::clone(&keys));
        Ok(keys)
    }
}

/// Builds a [`Database`] around a caller-supplied connection source.
///
/// ```rust,no_run
/// use sql_typegen::prelude::*;
///
/// let db = Database::builder(SqliteFileSource::new("app.db"))
///     .table_prefix("app_")
///     .backend(Backend::Sqlite)
///     .listener(|event: &SqlEvent| println!("{event}"))
///     .build();
/// # let _ = db;
/// ```
pub struct DatabaseBuilder {
    source: Arc<dyn ConnectionSource>,
    customisations: Arc<dyn Customisations>,
    table_prefix: String,
    listeners: Vec<Arc<dyn SqlEventListener>>,
}

impl DatabaseBuilder {
    #[must_use]
    pub fn new(source: impl ConnectionSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
            customisations: Backend::default().customisations(),
            table_prefix: String::new(),
            listeners: Vec::new(),
        }
    }

    #[must_use]
    pub fn customisations(mut self, customisations: Arc<dyn Customisations>) -> Self {
        self.customisations = customisations;
        self
    }

    #[must_use]
    pub fn backend(mut self, backend: Backend) -> Self {
        self.customisations = backend.customisations();
        self
    }

    #[must_use]
    pub fn table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn listener(mut self, listener: impl SqlEventListener + 'static) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    #[must_use]
    pub fn build(self) -> Database {
        Database {
            source: self.source,
            customisations: self.customisations,
            table_prefix: self.table_prefix,
            listeners: RwLock::new(self.listeners),
            key_columns: RwLock::new(HashMap::new()),
        }
    }
}
