use std::ops::ControlFlow;
use std::sync::Arc;

use rusqlite::Connection;

use super::{Database, caller_location};
use crate::error::SqlTypegenError;
use crate::results::{Decoded, ResultSet, TupleList, UpdatableTuple};
use crate::statement::{QueryStatement, UpdateStatement, ValueOfStatement};
use crate::types::DbValue;

/// Execution context pinned to the connection of one open transaction.
///
/// Every call runs on that connection, so work done through an `Xact` commits
/// or rolls back together. Calls must not be issued concurrently on one `Xact`.
#[derive(Debug, Clone, Copy)]
pub struct Xact<'a> {
    database: &'a Database,
    connection: &'a Connection,
}

impl<'a> Xact<'a> {
    pub(crate) fn new(database: &'a Database, connection: &'a Connection) -> Self {
        Self {
            database,
            connection,
        }
    }

    #[must_use]
    pub fn database(&self) -> &'a Database {
        self.database
    }

    #[must_use]
    pub fn connection(&self) -> &'a Connection {
        self.connection
    }

    /// # Errors
    /// See [`Database::update`].
    #[track_caller]
    pub fn update<S: UpdateStatement + ?Sized>(
        &self,
        statement: &S,
    ) -> Result<usize, SqlTypegenError> {
        self.database
            .run_update(self.connection, statement, &caller_location())
    }

    /// # Errors
    /// See [`Database::query`].
    #[track_caller]
    pub fn query<S: QueryStatement + ?Sized>(
        &self,
        statement: &S,
    ) -> Result<TupleList<S::Tuple>, SqlTypegenError> {
        self.database
            .run_query(self.connection, statement, &caller_location())
    }

    /// # Errors
    /// See [`Database::query_first`].
    #[track_caller]
    pub fn query_first<S: QueryStatement + ?Sized>(
        &self,
        statement: &S,
    ) -> Result<Option<Decoded<S::Tuple>>, SqlTypegenError> {
        self.database
            .run_query_first(self.connection, statement, &caller_location())
    }

    /// # Errors
    /// See [`Database::query_stream`].
    #[track_caller]
    pub fn query_stream<S: QueryStatement + ?Sized>(
        &self,
        statement: &S,
        consumer: impl FnMut(Decoded<S::Tuple>) -> ControlFlow<()>,
    ) -> Result<usize, SqlTypegenError> {
        self.database
            .run_query_stream(self.connection, statement, &caller_location(), consumer)
    }

    /// # Errors
    /// See [`Database::query_for_update`].
    #[track_caller]
    pub fn query_for_update<S: QueryStatement + ?Sized>(
        &self,
        statement: &S,
    ) -> Result<Vec<UpdatableTuple<'a, S::Tuple>>, SqlTypegenError> {
        self.database
            .run_query_for_update(self.connection, statement, &caller_location())
    }

    /// # Errors
    /// See [`Database::value_of`].
    #[track_caller]
    pub fn value_of<S: ValueOfStatement + ?Sized>(
        &self,
        statement: &S,
    ) -> Result<Option<S::Value>, SqlTypegenError> {
        self.database
            .run_value_of(self.connection, statement, &caller_location())
    }

    /// # Errors
    /// See [`Database::query_rows`].
    #[track_caller]
    pub fn query_rows(
        &self,
        sql: &str,
        arguments: &[DbValue],
    ) -> Result<ResultSet, SqlTypegenError> {
        self.database
            .run_query_rows(self.connection, sql, arguments, &caller_location())
    }

    /// # Errors
    /// See [`Database::execute_batch`].
    #[track_caller]
    pub fn execute_batch(&self, sql: &str) -> Result<(), SqlTypegenError> {
        self.database
            .run_execute_batch(self.connection, sql, &caller_location())
    }

    /// # Errors
    /// See [`Database::key_column_names`].
    #[track_caller]
    pub fn key_column_names(&self, table: &str) -> Result<Arc<[String]>, SqlTypegenError> {
        self.database.key_column_names_on(self.connection, table)
    }
}
