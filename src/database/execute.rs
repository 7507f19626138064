use std::ops::ControlFlow;

use rusqlite::{CachedStatement, Connection};

use super::{Database, caller_location};
use crate::error::SqlTypegenError;
use crate::introspect::{self, RowLayout};
use crate::results::{
    Decoded, ResultSet, Tuple, TupleList, UpdatableTuple, resolve_key_columns,
};
use crate::sqlite::{Params, build_result_set, sqlite_extract_value};
use crate::statement::{QueryStatement, UpdateStatement, ValueOfStatement};
use crate::types::{DbScalar, DbValue};

/// A statement prepared on one connection with its arguments converted.
pub(crate) struct Prepared<'c> {
    pub(crate) stmt: CachedStatement<'c>,
    pub(crate) params: Params,
    pub(crate) sql: String,
}

impl Database {
    /// Prepare `sql` after table-name replacement and check the argument count.
    ///
    /// Nothing is executed when the count does not match.
    pub(crate) fn prepare<'c>(
        &self,
        conn: &'c Connection,
        sql: &str,
        arguments: &[DbValue],
    ) -> Result<Prepared<'c>, SqlTypegenError> {
        let sql = self.replace_table_names(sql);
        let stmt = conn.prepare_cached(&sql)?;
        let expected = stmt.parameter_count();
        if expected != arguments.len() {
            return Err(SqlTypegenError::ParameterError(format!(
                "statement expects {expected} parameter(s) but {} were supplied: {sql}",
                arguments.len()
            )));
        }
        Ok(Prepared {
            stmt,
            params: Params::convert(arguments),
            sql,
        })
    }

    /// Execute an update using a connection of its own. Returns the affected-row count.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` on acquisition, binding or execution failure.
    #[track_caller]
    pub fn update<S: UpdateStatement + ?Sized>(
        &self,
        statement: &S,
    ) -> Result<usize, SqlTypegenError> {
        let location = caller_location();
        self.with_connection(|conn| self.run_update(conn, statement, &location))
    }

    /// Execute an update on a supplied connection.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` on binding or execution failure.
    #[track_caller]
    pub fn update_on<S: UpdateStatement + ?Sized>(
        &self,
        conn: &Connection,
        statement: &S,
    ) -> Result<usize, SqlTypegenError> {
        self.run_update(conn, statement, &caller_location())
    }

    pub(crate) fn run_update<S: UpdateStatement + ?Sized>(
        &self,
        conn: &Connection,
        statement: &S,
        location: &str,
    ) -> Result<usize, SqlTypegenError> {
        let mut prepared = self.prepare(conn, statement.sql(), statement.arguments())?;
        let count = prepared.stmt.execute(prepared.params.as_params())?;
        self.emit(location, &prepared.sql);
        Ok(count)
    }

    /// Run a query and decode every row, using a connection of its own.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` on acquisition, binding or execution failure, or
    /// `MappingError` if the result columns do not match the tuple type.
    #[track_caller]
    pub fn query<S: QueryStatement + ?Sized>(
        &self,
        statement: &S,
    ) -> Result<TupleList<S::Tuple>, SqlTypegenError> {
        let location = caller_location();
        self.with_connection(|conn| self.run_query(conn, statement, &location))
    }

    /// Run a query on a supplied connection and decode every row.
    ///
    /// # Errors
    /// See [`Database::query`].
    #[track_caller]
    pub fn query_on<S: QueryStatement + ?Sized>(
        &self,
        conn: &Connection,
        statement: &S,
    ) -> Result<TupleList<S::Tuple>, SqlTypegenError> {
        self.run_query(conn, statement, &caller_location())
    }

    pub(crate) fn run_query<S: QueryStatement + ?Sized>(
        &self,
        conn: &Connection,
        statement: &S,
        location: &str,
    ) -> Result<TupleList<S::Tuple>, SqlTypegenError> {
        let mut prepared = self.prepare(conn, statement.sql(), statement.arguments())?;
        let layout = self.tuple_layout::<S::Tuple>(&prepared)?;
        let rows = prepared.stmt.query(prepared.params.as_params())?;
        let list = introspect::to_list(rows, &layout, self.customisations())?;
        self.emit(location, &prepared.sql);
        Ok(list)
    }

    /// Decode only the first row of a query, if there is one.
    ///
    /// # Errors
    /// See [`Database::query`].
    #[track_caller]
    pub fn query_first<S: QueryStatement + ?Sized>(
        &self,
        statement: &S,
    ) -> Result<Option<Decoded<S::Tuple>>, SqlTypegenError> {
        let location = caller_location();
        self.with_connection(|conn| self.run_query_first(conn, statement, &location))
    }

    /// [`Database::query_first`] on a supplied connection.
    ///
    /// # Errors
    /// See [`Database::query`].
    #[track_caller]
    pub fn query_first_on<S: QueryStatement + ?Sized>(
        &self,
        conn: &Connection,
        statement: &S,
    ) -> Result<Option<Decoded<S::Tuple>>, SqlTypegenError> {
        self.run_query_first(conn, statement, &caller_location())
    }

    pub(crate) fn run_query_first<S: QueryStatement + ?Sized>(
        &self,
        conn: &Connection,
        statement: &S,
        location: &str,
    ) -> Result<Option<Decoded<S::Tuple>>, SqlTypegenError> {
        let mut first = None;
        self.run_query_stream(conn, statement, location, |decoded| {
            first = Some(decoded);
            ControlFlow::Break(())
        })?;
        Ok(first)
    }

    /// Decode rows one at a time, handing each to `consumer` until it breaks.
    ///
    /// Returns the number of rows visited.
    ///
    /// # Errors
    /// See [`Database::query`].
    #[track_caller]
    pub fn query_stream<S: QueryStatement + ?Sized>(
        &self,
        statement: &S,
        consumer: impl FnMut(Decoded<S::Tuple>) -> ControlFlow<()>,
    ) -> Result<usize, SqlTypegenError> {
        let location = caller_location();
        self.with_connection(|conn| {
            self.run_query_stream(conn, statement, &location, consumer)
        })
    }

    /// [`Database::query_stream`] on a supplied connection.
    ///
    /// # Errors
    /// See [`Database::query`].
    #[track_caller]
    pub fn query_stream_on<S: QueryStatement + ?Sized>(
        &self,
        conn: &Connection,
        statement: &S,
        consumer: impl FnMut(Decoded<S::Tuple>) -> ControlFlow<()>,
    ) -> Result<usize, SqlTypegenError> {
        self.run_query_stream(conn, statement, &caller_location(), consumer)
    }

    pub(crate) fn run_query_stream<S: QueryStatement + ?Sized>(
        &self,
        conn: &Connection,
        statement: &S,
        location: &str,
        consumer: impl FnMut(Decoded<S::Tuple>) -> ControlFlow<()>,
    ) -> Result<usize, SqlTypegenError> {
        let mut prepared = self.prepare(conn, statement.sql(), statement.arguments())?;
        let layout = self.tuple_layout::<S::Tuple>(&prepared)?;
        let rows = prepared.stmt.query(prepared.params.as_params())?;
        let visited = introspect::to_stream(rows, &layout, self.customisations(), consumer)?;
        self.emit(location, &prepared.sql);
        Ok(visited)
    }

    /// Run a query in for-update mode; each row comes back able to write itself.
    ///
    /// # Errors
    /// Returns `SqlTypegenError::ExecutionError` if the statement names no table,
    /// `KeyColumnsUnresolved` if the table's keys cannot be resolved, or any
    /// [`Database::query`] failure.
    #[track_caller]
    pub fn query_for_update<S: QueryStatement + ?Sized>(
        &self,
        statement: &S,
    ) -> Result<Vec<UpdatableTuple<'_, S::Tuple>>, SqlTypegenError> {
        let location = caller_location();
        self.with_connection(|conn| self.run_query_for_update(conn, statement, &location))
    }

    /// [`Database::query_for_update`] on a supplied connection.
    ///
    /// # Errors
    /// See [`Database::query_for_update`].
    #[track_caller]
    pub fn query_for_update_on<S: QueryStatement + ?Sized>(
        &self,
        conn: &Connection,
        statement: &S,
    ) -> Result<Vec<UpdatableTuple<'_, S::Tuple>>, SqlTypegenError> {
        self.run_query_for_update(conn, statement, &caller_location())
    }

    pub(crate) fn run_query_for_update<S: QueryStatement + ?Sized>(
        &self,
        conn: &Connection,
        statement: &S,
        location: &str,
    ) -> Result<Vec<UpdatableTuple<'_, S::Tuple>>, SqlTypegenError> {
        let table = statement.table_name().ok_or_else(|| {
            SqlTypegenError::ExecutionError(format!(
                "{} is not bound to a table and cannot be queried for update",
                statement.sql()
            ))
        })?;
        let key_columns = resolve_key_columns::<S::Tuple>(self, conn, table)?;
        let sql = self.customisations().for_update_sql(statement.sql()).into_owned();
        let mut prepared = self.prepare(conn, &sql, statement.arguments())?;
        let layout = self.tuple_layout::<S::Tuple>(&prepared)?;
        let rows = prepared.stmt.query(prepared.params.as_params())?;
        let list = introspect::to_list_for_update(rows, &layout, self, table, &key_columns)?;
        self.emit(location, &prepared.sql);
        Ok(list)
    }

    /// First column of the first row, or `None` when there are no rows or the value is NULL.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` on acquisition, binding or execution failure, or
    /// `MappingError` if the value cannot be read as `S::Value`.
    #[track_caller]
    pub fn value_of<S: ValueOfStatement + ?Sized>(
        &self,
        statement: &S,
    ) -> Result<Option<S::Value>, SqlTypegenError> {
        let location = caller_location();
        self.with_connection(|conn| self.run_value_of(conn, statement, &location))
    }

    /// [`Database::value_of`] on a supplied connection.
    ///
    /// # Errors
    /// See [`Database::value_of`].
    #[track_caller]
    pub fn value_of_on<S: ValueOfStatement + ?Sized>(
        &self,
        conn: &Connection,
        statement: &S,
    ) -> Result<Option<S::Value>, SqlTypegenError> {
        self.run_value_of(conn, statement, &caller_location())
    }

    pub(crate) fn run_value_of<S: ValueOfStatement + ?Sized>(
        &self,
        conn: &Connection,
        statement: &S,
        location: &str,
    ) -> Result<Option<S::Value>, SqlTypegenError> {
        let mut prepared = self.prepare(conn, statement.sql(), statement.arguments())?;
        let declared = prepared
            .stmt
            .columns()
            .first()
            .map(|c| c.decl_type().map(str::to_string))
            .ok_or_else(|| {
                SqlTypegenError::MappingError(format!("{} returns no columns", prepared.sql))
            })?;
        let raw = {
            let mut rows = prepared.stmt.query(prepared.params.as_params())?;
            match rows.next()? {
                Some(row) => Some(sqlite_extract_value(row, 0)?),
                None => None,
            }
        };
        self.emit(location, &prepared.sql);
        match raw {
            Some(raw) => {
                let value = self.customisations().column_value(raw, declared.as_deref())?;
                <S::Value as DbScalar>::decode(value)
            }
            None => Ok(None),
        }
    }

    /// Run raw SQL and return untyped rows.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` on acquisition, binding or execution failure.
    #[track_caller]
    pub fn query_rows(
        &self,
        sql: &str,
        arguments: &[DbValue],
    ) -> Result<ResultSet, SqlTypegenError> {
        let location = caller_location();
        self.with_connection(|conn| self.run_query_rows(conn, sql, arguments, &location))
    }

    /// [`Database::query_rows`] on a supplied connection.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` on binding or execution failure.
    #[track_caller]
    pub fn query_rows_on(
        &self,
        conn: &Connection,
        sql: &str,
        arguments: &[DbValue],
    ) -> Result<ResultSet, SqlTypegenError> {
        self.run_query_rows(conn, sql, arguments, &caller_location())
    }

    pub(crate) fn run_query_rows(
        &self,
        conn: &Connection,
        sql: &str,
        arguments: &[DbValue],
        location: &str,
    ) -> Result<ResultSet, SqlTypegenError> {
        let mut prepared = self.prepare(conn, sql, arguments)?;
        let result_set = build_result_set(&mut prepared.stmt, &prepared.params)?;
        self.emit(location, &prepared.sql);
        Ok(result_set)
    }

    /// Run several `;`-separated statements without parameters.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` on acquisition or execution failure.
    #[track_caller]
    pub fn execute_batch(&self, sql: &str) -> Result<(), SqlTypegenError> {
        let location = caller_location();
        self.with_connection(|conn| self.run_execute_batch(conn, sql, &location))
    }

    /// [`Database::execute_batch`] on a supplied connection.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` on execution failure.
    #[track_caller]
    pub fn execute_batch_on(&self, conn: &Connection, sql: &str) -> Result<(), SqlTypegenError> {
        self.run_execute_batch(conn, sql, &caller_location())
    }

    pub(crate) fn run_execute_batch(
        &self,
        conn: &Connection,
        sql: &str,
        location: &str,
    ) -> Result<(), SqlTypegenError> {
        let sql = self.replace_table_names(sql);
        conn.execute_batch(&sql)?;
        self.emit(location, &sql);
        Ok(())
    }

    fn tuple_layout<T: Tuple>(
        &self,
        prepared: &Prepared<'_>,
    ) -> Result<RowLayout, SqlTypegenError> {
        let layout = introspect::process_result_set_attributes(
            &prepared.stmt,
            self.customisations(),
            |_, _, _| {},
        );
        layout.check_tuple::<T>()?;
        Ok(layout)
    }
}
