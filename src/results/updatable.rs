use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use rusqlite::Connection;

use super::list::Decoded;
use super::tuple::{ColumnDescriptor, FieldGetFailure, Tuple};
use crate::database::{Database, Xact};
use crate::error::SqlTypegenError;
use crate::statement::Update;
use crate::types::DbValue;

/// A tuple bound to its source table, able to insert or update itself.
///
/// Key columns are resolved when the value is created: a table's declared
/// primary key, or every column when the table declares none.
/// Field edits go through `DerefMut`; [`UpdatableTuple::update`] locates the row
/// by the key values captured when the tuple was read (or last written).
#[derive(Debug)]
pub struct UpdatableTuple<'db, T: Tuple> {
    tuple: T,
    backup: Vec<DbValue>,
    failures: Vec<FieldGetFailure>,
    table: String,
    key_columns: Arc<[String]>,
    database: &'db Database,
}

impl<'db, T: Tuple> UpdatableTuple<'db, T> {
    /// Wrap a fresh tuple for insertion into `table`.
    ///
    /// # Errors
    /// Returns `SqlTypegenError::KeyColumnsUnresolved` if the table's key columns
    /// cannot be read or are not all present in `T`.
    pub fn new(database: &'db Database, table: &str, tuple: T) -> Result<Self, SqlTypegenError> {
        let key_columns =
            database.with_connection(|conn| resolve_key_columns::<T>(database, conn, table))?;
        Ok(Self::from_decoded(
            database,
            table,
            key_columns,
            Decoded {
                tuple,
                failures: Vec::new(),
            },
        ))
    }

    pub(crate) fn from_decoded(
        database: &'db Database,
        table: &str,
        key_columns: Arc<[String]>,
        decoded: Decoded<T>,
    ) -> Self {
        Self {
            backup: decoded.tuple.backup(),
            tuple: decoded.tuple,
            failures: decoded.failures,
            table: table.to_string(),
            key_columns,
            database,
        }
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    /// Fields that failed to decode when this tuple was read.
    #[must_use]
    pub fn failures(&self) -> &[FieldGetFailure] {
        &self.failures
    }

    /// True if any field differs from the last read or written state.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.tuple.backup() != self.backup
    }

    pub fn into_inner(self) -> T {
        self.tuple
    }

    /// Insert the tuple as a new row, using a connection of its own.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` if the insert fails.
    #[track_caller]
    pub fn insert(&mut self) -> Result<usize, SqlTypegenError> {
        let count = self.database.update(&self.insert_statement())?;
        self.backup = self.tuple.backup();
        Ok(count)
    }

    /// Insert the tuple inside an open transaction.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` if the insert fails.
    #[track_caller]
    pub fn insert_with(&mut self, xact: &Xact<'_>) -> Result<usize, SqlTypegenError> {
        let count = xact.update(&self.insert_statement())?;
        self.backup = self.tuple.backup();
        Ok(count)
    }

    /// Write every field back to the row identified by the key columns.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` if the update fails.
    #[track_caller]
    pub fn update(&mut self) -> Result<usize, SqlTypegenError> {
        let count = self.database.update(&self.update_statement())?;
        self.backup = self.tuple.backup();
        Ok(count)
    }

    /// Write every field back inside an open transaction.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` if the update fails.
    #[track_caller]
    pub fn update_with(&mut self, xact: &Xact<'_>) -> Result<usize, SqlTypegenError> {
        let count = xact.update(&self.update_statement())?;
        self.backup = self.tuple.backup();
        Ok(count)
    }

    fn insert_statement(&self) -> Update {
        let columns = T::column_descriptors();
        let names: Vec<String> = columns.iter().map(|c| quote_identifier(&c.name)).collect();
        let marks = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({marks})",
            quote_table_name(&self.database.replace_table_names(&self.table)),
            names.join(", ")
        );
        Update::new(sql, self.tuple.backup())
    }

    fn update_statement(&self) -> Update {
        let columns = T::column_descriptors();
        let current = self.tuple.backup();
        let assignments: Vec<String> = columns
            .iter()
            .map(|c| format!("{} = ?", quote_identifier(&c.name)))
            .collect();
        let mut arguments = current;
        let mut predicates = Vec::with_capacity(self.key_columns.len());
        for key in self.key_columns.iter() {
            // key presence was checked when the key columns were resolved
            if let Some(index) = column_index(columns, key) {
                predicates.push(format!("{} IS ?", quote_identifier(key)));
                arguments.push(self.backup.get(index).cloned().unwrap_or(DbValue::Null));
            }
        }
        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            quote_table_name(&self.database.replace_table_names(&self.table)),
            assignments.join(", "),
            predicates.join(" AND ")
        );
        Update::new(sql, arguments)
    }
}

impl<T: Tuple> Deref for UpdatableTuple<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.tuple
    }
}

impl<T: Tuple> DerefMut for UpdatableTuple<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.tuple
    }
}

/// Key columns for `table` as they apply to tuple type `T`.
pub(crate) fn resolve_key_columns<T: Tuple>(
    database: &Database,
    conn: &Connection,
    table: &str,
) -> Result<Arc<[String]>, SqlTypegenError> {
    let columns = T::column_descriptors();
    let declared = database
        .key_column_names_on(conn, table)
        .map_err(|e| SqlTypegenError::KeyColumnsUnresolved {
            table: table.to_string(),
            reason: e.to_string(),
        })?;
    if declared.is_empty() {
        return Ok(columns.iter().map(|c| c.name.to_string()).collect());
    }
    if let Some(missing) = declared.iter().find(|k| column_index(columns, k).is_none()) {
        return Err(SqlTypegenError::KeyColumnsUnresolved {
            table: table.to_string(),
            reason: format!("key column '{missing}' is not selected by {}", T::NAME),
        });
    }
    Ok(declared)
}

fn column_index(columns: &[ColumnDescriptor], name: &str) -> Option<usize> {
    columns.iter().position(|c| c.name.eq_ignore_ascii_case(name))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `schema.table` => `"schema"."table"`.
fn quote_table_name(name: &str) -> String {
    name.split('.')
        .map(quote_identifier)
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_table_names_quote_each_part() {
        assert_eq!(quote_table_name("orders"), "\"orders\"");
        assert_eq!(quote_table_name("main.orders"), "\"main\".\"orders\"");
        assert_eq!(quote_identifier("odd\"name"), "\"odd\"\"name\"");
    }
}
