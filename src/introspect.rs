//! Result metadata to column descriptors, and result rows to tuples.
//!
//! The same [`RowLayout`] drives code generation (which columns exist, with
//! which host types) and run-time decoding (which declared type each raw value
//! is coerced through).

use std::ops::ControlFlow;
use std::sync::Arc;

use rusqlite::{Row, Rows, Statement};

use crate::customisations::Customisations;
use crate::database::Database;
use crate::error::SqlTypegenError;
use crate::results::{
    ColumnDescriptor, Decoded, FieldGetFailure, Tuple, TupleList, UpdatableTuple,
};
use crate::sqlite::sqlite_extract_value;
use crate::types::{DbValue, HostType};

/// Column descriptors of a prepared statement, with each column's declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLayout {
    columns: Vec<ColumnDescriptor>,
    declared: Vec<Option<String>>,
}

impl RowLayout {
    #[must_use]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    #[must_use]
    pub fn into_columns(self) -> Vec<ColumnDescriptor> {
        self.columns
    }

    #[must_use]
    pub fn declared_type(&self, index: usize) -> Option<&str> {
        self.declared.get(index).and_then(|d| d.as_deref())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Check that the statement projects exactly the columns `T` was generated from.
    ///
    /// # Errors
    /// Returns `SqlTypegenError::MappingError` on a column count or name mismatch.
    pub fn check_tuple<T: Tuple>(&self) -> Result<(), SqlTypegenError> {
        let expected = T::column_descriptors();
        let matches = expected.len() == self.columns.len()
            && expected
                .iter()
                .zip(&self.columns)
                .all(|(e, c)| e.name.eq_ignore_ascii_case(&c.name));
        if matches {
            Ok(())
        } else {
            Err(SqlTypegenError::MappingError(format!(
                "result columns ({}) do not match {} ({})",
                column_list(&self.columns),
                T::NAME,
                column_list(expected)
            )))
        }
    }
}

fn column_list(columns: &[ColumnDescriptor]) -> String {
    columns
        .iter()
        .map(|c| c.name.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Walk a statement's result metadata once, in column order.
///
/// `receiver` sees each column's index, descriptor and declared type name.
pub fn process_result_set_attributes(
    stmt: &Statement<'_>,
    customisations: &dyn Customisations,
    mut receiver: impl FnMut(usize, &ColumnDescriptor, Option<&str>),
) -> RowLayout {
    let mut columns = Vec::new();
    let mut declared = Vec::new();
    for (index, column) in stmt.columns().iter().enumerate() {
        let decl_type = column.decl_type();
        let descriptor = ColumnDescriptor::owned(
            column.name().to_string(),
            customisations.column_type(decl_type),
        );
        receiver(index, &descriptor, decl_type);
        columns.push(descriptor);
        declared.push(decl_type.map(str::to_string));
    }
    RowLayout { columns, declared }
}

#[must_use]
pub fn column_descriptors(
    stmt: &Statement<'_>,
    customisations: &dyn Customisations,
) -> Vec<ColumnDescriptor> {
    process_result_set_attributes(stmt, customisations, |_, _, _| {}).into_columns()
}

/// Decode the current row into a new `T`, one field at a time.
///
/// A field that cannot be read or coerced is left at its default and recorded.
pub fn create_tuple<T: Tuple>(
    row: &Row<'_>,
    layout: &RowLayout,
    customisations: &dyn Customisations,
) -> Decoded<T> {
    let mut tuple = T::default();
    let mut failures = Vec::new();
    for (index, column) in layout.columns.iter().enumerate() {
        let outcome = sqlite_extract_value(row, index)
            .and_then(|raw| customisations.column_value(raw, layout.declared_type(index)))
            .and_then(|value| tuple.set_field(index, value));
        if let Err(e) = outcome {
            failures.push(FieldGetFailure {
                field: column.name.to_string(),
                failure: e.to_string(),
            });
        }
    }
    Decoded { tuple, failures }
}

/// [`create_tuple`], bound to `table` for later insert/update.
pub fn create_tuple_for_update<'db, T: Tuple>(
    row: &Row<'_>,
    layout: &RowLayout,
    database: &'db Database,
    table: &str,
    key_columns: &Arc<[String]>,
) -> UpdatableTuple<'db, T> {
    let decoded = create_tuple(row, layout, database.customisations());
    UpdatableTuple::from_decoded(database, table, Arc::clone(key_columns), decoded)
}

/// Decode every remaining row.
///
/// # Errors
/// Returns `SqlTypegenError` if stepping the result fails.
pub fn to_list<T: Tuple>(
    mut rows: Rows<'_>,
    layout: &RowLayout,
    customisations: &dyn Customisations,
) -> Result<TupleList<T>, SqlTypegenError> {
    let mut list = TupleList::default();
    while let Some(row) = rows.next()? {
        list.push(create_tuple(row, layout, customisations));
    }
    Ok(list)
}

/// Decode rows lazily, handing each to `consumer` until it breaks. Returns the row count visited.
///
/// # Errors
/// Returns `SqlTypegenError` if stepping the result fails.
pub fn to_stream<T: Tuple>(
    mut rows: Rows<'_>,
    layout: &RowLayout,
    customisations: &dyn Customisations,
    mut consumer: impl FnMut(Decoded<T>) -> ControlFlow<()>,
) -> Result<usize, SqlTypegenError> {
    let mut visited = 0;
    while let Some(row) = rows.next()? {
        visited += 1;
        if consumer(create_tuple(row, layout, customisations)).is_break() {
            break;
        }
    }
    Ok(visited)
}

/// Decode every remaining row as an updatable tuple of `table`.
///
/// # Errors
/// Returns `SqlTypegenError` if stepping the result fails.
pub fn to_list_for_update<'db, T: Tuple>(
    mut rows: Rows<'_>,
    layout: &RowLayout,
    database: &'db Database,
    table: &str,
    key_columns: &Arc<[String]>,
) -> Result<Vec<UpdatableTuple<'db, T>>, SqlTypegenError> {
    let mut list = Vec::new();
    while let Some(row) = rows.next()? {
        list.push(create_tuple_for_update(row, layout, database, table, key_columns));
    }
    Ok(list)
}

/// Host type of the first result column.
///
/// Columns without a declared type (aggregates, expressions) take the storage
/// class of `first_value` when one was read.
///
/// # Errors
/// Returns `SqlTypegenError::MappingError` if the statement projects no columns.
pub fn obtain_type_of_first_column(
    stmt: &Statement<'_>,
    customisations: &dyn Customisations,
    first_value: Option<&DbValue>,
) -> Result<HostType, SqlTypegenError> {
    let columns = stmt.columns();
    let column = columns.first().ok_or_else(|| {
        SqlTypegenError::MappingError("statement returns no columns".to_string())
    })?;
    let host_type = customisations.column_type(column.decl_type());
    Ok(match (host_type, first_value) {
        (HostType::Any, Some(value)) if column.decl_type().is_none() => value.host_type(),
        _ => host_type,
    })
}
