use std::sync::Arc;

use rusqlite::Statement;
use rusqlite::types::Value;

use super::params::Params;
use crate::error::SqlTypegenError;
use crate::results::ResultSet;
use crate::types::DbValue;

/// Extract a raw `DbValue` from a `SQLite` row.
///
/// # Errors
///
/// Returns `SqlTypegenError::SqliteError` if the column cannot be read.
pub fn sqlite_extract_value(row: &rusqlite::Row<'_>, idx: usize) -> Result<DbValue, SqlTypegenError> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Null => DbValue::Null,
        Value::Integer(i) => DbValue::Int(i),
        Value::Real(f) => DbValue::Float(f),
        Value::Text(s) => DbValue::Text(s),
        Value::Blob(b) => DbValue::Blob(b),
    })
}

/// Build a raw result set from a prepared `SQLite` statement.
///
/// # Errors
/// Returns `SqlTypegenError` if execution or value extraction fails.
pub fn build_result_set(stmt: &mut Statement<'_>, params: &Params) -> Result<ResultSet, SqlTypegenError> {
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let col_count = column_names.len();
    let mut result_set = ResultSet::with_columns(Arc::new(column_names));

    let mut rows = stmt.query(params.as_params())?;
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            values.push(sqlite_extract_value(row, i)?);
        }
        result_set.add_row_values(values);
    }

    Ok(result_set)
}
