use std::borrow::Cow;
use std::fmt;

use crate::error::SqlTypegenError;
use crate::types::{DbValue, HostType};

pub use crate::sqlite::SqliteCustomisations;

/// Backend-specific column type and value mapping policy.
///
/// One implementation per backend is chosen when the [`crate::Database`] is built.
pub trait Customisations: Send + Sync + fmt::Debug {
    /// Best-fit host type for a column, given its declared type name (if any).
    fn column_type(&self, declared: Option<&str>) -> HostType;

    /// Coerce a raw column value into the representation of `host_type`.
    ///
    /// # Errors
    /// Returns `SqlTypegenError::MappingError` if the raw value cannot represent `host_type`.
    fn coerce(&self, raw: DbValue, host_type: HostType) -> Result<DbValue, SqlTypegenError> {
        coerce_value(raw, host_type)
    }

    /// Coerce a raw column value given the column's declared type name.
    ///
    /// # Errors
    /// Returns `SqlTypegenError::MappingError` if the raw value does not fit the declared type.
    fn column_value(
        &self,
        raw: DbValue,
        declared: Option<&str>,
    ) -> Result<DbValue, SqlTypegenError> {
        self.coerce(raw, self.column_type(declared))
    }

    /// Rewrite a query so the backend returns a locking/updatable cursor.
    fn for_update_sql<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(sql)
    }
}

/// Exact ANSI type names only; anything unrecognised is [`HostType::Any`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCustomisations;

impl Customisations for StandardCustomisations {
    fn column_type(&self, declared: Option<&str>) -> HostType {
        let Some(name) = declared.map(normalise_type_name) else {
            return HostType::Any;
        };
        match name.as_str() {
            "BOOLEAN" => HostType::Bool,
            "SMALLINT" | "INTEGER" | "INT" => HostType::Int32,
            "BIGINT" => HostType::Int64,
            "REAL" | "FLOAT" | "DOUBLE" | "DOUBLE PRECISION" | "DECIMAL" | "NUMERIC" => {
                HostType::Float64
            }
            "CHAR" | "CHARACTER" | "VARCHAR" | "CHARACTER VARYING" | "TEXT" | "CLOB" => {
                HostType::Text
            }
            "BLOB" | "BINARY" | "VARBINARY" => HostType::Blob,
            "DATE" => HostType::Date,
            "TIMESTAMP" => HostType::Timestamp,
            "JSON" => HostType::Json,
            _ => HostType::Any,
        }
    }

    fn for_update_sql<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        Cow::Owned(format!("{} FOR UPDATE", sql.trim_end().trim_end_matches(';')))
    }
}

/// Uppercase a declared type and drop any `(size)` suffix: `varchar(20)` => `VARCHAR`.
#[must_use]
pub fn normalise_type_name(declared: &str) -> String {
    let base = declared.split('(').next().unwrap_or(declared);
    base.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

/// Convert a raw value into the canonical `DbValue` variant for `host_type`.
///
/// # Errors
/// Returns `SqlTypegenError::MappingError` when no lossless conversion exists.
pub fn coerce_value(raw: DbValue, host_type: HostType) -> Result<DbValue, SqlTypegenError> {
    if raw.is_null() {
        return Ok(DbValue::Null);
    }
    let converted = match host_type {
        HostType::Any => Some(raw.clone()),
        HostType::Bool => raw.as_bool().map(DbValue::Bool),
        HostType::Int32 => raw
            .as_int()
            .filter(|v| i32::try_from(*v).is_ok())
            .map(DbValue::Int),
        HostType::Int64 => raw.as_int().map(DbValue::Int),
        HostType::Float64 => raw.as_float().map(DbValue::Float),
        HostType::Text => match &raw {
            DbValue::Text(_) => Some(raw.clone()),
            DbValue::Int(_) | DbValue::Float(_) => Some(DbValue::Text(raw.to_string())),
            _ => None,
        },
        HostType::Blob => match &raw {
            DbValue::Blob(_) => Some(raw.clone()),
            DbValue::Text(s) => Some(DbValue::Blob(s.as_bytes().to_vec())),
            _ => None,
        },
        HostType::Date => raw.as_date().map(DbValue::Date),
        HostType::Timestamp => raw.as_timestamp().map(DbValue::Timestamp),
        HostType::Json => match &raw {
            DbValue::Json(_) => Some(raw.clone()),
            DbValue::Text(s) => serde_json::from_str(s).ok().map(DbValue::Json),
            _ => None,
        },
    };
    converted.ok_or_else(|| {
        SqlTypegenError::MappingError(format!(
            "{} value '{raw}' cannot be read as {host_type}",
            raw.kind()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_sized_names() {
        assert_eq!(normalise_type_name("varchar(20)"), "VARCHAR");
        assert_eq!(normalise_type_name("double  precision"), "DOUBLE PRECISION");
    }

    #[test]
    fn standard_maps_exact_names_only() {
        let c = StandardCustomisations;
        assert_eq!(c.column_type(Some("integer")), HostType::Int32);
        assert_eq!(c.column_type(Some("MEDIUMINT")), HostType::Any);
        assert_eq!(c.column_type(None), HostType::Any);
        assert_eq!(c.for_update_sql("SELECT * FROM t;"), "SELECT * FROM t FOR UPDATE");
    }

    #[test]
    fn coercion_reports_mismatch() {
        assert_eq!(
            coerce_value(DbValue::Int(1), HostType::Bool).unwrap(),
            DbValue::Bool(true)
        );
        assert!(coerce_value(DbValue::Text("x".into()), HostType::Int64).is_err());
        assert!(coerce_value(DbValue::Int(i64::MAX), HostType::Int32).is_err());
        assert_eq!(coerce_value(DbValue::Null, HostType::Date).unwrap(), DbValue::Null);
    }
}
