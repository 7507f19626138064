use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::customisations::{Customisations, SqliteCustomisations, StandardCustomisations};
use crate::error::SqlTypegenError;

/// Values bound as statement parameters or decoded from result columns.
///
/// ```rust
/// use sql_typegen::DbValue;
///
/// let params = vec![DbValue::from(1_i64), DbValue::from("alice"), DbValue::Null];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DbValue {
    /// SQL NULL
    Null,
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Calendar date
    Date(NaiveDate),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// JSON value
    Json(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl DbValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            DbValue::Int(value) => Some(*value),
            DbValue::Bool(value) => Some(i64::from(*value)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            DbValue::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            DbValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let DbValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DbValue::Bool(value) => Some(*value),
            DbValue::Int(1) => Some(true),
            DbValue::Int(0) => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let DbValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            DbValue::Timestamp(value) => Some(*value),
            DbValue::Date(value) => value.and_hms_opt(0, 0, 0),
            DbValue::Text(s) => parse_timestamp(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            DbValue::Date(value) => Some(*value),
            DbValue::Timestamp(value) => Some(value.date()),
            DbValue::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .ok()
                .or_else(|| parse_timestamp(s).map(|dt| dt.date())),
            _ => None,
        }
    }

    /// Short name of the variant, used in mapping diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            DbValue::Null => "null",
            DbValue::Int(_) => "int",
            DbValue::Float(_) => "float",
            DbValue::Text(_) => "text",
            DbValue::Bool(_) => "bool",
            DbValue::Date(_) => "date",
            DbValue::Timestamp(_) => "timestamp",
            DbValue::Json(_) => "json",
            DbValue::Blob(_) => "blob",
        }
    }

    /// The host type a parameter of this value is declared with in generated signatures.
    #[must_use]
    pub fn host_type(&self) -> HostType {
        match self {
            DbValue::Null => HostType::Any,
            DbValue::Int(_) => HostType::Int64,
            DbValue::Float(_) => HostType::Float64,
            DbValue::Text(_) => HostType::Text,
            DbValue::Bool(_) => HostType::Bool,
            DbValue::Date(_) => HostType::Date,
            DbValue::Timestamp(_) => HostType::Timestamp,
            DbValue::Json(_) => HostType::Json,
            DbValue::Blob(_) => HostType::Blob,
        }
    }
}

impl fmt::Display for DbValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbValue::Null => f.write_str("NULL"),
            DbValue::Int(v) => write!(f, "{v}"),
            DbValue::Float(v) => write!(f, "{v}"),
            DbValue::Text(v) => f.write_str(v),
            DbValue::Bool(v) => write!(f, "{v}"),
            DbValue::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            DbValue::Timestamp(v) => write!(f, "{}", v.format("%F %T%.f")),
            DbValue::Json(v) => write!(f, "{v}"),
            DbValue::Blob(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

pub(crate) fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    // Try "YYYY-MM-DD HH:MM:SS", then with fractional seconds, then ISO 'T'
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

/// Best-fit host type for a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostType {
    Bool,
    Int32,
    Int64,
    Float64,
    Text,
    Blob,
    Date,
    Timestamp,
    Json,
    /// No better fit; the column is carried as a raw [`DbValue`].
    Any,
}

impl HostType {
    /// Variant name as it appears in generated code.
    #[must_use]
    pub fn variant_name(self) -> &'static str {
        match self {
            HostType::Bool => "Bool",
            HostType::Int32 => "Int32",
            HostType::Int64 => "Int64",
            HostType::Float64 => "Float64",
            HostType::Text => "Text",
            HostType::Blob => "Blob",
            HostType::Date => "Date",
            HostType::Timestamp => "Timestamp",
            HostType::Json => "Json",
            HostType::Any => "Any",
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.variant_name())
    }
}

/// A Rust type that a single non-NULL column value decodes into.
///
/// Generated tuple fields are `Option<T>` for some `T: DbScalar`; NULL is `None`.
pub trait DbScalar: Sized + Clone {
    const HOST_TYPE: HostType;

    /// Convert a non-NULL value.
    ///
    /// # Errors
    /// Returns `SqlTypegenError::MappingError` if the value has no conversion to `Self`.
    fn from_non_null(value: DbValue) -> Result<Self, SqlTypegenError>;

    fn into_db_value(self) -> DbValue;

    /// Decode a possibly-NULL value.
    ///
    /// # Errors
    /// Returns `SqlTypegenError::MappingError` if the value has no conversion to `Self`.
    fn decode(value: DbValue) -> Result<Option<Self>, SqlTypegenError> {
        if value.is_null() {
            Ok(None)
        } else {
            Self::from_non_null(value).map(Some)
        }
    }

    fn encode(value: Option<Self>) -> DbValue {
        value.map_or(DbValue::Null, DbScalar::into_db_value)
    }
}

fn mismatch<T>(value: &DbValue, target: HostType) -> Result<T, SqlTypegenError> {
    Err(SqlTypegenError::MappingError(format!(
        "cannot convert {} value '{value}' to {target}",
        value.kind()
    )))
}

impl DbScalar for bool {
    const HOST_TYPE: HostType = HostType::Bool;

    fn from_non_null(value: DbValue) -> Result<Self, SqlTypegenError> {
        value.as_bool().map_or_else(|| mismatch(&value, HostType::Bool), Ok)
    }

    fn into_db_value(self) -> DbValue {
        DbValue::Bool(self)
    }
}

impl DbScalar for i32 {
    const HOST_TYPE: HostType = HostType::Int32;

    fn from_non_null(value: DbValue) -> Result<Self, SqlTypegenError> {
        match value.as_int() {
            Some(wide) => i32::try_from(wide).map_err(|_| {
                SqlTypegenError::MappingError(format!("integer {wide} out of range for Int32"))
            }),
            None => mismatch(&value, HostType::Int32),
        }
    }

    fn into_db_value(self) -> DbValue {
        DbValue::Int(i64::from(self))
    }
}

impl DbScalar for i64 {
    const HOST_TYPE: HostType = HostType::Int64;

    fn from_non_null(value: DbValue) -> Result<Self, SqlTypegenError> {
        value.as_int().map_or_else(|| mismatch(&value, HostType::Int64), Ok)
    }

    fn into_db_value(self) -> DbValue {
        DbValue::Int(self)
    }
}

impl DbScalar for f64 {
    const HOST_TYPE: HostType = HostType::Float64;

    fn from_non_null(value: DbValue) -> Result<Self, SqlTypegenError> {
        value.as_float().map_or_else(|| mismatch(&value, HostType::Float64), Ok)
    }

    fn into_db_value(self) -> DbValue {
        DbValue::Float(self)
    }
}

impl DbScalar for String {
    const HOST_TYPE: HostType = HostType::Text;

    fn from_non_null(value: DbValue) -> Result<Self, SqlTypegenError> {
        match value {
            DbValue::Text(s) => Ok(s),
            other => mismatch(&other, HostType::Text),
        }
    }

    fn into_db_value(self) -> DbValue {
        DbValue::Text(self)
    }
}

impl DbScalar for Vec<u8> {
    const HOST_TYPE: HostType = HostType::Blob;

    fn from_non_null(value: DbValue) -> Result<Self, SqlTypegenError> {
        match value {
            DbValue::Blob(bytes) => Ok(bytes),
            other => mismatch(&other, HostType::Blob),
        }
    }

    fn into_db_value(self) -> DbValue {
        DbValue::Blob(self)
    }
}

impl DbScalar for NaiveDate {
    const HOST_TYPE: HostType = HostType::Date;

    fn from_non_null(value: DbValue) -> Result<Self, SqlTypegenError> {
        value.as_date().map_or_else(|| mismatch(&value, HostType::Date), Ok)
    }

    fn into_db_value(self) -> DbValue {
        DbValue::Date(self)
    }
}

impl DbScalar for NaiveDateTime {
    const HOST_TYPE: HostType = HostType::Timestamp;

    fn from_non_null(value: DbValue) -> Result<Self, SqlTypegenError> {
        value.as_timestamp().map_or_else(|| mismatch(&value, HostType::Timestamp), Ok)
    }

    fn into_db_value(self) -> DbValue {
        DbValue::Timestamp(self)
    }
}

impl DbScalar for JsonValue {
    const HOST_TYPE: HostType = HostType::Json;

    fn from_non_null(value: DbValue) -> Result<Self, SqlTypegenError> {
        match value {
            DbValue::Json(json) => Ok(json),
            DbValue::Text(s) => serde_json::from_str(&s).map_err(|e| {
                SqlTypegenError::MappingError(format!("invalid JSON text: {e}"))
            }),
            other => mismatch(&other, HostType::Json),
        }
    }

    fn into_db_value(self) -> DbValue {
        DbValue::Json(self)
    }
}

impl DbScalar for DbValue {
    const HOST_TYPE: HostType = HostType::Any;

    fn from_non_null(value: DbValue) -> Result<Self, SqlTypegenError> {
        Ok(value)
    }

    fn into_db_value(self) -> DbValue {
        self
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for DbValue {
                fn from(value: $ty) -> Self {
                    DbScalar::into_db_value(value)
                }
            }

            impl From<Option<$ty>> for DbValue {
                fn from(value: Option<$ty>) -> Self {
                    DbScalar::encode(value)
                }
            }
        )*
    };
}

impl_from_scalar!(bool, i32, i64, f64, String, Vec<u8>, NaiveDate, NaiveDateTime, JsonValue);

impl From<&str> for DbValue {
    fn from(value: &str) -> Self {
        DbValue::Text(value.to_owned())
    }
}

/// Column type/value mapping policies shipped with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// `SQLite` declared-type names with type-affinity fallback
    #[default]
    Sqlite,
    /// Exact ANSI type names only; everything else is `Any`
    Standard,
}

impl Backend {
    #[must_use]
    pub fn customisations(self) -> Arc<dyn Customisations> {
        match self {
            Backend::Sqlite => Arc::new(SqliteCustomisations),
            Backend::Standard => Arc::new(StandardCustomisations),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int32_range_is_checked() {
        assert_eq!(i32::decode(DbValue::Int(7)).unwrap(), Some(7));
        assert!(i32::decode(DbValue::Int(i64::MAX)).is_err());
        assert_eq!(i32::decode(DbValue::Null).unwrap(), None);
    }

    #[test]
    fn text_timestamps_decode() {
        let ts = NaiveDateTime::decode(DbValue::Text("2024-03-01 10:20:30".into()))
            .unwrap()
            .unwrap();
        assert_eq!(ts.format("%F %T").to_string(), "2024-03-01 10:20:30");
        assert!(NaiveDate::decode(DbValue::Text("not a date".into())).is_err());
    }

    #[test]
    fn encode_round_trips_through_option() {
        assert_eq!(DbValue::from(Some(2.5_f64)), DbValue::Float(2.5));
        assert_eq!(DbValue::from(None::<String>), DbValue::Null);
        assert_eq!(f64::decode(DbValue::Int(3)).unwrap(), Some(3.0));
    }
}
