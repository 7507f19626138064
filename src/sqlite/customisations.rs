use crate::customisations::{Customisations, normalise_type_name};
use crate::types::HostType;

/// `SQLite` column mapping.
///
/// Well-known declared type names map exactly; anything else falls back to
/// `SQLite`'s type-affinity rules. Columns with no declared type (expressions,
/// aggregates) are [`HostType::Any`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteCustomisations;

impl Customisations for SqliteCustomisations {
    fn column_type(&self, declared: Option<&str>) -> HostType {
        match declared.map(str::trim) {
            None | Some("") => HostType::Any,
            Some(name) => sqlite_host_type(&normalise_type_name(name)),
        }
    }
}

fn sqlite_host_type(name: &str) -> HostType {
    match name {
        "BOOLEAN" | "BOOL" => HostType::Bool,
        "TINYINT" | "SMALLINT" | "INT2" | "INT" | "INTEGER" | "MEDIUMINT" => HostType::Int32,
        "BIGINT" | "INT8" | "UNSIGNED BIG INT" => HostType::Int64,
        "DATE" => HostType::Date,
        "DATETIME" | "TIMESTAMP" => HostType::Timestamp,
        "DECIMAL" | "DOUBLE" | "DOUBLE PRECISION" | "NUMERIC" | "REAL" | "FLOAT" => {
            HostType::Float64
        }
        "CHARACTER" | "NCHAR" | "NATIVE CHARACTER" | "CHAR" | "VARCHAR"
        | "VARYING CHARACTER" | "NVARCHAR" | "TEXT" | "CLOB" => HostType::Text,
        "BLOB" => HostType::Blob,
        "JSON" => HostType::Json,
        other => affinity(other),
    }
}

// https://www.sqlite.org/datatype3.html#determination_of_column_affinity
fn affinity(name: &str) -> HostType {
    if name.contains("INT") {
        HostType::Int64
    } else if name.contains("CHAR") || name.contains("CLOB") || name.contains("TEXT") {
        HostType::Text
    } else if name.contains("BLOB") {
        HostType::Blob
    } else if name.contains("REAL") || name.contains("FLOA") || name.contains("DOUB") {
        HostType::Float64
    } else {
        HostType::Any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DbValue;

    #[test]
    fn maps_declared_names() {
        let c = SqliteCustomisations;
        assert_eq!(c.column_type(Some("int")), HostType::Int32);
        assert_eq!(c.column_type(Some("real")), HostType::Float64);
        assert_eq!(c.column_type(Some("VARCHAR(255)")), HostType::Text);
        assert_eq!(c.column_type(Some("unsigned big int")), HostType::Int64);
        assert_eq!(c.column_type(Some("datetime")), HostType::Timestamp);
        assert_eq!(c.column_type(None), HostType::Any);
    }

    #[test]
    fn falls_back_to_affinity() {
        let c = SqliteCustomisations;
        assert_eq!(c.column_type(Some("HUGEINTEGER")), HostType::Int64);
        assert_eq!(c.column_type(Some("LONGTEXT")), HostType::Text);
        assert_eq!(c.column_type(Some("FLOAT8")), HostType::Float64);
        assert_eq!(c.column_type(Some("FLOATING POINT")), HostType::Int64);
        assert_eq!(c.column_type(Some("MONEY")), HostType::Any);
    }

    #[test]
    fn values_follow_declared_type() {
        let c = SqliteCustomisations;
        assert_eq!(
            c.column_value(DbValue::Int(3), Some("REAL")).unwrap(),
            DbValue::Float(3.0)
        );
        assert!(c.column_value(DbValue::Text("abc".into()), Some("INTEGER")).is_err());
    }
}
