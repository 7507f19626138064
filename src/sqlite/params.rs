use rusqlite::types::Value;

use crate::types::DbValue;

/// Convert a single `DbValue` to a rusqlite `Value`.
#[must_use]
pub fn db_value_to_sqlite_value(value: &DbValue) -> Value {
    match value {
        DbValue::Null => Value::Null,
        DbValue::Int(i) => Value::Integer(*i),
        DbValue::Float(f) => Value::Real(*f),
        DbValue::Text(s) => Value::Text(s.clone()),
        DbValue::Bool(b) => Value::Integer(i64::from(*b)),
        DbValue::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
        DbValue::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        DbValue::Json(json) => Value::Text(json.to_string()),
        DbValue::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// `SQLite` parameter container, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Params(pub Vec<Value>);

impl Params {
    #[must_use]
    pub fn convert(params: &[DbValue]) -> Self {
        Params(params.iter().map(db_value_to_sqlite_value).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the values as a rusqlite parameter source.
    #[must_use]
    pub fn as_params(&self) -> rusqlite::ParamsFromIter<std::slice::Iter<'_, Value>> {
        rusqlite::params_from_iter(self.0.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn converts_in_order() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let params = Params::convert(&[DbValue::Bool(true), DbValue::Date(date), DbValue::Null]);
        assert_eq!(
            params.0,
            vec![
                Value::Integer(1),
                Value::Text("2024-02-29".into()),
                Value::Null
            ]
        );
    }
}
