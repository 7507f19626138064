use std::collections::HashMap;
use std::sync::Arc;

use super::row::{DbRow, index_columns};
use crate::types::DbValue;

/// Untyped result of a query: column names plus one [`DbRow`] per row.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<DbRow>,
    column_names: Arc<Vec<String>>,
    column_index_cache: Arc<HashMap<String, usize>>,
}

impl ResultSet {
    #[must_use]
    pub fn with_columns(column_names: Arc<Vec<String>>) -> ResultSet {
        let column_index_cache = Arc::new(index_columns(&column_names));
        ResultSet {
            results: Vec::new(),
            column_names,
            column_index_cache,
        }
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Add a row to the result set; the column index is shared, not rebuilt.
    pub fn add_row_values(&mut self, values: Vec<DbValue>) {
        self.results.push(DbRow {
            column_names: Arc::clone(&self.column_names),
            values,
            column_index_cache: Arc::clone(&self.column_index_cache),
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DbRow> {
        self.results.iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a DbRow;
    type IntoIter = std::slice::Iter<'a, DbRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_share_column_lookup() {
        let mut rs = ResultSet::with_columns(Arc::new(vec!["id".into(), "Name".into()]));
        rs.add_row_values(vec![DbValue::Int(1), DbValue::from("a")]);
        rs.add_row_values(vec![DbValue::Int(2), DbValue::Null]);

        assert_eq!(rs.len(), 2);
        assert_eq!(rs.results[0].get("Name"), Some(&DbValue::from("a")));
        assert_eq!(rs.results[1].get("name"), Some(&DbValue::Null));
        assert!(Arc::ptr_eq(
            &rs.results[0].column_index_cache,
            &rs.results[1].column_index_cache
        ));
    }
}
