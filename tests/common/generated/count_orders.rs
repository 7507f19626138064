// WARNING: Auto-generated code. DO NOT EDIT!

///Single Int64 value: `SELECT COUNT(*) FROM $$orders`
#[derive(Debug, Clone, PartialEq)]
pub struct CountOrders {
    arguments: Vec<sql_typegen::DbValue>,
}
impl CountOrders {
    pub const SQL: &'static str = "SELECT COUNT(*) FROM $$orders";
    #[must_use]
    pub fn new() -> Self {
        Self { arguments: vec![] }
    }
}
impl sql_typegen::Statement for CountOrders {
    fn sql(&self) -> &str {
        Self::SQL
    }
    fn arguments(&self) -> &[sql_typegen::DbValue] {
        &self.arguments
    }
}
impl CountOrders {
    /// `None` when no row is returned or the value is NULL.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` if the query fails or the value has the wrong type.
    #[track_caller]
    pub fn value_of(
        database: &sql_typegen::Database,
    ) -> Result<Option<i64>, sql_typegen::SqlTypegenError> {
        database.value_of(&Self::new())
    }
    /// # Errors
    /// Returns `SqlTypegenError` if the query fails or the value has the wrong type.
    #[track_caller]
    pub fn value_of_with(
        xact: &sql_typegen::Xact<'_>,
    ) -> Result<Option<i64>, sql_typegen::SqlTypegenError> {
        xact.value_of(&Self::new())
    }
}
impl sql_typegen::ValueOfStatement for CountOrders {
    type Value = i64;
}
