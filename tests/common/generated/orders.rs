// WARNING: Auto-generated code. DO NOT EDIT!

///Returns rows of [`super::OrdersTuple`].
#[derive(Debug, Clone, PartialEq)]
pub struct Orders {
    arguments: Vec<sql_typegen::DbValue>,
}
impl Orders {
    pub const SQL: &'static str = "SELECT * FROM $$orders WHERE customer = ?";
    #[must_use]
    pub fn new(customer: &str) -> Self {
        Self {
            arguments: vec![sql_typegen::DbValue::from(customer)],
        }
    }
}
impl sql_typegen::Statement for Orders {
    fn sql(&self) -> &str {
        Self::SQL
    }
    fn arguments(&self) -> &[sql_typegen::DbValue] {
        &self.arguments
    }
}
impl Orders {
    /// # Errors
    /// Returns `SqlTypegenError` if the query cannot be executed.
    #[track_caller]
    pub fn query(
        database: &sql_typegen::Database,
        customer: &str,
    ) -> Result<
        sql_typegen::TupleList<super::OrdersTuple>,
        sql_typegen::SqlTypegenError,
    > {
        database.query(&Self::new(customer))
    }
    /// # Errors
    /// Returns `SqlTypegenError` if the query cannot be executed.
    #[track_caller]
    pub fn query_with(
        xact: &sql_typegen::Xact<'_>,
        customer: &str,
    ) -> Result<
        sql_typegen::TupleList<super::OrdersTuple>,
        sql_typegen::SqlTypegenError,
    > {
        xact.query(&Self::new(customer))
    }
    /// # Errors
    /// Returns `SqlTypegenError` if the query cannot be executed.
    #[track_caller]
    pub fn query_first(
        database: &sql_typegen::Database,
        customer: &str,
    ) -> Result<
        Option<sql_typegen::Decoded<super::OrdersTuple>>,
        sql_typegen::SqlTypegenError,
    > {
        database.query_first(&Self::new(customer))
    }
    /// Rows that can be modified and written back to their table.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` if the table's key columns cannot be
    /// resolved or the query fails.
    #[track_caller]
    pub fn query_for_update<'db>(
        database: &'db sql_typegen::Database,
        customer: &str,
    ) -> Result<
        Vec<sql_typegen::UpdatableTuple<'db, super::OrdersTuple>>,
        sql_typegen::SqlTypegenError,
    > {
        database.query_for_update(&Self::new(customer))
    }
}
impl sql_typegen::QueryStatement for Orders {
    type Tuple = super::OrdersTuple;
    fn table_name(&self) -> Option<&str> {
        Some("$$orders")
    }
}
