use std::marker::PhantomData;

use crate::results::Tuple;
use crate::types::{DbScalar, DbValue};

/// SQL text plus its positional arguments, in declaration order.
pub trait Statement {
    fn sql(&self) -> &str;

    fn arguments(&self) -> &[DbValue];
}

/// A statement returning rows of `Self::Tuple`.
pub trait QueryStatement: Statement {
    type Tuple: Tuple;

    /// Source table, for statements whose rows can be written back.
    fn table_name(&self) -> Option<&str> {
        None
    }
}

/// A statement returning an affected-row count.
pub trait UpdateStatement: Statement {}

/// A statement returning the first column of its first row.
pub trait ValueOfStatement: Statement {
    type Value: DbScalar;
}

/// Ad-hoc query for a known tuple type.
///
/// ```rust,no_run
/// # use sql_typegen::prelude::*;
/// # #[derive(Debug, Clone, Default, PartialEq)] struct T;
/// # impl Tuple for T {
/// #     const NAME: &'static str = "T";
/// #     fn column_descriptors() -> &'static [ColumnDescriptor] { &[] }
/// #     fn set_field(&mut self, i: usize, _: DbValue) -> Result<(), SqlTypegenError> { Err(Self::no_such_field(i)) }
/// #     fn field(&self, _: usize) -> Option<DbValue> { None }
/// # }
/// let q = Query::<T>::new("SELECT * FROM $$t WHERE id = ?", vec![DbValue::from(1_i64)]);
/// # let _ = q;
/// ```
#[derive(Debug, Clone)]
pub struct Query<T> {
    sql: String,
    arguments: Vec<DbValue>,
    table: Option<String>,
    tuple: PhantomData<fn() -> T>,
}

impl<T: Tuple> Query<T> {
    #[must_use]
    pub fn new(sql: impl Into<String>, arguments: Vec<DbValue>) -> Self {
        Self {
            sql: sql.into(),
            arguments,
            table: None,
            tuple: PhantomData,
        }
    }

    /// Mark the rows as belonging to `table`, enabling for-update execution.
    #[must_use]
    pub fn for_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
}

impl<T: Tuple> Statement for Query<T> {
    fn sql(&self) -> &str {
        &self.sql
    }

    fn arguments(&self) -> &[DbValue] {
        &self.arguments
    }
}

impl<T: Tuple> QueryStatement for Query<T> {
    type Tuple = T;

    fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
    }
}

/// Ad-hoc update, insert, delete or DDL statement.
#[derive(Debug, Clone)]
pub struct Update {
    sql: String,
    arguments: Vec<DbValue>,
}

impl Update {
    #[must_use]
    pub fn new(sql: impl Into<String>, arguments: Vec<DbValue>) -> Self {
        Self {
            sql: sql.into(),
            arguments,
        }
    }
}

impl Statement for Update {
    fn sql(&self) -> &str {
        &self.sql
    }

    fn arguments(&self) -> &[DbValue] {
        &self.arguments
    }
}

impl UpdateStatement for Update {}

/// Ad-hoc scalar query.
#[derive(Debug, Clone)]
pub struct ValueOf<V> {
    sql: String,
    arguments: Vec<DbValue>,
    value: PhantomData<fn() -> V>,
}

impl<V: DbScalar> ValueOf<V> {
    #[must_use]
    pub fn new(sql: impl Into<String>, arguments: Vec<DbValue>) -> Self {
        Self {
            sql: sql.into(),
            arguments,
            value: PhantomData,
        }
    }
}

impl<V: DbScalar> Statement for ValueOf<V> {
    fn sql(&self) -> &str {
        &self.sql
    }

    fn arguments(&self) -> &[DbValue] {
        &self.arguments
    }
}

impl<V: DbScalar> ValueOfStatement for ValueOf<V> {
    type Value = V;
}
