// WARNING: Auto-generated code. DO NOT EDIT!

///Row of 4 column(s): `id` Int32, `customer` Text, `total` Float64, `placed` Date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrdersTuple {
    pub id: Option<i32>,
    pub customer: Option<String>,
    pub total: Option<f64>,
    pub placed: Option<sql_typegen::chrono::NaiveDate>,
}
impl OrdersTuple {
    pub const COLUMNS: &'static [sql_typegen::ColumnDescriptor] = &[
        sql_typegen::ColumnDescriptor::new("id", sql_typegen::HostType::Int32),
        sql_typegen::ColumnDescriptor::new("customer", sql_typegen::HostType::Text),
        sql_typegen::ColumnDescriptor::new("total", sql_typegen::HostType::Float64),
        sql_typegen::ColumnDescriptor::new("placed", sql_typegen::HostType::Date),
    ];
}
impl sql_typegen::Tuple for OrdersTuple {
    const NAME: &'static str = "OrdersTuple";
    fn column_descriptors() -> &'static [sql_typegen::ColumnDescriptor] {
        Self::COLUMNS
    }
    fn set_field(
        &mut self,
        index: usize,
        value: sql_typegen::DbValue,
    ) -> Result<(), sql_typegen::SqlTypegenError> {
        match index {
            0usize => self.id = sql_typegen::DbScalar::decode(value)?,
            1usize => self.customer = sql_typegen::DbScalar::decode(value)?,
            2usize => self.total = sql_typegen::DbScalar::decode(value)?,
            3usize => self.placed = sql_typegen::DbScalar::decode(value)?,
            _ => return Err(<Self as sql_typegen::Tuple>::no_such_field(index)),
        }
        Ok(())
    }
    fn field(&self, index: usize) -> Option<sql_typegen::DbValue> {
        match index {
            0usize => Some(sql_typegen::DbScalar::encode(self.id.clone())),
            1usize => Some(sql_typegen::DbScalar::encode(self.customer.clone())),
            2usize => Some(sql_typegen::DbScalar::encode(self.total.clone())),
            3usize => Some(sql_typegen::DbScalar::encode(self.placed.clone())),
            _ => None,
        }
    }
}
impl ::std::fmt::Display for OrdersTuple {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        sql_typegen::display_tuple(self, f)
    }
}
