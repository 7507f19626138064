// WARNING: Auto-generated code. DO NOT EDIT!

pub mod count_orders;
pub mod orders;
pub mod orders_tuple;
pub use count_orders::CountOrders;
pub use orders::Orders;
pub use orders_tuple::OrdersTuple;
