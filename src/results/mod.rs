mod list;
mod result_set;
mod row;
mod tuple;
mod updatable;

pub use list::{Decoded, RowFailure, TupleList};
pub use result_set::ResultSet;
pub use row::DbRow;
pub use tuple::{ColumnDescriptor, FieldGetFailure, Tuple, display_tuple};
pub use updatable::UpdatableTuple;

pub(crate) use updatable::resolve_key_columns;
