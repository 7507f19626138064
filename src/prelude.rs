//! Convenient imports for common functionality.
//!
//! ```rust
//! use sql_typegen::prelude::*;
//! ```

pub use crate::database::{Database, DatabaseBuilder, SqlEvent, TransactionResult, Xact};
pub use crate::definer::{Definer, DefinerOptions};
pub use crate::error::SqlTypegenError;
pub use crate::pool::SqliteFileSource;
pub use crate::results::{ColumnDescriptor, Decoded, Tuple, TupleList, UpdatableTuple};
pub use crate::schema::{NoProgress, Schema, SqlSchema, TracingProgress, Version, VersionNumber};
pub use crate::sqlite::SqliteOptionsBuilder;
pub use crate::statement::{
    Query, QueryStatement, Statement, Update, UpdateStatement, ValueOf, ValueOfStatement,
};
pub use crate::types::{Backend, DbScalar, DbValue, HostType};
