//! Typed SQL access for `SQLite`, plus build-time generation of the typed
//! wrappers that use it.
//!
//! At run time a [`Database`] executes statements and decodes rows into
//! [`Tuple`] types. At build time a [`Definer`] probes statements against a
//! live database and writes tuple, query, update and value-of types, plus a
//! facade aggregating them, as Rust source.

pub mod codegen;
pub mod customisations;
pub mod database;
pub mod definer;
pub mod error;
pub mod introspect;
pub mod parametrise;
pub mod pool;
pub mod prelude;
pub mod results;
pub mod schema;
pub mod sqlite;
pub mod statement;
pub mod types;

// Generated code reaches these through the runtime crate path.
pub use chrono;
pub use serde_json;

pub use customisations::{Customisations, StandardCustomisations};
pub use database::{
    Database, DatabaseBuilder, SqlEvent, SqlEventListener, TransactionResult, Xact,
};
pub use definer::{
    BatchReport, DefineQueryResult, DefineUpdateResult, DefineValueOfResult, Definer,
    DefinerOptions, StatementFailure,
};
pub use error::SqlTypegenError;
pub use pool::{ConnectionSource, ScopedConnection, SqliteFileSource};
pub use results::{
    ColumnDescriptor, DbRow, Decoded, FieldGetFailure, ResultSet, RowFailure, Tuple, TupleList,
    UpdatableTuple, display_tuple,
};
pub use schema::{
    NoProgress, ProgressIndicator, Schema, SchemaOptions, SetupFailure, SqlSchema,
    TracingProgress, Version, VersionIndeterminate, VersionNumber,
};
pub use sqlite::{SqliteCustomisations, SqliteOptions, SqliteOptionsBuilder};
pub use statement::{
    Query, QueryStatement, Statement, Update, UpdateStatement, ValueOf, ValueOfStatement,
};
pub use types::{Backend, DbScalar, DbValue, HostType};
