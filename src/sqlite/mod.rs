// SQLite module - provides the SQLite-specific pieces of the access layer
//
// - config: pooled `Database` construction from `SqliteOptions`
// - customisations: declared-type and value mapping for SQLite columns
// - params: conversion from `DbValue` to rusqlite values
// - query: raw value extraction and `ResultSet` building

pub mod config;
pub mod customisations;
pub mod params;
pub mod query;

pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use customisations::SqliteCustomisations;
pub use params::{Params, db_value_to_sqlite_value};
pub use query::{build_result_set, sqlite_extract_value};
