#![allow(dead_code)]

pub mod generated;

use std::sync::{Arc, Mutex};

use sql_typegen::prelude::*;
use tempfile::TempDir;

pub const ORDERS_DDL: &str = "
    CREATE TABLE $$orders (
        id INTEGER PRIMARY KEY,
        customer TEXT NOT NULL,
        total REAL,
        placed DATE
    );
    INSERT INTO $$orders (id, customer, total, placed) VALUES
        (1, 'alice', 10.5, '2024-01-05'),
        (2, 'bob', 20.0, '2024-02-10'),
        (3, 'alice', 7.25, NULL);
";

/// A pooled database in a fresh temporary directory.
pub fn database(prefix: &str) -> Result<(TempDir, Database), SqlTypegenError> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("test.db");
    let db = Database::sqlite_builder(path.to_string_lossy())
        .pool_size(2)
        .table_prefix(prefix)
        .build()?;
    Ok((dir, db))
}

/// [`database`] with the seeded orders table.
pub fn orders_database() -> Result<(TempDir, Database), SqlTypegenError> {
    let (dir, db) = database("")?;
    db.execute_batch(ORDERS_DDL)?;
    Ok((dir, db))
}

/// Records every SQL event it sees.
#[derive(Debug, Clone, Default)]
pub struct EventLog(pub Arc<Mutex<Vec<SqlEvent>>>);

impl EventLog {
    pub fn listener(&self) -> impl Fn(&SqlEvent) + Send + Sync + 'static {
        let events = Arc::clone(&self.0);
        move |event: &SqlEvent| events.lock().unwrap().push(event.clone())
    }

    pub fn events(&self) -> Vec<SqlEvent> {
        self.0.lock().unwrap().clone()
    }
}
