use std::fmt;

use serde::Deserialize;

use super::{Schema, Version, VersionIndeterminate, VersionNumber};
use crate::database::{Database, Xact};
use crate::error::SqlTypegenError;
use crate::statement::Update;
use crate::types::DbValue;

/// Name and shape of the version table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchemaOptions {
    pub version_table: String,
    pub version_column: String,
    pub version_column_type: String,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            version_table: "$$__version".to_string(),
            version_column: "version".to_string(),
            version_column_type: "integer".to_string(),
        }
    }
}

/// One schema step, run inside the step's transaction.
pub type SchemaStep = Box<dyn Fn(&Xact<'_>) -> Result<(), SqlTypegenError> + Send + Sync>;

/// A [`Schema`] assembled from closures.
///
/// ```rust,no_run
/// # use sql_typegen::prelude::*;
/// # fn demo(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
/// let schema = SqlSchema::new(db)
///     .create(|xact| xact.execute_batch("CREATE TABLE $$orders (id INTEGER PRIMARY KEY)"))
///     .update(|xact| xact.execute_batch("ALTER TABLE $$orders ADD COLUMN total REAL"));
/// let version = schema.setup(&mut TracingProgress::default())?;
/// # let _ = version;
/// # Ok(())
/// # }
/// ```
pub struct SqlSchema<'db> {
    database: &'db Database,
    options: SchemaOptions,
    create: Option<SchemaStep>,
    updates: Vec<SchemaStep>,
}

impl fmt::Debug for SqlSchema<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlSchema")
            .field("options", &self.options)
            .field("has_create", &self.create.is_some())
            .field("updates", &self.updates.len())
            .finish_non_exhaustive()
    }
}

impl<'db> SqlSchema<'db> {
    #[must_use]
    pub fn new(database: &'db Database) -> Self {
        Self::with_options(database, SchemaOptions::default())
    }

    #[must_use]
    pub fn with_options(database: &'db Database, options: SchemaOptions) -> Self {
        Self {
            database,
            options,
            create: None,
            updates: Vec::new(),
        }
    }

    #[must_use]
    pub fn create(
        mut self,
        step: impl Fn(&Xact<'_>) -> Result<(), SqlTypegenError> + Send + Sync + 'static,
    ) -> Self {
        self.create = Some(Box::new(step));
        self
    }

    /// Append the update that moves the schema to the next version.
    #[must_use]
    pub fn update(
        mut self,
        step: impl Fn(&Xact<'_>) -> Result<(), SqlTypegenError> + Send + Sync + 'static,
    ) -> Self {
        self.updates.push(Box::new(step));
        self
    }

    #[must_use]
    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    fn version_table_exists(&self) -> Result<bool, SqlTypegenError> {
        let table = self.database.replace_table_names(&self.options.version_table);
        let rows = self.database.query_rows(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
            &[DbValue::Text(table)],
        )?;
        Ok(!rows.is_empty())
    }

    fn write_version(&self, xact: &Xact<'_>, version: VersionNumber) -> Result<(), SqlTypegenError> {
        let sql = format!(
            "UPDATE {} SET {} = ?",
            self.options.version_table, self.options.version_column
        );
        xact.update(&Update::new(sql, vec![DbValue::from(i64::from(version.0))]))?;
        Ok(())
    }
}

impl Schema for SqlSchema<'_> {
    fn database(&self) -> &Database {
        self.database
    }

    fn get_version(&self) -> Version {
        match self.version_table_exists() {
            Ok(false) => return Version::NoVersionTable,
            Ok(true) => {}
            Err(e) => return Version::Indeterminate(VersionIndeterminate::ReadError(e.to_string())),
        }
        let sql = format!(
            "SELECT {} FROM {}",
            self.options.version_column, self.options.version_table
        );
        let rows = match self.database.query_rows(&sql, &[]) {
            Ok(rows) => rows,
            Err(e) => return Version::Indeterminate(VersionIndeterminate::ReadError(e.to_string())),
        };
        let Some(value) = rows.iter().next().and_then(|row| row.get_by_index(0)) else {
            return Version::Indeterminate(VersionIndeterminate::TableEmpty);
        };
        match value.as_int().map(u32::try_from) {
            Some(Ok(v)) => Version::Known(VersionNumber(v)),
            _ => Version::Indeterminate(VersionIndeterminate::ValueInvalid(value.to_string())),
        }
    }

    fn create(&self, xact: &Xact<'_>) -> Result<(), SqlTypegenError> {
        if let Some(create) = &self.create {
            create(xact)?;
        }
        xact.execute_batch(&format!(
            "CREATE TABLE {} ({} {})",
            self.options.version_table,
            self.options.version_column,
            self.options.version_column_type
        ))?;
        let sql = format!(
            "INSERT INTO {} ({}) VALUES (?)",
            self.options.version_table, self.options.version_column
        );
        xact.update(&Update::new(sql, vec![DbValue::from(0_i64)]))?;
        Ok(())
    }

    fn update_count(&self) -> u32 {
        u32::try_from(self.updates.len()).unwrap_or(u32::MAX)
    }

    fn apply_update(&self, xact: &Xact<'_>, to: VersionNumber) -> Result<(), SqlTypegenError> {
        let index = to.0.checked_sub(1).map(|i| i as usize);
        let step = index.and_then(|i| self.updates.get(i)).ok_or_else(|| {
            SqlTypegenError::ExecutionError(format!("no schema update leads to {to}"))
        })?;
        step(xact)?;
        self.write_version(xact, to)
    }
}
