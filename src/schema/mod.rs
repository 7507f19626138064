//! Versioned schema setup.
//!
//! A schema is created once (version 0) and then moved forward one update at
//! a time. Each step runs in its own transaction together with the write of
//! the new version, so a failed step leaves the database at the last version
//! that committed.

mod progress;
mod sql_schema;
mod version;

pub use progress::{NoProgress, ProgressIndicator, TracingProgress};
pub use sql_schema::{SchemaOptions, SchemaStep, SqlSchema};
pub use version::{Version, VersionIndeterminate, VersionNumber};

use tracing::{info, warn};

use crate::database::{Database, Xact};
use crate::error::SqlTypegenError;

/// Setup stopped before reaching the target version.
#[derive(Debug, thiserror::Error)]
#[error("schema setup stopped at {}: {error}", describe(.last_version))]
pub struct SetupFailure {
    /// Last version that committed; `None` if the schema was never created.
    pub last_version: Option<VersionNumber>,
    pub error: SqlTypegenError,
}

fn describe(version: &Option<VersionNumber>) -> String {
    version.map_or_else(|| "no version".to_string(), |v| v.to_string())
}

/// A database schema reached through an ordered list of updates.
pub trait Schema {
    fn database(&self) -> &Database;

    /// Read the version table. Never fails: unreadable states are reported as
    /// [`Version::Indeterminate`].
    fn get_version(&self) -> Version;

    /// Create the schema, the version table, and record version 0.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` if any statement fails.
    fn create(&self, xact: &Xact<'_>) -> Result<(), SqlTypegenError>;

    /// Number of updates; the target version.
    fn update_count(&self) -> u32;

    /// Apply the update that takes the schema to `to` and record `to`.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` if any statement fails.
    fn apply_update(&self, xact: &Xact<'_>, to: VersionNumber) -> Result<(), SqlTypegenError>;

    fn target_version(&self) -> VersionNumber {
        VersionNumber(self.update_count())
    }

    /// Bring the database to [`Schema::target_version`].
    ///
    /// # Errors
    /// Returns `SetupFailure` with the last committed version if the version
    /// cannot be determined or a step fails. Later steps are not attempted.
    fn setup(
        &self,
        progress: &mut dyn ProgressIndicator,
    ) -> Result<VersionNumber, SetupFailure> {
        let target = self.target_version();
        let (mut current, fresh) = match self.get_version() {
            Version::NoVersionTable => (VersionNumber(0), true),
            Version::Known(v) => (v, false),
            Version::Indeterminate(reason) => {
                return Err(SetupFailure {
                    last_version: None,
                    error: SqlTypegenError::ExecutionError(format!(
                        "schema version is indeterminate: {reason}"
                    )),
                });
            }
        };
        if current > target {
            warn!(%current, %target, "database is newer than the schema");
            return Ok(current);
        }

        let steps = usize::from(fresh) + (target.0 - current.0) as usize;
        progress.initialise(steps);
        let mut step = 0;
        if fresh {
            step += 1;
            progress.move_to(step, "creating schema");
            self.database()
                .transact(|xact| self.create(xact))
                .map_err(|error| SetupFailure {
                    last_version: None,
                    error,
                })?;
        }
        while current < target {
            let to = current.next();
            step += 1;
            progress.move_to(step, &format!("updating schema to {to}"));
            self.database()
                .transact(|xact| self.apply_update(xact, to))
                .map_err(|error| SetupFailure {
                    last_version: Some(current),
                    error,
                })?;
            current = to;
        }
        info!(version = %current, "schema is up to date");
        Ok(current)
    }
}
