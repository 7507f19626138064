use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{debug, warn};

use super::{Database, Xact};
use crate::error::SqlTypegenError;

/// Outcome of [`Database::process_transaction`]: never an `Err`, the failure is carried here.
#[derive(Debug, Default)]
pub struct TransactionResult {
    /// True if the body succeeded and the transaction committed.
    pub success: bool,
    /// The failure that caused a rollback, if any.
    pub error: Option<SqlTypegenError>,
}

impl TransactionResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Convert into a `Result`, treating a rollback without an error as `Ok(false)`.
    ///
    /// # Errors
    /// Returns the captured failure, if any.
    pub fn into_result(self) -> Result<bool, SqlTypegenError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.success),
        }
    }
}

impl Database {
    /// Run `body` in a transaction: commit on `Ok`, roll back and return the error on `Err`.
    ///
    /// Transactions start `IMMEDIATE`: a second writer waits (up to the busy
    /// timeout) rather than failing when it tries to write.
    ///
    /// ```rust,no_run
    /// # use sql_typegen::prelude::*;
    /// # fn demo(db: &Database) -> Result<(), SqlTypegenError> {
    /// db.transact(|xact| {
    ///     xact.update(&Update::new("INSERT INTO $$log (msg) VALUES (?)", vec!["a".into()]))?;
    ///     xact.update(&Update::new("INSERT INTO $$log (msg) VALUES (?)", vec!["b".into()]))?;
    ///     Ok(())
    /// })
    /// # }
    /// ```
    ///
    /// # Errors
    /// Returns `SqlTypegenError` if a connection cannot be acquired, the body fails,
    /// or the commit fails.
    pub fn transact<R>(
        &self,
        body: impl FnOnce(&Xact<'_>) -> Result<R, SqlTypegenError>,
    ) -> Result<R, SqlTypegenError> {
        self.with_connection(|conn| self.transact_on(conn, body))
    }

    /// [`Database::transact`] on a supplied connection.
    ///
    /// # Errors
    /// See [`Database::transact`].
    pub fn transact_on<R>(
        &self,
        conn: &mut Connection,
        body: impl FnOnce(&Xact<'_>) -> Result<R, SqlTypegenError>,
    ) -> Result<R, SqlTypegenError> {
        self.run_transaction(conn, |xact| body(xact).map(|value| (value, true)))
            .map(|(value, _)| value)
    }

    /// Run `body` in a transaction that commits only if the body returns `Ok(true)`.
    ///
    /// # Errors
    /// See [`Database::transact`].
    pub fn use_transaction(
        &self,
        body: impl FnOnce(&Xact<'_>) -> Result<bool, SqlTypegenError>,
    ) -> Result<bool, SqlTypegenError> {
        self.with_connection(|conn| {
            self.run_transaction(conn, |xact| body(xact).map(|commit| (commit, commit)))
                .map(|(committed, _)| committed)
        })
    }

    /// [`Database::use_transaction`], with every failure captured in the result.
    pub fn process_transaction(
        &self,
        body: impl FnOnce(&Xact<'_>) -> Result<bool, SqlTypegenError>,
    ) -> TransactionResult {
        match self.use_transaction(body) {
            Ok(success) => TransactionResult {
                success,
                error: None,
            },
            Err(error) => TransactionResult {
                success: false,
                error: Some(error),
            },
        }
    }

    /// Run `body` in a transaction that is always rolled back.
    ///
    /// # Errors
    /// Returns `SqlTypegenError` if a connection cannot be acquired or the body fails.
    pub fn dry_run<R>(
        &self,
        body: impl FnOnce(&Xact<'_>) -> Result<R, SqlTypegenError>,
    ) -> Result<R, SqlTypegenError> {
        self.with_connection(|conn| {
            self.run_transaction(conn, |xact| body(xact).map(|value| (value, false)))
                .map(|(value, _)| value)
        })
    }

    fn run_transaction<R>(
        &self,
        conn: &mut Connection,
        body: impl FnOnce(&Xact<'_>) -> Result<(R, bool), SqlTypegenError>,
    ) -> Result<(R, bool), SqlTypegenError> {
        // Write lock from BEGIN: a for-update read and the writes after it never
        // interleave with another transaction.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let outcome = body(&Xact::new(self, &tx));
        match outcome {
            Ok((value, true)) => {
                tx.commit()?;
                Ok((value, true))
            }
            Ok((value, false)) => {
                rollback(tx, None);
                Ok((value, false))
            }
            Err(e) => {
                rollback(tx, Some(&e));
                Err(e)
            }
        }
    }
}

fn rollback(tx: Transaction<'_>, cause: Option<&SqlTypegenError>) {
    match tx.rollback() {
        Ok(()) => match cause {
            Some(cause) => debug!(%cause, "transaction rolled back"),
            None => debug!("transaction rolled back"),
        },
        Err(e) => warn!(error = %e, "transaction rollback failed"),
    }
}
