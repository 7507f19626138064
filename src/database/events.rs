use std::fmt;
use std::panic::Location;

/// Audit record broadcast for every statement executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlEvent {
    /// `file:line` of the call that issued the statement
    pub location: String,
    /// SQL text as sent to the backend, after table-name replacement
    pub sql_text: String,
}

impl fmt::Display for SqlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.sql_text)
    }
}

/// Receives an [`SqlEvent`] synchronously, on the executing thread.
pub trait SqlEventListener: Send + Sync {
    fn on_sql_event(&self, event: &SqlEvent);
}

impl<F> SqlEventListener for F
where
    F: Fn(&SqlEvent) + Send + Sync,
{
    fn on_sql_event(&self, event: &SqlEvent) {
        self(event);
    }
}

#[track_caller]
pub(crate) fn caller_location() -> String {
    let location = Location::caller();
    format!("{}:{}", location.file(), location.line())
}
