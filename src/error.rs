use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlTypegenError {
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error(transparent)]
    PoolError(#[from] r2d2::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter binding error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Mapping error: {0}")]
    MappingError(String),

    #[error("Code generation error: {0}")]
    GenerationError(String),

    #[error("Name collision: {name} is already defined by {existing}")]
    NameCollision { name: String, existing: String },

    #[error("Key columns unresolved for table {table}: {reason}")]
    KeyColumnsUnresolved { table: String, reason: String },
}

impl SqlTypegenError {
    /// True for failures raised before any statement reached the backend.
    #[must_use]
    pub fn is_parameter_error(&self) -> bool {
        matches!(self, Self::ParameterError(_))
    }
}
