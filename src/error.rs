use thiserror::Error;

/// Errors surfaced by the facade.
///
/// Usage errors (`InvalidArgument`, `UnexpectedParameters`) are raised before a command reaches
/// the connection worker. Engine failures are passed through untouched in `Sqlite`.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("exec does not accept bound parameters ({0} supplied)")]
    UnexpectedParameters(usize),

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Value conversion error: {0}")]
    Conversion(String),
}

impl DriverError {
    /// True for errors raised by argument checks rather than by the engine.
    #[must_use]
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::UnexpectedParameters(_)
        )
    }
}
