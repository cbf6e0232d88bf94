//! Unified error types for the Longan library.
use thiserror::Error;

/// Main error type for Longan operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A value cannot be represented in the target numeric or date format,
    /// e.g. a date outside the serial range or a column width out of bounds.
    #[error("Format error: {0}")]
    Format(String),

    /// Invalid style data: malformed color hex, an invalid enum
    /// combination, or a reference to an unregistered style.
    #[error("Style error: {0}")]
    Style(String),

    /// Invalid or inverted cell address or range.
    #[error("Range error: {0}")]
    Range(String),

    /// IO error, wrapping any underlying stream, package or parse failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Longan operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap an arbitrary failure as an IO error with the original cause
    /// attached, preserving the source chain.
    pub fn io_wrap<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    }
}
