/// Error types for OOXML package operations.
use thiserror::Error;

/// Result type for OOXML package operations.
pub type Result<T> = std::result::Result<T, OoxmlError>;

/// Error types for OOXML package operations.
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Part not found in the package
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// Value cannot be represented in the target format
    #[error("Format error: {0}")]
    Format(String),

    /// Invalid style data
    #[error("Style error: {0}")]
    Style(String),

    /// Invalid cell address or range
    #[error("Range error: {0}")]
    Range(String),

    /// ZIP container error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<quick_xml::Error> for OoxmlError {
    fn from(err: quick_xml::Error) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}

impl From<crate::common::error::Error> for OoxmlError {
    fn from(err: crate::common::error::Error) -> Self {
        use crate::common::error::Error;
        match err {
            Error::Format(s) => OoxmlError::Format(s),
            Error::Style(s) => OoxmlError::Style(s),
            Error::Range(s) => OoxmlError::Range(s),
            Error::Io(e) => OoxmlError::Io(e),
        }
    }
}
