//! OOXML spreadsheet package support: part writers, part readers, ZIP
//! packaging and password hashing.

pub mod doc_path;
pub mod error;
pub mod package;
pub mod protection;
pub mod reader;
pub mod writer;

pub use doc_path::DocumentPath;
pub use error::{OoxmlError, Result};

/// XML namespaces used across the spreadsheet parts.
pub mod ns {
    /// Main SpreadsheetML namespace.
    pub const SPREADSHEET_MAIN: &str =
        "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
    /// Relationship-reference namespace (the `r:` prefix).
    pub const RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
}
