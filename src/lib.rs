//! Longan - A Rust library for reading and writing OOXML spreadsheets
//!
//! This library reads and writes Excel workbooks in the Office Open XML
//! format (.xlsx): a ZIP container holding interdependent XML parts bound
//! together by relationship and content-type manifests.
//!
//! # Features
//!
//! - **Style engine**: collects every distinct cell style used across a
//!   workbook, deduplicates fonts, fills, borders and number formats into
//!   the compact indexed tables OOXML requires, and emits/parses them
//!   losslessly (including the Excel 1900 leap-year date quirk)
//! - **Range geometry**: incremental merge/subtract over disjoint
//!   rectangular cell ranges with configurable merge direction
//! - **Serial date codec**: exact conversion between `chrono` types and
//!   Excel's OLE-Automation day-serial representation
//! - **Generic XML tree**: namespace-aware element/attribute builder and
//!   query layer shared by all part writers and readers
//!
//! # Example - Writing a workbook
//!
//! ```no_run
//! use longan::sheet::Workbook;
//! use longan::sheet::style::Style;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut workbook = Workbook::new();
//! let sheet = workbook.add_worksheet("Report")?;
//! sheet.set_cell_styled("A1".parse()?, "Total", Style::bold());
//! sheet.set_cell("B1".parse()?, 1234.5);
//! workbook.save_as("report.xlsx")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Reading styles back
//!
//! ```no_run
//! use longan::sheet::Workbook;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let workbook = Workbook::load("report.xlsx")?;
//! for sheet in workbook.worksheets() {
//!     for (address, cell) in sheet.cells() {
//!         if let Some(style) = &cell.style {
//!             println!("{address} bold={}", style.font.bold);
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Shared utilities: error types, invariant numeric codec, XML tree and
/// escaping, secure credential buffers.
pub mod common;

/// Spreadsheet data model and algorithms: workbook/worksheet containers,
/// cell ranges and the merge/subtract geometry engine, the style model and
/// deduplication registry, serial date and dimension codecs.
pub mod sheet;

/// OOXML package layer: part paths, ZIP container I/O, and the writers and
/// readers for the workbook, worksheet, styles and shared-strings parts.
pub mod ooxml;

// Re-export commonly used types for convenience
pub use common::error::{Error, Result};
pub use sheet::{CellValue, Workbook, Worksheet};
pub use sheet::range::{CellAddress, Range};
pub use sheet::style::Style;
