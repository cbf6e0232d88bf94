//! Spreadsheet data model and core algorithms.
//!
//! Everything here is format-independent: cell values, styles and their
//! deduplicating registry, the serial date codec, dimension transforms,
//! and the merged-range geometry. The `ooxml` module maps this model onto
//! the XLSX package format.
//!
//! # Quick Start
//!
//! ```no_run
//! use longan::sheet::{Workbook, Style};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.add_worksheet("Report")?;
//! sheet.set_cell_styled("A1".parse()?, "Total", Style::bold());
//! sheet.set_cell("B1".parse()?, 1234.5);
//! workbook.save_as("report.xlsx")?;
//! # Ok::<(), longan::Error>(())
//! ```

pub mod cell;
pub mod dates;
pub mod geometry;
pub mod metrics;
pub mod range;
pub mod style;
pub(crate) mod workbook;
pub(crate) mod worksheet;

pub use cell::{Cell, CellValue};
pub use geometry::{MergeStrategy, merge_range, subtract_range};
pub use range::{CellAddress, Range};
pub use style::{Style, StyleRegistry};
pub use workbook::{Workbook, WorkbookProtection};
pub use worksheet::{PaneSplit, SheetProtection, Worksheet};
