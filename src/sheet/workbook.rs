//! The workbook model and its save/load entry points.

use std::io::{Read, Seek, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::error::{Error, Result};
use crate::ooxml;
use crate::sheet::worksheet::{Worksheet, validate_sheet_name};

/// Workbook-level protection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkbookProtection {
    /// Prevent sheet reordering, insertion and deletion
    pub lock_structure: bool,
    /// Prevent window resizing and moving
    pub lock_windows: bool,
    /// Plaintext password, hashed on write
    pub password: Option<String>,
}

/// An in-memory workbook.
///
/// # Examples
///
/// ```no_run
/// use longan::sheet::{Workbook, CellValue};
///
/// let mut workbook = Workbook::new();
/// let sheet = workbook.add_worksheet("Sheet1")?;
/// sheet.set_cell("A1".parse()?, "hello");
/// workbook.save_as("out.xlsx")?;
/// # Ok::<(), longan::Error>(())
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
    pub protection: Option<WorkbookProtection>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a worksheet with the given name. Fails on an invalid or
    /// duplicate name.
    pub fn add_worksheet<N: Into<String>>(&mut self, name: N) -> Result<&mut Worksheet> {
        let name = name.into();
        validate_sheet_name(&name)?;
        if self.sheets.iter().any(|s| s.name() == name) {
            return Err(Error::Format(format!(
                "a worksheet named `{name}` already exists"
            )));
        }
        let index = self.sheets.len();
        self.sheets.push(Worksheet::new(name));
        Ok(&mut self.sheets[index])
    }

    /// Append an already-built worksheet (used when loading).
    pub(crate) fn push_worksheet(&mut self, sheet: Worksheet) {
        self.sheets.push(sheet);
    }

    #[inline]
    pub fn worksheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    pub fn worksheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    pub fn worksheet_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.sheets.iter_mut().find(|s| s.name() == name)
    }

    /// Write the workbook as an XLSX package to a file path.
    pub fn save_as<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.save_to(std::io::BufWriter::new(file))
    }

    /// Write the workbook as an XLSX package to any seekable writer.
    pub fn save_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        ooxml::package::write_package(self, writer)?;
        Ok(())
    }

    /// Read a workbook from an XLSX file path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::load_from(std::io::BufReader::new(file))
    }

    /// Read a workbook from any seekable reader.
    pub fn load_from<R: Read + Seek>(reader: R) -> Result<Self> {
        Ok(ooxml::package::read_package(reader)?)
    }

    /// Save on a blocking task; the synchronous core runs unchanged.
    pub async fn save_as_async<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let workbook = self.clone();
        let path = path.as_ref().to_path_buf();
        tokio::task::spawn_blocking(move || workbook.save_as(path))
            .await
            .map_err(Error::io_wrap)?
    }

    /// Load on a blocking task; the synchronous core runs unchanged.
    pub async fn load_async<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        tokio::task::spawn_blocking(move || Self::load(path))
            .await
            .map_err(Error::io_wrap)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_worksheet_rejects_duplicates() {
        let mut wb = Workbook::new();
        wb.add_worksheet("Data").unwrap();
        assert!(wb.add_worksheet("Data").is_err());
        assert!(wb.add_worksheet("bad:name").is_err());
        assert_eq!(wb.worksheets().len(), 1);
    }

    #[test]
    fn test_worksheet_lookup() {
        let mut wb = Workbook::new();
        wb.add_worksheet("First").unwrap();
        wb.add_worksheet("Second").unwrap();
        assert!(wb.worksheet("Second").is_some());
        assert!(wb.worksheet("Third").is_none());
        wb.worksheet_mut("First")
            .unwrap()
            .set_cell("A1".parse().unwrap(), 1.0);
        assert_eq!(wb.worksheet("First").unwrap().cell_count(), 1);
    }
}
