//! The worksheet model: cells, dimensions, merged regions, protection.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::common::error::{Error, Result};
use crate::sheet::cell::{Cell, CellValue};
use crate::sheet::geometry::{MergeStrategy, merge_range, subtract_range};
use crate::sheet::metrics;
use crate::sheet::range::{CellAddress, Range};
use crate::sheet::style::Style;

/// Worksheet protection settings. Flags name the actions that remain
/// allowed while the sheet is protected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetProtection {
    /// Plaintext password, hashed on write; `None` protects without one
    pub password: Option<String>,
    pub allow_format_cells: bool,
    pub allow_format_columns: bool,
    pub allow_format_rows: bool,
    pub allow_insert_columns: bool,
    pub allow_insert_rows: bool,
    pub allow_delete_columns: bool,
    pub allow_delete_rows: bool,
    pub allow_sort: bool,
    pub allow_auto_filter: bool,
    pub allow_select_locked_cells: bool,
    pub allow_select_unlocked_cells: bool,
}

/// A frozen/split pane position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PaneSplit {
    /// Split position from the left, in character widths
    pub width: Option<f64>,
    /// Split position from the top, in points
    pub height: Option<f64>,
}

/// A single worksheet.
///
/// Cells are keyed by `(row, column)` so iteration is row-major, matching
/// the order `sheetData` is written in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Worksheet {
    name: String,
    cells: BTreeMap<(u32, u32), Cell>,
    row_styles: HashMap<u32, Style>,
    column_styles: HashMap<u32, Style>,
    /// User-facing column widths in characters
    column_widths: HashMap<u32, f64>,
    /// User-facing row heights in points
    row_heights: HashMap<u32, f64>,
    merged: Vec<Range>,
    pub protection: Option<SheetProtection>,
    pub pane_split: Option<PaneSplit>,
}

impl Worksheet {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set a cell value, replacing any existing cell at the address.
    pub fn set_cell<V: Into<CellValue>>(&mut self, address: CellAddress, value: V) {
        self.cells
            .insert((address.row, address.column), Cell::new(value));
    }

    /// Set a cell value with an explicit style.
    pub fn set_cell_styled<V: Into<CellValue>>(
        &mut self,
        address: CellAddress,
        value: V,
        style: Style,
    ) {
        self.cells
            .insert((address.row, address.column), Cell::styled(value, style));
    }

    /// Place a prebuilt cell at the address.
    pub fn insert_cell(&mut self, address: CellAddress, cell: Cell) {
        self.cells.insert((address.row, address.column), cell);
    }

    pub fn cell(&self, address: &CellAddress) -> Option<&Cell> {
        self.cells.get(&(address.row, address.column))
    }

    /// All cells in row-major order with their addresses.
    pub fn cells(&self) -> impl Iterator<Item = (CellAddress, &Cell)> {
        self.cells.iter().map(|(&(row, column), cell)| {
            (CellAddress { column, row }, cell)
        })
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// The bounding range of all cells, if any exist.
    pub fn dimension(&self) -> Option<Range> {
        let mut keys = self.cells.keys();
        let &(first_row, first_col) = keys.next()?;
        let (mut min_col, mut max_col) = (first_col, first_col);
        let mut max_row = first_row;
        for &(row, col) in keys {
            min_col = min_col.min(col);
            max_col = max_col.max(col);
            max_row = max_row.max(row);
        }
        Some(Range {
            start: CellAddress {
                column: min_col,
                row: first_row,
            },
            end: CellAddress {
                column: max_col,
                row: max_row,
            },
        })
    }

    /// Set the default style for a whole row.
    pub fn set_row_style(&mut self, row: u32, style: Style) {
        self.row_styles.insert(row, style);
    }

    /// Set the default style for a whole column.
    pub fn set_column_style(&mut self, column: u32, style: Style) {
        self.column_styles.insert(column, style);
    }

    #[inline]
    pub fn row_styles(&self) -> &HashMap<u32, Style> {
        &self.row_styles
    }

    #[inline]
    pub fn column_styles(&self) -> &HashMap<u32, Style> {
        &self.column_styles
    }

    /// Set a column width in characters. Fails outside the valid width
    /// range so bad values surface at the call site rather than at save.
    pub fn set_column_width(&mut self, column: u32, width: f64) -> Result<()> {
        metrics::get_internal_column_width(width)?;
        self.column_widths.insert(column, width);
        Ok(())
    }

    /// Set a row height in points; validated like column widths.
    pub fn set_row_height(&mut self, row: u32, height: f64) -> Result<()> {
        metrics::get_internal_row_height(height)?;
        self.row_heights.insert(row, height);
        Ok(())
    }

    /// Store a width exactly as read from a file, skipping validation and
    /// the user-unit transform.
    pub(crate) fn set_column_width_raw(&mut self, column: u32, width: f64) {
        self.column_widths.insert(column, width);
    }

    /// Store a height exactly as read from a file. File heights are
    /// already pixel-snapped, so re-serializing them is idempotent.
    pub(crate) fn set_row_height_raw(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }

    #[inline]
    pub fn column_widths(&self) -> &HashMap<u32, f64> {
        &self.column_widths
    }

    #[inline]
    pub fn row_heights(&self) -> &HashMap<u32, f64> {
        &self.row_heights
    }

    /// Merge a cell range into the merged-region set, coalescing with
    /// adjacent regions column-first.
    pub fn merge_cells(&mut self, range: Range) {
        self.merged = merge_range(&self.merged, range, MergeStrategy::MergeColumns);
    }

    /// Remove a range from the merged-region set.
    pub fn unmerge_cells(&mut self, range: Range) {
        self.merged = subtract_range(&self.merged, range, MergeStrategy::MergeColumns);
    }

    #[inline]
    pub fn merged_ranges(&self) -> &[Range] {
        &self.merged
    }

    /// Replace the merged-region list wholesale (used when loading).
    pub(crate) fn set_merged_ranges(&mut self, ranges: Vec<Range>) {
        self.merged = ranges;
    }

    /// Protect the sheet, optionally with a password.
    pub fn protect(&mut self, protection: SheetProtection) {
        self.protection = Some(protection);
    }
}

/// Validate a worksheet name against the format's rules: non-empty, at
/// most 31 characters, none of `\ / ? * [ ] :`.
pub fn validate_sheet_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Format("worksheet name must not be empty".to_string()));
    }
    if name.chars().count() > 31 {
        return Err(Error::Format(format!(
            "worksheet name `{name}` exceeds 31 characters"
        )));
    }
    if name.contains(['\\', '/', '?', '*', '[', ']', ':']) {
        return Err(Error::Format(format!(
            "worksheet name `{name}` contains a forbidden character"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> CellAddress {
        s.parse().unwrap()
    }

    #[test]
    fn test_cells_iterate_row_major() {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell(addr("B2"), 2.0);
        ws.set_cell(addr("A1"), 1.0);
        ws.set_cell(addr("C1"), 3.0);
        let order: Vec<String> = ws.cells().map(|(a, _)| a.to_string()).collect();
        assert_eq!(order, ["A1", "C1", "B2"]);
    }

    #[test]
    fn test_dimension() {
        let mut ws = Worksheet::new("Sheet1");
        assert_eq!(ws.dimension(), None);
        ws.set_cell(addr("B2"), 1.0);
        ws.set_cell(addr("D5"), 2.0);
        assert_eq!(ws.dimension(), Some("B2:D5".parse().unwrap()));
    }

    #[test]
    fn test_dimension_accounts_for_leftward_later_rows() {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell(addr("C1"), 1.0);
        ws.set_cell(addr("A3"), 2.0);
        assert_eq!(ws.dimension(), Some("A1:C3".parse().unwrap()));
    }

    #[test]
    fn test_merge_unmerge() {
        let mut ws = Worksheet::new("Sheet1");
        ws.merge_cells("A1:B2".parse().unwrap());
        ws.merge_cells("A3:B4".parse().unwrap());
        assert_eq!(ws.merged_ranges(), &["A1:B4".parse().unwrap()]);
        ws.unmerge_cells("A1:B4".parse().unwrap());
        assert!(ws.merged_ranges().is_empty());
    }

    #[test]
    fn test_dimension_validation_is_eager() {
        let mut ws = Worksheet::new("Sheet1");
        assert!(ws.set_column_width(0, 300.0).is_err());
        assert!(ws.set_column_width(0, 12.0).is_ok());
        assert!(ws.set_row_height(0, 500.0).is_err());
        assert!(ws.set_row_height(0, 15.0).is_ok());
    }

    #[test]
    fn test_sheet_name_rules() {
        assert!(validate_sheet_name("Sheet1").is_ok());
        assert!(validate_sheet_name("").is_err());
        assert!(validate_sheet_name(&"x".repeat(32)).is_err());
        assert!(validate_sheet_name("bad/name").is_err());
        assert!(validate_sheet_name("a[1]").is_err());
    }
}
