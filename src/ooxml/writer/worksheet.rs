//! Worksheet part generation.

use crate::common::numeric::fmt_f64;
use crate::common::xml::XmlElement;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::ns;
use crate::ooxml::protection::{Sha512Hash, legacy_password_hash};
use crate::ooxml::writer::SaveContext;
use crate::sheet::cell::{Cell, CellValue};
use crate::sheet::dates::to_serial_date;
use crate::sheet::metrics;
use crate::sheet::range::CellAddress;
use crate::sheet::worksheet::{SheetProtection, Worksheet};

/// Build one worksheet document element.
///
/// Requires the save context to be fully populated: every style referenced
/// by the sheet must already have an xf id and every text value a shared
/// string index.
pub fn build_worksheet(sheet: &Worksheet, ctx: &SaveContext) -> Result<XmlElement> {
    let mut root = XmlElement::new("worksheet");
    root.set_default_namespace(ns::SPREADSHEET_MAIN);
    root.add_namespace_attribute("r", "xmlns", ns::RELATIONSHIPS);

    let dimension = root.add_child(XmlElement::new("dimension"));
    match sheet.dimension() {
        Some(range) => dimension.add_attribute("ref", range.to_string()),
        None => dimension.add_attribute("ref", "A1"),
    }

    if let Some(split) = &sheet.pane_split {
        let views = root.add_child(XmlElement::new("sheetViews"));
        let view = views.add_child_with_attribute("sheetView", "workbookViewId", "0", None);
        let pane = view.add_child(XmlElement::new("pane"));
        if let Some(width) = split.width {
            let internal = metrics::get_internal_pane_split_width(width);
            pane.add_attribute("xSplit", fmt_f64(internal));
        }
        if let Some(height) = split.height {
            let internal = metrics::get_internal_pane_split_height(height);
            pane.add_attribute("ySplit", fmt_f64(internal));
        }
        pane.add_attribute("state", "split");
    }

    build_cols(sheet, ctx, &mut root)?;
    build_sheet_data(sheet, ctx, &mut root)?;

    if let Some(protection) = &sheet.protection {
        root.add_child(build_sheet_protection(protection)?);
    }

    let merged = sheet.merged_ranges();
    if !merged.is_empty() {
        let merge_cells =
            root.add_child_with_attribute("mergeCells", "count", &merged.len().to_string(), None);
        for range in merged {
            merge_cells.add_child_with_attribute("mergeCell", "ref", &range.to_string(), None);
        }
    }

    Ok(root)
}

fn build_cols(sheet: &Worksheet, ctx: &SaveContext, root: &mut XmlElement) -> Result<()> {
    let mut columns: Vec<u32> = sheet
        .column_widths()
        .keys()
        .chain(sheet.column_styles().keys())
        .copied()
        .collect();
    if columns.is_empty() {
        return Ok(());
    }
    columns.sort_unstable();
    columns.dedup();

    let cols = root.add_child(XmlElement::new("cols"));
    for column in columns {
        let col = cols.add_child(XmlElement::new("col"));
        let index = (column + 1).to_string();
        col.add_attribute("min", &index);
        col.add_attribute("max", &index);
        if let Some(&width) = sheet.column_widths().get(&column) {
            col.add_attribute("width", fmt_f64(metrics::get_internal_column_width(width)?));
            col.add_attribute("customWidth", "1");
        }
        if let Some(style) = sheet.column_styles().get(&column) {
            let xf_id = ctx
                .styles
                .lookup(style)
                .ok_or_else(|| OoxmlError::Style("column style was never registered".to_string()))?;
            col.add_attribute("style", xf_id.to_string());
        }
    }
    Ok(())
}

fn build_sheet_data(sheet: &Worksheet, ctx: &SaveContext, root: &mut XmlElement) -> Result<()> {
    let mut rows: Vec<XmlElement> = Vec::new();
    // cells iterate row-major, so each row groups into one element
    let mut cells = sheet.cells().peekable();
    while let Some(&(first, _)) = cells.peek() {
        let row_index = first.row;
        let mut row = XmlElement::new("row");
        row.add_attribute("r", (row_index + 1).to_string());
        if let Some(&height) = sheet.row_heights().get(&row_index) {
            row.add_attribute("ht", fmt_f64(metrics::get_internal_row_height(height)?));
            row.add_attribute("customHeight", "1");
        }
        if let Some(style) = sheet.row_styles().get(&row_index) {
            let xf_id = ctx
                .styles
                .lookup(style)
                .ok_or_else(|| OoxmlError::Style("row style was never registered".to_string()))?;
            row.add_attribute("s", xf_id.to_string());
            row.add_attribute("customFormat", "1");
        }

        while let Some(&(address, _)) = cells.peek() {
            if address.row != row_index {
                break;
            }
            let Some((address, cell)) = cells.next() else {
                break;
            };
            row.add_child(build_cell(&address, cell, ctx)?);
        }
        rows.push(row);
    }

    let sheet_data = root.add_child(XmlElement::new("sheetData"));
    sheet_data.add_children(rows);
    Ok(())
}

fn build_cell(address: &CellAddress, cell: &Cell, ctx: &SaveContext) -> Result<XmlElement> {
    let mut c = XmlElement::new("c");
    c.add_attribute("r", address.to_string());
    if let Some(style) = &cell.style {
        let xf_id = ctx
            .styles
            .lookup(style)
            .ok_or_else(|| OoxmlError::Style("cell style was never registered".to_string()))?;
        c.add_attribute("s", xf_id.to_string());
    }
    match &cell.value {
        CellValue::Empty => {}
        CellValue::Number(value) => {
            c.add_child_with_value("v", &fmt_f64(*value), None);
        }
        CellValue::Bool(value) => {
            c.add_attribute("t", "b");
            c.add_child_with_value("v", if *value { "1" } else { "0" }, None);
        }
        CellValue::Text(value) => {
            let index = ctx
                .strings
                .lookup(value)
                .ok_or_else(|| OoxmlError::Other("text value was never interned".to_string()))?;
            c.add_attribute("t", "s");
            c.add_child_with_value("v", &index.to_string(), None);
        }
        CellValue::Date(value) => {
            let serial = to_serial_date(value)?;
            c.add_child_with_value("v", &fmt_f64(serial), None);
        }
    }
    Ok(c)
}

fn build_sheet_protection(protection: &SheetProtection) -> Result<XmlElement> {
    let mut element = XmlElement::new("sheetProtection");
    element.add_attribute("sheet", "1");
    if let Some(password) = &protection.password {
        // legacy 16-bit hash for old readers, salted SHA-512 for current ones
        element.add_attribute("password", legacy_password_hash(password));
        let hashed = Sha512Hash::new(password)?;
        element.add_attribute("algorithmName", "SHA-512");
        element.add_attribute("hashValue", hashed.hash);
        element.add_attribute("saltValue", hashed.salt);
        element.add_attribute("spinCount", hashed.spin_count.to_string());
    }
    // restriction attributes default to blocked; emit "0" to re-allow
    let allowed: [(&str, bool); 9] = [
        ("formatCells", protection.allow_format_cells),
        ("formatColumns", protection.allow_format_columns),
        ("formatRows", protection.allow_format_rows),
        ("insertColumns", protection.allow_insert_columns),
        ("insertRows", protection.allow_insert_rows),
        ("deleteColumns", protection.allow_delete_columns),
        ("deleteRows", protection.allow_delete_rows),
        ("sort", protection.allow_sort),
        ("autoFilter", protection.allow_auto_filter),
    ];
    for (name, allow) in allowed {
        if allow {
            element.add_attribute(name, "0");
        }
    }
    // selection defaults to allowed; emit "1" to block
    if !protection.allow_select_locked_cells {
        element.add_attribute("selectLockedCells", "1");
    }
    if !protection.allow_select_unlocked_cells {
        element.add_attribute("selectUnlockedCells", "1");
    }
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::style::Style;
    use crate::sheet::workbook::Workbook;

    fn context_for(workbook: &Workbook) -> SaveContext {
        SaveContext::collect(workbook).unwrap()
    }

    fn sheet_with_cells() -> (Workbook, usize) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet("Data").unwrap();
        sheet.set_cell("A1".parse().unwrap(), 42.5);
        sheet.set_cell("B1".parse().unwrap(), "hello");
        sheet.set_cell_styled("A2".parse().unwrap(), true, Style::bold());
        (workbook, 0)
    }

    #[test]
    fn test_dimension_and_cells() {
        let (workbook, index) = sheet_with_cells();
        let ctx = context_for(&workbook);
        let doc = build_worksheet(&workbook.worksheets()[index], &ctx)
            .unwrap()
            .to_document();
        assert!(doc.contains(r#"<dimension ref="A1:B2"/>"#));
        assert!(doc.contains(r#"<c r="A1"><v>42.5</v></c>"#));
        assert!(doc.contains(r#"<c r="B1" t="s"><v>0</v></c>"#));
        assert!(doc.contains(r#"<c r="A2" s="0" t="b"><v>1</v></c>"#));
    }

    #[test]
    fn test_empty_sheet_dimension() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet("Empty").unwrap();
        let ctx = context_for(&workbook);
        let doc = build_worksheet(&workbook.worksheets()[0], &ctx)
            .unwrap()
            .to_document();
        assert!(doc.contains(r#"<dimension ref="A1"/>"#));
        assert!(doc.contains("<sheetData/>"));
    }

    #[test]
    fn test_column_widths_and_row_heights() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet("Sized").unwrap();
        sheet.set_cell("A1".parse().unwrap(), 1.0);
        sheet.set_column_width(0, 10.0).unwrap();
        sheet.set_row_height(0, 10.0).unwrap();
        let ctx = context_for(&workbook);
        let doc = build_worksheet(&workbook.worksheets()[0], &ctx)
            .unwrap()
            .to_document();
        assert!(doc.contains(r#"<col min="1" max="1" width="10.7109375" customWidth="1"/>"#));
        assert!(doc.contains(r#"<row r="1" ht="9.75" customHeight="1">"#));
    }

    #[test]
    fn test_merged_cells_block() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet("Merged").unwrap();
        sheet.merge_cells("A1:B2".parse().unwrap());
        let ctx = context_for(&workbook);
        let doc = build_worksheet(&workbook.worksheets()[0], &ctx)
            .unwrap()
            .to_document();
        assert!(doc.contains(r#"<mergeCells count="1"><mergeCell ref="A1:B2"/></mergeCells>"#));
    }

    #[test]
    fn test_sheet_protection_attributes() {
        let protection = SheetProtection {
            password: Some("pw".to_string()),
            allow_sort: true,
            allow_select_unlocked_cells: true,
            ..SheetProtection::default()
        };
        let doc = build_sheet_protection(&protection).unwrap().to_document();
        assert!(doc.contains(r#"sheet="1""#));
        assert!(doc.contains(&format!(r#"password="{}""#, legacy_password_hash("pw"))));
        assert!(doc.contains(r#"algorithmName="SHA-512""#));
        assert!(doc.contains(r#"spinCount="100000""#));
        assert!(doc.contains(r#"sort="0""#));
        assert!(!doc.contains("formatCells"));
        assert!(doc.contains(r#"selectLockedCells="1""#));
        assert!(!doc.contains("selectUnlockedCells"));
    }

    #[test]
    fn test_pane_split() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet("Split").unwrap();
        sheet.pane_split = Some(crate::sheet::worksheet::PaneSplit {
            width: Some(8.5),
            height: Some(20.0),
        });
        let ctx = context_for(&workbook);
        let doc = build_worksheet(&workbook.worksheets()[0], &ctx)
            .unwrap()
            .to_document();
        assert!(doc.contains(r#"ySplit="700""#));
        assert!(doc.contains(r#"state="split""#));
        assert!(doc.contains("xSplit="));
    }
}
