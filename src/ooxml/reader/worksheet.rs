//! Worksheet part parsing.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::common::numeric::{parse_bool, try_parse_f64, try_parse_u32};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::reader::resolve_entity;
use crate::ooxml::reader::styles::StyleReaderContainer;
use crate::sheet::cell::{Cell, CellValue};
use crate::sheet::dates::from_serial_date;
use crate::sheet::metrics;
use crate::sheet::range::{CellAddress, Range};
use crate::sheet::style::Style;
use crate::sheet::worksheet::{PaneSplit, SheetProtection, Worksheet};

/// Parse one worksheet part into the sheet model.
///
/// The style container decides how `s` references resolve and which cells
/// carry date formats; the shared-strings table resolves `t="s"` values.
pub fn parse_worksheet(
    content: &str,
    name: &str,
    styles: &StyleReaderContainer,
    shared_strings: &[String],
) -> Result<Worksheet> {
    // no text trimming: cell text around entity references must keep its
    // interior whitespace, and nothing outside `v`/`t` is captured anyway
    let mut reader = Reader::from_str(content);

    let mut sheet = Worksheet::new(name);
    let mut buf = Vec::with_capacity(1024);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"pane" => {
                    let width = attr_value(&reader, &e, b"xSplit")
                        .and_then(|v| try_parse_f64(&v))
                        .map(metrics::get_pane_split_width);
                    let height = attr_value(&reader, &e, b"ySplit")
                        .and_then(|v| try_parse_f64(&v))
                        .map(metrics::get_pane_split_height);
                    if width.is_some() || height.is_some() {
                        sheet.pane_split = Some(PaneSplit { width, height });
                    }
                },
                b"cols" => parse_cols(&mut reader, &mut sheet, styles)?,
                b"sheetData" => parse_sheet_data(&mut reader, &mut sheet, styles, shared_strings)?,
                b"sheetProtection" => {
                    sheet.protection = Some(parse_sheet_protection(&reader, &e));
                },
                b"mergeCells" => parse_merge_cells(&mut reader, &mut sheet)?,
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("XML error in worksheet: {e}"))),
            _ => {},
        }
    }
    Ok(sheet)
}

fn attr_value(reader: &Reader<&[u8]>, e: &BytesStart, name: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == name
            && let Ok(value) = attr.decode_and_unescape_value(reader.decoder())
        {
            return Some(value.to_string());
        }
    }
    None
}

/// Resolve an `s` attribute to the style it references. Absence of an `s`
/// attribute and a reference to a default-valued xf stay distinct states.
fn resolve_style(styles: &StyleReaderContainer, xf_id: u32) -> Option<Style> {
    styles.style_for(xf_id)
}

fn parse_cols(
    reader: &mut Reader<&[u8]>,
    sheet: &mut Worksheet,
    styles: &StyleReaderContainer,
) -> Result<()> {
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"col" => {
                let min = attr_value(reader, &e, b"min").and_then(|v| try_parse_u32(&v));
                let max = attr_value(reader, &e, b"max").and_then(|v| try_parse_u32(&v));
                let (Some(min), Some(max)) = (min, max) else {
                    continue;
                };
                if min == 0 || max < min {
                    continue;
                }
                let width = attr_value(reader, &e, b"width")
                    .and_then(|v| try_parse_f64(&v))
                    .map(metrics::get_column_width)
                    .map(|w| w.clamp(metrics::MIN_COLUMN_WIDTH, metrics::MAX_COLUMN_WIDTH));
                let style = attr_value(reader, &e, b"style")
                    .and_then(|v| try_parse_u32(&v))
                    .and_then(|id| resolve_style(styles, id));
                for column in (min - 1)..max {
                    if let Some(width) = width {
                        sheet.set_column_width_raw(column, width);
                    }
                    if let Some(style) = &style {
                        sheet.set_column_style(column, style.clone());
                    }
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"cols" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("XML error in cols: {e}"))),
            _ => {},
        }
    }
    Ok(())
}

fn parse_sheet_data(
    reader: &mut Reader<&[u8]>,
    sheet: &mut Worksheet,
    styles: &StyleReaderContainer,
    shared_strings: &[String],
) -> Result<()> {
    let mut buf = Vec::with_capacity(1024);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"row" => {
                let Some(row) = attr_value(reader, &e, b"r").and_then(|v| try_parse_u32(&v))
                else {
                    continue;
                };
                if row == 0 {
                    continue;
                }
                let row = row - 1;
                if let Some(height) = attr_value(reader, &e, b"ht").and_then(|v| try_parse_f64(&v))
                {
                    let height = height.clamp(metrics::MIN_ROW_HEIGHT, metrics::MAX_ROW_HEIGHT);
                    sheet.set_row_height_raw(row, height);
                }
                let custom_format = attr_value(reader, &e, b"customFormat")
                    .and_then(|v| parse_bool(&v))
                    .unwrap_or(false);
                if custom_format
                    && let Some(style) = attr_value(reader, &e, b"s")
                        .and_then(|v| try_parse_u32(&v))
                        .and_then(|id| resolve_style(styles, id))
                {
                    sheet.set_row_style(row, style);
                }
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"c" => {
                parse_cell(reader, &e, None, sheet, styles, shared_strings)?;
            },
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"c" => {
                let start = e.into_owned();
                let value = read_cell_value(reader)?;
                parse_cell(reader, &start, value, sheet, styles, shared_strings)?;
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"sheetData" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("XML error in sheetData: {e}"))),
            _ => {},
        }
    }
    Ok(())
}

/// Read the raw `v` (or inline `is`/`t`) text of a cell, consuming events
/// up to the closing `c` tag.
fn read_cell_value(reader: &mut Reader<&[u8]>) -> Result<Option<String>> {
    let mut buf = Vec::with_capacity(256);
    let mut value: Option<String> = None;
    let mut capture = false;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if matches!(e.local_name().as_ref(), b"v" | b"t") {
                    capture = true;
                    value.get_or_insert_with(String::new);
                }
            },
            Ok(Event::Text(ref t)) if capture => {
                let text = String::from_utf8(t.to_vec())
                    .map_err(|_| OoxmlError::Xml("invalid UTF-8 in cell value".to_string()))?;
                if let Some(value) = value.as_mut() {
                    value.push_str(&text);
                }
            },
            Ok(Event::GeneralRef(ref r)) if capture => {
                if let Some(value) = value.as_mut() {
                    resolve_entity(r, value)?;
                }
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"v" | b"t" => capture = false,
                b"c" => break,
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("XML error in cell: {e}"))),
            _ => {},
        }
    }
    Ok(value)
}

fn parse_cell(
    reader: &Reader<&[u8]>,
    e: &BytesStart,
    raw_value: Option<String>,
    sheet: &mut Worksheet,
    styles: &StyleReaderContainer,
    shared_strings: &[String],
) -> Result<()> {
    let Some(address) = attr_value(reader, e, b"r").and_then(|v| v.parse::<CellAddress>().ok())
    else {
        return Ok(());
    };
    let xf_id = attr_value(reader, e, b"s").and_then(|v| try_parse_u32(&v));
    let style = xf_id.and_then(|id| resolve_style(styles, id));
    let cell_type = attr_value(reader, e, b"t");

    let value = match (cell_type.as_deref(), raw_value) {
        (_, None) => CellValue::Empty,
        (Some("s"), Some(raw)) => {
            let index = try_parse_u32(raw.trim()).ok_or_else(|| {
                OoxmlError::Format(format!("'{raw}' is not a shared string index"))
            })? as usize;
            let text = shared_strings.get(index).ok_or_else(|| {
                OoxmlError::Format(format!("shared string index {index} out of range"))
            })?;
            CellValue::Text(text.clone())
        },
        (Some("b"), Some(raw)) => match parse_bool(raw.trim()) {
            Some(value) => CellValue::Bool(value),
            None => CellValue::Empty,
        },
        (Some("str") | Some("inlineStr") | Some("e"), Some(raw)) => CellValue::Text(raw),
        (_, Some(raw)) => match try_parse_f64(raw.trim()) {
            // the style decides whether a numeric value is a date
            Some(number) if xf_id.is_some_and(|id| styles.is_date_time(id)) => {
                CellValue::Date(from_serial_date(number))
            },
            Some(number) => CellValue::Number(number),
            None => CellValue::Text(raw),
        },
    };

    if matches!(value, CellValue::Empty) && style.is_none() {
        return Ok(());
    }
    let cell = match style {
        Some(style) => Cell::styled(value, style),
        None => Cell::new(value),
    };
    sheet.insert_cell(address, cell);
    Ok(())
}

fn parse_sheet_protection(reader: &Reader<&[u8]>, e: &BytesStart) -> SheetProtection {
    let mut protection = SheetProtection::default();
    // restriction attributes default to blocked, so only an explicit "0"
    // re-allows; selection attributes default to allowed
    protection.allow_select_locked_cells = true;
    protection.allow_select_unlocked_cells = true;

    for attr in e.attributes().flatten() {
        let Ok(value) = attr.decode_and_unescape_value(reader.decoder()) else {
            continue;
        };
        let flag = parse_bool(&value);
        match attr.key.local_name().as_ref() {
            b"formatCells" => protection.allow_format_cells = flag == Some(false),
            b"formatColumns" => protection.allow_format_columns = flag == Some(false),
            b"formatRows" => protection.allow_format_rows = flag == Some(false),
            b"insertColumns" => protection.allow_insert_columns = flag == Some(false),
            b"insertRows" => protection.allow_insert_rows = flag == Some(false),
            b"deleteColumns" => protection.allow_delete_columns = flag == Some(false),
            b"deleteRows" => protection.allow_delete_rows = flag == Some(false),
            b"sort" => protection.allow_sort = flag == Some(false),
            b"autoFilter" => protection.allow_auto_filter = flag == Some(false),
            b"selectLockedCells" => {
                protection.allow_select_locked_cells = flag != Some(true);
            },
            b"selectUnlockedCells" => {
                protection.allow_select_unlocked_cells = flag != Some(true);
            },
            _ => {},
        }
    }
    protection
}

fn parse_merge_cells(reader: &mut Reader<&[u8]>, sheet: &mut Worksheet) -> Result<()> {
    let mut buf = Vec::with_capacity(256);
    let mut ranges = Vec::new();

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"mergeCell" =>
            {
                if let Some(range) =
                    attr_value(reader, &e, b"ref").and_then(|v| v.parse::<Range>().ok())
                {
                    ranges.push(range);
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"mergeCells" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("XML error in mergeCells: {e}"))),
            _ => {},
        }
    }
    sheet.set_merged_ranges(ranges);
    Ok(())
}
