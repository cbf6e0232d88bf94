//! `styles.xml` parsing.
//!
//! Parsed components land in a [`StyleReaderContainer`]: flat component
//! lists indexed by the file's own ids, plus a number-format arena in
//! which every distinct `numFmtId` resolves to exactly one entry, shared
//! by every xf that references it. Ids the file never declares are
//! synthesized as built-in formats on first reference.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::common::numeric::{parse_bool, try_parse_f64};
use crate::ooxml::error::{OoxmlError, Result};
use crate::sheet::style::{
    Alignment, Border, BorderSide, CellProtection, Color, Fill, Font, HorizontalAlign, LineStyle,
    NumberFormat, PatternType, Style, Underline, VerticalAlign, VerticalTextAlign,
};

/// One `cellXfs` entry as read from the file.
#[derive(Debug, Clone)]
pub struct ReadCellXf {
    pub font_id: u32,
    pub fill_id: u32,
    pub border_id: u32,
    /// Index into the container's number-format arena
    pub format_index: usize,
    pub alignment: Alignment,
    pub protection: CellProtection,
}

/// All style components read from one stylesheet.
#[derive(Debug, Default)]
pub struct StyleReaderContainer {
    fonts: Vec<Font>,
    fills: Vec<Fill>,
    borders: Vec<Border>,
    number_formats: Vec<NumberFormat>,
    format_indices: HashMap<u32, usize>,
    xfs: Vec<ReadCellXf>,
}

impl StyleReaderContainer {
    /// The arena index for a `numFmtId`, creating a built-in entry the
    /// first time an undeclared id is referenced. Equal ids always map to
    /// the same index.
    fn intern_format_id(&mut self, id: u32) -> usize {
        if let Some(&index) = self.format_indices.get(&id) {
            return index;
        }
        let index = self.number_formats.len();
        self.number_formats.push(NumberFormat::Builtin(id));
        self.format_indices.insert(id, index);
        index
    }

    #[inline]
    pub fn xfs(&self) -> &[ReadCellXf] {
        &self.xfs
    }

    #[inline]
    pub fn number_format(&self, index: usize) -> Option<&NumberFormat> {
        self.number_formats.get(index)
    }

    /// Whether the xf marks cell values as dates or times.
    pub fn is_date_time(&self, xf_id: u32) -> bool {
        self.xfs
            .get(xf_id as usize)
            .and_then(|xf| self.number_formats.get(xf.format_index))
            .is_some_and(NumberFormat::is_date_time)
    }

    /// Reassemble the full [`Style`] an xf id refers to. Component ids
    /// that point outside their tables fall back to defaults rather than
    /// failing, matching how spreadsheet applications tolerate them.
    pub fn style_for(&self, xf_id: u32) -> Option<Style> {
        let xf = self.xfs.get(xf_id as usize)?;
        Some(Style {
            font: self
                .fonts
                .get(xf.font_id as usize)
                .cloned()
                .unwrap_or_default(),
            fill: self
                .fills
                .get(xf.fill_id as usize)
                .cloned()
                .unwrap_or_default(),
            border: self
                .borders
                .get(xf.border_id as usize)
                .cloned()
                .unwrap_or_default(),
            number_format: self
                .number_formats
                .get(xf.format_index)
                .cloned()
                .unwrap_or_default(),
            alignment: xf.alignment.clone(),
            protection: xf.protection,
        })
    }
}

/// Parse a complete stylesheet.
pub fn parse_stylesheet(content: &str) -> Result<StyleReaderContainer> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut container = StyleReaderContainer::default();
    let mut buf = Vec::with_capacity(1024);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"numFmts" => parse_number_formats(&mut reader, &mut container)?,
                b"fonts" => parse_fonts(&mut reader, &mut container.fonts)?,
                b"fills" => parse_fills(&mut reader, &mut container.fills)?,
                b"borders" => parse_borders(&mut reader, &mut container.borders)?,
                b"cellXfs" => parse_cell_xfs(&mut reader, &mut container)?,
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("XML error in styleSheet: {e}"))),
            _ => {},
        }
    }
    Ok(container)
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

fn attr_u32(reader: &Reader<&[u8]>, e: &BytesStart, name: &[u8]) -> Option<u32> {
    attr_value(reader, e, name).and_then(|v| v.parse().ok())
}

/// A `val`-less flag element is true; an explicit `val` decides.
fn flag_value(reader: &Reader<&[u8]>, e: &BytesStart) -> bool {
    match attr_value(reader, e, b"val") {
        Some(value) => parse_bool(&value).unwrap_or(true),
        None => true,
    }
}

fn parse_number_formats(
    reader: &mut Reader<&[u8]>,
    container: &mut StyleReaderContainer,
) -> Result<()> {
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"numFmt" => {
                let id = attr_u32(reader, &e, b"numFmtId");
                let code = attr_value(reader, &e, b"formatCode");
                if let (Some(id), Some(code)) = (id, code) {
                    let index = container.number_formats.len();
                    container.number_formats.push(NumberFormat::Custom(code));
                    container.format_indices.insert(id, index);
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"numFmts" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("XML error in numFmts: {e}"))),
            _ => {},
        }
    }
    Ok(())
}

fn parse_fonts(reader: &mut Reader<&[u8]>, fonts: &mut Vec<Font>) -> Result<()> {
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"font" => {
                fonts.push(parse_font(reader)?);
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"font" => {
                fonts.push(Font::default());
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"fonts" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("XML error in fonts: {e}"))),
            _ => {},
        }
    }
    Ok(())
}

fn parse_font(reader: &mut Reader<&[u8]>) -> Result<Font> {
    let mut font = Font::default();
    let mut buf = Vec::with_capacity(256);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"name" => {
                    if let Some(value) = attr_value(reader, &e, b"val") {
                        font.name = value;
                    }
                },
                b"sz" => {
                    if let Some(value) = attr_value(reader, &e, b"val")
                        && let Some(size) = try_parse_f64(&value)
                    {
                        font.size = size;
                    }
                },
                b"b" => font.bold = flag_value(reader, &e),
                b"i" => font.italic = flag_value(reader, &e),
                b"strike" => font.strike = flag_value(reader, &e),
                b"u" => {
                    font.underline = match attr_value(reader, &e, b"val") {
                        Some(token) => Underline::from_token(&token),
                        None => Underline::Single,
                    };
                },
                b"vertAlign" => {
                    if let Some(token) = attr_value(reader, &e, b"val") {
                        font.vertical_align = VerticalTextAlign::from_token(&token);
                    }
                },
                b"color" => {
                    if let Some(rgb) = attr_value(reader, &e, b"rgb") {
                        font.color = Some(Color::Rgb(rgb));
                    } else if let Some(theme) = attr_u32(reader, &e, b"theme") {
                        font.color = Some(Color::Theme(theme));
                    }
                },
                b"family" => font.family = attr_u32(reader, &e, b"val"),
                b"scheme" => font.scheme = attr_value(reader, &e, b"val"),
                b"charset" => font.charset = attr_u32(reader, &e, b"val"),
                _ => {},
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"font" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("XML error in font: {e}"))),
            _ => {},
        }
    }
    Ok(font)
}

fn parse_fills(reader: &mut Reader<&[u8]>, fills: &mut Vec<Fill>) -> Result<()> {
    let mut buf = Vec::with_capacity(512);
    let mut current: Option<Fill> = None;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"fill" => {
                fills.push(Fill::default());
            },
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"fill" => current = Some(Fill::default()),
                b"patternFill" => {
                    if let Some(fill) = current.as_mut()
                        && let Some(token) = attr_value(reader, &e, b"patternType")
                    {
                        fill.pattern = PatternType::from_token(&token);
                    }
                },
                b"fgColor" => {
                    if let Some(fill) = current.as_mut() {
                        fill.foreground = attr_value(reader, &e, b"rgb");
                    }
                },
                b"bgColor" => {
                    // indexed automatic backgrounds read back as unset
                    if let Some(fill) = current.as_mut() {
                        fill.background = attr_value(reader, &e, b"rgb");
                    }
                },
                _ => {},
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"fill" => {
                    if let Some(fill) = current.take() {
                        fills.push(fill);
                    }
                },
                b"fills" => break,
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("XML error in fills: {e}"))),
            _ => {},
        }
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum BorderPart {
    Left,
    Right,
    Top,
    Bottom,
    Diagonal,
}

fn border_slot<'b>(border: &'b mut Border, part: BorderPart) -> &'b mut Option<BorderSide> {
    match part {
        BorderPart::Left => &mut border.left,
        BorderPart::Right => &mut border.right,
        BorderPart::Top => &mut border.top,
        BorderPart::Bottom => &mut border.bottom,
        BorderPart::Diagonal => &mut border.diagonal,
    }
}

fn parse_borders(reader: &mut Reader<&[u8]>, borders: &mut Vec<Border>) -> Result<()> {
    let mut buf = Vec::with_capacity(512);
    let mut current: Option<Border> = None;
    let mut part: Option<BorderPart> = None;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"border" => {
                borders.push(Border::default());
            },
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = e.local_name();
                let side = match name.as_ref() {
                    b"left" => Some(BorderPart::Left),
                    b"right" => Some(BorderPart::Right),
                    b"top" => Some(BorderPart::Top),
                    b"bottom" => Some(BorderPart::Bottom),
                    b"diagonal" => Some(BorderPart::Diagonal),
                    _ => None,
                };
                match name.as_ref() {
                    b"border" => {
                        let mut border = Border::default();
                        if let Some(value) = attr_value(reader, &e, b"diagonalUp") {
                            border.diagonal_up = parse_bool(&value).unwrap_or(false);
                        }
                        if let Some(value) = attr_value(reader, &e, b"diagonalDown") {
                            border.diagonal_down = parse_bool(&value).unwrap_or(false);
                        }
                        current = Some(border);
                    },
                    b"color" => {
                        if let (Some(border), Some(part)) = (current.as_mut(), part)
                            && let Some(side) = border_slot(border, part).as_mut()
                        {
                            side.color = attr_value(reader, &e, b"rgb");
                        }
                    },
                    _ if side.is_some() => {
                        part = side;
                        if let (Some(border), Some(part), Some(token)) =
                            (current.as_mut(), side, attr_value(reader, &e, b"style"))
                        {
                            let style = LineStyle::from_token(&token);
                            if style != LineStyle::None {
                                *border_slot(border, part) = Some(BorderSide::new(style));
                            }
                        }
                    },
                    _ => {},
                }
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"border" => {
                    if let Some(border) = current.take() {
                        borders.push(border);
                    }
                },
                b"borders" => break,
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("XML error in borders: {e}"))),
            _ => {},
        }
    }
    Ok(())
}

fn read_xf(
    reader: &Reader<&[u8]>,
    e: &BytesStart,
    container: &mut StyleReaderContainer,
) -> ReadCellXf {
    let num_fmt_id = attr_u32(reader, e, b"numFmtId").unwrap_or(0);
    ReadCellXf {
        font_id: attr_u32(reader, e, b"fontId").unwrap_or(0),
        fill_id: attr_u32(reader, e, b"fillId").unwrap_or(0),
        border_id: attr_u32(reader, e, b"borderId").unwrap_or(0),
        format_index: container.intern_format_id(num_fmt_id),
        alignment: Alignment::default(),
        protection: CellProtection::default(),
    }
}

fn parse_cell_xfs(reader: &mut Reader<&[u8]>, container: &mut StyleReaderContainer) -> Result<()> {
    let mut buf = Vec::with_capacity(512);
    let mut current: Option<ReadCellXf> = None;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            // an empty xf has no closing event, so it is pushed at once
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"xf" => {
                let xf = read_xf(reader, &e, container);
                container.xfs.push(xf);
            },
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"xf" => {
                current = Some(read_xf(reader, &e, container));
            },
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"alignment" => {
                    if let Some(xf) = current.as_mut() {
                        xf.alignment = parse_alignment(reader, &e);
                    }
                },
                b"protection" => {
                    if let Some(xf) = current.as_mut() {
                        xf.protection = parse_protection(reader, &e);
                    }
                },
                _ => {},
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"xf" => {
                    if let Some(xf) = current.take() {
                        container.xfs.push(xf);
                    }
                },
                b"cellXfs" => break,
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("XML error in cellXfs: {e}"))),
            _ => {},
        }
    }
    Ok(())
}

fn parse_alignment(reader: &Reader<&[u8]>, e: &BytesStart) -> Alignment {
    let mut alignment = Alignment::default();
    if let Some(token) = attr_value(reader, e, b"horizontal") {
        alignment.horizontal = HorizontalAlign::from_token(&token);
    }
    if let Some(token) = attr_value(reader, e, b"vertical") {
        alignment.vertical = VerticalAlign::from_token(&token);
    }
    if let Some(value) = attr_value(reader, e, b"wrapText") {
        alignment.wrap_text = parse_bool(&value).unwrap_or(false);
    }
    if let Some(value) = attr_value(reader, e, b"shrinkToFit") {
        alignment.shrink_to_fit = parse_bool(&value).unwrap_or(false);
    }
    if let Some(indent) = attr_u32(reader, e, b"indent") {
        alignment.indent = indent;
    }
    if let Some(internal) = attr_u32(reader, e, b"textRotation") {
        // 91..=180 encodes the negative range as 90 - r; 255 (vertical
        // text) has no user-range counterpart and reads as 0
        alignment.rotation = match internal {
            0..=90 => internal as i32,
            91..=180 => 90 - internal as i32,
            _ => 0,
        };
    }
    alignment
}

fn parse_protection(reader: &Reader<&[u8]>, e: &BytesStart) -> CellProtection {
    CellProtection {
        // locked defaults to true once a protection element exists
        locked: match attr_value(reader, e, b"locked") {
            Some(value) => parse_bool(&value).unwrap_or(true),
            None => true,
        },
        hidden: attr_value(reader, e, b"hidden")
            .and_then(|value| parse_bool(&value))
            .unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::writer::styles::build_stylesheet;
    use crate::sheet::style::StyleRegistry;

    const STYLESHEET: &str = r#"<?xml version="1.0"?>
        <styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
            <numFmts count="1">
                <numFmt numFmtId="164" formatCode="0.000"/>
            </numFmts>
            <fonts count="2">
                <font><sz val="11"/><name val="Calibri"/><family val="2"/><scheme val="minor"/></font>
                <font><b/><u/><sz val="14"/><color rgb="FF0000FF"/><name val="Arial"/></font>
            </fonts>
            <fills count="3">
                <fill><patternFill patternType="none"/></fill>
                <fill><patternFill patternType="gray125"/></fill>
                <fill><patternFill patternType="solid"><fgColor rgb="FFFF0000"/><bgColor indexed="64"/></patternFill></fill>
            </fills>
            <borders count="2">
                <border><left/><right/><top/><bottom/><diagonal/></border>
                <border diagonalUp="1">
                    <left/><right/>
                    <top style="thin"><color rgb="FF000000"/></top>
                    <bottom/>
                    <diagonal style="dashed"/>
                </border>
            </borders>
            <cellXfs count="4">
                <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
                <xf numFmtId="14" fontId="1" fillId="2" borderId="1" xfId="0" applyFont="1" applyFill="1">
                    <alignment horizontal="center" wrapText="1" textRotation="135"/>
                    <protection hidden="1" locked="0"/>
                </xf>
                <xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
                <xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0"/>
            </cellXfs>
        </styleSheet>"#;

    #[test]
    fn test_components_parsed() {
        let container = parse_stylesheet(STYLESHEET).unwrap();
        assert_eq!(container.fonts.len(), 2);
        assert_eq!(container.fills.len(), 3);
        assert_eq!(container.borders.len(), 2);
        assert_eq!(container.xfs().len(), 4);

        let font = &container.fonts[1];
        assert!(font.bold);
        assert_eq!(font.underline, Underline::Single);
        assert_eq!(font.size, 14.0);
        assert_eq!(font.name, "Arial");
        assert_eq!(font.color, Some(Color::Rgb("FF0000FF".to_string())));

        let fill = &container.fills[2];
        assert_eq!(fill.pattern, PatternType::Solid);
        assert_eq!(fill.foreground.as_deref(), Some("FFFF0000"));
        assert_eq!(fill.background, None);

        let border = &container.borders[1];
        assert!(border.diagonal_up);
        assert_eq!(
            border.top,
            Some(BorderSide {
                style: LineStyle::Thin,
                color: Some("FF000000".to_string()),
            })
        );
        assert_eq!(border.diagonal, Some(BorderSide::new(LineStyle::Dashed)));
        assert_eq!(border.left, None);
    }

    #[test]
    fn test_equal_format_ids_share_one_arena_entry() {
        let container = parse_stylesheet(STYLESHEET).unwrap();
        // xfs 1 and 3 both reference numFmtId 14
        assert_eq!(container.xfs()[1].format_index, container.xfs()[3].format_index);
        assert_ne!(container.xfs()[1].format_index, container.xfs()[2].format_index);
        assert_eq!(
            container.number_format(container.xfs()[2].format_index),
            Some(&NumberFormat::Custom("0.000".to_string()))
        );
    }

    #[test]
    fn test_undeclared_format_id_synthesized_as_builtin() {
        let container = parse_stylesheet(STYLESHEET).unwrap();
        assert_eq!(
            container.number_format(container.xfs()[1].format_index),
            Some(&NumberFormat::Builtin(14))
        );
        assert!(container.is_date_time(1));
        assert!(!container.is_date_time(2));
    }

    #[test]
    fn test_style_reassembly() {
        let container = parse_stylesheet(STYLESHEET).unwrap();
        let style = container.style_for(1).unwrap();
        assert!(style.font.bold);
        assert_eq!(style.fill.pattern, PatternType::Solid);
        assert_eq!(style.alignment.horizontal, HorizontalAlign::Center);
        assert!(style.alignment.wrap_text);
        assert_eq!(style.alignment.rotation, -45);
        assert!(style.protection.hidden);
        assert!(!style.protection.locked);
        assert!(container.style_for(99).is_none());
    }

    #[test]
    fn test_written_stylesheet_reads_back() {
        let mut registry = StyleRegistry::new();
        let mut style = Style::bold();
        style.number_format = NumberFormat::custom("0.0%%");
        style.alignment.rotation = -30;
        let id = registry.register(&style);

        let doc = build_stylesheet(&registry).unwrap().to_document();
        let container = parse_stylesheet(&doc).unwrap();
        let recovered = container.style_for(id).unwrap();
        assert_eq!(recovered, style);
    }
}
