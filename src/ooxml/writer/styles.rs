//! `styles.xml` generation from a populated [`StyleRegistry`].
//!
//! The stylesheet references sub-components by the dense ids the registry
//! assigned, so the registry must be fully populated before this writer
//! runs. Element order inside `styleSheet` is fixed by the schema:
//! `numFmts`, `fonts`, `fills`, `borders`, `cellStyleXfs`, `cellXfs`,
//! `cellStyles`.

use crate::common::numeric::fmt_f64;
use crate::common::xml::XmlElement;
use crate::ooxml::error::Result;
use crate::ooxml::ns;
use crate::sheet::style::registry::{CellXf, StyleRegistry};
use crate::sheet::style::{
    Border, BorderSide, CellProtection, Color, Fill, Font, PatternType,
};

/// Build the complete `styleSheet` document element.
pub fn build_stylesheet(registry: &StyleRegistry) -> Result<XmlElement> {
    let mut sheet = XmlElement::new("styleSheet");
    sheet.set_default_namespace(ns::SPREADSHEET_MAIN);

    // numFmts holds custom formats only; built-ins are implied by id
    let custom = registry.custom_formats();
    if !custom.is_empty() {
        let num_fmts = sheet.add_child_with_attribute("numFmts", "count", &custom.len().to_string(), None);
        for (id, code) in custom {
            let fmt = num_fmts.add_child(XmlElement::new("numFmt"));
            fmt.add_attribute("numFmtId", id.to_string());
            fmt.add_attribute("formatCode", code);
        }
    }

    let fonts = sheet.add_child_with_attribute(
        "fonts",
        "count",
        &registry.fonts().len().to_string(),
        None,
    );
    for font in registry.fonts() {
        fonts.add_child(build_font(font));
    }

    let fills = sheet.add_child_with_attribute(
        "fills",
        "count",
        &registry.fills().len().to_string(),
        None,
    );
    for fill in registry.fills() {
        fills.add_child(build_fill(fill));
    }

    let borders = sheet.add_child_with_attribute(
        "borders",
        "count",
        &registry.borders().len().to_string(),
        None,
    );
    for border in registry.borders() {
        borders.add_child(build_border(border));
    }

    let style_xfs = sheet.add_child_with_attribute("cellStyleXfs", "count", "1", None);
    let base_xf = style_xfs.add_child(XmlElement::new("xf"));
    base_xf.add_attributes([
        ("numFmtId", "0"),
        ("fontId", "0"),
        ("fillId", "0"),
        ("borderId", "0"),
    ]);

    let cell_xfs = sheet.add_child_with_attribute(
        "cellXfs",
        "count",
        &registry.xfs().len().to_string(),
        None,
    );
    for xf in registry.xfs() {
        cell_xfs.add_child(build_cell_xf(xf)?);
    }

    let cell_styles = sheet.add_child_with_attribute("cellStyles", "count", "1", None);
    let normal = cell_styles.add_child(XmlElement::new("cellStyle"));
    normal.add_attributes([("name", "Normal"), ("xfId", "0"), ("builtinId", "0")]);

    Ok(sheet)
}

fn build_color(color: &Color) -> XmlElement {
    let mut element = XmlElement::new("color");
    match color {
        Color::Rgb(rgb) => element.add_attribute("rgb", rgb),
        Color::Theme(index) => element.add_attribute("theme", index.to_string()),
    }
    element
}

fn build_font(font: &Font) -> XmlElement {
    let mut element = XmlElement::new("font");
    if font.bold {
        element.add_child(XmlElement::new("b"));
    }
    if font.italic {
        element.add_child(XmlElement::new("i"));
    }
    if let Some(token) = font.underline.token() {
        element.add_child_with_attribute("u", "val", token, None);
    }
    if font.strike {
        element.add_child(XmlElement::new("strike"));
    }
    if let Some(token) = font.vertical_align.token() {
        element.add_child_with_attribute("vertAlign", "val", token, None);
    }
    element.add_child_with_attribute("sz", "val", &fmt_f64(font.size), None);
    if let Some(color) = &font.color {
        element.add_child(build_color(color));
    }
    element.add_child_with_attribute("name", "val", &font.name, None);
    if let Some(family) = font.family {
        element.add_child_with_attribute("family", "val", &family.to_string(), None);
    }
    if let Some(scheme) = &font.scheme {
        element.add_child_with_attribute("scheme", "val", scheme, None);
    }
    if let Some(charset) = font.charset {
        element.add_child_with_attribute("charset", "val", &charset.to_string(), None);
    }
    element
}

fn build_fill(fill: &Fill) -> XmlElement {
    let mut element = XmlElement::new("fill");
    let pattern = element.add_child_with_attribute("patternFill", "patternType", fill.pattern.token(), None);
    match fill.pattern {
        PatternType::None => {}
        PatternType::Solid => {
            // a solid fill paints the foreground color; Excel expects the
            // background to fall back to the indexed automatic color
            if let Some(fg) = &fill.foreground {
                pattern.add_child_with_attribute("fgColor", "rgb", fg, None);
            }
            match &fill.background {
                Some(bg) => {
                    pattern.add_child_with_attribute("bgColor", "rgb", bg, None);
                }
                None => {
                    pattern.add_child_with_attribute("bgColor", "indexed", "64", None);
                }
            }
        }
        _ => {
            if let Some(fg) = &fill.foreground {
                pattern.add_child_with_attribute("fgColor", "rgb", fg, None);
            }
            if let Some(bg) = &fill.background {
                pattern.add_child_with_attribute("bgColor", "rgb", bg, None);
            }
        }
    }
    element
}

fn build_border_side(name: &str, side: Option<&BorderSide>) -> XmlElement {
    let mut element = XmlElement::new(name);
    if let Some(side) = side
        && let Some(token) = side.style.token()
    {
        element.add_attribute("style", token);
        if let Some(color) = &side.color {
            element.add_child_with_attribute("color", "rgb", color, None);
        }
    }
    element
}

fn build_border(border: &Border) -> XmlElement {
    let mut element = XmlElement::new("border");
    if border.diagonal_up {
        element.add_attribute("diagonalUp", "1");
    }
    if border.diagonal_down {
        element.add_attribute("diagonalDown", "1");
    }
    // all five side elements are always present, empty when unset
    element.add_child(build_border_side("left", border.left.as_ref()));
    element.add_child(build_border_side("right", border.right.as_ref()));
    element.add_child(build_border_side("top", border.top.as_ref()));
    element.add_child(build_border_side("bottom", border.bottom.as_ref()));
    element.add_child(build_border_side("diagonal", border.diagonal.as_ref()));
    element
}

fn build_protection(protection: &CellProtection) -> XmlElement {
    let mut element = XmlElement::new("protection");
    // three distinct attribute pairs, not two independent flags
    match (protection.locked, protection.hidden) {
        (true, true) => element.add_attributes([("locked", "1"), ("hidden", "1")]),
        (false, true) => element.add_attributes([("hidden", "1"), ("locked", "0")]),
        _ => element.add_attributes([("hidden", "0"), ("locked", "1")]),
    }
    element
}

fn build_cell_xf(xf: &CellXf) -> Result<XmlElement> {
    let style = &xf.style;
    let mut element = XmlElement::new("xf");
    element.add_attribute("numFmtId", xf.num_fmt_id.to_string());
    element.add_attribute("fontId", xf.font_id.to_string());
    element.add_attribute("fillId", xf.fill_id.to_string());
    element.add_attribute("borderId", xf.border_id.to_string());
    element.add_attribute("xfId", "0");

    if style.font != Font::default() {
        element.add_attribute("applyFont", "1");
    }
    if style.fill != Fill::none() {
        element.add_attribute("applyFill", "1");
    }
    if style.border != Border::default() {
        element.add_attribute("applyBorder", "1");
    }
    if xf.num_fmt_id != 0 {
        element.add_attribute("applyNumberFormat", "1");
    }
    if style.alignment.is_set() {
        element.add_attribute("applyAlignment", "1");

        let alignment = element.add_child(XmlElement::new("alignment"));
        if let Some(token) = style.alignment.horizontal.token() {
            alignment.add_attribute("horizontal", token);
        }
        if let Some(token) = style.alignment.vertical.token() {
            alignment.add_attribute("vertical", token);
        }
        if style.alignment.wrap_text {
            alignment.add_attribute("wrapText", "1");
        }
        if style.alignment.shrink_to_fit {
            alignment.add_attribute("shrinkToFit", "1");
        }
        if style.alignment.indent != 0 {
            alignment.add_attribute("indent", style.alignment.indent.to_string());
        }
        if style.alignment.rotation != 0 {
            let rotation = style.alignment.internal_rotation()?;
            alignment.add_attribute("textRotation", rotation.to_string());
        }
    }
    if style.protection.is_set() {
        element.add_attribute("applyProtection", "1");
        element.add_child(build_protection(&style.protection));
    }
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::style::{Alignment, LineStyle, NumberFormat, Style, Underline};

    fn registry_with(styles: &[Style]) -> StyleRegistry {
        let mut registry = StyleRegistry::new();
        for style in styles {
            registry.register(style);
        }
        registry
    }

    #[test]
    fn test_default_stylesheet_structure() {
        let doc = build_stylesheet(&StyleRegistry::new()).unwrap().to_document();
        assert!(!doc.contains("<numFmts"));
        assert!(doc.contains(r#"<fonts count="1">"#));
        assert!(doc.contains(r#"<fills count="2">"#));
        assert!(doc.contains(r#"<patternFill patternType="gray125"/>"#));
        assert!(doc.contains(r#"<borders count="1">"#));
        // no styled cell, no xf entries
        assert!(doc.contains(r#"<cellXfs count="0"/>"#));
        assert!(doc.contains(r#"<cellStyle name="Normal" xfId="0" builtinId="0"/>"#));
        assert!(!doc.contains("applyFont"));
    }

    #[test]
    fn test_custom_formats_only_in_num_fmts() {
        let registry = registry_with(&[
            Style::with_format(NumberFormat::Builtin(14)),
            Style::with_format(NumberFormat::custom("0.000")),
        ]);
        let doc = build_stylesheet(&registry).unwrap().to_document();
        assert!(doc.contains(r#"<numFmts count="1">"#));
        assert!(doc.contains(r#"<numFmt numFmtId="164" formatCode="0.000"/>"#));
        assert!(doc.contains(r#"numFmtId="14""#));
    }

    #[test]
    fn test_format_code_is_escaped() {
        let registry = registry_with(&[Style::with_format(NumberFormat::custom(
            r#"0.0" <units>""#,
        ))]);
        let doc = build_stylesheet(&registry).unwrap().to_document();
        assert!(doc.contains("&lt;units&gt;"));
    }

    #[test]
    fn test_apply_flags_track_deviation() {
        let registry = registry_with(&[Style::bold(), Style::solid_fill("FFFF0000")]);
        let doc = build_stylesheet(&registry).unwrap().to_document();
        assert_eq!(doc.matches(r#"applyFont="1""#).count(), 1);
        assert_eq!(doc.matches(r#"applyFill="1""#).count(), 1);
        assert!(doc.contains(r#"<fgColor rgb="FFFF0000"/>"#));
        assert!(doc.contains(r#"<bgColor indexed="64"/>"#));
    }

    #[test]
    fn test_underline_subtype() {
        let mut style = Style::default();
        style.font.underline = Underline::DoubleAccounting;
        let doc = build_stylesheet(&registry_with(&[style])).unwrap().to_document();
        assert!(doc.contains(r#"<u val="doubleAccounting"/>"#));
    }

    #[test]
    fn test_protection_three_way_table() {
        let mut both = Style::default();
        both.protection.locked = true;
        both.protection.hidden = true;
        let mut hidden_only = Style::default();
        hidden_only.protection.hidden = true;
        let mut locked_only = Style::default();
        locked_only.protection.locked = true;

        let doc = build_stylesheet(&registry_with(&[both, hidden_only, locked_only]))
            .unwrap()
            .to_document();
        assert!(doc.contains(r#"<protection locked="1" hidden="1"/>"#));
        assert!(doc.contains(r#"<protection hidden="1" locked="0"/>"#));
        assert!(doc.contains(r#"<protection hidden="0" locked="1"/>"#));
    }

    #[test]
    fn test_negative_rotation_transformed() {
        let mut style = Style::default();
        style.alignment = Alignment {
            rotation: -45,
            ..Alignment::default()
        };
        let doc = build_stylesheet(&registry_with(&[style])).unwrap().to_document();
        assert!(doc.contains(r#"textRotation="135""#));
    }

    #[test]
    fn test_border_sides_and_diagonal() {
        let mut style = Style::default();
        style.border.top = Some(BorderSide {
            style: LineStyle::Thin,
            color: Some("FF000000".to_string()),
        });
        style.border.diagonal = Some(BorderSide::new(LineStyle::Dashed));
        style.border.diagonal_up = true;
        let doc = build_stylesheet(&registry_with(&[style])).unwrap().to_document();
        assert!(doc.contains(r#"<border diagonalUp="1">"#));
        assert!(doc.contains(r#"<top style="thin"><color rgb="FF000000"/></top>"#));
        assert!(doc.contains(r#"<diagonal style="dashed"/>"#));
        assert!(doc.contains("<left/><right/>"));
    }
}
