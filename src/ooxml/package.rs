//! ZIP package assembly and extraction.
//!
//! The write side collects styles and strings in one pass, then streams
//! every part into the archive: content types and relationship manifests
//! first, then the workbook, stylesheet, shared strings and worksheets.
//! The read side extracts named parts and hands each to its reader.

use std::collections::HashMap;
use std::io::{Read, Seek, Write};

use zip::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::common::xml::XmlElement;
use crate::ooxml::doc_path::DocumentPath;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::reader;
use crate::ooxml::writer::{PartKind, SaveContext, WriterRegistry};
use crate::sheet::workbook::Workbook;

const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_SHARED_STRINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";

/// Write a workbook as a complete XLSX package using the default writers.
pub fn write_package<W: Write + Seek>(workbook: &Workbook, writer: W) -> Result<()> {
    let ctx = SaveContext::collect(workbook)?;
    let registry = WriterRegistry::with_defaults();
    write_package_with(workbook, writer, &registry, &ctx)
}

/// Write a workbook with a caller-supplied writer registry.
pub fn write_package_with<W: Write + Seek>(
    workbook: &Workbook,
    writer: W,
    registry: &WriterRegistry,
    ctx: &SaveContext,
) -> Result<()> {
    let mut zip = ZipWriter::new(writer);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    add_part(
        &mut zip,
        options,
        &DocumentPath::root("[Content_Types].xml"),
        &content_types(workbook),
    )?;
    add_part(
        &mut zip,
        options,
        &DocumentPath::new("_rels", ".rels"),
        &root_relationships(),
    )?;

    // styles and strings are referenced by the sheets, so their ids must
    // already be final; the collection pass guaranteed that
    let workbook_part = registry.build_part(PartKind::Workbook, workbook, ctx, 0)?;
    add_part(
        &mut zip,
        options,
        &DocumentPath::new("xl", "workbook.xml"),
        &workbook_part,
    )?;
    add_part(
        &mut zip,
        options,
        &DocumentPath::new("xl/_rels", "workbook.xml.rels"),
        &workbook_relationships(workbook),
    )?;

    let styles_part = registry.build_part(PartKind::Styles, workbook, ctx, 0)?;
    add_part(
        &mut zip,
        options,
        &DocumentPath::new("xl", "styles.xml"),
        &styles_part,
    )?;

    let strings_part = registry.build_part(PartKind::SharedStrings, workbook, ctx, 0)?;
    add_part(
        &mut zip,
        options,
        &DocumentPath::new("xl", "sharedStrings.xml"),
        &strings_part,
    )?;

    for index in 0..workbook.worksheets().len() {
        let sheet_part = registry.build_part(PartKind::Worksheet, workbook, ctx, index)?;
        add_part(
            &mut zip,
            options,
            &DocumentPath::new("xl/worksheets", &format!("sheet{}.xml", index + 1)),
            &sheet_part,
        )?;
    }

    zip.finish()?;
    Ok(())
}

fn add_part<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: SimpleFileOptions,
    path: &DocumentPath,
    element: &XmlElement,
) -> Result<()> {
    zip.start_file(path.full_path(), options)?;
    zip.write_all(element.to_document().as_bytes())?;
    Ok(())
}

fn content_types(workbook: &Workbook) -> XmlElement {
    let mut types = XmlElement::new("Types");
    types.set_default_namespace(CONTENT_TYPES_NS);

    let rels = types.add_child(XmlElement::new("Default"));
    rels.add_attributes([
        ("Extension", "rels"),
        (
            "ContentType",
            "application/vnd.openxmlformats-package.relationships+xml",
        ),
    ]);
    let xml = types.add_child(XmlElement::new("Default"));
    xml.add_attributes([("Extension", "xml"), ("ContentType", "application/xml")]);

    let overrides = [
        (
            "/xl/workbook.xml".to_string(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
        ),
        (
            "/xl/styles.xml".to_string(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml",
        ),
        (
            "/xl/sharedStrings.xml".to_string(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml",
        ),
    ];
    for (part, content_type) in overrides {
        let element = types.add_child(XmlElement::new("Override"));
        element.add_attribute("PartName", part);
        element.add_attribute("ContentType", content_type);
    }
    for index in 0..workbook.worksheets().len() {
        let element = types.add_child(XmlElement::new("Override"));
        element.add_attribute("PartName", format!("/xl/worksheets/sheet{}.xml", index + 1));
        element.add_attribute(
            "ContentType",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml",
        );
    }
    types
}

fn root_relationships() -> XmlElement {
    let mut rels = XmlElement::new("Relationships");
    rels.set_default_namespace(RELATIONSHIPS_NS);
    let rel = rels.add_child(XmlElement::new("Relationship"));
    rel.add_attributes([
        ("Id", "rId1"),
        ("Type", REL_OFFICE_DOCUMENT),
        ("Target", "xl/workbook.xml"),
    ]);
    rels
}

fn workbook_relationships(workbook: &Workbook) -> XmlElement {
    let mut rels = XmlElement::new("Relationships");
    rels.set_default_namespace(RELATIONSHIPS_NS);

    // worksheet ids match the rIds written into workbook.xml
    let sheet_count = workbook.worksheets().len();
    for index in 0..sheet_count {
        let rel = rels.add_child(XmlElement::new("Relationship"));
        rel.add_attribute("Id", format!("rId{}", index + 1));
        rel.add_attribute("Type", REL_WORKSHEET);
        rel.add_attribute("Target", format!("worksheets/sheet{}.xml", index + 1));
    }
    let styles = rels.add_child(XmlElement::new("Relationship"));
    styles.add_attribute("Id", format!("rId{}", sheet_count + 1));
    styles.add_attribute("Type", REL_STYLES);
    styles.add_attribute("Target", "styles.xml");
    let strings = rels.add_child(XmlElement::new("Relationship"));
    strings.add_attribute("Id", format!("rId{}", sheet_count + 2));
    strings.add_attribute("Type", REL_SHARED_STRINGS);
    strings.add_attribute("Target", "sharedStrings.xml");
    rels
}

/// Read a complete XLSX package into a workbook.
pub fn read_package<R: Read + Seek>(reader: R) -> Result<Workbook> {
    let mut archive = ZipArchive::new(reader)?;

    let workbook_xml = read_part(&mut archive, "xl/workbook.xml")?;
    let rels_xml = read_part_optional(&mut archive, "xl/_rels/workbook.xml.rels")?;
    let styles_xml = read_part_optional(&mut archive, "xl/styles.xml")?;
    let strings_xml = read_part_optional(&mut archive, "xl/sharedStrings.xml")?;

    let style_container = match &styles_xml {
        Some(xml) => reader::styles::parse_stylesheet(xml)?,
        None => reader::styles::StyleReaderContainer::default(),
    };
    let shared_strings = match &strings_xml {
        Some(xml) => reader::strings::parse_shared_strings(xml)?,
        None => Vec::new(),
    };

    let manifest = reader::workbook::parse_workbook(&workbook_xml)?;
    let targets: HashMap<String, String> = match &rels_xml {
        Some(xml) => reader::workbook::parse_relationships(xml)?,
        None => HashMap::new(),
    };

    let mut workbook = Workbook::new();
    workbook.protection = manifest.protection;
    for (index, sheet_ref) in manifest.sheets.iter().enumerate() {
        // fall back to positional naming when the relationship is absent
        let target = targets
            .get(&sheet_ref.rel_id)
            .cloned()
            .unwrap_or_else(|| format!("worksheets/sheet{}.xml", index + 1));
        let path = format!("xl/{target}");
        let sheet_xml = read_part(&mut archive, &path)?;
        let sheet = reader::worksheet::parse_worksheet(
            &sheet_xml,
            &sheet_ref.name,
            &style_container,
            &shared_strings,
        )?;
        workbook.push_worksheet(sheet);
    }
    Ok(workbook)
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    read_part_optional(archive, path)?
        .ok_or_else(|| OoxmlError::PartNotFound(path.to_string()))
}

fn read_part_optional<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<Option<String>> {
    let mut file = match archive.by_name(path) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut contents = String::with_capacity(file.size() as usize);
    file.read_to_string(&mut contents)?;
    Ok(Some(contents))
}
