//! `workbook.xml` and relationship-part parsing.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::common::numeric::parse_bool;
use crate::ooxml::error::{OoxmlError, Result};
use crate::sheet::workbook::WorkbookProtection;

/// One `sheet` entry of the workbook part.
#[derive(Debug, Clone)]
pub struct SheetRef {
    pub name: String,
    /// The `r:id` linking the entry to its worksheet part
    pub rel_id: String,
}

/// What the workbook part declares: the sheet list, in order, and the
/// structure protection settings.
#[derive(Debug, Default)]
pub struct WorkbookManifest {
    pub sheets: Vec<SheetRef>,
    pub protection: Option<WorkbookProtection>,
}

/// Parse the workbook part.
///
/// A stored `workbookPassword` is a one-way hash, so the recovered
/// protection keeps the flags but carries no password; re-saving such a
/// workbook drops the password requirement.
pub fn parse_workbook(content: &str) -> Result<WorkbookManifest> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut manifest = WorkbookManifest::default();
    let mut buf = Vec::with_capacity(1024);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"sheet" => {
                    let mut name = None;
                    let mut rel_id = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.local_name().as_ref() {
                            b"name" => {
                                if let Ok(value) =
                                    attr.decode_and_unescape_value(reader.decoder())
                                {
                                    name = Some(value.to_string());
                                }
                            },
                            b"id" => {
                                if let Ok(value) =
                                    attr.decode_and_unescape_value(reader.decoder())
                                {
                                    rel_id = Some(value.to_string());
                                }
                            },
                            _ => {},
                        }
                    }
                    if let (Some(name), Some(rel_id)) = (name, rel_id) {
                        manifest.sheets.push(SheetRef { name, rel_id });
                    }
                },
                b"workbookProtection" => {
                    let mut protection = WorkbookProtection::default();
                    for attr in e.attributes().flatten() {
                        let Ok(value) = attr.decode_and_unescape_value(reader.decoder()) else {
                            continue;
                        };
                        match attr.key.local_name().as_ref() {
                            b"lockStructure" => {
                                protection.lock_structure =
                                    parse_bool(&value).unwrap_or(false);
                            },
                            b"lockWindows" => {
                                protection.lock_windows = parse_bool(&value).unwrap_or(false);
                            },
                            _ => {},
                        }
                    }
                    manifest.protection = Some(protection);
                },
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("XML error in workbook: {e}"))),
            _ => {},
        }
    }
    Ok(manifest)
}

/// Parse a relationships part into an id-to-target table.
pub fn parse_relationships(content: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut targets = HashMap::new();
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    match attr.key.local_name().as_ref() {
                        b"Id" => {
                            if let Ok(value) = attr.decode_and_unescape_value(reader.decoder()) {
                                id = Some(value.to_string());
                            }
                        },
                        b"Target" => {
                            if let Ok(value) = attr.decode_and_unescape_value(reader.decoder()) {
                                target = Some(value.to_string());
                            }
                        },
                        _ => {},
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    targets.insert(id, target);
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("XML error in relationships: {e}"))),
            _ => {},
        }
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_list_order_and_rel_ids() {
        let xml = r#"<?xml version="1.0"?>
            <workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
                      xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
                <sheets>
                    <sheet name="Data" sheetId="1" r:id="rId1"/>
                    <sheet name="Summary &amp; Notes" sheetId="2" r:id="rId2"/>
                </sheets>
            </workbook>"#;
        let manifest = parse_workbook(xml).unwrap();
        assert_eq!(manifest.sheets.len(), 2);
        assert_eq!(manifest.sheets[0].name, "Data");
        assert_eq!(manifest.sheets[0].rel_id, "rId1");
        assert_eq!(manifest.sheets[1].name, "Summary & Notes");
        assert!(manifest.protection.is_none());
    }

    #[test]
    fn test_protection_flags_survive_without_password() {
        let xml = r#"<workbook>
            <workbookProtection workbookPassword="CE4B" lockStructure="1"/>
            <sheets><sheet name="S" sheetId="1" r:id="rId1"/></sheets>
        </workbook>"#;
        let manifest = parse_workbook(xml).unwrap();
        let protection = manifest.protection.unwrap();
        assert!(protection.lock_structure);
        assert!(!protection.lock_windows);
        assert!(protection.password.is_none());
    }

    #[test]
    fn test_relationship_table() {
        let xml = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="t" Target="worksheets/sheet1.xml"/>
            <Relationship Id="rId2" Type="t" Target="styles.xml"/>
        </Relationships>"#;
        let targets = parse_relationships(xml).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets["rId1"], "worksheets/sheet1.xml");
        assert_eq!(targets["rId2"], "styles.xml");
    }
}
