//! Workbook part generation.

use crate::common::xml::XmlElement;
use crate::ooxml::error::Result;
use crate::ooxml::ns;
use crate::ooxml::protection::legacy_password_hash;
use crate::sheet::workbook::Workbook;

/// Build the `workbook.xml` document element. Sheet `r:id`s are `rId1`
/// onward in worksheet order; the relationships part mirrors this.
pub fn build_workbook(workbook: &Workbook) -> Result<XmlElement> {
    let mut root = XmlElement::new("workbook");
    root.set_default_namespace(ns::SPREADSHEET_MAIN);
    root.add_namespace_attribute("r", "xmlns", ns::RELATIONSHIPS);

    if let Some(protection) = &workbook.protection {
        let element = root.add_child(XmlElement::new("workbookProtection"));
        if let Some(password) = &protection.password {
            element.add_attribute("workbookPassword", legacy_password_hash(password));
        }
        if protection.lock_structure {
            element.add_attribute("lockStructure", "1");
        }
        if protection.lock_windows {
            element.add_attribute("lockWindows", "1");
        }
    }

    let sheets = root.add_child(XmlElement::new("sheets"));
    for (index, sheet) in workbook.worksheets().iter().enumerate() {
        let element = sheets.add_child(XmlElement::new("sheet"));
        element.add_attribute("name", sheet.name());
        element.add_attribute("sheetId", (index + 1).to_string());
        element.add_attribute_with_prefix("id", "r", format!("rId{}", index + 1));
    }

    Ok(root)
}
