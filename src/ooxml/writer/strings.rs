//! Deduplicating shared-strings table.

use std::collections::HashMap;

use crate::common::xml::XmlElement;
use crate::ooxml::ns;

/// The `sharedStrings.xml` table: every distinct text value once, with
/// cells referencing entries by index. `count` tracks total references,
/// `uniqueCount` the table length.
#[derive(Debug, Default)]
pub struct SharedStrings {
    strings: Vec<String>,
    ids: HashMap<String, u32>,
    total_references: u64,
}

impl SharedStrings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its table index. Repeated values share
    /// one index.
    pub fn intern(&mut self, value: &str) -> u32 {
        self.total_references += 1;
        if let Some(&id) = self.ids.get(value) {
            return id;
        }
        let id = self.strings.len() as u32;
        self.strings.push(value.to_string());
        self.ids.insert(value.to_string(), id);
        id
    }

    /// The index of an already-interned string.
    pub fn lookup(&self, value: &str) -> Option<u32> {
        self.ids.get(value).copied()
    }

    #[inline]
    pub fn unique_count(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Build the `sst` document element.
    pub fn build(&self) -> XmlElement {
        let mut sst = XmlElement::new("sst");
        sst.set_default_namespace(ns::SPREADSHEET_MAIN);
        sst.add_attribute("count", self.total_references.to_string());
        sst.add_attribute("uniqueCount", self.strings.len().to_string());
        for value in &self.strings {
            let mut si = XmlElement::new("si");
            let mut t = XmlElement::new("t");
            t.set_text(value);
            // leading or trailing whitespace must survive the XML parser
            if value.starts_with(char::is_whitespace) || value.ends_with(char::is_whitespace) {
                t.add_attribute("xml:space", "preserve");
            }
            si.add_child(t);
            sst.add_child(si);
        }
        sst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedupes() {
        let mut strings = SharedStrings::new();
        assert_eq!(strings.intern("alpha"), 0);
        assert_eq!(strings.intern("beta"), 1);
        assert_eq!(strings.intern("alpha"), 0);
        assert_eq!(strings.unique_count(), 2);
        assert_eq!(strings.lookup("beta"), Some(1));
        assert_eq!(strings.lookup("gamma"), None);
    }

    #[test]
    fn test_build_counts() {
        let mut strings = SharedStrings::new();
        strings.intern("x");
        strings.intern("x");
        strings.intern("y");
        let sst = strings.build();
        assert_eq!(sst.attribute("count"), Some("3"));
        assert_eq!(sst.attribute("uniqueCount"), Some("2"));
        assert_eq!(sst.find_by_name("si").len(), 2);
    }

    #[test]
    fn test_whitespace_preserved() {
        let mut strings = SharedStrings::new();
        strings.intern(" padded ");
        let doc = strings.build().to_document();
        assert!(doc.contains(r#"<t xml:space="preserve"> padded </t>"#));
    }
}
