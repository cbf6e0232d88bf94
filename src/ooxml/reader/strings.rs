//! `sharedStrings.xml` parsing.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::reader::resolve_entity;

/// Parse the shared-strings table into an index-addressed list.
///
/// Rich-text entries (`<r>` runs) collapse to their concatenated plain
/// text.
pub fn parse_shared_strings(content: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(content);
    let mut strings = Vec::new();
    let mut buf = Vec::with_capacity(1024);

    let mut current: Option<String> = None;
    let mut in_text = false;
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"t" => in_text = current.is_some(),
                _ => {}
            },
            Ok(Event::Text(ref t)) if in_text => {
                let text = String::from_utf8(t.to_vec()).map_err(|_| {
                    OoxmlError::Xml("invalid UTF-8 in shared string".to_string())
                })?;
                if let Some(value) = current.as_mut() {
                    value.push_str(&text);
                }
            }
            // entity references arrive as their own events between text
            // fragments
            Ok(Event::GeneralRef(ref r)) if in_text => {
                if let Some(value) = current.as_mut() {
                    resolve_entity(r, value)?;
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"si" => {
                    if let Some(value) = current.take() {
                        strings.push(value);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("XML error in sharedStrings: {e}"))),
            _ => {}
        }
    }
    Ok(strings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_entries() {
        let xml = r#"<?xml version="1.0"?>
            <sst count="3" uniqueCount="2">
                <si><t>alpha</t></si>
                <si><t xml:space="preserve"> beta </t></si>
            </sst>"#;
        assert_eq!(parse_shared_strings(xml).unwrap(), ["alpha", " beta "]);
    }

    #[test]
    fn test_rich_text_runs_collapse() {
        let xml = r#"<sst><si><r><t>bold</t></r><r><t> and plain</t></r></si></sst>"#;
        assert_eq!(parse_shared_strings(xml).unwrap(), ["bold and plain"]);
    }

    #[test]
    fn test_entities_unescaped() {
        let xml = r#"<sst><si><t>a &lt; b &amp; c</t></si></sst>"#;
        assert_eq!(parse_shared_strings(xml).unwrap(), ["a < b & c"]);
    }

    #[test]
    fn test_char_references_resolved() {
        let xml = r#"<sst><si><t>AT&amp;T &#x263A;</t></si></sst>"#;
        assert_eq!(parse_shared_strings(xml).unwrap(), ["AT&T \u{263A}"]);
    }

    #[test]
    fn test_empty_entry_kept() {
        let xml = r#"<sst><si><t></t></si><si><t>x</t></si></sst>"#;
        assert_eq!(parse_shared_strings(xml).unwrap(), ["", "x"]);
    }
}
