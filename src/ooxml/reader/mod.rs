//! Part readers: each submodule parses one XML part of the package into
//! the sheet model.

pub mod strings;
pub mod styles;
pub mod workbook;
pub mod worksheet;

use quick_xml::events::BytesRef;

use crate::ooxml::error::{OoxmlError, Result};

/// Resolve a general entity reference event into its replacement text.
///
/// The parser delivers `&amp;`, `&#65;` and the like as separate
/// [`BytesRef`] events between text fragments. Character references and
/// the five predefined entities resolve; anything else is an error, since
/// spreadsheet parts declare no custom entities.
pub(crate) fn resolve_entity(entity: &BytesRef, out: &mut String) -> Result<()> {
    if let Some(ch) = entity
        .resolve_char_ref()
        .map_err(|e| OoxmlError::Xml(format!("bad character reference: {e}")))?
    {
        out.push(ch);
        return Ok(());
    }
    let name = String::from_utf8(entity.to_vec())
        .map_err(|_| OoxmlError::Xml("invalid UTF-8 in entity reference".to_string()))?;
    match quick_xml::escape::resolve_predefined_entity(&name) {
        Some(text) => {
            out.push_str(text);
            Ok(())
        }
        None => Err(OoxmlError::Xml(format!(
            "unknown entity reference '&{name};'"
        ))),
    }
}
