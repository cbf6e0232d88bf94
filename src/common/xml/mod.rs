//! Generic XML support: escaping and the in-memory element tree.
//!
//! All part writers build their documents through [`tree::XmlElement`] and
//! both reader code paths query parsed documents through the same name and
//! attribute lookups, independent of any particular document schema.

pub mod escape;
pub mod tree;

pub use escape::escape_xml;
pub use tree::{XmlAttribute, XmlElement};
