//! In-memory, namespace-aware XML element tree.
//!
//! Writers build document parts bottom-up as [`XmlElement`] trees and
//! serialize them once with [`XmlElement::to_document`]; readers that work
//! on materialized trees query them with the `find_*` methods. The tree is
//! schema-agnostic: it knows names, prefixes, attributes and namespace
//! declarations, nothing about any particular OOXML part.

use crate::common::xml::escape::escape_xml;

/// A single XML attribute: local name, optional prefix, value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Attribute local name
    pub name: String,
    /// Optional namespace prefix
    pub prefix: Option<String>,
    /// Attribute value (unescaped)
    pub value: String,
}

impl XmlAttribute {
    /// Create a new attribute without a prefix.
    #[inline]
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            prefix: None,
            value: value.into(),
        }
    }

    fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{}:{}", p, self.name),
            None => self.name.clone(),
        }
    }
}

/// A generic XML tree node.
///
/// Namespace declarations are carried only on the elements that introduce
/// them; a default namespace set on an element applies to it and to all
/// descendants that do not declare their own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    /// Element local name
    pub name: String,
    /// Optional namespace prefix
    pub prefix: Option<String>,
    /// Optional inner text
    pub text: Option<String>,
    /// Attributes in insertion order
    pub attributes: Vec<XmlAttribute>,
    /// Child elements in insertion order
    pub children: Vec<XmlElement>,
    /// Namespace declarations introduced by this element (prefix -> URI)
    namespaces: Vec<(String, String)>,
    /// Default namespace introduced by this element
    default_namespace: Option<String>,
}

impl XmlElement {
    /// Create a new element with the given local name.
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create a new element with a namespace prefix.
    pub fn with_prefix<N: Into<String>, P: Into<String>>(name: N, prefix: P) -> Self {
        Self {
            name: name.into(),
            prefix: Some(prefix.into()),
            ..Default::default()
        }
    }

    /// Set the inner text of this element.
    #[inline]
    pub fn set_text<T: Into<String>>(&mut self, text: T) {
        self.text = Some(text.into());
    }

    /// Add a single attribute.
    pub fn add_attribute<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        self.attributes.push(XmlAttribute::new(name, value));
    }

    /// Add an attribute with a namespace prefix (e.g. `r:id`).
    pub fn add_attribute_with_prefix<N: Into<String>, P: Into<String>, V: Into<String>>(
        &mut self,
        name: N,
        prefix: P,
        value: V,
    ) {
        self.attributes.push(XmlAttribute {
            name: name.into(),
            prefix: Some(prefix.into()),
            value: value.into(),
        });
    }

    /// Add several attributes at once.
    pub fn add_attributes<N: Into<String>, V: Into<String>>(
        &mut self,
        attributes: impl IntoIterator<Item = (N, V)>,
    ) {
        for (name, value) in attributes {
            self.add_attribute(name, value);
        }
    }

    /// Record a namespace declaration and emit it as a regular attribute
    /// (`attr_prefix:prefix="uri"`, conventionally `xmlns:r="..."`).
    ///
    /// A no-op when either the prefix or the URI is empty.
    pub fn add_namespace_attribute(&mut self, prefix: &str, attr_prefix: &str, uri: &str) {
        if prefix.is_empty() || uri.is_empty() {
            return;
        }
        self.namespaces.push((prefix.to_string(), uri.to_string()));
        self.attributes.push(XmlAttribute {
            name: prefix.to_string(),
            prefix: Some(attr_prefix.to_string()),
            value: uri.to_string(),
        });
    }

    /// Set the default namespace for this element and all descendants that
    /// do not introduce their own. Emitted as `xmlns="uri"` on this element
    /// only.
    pub fn set_default_namespace<U: Into<String>>(&mut self, uri: U) {
        self.default_namespace = Some(uri.into());
    }

    /// Append a child element.
    pub fn add_child(&mut self, child: XmlElement) -> &mut XmlElement {
        self.children.push(child);
        self.children.last_mut().unwrap()
    }

    /// Append several children at once.
    pub fn add_children(&mut self, children: impl IntoIterator<Item = XmlElement>) {
        self.children.extend(children);
    }

    /// Append a child carrying inner text.
    ///
    /// Returns `None` and adds nothing when the text is empty; callers must
    /// treat `None` as "not added".
    pub fn add_child_with_value(
        &mut self,
        name: &str,
        text: &str,
        prefix: Option<&str>,
    ) -> Option<&mut XmlElement> {
        if text.is_empty() {
            return None;
        }
        let mut child = match prefix {
            Some(p) => XmlElement::with_prefix(name, p),
            None => XmlElement::new(name),
        };
        child.set_text(text);
        Some(self.add_child(child))
    }

    /// Append a child carrying a single attribute.
    pub fn add_child_with_attribute(
        &mut self,
        name: &str,
        attr_name: &str,
        attr_value: &str,
        prefix: Option<&str>,
    ) -> &mut XmlElement {
        let mut child = match prefix {
            Some(p) => XmlElement::with_prefix(name, p),
            None => XmlElement::new(name),
        };
        child.add_attribute(attr_name, attr_value);
        self.add_child(child)
    }

    /// Look up an attribute value by local name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Find all descendant elements with the given local name.
    ///
    /// The search covers the full subtree below this element (not just
    /// immediate children), is case sensitive, and returns a possibly-empty
    /// list, never an error.
    pub fn find_by_name(&self, name: &str) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        self.collect_by_name(name, &mut found);
        found
    }

    fn collect_by_name<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_by_name(name, found);
        }
    }

    /// Find all descendant elements with the given local name carrying an
    /// attribute with the given name and value. Full-subtree, case
    /// sensitive, possibly empty.
    pub fn find_by_name_and_attribute(
        &self,
        name: &str,
        attr_name: &str,
        attr_value: &str,
    ) -> Vec<&XmlElement> {
        self.find_by_name(name)
            .into_iter()
            .filter(|e| e.attribute(attr_name) == Some(attr_value))
            .collect()
    }

    /// Materialize the tree into a complete XML document string, with the
    /// standard declaration and namespace declarations applied only at the
    /// elements that introduced them.
    pub fn to_document(&self) -> String {
        let mut out = String::with_capacity(4096);
        out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        self.serialize_into(&mut out);
        out
    }

    fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{}:{}", p, self.name),
            None => self.name.clone(),
        }
    }

    fn serialize_into(&self, out: &mut String) {
        let qname = self.qualified_name();
        out.push('<');
        out.push_str(&qname);

        if let Some(uri) = &self.default_namespace {
            out.push_str(" xmlns=\"");
            out.push_str(&escape_xml(uri));
            out.push('"');
        }
        for attr in &self.attributes {
            out.push(' ');
            out.push_str(&attr.qualified_name());
            out.push_str("=\"");
            out.push_str(&escape_xml(&attr.value));
            out.push('"');
        }

        let empty = self.text.as_deref().is_none_or(str::is_empty) && self.children.is_empty();
        if empty {
            out.push_str("/>");
            return;
        }

        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape_xml(text));
        }
        for child in &self.children {
            child.serialize_into(out);
        }
        out.push_str("</");
        out.push_str(&qname);
        out.push('>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_serialize() {
        let mut root = XmlElement::new("styleSheet");
        root.set_default_namespace("http://schemas.openxmlformats.org/spreadsheetml/2006/main");
        let fonts = root.add_child_with_attribute("fonts", "count", "1", None);
        fonts.add_child(XmlElement::new("font"));

        let doc = root.to_document();
        assert!(doc.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
        assert!(doc.contains(
            r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#
        ));
        assert!(doc.contains(r#"<fonts count="1"><font/></fonts>"#));
    }

    #[test]
    fn test_namespace_attribute_noop_on_empty() {
        let mut el = XmlElement::new("workbook");
        el.add_namespace_attribute("", "xmlns", "http://example.com");
        el.add_namespace_attribute("r", "xmlns", "");
        assert!(el.attributes.is_empty());

        el.add_namespace_attribute("r", "xmlns", "http://example.com/rel");
        assert_eq!(el.attributes.len(), 1);
        assert!(el.to_document().contains(r#"xmlns:r="http://example.com/rel""#));
    }

    #[test]
    fn test_child_with_empty_value_not_added() {
        let mut el = XmlElement::new("si");
        assert!(el.add_child_with_value("t", "", None).is_none());
        assert!(el.children.is_empty());
        assert!(el.add_child_with_value("t", "hello", None).is_some());
        assert_eq!(el.children.len(), 1);
    }

    #[test]
    fn test_find_searches_full_subtree() {
        let mut root = XmlElement::new("root");
        let mid = root.add_child(XmlElement::new("mid"));
        mid.add_child_with_attribute("leaf", "id", "1", None);
        mid.add_child_with_attribute("leaf", "id", "2", None);
        root.add_child_with_attribute("leaf", "id", "3", None);

        assert_eq!(root.find_by_name("leaf").len(), 3);
        assert_eq!(root.find_by_name("Leaf").len(), 0); // case sensitive
        assert_eq!(
            root.find_by_name_and_attribute("leaf", "id", "2").len(),
            1
        );
        assert!(root.find_by_name("missing").is_empty());
    }

    #[test]
    fn test_text_is_escaped() {
        let mut el = XmlElement::new("t");
        el.set_text("a < b & c");
        assert_eq!(
            el.to_document(),
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><t>a &lt; b &amp; c</t>"#
        );
    }
}
