//! Package part paths.

use std::fmt;

/// Identifies one part inside the package by containing folder and
/// filename. Used as the key when assembling and resolving parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    /// Containing folder without a trailing slash; empty for the root
    pub folder: String,
    pub filename: String,
}

impl DocumentPath {
    pub fn new<F: Into<String>, N: Into<String>>(folder: F, filename: N) -> Self {
        Self {
            folder: folder.into(),
            filename: filename.into(),
        }
    }

    /// A part at the package root.
    pub fn root<N: Into<String>>(filename: N) -> Self {
        Self::new("", filename)
    }

    /// The full part path with `/` separators, without a leading slash.
    pub fn full_path(&self) -> String {
        if self.folder.is_empty() {
            self.filename.clone()
        } else {
            format!("{}/{}", self.folder, self.filename)
        }
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_path() {
        assert_eq!(DocumentPath::root("[Content_Types].xml").full_path(), "[Content_Types].xml");
        assert_eq!(DocumentPath::new("xl", "styles.xml").full_path(), "xl/styles.xml");
        assert_eq!(
            DocumentPath::new("xl/worksheets", "sheet1.xml").full_path(),
            "xl/worksheets/sheet1.xml"
        );
    }
}
