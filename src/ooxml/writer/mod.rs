//! Part writers and the save orchestration they plug into.
//!
//! Saving is two-phase. First [`SaveContext::collect`] makes one full pass
//! over every cell, row default and column default, populating the style
//! registry and the shared-strings table so all ids are stable before any
//! XML exists. Then each part writer builds its document from the
//! immutable context. Writers are looked up in a [`WriterRegistry`] built
//! explicitly at composition time; callers may substitute a writer per
//! part kind or append post-processing hooks that run over each built
//! document before it is serialized.

pub mod strings;
pub mod styles;
pub mod workbook;
pub mod worksheet;

use std::collections::HashMap;

use crate::common::xml::XmlElement;
use crate::ooxml::error::{OoxmlError, Result};
use crate::sheet::cell::CellValue;
use crate::sheet::style::StyleRegistry;
use crate::sheet::workbook::Workbook;

pub use strings::SharedStrings;

/// The kinds of XML parts a workbook save produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    Workbook,
    Worksheet,
    Styles,
    SharedStrings,
}

/// Immutable state shared by all part writers during one save.
#[derive(Debug)]
pub struct SaveContext {
    pub styles: StyleRegistry,
    pub strings: SharedStrings,
}

impl SaveContext {
    /// One full pass over the workbook: register every referenced style
    /// and intern every text value. Must complete before any part is
    /// built, since parts reference the assigned ids.
    pub fn collect(workbook: &Workbook) -> Result<Self> {
        let mut styles = StyleRegistry::new();
        let mut strings = SharedStrings::new();
        for sheet in workbook.worksheets() {
            for (_, cell) in sheet.cells() {
                if let Some(style) = &cell.style {
                    style.validate()?;
                    styles.register(style);
                }
                if let CellValue::Text(text) = &cell.value {
                    strings.intern(text.as_str());
                }
            }
            for style in sheet.row_styles().values() {
                style.validate()?;
                styles.register(style);
            }
            for style in sheet.column_styles().values() {
                style.validate()?;
                styles.register(style);
            }
        }
        Ok(Self { styles, strings })
    }
}

/// Builds the XML document for one part kind.
pub trait PartWriter {
    /// Build the part's document element. `index` selects the worksheet
    /// for [`PartKind::Worksheet`] and is ignored otherwise.
    fn build(&self, workbook: &Workbook, ctx: &SaveContext, index: usize) -> Result<XmlElement>;
}

/// A hook run over each built document before serialization.
pub type PostHook = Box<dyn Fn(PartKind, &mut XmlElement)>;

/// Explicit part-kind to writer table, with ordered post hooks.
pub struct WriterRegistry {
    writers: HashMap<PartKind, Box<dyn PartWriter>>,
    hooks: Vec<PostHook>,
}

impl WriterRegistry {
    /// The default writer set.
    pub fn with_defaults() -> Self {
        let mut writers: HashMap<PartKind, Box<dyn PartWriter>> = HashMap::new();
        writers.insert(PartKind::Workbook, Box::new(WorkbookWriter));
        writers.insert(PartKind::Worksheet, Box::new(WorksheetWriter));
        writers.insert(PartKind::Styles, Box::new(StylesWriter));
        writers.insert(PartKind::SharedStrings, Box::new(SharedStringsWriter));
        Self {
            writers,
            hooks: Vec::new(),
        }
    }

    /// Replace the writer for a part kind.
    pub fn set_writer(&mut self, kind: PartKind, writer: Box<dyn PartWriter>) {
        self.writers.insert(kind, writer);
    }

    /// Append a post-processing hook; hooks run in insertion order.
    pub fn add_post_hook(&mut self, hook: PostHook) {
        self.hooks.push(hook);
    }

    /// Build a part and run the post hooks over it.
    pub fn build_part(
        &self,
        kind: PartKind,
        workbook: &Workbook,
        ctx: &SaveContext,
        index: usize,
    ) -> Result<XmlElement> {
        let writer = self
            .writers
            .get(&kind)
            .ok_or_else(|| OoxmlError::Other(format!("no writer registered for {kind:?}")))?;
        let mut element = writer.build(workbook, ctx, index)?;
        for hook in &self.hooks {
            hook(kind, &mut element);
        }
        Ok(element)
    }
}

struct WorkbookWriter;

impl PartWriter for WorkbookWriter {
    fn build(&self, wb: &Workbook, _ctx: &SaveContext, _index: usize) -> Result<XmlElement> {
        workbook::build_workbook(wb)
    }
}

struct WorksheetWriter;

impl PartWriter for WorksheetWriter {
    fn build(&self, wb: &Workbook, ctx: &SaveContext, index: usize) -> Result<XmlElement> {
        let sheet = wb
            .worksheets()
            .get(index)
            .ok_or_else(|| OoxmlError::Other(format!("worksheet index {index} out of range")))?;
        worksheet::build_worksheet(sheet, ctx)
    }
}

struct StylesWriter;

impl PartWriter for StylesWriter {
    fn build(&self, _wb: &Workbook, ctx: &SaveContext, _index: usize) -> Result<XmlElement> {
        styles::build_stylesheet(&ctx.styles)
    }
}

struct SharedStringsWriter;

impl PartWriter for SharedStringsWriter {
    fn build(&self, _wb: &Workbook, ctx: &SaveContext, _index: usize) -> Result<XmlElement> {
        Ok(ctx.strings.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::style::Style;

    fn sample_workbook() -> Workbook {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet("Data").unwrap();
        sheet.set_cell_styled("A1".parse().unwrap(), "x", Style::bold());
        sheet.set_cell("B1".parse().unwrap(), "x");
        workbook
    }

    #[test]
    fn test_collect_populates_before_build() {
        let workbook = sample_workbook();
        let ctx = SaveContext::collect(&workbook).unwrap();
        assert_eq!(ctx.styles.xfs().len(), 1);
        assert_eq!(ctx.strings.unique_count(), 1);
    }

    #[test]
    fn test_collect_rejects_invalid_rotation() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet("Bad").unwrap();
        let mut style = Style::default();
        style.alignment.rotation = 120;
        sheet.set_cell_styled("A1".parse().unwrap(), 1.0, style);
        assert!(SaveContext::collect(&workbook).is_err());
    }

    #[test]
    fn test_collect_rejects_malformed_colors() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet("Bad").unwrap();
        sheet.set_cell_styled("A1".parse().unwrap(), 1.0, Style::solid_fill("red"));
        assert!(SaveContext::collect(&workbook).is_err());
    }

    #[test]
    fn test_registry_substitution_and_hooks() {
        struct Stub;
        impl PartWriter for Stub {
            fn build(&self, _: &Workbook, _: &SaveContext, _: usize) -> Result<XmlElement> {
                Ok(XmlElement::new("stub"))
            }
        }

        let workbook = sample_workbook();
        let ctx = SaveContext::collect(&workbook).unwrap();
        let mut registry = WriterRegistry::with_defaults();
        registry.set_writer(PartKind::Styles, Box::new(Stub));
        registry.add_post_hook(Box::new(|kind, element| {
            if kind == PartKind::Styles {
                element.add_attribute("hooked", "1");
            }
        }));

        let part = registry
            .build_part(PartKind::Styles, &workbook, &ctx, 0)
            .unwrap();
        assert_eq!(part.name, "stub");
        assert_eq!(part.attribute("hooked"), Some("1"));

        let wb_part = registry
            .build_part(PartKind::Workbook, &workbook, &ctx, 0)
            .unwrap();
        assert_eq!(wb_part.name, "workbook");
        assert_eq!(wb_part.attribute("hooked"), None);
    }
}
