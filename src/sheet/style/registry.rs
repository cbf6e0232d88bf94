//! Write-side style deduplication and id assignment.
//!
//! A [`StyleRegistry`] lives for exactly one save operation. It is seeded
//! with the component entries Excel requires to exist (default font, the
//! `none` and `gray125` fills, the empty border), then populated by one
//! full pass over every styled cell, row and column before any XML is
//! emitted. Only explicitly styled cells produce xf entries; a cell with
//! no style is skipped, not defaulted. Each registered style is decomposed into its four
//! sub-components; each sub-component is looked up by value and only a
//! first occurrence receives the next dense zero-based id. Custom number
//! formats get sequential ids from 164.

use std::collections::HashMap;

use crate::sheet::style::numfmt::{CUSTOM_FORMAT_START, NumberFormat};
use crate::sheet::style::{Border, Fill, Font, Style};

/// One registered `xf` entry: the snapshotted style plus its resolved
/// sub-component ids.
#[derive(Debug, Clone)]
pub struct CellXf {
    pub style: Style,
    pub font_id: u32,
    pub fill_id: u32,
    pub border_id: u32,
    pub num_fmt_id: u32,
}

/// Per-save deduplicating style table.
#[derive(Debug)]
pub struct StyleRegistry {
    fonts: Vec<Font>,
    font_ids: HashMap<Font, u32>,
    fills: Vec<Fill>,
    fill_ids: HashMap<Fill, u32>,
    borders: Vec<Border>,
    border_ids: HashMap<Border, u32>,
    /// Custom formats in assignment order, id starting at 164
    custom_formats: Vec<(u32, String)>,
    custom_format_ids: HashMap<String, u32>,
    xfs: Vec<CellXf>,
    xf_ids: HashMap<Style, u32>,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleRegistry {
    /// Create a registry seeded with the entries Excel requires.
    pub fn new() -> Self {
        let mut registry = Self {
            fonts: Vec::new(),
            font_ids: HashMap::new(),
            fills: Vec::new(),
            fill_ids: HashMap::new(),
            borders: Vec::new(),
            border_ids: HashMap::new(),
            custom_formats: Vec::new(),
            custom_format_ids: HashMap::new(),
            xfs: Vec::new(),
            xf_ids: HashMap::new(),
        };

        registry.intern_font(&Font::default());
        // fills 0 and 1 are fixed by the format
        registry.intern_fill(&Fill::none());
        registry.intern_fill(&Fill::gray125());
        registry.intern_border(&Border::default());
        registry
    }

    /// Register a style, returning its xf id. Value-equal styles share one
    /// id; the style is snapshotted, so mutating the caller's copy
    /// afterwards cannot alter the registered entry.
    pub fn register(&mut self, style: &Style) -> u32 {
        if let Some(&id) = self.xf_ids.get(style) {
            return id;
        }
        let xf = CellXf {
            font_id: self.intern_font(&style.font),
            fill_id: self.intern_fill(&style.fill),
            border_id: self.intern_border(&style.border),
            num_fmt_id: self.intern_number_format(&style.number_format),
            style: style.clone(),
        };
        let id = self.xfs.len() as u32;
        self.xfs.push(xf);
        self.xf_ids.insert(style.clone(), id);
        id
    }

    /// The xf id of an already-registered style, if any.
    pub fn lookup(&self, style: &Style) -> Option<u32> {
        self.xf_ids.get(style).copied()
    }

    fn intern_font(&mut self, font: &Font) -> u32 {
        if let Some(&id) = self.font_ids.get(font) {
            return id;
        }
        let id = self.fonts.len() as u32;
        self.fonts.push(font.clone());
        self.font_ids.insert(font.clone(), id);
        id
    }

    fn intern_fill(&mut self, fill: &Fill) -> u32 {
        if let Some(&id) = self.fill_ids.get(fill) {
            return id;
        }
        let id = self.fills.len() as u32;
        self.fills.push(fill.clone());
        self.fill_ids.insert(fill.clone(), id);
        id
    }

    fn intern_border(&mut self, border: &Border) -> u32 {
        if let Some(&id) = self.border_ids.get(border) {
            return id;
        }
        let id = self.borders.len() as u32;
        self.borders.push(border.clone());
        self.border_ids.insert(border.clone(), id);
        id
    }

    fn intern_number_format(&mut self, format: &NumberFormat) -> u32 {
        match format {
            NumberFormat::Builtin(id) => *id,
            NumberFormat::Custom(code) => {
                if let Some(&id) = self.custom_format_ids.get(code) {
                    return id;
                }
                let id = CUSTOM_FORMAT_START + self.custom_formats.len() as u32;
                self.custom_formats.push((id, code.clone()));
                self.custom_format_ids.insert(code.clone(), id);
                id
            }
        }
    }

    /// Fonts in id order.
    #[inline]
    pub fn fonts(&self) -> &[Font] {
        &self.fonts
    }

    /// Fills in id order.
    #[inline]
    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    /// Borders in id order.
    #[inline]
    pub fn borders(&self) -> &[Border] {
        &self.borders
    }

    /// Custom number formats as `(id, code)` in assignment order.
    #[inline]
    pub fn custom_formats(&self) -> &[(u32, String)] {
        &self.custom_formats
    }

    /// Registered xf entries in registration order.
    #[inline]
    pub fn xfs(&self) -> &[CellXf] {
        &self.xfs
    }
}
