//! Cell style model: fonts, fills, borders, number formats, alignment and
//! protection, composed into [`Style`].
//!
//! Every type here is a plain value with structural equality and hashing,
//! so the write-side registry can deduplicate sub-styles across a whole
//! workbook by value alone. Float fields hash through their bit patterns.
//! Enum tokens parsed from a file never fail: unrecognized tokens resolve
//! to the `None` variant, matching how spreadsheet applications tolerate
//! minor corruption.

pub mod color;
pub mod numfmt;
pub mod registry;

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::common::error::{Error, Result};

pub use numfmt::NumberFormat;
pub use registry::StyleRegistry;

/// Underline style, including the accounting variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Underline {
    #[default]
    None,
    Single,
    Double,
    SingleAccounting,
    DoubleAccounting,
}

impl Underline {
    /// The `u` element `val` attribute, `None` when no underline applies.
    pub fn token(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Single => Some("single"),
            Self::Double => Some("double"),
            Self::SingleAccounting => Some("singleAccounting"),
            Self::DoubleAccounting => Some("doubleAccounting"),
        }
    }

    /// Parse a file token; unknown tokens resolve to [`Underline::None`].
    pub fn from_token(token: &str) -> Self {
        match token {
            "single" => Self::Single,
            "double" => Self::Double,
            "singleAccounting" => Self::SingleAccounting,
            "doubleAccounting" => Self::DoubleAccounting,
            _ => Self::None,
        }
    }
}

/// Vertical text alignment (sub/superscript).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VerticalTextAlign {
    #[default]
    None,
    Subscript,
    Superscript,
}

impl VerticalTextAlign {
    pub fn token(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Subscript => Some("subscript"),
            Self::Superscript => Some("superscript"),
        }
    }

    pub fn from_token(token: &str) -> Self {
        match token {
            "subscript" => Self::Subscript,
            "superscript" => Self::Superscript,
            _ => Self::None,
        }
    }
}

/// A font color: explicit ARGB hex or a theme palette index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// Explicit color, 6 (RGB) or 8 (ARGB) hex characters
    Rgb(String),
    /// Theme palette index
    Theme(u32),
}

/// Font definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Font {
    /// Typeface name
    pub name: String,
    /// Size in points
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: Underline,
    pub strike: bool,
    pub vertical_align: VerticalTextAlign,
    /// Font color; `None` inherits the theme text color
    pub color: Option<Color>,
    /// Font family class (1=Roman, 2=Swiss, ...)
    pub family: Option<u32>,
    /// Font scheme (`major`/`minor`)
    pub scheme: Option<String>,
    pub charset: Option<u32>,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            name: "Calibri".to_string(),
            size: 11.0,
            bold: false,
            italic: false,
            underline: Underline::None,
            strike: false,
            vertical_align: VerticalTextAlign::None,
            color: None,
            family: Some(2),
            scheme: Some("minor".to_string()),
            charset: None,
        }
    }
}

impl PartialEq for Font {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.size.to_bits() == other.size.to_bits()
            && self.bold == other.bold
            && self.italic == other.italic
            && self.underline == other.underline
            && self.strike == other.strike
            && self.vertical_align == other.vertical_align
            && self.color == other.color
            && self.family == other.family
            && self.scheme == other.scheme
            && self.charset == other.charset
    }
}

impl Eq for Font {}

impl Hash for Font {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.size.to_bits().hash(state);
        self.bold.hash(state);
        self.italic.hash(state);
        self.underline.hash(state);
        self.strike.hash(state);
        self.vertical_align.hash(state);
        self.color.hash(state);
        self.family.hash(state);
        self.scheme.hash(state);
        self.charset.hash(state);
    }
}

/// Fill pattern type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PatternType {
    #[default]
    None,
    Solid,
    DarkGray,
    MediumGray,
    LightGray,
    Gray125,
    Gray0625,
}

impl PatternType {
    pub fn token(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Solid => "solid",
            Self::DarkGray => "darkGray",
            Self::MediumGray => "mediumGray",
            Self::LightGray => "lightGray",
            Self::Gray125 => "gray125",
            Self::Gray0625 => "gray0625",
        }
    }

    /// Parse a file token; unknown tokens resolve to [`PatternType::None`].
    pub fn from_token(token: &str) -> Self {
        match token {
            "solid" => Self::Solid,
            "darkGray" => Self::DarkGray,
            "mediumGray" => Self::MediumGray,
            "lightGray" => Self::LightGray,
            "gray125" => Self::Gray125,
            "gray0625" => Self::Gray0625,
            _ => Self::None,
        }
    }
}

/// Pattern fill definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Fill {
    pub pattern: PatternType,
    /// Foreground (pattern) color, ARGB hex
    pub foreground: Option<String>,
    /// Background color, ARGB hex
    pub background: Option<String>,
}

impl Fill {
    /// The required fill at index 0: no pattern.
    pub fn none() -> Self {
        Self::default()
    }

    /// The required fill at index 1: `gray125`.
    pub fn gray125() -> Self {
        Self {
            pattern: PatternType::Gray125,
            foreground: None,
            background: None,
        }
    }

    /// A solid fill of the given ARGB color.
    pub fn solid<C: Into<String>>(color: C) -> Self {
        Self {
            pattern: PatternType::Solid,
            foreground: Some(color.into()),
            background: None,
        }
    }
}

/// Border line style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LineStyle {
    #[default]
    None,
    Hair,
    Dotted,
    DashDotDot,
    DashDot,
    Dashed,
    Thin,
    MediumDashDotDot,
    SlantDashDot,
    MediumDashDot,
    MediumDashed,
    Medium,
    Thick,
    Double,
}

impl LineStyle {
    pub fn token(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Hair => Some("hair"),
            Self::Dotted => Some("dotted"),
            Self::DashDotDot => Some("dashDotDot"),
            Self::DashDot => Some("dashDot"),
            Self::Dashed => Some("dashed"),
            Self::Thin => Some("thin"),
            Self::MediumDashDotDot => Some("mediumDashDotDot"),
            Self::SlantDashDot => Some("slantDashDot"),
            Self::MediumDashDot => Some("mediumDashDot"),
            Self::MediumDashed => Some("mediumDashed"),
            Self::Medium => Some("medium"),
            Self::Thick => Some("thick"),
            Self::Double => Some("double"),
        }
    }

    /// Parse a file token; unknown tokens resolve to [`LineStyle::None`].
    pub fn from_token(token: &str) -> Self {
        match token {
            "hair" => Self::Hair,
            "dotted" => Self::Dotted,
            "dashDotDot" => Self::DashDotDot,
            "dashDot" => Self::DashDot,
            "dashed" => Self::Dashed,
            "thin" => Self::Thin,
            "mediumDashDotDot" => Self::MediumDashDotDot,
            "slantDashDot" => Self::SlantDashDot,
            "mediumDashDot" => Self::MediumDashDot,
            "mediumDashed" => Self::MediumDashed,
            "medium" => Self::Medium,
            "thick" => Self::Thick,
            "double" => Self::Double,
            _ => Self::None,
        }
    }
}

/// One side of a cell border.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorderSide {
    pub style: LineStyle,
    /// Side color, ARGB hex; `None` uses the automatic color
    pub color: Option<String>,
}

impl BorderSide {
    pub fn new(style: LineStyle) -> Self {
        Self { style, color: None }
    }
}

/// Cell border definition: four sides, a diagonal, and its direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Border {
    pub left: Option<BorderSide>,
    pub right: Option<BorderSide>,
    pub top: Option<BorderSide>,
    pub bottom: Option<BorderSide>,
    pub diagonal: Option<BorderSide>,
    pub diagonal_up: bool,
    pub diagonal_down: bool,
}

impl Border {
    /// Whether any side carries a visible line.
    pub fn has_borders(&self) -> bool {
        self.left.is_some()
            || self.right.is_some()
            || self.top.is_some()
            || self.bottom.is_some()
            || self.diagonal.is_some()
    }
}

/// Horizontal cell alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HorizontalAlign {
    #[default]
    None,
    General,
    Left,
    Center,
    Right,
    Fill,
    Justify,
    CenterContinuous,
    Distributed,
}

impl HorizontalAlign {
    pub fn token(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::General => Some("general"),
            Self::Left => Some("left"),
            Self::Center => Some("center"),
            Self::Right => Some("right"),
            Self::Fill => Some("fill"),
            Self::Justify => Some("justify"),
            Self::CenterContinuous => Some("centerContinuous"),
            Self::Distributed => Some("distributed"),
        }
    }

    /// Parse a file token; unknown tokens resolve to the `None` variant.
    pub fn from_token(token: &str) -> Self {
        match token {
            "general" => Self::General,
            "left" => Self::Left,
            "center" => Self::Center,
            "right" => Self::Right,
            "fill" => Self::Fill,
            "justify" => Self::Justify,
            "centerContinuous" => Self::CenterContinuous,
            "distributed" => Self::Distributed,
            _ => Self::None,
        }
    }
}

/// Vertical cell alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VerticalAlign {
    #[default]
    None,
    Top,
    Center,
    Bottom,
    Justify,
    Distributed,
}

impl VerticalAlign {
    pub fn token(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Top => Some("top"),
            Self::Center => Some("center"),
            Self::Bottom => Some("bottom"),
            Self::Justify => Some("justify"),
            Self::Distributed => Some("distributed"),
        }
    }

    /// Parse a file token; unknown tokens resolve to the `None` variant.
    pub fn from_token(token: &str) -> Self {
        match token {
            "top" => Self::Top,
            "center" => Self::Center,
            "bottom" => Self::Bottom,
            "justify" => Self::Justify,
            "distributed" => Self::Distributed,
            _ => Self::None,
        }
    }
}

/// Cell alignment block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Alignment {
    pub horizontal: HorizontalAlign,
    pub vertical: VerticalAlign,
    pub wrap_text: bool,
    pub shrink_to_fit: bool,
    pub indent: u32,
    /// Text rotation in degrees, -90..=90
    pub rotation: i32,
}

impl Alignment {
    /// Whether an `alignment` element needs to be written at all.
    pub fn is_set(&self) -> bool {
        self.horizontal != HorizontalAlign::None
            || self.vertical != VerticalAlign::None
            || self.wrap_text
            || self.shrink_to_fit
            || self.indent != 0
            || self.rotation != 0
    }

    /// The `textRotation` attribute value: validated against -90..=90, with
    /// negative rotations mapped into the 91..=180 band as `90 - r`.
    pub fn internal_rotation(&self) -> Result<u32> {
        if !(-90..=90).contains(&self.rotation) {
            return Err(Error::Style(format!(
                "text rotation {} is outside -90..=90",
                self.rotation
            )));
        }
        if self.rotation < 0 {
            Ok((90 - self.rotation) as u32)
        } else {
            Ok(self.rotation as u32)
        }
    }
}

/// Cell protection flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellProtection {
    pub locked: bool,
    pub hidden: bool,
}

impl CellProtection {
    /// Whether a `protection` element needs to be written at all.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.locked || self.hidden
    }
}

/// A complete cell style.
///
/// Styles are plain values: callers build and mutate them freely, but the
/// registry snapshots them on registration, so later mutation of a caller's
/// copy never alters an already-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Style {
    pub font: Font,
    pub fill: Fill,
    pub border: Border,
    pub number_format: NumberFormat,
    pub alignment: Alignment,
    pub protection: CellProtection,
}

impl Style {
    /// A style with a bold default font.
    pub fn bold() -> Self {
        Self {
            font: Font {
                bold: true,
                ..Font::default()
            },
            ..Self::default()
        }
    }

    /// A style with a solid fill of the given ARGB color.
    pub fn solid_fill<C: Into<String>>(color: C) -> Self {
        Self {
            fill: Fill::solid(color),
            ..Self::default()
        }
    }

    /// A style carrying the given number format.
    pub fn with_format(format: NumberFormat) -> Self {
        Self {
            number_format: format,
            ..Self::default()
        }
    }

    /// Whether this style marks cell values as dates or times.
    #[inline]
    pub fn is_date_time(&self) -> bool {
        self.number_format.is_date_time()
    }

    /// Check every field that could make this style unserializable: the
    /// rotation range and all hex color strings. Run once before ids are
    /// assigned so a bad style surfaces before any XML exists.
    pub fn validate(&self) -> Result<()> {
        self.alignment.internal_rotation()?;
        if let Some(Color::Rgb(rgb)) = &self.font.color {
            // font colors may omit the alpha byte
            if color::validate_color(rgb, true, false).is_err() {
                color::validate_color(rgb, false, false)?;
            }
        }
        if let Some(fg) = &self.fill.foreground {
            color::validate_color(fg, true, false)?;
        }
        if let Some(bg) = &self.fill.background {
            color::validate_color(bg, true, false)?;
        }
        let sides = [
            &self.border.left,
            &self.border.right,
            &self.border.top,
            &self.border.bottom,
            &self.border.diagonal,
        ];
        for side in sides.into_iter().flatten() {
            if let Some(rgb) = &side.color {
                color::validate_color(rgb, true, false)?;
            }
        }
        Ok(())
    }
}
