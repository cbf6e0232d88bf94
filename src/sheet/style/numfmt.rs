//! Number formats: built-in code table and date/time classification.

use phf::phf_map;
use serde::{Deserialize, Serialize};

/// First id available to custom (workbook-defined) number formats.
pub const CUSTOM_FORMAT_START: u32 = 164;

/// Compile-time table of the standard built-in number format codes.
///
/// Built-in formats are identified by id alone in the file; the codes are
/// never written out and exist only so read-side consumers can render
/// values.
static BUILTIN_FORMAT_CODES: phf::Map<u32, &'static str> = phf_map! {
    0u32 => "General",
    1u32 => "0",
    2u32 => "0.00",
    3u32 => "#,##0",
    4u32 => "#,##0.00",
    9u32 => "0%",
    10u32 => "0.00%",
    11u32 => "0.00E+00",
    12u32 => "# ?/?",
    13u32 => "# ??/??",
    14u32 => "m/d/yyyy",
    15u32 => "d-mmm-yy",
    16u32 => "d-mmm",
    17u32 => "mmm-yy",
    18u32 => "h:mm AM/PM",
    19u32 => "h:mm:ss AM/PM",
    20u32 => "h:mm",
    21u32 => "h:mm:ss",
    22u32 => "m/d/yyyy h:mm",
    37u32 => "#,##0 ;(#,##0)",
    38u32 => "#,##0 ;[Red](#,##0)",
    39u32 => "#,##0.00;(#,##0.00)",
    40u32 => "#,##0.00;[Red](#,##0.00)",
    45u32 => "mm:ss",
    46u32 => "[h]:mm:ss",
    47u32 => "mmss.0",
    48u32 => "##0.0E+0",
    49u32 => "@",
};

/// Look up the format code for a built-in id.
#[inline]
pub fn builtin_format_code(id: u32) -> Option<&'static str> {
    BUILTIN_FORMAT_CODES.get(&id).copied()
}

/// Whether the id belongs to the built-in date format range.
#[inline]
pub fn is_date_format_id(id: u32) -> bool {
    (14..=22).contains(&id)
}

/// Whether the id belongs to the built-in time format ranges.
#[inline]
pub fn is_time_format_id(id: u32) -> bool {
    (18..=21).contains(&id) || (45..=47).contains(&id)
}

/// Whether the id marks values as dates or times for value-type inference.
#[inline]
pub fn is_date_time_format_id(id: u32) -> bool {
    is_date_format_id(id) || is_time_format_id(id)
}

/// A cell number format: a standard built-in id, or a workbook-defined
/// format code.
///
/// Custom formats carry only their code here; the numeric id (from
/// [`CUSTOM_FORMAT_START`] upward) is assigned when the format is
/// registered for a save operation, so two equal codes always resolve to
/// one id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumberFormat {
    /// Standard format identified by id alone
    Builtin(u32),
    /// Workbook-defined format code
    Custom(String),
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::Builtin(0)
    }
}

impl NumberFormat {
    /// The `General` format.
    #[inline]
    pub fn general() -> Self {
        Self::Builtin(0)
    }

    /// Create a custom format from its code string.
    #[inline]
    pub fn custom<C: Into<String>>(code: C) -> Self {
        Self::Custom(code.into())
    }

    /// Whether this format marks values as dates or times.
    pub fn is_date_time(&self) -> bool {
        match self {
            Self::Builtin(id) => is_date_time_format_id(*id),
            Self::Custom(_) => false,
        }
    }

    /// The format code, when one is known.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Builtin(id) => builtin_format_code(*id),
            Self::Custom(code) => Some(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(builtin_format_code(0), Some("General"));
        assert_eq!(builtin_format_code(14), Some("m/d/yyyy"));
        assert_eq!(builtin_format_code(100), None);
    }

    #[test]
    fn test_date_time_classification() {
        assert!(is_date_format_id(14));
        assert!(is_date_format_id(22));
        assert!(!is_date_format_id(13));
        assert!(is_time_format_id(20));
        assert!(is_time_format_id(45));
        assert!(!is_time_format_id(14));
        assert!(is_date_time_format_id(47));
        assert!(!is_date_time_format_id(49));
    }

    #[test]
    fn test_custom_format_identity() {
        let a = NumberFormat::custom("0.000");
        let b = NumberFormat::custom("0.000");
        assert_eq!(a, b);
        assert!(!a.is_date_time());
        assert_eq!(a.code(), Some("0.000"));
    }
}
