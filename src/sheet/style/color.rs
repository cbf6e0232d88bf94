//! Hex color validation for style attributes.

use crate::common::error::{Error, Result};

/// Validate a hex color string.
///
/// Accepts exactly 6 hex characters (RGB) when `use_alpha` is false, or
/// exactly 8 (ARGB with a leading alpha byte) when it is true, case
/// insensitive. An empty value fails unless `allow_empty` is set.
///
/// # Examples
///
/// ```
/// use longan::sheet::style::color::validate_color;
/// assert!(validate_color("AABBCC", false, false).is_ok());
/// assert!(validate_color("AABBCC", true, false).is_err()); // alpha byte missing
/// assert!(validate_color("", false, true).is_ok());
/// ```
pub fn validate_color(value: &str, use_alpha: bool, allow_empty: bool) -> Result<()> {
    if value.is_empty() {
        if allow_empty {
            return Ok(());
        }
        return Err(Error::Style("color value must not be empty".to_string()));
    }
    let expected = if use_alpha { 8 } else { 6 };
    if value.len() != expected {
        return Err(Error::Style(format!(
            "color `{value}` must be exactly {expected} hex characters"
        )));
    }
    if !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::Style(format!(
            "color `{value}` contains non-hexadecimal characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_and_argb_lengths() {
        assert!(validate_color("AABBCC", false, false).is_ok());
        assert!(validate_color("ffAABBCC", true, false).is_ok());
        assert!(validate_color("AABBCC", true, false).is_err());
        assert!(validate_color("FFAABBCC", false, false).is_err());
    }

    #[test]
    fn test_empty_handling() {
        assert!(validate_color("", false, true).is_ok());
        assert!(validate_color("", false, false).is_err());
    }

    #[test]
    fn test_rejects_non_hex() {
        assert!(validate_color("GGHHII", false, false).is_err());
        assert!(validate_color("AABBC ", false, false).is_err());
    }
}
