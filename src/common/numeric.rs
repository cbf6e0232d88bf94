//! Invariant numeric codec.
//!
//! Every numeric attribute value in an OOXML package uses a fixed,
//! locale-independent decimal convention: no grouping separators, `.` as
//! the decimal point, round-trip precision. All number-to-string and
//! string-to-number conversions in this crate go through this module so
//! that no locale-sensitive formatting can leak into a part.
//!
//! Uses `itoa` for integers and `ryu` for floats to minimize allocations.

use crate::common::error::{Error, Result};

/// Format a float with the invariant convention.
///
/// Integral values print without a trailing `.0` fraction, matching the
/// round-trip ("G") style Excel writes for attribute values.
///
/// # Examples
///
/// ```
/// use longan::common::numeric::fmt_f64;
/// assert_eq!(fmt_f64(10.5), "10.5");
/// assert_eq!(fmt_f64(3.0), "3");
/// assert_eq!(fmt_f64(-0.25), "-0.25");
/// ```
pub fn fmt_f64(value: f64) -> String {
    if value.is_finite() && value == value.trunc() && value.abs() < 9.007_199_254_740_992e15 {
        let mut buffer = itoa::Buffer::new();
        return buffer.format(value as i64).to_string();
    }
    let mut buffer = ryu::Buffer::new();
    buffer.format(value).to_string()
}

/// Format a 32-bit float with the invariant convention.
pub fn fmt_f32(value: f32) -> String {
    if value.is_finite() && value == value.trunc() && value.abs() < 1.677_721_6e7 {
        let mut buffer = itoa::Buffer::new();
        return buffer.format(value as i32).to_string();
    }
    let mut buffer = ryu::Buffer::new();
    buffer.format(value).to_string()
}

/// Format an unsigned integer.
#[inline]
pub fn fmt_u32(value: u32) -> String {
    itoa::Buffer::new().format(value).to_string()
}

/// Format a signed integer.
#[inline]
pub fn fmt_i32(value: i32) -> String {
    itoa::Buffer::new().format(value).to_string()
}

/// Format a 64-bit signed integer.
#[inline]
pub fn fmt_i64(value: i64) -> String {
    itoa::Buffer::new().format(value).to_string()
}

/// Parse a float written in the invariant convention.
///
/// Rejects grouping separators and locale decimal commas; only `.` is
/// accepted as the decimal point.
pub fn parse_f64(value: &str) -> Result<f64> {
    try_parse_f64(value)
        .ok_or_else(|| Error::Format(format!("'{value}' is not a valid invariant number")))
}

/// Non-throwing variant of [`parse_f64`].
pub fn try_parse_f64(value: &str) -> Option<f64> {
    if value.is_empty() || value.contains(',') {
        return None;
    }
    fast_float2::parse::<f64, _>(value.trim()).ok()
}

/// Parse an unsigned integer attribute value.
pub fn parse_u32(value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| Error::Format(format!("'{value}' is not a valid unsigned integer")))
}

/// Non-throwing variant of [`parse_u32`].
#[inline]
pub fn try_parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

/// Parse a binary boolean attribute value.
///
/// OOXML boolean attributes are serialized as `1`/`0`, with `true`/`false`
/// also accepted on read. Anything else returns `None`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_integral_floats() {
        assert_eq!(fmt_f64(0.0), "0");
        assert_eq!(fmt_f64(42.0), "42");
        assert_eq!(fmt_f64(-7.0), "-7");
        assert_eq!(fmt_f32(11.0), "11");
    }

    #[test]
    fn test_fmt_fractional_floats() {
        assert_eq!(fmt_f64(10.7109375), "10.7109375");
        assert_eq!(fmt_f64(9.75), "9.75");
        assert_eq!(fmt_f32(0.5), "0.5");
    }

    #[test]
    fn test_parse_invariant_only() {
        assert_eq!(try_parse_f64("10.5"), Some(10.5));
        assert_eq!(try_parse_f64("1,000.5"), None);
        assert_eq!(try_parse_f64(""), None);
        assert!(parse_f64("abc").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn test_roundtrip() {
        for v in [0.1, 123.456, -9.875, 1e-9, 2.5e12] {
            let s = fmt_f64(v);
            assert_eq!(parse_f64(&s).unwrap(), v);
        }
    }
}
