//! Dimension transforms for column widths, row heights and pane splits.
//!
//! OOXML stores worksheet dimensions in internal units that differ from
//! the user-facing ones: column widths in 1/256ths of a character of the
//! default font, row heights snapped to whole pixels, and pane splits in
//! twentieths of a point with empirically-derived offsets. The formulas
//! here reproduce Excel's own arithmetic, including its inconsistent
//! rounding: column widths floor while row heights round to the nearest
//! pixel. Excel's files exhibit exactly this asymmetry, so it must not be
//! "fixed".

use crate::common::error::{Error, Result};

/// Minimum user-facing column width in characters
pub const MIN_COLUMN_WIDTH: f64 = 0.0;
/// Maximum user-facing column width in characters
pub const MAX_COLUMN_WIDTH: f64 = 255.0;
/// Minimum row height in points
pub const MIN_ROW_HEIGHT: f64 = 0.0;
/// Maximum row height in points
pub const MAX_ROW_HEIGHT: f64 = 409.5;

/// Width in pixels of the widest digit of the default font
pub const DEFAULT_MAX_DIGIT_WIDTH: f64 = 7.0;
/// Horizontal cell padding in pixels assumed by the width formula
pub const DEFAULT_TEXT_PADDING: f64 = 5.0;

// Pane split constants (empirical, from Excel's own output)
const SPLIT_WIDTH_MULTIPLIER: f64 = 12.0;
const SPLIT_WIDTH_OFFSET: f64 = 0.5;
const SPLIT_WIDTH_POINT_MULTIPLIER: f64 = 0.75;
const SPLIT_POINT_DIVIDER: f64 = 20.0;
const SPLIT_WIDTH_POINT_OFFSET: f64 = 390.0;
const SPLIT_HEIGHT_POINT_OFFSET: f64 = 300.0;

/// Threshold for float equality across the dimension code.
pub const FLOAT_THRESHOLD: f64 = 1e-7;

/// Compare two floats within [`FLOAT_THRESHOLD`].
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < FLOAT_THRESHOLD
}

/// Threshold-based ordering: equal within the threshold, otherwise the
/// usual comparison.
#[inline]
pub fn approx_cmp(a: f64, b: f64) -> std::cmp::Ordering {
    if approx_eq(a, b) {
        std::cmp::Ordering::Equal
    } else if a < b {
        std::cmp::Ordering::Less
    } else {
        std::cmp::Ordering::Greater
    }
}

/// Convert a user-facing column width (characters) to the internal
/// 1/256th-character representation, using the default font metrics.
///
/// # Examples
///
/// ```
/// use longan::sheet::metrics::get_internal_column_width;
/// assert_eq!(get_internal_column_width(10.0).unwrap(), 10.7109375);
/// ```
#[inline]
pub fn get_internal_column_width(width: f64) -> Result<f64> {
    get_internal_column_width_with_metrics(width, DEFAULT_MAX_DIGIT_WIDTH, DEFAULT_TEXT_PADDING)
}

/// [`get_internal_column_width`] with explicit font metrics.
pub fn get_internal_column_width_with_metrics(
    width: f64,
    max_digit_width: f64,
    text_padding: f64,
) -> Result<f64> {
    if !(MIN_COLUMN_WIDTH..=MAX_COLUMN_WIDTH).contains(&width) {
        return Err(Error::Format(format!(
            "column width {width} is outside the range {MIN_COLUMN_WIDTH}..{MAX_COLUMN_WIDTH}"
        )));
    }
    if approx_eq(width, 0.0) {
        return Ok(0.0);
    }
    let internal = if width <= 1.0 {
        (width * (max_digit_width + text_padding) / max_digit_width * 256.0).floor() / 256.0
    } else {
        ((width * max_digit_width + text_padding) / max_digit_width * 256.0).floor() / 256.0
    };
    Ok(internal)
}

/// Recover the user-facing column width from an internal file value,
/// using the default font metrics. Because the forward transform floors
/// onto a 1/256 grid, re-serializing a recovered width reproduces the
/// file value exactly.
pub fn get_column_width(internal: f64) -> f64 {
    if internal <= 0.0 {
        return 0.0;
    }
    let narrow_cutoff = (DEFAULT_MAX_DIGIT_WIDTH + DEFAULT_TEXT_PADDING) / DEFAULT_MAX_DIGIT_WIDTH;
    if internal <= narrow_cutoff {
        internal * DEFAULT_MAX_DIGIT_WIDTH / (DEFAULT_MAX_DIGIT_WIDTH + DEFAULT_TEXT_PADDING)
    } else {
        (internal * DEFAULT_MAX_DIGIT_WIDTH - DEFAULT_TEXT_PADDING) / DEFAULT_MAX_DIGIT_WIDTH
    }
}

/// Convert a row height (points) to the internal pixel-snapped value.
///
/// Heights snap to the nearest achievable pixel boundary (1 point is 4/3
/// pixels): re-serializing a previously-read height is idempotent, while a
/// fresh height may shift slightly.
///
/// # Examples
///
/// ```
/// use longan::sheet::metrics::get_internal_row_height;
/// assert_eq!(get_internal_row_height(10.0).unwrap(), 9.75);
/// assert_eq!(get_internal_row_height(0.1).unwrap(), 0.0);
/// ```
pub fn get_internal_row_height(height: f64) -> Result<f64> {
    if !(MIN_ROW_HEIGHT..=MAX_ROW_HEIGHT).contains(&height) {
        return Err(Error::Format(format!(
            "row height {height} is outside the range {MIN_ROW_HEIGHT}..{MAX_ROW_HEIGHT}"
        )));
    }
    if approx_eq(height, 0.0) {
        return Ok(0.0);
    }
    let height_in_pixels = (height * 4.0 / 3.0).round();
    Ok(height_in_pixels / 4.0 * 3.0)
}

/// Convert a pane split width (characters) to the internal twentieths-of-a
/// -point value. Negative inputs clamp to 0.
///
/// Widths of at most one character discard the input and use zero pixels
/// unconditionally; Excel's own output does the same, so the oddity is
/// reproduced rather than corrected.
pub fn get_internal_pane_split_width(width: f64) -> f64 {
    let width = width.max(0.0);
    let pixels = if width <= 1.0 {
        0.0
    } else {
        width * SPLIT_WIDTH_MULTIPLIER - SPLIT_WIDTH_OFFSET
    };
    let points = pixels * SPLIT_WIDTH_POINT_MULTIPLIER;
    SPLIT_WIDTH_POINT_OFFSET + points * SPLIT_POINT_DIVIDER
}

/// Inverse of [`get_internal_pane_split_width`]. Values at or below the
/// base offset map to 0.
pub fn get_pane_split_width(internal: f64) -> f64 {
    let points = (internal - SPLIT_WIDTH_POINT_OFFSET) / SPLIT_POINT_DIVIDER;
    if points < 0.0 {
        return 0.0;
    }
    (points / SPLIT_WIDTH_POINT_MULTIPLIER + SPLIT_WIDTH_OFFSET) / SPLIT_WIDTH_MULTIPLIER
}

/// Convert a pane split height (points) to the internal twentieths-of-a
/// -point value. Negative inputs clamp to 0.
pub fn get_internal_pane_split_height(height: f64) -> f64 {
    let height = height.max(0.0);
    SPLIT_HEIGHT_POINT_OFFSET + SPLIT_POINT_DIVIDER * height
}

/// Inverse of [`get_internal_pane_split_height`]. Values below the base
/// offset map to 0.
pub fn get_pane_split_height(internal: f64) -> f64 {
    if internal < SPLIT_HEIGHT_POINT_OFFSET {
        return 0.0;
    }
    (internal - SPLIT_HEIGHT_POINT_OFFSET) / SPLIT_POINT_DIVIDER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_width_anchor() {
        assert_eq!(get_internal_column_width(10.0).unwrap(), 10.7109375);
        assert_eq!(get_internal_column_width(0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_column_width_narrow_branch() {
        // width <= 1 scales by (digit width + padding) / digit width
        let w = get_internal_column_width(0.5).unwrap();
        assert_eq!(w, (0.5 * 12.0 / 7.0 * 256.0_f64).floor() / 256.0);
    }

    #[test]
    fn test_column_width_bounds() {
        assert!(get_internal_column_width(-0.1).is_err());
        assert!(get_internal_column_width(255.01).is_err());
        assert!(get_internal_column_width(255.0).is_ok());
    }

    #[test]
    fn test_column_width_recovery_is_write_stable() {
        for w in [0.0, 0.5, 2.0, 10.0, 84.3, 254.0] {
            let internal = get_internal_column_width(w).unwrap();
            let recovered = get_column_width(internal);
            assert_eq!(get_internal_column_width(recovered).unwrap(), internal);
        }
    }

    #[test]
    fn test_row_height_pixel_snap() {
        assert_eq!(get_internal_row_height(10.0).unwrap(), 9.75);
        assert_eq!(get_internal_row_height(0.1).unwrap(), 0.0);
        assert_eq!(get_internal_row_height(15.0).unwrap(), 15.0);
    }

    #[test]
    fn test_row_height_idempotent() {
        for h in [0.6, 5.3, 12.75, 100.1, 409.5] {
            let snapped = get_internal_row_height(h).unwrap();
            assert_eq!(get_internal_row_height(snapped).unwrap(), snapped);
        }
    }

    #[test]
    fn test_row_height_bounds() {
        assert!(get_internal_row_height(-1.0).is_err());
        assert!(get_internal_row_height(409.51).is_err());
    }

    #[test]
    fn test_pane_split_width_roundtrip() {
        for w in [2.0, 8.43, 100.0] {
            let internal = get_internal_pane_split_width(w);
            assert!(approx_eq(get_pane_split_width(internal), w));
        }
    }

    #[test]
    fn test_pane_split_width_small_inputs_collapse() {
        // inputs <= 1 all collapse to the zero-pixel base value
        let base = get_internal_pane_split_width(0.0);
        assert_eq!(get_internal_pane_split_width(1.0), base);
        assert_eq!(get_internal_pane_split_width(-5.0), base);
        assert_eq!(base, 390.0);
    }

    #[test]
    fn test_pane_split_height_roundtrip() {
        for h in [0.0, 20.0, 123.45] {
            let internal = get_internal_pane_split_height(h);
            assert!(approx_eq(get_pane_split_height(internal), h));
        }
        assert_eq!(get_pane_split_height(100.0), 0.0);
        assert_eq!(get_internal_pane_split_height(-3.0), 300.0);
    }

    #[test]
    fn test_approx_cmp() {
        use std::cmp::Ordering;
        assert_eq!(approx_cmp(1.0, 1.0 + 1e-9), Ordering::Equal);
        assert_eq!(approx_cmp(1.0, 2.0), Ordering::Less);
        assert_eq!(approx_cmp(2.0, 1.0), Ordering::Greater);
    }
}
