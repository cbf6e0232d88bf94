//! Merge/subtract maintenance for sets of disjoint cell ranges.
//!
//! The worksheet keeps merged-cell regions and conditional-format regions
//! as lists of non-overlapping rectangles. Adding or removing a rectangle
//! goes through three phases: partition the list into affected and
//! untouched ranges, slice the affected union into minimal sub-rectangles
//! along every distinct column and row boundary, then coalesce adjacent
//! sub-rectangles back into larger ones. Slicing guarantees the result
//! covers exactly the right cells with no overlap; coalescing only changes
//! how many rectangles represent that coverage, never which cells are
//! covered.
//!
//! All operations are pure functions over immutable slices.

use smallvec::SmallVec;

use crate::sheet::range::{CellAddress, Range};

/// Direction preference when coalescing sliced rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Coalesce runs of rows within identical column bounds first.
    #[default]
    MergeColumns,
    /// Coalesce runs of columns within identical row bounds first.
    MergeRows,
    /// Return the sliced rectangles without coalescing.
    NoMerge,
}

/// Add `new` to a set of disjoint ranges, producing a new minimal disjoint
/// set covering the union.
///
/// Ranges that neither overlap `new` nor abut it with exactly matching
/// opposite-axis bounds pass through untouched. Abutting ranges whose
/// opposite-axis extents differ are deliberately left alone so an L-shaped
/// union is never collapsed into one rectangle.
///
/// # Examples
///
/// ```
/// use longan::sheet::geometry::{merge_range, MergeStrategy};
/// use longan::sheet::range::Range;
///
/// let a: Range = "A1:B2".parse().unwrap();
/// let b: Range = "A3:B4".parse().unwrap();
/// let merged = merge_range(&[a], b, MergeStrategy::MergeColumns);
/// assert_eq!(merged, vec!["A1:B4".parse().unwrap()]);
/// ```
pub fn merge_range(existing: &[Range], new: Range, strategy: MergeStrategy) -> Vec<Range> {
    let mut affected = vec![new];
    let mut untouched = Vec::new();
    for range in existing {
        if is_merge_candidate(range, &new, strategy) {
            affected.push(*range);
        } else {
            untouched.push(*range);
        }
    }
    let mut result = untouched;
    result.extend(coalesce(slice(&affected), strategy));
    result
}

/// Remove `remove` from a set of disjoint ranges, producing a new minimal
/// disjoint set covering the difference. Ranges not overlapping `remove`
/// pass through untouched.
pub fn subtract_range(existing: &[Range], remove: Range, strategy: MergeStrategy) -> Vec<Range> {
    let mut remainders = Vec::new();
    let mut untouched = Vec::new();
    for range in existing {
        match range.intersection(&remove) {
            Some(cut) => remainders.extend(split_around(range, &cut)),
            None => untouched.push(*range),
        }
    }
    let mut result = untouched;
    result.extend(coalesce(slice(&remainders), strategy));
    result
}

fn is_merge_candidate(range: &Range, new: &Range, strategy: MergeStrategy) -> bool {
    if range.overlaps(new) {
        return true;
    }
    match strategy {
        // vertically abutting with identical column bounds
        MergeStrategy::MergeColumns => {
            range.start.column == new.start.column
                && range.end.column == new.end.column
                && (range.end.row + 1 == new.start.row || new.end.row + 1 == range.start.row)
        }
        // horizontally abutting with identical row bounds
        MergeStrategy::MergeRows => {
            range.start.row == new.start.row
                && range.end.row == new.end.row
                && (range.end.column + 1 == new.start.column
                    || new.end.column + 1 == range.start.column)
        }
        MergeStrategy::NoMerge => false,
    }
}

/// The up-to-four rectangles of `range` left after removing `cut`.
///
/// `cut` must lie entirely inside `range`. Pieces are taken above and
/// below the cut at full width, then left and right of it at the cut's own
/// row extent, so the pieces never overlap.
fn split_around(range: &Range, cut: &Range) -> SmallVec<[Range; 4]> {
    let mut pieces = SmallVec::new();
    if cut.start.row > range.start.row {
        pieces.push(Range {
            start: range.start,
            end: CellAddress {
                column: range.end.column,
                row: cut.start.row - 1,
            },
        });
    }
    if cut.end.row < range.end.row {
        pieces.push(Range {
            start: CellAddress {
                column: range.start.column,
                row: cut.end.row + 1,
            },
            end: range.end,
        });
    }
    if cut.start.column > range.start.column {
        pieces.push(Range {
            start: CellAddress {
                column: range.start.column,
                row: cut.start.row,
            },
            end: CellAddress {
                column: cut.start.column - 1,
                row: cut.end.row,
            },
        });
    }
    if cut.end.column < range.end.column {
        pieces.push(Range {
            start: CellAddress {
                column: cut.end.column + 1,
                row: cut.start.row,
            },
            end: CellAddress {
                column: range.end.column,
                row: cut.end.row,
            },
        });
    }
    pieces
}

/// Slice a possibly-overlapping set of ranges into minimal disjoint
/// sub-rectangles along every distinct column and row boundary, keeping
/// only sub-rectangles covered by at least one input.
fn slice(ranges: &[Range]) -> Vec<Range> {
    if ranges.is_empty() {
        return Vec::new();
    }

    let mut col_bounds: SmallVec<[u32; 8]> = SmallVec::new();
    let mut row_bounds: SmallVec<[u32; 8]> = SmallVec::new();
    for range in ranges {
        col_bounds.push(range.start.column);
        col_bounds.push(range.end.column + 1);
        row_bounds.push(range.start.row);
        row_bounds.push(range.end.row + 1);
    }
    col_bounds.sort_unstable();
    col_bounds.dedup();
    row_bounds.sort_unstable();
    row_bounds.dedup();

    let mut cells = Vec::new();
    for cols in col_bounds.windows(2) {
        for rows in row_bounds.windows(2) {
            let sub = Range {
                start: CellAddress {
                    column: cols[0],
                    row: rows[0],
                },
                end: CellAddress {
                    column: cols[1] - 1,
                    row: rows[1] - 1,
                },
            };
            // a sub-rectangle never straddles an input boundary, so
            // containing its start cell implies covering all of it
            if ranges.iter().any(|r| r.contains_address(&sub.start)) {
                cells.push(sub);
            }
        }
    }
    cells
}

fn coalesce(sliced: Vec<Range>, strategy: MergeStrategy) -> Vec<Range> {
    match strategy {
        MergeStrategy::MergeColumns => merge_across_columns(merge_along_rows(sliced)),
        MergeStrategy::MergeRows => merge_along_rows(merge_across_columns(sliced)),
        MergeStrategy::NoMerge => sliced,
    }
}

/// Coalesce rectangles sharing identical column bounds into taller ones
/// across contiguous or overlapping row runs.
fn merge_along_rows(mut ranges: Vec<Range>) -> Vec<Range> {
    ranges.sort_unstable_by_key(|r| (r.start.column, r.end.column, r.start.row));
    let mut merged: Vec<Range> = Vec::with_capacity(ranges.len());
    for range in ranges {
        if let Some(last) = merged.last_mut()
            && last.start.column == range.start.column
            && last.end.column == range.end.column
            && range.start.row <= last.end.row + 1
        {
            last.end.row = last.end.row.max(range.end.row);
        } else {
            merged.push(range);
        }
    }
    merged
}

/// Coalesce rectangles sharing identical row bounds into wider ones across
/// contiguous or overlapping column runs.
fn merge_across_columns(mut ranges: Vec<Range>) -> Vec<Range> {
    ranges.sort_unstable_by_key(|r| (r.start.row, r.end.row, r.start.column));
    let mut merged: Vec<Range> = Vec::with_capacity(ranges.len());
    for range in ranges {
        if let Some(last) = merged.last_mut()
            && last.start.row == range.start.row
            && last.end.row == range.end.row
            && range.start.column <= last.end.column + 1
        {
            last.end.column = last.end.column.max(range.end.column);
        } else {
            merged.push(range);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn r(s: &str) -> Range {
        s.parse().unwrap()
    }

    fn covered(ranges: &[Range]) -> BTreeSet<(u32, u32)> {
        ranges
            .iter()
            .flat_map(|range| range.addresses().map(|a| (a.column, a.row)))
            .collect()
    }

    fn assert_disjoint(ranges: &[Range]) {
        for (i, a) in ranges.iter().enumerate() {
            for b in &ranges[i + 1..] {
                assert!(!a.overlaps(b), "{a} overlaps {b}");
            }
        }
    }

    #[test]
    fn test_merge_into_empty() {
        let merged = merge_range(&[], r("B2:D4"), MergeStrategy::MergeColumns);
        assert_eq!(merged, vec![r("B2:D4")]);
    }

    #[test]
    fn test_merge_vertically_adjacent_same_columns() {
        let merged = merge_range(&[r("A1:B2")], r("A3:B4"), MergeStrategy::MergeColumns);
        assert_eq!(merged, vec![r("A1:B4")]);
    }

    #[test]
    fn test_adjacent_with_mismatched_bounds_stays_separate() {
        // L-shaped union must not collapse into one rectangle
        let merged = merge_range(&[r("A1:B2")], r("A3:C4"), MergeStrategy::MergeColumns);
        assert_eq!(covered(&merged), covered(&[r("A1:B2"), r("A3:C4")]));
        assert!(merged.len() >= 2);
        assert_disjoint(&merged);
    }

    #[test]
    fn test_merge_overlapping() {
        let merged = merge_range(&[r("A1:C3")], r("B2:D4"), MergeStrategy::MergeColumns);
        assert_eq!(covered(&merged), covered(&[r("A1:C3"), r("B2:D4")]));
        assert_disjoint(&merged);
    }

    #[test]
    fn test_merge_rows_strategy() {
        let merged = merge_range(&[r("A1:B2")], r("C1:D2"), MergeStrategy::MergeRows);
        assert_eq!(merged, vec![r("A1:D2")]);
    }

    #[test]
    fn test_no_merge_returns_slices() {
        let merged = merge_range(&[r("A1:B2")], r("A3:B4"), MergeStrategy::NoMerge);
        assert_eq!(covered(&merged), covered(&[r("A1:B4")]));
        assert_eq!(merged.len(), 2);
        assert_disjoint(&merged);
    }

    #[test]
    fn test_unrelated_ranges_pass_through() {
        let merged = merge_range(&[r("F6:G7")], r("A1:B2"), MergeStrategy::MergeColumns);
        assert!(merged.contains(&r("F6:G7")));
        assert!(merged.contains(&r("A1:B2")));
    }

    #[test]
    fn test_subtract_whole_range() {
        let result = subtract_range(&[r("A1:C4")], r("A1:C4"), MergeStrategy::MergeColumns);
        assert!(result.is_empty());
    }

    #[test]
    fn test_merge_then_subtract_is_empty() {
        let merged = merge_range(&[], r("B2:E5"), MergeStrategy::MergeColumns);
        let result = subtract_range(&merged, r("B2:E5"), MergeStrategy::MergeColumns);
        assert!(result.is_empty());
    }

    #[test]
    fn test_subtract_interior_hole() {
        let result = subtract_range(&[r("A1:E5")], r("C3:C3"), MergeStrategy::MergeColumns);
        let mut expected = covered(&[r("A1:E5")]);
        expected.remove(&(2, 2));
        assert_eq!(covered(&result), expected);
        assert_disjoint(&result);
        // full-width top and bottom pieces plus the two side slivers
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_subtract_edge_strip() {
        let result = subtract_range(&[r("A1:C4")], r("A1:C1"), MergeStrategy::MergeColumns);
        assert_eq!(result, vec![r("A2:C4")]);
    }

    #[test]
    fn test_subtract_untouched_passthrough() {
        let result = subtract_range(
            &[r("A1:B2"), r("F6:G7")],
            r("A1:B2"),
            MergeStrategy::MergeColumns,
        );
        assert_eq!(result, vec![r("F6:G7")]);
    }

    #[test]
    fn test_coverage_invariant_over_sequence() {
        // merged representation must track a naive cell-set accumulation
        let ops: [(&str, bool); 5] = [
            ("A1:D4", true),
            ("C3:F6", true),
            ("B2:E3", false),
            ("A1:A1", false),
            ("D4:G8", true),
        ];
        let mut ranges: Vec<Range> = Vec::new();
        let mut naive: BTreeSet<(u32, u32)> = BTreeSet::new();
        for (s, add) in ops {
            let range = r(s);
            if add {
                ranges = merge_range(&ranges, range, MergeStrategy::MergeColumns);
                naive.extend(range.addresses().map(|a| (a.column, a.row)));
            } else {
                ranges = subtract_range(&ranges, range, MergeStrategy::MergeColumns);
                for a in range.addresses() {
                    naive.remove(&(a.column, a.row));
                }
            }
            assert_eq!(covered(&ranges), naive);
            assert_disjoint(&ranges);
        }
    }
}
