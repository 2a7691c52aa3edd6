//! Commenting-range calculator.
//!
//! Computes which line spans of a file may host a new inline comment, per
//! diff side. The base (left) side only accepts comments on deleted lines;
//! the modified (right) side accepts comments anywhere a hunk touches.

use super::{DiffChangeType, DiffHunk};

/// A closed, zero-based line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl LineRange {
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn contains(&self, line: u32) -> bool {
        line >= self.start && line <= self.end
    }
}

/// Line spans eligible for a new inline comment, zero-based.
///
/// Base side: one range per maximal contiguous run of deleted lines, in base
/// coordinates. Modified side: one range per hunk covering the hunk's whole
/// modified span. An empty hunk list legitimately yields no ranges (a file
/// with no diff); that case is logged as a breadcrumb, not raised.
#[must_use]
pub fn commenting_ranges(hunks: &[DiffHunk], is_base: bool) -> Vec<LineRange> {
    if hunks.is_empty() {
        tracing::debug!("no hunks; commenting ranges are empty");
        return Vec::new();
    }

    if is_base {
        base_ranges(hunks)
    } else {
        hunks
            .iter()
            .map(|hunk| {
                LineRange::new(
                    hunk.new_start.saturating_sub(1),
                    hunk.new_start.saturating_sub(1) + hunk.new_count,
                )
            })
            .collect()
    }
}

fn base_ranges(hunks: &[DiffHunk]) -> Vec<LineRange> {
    let mut ranges = Vec::new();
    let mut run: Option<LineRange> = None;

    for hunk in hunks {
        for line in &hunk.lines {
            match (line.kind, line.old_line) {
                (DiffChangeType::Delete, Some(old)) => {
                    let zero_based = old.saturating_sub(1);
                    match &mut run {
                        Some(range) if zero_based == range.end + 1 => range.end = zero_based,
                        Some(range) => {
                            ranges.push(*range);
                            run = Some(LineRange::new(zero_based, zero_based));
                        }
                        None => run = Some(LineRange::new(zero_based, zero_based)),
                    }
                }
                _ => {
                    if let Some(range) = run.take() {
                        ranges.push(range);
                    }
                }
            }
        }
    }

    // A trailing pure deletion must still close out its final range.
    if let Some(range) = run.take() {
        ranges.push(range);
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::blocks::{hunks_from_blocks, LineDiffBlock};
    use crate::diff::ParsedDiff;

    fn block(
        change_type: i64,
        original_start: u32,
        original_count: u32,
        modified_start: u32,
        modified_count: u32,
    ) -> LineDiffBlock {
        LineDiffBlock {
            change_type,
            original_line_number_start: original_start,
            original_lines_count: original_count,
            modified_line_number_start: modified_start,
            modified_lines_count: modified_count,
        }
    }

    /// Five line-diff blocks with two `Edit`s at original lines 41 and 103.
    fn edit_filediff() -> Vec<LineDiffBlock> {
        vec![
            block(0, 1, 40, 1, 37),
            block(3, 41, 1, 38, 7),
            block(0, 42, 61, 45, 56),
            block(3, 103, 1, 101, 5),
            block(0, 104, 200, 106, 200),
        ]
    }

    #[test]
    fn empty_hunks_yield_no_ranges() {
        assert!(commenting_ranges(&[], true).is_empty());
        assert!(commenting_ranges(&[], false).is_empty());
    }

    #[test]
    fn base_side_of_edit_filediff() {
        let hunks = hunks_from_blocks(&edit_filediff());
        let ranges = commenting_ranges(&hunks, true);
        assert_eq!(ranges, vec![LineRange::new(40, 40), LineRange::new(102, 102)]);
    }

    #[test]
    fn modified_side_of_edit_filediff() {
        let hunks = hunks_from_blocks(&edit_filediff());
        let ranges = commenting_ranges(&hunks, false);
        assert_eq!(ranges, vec![LineRange::new(37, 44), LineRange::new(100, 105)]);
    }

    #[test]
    fn pure_deletion_at_first_hunk_closes_final_range() {
        // A 22-line deletion as the only block: exactly one range [0, 21].
        let hunks = hunks_from_blocks(&[block(2, 1, 22, 0, 0)]);
        let ranges = commenting_ranges(&hunks, true);
        assert_eq!(ranges, vec![LineRange::new(0, 21)]);
    }

    #[test]
    fn base_runs_split_on_gaps() {
        let diff = "--- a/f\n+++ b/f\n@@ -1,5 +1,3 @@\n-a\n-b\n ctx\n-c\n ctx2\n";
        let hunks = ParsedDiff::parse(diff).hunks;
        let ranges = commenting_ranges(&hunks, true);
        assert_eq!(ranges, vec![LineRange::new(0, 1), LineRange::new(3, 3)]);
    }

    #[test]
    fn modified_side_spans_each_hunk() {
        let diff = "--- a/f\n+++ b/f\n@@ -3,2 +3,4 @@\n ctx\n+x\n+y\n ctx2\n";
        let hunks = ParsedDiff::parse(diff).hunks;
        let ranges = commenting_ranges(&hunks, false);
        assert_eq!(ranges, vec![LineRange::new(2, 6)]);
    }
}
