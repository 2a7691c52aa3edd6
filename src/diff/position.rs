//! Line position mapping between the two sides of a diff.
//!
//! Used to keep a thread's on-screen anchor correct when the working copy
//! has uncommitted edits relative to the commit the thread was created
//! against, and to redisplay threads against a newer or older revision.

use serde::{Deserialize, Serialize};

use super::{DiffChangeType, DiffHunk};

/// Which side of a diff a line number refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffSide {
    /// The prior revision (left).
    Base,
    /// The current revision (right).
    Modified,
}

/// Result of mapping a line to the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedPosition {
    /// 1-based line on the target side.
    pub line: u32,
    /// False when the exact line was deleted and a nearby surviving line was
    /// chosen instead.
    pub exact: bool,
}

impl MappedPosition {
    const fn exact(line: u32) -> Self {
        Self { line, exact: true }
    }

    const fn nearest(line: u32) -> Self {
        Self { line, exact: false }
    }
}

/// Map `line` (1-based, anchored on `from`) to the equivalent line on the
/// opposite side of the diff described by `hunks`.
///
/// Lines outside every hunk shift by the cumulative length delta of the
/// hunks before them. A line whose exact counterpart was removed maps to the
/// nearest earlier surviving line, falling back to the first line of the
/// hunk's opposite span — a deleted anchor never makes the mapping fail.
#[must_use]
pub fn map_position(hunks: &[DiffHunk], line: u32, from: DiffSide) -> MappedPosition {
    let mut delta: i64 = 0;

    for hunk in hunks {
        let (start, count, other_start) = match from {
            DiffSide::Base => (hunk.old_start, hunk.old_count, hunk.new_start),
            DiffSide::Modified => (hunk.new_start, hunk.new_count, hunk.old_start),
        };

        if line < start {
            break;
        }

        let end = start + count.max(1) - 1;
        if line <= end {
            return map_within_hunk(hunk, line, from, other_start);
        }

        delta += match from {
            DiffSide::Base => i64::from(hunk.new_count) - i64::from(hunk.old_count),
            DiffSide::Modified => i64::from(hunk.old_count) - i64::from(hunk.new_count),
        };
    }

    let mapped = i64::from(line) + delta;
    MappedPosition::exact(u32::try_from(mapped.max(1)).unwrap_or(1))
}

fn map_within_hunk(
    hunk: &DiffHunk,
    line: u32,
    from: DiffSide,
    other_start: u32,
) -> MappedPosition {
    let own = |l: &super::DiffLine| match from {
        DiffSide::Base => l.old_line,
        DiffSide::Modified => l.new_line,
    };
    let other = |l: &super::DiffLine| match from {
        DiffSide::Base => l.new_line,
        DiffSide::Modified => l.old_line,
    };

    // Exact counterpart: the line survives on both sides.
    if let Some(found) = hunk
        .lines
        .iter()
        .find(|l| l.kind != DiffChangeType::Control && own(l) == Some(line))
    {
        if let Some(mapped) = other(found) {
            return MappedPosition::exact(mapped);
        }
    }

    // Deleted: nearest earlier line that survives on the other side.
    let nearest = hunk
        .lines
        .iter()
        .filter(|l| l.kind != DiffChangeType::Control)
        .filter(|l| own(l).is_some_and(|n| n < line))
        .filter_map(other)
        .next_back();

    MappedPosition::nearest(nearest.unwrap_or(other_start.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::ParsedDiff;

    fn sample_hunks() -> Vec<DiffHunk> {
        // base lines 10..13 → modified lines 10..14
        let diff = "--- a/f\n+++ b/f\n@@ -10,4 +10,5 @@\n ctx1\n-gone1\n-gone2\n+new1\n+new2\n+new3\n ctx2\n";
        ParsedDiff::parse(diff).hunks
    }

    #[test]
    fn lines_before_hunks_map_unchanged() {
        let hunks = sample_hunks();
        assert_eq!(
            map_position(&hunks, 3, DiffSide::Base),
            MappedPosition { line: 3, exact: true }
        );
    }

    #[test]
    fn lines_after_hunks_shift_by_delta() {
        let hunks = sample_hunks();
        // One line longer on the modified side.
        assert_eq!(map_position(&hunks, 20, DiffSide::Base).line, 21);
        assert_eq!(map_position(&hunks, 21, DiffSide::Modified).line, 20);
    }

    #[test]
    fn context_lines_map_exactly() {
        let hunks = sample_hunks();
        let mapped = map_position(&hunks, 10, DiffSide::Base);
        assert_eq!(mapped, MappedPosition { line: 10, exact: true });
        // ctx2: base 13 → modified 14
        let mapped = map_position(&hunks, 13, DiffSide::Base);
        assert_eq!(mapped, MappedPosition { line: 14, exact: true });
    }

    #[test]
    fn deleted_line_falls_back_to_nearest_survivor() {
        let hunks = sample_hunks();
        // Base line 12 ("gone2") has no modified counterpart; the nearest
        // earlier surviving line is ctx1 at modified line 10.
        let mapped = map_position(&hunks, 12, DiffSide::Base);
        assert!(!mapped.exact);
        assert_eq!(mapped.line, 10);
    }

    #[test]
    fn deletion_at_hunk_start_falls_back_to_opposite_span() {
        let diff = "--- a/f\n+++ b/f\n@@ -1,2 +1,1 @@\n-gone\n ctx\n";
        let hunks = ParsedDiff::parse(diff).hunks;
        let mapped = map_position(&hunks, 1, DiffSide::Base);
        assert!(!mapped.exact);
        assert_eq!(mapped.line, 1);
    }

    #[test]
    fn round_trip_is_identity_for_surviving_lines() {
        let hunks = sample_hunks();
        for line in [1, 5, 10, 14, 25, 100] {
            let there = map_position(&hunks, line, DiffSide::Base);
            if there.exact {
                let back = map_position(&hunks, there.line, DiffSide::Modified);
                assert!(back.exact);
                assert_eq!(back.line, line, "round trip failed for {line}");
            }
        }
    }
}
