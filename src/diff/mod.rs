//! Diff hunk model shared by both providers.
//!
//! GitHub delivers unified diff text (`parse`), Azure DevOps delivers
//! line-diff blocks (`blocks`); both produce the same [`DiffHunk`] structure
//! consumed by position mapping (`position`), the commenting-range calculator
//! (`ranges`), and the diff pane.

pub mod blocks;
pub mod parse;
pub mod position;
pub mod ranges;

pub use blocks::{hunks_from_blocks, hunks_from_blocks_padded, LineDiffBlock, LineDiffBlockType};
pub use parse::ParsedDiff;
pub use position::{map_position, DiffSide, MappedPosition};
pub use ranges::{commenting_ranges, LineRange};

/// A single hunk: a contiguous span of change between two revisions.
#[derive(Debug, Clone)]
pub struct DiffHunk {
    /// 1-based first line on the original (base) side.
    pub old_start: u32,
    /// Number of original-side lines covered.
    pub old_count: u32,
    /// 1-based first line on the modified side.
    pub new_start: u32,
    /// Number of modified-side lines covered.
    pub new_count: u32,
    /// Emitted lines, in `position_in_hunk` order.
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    #[must_use]
    pub const fn new(old_start: u32, old_count: u32, new_start: u32, new_count: u32) -> Self {
        Self {
            old_start,
            old_count,
            new_start,
            new_count,
            lines: Vec::new(),
        }
    }
}

/// Change type of one diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffChangeType {
    /// Present on both sides.
    Context,
    /// Present only on the modified side.
    Add,
    /// Present only on the base side.
    Delete,
    /// Hunk header (`@@`) line; carries no file line on either side.
    Control,
}

/// A single line of a hunk.
///
/// The absent side is `None` rather than a numeric sentinel. `position_in_hunk`
/// is the index the provider comment protocols address lines by; it runs
/// strictly increasing across the whole emitted sequence of a file's hunks and
/// is never reset between the line-diff blocks that produced them.
#[derive(Debug, Clone)]
pub struct DiffLine {
    pub kind: DiffChangeType,
    /// 1-based line number on the base side, if present there.
    pub old_line: Option<u32>,
    /// 1-based line number on the modified side, if present there.
    pub new_line: Option<u32>,
    /// Running position within the emitted sequence.
    pub position_in_hunk: u32,
    /// Line text without the `+`/`-`/space prefix. Empty for block-built
    /// hunks, which carry no text; the renderer resolves content from the
    /// file.
    pub content: String,
}

impl DiffLine {
    #[must_use]
    pub const fn new(
        kind: DiffChangeType,
        old_line: Option<u32>,
        new_line: Option<u32>,
        position_in_hunk: u32,
    ) -> Self {
        Self {
            kind,
            old_line,
            new_line,
            position_in_hunk,
            content: String::new(),
        }
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

/// Total added/removed counts across a hunk list (for file header badges).
#[must_use]
pub fn change_counts(hunks: &[DiffHunk]) -> (usize, usize) {
    let mut added = 0;
    let mut removed = 0;
    for hunk in hunks {
        for line in &hunk.lines {
            match line.kind {
                DiffChangeType::Add => added += 1,
                DiffChangeType::Delete => removed += 1,
                DiffChangeType::Context | DiffChangeType::Control => {}
            }
        }
    }
    (added, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_counts_tallies_adds_and_deletes() {
        let mut hunk = DiffHunk::new(1, 2, 1, 3);
        hunk.lines = vec![
            DiffLine::new(DiffChangeType::Control, None, None, 0),
            DiffLine::new(DiffChangeType::Context, Some(1), Some(1), 1),
            DiffLine::new(DiffChangeType::Delete, Some(2), None, 2),
            DiffLine::new(DiffChangeType::Add, None, Some(2), 3),
            DiffLine::new(DiffChangeType::Add, None, Some(3), 4),
        ];
        assert_eq!(change_counts(&[hunk]), (2, 1));
    }
}
