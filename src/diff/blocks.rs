//! Hunk construction from Azure DevOps line-diff blocks.
//!
//! The file-diff endpoint describes changes as blocks tagged
//! None/Add/Delete/Edit with an original start+count and a modified
//! start+count, and no line text. Unchanged (`None`) blocks carry no
//! commentable lines and are skipped. The emitted `position_in_hunk` counter
//! runs across the whole file: it is never reset between blocks, because the
//! comment protocol addresses lines by that running position.

use serde::Deserialize;

use super::{DiffChangeType, DiffHunk, DiffLine};

/// Change type of one line-diff block, as delivered by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDiffBlockType {
    None,
    Add,
    Delete,
    Edit,
}

impl LineDiffBlockType {
    /// Azure encodes the change type as an integer 0–3.
    #[must_use]
    pub const fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Add),
            2 => Some(Self::Delete),
            3 => Some(Self::Edit),
            _ => None,
        }
    }
}

/// One block of an Azure file diff.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDiffBlock {
    pub change_type: i64,
    /// 1-based first line on the original side.
    pub original_line_number_start: u32,
    pub original_lines_count: u32,
    /// 1-based first line on the modified side.
    pub modified_line_number_start: u32,
    pub modified_lines_count: u32,
}

impl LineDiffBlock {
    #[must_use]
    pub const fn kind(&self) -> Option<LineDiffBlockType> {
        LineDiffBlockType::from_wire(self.change_type)
    }
}

/// Build one hunk per non-`None` block.
#[must_use]
pub fn hunks_from_blocks(blocks: &[LineDiffBlock]) -> Vec<DiffHunk> {
    hunks_from_blocks_padded(blocks, 0)
}

/// Like [`hunks_from_blocks`], widening each block by `overflow` context
/// lines before and after the changed region (clamped at line 1) so small
/// edits leave the inline-comment UI room to anchor.
#[must_use]
pub fn hunks_from_blocks_padded(blocks: &[LineDiffBlock], overflow: u32) -> Vec<DiffHunk> {
    let mut hunks = Vec::new();
    let mut position: u32 = 0;

    for block in blocks {
        let kind = match block.kind() {
            Some(LineDiffBlockType::None) => continue,
            Some(kind) => kind,
            None => {
                tracing::warn!(change_type = block.change_type, "unknown line-diff block type");
                continue;
            }
        };

        let lead = overflow
            .min(block.original_line_number_start.saturating_sub(1))
            .min(block.modified_line_number_start.saturating_sub(1));

        let old_start = block.original_line_number_start - lead;
        let new_start = block.modified_line_number_start - lead;
        let (old_count, new_count) = match kind {
            LineDiffBlockType::Add => (lead + overflow, block.modified_lines_count + lead + overflow),
            LineDiffBlockType::Delete => {
                (block.original_lines_count + lead + overflow, lead + overflow)
            }
            _ => (
                block.original_lines_count + lead + overflow,
                block.modified_lines_count + lead + overflow,
            ),
        };

        let mut hunk = DiffHunk::new(old_start, old_count, new_start, new_count);

        // Leading context margin.
        for i in 0..lead {
            hunk.lines.push(DiffLine::new(
                DiffChangeType::Context,
                Some(old_start + i),
                Some(new_start + i),
                position,
            ));
            position += 1;
        }

        emit_block_lines(&mut hunk, block, kind, &mut position);

        // Trailing context margin.
        let old_after = block.original_line_number_start + block.original_lines_count;
        let new_after = block.modified_line_number_start + block.modified_lines_count;
        for i in 0..overflow {
            hunk.lines.push(DiffLine::new(
                DiffChangeType::Context,
                Some(old_after + i),
                Some(new_after + i),
                position,
            ));
            position += 1;
        }

        hunks.push(hunk);
    }

    hunks
}

/// Emit the changed lines of one block.
///
/// An `Edit` of N original and M modified lines emits `max(N, M)` lines:
/// `min(N, M)` deletes for the overlapping extent, then the trailing length
/// difference degrades into extra deletes (N > M) or adds (M > N).
fn emit_block_lines(
    hunk: &mut DiffHunk,
    block: &LineDiffBlock,
    kind: LineDiffBlockType,
    position: &mut u32,
) {
    match kind {
        LineDiffBlockType::Add => {
            for i in 0..block.modified_lines_count {
                hunk.lines.push(DiffLine::new(
                    DiffChangeType::Add,
                    None,
                    Some(block.modified_line_number_start + i),
                    *position,
                ));
                *position += 1;
            }
        }
        LineDiffBlockType::Delete => {
            for i in 0..block.original_lines_count {
                hunk.lines.push(DiffLine::new(
                    DiffChangeType::Delete,
                    Some(block.original_line_number_start + i),
                    None,
                    *position,
                ));
                *position += 1;
            }
        }
        LineDiffBlockType::Edit => {
            let n = block.original_lines_count;
            let m = block.modified_lines_count;
            let overlap = n.min(m);
            for i in 0..overlap {
                hunk.lines.push(DiffLine::new(
                    DiffChangeType::Delete,
                    Some(block.original_line_number_start + i),
                    None,
                    *position,
                ));
                *position += 1;
            }
            if n > m {
                for i in overlap..n {
                    hunk.lines.push(DiffLine::new(
                        DiffChangeType::Delete,
                        Some(block.original_line_number_start + i),
                        None,
                        *position,
                    ));
                    *position += 1;
                }
            } else {
                for i in overlap..m {
                    hunk.lines.push(DiffLine::new(
                        DiffChangeType::Add,
                        None,
                        Some(block.modified_line_number_start + i),
                        *position,
                    ));
                    *position += 1;
                }
            }
        }
        LineDiffBlockType::None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn none_blocks_are_skipped() {
        let hunks = hunks_from_blocks(&[block(0, 1, 40, 1, 37)]);
        assert!(hunks.is_empty());
    }

    #[test]
    fn add_block_emits_modified_count_lines() {
        let hunks = hunks_from_blocks(&[block(1, 5, 0, 6, 3)]);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].lines.len(), 3);
        assert!(hunks[0]
            .lines
            .iter()
            .all(|l| l.kind == DiffChangeType::Add));
        assert_eq!(hunks[0].lines[0].new_line, Some(6));
        assert_eq!(hunks[0].lines[2].new_line, Some(8));
    }

    #[test]
    fn delete_block_emits_original_count_lines() {
        let hunks = hunks_from_blocks(&[block(2, 10, 4, 9, 0)]);
        assert_eq!(hunks[0].lines.len(), 4);
        assert!(hunks[0]
            .lines
            .iter()
            .all(|l| l.kind == DiffChangeType::Delete));
    }

    #[test]
    fn edit_block_emits_max_of_both_counts() {
        // N=1, M=7: one delete for the overlap, six trailing adds.
        let hunks = hunks_from_blocks(&[block(3, 41, 1, 38, 7)]);
        let lines = &hunks[0].lines;
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0].kind, DiffChangeType::Delete);
        assert_eq!(lines[0].old_line, Some(41));
        assert!(lines[1..].iter().all(|l| l.kind == DiffChangeType::Add));

        // N=5, M=2: two deletes for the overlap, three trailing deletes.
        let hunks = hunks_from_blocks(&[block(3, 10, 5, 10, 2)]);
        let lines = &hunks[0].lines;
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l.kind == DiffChangeType::Delete));
        assert_eq!(lines[4].old_line, Some(14));
    }

    #[test]
    fn positions_run_across_blocks_without_reset() {
        let hunks = hunks_from_blocks(&[
            block(3, 41, 1, 38, 7),
            block(0, 42, 60, 45, 55),
            block(3, 103, 1, 101, 5),
        ]);
        assert_eq!(hunks.len(), 2);
        let positions: Vec<u32> = hunks
            .iter()
            .flat_map(|h| h.lines.iter().map(|l| l.position_in_hunk))
            .collect();
        let expected: Vec<u32> = (0..positions.len() as u32).collect();
        assert_eq!(positions, expected);
    }

    #[test]
    fn padded_variant_adds_clamped_context_margin() {
        let hunks = hunks_from_blocks_padded(&[block(3, 2, 1, 2, 1)], 3);
        let hunk = &hunks[0];
        // Only one line of room before the edit: margin clamps to 1.
        assert_eq!(hunk.old_start, 1);
        assert_eq!(hunk.new_start, 1);
        assert_eq!(hunk.lines[0].kind, DiffChangeType::Context);
        assert_eq!(hunk.lines[0].old_line, Some(1));
        // 1 lead context + 1 delete + 3 trailing context.
        assert_eq!(hunk.lines.len(), 5);
        let trailing = &hunk.lines[2..];
        assert!(trailing.iter().all(|l| l.kind == DiffChangeType::Context));
        assert_eq!(trailing[0].old_line, Some(3));
        assert_eq!(trailing[0].new_line, Some(3));
    }
}
