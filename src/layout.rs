//! Centralized layout constants.
//!
//! The magic numbers shared between the rendering layer (`view`) and cursor
//! math in `update` live here so they stay in sync.

// --- Block constants (file headers, comment blocks) ---

pub const BLOCK_MARGIN: usize = 1;
pub const BLOCK_PADDING: usize = 1;
pub const BLOCK_SIDE_MARGIN: u32 = 2;
pub const BLOCK_LEFT_PAD: u32 = 2;
pub const BLOCK_RIGHT_PAD: u32 = 2;

// --- Diff pane ---

pub const DIFF_MARGIN: u32 = 2;
/// Gutter column showing commentable ranges and thread markers.
pub const GUTTER_WIDTH: u32 = 2;
pub const LINE_NUM_WIDTH: u32 = 12;

// --- Comment blocks ---

pub const COMMENT_H_MARGIN: u32 = 2;
pub const COMMENT_H_PAD: u32 = 2;

/// Text rows of the comment editor's input area.
pub const COMMENT_EDITOR_ROWS: usize = 8;

// --- Context lines padded around block-built hunks ---

pub const CONTEXT_OVERFLOW: u32 = 3;

/// Total rows of a block with `content_lines` rows of content.
#[must_use]
pub const fn block_height(content_lines: usize) -> usize {
    content_lines + (BLOCK_MARGIN * 2) + (BLOCK_PADDING * 2)
}

/// Inner width for block content after side margins, bar, and padding.
#[must_use]
pub const fn block_inner_width(pane_width: u32) -> u32 {
    pane_width.saturating_sub(BLOCK_SIDE_MARGIN * 2 + 1 + BLOCK_LEFT_PAD + BLOCK_RIGHT_PAD)
}
