//! Application state model.

use std::collections::HashMap;

use crate::api::{PullRequestDetail, PullRequestSummary, ThreadAnchor, ThreadStatus};
use crate::config::UiConfig;
use crate::diff::{DiffChangeType, DiffHunk, LineRange};
use crate::layout::{BLOCK_PADDING, COMMENT_H_MARGIN, COMMENT_H_PAD};
use crate::reconcile::{LocalThread, ThreadSet};
use crate::syntax::{HighlightSpan, Highlighter};
use crate::text::wrap_text;
use crate::theme::Theme;

/// Current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    PrList,
    PrDetail,
}

/// Which pane has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    PrList,
    FileSidebar,
    DiffPane,
    CommandPalette,
    Commenting,
}

/// What the command palette is showing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PaletteMode {
    #[default]
    Commands,
    Themes,
    /// Legal next statuses for a thread (current status excluded).
    ThreadStatus { thread_id: String },
}

/// PR list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrFilter {
    #[default]
    All,
    Open,
    Closed,
}

/// Cached per-file review data.
pub struct FileCacheEntry {
    /// Hunks with content filled in.
    pub hunks: Vec<DiffHunk>,
    /// Head-revision lines (context around block-built hunks).
    pub head_lines: Vec<String>,
    /// Highlight spans parallel to the flattened hunk lines.
    pub highlighted: Vec<Vec<HighlightSpan>>,
    pub base_ranges: Vec<LineRange>,
    pub modified_ranges: Vec<LineRange>,
    pub viewed: bool,
    /// Content hash of the head revision, for the viewed store.
    pub content_hash: Option<String>,
}

/// What the comment editor will submit.
#[derive(Debug, Clone)]
pub enum CommentTarget {
    NewThread,
    Reply { thread_id: String },
    Edit { thread_id: String, comment_id: String },
}

/// A comment-editor invocation.
#[derive(Debug, Clone)]
pub struct CommentRequest {
    pub pr: u64,
    pub anchor: ThreadAnchor,
    pub target: CommentTarget,
    /// Existing comments shown above the text area for context.
    pub existing: Vec<(String, String)>,
}

/// In-TUI multi-line comment editor state.
#[derive(Debug, Clone)]
pub struct InlineEditor {
    /// Lines of text (always at least one)
    pub lines: Vec<String>,
    pub cursor_row: usize,
    pub cursor_col: usize,
    pub scroll: usize,
    pub request: CommentRequest,
}

impl InlineEditor {
    #[must_use]
    pub fn new(request: CommentRequest) -> Self {
        Self {
            lines: vec![String::new()],
            cursor_row: 0,
            cursor_col: 0,
            scroll: 0,
            request,
        }
    }

    /// Editor opened with prefilled text (comment edits).
    #[must_use]
    pub fn with_body(request: CommentRequest, body: &str) -> Self {
        let lines: Vec<String> = if body.is_empty() {
            vec![String::new()]
        } else {
            body.lines().map(String::from).collect()
        };
        let cursor_row = lines.len() - 1;
        let cursor_col = lines[cursor_row].chars().count();
        Self {
            lines,
            cursor_row,
            cursor_col,
            scroll: 0,
            request,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let line = &mut self.lines[self.cursor_row];
        let byte_idx = char_to_byte_index(line, self.cursor_col);
        line.insert(byte_idx, c);
        self.cursor_col += 1;
    }

    pub fn newline(&mut self) {
        let byte_idx = char_to_byte_index(&self.lines[self.cursor_row], self.cursor_col);
        let rest = self.lines[self.cursor_row][byte_idx..].to_string();
        self.lines[self.cursor_row].truncate(byte_idx);
        self.cursor_row += 1;
        self.lines.insert(self.cursor_row, rest);
        self.cursor_col = 0;
    }

    pub fn backspace(&mut self) {
        if self.cursor_col > 0 {
            let line = &mut self.lines[self.cursor_row];
            let start = char_to_byte_index(line, self.cursor_col - 1);
            let end = char_to_byte_index(line, self.cursor_col);
            line.drain(start..end);
            self.cursor_col -= 1;
        } else if self.cursor_row > 0 {
            let current = self.lines.remove(self.cursor_row);
            self.cursor_row -= 1;
            self.cursor_col = self.lines[self.cursor_row].chars().count();
            self.lines[self.cursor_row].push_str(&current);
        }
    }

    pub fn cursor_up(&mut self) {
        if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.clamp_col();
        }
    }

    pub fn cursor_down(&mut self) {
        if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.clamp_col();
        }
    }

    pub fn cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.lines[self.cursor_row].chars().count();
        }
    }

    pub fn cursor_right(&mut self) {
        let line_len = self.lines[self.cursor_row].chars().count();
        if self.cursor_col < line_len {
            self.cursor_col += 1;
        } else if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = 0;
        }
    }

    pub const fn home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn end(&mut self) {
        self.cursor_col = self.lines[self.cursor_row].chars().count();
    }

    /// Move cursor one word to the left (Alt+B).
    pub fn word_left(&mut self) {
        if self.cursor_col == 0 {
            return;
        }
        let line = &self.lines[self.cursor_row];
        let byte_idx = char_to_byte_index(line, self.cursor_col);
        let before = &line[..byte_idx];
        let trimmed = before.trim_end();
        let word_start = trimmed
            .rfind(|c: char| c.is_whitespace())
            .map_or(0, |i| i + 1);
        self.cursor_col = before[..word_start].chars().count();
    }

    /// Move cursor one word to the right (Alt+F).
    pub fn word_right(&mut self) {
        let line = &self.lines[self.cursor_row];
        let line_len = line.chars().count();
        if self.cursor_col >= line_len {
            return;
        }
        let byte_idx = char_to_byte_index(line, self.cursor_col);
        let after = &line[byte_idx..];
        let skip_word = after
            .find(|c: char| c.is_whitespace())
            .unwrap_or(after.len());
        let rest = &after[skip_word..];
        let skip_space = rest
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(rest.len());
        self.cursor_col += after[..skip_word + skip_space].chars().count();
    }

    /// Delete the word before the cursor (Ctrl+W).
    pub fn delete_word(&mut self) {
        if self.cursor_col == 0 {
            return;
        }
        let line = &self.lines[self.cursor_row];
        let byte_idx = char_to_byte_index(line, self.cursor_col);
        let before = &line[..byte_idx];
        let trimmed = before.trim_end();
        let word_start = trimmed
            .rfind(|c: char| c.is_whitespace())
            .map_or(0, |i| i + 1);
        let new_col = before[..word_start].chars().count();
        let start_byte = char_to_byte_index(&self.lines[self.cursor_row], new_col);
        self.lines[self.cursor_row].drain(start_byte..byte_idx);
        self.cursor_col = new_col;
    }

    /// Clear from cursor to start of line (Ctrl+U).
    pub fn clear_line(&mut self) {
        let byte_idx = char_to_byte_index(&self.lines[self.cursor_row], self.cursor_col);
        self.lines[self.cursor_row].drain(..byte_idx);
        self.cursor_col = 0;
    }

    /// Full body text.
    #[must_use]
    pub fn body(&self) -> String {
        self.lines.join("\n").trim().to_string()
    }

    /// Keep the cursor visible in a viewport of `viewport_height` rows.
    pub const fn ensure_visible(&mut self, viewport_height: usize) {
        if viewport_height == 0 {
            return;
        }
        if self.cursor_row < self.scroll {
            self.scroll = self.cursor_row;
        } else if self.cursor_row >= self.scroll + viewport_height {
            self.scroll = self.cursor_row - viewport_height + 1;
        }
    }

    fn clamp_col(&mut self) {
        let line_len = self.lines[self.cursor_row].chars().count();
        if self.cursor_col > line_len {
            self.cursor_col = line_len;
        }
    }
}

/// Convert a character index to a byte index in a string.
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map_or(s.len(), |(byte_idx, _)| byte_idx)
}

/// Effects queued by `update` and executed by the session loop.
#[derive(Debug, Clone)]
pub enum PendingAction {
    LoadPrList,
    OpenPr(u64),
    /// Provider call for a comment already inserted optimistically.
    SubmitComment {
        request: CommentRequest,
        body: String,
        local_thread_id: String,
        local_comment_id: String,
    },
    ChangeStatus {
        thread_id: String,
        status: ThreadStatus,
    },
    ToggleViewed {
        path: String,
    },
    MergePr(u64),
}

/// One row of the diff pane's display stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayRow {
    /// `@@` separator row for hunk `hunk_idx`.
    HunkHeader { hunk_idx: usize },
    /// One diff line; `flat_idx` indexes the flattened hunk lines (and the
    /// highlight cache).
    Line {
        hunk_idx: usize,
        line_idx: usize,
        flat_idx: usize,
    },
    /// One row of a thread comment block.
    ThreadRow {
        thread_id: String,
        row: usize,
        total_rows: usize,
    },
}

/// Application state.
pub struct Model {
    // === Screen state ===
    pub screen: Screen,
    pub focus: Focus,

    // === Data ===
    pub prs: Vec<PullRequestSummary>,
    pub current_pr: Option<PullRequestDetail>,
    pub threads: ThreadSet,
    pub files: Vec<crate::api::FileChange>,
    pub file_cache: HashMap<String, FileCacheEntry>,
    pub highlighter: Highlighter,
    /// Provider name for the status bar.
    pub provider_name: &'static str,
    /// Author name used for optimistic comments.
    pub user: String,

    // === UI state ===
    pub list_index: usize,
    pub list_scroll: usize,
    pub file_index: usize,
    pub sidebar_visible: bool,
    pub diff_scroll: usize,
    /// Cursor row into the display stream of the selected file.
    pub diff_cursor: usize,
    pub filter: PrFilter,
    pub search_input: String,
    pub search_active: bool,
    pub visual_mode: bool,
    pub visual_anchor: usize,
    pub inline_editor: Option<InlineEditor>,

    // === Command palette ===
    pub palette_input: String,
    pub palette_selection: usize,
    pub palette_mode: PaletteMode,

    // === Effects ===
    pub pending_actions: Vec<PendingAction>,

    // === Feedback ===
    /// Shown in the help bar until the next keypress.
    pub flash_message: Option<String>,

    // === Layout ===
    pub width: u16,
    pub height: u16,
    pub theme: Theme,
    pub config: UiConfig,

    // === Control ===
    pub should_quit: bool,
    pub needs_redraw: bool,
}

impl Model {
    #[must_use]
    pub fn new(width: u16, height: u16, config: UiConfig) -> Self {
        Self {
            screen: Screen::default(),
            focus: Focus::default(),
            prs: Vec::new(),
            current_pr: None,
            threads: ThreadSet::new(),
            files: Vec::new(),
            file_cache: HashMap::new(),
            highlighter: Highlighter::new(),
            provider_name: "github",
            user: "you".to_string(),
            list_index: 0,
            list_scroll: 0,
            file_index: 0,
            sidebar_visible: true,
            diff_scroll: 0,
            diff_cursor: 0,
            filter: PrFilter::default(),
            search_input: String::new(),
            search_active: false,
            visual_mode: false,
            visual_anchor: 0,
            inline_editor: None,
            palette_input: String::new(),
            palette_selection: 0,
            palette_mode: PaletteMode::default(),
            pending_actions: Vec::new(),
            flash_message: None,
            width,
            height,
            theme: Theme::default(),
            config,
            should_quit: false,
            needs_redraw: true,
        }
    }

    /// PRs surviving the status filter and search query.
    #[must_use]
    pub fn filtered_prs(&self) -> Vec<&PullRequestSummary> {
        let status_filtered: Vec<&PullRequestSummary> = match self.filter {
            PrFilter::All => self.prs.iter().collect(),
            PrFilter::Open => self
                .prs
                .iter()
                .filter(|pr| pr.state == "open" || pr.state == "draft")
                .collect(),
            PrFilter::Closed => self
                .prs
                .iter()
                .filter(|pr| pr.state != "open" && pr.state != "draft")
                .collect(),
        };
        if self.search_input.is_empty() {
            return status_filtered;
        }
        let query = self.search_input.to_lowercase();
        status_filtered
            .into_iter()
            .filter(|pr| {
                pr.title.to_lowercase().contains(&query)
                    || pr.author.to_lowercase().contains(&query)
                    || pr.number.to_string().contains(&query)
            })
            .collect()
    }

    /// Path of the file selected in the sidebar.
    #[must_use]
    pub fn selected_file(&self) -> Option<&str> {
        self.files.get(self.file_index).map(|f| f.path.as_str())
    }

    /// Cache entry for the selected file.
    #[must_use]
    pub fn selected_entry(&self) -> Option<&FileCacheEntry> {
        self.file_cache.get(self.selected_file()?)
    }

    /// Threads of the selected file, sorted by anchor line.
    #[must_use]
    pub fn threads_for_selected_file(&self) -> Vec<&LocalThread> {
        let Some(path) = self.selected_file() else {
            return Vec::new();
        };
        let mut threads = self.threads.threads_for_file(path);
        threads.sort_by_key(|t| t.line_span().0);
        threads
    }

    /// Width of the diff pane's content area given the current layout.
    /// Must match the split in the detail view so block heights agree.
    #[must_use]
    pub fn diff_pane_width(&self) -> u32 {
        let width = u32::from(self.width);
        let sidebar = if self.sidebar_visible {
            SIDEBAR_WIDTH.min(width / 2)
        } else {
            0
        };
        width.saturating_sub(sidebar)
    }

    /// Display stream for the selected file: diff rows interleaved with
    /// thread comment blocks. Built identically by `update` (cursor math)
    /// and `view` (rendering).
    #[must_use]
    pub fn display_rows(&self) -> Vec<DisplayRow> {
        let Some(entry) = self.selected_entry() else {
            return Vec::new();
        };
        let threads = self.threads_for_selected_file();
        let block_width = comment_block_text_width(self.diff_pane_width());
        build_display_rows(&entry.hunks, &threads, block_width)
    }

    /// The thread whose block contains (or whose anchor line is) the cursor
    /// row.
    #[must_use]
    pub fn thread_at_cursor(&self) -> Option<&LocalThread> {
        let rows = self.display_rows();
        let row = rows.get(self.diff_cursor)?;
        let thread_id = match row {
            DisplayRow::ThreadRow { thread_id, .. } => thread_id.clone(),
            DisplayRow::Line {
                hunk_idx, line_idx, ..
            } => {
                let entry = self.selected_entry()?;
                let line = &entry.hunks[*hunk_idx].lines[*line_idx];
                let threads = self.threads_for_selected_file();
                threads
                    .iter()
                    .find(|t| thread_anchored_at(t, line))
                    .map(|t| t.id.clone())?
            }
            DisplayRow::HunkHeader { .. } => return None,
        };
        self.threads.get(&thread_id)
    }

    /// Handle terminal resize.
    pub const fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Visible height of the diff pane.
    #[must_use]
    pub const fn diff_visible_height(&self) -> usize {
        // Header row + file header + help bar.
        self.height.saturating_sub(4) as usize
    }

    /// Visible height of the PR list.
    #[must_use]
    pub const fn list_visible_height(&self) -> usize {
        self.height.saturating_sub(5) as usize
    }
}

/// Sidebar width in columns.
pub const SIDEBAR_WIDTH: u32 = 32;

/// Text width inside a comment block for a given pane width.
#[must_use]
pub const fn comment_block_text_width(pane_width: u32) -> usize {
    pane_width.saturating_sub(COMMENT_H_MARGIN * 2 + 4 + COMMENT_H_PAD * 2) as usize
}

/// True when `thread` is anchored at `line` (on the thread's own side).
#[must_use]
pub fn thread_anchored_at(thread: &LocalThread, line: &crate::diff::DiffLine) -> bool {
    let (_, end) = thread.line_span();
    match thread.anchor.side {
        crate::diff::DiffSide::Base => line.old_line == Some(end),
        crate::diff::DiffSide::Modified => line.new_line == Some(end),
    }
}

/// One rendered line of a thread comment block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadBlockLine {
    Padding,
    /// Status label + anchor location.
    Header { left: String, right: String },
    /// Comment author, with a phase note for pending/failed entries.
    Author { name: String, note: &'static str },
    Body(String),
}

/// Content lines of a thread's comment block at a given text width. The
/// cursor math in `update` and the renderer both derive block heights from
/// this list, so they can never disagree.
#[must_use]
pub fn thread_block_lines(thread: &LocalThread, text_width: usize) -> Vec<ThreadBlockLine> {
    use crate::reconcile::CommentPhase;

    let mut lines = Vec::new();
    for _ in 0..BLOCK_PADDING {
        lines.push(ThreadBlockLine::Padding);
    }

    let (start, end) = thread.line_span();
    let location = if end == start {
        format!("{}:{start}", thread.anchor.file_path)
    } else {
        format!("{}:{start}-{end}", thread.anchor.file_path)
    };
    let mut left = format!("● {}", thread.status.label());
    if thread.outdated {
        left.push_str("  [outdated]");
    }
    if matches!(thread.state, crate::reconcile::ThreadState::Optimistic) {
        left.push_str("  (sending…)");
    }
    lines.push(ThreadBlockLine::Header { left, right: location });

    for comment in &thread.comments {
        let note = match comment.phase {
            CommentPhase::Pending => " (pending)",
            CommentPhase::Failed => " (failed, edit to resend)",
            CommentPhase::Confirmed => "",
        };
        lines.push(ThreadBlockLine::Author {
            name: comment.author.clone(),
            note,
        });
        let wrapped = wrap_text(&comment.body, text_width.max(1));
        if wrapped.is_empty() {
            lines.push(ThreadBlockLine::Body(String::new()));
        } else {
            for line in wrapped {
                lines.push(ThreadBlockLine::Body(line));
            }
        }
    }

    for _ in 0..BLOCK_PADDING {
        lines.push(ThreadBlockLine::Padding);
    }
    lines
}

/// Total rows of a thread's comment block.
#[must_use]
pub fn thread_block_rows(thread: &LocalThread, text_width: usize) -> usize {
    thread_block_lines(thread, text_width).len()
}

/// Build the row stream: each hunk header, each diff line, and after a
/// thread's anchor line its comment block rows.
#[must_use]
pub fn build_display_rows(
    hunks: &[DiffHunk],
    threads: &[&LocalThread],
    block_text_width: usize,
) -> Vec<DisplayRow> {
    let mut rows = Vec::new();
    let mut flat_idx = 0usize;
    let mut emitted: Vec<&str> = Vec::new();

    for (hunk_idx, hunk) in hunks.iter().enumerate() {
        for (line_idx, line) in hunk.lines.iter().enumerate() {
            if line.kind == DiffChangeType::Control {
                rows.push(DisplayRow::HunkHeader { hunk_idx });
            } else {
                rows.push(DisplayRow::Line {
                    hunk_idx,
                    line_idx,
                    flat_idx,
                });
            }
            flat_idx += 1;

            for thread in threads {
                if thread_anchored_at(thread, line) && !emitted.contains(&thread.id.as_str()) {
                    emitted.push(thread.id.as_str());
                    let total = thread_block_rows(thread, block_text_width);
                    for row in 0..total {
                        rows.push(DisplayRow::ThreadRow {
                            thread_id: thread.id.clone(),
                            row,
                            total_rows: total,
                        });
                    }
                }
            }
        }
    }

    // Threads whose anchor no longer maps into the diff (outdated) trail at
    // the end so they stay reachable.
    for thread in threads {
        if !emitted.contains(&thread.id.as_str()) {
            let total = thread_block_rows(thread, block_text_width);
            for row in 0..total {
                rows.push(DisplayRow::ThreadRow {
                    thread_id: thread.id.clone(),
                    row,
                    total_rows: total,
                });
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ThreadRecord;
    use crate::diff::{DiffSide, ParsedDiff};

    fn sample_entry_hunks() -> Vec<DiffHunk> {
        let diff = "--- a/f\n+++ b/f\n@@ -1,3 +1,4 @@\n ctx\n-old\n+new\n+more\n ctx2\n";
        ParsedDiff::parse(diff).hunks
    }

    fn thread_at(file: &str, line: u32) -> ThreadRecord {
        ThreadRecord {
            id: format!("T{line}"),
            anchor: crate::api::ThreadAnchor {
                file_path: file.to_string(),
                side: DiffSide::Modified,
                start_line: line,
                end_line: None,
            },
            status: crate::api::ThreadStatus::Active,
            outdated: false,
            comments: vec![crate::api::Comment {
                id: "C1".to_string(),
                author: "alice".to_string(),
                body: "short".to_string(),
                created_at: String::new(),
            }],
        }
    }

    #[test]
    fn display_rows_interleave_thread_blocks() {
        let hunks = sample_entry_hunks();
        let mut set = ThreadSet::new();
        set.load(vec![thread_at("f", 2)]);
        let threads: Vec<&LocalThread> = set.iter().collect();

        let rows = build_display_rows(&hunks, &threads, 60);

        // Control header first.
        assert_eq!(rows[0], DisplayRow::HunkHeader { hunk_idx: 0 });
        // The thread block follows the "+new" line (new_line == 2).
        let new_row = rows
            .iter()
            .position(|r| matches!(r, DisplayRow::Line { line_idx: 2, .. }))
            .unwrap();
        assert!(matches!(
            rows[new_row + 1],
            DisplayRow::ThreadRow { row: 0, .. }
        ));
        // header + author + body + 2 padding
        let block_rows = rows
            .iter()
            .filter(|r| matches!(r, DisplayRow::ThreadRow { .. }))
            .count();
        assert_eq!(block_rows, 5);
    }

    #[test]
    fn unanchored_threads_trail_at_end() {
        let hunks = sample_entry_hunks();
        let mut set = ThreadSet::new();
        set.load(vec![thread_at("f", 99)]);
        let threads: Vec<&LocalThread> = set.iter().collect();

        let rows = build_display_rows(&hunks, &threads, 60);
        assert!(matches!(
            rows.last().unwrap(),
            DisplayRow::ThreadRow { .. }
        ));
    }

    #[test]
    fn filtered_prs_by_state_and_search() {
        let mut model = Model::new(100, 40, UiConfig::default());
        model.prs = vec![
            PullRequestSummary {
                number: 1,
                title: "Add parser".to_string(),
                author: "alice".to_string(),
                state: "open".to_string(),
                thread_count: 0,
                open_thread_count: 0,
            },
            PullRequestSummary {
                number: 2,
                title: "Fix lexer".to_string(),
                author: "bob".to_string(),
                state: "merged".to_string(),
                thread_count: 0,
                open_thread_count: 0,
            },
        ];

        model.filter = PrFilter::Open;
        assert_eq!(model.filtered_prs().len(), 1);

        model.filter = PrFilter::All;
        model.search_input = "lexer".to_string();
        let filtered = model.filtered_prs();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].number, 2);
    }

    #[test]
    fn editor_body_joins_and_trims() {
        let request = CommentRequest {
            pr: 1,
            anchor: crate::api::ThreadAnchor {
                file_path: "f".to_string(),
                side: DiffSide::Modified,
                start_line: 1,
                end_line: None,
            },
            target: CommentTarget::NewThread,
            existing: Vec::new(),
        };
        let mut editor = InlineEditor::new(request);
        for c in "hi".chars() {
            editor.insert_char(c);
        }
        editor.newline();
        for c in "there".chars() {
            editor.insert_char(c);
        }
        assert_eq!(editor.body(), "hi\nthere");
    }
}
