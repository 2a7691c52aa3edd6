//! Diff pane rendering: unified diff lines interleaved with thread blocks.

use opentui::{OptimizedBuffer, Rgba, Style};

use super::components::{draw_text_truncated, Rect};
use crate::diff::{DiffChangeType, DiffLine};
use crate::layout::{COMMENT_H_MARGIN, COMMENT_H_PAD, GUTTER_WIDTH, LINE_NUM_WIDTH};
use crate::model::{
    comment_block_text_width, thread_block_lines, DisplayRow, FileCacheEntry, Focus, Model,
    ThreadBlockLine,
};
use crate::syntax::HighlightSpan;
use crate::text::truncate_chars;
use crate::theme::{lerp, Theme};

/// Render the selected file's diff stream into `area`.
pub fn render(model: &Model, buffer: &mut OptimizedBuffer, area: Rect) {
    let theme = &model.theme;

    let Some(entry) = model.selected_entry() else {
        buffer.fill_rect(area.x, area.y, area.width, area.height, theme.background);
        buffer.draw_text(
            area.x + 2,
            area.y + 1,
            "No content available",
            Style::fg(theme.muted),
        );
        return;
    };

    // File header row.
    let file_header_y = area.y;
    buffer.fill_rect(area.x, file_header_y, area.width, 1, theme.panel_bg);
    if let Some(path) = model.selected_file() {
        let (added, removed) = crate::diff::change_counts(&entry.hunks);
        let counts = format!("+{added} / -{removed}");
        draw_text_truncated(
            buffer,
            area.x + 2,
            file_header_y,
            path,
            area.width.saturating_sub(counts.len() as u32 + 6),
            Style::fg(theme.foreground).with_bg(theme.panel_bg).with_bold(),
        );
        buffer.draw_text(
            area.x + area.width.saturating_sub(counts.len() as u32 + 1),
            file_header_y,
            &counts,
            Style::fg(theme.muted).with_bg(theme.panel_bg),
        );
    }

    let stream = Rect::new(
        area.x,
        area.y + 1,
        area.width,
        area.height.saturating_sub(1),
    );

    let rows = model.display_rows();
    let cursor_active = model.focus == Focus::DiffPane;
    let (sel_lo, sel_hi) = if model.visual_mode {
        (
            model.visual_anchor.min(model.diff_cursor),
            model.visual_anchor.max(model.diff_cursor),
        )
    } else {
        (usize::MAX, 0)
    };

    let mut screen_row = 0u32;
    for (row_idx, row) in rows.iter().enumerate().skip(model.diff_scroll) {
        if screen_row >= stream.height {
            break;
        }
        let y = stream.y + screen_row;
        let is_cursor = cursor_active && row_idx == model.diff_cursor;
        let is_selected = model.visual_mode && row_idx >= sel_lo && row_idx <= sel_hi;

        match row {
            DisplayRow::HunkHeader { .. } => {
                render_hunk_separator(buffer, stream, y, theme);
            }
            DisplayRow::Line { hunk_idx, line_idx, flat_idx } => {
                let line = &entry.hunks[*hunk_idx].lines[*line_idx];
                render_diff_line(
                    buffer,
                    stream,
                    y,
                    line,
                    entry,
                    entry.highlighted.get(*flat_idx),
                    theme,
                    is_cursor,
                    is_selected,
                );
            }
            DisplayRow::ThreadRow { thread_id, row, .. } => {
                if let Some(thread) = model.threads.get(thread_id) {
                    render_thread_row(
                        buffer,
                        stream,
                        y,
                        &thread_block_lines(thread, comment_block_text_width(stream.width)),
                        *row,
                        theme,
                        is_cursor,
                    );
                }
            }
        }
        screen_row += 1;
    }

    // Clear whatever the stream did not cover.
    if screen_row < stream.height {
        buffer.fill_rect(
            stream.x,
            stream.y + screen_row,
            stream.width,
            stream.height - screen_row,
            theme.background,
        );
    }
}

fn render_hunk_separator(buffer: &mut OptimizedBuffer, area: Rect, y: u32, theme: &Theme) {
    let bg = theme.diff.context_bg;
    buffer.fill_rect(area.x, y, area.width, 1, bg);
    let sep = "···";
    let sep_x = area.x + area.width.saturating_sub(sep.len() as u32) / 2;
    buffer.draw_text(sep_x, y, sep, Style::fg(theme.muted).with_bg(bg));
}

#[allow(clippy::too_many_arguments)]
fn render_diff_line(
    buffer: &mut OptimizedBuffer,
    area: Rect,
    y: u32,
    line: &DiffLine,
    entry: &FileCacheEntry,
    highlights: Option<&Vec<HighlightSpan>>,
    theme: &Theme,
    is_cursor: bool,
    is_selected: bool,
) {
    let dt = &theme.diff;
    let (mut bg, default_fg, sign, sign_color) = match line.kind {
        DiffChangeType::Add => (dt.added_bg, dt.added, "+", dt.highlight_added),
        DiffChangeType::Delete => (dt.removed_bg, dt.removed, "-", dt.highlight_removed),
        _ => (dt.context_bg, dt.context, " ", dt.context),
    };
    if is_selected {
        bg = lerp(bg, theme.primary, 0.08);
    }
    if is_cursor {
        bg = lerp(bg, theme.primary, 0.15);
    }

    buffer.fill_rect(area.x, y, area.width, 1, bg);

    // Gutter: commentable-range marker.
    if commentable(line, entry) {
        buffer.draw_text(area.x, y, "┃", Style::fg(dt.commentable).with_bg(bg));
    }

    // Line numbers: old then new, five columns each.
    let num_x = area.x + GUTTER_WIDTH;
    let old_ln = line
        .old_line
        .map_or_else(|| "     ".to_string(), |n| format!("{n:>5}"));
    let new_ln = line
        .new_line
        .map_or_else(|| "     ".to_string(), |n| format!("{n:>5}"));
    buffer.draw_text(num_x, y, &old_ln, dt.style_line_number(bg));
    buffer.draw_text(num_x + 6, y, &new_ln, dt.style_line_number(bg));

    // Sign and content.
    let content_x = num_x + LINE_NUM_WIDTH;
    let content_width = area.width.saturating_sub(GUTTER_WIDTH + LINE_NUM_WIDTH + 1);
    buffer.draw_text(content_x, y, sign, Style::fg(sign_color).with_bg(bg));
    draw_highlighted_text(
        buffer,
        content_x + 2,
        y,
        content_width,
        highlights,
        &line.content,
        default_fg,
        bg,
    );
}

/// Whether the commenting-range calculator allows a comment on this line.
fn commentable(line: &DiffLine, entry: &FileCacheEntry) -> bool {
    match line.kind {
        DiffChangeType::Delete => line.old_line.is_some_and(|n| {
            entry
                .base_ranges
                .iter()
                .any(|r| r.contains(n.saturating_sub(1)))
        }),
        DiffChangeType::Control => false,
        _ => line.new_line.is_some_and(|n| {
            entry
                .modified_ranges
                .iter()
                .any(|r| r.contains(n.saturating_sub(1)))
        }),
    }
}

fn render_thread_row(
    buffer: &mut OptimizedBuffer,
    area: Rect,
    y: u32,
    lines: &[ThreadBlockLine],
    row: usize,
    theme: &Theme,
    is_cursor: bool,
) {
    let mut block_bg = theme.panel_bg;
    if is_cursor {
        block_bg = lerp(block_bg, theme.primary, 0.15);
    }

    buffer.fill_rect(area.x, y, area.width, 1, theme.background);
    let block_x = area.x + COMMENT_H_MARGIN;
    let block_width = area.width.saturating_sub(COMMENT_H_MARGIN * 2);
    buffer.fill_rect(block_x, y, block_width, 1, block_bg);

    // Left double-bar marks the block edge.
    let bar_style = Style::fg(theme.background).with_bg(block_bg);
    buffer.draw_text(block_x, y, "▌", bar_style);
    buffer.draw_text(block_x + 1, y, "▌", bar_style);

    let Some(line) = lines.get(row) else {
        return;
    };

    let text_x = block_x + 2 + COMMENT_H_PAD;
    let text_width = block_width.saturating_sub(4 + COMMENT_H_PAD * 2);

    match line {
        ThreadBlockLine::Padding => {}
        ThreadBlockLine::Header { left, right } => {
            let right_len = right.chars().count() as u32;
            draw_text_truncated(
                buffer,
                text_x,
                y,
                left,
                text_width.saturating_sub(right_len + 1),
                Style::fg(theme.muted).with_bg(block_bg),
            );
            if right_len < text_width {
                buffer.draw_text(
                    text_x + text_width - right_len,
                    y,
                    right,
                    Style::fg(theme.muted).with_bg(block_bg),
                );
            }
        }
        ThreadBlockLine::Author { name, note } => {
            let author = format!("@{name}");
            draw_text_truncated(
                buffer,
                text_x,
                y,
                &author,
                text_width,
                Style::fg(theme.primary).with_bg(block_bg).with_bold(),
            );
            let author_len = author.chars().count() as u32;
            if !note.is_empty() && author_len + 1 < text_width {
                let note_color = if note.contains("failed") {
                    theme.error
                } else {
                    theme.warning
                };
                draw_text_truncated(
                    buffer,
                    text_x + author_len + 1,
                    y,
                    note,
                    text_width.saturating_sub(author_len + 1),
                    Style::fg(note_color).with_bg(block_bg),
                );
            }
        }
        ThreadBlockLine::Body(text) => {
            draw_text_truncated(
                buffer,
                text_x,
                y,
                text,
                text_width,
                Style::fg(theme.foreground).with_bg(block_bg),
            );
        }
    }
}

/// Draw a line's content through its highlight spans, falling back to a
/// plain foreground color.
#[allow(clippy::too_many_arguments)]
fn draw_highlighted_text(
    buffer: &mut OptimizedBuffer,
    x: u32,
    y: u32,
    max_width: u32,
    highlights: Option<&Vec<HighlightSpan>>,
    fallback: &str,
    fallback_fg: Rgba,
    bg: Rgba,
) {
    let max_chars = max_width as usize;

    match highlights {
        Some(spans) if !spans.is_empty() => {
            let mut col = x;
            let mut drawn = 0usize;
            for span in spans {
                if drawn >= max_chars {
                    break;
                }
                let remaining = max_chars - drawn;
                let text = truncate_chars(&span.text, remaining);
                if text.is_empty() {
                    continue;
                }
                let count = text.chars().count();
                buffer.draw_text(col, y, text, Style::fg(span.fg).with_bg(bg));
                col += count as u32;
                drawn += count;
            }
        }
        _ => {
            let text = truncate_chars(fallback, max_chars);
            buffer.draw_text(x, y, text, Style::fg(fallback_fg).with_bg(bg));
        }
    }
}
