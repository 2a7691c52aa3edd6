//! Inline multi-line comment editor overlay.
//!
//! Modal overlay with a dimmed background, a centered panel showing the
//! target location, existing comments for context, the text area, and a
//! status bar.

use opentui::{OptimizedBuffer, Style};

use crate::model::{CommentTarget, Focus, InlineEditor, Model};
use crate::theme::Theme;
use crate::view::components::{dim_rect, draw_text_truncated, Rect};

/// Minimum editor panel height (title + padding + 3 text lines + status).
const MIN_HEIGHT: u32 = 8;
/// Horizontal padding inside the panel.
const H_PAD: u32 = 2;

pub fn view(model: &Model, buffer: &mut OptimizedBuffer) {
    if model.focus != Focus::Commenting {
        return;
    }
    let Some(editor) = &model.inline_editor else {
        return;
    };

    let screen = Rect::from_size(model.width, model.height);
    dim_rect(buffer, screen, 0.35);

    let panel = compute_panel(screen, editor);
    buffer.fill_rect(panel.x, panel.y, panel.width, panel.height, model.theme.panel_bg);

    let content_x = panel.x + H_PAD;
    let content_width = panel.width.saturating_sub(H_PAD * 2);

    let mut y = panel.y;
    y = render_title(buffer, &model.theme, editor, &panel, content_x, content_width, y);
    y += 1;
    y = render_existing(buffer, &model.theme, editor, &panel, content_x, content_width, y);

    let status_y = panel.y + panel.height - 2;
    render_text_area(buffer, &model.theme, editor, content_x, content_width, y, status_y);
    render_status_bar(buffer, &model.theme, &panel, content_x, status_y);
}

fn compute_panel(screen: Rect, editor: &InlineEditor) -> Rect {
    let panel_width = (screen.width * 7 / 10)
        .clamp(40, 80)
        .min(screen.width.saturating_sub(4));
    let panel_x = (screen.width.saturating_sub(panel_width)) / 2;

    let existing_count = editor.request.existing.len() as u32;
    let context_rows = if existing_count > 0 {
        existing_count.min(6) + 1
    } else {
        0
    };
    let text_area_height = crate::layout::COMMENT_EDITOR_ROWS as u32;
    let ideal_height = 1 + 1 + context_rows + text_area_height + 1 + 1 + 1;
    let panel_height = ideal_height
        .clamp(MIN_HEIGHT, screen.height.saturating_sub(4))
        .min(screen.height);
    let panel_y = (screen.height.saturating_sub(panel_height)) / 3;

    Rect::new(panel_x, panel_y, panel_width, panel_height)
}

fn render_title(
    buffer: &mut OptimizedBuffer,
    theme: &Theme,
    editor: &InlineEditor,
    panel: &Rect,
    content_x: u32,
    content_width: u32,
    y: u32,
) -> u32 {
    let anchor = &editor.request.anchor;
    let (start, end) = anchor.line_span();
    let location = if start == end {
        format!("{}:{start}", anchor.file_path)
    } else {
        format!("{}:{start}-{end}", anchor.file_path)
    };
    let title = match &editor.request.target {
        CommentTarget::NewThread => format!("New comment on {location}"),
        CommentTarget::Reply { .. } => format!("Reply on {location}"),
        CommentTarget::Edit { .. } => format!("Edit comment on {location}"),
    };
    draw_text_truncated(
        buffer,
        content_x,
        y,
        &title,
        content_width.saturating_sub(4),
        theme.style_foreground().with_bg(theme.panel_bg).with_bold(),
    );
    let esc_x = panel.x + panel.width - H_PAD - 3;
    buffer.draw_text(esc_x, y, "esc", theme.style_muted_on(theme.panel_bg));
    y + 1
}

fn render_existing(
    buffer: &mut OptimizedBuffer,
    theme: &Theme,
    editor: &InlineEditor,
    panel: &Rect,
    content_x: u32,
    content_width: u32,
    mut y: u32,
) -> u32 {
    if editor.request.existing.is_empty() {
        return y;
    }
    let count = editor.request.existing.len();
    let skip = count.saturating_sub(6);
    for (author, body) in editor.request.existing.iter().skip(skip) {
        if y >= panel.y + panel.height - 3 {
            break;
        }
        let text = format!("{author}: {body}");
        draw_text_truncated(
            buffer,
            content_x,
            y,
            &text,
            content_width,
            theme.style_muted_on(theme.panel_bg),
        );
        y += 1;
    }
    y + 1
}

fn render_text_area(
    buffer: &mut OptimizedBuffer,
    theme: &Theme,
    editor: &InlineEditor,
    content_x: u32,
    content_width: u32,
    text_area_top: u32,
    status_y: u32,
) {
    let available_rows = status_y.saturating_sub(text_area_top + 1) as usize;
    let bar_style = theme.style_primary_on(theme.panel_bg);
    let text_style = theme.style_foreground_on(theme.panel_bg);
    let cursor_style = Style::fg(theme.panel_bg).with_bg(theme.foreground);

    for row in 0..available_rows {
        let line_y = text_area_top + row as u32;
        if line_y >= status_y {
            break;
        }
        buffer.draw_text(content_x, line_y, "\u{2503}", bar_style);
    }

    let text_x = content_x + 2;
    let text_width = content_width.saturating_sub(2);

    for (view_row, line_idx) in (editor.scroll..editor.lines.len())
        .enumerate()
        .take(available_rows)
    {
        let line_y = text_area_top + view_row as u32;
        if line_y >= status_y {
            break;
        }
        let line = &editor.lines[line_idx];
        if line_idx == editor.cursor_row {
            render_line_with_cursor(
                buffer,
                text_x,
                line_y,
                line,
                editor.cursor_col,
                text_width,
                text_style,
                cursor_style,
            );
        } else {
            draw_text_truncated(buffer, text_x, line_y, line, text_width, text_style);
        }
    }
}

fn render_status_bar(
    buffer: &mut OptimizedBuffer,
    theme: &Theme,
    panel: &Rect,
    content_x: u32,
    status_y: u32,
) {
    buffer.fill_rect(panel.x, status_y, panel.width, 1, theme.panel_bg);
    let status_text = "Ctrl+S submit    Esc cancel";
    let status_x = panel.x + panel.width - H_PAD - status_text.len() as u32;
    buffer.draw_text(
        status_x.max(content_x),
        status_y,
        status_text,
        theme.style_muted_on(theme.panel_bg),
    );
}

/// Render a line of text with the cursor shown as an inverted-color block.
#[allow(clippy::too_many_arguments)]
fn render_line_with_cursor(
    buffer: &mut OptimizedBuffer,
    x: u32,
    y: u32,
    line: &str,
    cursor_col: usize,
    max_width: u32,
    text_style: Style,
    cursor_style: Style,
) {
    let chars: Vec<char> = line.chars().collect();
    let mut col = 0u32;

    for (i, &ch) in chars.iter().enumerate() {
        if col >= max_width {
            break;
        }
        let style = if i == cursor_col { cursor_style } else { text_style };
        buffer.draw_text(x + col, y, &ch.to_string(), style);
        col += 1;
    }

    if cursor_col >= chars.len() && col < max_width {
        buffer.draw_text(x + col, y, " ", cursor_style);
    }
}
