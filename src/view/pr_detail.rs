//! Pull request detail screen: header, file sidebar, diff pane.

use opentui::{OptimizedBuffer, Style};

use super::components::{draw_text_truncated, truncate_path, Rect};
use super::diff_pane;
use crate::model::{Focus, Model, SIDEBAR_WIDTH};

/// Render the PR detail screen.
pub fn view(model: &Model, buffer: &mut OptimizedBuffer) {
    let theme = &model.theme;
    let area = Rect::from_size(model.width, model.height);

    // Header row.
    buffer.fill_rect(area.x, area.y, area.width, 1, theme.background);
    let header = model.current_pr.as_ref().map_or_else(
        || "Loading…".to_string(),
        |pr| format!("#{} {} [{}]", pr.number, pr.title, pr.state),
    );
    draw_text_truncated(
        buffer,
        area.x + 2,
        area.y,
        &header,
        area.width.saturating_sub(4),
        Style::fg(theme.foreground).with_bold(),
    );

    let body = Rect::new(
        area.x,
        area.y + 1,
        area.width,
        area.height.saturating_sub(2),
    );

    if model.sidebar_visible {
        let (sidebar, diff) = body.split_left(SIDEBAR_WIDTH.min(body.width / 2));
        draw_file_sidebar(model, buffer, sidebar);
        diff_pane::render(model, buffer, diff);
    } else {
        diff_pane::render(model, buffer, body);
    }

    draw_help_bar(model, buffer, area);
}

fn draw_file_sidebar(model: &Model, buffer: &mut OptimizedBuffer, area: Rect) {
    let theme = &model.theme;
    buffer.fill_rect(area.x, area.y, area.width, area.height, theme.panel_bg);

    let mut y = area.y;
    let text_x = area.x + 1;
    let text_width = area.width.saturating_sub(2);

    if let Some(pr) = &model.current_pr {
        y += 1;
        draw_text_truncated(
            buffer,
            text_x,
            y,
            &pr.author,
            text_width,
            Style::fg(theme.muted).with_bg(theme.panel_bg),
        );
        y += 1;
        let refs = format!("{} ← {}", pr.base_ref, pr.head_ref);
        draw_text_truncated(
            buffer,
            text_x,
            y,
            &refs,
            text_width,
            Style::fg(theme.muted).with_bg(theme.panel_bg),
        );
        y += 2;
    }

    if model.files.is_empty() {
        buffer.draw_text(
            text_x,
            y,
            "No files",
            Style::fg(theme.muted).with_bg(theme.panel_bg),
        );
        return;
    }

    for (i, file) in model.files.iter().enumerate() {
        if y >= area.y + area.height.saturating_sub(1) {
            break;
        }

        let selected = i == model.file_index;
        let (bg, style) = if selected {
            buffer.fill_rect(area.x, y, area.width, 1, theme.selection_bg);
            (
                theme.selection_bg,
                Style::fg(theme.selection_fg).with_bg(theme.selection_bg),
            )
        } else {
            (theme.panel_bg, Style::fg(theme.foreground).with_bg(theme.panel_bg))
        };

        let marker = if selected { "▸" } else { " " };
        buffer.draw_text(area.x, y, marker, style);

        // Change kind letter (A/M/D/R).
        let kind_letter = file
            .change_kind
            .chars()
            .next()
            .map_or('M', |c| c.to_ascii_uppercase());
        let kind_color = match kind_letter {
            'A' => theme.success,
            'D' => theme.error,
            _ => theme.warning,
        };
        buffer.draw_text(
            text_x,
            y,
            &kind_letter.to_string(),
            Style::fg(kind_color).with_bg(bg),
        );

        let entry = model.file_cache.get(&file.path);
        let viewed = entry.is_some_and(|e| e.viewed);
        let open_threads = model
            .threads
            .threads_for_file(&file.path)
            .iter()
            .filter(|t| !t.status.is_resolved())
            .count();

        // Right-side indicator: open thread count, or viewed checkmark.
        let indicator = if open_threads > 0 {
            open_threads.to_string()
        } else if viewed {
            "✓".to_string()
        } else {
            " ".to_string()
        };
        let indicator_color = if open_threads > 0 {
            theme.warning
        } else {
            theme.success
        };

        let name_x = text_x + 2;
        let name_width = area.width.saturating_sub(6);
        let path = truncate_path(&file.path, name_width as usize);
        draw_text_truncated(buffer, name_x, y, &path, name_width, style);

        buffer.draw_text(
            area.x + area.width.saturating_sub(2),
            y,
            &indicator,
            Style::fg(indicator_color).with_bg(bg),
        );

        y += 1;
    }
}

fn draw_help_bar(model: &Model, buffer: &mut OptimizedBuffer, area: Rect) {
    let theme = &model.theme;
    let y = area.y + area.height - 1;

    buffer.fill_rect(area.x, y, area.width, 1, theme.background);

    if let Some(msg) = &model.flash_message {
        draw_text_truncated(
            buffer,
            area.x + 2,
            y,
            msg,
            area.width.saturating_sub(4),
            Style::fg(theme.warning),
        );
        return;
    }

    let help = match model.focus {
        Focus::FileSidebar => "j/k files  Enter diff  m viewed  s sidebar  h back  q quit",
        Focus::DiffPane if model.visual_mode => "j/k extend  a comment  Esc cancel",
        Focus::DiffPane => {
            "j/k move  n/p thread  a comment  r reply  e edit  t status  m viewed  V select  Esc back"
        }
        _ => "Esc back  q quit",
    };
    buffer.draw_text(area.x + 2, y, help, Style::fg(theme.muted));
}
