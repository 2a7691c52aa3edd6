//! Command palette modal rendering.
//!
//! A dimmed overlay with a borderless centered panel: title row, search
//! field, selectable list. Three modes: commands, themes, and the
//! thread-status picker (legal next statuses only).

use opentui::{OptimizedBuffer, Style};

use crate::api::ThreadStatus;
use crate::command::filtered_commands;
use crate::model::{Focus, Model, PaletteMode};
use crate::theme::built_in_theme_names;
use crate::view::components::{dim_rect, draw_text_truncated, Rect};

/// Left padding inside the modal.
const OUTER_PAD: u32 = 1;
/// Padding inside the highlight area before the bullet.
const INNER_PAD: u32 = 1;
/// Space between bullet and text.
const BULLET_GAP: u32 = 1;
/// Trailing padding inside the highlight area.
const TRAIL_PAD: u32 = 3;

const TEXT_INDENT: u32 = OUTER_PAD + INNER_PAD + 1 + BULLET_GAP;

struct Item {
    left: String,
    right: Option<String>,
    bullet: bool,
}

pub fn view(model: &Model, buffer: &mut OptimizedBuffer) {
    if model.focus != Focus::CommandPalette {
        return;
    }

    let screen = Rect::from_size(model.width, model.height);
    dim_rect(buffer, screen, 0.35);

    let (title, items) = palette_items(model);
    render_list(model, buffer, screen, title, &items);
}

fn palette_items(model: &Model) -> (&'static str, Vec<Item>) {
    match &model.palette_mode {
        PaletteMode::Commands => (
            "Commands",
            filtered_commands(&model.palette_input)
                .into_iter()
                .map(|cmd| Item {
                    left: cmd.name.to_string(),
                    right: Some(cmd.description.to_string()),
                    bullet: false,
                })
                .collect(),
        ),
        PaletteMode::Themes => (
            "Themes",
            built_in_theme_names()
                .into_iter()
                .map(|name| Item {
                    left: name.to_string(),
                    right: None,
                    bullet: name == model.theme.name,
                })
                .collect(),
        ),
        PaletteMode::ThreadStatus { thread_id } => (
            "Thread status",
            model
                .threads
                .get(thread_id)
                .map(|t| t.status.legal_transitions())
                .unwrap_or_default()
                .into_iter()
                .map(|status: ThreadStatus| Item {
                    left: status.label().to_string(),
                    right: None,
                    bullet: false,
                })
                .collect(),
        ),
    }
}

fn render_list(
    model: &Model,
    buffer: &mut OptimizedBuffer,
    screen: Rect,
    title: &str,
    items: &[Item],
) {
    let modal_width = 60u32.min(screen.width.saturating_sub(4));
    let list_height = items.len() as u32;
    // 1 blank + title + 1 blank + search + 2 blank + rows + 2 blank
    let modal_height = (1 + 1 + 1 + 1 + 2 + list_height + 2).min(screen.height.saturating_sub(2));
    let modal_x = (screen.width.saturating_sub(modal_width)) / 2;
    let modal_y = screen.height / 4;

    buffer.fill_rect(modal_x, modal_y, modal_width, modal_height, model.theme.panel_bg);

    let text_x = modal_x + TEXT_INDENT;
    let text_width = modal_width.saturating_sub(TEXT_INDENT + OUTER_PAD);
    let esc_right = modal_x + modal_width - OUTER_PAD - TRAIL_PAD;

    let mut y = modal_y + 1;

    // Title row: bold left, "esc" dim right.
    buffer.draw_text(
        text_x,
        y,
        title,
        model.theme.style_foreground_on(model.theme.panel_bg).with_bold(),
    );
    let esc_x = esc_right.saturating_sub(3);
    buffer.draw_text(esc_x, y, "esc", model.theme.style_muted_on(model.theme.panel_bg));
    y += 2;

    // Search field.
    if model.palette_input.is_empty() {
        buffer.draw_text(
            text_x,
            y,
            "Search",
            model.theme.style_muted_on(model.theme.panel_bg),
        );
    } else {
        let input = format!("{}\u{2588}", model.palette_input);
        draw_text_truncated(
            buffer,
            text_x,
            y,
            &input,
            text_width,
            model.theme.style_foreground_on(model.theme.panel_bg),
        );
    }
    y += 3;

    let list_max = modal_y + modal_height - 2;
    for (idx, item) in items.iter().enumerate() {
        if y >= list_max {
            break;
        }
        render_item_row(buffer, modal_x, y, modal_width, item, idx == model.palette_selection, model);
        y += 1;
    }
}

fn render_item_row(
    buffer: &mut OptimizedBuffer,
    modal_x: u32,
    y: u32,
    modal_width: u32,
    item: &Item,
    selected: bool,
    model: &Model,
) {
    let highlight_x = modal_x + OUTER_PAD;
    let highlight_width = modal_width - (OUTER_PAD * 2);

    let (bg, fg) = if selected {
        (model.theme.selection_bg, model.theme.selection_fg)
    } else {
        (model.theme.panel_bg, model.theme.foreground)
    };
    buffer.fill_rect(highlight_x, y, highlight_width, 1, bg);

    let bullet_x = highlight_x + INNER_PAD;
    let bullet = if item.bullet { "●" } else { " " };
    buffer.draw_text(bullet_x, y, bullet, Style::fg(fg).with_bg(bg));

    let name_x = bullet_x + 1 + BULLET_GAP;
    let content_end = highlight_x + highlight_width - TRAIL_PAD;
    let content_width = content_end.saturating_sub(name_x);

    if let Some(right) = &item.right {
        let right_len = right.chars().count() as u32;
        if right_len < content_width {
            let right_x = content_end - right_len;
            draw_text_truncated(
                buffer,
                right_x,
                y,
                right,
                right_len,
                model.theme.style_muted_on(bg),
            );
            let name_max = content_width.saturating_sub(right_len + 1);
            draw_text_truncated(buffer, name_x, y, &item.left, name_max, Style::fg(fg).with_bg(bg));
            return;
        }
    }
    draw_text_truncated(buffer, name_x, y, &item.left, content_width, Style::fg(fg).with_bg(bg));
}
