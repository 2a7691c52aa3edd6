//! Pull request list screen rendering.

use opentui::{OptimizedBuffer, Style};

use super::components::{draw_box, draw_text_truncated, Rect};
use crate::model::{Model, PrFilter};

/// Render the PR list screen.
pub fn view(model: &Model, buffer: &mut OptimizedBuffer) {
    let theme = &model.theme;
    let area = Rect::from_size(model.width, model.height);

    let title = format!("Pull Requests ({})", model.provider_name);
    draw_box(buffer, area, theme.border, Some(&title), theme.foreground);

    let inner = area.inner();
    let mut y = inner.y;

    // Search / filter row.
    let filter_label = match model.filter {
        PrFilter::All => "all",
        PrFilter::Open => "open",
        PrFilter::Closed => "closed",
    };
    if model.search_active || !model.search_input.is_empty() {
        let search = format!("/{}\u{2588}", model.search_input);
        draw_text_truncated(
            buffer,
            inner.x + 1,
            y,
            &search,
            inner.width.saturating_sub(12),
            Style::fg(theme.foreground),
        );
    } else {
        buffer.draw_text(
            inner.x + 1,
            y,
            "/ search",
            Style::fg(theme.muted),
        );
    }
    let filter_text = format!("[{filter_label}]");
    buffer.draw_text(
        inner.x + inner.width.saturating_sub(filter_text.len() as u32 + 1),
        y,
        &filter_text,
        Style::fg(theme.muted),
    );
    y += 2;

    let prs = model.filtered_prs();
    if prs.is_empty() {
        buffer.draw_text(
            inner.x + 2,
            y,
            "No pull requests found",
            Style::fg(theme.muted),
        );
        draw_help_bar(model, buffer, area);
        return;
    }

    let visible = model.list_visible_height();
    for (i, pr) in prs
        .iter()
        .enumerate()
        .skip(model.list_scroll)
        .take(visible)
    {
        if y >= inner.y + inner.height.saturating_sub(1) {
            break;
        }
        draw_pr_row(model, buffer, inner, y, pr, i == model.list_index);
        y += 1;
    }

    draw_help_bar(model, buffer, area);
}

fn draw_pr_row(
    model: &Model,
    buffer: &mut OptimizedBuffer,
    area: Rect,
    y: u32,
    pr: &crate::api::PullRequestSummary,
    selected: bool,
) {
    let theme = &model.theme;

    let (prefix, style) = if selected {
        buffer.fill_rect(area.x, y, area.width, 1, theme.selection_bg);
        (
            "▸ ",
            Style::fg(theme.selection_fg).with_bg(theme.selection_bg),
        )
    } else {
        ("  ", Style::fg(theme.foreground))
    };

    let mut x = area.x;
    buffer.draw_text(x, y, prefix, style);
    x += 2;

    // PR number
    let number = format!("#{}", pr.number);
    let number_style = if selected {
        Style::fg(theme.primary).with_bg(theme.selection_bg)
    } else {
        Style::fg(theme.primary)
    };
    buffer.draw_text(x, y, &number, number_style);
    x += 7;

    // State badge for anything not plainly open
    if pr.state != "open" {
        let badge = format!("[{}]", pr.state);
        let badge_color = match pr.state.as_str() {
            "merged" => theme.success,
            "draft" => theme.warning,
            "closed" => theme.error,
            _ => theme.muted,
        };
        buffer.draw_text(x, y, &badge, Style::fg(badge_color));
        x += badge.len() as u32 + 1;
    }

    // Title
    let remaining = area.width.saturating_sub(x - area.x);
    let title_width = remaining.saturating_sub(20).max(10);
    draw_text_truncated(buffer, x, y, &pr.title, title_width, style);
    x += title_width + 1;

    // Author
    let remaining = area.width.saturating_sub(x - area.x);
    if remaining > 2 {
        draw_text_truncated(
            buffer,
            x,
            y,
            &pr.author,
            remaining.saturating_sub(2),
            Style::fg(theme.muted),
        );
    }
}

fn draw_help_bar(model: &Model, buffer: &mut OptimizedBuffer, area: Rect) {
    let theme = &model.theme;
    let y = area.y + area.height - 1;

    buffer.draw_text(
        area.x + 1,
        y,
        &"─".repeat(area.width.saturating_sub(2) as usize),
        Style::fg(theme.border),
    );

    let help = model.flash_message.as_deref().map_or(
        "j/k navigate  Enter open  s filter  / search  r reload  q quit",
        |msg| msg,
    );
    let style = if model.flash_message.is_some() {
        Style::fg(theme.warning)
    } else {
        Style::fg(theme.muted)
    };
    buffer.draw_text(area.x + 2, y, help, style);
}
