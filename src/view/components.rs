//! Reusable UI components.

use opentui::buffer::BoxStyle;
use opentui::{OptimizedBuffer, Rgba, Style};

/// A rectangular area for layout.
#[derive(Debug, Clone, Copy)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create from terminal dimensions.
    #[must_use]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width as u32, height as u32)
    }

    /// Inner area after removing a one-cell border.
    #[must_use]
    pub const fn inner(&self) -> Self {
        Self {
            x: self.x + 1,
            y: self.y + 1,
            width: self.width.saturating_sub(2),
            height: self.height.saturating_sub(2),
        }
    }

    /// Split horizontally at a given width from the left.
    #[must_use]
    pub const fn split_left(&self, width: u32) -> (Self, Self) {
        let left = Self {
            x: self.x,
            y: self.y,
            width,
            height: self.height,
        };
        let right = Self {
            x: self.x + width,
            y: self.y,
            width: self.width.saturating_sub(width),
            height: self.height,
        };
        (left, right)
    }
}

/// Draw a bordered box with an optional title.
pub fn draw_box(
    buffer: &mut OptimizedBuffer,
    area: Rect,
    border_color: Rgba,
    title: Option<&str>,
    title_color: Rgba,
) {
    buffer.draw_box(
        area.x,
        area.y,
        area.width,
        area.height,
        BoxStyle::rounded(Style::fg(border_color)),
    );

    if let Some(title) = title {
        let title_str = format!(" {title} ");
        buffer.draw_text(
            area.x + 2,
            area.y,
            &title_str,
            Style::fg(title_color).with_bold(),
        );
    }
}

/// Draw text, truncating with an ellipsis when it overflows `max_width`.
pub fn draw_text_truncated(
    buffer: &mut OptimizedBuffer,
    x: u32,
    y: u32,
    text: &str,
    max_width: u32,
    style: Style,
) {
    if max_width == 0 {
        return;
    }

    let width = max_width as usize;
    let char_count = text.chars().count();
    if char_count <= width {
        buffer.draw_text(x, y, text, style);
        return;
    }

    let truncated: String = text.chars().take(width.saturating_sub(1)).collect();
    buffer.draw_text(x, y, &format!("{truncated}…"), style);
}

/// Truncate a path for display, keeping the filename visible.
#[must_use]
pub fn truncate_path(path: &str, max_width: usize) -> String {
    if path.len() <= max_width {
        return path.to_string();
    }

    if let Some(idx) = path.rfind('/') {
        let filename = &path[idx + 1..];
        if filename.len() + 4 <= max_width {
            let available = max_width - filename.len() - 4;
            let prefix = &path[..available.min(idx)];
            return format!("{prefix}.../{filename}");
        }
    }

    let truncated = &path[..max_width.saturating_sub(1)];
    format!("{truncated}…")
}

/// Dim the cells in `area` by scaling both fg and bg colors.
pub fn dim_rect(buffer: &mut OptimizedBuffer, area: Rect, scale: f32) {
    for row in area.y..area.y + area.height {
        for col in area.x..area.x + area.width {
            if let Some(cell) = buffer.get_mut(col, row) {
                cell.fg = Rgba::new(
                    cell.fg.r * scale,
                    cell.fg.g * scale,
                    cell.fg.b * scale,
                    cell.fg.a,
                );
                cell.bg = Rgba::new(
                    cell.bg.r * scale,
                    cell.bg.g * scale,
                    cell.bg.b * scale,
                    cell.bg.a,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_path_keeps_filename() {
        let truncated = truncate_path("src/very/deep/nested/module.rs", 18);
        assert!(truncated.ends_with("module.rs"));
        assert!(truncated.len() <= 18);
    }

    #[test]
    fn short_path_unchanged() {
        assert_eq!(truncate_path("src/lib.rs", 20), "src/lib.rs");
    }
}
