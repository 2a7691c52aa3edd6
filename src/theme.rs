//! Theme system.
//!
//! Themes are defined by 7 seed colors; everything else (panel backgrounds,
//! diff tints, selection colors) is derived with `lerp`/`blend_over`.

use opentui::{Rgba, Style};

/// Diff-specific color tokens.
#[derive(Debug, Clone)]
pub struct DiffTheme {
    /// Text color for added lines
    pub added: Rgba,
    /// Text color for removed lines
    pub removed: Rgba,
    /// Text color for context lines
    pub context: Rgba,
    /// Bright highlight for + signs
    pub highlight_added: Rgba,
    /// Bright highlight for - signs
    pub highlight_removed: Rgba,
    /// Background for added lines
    pub added_bg: Rgba,
    /// Background for removed lines
    pub removed_bg: Rgba,
    /// Background for context lines
    pub context_bg: Rgba,
    /// Line number text color
    pub line_number: Rgba,
    /// Gutter marker for commentable lines
    pub commentable: Rgba,
}

impl DiffTheme {
    #[must_use]
    pub fn style_line_number(&self, bg: Rgba) -> Style {
        Style::fg(self.line_number).with_bg(bg)
    }
}

/// Complete theme definition.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,

    // Base colors
    pub background: Rgba,
    pub foreground: Rgba,

    // UI chrome
    pub border: Rgba,
    pub panel_bg: Rgba,

    // Selection/highlighting
    pub selection_bg: Rgba,
    pub selection_fg: Rgba,

    // Semantic colors
    pub primary: Rgba,
    pub success: Rgba,
    pub warning: Rgba,
    pub error: Rgba,
    pub muted: Rgba,

    // Diff colors
    pub diff: DiffTheme,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    #[must_use]
    pub fn style_muted(&self) -> Style {
        Style::fg(self.muted)
    }

    #[must_use]
    pub fn style_muted_on(&self, bg: Rgba) -> Style {
        Style::fg(self.muted).with_bg(bg)
    }

    #[must_use]
    pub fn style_foreground(&self) -> Style {
        Style::fg(self.foreground)
    }

    #[must_use]
    pub fn style_foreground_on(&self, bg: Rgba) -> Style {
        Style::fg(self.foreground).with_bg(bg)
    }

    #[must_use]
    pub fn style_primary(&self) -> Style {
        Style::fg(self.primary)
    }

    #[must_use]
    pub fn style_primary_on(&self, bg: Rgba) -> Style {
        Style::fg(self.primary).with_bg(bg)
    }
}

/// The 7 seed colors that define a theme.
pub struct ThemeSeeds {
    pub background: &'static str,
    pub foreground: &'static str,
    pub primary: &'static str,
    pub muted: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
}

impl Theme {
    /// Build a complete theme from 7 seed colors, deriving everything else.
    #[must_use]
    pub fn from_seeds(name: &str, seeds: &ThemeSeeds) -> Self {
        let background = hex(seeds.background);
        let foreground = hex(seeds.foreground);
        let primary = hex(seeds.primary);
        let muted = hex(seeds.muted);
        let success = hex(seeds.success);
        let warning = hex(seeds.warning);
        let error = hex(seeds.error);

        let dark = luminance(background) < 0.5;
        let lift = if dark { 0.07 } else { -0.05 };

        let panel_bg = lerp(background, foreground, lift.abs() * if dark { 1.0 } else { 0.6 });
        let selection_bg = lerp(background, primary, 0.25);
        let border = lerp(background, foreground, 0.25);

        let diff = DiffTheme {
            added: lerp(success, foreground, 0.2),
            removed: lerp(error, foreground, 0.2),
            context: lerp(foreground, muted, 0.3),
            highlight_added: success,
            highlight_removed: error,
            added_bg: lerp(background, success, 0.12),
            removed_bg: lerp(background, error, 0.12),
            context_bg: background,
            line_number: muted,
            commentable: lerp(background, primary, 0.55),
        };

        Self {
            name: name.to_string(),
            background,
            foreground,
            border,
            panel_bg,
            selection_bg,
            selection_fg: foreground,
            primary,
            success,
            warning,
            error,
            muted,
            diff,
        }
    }

    /// Default dark theme (Tokyo Night seeds).
    #[must_use]
    pub fn dark() -> Self {
        Self::from_seeds(
            "dark",
            &ThemeSeeds {
                background: "#1a1b26",
                foreground: "#c0caf5",
                primary: "#7aa2f7",
                muted: "#565f89",
                success: "#9ece6a",
                warning: "#e0af68",
                error: "#f7768e",
            },
        )
    }

    /// Light theme (GitHub-ish seeds).
    #[must_use]
    pub fn light() -> Self {
        Self::from_seeds(
            "light",
            &ThemeSeeds {
                background: "#ffffff",
                foreground: "#24292f",
                primary: "#0969da",
                muted: "#6e7781",
                success: "#1a7f37",
                warning: "#9a6700",
                error: "#cf222e",
            },
        )
    }

    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }
}

#[must_use]
pub fn built_in_theme_names() -> Vec<&'static str> {
    vec!["dark", "light"]
}

// ---------------------------------------------------------------------------
// Color helpers
// ---------------------------------------------------------------------------

/// Parse `#rrggbb` / `#rrggbbaa`; falls back to opaque magenta so a bad seed
/// is visible rather than invisible.
#[must_use]
pub fn hex(value: &str) -> Rgba {
    parse_hex(value).unwrap_or_else(|| Rgba::new(1.0, 0.0, 1.0, 1.0))
}

fn parse_hex(value: &str) -> Option<Rgba> {
    let value = value.strip_prefix('#').unwrap_or(value);
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(value.get(range)?, 16)
            .ok()
            .map(|v| f32::from(v) / 255.0)
    };
    match value.len() {
        6 => Some(Rgba::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 1.0)),
        8 => Some(Rgba::new(
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
            channel(6..8)?,
        )),
        _ => None,
    }
}

#[must_use]
pub fn lerp(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    Rgba::new(
        a.r + (b.r - a.r) * t,
        a.g + (b.g - a.g) * t,
        a.b + (b.b - a.b) * t,
        a.a + (b.a - a.a) * t,
    )
}

#[must_use]
pub fn luminance(color: Rgba) -> f32 {
    color
        .r
        .mul_add(0.299, color.g.mul_add(0.587, color.b * 0.114))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parses_rgb_and_rgba() {
        let c = hex("#ff0080");
        assert!((c.r - 1.0).abs() < 1e-6);
        assert!((c.b - 0.5019608).abs() < 1e-4);
        assert!((c.a - 1.0).abs() < 1e-6);

        let c = hex("00000080");
        assert!((c.a - 0.5019608).abs() < 1e-4);
    }

    #[test]
    fn lerp_midpoint() {
        let mid = lerp(
            Rgba::new(0.0, 0.0, 0.0, 1.0),
            Rgba::new(1.0, 1.0, 1.0, 1.0),
            0.5,
        );
        assert!((mid.r - 0.5).abs() < 1e-6);
    }

    #[test]
    fn built_in_themes_resolve() {
        assert!(Theme::by_name("dark").is_some());
        assert!(Theme::by_name("light").is_some());
        assert!(Theme::by_name("solarized").is_none());
    }

    #[test]
    fn dark_theme_is_dark() {
        assert!(luminance(Theme::dark().background) < 0.5);
        assert!(luminance(Theme::light().background) > 0.5);
    }
}
