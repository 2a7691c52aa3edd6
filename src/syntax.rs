//! Syntax highlighting using syntect.
//!
//! Diff and file lines are highlighted per file with state carried across
//! lines, so multi-line constructs keep their colors.

use std::path::Path;

use opentui::Rgba;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, FontStyle, Theme as SyntectTheme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

/// Highlighted text span with color information.
#[derive(Debug, Clone)]
pub struct HighlightSpan {
    pub text: String,
    pub fg: Rgba,
    pub bold: bool,
    pub italic: bool,
}

/// Syntax highlighter with loaded syntaxes and theme.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: SyntectTheme,
}

impl Highlighter {
    /// Create a highlighter with the default dark theme.
    ///
    /// # Panics
    ///
    /// Panics if the bundled syntect theme set contains no themes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_theme("base16-ocean.dark")
    }

    /// Create a highlighter with a specific syntect theme name, falling back
    /// to the default when unknown.
    ///
    /// # Panics
    ///
    /// Panics if the bundled syntect theme set contains no themes.
    #[must_use]
    pub fn with_theme(theme_name: &str) -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();

        let theme = theme_set
            .themes
            .get(theme_name)
            .or_else(|| theme_set.themes.get("base16-ocean.dark"))
            .cloned()
            .unwrap_or_else(|| theme_set.themes.values().next().unwrap().clone());

        Self { syntax_set, theme }
    }

    /// Syntax reference for a file path, by extension then by well-known
    /// filename.
    fn syntax_for_path(&self, path: &str) -> Option<&SyntaxReference> {
        let path = Path::new(path);

        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if let Some(syntax) = self.syntax_set.find_syntax_by_extension(ext) {
                return Some(syntax);
            }
        }

        match path.file_name().and_then(|n| n.to_str()) {
            Some("Makefile" | "makefile" | "GNUmakefile") => {
                self.syntax_set.find_syntax_by_extension("make")
            }
            Some("Dockerfile") => self.syntax_set.find_syntax_by_extension("dockerfile"),
            Some("Cargo.toml" | "Cargo.lock") => self.syntax_set.find_syntax_by_extension("toml"),
            _ => None,
        }
    }

    /// Stateful highlighter for one file.
    #[must_use]
    pub fn for_file(&self, file_path: &str) -> Option<FileHighlighter<'_>> {
        let syntax = self.syntax_for_path(file_path)?;
        Some(FileHighlighter {
            highlighter: HighlightLines::new(syntax, &self.theme),
            syntax_set: &self.syntax_set,
        })
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Maintains highlight state across the lines of a single file.
pub struct FileHighlighter<'a> {
    highlighter: HighlightLines<'a>,
    syntax_set: &'a SyntaxSet,
}

impl FileHighlighter<'_> {
    /// Highlight the next line, carrying state from previous lines.
    pub fn highlight_line(&mut self, line: &str) -> Vec<HighlightSpan> {
        self.highlighter
            .highlight_line(line, self.syntax_set)
            .map_or_else(
                |_| {
                    vec![HighlightSpan {
                        text: line.to_string(),
                        fg: Rgba::new(1.0, 1.0, 1.0, 1.0),
                        bold: false,
                        italic: false,
                    }]
                },
                |ranges| {
                    ranges
                        .into_iter()
                        .map(|(style, text)| HighlightSpan {
                            text: text.to_string(),
                            fg: color_to_rgba(style.foreground),
                            bold: style.font_style.contains(FontStyle::BOLD),
                            italic: style.font_style.contains(FontStyle::ITALIC),
                        })
                        .collect()
                },
            )
    }
}

fn color_to_rgba(color: Color) -> Rgba {
    Rgba::new(
        f32::from(color.r) / 255.0,
        f32::from(color.g) / 255.0,
        f32::from(color.b) / 255.0,
        f32::from(color.a) / 255.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlights_rust_line() {
        let highlighter = Highlighter::new();
        let mut file_hl = highlighter.for_file("test.rs").expect("rust syntax");
        let spans = file_hl.highlight_line("fn main() {");
        assert!(spans.len() > 1);
    }

    #[test]
    fn unknown_extension_has_no_highlighter() {
        let highlighter = Highlighter::new();
        assert!(highlighter.for_file("notes.xyzzy").is_none());
    }

    #[test]
    fn state_carries_across_lines() {
        let highlighter = Highlighter::new();
        let mut file_hl = highlighter.for_file("test.rs").expect("rust syntax");
        let spans1 = file_hl.highlight_line("let s = \"hello");
        let spans2 = file_hl.highlight_line("world\";");
        assert!(!spans1.is_empty());
        assert!(!spans2.is_empty());
    }
}
