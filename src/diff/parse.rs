//! Unified diff parser.
//!
//! Parses standard unified diff output (from `gh pr diff` or local git) into
//! the shared hunk model. Each `@@` header becomes a `Control` line at the
//! hunk's first position so positions line up with the providers' comment
//! protocols.

use super::{DiffChangeType, DiffHunk, DiffLine};

/// A parsed unified diff for a single file.
#[derive(Debug, Clone, Default)]
pub struct ParsedDiff {
    pub file_a: Option<String>,
    pub file_b: Option<String>,
    pub hunks: Vec<DiffHunk>,
}

impl ParsedDiff {
    /// Parse a unified diff string.
    #[must_use]
    pub fn parse(diff: &str) -> Self {
        let mut result = Self::default();
        let mut lines = diff.lines().peekable();

        // Header (--- and +++ lines); skip diff --git, index, etc.
        while let Some(line) = lines.peek() {
            if line.starts_with("---") {
                result.file_a = line
                    .strip_prefix("--- ")
                    .map(|s| s.strip_prefix("a/").unwrap_or(s).to_string());
                lines.next();
            } else if line.starts_with("+++") {
                result.file_b = line
                    .strip_prefix("+++ ")
                    .map(|s| s.strip_prefix("b/").unwrap_or(s).to_string());
                lines.next();
            } else if line.starts_with("@@") {
                break;
            } else {
                lines.next();
            }
        }

        let mut position: u32 = 0;
        while let Some(line) = lines.next() {
            if line.starts_with("@@") {
                if let Some(hunk) = parse_hunk(line, &mut lines, &mut position) {
                    result.hunks.push(hunk);
                }
            }
        }

        result
    }

    /// Parse a multi-file diff (e.g. a whole PR diff) into one `ParsedDiff`
    /// per `diff --git` section.
    #[must_use]
    pub fn parse_all(diff: &str) -> Vec<Self> {
        let mut sections: Vec<String> = Vec::new();
        let mut current = String::new();

        for line in diff.lines() {
            if line.starts_with("diff --git") && !current.is_empty() {
                sections.push(std::mem::take(&mut current));
            }
            current.push_str(line);
            current.push('\n');
        }
        if !current.trim().is_empty() {
            sections.push(current);
        }

        sections.iter().map(|s| Self::parse(s)).collect()
    }
}

fn parse_hunk(
    header: &str,
    lines: &mut std::iter::Peekable<std::str::Lines<'_>>,
    position: &mut u32,
) -> Option<DiffHunk> {
    // @@ -start,count +start,count @@ optional context
    let parts: Vec<&str> = header.split_whitespace().collect();
    if parts.len() < 3 {
        return None;
    }

    let (old_start, old_count) = parse_range(parts[1].trim_start_matches('-'))?;
    let (new_start, new_count) = parse_range(parts[2].trim_start_matches('+'))?;

    let mut hunk = DiffHunk::new(old_start, old_count, new_start, new_count);
    hunk.lines.push(
        DiffLine::new(DiffChangeType::Control, None, None, *position).with_content(header),
    );
    *position += 1;

    let mut old_line = old_start;
    let mut new_line = new_start;

    while let Some(line) = lines.peek() {
        if line.starts_with("@@") || line.starts_with("diff ") {
            break;
        }

        let line = lines.next().unwrap_or_default();

        let (kind, content) = if let Some(content) = line.strip_prefix('+') {
            (DiffChangeType::Add, content)
        } else if let Some(content) = line.strip_prefix('-') {
            (DiffChangeType::Delete, content)
        } else if let Some(content) = line.strip_prefix(' ') {
            (DiffChangeType::Context, content)
        } else if line.is_empty() {
            // Empty context line
            (DiffChangeType::Context, "")
        } else if line.starts_with('\\') {
            // "\ No newline at end of file"
            continue;
        } else {
            (DiffChangeType::Context, line)
        };

        let diff_line = match kind {
            DiffChangeType::Add => {
                let dl = DiffLine::new(kind, None, Some(new_line), *position);
                new_line += 1;
                dl
            }
            DiffChangeType::Delete => {
                let dl = DiffLine::new(kind, Some(old_line), None, *position);
                old_line += 1;
                dl
            }
            _ => {
                let dl = DiffLine::new(
                    DiffChangeType::Context,
                    Some(old_line),
                    Some(new_line),
                    *position,
                );
                old_line += 1;
                new_line += 1;
                dl
            }
        };
        *position += 1;

        hunk.lines.push(diff_line.with_content(content));
    }

    Some(hunk)
}

fn parse_range(s: &str) -> Option<(u32, u32)> {
    if let Some((start, count)) = s.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        // Single line: "5" means start=5, count=1
        let start = s.parse().ok()?;
        Some((start, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &str = r#"diff --git a/src/main.rs b/src/main.rs
index abc123..def456 100644
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,5 +1,7 @@
 fn main() {
-    println!("Hello");
+    println!("Hello, world!");
+    println!("Goodbye!");
 }
"#;

    #[test]
    fn parses_simple_diff() {
        let parsed = ParsedDiff::parse(SIMPLE);

        assert_eq!(parsed.file_a, Some("src/main.rs".to_string()));
        assert_eq!(parsed.file_b, Some("src/main.rs".to_string()));
        assert_eq!(parsed.hunks.len(), 1);

        let hunk = &parsed.hunks[0];
        assert_eq!(hunk.old_start, 1);
        assert_eq!(hunk.old_count, 5);
        assert_eq!(hunk.new_start, 1);
        assert_eq!(hunk.new_count, 7);

        // Control, context, delete, add, add, context
        let kinds: Vec<DiffChangeType> = hunk.lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiffChangeType::Control,
                DiffChangeType::Context,
                DiffChangeType::Delete,
                DiffChangeType::Add,
                DiffChangeType::Add,
                DiffChangeType::Context,
            ]
        );
    }

    #[test]
    fn line_numbers_track_both_sides() {
        let diff = "--- a/test.txt\n+++ b/test.txt\n@@ -10,3 +10,4 @@\n context\n-removed\n+added1\n+added2\n";
        let parsed = ParsedDiff::parse(diff);
        let lines = &parsed.hunks[0].lines;

        // lines[0] is the @@ control line
        assert_eq!(lines[1].old_line, Some(10));
        assert_eq!(lines[1].new_line, Some(10));

        assert_eq!(lines[2].old_line, Some(11));
        assert_eq!(lines[2].new_line, None);

        assert_eq!(lines[3].old_line, None);
        assert_eq!(lines[3].new_line, Some(11));

        assert_eq!(lines[4].old_line, None);
        assert_eq!(lines[4].new_line, Some(12));
    }

    #[test]
    fn positions_increase_across_hunks() {
        let diff = "--- a/f\n+++ b/f\n@@ -1,2 +1,2 @@\n a\n-b\n+B\n@@ -10,2 +10,2 @@\n x\n-y\n+Y\n";
        let parsed = ParsedDiff::parse(diff);
        let positions: Vec<u32> = parsed
            .hunks
            .iter()
            .flat_map(|h| h.lines.iter().map(|l| l.position_in_hunk))
            .collect();
        let expected: Vec<u32> = (0..positions.len() as u32).collect();
        assert_eq!(positions, expected);
    }

    #[test]
    fn parse_all_splits_per_file() {
        let diff = "diff --git a/one.rs b/one.rs\n--- a/one.rs\n+++ b/one.rs\n@@ -1 +1 @@\n-a\n+b\ndiff --git a/two.rs b/two.rs\n--- a/two.rs\n+++ b/two.rs\n@@ -1 +1,2 @@\n x\n+y\n";
        let parsed = ParsedDiff::parse_all(diff);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].file_b.as_deref(), Some("one.rs"));
        assert_eq!(parsed[1].file_b.as_deref(), Some("two.rs"));
        assert_eq!(parsed[1].hunks[0].new_count, 2);
    }

    #[test]
    fn skips_no_newline_marker() {
        let diff = "--- a/f\n+++ b/f\n@@ -1 +1 @@\n-old\n\\ No newline at end of file\n+new\n";
        let parsed = ParsedDiff::parse(diff);
        assert_eq!(parsed.hunks[0].lines.len(), 3); // control + delete + add
    }
}
