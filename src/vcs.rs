//! Local git integration.
//!
//! The PR providers own the review data; the local checkout supplies diffs
//! and file contents, including the working-copy diff used to remap thread
//! anchors over uncommitted edits.

use std::path::Path;
use std::process::Command;

use crate::diff::ParsedDiff;

/// True when `path` is the root of a git checkout.
#[must_use]
pub fn is_git_repo(path: &Path) -> bool {
    path.join(".git").exists()
}

/// Diff for one file between two commits, or against the working copy when
/// `to_commit` is `None`.
#[must_use]
pub fn file_diff(
    repo_path: &Path,
    file_path: &str,
    from_commit: &str,
    to_commit: Option<&str>,
) -> Option<ParsedDiff> {
    let mut cmd = Command::new("git");
    cmd.current_dir(repo_path);
    cmd.arg("diff");

    if let Some(to) = to_commit {
        cmd.arg(format!("{from_commit}..{to}"));
    } else {
        cmd.arg(from_commit);
    }
    cmd.arg("--").arg(file_path);

    let output = cmd.output().ok()?;
    if !output.status.success() {
        return None;
    }

    let text = String::from_utf8_lossy(&output.stdout);
    if text.trim().is_empty() {
        None
    } else {
        Some(ParsedDiff::parse(&text))
    }
}

/// Working-copy diff for one file relative to `commit` (uncommitted edits).
#[must_use]
pub fn working_copy_diff(repo_path: &Path, file_path: &str, commit: &str) -> Option<ParsedDiff> {
    file_diff(repo_path, file_path, commit, None)
}

/// File content at a commit, as lines.
#[must_use]
pub fn file_content(repo_path: &Path, file_path: &str, commit: &str) -> Option<Vec<String>> {
    let bytes = file_bytes(repo_path, file_path, commit)?;
    let content = String::from_utf8_lossy(&bytes);
    Some(content.lines().map(String::from).collect())
}

/// Raw file bytes at a commit, for content hashing.
#[must_use]
pub fn file_bytes(repo_path: &Path, file_path: &str, commit: &str) -> Option<Vec<u8>> {
    let output = Command::new("git")
        .current_dir(repo_path)
        .arg("show")
        .arg(format!("{commit}:{file_path}"))
        .output()
        .ok()?;

    if output.status.success() {
        Some(output.stdout)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_repo_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_git_repo(dir.path()));
    }
}
