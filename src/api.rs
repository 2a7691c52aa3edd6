//! Provider-neutral pull-request domain types and the client seam.
//!
//! Both provider clients (`github`, `azure`) deserialize their CLI JSON into
//! these types; everything above this module is provider-agnostic.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::diff::{DiffSide, LineDiffBlock};

/// Summary of a pull request for list views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestSummary {
    pub number: u64,
    pub title: String,
    pub author: String,
    /// Provider state: "open", "merged", "closed", "draft".
    pub state: String,
    pub thread_count: i64,
    pub open_thread_count: i64,
}

/// Full details of a pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestDetail {
    pub number: u64,
    pub title: String,
    pub description: Option<String>,
    pub author: String,
    pub state: String,
    pub base_ref: String,
    pub head_ref: String,
    /// Merge-base commit the diff is computed against.
    pub base_sha: String,
    pub head_sha: String,
    pub created_at: String,
}

/// One changed file of a pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    /// "added", "modified", "deleted", "renamed".
    pub change_kind: String,
}

/// Resolution status of a review thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadStatus {
    Active,
    Pending,
    Fixed,
    WontFix,
    Closed,
}

impl ThreadStatus {
    /// Every status a thread may move to from `self` — the current status is
    /// never a legal choice.
    #[must_use]
    pub fn legal_transitions(self) -> Vec<Self> {
        [
            Self::Active,
            Self::Pending,
            Self::Fixed,
            Self::WontFix,
            Self::Closed,
        ]
        .into_iter()
        .filter(|s| *s != self)
        .collect()
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Fixed => "fixed",
            Self::WontFix => "won't fix",
            Self::Closed => "closed",
        }
    }

    /// True once the thread no longer needs attention.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Fixed | Self::WontFix | Self::Closed)
    }
}

/// Anchor of a thread: file, side, 1-based line span on that side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadAnchor {
    pub file_path: String,
    pub side: DiffSide,
    pub start_line: u32,
    pub end_line: Option<u32>,
}

impl ThreadAnchor {
    #[must_use]
    pub const fn line_span(&self) -> (u32, u32) {
        let end = match self.end_line {
            Some(end) => end,
            None => self.start_line,
        };
        (self.start_line, end)
    }
}

/// A server-confirmed review thread with its comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadRecord {
    /// Server-assigned identifier.
    pub id: String,
    pub anchor: ThreadAnchor,
    pub status: ThreadStatus,
    /// True when the server reports the anchor no longer corresponds to the
    /// current diff.
    pub outdated: bool,
    pub comments: Vec<Comment>,
}

/// A single server-confirmed comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub body: String,
    pub created_at: String,
}

/// Everything needed to open a pull request in the detail screen.
#[derive(Debug, Clone)]
pub struct PrData {
    pub detail: PullRequestDetail,
    pub threads: Vec<ThreadRecord>,
    pub files: Vec<FileChange>,
}

/// Where a file's diff comes from; both shapes feed the same hunk model.
#[derive(Debug, Clone)]
pub enum FileDiffSource {
    /// Unified diff text (GitHub, local git).
    Unified(String),
    /// Azure line-diff blocks.
    Blocks(Vec<LineDiffBlock>),
}

/// Provider client seam.
///
/// Implementations shell out to the provider CLI and return confirmed server
/// entities, which the reconciler substitutes for optimistic placeholders.
pub trait PrClient {
    /// Human-readable provider name for logs and the status bar.
    fn name(&self) -> &'static str;

    /// Login of the authenticated user, for optimistic comment authorship.
    fn current_user(&self) -> Result<String> {
        Ok("you".to_string())
    }

    fn list_pull_requests(&self) -> Result<Vec<PullRequestSummary>>;

    fn load_pull_request(&self, number: u64) -> Result<Option<PrData>>;

    /// Diff for one changed file between the PR's base and head.
    fn file_diff(&self, pr: &PullRequestDetail, path: &str) -> Result<Option<FileDiffSource>>;

    /// Create a new thread with one comment; returns the confirmed thread.
    fn create_thread(&self, pr: u64, anchor: &ThreadAnchor, body: &str) -> Result<ThreadRecord>;

    /// Append a comment to an existing thread; returns the confirmed
    /// comment. `reply_to_comment` is the thread's first confirmed comment,
    /// for providers that key replies by comment rather than by thread.
    fn reply(&self, pr: u64, thread_id: &str, reply_to_comment: &str, body: &str)
        -> Result<Comment>;

    /// Replace a comment's body; returns the confirmed comment.
    fn edit_comment(&self, pr: u64, comment_id: &str, body: &str) -> Result<Comment>;

    /// Move a thread to a new status; returns the confirmed thread record.
    fn set_thread_status(
        &self,
        pr: u64,
        thread_id: &str,
        status: ThreadStatus,
    ) -> Result<ThreadRecord>;

    /// Merge the pull request.
    fn merge(&self, pr: u64) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_transitions_exclude_current() {
        let next = ThreadStatus::Active.legal_transitions();
        assert_eq!(next.len(), 4);
        assert!(!next.contains(&ThreadStatus::Active));
        assert!(next.contains(&ThreadStatus::Fixed));
    }

    #[test]
    fn anchor_span_defaults_to_single_line() {
        let anchor = ThreadAnchor {
            file_path: "src/lib.rs".into(),
            side: DiffSide::Modified,
            start_line: 7,
            end_line: None,
        };
        assert_eq!(anchor.line_span(), (7, 7));
    }
}
