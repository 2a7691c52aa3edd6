//! Typed errors raised by the review core.
//!
//! Command handlers convert these into flash notifications; the core itself
//! never renders UI. Provider subprocess failures stay `anyhow` errors at
//! the call sites.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No changed file with this path in the current pull request.
    #[error("file not found in pull request: {0}")]
    FileNotFound(String),

    /// No cached thread with this id.
    #[error("thread not found: {0}")]
    ThreadNotFound(String),

    /// No comment with this id in the thread.
    #[error("comment not found: {0}")]
    CommentNotFound(String),

    /// The target line does not fall inside any commentable diff range.
    #[error("no commentable diff range at {file}:{line}")]
    NoMatchingHunk { file: String, line: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
