//! Thread cache and optimistic-comment reconciliation.
//!
//! The [`ThreadSet`] is the only writer of in-memory thread state. User
//! actions insert *pending* entities immediately (so the UI never waits on a
//! provider round-trip) and later substitute the confirmed server entities
//! element-for-element, preserving list positions. Incremental sync merges a
//! poll snapshot into the cache without clobbering interleaved user edits:
//! every user mutation stamps its thread with a monotonic generation, and a
//! sync pass skips threads stamped after the snapshot was taken.

use std::collections::HashMap;

use uuid::Uuid;

use crate::api::{Comment, ThreadAnchor, ThreadRecord, ThreadStatus};
use crate::diff::{map_position, DiffHunk, DiffSide};
use crate::error::{Error, Result};

/// Confirmation phase of a single comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentPhase {
    /// Shown locally, awaiting the provider response.
    Pending,
    /// Confirmed by the provider.
    Confirmed,
    /// The provider call failed; the body stays editable.
    Failed,
}

/// One comment in a local thread; pending entries carry a locally generated
/// id until the server replaces it.
#[derive(Debug, Clone)]
pub struct LocalComment {
    pub id: String,
    pub author: String,
    pub body: String,
    pub created_at: String,
    pub phase: CommentPhase,
    /// For a pending edit of a confirmed comment: the body to restore on
    /// failure.
    prior_body: Option<String>,
}

impl LocalComment {
    fn confirmed(comment: Comment) -> Self {
        Self {
            id: comment.id,
            author: comment.author,
            body: comment.body,
            created_at: comment.created_at,
            phase: CommentPhase::Confirmed,
            prior_body: None,
        }
    }

    fn pending(author: &str, body: &str) -> Self {
        Self {
            id: format!("pending-{}", Uuid::new_v4()),
            author: author.to_string(),
            body: body.to_string(),
            created_at: String::new(),
            phase: CommentPhase::Pending,
            prior_body: None,
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.phase, CommentPhase::Pending)
    }
}

/// Confirmation state of a whole thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    /// Created locally, not yet confirmed by the provider.
    Optimistic,
    Confirmed,
}

/// A thread as held in the cache.
#[derive(Debug, Clone)]
pub struct LocalThread {
    /// Server id once confirmed; a `pending-` local id before that.
    pub id: String,
    pub anchor: ThreadAnchor,
    pub status: ThreadStatus,
    pub outdated: bool,
    pub state: ThreadState,
    pub comments: Vec<LocalComment>,
    /// Generation of the last user mutation; compared against sync
    /// snapshots.
    pub version: u64,
}

impl LocalThread {
    /// 1-based anchor span on the thread's own side.
    #[must_use]
    pub const fn line_span(&self) -> (u32, u32) {
        self.anchor.line_span()
    }
}

/// Snapshot merge statistics, for the status line and logs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    pub adopted: usize,
    pub skipped_stale: usize,
}

/// All threads of the open pull request, grouped by file.
#[derive(Debug, Default)]
pub struct ThreadSet {
    threads: Vec<LocalThread>,
    /// Monotonic stamp source; bumped on every user mutation.
    generation: u64,
}

impl ThreadSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole cache from an initial load.
    pub fn load(&mut self, records: Vec<ThreadRecord>) {
        self.threads = records.into_iter().map(|r| self.from_record(r)).collect();
    }

    fn from_record(&self, record: ThreadRecord) -> LocalThread {
        LocalThread {
            id: record.id,
            anchor: record.anchor,
            status: record.status,
            outdated: record.outdated,
            state: ThreadState::Confirmed,
            comments: record.comments.into_iter().map(LocalComment::confirmed).collect(),
            version: self.generation,
        }
    }

    /// Current generation; record this before fetching a sync snapshot.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &LocalThread> {
        self.threads.iter()
    }

    #[must_use]
    pub fn threads_for_file(&self, path: &str) -> Vec<&LocalThread> {
        self.threads
            .iter()
            .filter(|t| t.anchor.file_path == path)
            .collect()
    }

    #[must_use]
    pub fn get(&self, thread_id: &str) -> Option<&LocalThread> {
        self.threads.iter().find(|t| t.id == thread_id)
    }

    fn get_mut(&mut self, thread_id: &str) -> Result<&mut LocalThread> {
        self.threads
            .iter_mut()
            .find(|t| t.id == thread_id)
            .ok_or_else(|| Error::ThreadNotFound(thread_id.to_string()))
    }

    // --- create -----------------------------------------------------------

    /// Insert an optimistic thread for a new comment. Returns the local
    /// thread id; the provider call runs afterwards and lands in
    /// [`Self::confirm_thread`] or [`Self::fail_comment`].
    pub fn begin_thread(&mut self, anchor: ThreadAnchor, author: &str, body: &str) -> String {
        let version = self.bump();
        let comment = LocalComment::pending(author, body);
        let id = format!("pending-{}", Uuid::new_v4());
        self.threads.push(LocalThread {
            id: id.clone(),
            anchor,
            status: ThreadStatus::Active,
            outdated: false,
            state: ThreadState::Optimistic,
            comments: vec![comment],
            version,
        });
        id
    }

    /// Substitute the confirmed server thread for an optimistic one,
    /// in place. Idempotent: confirming an already-confirmed thread again
    /// (a duplicated provider response) must not duplicate anything.
    pub fn confirm_thread(&mut self, local_id: &str, record: ThreadRecord) -> Result<()> {
        if self.threads.iter().any(|t| t.id == record.id) {
            // Already confirmed; drop the leftover optimistic entry if the
            // duplicate response raced it.
            self.threads
                .retain(|t| !(t.id == local_id && t.state == ThreadState::Optimistic));
            return Ok(());
        }
        let confirmed = self.from_record(record);
        let slot = self.get_mut(local_id)?;
        let version = slot.version;
        *slot = confirmed;
        slot.version = version;
        Ok(())
    }

    // --- reply ------------------------------------------------------------

    /// Append a pending reply to a confirmed thread. Returns the local
    /// comment id.
    pub fn begin_reply(&mut self, thread_id: &str, author: &str, body: &str) -> Result<String> {
        let version = self.bump();
        let thread = self.get_mut(thread_id)?;
        let comment = LocalComment::pending(author, body);
        let id = comment.id.clone();
        thread.comments.push(comment);
        thread.version = version;
        Ok(id)
    }

    /// Replace a pending comment with its server confirmation, preserving
    /// its position in the list. Idempotent against duplicated responses.
    pub fn confirm_comment(
        &mut self,
        thread_id: &str,
        local_id: &str,
        comment: Comment,
    ) -> Result<()> {
        let thread = self.get_mut(thread_id)?;
        if thread.comments.iter().any(|c| c.id == comment.id) {
            thread.comments.retain(|c| c.id != local_id);
            return Ok(());
        }
        let slot = thread
            .comments
            .iter_mut()
            .find(|c| c.id == local_id)
            .ok_or_else(|| Error::CommentNotFound(local_id.to_string()))?;
        *slot = LocalComment::confirmed(comment);
        Ok(())
    }

    /// Mark a pending comment failed. It stays in the thread, editable, and
    /// is never silently dropped.
    pub fn fail_comment(&mut self, thread_id: &str, local_id: &str) -> Result<()> {
        let thread = self.get_mut(thread_id)?;
        let slot = thread
            .comments
            .iter_mut()
            .find(|c| c.id == local_id)
            .ok_or_else(|| Error::CommentNotFound(local_id.to_string()))?;
        slot.phase = CommentPhase::Failed;
        Ok(())
    }

    // --- edit -------------------------------------------------------------

    /// Optimistically replace a confirmed comment's body, keyed by server
    /// id, retaining the prior body for rollback.
    pub fn begin_edit(&mut self, thread_id: &str, comment_id: &str, body: &str) -> Result<()> {
        let version = self.bump();
        let thread = self.get_mut(thread_id)?;
        let slot = thread
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| Error::CommentNotFound(comment_id.to_string()))?;
        slot.prior_body = Some(std::mem::replace(&mut slot.body, body.to_string()));
        slot.phase = CommentPhase::Pending;
        thread.version = version;
        Ok(())
    }

    /// Land a confirmed edit. Keyed by the server comment id, so a
    /// concurrent refresh cannot leave two representations of the comment.
    pub fn confirm_edit(&mut self, thread_id: &str, comment: Comment) -> Result<()> {
        let thread = self.get_mut(thread_id)?;
        let slot = thread
            .comments
            .iter_mut()
            .find(|c| c.id == comment.id)
            .ok_or_else(|| Error::CommentNotFound(comment.id.clone()))?;
        *slot = LocalComment::confirmed(comment);
        Ok(())
    }

    /// Roll a failed edit back to the prior body, in an editable phase.
    pub fn fail_edit(&mut self, thread_id: &str, comment_id: &str) -> Result<()> {
        let thread = self.get_mut(thread_id)?;
        let slot = thread
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| Error::CommentNotFound(comment_id.to_string()))?;
        if let Some(prior) = slot.prior_body.take() {
            slot.body = prior;
        }
        slot.phase = CommentPhase::Failed;
        Ok(())
    }

    // --- status -----------------------------------------------------------

    /// Land a confirmed status change: cached record and displayed status
    /// update together, never independently. Not optimistic.
    pub fn apply_status(&mut self, record: ThreadRecord) -> Result<()> {
        let version = self.bump();
        let id = record.id.clone();
        let confirmed = self.from_record(record);
        let slot = self.get_mut(&id)?;
        *slot = confirmed;
        slot.version = version;
        Ok(())
    }

    // --- incremental sync -------------------------------------------------

    /// Merge a poll snapshot fetched while the cache was at
    /// `snapshot_generation`.
    ///
    /// Matching order per incoming record: by server id; otherwise against
    /// pending optimistic threads by file + recomputed line, mapping the
    /// incoming anchor through `local_diff` (the working-copy diff for that
    /// file, when the user has uncommitted edits). An optimistic thread is
    /// adopted only when exactly one candidate matches; zero or several
    /// candidates leave the optimistic thread pending and insert the record
    /// as a new thread, with a logged diagnostic. Threads the user touched
    /// after the snapshot are skipped.
    pub fn apply_sync(
        &mut self,
        snapshot_generation: u64,
        records: Vec<ThreadRecord>,
        local_diff: &HashMap<String, Vec<DiffHunk>>,
    ) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();
        let mut seen: Vec<String> = Vec::with_capacity(records.len());

        for record in records {
            seen.push(record.id.clone());

            if let Some(existing) = self.threads.iter_mut().find(|t| t.id == record.id) {
                if existing.version > snapshot_generation {
                    tracing::debug!(
                        thread_id = %record.id,
                        stamp = existing.version,
                        snapshot = snapshot_generation,
                        "skipping sync for locally modified thread"
                    );
                    outcome.skipped_stale += 1;
                    continue;
                }
                let version = existing.version;
                *existing = LocalThread {
                    id: record.id,
                    anchor: record.anchor,
                    status: record.status,
                    outdated: record.outdated,
                    state: ThreadState::Confirmed,
                    comments: record.comments.into_iter().map(LocalComment::confirmed).collect(),
                    version,
                };
                outcome.updated += 1;
                continue;
            }

            match self.find_adoption_candidate(&record, local_diff) {
                Some(index) => {
                    let mut confirmed = self.from_record(record);
                    confirmed.version = self.threads[index].version;
                    self.threads[index] = confirmed;
                    outcome.adopted += 1;
                }
                None => {
                    let thread = self.from_record(record);
                    self.threads.push(thread);
                    outcome.added += 1;
                }
            }
        }

        // Server-removed threads dispose their entry; optimistic threads are
        // local-only and survive until confirmed or failed.
        let before = self.threads.len();
        self.threads.retain(|t| {
            t.state == ThreadState::Optimistic
                || seen.iter().any(|id| *id == t.id)
                || t.version > snapshot_generation
        });
        outcome.removed = before - self.threads.len();

        outcome
    }

    /// Index of the single pending optimistic thread matching this record by
    /// file + recomputed line, or `None` when the match is ambiguous.
    fn find_adoption_candidate(
        &self,
        record: &ThreadRecord,
        local_diff: &HashMap<String, Vec<DiffHunk>>,
    ) -> Option<usize> {
        let incoming_line = local_line(&record.anchor, local_diff);

        let candidates: Vec<usize> = self
            .threads
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                t.state == ThreadState::Optimistic
                    && t.anchor.file_path == record.anchor.file_path
                    && t.anchor.side == record.anchor.side
                    && t.anchor.start_line == incoming_line
            })
            .map(|(i, _)| i)
            .collect();

        match candidates.as_slice() {
            [index] => Some(*index),
            [] => None,
            _ => {
                tracing::debug!(
                    thread_id = %record.id,
                    file = %record.anchor.file_path,
                    line = incoming_line,
                    candidates = candidates.len(),
                    "ambiguous optimistic match; inserting as new thread"
                );
                None
            }
        }
    }
}

/// Recompute a server anchor line into working-copy coordinates. Only
/// modified-side anchors shift under local edits; base-side anchors refer to
/// the immutable base revision.
fn local_line(anchor: &ThreadAnchor, local_diff: &HashMap<String, Vec<DiffHunk>>) -> u32 {
    match local_diff.get(&anchor.file_path) {
        // The local diff maps committed head lines (its base side) to
        // working-copy lines (its modified side).
        Some(hunks) if anchor.side == DiffSide::Modified => {
            map_position(hunks, anchor.start_line, DiffSide::Base).line
        }
        _ => anchor.start_line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(file: &str, line: u32) -> ThreadAnchor {
        ThreadAnchor {
            file_path: file.to_string(),
            side: DiffSide::Modified,
            start_line: line,
            end_line: None,
        }
    }

    fn server_comment(id: &str, body: &str) -> Comment {
        Comment {
            id: id.to_string(),
            author: "alice".to_string(),
            body: body.to_string(),
            created_at: "2025-06-01T12:00:00Z".to_string(),
        }
    }

    fn server_thread(id: &str, file: &str, line: u32, comments: Vec<Comment>) -> ThreadRecord {
        ThreadRecord {
            id: id.to_string(),
            anchor: anchor(file, line),
            status: ThreadStatus::Active,
            outdated: false,
            comments,
        }
    }

    #[test]
    fn create_shows_pending_comment_immediately() {
        let mut set = ThreadSet::new();
        let id = set.begin_thread(anchor("src/lib.rs", 5), "me", "looks off");

        let threads = set.threads_for_file("src/lib.rs");
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].state, ThreadState::Optimistic);
        assert_eq!(threads[0].comments.len(), 1);
        assert!(threads[0].comments[0].is_pending());
        assert!(id.starts_with("pending-"));
    }

    #[test]
    fn confirm_thread_replaces_in_place() {
        let mut set = ThreadSet::new();
        let local = set.begin_thread(anchor("src/lib.rs", 5), "me", "looks off");
        set.confirm_thread(
            &local,
            server_thread("T1", "src/lib.rs", 5, vec![server_comment("C1", "looks off")]),
        )
        .unwrap();

        let threads = set.threads_for_file("src/lib.rs");
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].id, "T1");
        assert_eq!(threads[0].state, ThreadState::Confirmed);
        assert_eq!(threads[0].comments[0].phase, CommentPhase::Confirmed);
    }

    #[test]
    fn duplicate_thread_confirmation_does_not_duplicate() {
        let mut set = ThreadSet::new();
        let local = set.begin_thread(anchor("src/lib.rs", 5), "me", "x");
        let record = server_thread("T1", "src/lib.rs", 5, vec![server_comment("C1", "x")]);
        set.confirm_thread(&local, record.clone()).unwrap();
        set.confirm_thread(&local, record).unwrap();
        assert_eq!(set.threads_for_file("src/lib.rs").len(), 1);
    }

    #[test]
    fn duplicate_comment_confirmation_does_not_duplicate() {
        let mut set = ThreadSet::new();
        set.load(vec![server_thread(
            "T1",
            "a.rs",
            3,
            vec![server_comment("C1", "first")],
        )]);
        let local = set.begin_reply("T1", "me", "second").unwrap();
        let confirmed = server_comment("C2", "second");
        set.confirm_comment("T1", &local, confirmed.clone()).unwrap();
        set.confirm_comment("T1", &local, confirmed).unwrap();

        let thread = set.get("T1").unwrap();
        assert_eq!(thread.comments.len(), 2);
        assert_eq!(thread.comments[1].id, "C2");
    }

    #[test]
    fn reply_preserves_list_position() {
        let mut set = ThreadSet::new();
        set.load(vec![server_thread(
            "T1",
            "a.rs",
            3,
            vec![server_comment("C1", "first"), server_comment("C3", "third")],
        )]);
        let local = set.begin_reply("T1", "me", "mine").unwrap();
        // Another refresh lands a comment... the pending one keeps its slot.
        set.confirm_comment("T1", &local, server_comment("C9", "mine"))
            .unwrap();
        let ids: Vec<&str> = set
            .get("T1")
            .unwrap()
            .comments
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["C1", "C3", "C9"]);
    }

    #[test]
    fn failed_comment_becomes_editable_not_dropped() {
        let mut set = ThreadSet::new();
        set.load(vec![server_thread("T1", "a.rs", 3, vec![server_comment("C1", "x")])]);
        let local = set.begin_reply("T1", "me", "oops").unwrap();
        set.fail_comment("T1", &local).unwrap();

        let thread = set.get("T1").unwrap();
        assert_eq!(thread.comments.len(), 2);
        assert_eq!(thread.comments[1].phase, CommentPhase::Failed);
        assert_eq!(thread.comments[1].body, "oops");
    }

    #[test]
    fn failed_edit_rolls_back_prior_body() {
        let mut set = ThreadSet::new();
        set.load(vec![server_thread("T1", "a.rs", 3, vec![server_comment("C1", "original")])]);
        set.begin_edit("T1", "C1", "changed").unwrap();
        assert_eq!(set.get("T1").unwrap().comments[0].body, "changed");

        set.fail_edit("T1", "C1").unwrap();
        let comment = &set.get("T1").unwrap().comments[0];
        assert_eq!(comment.body, "original");
        assert_eq!(comment.phase, CommentPhase::Failed);
    }

    #[test]
    fn status_change_updates_record_and_label_together() {
        let mut set = ThreadSet::new();
        set.load(vec![server_thread("T1", "a.rs", 3, vec![server_comment("C1", "x")])]);
        let mut record = server_thread("T1", "a.rs", 3, vec![server_comment("C1", "x")]);
        record.status = ThreadStatus::Fixed;
        set.apply_status(record).unwrap();

        let thread = set.get("T1").unwrap();
        assert_eq!(thread.status, ThreadStatus::Fixed);
        assert!(thread.status.is_resolved());
    }

    #[test]
    fn sync_adds_updates_and_removes() {
        let mut set = ThreadSet::new();
        set.load(vec![
            server_thread("T1", "a.rs", 3, vec![server_comment("C1", "x")]),
            server_thread("T2", "a.rs", 9, vec![server_comment("C2", "y")]),
        ]);
        let snapshot = set.generation();

        let mut updated = server_thread("T1", "a.rs", 3, vec![server_comment("C1", "x")]);
        updated.status = ThreadStatus::Fixed;
        let incoming = vec![
            updated,
            server_thread("T3", "b.rs", 1, vec![server_comment("C3", "z")]),
        ];

        let outcome = set.apply_sync(snapshot, incoming, &HashMap::new());
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.removed, 1);
        assert!(set.get("T2").is_none());
        assert_eq!(set.get("T1").unwrap().status, ThreadStatus::Fixed);
        assert!(set.get("T3").is_some());
    }

    #[test]
    fn sync_skips_threads_modified_after_snapshot() {
        let mut set = ThreadSet::new();
        set.load(vec![server_thread("T1", "a.rs", 3, vec![server_comment("C1", "x")])]);
        let snapshot = set.generation();

        // User replies after the snapshot was taken.
        let _ = set.begin_reply("T1", "me", "racing").unwrap();

        let incoming = vec![server_thread("T1", "a.rs", 3, vec![server_comment("C1", "x")])];
        let outcome = set.apply_sync(snapshot, incoming, &HashMap::new());

        assert_eq!(outcome.skipped_stale, 1);
        // The pending reply survived the poll.
        assert_eq!(set.get("T1").unwrap().comments.len(), 2);
    }

    #[test]
    fn sync_adopts_single_matching_optimistic_thread() {
        let mut set = ThreadSet::new();
        let local = set.begin_thread(anchor("a.rs", 7), "me", "mine");
        let snapshot = set.generation();

        let incoming = vec![server_thread("T1", "a.rs", 7, vec![server_comment("C1", "mine")])];
        let outcome = set.apply_sync(snapshot, incoming, &HashMap::new());

        assert_eq!(outcome.adopted, 1);
        assert!(set.get(&local).is_none());
        let thread = set.get("T1").unwrap();
        assert_eq!(thread.state, ThreadState::Confirmed);
    }

    #[test]
    fn sync_with_ambiguous_match_inserts_new_thread() {
        let mut set = ThreadSet::new();
        set.begin_thread(anchor("a.rs", 7), "me", "one");
        set.begin_thread(anchor("a.rs", 7), "me", "two");
        let snapshot = set.generation();

        let incoming = vec![server_thread("T1", "a.rs", 7, vec![server_comment("C1", "one")])];
        let outcome = set.apply_sync(snapshot, incoming, &HashMap::new());

        assert_eq!(outcome.adopted, 0);
        assert_eq!(outcome.added, 1);
        // Both optimistic threads survive alongside the new confirmed one.
        assert_eq!(set.threads_for_file("a.rs").len(), 3);
    }

    #[test]
    fn sync_recomputes_lines_through_local_diff() {
        use crate::diff::ParsedDiff;

        let mut set = ThreadSet::new();
        // The user commented on working-copy line 12, which the local diff
        // says corresponds to committed line 10 (two lines inserted above).
        set.begin_thread(anchor("a.rs", 12), "me", "x");
        let snapshot = set.generation();

        let diff = "--- a/a.rs\n+++ b/a.rs\n@@ -5,2 +5,4 @@\n ctx\n+ins1\n+ins2\n ctx2\n";
        let mut local_diff = HashMap::new();
        local_diff.insert("a.rs".to_string(), ParsedDiff::parse(diff).hunks);

        // The server stores the anchor in committed coordinates.
        let incoming = vec![server_thread("T1", "a.rs", 10, vec![server_comment("C1", "x")])];
        let outcome = set.apply_sync(snapshot, incoming, &local_diff);

        assert_eq!(outcome.adopted, 1);
        assert_eq!(set.get("T1").unwrap().anchor.start_line, 10);
    }
}
