//! Persisted per-file review state.
//!
//! The one piece of state that outlives a session: which changed files of a
//! pull request the user has marked viewed. Keys include a content hash so a
//! file edit silently clears the flag instead of showing a stale checkmark.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};

/// SQLite-backed store for viewed flags.
pub struct ViewedStore {
    conn: Connection,
}

impl ViewedStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open viewed store: {}", path.display()))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS viewed_files (
                pr_key     TEXT NOT NULL,
                file_path  TEXT NOT NULL,
                file_hash  TEXT NOT NULL,
                viewed_at  TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (pr_key, file_path, file_hash)
            )",
        )
        .context("Failed to initialize viewed store schema")?;
        Ok(Self { conn })
    }

    /// Default on-disk location, honoring `XDG_DATA_HOME`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            PathBuf::from(xdg)
        } else if let Ok(home) = std::env::var("HOME") {
            Path::new(&home).join(".local").join("share")
        } else {
            return None;
        };
        Some(base.join("prdeck").join("state.db"))
    }

    /// Mark a file viewed at its current content hash.
    pub fn mark_viewed(&self, pr_key: &str, file_path: &str, file_hash: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO viewed_files (pr_key, file_path, file_hash)
                 VALUES (?1, ?2, ?3)",
                params![pr_key, file_path, file_hash],
            )
            .context("Failed to record viewed flag")?;
        Ok(())
    }

    /// Clear the viewed flag for a file regardless of hash.
    pub fn clear_viewed(&self, pr_key: &str, file_path: &str) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM viewed_files WHERE pr_key = ?1 AND file_path = ?2",
                params![pr_key, file_path],
            )
            .context("Failed to clear viewed flag")?;
        Ok(())
    }

    /// True when the file was marked viewed at exactly this content hash.
    pub fn is_viewed(&self, pr_key: &str, file_path: &str, file_hash: &str) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM viewed_files
                 WHERE pr_key = ?1 AND file_path = ?2 AND file_hash = ?3",
                params![pr_key, file_path, file_hash],
                |row| row.get(0),
            )
            .context("Failed to query viewed flag")?;
        Ok(count > 0)
    }

    /// Drop all rows for a pull request (e.g. after merge).
    pub fn forget_pr(&self, pr_key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM viewed_files WHERE pr_key = ?1", params![pr_key])
            .context("Failed to forget pull request")?;
        Ok(())
    }
}

/// Content hash used for viewed keys.
#[must_use]
pub fn content_hash(content: &[u8]) -> String {
    use std::fmt::Write;

    let mut hasher = Sha256::new();
    hasher.update(content);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (tempfile::TempDir, ViewedStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ViewedStore::open(&dir.path().join("state.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn viewed_round_trip() {
        let (_dir, store) = open_temp();
        let hash = content_hash(b"fn main() {}\n");

        assert!(!store.is_viewed("gh:42", "src/main.rs", &hash).unwrap());
        store.mark_viewed("gh:42", "src/main.rs", &hash).unwrap();
        assert!(store.is_viewed("gh:42", "src/main.rs", &hash).unwrap());
    }

    #[test]
    fn edited_file_is_no_longer_viewed() {
        let (_dir, store) = open_temp();
        let before = content_hash(b"a");
        let after = content_hash(b"b");

        store.mark_viewed("gh:42", "src/main.rs", &before).unwrap();
        assert!(!store.is_viewed("gh:42", "src/main.rs", &after).unwrap());
    }

    #[test]
    fn clear_and_forget() {
        let (_dir, store) = open_temp();
        let hash = content_hash(b"x");
        store.mark_viewed("gh:1", "a.rs", &hash).unwrap();
        store.mark_viewed("gh:1", "b.rs", &hash).unwrap();

        store.clear_viewed("gh:1", "a.rs").unwrap();
        assert!(!store.is_viewed("gh:1", "a.rs", &hash).unwrap());
        assert!(store.is_viewed("gh:1", "b.rs", &hash).unwrap());

        store.forget_pr("gh:1").unwrap();
        assert!(!store.is_viewed("gh:1", "b.rs", &hash).unwrap());
    }

    #[test]
    fn hashes_are_stable_hex() {
        let hash = content_hash(b"hello");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, content_hash(b"hello"));
    }
}
