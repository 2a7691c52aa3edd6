//! `PrClient` implementation that shells out to the `az` CLI.
//!
//! Pull requests go through `az repos pr` porcelain; threads, comment
//! mutations, and file diffs go through `az devops invoke`, whose file-diff
//! resource returns the line-diff blocks consumed by `diff::blocks`.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::api::{
    Comment, FileChange, FileDiffSource, PrClient, PrData, PullRequestDetail, PullRequestSummary,
    ThreadAnchor, ThreadRecord, ThreadStatus,
};
use crate::diff::{DiffSide, LineDiffBlock};

/// Client that invokes the `az` binary as a subprocess.
pub struct AzClient {
    repo_path: PathBuf,
    /// Azure repository id, resolved once at construction.
    repository: String,
}

impl AzClient {
    pub fn new(repo_path: impl Into<PathBuf>, repository: impl Into<String>) -> Self {
        Self {
            repo_path: repo_path.into(),
            repository: repository.into(),
        }
    }

    /// Run `az <args> --output json` and return stdout bytes.
    fn run_az(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = Command::new("az")
            .args(args)
            .arg("--output")
            .arg("json")
            .current_dir(&self.repo_path)
            .output()
            .context("Failed to run `az` — is it installed and on PATH?")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "az {} failed (exit {}): {}",
                args.first().copied().unwrap_or_default(),
                output.status,
                stderr.trim()
            );
        }

        Ok(output.stdout)
    }
}

// -- Intermediate serde types for `az repos pr` --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzPullRequest {
    pull_request_id: u64,
    title: String,
    description: Option<String>,
    created_by: AzIdentity,
    status: String,
    is_draft: Option<bool>,
    source_ref_name: String,
    target_ref_name: String,
    last_merge_source_commit: Option<AzCommitRef>,
    last_merge_target_commit: Option<AzCommitRef>,
    creation_date: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzIdentity {
    display_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzCommitRef {
    commit_id: String,
}

// -- Thread types (`az devops invoke --area git --resource pullRequestThreads`) --

#[derive(Deserialize)]
struct AzThreadList {
    value: Vec<AzThread>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzThread {
    id: i64,
    status: Option<String>,
    thread_context: Option<AzThreadContext>,
    #[serde(default)]
    is_deleted: bool,
    comments: Vec<AzComment>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzThreadContext {
    file_path: String,
    left_file_start: Option<AzPosition>,
    left_file_end: Option<AzPosition>,
    right_file_start: Option<AzPosition>,
    right_file_end: Option<AzPosition>,
}

#[derive(Deserialize)]
struct AzPosition {
    line: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzComment {
    id: i64,
    author: AzIdentity,
    content: Option<String>,
    published_date: Option<String>,
    #[serde(default)]
    is_deleted: bool,
}

// -- File diff types (`az devops invoke --area git --resource fileDiffs`) --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzFileDiff {
    line_diff_blocks: Vec<LineDiffBlock>,
}

// -- Conversions --

fn status_from_wire(status: Option<&str>) -> ThreadStatus {
    match status {
        Some("fixed") => ThreadStatus::Fixed,
        Some("wontFix") => ThreadStatus::WontFix,
        Some("closed") => ThreadStatus::Closed,
        Some("pending") => ThreadStatus::Pending,
        _ => ThreadStatus::Active,
    }
}

const fn status_to_wire(status: ThreadStatus) -> &'static str {
    match status {
        ThreadStatus::Active => "active",
        ThreadStatus::Pending => "pending",
        ThreadStatus::Fixed => "fixed",
        ThreadStatus::WontFix => "wontFix",
        ThreadStatus::Closed => "closed",
    }
}

fn thread_from_wire(thread: AzThread) -> Option<ThreadRecord> {
    if thread.is_deleted {
        return None;
    }
    let context = thread.thread_context?;
    let (side, start, end) = match (&context.right_file_start, &context.left_file_start) {
        (Some(start), _) => (
            DiffSide::Modified,
            start.line,
            context.right_file_end.as_ref().map(|p| p.line),
        ),
        (None, Some(start)) => (
            DiffSide::Base,
            start.line,
            context.left_file_end.as_ref().map(|p| p.line),
        ),
        (None, None) => return None,
    };

    // Comment ids are qualified as thread:comment so `edit_comment` can
    // recover its route parameters.
    let thread_id = thread.id.to_string();
    let comments = thread
        .comments
        .into_iter()
        .filter(|c| !c.is_deleted)
        .map(|c| {
            let mut comment = comment_from_wire(c);
            comment.id = format!("{thread_id}:{}", comment.id);
            comment
        })
        .collect();

    Some(ThreadRecord {
        id: thread_id,
        anchor: ThreadAnchor {
            // Azure paths lead with a slash.
            file_path: context.file_path.trim_start_matches('/').to_string(),
            side,
            start_line: start,
            end_line: end.filter(|e| *e != start),
        },
        status: status_from_wire(thread.status.as_deref()),
        outdated: false,
        comments,
    })
}

fn comment_from_wire(comment: AzComment) -> Comment {
    Comment {
        id: comment.id.to_string(),
        author: comment.author.display_name,
        body: comment.content.unwrap_or_default(),
        created_at: comment.published_date.unwrap_or_default(),
    }
}

impl AzClient {
    fn invoke(&self, resource: &str, route: &[(&str, &str)], method: &str, body: Option<&str>) -> Result<Vec<u8>> {
        let route_params: Vec<String> = route
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();

        let mut args = vec![
            "devops".to_string(),
            "invoke".to_string(),
            "--area".to_string(),
            "git".to_string(),
            "--resource".to_string(),
            resource.to_string(),
            "--http-method".to_string(),
            method.to_string(),
            "--api-version".to_string(),
            "7.1".to_string(),
        ];
        if !route_params.is_empty() {
            args.push("--route-parameters".to_string());
            args.extend(route_params);
        }
        if let Some(body) = body {
            args.push("--in-file".to_string());
            args.push(body.to_string());
        }

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run_az(&arg_refs)
    }

    /// Write a request body to a temp file for `--in-file`.
    fn body_file(&self, json: &serde_json::Value) -> Result<request_body::BodyFile> {
        request_body::BodyFile::new(json)
    }

    fn fetch_threads(&self, pr: u64) -> Result<Vec<ThreadRecord>> {
        let pr_arg = pr.to_string();
        let stdout = self.invoke(
            "pullRequestThreads",
            &[("repositoryId", &self.repository), ("pullRequestId", &pr_arg)],
            "GET",
            None,
        )?;
        let list: AzThreadList =
            serde_json::from_slice(&stdout).context("Failed to parse thread list JSON")?;
        Ok(list.value.into_iter().filter_map(thread_from_wire).collect())
    }
}

/// Minimal temp-file holder for `--in-file` request bodies.
mod request_body {
    use anyhow::{Context, Result};
    use std::path::PathBuf;

    pub struct BodyFile {
        path: PathBuf,
    }

    impl BodyFile {
        pub fn new(json: &serde_json::Value) -> Result<Self> {
            let path = std::env::temp_dir().join(format!("prdeck-body-{}.json", uuid::Uuid::new_v4()));
            std::fs::write(&path, serde_json::to_vec(json)?)
                .with_context(|| format!("Failed to write request body: {}", path.display()))?;
            Ok(Self { path })
        }

        pub fn path_str(&self) -> String {
            self.path.display().to_string()
        }
    }

    impl Drop for BodyFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

impl PrClient for AzClient {
    fn name(&self) -> &'static str {
        "azure"
    }

    fn list_pull_requests(&self) -> Result<Vec<PullRequestSummary>> {
        let stdout = self.run_az(&[
            "repos",
            "pr",
            "list",
            "--repository",
            &self.repository,
            "--status",
            "all",
        ])?;
        let entries: Vec<AzPullRequest> =
            serde_json::from_slice(&stdout).context("Failed to parse `az repos pr list` JSON")?;

        Ok(entries
            .into_iter()
            .map(|pr| PullRequestSummary {
                number: pr.pull_request_id,
                title: pr.title,
                author: pr.created_by.display_name,
                state: if pr.is_draft == Some(true) && pr.status == "active" {
                    "draft".to_string()
                } else if pr.status == "completed" {
                    "merged".to_string()
                } else if pr.status == "active" {
                    "open".to_string()
                } else {
                    pr.status
                },
                thread_count: 0,
                open_thread_count: 0,
            })
            .collect())
    }

    fn load_pull_request(&self, number: u64) -> Result<Option<PrData>> {
        let number_arg = number.to_string();
        let stdout = self.run_az(&["repos", "pr", "show", "--id", &number_arg])?;
        let pr: AzPullRequest =
            serde_json::from_slice(&stdout).context("Failed to parse `az repos pr show` JSON")?;

        let threads = self.fetch_threads(number)?;

        let base_sha = pr
            .last_merge_target_commit
            .as_ref()
            .map(|c| c.commit_id.clone())
            .unwrap_or_default();
        let head_sha = pr
            .last_merge_source_commit
            .as_ref()
            .map(|c| c.commit_id.clone())
            .unwrap_or_default();

        let detail = PullRequestDetail {
            number: pr.pull_request_id,
            title: pr.title,
            description: pr.description.filter(|d| !d.trim().is_empty()),
            author: pr.created_by.display_name,
            state: if pr.status == "active" { "open".to_string() } else { pr.status },
            base_ref: pr.target_ref_name.trim_start_matches("refs/heads/").to_string(),
            head_ref: pr.source_ref_name.trim_start_matches("refs/heads/").to_string(),
            base_sha,
            head_sha,
            created_at: pr.creation_date,
        };

        // Azure's PR payload does not carry the change list; read it from
        // the local checkout when possible, otherwise leave it to the diff
        // fetch per file.
        let files = list_changed_files(&self.repo_path, &detail);

        Ok(Some(PrData {
            detail,
            threads,
            files,
        }))
    }

    fn file_diff(&self, pr: &PullRequestDetail, path: &str) -> Result<Option<FileDiffSource>> {
        let diff_params = serde_json::json!({
            "baseVersionCommit": pr.base_sha,
            "targetVersionCommit": pr.head_sha,
            "fileDiffParams": [{ "path": format!("/{path}"), "originalPath": format!("/{path}") }],
        });
        let body = self.body_file(&diff_params)?;
        let body_path = body.path_str();
        let stdout = self.invoke(
            "fileDiffs",
            &[("repositoryId", &self.repository)],
            "POST",
            Some(&body_path),
        )?;

        #[derive(Deserialize)]
        struct FileDiffList {
            value: Vec<AzFileDiff>,
        }
        let list: FileDiffList =
            serde_json::from_slice(&stdout).context("Failed to parse file diff JSON")?;

        Ok(list
            .value
            .into_iter()
            .next()
            .map(|d| FileDiffSource::Blocks(d.line_diff_blocks)))
    }

    fn create_thread(&self, pr: u64, anchor: &ThreadAnchor, body: &str) -> Result<ThreadRecord> {
        let (start, end) = anchor.line_span();
        let file_path = format!("/{}", anchor.file_path);
        let context = match anchor.side {
            DiffSide::Modified => serde_json::json!({
                "filePath": file_path,
                "rightFileStart": { "line": start, "offset": 1 },
                "rightFileEnd": { "line": end, "offset": 1 },
            }),
            DiffSide::Base => serde_json::json!({
                "filePath": file_path,
                "leftFileStart": { "line": start, "offset": 1 },
                "leftFileEnd": { "line": end, "offset": 1 },
            }),
        };
        let payload = serde_json::json!({
            "comments": [{ "parentCommentId": 0, "content": body, "commentType": 1 }],
            "status": "active",
            "threadContext": context,
        });

        let body_file = self.body_file(&payload)?;
        let body_path = body_file.path_str();
        let pr_arg = pr.to_string();
        let stdout = self.invoke(
            "pullRequestThreads",
            &[("repositoryId", &self.repository), ("pullRequestId", &pr_arg)],
            "POST",
            Some(&body_path),
        )?;

        let thread: AzThread =
            serde_json::from_slice(&stdout).context("Failed to parse created thread JSON")?;
        thread_from_wire(thread).context("created thread has no anchor")
    }

    fn reply(
        &self,
        pr: u64,
        thread_id: &str,
        _reply_to_comment: &str,
        body: &str,
    ) -> Result<Comment> {
        let payload = serde_json::json!({ "parentCommentId": 1, "content": body, "commentType": 1 });
        let body_file = self.body_file(&payload)?;
        let body_path = body_file.path_str();
        let pr_arg = pr.to_string();
        let stdout = self.invoke(
            "pullRequestThreadComments",
            &[
                ("repositoryId", &self.repository),
                ("pullRequestId", &pr_arg),
                ("threadId", thread_id),
            ],
            "POST",
            Some(&body_path),
        )?;
        let comment: AzComment =
            serde_json::from_slice(&stdout).context("Failed to parse reply JSON")?;
        let mut comment = comment_from_wire(comment);
        comment.id = format!("{thread_id}:{}", comment.id);
        Ok(comment)
    }

    fn edit_comment(&self, pr: u64, comment_id: &str, body: &str) -> Result<Comment> {
        // Comment ids are qualified as thread:comment for Azure.
        let (thread_id, comment_id) = comment_id
            .split_once(':')
            .unwrap_or(("", comment_id));
        let payload = serde_json::json!({ "content": body });
        let body_file = self.body_file(&payload)?;
        let body_path = body_file.path_str();
        let pr_arg = pr.to_string();
        let stdout = self.invoke(
            "pullRequestThreadComments",
            &[
                ("repositoryId", &self.repository),
                ("pullRequestId", &pr_arg),
                ("threadId", thread_id),
                ("commentId", comment_id),
            ],
            "PATCH",
            Some(&body_path),
        )?;
        let comment: AzComment =
            serde_json::from_slice(&stdout).context("Failed to parse edited comment JSON")?;
        Ok(comment_from_wire(comment))
    }

    fn set_thread_status(
        &self,
        pr: u64,
        thread_id: &str,
        status: ThreadStatus,
    ) -> Result<ThreadRecord> {
        let payload = serde_json::json!({ "status": status_to_wire(status) });
        let body_file = self.body_file(&payload)?;
        let body_path = body_file.path_str();
        let pr_arg = pr.to_string();
        let stdout = self.invoke(
            "pullRequestThreads",
            &[
                ("repositoryId", &self.repository),
                ("pullRequestId", &pr_arg),
                ("threadId", thread_id),
            ],
            "PATCH",
            Some(&body_path),
        )?;
        let thread: AzThread =
            serde_json::from_slice(&stdout).context("Failed to parse updated thread JSON")?;
        thread_from_wire(thread).context("updated thread has no anchor")
    }

    fn merge(&self, pr: u64) -> Result<()> {
        let pr_arg = pr.to_string();
        self.run_az(&["repos", "pr", "update", "--id", &pr_arg, "--status", "completed"])?;
        Ok(())
    }
}

/// Changed files from the local checkout (`git diff --name-status`).
fn list_changed_files(repo_path: &std::path::Path, pr: &PullRequestDetail) -> Vec<FileChange> {
    if pr.base_sha.is_empty() || pr.head_sha.is_empty() {
        return Vec::new();
    }
    let output = Command::new("git")
        .current_dir(repo_path)
        .args(["diff", "--name-status"])
        .arg(format!("{}..{}", pr.base_sha, pr.head_sha))
        .output();

    let Ok(output) = output else {
        return Vec::new();
    };
    if !output.status.success() {
        return Vec::new();
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let status = parts.next()?;
            let path = parts.next_back()?;
            let change_kind = match status.chars().next()? {
                'A' => "added",
                'D' => "deleted",
                'R' => "renamed",
                _ => "modified",
            };
            Some(FileChange {
                path: path.to_string(),
                change_kind: change_kind.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_wire_maps_right_side_anchor() {
        let json = r#"{
            "id": 9,
            "status": "fixed",
            "threadContext": {
                "filePath": "/src/lib.rs",
                "rightFileStart": { "line": 4 },
                "rightFileEnd": { "line": 6 }
            },
            "comments": [
                { "id": 1, "author": { "displayName": "Alice" }, "content": "hm", "publishedDate": "2025-06-01" },
                { "id": 2, "author": { "displayName": "Bob" }, "content": "gone", "isDeleted": true }
            ]
        }"#;
        let thread: AzThread = serde_json::from_str(json).unwrap();
        let record = thread_from_wire(thread).unwrap();

        assert_eq!(record.anchor.file_path, "src/lib.rs");
        assert_eq!(record.anchor.side, DiffSide::Modified);
        assert_eq!(record.anchor.start_line, 4);
        assert_eq!(record.anchor.end_line, Some(6));
        assert_eq!(record.status, ThreadStatus::Fixed);
        assert_eq!(record.comments.len(), 1);
        assert_eq!(record.comments[0].author, "Alice");
    }

    #[test]
    fn system_threads_without_context_are_dropped() {
        let json = r#"{ "id": 3, "status": null, "threadContext": null, "comments": [] }"#;
        let thread: AzThread = serde_json::from_str(json).unwrap();
        assert!(thread_from_wire(thread).is_none());
    }

    #[test]
    fn left_side_anchor_maps_to_base() {
        let json = r#"{
            "id": 4,
            "status": "active",
            "threadContext": {
                "filePath": "/a.rs",
                "leftFileStart": { "line": 2 },
                "leftFileEnd": { "line": 2 }
            },
            "comments": []
        }"#;
        let thread: AzThread = serde_json::from_str(json).unwrap();
        let record = thread_from_wire(thread).unwrap();
        assert_eq!(record.anchor.side, DiffSide::Base);
        assert_eq!(record.anchor.start_line, 2);
        assert_eq!(record.anchor.end_line, None);
    }

    #[test]
    fn file_diff_blocks_deserialize() {
        let json = r#"{
            "lineDiffBlocks": [
                { "changeType": 0, "originalLineNumberStart": 1, "originalLinesCount": 40,
                  "modifiedLineNumberStart": 1, "modifiedLinesCount": 37 },
                { "changeType": 3, "originalLineNumberStart": 41, "originalLinesCount": 1,
                  "modifiedLineNumberStart": 38, "modifiedLinesCount": 7 }
            ]
        }"#;
        let diff: AzFileDiff = serde_json::from_str(json).unwrap();
        assert_eq!(diff.line_diff_blocks.len(), 2);
        assert_eq!(diff.line_diff_blocks[1].change_type, 3);
    }

    #[test]
    fn status_wire_round_trip() {
        for status in [
            ThreadStatus::Active,
            ThreadStatus::Pending,
            ThreadStatus::Fixed,
            ThreadStatus::WontFix,
            ThreadStatus::Closed,
        ] {
            assert_eq!(status_from_wire(Some(status_to_wire(status))), status);
        }
    }
}
