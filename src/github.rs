//! `PrClient` implementation that shells out to the `gh` CLI.
//!
//! List/detail/diff/merge go through the porcelain commands with `--json`;
//! review threads come from one GraphQL query (the REST comment listing has
//! no resolution state) and comment mutations go through `gh api` REST.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::api::{
    Comment, FileChange, FileDiffSource, PrClient, PrData, PullRequestDetail, PullRequestSummary,
    ThreadAnchor, ThreadRecord, ThreadStatus,
};
use crate::diff::DiffSide;

/// Client that invokes the `gh` binary as a subprocess.
pub struct GhClient {
    repo_path: PathBuf,
}

impl GhClient {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    /// Run `gh <args>` in the repo directory and return stdout bytes.
    fn run_gh(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = Command::new("gh")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .context("Failed to run `gh` — is it installed and on PATH?")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "gh {} failed (exit {}): {}",
                args.first().copied().unwrap_or_default(),
                output.status,
                stderr.trim()
            );
        }

        Ok(output.stdout)
    }
}

// -- Intermediate serde types for `gh pr list/view --json` --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrListEntry {
    number: u64,
    title: String,
    author: GhAuthor,
    state: String,
    is_draft: bool,
}

#[derive(Deserialize)]
struct GhAuthor {
    login: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrViewResponse {
    number: u64,
    title: String,
    body: Option<String>,
    author: GhAuthor,
    state: String,
    base_ref_name: String,
    head_ref_name: String,
    head_ref_oid: String,
    created_at: String,
    files: Vec<PrViewFile>,
}

#[derive(Deserialize)]
struct PrViewFile {
    path: String,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
}

// -- GraphQL review-thread types --

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<GraphQlData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct GraphQlData {
    repository: Option<RepositoryNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    pull_request: Option<PullRequestNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestNode {
    review_threads: ThreadConnection,
}

#[derive(Deserialize)]
struct ThreadConnection {
    nodes: Vec<ThreadNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadNode {
    id: String,
    is_resolved: bool,
    is_outdated: bool,
    path: Option<String>,
    line: Option<u32>,
    start_line: Option<u32>,
    diff_side: Option<String>,
    comments: CommentConnection,
}

#[derive(Deserialize)]
struct CommentConnection {
    nodes: Vec<CommentNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentNode {
    database_id: Option<u64>,
    author: Option<GhAuthor>,
    body: String,
    created_at: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestComment {
    id: u64,
    body: String,
    created_at: String,
    user: RestUser,
}

#[derive(Deserialize)]
struct RestUser {
    login: String,
}

const THREADS_QUERY: &str = "\
query($owner: String!, $repo: String!, $pr: Int!) {
  repository(owner: $owner, name: $repo) {
    pullRequest(number: $pr) {
      reviewThreads(first: 100) {
        nodes {
          id
          isResolved
          isOutdated
          path
          line
          startLine
          diffSide
          comments(first: 100) {
            nodes { databaseId author { login } body createdAt }
          }
        }
      }
    }
  }
}";

// -- Conversions --

fn thread_from_node(node: ThreadNode) -> Option<ThreadRecord> {
    let path = node.path?;
    let line = node.line?;
    let side = match node.diff_side.as_deref() {
        Some("LEFT") => DiffSide::Base,
        _ => DiffSide::Modified,
    };
    let comments = node
        .comments
        .nodes
        .into_iter()
        .map(|c| Comment {
            id: c.database_id.map_or_else(String::new, |id| id.to_string()),
            author: c.author.map_or_else(|| "ghost".to_string(), |a| a.login),
            body: c.body,
            created_at: c.created_at,
        })
        .collect();

    Some(ThreadRecord {
        id: node.id,
        anchor: ThreadAnchor {
            file_path: path,
            side,
            start_line: node.start_line.unwrap_or(line),
            end_line: node.start_line.map(|_| line),
        },
        // GitHub has a binary resolution model; resolved maps to Fixed.
        status: if node.is_resolved {
            ThreadStatus::Fixed
        } else {
            ThreadStatus::Active
        },
        outdated: node.is_outdated,
        comments,
    })
}

fn comment_from_rest(comment: RestComment) -> Comment {
    Comment {
        id: comment.id.to_string(),
        author: comment.user.login,
        body: comment.body,
        created_at: comment.created_at,
    }
}

impl GhClient {
    /// Resolve `owner/name` from the checkout, for GraphQL variables.
    fn repo_slug(&self) -> Result<(String, String)> {
        #[derive(Deserialize)]
        struct RepoView {
            owner: GhAuthor,
            name: String,
        }
        let stdout = self.run_gh(&["repo", "view", "--json", "owner,name"])?;
        let view: RepoView =
            serde_json::from_slice(&stdout).context("Failed to parse `gh repo view` JSON")?;
        Ok((view.owner.login, view.name))
    }

    fn fetch_threads(&self, pr: u64) -> Result<Vec<ThreadRecord>> {
        let (owner, repo) = self.repo_slug()?;
        let pr_arg = format!("pr={pr}");
        let owner_arg = format!("owner={owner}");
        let repo_arg = format!("repo={repo}");
        let query_arg = format!("query={THREADS_QUERY}");
        let stdout = self.run_gh(&[
            "api",
            "graphql",
            "-f",
            &query_arg,
            "-f",
            &owner_arg,
            "-f",
            &repo_arg,
            "-F",
            &pr_arg,
        ])?;

        let response: GraphQlResponse =
            serde_json::from_slice(&stdout).context("Failed to parse GraphQL response")?;

        if let Some(errors) = response.errors {
            let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
            bail!("GraphQL errors: {}", messages.join(", "));
        }

        let nodes = response
            .data
            .and_then(|d| d.repository)
            .and_then(|r| r.pull_request)
            .map(|pr| pr.review_threads.nodes)
            .unwrap_or_default();

        Ok(nodes.into_iter().filter_map(thread_from_node).collect())
    }

    fn resolve_thread(&self, thread_id: &str, resolve: bool) -> Result<()> {
        let mutation = if resolve {
            "mutation($id: ID!) { resolveReviewThread(input: {threadId: $id}) { thread { id } } }"
        } else {
            "mutation($id: ID!) { unresolveReviewThread(input: {threadId: $id}) { thread { id } } }"
        };
        let query_arg = format!("query={mutation}");
        let id_arg = format!("id={thread_id}");
        self.run_gh(&["api", "graphql", "-f", &query_arg, "-f", &id_arg])?;
        Ok(())
    }
}

impl PrClient for GhClient {
    fn name(&self) -> &'static str {
        "github"
    }

    fn current_user(&self) -> Result<String> {
        #[derive(Deserialize)]
        struct User {
            login: String,
        }
        let stdout = self.run_gh(&["api", "user"])?;
        let user: User =
            serde_json::from_slice(&stdout).context("Failed to parse `gh api user` JSON")?;
        Ok(user.login)
    }

    fn list_pull_requests(&self) -> Result<Vec<PullRequestSummary>> {
        let stdout = self.run_gh(&[
            "pr",
            "list",
            "--state",
            "all",
            "--json",
            "number,title,author,state,isDraft",
        ])?;
        let entries: Vec<PrListEntry> =
            serde_json::from_slice(&stdout).context("Failed to parse `gh pr list` JSON")?;

        Ok(entries
            .into_iter()
            .map(|e| PullRequestSummary {
                number: e.number,
                title: e.title,
                author: e.author.login,
                state: if e.is_draft && e.state == "OPEN" {
                    "draft".to_string()
                } else {
                    e.state.to_lowercase()
                },
                thread_count: 0,
                open_thread_count: 0,
            })
            .collect())
    }

    fn load_pull_request(&self, number: u64) -> Result<Option<PrData>> {
        let number_arg = number.to_string();
        let stdout = self.run_gh(&[
            "pr",
            "view",
            &number_arg,
            "--json",
            "number,title,body,author,state,baseRefName,headRefName,headRefOid,createdAt,files",
        ])?;
        let view: PrViewResponse =
            serde_json::from_slice(&stdout).context("Failed to parse `gh pr view` JSON")?;

        let files = view
            .files
            .iter()
            .map(|f| FileChange {
                path: f.path.clone(),
                change_kind: match (f.additions, f.deletions) {
                    (_, 0) => "added".to_string(),
                    (0, _) => "deleted".to_string(),
                    _ => "modified".to_string(),
                },
            })
            .collect();

        let threads = self.fetch_threads(number)?;

        // The PR diff is computed against the merge base; `gh` exposes the
        // base branch name, and the local checkout resolves the sha.
        let detail = PullRequestDetail {
            number: view.number,
            title: view.title,
            description: view.body.filter(|b| !b.trim().is_empty()),
            author: view.author.login,
            state: view.state.to_lowercase(),
            base_sha: view.base_ref_name.clone(),
            base_ref: view.base_ref_name,
            head_ref: view.head_ref_name,
            head_sha: view.head_ref_oid,
            created_at: view.created_at,
        };

        Ok(Some(PrData {
            detail,
            threads,
            files,
        }))
    }

    fn file_diff(&self, pr: &PullRequestDetail, _path: &str) -> Result<Option<FileDiffSource>> {
        // `gh pr diff` returns the whole PR diff; the caller splits per file.
        let number_arg = pr.number.to_string();
        let stdout = self.run_gh(&["pr", "diff", &number_arg])?;
        let text = String::from_utf8_lossy(&stdout).to_string();
        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(FileDiffSource::Unified(text)))
        }
    }

    fn create_thread(&self, pr: u64, anchor: &ThreadAnchor, body: &str) -> Result<ThreadRecord> {
        let endpoint = format!("repos/{{owner}}/{{repo}}/pulls/{pr}/comments");
        let body_arg = format!("body={body}");
        let path_arg = format!("path={}", anchor.file_path);
        let (start, end) = anchor.line_span();
        let line_arg = format!("line={end}");
        let side = match anchor.side {
            DiffSide::Base => "LEFT",
            DiffSide::Modified => "RIGHT",
        };
        let side_arg = format!("side={side}");

        let mut args = vec![
            "api",
            "--method",
            "POST",
            endpoint.as_str(),
            "-f",
            body_arg.as_str(),
            "-f",
            path_arg.as_str(),
            "-F",
            line_arg.as_str(),
            "-f",
            side_arg.as_str(),
        ];
        let start_arg = format!("start_line={start}");
        if start != end {
            args.push("-F");
            args.push(start_arg.as_str());
        }

        let stdout = self.run_gh(&args)?;
        let comment: RestComment =
            serde_json::from_slice(&stdout).context("Failed to parse created comment JSON")?;

        // The REST response has no thread node id; re-read the threads and
        // find the one holding the new comment.
        let comment_id = comment.id.to_string();
        if let Ok(threads) = self.fetch_threads(pr) {
            if let Some(thread) = threads
                .into_iter()
                .find(|t| t.comments.iter().any(|c| c.id == comment_id))
            {
                return Ok(thread);
            }
        }

        // Thread listing lagged behind; a synthetic id stands in until the
        // next sync adopts the thread by file + line.
        Ok(ThreadRecord {
            id: format!("comment-{}", comment.id),
            anchor: anchor.clone(),
            status: ThreadStatus::Active,
            outdated: false,
            comments: vec![comment_from_rest(comment)],
        })
    }

    fn reply(
        &self,
        pr: u64,
        thread_id: &str,
        reply_to_comment: &str,
        body: &str,
    ) -> Result<Comment> {
        // Replies are keyed by a comment database id, not the thread node.
        let reply_to = thread_id
            .strip_prefix("comment-")
            .unwrap_or(reply_to_comment);
        let endpoint = format!("repos/{{owner}}/{{repo}}/pulls/{pr}/comments");
        let body_arg = format!("body={body}");
        let reply_arg = format!("in_reply_to={reply_to}");
        let stdout = self.run_gh(&[
            "api",
            "--method",
            "POST",
            &endpoint,
            "-f",
            &body_arg,
            "-F",
            &reply_arg,
        ])?;
        let comment: RestComment =
            serde_json::from_slice(&stdout).context("Failed to parse reply JSON")?;
        Ok(comment_from_rest(comment))
    }

    fn edit_comment(&self, _pr: u64, comment_id: &str, body: &str) -> Result<Comment> {
        let endpoint = format!("repos/{{owner}}/{{repo}}/pulls/comments/{comment_id}");
        let body_arg = format!("body={body}");
        let stdout = self.run_gh(&["api", "--method", "PATCH", &endpoint, "-f", &body_arg])?;
        let comment: RestComment =
            serde_json::from_slice(&stdout).context("Failed to parse edited comment JSON")?;
        Ok(comment_from_rest(comment))
    }

    fn set_thread_status(
        &self,
        pr: u64,
        thread_id: &str,
        status: ThreadStatus,
    ) -> Result<ThreadRecord> {
        self.resolve_thread(thread_id, status.is_resolved())?;

        // Re-read the thread for the confirmed record.
        let threads = self.fetch_threads(pr)?;
        threads
            .into_iter()
            .find(|t| t.id == thread_id)
            .with_context(|| format!("thread {thread_id} missing after status change"))
    }

    fn merge(&self, pr: u64) -> Result<()> {
        let number_arg = pr.to_string();
        self.run_gh(&["pr", "merge", &number_arg, "--merge"])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_node_maps_sides_and_status() {
        let node = ThreadNode {
            id: "RT1".to_string(),
            is_resolved: true,
            is_outdated: false,
            path: Some("src/lib.rs".to_string()),
            line: Some(12),
            start_line: Some(10),
            diff_side: Some("LEFT".to_string()),
            comments: CommentConnection {
                nodes: vec![CommentNode {
                    database_id: Some(77),
                    author: None,
                    body: "hm".to_string(),
                    created_at: "2025-06-01T00:00:00Z".to_string(),
                }],
            },
        };

        let record = thread_from_node(node).unwrap();
        assert_eq!(record.anchor.side, DiffSide::Base);
        assert_eq!(record.anchor.start_line, 10);
        assert_eq!(record.anchor.end_line, Some(12));
        assert_eq!(record.status, ThreadStatus::Fixed);
        assert_eq!(record.comments[0].id, "77");
        assert_eq!(record.comments[0].author, "ghost");
    }

    #[test]
    fn thread_node_without_anchor_is_dropped() {
        let node = ThreadNode {
            id: "RT1".to_string(),
            is_resolved: false,
            is_outdated: true,
            path: None,
            line: None,
            start_line: None,
            diff_side: None,
            comments: CommentConnection { nodes: vec![] },
        };
        assert!(thread_from_node(node).is_none());
    }

    #[test]
    fn pr_list_json_deserializes() {
        let json = r#"[{"number":7,"title":"Fix race","author":{"login":"alice"},"state":"OPEN","isDraft":true}]"#;
        let entries: Vec<PrListEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries[0].number, 7);
        assert!(entries[0].is_draft);
    }
}
