//! prdeck - terminal pull-request review client
//!
//! Usage: prdeck [options] [pr-number]
//!
//! Reviews the pull requests of the repository in the current directory
//! (or `--repo <path>`), against GitHub (`gh`) or Azure DevOps (`az`).

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use opentui::input::ParseError;
use opentui::{enable_raw_mode, terminal_size, InputParser, Renderer, RendererOptions};

use prdeck::api::{FileDiffSource, PrClient, PullRequestDetail};
use prdeck::azure::AzClient;
use prdeck::config::{load_ui_config, Provider};
use prdeck::diff::{commenting_ranges, hunks_from_blocks_padded, DiffChangeType, DiffHunk, ParsedDiff};
use prdeck::github::GhClient;
use prdeck::input::map_event_to_message;
use prdeck::layout::CONTEXT_OVERFLOW;
use prdeck::logging::Logging;
use prdeck::model::{CommentTarget, FileCacheEntry, PendingAction};
use prdeck::storage::{content_hash, ViewedStore};
use prdeck::{update, vcs, view, Message, Model, Screen, Theme};

fn main() -> Result<()> {
    let args = parse_args()?;
    let logging = Logging::init()?;
    tracing::info!(log_dir = %logging.path.display(), "session start");

    let repo_path = args
        .repo
        .clone()
        .unwrap_or_else(|| PathBuf::from("."))
        .canonicalize()
        .context("Failed to resolve repository path")?;

    let mut config = load_ui_config()?.unwrap_or_default();
    let provider = args.provider.or(config.provider).unwrap_or_default();

    let client: Box<dyn PrClient> = match provider {
        Provider::Github => Box::new(GhClient::new(&repo_path)),
        Provider::Azure => {
            let repository = args
                .azure_repo
                .clone()
                .or_else(|| config.azure_repository.clone())
                .context("Azure provider needs --azure-repo or config.azure_repository")?;
            Box::new(AzClient::new(&repo_path, repository))
        }
    };

    let store = match ViewedStore::default_path() {
        Some(path) => match ViewedStore::open(&path) {
            Ok(store) => Some(store),
            Err(err) => {
                tracing::warn!(%err, "viewed store unavailable");
                None
            }
        },
        None => None,
    };

    let session = Session {
        client,
        repo_path,
        store,
    };

    // Theme selection: CLI flag beats config.
    let theme_name = args.theme.clone().or_else(|| config.theme.clone());
    let theme = theme_name
        .as_deref()
        .and_then(Theme::by_name)
        .unwrap_or_default();
    if let Some(name) = args.theme {
        if Theme::by_name(&name).is_none() {
            bail!("Unknown theme: {name}");
        }
        config.theme = Some(name);
    }

    // Terminal setup.
    let (term_width, height) = terminal_size().unwrap_or((80, 24));
    let width = term_width.saturating_sub(2).max(1);

    let refresh_interval = config.refresh_interval();
    let mut model = Model::new(width as u16, height as u16, config);
    model.theme = theme;
    model.provider_name = session.client.name();
    model.user = session
        .client
        .current_user()
        .unwrap_or_else(|_| "you".to_string());

    // Initial data.
    model.pending_actions.push(PendingAction::LoadPrList);
    if let Some(number) = args.pr {
        update(&mut model, Message::SelectPr(number));
    }
    drain_actions(&mut model, &session);

    let _raw_guard = enable_raw_mode().context("Failed to enable raw mode")?;

    let options = RendererOptions {
        use_alt_screen: true,
        hide_cursor: true,
        enable_mouse: false,
        query_capabilities: false,
    };
    let mut renderer = Renderer::new_with_options(width.into(), height.into(), options)
        .context("Failed to initialize renderer")?;
    let _wrap_guard = AutoWrapGuard::new().context("Failed to disable line wrap")?;
    renderer.set_background(model.theme.background);

    let mut input = InputParser::new();
    let mut last_refresh = Instant::now();

    loop {
        // Detect external resize even when no input arrives.
        if let Ok((term_width, term_height)) = terminal_size() {
            let ui_width = term_width.saturating_sub(2).max(1);
            if ui_width as u16 != model.width || term_height as u16 != model.height {
                model.resize(ui_width as u16, term_height as u16);
                model.needs_redraw = true;
                renderer
                    .resize(ui_width.into(), term_height.into())
                    .context("Failed to resize renderer")?;
            }
        }

        renderer.invalidate();
        renderer.set_background(model.theme.background);
        renderer.clear();
        model.needs_redraw = false;
        view(&model, renderer.buffer());
        renderer.present().context("Failed to present frame")?;

        if model.should_quit {
            break;
        }

        // Background poll for thread updates between inputs.
        if last_refresh.elapsed() >= refresh_interval {
            last_refresh = Instant::now();
            refresh_threads(&mut model, &session);
        }

        let mut buf = [0u8; 64];
        if let Ok(n) = read_with_timeout(&mut buf, Duration::from_millis(100)) {
            if n > 0 {
                let mut offset = 0usize;
                while offset < n {
                    match input.parse(&buf[offset..n]) {
                        Ok((event, consumed)) => {
                            offset = offset.saturating_add(consumed);
                            let msg = map_event_to_message(&model, &event);
                            let resize = if let Message::Resize { width, height } = msg {
                                Some((width, height))
                            } else {
                                None
                            };
                            update(&mut model, msg);

                            if let Some((width, height)) = resize {
                                renderer
                                    .resize(width.into(), height.into())
                                    .context("Failed to resize renderer")?;
                                model.needs_redraw = true;
                            }

                            drain_actions(&mut model, &session);
                        }
                        Err(ParseError::Empty | ParseError::Incomplete) => break,
                        Err(_) => {
                            offset = offset.saturating_add(1);
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

struct AutoWrapGuard;

impl AutoWrapGuard {
    fn new() -> std::io::Result<Self> {
        let mut out = std::io::stdout();
        out.write_all(b"\x1b[?7l")?; // Disable line wrap
        out.flush()?;
        Ok(Self)
    }
}

impl Drop for AutoWrapGuard {
    fn drop(&mut self) {
        let mut out = std::io::stdout();
        let _ = out.write_all(b"\x1b[?7h"); // Re-enable line wrap
        let _ = out.flush();
    }
}

struct CliArgs {
    provider: Option<Provider>,
    repo: Option<PathBuf>,
    azure_repo: Option<String>,
    theme: Option<String>,
    pr: Option<u64>,
}

fn parse_args() -> Result<CliArgs> {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = CliArgs {
        provider: None,
        repo: None,
        azure_repo: None,
        theme: None,
        pr: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!("Usage: prdeck [options] [pr-number]");
                println!();
                println!("Options:");
                println!("  --provider <github|azure>   Provider backend (default: github)");
                println!("  --repo <path>               Repository checkout (default: .)");
                println!("  --azure-repo <name>         Azure DevOps repository id/name");
                println!("  --theme <name>              Color theme (dark, light)");
                println!();
                println!("Environment:");
                println!("  PRDECK_LOG   tracing filter for the session log file");
                std::process::exit(0);
            }
            "--provider" => {
                i += 1;
                let value = args.get(i).context("--provider requires a value")?;
                parsed.provider = Some(match value.as_str() {
                    "github" => Provider::Github,
                    "azure" => Provider::Azure,
                    other => bail!("Unknown provider: {other}"),
                });
            }
            "--repo" => {
                i += 1;
                let value = args.get(i).context("--repo requires a path")?;
                parsed.repo = Some(PathBuf::from(value));
            }
            "--azure-repo" => {
                i += 1;
                let value = args.get(i).context("--azure-repo requires a name")?;
                parsed.azure_repo = Some(value.clone());
            }
            "--theme" => {
                i += 1;
                let value = args.get(i).context("--theme requires a name")?;
                parsed.theme = Some(value.clone());
            }
            arg if arg.starts_with('-') => {
                bail!("Unknown option: {arg}");
            }
            arg => {
                if parsed.pr.is_none() {
                    parsed.pr = Some(arg.parse().context("pr-number must be numeric")?);
                } else {
                    bail!("Unexpected argument: {arg}");
                }
            }
        }
        i += 1;
    }

    Ok(parsed)
}

/// Everything the effect layer needs besides the model.
struct Session {
    client: Box<dyn PrClient>,
    repo_path: PathBuf,
    store: Option<ViewedStore>,
}

impl Session {
    fn pr_key(&self, number: u64) -> String {
        format!("{}:{number}", self.client.name())
    }
}

/// Execute the actions queued by `update`, converting failures into flash
/// notifications and optimistic-state rollbacks.
fn drain_actions(model: &mut Model, session: &Session) {
    let actions = std::mem::take(&mut model.pending_actions);
    for action in actions {
        match action {
            PendingAction::LoadPrList => load_pr_list(model, session),
            PendingAction::OpenPr(number) => {
                if let Err(err) = open_pr(model, session, number) {
                    tracing::warn!(%err, number, "failed to open pull request");
                    model.flash_message = Some(format!("Failed to open PR #{number}: {err}"));
                    model.screen = Screen::PrList;
                    model.focus = prdeck::Focus::PrList;
                }
            }
            PendingAction::SubmitComment {
                request,
                body,
                local_thread_id,
                local_comment_id,
            } => submit_comment(model, session, &request, &body, &local_thread_id, &local_comment_id),
            PendingAction::ChangeStatus { thread_id, status } => {
                let Some(pr) = model.current_pr.as_ref().map(|pr| pr.number) else {
                    continue;
                };
                match session.client.set_thread_status(pr, &thread_id, status) {
                    Ok(record) => {
                        if let Err(err) = model.threads.apply_status(record) {
                            tracing::warn!(%err, "status change lost its thread");
                        }
                    }
                    Err(err) => {
                        tracing::warn!(%err, %thread_id, "status change failed");
                        model.flash_message = Some(format!("Status change failed: {err}"));
                    }
                }
                model.needs_redraw = true;
            }
            PendingAction::ToggleViewed { path } => persist_viewed(model, session, &path),
            PendingAction::MergePr(number) => match session.client.merge(number) {
                Ok(()) => {
                    model.flash_message = Some(format!("PR #{number} merged"));
                    if let Some(store) = &session.store {
                        if let Err(err) = store.forget_pr(&session.pr_key(number)) {
                            tracing::warn!(%err, number, "failed to drop viewed state");
                        }
                    }
                    model.pending_actions.push(PendingAction::LoadPrList);
                }
                Err(err) => {
                    tracing::warn!(%err, number, "merge failed");
                    model.flash_message = Some(format!("Merge failed: {err}"));
                }
            },
        }
    }

    // Actions can queue follow-ups (e.g. merge → reload list).
    if !model.pending_actions.is_empty() {
        drain_actions(model, session);
    }
}

fn load_pr_list(model: &mut Model, session: &Session) {
    match session.client.list_pull_requests() {
        Ok(prs) => {
            model.prs = prs;
            model.list_index = model.list_index.min(model.prs.len().saturating_sub(1));
        }
        Err(err) => {
            tracing::warn!(%err, "failed to list pull requests");
            model.flash_message = Some(format!("Failed to list pull requests: {err}"));
        }
    }
    model.needs_redraw = true;
}

fn open_pr(model: &mut Model, session: &Session, number: u64) -> Result<()> {
    let data = session
        .client
        .load_pull_request(number)?
        .with_context(|| format!("pull request #{number} not found"))?;

    model.threads.load(data.threads);
    model.files = data.files;

    // A PR-wide unified diff (GitHub) is fetched once and split per file.
    let mut unified: Option<HashMap<String, ParsedDiff>> = None;

    for file in &model.files {
        let entry = build_file_entry(model_parts(model), session, &data.detail, &file.path, &mut unified);
        model.file_cache.insert(file.path.clone(), entry);
    }

    model.current_pr = Some(data.detail);
    model.needs_redraw = true;
    Ok(())
}

/// The pieces of the model `build_file_entry` reads, split off so the
/// borrow of `file_cache` stays disjoint.
struct ModelParts<'a> {
    highlighter: &'a prdeck::Highlighter,
}

fn model_parts(model: &Model) -> ModelParts<'_> {
    ModelParts {
        highlighter: &model.highlighter,
    }
}

fn build_file_entry(
    parts: ModelParts<'_>,
    session: &Session,
    detail: &PullRequestDetail,
    path: &str,
    unified: &mut Option<HashMap<String, ParsedDiff>>,
) -> FileCacheEntry {
    let repo = session.repo_path.as_path();
    let local = vcs::is_git_repo(repo);

    let head_lines = if local {
        vcs::file_content(repo, path, &detail.head_sha).unwrap_or_default()
    } else {
        Vec::new()
    };
    let base_lines = if local {
        vcs::file_content(repo, path, &detail.base_sha).unwrap_or_default()
    } else {
        Vec::new()
    };

    let mut hunks = resolve_hunks(session, detail, path, unified, local, repo);
    fill_block_content(&mut hunks, &base_lines, &head_lines);

    if hunks.is_empty() {
        tracing::debug!(path, "file has no diff hunks");
    }

    let base_ranges = commenting_ranges(&hunks, true);
    let modified_ranges = commenting_ranges(&hunks, false);
    if base_ranges.is_empty() && modified_ranges.is_empty() {
        tracing::debug!(path, "no commentable ranges");
    }

    let highlighted = compute_highlights(parts.highlighter, path, &hunks);

    let hash = if local {
        vcs::file_bytes(repo, path, &detail.head_sha).map(|bytes| content_hash(&bytes))
    } else {
        None
    };
    let viewed = match (&session.store, &hash) {
        (Some(store), Some(hash)) => store
            .is_viewed(&session.pr_key(detail.number), path, hash)
            .unwrap_or(false),
        _ => false,
    };

    FileCacheEntry {
        hunks,
        head_lines,
        highlighted,
        base_ranges,
        modified_ranges,
        viewed,
        content_hash: hash,
    }
}

fn resolve_hunks(
    session: &Session,
    detail: &PullRequestDetail,
    path: &str,
    unified: &mut Option<HashMap<String, ParsedDiff>>,
    local: bool,
    repo: &Path,
) -> Vec<DiffHunk> {
    // Prefer the local checkout: no network and it matches what the user
    // sees in their working tree history.
    if local && !detail.base_sha.is_empty() && !detail.head_sha.is_empty() {
        if let Some(parsed) = vcs::file_diff(repo, path, &detail.base_sha, Some(&detail.head_sha)) {
            return parsed.hunks;
        }
    }

    if let Some(map) = unified {
        return map.remove(path).map(|p| p.hunks).unwrap_or_default();
    }

    match session.client.file_diff(detail, path) {
        Ok(Some(FileDiffSource::Unified(text))) => {
            let mut map: HashMap<String, ParsedDiff> = ParsedDiff::parse_all(&text)
                .into_iter()
                .filter_map(|p| p.file_b.clone().map(|name| (name, p)))
                .collect();
            let hunks = map.remove(path).map(|p| p.hunks).unwrap_or_default();
            *unified = Some(map);
            hunks
        }
        Ok(Some(FileDiffSource::Blocks(blocks))) => {
            hunks_from_blocks_padded(&blocks, CONTEXT_OVERFLOW)
        }
        Ok(None) => Vec::new(),
        Err(err) => {
            tracing::warn!(%err, path, "diff fetch failed");
            Vec::new()
        }
    }
}

/// Block-built hunks carry no text; resolve each line against the file
/// contents of its own side.
fn fill_block_content(hunks: &mut [DiffHunk], base_lines: &[String], head_lines: &[String]) {
    for hunk in hunks {
        for line in &mut hunk.lines {
            if !line.content.is_empty() {
                continue;
            }
            let text = match line.kind {
                DiffChangeType::Delete => line
                    .old_line
                    .and_then(|n| base_lines.get((n as usize).checked_sub(1)?)),
                DiffChangeType::Control => None,
                _ => line
                    .new_line
                    .and_then(|n| head_lines.get((n as usize).checked_sub(1)?)),
            };
            if let Some(text) = text {
                line.content.clone_from(text);
            }
        }
    }
}

fn compute_highlights(
    highlighter: &prdeck::Highlighter,
    path: &str,
    hunks: &[DiffHunk],
) -> Vec<Vec<prdeck::HighlightSpan>> {
    let Some(mut file_hl) = highlighter.for_file(path) else {
        return Vec::new();
    };

    let mut result = Vec::new();
    for hunk in hunks {
        for line in &hunk.lines {
            if line.kind == DiffChangeType::Control {
                result.push(Vec::new());
            } else {
                result.push(file_hl.highlight_line(&line.content));
            }
        }
    }
    result
}

fn submit_comment(
    model: &mut Model,
    session: &Session,
    request: &prdeck::model::CommentRequest,
    body: &str,
    local_thread_id: &str,
    local_comment_id: &str,
) {
    let client = session.client.as_ref();
    let result: Result<()> = match &request.target {
        CommentTarget::NewThread => client
            .create_thread(request.pr, &request.anchor, body)
            .and_then(|record| {
                model
                    .threads
                    .confirm_thread(local_thread_id, record)
                    .map_err(Into::into)
            }),
        CommentTarget::Reply { thread_id } => {
            let reply_to = model
                .threads
                .get(thread_id)
                .and_then(|t| {
                    t.comments
                        .iter()
                        .find(|c| c.phase == prdeck::reconcile::CommentPhase::Confirmed)
                })
                .map(|c| c.id.clone())
                .unwrap_or_default();
            client
                .reply(request.pr, thread_id, &reply_to, body)
                .and_then(|comment| {
                    model
                        .threads
                        .confirm_comment(thread_id, local_comment_id, comment)
                        .map_err(Into::into)
                })
        }
        CommentTarget::Edit { thread_id, .. } => client
            .edit_comment(request.pr, local_comment_id, body)
            .and_then(|comment| {
                model
                    .threads
                    .confirm_edit(thread_id, comment)
                    .map_err(Into::into)
            }),
    };

    if let Err(err) = result {
        tracing::warn!(%err, "comment submission failed");
        let rollback = match &request.target {
            CommentTarget::Edit { thread_id, .. } => {
                model.threads.fail_edit(thread_id, local_comment_id)
            }
            _ => model.threads.fail_comment(local_thread_id, local_comment_id),
        };
        if let Err(rollback_err) = rollback {
            tracing::warn!(%rollback_err, "rollback lost its comment");
        }
        model.flash_message = Some(format!("Comment failed: {err}"));
    }
    model.needs_redraw = true;
}

fn persist_viewed(model: &mut Model, session: &Session, path: &str) {
    let Some(pr) = model.current_pr.as_ref().map(|pr| pr.number) else {
        return;
    };
    let Some(store) = &session.store else {
        return;
    };
    let Some(entry) = model.file_cache.get(path) else {
        return;
    };
    let Some(hash) = &entry.content_hash else {
        model.flash_message = Some("No content hash; viewed state not persisted".to_string());
        return;
    };

    let key = session.pr_key(pr);
    let result = if entry.viewed {
        store.mark_viewed(&key, path, hash)
    } else {
        store.clear_viewed(&key, path)
    };
    if let Err(err) = result {
        tracing::warn!(%err, path, "failed to persist viewed state");
    }
}

/// Poll the provider for thread changes and merge them without clobbering
/// interleaved local edits.
fn refresh_threads(model: &mut Model, session: &Session) {
    if model.screen != Screen::PrDetail {
        return;
    }
    let Some(detail) = model.current_pr.clone() else {
        return;
    };

    let snapshot = model.threads.generation();
    let data = match session.client.load_pull_request(detail.number) {
        Ok(Some(data)) => data,
        Ok(None) => return,
        Err(err) => {
            tracing::debug!(%err, "background poll failed");
            return;
        }
    };

    // Working-copy diffs for files that hold threads, to recompute anchor
    // lines over uncommitted local edits.
    let mut local_diff = HashMap::new();
    if vcs::is_git_repo(&session.repo_path) {
        for record in &data.threads {
            let path = &record.anchor.file_path;
            if local_diff.contains_key(path) {
                continue;
            }
            if let Some(parsed) =
                vcs::working_copy_diff(&session.repo_path, path, &detail.head_sha)
            {
                local_diff.insert(path.clone(), parsed.hunks);
            }
        }
    }

    let outcome = model.threads.apply_sync(snapshot, data.threads, &local_diff);
    if outcome != prdeck::reconcile::SyncOutcome::default() {
        tracing::info!(
            added = outcome.added,
            updated = outcome.updated,
            removed = outcome.removed,
            adopted = outcome.adopted,
            skipped = outcome.skipped_stale,
            "thread sync"
        );
        model.needs_redraw = true;
    }
}

/// Read from stdin with a timeout.
fn read_with_timeout(buf: &mut [u8], _timeout: Duration) -> std::io::Result<usize> {
    use std::io::Read;
    // Raw mode is configured with VMIN=0, VTIME=1, so this returns promptly
    // when no input is pending.
    std::io::stdin().read(buf)
}
