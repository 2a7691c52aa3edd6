//! State update logic (Elm architecture).
//!
//! Pure with respect to the outside world: provider calls are queued as
//! [`PendingAction`]s and executed by the session loop, which reports
//! failures back via `flash_message` and the reconciler's rollback paths.

use crate::api::ThreadAnchor;
use crate::command::{command_id_to_message, filtered_commands};
use crate::diff::{DiffChangeType, DiffLine, DiffSide};
use crate::message::Message;
use crate::model::{
    CommentRequest, CommentTarget, DisplayRow, Focus, InlineEditor, Model, PaletteMode,
    PendingAction, PrFilter, Screen,
};
use crate::reconcile::CommentPhase;
use crate::theme::Theme;

#[allow(clippy::too_many_lines)]
pub fn update(model: &mut Model, msg: Message) {
    // Any keypress clears the previous flash.
    if !matches!(msg, Message::Noop) {
        model.flash_message = None;
    }

    match msg {
        // === Navigation ===
        Message::SelectPr(number) => {
            model.screen = Screen::PrDetail;
            model.focus = Focus::DiffPane;
            model.current_pr = None;
            model.files.clear();
            model.file_cache.clear();
            model.threads = crate::reconcile::ThreadSet::new();
            model.file_index = 0;
            model.diff_scroll = 0;
            model.diff_cursor = 0;
            model.visual_mode = false;
            model.pending_actions.push(PendingAction::OpenPr(number));
            model.needs_redraw = true;
        }

        Message::Back => {
            if model.screen == Screen::PrDetail {
                model.screen = Screen::PrList;
                model.focus = Focus::PrList;
                model.current_pr = None;
                model.files.clear();
                model.file_cache.clear();
                model.threads = crate::reconcile::ThreadSet::new();
                model.needs_redraw = true;
            }
        }

        Message::ReloadList => {
            model.pending_actions.push(PendingAction::LoadPrList);
        }

        // === PR list ===
        Message::ListUp => {
            if model.list_index > 0 {
                model.list_index -= 1;
                if model.list_index < model.list_scroll {
                    model.list_scroll = model.list_index;
                }
            }
            model.needs_redraw = true;
        }

        Message::ListDown => {
            let count = model.filtered_prs().len();
            if count > 0 && model.list_index < count - 1 {
                model.list_index += 1;
                let visible = model.list_visible_height().max(1);
                if model.list_index >= model.list_scroll + visible {
                    model.list_scroll = model.list_index - visible + 1;
                }
            }
            model.needs_redraw = true;
        }

        Message::ListTop => {
            model.list_index = 0;
            model.list_scroll = 0;
            model.needs_redraw = true;
        }

        Message::ListBottom => {
            let count = model.filtered_prs().len();
            if count > 0 {
                model.list_index = count - 1;
                let visible = model.list_visible_height().max(1);
                model.list_scroll = count.saturating_sub(visible);
            }
            model.needs_redraw = true;
        }

        Message::CycleStatusFilter => {
            model.filter = match model.filter {
                PrFilter::All => PrFilter::Open,
                PrFilter::Open => PrFilter::Closed,
                PrFilter::Closed => PrFilter::All,
            };
            model.list_index = 0;
            model.list_scroll = 0;
            model.needs_redraw = true;
        }

        Message::SearchActivate => {
            model.search_active = true;
            model.needs_redraw = true;
        }

        Message::SearchInput(c) => {
            model.search_input.push(c);
            model.list_index = 0;
            model.list_scroll = 0;
            model.needs_redraw = true;
        }

        Message::SearchBackspace => {
            model.search_input.pop();
            model.needs_redraw = true;
        }

        Message::SearchClear => {
            model.search_input.clear();
            model.search_active = false;
            model.needs_redraw = true;
        }

        // === File sidebar ===
        Message::NextFile => {
            if !model.files.is_empty() && model.file_index < model.files.len() - 1 {
                model.file_index += 1;
                reset_diff_position(model);
            }
            model.needs_redraw = true;
        }

        Message::PrevFile => {
            if model.file_index > 0 {
                model.file_index -= 1;
                reset_diff_position(model);
            }
            model.needs_redraw = true;
        }

        Message::SidebarTop => {
            model.file_index = 0;
            reset_diff_position(model);
            model.needs_redraw = true;
        }

        Message::SidebarBottom => {
            if !model.files.is_empty() {
                model.file_index = model.files.len() - 1;
                reset_diff_position(model);
            }
            model.needs_redraw = true;
        }

        Message::SidebarSelect | Message::ToggleFocus => {
            model.focus = match model.focus {
                Focus::FileSidebar => Focus::DiffPane,
                Focus::DiffPane => Focus::FileSidebar,
                other => other,
            };
            model.needs_redraw = true;
        }

        Message::ToggleSidebar => {
            model.sidebar_visible = !model.sidebar_visible;
            model.needs_redraw = true;
        }

        Message::ToggleViewed => {
            if let Some(path) = model.selected_file().map(String::from) {
                if let Some(entry) = model.file_cache.get_mut(&path) {
                    entry.viewed = !entry.viewed;
                }
                model.pending_actions.push(PendingAction::ToggleViewed { path });
                model.needs_redraw = true;
            }
        }

        // === Diff pane ===
        Message::CursorUp => move_cursor(model, -1),
        Message::CursorDown => move_cursor(model, 1),
        Message::CursorTop => {
            model.diff_cursor = 0;
            model.diff_scroll = 0;
            model.needs_redraw = true;
        }
        Message::CursorBottom => {
            let rows = model.display_rows().len();
            if rows > 0 {
                model.diff_cursor = rows - 1;
                scroll_cursor_into_view(model, rows);
            }
            model.needs_redraw = true;
        }
        Message::ScrollHalfPageUp => {
            let half = (model.diff_visible_height() / 2) as isize;
            move_cursor(model, -half.max(1));
        }
        Message::ScrollHalfPageDown => {
            let half = (model.diff_visible_height() / 2) as isize;
            move_cursor(model, half.max(1));
        }
        Message::PageUp => {
            let page = model.diff_visible_height() as isize;
            move_cursor(model, -page.max(1));
        }
        Message::PageDown => {
            let page = model.diff_visible_height() as isize;
            move_cursor(model, page.max(1));
        }

        Message::NextThread => jump_to_thread(model, true),
        Message::PrevThread => jump_to_thread(model, false),

        Message::VisualToggle => {
            model.visual_mode = !model.visual_mode;
            if model.visual_mode {
                model.visual_anchor = model.diff_cursor;
            }
            model.needs_redraw = true;
        }

        // === Commenting ===
        Message::StartComment => start_comment(model),
        Message::StartReply => start_reply(model),
        Message::StartEditComment => start_edit(model),

        Message::CommentInput(c) => with_editor(model, |e| e.insert_char(c)),
        Message::CommentInputBackspace => with_editor(model, InlineEditor::backspace),
        Message::CommentNewline => with_editor(model, InlineEditor::newline),
        Message::CommentCursorUp => with_editor(model, InlineEditor::cursor_up),
        Message::CommentCursorDown => with_editor(model, InlineEditor::cursor_down),
        Message::CommentCursorLeft => with_editor(model, InlineEditor::cursor_left),
        Message::CommentCursorRight => with_editor(model, InlineEditor::cursor_right),
        Message::CommentHome => with_editor(model, |e| e.home()),
        Message::CommentEnd => with_editor(model, InlineEditor::end),
        Message::CommentWordLeft => with_editor(model, InlineEditor::word_left),
        Message::CommentWordRight => with_editor(model, InlineEditor::word_right),
        Message::CommentDeleteWord => with_editor(model, InlineEditor::delete_word),
        Message::CommentClearLine => with_editor(model, InlineEditor::clear_line),

        Message::SaveComment => save_comment(model),

        Message::CancelComment => {
            model.inline_editor = None;
            model.focus = Focus::DiffPane;
            model.needs_redraw = true;
        }

        // === Thread actions ===
        Message::ChangeThreadStatus => {
            let Some(thread) = model.thread_at_cursor() else {
                model.flash_message = Some("No thread under the cursor".to_string());
                return;
            };
            if thread.state == crate::reconcile::ThreadState::Optimistic {
                model.flash_message = Some("Thread is not confirmed yet".to_string());
                return;
            }
            model.palette_mode = PaletteMode::ThreadStatus {
                thread_id: thread.id.clone(),
            };
            model.palette_input.clear();
            model.palette_selection = 0;
            model.focus = Focus::CommandPalette;
            model.needs_redraw = true;
        }

        Message::ApplyThreadStatus { thread_id, status } => {
            model
                .pending_actions
                .push(PendingAction::ChangeStatus { thread_id, status });
            model.needs_redraw = true;
        }

        // === Command palette ===
        Message::ShowCommandPalette => {
            model.palette_mode = PaletteMode::Commands;
            model.palette_input.clear();
            model.palette_selection = 0;
            model.focus = Focus::CommandPalette;
            model.needs_redraw = true;
        }

        Message::HideCommandPalette => {
            close_palette(model);
        }

        Message::CommandPaletteNext => {
            let count = palette_item_count(model);
            if count > 0 {
                model.palette_selection = (model.palette_selection + 1) % count;
            }
            model.needs_redraw = true;
        }

        Message::CommandPalettePrev => {
            let count = palette_item_count(model);
            if count > 0 {
                model.palette_selection = model
                    .palette_selection
                    .checked_sub(1)
                    .unwrap_or(count - 1);
            }
            model.needs_redraw = true;
        }

        Message::CommandPaletteInput(c) => {
            model.palette_input.push(c);
            model.palette_selection = 0;
            model.needs_redraw = true;
        }

        Message::CommandPaletteBackspace => {
            model.palette_input.pop();
            model.palette_selection = 0;
            model.needs_redraw = true;
        }

        Message::CommandPaletteExecute => execute_palette(model),

        // === Theme ===
        Message::ShowThemePicker => {
            model.palette_mode = PaletteMode::Themes;
            model.palette_input.clear();
            model.palette_selection = 0;
            model.focus = Focus::CommandPalette;
            model.needs_redraw = true;
        }

        Message::ApplyTheme(name) => {
            if let Some(theme) = Theme::by_name(&name) {
                model.theme = theme;
                model.config.theme = Some(name);
                if let Err(err) = crate::config::save_ui_config(&model.config) {
                    tracing::warn!(%err, "failed to save config");
                }
            }
            close_palette(model);
        }

        // === PR actions ===
        Message::MergePr => {
            if let Some(pr) = &model.current_pr {
                model.pending_actions.push(PendingAction::MergePr(pr.number));
            } else {
                model.flash_message = Some("No pull request open".to_string());
            }
        }

        // === System ===
        Message::Resize { width, height } => {
            model.resize(width, height);
            model.needs_redraw = true;
        }

        Message::Quit => {
            model.should_quit = true;
        }

        Message::Noop => {}
    }
}

fn reset_diff_position(model: &mut Model) {
    model.diff_scroll = 0;
    model.diff_cursor = 0;
    model.visual_mode = false;
}

fn move_cursor(model: &mut Model, delta: isize) {
    let rows = model.display_rows().len();
    if rows == 0 {
        return;
    }
    let cursor = model.diff_cursor as isize + delta;
    model.diff_cursor = cursor.clamp(0, rows as isize - 1) as usize;
    scroll_cursor_into_view(model, rows);
    model.needs_redraw = true;
}

fn scroll_cursor_into_view(model: &mut Model, total_rows: usize) {
    let visible = model.diff_visible_height().max(1);
    if model.diff_cursor < model.diff_scroll {
        model.diff_scroll = model.diff_cursor;
    } else if model.diff_cursor >= model.diff_scroll + visible {
        model.diff_scroll = model.diff_cursor + 1 - visible;
    }
    model.diff_scroll = model.diff_scroll.min(total_rows.saturating_sub(1));
}

fn jump_to_thread(model: &mut Model, forward: bool) {
    let rows = model.display_rows();
    let starts: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, r)| matches!(r, DisplayRow::ThreadRow { row: 0, .. }))
        .map(|(i, _)| i)
        .collect();
    if starts.is_empty() {
        model.flash_message = Some("No threads in this file".to_string());
        return;
    }

    let target = if forward {
        starts
            .iter()
            .find(|&&i| i > model.diff_cursor)
            .or_else(|| starts.first())
    } else {
        starts
            .iter()
            .rev()
            .find(|&&i| i < model.diff_cursor)
            .or_else(|| starts.last())
    };

    if let Some(&row) = target {
        model.diff_cursor = row;
        scroll_cursor_into_view(model, rows.len());
        model.needs_redraw = true;
    }
}

fn with_editor(model: &mut Model, f: impl FnOnce(&mut InlineEditor)) {
    if let Some(editor) = &mut model.inline_editor {
        f(editor);
        editor.ensure_visible(crate::layout::COMMENT_EDITOR_ROWS);
        model.needs_redraw = true;
    }
}

/// Diff lines selected by the cursor (or the visual range).
fn selected_lines(model: &Model) -> Vec<DiffLine> {
    let rows = model.display_rows();
    let (lo, hi) = if model.visual_mode {
        (
            model.visual_anchor.min(model.diff_cursor),
            model.visual_anchor.max(model.diff_cursor),
        )
    } else {
        (model.diff_cursor, model.diff_cursor)
    };

    let Some(entry) = model.selected_entry() else {
        return Vec::new();
    };

    rows.iter()
        .take(hi + 1)
        .skip(lo)
        .filter_map(|row| match row {
            DisplayRow::Line {
                hunk_idx, line_idx, ..
            } => Some(entry.hunks[*hunk_idx].lines[*line_idx].clone()),
            _ => None,
        })
        .collect()
}

/// Resolve the side and line span of a selection, honoring the
/// commenting-range calculator.
fn selection_anchor(model: &Model) -> crate::error::Result<ThreadAnchor> {
    use crate::error::Error;

    let Some(path) = model.selected_file() else {
        return Err(Error::FileNotFound("(no file selected)".to_string()));
    };
    let Some(entry) = model.selected_entry() else {
        return Err(Error::FileNotFound(path.to_string()));
    };

    let lines = selected_lines(model);
    if lines.is_empty() {
        return Err(Error::NoMatchingHunk {
            file: path.to_string(),
            line: 0,
        });
    }

    // A selection of pure deletions comments on the base side; anything else
    // anchors on the modified side.
    let all_deleted = lines.iter().all(|l| l.kind == DiffChangeType::Delete);
    let (side, ranges, line_numbers): (DiffSide, _, Vec<u32>) = if all_deleted {
        (
            DiffSide::Base,
            &entry.base_ranges,
            lines.iter().filter_map(|l| l.old_line).collect(),
        )
    } else {
        (
            DiffSide::Modified,
            &entry.modified_ranges,
            lines.iter().filter_map(|l| l.new_line).collect(),
        )
    };

    let (Some(&start), Some(&end)) = (line_numbers.first(), line_numbers.last()) else {
        return Err(Error::NoMatchingHunk {
            file: path.to_string(),
            line: 0,
        });
    };

    let start_ok = ranges.iter().any(|r| r.contains(start.saturating_sub(1)));
    let end_ok = ranges.iter().any(|r| r.contains(end.saturating_sub(1)));
    if !start_ok || !end_ok {
        return Err(Error::NoMatchingHunk {
            file: path.to_string(),
            line: start,
        });
    }

    Ok(ThreadAnchor {
        file_path: path.to_string(),
        side,
        start_line: start,
        end_line: (end != start).then_some(end),
    })
}

fn start_comment(model: &mut Model) {
    let Some(pr) = model.current_pr.as_ref().map(|pr| pr.number) else {
        return;
    };
    match selection_anchor(model) {
        Ok(anchor) => {
            model.inline_editor = Some(InlineEditor::new(CommentRequest {
                pr,
                anchor,
                target: CommentTarget::NewThread,
                existing: Vec::new(),
            }));
            model.visual_mode = false;
            model.focus = Focus::Commenting;
            model.needs_redraw = true;
        }
        Err(err) => {
            model.flash_message = Some(err.to_string());
        }
    }
}

fn start_reply(model: &mut Model) {
    let Some(pr) = model.current_pr.as_ref().map(|pr| pr.number) else {
        return;
    };
    let Some(thread) = model.thread_at_cursor() else {
        model.flash_message = Some("No thread under the cursor".to_string());
        return;
    };
    if thread.state == crate::reconcile::ThreadState::Optimistic {
        model.flash_message = Some("Thread is not confirmed yet".to_string());
        return;
    }

    let request = CommentRequest {
        pr,
        anchor: thread.anchor.clone(),
        target: CommentTarget::Reply {
            thread_id: thread.id.clone(),
        },
        existing: thread
            .comments
            .iter()
            .map(|c| (c.author.clone(), c.body.clone()))
            .collect(),
    };
    model.inline_editor = Some(InlineEditor::new(request));
    model.focus = Focus::Commenting;
    model.needs_redraw = true;
}

fn start_edit(model: &mut Model) {
    let Some(pr) = model.current_pr.as_ref().map(|pr| pr.number) else {
        return;
    };
    let Some(thread) = model.thread_at_cursor() else {
        model.flash_message = Some("No thread under the cursor".to_string());
        return;
    };
    let Some(comment) = thread
        .comments
        .iter()
        .rev()
        .find(|c| c.phase == CommentPhase::Confirmed || c.phase == CommentPhase::Failed)
    else {
        model.flash_message = Some("No editable comment in this thread".to_string());
        return;
    };

    let request = CommentRequest {
        pr,
        anchor: thread.anchor.clone(),
        target: CommentTarget::Edit {
            thread_id: thread.id.clone(),
            comment_id: comment.id.clone(),
        },
        existing: Vec::new(),
    };
    let body = comment.body.clone();
    model.inline_editor = Some(InlineEditor::with_body(request, &body));
    model.focus = Focus::Commenting;
    model.needs_redraw = true;
}

/// Insert the optimistic entity and queue the provider call.
fn save_comment(model: &mut Model) {
    let Some(editor) = model.inline_editor.take() else {
        return;
    };
    let body = editor.body();
    if body.is_empty() {
        model.focus = Focus::DiffPane;
        model.needs_redraw = true;
        return;
    }
    let request = editor.request;

    let result = match &request.target {
        CommentTarget::NewThread => {
            let local_thread_id =
                model
                    .threads
                    .begin_thread(request.anchor.clone(), &model.user, &body);
            let local_comment_id = model
                .threads
                .get(&local_thread_id)
                .and_then(|t| t.comments.first())
                .map(|c| c.id.clone())
                .unwrap_or_default();
            Ok((local_thread_id, local_comment_id))
        }
        CommentTarget::Reply { thread_id } => model
            .threads
            .begin_reply(thread_id, &model.user, &body)
            .map(|comment_id| (thread_id.clone(), comment_id)),
        CommentTarget::Edit {
            thread_id,
            comment_id,
        } => model
            .threads
            .begin_edit(thread_id, comment_id, &body)
            .map(|()| (thread_id.clone(), comment_id.clone())),
    };

    match result {
        Ok((local_thread_id, local_comment_id)) => {
            model.pending_actions.push(PendingAction::SubmitComment {
                request,
                body,
                local_thread_id,
                local_comment_id,
            });
        }
        Err(err) => {
            model.flash_message = Some(err.to_string());
        }
    }

    model.focus = Focus::DiffPane;
    model.needs_redraw = true;
}

fn palette_item_count(model: &Model) -> usize {
    match &model.palette_mode {
        PaletteMode::Commands => filtered_commands(&model.palette_input).len(),
        PaletteMode::Themes => crate::theme::built_in_theme_names().len(),
        PaletteMode::ThreadStatus { thread_id } => model
            .threads
            .get(thread_id)
            .map_or(0, |t| t.status.legal_transitions().len()),
    }
}

fn close_palette(model: &mut Model) {
    model.palette_mode = PaletteMode::Commands;
    model.palette_input.clear();
    model.palette_selection = 0;
    if model.focus == Focus::CommandPalette {
        model.focus = match model.screen {
            Screen::PrList => Focus::PrList,
            Screen::PrDetail => Focus::DiffPane,
        };
    }
    model.needs_redraw = true;
}

fn execute_palette(model: &mut Model) {
    match model.palette_mode.clone() {
        PaletteMode::Commands => {
            let commands = filtered_commands(&model.palette_input);
            let Some(cmd) = commands.get(model.palette_selection) else {
                return;
            };
            let msg = command_id_to_message(cmd.id);
            close_palette(model);
            update(model, msg);
        }
        PaletteMode::Themes => {
            let names = crate::theme::built_in_theme_names();
            let Some(name) = names.get(model.palette_selection) else {
                return;
            };
            let msg = Message::ApplyTheme((*name).to_string());
            update(model, msg);
        }
        PaletteMode::ThreadStatus { thread_id } => {
            let Some(status) = model
                .threads
                .get(&thread_id)
                .map(|t| t.status.legal_transitions())
                .and_then(|choices| choices.get(model.palette_selection).copied())
            else {
                return;
            };
            close_palette(model);
            update(model, Message::ApplyThreadStatus { thread_id, status });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Comment, FileChange, PullRequestDetail, ThreadRecord, ThreadStatus};
    use crate::config::UiConfig;
    use crate::diff::{commenting_ranges, ParsedDiff};
    use crate::model::FileCacheEntry;

    fn detail(number: u64) -> PullRequestDetail {
        PullRequestDetail {
            number,
            title: "t".to_string(),
            description: None,
            author: "a".to_string(),
            state: "open".to_string(),
            base_ref: "main".to_string(),
            head_ref: "topic".to_string(),
            base_sha: "b".to_string(),
            head_sha: "h".to_string(),
            created_at: String::new(),
        }
    }

    fn model_with_file() -> Model {
        let mut model = Model::new(120, 40, UiConfig::default());
        model.screen = Screen::PrDetail;
        model.focus = Focus::DiffPane;
        model.current_pr = Some(detail(7));
        model.files = vec![FileChange {
            path: "src/lib.rs".to_string(),
            change_kind: "modified".to_string(),
        }];

        let diff = "--- a/src/lib.rs\n+++ b/src/lib.rs\n@@ -1,3 +1,4 @@\n ctx\n-old\n+new\n+more\n ctx2\n";
        let hunks = ParsedDiff::parse(diff).hunks;
        let base_ranges = commenting_ranges(&hunks, true);
        let modified_ranges = commenting_ranges(&hunks, false);
        model.file_cache.insert(
            "src/lib.rs".to_string(),
            FileCacheEntry {
                hunks,
                head_lines: vec![
                    "ctx".to_string(),
                    "new".to_string(),
                    "more".to_string(),
                    "ctx2".to_string(),
                ],
                highlighted: Vec::new(),
                base_ranges,
                modified_ranges,
                viewed: false,
                content_hash: None,
            },
        );
        model
    }

    #[test]
    fn comment_on_modified_line_is_optimistic() {
        let mut model = model_with_file();
        // Rows: header, ctx, -old, +new, +more, ctx2. Cursor on "+new".
        model.diff_cursor = 3;
        update(&mut model, Message::StartComment);
        assert_eq!(model.focus, Focus::Commenting);

        for c in "needs a test".chars() {
            update(&mut model, Message::CommentInput(c));
        }
        update(&mut model, Message::SaveComment);

        // The pending comment is visible before any provider call runs.
        let threads = model.threads.threads_for_file("src/lib.rs");
        assert_eq!(threads.len(), 1);
        assert!(threads[0].comments[0].is_pending());
        assert_eq!(threads[0].anchor.start_line, 2);
        assert_eq!(threads[0].anchor.side, DiffSide::Modified);
        assert!(matches!(
            model.pending_actions.last(),
            Some(PendingAction::SubmitComment { .. })
        ));
    }

    #[test]
    fn comment_on_deleted_line_uses_base_side() {
        let mut model = model_with_file();
        model.diff_cursor = 2; // "-old"
        update(&mut model, Message::StartComment);
        assert_eq!(model.focus, Focus::Commenting);
        let anchor = &model.inline_editor.as_ref().unwrap().request.anchor;
        assert_eq!(anchor.side, DiffSide::Base);
        assert_eq!(anchor.start_line, 2);
    }

    #[test]
    fn comment_outside_ranges_is_rejected() {
        let mut model = model_with_file();
        model.diff_cursor = 0; // hunk header row
        update(&mut model, Message::StartComment);
        assert_eq!(model.focus, Focus::DiffPane);
        assert!(model.flash_message.is_some());
        assert!(model.inline_editor.is_none());
    }

    #[test]
    fn empty_comment_is_discarded() {
        let mut model = model_with_file();
        model.diff_cursor = 3;
        update(&mut model, Message::StartComment);
        update(&mut model, Message::SaveComment);
        assert!(model.threads.threads_for_file("src/lib.rs").is_empty());
        assert!(model.pending_actions.is_empty());
    }

    #[test]
    fn status_picker_offers_legal_transitions() {
        let mut model = model_with_file();
        model.threads.load(vec![ThreadRecord {
            id: "T1".to_string(),
            anchor: crate::api::ThreadAnchor {
                file_path: "src/lib.rs".to_string(),
                side: DiffSide::Modified,
                start_line: 2,
                end_line: None,
            },
            status: ThreadStatus::Active,
            outdated: false,
            comments: vec![Comment {
                id: "C1".to_string(),
                author: "alice".to_string(),
                body: "hm".to_string(),
                created_at: String::new(),
            }],
        }]);

        // Jump onto the thread block and open the picker.
        update(&mut model, Message::NextThread);
        update(&mut model, Message::ChangeThreadStatus);
        assert!(matches!(
            model.palette_mode,
            PaletteMode::ThreadStatus { .. }
        ));

        // Select the second legal status and execute.
        update(&mut model, Message::CommandPaletteNext);
        update(&mut model, Message::CommandPaletteExecute);
        match model.pending_actions.last() {
            Some(PendingAction::ChangeStatus { thread_id, status }) => {
                assert_eq!(thread_id, "T1");
                // Active's legal transitions: Pending, Fixed, WontFix, Closed.
                assert_eq!(*status, ThreadStatus::Fixed);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn visual_selection_spans_multiple_lines() {
        let mut model = model_with_file();
        model.diff_cursor = 3; // "+new"
        update(&mut model, Message::VisualToggle);
        update(&mut model, Message::CursorDown); // "+more"
        update(&mut model, Message::StartComment);

        let anchor = &model.inline_editor.as_ref().unwrap().request.anchor;
        assert_eq!(anchor.start_line, 2);
        assert_eq!(anchor.end_line, Some(3));
        assert!(!model.visual_mode);
    }
}
