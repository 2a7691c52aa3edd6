//! Input mapping: events → messages.

use opentui::{Event, KeyCode, KeyModifiers};

use crate::message::Message;
use crate::model::{Focus, Model, Screen};

pub fn map_event_to_message(model: &Model, event: &Event) -> Message {
    match event {
        Event::Key(key) => {
            // Ctrl+C always quits.
            if key.modifiers.contains(KeyModifiers::CTRL) && key.code == KeyCode::Char('c') {
                return Message::Quit;
            }

            if model.focus == Focus::Commenting {
                return map_comment_key(key.code, key.modifiers);
            }

            if key.modifiers.contains(KeyModifiers::CTRL) && key.code == KeyCode::Char('p') {
                return Message::ShowCommandPalette;
            }

            if model.focus == Focus::CommandPalette {
                return map_palette_key(key.code, key.modifiers);
            }

            match model.screen {
                Screen::PrList => map_pr_list_key(key.code, model),
                Screen::PrDetail => map_pr_detail_key(model, key.code),
            }
        }
        Event::Resize(resize) => Message::Resize {
            width: resize.width.saturating_sub(2).max(1),
            height: resize.height,
        },
        _ => Message::Noop,
    }
}

fn map_pr_list_key(key: KeyCode, model: &Model) -> Message {
    // When search is active, route characters to the search input.
    if model.search_active {
        return match key {
            KeyCode::Esc => Message::SearchClear,
            KeyCode::Backspace => Message::SearchBackspace,
            KeyCode::Enter => select_current_pr(model),
            KeyCode::Char(c) => Message::SearchInput(c),
            _ => Message::Noop,
        };
    }

    match key {
        KeyCode::Char('q') => Message::Quit,
        KeyCode::Char('j') | KeyCode::Down => Message::ListDown,
        KeyCode::Char('k') | KeyCode::Up => Message::ListUp,
        KeyCode::Char('g') | KeyCode::Home => Message::ListTop,
        KeyCode::Char('G') | KeyCode::End => Message::ListBottom,
        KeyCode::Enter | KeyCode::Char('l') => select_current_pr(model),
        KeyCode::Char('s') => Message::CycleStatusFilter,
        KeyCode::Char('r') => Message::ReloadList,
        KeyCode::Char('/') => Message::SearchActivate,
        _ => Message::Noop,
    }
}

fn select_current_pr(model: &Model) -> Message {
    let prs = model.filtered_prs();
    prs.get(model.list_index)
        .map_or(Message::Noop, |pr| Message::SelectPr(pr.number))
}

fn map_pr_detail_key(model: &Model, key: KeyCode) -> Message {
    match model.focus {
        Focus::FileSidebar => match key {
            KeyCode::Char('q') => Message::Quit,
            KeyCode::Esc | KeyCode::Char('h') => Message::Back,
            KeyCode::Tab | KeyCode::Char('l') | KeyCode::Enter => Message::SidebarSelect,
            KeyCode::Char('j') | KeyCode::Down => Message::NextFile,
            KeyCode::Char('k') | KeyCode::Up => Message::PrevFile,
            KeyCode::Char('g') | KeyCode::Home => Message::SidebarTop,
            KeyCode::Char('G') | KeyCode::End => Message::SidebarBottom,
            KeyCode::Char('s') => Message::ToggleSidebar,
            KeyCode::Char('m') => Message::ToggleViewed,
            _ => Message::Noop,
        },
        Focus::DiffPane if model.visual_mode => match key {
            KeyCode::Char('j') | KeyCode::Down => Message::CursorDown,
            KeyCode::Char('k') | KeyCode::Up => Message::CursorUp,
            KeyCode::Char('g') | KeyCode::Home => Message::CursorTop,
            KeyCode::Char('G') | KeyCode::End => Message::CursorBottom,
            KeyCode::Char('a') => Message::StartComment,
            KeyCode::Char('V') | KeyCode::Esc => Message::VisualToggle,
            _ => Message::Noop,
        },
        Focus::DiffPane => match key {
            KeyCode::Char('q') => Message::Quit,
            KeyCode::Esc => Message::Back,
            KeyCode::Tab | KeyCode::Char('h') => Message::ToggleFocus,
            KeyCode::Char('j') | KeyCode::Down => Message::CursorDown,
            KeyCode::Char('k') | KeyCode::Up => Message::CursorUp,
            KeyCode::Char('g') | KeyCode::Home => Message::CursorTop,
            KeyCode::Char('G') | KeyCode::End => Message::CursorBottom,
            KeyCode::Char('u') => Message::ScrollHalfPageUp,
            KeyCode::Char('d') => Message::ScrollHalfPageDown,
            KeyCode::Char('b') | KeyCode::PageUp => Message::PageUp,
            KeyCode::Char('f') | KeyCode::PageDown => Message::PageDown,
            KeyCode::Char('n') => Message::NextThread,
            KeyCode::Char('p' | 'N') => Message::PrevThread,
            KeyCode::Char('a') => Message::StartComment,
            KeyCode::Char('r') => Message::StartReply,
            KeyCode::Char('e') => Message::StartEditComment,
            KeyCode::Char('t') => Message::ChangeThreadStatus,
            KeyCode::Char('m') => Message::ToggleViewed,
            KeyCode::Char('V') => Message::VisualToggle,
            KeyCode::Char('s') => Message::ToggleSidebar,
            KeyCode::Char('[') => Message::PrevFile,
            KeyCode::Char(']') => Message::NextFile,
            _ => Message::Noop,
        },
        _ => Message::Noop,
    }
}

fn map_comment_key(key: KeyCode, modifiers: KeyModifiers) -> Message {
    if modifiers.contains(KeyModifiers::CTRL) {
        return match key {
            KeyCode::Char('s') => Message::SaveComment,
            KeyCode::Char('w') => Message::CommentDeleteWord,
            KeyCode::Char('u') => Message::CommentClearLine,
            KeyCode::Char('a') => Message::CommentHome,
            KeyCode::Char('e') => Message::CommentEnd,
            KeyCode::Char('b') => Message::CommentCursorLeft,
            KeyCode::Char('f') => Message::CommentCursorRight,
            _ => Message::Noop,
        };
    }
    if modifiers.contains(KeyModifiers::ALT) {
        return match key {
            KeyCode::Char('b') => Message::CommentWordLeft,
            KeyCode::Char('f') => Message::CommentWordRight,
            _ => Message::Noop,
        };
    }
    match key {
        KeyCode::Esc => Message::CancelComment,
        KeyCode::Enter => Message::CommentNewline,
        KeyCode::Up => Message::CommentCursorUp,
        KeyCode::Down => Message::CommentCursorDown,
        KeyCode::Left => Message::CommentCursorLeft,
        KeyCode::Right => Message::CommentCursorRight,
        KeyCode::Home => Message::CommentHome,
        KeyCode::End => Message::CommentEnd,
        KeyCode::Backspace => Message::CommentInputBackspace,
        KeyCode::Char(c) => Message::CommentInput(c),
        _ => Message::Noop,
    }
}

fn map_palette_key(key: KeyCode, modifiers: KeyModifiers) -> Message {
    if modifiers.contains(KeyModifiers::CTRL) {
        return Message::Noop;
    }
    match key {
        KeyCode::Esc => Message::HideCommandPalette,
        KeyCode::Up => Message::CommandPalettePrev,
        KeyCode::Down => Message::CommandPaletteNext,
        KeyCode::Enter => Message::CommandPaletteExecute,
        KeyCode::Char(c) => Message::CommandPaletteInput(c),
        KeyCode::Backspace => Message::CommandPaletteBackspace,
        _ => Message::Noop,
    }
}
