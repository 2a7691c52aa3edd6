//! Message types for the Elm architecture.

use crate::api::ThreadStatus;

/// All user actions and system events.
#[derive(Debug, Clone)]
pub enum Message {
    // === Navigation ===
    /// Open a pull request from the list
    SelectPr(u64),
    /// Go back to the previous screen
    Back,

    // === PR list ===
    ListUp,
    ListDown,
    ListTop,
    ListBottom,
    /// Cycle the list status filter (All → Open → Closed → All)
    CycleStatusFilter,
    SearchActivate,
    SearchInput(char),
    SearchBackspace,
    SearchClear,
    /// Re-fetch the PR list
    ReloadList,

    // === File sidebar ===
    NextFile,
    PrevFile,
    SidebarTop,
    SidebarBottom,
    /// Move focus into the diff pane
    SidebarSelect,
    ToggleSidebar,
    /// Toggle the viewed flag of the selected file
    ToggleViewed,

    // === Diff pane ===
    CursorUp,
    CursorDown,
    CursorTop,
    CursorBottom,
    ScrollHalfPageUp,
    ScrollHalfPageDown,
    PageUp,
    PageDown,
    /// Jump the cursor to the next thread block
    NextThread,
    /// Jump the cursor to the previous thread block
    PrevThread,
    /// Toggle visual line selection (for multi-line comments)
    VisualToggle,

    // === Focus ===
    ToggleFocus,

    // === Commenting ===
    /// Open the comment editor for the cursor line or visual range
    StartComment,
    /// Open the comment editor as a reply to the thread under the cursor
    StartReply,
    /// Open the comment editor to edit the last comment of the thread under
    /// the cursor
    StartEditComment,
    CommentInput(char),
    CommentInputBackspace,
    CommentNewline,
    CommentCursorUp,
    CommentCursorDown,
    CommentCursorLeft,
    CommentCursorRight,
    CommentHome,
    CommentEnd,
    CommentWordLeft,
    CommentWordRight,
    CommentDeleteWord,
    CommentClearLine,
    SaveComment,
    CancelComment,

    // === Thread actions ===
    /// Open the status picker for the thread under the cursor
    ChangeThreadStatus,
    /// Picker result: move a thread to a status
    ApplyThreadStatus { thread_id: String, status: ThreadStatus },

    // === Command palette ===
    ShowCommandPalette,
    HideCommandPalette,
    CommandPaletteNext,
    CommandPalettePrev,
    CommandPaletteInput(char),
    CommandPaletteBackspace,
    CommandPaletteExecute,

    // === Theme ===
    ShowThemePicker,
    ApplyTheme(String),

    // === PR actions ===
    MergePr,

    // === System ===
    Resize { width: u16, height: u16 },
    /// Request to quit
    Quit,
    /// No-op (ignore event)
    Noop,
}
