//! Command definitions for the command palette.

use crate::message::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandId {
    Quit,
    PickTheme,
    ToggleSidebar,
    ToggleViewed,
    ChangeThreadStatus,
    MergePr,
    ReloadList,
}

#[derive(Clone)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub id: CommandId,
}

#[must_use]
pub fn get_commands() -> Vec<CommandSpec> {
    vec![
        CommandSpec {
            name: "quit",
            description: "Quit the application",
            id: CommandId::Quit,
        },
        CommandSpec {
            name: "theme: pick",
            description: "Choose a color theme",
            id: CommandId::PickTheme,
        },
        CommandSpec {
            name: "sidebar: toggle",
            description: "Show or hide the file sidebar",
            id: CommandId::ToggleSidebar,
        },
        CommandSpec {
            name: "file: toggle viewed",
            description: "Mark the selected file viewed or unviewed",
            id: CommandId::ToggleViewed,
        },
        CommandSpec {
            name: "thread: change status",
            description: "Change the status of the thread under the cursor",
            id: CommandId::ChangeThreadStatus,
        },
        CommandSpec {
            name: "pr: merge",
            description: "Merge the open pull request",
            id: CommandId::MergePr,
        },
        CommandSpec {
            name: "pr: reload list",
            description: "Re-fetch the pull request list",
            id: CommandId::ReloadList,
        },
    ]
}

#[must_use]
pub fn command_id_to_message(id: CommandId) -> Message {
    match id {
        CommandId::Quit => Message::Quit,
        CommandId::PickTheme => Message::ShowThemePicker,
        CommandId::ToggleSidebar => Message::ToggleSidebar,
        CommandId::ToggleViewed => Message::ToggleViewed,
        CommandId::ChangeThreadStatus => Message::ChangeThreadStatus,
        CommandId::MergePr => Message::MergePr,
        CommandId::ReloadList => Message::ReloadList,
    }
}

/// Commands matching the palette's search input.
#[must_use]
pub fn filtered_commands(query: &str) -> Vec<CommandSpec> {
    let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    get_commands()
        .into_iter()
        .filter(|cmd| {
            terms.is_empty()
                || terms.iter().all(|term| {
                    cmd.name.to_lowercase().contains(term.as_str())
                        || cmd.description.to_lowercase().contains(term.as_str())
                })
        })
        .collect()
}
