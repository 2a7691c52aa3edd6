//! View rendering.

mod command_palette;
mod comment_editor;
mod components;
mod diff_pane;
mod pr_detail;
mod pr_list;

pub use components::Rect;

use opentui::OptimizedBuffer;

use crate::model::{Model, Screen};

/// Render the current model state to the buffer.
pub fn view(model: &Model, buffer: &mut OptimizedBuffer) {
    match model.screen {
        Screen::PrList => pr_list::view(model, buffer),
        Screen::PrDetail => pr_detail::view(model, buffer),
    }

    comment_editor::view(model, buffer);
    command_palette::view(model, buffer);
}
