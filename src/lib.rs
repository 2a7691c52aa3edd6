//! prdeck - terminal pull-request review client for GitHub and Azure DevOps
//!
//! Uses Elm Architecture (Model/Message/Update/View) with `opentui_rust`
//! rendering. The review core (diff model, position mapping, commenting
//! ranges, thread reconciliation) lives in `diff` and `reconcile`; the
//! provider CLIs are wrapped by `github` and `azure`.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]

pub mod api;
pub mod azure;
pub mod command;
pub mod config;
pub mod diff;
pub mod error;
pub mod github;
pub mod input;
pub mod layout;
pub mod logging;
pub mod message;
pub mod model;
pub mod reconcile;
pub mod storage;
pub mod syntax;
pub mod text;
pub mod theme;
pub mod update;
pub mod vcs;
pub mod view;

pub use api::PrClient;
pub use message::Message;
pub use model::{Focus, Model, Screen};
pub use reconcile::ThreadSet;
pub use syntax::{HighlightSpan, Highlighter};
pub use theme::Theme;
pub use update::update;
pub use view::view;
