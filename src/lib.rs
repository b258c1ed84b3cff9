//! plotedit - layout editor core for plotting scripts
//!
//! Elements of a figure are moved, resized and restyled interactively; every
//! edit is kept in a change ledger and written back into a marked block of the
//! user's script, so re-running the script reproduces the layout. The crate
//! follows the Elm Architecture pattern: [`update::update`] applies a [`Msg`]
//! to the [`AppModel`] and returns the notifications for the front end.

pub mod commands;
pub mod config;
pub mod config_paths;
pub mod debug_dump;
pub mod error;
pub mod history;
pub mod ledger;
pub mod manipulate;
pub mod messages;
pub mod model;
pub mod reference;
pub mod tracing;
pub mod update;
pub mod util;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::EditorConfig;
pub use error::{EditError, Result};
pub use ledger::ChangeLedger;
pub use messages::Msg;
pub use model::{AppModel, ElementId, ElementTree};
