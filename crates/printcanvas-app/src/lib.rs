//! PrintCanvas Application
//!
//! Command-line shell around the design store, plus the edit actions and
//! keyboard shortcuts an editing surface maps user gestures to.

mod actions;
mod app;
mod args;
mod shortcuts;

pub use actions::EditAction;
pub use app::{App, AppConfig, AppError, describe, format_table};
pub use args::{Cli, Command};
pub use shortcuts::{Shortcut, ShortcutRegistry};
