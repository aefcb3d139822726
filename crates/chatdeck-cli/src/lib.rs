// Library interface for chatdeck-cli
// This allows integration tests to access internal modules

// commands.rs is also declared in main.rs, so the same file is referenced
// through a path attribute.

#[path = "commands.rs"]
pub mod commands;

pub use commands::{handle_command, CommandResult};
