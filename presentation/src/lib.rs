//! Presentation layer for dbassist
//!
//! This crate contains CLI definitions, the console formatter,
//! the operator prompt and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;

// Re-export commonly used types
pub use chat::{ChatRepl, ConsoleOperatorPrompt, ReplInput};
pub use cli::commands::{Cli, Command, OutputFormat};
pub use config::ReplConfig;
pub use output::console::ConsoleFormatter;
