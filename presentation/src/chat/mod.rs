//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface and the console
//! prompt used to ask for missing insert details.

mod operator_prompt;
mod repl;

pub use operator_prompt::ConsoleOperatorPrompt;
pub use repl::{ChatRepl, ReplInput};
