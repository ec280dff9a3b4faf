//! Commands extracted from model replies.
//!
//! - [`Command`]: one of the three user-store operations
//! - [`CommandGrammar`]: ordered-pattern matcher producing at most one command
//! - [`ParseOutcome`]: why a reply did or did not produce a command

pub mod entities;
pub mod grammar;

pub use entities::Command;
pub use grammar::{CommandGrammar, ParseOutcome};
