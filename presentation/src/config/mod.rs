//! Presentation-level configuration
//!
//! Configuration for REPL behavior.

/// REPL configuration for the presentation layer
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Echo the model reply above command results
    pub show_model_reply: bool,
    /// Path to history file; `None` uses the data directory default
    pub history_file: Option<String>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            show_model_reply: true,
            history_file: None,
        }
    }
}
