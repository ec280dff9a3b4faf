//! Command grammar configuration from TOML (`[grammar]` section)

use serde::{Deserialize, Serialize};

/// Raw command grammar configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGrammarConfig {
    /// Ask the operator for name/email when an insert reply carries none
    pub interactive_insert: bool,
}

impl Default for FileGrammarConfig {
    fn default() -> Self {
        Self {
            interactive_insert: true,
        }
    }
}
