//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod grammar;
mod llm;
mod logging;
mod repl;
mod session;
mod store;

pub use grammar::FileGrammarConfig;
pub use llm::FileLlmConfig;
pub use logging::FileLoggingConfig;
pub use repl::FileReplConfig;
pub use session::FileSessionConfig;
pub use store::FileStoreConfig;

use dbassist_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Model provider settings
    pub llm: FileLlmConfig,
    /// Tool server launch and timeouts
    pub session: FileSessionConfig,
    /// SQLite database settings
    pub store: FileStoreConfig,
    /// Command grammar settings
    pub grammar: FileGrammarConfig,
    /// REPL settings
    pub repl: FileReplConfig,
    /// Conversation log settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.llm.validate());
        issues.extend(self.session.validate());
        issues.extend(self.store.validate());
        issues
    }

    /// Whether any issue makes the configuration unusable
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(ConfigIssue::is_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbassist_domain::ConfigIssueCode;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[llm]
provider = "anthropic"
model = "claude-3-5-haiku-latest"
temperature = 0.0
max_tokens = 256

[session]
command = ["dbassist", "serve"]
invoke_timeout_secs = 5

[store]
path = "/var/lib/dbassist/users.db"
users_table = "people"

[grammar]
interactive_insert = false

[repl]
show_model_reply = false
history_file = "/tmp/history.txt"

[logging]
conversation_log = "/tmp/conversation.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.max_tokens, 256);
        assert_eq!(config.session.invoke_timeout_secs, 5);
        assert_eq!(config.session.handshake_timeout_secs, 10);
        assert_eq!(config.store.users_table, "people");
        assert!(!config.grammar.interactive_insert);
        assert!(!config.repl.show_model_reply);
        assert_eq!(
            config.logging.conversation_log.as_deref(),
            Some("/tmp/conversation.jsonl")
        );
    }

    #[test]
    fn test_deserialize_partial_config_keeps_defaults() {
        let config: FileConfig = toml::from_str("[llm]\nmodel = \"llama3\"\n").unwrap();
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.store, FileStoreConfig::default());
        assert!(config.grammar.interactive_insert);
    }

    #[test]
    fn test_validate_collects_all_sections() {
        let mut config = FileConfig::default();
        config.llm.provider = "nope".to_string();
        config.session.invoke_timeout_secs = 0;
        config.store.users_table = "bad-name".to_string();

        let issues = config.validate();
        let codes: Vec<ConfigIssueCode> = issues.iter().map(|i| i.code).collect();
        assert!(codes.contains(&ConfigIssueCode::UnknownProvider));
        assert!(codes.contains(&ConfigIssueCode::ZeroTimeout));
        assert!(codes.contains(&ConfigIssueCode::InvalidTableName));
        assert!(FileConfig::has_errors(&issues));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(FileConfig::default().validate().is_empty());
    }
}
