//! Model provider configuration from TOML (`[llm]` section)

use dbassist_domain::{ConfigIssue, ConfigIssueCode, ProviderKind};
use serde::{Deserialize, Serialize};

/// Raw model provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLlmConfig {
    /// Provider name: "ollama", "openai", "anthropic", "gemini" or "replicate"
    pub provider: String,
    /// Model identifier passed to the provider; empty means the provider's
    /// default model
    pub model: String,
    /// Override the provider's default endpoint
    pub base_url: Option<String>,
    /// Environment variable holding the API key (provider default if unset)
    pub api_key_env: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FileLlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default().as_str().to_string(),
            model: String::new(),
            base_url: None,
            api_key_env: None,
            temperature: 0.1,
            max_tokens: 512,
            timeout_secs: 60,
        }
    }
}

impl FileLlmConfig {
    /// Parse the provider name, falling back to the default provider.
    pub fn parse_provider(&self) -> (ProviderKind, Vec<ConfigIssue>) {
        match self.provider.parse::<ProviderKind>() {
            Ok(kind) => (kind, vec![]),
            Err(_) => {
                let issue = ConfigIssue::error(
                    ConfigIssueCode::UnknownProvider,
                    format!(
                        "llm.provider: unknown value '{}' (expected ollama, openai, anthropic, gemini or replicate)",
                        self.provider
                    ),
                );
                (ProviderKind::default(), vec![issue])
            }
        }
    }

    /// Configured model, or the provider's default
    pub fn model_for(&self, kind: ProviderKind) -> String {
        match self.model.trim() {
            "" => kind.default_model().to_string(),
            model => model.to_string(),
        }
    }

    /// Endpoint for the given provider
    pub fn base_url_for(&self, kind: ProviderKind) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| kind.default_base_url().to_string())
    }

    /// API key variable for the given provider, if it needs one
    pub fn api_key_env_for(&self, kind: ProviderKind) -> Option<String> {
        self.api_key_env
            .clone()
            .or_else(|| kind.default_api_key_env().map(str::to_string))
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let (kind, mut issues) = self.parse_provider();

        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "llm.timeout_secs cannot be 0",
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::TemperatureOutOfRange,
                format!(
                    "llm.temperature: {} is outside 0.0..=2.0",
                    self.temperature
                ),
            ));
        }

        if issues.is_empty()
            && let Some(var) = self.api_key_env_for(kind)
            && std::env::var(&var).is_err()
        {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::MissingApiKey,
                format!("{} is not set; requests to {} will fail", var, kind),
            ));
        }

        issues
    }
}
