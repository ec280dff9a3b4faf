//! Model provider adapters implementing [`LlmGateway`].
//!
//! | Provider | Endpoint | Auth |
//! |----------|----------|------|
//! | `ollama` | `POST {base_url}/api/generate` | none |
//! | `openai` | `POST {base_url}/chat/completions` | bearer token |
//! | `anthropic` | `POST {base_url}/v1/messages` | `x-api-key` |
//! | `gemini` | `POST {base_url}/v1beta/models/{model}:generateContent` | `x-goog-api-key` |
//! | `replicate` | `POST {base_url}/v1/models/{model}/predictions` | bearer token |
//!
//! The adapter is chosen once at startup by [`build_gateway`] from the
//! `[llm]` config section.

pub mod anthropic;
pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod replicate;

pub use anthropic::AnthropicGateway;
pub use gemini::GeminiGateway;
pub use ollama::OllamaGateway;
pub use openai::OpenAiGateway;
pub use replicate::ReplicateGateway;

use crate::config::FileLlmConfig;
use dbassist_application::ports::llm_gateway::{GatewayError, LlmGateway};
use dbassist_domain::ProviderKind;
use std::sync::Arc;
use std::time::Duration;

/// Resolved settings shared by all adapters
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub model: String,
    pub base_url: String,
    /// Name of the variable the key was read from (for error messages)
    pub api_key_env: Option<String>,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl ProviderSettings {
    /// Resolve settings from the `[llm]` section, reading the API key from
    /// the environment.
    pub fn from_config(config: &FileLlmConfig, kind: ProviderKind) -> Self {
        let api_key_env = config.api_key_env_for(kind);
        let api_key = api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.trim().is_empty());

        Self {
            kind,
            model: config.model_for(kind),
            base_url: config.base_url_for(kind),
            api_key_env,
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// The API key, or `MissingApiKey` naming the variable to set
    pub(crate) fn require_api_key(&self) -> Result<&str, GatewayError> {
        self.api_key.as_deref().ok_or_else(|| {
            GatewayError::MissingApiKey(
                self.api_key_env
                    .clone()
                    .unwrap_or_else(|| format!("{}_API_KEY", self.kind.as_str().to_uppercase())),
            )
        })
    }

    #[cfg(test)]
    pub(crate) fn for_test(kind: ProviderKind, base_url: &str) -> Self {
        Self {
            kind,
            model: kind.default_model().to_string(),
            base_url: base_url.to_string(),
            api_key_env: kind.default_api_key_env().map(str::to_string),
            api_key: None,
            temperature: 0.1,
            max_tokens: 64,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Build the configured model gateway.
pub fn build_gateway(config: &FileLlmConfig) -> Result<Arc<dyn LlmGateway>, GatewayError> {
    let kind: ProviderKind = config
        .provider
        .parse()
        .map_err(|e: dbassist_domain::DomainError| GatewayError::ModelNotAvailable(e.to_string()))?;
    let settings = ProviderSettings::from_config(config, kind);

    let client = reqwest::Client::builder()
        .timeout(settings.timeout)
        .build()
        .map_err(|e| GatewayError::ConnectionError(format!("Failed to create HTTP client: {}", e)))?;

    tracing::info!(
        provider = %kind,
        model = %settings.model,
        base_url = %settings.base_url,
        "Model gateway configured"
    );

    Ok(match kind {
        ProviderKind::Ollama => Arc::new(OllamaGateway::new(client, settings)),
        ProviderKind::OpenAi => Arc::new(OpenAiGateway::new(client, settings)),
        ProviderKind::Anthropic => Arc::new(AnthropicGateway::new(client, settings)),
        ProviderKind::Gemini => Arc::new(GeminiGateway::new(client, settings)),
        ProviderKind::Replicate => Arc::new(ReplicateGateway::new(client, settings)),
    })
}

/// Classify a transport-level reqwest failure.
pub(crate) fn map_request_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

/// Turn non-2xx responses into gateway errors.
pub(crate) async fn check_status(
    response: reqwest::Response,
    model: &str,
) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!("Provider returned {}: {}", status, body);

    if status == reqwest::StatusCode::NOT_FOUND {
        Err(GatewayError::ModelNotAvailable(format!("{} ({})", model, body.trim())))
    } else {
        Err(GatewayError::RequestFailed(format!(
            "HTTP {}: {}",
            status,
            body.trim()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_default_config() {
        let settings = ProviderSettings::from_config(&FileLlmConfig::default(), ProviderKind::Ollama);
        assert_eq!(settings.model, "mistral");
        assert_eq!(settings.base_url, "http://127.0.0.1:11434");
        assert!(settings.api_key_env.is_none());
        assert!((settings.temperature - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_build_gateway_for_each_provider() {
        for provider in ["ollama", "openai", "anthropic", "claude", "gemini", "replicate"] {
            let config = FileLlmConfig {
                provider: provider.to_string(),
                model: "m".to_string(),
                ..Default::default()
            };
            let gateway = build_gateway(&config).unwrap();
            assert_eq!(gateway.model(), "m");
        }
    }

    #[test]
    fn test_build_gateway_uses_provider_default_model() {
        let config = FileLlmConfig {
            provider: "gemini".to_string(),
            ..Default::default()
        };
        assert_eq!(build_gateway(&config).unwrap().model(), "gemini-2.0-flash");
    }

    #[test]
    fn test_build_gateway_rejects_unknown_provider() {
        let config = FileLlmConfig {
            provider: "palm".to_string(),
            ..Default::default()
        };
        assert!(build_gateway(&config).is_err());
    }
}
