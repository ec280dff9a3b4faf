//! Ollama adapter: `POST {base_url}/api/generate` with streaming disabled.

use super::{ProviderSettings, check_status, map_request_error};
use async_trait::async_trait;
use dbassist_application::ports::llm_gateway::{GatewayError, LlmGateway};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Local Ollama server
pub struct OllamaGateway {
    client: reqwest::Client,
    settings: ProviderSettings,
}

impl OllamaGateway {
    pub fn new(client: reqwest::Client, settings: ProviderSettings) -> Self {
        Self { client, settings }
    }
}

#[async_trait]
impl LlmGateway for OllamaGateway {
    fn model(&self) -> &str {
        &self.settings.model
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, GatewayError> {
        let url = format!("{}/api/generate", self.settings.base_url.trim_end_matches('/'));
        debug!("Ollama request: {} model={}", url, self.settings.model);

        let body = GenerateRequest {
            model: &self.settings.model,
            system,
            prompt: user,
            stream: false,
            options: GenerateOptions {
                temperature: self.settings.temperature,
                num_predict: self.settings.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_request_error)?;
        let response = check_status(response, &self.settings.model).await?;

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        Ok(parsed.response)
    }
}
