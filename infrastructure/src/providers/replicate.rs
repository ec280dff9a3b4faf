//! Replicate adapter: `POST {base_url}/v1/models/{owner}/{name}/predictions`.
//!
//! The request asks the API to hold the connection until the prediction
//! finishes (`Prefer: wait`). A prediction that is still running when the
//! response comes back is polled through its `urls.get` link until it reaches
//! a terminal status or the configured timeout elapses.

use super::{ProviderSettings, check_status, map_request_error};
use async_trait::async_trait;
use dbassist_application::ports::llm_gateway::{GatewayError, LlmGateway};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Serialize)]
struct PredictionRequest<'a> {
    input: PredictionInput<'a>,
}

#[derive(Serialize)]
struct PredictionInput<'a> {
    prompt: &'a str,
    system_prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct Prediction {
    status: String,
    #[serde(default)]
    output: Value,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    urls: Option<PredictionUrls>,
}

#[derive(Deserialize)]
struct PredictionUrls {
    #[serde(default)]
    get: Option<String>,
}

impl Prediction {
    fn is_running(&self) -> bool {
        matches!(self.status.as_str(), "starting" | "processing")
    }

    /// Language models stream tokens, so `output` is usually an array of
    /// string fragments.
    fn text(&self) -> Option<String> {
        match &self.output {
            Value::String(text) => Some(text.clone()),
            Value::Array(parts) => Some(parts.iter().filter_map(Value::as_str).collect()),
            _ => None,
        }
    }
}

/// Replicate hosted models
pub struct ReplicateGateway {
    client: reqwest::Client,
    settings: ProviderSettings,
}

impl ReplicateGateway {
    pub fn new(client: reqwest::Client, settings: ProviderSettings) -> Self {
        Self { client, settings }
    }

    async fn read_prediction(&self, response: reqwest::Response) -> Result<Prediction, GatewayError> {
        let response = check_status(response, &self.settings.model).await?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }

    async fn wait_for(
        &self,
        mut prediction: Prediction,
        api_key: &str,
    ) -> Result<Prediction, GatewayError> {
        let deadline = Instant::now() + self.settings.timeout;

        while prediction.is_running() {
            let url = prediction
                .urls
                .as_ref()
                .and_then(|urls| urls.get.clone())
                .ok_or_else(|| {
                    GatewayError::InvalidResponse("running prediction has no poll URL".to_string())
                })?;
            if Instant::now() + POLL_INTERVAL > deadline {
                return Err(GatewayError::Timeout);
            }
            tokio::time::sleep(POLL_INTERVAL).await;

            trace!("Replicate poll: {} ({})", url, prediction.status);
            let response = self
                .client
                .get(&url)
                .bearer_auth(api_key)
                .send()
                .await
                .map_err(map_request_error)?;
            prediction = self.read_prediction(response).await?;
        }

        Ok(prediction)
    }
}

#[async_trait]
impl LlmGateway for ReplicateGateway {
    fn model(&self) -> &str {
        &self.settings.model
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, GatewayError> {
        let api_key = self.settings.require_api_key()?;
        let url = format!(
            "{}/v1/models/{}/predictions",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        );
        debug!("Replicate request: {}", url);

        let body = PredictionRequest {
            input: PredictionInput {
                prompt: user,
                system_prompt: system,
                temperature: self.settings.temperature,
                max_tokens: self.settings.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header("Prefer", "wait")
            .json(&body)
            .send()
            .await
            .map_err(map_request_error)?;
        let prediction = self.read_prediction(response).await?;
        let prediction = self.wait_for(prediction, api_key).await?;

        if prediction.status != "succeeded" {
            let detail = match &prediction.error {
                Some(Value::String(message)) => message.clone(),
                Some(other) if !other.is_null() => other.to_string(),
                _ => prediction.status.clone(),
            };
            return Err(GatewayError::RequestFailed(format!(
                "prediction {}: {}",
                prediction.status, detail
            )));
        }

        prediction.text().ok_or_else(|| {
            GatewayError::InvalidResponse("prediction has no text output".to_string())
        })
    }
}
