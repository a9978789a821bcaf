use crate::error::ProviderError;
use crate::openai_types::{OpenAIBatchResponse, OpenAIMessage, OpenAIPayload, ResponseFormat};

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error};

/// A text-completion service that answers with a single JSON object.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send one system instruction and one user message; return the raw content of the reply.
    async fn complete_json(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, ProviderError>;
}

/// Settings for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Option<Duration>,
}

/// Chat-completions client (Groq by default) with the JSON-object response format pinned on
/// every request.
#[derive(Debug, Clone)]
pub struct ChatCompletionsProvider {
    http_client: reqwest::Client,
    config: ProviderConfig,
}

impl ChatCompletionsProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(ProviderError::ClientBuild)?;
        Ok(Self {
            http_client,
            config,
        })
    }
}

#[async_trait]
impl CompletionProvider for ChatCompletionsProvider {
    async fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ProviderError> {
        let payload = OpenAIPayload {
            model: self.config.model.clone(),
            messages: vec![
                OpenAIMessage::system(system_prompt),
                OpenAIMessage::user(user_prompt),
            ],
            temperature: Some(self.config.temperature),
            response_format: Some(ResponseFormat::JsonObject),
        };
        let resp = self
            .http_client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error=%e, "failed to send request to extraction api");
                ProviderError::Request(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let resp = resp.json::<OpenAIBatchResponse>().await.map_err(|e| {
            error!(error=%e, "failed to deserialize extraction api response");
            ProviderError::Deserialize(e)
        })?;
        debug!(model=%resp.model, usage=?resp.usage, "extraction api response");

        resp.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(ProviderError::EmptyResponse)
    }
}
