//! HTTP client for the remote text-generation capability.
//!
//! One request per query, no retries; retry policy belongs to whoever drives
//! the session. The [`TextGenerator`] trait is the seam the orchestration
//! layer consumes, so tests can substitute a scripted backend.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    GroundingMetadata, Tool,
};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "GEMINI_MODEL";

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("unexpected status code {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("backend returned no text candidates")]
    EmptyReply,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Reads the credential and optional model override from the process
    /// environment. A missing or blank credential fails fast, before any
    /// request can be issued.
    pub fn from_env() -> Result<Self, ClientError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or(ClientError::MissingApiKey)?;
        let model = std::env::var(MODEL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key,
            model,
            base_url: BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        })
    }
}

/// One outbound exchange, independent of the backend wire format.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub system_instruction: String,
    pub user_text: String,
    pub temperature: f32,
    pub web_search: bool,
}

/// Raw reply: generated text plus whatever grounding the backend attached.
#[derive(Debug, Clone)]
pub struct GenerateReply {
    pub text: String,
    pub grounding: Option<GroundingMetadata>,
}

/// Remote text-generation capability consumed by the orchestration layer.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateReply, ClientError>;
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    config: ClientConfig,
}

impl GeminiClient {
    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Self::with_config(ClientConfig::from_env()?))
    }

    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        let http = Client::builder()
            .user_agent("TakhrijHadis/1.0")
            .timeout(config.timeout)
            .gzip(true)
            .build()
            .expect("failed to build reqwest client");

        Self { http, config }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    fn build_body(request: &GenerateRequest) -> GenerateContentRequest {
        let tools = if request.web_search {
            vec![Tool::web_search()]
        } else {
            Vec::new()
        };

        GenerateContentRequest {
            system_instruction: Some(Content::system(request.system_instruction.clone())),
            contents: vec![Content::user(request.user_text.clone())],
            generation_config: Some(GenerationConfig {
                temperature: request.temperature,
            }),
            tools,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(name = "gemini_client.generate", skip_all, fields(model = %self.config.model))]
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateReply, ClientError> {
        let url = self.endpoint();
        let body = Self::build_body(&request);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| ClientError::Http(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = %status, "generateContent request failed");
            return Err(ClientError::Status { status, message });
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| ClientError::Http(err.to_string()))?;

        let Some(candidate) = payload.candidates.into_iter().next() else {
            return Err(ClientError::EmptyReply);
        };

        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ClientError::EmptyReply);
        }

        debug!(
            chars = text.len(),
            grounded = candidate.grounding_metadata.is_some(),
            "generateContent reply received"
        );

        Ok(GenerateReply {
            text,
            grounding: candidate.grounding_metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> GenerateRequest {
        GenerateRequest {
            system_instruction: "anda pakar rujuk hadis".to_string(),
            user_text: "semak: kebersihan sebahagian dari iman".to_string(),
            temperature: 0.3,
            web_search: true,
        }
    }

    #[test]
    fn body_carries_search_tool_when_enabled() {
        let body = GeminiClient::build_body(&sample_request());
        assert_eq!(body.tools.len(), 1);
        assert!(body.tools[0].google_search.is_some());
    }

    #[test]
    fn body_omits_tools_when_search_disabled() {
        let mut request = sample_request();
        request.web_search = false;
        let body = GeminiClient::build_body(&request);
        assert!(body.tools.is_empty());

        let value = serde_json::to_value(&body).expect("body serializes");
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn endpoint_targets_configured_model() {
        let client = GeminiClient::with_config(ClientConfig {
            api_key: "test-key".to_string(),
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://example.test/v1beta".to_string(),
            timeout: Duration::from_secs(5),
        });
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
