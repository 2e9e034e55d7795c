use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::LlmSettings;

/// Why a chat call produced no usable answer.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("API call to {endpoint} failed: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Ollama returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to decode Ollama's top-level JSON response: {body}")]
    Decode { body: String },

    #[error("Unexpected Ollama response structure: {body}")]
    Shape { body: String },
}

impl ClientError {
    /// Operator-facing suggestion for the common failure modes.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ClientError::Network { source, .. } if source.is_timeout() => Some(
                "The model took too long to answer. Try a smaller model or raise SHAI_TIMEOUT_SECS.",
            ),
            ClientError::Network { .. } => {
                Some("Is Ollama running? Start it with `ollama serve` or check OLLAMA_BASE_URL.")
            }
            ClientError::Status { status, .. } if *status == StatusCode::NOT_FOUND => {
                Some("The model may not be installed. Pull it with `ollama pull <model>`.")
            }
            ClientError::Status { status, .. } if status.is_server_error() => {
                Some("Ollama reported an internal error. Check the server log and try again.")
            }
            _ => None,
        }
    }
}

/// Anything that can turn a transcript into the model's raw reply text.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, ClientError>;
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: Client,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl OllamaClient {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint: settings.chat_endpoint(),
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, messages: &[ChatMessage]) -> Result<String, ClientError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            format: "json",
            options: ChatOptions {
                temperature: self.temperature,
            },
        };

        debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            messages = messages.len(),
            "sending chat request"
        );

        let network = |source: reqwest::Error| ClientError::Network {
            endpoint: self.endpoint.clone(),
            source,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        let body = response.text().await.map_err(network)?;

        if !status.is_success() {
            warn!(%status, "chat endpoint returned an error status");
            return Err(ClientError::Status { status, body });
        }

        debug!(bytes = body.len(), "received chat response");
        extract_content(&body)
    }
}

#[async_trait]
impl ChatBackend for OllamaClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, ClientError> {
        self.send(messages).await
    }
}

/// Pull the assistant text out of the response envelope.
///
/// Some servers answer with the requested JSON object directly instead of a
/// chat envelope; that object is passed through re-serialised.
fn extract_content(body: &str) -> Result<String, ClientError> {
    let value: Value = serde_json::from_str(body).map_err(|_| ClientError::Decode {
        body: body.to_string(),
    })?;

    if let Ok(envelope) = serde_json::from_value::<ChatResponse>(value.clone()) {
        return Ok(envelope.message.content);
    }

    if value.as_object().is_some_and(|obj| obj.contains_key("commands")) {
        return Ok(value.to_string());
    }

    Err(ClientError::Shape {
        body: body.to_string(),
    })
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    format: &'static str,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatMessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatMessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatMessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatMessageRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMessageRole {
    System,
    User,
    Assistant,
}
