//! OpenRouter API Provider
//!
//! Implements the AIProvider trait for the OpenAI-compatible
//! `/chat/completions` endpoint. Responses are parsed into typed envelopes;
//! any shape mismatch is reported as `MalformedResponse`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::{AIProvider, ChatCompletion, ChatRequest, ProviderError};

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

#[derive(Debug, Clone)]
pub struct OpenRouterProvider {
    client: Client,
    config: ProviderConfig,
}

impl OpenRouterProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ProviderError::Transport(format!("failed to build HTTP client: {err}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            CHAT_COMPLETIONS_PATH
        )
    }

    fn transport_error(&self, err: &reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.config.timeout)
        } else {
            ProviderError::Transport(err.to_string())
        }
    }

    async fn parse_error_response(status: StatusCode, response: reqwest::Response) -> ProviderError {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unable to read body>".to_string());

        let parsed = serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .and_then(|envelope| envelope.error.message)
            .unwrap_or(body);

        ProviderError::HttpStatus {
            status: status.as_u16(),
            body: parsed,
        }
    }
}

#[async_trait]
impl AIProvider for OpenRouterProvider {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    async fn complete(&self, req: &ChatRequest) -> Result<ChatCompletion, ProviderError> {
        let payload = WireRequest {
            request: req,
            stream: false,
        };

        let mut builder = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&payload);
        if let Some(title) = &self.config.app_title {
            builder = builder.header("X-Title", title);
        }
        if let Some(referer) = &self.config.referer {
            builder = builder.header("HTTP-Referer", referer);
        }

        tracing::debug!(model = %req.model, messages = req.messages.len(), "sending chat completion");
        let response = builder.send().await.map_err(|err| self.transport_error(&err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::parse_error_response(status, response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|err| self.transport_error(&err))?;
        parse_completion(&body)
    }
}

/// Parse a 2xx chat-completions body.
pub fn parse_completion(body: &str) -> Result<ChatCompletion, ProviderError> {
    let envelope: CompletionEnvelope = serde_json::from_str(body)
        .map_err(|err| ProviderError::MalformedResponse(err.to_string()))?;

    if let Some(error) = envelope.error {
        return Err(ProviderError::Api(
            error
                .message
                .unwrap_or_else(|| "API request failed".to_string()),
        ));
    }

    let choice = envelope
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::MalformedResponse("missing choices[0]".to_string()))?;
    let content = choice.message.and_then(|m| m.content).ok_or_else(|| {
        ProviderError::MalformedResponse("missing choices[0].message.content".to_string())
    })?;

    Ok(ChatCompletion {
        content,
        model: envelope.model,
        total_tokens: envelope.usage.and_then(|usage| usage.total_tokens),
        finish_reason: choice.finish_reason,
    })
}

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    #[serde(flatten)]
    request: &'a ChatRequest,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionEnvelope {
    #[serde(default)]
    choices: Vec<Choice>,
    model: Option<String>,
    usage: Option<Usage>,
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}
