//! Runtime abstractions for chat-completion providers.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod catalog;
pub mod config;
pub mod providers;

pub use catalog::{ModelCatalog, ModelCategory, ModelDescriptor};
pub use config::{ConfigError, ProviderConfig};
pub use providers::OpenRouterProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// One chat-completions call. Field names match the wire body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl ChatRequest {
    /// Copy of this request addressed to another model.
    pub fn for_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub content: String,
    pub model: Option<String>,
    pub total_tokens: Option<u32>,
    pub finish_reason: Option<String>,
}

/// Coarse failure classes. All three are eligible for a fallback retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Provider,
    MalformedResponse,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("http status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("provider returned an error: {0}")]
    Api(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("mock provider has no queued response")]
    MockQueueEmpty,
}

impl ProviderError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderError::Transport(_) | ProviderError::Timeout(_) | ProviderError::MockQueueEmpty => {
                FailureKind::Transport
            }
            ProviderError::HttpStatus { .. } | ProviderError::Api(_) => FailureKind::Provider,
            ProviderError::MalformedResponse(_) => FailureKind::MalformedResponse,
        }
    }
}

#[async_trait]
pub trait AIProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn complete(&self, req: &ChatRequest) -> Result<ChatCompletion, ProviderError>;
}

/// Scripted provider for tests. Replays queued results in order and records
/// every request it receives.
#[derive(Debug, Default)]
pub struct MockProvider {
    queue: Mutex<VecDeque<Result<ChatCompletion, ProviderError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, result: Result<ChatCompletion, ProviderError>) {
        self.queue
            .lock()
            .expect("mock queue poisoned")
            .push_back(result);
    }

    /// Queue a successful completion with the given text.
    pub fn enqueue_reply(&self, content: impl Into<String>, total_tokens: Option<u32>) {
        self.enqueue(Ok(ChatCompletion {
            content: content.into(),
            model: None,
            total_tokens,
            finish_reason: Some("stop".to_string()),
        }));
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("mock requests poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("mock requests poisoned").len()
    }
}

#[async_trait]
impl AIProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, req: &ChatRequest) -> Result<ChatCompletion, ProviderError> {
        self.requests
            .lock()
            .expect("mock requests poisoned")
            .push(req.clone());
        self.queue
            .lock()
            .expect("mock queue poisoned")
            .pop_front()
            .unwrap_or(Err(ProviderError::MockQueueEmpty))
    }
}
