//! Dispatch error types

use cyberai_runtime::{FailureKind, ProviderError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    /// The last permitted attempt failed. Never retried further.
    #[error("request failed on model '{model}' after {attempts} attempt(s): {source}")]
    ExhaustedFallback {
        model: String,
        attempts: u32,
        #[source]
        source: ProviderError,
    },

    #[error("invalid dispatch configuration: {0}")]
    InvalidConfig(String),
}

impl DispatchError {
    /// Failure class of the final attempt, if any attempt was made.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            DispatchError::ExhaustedFallback { source, .. } => Some(source.kind()),
            DispatchError::InvalidConfig(_) => None,
        }
    }

    /// Text suitable for showing to the end user.
    pub fn user_message(&self) -> &'static str {
        match self.failure_kind() {
            Some(FailureKind::Transport) => {
                "Network connection failed. Please check your internet connection and try again."
            }
            Some(FailureKind::Provider) => {
                "AI service is temporarily unavailable. Please try again in a moment."
            }
            Some(FailureKind::MalformedResponse) | None => {
                "An unexpected error occurred. Please try again."
            }
        }
    }
}
