//! Chat-completion provider implementations
//!
//! Concrete implementations of the AIProvider trait. OpenRouter speaks the
//! OpenAI chat-completions wire format, so the same client also works
//! against OpenAI-compatible gateways by changing the base URL.

pub mod openrouter;

pub use openrouter::OpenRouterProvider;
