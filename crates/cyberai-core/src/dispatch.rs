//! Chat request orchestration and model fallback.
//!
//! A [`Dispatcher`] owns the currently selected model. Each call sends one
//! request; if it fails and the current model is not the fallback model,
//! the dispatcher switches to the fallback and retries exactly once. The
//! switch persists for later calls.

use std::sync::Arc;

use cyberai_context::{ContextWindow, Message, Sender};
use cyberai_runtime::{AIProvider, ChatMessage, ChatRequest, ModelCatalog, ModelDescriptor, Role};
use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::language::DEFAULT_LANGUAGE;
use crate::prompt::{assemble_for, Mode};
use crate::search::{enrich_message, SearchOptions, SearchResult, TimeRange, WebSearch};

pub const DEFAULT_MODEL: &str = "gpt-4-turbo";
pub const FALLBACK_MODEL: &str = "mixtral-8x7b";

const WEB_SEARCH_RESULTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 4000,
            top_p: 0.9,
            frequency_penalty: 0.1,
            presence_penalty: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    pub default_model: String,
    pub fallback_model: String,
    /// Share of `max_tokens` given to prior conversation turns
    pub context_share: f32,
    pub sampling: SamplingParams,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL.to_string(),
            fallback_model: FALLBACK_MODEL.to_string(),
            context_share: cyberai_context::window::DEFAULT_CONTEXT_SHARE,
            sampling: SamplingParams::default(),
        }
    }
}

impl DispatchConfig {
    /// Reads `CYBERAI_MODEL` and `CYBERAI_FALLBACK_MODEL`; everything else
    /// keeps its default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(model) = lookup("CYBERAI_MODEL").filter(|m| !m.trim().is_empty()) {
            config.default_model = model.trim().to_string();
        }
        if let Some(model) = lookup("CYBERAI_FALLBACK_MODEL").filter(|m| !m.trim().is_empty()) {
            config.fallback_model = model.trim().to_string();
        }
        config
    }
}

/// Per-call options. Unset sampling fields use the dispatcher's defaults.
#[derive(Debug, Clone, Default)]
pub struct SendOptions<'a> {
    pub mode: Mode,
    pub context: &'a [Message],
    pub web_search: bool,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub language: Option<String>,
    pub uncensored: bool,
}

impl<'a> SendOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_context(mut self, context: &'a [Message]) -> Self {
        self.context = context;
        self
    }

    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.web_search = enabled;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_uncensored(mut self, uncensored: bool) -> Self {
        self.uncensored = uncensored;
        self
    }

    fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchMetadata {
    pub temperature: f32,
    pub search_enabled: bool,
    pub language: String,
    pub attempts: u32,
}

/// Outcome of a successful call. Not retained by the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub response: String,
    /// Display name of the model that answered
    pub model: String,
    pub model_id: String,
    pub tokens: u32,
    pub search_results: Option<Vec<SearchResult>>,
    pub metadata: DispatchMetadata,
}

impl DispatchResult {
    /// The reply as a history message attributed to the answering model.
    pub fn to_message(&self) -> Message {
        Message::assistant(self.response.clone()).with_model(self.model.clone(), self.tokens)
    }
}

pub struct Dispatcher {
    provider: Arc<dyn AIProvider>,
    search: Option<Arc<dyn WebSearch>>,
    catalog: ModelCatalog,
    config: DispatchConfig,
    current: ModelDescriptor,
    fallback: ModelDescriptor,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("provider", &self.provider.name())
            .field("search", &self.search.as_ref().map(|s| s.name()))
            .field("current", &self.current.id)
            .field("fallback", &self.fallback.id)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Both the default and the fallback model must be in `catalog`.
    pub fn new(
        provider: Arc<dyn AIProvider>,
        catalog: ModelCatalog,
        config: DispatchConfig,
    ) -> Result<Self, DispatchError> {
        let lookup = |id: &str, role: &str| {
            catalog.get(id).cloned().ok_or_else(|| {
                DispatchError::InvalidConfig(format!("{role} model '{id}' is not in the model catalog"))
            })
        };
        let current = lookup(&config.default_model, "default")?;
        let fallback = lookup(&config.fallback_model, "fallback")?;

        Ok(Self {
            provider,
            search: None,
            catalog,
            config,
            current,
            fallback,
        })
    }

    /// Builtin catalog and default configuration.
    pub fn with_defaults(provider: Arc<dyn AIProvider>) -> Result<Self, DispatchError> {
        Self::new(provider, ModelCatalog::builtin(), DispatchConfig::default())
    }

    pub fn with_search(mut self, search: Arc<dyn WebSearch>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn current_model(&self) -> &ModelDescriptor {
        &self.current
    }

    pub fn fallback_model(&self) -> &ModelDescriptor {
        &self.fallback
    }

    pub fn is_on_fallback(&self) -> bool {
        self.current.id == self.fallback.id
    }

    /// Select a catalog model. Unknown ids are ignored and leave the
    /// selection unchanged; returns whether the selection was applied.
    pub fn set_model(&mut self, id: &str) -> bool {
        match self.catalog.get(id) {
            Some(model) => {
                if model.id != self.current.id {
                    tracing::debug!(from = %self.current.id, to = %model.id, "model selected");
                }
                self.current = model.clone();
                true
            }
            None => {
                tracing::warn!(model = id, "ignoring unknown model id");
                false
            }
        }
    }

    /// Send `text` with the given options, retrying once on the fallback
    /// model if the first attempt fails.
    pub async fn send_message(
        &mut self,
        text: &str,
        options: &SendOptions<'_>,
    ) -> Result<DispatchResult, DispatchError> {
        if let Some(model) = options.model.as_deref() {
            self.set_model(model);
        }

        let search_results = if options.web_search {
            self.web_search(text).await
        } else {
            Vec::new()
        };
        let user_text = enrich_message(text, &search_results);

        let request = self.build_request(&user_text, options);
        let mut attempts = 1;
        let outcome = match self.provider.complete(&request).await {
            Ok(completion) => Ok(completion),
            Err(err) if !self.is_on_fallback() => {
                tracing::warn!(
                    model = %self.current.id,
                    fallback = %self.fallback.id,
                    error = %err,
                    "request failed, retrying on fallback model"
                );
                self.current = self.fallback.clone();
                attempts += 1;
                self.provider
                    .complete(&request.for_model(self.current.id.clone()))
                    .await
            }
            Err(err) => Err(err),
        };

        let completion = outcome.map_err(|source| {
            tracing::error!(model = %self.current.id, attempts, error = %source, "chat request failed");
            DispatchError::ExhaustedFallback {
                model: self.current.id.clone(),
                attempts,
                source,
            }
        })?;

        Ok(DispatchResult {
            response: completion.content,
            model: self.current.name.clone(),
            model_id: self.current.id.clone(),
            tokens: completion.total_tokens.unwrap_or(0),
            search_results: (!search_results.is_empty()).then_some(search_results),
            metadata: DispatchMetadata {
                temperature: request.temperature,
                search_enabled: options.web_search,
                language: options.language().to_string(),
                attempts,
            },
        })
    }

    /// Payload for the current model: system prompt, trimmed context, then
    /// the user turn.
    pub fn build_request(&self, user_text: &str, options: &SendOptions<'_>) -> ChatRequest {
        let defaults = &self.config.sampling;
        let max_tokens = options.max_tokens.unwrap_or(defaults.max_tokens);
        let system_prompt = assemble_for(options.mode, options.language(), options.uncensored);

        let window = ContextWindow::for_request(max_tokens, self.config.context_share);
        let context = window.select(options.context);

        let mut messages = Vec::with_capacity(context.len() + 2);
        messages.push(ChatMessage::new(Role::System, system_prompt));
        messages.extend(context.iter().map(|message| {
            let role = match message.sender {
                Sender::User => Role::User,
                Sender::Assistant => Role::Assistant,
            };
            ChatMessage::new(role, message.content.clone())
        }));
        messages.push(ChatMessage::new(Role::User, user_text));

        ChatRequest {
            model: self.current.id.clone(),
            messages,
            max_tokens,
            temperature: options.temperature.unwrap_or(defaults.temperature),
            top_p: defaults.top_p,
            frequency_penalty: defaults.frequency_penalty,
            presence_penalty: defaults.presence_penalty,
        }
    }

    async fn web_search(&self, query: &str) -> Vec<SearchResult> {
        let Some(search) = self.search.as_ref() else {
            tracing::debug!("web search requested but no search backend configured");
            return Vec::new();
        };

        let options = SearchOptions {
            max_results: WEB_SEARCH_RESULTS,
            time_range: TimeRange::Week,
            ..SearchOptions::default()
        };
        match search.search(query, &options).await {
            Ok(results) => results,
            Err(err) => {
                tracing::warn!(backend = search.name(), error = %err, "web search failed");
                Vec::new()
            }
        }
    }
}
