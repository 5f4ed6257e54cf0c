//! CyberAI chat core: prompt assembly, model dispatch with fallback, web
//! search enrichment and the code/research helpers built on top.

pub mod dispatch;
pub mod error;
pub mod language;
pub mod prompt;
pub mod research;
pub mod search;

pub use dispatch::{
    DispatchConfig, DispatchMetadata, DispatchResult, Dispatcher, SamplingParams, SendOptions, DEFAULT_MODEL,
    FALLBACK_MODEL,
};
pub use error::DispatchError;
pub use language::{language_name, DEFAULT_LANGUAGE};
pub use prompt::{assemble, assemble_for, Mode};
pub use research::{generate_code, perform_research, CodeRequest, ResearchDepth, ResearchError, ResearchReport};
pub use search::{DuckDuckGoSearch, SearchError, SearchOptions, SearchResult, TimeRange, WebSearch};

pub use cyberai_context::{Message, Sender, SessionStore};
pub use cyberai_runtime::{AIProvider, ModelCatalog, ModelDescriptor, OpenRouterProvider, ProviderConfig};
