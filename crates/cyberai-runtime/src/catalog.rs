//! Model Catalog
//!
//! Static table of the models the client can address, with lookups by id
//! and category. The catalog is never mutated at runtime; the dispatcher
//! only tracks which entry is currently selected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelCategory {
    Chat,
    Code,
    Image,
    Audio,
    Video,
    Multimodal,
}

impl ModelCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelCategory::Chat => "chat",
            ModelCategory::Code => "code",
            ModelCategory::Image => "image",
            ModelCategory::Audio => "audio",
            ModelCategory::Video => "video",
            ModelCategory::Multimodal => "multimodal",
        }
    }
}

impl fmt::Display for ModelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(ModelCategory::Chat),
            "code" => Ok(ModelCategory::Code),
            "image" => Ok(ModelCategory::Image),
            "audio" => Ok(ModelCategory::Audio),
            "video" => Ok(ModelCategory::Video),
            "multimodal" => Ok(ModelCategory::Multimodal),
            _ => Err(format!(
                "unknown model category '{value}', expected one of: chat, code, image, audio, video, multimodal"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub description: String,
    pub capabilities: Vec<String>,
    /// Context ceiling in tokens
    pub max_tokens: u32,
    pub cost_per_1k_tokens: f64,
    pub category: ModelCategory,
}

impl ModelDescriptor {
    #[allow(clippy::too_many_arguments)]
    fn builtin(
        id: &str,
        name: &str,
        provider: &str,
        description: &str,
        capabilities: &[&str],
        max_tokens: u32,
        cost_per_1k_tokens: f64,
        category: ModelCategory,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            provider: provider.to_string(),
            description: description.to_string(),
            capabilities: capabilities.iter().map(|c| (*c).to_string()).collect(),
            max_tokens,
            cost_per_1k_tokens,
            category,
        }
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

/// Ordered model table. The first entry is the overall default.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCatalog {
    models: Vec<ModelDescriptor>,
}

impl ModelCatalog {
    /// Catalog from an explicit list. Order matters for defaults.
    pub fn new(models: Vec<ModelDescriptor>) -> Self {
        Self { models }
    }

    /// The models shipped with the client.
    pub fn builtin() -> Self {
        use ModelCategory::{Chat, Code, Multimodal};

        Self::new(vec![
            ModelDescriptor::builtin(
                "gpt-4-turbo",
                "GPT-4 Turbo",
                "OpenAI",
                "Most capable GPT-4 model with 128k context",
                &["chat", "reasoning", "analysis", "coding"],
                128_000,
                0.01,
                Chat,
            ),
            ModelDescriptor::builtin(
                "claude-3-opus",
                "Claude 3 Opus",
                "Anthropic",
                "Most powerful Claude model for complex tasks",
                &["chat", "reasoning", "analysis", "creative"],
                200_000,
                0.015,
                Chat,
            ),
            ModelDescriptor::builtin(
                "gemini-pro",
                "Gemini Pro",
                "Google",
                "Google's advanced multimodal AI",
                &["chat", "multimodal", "reasoning"],
                32_000,
                0.0005,
                Multimodal,
            ),
            ModelDescriptor::builtin(
                "llama-3-70b",
                "Llama 3 70B",
                "Meta",
                "Open-source powerhouse for general tasks",
                &["chat", "reasoning", "multilingual"],
                8_000,
                0.0008,
                Chat,
            ),
            ModelDescriptor::builtin(
                "mixtral-8x7b",
                "Mixtral 8x7B",
                "Mistral",
                "Efficient mixture of experts model",
                &["chat", "coding", "multilingual"],
                32_000,
                0.0006,
                Chat,
            ),
            ModelDescriptor::builtin(
                "codellama-34b",
                "CodeLlama 34B",
                "Meta",
                "Specialized for code generation and debugging",
                &["coding", "debugging", "explanation"],
                16_000,
                0.0008,
                Code,
            ),
            ModelDescriptor::builtin(
                "deepseek-coder",
                "DeepSeek Coder",
                "DeepSeek",
                "Advanced coding assistant",
                &["coding", "architecture", "optimization"],
                16_000,
                0.0014,
                Code,
            ),
            ModelDescriptor::builtin(
                "wizardcoder-34b",
                "WizardCoder 34B",
                "WizardLM",
                "Powerful code generation model",
                &["coding", "refactoring", "documentation"],
                8_000,
                0.0008,
                Code,
            ),
            ModelDescriptor::builtin(
                "grok-1",
                "Grok-1",
                "xAI",
                "Conversational model with real-time web access",
                &["chat", "web-search", "humor", "uncensored"],
                8_000,
                0.005,
                Chat,
            ),
            ModelDescriptor::builtin(
                "perplexity-70b",
                "Perplexity 70B",
                "Perplexity",
                "Search-focused AI with citations",
                &["search", "research", "citations"],
                4_000,
                0.001,
                Chat,
            ),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|model| model.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn by_category(&self, category: ModelCategory) -> Vec<&ModelDescriptor> {
        self.models
            .iter()
            .filter(|model| model.category == category)
            .collect()
    }

    /// First model of `category`, else the first model in the catalog.
    pub fn default_for(&self, category: ModelCategory) -> Option<&ModelDescriptor> {
        self.models
            .iter()
            .find(|model| model.category == category)
            .or_else(|| self.models.first())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
