//! Higher-level helpers built on [`Dispatcher`]: code generation and
//! search-backed research reports.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dispatch::{Dispatcher, SendOptions};
use crate::error::DispatchError;
use crate::prompt::Mode;
use crate::search::{search_context, SearchError, SearchOptions, SearchResult, WebSearch};

pub const CODE_MODEL: &str = "codellama-34b";
pub const CODE_TEMPERATURE: f32 = 0.3;
pub const RESEARCH_MODEL: &str = "claude-3-opus";
pub const RESEARCH_TEMPERATURE: f32 = 0.4;

const KEY_POINT_HEADINGS: [&str; 3] = ["key point", "finding", "highlight"];
const RECOMMENDATION_HEADINGS: [&str; 3] = ["recommendation", "suggestion", "next step"];

#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("research search failed: {0}")]
    Search(#[from] SearchError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRequest {
    pub language: String,
    pub framework: Option<String>,
    pub include_tests: bool,
    pub include_documentation: bool,
}

impl CodeRequest {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            framework: None,
            include_tests: false,
            include_documentation: false,
        }
    }

    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = Some(framework.into());
        self
    }

    pub fn with_tests(mut self, include: bool) -> Self {
        self.include_tests = include;
        self
    }

    pub fn with_documentation(mut self, include: bool) -> Self {
        self.include_documentation = include;
        self
    }

    fn prompt(&self, description: &str) -> String {
        let yes_no = |flag: bool| if flag { "Yes" } else { "No" };
        format!(
            "Generate complete, production-ready {} code for: {description}\n\n\
             Framework: {}\n\
             Include tests: {}\n\
             Include documentation: {}\n\n\
             Provide clean, well-structured code with proper error handling, security considerations, and best practices.",
            self.language,
            self.framework.as_deref().unwrap_or("None specified"),
            yes_no(self.include_tests),
            yes_no(self.include_documentation),
        )
    }
}

/// Ask the code model for an implementation of `description`.
///
/// The dispatcher is left on the code model afterwards (or on the fallback
/// model if the code model failed).
pub async fn generate_code(
    dispatcher: &mut Dispatcher,
    description: &str,
    request: &CodeRequest,
) -> Result<String, DispatchError> {
    let prompt = request.prompt(description);
    let options = SendOptions::new()
        .with_mode(Mode::Coder)
        .with_model(CODE_MODEL)
        .with_temperature(CODE_TEMPERATURE);

    tracing::debug!(language = %request.language, "generating code");
    let result = dispatcher.send_message(&prompt, &options).await?;
    Ok(result.response)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchDepth {
    Basic,
    #[default]
    Detailed,
    Comprehensive,
}

impl ResearchDepth {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Detailed => "detailed",
            Self::Comprehensive => "comprehensive",
        }
    }

    /// Number of search results gathered at this depth.
    pub fn max_results(self) -> usize {
        match self {
            Self::Basic => 5,
            Self::Detailed => 10,
            Self::Comprehensive => 15,
        }
    }
}

impl fmt::Display for ResearchDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResearchDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "detailed" => Ok(Self::Detailed),
            "comprehensive" => Ok(Self::Comprehensive),
            other => Err(format!(
                "unknown research depth '{other}' (expected basic, detailed or comprehensive)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchReport {
    pub summary: String,
    pub key_points: Vec<String>,
    pub sources: Vec<SearchResult>,
    pub recommendations: Vec<String>,
}

impl ResearchReport {
    /// Split a model response into report sections.
    pub fn from_response(response: &str, sources: Vec<SearchResult>) -> Self {
        let summary = response
            .split("\n\n")
            .next()
            .filter(|first| !first.is_empty())
            .unwrap_or(response)
            .to_string();

        Self {
            summary,
            key_points: extract_bullets(response, &KEY_POINT_HEADINGS),
            sources,
            recommendations: extract_bullets(response, &RECOMMENDATION_HEADINGS),
        }
    }
}

/// Search the web for `topic` and have the research model analyse it.
pub async fn perform_research(
    dispatcher: &mut Dispatcher,
    search: &dyn WebSearch,
    topic: &str,
    depth: ResearchDepth,
) -> Result<ResearchReport, ResearchError> {
    let options = SearchOptions {
        max_results: depth.max_results(),
        ..SearchOptions::default()
    };
    let sources = search.search(topic, &options).await?;
    tracing::debug!(%depth, sources = sources.len(), "research sources gathered");

    let prompt = format!(
        "Conduct a {depth} research analysis on: {topic}\n\n\
         Based on the following current information:\n{}\n\n\
         Provide:\n\
         1. A comprehensive summary\n\
         2. Key points and findings\n\
         3. Analysis and insights\n\
         4. Recommendations for further action\n\n\
         Format your response clearly with sections.",
        search_context(&sources)
    );
    let send = SendOptions::new()
        .with_mode(Mode::Research)
        .with_model(RESEARCH_MODEL)
        .with_temperature(RESEARCH_TEMPERATURE);

    let result = dispatcher.send_message(&prompt, &send).await?;
    Ok(ResearchReport::from_response(&result.response, sources))
}

/// Bullet lines of the first section introduced by one of `headings`.
///
/// The section starts at the earliest heading match and runs until a blank
/// line or a line starting with a letter.
fn extract_bullets(text: &str, headings: &[&str]) -> Vec<String> {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let lowered = text.to_ascii_lowercase();
    let Some(start) = headings.iter().filter_map(|h| lowered.find(h)).min() else {
        return Vec::new();
    };

    let section = &text[start..];
    let bytes = section.as_bytes();
    let end = bytes
        .windows(2)
        .position(|pair| pair[0] == b'\n' && (pair[1] == b'\n' || pair[1].is_ascii_alphabetic()))
        .unwrap_or(section.len());

    section[..end]
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix('-').or_else(|| line.strip_prefix('•')))
        .map(|item| item.trim().to_string())
        .collect()
}
