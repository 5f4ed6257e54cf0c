//! Web search used to ground answers in current information.
//!
//! Search is best effort: callers log failures and continue without
//! results rather than failing the chat request.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DUCKDUCKGO_API_BASE: &str = "https://api.duckduckgo.com";
const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);
const ACADEMIC_SITES: &str = "site:scholar.google.com OR site:arxiv.org OR site:pubmed.ncbi.nlm.nih.gov";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
    #[default]
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub max_results: usize,
    pub time_range: TimeRange,
    pub safe_search: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 10,
            time_range: TimeRange::All,
            safe_search: true,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("search transport error: {0}")]
    Transport(String),
    #[error("search returned http status {0}")]
    HttpStatus(u16),
    #[error("search response decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>, SearchError>;

    /// Past week's news coverage of `query`.
    async fn news(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
        let options = SearchOptions {
            max_results,
            time_range: TimeRange::Week,
            ..SearchOptions::default()
        };
        self.search(&format!("{query} news"), &options).await
    }

    /// `query` restricted to scholarly sites.
    async fn academic(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
        let options = SearchOptions {
            max_results,
            ..SearchOptions::default()
        };
        self.search(&format!("{query} {ACADEMIC_SITES}"), &options).await
    }
}

/// DuckDuckGo instant-answer API. Time range is not supported by the
/// endpoint and is ignored.
#[derive(Debug, Clone)]
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    base_url: String,
}

impl DuckDuckGoSearch {
    pub fn new() -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .map_err(|err| SearchError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url: DUCKDUCKGO_API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl WebSearch for DuckDuckGoSearch {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>, SearchError> {
        let safe = if options.safe_search { "1" } else { "-2" };
        let response = self
            .client
            .get(format!("{}/", self.base_url.trim_end_matches('/')))
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
                ("kp", safe),
            ])
            .send()
            .await
            .map_err(|err| SearchError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::HttpStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|err| SearchError::Transport(err.to_string()))?;
        parse_duckduckgo(&body, options.max_results)
    }
}

fn parse_duckduckgo(body: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
    let parsed: DuckDuckGoResponse =
        serde_json::from_str(body).map_err(|err| SearchError::Decode(err.to_string()))?;

    let now = Utc::now();
    let results = parsed
        .related_topics
        .into_iter()
        .filter_map(|topic| match (topic.first_url, topic.text) {
            (Some(url), Some(text)) if !url.is_empty() && !text.is_empty() => Some(SearchResult {
                title: text
                    .split(" - ")
                    .next()
                    .filter(|title| !title.is_empty())
                    .unwrap_or("DuckDuckGo Result")
                    .to_string(),
                url,
                snippet: text,
                source: "DuckDuckGo".to_string(),
                timestamp: now,
            }),
            _ => None,
        })
        .take(max_results)
        .collect();
    Ok(dedupe(results))
}

#[derive(Debug, Deserialize)]
struct DuckDuckGoResponse {
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<DuckDuckGoTopic>,
}

#[derive(Debug, Deserialize)]
struct DuckDuckGoTopic {
    #[serde(rename = "FirstURL")]
    first_url: Option<String>,
    #[serde(rename = "Text")]
    text: Option<String>,
}

/// Drop results whose URL was already seen, ignoring case, keeping first
/// occurrences.
pub fn dedupe(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|result| seen.insert(result.url.to_lowercase()))
        .collect()
}

/// Render results as `Source/Title/Content` blocks separated by blank lines.
pub fn search_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|result| {
            format!(
                "Source: {}\nTitle: {}\nContent: {}",
                result.source, result.title, result.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Append search context to a user message.
pub fn enrich_message(message: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return message.to_string();
    }
    format!(
        "{message}\n\nRecent web search results:\n{}\n\nPlease incorporate this current information in your response.",
        search_context(results)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSearch {
        calls: Mutex<Vec<(String, SearchOptions)>>,
    }

    #[async_trait]
    impl WebSearch for RecordingSearch {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>, SearchError> {
            self.calls.lock().unwrap().push((query.to_string(), options.clone()));
            Ok(Vec::new())
        }
    }

    fn network_tests_enabled() -> bool {
        matches!(std::env::var("CYBERAI_RUN_NETWORK_TESTS"), Ok(value) if value == "1")
    }

    fn result(url: &str, title: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            url: url.to_string(),
            snippet: format!("{title} snippet"),
            source: "Test".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn parses_related_topics_and_skips_groups() {
        let body = json!({
            "RelatedTopics": [
                {"FirstURL": "https://duckduckgo.com/Rust", "Text": "Rust - a systems language"},
                {"Name": "See also", "Topics": [{"FirstURL": "https://x", "Text": "nested"}]},
                {"FirstURL": "https://duckduckgo.com/Cargo", "Text": "Cargo"}
            ]
        })
        .to_string();

        let results = parse_duckduckgo(&body, 10).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Rust");
        assert_eq!(results[0].snippet, "Rust - a systems language");
        assert_eq!(results[1].title, "Cargo");
        assert_eq!(results[1].source, "DuckDuckGo");
    }

    #[test]
    fn parse_respects_max_results_and_missing_topics() {
        let body = json!({
            "RelatedTopics": [
                {"FirstURL": "https://a", "Text": "A"},
                {"FirstURL": "https://b", "Text": "B"}
            ]
        })
        .to_string();
        assert_eq!(parse_duckduckgo(&body, 1).unwrap().len(), 1);
        assert!(parse_duckduckgo("{}", 5).unwrap().is_empty());
        assert!(matches!(parse_duckduckgo("nope", 5), Err(SearchError::Decode(_))));
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let results = dedupe(vec![
            result("https://a", "first"),
            result("https://b", "b"),
            result("https://a", "second"),
        ]);
        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "b"]);
    }

    #[test]
    fn dedupe_ignores_url_case() {
        let results = dedupe(vec![
            result("https://Example.com/A", "upper"),
            result("https://example.com/a", "lower"),
        ]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "upper");
    }

    #[tokio::test]
    async fn news_searches_past_week() {
        let search = RecordingSearch::default();

        search.news("rust 2024 edition", 5).await.unwrap();

        let calls = search.calls.lock().unwrap();
        assert_eq!(calls[0].0, "rust 2024 edition news");
        assert_eq!(calls[0].1.time_range, TimeRange::Week);
        assert_eq!(calls[0].1.max_results, 5);
    }

    #[tokio::test]
    async fn academic_restricts_to_scholarly_sites() {
        let search = RecordingSearch::default();

        search.academic("borrow checking", 3).await.unwrap();

        let calls = search.calls.lock().unwrap();
        assert_eq!(
            calls[0].0,
            "borrow checking site:scholar.google.com OR site:arxiv.org OR site:pubmed.ncbi.nlm.nih.gov"
        );
        assert_eq!(calls[0].1.time_range, TimeRange::All);
        assert_eq!(calls[0].1.max_results, 3);
    }

    #[test]
    fn enrich_appends_context_blocks() {
        let enriched = enrich_message("what's new?", &[result("https://a", "A"), result("https://b", "B")]);

        assert!(enriched.starts_with("what's new?\n\nRecent web search results:\nSource: Test\nTitle: A\nContent: A snippet\n\nSource: Test"));
        assert!(enriched.ends_with("Please incorporate this current information in your response."));
    }

    #[test]
    fn enrich_without_results_is_identity() {
        assert_eq!(enrich_message("plain", &[]), "plain");
    }

    #[tokio::test]
    async fn duckduckgo_queries_instant_answer_api() {
        if !network_tests_enabled() {
            eprintln!("skipping network test: set CYBERAI_RUN_NETWORK_TESTS=1 to enable");
            return;
        }

        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/")
                    .query_param("q", "rust async")
                    .query_param("format", "json");
                then.status(200).json_body(json!({
                    "RelatedTopics": [{"FirstURL": "https://tokio.rs", "Text": "Tokio - async runtime"}]
                }));
            })
            .await;

        let search = DuckDuckGoSearch::new().unwrap().with_base_url(server.base_url());
        let results = search.search("rust async", &SearchOptions::default()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://tokio.rs");
    }
}
