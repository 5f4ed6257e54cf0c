use std::fmt::Write as _;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use cyberai_context::ContextError;
use cyberai_core::{
    assemble, generate_code, perform_research, CodeRequest, DispatchConfig, DispatchError, Dispatcher,
    DuckDuckGoSearch, Mode, ResearchDepth, ResearchError, ResearchReport, SearchError, SendOptions, WebSearch,
};
use cyberai_runtime::{ConfigError, ModelCatalog, ModelCategory, OpenRouterProvider, ProviderConfig, ProviderError};
use thiserror::Error;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "cyberai",
    version,
    about = "CyberAI chat client",
    long_about = "CyberAI chat client: ask questions, generate code and run web-backed research against OpenRouter models. Run without arguments for interactive mode."
)]
pub struct Cli {
    #[arg(long, global = true, help = "Model id to use (see `cyberai models`)")]
    pub model: Option<String>,
    #[arg(long, global = true, default_value = "en", help = "Response language code, e.g. fr or hi")]
    pub lang: String,
    #[arg(long, global = true, help = "Append the uncensored directive to the system prompt")]
    pub uncensored: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Send a single message and print the reply")]
    Ask {
        #[arg(help = "Message text")]
        message: String,
        #[arg(long, default_value = "normal", help = "Persona: cyber, normal, coder, creative or research")]
        mode: String,
        #[arg(long, help = "Enrich the message with web search results")]
        search: bool,
        #[arg(long, help = "Sampling temperature")]
        temperature: Option<f32>,
        #[arg(long, help = "Maximum completion tokens")]
        max_tokens: Option<u32>,
    },
    #[command(about = "List the model catalog")]
    Models {
        #[arg(long, help = "Only show one category (chat, code, image, audio, video, multimodal)")]
        category: Option<ModelCategory>,
    },
    #[command(about = "Print the system prompt for a mode")]
    Prompt {
        #[arg(long, default_value = "normal", help = "Persona: cyber, normal, coder, creative or research")]
        mode: String,
    },
    #[command(about = "Search the web and produce a research report")]
    Research {
        #[arg(help = "Research topic")]
        topic: String,
        #[arg(long, default_value = "detailed", help = "basic, detailed or comprehensive")]
        depth: ResearchDepth,
        #[arg(long, help = "Print the report as JSON")]
        json: bool,
    },
    #[command(about = "Generate code for a description")]
    Code {
        #[arg(help = "What the code should do")]
        description: String,
        #[arg(long, default_value = "rust", help = "Target programming language")]
        language: String,
        #[arg(long, help = "Framework to build on")]
        framework: Option<String>,
        #[arg(long, help = "Ask for tests")]
        tests: bool,
        #[arg(long, help = "Ask for documentation")]
        docs: bool,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("provider setup failed: {0}")]
    Provider(#[from] ProviderError),
    #[error("search setup failed: {0}")]
    Search(#[from] SearchError),
    #[error("session error: {0}")]
    Session(#[from] ContextError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Research(#[from] ResearchError),
    #[error("json encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CliError {
    /// Friendly text for request failures, the full error otherwise.
    pub fn user_message(&self) -> String {
        match self {
            CliError::Dispatch(err) | CliError::Research(ResearchError::Dispatch(err)) => {
                err.user_message().to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Dispatcher talking to OpenRouter with DuckDuckGo enrichment.
pub fn build_dispatcher(provider: ProviderConfig, dispatch: DispatchConfig) -> Result<Dispatcher, CliError> {
    let provider = OpenRouterProvider::new(provider)?;
    tracing::debug!(endpoint = %provider.endpoint(), "provider configured");
    let dispatcher = Dispatcher::new(Arc::new(provider), ModelCatalog::builtin(), dispatch)?
        .with_search(Arc::new(DuckDuckGoSearch::new()?));
    Ok(dispatcher)
}

/// Select `model` or fail with a hint listing where valid ids come from.
pub fn select_model(dispatcher: &mut Dispatcher, model: &str) -> Result<(), CliError> {
    if dispatcher.set_model(model) {
        Ok(())
    } else {
        Err(CliError::InvalidArgument(format!(
            "unknown model `{model}`; run `cyberai models` for the list"
        )))
    }
}

pub async fn run(cli: Cli) -> Result<String, CliError> {
    // Offline commands must work without an API key.
    if let Commands::Models { category } = cli.command {
        return Ok(render_models(&ModelCatalog::builtin(), category));
    }
    if let Commands::Prompt { mode } = &cli.command {
        return Ok(assemble(mode, &cli.lang, cli.uncensored));
    }

    let mut dispatcher = build_dispatcher(ProviderConfig::from_env()?, DispatchConfig::from_env())?;
    let search = DuckDuckGoSearch::new()?;
    run_with(cli, &mut dispatcher, &search).await
}

/// Execute a parsed command against an existing dispatcher.
pub async fn run_with(cli: Cli, dispatcher: &mut Dispatcher, search: &dyn WebSearch) -> Result<String, CliError> {
    if let Some(model) = cli.model.as_deref() {
        select_model(dispatcher, model)?;
    }

    match cli.command {
        Commands::Ask {
            message,
            mode,
            search: web_search,
            temperature,
            max_tokens,
        } => {
            let mut options = SendOptions::new()
                .with_mode(Mode::from_name(&mode))
                .with_web_search(web_search)
                .with_language(cli.lang)
                .with_uncensored(cli.uncensored);
            options.temperature = temperature;
            options.max_tokens = max_tokens;

            let result = dispatcher.send_message(&message, &options).await?;
            Ok(format!(
                "{}\n\n({}, {} tokens)",
                result.response, result.model, result.tokens
            ))
        }
        Commands::Models { category } => Ok(render_models(dispatcher.catalog(), category)),
        Commands::Prompt { mode } => Ok(assemble(&mode, &cli.lang, cli.uncensored)),
        Commands::Research { topic, depth, json } => {
            let report = perform_research(dispatcher, search, &topic, depth).await?;
            if json {
                Ok(serde_json::to_string_pretty(&report)?)
            } else {
                Ok(render_report(&report))
            }
        }
        Commands::Code {
            description,
            language,
            framework,
            tests,
            docs,
        } => {
            let mut request = CodeRequest::new(language).with_tests(tests).with_documentation(docs);
            request.framework = framework;
            Ok(generate_code(dispatcher, &description, &request).await?)
        }
    }
}

pub fn render_models(catalog: &ModelCatalog, category: Option<ModelCategory>) -> String {
    let mut output = String::new();
    for model in catalog.iter().filter(|m| category.map_or(true, |c| m.category == c)) {
        let _ = writeln!(
            output,
            "{:<22} {:<20} {:<11} ${:.4}/1k  {}",
            model.id,
            model.name,
            model.category.as_str(),
            model.cost_per_1k_tokens,
            model.description
        );
    }
    if output.is_empty() {
        output.push_str("No models found.\n");
    }
    output
}

pub fn render_report(report: &ResearchReport) -> String {
    let mut output = format!("Summary\n{}\n", report.summary);

    let sections = [("Key points", &report.key_points), ("Recommendations", &report.recommendations)];
    for (heading, items) in sections {
        if items.is_empty() {
            continue;
        }
        let _ = write!(output, "\n{heading}\n");
        for item in items {
            let _ = writeln!(output, "- {item}");
        }
    }

    if !report.sources.is_empty() {
        output.push_str("\nSources\n");
        for (i, source) in report.sources.iter().enumerate() {
            let _ = writeln!(output, "{}. {} ({})", i + 1, source.title, source.url);
        }
    }
    output
}
