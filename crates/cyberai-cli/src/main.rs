use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use colored::Colorize;
use cyberai_cli::{build_dispatcher, render_models, select_model, CliError};
use cyberai_context::{Message, SessionStore};
use cyberai_core::{language_name, DispatchConfig, Dispatcher, Mode, SendOptions, DEFAULT_LANGUAGE};
use cyberai_runtime::ProviderConfig;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const REPL_COMMANDS: &[&str] = &[
    "/mode",
    "/model",
    "/models",
    "/lang",
    "/uncensored",
    "/search",
    "/new",
    "/help",
    "/exit",
    "/quit",
];

const NEW_CHAT_TITLE: &str = "New Chat";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Chat(String),
    Mode(Mode),
    Model(Option<String>),
    Models,
    Lang(String),
    Uncensored(bool),
    Search(bool),
    New,
    Help,
    Exit,
    Empty,
    Unknown(String),
}

#[derive(Default)]
struct ReplHelper;

impl Helper for ReplHelper {}
impl Hinter for ReplHelper {
    type Hint = String;
}
impl Highlighter for ReplHelper {}
impl Validator for ReplHelper {}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let pos = pos.min(line.len());
        let input = &line[..pos];
        // only the command word completes
        if input.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }

        let pairs = complete_candidates(input)
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.to_string(),
                replacement: candidate.to_string(),
            })
            .collect();
        Ok((0, pairs))
    }
}

fn parse_toggle(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_mode(name: &str) -> Option<Mode> {
    let name = name.to_ascii_lowercase();
    Mode::ALL.into_iter().find(|mode| mode.as_str() == name)
}

fn parse_command(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    if !line.starts_with('/') {
        return ReplCommand::Chat(line.to_string());
    }

    let mut parts = line.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let tail = parts.next().map(str::trim).unwrap_or_default();

    match command {
        "/exit" | "/quit" => ReplCommand::Exit,
        "/help" | "/?" => ReplCommand::Help,
        "/models" => ReplCommand::Models,
        "/new" => ReplCommand::New,
        "/model" if tail.is_empty() => ReplCommand::Model(None),
        "/model" => ReplCommand::Model(Some(tail.to_string())),
        "/mode" => match parse_mode(tail) {
            Some(mode) => ReplCommand::Mode(mode),
            None => ReplCommand::Unknown("usage: /mode <cyber|normal|coder|creative|research>".to_string()),
        },
        "/lang" if !tail.is_empty() => ReplCommand::Lang(tail.to_ascii_lowercase()),
        "/lang" => ReplCommand::Unknown("usage: /lang <code>".to_string()),
        "/uncensored" => match parse_toggle(tail) {
            Some(enabled) => ReplCommand::Uncensored(enabled),
            None => ReplCommand::Unknown("usage: /uncensored on|off".to_string()),
        },
        "/search" => match parse_toggle(tail) {
            Some(enabled) => ReplCommand::Search(enabled),
            None => ReplCommand::Unknown("usage: /search on|off".to_string()),
        },
        _ => ReplCommand::Unknown(format!("unknown command: {command}")),
    }
}

fn help_text() -> String {
    [
        "Type a message to chat. Commands:",
        "  /mode <name>           Switch persona (cyber, normal, coder, creative, research)",
        "  /model [id]            Show or switch the model",
        "  /models                List available models",
        "  /lang <code>           Set the response language, e.g. fr",
        "  /uncensored on|off     Toggle the uncensored directive",
        "  /search on|off         Toggle web search enrichment",
        "  /new                   Start a new conversation",
        "  /help                  Show this help",
        "  /exit | /quit          Exit",
    ]
    .join("\n")
}

struct ReplState {
    dispatcher: Dispatcher,
    sessions: SessionStore,
    session_id: String,
    mode: Mode,
    language: String,
    uncensored: bool,
    web_search: bool,
}

impl ReplState {
    async fn new(dispatcher: Dispatcher) -> Self {
        let sessions = SessionStore::new();
        let mode = Mode::default();
        let session_id = sessions.create_session(NEW_CHAT_TITLE, mode.as_str()).await;
        Self {
            dispatcher,
            sessions,
            session_id,
            mode,
            language: DEFAULT_LANGUAGE.to_string(),
            uncensored: false,
            web_search: false,
        }
    }

    fn prompt(&self) -> String {
        format!("cyberai[{}]> ", self.mode)
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "cyberai=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    if std::env::args().count() > 1 {
        let cli = cyberai_cli::Cli::parse();
        match cyberai_cli::run(cli).await {
            Ok(output) => println!("{output}"),
            Err(err) => {
                tracing::debug!(error = ?err, "command failed");
                eprintln!("{} {}", "error:".red(), err.user_message());
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    repl().await
}

async fn repl() -> anyhow::Result<()> {
    let provider = ProviderConfig::from_env().context("set CYBERAI_API_KEY (or OPENROUTER_API_KEY) to chat")?;
    let dispatcher = build_dispatcher(provider, DispatchConfig::from_env()).context("failed to configure dispatcher")?;

    let mut editor =
        Editor::<ReplHelper, rustyline::history::DefaultHistory>::new().context("failed to start REPL")?;
    editor.set_helper(Some(ReplHelper));
    let history = history_file();
    let _ = editor.load_history(&history);

    let mut state = ReplState::new(dispatcher).await;
    println!("{}", "CyberAI interactive mode. Type /help.".bright_green());
    println!("{} {}", "model:".dimmed(), state.dispatcher.current_model().name.cyan());

    loop {
        match editor.readline(&state.prompt()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(trimmed);
                match run_repl_command(&mut state, parse_command(trimmed)).await {
                    Ok(true) => break,
                    Ok(false) => {}
                    Err(err) => eprintln!("{} {}", "error:".red(), err.user_message()),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted | rustyline::error::ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(err) => {
                eprintln!("{} {err}", "error:".red());
                break;
            }
        }
    }

    if let Err(err) = editor.save_history(&history) {
        eprintln!("{} failed to save history: {err}", "warning:".yellow());
    }
    Ok(())
}

async fn run_repl_command(state: &mut ReplState, command: ReplCommand) -> Result<bool, CliError> {
    match command {
        ReplCommand::Chat(text) => chat(state, text).await?,
        ReplCommand::Mode(mode) => {
            state.mode = mode;
            println!("{} {}", "mode:".green(), mode.as_str().cyan());
        }
        ReplCommand::Model(None) => {
            let model = state.dispatcher.current_model();
            println!("{} {} ({})", "model:".green(), model.name.cyan(), model.id);
        }
        ReplCommand::Model(Some(id)) => {
            select_model(&mut state.dispatcher, &id)?;
            println!("{} {}", "model:".green(), state.dispatcher.current_model().name.cyan());
        }
        ReplCommand::Models => {
            print!("{}", render_models(state.dispatcher.catalog(), None));
        }
        ReplCommand::Lang(code) => {
            match language_name(&code) {
                Some(name) => println!("{} {name} ({code})", "language:".green()),
                None => println!("{} unknown language code `{code}`, asking for replies in English", "warning:".yellow()),
            }
            state.language = code;
        }
        ReplCommand::Uncensored(enabled) => {
            state.uncensored = enabled;
            println!("{} {}", "uncensored:".green(), on_off(enabled));
        }
        ReplCommand::Search(enabled) => {
            state.web_search = enabled;
            println!("{} {}", "web search:".green(), on_off(enabled));
        }
        ReplCommand::New => {
            state.session_id = state.sessions.create_session(NEW_CHAT_TITLE, state.mode.as_str()).await;
            println!("{}", "started a new conversation".green());
        }
        ReplCommand::Help => println!("{}", help_text().bright_blue()),
        ReplCommand::Exit => {
            println!("{}", "bye".bright_green());
            return Ok(true);
        }
        ReplCommand::Empty => {}
        ReplCommand::Unknown(message) => {
            println!("{} {message}", "warning:".yellow());
            println!("{}", "Type /help for available commands.".yellow());
        }
    }

    Ok(false)
}

async fn chat(state: &mut ReplState, text: String) -> Result<(), CliError> {
    let history = state.sessions.history(&state.session_id).await?;
    let options = SendOptions::new()
        .with_mode(state.mode)
        .with_context(&history)
        .with_web_search(state.web_search)
        .with_language(state.language.clone())
        .with_uncensored(state.uncensored);

    let outcome = state.dispatcher.send_message(&text, &options).await;
    state.sessions.append_message(&state.session_id, Message::user(text)).await?;
    let result = outcome?;

    println!("{}", result.response);
    let mut footer = format!("{}, {} tokens", result.model, result.tokens);
    if let Some(sources) = &result.search_results {
        footer.push_str(&format!(", {} web sources", sources.len()));
    }
    println!("{}", footer.dimmed());

    state.sessions.append_message(&state.session_id, result.to_message()).await?;
    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

fn history_file() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".cyberai-history");
    }
    PathBuf::from(".cyberai-history")
}

fn complete_candidates(prefix: &str) -> BTreeSet<&'static str> {
    REPL_COMMANDS
        .iter()
        .copied()
        .filter(|command| command.starts_with(prefix))
        .collect()
}
