//! mdchat CLI: Command-line interface for the mdchat client

use clap::{Parser, Subcommand};
use mdchat_engine::{ChatApi, Config, ConversationController, HistoryEntry, HttpChatApi};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Markdown chat client for a history-backed chat service
#[derive(Parser, Debug)]
#[command(name = "mdchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Backend base URL (overrides the config file and MDCHAT_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Write debug logs to .mdchat/logs/
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Open the TUI (default when no command specified)
    Tui,

    /// Chat line by line on stdin/stdout
    Chat,

    /// Manage saved chat histories
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Start a new chat on the server
    New,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum HistoryCommand {
    /// List saved histories
    List,

    /// Print a saved history
    Show {
        /// History filename, e.g. chat_history_1.md
        file: String,
    },

    /// Delete a saved history
    Delete {
        /// History filename, e.g. chat_history_1.md
        file: String,
    },
}

const MDCHAT_DIR: &str = ".mdchat";
const DEFAULT_CONFIG_PATH: &str = ".mdchat/config.json";

/// File log filter when `--debug` is set.
const DEBUG_FILE_FILTER: &str = "debug,hyper_util=info,rustls=info,reqwest=info";

fn main() {
    let cli = Cli::parse();
    let is_tui = matches!(cli.command, None | Some(Commands::Tui));

    // Held until exit so buffered file writes are flushed.
    let _log_guard = init_logging(is_tui, cli.debug);

    let config = match load_config(&cli.config, cli.base_url.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(cli.command.unwrap_or(Commands::Tui), &config)) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Install the tracing subscriber.
///
/// The TUI owns the terminal, so console output is dropped in TUI mode.
fn init_logging(is_tui: bool, debug: bool) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let console = if is_tui {
        fmt::layer()
            .with_writer(std::io::sink)
            .with_target(false)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(console_filter)
            .boxed()
    };

    let (file, guard) = if debug {
        let log_dir = Path::new(MDCHAT_DIR).join("logs");
        std::fs::create_dir_all(&log_dir).ok();
        let appender = tracing_appender::rolling::daily(&log_dir, "debug.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .with_filter(EnvFilter::new(DEBUG_FILE_FILTER));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry().with(console).with(file).init();
    guard
}

/// Load the config file and apply environment and flag overrides.
///
/// The flag wins over the environment, which wins over the file.
fn load_config(path: &Path, base_url: Option<String>) -> Result<Config, mdchat_engine::ConfigError> {
    Ok(Config::load_or_default(path)?
        .with_env_overrides()
        .with_base_url_override(base_url))
}

async fn run(command: Commands, config: &Config) -> CliResult {
    match command {
        Commands::Tui => mdchat_tui::run_tui(config).await,
        Commands::Chat => cmd_chat(config).await,
        Commands::History { command } => match command {
            HistoryCommand::List => cmd_history_list(config).await,
            HistoryCommand::Show { file } => cmd_history_show(config, file.into()).await,
            HistoryCommand::Delete { file } => cmd_history_delete(config, file.into()).await,
        },
        Commands::New => cmd_new(config).await,
    }
}

fn controller(config: &Config) -> Result<ConversationController, mdchat_engine::ClientError> {
    let api = HttpChatApi::from_config(config)?;
    info!(base_url = %api.base_url(), "Using backend");
    Ok(ConversationController::with_config(Arc::new(api), config))
}

async fn cmd_chat(config: &Config) -> CliResult {
    let controller = controller(config)?;
    println!("Chatting with {}. Type 'exit' to quit.", config.base_url);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if is_exit_command(&line) {
            break;
        }
        // Blank lines are not sent
        let Some(resync) = controller.send_message(line).await? else {
            continue;
        };
        if let Some(reply) = controller.read(|c| c.last_assistant_message().cloned()) {
            println!("{}\n", reply.text);
        }
        resync.settled().await;
    }

    Ok(())
}

fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

async fn cmd_history_list(config: &Config) -> CliResult {
    let controller = controller(config)?;
    controller.refresh_histories().await?;

    let histories = controller.view().histories;
    if histories.is_empty() {
        println!("No saved chats");
        return Ok(());
    }
    for entry in &histories {
        println!("{:<30} {}", entry.display_name(), entry.filename());
    }
    Ok(())
}

async fn cmd_history_show(config: &Config, entry: HistoryEntry) -> CliResult {
    let controller = controller(config)?;
    controller.load_history(entry).await?;

    let view = controller.view();
    println!("{}", join_blocks(view.messages.iter().map(|m| m.text.as_str())));
    Ok(())
}

fn join_blocks<'a>(blocks: impl Iterator<Item = &'a str>) -> String {
    blocks.collect::<Vec<_>>().join("\n---\n")
}

async fn cmd_history_delete(config: &Config, entry: HistoryEntry) -> CliResult {
    let controller = controller(config)?;
    let name = entry.to_string();
    controller.delete_history(entry).await?.settled().await;
    println!("Deleted {name}");
    Ok(())
}

async fn cmd_new(config: &Config) -> CliResult {
    let api = HttpChatApi::from_config(config)?;
    let response = api.new_chat().await?;
    info!(response = %response, "New chat started");
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
