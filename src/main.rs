//! gamesbot answers trivia questions posted to a hub and learns new words
//!
//! Usage:
//!   gamesbot --api-url 127.0.0.1:3000 --auth-token T --settings-path ./settings
//!   gamesbot ... --log-path ./logs                  → also write daily log files
//!   gamesbot ... --read-timeout-secs 120 --reconnect → survive a silent hub
//!
//! `settings-path` holds `config.json` and `words.json` unless overridden.

use anyhow::Context;
use clap::Parser;
use gamesbot_client::{run, EventSink, HttpEventSink, LogSink, WsConnector};
use gamesbot_core::{BotConfig, CorrelationMode, Error, FileConfig};
use gamesbot_engine::{GameHandler, KnowledgeIndex};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "gamesbot",
    about = "Trivia hub participant that solves questions and learns words",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    /// Hub service address (host:port)
    #[arg(long = "api-url", alias = "apiUrl")]
    api_url: String,

    /// Extension name, used as the log file prefix
    #[arg(long, default_value = "gamesbot")]
    name: String,

    /// Session token for the hub's event endpoint
    #[arg(long = "auth-token", alias = "authToken", env = "GAMESBOT_AUTH_TOKEN")]
    auth_token: String,

    /// Directory holding config.json and words.json (default: current directory)
    #[arg(long = "settings-path", alias = "settingsPath")]
    settings_path: Option<PathBuf>,

    /// Write logs to daily files in this directory (in addition to stderr)
    #[arg(long = "log-path", alias = "logPath")]
    log_path: Option<PathBuf>,

    /// Config file (default: <settings-path>/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Knowledge index file (default: from config, else <settings-path>/words.json)
    #[arg(long)]
    words: Option<PathBuf>,

    /// Give up on a silent hub after this many seconds
    #[arg(long)]
    read_timeout_secs: Option<u64>,

    /// Match replies to requests by callback_id instead of arrival order
    #[arg(long, default_value_t = false)]
    correlate_by_id: bool,

    /// Fail the handshake if the hub rejects our credentials
    #[arg(long, default_value_t = false)]
    strict_auth: bool,

    /// Reconnect after a timeout or dropped connection
    #[arg(long, default_value_t = false)]
    reconnect: bool,

    /// Keep diagnostic events local instead of posting them to the hub
    #[arg(long, default_value_t = false)]
    no_remote_events: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_path.as_deref(), &cli.name);

    let (config, handler) = match load(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("gamesbot: {:#}", e);
            return ExitCode::from(1);
        }
    };

    let events: Arc<dyn EventSink> = if cli.no_remote_events {
        Arc::new(LogSink)
    } else {
        Arc::new(HttpEventSink::new(
            config.events_url(),
            config.auth_token.clone(),
        ))
    };

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted");
            trigger.cancel();
        }
    });

    let connector = WsConnector::new(config.ws_url());
    match run(&connector, &config, handler, events, cancel).await {
        Ok(_) | Err(Error::Cancelled) => {
            tracing::info!("Shutting down");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Session failed: {}", e);
            eprintln!("gamesbot: {}", e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(log_dir: Option<&Path>, name: &str) -> Option<WorkerGuard> {
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "gamesbot=info".into()))
        .with(fmt::layer().with_writer(std::io::stderr));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, format!("{}.log", name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

/// Resolve configuration and open the knowledge index. Any failure here is
/// fatal and happens before the first connection attempt.
fn load(cli: &Cli) -> anyhow::Result<(BotConfig, GameHandler)> {
    let settings = match &cli.settings_path {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| settings.join(gamesbot_core::config::CONFIG_FILE));
    let base_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| settings.clone());

    let file = FileConfig::load(&config_path)?;
    let mut config = BotConfig::from_file(file, &cli.api_url, &cli.auth_token, &base_dir)?;

    if let Some(words) = &cli.words {
        config.words_path = words.clone();
    }
    if let Some(secs) = cli.read_timeout_secs {
        config.session.read_timeout = Some(Duration::from_secs(secs));
    }
    if cli.correlate_by_id {
        config.session.correlation = CorrelationMode::ById;
    }
    config.session.strict_auth |= cli.strict_auth;
    config.session.reconnect |= cli.reconnect;

    let index = KnowledgeIndex::load(&config.words_path)?;
    if index.is_empty() {
        tracing::warn!(
            "{} has no words yet; anagrams go unanswered until answers are revealed",
            index.path().display()
        );
    }
    let handler = GameHandler::new(index, config.own_nick.clone())?;
    tracing::info!(
        "Playing as {} against {} on {}",
        handler.own_nick(),
        config.host_nick,
        config.endpoint
    );
    Ok((config, handler))
}
