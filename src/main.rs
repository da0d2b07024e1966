//! qa-helper — service entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Resolve effective log level (CLI `-v` flags > env/config) and init logger
//!   4. Build the LLM provider (fails fast when the API key is missing)
//!   5. Build memory, knowledge store and agent
//!   6. Spawn Ctrl-C → shutdown signal watcher
//!   7. Serve HTTP (and the console with `-i`) until shutdown

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use qa_helper::agent::{Agent, CompletionClient};
use qa_helper::error::AppError;
use qa_helper::knowledge::KnowledgeStore;
use qa_helper::memory::SharedMemory;
use qa_helper::{config, console, http, llm, logger};

struct CliArgs {
    log_level: Option<&'static str>,
    interactive: bool,
    config_path: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — the file is optional.
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    let (effective_log_level, force_cli_level) = logger::resolve(args.log_level, &config.log_level);
    logger::init(effective_log_level, force_cli_level)?;

    info!(
        service = %config.service_name,
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        llm_provider = %config.llm.provider,
        llm_model = %config.llm.openai.model,
        max_messages = config.memory.max_messages,
        "config loaded"
    );

    let provider = llm::providers::build(&config.llm, config.llm_api_key.clone())
        .map_err(|e| AppError::Config(e.to_string()))?;

    if let Err(e) = provider.ping().await {
        warn!(provider = provider.name(), "LLM backend not reachable at startup: {e}");
    }

    let memory = SharedMemory::new(config.memory.max_messages);
    let completion = CompletionClient::new(
        provider,
        Duration::from_secs(config.llm.openai.timeout_seconds),
    );
    let agent = Agent::new(KnowledgeStore::builtin(), memory, completion);

    // Shared shutdown token — Ctrl-C cancels it, all tasks watch it.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    if args.interactive {
        let console_agent = agent.clone();
        let console_token = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = console::run(console_agent, console_token).await {
                warn!("console exited with error: {e}");
            }
        });
    }

    let state = http::HttpState::new(config.service_name.as_str(), agent);
    http::run(config.http.bind.clone(), state, shutdown).await?;

    info!("shutdown complete");
    Ok(())
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut interactive = false;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: qa-helper [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -i, --interactive          Also chat on stdin/stdout");
                println!("  -f, --config <PATH>        Path to configuration file (default: {})", config::DEFAULT_CONFIG_PATH);
                println!("  -v, -vv, -vvv, -vvvv       Set log level (warn, info, debug, trace)");
                std::process::exit(0);
            }
            "-i" | "--interactive" => interactive = true,
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            other => eprintln!("warning: ignoring unknown argument '{other}'"),
        }
    }

    CliArgs { log_level: logger::verbosity_level(verbosity), interactive, config_path }
}
