use anyhow::{Context, Result};
use clap::Parser;
use gh_diff_share::{
    logger, parse_call, DeliveryError, DeliveryOrchestrator, InputError, RequestDefaults,
    ToolCall,
};
use gh_diff_share_config::{load_dotenv, RuntimeEnvironment, ShareConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::io::AsyncReadExt;

/// Render a diff as HTML and deliver it as a secret gist, a local file or a data URI
#[derive(Parser, Debug)]
#[command(name = "gh-diff-share", version, about)]
struct Cli {
    /// JSON tool call ({"tool": ..., "arguments": {...}}); read from stdin when omitted
    file: Option<PathBuf>,

    /// Exit right after delivering instead of waiting for scheduled deletions
    #[arg(long)]
    no_wait: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match logger::init() {
        Ok(path) => log::info!("Starting gh-diff-share, logging to {}", path.display()),
        Err(e) => eprintln!("Warning: {:#}", e),
    }

    match run(&cli).await {
        Ok(()) => {
            log::info!("Exiting gh-diff-share");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{:#}", err);
            let (kind, code) = if is_input_error(&err) {
                ("invalid_params", 2)
            } else {
                ("internal_error", 1)
            };
            let report = serde_json::json!({
                "error": { "kind": kind, "message": format!("{:#}", err) }
            });
            eprintln!("{}", report);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    load_dotenv();
    let config = ShareConfig::load();
    let env = RuntimeEnvironment::from_env();
    log::debug!("Environment: {:?}", env);
    if !env.has_credential() {
        log::info!("GITHUB_TOKEN not set, gists are unavailable");
    }

    let input = read_input(cli.file.as_deref()).await?;
    let call: ToolCall =
        serde_json::from_str(&input).map_err(|e| InputError::Malformed(e.to_string()))?;

    let defaults = RequestDefaults::from_settings(&config, &env)?;
    let request = parse_call(&call, &defaults)?;

    let orchestrator = DeliveryOrchestrator::from_environment(&config, &env)?;
    let summary = orchestrator.deliver(&request).await?;
    print!("{}", summary);

    let scheduler = orchestrator.scheduler();
    let pending = scheduler.pending();
    if cli.no_wait || pending.is_empty() {
        return Ok(());
    }

    eprintln!(
        "Waiting for {} scheduled deletion(s), press Ctrl-C to skip",
        pending.len()
    );
    tokio::select! {
        _ = scheduler.wait_idle() => log::info!("All scheduled deletions done"),
        _ = tokio::signal::ctrl_c() => log::warn!("Interrupted, abandoning {:?}", scheduler.pending()),
    }
    Ok(())
}

async fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            tokio::io::stdin()
                .read_to_string(&mut input)
                .await
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

fn is_input_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<InputError>().is_some()
        || matches!(
            err.downcast_ref::<DeliveryError>(),
            Some(DeliveryError::Input(_))
        )
}
