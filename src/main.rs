//! presence: behavioral-signal presence engine
//!
//! Usage:
//!   presence simulate trace.jsonl          → replay a trace on a manual clock
//!   presence run --config presence.toml    → live: JSONL actions on stdin
//!   presence dump-config                   → print the default config

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use presence::format::{format_event, format_report, format_snapshot};
use presence::simulate::{simulate, SimulateOptions};
use presence::trace::{parse_action, parse_trace, ParseResult, TraceAction};
use presence_core::{Clock, Error, SystemClock};
use presence_runtime::{PresenceConfig, PresenceRuntime};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "presence",
    about = "Living-interface presence engine driven by behavioral signals",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSONL trace and print every transition and whisper
    Simulate {
        /// Trace file, one {"at": ms, "input"|"command": ...} per line
        trace: PathBuf,
        /// Path to config file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Seed for the engine's random draws (overrides the config)
        #[arg(long)]
        seed: Option<u64>,
        /// Local hour at which the trace starts
        #[arg(long, default_value_t = 12)]
        start_hour: u8,
        /// Keep the clock running until this offset in milliseconds
        #[arg(long)]
        until_ms: Option<u64>,
        /// Print events as JSON lines instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Drive a live session from stdin until Ctrl-C
    Run {
        /// Path to config file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the default configuration as TOML
    DumpConfig,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "presence=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> PresenceConfig {
    match path {
        Some(path) => PresenceConfig::load(path),
        None => PresenceConfig::default(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Simulate {
            trace,
            config,
            seed,
            start_hour,
            until_ms,
            json,
        } => {
            anyhow::ensure!(start_hour < 24, "--start-hour must be 0-23, got {}", start_hour);
            let config = load_config(config.as_deref());
            let ParseResult { records, errors } =
                parse_trace(&trace).with_context(|| format!("reading {}", trace.display()))?;
            for error in errors {
                warn!("{}: {}", trace.display(), Error::from(error));
            }

            let options = SimulateOptions {
                seed,
                start_hour,
                until_ms,
            };
            let report = simulate(&records, &config, &options);

            if json {
                for event in &report.events {
                    println!("{}", serde_json::to_string(event)?);
                }
            } else {
                print!("{}", format_report(&report));
            }
        }

        Commands::Run { config } => {
            run(load_config(config.as_deref())).await?;
        }

        Commands::DumpConfig => {
            print!("{}", PresenceConfig::default().to_toml());
        }
    }

    Ok(())
}

async fn run(config: PresenceConfig) -> anyhow::Result<()> {
    let clock = Arc::new(SystemClock);
    let origin = clock.now_millis();
    let handle = PresenceRuntime::spawn(config, clock)?;
    info!("Live session {} started; reading actions from stdin", handle.session_id());

    let cancel = handle.cancellation_token();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted");
            ctrl_c.cancel();
        }
    });

    let mut snapshots = handle.subscribe();
    let mut events = handle.events();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            line = lines.next_line(), if stdin_open => match line? {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => match parse_action(&line) {
                    Ok(TraceAction::Input(input)) => handle.input(input).await?,
                    Ok(TraceAction::Command(command)) => handle.command(command).await?,
                    Err(e) => warn!("Skipping line: {}", e),
                },
                None => {
                    info!("stdin closed; Ctrl-C to stop");
                    stdin_open = false;
                }
            },

            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let line = format_snapshot(&snapshots.borrow_and_update());
                println!("{}", line);
            }

            event = events.recv() => match event {
                Ok(event) => println!("{}", format_event(&event, origin)),
                Err(RecvError::Lagged(n)) => warn!("Dropped {} events", n),
                Err(RecvError::Closed) => break,
            },
        }
    }

    handle.shutdown().await?;
    Ok(())
}
