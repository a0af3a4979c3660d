//! CLI entry point for the Nirdeshak relay.
//!
//! `nirdeshak serve` loads `.env`, validates configuration and runs the HTTP
//! server.  `nirdeshak check-config` only validates and prints a redacted
//! summary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nirdeshak_relay::RelayConfig;
use nirdeshak_web::{WebConfig, WebServer};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Nirdeshak: relay between the NirdeshakAI frontend and hosted AI services.
///
/// Running without a subcommand serves, so the serve flags are accepted at
/// the top level as well.
#[derive(Parser)]
#[command(name = "nirdeshak", version, about, args_conflicts_with_subcommands = true)]
struct Cli {
    /// Default log level when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(flatten)]
    serve: ServeArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP relay (the default).
    Serve(ServeArgs),

    /// Validate configuration and exit.
    CheckConfig,
}

#[derive(Debug, clap::Args)]
struct ServeArgs {
    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// Directory containing the health page `index.html`.
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    static_dir: PathBuf,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // `.env` must be loaded before clap reads env-backed arguments.
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "failed to load .env file"),
    }

    match cli.command {
        Some(Commands::Serve(args)) => cmd_serve(args).await,
        Some(Commands::CheckConfig) => cmd_check_config(),
        None => cmd_serve(cli.serve).await,
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

async fn cmd_serve(args: ServeArgs) -> Result<()> {
    let relay = RelayConfig::from_env().context("invalid relay configuration")?;
    info!(config = %relay.redacted_summary(), "configuration loaded");

    let web = WebConfig {
        bind_addr: args.host,
        port: args.port,
        static_dir: args.static_dir,
    };

    let server = WebServer::new(web, &relay).context("failed to initialize upstream clients")?;
    let addr = server.addr();
    server
        .start()
        .await
        .with_context(|| format!("web server on {addr} failed"))
}

fn cmd_check_config() -> Result<()> {
    let relay = RelayConfig::from_env().context("invalid relay configuration")?;
    println!("configuration OK");
    println!("  {}", relay.redacted_summary());
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber with the given default log level.
fn init_tracing(default_level: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
}
