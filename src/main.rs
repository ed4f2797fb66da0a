//! argonaut — a keyboard-driven terminal UI for operating ArgoCD

use anyhow::Result;
use argonaut::api::{ArgoClient, ServerOptions};
use argonaut::config::ConfigLoader;
use argonaut::tui::Theme;
use clap::Parser;

/// A keyboard-driven terminal UI for operating ArgoCD
#[derive(Parser, Debug)]
#[command(name = "argonaut")]
#[command(about = "Navigate, sync, diff and roll back ArgoCD applications", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    /// ArgoCD server address (overrides ARGOCD_SERVER and the CLI config)
    #[arg(long)]
    server: Option<String>,

    /// ArgoCD auth token (overrides ARGOCD_AUTH_TOKEN and the CLI config)
    #[arg(long)]
    auth_token: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(Command::Version) = args.command {
        argonaut::cli::display_version(args.debug);
        return Ok(());
    }

    let log_file = argonaut::cli::init_logging(args.debug);
    if let Some(ref path) = log_file {
        eprintln!("Debug logging enabled. Logs written to: {}", path.display());
    }

    let config = ConfigLoader::load();

    let theme_name = config.appearance.theme.clone();
    let theme = Theme::named(&theme_name).unwrap_or_else(|e| {
        tracing::warn!("Failed to load theme '{}': {}, using default", theme_name, e);
        Theme::default()
    });

    let opts = ServerOptions::resolve(args.server, args.auth_token, args.insecure);
    // No API server reachable at all: start in the core-detected warning
    // instead of failing blind
    let client = match opts.server {
        Some(_) => Some(ArgoClient::new(&opts)?),
        None => {
            tracing::warn!("no ArgoCD server configured; starting in core-detected mode");
            None
        }
    };

    argonaut::tui::run_tui(client, config, theme, theme_name).await
}
