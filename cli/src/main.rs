//! gateway: serve a full node's command-line front-end over authenticated HTTP.
//!
//! Two subcommands:
//! - `gateway serve`: HTTP server mapping each route onto one node command
//! - `gateway routes`: print the route catalogue

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use blockchain_gateway::registry::routes::{groups, RouteGroup};
use blockchain_gateway::registry::{ParamSource, ParamSpec, RouteSpec, TimeoutClass};
use blockchain_gateway::{CommandRegistry, Dispatcher, GatewayConfig};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const CONFIG_FILE: &str = "gateway.toml";

/// gateway: authenticated HTTP front for a node's command-line interface.
#[derive(Parser)]
#[command(
    name = "gateway",
    version,
    about = "Authenticated HTTP gateway onto a full node's command-line front-end"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the route catalogue over HTTP
    Serve {
        /// Path to gateway.toml [default: ./gateway.toml or <config dir>/blockchain-gateway/gateway.toml]
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Bind address (overrides server.host)
        #[arg(long)]
        host: Option<String>,
        /// HTTP port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print every route with its command, parameters and output shape
    Routes,
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, host, port } => {
            let cancel = CancellationToken::new();

            // Ctrl-C cancels the root token for graceful shutdown
            let cancel_for_signal = cancel.clone();
            tokio::spawn(async move {
                tokio::signal::ctrl_c().await.ok();
                tracing::info!("shutting down gateway...");
                cancel_for_signal.cancel();
            });

            let mut config = match resolve_config(config) {
                Some(path) => {
                    tracing::info!(path = %path.display(), "loading config");
                    GatewayConfig::load(&path).await?
                }
                None => {
                    tracing::info!("no {} found, using defaults", CONFIG_FILE);
                    GatewayConfig::default()
                }
            };
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            run_serve(config, cancel).await?;
        }
        Commands::Routes => print_routes()?,
    }

    Ok(())
}

/// Build the dispatcher and serve until cancelled.
async fn run_serve(config: GatewayConfig, cancel: CancellationToken) -> Result<()> {
    let dispatcher = Dispatcher::from_config(&config).context("refusing to start")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        routes = dispatcher.registry().len(),
        "gateway listening"
    );

    blockchain_gateway::serve(listener, Arc::new(dispatcher), cancel)
        .await
        .context("gateway HTTP server error")?;

    tracing::info!("gateway stopped");
    Ok(())
}

/// Resolve config file path: explicit flag → ./gateway.toml →
/// <config dir>/blockchain-gateway/gateway.toml → none (built-in defaults).
fn resolve_config(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }

    let local = Path::new(CONFIG_FILE);
    if local.exists() {
        return Some(local.to_path_buf());
    }

    dirs::config_dir()
        .map(|dir| dir.join("blockchain-gateway").join(CONFIG_FILE))
        .filter(|path| path.exists())
}

fn print_routes() -> Result<()> {
    // Validates the catalogue before printing it
    let registry = CommandRegistry::builtin()?;

    for group in groups() {
        println!("[{}]", group.name());
        for route in group.routes() {
            println!("  {}", describe(&route));
        }
        println!();
    }
    println!("{} routes, plus GET /ping.json", registry.len());
    Ok(())
}

/// One catalogue line, e.g. `GET  /get_block_hash.json/:index  getblockhash <index:integer>  wrap-scalar:block_hash`.
fn describe(route: &RouteSpec) -> String {
    let mut command = route.verb.to_string();
    for param in &route.params {
        command.push(' ');
        command.push_str(&describe_param(param));
    }

    let mut flags = Vec::new();
    if route.timeout == TimeoutClass::Slow {
        flags.push("slow");
    }
    if route.sensitive {
        flags.push("sensitive");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!("  ({})", flags.join(", "))
    };

    format!(
        "{:<5}{:<62}{:<60}{}{}",
        route.method.to_string(),
        route.path.as_str(),
        command,
        route.output,
        flags
    )
}

fn describe_param(param: &ParamSpec) -> String {
    match (param.source, param.required, param.default) {
        (ParamSource::Fixed(value), _, _) => value.to_string(),
        (_, true, _) => format!("<{}:{}>", param.name, param.ty),
        (_, false, Some(default)) => format!("[{}:{}={}]", param.name, param.ty, default),
        (_, false, None) => format!("[{}:{}]", param.name, param.ty),
    }
}
