//! membrane-tools: inspect and call the Membrane agent tool catalog.
//!
//! Usage:
//!   membrane-tools tools                         List the catalog
//!   membrane-tools manifest --framework openai   Print a framework manifest
//!   membrane-tools call <name> --args '{...}'    Invoke one tool
//!   membrane-tools watch-session <id>            Poll an agent session until it settles
//!   membrane-tools watch-connection <id>         Poll a connection request until it settles
//!   membrane-tools configure --token <TOKEN>     Save credentials to the config file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use membrane_tools::adapters::Dispatcher;
use membrane_tools::config::{self, MembraneConfig};
use membrane_tools::polling::{self, PollOptions};
use membrane_tools::{standard_catalog, Framework, RequestOptions, ToolCatalog};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "membrane-tools")]
#[command(version)]
#[command(about = "Membrane API operations as LLM agent tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (defaults to ~/.membrane/config.toml).
    #[arg(long, global = true)]
    config: Option<String>,

    /// Override the Membrane API base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log level (debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the tools in the catalog.
    Tools,

    /// Print the tool manifest for an agent framework.
    Manifest {
        /// openai, anthropic, mcp or toolset (alias: vercel).
        #[arg(long, default_value = "openai")]
        framework: Framework,

        /// Restrict the manifest to these tools (comma-separated).
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
    },

    /// Invoke a tool with JSON arguments.
    Call {
        name: String,

        /// JSON object of arguments.
        #[arg(long, default_value = "{}")]
        args: String,

        /// Abort the request after this many seconds.
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Poll an agent session until it is no longer running.
    WatchSession {
        session_id: String,

        /// Seconds between polls.
        #[arg(long, default_value_t = 2)]
        interval: u64,

        /// Give up after this many seconds.
        #[arg(long, default_value_t = 300)]
        max_wait: u64,

        /// Server-side long-poll seconds per request (1-60).
        #[arg(long, default_value_t = 30)]
        server_wait: u32,
    },

    /// Poll a connection request until it succeeds or fails.
    WatchConnection {
        request_id: String,

        /// Seconds between polls.
        #[arg(long, default_value_t = 2)]
        interval: u64,

        /// Give up after this many seconds.
        #[arg(long, default_value_t = 300)]
        max_wait: u64,
    },

    /// Save the API token and base URL to the config file.
    Configure {
        #[arg(long)]
        token: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli
        .config
        .as_deref()
        .map(config::expand_path)
        .unwrap_or_else(config::default_config_path);

    match cli.command {
        Commands::Tools => cmd_tools(),
        Commands::Manifest { framework, only } => cmd_manifest(framework, &only),
        Commands::Call {
            name,
            args,
            timeout,
        } => {
            let cfg = config::resolve_config(&config_path, cli.api_url.as_deref())?;
            cmd_call(&cfg, &name, &args, timeout).await
        }
        Commands::WatchSession {
            session_id,
            interval,
            max_wait,
            server_wait,
        } => {
            let cfg = config::resolve_config(&config_path, cli.api_url.as_deref())?;
            let options = PollOptions::default()
                .with_interval(Duration::from_secs(interval))
                .with_max_wait(Some(Duration::from_secs(max_wait)))
                .with_server_wait(Some(server_wait.clamp(1, 60)));
            cmd_watch(&cfg, Watch::Session(session_id), options).await
        }
        Commands::WatchConnection {
            request_id,
            interval,
            max_wait,
        } => {
            let cfg = config::resolve_config(&config_path, cli.api_url.as_deref())?;
            let options = PollOptions::default()
                .with_interval(Duration::from_secs(interval))
                .with_max_wait(Some(Duration::from_secs(max_wait)));
            cmd_watch(&cfg, Watch::Connection(request_id), options).await
        }
        Commands::Configure { token } => cmd_configure(&config_path, token, cli.api_url),
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

fn cmd_tools() -> Result<()> {
    let catalog = standard_catalog();

    println!();
    println!("{}", format!("=== Membrane Tools ({}) ===", catalog.len()).bold());
    println!();
    for tool in catalog.iter() {
        let schema = tool.parameters();
        println!("  {}", tool.name().green().bold());
        println!("    {}", tool.description());
        let required = schema.required();
        let optional = schema.optional();
        if !required.is_empty() {
            println!("    {}: {}", "required".bold(), required.join(", "));
        }
        if !optional.is_empty() {
            println!("    {}: {}", "optional".dimmed(), optional.join(", "));
        }
        println!();
    }

    Ok(())
}

fn cmd_manifest(framework: Framework, only: &[String]) -> Result<()> {
    let catalog = select_tools(only)?;
    let manifest = framework
        .manifest(&catalog)
        .with_context(|| format!("Failed to build {} manifest", framework))?;
    println!("{}", serde_json::to_string_pretty(&manifest)?);
    Ok(())
}

async fn cmd_call(cfg: &MembraneConfig, name: &str, args: &str, timeout: Option<u64>) -> Result<()> {
    let mut options = RequestOptions::default().with_cancel(ctrl_c_token());
    if let Some(secs) = timeout {
        options = options.with_timeout(Duration::from_secs(secs));
    }
    let dispatcher = Dispatcher::new(standard_catalog(), cfg)?.with_options(options);

    info!("Calling {} against {}", name, cfg.resolved_api_url());
    let result = dispatcher
        .dispatch_json(name, args)
        .await
        .with_context(|| format!("{} failed", name))?;
    print_json(&result)
}

enum Watch {
    Session(String),
    Connection(String),
}

async fn cmd_watch(cfg: &MembraneConfig, target: Watch, options: PollOptions) -> Result<()> {
    let options = options.with_cancel(ctrl_c_token());
    let dispatcher = Dispatcher::new(standard_catalog(), cfg)?;

    let result = match &target {
        Watch::Session(id) => {
            println!("{} Watching agent session {}", ">>>".green().bold(), id);
            polling::wait_for_agent_session(&dispatcher, id, &options)
                .await
                .with_context(|| format!("Failed while watching session {}", id))?
        }
        Watch::Connection(id) => {
            println!("{} Watching connection request {}", ">>>".green().bold(), id);
            polling::wait_for_connection_request(&dispatcher, id, &options)
                .await
                .with_context(|| format!("Failed while watching connection request {}", id))?
        }
    };

    let status = result
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    println!("{} Settled: {}", "<<<".green().bold(), colorize_status(status));
    print_json(&result)
}

fn cmd_configure(path: &Path, token: Option<String>, api_url: Option<String>) -> Result<()> {
    let mut cfg = config::load_config(path)?;
    if let Some(token) = token {
        cfg.api_key = token;
    }
    if let Some(url) = api_url {
        cfg.api_url = Some(url);
    }
    if !cfg.has_api_key() {
        warn!("Saving config without an API token");
    }
    config::save_config(&cfg, path)?;

    println!("{} Saved config to {}", ">>>".green().bold(), path.display());
    println!("  API URL: {}", cfg.resolved_api_url());
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn select_tools(only: &[String]) -> Result<ToolCatalog> {
    let catalog = standard_catalog();
    if only.is_empty() {
        return Ok(catalog.clone());
    }
    let names: Vec<&str> = only.iter().map(|s| s.trim()).collect();
    catalog
        .select(&names)
        .context("Unknown tool in --only")
}

/// Token cancelled on the first Ctrl+C.
fn ctrl_c_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{} Cancelling...", "<<<".red().bold());
            trigger.cancel();
        }
    });
    token
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn colorize_status(status: &str) -> String {
    match status {
        "success" | "idle" => status.green().to_string(),
        "running" | "pending" => status.yellow().to_string(),
        "error" | "aborted" => status.red().to_string(),
        _ => status.dimmed().to_string(),
    }
}
