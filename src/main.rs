//! Prisme - multi-thinker subject analysis server
//!
//! An HTTP service that takes a free-text subject and returns, for each
//! thinker of a fixed roster, a structured analysis generated by Gemini
//! with schema-constrained JSON output.
//!
//! Exit codes:
//!   0 - Clean shutdown
//!   1 - Startup error (missing API key, bad config, bind failure, etc.)

mod analysis;
mod cli;
mod config;
mod error;
mod generation;
mod models;
mod server;

use analysis::Analyzer;
use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE};
use generation::GeminiClient;
use server::AppState;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads env-backed flags
    let dotenv_path = dotenvy::dotenv().ok();

    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Prisme v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = dotenv_path {
        debug!("Loaded environment from {}", path.display());
    }

    match run_server(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Server failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .prisme.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the model, the port and the thinker roster.");
    Ok(())
}

/// Initialize logging based on verbosity settings. `RUST_LOG` wins when set.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().to_string().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Build the pipeline and serve until Ctrl+C.
async fn run_server(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Fail fast: no listener without a credential
    let gemini_config = config.gemini()?;
    let roster = config.roster()?;
    let addr = config.bind_addr()?;

    let client = GeminiClient::new(gemini_config)?;
    let model = client.model().to_string();
    let analyzer = Analyzer::new(Arc::new(client), roster);
    let thinkers = format!(
        "{} ({})",
        analyzer.roster().joined(),
        analyzer.roster().len()
    );
    let router = server::build_router(AppState::new(analyzer));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    print_banner(&config, &model, &thinkers);
    info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

fn print_banner(config: &Config, model: &str, thinkers: &str) {
    println!();
    println!("🚀 Prisme backend started");
    println!("   URL: http://{}:{}", config.server.host, config.server.port);
    println!("   Model: {}", model);
    println!("   API key: ✅ configured");
    match config.model.timeout_seconds {
        Some(secs) => println!("   Timeout: {}s", secs),
        None => println!("   Timeout: none"),
    }
    println!("   Thinkers: {}", thinkers);
    println!();
    println!("   Routes:");
    for route in server::AVAILABLE_ROUTES {
        println!("     • {}", route);
    }
    println!("\n   Press Ctrl+C to stop the server\n");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    Config::resolve(args.config.as_deref(), std::path::Path::new(CONFIG_FILE))
}
