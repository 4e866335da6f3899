//! minisig Signing Server Main Program
//!
//! 1. Load configuration (file, environment, command line)
//! 2. Load the minisign keypair
//! 3. Serve `/`, `/sign` and `/minisign.pub` until Ctrl+C

use anyhow::{Context, Result};
use clap::Parser;
use minisig_server::config::{self, resolve_listen_addr, validate_config};
use minisig_server::keystore::load_signer;
use minisig_server::server::{create_router, AppState};
use minisig_server::ServerConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

/// minisign digest signing server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server name [default: minisig.me]
    #[arg(long)]
    name: Option<String>,

    /// Base URL of the server, also the signer identity [default: https://minisig.me]
    #[arg(long)]
    url: Option<String>,

    /// Listen address of the server [default: :8080]
    #[arg(long)]
    listen: Option<String>,

    /// Public key file [default: minisign.pub]
    #[arg(short = 'p', long = "public-key")]
    public_key: Option<PathBuf>,

    /// Secret key file [default: $HOME/.minisign/minisign.key]
    #[arg(short = 's', long = "secret-key")]
    secret_key: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// Command line arguments override file and environment
    fn apply(self, config: &mut ServerConfig) {
        if let Some(name) = self.name {
            config.name = name;
        }
        if let Some(url) = self.url {
            config.base_url = url;
        }
        if let Some(listen) = self.listen {
            config.listen = listen;
        }
        if let Some(path) = self.public_key {
            config.public_key_path = path;
        }
        if let Some(path) = self.secret_key {
            config.secret_key_path = path;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Initialize logging
    init_logging(&args.log_level)?;

    info!("🚀 Starting minisig server v{}", env!("CARGO_PKG_VERSION"));

    // 2. Load configuration
    let mut config =
        config::load_config(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);

    // 3. Validate configuration
    validate_configuration(&config)?;

    // 4. Load keys
    info!("Loading keys...");
    let signer = load_signer(&config).context("Failed to load keys")?;
    info!("✅ Keys ready");

    // 5. Serve
    let addr = resolve_listen_addr(&config.listen)?;
    let state = AppState::new(&config.name, &config.base_url, Arc::new(signer));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}...", config.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("👋 Server shutting down gracefully");
    Ok(())
}

/// Initialize logging system
fn init_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => {
            eprintln!("⚠️  Unknown log level: {}, using INFO", log_level);
            tracing::Level::INFO
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Validate configuration validity
fn validate_configuration(config: &ServerConfig) -> Result<()> {
    info!("🔍 Validating configuration...");
    info!("   - Name: {}", config.name);
    info!("   - Base URL: {}", config.base_url);
    info!("   - Listen: {}", config.listen);
    info!("   - Public key: {}", config.public_key_path.display());
    info!("   - Secret key: {}", config.secret_key_path.display());

    validate_config(config).context("Invalid configuration")
}

/// Resolves on Ctrl+C
async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("🛑 Received Ctrl+C signal, preparing to shutdown..."),
        Err(err) => {
            error!("❌ Cannot listen to shutdown signal: {}", err);
            std::future::pending::<()>().await;
        }
    }
}
