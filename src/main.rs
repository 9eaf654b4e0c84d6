//! Lead Service: REST API server
//!
//! ```sh
//! # Run with default config (~/.config/lead-service/config.toml)
//! lead-service
//!
//! # Custom config path and a database
//! lead-service --config /etc/lead-service/config.toml --database-url postgres://...
//!
//! # Validate config without starting
//! lead-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use lead_service::config::AppConfig;
use lead_service::server::{init_tracing, ServerHandle, ServerOptions};

/// Lead management REST API.
#[derive(Parser, Debug)]
#[command(
    name = "lead-service",
    version,
    about = "Lead management REST API",
    long_about = "REST API for managing sales leads with filtered, paginated listing.\n\n\
                  Without a database URL the service runs in demo mode on seeded in-memory data.\n\
                  Default config: ~/.config/lead-service/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "LEADS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the database URL (postgres:// or sqlite://).
    #[arg(long)]
    database_url: Option<String>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Serve seeded in-memory data even when a database is configured.
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(lead_service::default_config_path);

    let loaded = AppConfig::load(&config_path);
    let mut config = loaded.as_ref().cloned().unwrap_or_default();
    config.apply_env();

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(url) = cli.database_url.clone() {
        config.database.url = url;
    }
    if let Some(level) = cli.log_level.clone() {
        config.logging.level = level;
    }

    init_tracing(&config);
    match &loaded {
        Ok(_) => info!("Configuration loaded from {}", config_path.display()),
        Err(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        config.validate()?;
        println!("✅ Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Address     : {}:{}", config.server.host, config.server.port);
        println!("   Environment : {}", config.server.environment);
        println!(
            "   Store       : {}",
            if cli.demo || config.is_demo() { "demo (in-memory)" } else { "database" }
        );
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        force_demo: cli.demo,
    })
    .await?;

    handle.install_signal_handler();
    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
