//! users-api: HTTP CRUD service for users.
//!
//! Usage:
//!   users-api [--port 8000] [--database-url sqlite://users.db?mode=rwc] [--store sqlite|memory]
//!
//! Environment variables:
//!   PORT - Port to listen on (default: 8000)
//!   DATABASE_URL - SQLite connection URL
//!   USERS_API_STORE - Persistence backend (sqlite or memory)
//!   RUST_LOG / USERS_API_LOG - Log filter (default: info)

use clap::Parser;
use tracing_subscriber::EnvFilter;
use users_api::config::ServerConfig;
use users_api::server::run;
use users_api::Args;

#[tokio::main]
async fn main() {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level);

    let config = ServerConfig::from(args);
    tracing::info!(
        port = config.port,
        store = ?config.store,
        "users-api starting"
    );

    if let Err(e) = run(config).await {
        tracing::error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
