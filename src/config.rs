//! Service configuration.
//!
//! Command-line flags win over environment variables, which win over the
//! defaults. A `.env` file is loaded by the binary before parsing.

use clap::{Parser, ValueEnum};

/// Which persistence backend to run against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// Relational store at `database_url`
    #[default]
    Sqlite,
    /// Process-local store, lost on exit
    Memory,
}

#[derive(Debug, Parser)]
#[command(name = "users-api", about = "HTTP CRUD service for users")]
pub struct Args {
    #[arg(long, env = "PORT", default_value_t = 8000, help = "Port to listen on")]
    pub port: u16,

    #[arg(long, env = "USERS_API_HOST", default_value = "0.0.0.0", help = "Bind address")]
    pub host: String,

    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite://users.db?mode=rwc",
        help = "SQLite connection URL"
    )]
    pub database_url: String,

    #[arg(
        long,
        env = "USERS_API_STORE",
        value_enum,
        default_value_t = StoreKind::Sqlite,
        help = "Persistence backend"
    )]
    pub store: StoreKind,

    #[arg(
        long,
        env = "USERS_API_SERVICE",
        default_value = "users-api",
        help = "Service name reported by /health"
    )]
    pub service_name: String,

    #[arg(
        long,
        env = "USERS_API_LOG",
        default_value = "info",
        help = "Log filter when RUST_LOG is unset"
    )]
    pub log_level: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub store: StoreKind,
    pub service_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            database_url: "sqlite://users.db?mode=rwc".to_string(),
            store: StoreKind::Sqlite,
            service_name: "users-api".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            database_url: args.database_url,
            store: args.store,
            service_name: args.service_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "PORT",
        "USERS_API_HOST",
        "DATABASE_URL",
        "USERS_API_STORE",
        "USERS_API_SERVICE",
        "USERS_API_LOG",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_match_server_config() {
        clear_env();
        let config = ServerConfig::from(Args::parse_from(["users-api"]));
        let default = ServerConfig::default();

        assert_eq!(config.port, default.port);
        assert_eq!(config.host, default.host);
        assert_eq!(config.database_url, default.database_url);
        assert_eq!(config.store, StoreKind::Sqlite);
        assert_eq!(config.service_name, "users-api");
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("PORT", "9100");
        std::env::set_var("USERS_API_STORE", "memory");

        let args = Args::parse_from(["users-api"]);
        clear_env();

        assert_eq!(args.port, 9100);
        assert_eq!(args.store, StoreKind::Memory);
    }

    #[test]
    #[serial]
    fn test_flags_beat_env() {
        clear_env();
        std::env::set_var("PORT", "9100");

        let args = Args::parse_from(["users-api", "--port", "9200", "--log-level", "debug"]);
        clear_env();

        assert_eq!(args.port, 9200);
        assert_eq!(args.log_level, "debug");
    }
}
