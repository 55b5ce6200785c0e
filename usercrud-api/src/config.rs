/// Configuration management for the API server
///
/// This module loads configuration from environment variables (and a `.env`
/// file if present) into a type-safe struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 3000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `USER_STORE`: `postgres` or `memory` (default: postgres)
/// - `DATABASE_URL`: PostgreSQL connection string
/// - `DATABASE_HOST`, `DATABASE_PORT`, `DATABASE_USER`, `DATABASE_PASSWORD`,
///   `DATABASE_NAME`: used to build the connection string when
///   `DATABASE_URL` is not set
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `RUN_MIGRATIONS`: Apply migrations at startup (default: true)
/// - `RUST_LOG`: Log filter (default: usercrud_api=debug,usercrud_shared=debug,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use usercrud_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use usercrud_shared::db::pool;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Which storage backend to use
    pub store: StoreKind,

    /// Database configuration (only used by the postgres store)
    pub database: DatabaseConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` allows any)
    pub cors_origins: Vec<String>,
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// PostgreSQL via sqlx
    Postgres,

    /// Process-local store, data is lost on restart
    Memory,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            other => anyhow::bail!("USER_STORE must be 'postgres' or 'memory', got '{}'", other),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Whether to apply pending migrations at startup
    pub run_migrations: bool,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The postgres store is selected without `DATABASE_URL` or `DATABASE_HOST`
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup
    ///
    /// `from_env` is this function over the process environment.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_host = get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let api_port = get("API_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is not a valid port: {}", e))?;

        let cors_origins: Vec<String> = get("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let store = match get("USER_STORE") {
            Some(value) => value.parse::<StoreKind>()?,
            None => StoreKind::Postgres,
        };

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => match get("DATABASE_HOST") {
                Some(host) => build_database_url(&host, &get)?,
                None if store == StoreKind::Postgres => anyhow::bail!(
                    "DATABASE_URL or DATABASE_HOST environment variable is required"
                ),
                None => String::new(),
            },
        };

        let max_connections = get("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()?;

        let run_migrations = match get("RUN_MIGRATIONS") {
            Some(value) => parse_bool(&value)
                .ok_or_else(|| anyhow::anyhow!("RUN_MIGRATIONS must be true or false"))?,
            None => true,
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            store,
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                run_migrations,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Returns true when any origin may call the API
    pub fn cors_permissive(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }

    /// Pool settings for the shared database layer
    pub fn pool_config(&self) -> pool::DatabaseConfig {
        pool::DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            ..Default::default()
        }
    }
}

/// Assembles a connection URL from the discrete `DATABASE_*` variables
fn build_database_url<F>(host: &str, get: &F) -> anyhow::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let port = get("DATABASE_PORT")
        .unwrap_or_else(|| "5432".to_string())
        .parse::<u16>()
        .map_err(|e| anyhow::anyhow!("DATABASE_PORT is not a valid port: {}", e))?;
    let user = get("DATABASE_USER").unwrap_or_else(|| "postgres".to_string());
    let name = get("DATABASE_NAME").unwrap_or_else(|| "users".to_string());

    let credentials = match get("DATABASE_PASSWORD") {
        Some(password) if !password.is_empty() => format!("{}:{}", user, password),
        _ => user,
    };

    Ok(format!(
        "postgresql://{}@{}:{}/{}",
        credentials, host, port, name
    ))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
