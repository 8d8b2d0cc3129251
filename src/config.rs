//! Start-up configuration, read once from the environment (and `.env`).

use std::{env, fmt::Display, str::FromStr, time::Duration};

use anyhow::{Context, Result, anyhow};
use tracing::info;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Which [`crate::store::ShopStore`] the catalog service runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            other => Err(format!("unknown store `{other}`, expected `postgres` or `memory`")),
        }
    }
}

/// Allowed CORS origins; `None` means any origin.
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub origins: Option<Vec<String>>,
}

/// Configuration of the catalog service.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreKind,
    /// Required only when `store` is [`StoreKind::Postgres`].
    pub database: Option<DatabaseConfig>,
    pub cors: CorsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 5000,
            },
            store: StoreKind::Memory,
            database: None,
            cors: CorsConfig::default(),
        }
    }
}

/// Configuration of the storefront gateway.
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub server: ServerConfig,
    pub backend_url: String,
    pub request_timeout: Duration,
    /// Sessions do not exist, every visitor shops as this user.
    pub user_id: i32,
}

pub fn load() -> Result<Config> {
    let store: StoreKind = parse_var("STORE", "postgres")?;

    let database = match store {
        StoreKind::Postgres => Some(DatabaseConfig {
            url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", "10")?,
        }),
        StoreKind::Memory => None,
    };

    Ok(Config {
        server: ServerConfig {
            host: var_or("API_HOST", "127.0.0.1"),
            port: parse_var("API_PORT", "5000")?,
        },
        store,
        database,
        cors: CorsConfig {
            origins: parse_origins(&var_or("CORS_ORIGINS", "*")),
        },
    })
}

pub fn load_web() -> Result<WebConfig> {
    let timeout_secs: u64 = parse_var("BACKEND_TIMEOUT_SECS", "5")?;
    let user_id: i32 = parse_var("DEMO_USER_ID", "1")?;
    if user_id <= 0 {
        return Err(anyhow!("DEMO_USER_ID must be a positive number"));
    }

    Ok(WebConfig {
        server: ServerConfig {
            host: var_or("WEB_HOST", "127.0.0.1"),
            port: parse_var("WEB_PORT", "5001")?,
        },
        backend_url: var_or("BACKEND_URL", "http://127.0.0.1:5000")
            .trim_end_matches('/')
            .to_string(),
        request_timeout: Duration::from_secs(timeout_secs),
        user_id,
    })
}

/// Splits a comma separated origin list; `*` (or nothing) allows any origin.
pub fn parse_origins(raw: &str) -> Option<Vec<String>> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        None
    } else {
        Some(origins)
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn parse_var<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = var_or(key, default);
    raw.parse()
        .map_err(|err| anyhow!("Invalid {key} value `{raw}`: {err}"))
}
