use dotenvy::dotenv;
use std::{env, net::SocketAddr, path::PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("PORT must be a number, got {0:?}")]
    InvalidPort(String),
    #[error("invalid listen address {0}")]
    InvalidAddr(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `pofimage/`, `pofanimation/` and `pofsong/`; also
    /// served as static files.
    pub media_root: PathBuf,
    /// When set, mutating routes require `Authorization: Bearer <token>`.
    pub admin_token: Option<String>,
    /// Comma separated; unset allows any origin.
    pub cors_origins: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            media_root: PathBuf::from("."),
            admin_token: None,
            cors_origins: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => defaults.port,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port,
            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.media_root),
            admin_token: non_empty_var("ADMIN_TOKEN"),
            cors_origins: non_empty_var("CORS_ORIGINS"),
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddr(addr))
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
