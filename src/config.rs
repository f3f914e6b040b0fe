use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, error};

use crate::ws::namecache::NameCachePolicy;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment (dev, staging, prod)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// CORS allowed origins, comma separated
    pub cors_origins: Option<String>,

    /// Log level for this service's own targets
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Name used as `sub` when this service calls other services
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Shared secret used to verify user JWTs
    pub jwt_secret: Option<String>,

    /// Database URL
    pub db_url: Option<String>,

    /// Base URL of the user service that resolves display names
    pub app_service_url: Option<String>,

    /// Display name cache entry lifetime. Unset means entries are never invalidated.
    pub name_cache_ttl_secs: Option<u64>,

    #[serde(default = "default_name_cache_capacity")]
    pub name_cache_capacity: u64,

    /// Front-end origin that share links point at
    #[serde(default = "default_share_base_url")]
    pub share_base_url: String,
}

impl Config {
    /// Load configuration from environment variables or app.env file
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            // Fallback to .env file
            dotenvy::dotenv().ok();
        }

        match envy::from_env::<Config>() {
            Ok(config) => {
                info!("Configuration loaded successfully");
                Ok(config)
            }
            Err(e) => {
                error!("Failed to load configuration: {}", e);
                Err(ConfigError::EnvError(e))
            }
        }
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Fallback tracing filter when `RUST_LOG` is unset. `LOG_LEVEL` sets the
    /// level for this service and tower_http, everything else stays at info.
    pub fn log_filter(&self) -> String {
        format!(
            "coedit_doc={0},tower_http={0},axum::rejection=trace,info",
            self.log_level
        )
    }

    /// The JWT secret, or an error when the service cannot verify anyone
    pub fn require_jwt_secret(&self) -> Result<&str, ConfigError> {
        self.jwt_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingJwtSecret)
    }

    pub fn name_cache_policy(&self) -> NameCachePolicy {
        match self.name_cache_ttl_secs {
            Some(secs) => NameCachePolicy::TimeToLive(Duration::from_secs(secs)),
            None => NameCachePolicy::Never,
        }
    }

    pub fn share_link(&self, token: &str) -> String {
        format!("{}/share/{}", self.share_base_url.trim_end_matches('/'), token)
    }

    /// Parsed CORS origins. `None` means any origin is allowed.
    pub fn cors_origin_list(&self) -> Option<Vec<String>> {
        self.cors_origins.as_ref().map(|origins| {
            origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect()
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            cors_origins: None,
            service_name: default_service_name(),
            jwt_secret: None,
            db_url: None,
            app_service_url: None,
            name_cache_ttl_secs: None,
            name_cache_capacity: default_name_cache_capacity(),
            share_base_url: default_share_base_url(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EnvError(envy::Error),
    MissingJwtSecret,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EnvError(e) => write!(f, "Environment variable error: {}", e),
            ConfigError::MissingJwtSecret => write!(f, "JWT_SECRET is not configured"),
        }
    }
}

impl std::error::Error for ConfigError {}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_log_level() -> String {
    "debug".to_string()
}

fn default_service_name() -> String {
    "coedit-doc".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_name_cache_capacity() -> u64 {
    10_000
}

fn default_share_base_url() -> String {
    "http://localhost:5173".to_string()
}
