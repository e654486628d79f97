//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. A `.env` file in the working directory is read first if present.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Bind address (default: 0.0.0.0)
    pub http_host: String,

    /// HTTP port (default: 8080)
    pub http_port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size (default: 5)
    pub db_max_connections: u32,

    pub log_format: LogFormat,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is normal outside development.
        let _ = dotenvy::dotenv();

        let config = ApiConfig {
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),

            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/dairy.db".to_string()),

            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()))?,

            log_format: match env::var("LOG_FORMAT").as_deref() {
                Err(_) | Ok("pretty") => LogFormat::Pretty,
                Ok("json") => LogFormat::Json,
                Ok(_) => return Err(ConfigError::InvalidValue("LOG_FORMAT".to_string())),
            },
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.http_host, self.http_port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("HTTP_HOST".to_string()))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_addr() {
        let config = ApiConfig {
            http_host: "127.0.0.1".to_string(),
            http_port: 9090,
            database_path: ":memory:".to_string(),
            db_max_connections: 1,
            log_format: LogFormat::Pretty,
        };
        assert_eq!(config.bind_addr().unwrap().port(), 9090);

        let bad = ApiConfig {
            http_host: "not a host".to_string(),
            ..config
        };
        assert!(matches!(bad.bind_addr(), Err(ConfigError::InvalidValue(_))));
    }
}
