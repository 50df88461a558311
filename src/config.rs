//! Configuration management for the task tracker.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `8080`.
//! - `TASK_STORE` - Optional. Store backend (`memory`, `file`, `sqlite`). Defaults to `sqlite`.
//! - `TASK_STORE_DIR` - Optional. Directory for persistent stores. Defaults to `./data`.
//! - `TASK_STORE_NAME` - Optional. Base filename for persistent stores. Defaults to `tasks`.

use std::path::PathBuf;
use thiserror::Error;

use crate::api::task_store::TaskStoreType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Where and how tasks are stored.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Backend selection
    pub store_type: TaskStoreType,

    /// Directory for the file and sqlite backends
    pub dir: PathBuf,

    /// Base filename (without extension)
    pub name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: TaskStoreType::default(),
            dir: PathBuf::from("data"),
            name: "tasks".to_string(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Task store configuration
    pub store: StoreConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `PORT` is not a valid port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let store_type = std::env::var("TASK_STORE")
            .map(|s| TaskStoreType::from_str(&s))
            .unwrap_or_default();

        let dir = std::env::var("TASK_STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let name = std::env::var("TASK_STORE_NAME").unwrap_or_else(|_| "tasks".to_string());

        Ok(Self {
            host,
            port,
            store: StoreConfig {
                store_type,
                dir,
                name,
            },
        })
    }

    /// Create a config with an in-memory store (useful for testing).
    pub fn in_memory() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            store: StoreConfig {
                store_type: TaskStoreType::Memory,
                ..StoreConfig::default()
            },
        }
    }

    /// Socket address string the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
