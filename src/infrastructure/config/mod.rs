use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

/// Runtime configuration, merged from defaults, an optional
/// `propdesk.toml` and `PROPDESK_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub storage_root: String,
    pub token_ttl_hours: i64,
    pub permissive_cors: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: "propdesk.db".to_string(),
            storage_root: "storage".to_string(),
            token_ttl_hours: 24 * 30,
            permissive_cors: false,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("propdesk.toml"))
            .merge(Env::prefixed("PROPDESK_"))
            .extract()
            .map_err(|e| AppError::Internal(format!("Failed to load configuration: {}", e)))
    }
}
