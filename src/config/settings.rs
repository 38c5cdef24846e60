//! Settings structures for GeoSearch-RS configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::DEFAULT_REQUEST_RETRIES;

/// Main settings structure matching settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub server: ServerSettings,
    pub backend: BackendSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (GEOSEARCH_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("GEOSEARCH_INDEX_NAME") {
            self.api.index_name = val;
        }
        if let Ok(val) = std::env::var("GEOSEARCH_REQUEST_RETRIES") {
            if let Ok(retries) = val.parse() {
                self.api.request_retries = Some(retries);
            }
        }
        if let Ok(val) = std::env::var("GEOSEARCH_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("GEOSEARCH_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Ok(val) = std::env::var("GEOSEARCH_BACKEND_URL") {
            self.backend.url = val;
        }
    }
}

/// API behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Index queried by every search command
    pub index_name: String,
    /// Retries after the initial backend attempt; the default applies
    /// when unset
    pub request_retries: Option<u32>,
}

impl ApiSettings {
    /// Effective retry budget
    pub fn request_retries(&self) -> u32 {
        self.request_retries.unwrap_or(DEFAULT_REQUEST_RETRIES)
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            index_name: "geosearch".to_string(),
            request_retries: None,
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 3100,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Search backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Base URL of the search backend
    pub url: String,
    /// Request timeout in seconds
    pub request_timeout: f64,
    /// Verify SSL certificates
    pub verify_ssl: bool,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            request_timeout: 10.0,
            verify_ssl: true,
        }
    }
}
