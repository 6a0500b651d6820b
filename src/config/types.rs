// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

use crate::handler::StaticRoute;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub views: ViewsConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// One of `error`, `warn`, `info`, `debug`
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration, all timeouts in seconds
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Content type of a fresh response before negotiation
    pub default_content_type: String,
    pub server_name: String,
    pub max_body_size: u64,
}

/// View rendering configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ViewsConfig {
    /// Directory holding view files; rendering is disabled when unset
    #[serde(default)]
    pub dir: Option<String>,
}

impl ViewsConfig {
    pub fn dir_path(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(PathBuf::from)
    }
}

/// Static routes configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RoutesConfig {
    #[serde(default)]
    pub static_paths: Vec<StaticPathConfig>,
    #[serde(default = "default_index_files")]
    pub index_files: Vec<String>,
}

/// A URL prefix served from a directory
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StaticPathConfig {
    pub prefix: String,
    pub dir: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_index_files() -> Vec<String> {
    vec!["index.html".to_string(), "index.htm".to_string()]
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            static_paths: Vec::new(),
            index_files: default_index_files(),
        }
    }
}

impl RoutesConfig {
    pub fn static_routes(&self) -> Vec<StaticRoute> {
        self.static_paths
            .iter()
            .map(|p| StaticRoute::new(&p.prefix, &p.dir))
            .collect()
    }
}
