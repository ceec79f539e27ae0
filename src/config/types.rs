// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Listen backlog passed to `listen(2)`
    pub backlog: i32,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
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

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub read_timeout: u64,
    pub write_timeout: u64,
}

/// Routes configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RoutesConfig {
    /// Icon file answered on every path in `favicon_paths`
    #[serde(default)]
    pub favicon_file: Option<String>,
    #[serde(default = "default_favicon_paths")]
    pub favicon_paths: Vec<String>,
    /// Mounted handlers, matched exactly first, then by longest prefix
    #[serde(default)]
    pub mounts: Vec<Mount>,
}

/// A handler mounted under a path prefix
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Mount {
    pub prefix: String,
    /// Handler to dispatch to
    #[serde(flatten)]
    pub handler: RouteHandler,
}

#[allow(clippy::missing_const_for_fn)]
fn default_favicon_paths() -> Vec<String> {
    vec!["/favicon.ico".to_string()]
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            favicon_file: None,
            favicon_paths: default_favicon_paths(),
            mounts: Vec::new(),
        }
    }
}

/// Route handler types
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteHandler {
    /// Files beneath a directory, mount prefix stripped
    Dir { path: String },
    /// One file, inline
    File { path: String },
    /// One file, as an attachment
    Download { path: String },
    /// Fixed body
    Text {
        body: String,
        #[serde(default = "default_text_content_type")]
        content_type: String,
    },
}

#[allow(clippy::missing_const_for_fn)]
fn default_text_content_type() -> String {
    "text/plain".to_string()
}
