// Application state module
// Immutable per-process state shared by every connection

use super::types::Config;
use crate::handler::Router;
use crate::logger::LogFormat;

/// Application state
pub struct AppState {
    pub config: Config,
    pub router: Router,
    pub access_log_format: LogFormat,
}

impl AppState {
    /// Build the route table from `config`
    pub fn new(config: Config) -> Self {
        let router = Router::from_config(&config.routes);
        let access_log_format = LogFormat::parse(&config.logging.access_log_format);
        Self {
            config,
            router,
            access_log_format,
        }
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
