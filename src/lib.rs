//! webfs
//!
//! Serves filesystem content over HTTP: media type resolution, response
//! writing and the content handlers built on them, plus tree copy and zip
//! extraction helpers.

pub mod config;
pub mod error;
pub mod files;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use error::{FsError, Result, ServeError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
