//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, route matching
//! and dispatching.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::content::{
    self, BufferHandler, ContentHandler, DirHandler, DownloadHandler, IconHandler,
};
use crate::config::{AppState, RouteHandler, RoutesConfig};
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Route table: exact paths first, then directory mounts by longest prefix
#[derive(Default)]
pub struct Router {
    exact: HashMap<String, Arc<dyn ContentHandler>>,
    prefixes: Vec<(String, Arc<dyn ContentHandler>)>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from configuration
    pub fn from_config(routes: &RoutesConfig) -> Self {
        let mut router = Self::new();

        if let Some(icon) = &routes.favicon_file {
            let handler: Arc<dyn ContentHandler> = Arc::new(IconHandler::new(icon));
            for path in &routes.favicon_paths {
                router.exact.insert(path.clone(), Arc::clone(&handler));
            }
        }

        for mount in &routes.mounts {
            match &mount.handler {
                RouteHandler::Dir { path } => {
                    router.mount(&mount.prefix, DirHandler::new(path, &mount.prefix));
                }
                RouteHandler::File { path } => router.route(&mount.prefix, IconHandler::new(path)),
                RouteHandler::Download { path } => {
                    router.route(&mount.prefix, DownloadHandler::new(path));
                }
                RouteHandler::Text { body, content_type } => router.route(
                    &mount.prefix,
                    BufferHandler::new(body.clone(), content_type.as_str()),
                ),
            }
        }
        router
    }

    /// Register a handler for exactly `path`
    pub fn route(&mut self, path: &str, handler: impl ContentHandler + 'static) {
        self.exact.insert(path.to_string(), Arc::new(handler));
    }

    /// Register a handler for `prefix` and everything below it
    pub fn mount(&mut self, prefix: &str, handler: impl ContentHandler + 'static) {
        let prefix = prefix.trim_end_matches('/').to_string();
        self.prefixes.push((prefix, Arc::new(handler)));
        self.prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Handler responsible for `path`
    pub fn find(&self, path: &str) -> Option<&dyn ContentHandler> {
        if let Some(handler) = self.exact.get(path) {
            return Some(handler.as_ref());
        }
        self.prefixes
            .iter()
            .find(|(prefix, _)| matches_prefix(prefix, path))
            .map(|(_, handler)| handler.as_ref())
    }

    /// Serve `path`, translating handler failures into status codes
    pub async fn dispatch(&self, path: &str, is_head: bool) -> Response<Full<Bytes>> {
        let Some(handler) = self.find(path) else {
            return http::build_404_response();
        };
        match content::serve(handler, path, is_head).await {
            Ok(resp) => resp,
            Err(err) => {
                if err.status_code() == 500 {
                    logger::log_error(&err.to_string());
                }
                http::build_error_response(&err)
            }
        }
    }
}

/// `prefix` matches itself and anything below it on a segment boundary
fn matches_prefix(prefix: &str, path: &str) -> bool {
    prefix.is_empty()
        || path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method();
    let path = req.uri().path();

    let response = match *method {
        Method::GET | Method::HEAD => state.router.dispatch(path, *method == Method::HEAD).await,
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            http::build_405_response()
        }
    };

    if state.access_log_enabled() {
        let entry = AccessLogEntry::from_request(&req, remote_addr)
            .with_response(&response)
            .with_elapsed(started.elapsed());
        logger::log_access(&entry, &state.access_log_format);
    }

    Ok(response)
}
