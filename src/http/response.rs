//! HTTP response building module
//!
//! Turns a resolved content source into a complete response, and provides
//! the plain-text error responses the router answers with.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{Result, ServeError};

pub const CONTENT_DISPOSITION: &str = "Content-Disposition";

/// Where the response payload comes from
#[derive(Debug, Clone)]
pub enum ContentSource {
    /// Bytes already in memory
    Memory(Bytes),
    /// File read when the response is written
    File(PathBuf),
}

impl ContentSource {
    /// Materialize the payload
    pub async fn load(self) -> Result<Bytes> {
        match self {
            Self::Memory(bytes) => Ok(bytes),
            Self::File(path) => {
                let meta = fs::metadata(&path)
                    .await
                    .map_err(|e| ServeError::from_io(&path, e))?;
                if meta.is_dir() {
                    return Err(ServeError::NotFound(path));
                }
                let data = fs::read(&path)
                    .await
                    .map_err(|e| ServeError::from_io(&path, e))?;
                Ok(Bytes::from(data))
            }
        }
    }
}

/// How the client should treat the payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Disposition {
    #[default]
    Inline,
    Attachment { filename: String },
}

impl Disposition {
    /// Attachment named after the last component of `path`
    pub fn attachment_for(path: &Path) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::Attachment { filename }
    }

    /// `Content-Disposition` value, `None` for inline content
    pub fn header_value(&self) -> Option<String> {
        match self {
            Self::Inline => None,
            Self::Attachment { filename } => Some(format!("attachment;filename={filename}")),
        }
    }
}

/// Everything needed to write one successful response
#[derive(Debug, Clone)]
pub struct ResponseSpec {
    pub media_type: String,
    pub disposition: Disposition,
    pub source: ContentSource,
}

impl ResponseSpec {
    pub fn inline(media_type: impl Into<String>, source: ContentSource) -> Self {
        Self {
            media_type: media_type.into(),
            disposition: Disposition::Inline,
            source,
        }
    }
}

/// Whether a media type carries text and should declare a charset
pub fn is_text_like(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence.starts_with("text/")
        || matches!(
            essence.as_str(),
            "application/json" | "application/javascript" | "application/xml"
        )
        || essence.ends_with("+json")
        || essence.ends_with("+xml")
}

/// `Content-Type` value for a resolved media type
pub fn content_type_header(media_type: &str) -> String {
    if is_text_like(media_type) && !media_type.to_ascii_lowercase().contains("charset=") {
        format!("{media_type}; charset=utf-8")
    } else {
        media_type.to_string()
    }
}

/// Write the 200 response for `spec`; HEAD keeps the headers and drops the body
pub async fn write_response(spec: ResponseSpec, is_head: bool) -> Result<Response<Full<Bytes>>> {
    let data = spec.source.load().await?;
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    let mut builder = Response::builder()
        .status(200)
        .header("Content-Type", content_type_header(&spec.media_type))
        .header("Content-Length", content_length);

    if let Some(value) = spec.disposition.header_value() {
        builder = builder.header(CONTENT_DISPOSITION, value);
    }

    Ok(builder.body(Full::new(body))?)
}

/// Plain-text response for a handler failure
pub fn build_error_response(err: &ServeError) -> Response<Full<Bytes>> {
    match err.status_code() {
        403 => build_403_response(),
        404 => build_404_response(),
        _ => build_500_response(),
    }
}

/// Build 403 Forbidden response
pub fn build_403_response() -> Response<Full<Bytes>> {
    build_text_response(403, "403 Forbidden")
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_text_response(404, "404 Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Allow", "GET, HEAD")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<Full<Bytes>> {
    build_text_response(500, "500 Internal Server Error")
}

fn build_text_response(status: u16, text: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(text)))
        .unwrap_or_else(|e| {
            log_build_error(text, &e);
            Response::new(Full::new(Bytes::from(text)))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
