//! Access log format module
//!
//! Supports multiple log formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (JSON structured logging)
//! - Custom patterns with `$variables`

use chrono::{DateTime, Local};
use hyper::{Request, Response};
use std::net::SocketAddr;
use std::time::Duration;

const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Access log layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Combined,
    Common,
    Json,
    Custom(String),
}

impl LogFormat {
    /// Anything other than a known name is a custom pattern
    pub fn parse(name: &str) -> Self {
        match name {
            "combined" => Self::Combined,
            "common" => Self::Common,
            "json" => Self::Json,
            pattern => Self::Custom(pattern.to_string()),
        }
    }
}

/// One served request
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: DateTime<Local>,
    pub method: String,
    pub path: String,
    /// Query string without the leading `?`
    pub query: Option<String>,
    pub http_version: String,
    pub status: u16,
    pub body_bytes: u64,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub elapsed: Duration,
}

impl AccessLogEntry {
    /// Capture the request side, stamped with the current time
    pub fn from_request<B>(req: &Request<B>, remote_addr: SocketAddr) -> Self {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        let http_version = format!("{:?}", req.version())
            .trim_start_matches("HTTP/")
            .to_string();

        Self {
            remote_addr: remote_addr.ip().to_string(),
            time: Local::now(),
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(ToString::to_string),
            http_version,
            status: 200,
            body_bytes: 0,
            referer: header("referer"),
            user_agent: header("user-agent"),
            elapsed: Duration::ZERO,
        }
    }

    /// Record status and declared body size of the response
    #[must_use]
    pub fn with_response<B>(mut self, resp: &Response<B>) -> Self {
        self.status = resp.status().as_u16();
        self.body_bytes = resp
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        self
    }

    #[must_use]
    pub const fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn render(&self, format: &LogFormat) -> String {
        match format {
            LogFormat::Combined => format!(
                "{} \"{}\" \"{}\"",
                self.render_common(),
                self.referer.as_deref().unwrap_or("-"),
                self.user_agent.as_deref().unwrap_or("-"),
            ),
            LogFormat::Common => self.render_common(),
            LogFormat::Json => self.render_json(),
            LogFormat::Custom(pattern) => self.render_custom(pattern),
        }
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    fn request_line(&self) -> String {
        format!(
            "{} {} HTTP/{}",
            self.method,
            self.request_uri(),
            self.http_version
        )
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn render_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format(CLF_TIME),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    fn render_json(&self) -> String {
        let opt = |v: &Option<String>| {
            v.as_deref()
                .map_or_else(|| "null".to_string(), |s| format!("\"{}\"", escape_json(s)))
        };
        format!(
            r#"{{"remote_addr":"{}","time":"{}","method":"{}","path":"{}","query":{},"http_version":"{}","status":{},"body_bytes":{},"referer":{},"user_agent":{},"request_time_us":{}}}"#,
            escape_json(&self.remote_addr),
            self.time.to_rfc3339(),
            escape_json(&self.method),
            escape_json(&self.path),
            opt(&self.query),
            escape_json(&self.http_version),
            self.status,
            self.body_bytes,
            opt(&self.referer),
            opt(&self.user_agent),
            self.elapsed.as_micros(),
        )
    }

    /// Variables: `$remote_addr`, `$time_local`, `$time_iso8601`, `$request`,
    /// `$request_method`, `$request_uri`, `$request_time` (seconds),
    /// `$status`, `$body_bytes_sent`, `$http_referer`, `$http_user_agent`
    fn render_custom(&self, pattern: &str) -> String {
        let vars: [(&str, String); 11] = [
            ("$remote_addr", self.remote_addr.clone()),
            ("$time_local", self.time.format(CLF_TIME).to_string()),
            ("$time_iso8601", self.time.to_rfc3339()),
            ("$request_time", format!("{:.3}", self.elapsed.as_secs_f64())),
            ("$request_method", self.method.clone()),
            ("$request_uri", self.request_uri()),
            ("$request", self.request_line()),
            ("$status", self.status.to_string()),
            ("$body_bytes_sent", self.body_bytes.to_string()),
            ("$http_referer", self.referer.clone().unwrap_or_else(|| "-".into())),
            ("$http_user_agent", self.user_agent.clone().unwrap_or_else(|| "-".into())),
        ];

        // single pass: substituted values are never scanned again
        let mut out = String::with_capacity(pattern.len());
        let mut rest = pattern;
        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            let var = vars
                .iter()
                .filter(|(name, _)| tail.starts_with(name))
                .max_by_key(|(name, _)| name.len());
            match var {
                Some((name, value)) => {
                    out.push_str(value);
                    rest = &tail[name.len()..];
                }
                None => {
                    out.push('$');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Escape special characters for JSON string
fn escape_json(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AccessLogEntry {
        let req = Request::builder()
            .method("GET")
            .uri("/files/report.pdf?dl=1")
            .header("referer", "https://example.com")
            .header("user-agent", "Mozilla/5.0")
            .body(())
            .unwrap();
        let resp = Response::builder()
            .status(200)
            .header("content-length", "1234")
            .body(())
            .unwrap();
        AccessLogEntry::from_request(&req, "192.168.1.1:5555".parse().unwrap())
            .with_response(&resp)
            .with_elapsed(Duration::from_micros(12_000))
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(
            LogFormat::parse("$status"),
            LogFormat::Custom("$status".to_string())
        );
    }

    #[test]
    fn test_format_combined() {
        let log = sample().render(&LogFormat::Combined);
        assert!(log.starts_with("192.168.1.1 - - ["));
        assert!(log.contains("\"GET /files/report.pdf?dl=1 HTTP/1.1\" 200 1234"));
        assert!(log.ends_with("\"https://example.com\" \"Mozilla/5.0\""));
    }

    #[test]
    fn test_format_common() {
        let log = sample().render(&LogFormat::Common);
        assert!(log.contains("200 1234"));
        assert!(!log.contains("Mozilla"));
    }

    #[test]
    fn test_format_json() {
        let log = sample().render(&LogFormat::Json);
        assert!(log.contains(r#""remote_addr":"192.168.1.1""#));
        assert!(log.contains(r#""query":"dl=1""#));
        assert!(log.contains(r#""status":200"#));
        assert!(log.contains(r#""request_time_us":12000"#));
    }

    #[test]
    fn test_format_custom() {
        let log = sample().render(&LogFormat::Custom(
            "$remote_addr $request_method $status $request_time".to_string(),
        ));
        assert_eq!(log, "192.168.1.1 GET 200 0.012");
    }

    #[test]
    fn test_format_custom_does_not_expand_request_data() {
        let req = Request::builder()
            .uri("/$http_user_agent?q=$status")
            .header("user-agent", "curl/8.0")
            .body(())
            .unwrap();
        let entry = AccessLogEntry::from_request(&req, "10.0.0.1:80".parse().unwrap());
        let log = entry.render(&LogFormat::Custom("$request_uri [$unknown] $".to_string()));
        assert_eq!(log, "/$http_user_agent?q=$status [$unknown] $");
    }
}
