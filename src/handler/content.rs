//! Content handlers
//!
//! Each handler turns a request path into a [`ResponseSpec`]; [`serve`] then
//! hands the spec to the response writer. Handler configuration is fixed at
//! construction, so handlers are shared between connections behind an `Arc`.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::error::{Result, ServeError};
use crate::http::mime::{default_resolver, MimeRegistry, MimeResolver, SystemRegistry};
use crate::http::{self, ContentSource, Disposition, ResponseSpec};
use crate::logger;

/// A strategy mapping a request path to the content to send
pub trait ContentHandler: Send + Sync {
    fn resolve(&self, request_path: &str) -> Result<ResponseSpec>;
}

/// Resolve `request_path` with `handler` and write the response
pub async fn serve(
    handler: &dyn ContentHandler,
    request_path: &str,
    is_head: bool,
) -> Result<Response<Full<Bytes>>> {
    let spec = handler.resolve(request_path)?;
    http::write_response(spec, is_head).await
}

/// Serves a fixed in-memory buffer
#[derive(Debug, Clone)]
pub struct BufferHandler {
    data: Bytes,
    media_type: String,
}

impl BufferHandler {
    pub fn new(data: impl Into<Bytes>, media_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            media_type: media_type.into(),
        }
    }
}

impl ContentHandler for BufferHandler {
    fn resolve(&self, _request_path: &str) -> Result<ResponseSpec> {
        Ok(ResponseSpec::inline(
            self.media_type.clone(),
            ContentSource::Memory(self.data.clone()),
        ))
    }
}

/// Serves files beneath a root directory
pub struct DirHandler<R = SystemRegistry> {
    root: PathBuf,
    strip_prefix: String,
    resolver: Arc<MimeResolver<R>>,
}

impl DirHandler {
    /// `strip_prefix` is removed from request paths before joining with `root`
    pub fn new(root: impl Into<PathBuf>, strip_prefix: &str) -> Self {
        Self::with_resolver(root, strip_prefix, default_resolver())
    }
}

impl<R: MimeRegistry> DirHandler<R> {
    pub fn with_resolver(
        root: impl Into<PathBuf>,
        strip_prefix: &str,
        resolver: Arc<MimeResolver<R>>,
    ) -> Self {
        Self {
            root: root.into(),
            strip_prefix: strip_prefix.trim_matches('/').to_string(),
            resolver,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the request relative to the root, prefix removed
    fn relative_path<'a>(&self, request_path: &'a str) -> &'a str {
        let clean = request_path.trim_start_matches('/');
        if self.strip_prefix.is_empty() {
            return clean;
        }
        match clean.strip_prefix(self.strip_prefix.as_str()) {
            Some("") => "",
            Some(rest) if rest.starts_with('/') => rest.trim_start_matches('/'),
            _ => clean,
        }
    }

    /// Relative path with percent-escapes decoded
    fn decoded_relative(&self, request_path: &str) -> Result<String> {
        decode_path(self.relative_path(request_path))
            .ok_or_else(|| ServeError::NotFound(PathBuf::from(request_path)))
    }

    /// Map a request path to a canonical file path inside the root
    pub fn resolve_path(&self, request_path: &str) -> Result<PathBuf> {
        let decoded = self.decoded_relative(request_path)?;
        let relative = normalize_relative(&decoded).ok_or_else(|| {
            logger::log_warning(&format!("Path traversal attempt blocked: {request_path}"));
            ServeError::PathTraversal(request_path.to_string())
        })?;

        let root = self.root.canonicalize().map_err(|e| {
            logger::log_warning(&format!(
                "Directory root not found or inaccessible '{}': {e}",
                self.root.display()
            ));
            ServeError::from_io(&self.root, e)
        })?;

        let target = root.join(&relative);
        let canonical = target
            .canonicalize()
            .map_err(|e| ServeError::from_io(&target, e))?;

        // symlinks may still point outside
        if !canonical.starts_with(&root) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {} -> {}",
                request_path,
                canonical.display()
            ));
            return Err(ServeError::PathTraversal(request_path.to_string()));
        }
        Ok(canonical)
    }
}

impl<R: MimeRegistry> ContentHandler for DirHandler<R> {
    fn resolve(&self, request_path: &str) -> Result<ResponseSpec> {
        let path = self.resolve_path(request_path)?;
        // type follows the requested name, not a symlink target
        let media_type = self.resolver.resolve(&self.decoded_relative(request_path)?);
        Ok(ResponseSpec::inline(media_type, ContentSource::File(path)))
    }
}

/// Serves one file inline whatever the request path, e.g. a favicon
pub struct IconHandler<R = SystemRegistry> {
    path: PathBuf,
    resolver: Arc<MimeResolver<R>>,
}

impl IconHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_resolver(path, default_resolver())
    }
}

impl<R: MimeRegistry> IconHandler<R> {
    pub fn with_resolver(path: impl Into<PathBuf>, resolver: Arc<MimeResolver<R>>) -> Self {
        Self {
            path: path.into(),
            resolver,
        }
    }
}

impl<R: MimeRegistry> ContentHandler for IconHandler<R> {
    fn resolve(&self, _request_path: &str) -> Result<ResponseSpec> {
        Ok(ResponseSpec::inline(
            self.resolver.resolve(&self.path.to_string_lossy()),
            ContentSource::File(self.path.clone()),
        ))
    }
}

/// Serves one file as an attachment named after its base name
pub struct DownloadHandler<R = SystemRegistry> {
    path: PathBuf,
    resolver: Arc<MimeResolver<R>>,
}

impl DownloadHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_resolver(path, default_resolver())
    }
}

impl<R: MimeRegistry> DownloadHandler<R> {
    pub fn with_resolver(path: impl Into<PathBuf>, resolver: Arc<MimeResolver<R>>) -> Self {
        Self {
            path: path.into(),
            resolver,
        }
    }
}

impl<R: MimeRegistry> ContentHandler for DownloadHandler<R> {
    fn resolve(&self, _request_path: &str) -> Result<ResponseSpec> {
        Ok(ResponseSpec {
            media_type: self.resolver.resolve(&self.path.to_string_lossy()),
            disposition: Disposition::attachment_for(&self.path),
            source: ContentSource::File(self.path.clone()),
        })
    }
}

/// Percent-decode a request path. `None` if the result is not UTF-8 or
/// holds a NUL byte.
fn decode_path(raw: &str) -> Option<String> {
    let decoded = urlencoding::decode(raw).ok()?;
    if decoded.contains('\0') {
        return None;
    }
    Some(decoded.into_owned())
}

/// Lexically normalize a relative path. `None` if it climbs above its start
/// or is absolute.
fn normalize_relative(relative: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mime::StaticRegistry;
    use crate::http::response::CONTENT_DISPOSITION;
    use http_body_util::BodyExt;
    use std::fs;

    async fn body_of(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    fn stub_resolver() -> Arc<MimeResolver<StaticRegistry>> {
        Arc::new(MimeResolver::new(
            StaticRegistry::new()
                .with(".txt", "text/plain")
                .with(".ico", "image/vnd.microsoft.icon"),
        ))
    }

    #[tokio::test]
    async fn test_buffer_handler() {
        let handler = BufferHandler::new(&b"package fs"[..], "text/x-go");
        let resp = serve(&handler, "/anything", false).await.unwrap();
        assert_eq!(resp.status(), 200);
        let ctype = resp.headers()["content-type"].to_str().unwrap().to_string();
        assert!(ctype.contains("text/x-go"), "got {ctype}");
        assert_eq!(body_of(resp).await, Bytes::from_static(b"package fs"));
    }

    #[tokio::test]
    async fn test_dir_handler_serves_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/site.txt"), "hello\n").unwrap();

        let handler = DirHandler::with_resolver(dir.path(), "", stub_resolver());
        let resp = serve(&handler, "/css/site.txt", false).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()["content-type"],
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_of(resp).await, Bytes::from_static(b"hello\n"));
    }

    #[tokio::test]
    async fn test_dir_handler_strips_prefix() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();

        let handler = DirHandler::with_resolver(dir.path(), "/static/", stub_resolver());
        let resp = serve(&handler, "/static/a.txt", false).await.unwrap();
        assert_eq!(body_of(resp).await, Bytes::from_static(b"a"));

        // a path not under the prefix is looked up as-is
        assert!(matches!(
            handler.resolve("/staticx/a.txt"),
            Err(ServeError::NotFound(_))
        ));
    }

    #[test]
    fn test_dir_handler_blocks_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("public");
        fs::create_dir(&root).unwrap();
        fs::write(dir.path().join("secret.txt"), "secret").unwrap();

        let handler = DirHandler::with_resolver(&root, "", stub_resolver());
        for path in ["/../secret.txt", "/../../etc/passwd", "/a/../../secret.txt"] {
            assert!(
                matches!(handler.resolve(path), Err(ServeError::PathTraversal(_))),
                "{path} was not blocked"
            );
        }
        // climbing back inside the root is fine
        fs::write(root.join("ok.txt"), "ok").unwrap();
        assert!(handler.resolve("/sub/../ok.txt").is_ok());
        assert!(handler.resolve("/./ok.txt").is_ok());
    }

    #[tokio::test]
    async fn test_dir_handler_decodes_escapes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello world.txt"), "spaced").unwrap();
        fs::write(dir.path().join("caf\u{e9}.txt"), "accent").unwrap();

        let handler = DirHandler::with_resolver(dir.path(), "", stub_resolver());
        let resp = serve(&handler, "/hello%20world.txt", false).await.unwrap();
        assert_eq!(
            resp.headers()["content-type"],
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_of(resp).await, Bytes::from_static(b"spaced"));

        let resp = serve(&handler, "/caf%C3%A9.txt", false).await.unwrap();
        assert_eq!(body_of(resp).await, Bytes::from_static(b"accent"));
    }

    #[test]
    fn test_dir_handler_rejects_bad_escapes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("public");
        fs::create_dir(&root).unwrap();
        fs::write(dir.path().join("secret.txt"), "secret").unwrap();

        let handler = DirHandler::with_resolver(&root, "", stub_resolver());
        for path in ["/%2e%2e/secret.txt", "/%2E%2E%2Fsecret.txt", "/%2fetc/passwd"] {
            assert!(
                matches!(handler.resolve(path), Err(ServeError::PathTraversal(_))),
                "{path} was not blocked"
            );
        }
        for path in ["/a%00.txt", "/%ff.txt"] {
            assert!(
                matches!(handler.resolve(path), Err(ServeError::NotFound(_))),
                "{path} was not rejected"
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_dir_handler_blocks_symlink_escape() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("public");
        fs::create_dir(&root).unwrap();
        fs::write(dir.path().join("secret.txt"), "secret").unwrap();
        std::os::unix::fs::symlink(dir.path().join("secret.txt"), root.join("link.txt")).unwrap();

        let handler = DirHandler::with_resolver(&root, "", stub_resolver());
        assert!(matches!(
            handler.resolve("/link.txt"),
            Err(ServeError::PathTraversal(_))
        ));
    }

    #[tokio::test]
    async fn test_dir_handler_missing_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let handler = DirHandler::with_resolver(dir.path(), "", stub_resolver());

        assert!(matches!(
            handler.resolve("/nope.txt"),
            Err(ServeError::NotFound(_))
        ));
        assert!(matches!(
            serve(&handler, "/sub", false).await,
            Err(ServeError::NotFound(_))
        ));
        assert!(matches!(
            serve(&handler, "/", false).await,
            Err(ServeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_icon_handler_ignores_path() {
        let dir = tempfile::tempdir().unwrap();
        let icon = dir.path().join("favicon.ico");
        fs::write(&icon, [0u8, 0, 1, 0]).unwrap();

        let handler = IconHandler::with_resolver(&icon, stub_resolver());
        for path in ["/favicon.ico", "/whatever/else.png"] {
            let resp = serve(&handler, path, false).await.unwrap();
            assert_eq!(resp.status(), 200);
            assert_eq!(resp.headers()["content-type"], "image/vnd.microsoft.icon");
            assert!(resp.headers().get(CONTENT_DISPOSITION).is_none());
            assert_eq!(body_of(resp).await.as_ref(), &[0u8, 0, 1, 0]);
        }
    }

    #[tokio::test]
    async fn test_icon_handler_fallback_type() {
        let dir = tempfile::tempdir().unwrap();
        let icon = dir.path().join("favicon.ico");
        fs::write(&icon, [1u8]).unwrap();

        let empty = Arc::new(MimeResolver::new(StaticRegistry::new()));
        let handler = IconHandler::with_resolver(&icon, empty);
        let resp = serve(&handler, "/", false).await.unwrap();
        assert_eq!(resp.headers()["content-type"], "image/x-icon");
    }

    #[tokio::test]
    async fn test_download_handler() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("first.zip");
        fs::write(&file, b"PK\x05\x06").unwrap();

        let handler = DownloadHandler::with_resolver(
            &file,
            Arc::new(MimeResolver::new(StaticRegistry::new())),
        );
        let resp = serve(&handler, "/download/anything", false).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "application/zip");
        assert_eq!(
            resp.headers()[CONTENT_DISPOSITION],
            "attachment;filename=first.zip"
        );
        assert_eq!(body_of(resp).await.as_ref(), b"PK\x05\x06");
    }

    #[tokio::test]
    async fn test_download_handler_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let handler =
            DownloadHandler::with_resolver(dir.path().join("gone.zip"), stub_resolver());
        assert!(matches!(
            serve(&handler, "/", false).await,
            Err(ServeError::NotFound(_))
        ));
    }

    #[test]
    fn test_normalize_relative() {
        assert_eq!(normalize_relative("a/./b"), Some(PathBuf::from("a/b")));
        assert_eq!(normalize_relative("a/../b"), Some(PathBuf::from("b")));
        assert_eq!(normalize_relative(""), Some(PathBuf::new()));
        assert_eq!(normalize_relative(".."), None);
        assert_eq!(normalize_relative("/etc/passwd"), None);
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("a%20b/c.txt").as_deref(), Some("a b/c.txt"));
        assert_eq!(decode_path("plain.txt").as_deref(), Some("plain.txt"));
        assert_eq!(decode_path("%00"), None);
        assert_eq!(decode_path("%c3%28"), None);
    }
}
