//! MIME type detection module
//!
//! Resolves a file name to a media type in two layers: the host registry
//! first (the system `mime.types` tables plus the `mime_guess` database), then
//! a small built-in table for extensions some hosts get wrong or lack.
//!
//! Case policy: the registry is handed the extension exactly as written and
//! folds case on its own terms; the built-in table and the `.js` correction
//! compare against the extension lowercased once.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// Media type for anything we cannot classify
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// System tables consulted by [`SystemRegistry::load`], in order
pub const MIME_TYPES_FILES: &[&str] = &[
    "/etc/mime.types",
    "/etc/apache2/mime.types",
    "/etc/apache/mime.types",
    "/etc/httpd/conf/mime.types",
];

static DEFAULT_RESOLVER: OnceLock<Arc<MimeResolver<SystemRegistry>>> = OnceLock::new();

/// Host-provided mapping of extensions (with leading dot) to media types
pub trait MimeRegistry: Send + Sync {
    fn lookup(&self, extension: &str) -> Option<String>;
}

/// Registry backed by the operating environment
#[derive(Debug, Default)]
pub struct SystemRegistry {
    table: HashMap<String, String>,
}

impl SystemRegistry {
    /// Load every readable table from [`MIME_TYPES_FILES`]
    pub fn load() -> Self {
        Self::from_files(MIME_TYPES_FILES.iter().map(Path::new))
    }

    /// Load the given `mime.types` files; missing or unreadable files are skipped.
    /// Earlier files win when an extension appears twice.
    pub fn from_files<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Self {
        let mut table = HashMap::new();
        for path in paths {
            let Ok(contents) = fs::read_to_string(path) else {
                continue;
            };
            for (ext, media_type) in parse_mime_types(&contents) {
                table.entry(ext).or_insert(media_type);
            }
        }
        Self { table }
    }

    /// Number of extensions loaded from system tables
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl MimeRegistry for SystemRegistry {
    fn lookup(&self, extension: &str) -> Option<String> {
        if extension.is_empty() {
            return None;
        }
        if let Some(t) = self.table.get(extension) {
            return Some(t.clone());
        }
        if let Some(t) = self.table.get(&extension.to_ascii_lowercase()) {
            return Some(t.clone());
        }
        mime_guess::from_ext(extension.trim_start_matches('.'))
            .first_raw()
            .map(ToString::to_string)
    }
}

/// In-memory registry with explicitly inserted entries
#[derive(Debug, Default, Clone)]
pub struct StaticRegistry {
    entries: HashMap<String, String>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, builder style. `extension` includes the leading dot.
    #[must_use]
    pub fn with(mut self, extension: &str, media_type: &str) -> Self {
        self.insert(extension, media_type);
        self
    }

    pub fn insert(&mut self, extension: &str, media_type: &str) {
        self.entries
            .insert(extension.to_string(), media_type.to_string());
    }
}

impl MimeRegistry for StaticRegistry {
    fn lookup(&self, extension: &str) -> Option<String> {
        self.entries.get(extension).cloned()
    }
}

/// Layered resolver over a host registry
#[derive(Debug, Default)]
pub struct MimeResolver<R> {
    registry: R,
}

impl<R: MimeRegistry> MimeResolver<R> {
    pub const fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Resolve the media type of `filename`. Never fails.
    pub fn resolve(&self, filename: &str) -> String {
        let ext = extension(filename);
        let lower = ext.to_ascii_lowercase();

        match self.registry.lookup(ext) {
            Some(t)
                if lower == ".js" && (t == "text/plain" || t == "text/plain; charset=utf-8") =>
            {
                "application/javascript".to_string()
            }
            Some(t) => t,
            None => fallback_media_type(&lower).to_string(),
        }
    }
}

/// Resolve through the process-wide resolver backed by [`SystemRegistry`]
///
/// # Examples
/// ```
/// use webfs::http::mime::resolve_media_type;
/// assert_eq!(resolve_media_type("archive.7z"), "application/x-7z-compressed");
/// assert_eq!(resolve_media_type("README"), "application/octet-stream");
/// ```
pub fn resolve_media_type(filename: &str) -> String {
    default_resolver().resolve(filename)
}

/// The shared resolver, loaded on first use
pub fn default_resolver() -> Arc<MimeResolver<SystemRegistry>> {
    Arc::clone(DEFAULT_RESOLVER.get_or_init(|| Arc::new(MimeResolver::new(SystemRegistry::load()))))
}

/// Extension of the last path component, leading dot included
///
/// Returns `""` when the name has no dot.
pub fn extension(filename: &str) -> &str {
    let name = filename
        .rsplit(std::path::is_separator)
        .next()
        .unwrap_or(filename);
    name.rfind('.').map_or("", |i| &name[i..])
}

/// Built-in table used when the registry has no entry
pub fn fallback_media_type(lowercase_ext: &str) -> &'static str {
    match lowercase_ext {
        ".json" => "application/json",
        ".js" => "application/javascript",
        ".zip" => "application/zip",
        ".3gp" => "video/3gpp",
        ".7z" => "application/x-7z-compressed",
        ".ace" => "application/x-ace-compressed",
        ".aac" => "audio/x-aac",
        ".ico" => "image/x-icon",
        ".png" => "image/png",
        _ => DEFAULT_MEDIA_TYPE,
    }
}

/// Parse the `mime.types` format: `type/subtype ext1 ext2 ...`, `#` comments
fn parse_mime_types(contents: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    for line in contents.lines() {
        let line = line.split('#').next().unwrap_or_default();
        let mut fields = line.split_whitespace();
        let Some(media_type) = fields.next() else {
            continue;
        };
        if !media_type.contains('/') {
            continue;
        }
        for ext in fields {
            entries.push((format!(".{ext}"), media_type.to_string()));
        }
    }
    entries
}
