//! Static asset store.
//!
//! # Responsibilities
//! - Hold the sample documents, images and index page
//! - Answer logical lookups (`"image.png"`, `"docs/a.css"`) with bytes + content type
//! - Overlay operator-supplied files from a directory at startup
//!
//! # Design Decisions
//! - Read-only after construction; shared through `Arc<dyn AssetStore>`
//! - Compiled-in defaults so the binary is self-contained
//! - Content type is derived from the file extension only

use axum::{
    body::{Body, Bytes},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::path::Path;

/// A single stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub bytes: Bytes,
    pub content_type: &'static str,
}

impl Asset {
    pub fn new(key: &str, bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type_for(key),
        }
    }
}

impl IntoResponse for Asset {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, self.content_type)],
            Body::from(self.bytes),
        )
            .into_response()
    }
}

/// Read-only lookup of assets by logical name.
pub trait AssetStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Option<Asset>;
}

/// In-memory asset store.
#[derive(Debug, Default, Clone)]
pub struct MemoryAssetStore {
    files: HashMap<String, Asset>,
}

const BUILTIN: &[(&str, &[u8])] = &[
    ("index.html", include_bytes!("../../assets/index.html")),
    ("response.html", include_bytes!("../../assets/response.html")),
    ("response.xml", include_bytes!("../../assets/response.xml")),
    ("response.json", include_bytes!("../../assets/response.json")),
    ("image.png", include_bytes!("../../assets/image.png")),
    ("image.jpeg", include_bytes!("../../assets/image.jpeg")),
    ("image.webp", include_bytes!("../../assets/image.webp")),
    ("image.svg", include_bytes!("../../assets/image.svg")),
    ("robots.txt", include_bytes!("../../assets/robots.txt")),
    ("deny.txt", include_bytes!("../../assets/deny.txt")),
    ("version.json", include_bytes!("../../assets/version.json")),
];

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with the compiled-in sample files.
    pub fn builtin() -> Self {
        let mut store = Self::new();
        for &(key, bytes) in BUILTIN {
            store.insert(key, Bytes::from_static(bytes));
        }
        store
    }

    pub fn insert(&mut self, key: &str, bytes: impl Into<Bytes>) {
        let key = key.trim_start_matches('/');
        self.files.insert(key.to_string(), Asset::new(key, bytes));
    }

    /// Add every file under `dir`, keyed by its path relative to `dir`.
    /// Files already present are replaced.
    pub fn overlay_dir(&mut self, dir: &Path) -> std::io::Result<usize> {
        let mut loaded = 0;
        let mut pending = vec![dir.to_path_buf()];
        while let Some(current) = pending.pop() {
            for entry in std::fs::read_dir(&current)? {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                let Ok(relative) = path.strip_prefix(dir) else {
                    continue;
                };
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                self.insert(&key, std::fs::read(&path)?);
                loaded += 1;
            }
        }
        tracing::info!(dir = %dir.display(), files = loaded, "Loaded asset overlay");
        Ok(loaded)
    }

}

impl AssetStore for MemoryAssetStore {
    fn get(&self, key: &str) -> Option<Asset> {
        self.files.get(key.trim_start_matches('/')).cloned()
    }
}

/// Content-Type for a logical file name.
pub fn content_type_for(key: &str) -> &'static str {
    let extension = key.rsplit_once('.').map(|(_, ext)| ext);
    match extension {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("txt" | "md") => "text/plain; charset=utf-8",
        Some("xml") => "application/xml",
        Some("js" | "mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_assets_present() {
        let store = MemoryAssetStore::builtin();
        for key in [
            "index.html",
            "response.html",
            "response.xml",
            "response.json",
            "image.png",
            "image.jpeg",
            "image.webp",
            "image.svg",
            "robots.txt",
            "deny.txt",
            "version.json",
        ] {
            let asset = store.get(key).unwrap_or_else(|| panic!("missing {key}"));
            assert!(!asset.bytes.is_empty(), "{key} is empty");
        }
        assert_eq!(store.get("image.svg").unwrap().content_type, "image/svg+xml");
        assert!(store.get("missing.bin").is_none());
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("a.html"), "text/html; charset=utf-8");
        assert_eq!(content_type_for("robots.txt"), "text/plain; charset=utf-8");
        assert_eq!(content_type_for("response.xml"), "application/xml");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[test]
    fn test_leading_slash_is_ignored() {
        let mut store = MemoryAssetStore::new();
        store.insert("/docs/a.txt", "hello");
        assert_eq!(store.get("docs/a.txt").unwrap().bytes, Bytes::from("hello"));
    }

    #[test]
    fn test_overlay_dir_replaces_and_adds() {
        let dir = std::env::temp_dir().join(format!("edgebin-assets-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(dir.join("docs")).unwrap();
        std::fs::write(dir.join("robots.txt"), "User-agent: none").unwrap();
        std::fs::write(dir.join("docs").join("guide.html"), "<p>guide</p>").unwrap();

        let mut store = MemoryAssetStore::builtin();
        assert_eq!(store.overlay_dir(&dir).unwrap(), 2);
        assert_eq!(
            store.get("robots.txt").unwrap().bytes,
            Bytes::from("User-agent: none")
        );
        assert_eq!(
            store.get("docs/guide.html").unwrap().content_type,
            "text/html; charset=utf-8"
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
