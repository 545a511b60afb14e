//! Path segmentation.
//!
//! # Responsibilities
//! - Split the request path on `/`
//! - Drop the empty segment produced by the leading slash
//! - Expose the route name (first segment) and positional arguments
//!
//! # Design Decisions
//! - Route names match case-sensitively
//! - Segments are percent-decoded once, here
//! - An empty positional segment counts as missing

use percent_encoding::percent_decode_str;

/// A request path split into slash-delimited segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRoute {
    segments: Vec<String>,
}

impl ParsedRoute {
    pub fn parse(path: &str) -> Self {
        let mut parts = path.split('/').peekable();
        if parts.peek() == Some(&"") {
            parts.next();
        }
        let segments = parts
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .collect();
        Self { segments }
    }

    /// `""` and `/` both address the index page.
    pub fn is_root(&self) -> bool {
        self.segments.first().map_or(true, |s| s.is_empty())
    }

    /// First segment, selecting the handler.
    pub fn name(&self) -> &str {
        self.segments.first().map(String::as_str).unwrap_or("")
    }

    /// Positional argument after the route name (`arg(0)` is the second segment).
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.segments
            .get(index + 1)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// All segments after the route name.
    pub fn args(&self) -> &[String] {
        self.segments.get(1..).unwrap_or(&[])
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Segments re-joined without the leading slash, as an asset key.
    pub fn asset_key(&self) -> String {
        self.segments.join("/")
    }
}
