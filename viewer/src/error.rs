//! Load failure taxonomy.
//!
//! Every failure of a load attempt is terminal: the host renders one error
//! element and never attaches pan/zoom handlers. The variants exist so the
//! message (and tests) can tell fetch, parse and geometry failures apart.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::camera::Rect;

/// Failure retrieving the resource.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Status(u16),
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),
}

/// Failure interpreting the response body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The body is not well-formed XML.
    #[error("malformed markup: {0}")]
    Xml(String),
    /// The document root is not an image element.
    #[error("response is not an SVG document (root element <{root}>)")]
    NotAnImage { root: String },
    /// A raster body could not be decoded by the browser.
    #[error("image could not be decoded: {0}")]
    Decode(String),
}

/// The specific reason a load failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadErrorKind {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// No usable intrinsic box survived every fallback.
    #[error("image has no usable geometry: {0:?}")]
    Geometry(Rect),
    /// The page could not host the image (DOM call failed, viewer state busy).
    #[error("viewer could not display the image: {0}")]
    Host(String),
}

/// A failed load, tagged with the URL that was requested.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("failed to load diagram {url}: {kind}")]
pub struct LoadError {
    pub url: String,
    #[source]
    pub kind: LoadErrorKind,
}

impl LoadError {
    pub fn new(url: impl Into<String>, kind: impl Into<LoadErrorKind>) -> Self {
        Self { url: url.into(), kind: kind.into() }
    }
}
