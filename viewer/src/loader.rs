//! Loading: resource classification, vector parsing, and intrinsic box policy.
//!
//! Everything here is pure so it can be exercised natively; the browser
//! fetch and DOM measurement live in `host`. The flow is:
//!
//! 1. [`classify`] decides between vector markup and a raster image.
//! 2. [`parse_vector`] validates the markup and records the root attributes.
//! 3. [`VectorDocument::intrinsic_box`] resolves the native coordinate box,
//!    optionally from a bounding box the host measured after mounting.
//! 4. [`VectorDocument::prepared_markup`] rewrites the root so the image
//!    scales to its container instead of a fixed pixel size.

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;

use std::ops::Range;

use crate::camera::{IntrinsicBox, Rect};
use crate::consts::{CLASS_SVG, FALLBACK_HEIGHT, FALLBACK_WIDTH, MEASURED_BBOX_PADDING, PRESERVE_ASPECT_RATIO};
use crate::error::{LoadErrorKind, ParseError};

const RASTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "avif"];

/// How the response body should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Vector markup parsed and inlined into the page.
    Vector,
    /// A bitmap shown through an image element.
    Raster,
}

/// Classify a resource from its `Content-Type` header and URL.
///
/// An SVG, XML or text type means markup and any other `image/*` type means a
/// bitmap; otherwise a raster file extension decides. Anything else is treated as vector markup and left to the parser.
#[must_use]
pub fn classify(url: &str, content_type: Option<&str>) -> ResourceKind {
    if let Some(ct) = content_type {
        let mime = ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        if mime == "image/svg+xml" || mime.ends_with("/xml") || mime.starts_with("text/") {
            return ResourceKind::Vector;
        }
        if mime.starts_with("image/") {
            return ResourceKind::Raster;
        }
    }

    let path = url.split(['?', '#']).next().unwrap_or_default();
    let is_raster = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| RASTER_EXTENSIONS.contains(&ext.as_str()));
    if is_raster { ResourceKind::Raster } else { ResourceKind::Vector }
}

/// Where an intrinsic box came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxSource {
    /// The root's own `viewBox` attribute.
    Declared,
    /// The rendered content's bounding box, padded.
    Measured,
    /// The root's `width`/`height` attributes as a 0-origin box.
    Dimensions,
    /// Nothing usable; the fixed fallback box.
    Fallback,
}

/// A validated vector document and the root attributes the viewer cares about.
#[derive(Debug, Clone)]
pub struct VectorDocument {
    markup: String,
    declared_view_box: Option<Rect>,
    width_attr: Option<f64>,
    height_attr: Option<f64>,
    existing_class: Option<String>,
    /// Byte offset just past the root tag name, where new attributes go.
    insert_at: usize,
    /// Root attributes replaced by the rewrite.
    stripped: Vec<Range<usize>>,
}

/// Parse markup and check that its root element is an SVG image.
///
/// # Errors
///
/// Returns [`ParseError::Xml`] for malformed markup and
/// [`ParseError::NotAnImage`] when the root element is anything other than `svg`.
pub fn parse_vector(text: &str) -> Result<VectorDocument, ParseError> {
    let options = roxmltree::ParsingOptions { allow_dtd: true, ..roxmltree::ParsingOptions::default() };
    let doc = roxmltree::Document::parse_with_options(text, options).map_err(|e| ParseError::Xml(e.to_string()))?;
    let root = doc.root_element();
    let name = root.tag_name().name();
    if !name.eq_ignore_ascii_case("svg") {
        return Err(ParseError::NotAnImage { root: name.to_owned() });
    }

    let start = root.range().start;
    let name_len = text[start + 1..]
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(0);

    let stripped = root
        .attributes()
        .filter(|attr| attr.namespace().is_none())
        .filter(|attr| matches!(attr.name(), "width" | "height" | "preserveAspectRatio" | "class"))
        .map(|attr| attr.range())
        .collect();

    Ok(VectorDocument {
        markup: text.to_owned(),
        declared_view_box: root.attribute("viewBox").and_then(parse_view_box),
        width_attr: root.attribute("width").and_then(parse_length),
        height_attr: root.attribute("height").and_then(parse_length),
        existing_class: root.attribute("class").map(str::to_owned),
        insert_at: start + 1 + name_len,
        stripped,
    })
}

impl VectorDocument {
    /// The root `viewBox`, when it has four finite numbers and a positive size.
    #[must_use]
    pub fn declared_view_box(&self) -> Option<Rect> {
        self.declared_view_box
    }

    /// The root `width`/`height` attributes, when present and usable.
    #[must_use]
    pub fn dimensions(&self) -> Option<(f64, f64)> {
        match (self.width_attr, self.height_attr) {
            (None, None) => None,
            (w, h) => Some((w.unwrap_or(FALLBACK_WIDTH), h.unwrap_or(FALLBACK_HEIGHT))),
        }
    }

    /// Whether the host should measure rendered content before resolving the box.
    #[must_use]
    pub fn needs_measurement(&self) -> bool {
        self.declared_view_box.is_none()
    }

    /// Resolve the intrinsic box, trying declared, measured, dimension and fallback
    /// sources in that order.
    #[must_use]
    pub fn intrinsic_box(&self, measured: Option<Rect>) -> (IntrinsicBox, BoxSource) {
        resolve_intrinsic_box(self.declared_view_box, measured, self.dimensions())
    }

    /// Root-rewritten markup ready to be inlined.
    ///
    /// Fixed `width`/`height` are dropped so the container decides the size,
    /// the aspect ratio is preserved and centered, and the viewer class is
    /// added alongside any existing classes.
    #[must_use]
    pub fn prepared_markup(&self) -> String {
        let mut remove = self.stripped.clone();
        remove.sort_by_key(|r| std::cmp::Reverse(r.start));

        let mut out = self.markup.clone();
        for range in remove {
            out.replace_range(range, "");
        }

        let class = match self.existing_class.as_deref().map(str::trim) {
            Some(existing) if !existing.is_empty() => format!("{CLASS_SVG} {}", escape_attr(existing)),
            _ => CLASS_SVG.to_owned(),
        };
        let attrs = format!(" preserveAspectRatio=\"{PRESERVE_ASPECT_RATIO}\" class=\"{class}\"");
        out.insert_str(self.insert_at, &attrs);
        out
    }
}

/// Apply the intrinsic box priority policy.
///
/// Declared boxes are used as-is, measured boxes gain a 2% margin, dimensions
/// become a 0-origin box, and the fixed fallback covers everything else.
#[must_use]
pub fn resolve_intrinsic_box(
    declared: Option<Rect>,
    measured: Option<Rect>,
    dimensions: Option<(f64, f64)>,
) -> (IntrinsicBox, BoxSource) {
    if let Some(vb) = declared.filter(Rect::is_valid) {
        return (vb, BoxSource::Declared);
    }
    if let Some(bbox) = measured.filter(Rect::is_valid) {
        let padded = bbox.expanded(MEASURED_BBOX_PADDING);
        if padded.is_valid() {
            return (padded, BoxSource::Measured);
        }
    }
    if let Some((w, h)) = dimensions {
        let dims = Rect::new(0.0, 0.0, w, h);
        if dims.is_valid() {
            return (dims, BoxSource::Dimensions);
        }
    }
    (Rect::new(0.0, 0.0, FALLBACK_WIDTH, FALLBACK_HEIGHT), BoxSource::Fallback)
}

/// Final guard on a resolved box before it reaches the camera.
///
/// # Errors
///
/// Returns [`LoadErrorKind::Geometry`] for a non-finite or non-positive box.
pub fn check_geometry(rect: Rect) -> Result<IntrinsicBox, LoadErrorKind> {
    if rect.is_valid() { Ok(rect) } else { Err(LoadErrorKind::Geometry(rect)) }
}

/// Intrinsic box of a decoded raster image.
///
/// # Errors
///
/// Returns [`LoadErrorKind::Geometry`] when the image reports a zero size.
pub fn raster_box(natural_width: u32, natural_height: u32) -> Result<IntrinsicBox, LoadErrorKind> {
    check_geometry(Rect::new(0.0, 0.0, f64::from(natural_width), f64::from(natural_height)))
}

/// Parse a `viewBox` value: four numbers separated by whitespace and/or commas.
#[must_use]
pub fn parse_view_box(raw: &str) -> Option<Rect> {
    let Ok(numbers) = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse::<f64>)
        .collect::<Result<Vec<_>, _>>()
    else {
        return None;
    };
    let &[x, y, width, height] = numbers.as_slice() else {
        return None;
    };
    Some(Rect::new(x, y, width, height)).filter(Rect::is_valid)
}

/// Parse a `width`/`height` length, dropping an absolute unit suffix.
///
/// Percentages describe the container, not the image, and are rejected.
#[must_use]
pub fn parse_length(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.ends_with('%') {
        return None;
    }
    let number = trimmed.trim_end_matches(|c: char| c.is_ascii_alphabetic()).trim_end();
    let Ok(value) = number.parse::<f64>() else {
        return None;
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

fn escape_attr(raw: &str) -> String {
    raw.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;")
}
