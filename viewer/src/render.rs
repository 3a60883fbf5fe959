//! Output model: what the host writes into the DOM.
//!
//! The viewer renders by placing the image in a wrapper element sized to the
//! intrinsic box and moving that wrapper with a CSS `translate + scale`
//! transform. The same strategy serves vector and raster content. This module
//! only computes values; `host` applies them.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::fmt;

use crate::camera::{IntrinsicBox, Projection, Rect};
use crate::error::LoadError;

pub const LOADING_TEXT: &str = "Loading diagram\u{2026}";
pub const ERROR_TITLE: &str = "Failed to load diagram.";
pub const ERROR_LINK_TEXT: &str = "Open diagram directly";

/// Affine placement of the wrapper: `translate(tx, ty) scale(s)` with origin 0 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapperTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl WrapperTransform {
    /// Place a wrapper whose local (0, 0) is the intrinsic box origin so the
    /// current view fills the container under `projection`.
    #[must_use]
    pub fn for_view(intrinsic: IntrinsicBox, projection: Projection) -> Self {
        Self {
            translate_x: projection.offset_x + (intrinsic.x - projection.origin.x) * projection.scale,
            translate_y: projection.offset_y + (intrinsic.y - projection.origin.y) * projection.scale,
            scale: projection.scale,
        }
    }
}

impl fmt::Display for WrapperTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "translate({}px, {}px) scale({})", self.translate_x, self.translate_y, self.scale)
    }
}

/// `viewBox` attribute text for a rectangle.
#[must_use]
pub fn view_box_attr(rect: Rect) -> String {
    format!("{} {} {} {}", rect.x, rect.y, rect.width, rect.height)
}

/// CSS size of the wrapper, one pixel per intrinsic unit before scaling.
#[must_use]
pub fn wrapper_size(intrinsic: IntrinsicBox) -> (String, String) {
    (format!("{}px", intrinsic.width), format!("{}px", intrinsic.height))
}

/// The single error element shown in place of a diagram that failed to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub title: &'static str,
    /// Direct link to the resource so the reader can still open it.
    pub href: String,
    pub link_text: &'static str,
    pub detail: String,
}

impl ErrorView {
    #[must_use]
    pub fn from_error(err: &LoadError) -> Self {
        Self { title: ERROR_TITLE, href: err.url.clone(), link_text: ERROR_LINK_TEXT, detail: err.kind.to_string() }
    }
}
