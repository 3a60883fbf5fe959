//! Camera: maps the visible view box onto the container and applies pan,
//! anchored zoom, fit and resize policy.
//!
//! All coordinates on [`Rect`] are intrinsic image units. Screen points are
//! CSS pixels relative to the container's top-left corner.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::config::ViewerConfig;
use crate::consts::{DEFAULT_MAX_BOX_FACTOR, DEFAULT_MIN_BOX_FACTOR};

/// A point in either container (CSS pixel) or intrinsic space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in intrinsic image coordinates.
///
/// Used both for the image's native box and for the visible view box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// The image's native coordinate rectangle. Fixed for the lifetime of a load.
pub type IntrinsicBox = Rect;

/// The currently visible sub-rectangle of intrinsic space.
pub type ViewBox = Rect;

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// All components finite and both dimensions strictly positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Grow the rectangle about its center by `fraction` of its size on each axis.
    ///
    /// `fraction = 0.04` turns a 400-wide box into a 416-wide one, 8 units on each side.
    #[must_use]
    pub fn expanded(&self, fraction: f64) -> Self {
        let dx = self.width * fraction * 0.5;
        let dy = self.height * fraction * 0.5;
        Self {
            x: self.x - dx,
            y: self.y - dy,
            width: self.width + dx * 2.0,
            height: self.height + dy * 2.0,
        }
    }

    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy, ..*self }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

/// Pixel size of the hosting element. Re-read by the host on every resize.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerMetrics {
    pub width: f64,
    pub height: f64,
}

impl ContainerMetrics {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A container with no area cannot host a projection.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Uniform "contain" mapping from a view box onto a container.
///
/// The view box is scaled by the smaller of the two axis ratios and centered,
/// leaving letterbox bands on the axis with slack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Container pixels per intrinsic unit.
    pub scale: f64,
    /// Horizontal letterbox band in pixels.
    pub offset_x: f64,
    /// Vertical letterbox band in pixels.
    pub offset_y: f64,
    /// Intrinsic coordinate drawn at the top-left of the content area.
    pub origin: Point,
}

impl Projection {
    /// Build the projection for `view` inside `container`.
    ///
    /// Returns `None` when either side is degenerate, so callers never divide by zero.
    #[must_use]
    pub fn new(view: ViewBox, container: ContainerMetrics) -> Option<Self> {
        if !view.is_valid() || !container.is_valid() {
            return None;
        }
        let scale = (container.width / view.width).min(container.height / view.height);
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }
        Some(Self {
            scale,
            offset_x: (container.width - view.width * scale) * 0.5,
            offset_y: (container.height - view.height * scale) * 0.5,
            origin: Point::new(view.x, view.y),
        })
    }

    /// Convert a container point (CSS pixels) to intrinsic coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: self.origin.x + (screen.x - self.offset_x) / self.scale,
            y: self.origin.y + (screen.y - self.offset_y) / self.scale,
        }
    }

    /// Convert an intrinsic point to container coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: self.offset_x + (world.x - self.origin.x) * self.scale,
            y: self.offset_y + (world.y - self.origin.y) * self.scale,
        }
    }

    /// Convert a container distance (pixels) to an intrinsic distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }
}

/// Allowed view widths as multiples of the fitted base box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomBounds {
    pub min_box_factor: f64,
    pub max_box_factor: f64,
}

impl ZoomBounds {
    /// Ordered bounds from two factors in either order.
    ///
    /// A non-finite or non-positive factor is replaced by its default, so the
    /// result always satisfies `0 < min <= max`.
    #[must_use]
    pub fn new(a: f64, b: f64) -> Self {
        let usable = |f: f64, fallback: f64| if f.is_finite() && f > 0.0 { f } else { fallback };
        let a = usable(a, DEFAULT_MIN_BOX_FACTOR);
        let b = usable(b, DEFAULT_MAX_BOX_FACTOR);
        Self { min_box_factor: a.min(b), max_box_factor: a.max(b) }
    }
}

/// Camera state for one diagram container.
///
/// Owns the intrinsic box, the live view box, the fitted base box that zoom
/// bounds are measured against, and the flag recording whether the user has
/// moved the view since the last fit.
#[derive(Debug, Clone)]
pub struct Camera {
    intrinsic: Option<IntrinsicBox>,
    base: Option<ViewBox>,
    view: Option<ViewBox>,
    fit_padding: f64,
    bounds: ZoomBounds,
    user_moved: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&ViewerConfig::default())
    }
}

impl Camera {
    #[must_use]
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            intrinsic: None,
            base: None,
            view: None,
            fit_padding: config.fit_padding,
            bounds: ZoomBounds::new(config.min_box_factor, config.max_box_factor),
            user_moved: false,
        }
    }

    /// Install a freshly loaded intrinsic box. Clears any previous view.
    ///
    /// Returns `false` (and leaves the camera unloaded) for an invalid box.
    pub fn load(&mut self, intrinsic: IntrinsicBox) -> bool {
        self.base = None;
        self.view = None;
        self.user_moved = false;
        if !intrinsic.is_valid() {
            self.intrinsic = None;
            return false;
        }
        self.intrinsic = Some(intrinsic);
        true
    }

    #[must_use]
    pub fn intrinsic(&self) -> Option<IntrinsicBox> {
        self.intrinsic
    }

    #[must_use]
    pub fn view(&self) -> Option<ViewBox> {
        self.view
    }

    /// The box produced by the most recent fit; zoom bounds are multiples of it.
    #[must_use]
    pub fn base(&self) -> Option<ViewBox> {
        self.base
    }

    #[must_use]
    pub fn user_moved(&self) -> bool {
        self.user_moved
    }

    #[must_use]
    pub fn fit_padding(&self) -> f64 {
        self.fit_padding
    }

    #[must_use]
    pub fn bounds(&self) -> ZoomBounds {
        self.bounds
    }

    /// Projection of the current view onto `container`.
    #[must_use]
    pub fn projection(&self, container: ContainerMetrics) -> Option<Projection> {
        Projection::new(self.view?, container)
    }

    /// Show the whole image, padded by `padding` of its size on each axis.
    ///
    /// Clears the user-moved flag. No-op without an image or a usable container.
    pub fn fit(&mut self, padding: f64, container: ContainerMetrics) -> Option<ViewBox> {
        let intrinsic = self.intrinsic?;
        if !container.is_valid() {
            return None;
        }
        let padding = if padding.is_finite() && padding >= 0.0 { padding } else { 0.0 };
        let fitted = intrinsic.expanded(padding);
        if !fitted.is_valid() {
            return None;
        }
        self.fit_padding = padding;
        self.base = Some(fitted);
        self.view = Some(fitted);
        self.user_moved = false;
        log::debug!("camera fit: {fitted:?}");
        Some(fitted)
    }

    /// Fit again with the padding used last time.
    pub fn refit(&mut self, container: ContainerMetrics) -> Option<ViewBox> {
        self.fit(self.fit_padding, container)
    }

    /// Pan the live view by a pixel delta. Dragging right moves the view box left.
    pub fn apply_pan(&mut self, dx: f64, dy: f64, container: ContainerMetrics) -> Option<ViewBox> {
        let view = self.view?;
        self.pan_from(view, dx, dy, container)
    }

    /// Pan relative to `snapshot` rather than the live view.
    ///
    /// Drag handlers call this with the view captured at pointer-down and the
    /// total displacement since then, so motion stays proportional to the
    /// pointer regardless of how many move events arrive.
    pub fn pan_from(&mut self, snapshot: ViewBox, dx: f64, dy: f64, container: ContainerMetrics) -> Option<ViewBox> {
        self.intrinsic?;
        if !dx.is_finite() || !dy.is_finite() {
            return None;
        }
        let projection = Projection::new(snapshot, container)?;
        let next = snapshot.translated(-projection.screen_dist_to_world(dx), -projection.screen_dist_to_world(dy));
        if !next.is_valid() {
            return None;
        }
        self.view = Some(next);
        self.user_moved = true;
        Some(next)
    }

    /// Scale the view by `factor` (> 1 zooms in) keeping the intrinsic point
    /// under `anchor` fixed on screen.
    ///
    /// The resulting width is clamped to the configured multiples of the base box.
    pub fn apply_zoom(&mut self, factor: f64, anchor: Point, container: ContainerMetrics) -> Option<ViewBox> {
        if !factor.is_finite() || factor <= 0.0 || !anchor.x.is_finite() || !anchor.y.is_finite() {
            return None;
        }
        let view = self.view?;
        let base = self.base?;
        let current = Projection::new(view, container)?;
        let world = current.screen_to_world(anchor);

        let aspect = view.height / view.width;
        let min_width = base.width * self.bounds.min_box_factor;
        let max_width = base.width * self.bounds.max_box_factor;
        let width = (view.width / factor).clamp(min_width, max_width);
        let height = width * aspect;

        // Scale and letterbox depend only on size, so project a box at the origin
        // and solve for the origin that puts `world` back under `anchor`.
        let sized = Projection::new(Rect::new(0.0, 0.0, width, height), container)?;
        let next = Rect::new(
            world.x - (anchor.x - sized.offset_x) / sized.scale,
            world.y - (anchor.y - sized.offset_y) / sized.scale,
            width,
            height,
        );
        if !next.is_valid() {
            return None;
        }
        if next != view {
            self.view = Some(next);
            self.user_moved = true;
        }
        Some(next)
    }

    /// React to a container resize.
    ///
    /// Re-fits while the user has not moved the view; otherwise keeps their view.
    /// Returns the new view box when a fit happened.
    pub fn on_resize(&mut self, container: ContainerMetrics) -> Option<ViewBox> {
        if self.user_moved {
            return None;
        }
        self.refit(container)
    }
}
