//! Shared numeric constants and DOM names for the viewer crate.

// ── Camera ──────────────────────────────────────────────────────

/// Fraction of the intrinsic box added on each side by `fit`.
pub const DEFAULT_FIT_PADDING: f64 = 0.04;

/// Smallest view width as a multiple of the fitted base box (deepest zoom in).
pub const DEFAULT_MIN_BOX_FACTOR: f64 = 0.08;

/// Largest view width as a multiple of the fitted base box (widest zoom out).
pub const DEFAULT_MAX_BOX_FACTOR: f64 = 20.0;

// ── Wheel ───────────────────────────────────────────────────────

/// Zoom ratio applied per standard wheel notch.
pub const DEFAULT_WHEEL_STEP: f64 = 1.1;

/// Pixel delta reported by a typical mouse wheel notch.
pub const WHEEL_NOTCH_PX: f64 = 100.0;

/// Pixels per line for `DOM_DELTA_LINE` wheel events.
pub const WHEEL_LINE_PX: f64 = 16.0;

// ── Loader ──────────────────────────────────────────────────────

/// Margin added on each axis around a measured content bounding box.
pub const MEASURED_BBOX_PADDING: f64 = 0.02;

/// Intrinsic box used when a document declares no usable geometry.
pub const FALLBACK_WIDTH: f64 = 1000.0;
pub const FALLBACK_HEIGHT: f64 = 600.0;

/// Aspect-ratio policy written onto the image root.
pub const PRESERVE_ASPECT_RATIO: &str = "xMidYMid meet";

// ── DOM ─────────────────────────────────────────────────────────

pub const ATTR_URL: &str = "data-svg-url";
pub const ATTR_URL_ALT: &str = "data-src";
pub const ATTR_INIT: &str = "data-diagram-init";
pub const ATTR_CONFIG: &str = "data-viewer-config";
pub const ATTR_FIT_PADDING: &str = "data-fit-padding";
pub const ATTR_MIN_ZOOM: &str = "data-min-zoom";
pub const ATTR_MAX_ZOOM: &str = "data-max-zoom";
pub const ATTR_WHEEL_STEP: &str = "data-wheel-step";

pub const SELECTOR_VIEWPORT: &str = "[data-diagram-viewport]";
pub const SELECTOR_RESET: &str = "[data-diagram-reset]";
pub const SELECTOR_DEFAULT_MOUNT: &str = "[data-svg-diagram], [data-svg-panzoom]";

pub const CLASS_SVG: &str = "diagram-svg";
pub const CLASS_INNER: &str = "diagram-inner";
pub const CLASS_DRAGGING: &str = "is-dragging";
pub const CLASS_LOADING: &str = "diagram-loading";
pub const CLASS_ERROR: &str = "diagram-error";
