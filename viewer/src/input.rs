//! Input model: pointer buttons, wheel deltas, and the drag state machine.
//!
//! The viewer tracks a single pointer. `InputState` is `Idle` until a primary
//! pointer-down, then `Dragging` until that pointer is released, cancelled,
//! or leaves the container. The drag records the view box at pointer-down so
//! every move pans from the same snapshot.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::{Point, ViewBox};
use crate::consts::{WHEEL_LINE_PX, WHEEL_NOTCH_PX};

/// Browser pointer identifier (`PointerEvent.pointerId`).
pub type PointerId = i32;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button, pen contact, or single-finger touch.
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Secondary,
    /// Back, forward, or any other extra button.
    Other,
}

impl Button {
    /// Map a DOM `MouseEvent.button` value.
    #[must_use]
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Other,
        }
    }
}

/// Unit of a wheel delta (`WheelEvent.deltaMode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl DeltaMode {
    /// Map a DOM `WheelEvent.deltaMode` value.
    #[must_use]
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => Self::Line,
            2 => Self::Page,
            _ => Self::Pixel,
        }
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount. Zoom reads only `dy`; horizontal scrolling
    /// neither zooms nor pans.
    pub dx: f64,
    /// Vertical scroll amount (positive = down, away from the user).
    pub dy: f64,
    /// Unit of `dx` / `dy`.
    pub mode: DeltaMode,
}

impl WheelDelta {
    #[must_use]
    pub fn pixels(dx: f64, dy: f64) -> Self {
        Self { dx, dy, mode: DeltaMode::Pixel }
    }

    /// Vertical delta in pixels. Page deltas use the container height.
    #[must_use]
    pub fn dy_pixels(&self, page_height: f64) -> f64 {
        match self.mode {
            DeltaMode::Pixel => self.dy,
            DeltaMode::Line => self.dy * WHEEL_LINE_PX,
            DeltaMode::Page => self.dy * page_height,
        }
    }

    /// Exponential zoom factor for this delta.
    ///
    /// A standard notch (100px down) yields `1 / step`, a notch up yields
    /// `step`, and partial trackpad deltas compound to the same total. The
    /// result is 1.0 for a zero or non-finite delta.
    #[must_use]
    pub fn zoom_factor(&self, step: f64, page_height: f64) -> f64 {
        let dy = self.dy_pixels(page_height);
        if !dy.is_finite() || dy.abs() < f64::EPSILON {
            return 1.0;
        }
        step.powf(-dy / WHEEL_NOTCH_PX)
    }
}

/// Internal state for the drag state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is panning by dragging the image.
    Dragging {
        /// Pointer that started the drag; other pointers are ignored.
        pointer_id: PointerId,
        /// Container position of the pointer-down (or of the last re-anchor).
        anchor_screen: Point,
        /// View box at the moment of `anchor_screen`.
        anchor_view: ViewBox,
        /// Most recent pointer position, used to re-anchor after a wheel zoom.
        last_screen: Point,
    },
}

impl InputState {
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    /// The pointer that owns the current drag, if any.
    #[must_use]
    pub fn pointer_id(&self) -> Option<PointerId> {
        match self {
            Self::Idle => None,
            Self::Dragging { pointer_id, .. } => Some(*pointer_id),
        }
    }
}
