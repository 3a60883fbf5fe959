use crate::camera::{Camera, ContainerMetrics, IntrinsicBox, Point, Projection, ViewBox};
use crate::config::ViewerConfig;
use crate::error::{LoadError, LoadErrorKind};
use crate::input::{Button, InputState, PointerId, WheelDelta};
use crate::loader::check_geometry;
use crate::render::{ErrorView, WrapperTransform};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Route further events for this pointer to the container.
    CapturePointer(PointerId),
    /// Release a previously captured pointer.
    ReleasePointer(PointerId),
    /// Toggle the dragging presentation (cursor, class).
    SetDragging(bool),
    /// The view changed; re-apply the wrapper transform.
    RenderNeeded,
}

/// Lifecycle of one viewer instance.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewerStatus {
    /// The resource has been requested but not yet displayed.
    #[default]
    Loading,
    /// An image is displayed and input is live.
    Ready,
    /// The load failed; the container shows an error and input is ignored.
    Failed(LoadError),
}

/// Core viewer state: camera, drag machine, container size and lifecycle.
///
/// Kept free of DOM types so it can be tested natively; the browser host
/// owns one per container and feeds it events.
pub struct EngineCore {
    pub camera: Camera,
    pub input: InputState,
    pub config: ViewerConfig,
    pub container: ContainerMetrics,
    status: ViewerStatus,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            camera: Camera::new(&config),
            input: InputState::default(),
            config,
            container: ContainerMetrics::default(),
            status: ViewerStatus::Loading,
        }
    }

    // --- Lifecycle ---

    /// Install a loaded image and fit it to the container.
    ///
    /// # Errors
    ///
    /// Returns [`LoadErrorKind::Geometry`] if the box is unusable; the engine
    /// stays in its previous state so the caller can report the failure.
    pub fn load(&mut self, intrinsic: IntrinsicBox) -> Result<Vec<Action>, LoadErrorKind> {
        let intrinsic = check_geometry(intrinsic)?;
        if !self.camera.load(intrinsic) {
            return Err(LoadErrorKind::Geometry(intrinsic));
        }
        self.input = InputState::Idle;
        self.status = ViewerStatus::Ready;
        log::debug!("diagram loaded: intrinsic box {intrinsic:?}");
        let fitted = self.camera.fit(self.config.fit_padding, self.container);
        Ok(if fitted.is_some() { vec![Action::RenderNeeded] } else { Vec::new() })
    }

    /// Record a terminal load failure.
    pub fn fail(&mut self, err: LoadError) {
        log::warn!("{err}");
        self.input = InputState::Idle;
        self.status = ViewerStatus::Failed(err);
    }

    #[must_use]
    pub fn status(&self) -> &ViewerStatus {
        &self.status
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == ViewerStatus::Ready
    }

    // --- Viewport ---

    /// Update the container size; re-fits unless the user has moved the view.
    ///
    /// The wrapper transform depends on the container size, so any usable
    /// size with a view in place asks for a render even when the view box is kept.
    pub fn set_container(&mut self, width: f64, height: f64) -> Vec<Action> {
        self.container = ContainerMetrics::new(width, height);
        if !self.is_ready() {
            return Vec::new();
        }
        // A view the user never saw (loaded while hidden) is fitted on first real size.
        if self.camera.view().is_none() {
            self.camera.refit(self.container);
        } else {
            self.camera.on_resize(self.container);
        }
        if self.projection().is_none() {
            return Vec::new();
        }
        self.reanchor_drag();
        vec![Action::RenderNeeded]
    }

    /// Explicit reset: fit the whole diagram again.
    pub fn reset(&mut self) -> Vec<Action> {
        if !self.is_ready() {
            return Vec::new();
        }
        if self.camera.fit(self.config.fit_padding, self.container).is_none() {
            return Vec::new();
        }
        self.reanchor_drag();
        vec![Action::RenderNeeded]
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, pointer_id: PointerId, screen_pt: Point, button: Button) -> Vec<Action> {
        if !self.is_ready() || button != Button::Primary || self.input.is_dragging() {
            return Vec::new();
        }
        let Some(view) = self.camera.view() else {
            return Vec::new();
        };
        self.input = InputState::Dragging {
            pointer_id,
            anchor_screen: screen_pt,
            anchor_view: view,
            last_screen: screen_pt,
        };
        vec![Action::CapturePointer(pointer_id), Action::SetDragging(true)]
    }

    pub fn on_pointer_move(&mut self, pointer_id: PointerId, screen_pt: Point) -> Vec<Action> {
        let InputState::Dragging { pointer_id: owner, anchor_screen, anchor_view, last_screen } = &mut self.input
        else {
            return Vec::new();
        };
        if *owner != pointer_id {
            return Vec::new();
        }
        *last_screen = screen_pt;
        let dx = screen_pt.x - anchor_screen.x;
        let dy = screen_pt.y - anchor_screen.y;
        let snapshot = *anchor_view;
        match self.camera.pan_from(snapshot, dx, dy, self.container) {
            Some(_) => vec![Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    pub fn on_pointer_up(&mut self, pointer_id: PointerId) -> Vec<Action> {
        self.end_drag(pointer_id)
    }

    pub fn on_pointer_cancel(&mut self, pointer_id: PointerId) -> Vec<Action> {
        self.end_drag(pointer_id)
    }

    pub fn on_pointer_leave(&mut self, pointer_id: PointerId) -> Vec<Action> {
        self.end_drag(pointer_id)
    }

    /// Zoom about the cursor. Valid whether or not a drag is in progress.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta) -> Vec<Action> {
        if !self.is_ready() {
            return Vec::new();
        }
        let factor = delta.zoom_factor(self.config.wheel_step, self.container.height);
        if (factor - 1.0).abs() < f64::EPSILON {
            return Vec::new();
        }
        if self.camera.apply_zoom(factor, screen_pt, self.container).is_none() {
            return Vec::new();
        }
        self.reanchor_drag();
        vec![Action::RenderNeeded]
    }

    pub fn on_double_click(&mut self) -> Vec<Action> {
        self.reset()
    }

    // --- Queries ---

    #[must_use]
    pub fn view(&self) -> Option<ViewBox> {
        self.camera.view()
    }

    #[must_use]
    pub fn projection(&self) -> Option<Projection> {
        self.camera.projection(self.container)
    }

    /// Intrinsic point currently under a container point.
    #[must_use]
    pub fn screen_to_world(&self, screen_pt: Point) -> Option<Point> {
        Some(self.projection()?.screen_to_world(screen_pt))
    }

    /// Transform to apply to the wrapper, when an image is displayed.
    #[must_use]
    pub fn wrapper_transform(&self) -> Option<WrapperTransform> {
        if !self.is_ready() {
            return None;
        }
        Some(WrapperTransform::for_view(self.camera.intrinsic()?, self.projection()?))
    }

    /// Error element contents, when the load failed.
    #[must_use]
    pub fn error_view(&self) -> Option<ErrorView> {
        match &self.status {
            ViewerStatus::Failed(err) => Some(ErrorView::from_error(err)),
            _ => None,
        }
    }

    // --- Internals ---

    fn end_drag(&mut self, pointer_id: PointerId) -> Vec<Action> {
        if self.input.pointer_id() != Some(pointer_id) {
            return Vec::new();
        }
        self.input = InputState::Idle;
        vec![Action::ReleasePointer(pointer_id), Action::SetDragging(false)]
    }

    /// After a zoom or fit mid-drag, continue the drag from the new view so
    /// the next move does not snap back to the pre-zoom snapshot.
    fn reanchor_drag(&mut self) {
        let Some(view) = self.camera.view() else {
            return;
        };
        if let InputState::Dragging { anchor_screen, anchor_view, last_screen, .. } = &mut self.input {
            *anchor_screen = *last_screen;
            *anchor_view = view;
        }
    }
}
