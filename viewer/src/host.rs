//! Browser host: binds an [`EngineCore`] to a container element.
//!
//! ARCHITECTURE
//! ============
//! `mount` reads the container's data attributes, shows a loading message,
//! and spawns the fetch. On success the image is inlined into a
//! transform-bearing wrapper, the engine is fitted, and pointer, wheel,
//! double-click, reset and resize listeners are attached. On failure the
//! container shows one error element and no listeners are attached.
//!
//! Each mounted container owns its own engine, listeners and init marker
//! (`data-diagram-init`), so any number of viewers can share a page.
//!
//! ERROR HANDLING
//! ==============
//! DOM calls return `Result<_, JsValue>` and are propagated with `?` up to the
//! exported entry points. Failures inside event handlers are logged, never
//! thrown, so one bad event cannot wedge the viewer.

use std::cell::{BorrowMutError, RefCell};
use std::rc::Rc;
use std::sync::Once;

use gloo_net::http::Request;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{JsCast, closure::Closure};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    AddEventListenerOptions, Blob, CssStyleDeclaration, Document, Event, EventTarget, HtmlElement, HtmlImageElement,
    MouseEvent, PointerEvent, RequestCache, ResizeObserver, SvgGraphicsElement, Url, WheelEvent,
};

use crate::camera::{IntrinsicBox, Point, Rect};
use crate::config::ViewerConfig;
use crate::consts::{
    ATTR_INIT, ATTR_URL, ATTR_URL_ALT, CLASS_DRAGGING, CLASS_ERROR, CLASS_INNER, CLASS_LOADING, SELECTOR_DEFAULT_MOUNT,
    SELECTOR_RESET, SELECTOR_VIEWPORT,
};
use crate::engine::{Action, EngineCore};
use crate::error::{FetchError, LoadError, LoadErrorKind, ParseError};
use crate::input::{Button, DeltaMode, WheelDelta};
use crate::loader::{ResourceKind, check_geometry, classify, parse_vector, raster_box};
use crate::render::{ErrorView, LOADING_TEXT, view_box_attr, wrapper_size};

static LOGGER: Once = Once::new();

fn init_logging() {
    LOGGER.call_once(|| {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            log::debug!("logger already installed by the host page");
        }
    });
}

/// A registered DOM listener, kept so it can be removed on destroy.
struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

/// Fetched body, split by how it will be displayed.
enum Fetched {
    Vector(String),
    Raster(Vec<u8>),
}

/// One mounted viewer: its elements, engine, and listeners.
struct Viewer {
    container: HtmlElement,
    viewport: HtmlElement,
    wrapper: Option<HtmlElement>,
    core: EngineCore,
    listeners: Vec<Listener>,
    resize_observer: Option<(ResizeObserver, Closure<dyn FnMut()>)>,
    object_url: Option<String>,
}

impl Viewer {
    fn metrics(&self) -> (f64, f64) {
        (f64::from(self.viewport.client_width()), f64::from(self.viewport.client_height()))
    }

    /// Container-relative position of a mouse-family event.
    fn local_point(&self, ev: &MouseEvent) -> Point {
        let rect = self.viewport.get_bounding_client_rect();
        Point::new(f64::from(ev.client_x()) - rect.left(), f64::from(ev.client_y()) - rect.top())
    }

    fn apply(&mut self, actions: Vec<Action>) {
        for action in actions {
            let result = match action {
                Action::CapturePointer(id) => self.viewport.set_pointer_capture(id),
                Action::ReleasePointer(id) => {
                    if self.viewport.has_pointer_capture(id) {
                        self.viewport.release_pointer_capture(id)
                    } else {
                        Ok(())
                    }
                }
                Action::SetDragging(on) => self.viewport.class_list().toggle_with_force(CLASS_DRAGGING, on).map(drop),
                Action::RenderNeeded => self.render(),
            };
            if let Err(e) = result {
                log::debug!("viewer action {action:?} failed: {e:?}");
            }
        }
    }

    fn render(&self) -> Result<(), JsValue> {
        let (Some(wrapper), Some(transform)) = (&self.wrapper, self.core.wrapper_transform()) else {
            return Ok(());
        };
        wrapper.style().set_property("transform", &transform.to_string())
    }

    fn teardown(&mut self) {
        for listener in self.listeners.drain(..) {
            if let Err(e) = listener
                .target
                .remove_event_listener_with_callback(listener.event, listener.closure.as_ref().unchecked_ref())
            {
                log::debug!("failed to remove {} listener: {e:?}", listener.event);
            }
        }
        if let Some((observer, _closure)) = self.resize_observer.take() {
            observer.disconnect();
        }
        if let Some(url) = self.object_url.take() {
            if let Err(e) = Url::revoke_object_url(&url) {
                log::debug!("failed to revoke object url: {e:?}");
            }
        }
    }
}

/// Handle to a mounted viewer, returned to JavaScript.
#[wasm_bindgen]
pub struct ViewerHandle {
    viewer: Rc<RefCell<Viewer>>,
}

#[wasm_bindgen]
impl ViewerHandle {
    /// Fit the whole diagram again.
    pub fn reset(&self) {
        if let Ok(mut viewer) = self.viewer.try_borrow_mut() {
            let actions = viewer.core.reset();
            viewer.apply(actions);
        }
    }

    /// Whether the image loaded and input is live.
    #[wasm_bindgen(getter)]
    pub fn ready(&self) -> bool {
        self.viewer.try_borrow().is_ok_and(|viewer| viewer.core.is_ready())
    }

    /// Detach every listener and allow the container to be mounted again.
    pub fn destroy(&self) {
        if let Ok(mut viewer) = self.viewer.try_borrow_mut() {
            viewer.teardown();
            if let Err(e) = viewer.container.remove_attribute(ATTR_INIT) {
                log::debug!("failed to clear init marker: {e:?}");
            }
        }
    }
}

/// Mount a viewer on every element matching `selector`
/// (default `[data-svg-diagram], [data-svg-panzoom]`).
///
/// # Errors
///
/// Returns `Err` when there is no document or the selector is invalid.
#[wasm_bindgen]
pub fn mount_all(selector: Option<String>) -> Result<js_sys::Array, JsValue> {
    init_logging();
    let document = document()?;
    let nodes = document.query_selector_all(selector.as_deref().unwrap_or(SELECTOR_DEFAULT_MOUNT))?;
    let handles = js_sys::Array::new();
    for i in 0..nodes.length() {
        let Some(node) = nodes.item(i) else {
            continue;
        };
        let Ok(element) = node.dyn_into::<HtmlElement>() else {
            continue;
        };
        if let Some(handle) = mount(element)? {
            handles.push(&JsValue::from(handle));
        }
    }
    Ok(handles)
}

/// Mount a viewer on one container element.
///
/// Returns `None` if the container is already mounted or names no URL.
///
/// # Errors
///
/// Returns `Err` if the loading placeholder cannot be created.
#[wasm_bindgen]
pub fn mount(container: HtmlElement) -> Result<Option<ViewerHandle>, JsValue> {
    init_logging();
    if container.has_attribute(ATTR_INIT) {
        return Ok(None);
    }
    let Some(url) = container.get_attribute(ATTR_URL).or_else(|| container.get_attribute(ATTR_URL_ALT)) else {
        log::warn!("diagram container has no {ATTR_URL} attribute");
        return Ok(None);
    };
    container.set_attribute(ATTR_INIT, "1")?;

    let viewport = match container.query_selector(SELECTOR_VIEWPORT)? {
        Some(el) => el.dyn_into::<HtmlElement>()?,
        None => container.clone(),
    };
    let config = ViewerConfig::from_attributes(|name| container.get_attribute(name)).unwrap_or_else(|e| {
        log::warn!("{e}; using default viewer config");
        ViewerConfig::default()
    });

    show_message(&viewport, CLASS_LOADING, LOADING_TEXT)?;

    let viewer = Rc::new(RefCell::new(Viewer {
        container,
        viewport,
        wrapper: None,
        core: EngineCore::new(config),
        listeners: Vec::new(),
        resize_observer: None,
        object_url: None,
    }));

    let task_viewer = Rc::clone(&viewer);
    spawn_local(async move {
        match load(&task_viewer, &url).await {
            Ok(()) => {
                if let Err(e) = attach_listeners(&task_viewer) {
                    log::warn!("failed to attach diagram listeners: {e:?}");
                }
            }
            Err(kind) => {
                let err = LoadError::new(url, kind);
                let Ok(mut viewer) = task_viewer.try_borrow_mut() else {
                    log::warn!("{err}; viewer busy, error not shown");
                    return;
                };
                viewer.core.fail(err);
                viewer.teardown();
                if let Err(e) = render_error(&viewer) {
                    log::warn!("failed to render diagram error: {e:?}");
                }
            }
        }
    });

    Ok(Some(ViewerHandle { viewer }))
}

// =============================================================
// Loading
// =============================================================

async fn fetch(url: &str) -> Result<Fetched, LoadErrorKind> {
    let resp = Request::get(url)
        .cache(RequestCache::NoStore)
        .send()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;
    let status = resp.status();
    if !(200..300).contains(&status) {
        return Err(FetchError::Status(status).into());
    }
    let content_type = resp.headers().get("content-type");
    match classify(url, content_type.as_deref()) {
        ResourceKind::Vector => {
            let text = resp.text().await.map_err(|e| FetchError::Network(e.to_string()))?;
            Ok(Fetched::Vector(text))
        }
        ResourceKind::Raster => {
            let bytes = resp.binary().await.map_err(|e| FetchError::Network(e.to_string()))?;
            Ok(Fetched::Raster(bytes))
        }
    }
}

async fn load(viewer: &Rc<RefCell<Viewer>>, url: &str) -> Result<(), LoadErrorKind> {
    let fetched = fetch(url).await?;
    let intrinsic = match fetched {
        Fetched::Vector(text) => mount_vector(viewer, &text)?,
        Fetched::Raster(bytes) => mount_raster(viewer, &bytes).await?,
    };

    let mut viewer = viewer
        .try_borrow_mut()
        .map_err(host_error)?;
    let (width, height) = viewer.metrics();
    viewer.core.set_container(width, height);
    let actions = viewer.core.load(intrinsic)?;
    viewer.apply(actions);
    log::info!("diagram ready: {url}");
    Ok(())
}

/// Inline the rewritten markup and resolve its intrinsic box.
fn mount_vector(viewer: &Rc<RefCell<Viewer>>, text: &str) -> Result<IntrinsicBox, LoadErrorKind> {
    let doc = parse_vector(text)?;
    let mut viewer = viewer
        .try_borrow_mut()
        .map_err(host_error)?;
    let wrapper = install_wrapper(&viewer.viewport).map_err(js_dom_error)?;
    wrapper.set_inner_html(&doc.prepared_markup());

    let Some(root) = wrapper.query_selector("svg").map_err(js_dom_error)? else {
        return Err(ParseError::NotAnImage { root: String::new() }.into());
    };
    let svg = root
        .dyn_into::<SvgGraphicsElement>()
        .map_err(|el| ParseError::NotAnImage { root: el.tag_name() })?;

    let measured = if doc.needs_measurement() { measure(&svg) } else { None };
    let (intrinsic, source) = doc.intrinsic_box(measured);
    let intrinsic = check_geometry(intrinsic)?;
    log::debug!("intrinsic box {intrinsic:?} from {source:?}");
    if doc.needs_measurement() {
        svg.set_attribute("viewBox", &view_box_attr(intrinsic)).map_err(js_dom_error)?;
    }
    fill_parent(&svg.style()).map_err(js_dom_error)?;
    size_wrapper(&wrapper, intrinsic).map_err(js_dom_error)?;
    viewer.wrapper = Some(wrapper);
    Ok(intrinsic)
}

/// Show a raster body through a blob URL and read its natural size.
async fn mount_raster(viewer: &Rc<RefCell<Viewer>>, bytes: &[u8]) -> Result<IntrinsicBox, LoadErrorKind> {
    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
    let blob = Blob::new_with_u8_array_sequence(&parts).map_err(js_dom_error)?;
    let object_url = Url::create_object_url_with_blob(&blob).map_err(js_dom_error)?;
    // Owned by the viewer from here so teardown revokes it even if decoding fails.
    viewer.try_borrow_mut().map_err(host_error)?.object_url = Some(object_url.clone());

    let img = document()
        .and_then(|d| d.create_element("img"))
        .and_then(|el| el.dyn_into::<HtmlImageElement>().map_err(JsValue::from))
        .map_err(js_dom_error)?;
    img.set_src(&object_url);
    img.set_draggable(false);
    JsFuture::from(img.decode()).await.map_err(js_decode_error)?;
    let intrinsic = raster_box(img.natural_width(), img.natural_height())?;

    let mut viewer = viewer
        .try_borrow_mut()
        .map_err(host_error)?;
    let wrapper = install_wrapper(&viewer.viewport).map_err(js_dom_error)?;
    fill_parent(&img.style()).map_err(js_dom_error)?;
    wrapper.append_child(&img).map_err(js_dom_error)?;
    size_wrapper(&wrapper, intrinsic).map_err(js_dom_error)?;
    viewer.wrapper = Some(wrapper);
    Ok(intrinsic)
}

fn measure(svg: &SvgGraphicsElement) -> Option<Rect> {
    match svg.get_b_box() {
        Ok(b) => Some(Rect::new(f64::from(b.x()), f64::from(b.y()), f64::from(b.width()), f64::from(b.height()))),
        Err(e) => {
            log::debug!("getBBox failed: {e:?}");
            None
        }
    }
}

fn js_decode_error(e: JsValue) -> LoadErrorKind {
    ParseError::Decode(format!("{e:?}")).into()
}

fn js_dom_error(e: JsValue) -> LoadErrorKind {
    LoadErrorKind::Host(format!("{e:?}"))
}

fn host_error(e: BorrowMutError) -> LoadErrorKind {
    LoadErrorKind::Host(e.to_string())
}

// =============================================================
// DOM construction
// =============================================================

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn create_html(tag: &str) -> Result<HtmlElement, JsValue> {
    Ok(document()?.create_element(tag)?.dyn_into::<HtmlElement>()?)
}

/// Replace the viewport contents with an empty transform wrapper.
fn install_wrapper(viewport: &HtmlElement) -> Result<HtmlElement, JsValue> {
    let style = viewport.style();
    style.set_property("position", "relative")?;
    style.set_property("overflow", "hidden")?;
    style.set_property("touch-action", "none")?;

    let wrapper = create_html("div")?;
    wrapper.set_class_name(CLASS_INNER);
    let ws = wrapper.style();
    ws.set_property("position", "absolute")?;
    ws.set_property("left", "0")?;
    ws.set_property("top", "0")?;
    ws.set_property("transform-origin", "0 0")?;

    viewport.set_inner_html("");
    viewport.append_child(&wrapper)?;
    Ok(wrapper)
}

fn size_wrapper(wrapper: &HtmlElement, intrinsic: IntrinsicBox) -> Result<(), JsValue> {
    let (width, height) = wrapper_size(intrinsic);
    wrapper.style().set_property("width", &width)?;
    wrapper.style().set_property("height", &height)
}

/// Stretch the image over the wrapper, keeping any inline style the author set.
fn fill_parent(style: &CssStyleDeclaration) -> Result<(), JsValue> {
    style.set_property("width", "100%")?;
    style.set_property("height", "100%")?;
    style.set_property("display", "block")
}

fn show_message(viewport: &HtmlElement, class: &str, text: &str) -> Result<(), JsValue> {
    let message = create_html("div")?;
    message.set_class_name(class);
    message.set_text_content(Some(text));
    viewport.set_inner_html("");
    viewport.append_child(&message)?;
    Ok(())
}

/// Replace the viewport contents with the single error element.
fn render_error(viewer: &Viewer) -> Result<(), JsValue> {
    let Some(view) = viewer.core.error_view() else {
        return Ok(());
    };
    let ErrorView { title, href, link_text, detail } = view;
    let doc = document()?;

    let root = create_html("div")?;
    root.set_class_name(CLASS_ERROR);
    root.set_attribute("role", "alert")?;

    let strong = doc.create_element("strong")?;
    strong.set_text_content(Some(title));
    let link = doc.create_element("a")?;
    link.set_attribute("href", &href)?;
    link.set_attribute("target", "_blank")?;
    link.set_attribute("rel", "noreferrer")?;
    link.set_text_content(Some(link_text));
    let small = doc.create_element("small")?;
    small.set_text_content(Some(&detail));

    root.append_child(&strong)?;
    root.append_child(&doc.create_element("br")?)?;
    root.append_child(&link)?;
    root.append_child(&doc.create_element("br")?)?;
    root.append_child(&small)?;

    viewer.viewport.set_inner_html("");
    viewer.viewport.append_child(&root)?;
    Ok(())
}

// =============================================================
// Listeners
// =============================================================

/// Register `handler` for `event` on `target`, downcasting the event to `E`.
fn listen<E, F>(
    viewer: &Rc<RefCell<Viewer>>,
    target: &EventTarget,
    event: &'static str,
    handler: F,
) -> Result<(), JsValue>
where
    E: JsCast + 'static,
    F: Fn(&mut Viewer, E) + 'static,
{
    let shared = Rc::clone(viewer);
    let closure = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
        let Ok(ev) = ev.dyn_into::<E>() else {
            return;
        };
        if let Ok(mut viewer) = shared.try_borrow_mut() {
            handler(&mut viewer, ev);
        }
    });

    let options = AddEventListenerOptions::new();
    options.set_passive(false);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        closure.as_ref().unchecked_ref(),
        &options,
    )?;
    viewer
        .try_borrow_mut()
        .map_err(|e| JsValue::from_str(&e.to_string()))?
        .listeners
        .push(Listener { target: target.clone(), event, closure });
    Ok(())
}

fn attach_listeners(viewer: &Rc<RefCell<Viewer>>) -> Result<(), JsValue> {
    let (viewport, reset) = {
        let v = viewer.try_borrow().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let reset = match v.container.query_selector(SELECTOR_RESET)? {
            Some(el) => Some(el),
            None => match v.container.parent_element() {
                Some(parent) => parent.query_selector(SELECTOR_RESET)?,
                None => None,
            },
        };
        (EventTarget::from(v.viewport.clone()), reset)
    };

    listen(viewer, &viewport, "pointerdown", |v: &mut Viewer, ev: PointerEvent| {
        let pt = v.local_point(&ev);
        let actions = v.core.on_pointer_down(ev.pointer_id(), pt, Button::from_dom(ev.button()));
        if !actions.is_empty() {
            ev.prevent_default();
        }
        v.apply(actions);
    })?;
    listen(viewer, &viewport, "pointermove", |v: &mut Viewer, ev: PointerEvent| {
        let pt = v.local_point(&ev);
        let actions = v.core.on_pointer_move(ev.pointer_id(), pt);
        v.apply(actions);
    })?;
    listen(viewer, &viewport, "pointerup", |v: &mut Viewer, ev: PointerEvent| {
        let actions = v.core.on_pointer_up(ev.pointer_id());
        v.apply(actions);
    })?;
    listen(viewer, &viewport, "pointercancel", |v: &mut Viewer, ev: PointerEvent| {
        let actions = v.core.on_pointer_cancel(ev.pointer_id());
        v.apply(actions);
    })?;
    listen(viewer, &viewport, "pointerleave", |v: &mut Viewer, ev: PointerEvent| {
        let actions = v.core.on_pointer_leave(ev.pointer_id());
        v.apply(actions);
    })?;
    listen(viewer, &viewport, "wheel", |v: &mut Viewer, ev: WheelEvent| {
        ev.prevent_default();
        let pt = v.local_point(&ev);
        let delta = WheelDelta { dx: ev.delta_x(), dy: ev.delta_y(), mode: DeltaMode::from_dom(ev.delta_mode()) };
        let actions = v.core.on_wheel(pt, delta);
        v.apply(actions);
    })?;
    listen(viewer, &viewport, "dblclick", |v: &mut Viewer, _ev: MouseEvent| {
        let actions = v.core.on_double_click();
        v.apply(actions);
    })?;
    if let Some(reset) = reset {
        listen(viewer, &EventTarget::from(reset), "click", |v: &mut Viewer, ev: MouseEvent| {
            ev.prevent_default();
            let actions = v.core.reset();
            v.apply(actions);
        })?;
    }

    observe_resize(viewer)
}

fn observe_resize(viewer: &Rc<RefCell<Viewer>>) -> Result<(), JsValue> {
    let shared = Rc::clone(viewer);
    let closure = Closure::<dyn FnMut()>::new(move || {
        if let Ok(mut viewer) = shared.try_borrow_mut() {
            let (width, height) = viewer.metrics();
            let actions = viewer.core.set_container(width, height);
            viewer.apply(actions);
        }
    });
    let observer = ResizeObserver::new(closure.as_ref().unchecked_ref())?;
    let mut v = viewer.try_borrow_mut().map_err(|e| JsValue::from_str(&e.to_string()))?;
    observer.observe(&v.viewport);
    v.resize_observer = Some((observer, closure));
    Ok(())
}
