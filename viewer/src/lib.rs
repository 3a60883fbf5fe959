//! Pan/zoom viewer for diagrams embedded in documentation pages.
//!
//! This crate is compiled to WebAssembly and runs in the browser. Each page
//! element marked as a diagram container gets one viewer: the referenced image
//! is fetched, its intrinsic box resolved, and the container then supports
//! drag-to-pan, wheel zoom about the cursor, and reset-to-fit. The browser
//! glue lives behind the `hydrate` feature so the geometry, input and loading
//! logic build and test natively.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Per-container state machine, [`engine::EngineCore`] |
//! | [`camera`] | View box, projection, pan/zoom/fit math |
//! | [`input`] | Pointer buttons, wheel deltas, drag state |
//! | [`loader`] | Resource classification, SVG parsing, intrinsic box policy |
//! | [`render`] | Wrapper transform and error element contents |
//! | [`config`] | Tunables read from container attributes |
//! | [`error`] | Load failure taxonomy |
//! | [`consts`] | Defaults and DOM names |
//! | `host` | DOM wiring and `wasm_bindgen` exports (feature `hydrate`) |

pub mod camera;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod input;
pub mod loader;
pub mod render;

#[cfg(feature = "hydrate")]
pub mod host;
