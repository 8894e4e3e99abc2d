#![forbid(unsafe_code)]
//! Responsive mask overlays for images embedded in web pages.
//!
//! Each overlay root on a page carries an image plus mask rectangles in image-fractional
//! coordinates. The runtime:
//! - resolves the masks from an embedded JSON script or the legacy base64 attributes
//!   ([`payload`]),
//! - wraps the image and stacks a canvas on it ([`scaffold`]),
//! - compiles a paint plan sized to the image box and device pixel ratio ([`render::plan`]),
//! - repaints on image load, window resize, element resize and animation frames
//!   ([`controller`], [`bootstrap`]).
//!
//! The page is reached through the [`host`] traits. [`host::memory::MemoryHost`] runs the
//! pipeline without a browser; the `web` feature adds the browser binding. Plans can also be
//! rasterized on the CPU ([`render::cpu`]).

pub mod bootstrap;
pub mod config;
pub mod controller;
mod foundation;
pub mod host;
pub mod payload;
pub mod render;
pub mod scaffold;
pub mod style;

pub use bootstrap::{init, install};
pub use config::{Markers, OverlayOpts, RetryPolicy};
pub use controller::{OverlayHandle, init_one};
pub use foundation::core::{ActiveIndex, Affine, Mask, Point, Rect, RenderContext, Size};
pub use foundation::error::{OverlayError, OverlayResult};
pub use host::{Dom, OverlayHost, Scheduler, Selector};
pub use payload::{
    OverlayPayload, PayloadSource, ResolvedPayload, decode_legacy, decode_structured,
    resolve_payload,
};
pub use render::{
    DrawOutcome, DrawRequest, OverlayInstance,
    cpu::{CpuOverlayBackend, FrameRGBA, composite_over_image},
    plan::{OverlayPlan, SurfaceOp, compile_overlay},
};
pub use style::{CssColor, SideMode, StyleAttrs, StyleConfig};
