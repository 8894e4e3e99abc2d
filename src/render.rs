use std::{cell::Cell, rc::Rc};

use crate::{
    config::{Markers, OverlayOpts, RetryPolicy},
    foundation::{
        core::{ActiveIndex, Mask, RenderContext},
        error::OverlayResult,
    },
    host::OverlayHost,
    render::plan::compile_overlay,
    scaffold::ensure_scaffold,
    style::{SideMode, StyleConfig},
};

pub mod cpu;
pub mod plan;

/// Everything a draw needs, captured once per instance.
#[derive(Clone, Debug)]
pub struct DrawRequest<N> {
    /// Side the overlay is rendered for.
    pub side: SideMode,
    /// The image the overlay sits on.
    pub image: N,
    /// Masks in payload order; `None` slots paint nothing.
    pub masks: Vec<Option<Mask>>,
    /// Highlighted mask.
    pub active: ActiveIndex,
    /// Resolved style.
    pub style: StyleConfig,
}

/// What a single [`OverlayInstance::draw`] call did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawOutcome {
    /// The surface was sized and painted.
    Painted(RenderContext),
    /// The image has no usable box yet; a retry runs on the next animation frame.
    Deferred,
    /// The image has no usable box and the retry budget is spent.
    GaveUp,
    /// The instance was cancelled.
    Cancelled,
    /// The host rejected scaffolding or painting; logged and absorbed.
    Failed,
}

/// The redraw entry point of one overlay root.
///
/// Load, resize and animation-frame triggers all call [`OverlayInstance::draw`]. Retries for an
/// image without layout are chained one frame at a time; a trigger that arrives while a retry
/// is already queued does not start a second chain.
pub struct OverlayInstance<H: OverlayHost> {
    host: Rc<H>,
    request: DrawRequest<H::Node>,
    markers: Markers,
    min_box_px: f64,
    retry: RetryPolicy,
    cancelled: Cell<bool>,
    retry_pending: Cell<bool>,
    attempts: Cell<u32>,
    paints: Cell<u64>,
}

impl<H: OverlayHost> OverlayInstance<H> {
    pub fn new(host: Rc<H>, request: DrawRequest<H::Node>, opts: &OverlayOpts) -> Self {
        Self {
            host,
            request,
            markers: opts.markers.clone(),
            min_box_px: opts.min_box_px,
            retry: opts.retry,
            cancelled: Cell::new(false),
            retry_pending: Cell::new(false),
            attempts: Cell::new(0),
            paints: Cell::new(0),
        }
    }

    pub fn request(&self) -> &DrawRequest<H::Node> {
        &self.request
    }

    /// Successful paints so far.
    pub fn paints(&self) -> u64 {
        self.paints.get()
    }

    /// Return `true` while a retry frame is queued.
    pub fn retry_pending(&self) -> bool {
        self.retry_pending.get()
    }

    /// Stop all future draws, including a queued retry.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// Measure the image and paint the overlay, or queue a retry when it has no layout yet.
    #[tracing::instrument(skip(this), fields(masks = this.request.masks.len()))]
    pub fn draw(this: &Rc<Self>) -> DrawOutcome {
        if this.cancelled.get() {
            return DrawOutcome::Cancelled;
        }

        let ctx = RenderContext::new(
            this.host.bounding_box(&this.request.image),
            this.host.device_pixel_ratio(),
        );
        if !ctx.is_laid_out(this.min_box_px) {
            return Self::schedule_retry(this);
        }
        this.attempts.set(0);

        match this.paint(&ctx) {
            Ok(()) => {
                this.paints.set(this.paints.get() + 1);
                DrawOutcome::Painted(ctx)
            }
            Err(e) => {
                tracing::warn!(error = %e, "overlay draw failed");
                DrawOutcome::Failed
            }
        }
    }

    fn schedule_retry(this: &Rc<Self>) -> DrawOutcome {
        if this.retry_pending.get() {
            return DrawOutcome::Deferred;
        }
        let attempts = this.attempts.get();
        if !this.retry.allows(attempts) {
            tracing::warn!(attempts, "image never got a layout box; giving up");
            return DrawOutcome::GaveUp;
        }

        this.attempts.set(attempts + 1);
        this.retry_pending.set(true);
        tracing::debug!(attempt = attempts + 1, "image not laid out; retrying next frame");

        let job = Rc::clone(this);
        this.host.request_animation_frame(Box::new(move || {
            job.retry_pending.set(false);
            Self::draw(&job);
        }));
        DrawOutcome::Deferred
    }

    fn paint(&self, ctx: &RenderContext) -> OverlayResult<()> {
        let host = self.host.as_ref();
        let surface = ensure_scaffold(host, &self.request.image, &self.markers)?;
        let plan = compile_overlay(
            ctx,
            &self.request.side,
            &self.request.masks,
            self.request.active,
            &self.request.style,
        );
        host.paint(&surface, &plan)
    }
}

#[cfg(test)]
#[path = "../tests/unit/render/draw.rs"]
mod tests;
