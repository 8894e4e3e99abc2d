//! Per-root wiring: read the root's configuration, locate its image and hook redraw triggers.

use std::rc::Rc;

use crate::{
    config::{Markers, OverlayOpts},
    foundation::{
        core::{ActiveIndex, Mask},
        error::OverlayResult,
    },
    host::{Dom, Listener, OverlayHost, Selector},
    payload::{PayloadSource, resolve_payload},
    render::{DrawOutcome, DrawRequest, OverlayInstance},
    scaffold::ensure_scaffold,
    style::{SideMode, StyleAttrs, StyleConfig},
};

/// A live overlay root.
pub struct OverlayHandle<H: OverlayHost> {
    root: H::Node,
    source: PayloadSource,
    observes_resize: bool,
    instance: Rc<OverlayInstance<H>>,
}

impl<H: OverlayHost> Clone for OverlayHandle<H> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            source: self.source,
            observes_resize: self.observes_resize,
            instance: Rc::clone(&self.instance),
        }
    }
}

impl<H: OverlayHost> std::fmt::Debug for OverlayHandle<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayHandle")
            .field("source", &self.source)
            .field("observes_resize", &self.observes_resize)
            .finish_non_exhaustive()
    }
}

impl<H: OverlayHost> OverlayHandle<H> {
    pub fn root(&self) -> &H::Node {
        &self.root
    }

    pub fn image(&self) -> &H::Node {
        &self.instance.request().image
    }

    /// Encoding the masks were read from.
    pub fn source(&self) -> PayloadSource {
        self.source
    }

    pub fn masks(&self) -> &[Option<Mask>] {
        &self.instance.request().masks
    }

    pub fn active(&self) -> ActiveIndex {
        self.instance.request().active
    }

    pub fn side(&self) -> &SideMode {
        &self.instance.request().side
    }

    pub fn style(&self) -> &StyleConfig {
        &self.instance.request().style
    }

    /// Return `true` when image resizes are observed directly.
    pub fn observes_resize(&self) -> bool {
        self.observes_resize
    }

    /// Successful paints so far.
    pub fn paints(&self) -> u64 {
        self.instance.paints()
    }

    /// Redraw now, as any trigger would.
    pub fn redraw(&self) -> DrawOutcome {
        OverlayInstance::draw(&self.instance)
    }

    /// Stop redrawing. Registered triggers stay attached but do nothing.
    pub fn cancel(&self) {
        self.instance.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.instance.is_cancelled()
    }
}

/// Read the side mode attribute; missing or empty means front.
pub fn side_from_root<D: Dom + ?Sized>(dom: &D, root: &D::Node, markers: &Markers) -> SideMode {
    SideMode::from_attr(dom.attribute(root, &markers.side_attr).as_deref())
}

/// Read the style attributes of `root` and resolve them against `defaults`.
pub fn style_from_root<D: Dom + ?Sized>(
    dom: &D,
    root: &D::Node,
    markers: &Markers,
    defaults: &StyleConfig,
) -> StyleConfig {
    let attrs = StyleAttrs {
        stroke: dom.attribute(root, &markers.stroke_attr),
        fill_active: dom.attribute(root, &markers.fill_active_attr),
        fill_other: dom.attribute(root, &markers.fill_other_attr),
        outline_width: dom.attribute(root, &markers.outline_width_attr),
    };
    StyleConfig::resolve(&attrs, defaults)
}

/// Initialize one overlay root.
///
/// Returns `Ok(None)` when the root was already initialized or holds no image. Otherwise the
/// wrapper and surface are created, the root is flagged as initialized and redraws are wired to
/// image load (or run now when the image is complete), window resize, image resize when the host
/// can observe it, and one animation frame.
#[tracing::instrument(skip(host, root, opts))]
pub fn init_one<H: OverlayHost>(
    host: &Rc<H>,
    root: &H::Node,
    opts: &OverlayOpts,
) -> OverlayResult<Option<OverlayHandle<H>>> {
    let markers = &opts.markers;
    let dom = host.as_ref();

    if dom.attribute(root, &markers.ready_attr).is_some() {
        tracing::debug!("root already initialized");
        return Ok(None);
    }

    let side = side_from_root(dom, root, markers);
    let resolved = resolve_payload(dom, root, markers);
    let style = style_from_root(dom, root, markers, &opts.style_defaults);

    let Some(image) = dom.find_descendant(root, &Selector::tag("img")) else {
        tracing::debug!("root has no image; inert");
        return Ok(None);
    };

    ensure_scaffold(dom, &image, markers)?;
    dom.set_attribute(root, &markers.ready_attr, "1")?;

    let instance = Rc::new(OverlayInstance::new(
        Rc::clone(host),
        DrawRequest {
            side,
            image: image.clone(),
            masks: resolved.payload.masks,
            active: resolved.payload.active,
            style,
        },
        opts,
    ));

    let redraw: Listener = {
        let instance = Rc::clone(&instance);
        Rc::new(move || {
            OverlayInstance::draw(&instance);
        })
    };

    if dom.image_complete(&image) {
        redraw();
    } else {
        let on_load = Rc::clone(&redraw);
        host.on_load_once(&image, Box::new(move || on_load()));
    }

    host.on_window_resize(Rc::clone(&redraw));
    let observes_resize = host.observe_resize(&image, Rc::clone(&redraw));
    if !observes_resize {
        tracing::debug!("element resize observation unavailable");
    }
    host.request_animation_frame(Box::new(move || redraw()));

    tracing::debug!(
        source = ?resolved.source,
        masks = instance.request().masks.len(),
        "overlay initialized"
    );

    Ok(Some(OverlayHandle {
        root: root.clone(),
        source: resolved.source,
        observes_resize,
        instance,
    }))
}

#[cfg(test)]
#[path = "../tests/unit/controller/controller.rs"]
mod tests;
