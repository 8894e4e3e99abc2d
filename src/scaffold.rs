//! Idempotent wrapper/canvas setup around an overlay image.

use crate::{
    config::Markers,
    foundation::error::{OverlayError, OverlayResult},
    host::{Dom, Selector},
};

/// Return the wrapper around `image`, creating it on first use.
///
/// A new wrapper is inserted right before the image in the image's parent, then the image is
/// moved inside it. Calling this again finds the existing wrapper.
pub fn ensure_wrapper<D: Dom + ?Sized>(
    dom: &D,
    image: &D::Node,
    markers: &Markers,
) -> OverlayResult<D::Node> {
    let parent = dom
        .parent(image)
        .ok_or_else(|| OverlayError::host("overlay image is detached"))?;
    if dom.has_class(&parent, &markers.wrapper_class) {
        return Ok(parent);
    }

    let wrapper = dom.create_element("div", &markers.wrapper_class)?;
    dom.insert_before(&parent, &wrapper, image)?;
    dom.append_child(&wrapper, image)?;
    tracing::debug!("created overlay wrapper");
    Ok(wrapper)
}

/// Return the overlay canvas inside `wrapper`, creating and appending it on first use.
pub fn ensure_overlay_surface<D: Dom + ?Sized>(
    dom: &D,
    wrapper: &D::Node,
    markers: &Markers,
) -> OverlayResult<D::Node> {
    let selector = Selector::tag_class("canvas", &markers.surface_class);
    if let Some(surface) = dom.find_child(wrapper, &selector) {
        return Ok(surface);
    }

    let surface = dom.create_element("canvas", &markers.surface_class)?;
    dom.append_child(wrapper, &surface)?;
    tracing::debug!("created overlay surface");
    Ok(surface)
}

/// Both steps: wrapper around `image`, then the surface inside it.
pub fn ensure_scaffold<D: Dom + ?Sized>(
    dom: &D,
    image: &D::Node,
    markers: &Markers,
) -> OverlayResult<D::Node> {
    let wrapper = ensure_wrapper(dom, image, markers)?;
    ensure_overlay_surface(dom, &wrapper, markers)
}

#[cfg(test)]
#[path = "../tests/unit/scaffold/scaffold.rs"]
mod tests;
