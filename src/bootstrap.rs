//! Page-level entry points.

use std::rc::Rc;

use crate::{
    config::OverlayOpts,
    controller::{OverlayHandle, init_one},
    host::{Dom, OverlayHost},
};

/// Initialize every root on the page.
///
/// Roots are independent: an inert root is skipped and a failing one is logged, neither stops
/// the rest. Roots initialized by an earlier pass are left alone.
#[tracing::instrument(skip(host, opts))]
pub fn init<H: OverlayHost>(host: &Rc<H>, opts: &OverlayOpts) -> Vec<OverlayHandle<H>> {
    let roots = host.elements_by_id(&opts.markers.root_id);
    let mut handles = Vec::with_capacity(roots.len());

    for (idx, root) in roots.iter().enumerate() {
        match init_one(host, root, opts) {
            Ok(Some(handle)) => handles.push(handle),
            Ok(None) => {}
            Err(e) => tracing::warn!(root = idx, error = %e, "overlay root failed to initialize"),
        }
    }

    tracing::debug!(roots = roots.len(), live = handles.len(), "overlay pass done");
    handles
}

/// Run [`init`] when the document is ready and once more on a zero-delay timer, catching roots
/// that were inserted late. `on_ready` receives the handles of each pass.
pub fn install<H, F>(host: &Rc<H>, opts: OverlayOpts, on_ready: F)
where
    H: OverlayHost,
    F: Fn(Vec<OverlayHandle<H>>) + 'static,
{
    let opts = Rc::new(opts);
    let on_ready = Rc::new(on_ready);

    {
        let host_ref = Rc::clone(host);
        let opts = Rc::clone(&opts);
        let on_ready = Rc::clone(&on_ready);
        host.on_document_ready(Box::new(move || on_ready(init(&host_ref, &opts))));
    }

    let host_ref = Rc::clone(host);
    host.defer(Box::new(move || on_ready(init(&host_ref, &opts))));
}

#[cfg(test)]
#[path = "../tests/unit/bootstrap/bootstrap.rs"]
mod tests;
