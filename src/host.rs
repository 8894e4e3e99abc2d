//! The seam between the overlay pipeline and the page it runs in.
//!
//! Everything the pipeline needs from a document goes through [`Dom`] and [`Scheduler`]. The
//! browser binding lives in [`web`] (feature `web`); [`memory`] is a self-contained document used
//! by tests and the CLI.

pub mod memory;
#[cfg(feature = "web")]
pub mod web;

use std::rc::Rc;

use crate::{
    foundation::{core::Size, error::OverlayResult},
    render::plan::OverlayPlan,
};

/// A one-shot callback queued on the host's event loop.
pub type Task = Box<dyn FnOnce()>;

/// A callback that may fire any number of times.
pub type Listener = Rc<dyn Fn()>;

/// Element match on tag name and/or a single class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    /// Lowercase tag name, if constrained.
    pub tag: Option<String>,
    /// Required class, if constrained.
    pub class: Option<String>,
}

impl Selector {
    /// Match any element with tag `tag`.
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_ascii_lowercase()),
            class: None,
        }
    }

    /// Match any element carrying `class`.
    pub fn class(class: &str) -> Self {
        Self {
            tag: None,
            class: Some(class.to_owned()),
        }
    }

    /// Match `tag` elements carrying `class`.
    pub fn tag_class(tag: &str, class: &str) -> Self {
        Self {
            tag: Some(tag.to_ascii_lowercase()),
            class: Some(class.to_owned()),
        }
    }

    /// Return `true` when an element with `tag` and `classes` satisfies the selector.
    pub fn matches<'a>(&self, tag: &str, mut classes: impl Iterator<Item = &'a str>) -> bool {
        if let Some(t) = &self.tag {
            if !t.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        match &self.class {
            Some(c) => classes.any(|have| have == c),
            None => true,
        }
    }

    /// CSS selector text, e.g. `script.aioe-internal`.
    pub fn to_css(&self) -> String {
        match (&self.tag, &self.class) {
            (Some(t), Some(c)) => format!("{t}.{c}"),
            (Some(t), None) => t.clone(),
            (None, Some(c)) => format!(".{c}"),
            (None, None) => "*".to_owned(),
        }
    }
}

/// Document queries and mutations used by the pipeline.
///
/// Methods take `&self`: the document is a single-threaded shared resource and hosts use
/// interior mutability, the way a browser DOM handle behaves.
pub trait Dom {
    /// Element handle. Cloning must yield a handle to the same element.
    type Node: Clone + 'static;

    /// Every element whose id is `id`, in document order. Pages may repeat an id.
    fn elements_by_id(&self, id: &str) -> Vec<Self::Node>;

    /// First descendant of `scope` (depth-first, document order) matching `selector`.
    fn find_descendant(&self, scope: &Self::Node, selector: &Selector) -> Option<Self::Node>;

    /// First direct child of `parent` matching `selector`.
    fn find_child(&self, parent: &Self::Node, selector: &Selector) -> Option<Self::Node>;

    /// Attribute value, `None` when absent.
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Set an attribute.
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> OverlayResult<()>;

    /// Concatenated text content.
    fn text_content(&self, node: &Self::Node) -> Option<String>;

    /// Parent element.
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Return `true` when `node` carries `class`.
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Create a detached element with one class.
    fn create_element(&self, tag: &str, class: &str) -> OverlayResult<Self::Node>;

    /// Insert `node` into `parent` right before `reference`.
    fn insert_before(
        &self,
        parent: &Self::Node,
        node: &Self::Node,
        reference: &Self::Node,
    ) -> OverlayResult<()>;

    /// Append `node` as the last child of `parent`, moving it if attached elsewhere.
    fn append_child(&self, parent: &Self::Node, node: &Self::Node) -> OverlayResult<()>;

    /// Displayed box of `node` in CSS pixels.
    fn bounding_box(&self, node: &Self::Node) -> Size;

    /// Return `true` when the image has finished loading.
    fn image_complete(&self, image: &Self::Node) -> bool;

    /// Device pixels per CSS pixel.
    fn device_pixel_ratio(&self) -> f64;

    /// Size `surface` and execute `plan` on it.
    fn paint(&self, surface: &Self::Node, plan: &OverlayPlan) -> OverlayResult<()>;
}

/// Event sources that trigger redraws.
pub trait Scheduler: Dom {
    /// Run `task` once when `image` fires its load event.
    fn on_load_once(&self, image: &Self::Node, task: Task);

    /// Run `listener` on every window resize.
    fn on_window_resize(&self, listener: Listener);

    /// Run `listener` whenever `node` changes size. Returns `false` when the host cannot observe
    /// element resizes; the caller then relies on its other triggers.
    fn observe_resize(&self, node: &Self::Node, listener: Listener) -> bool;

    /// Run `task` before the next repaint.
    fn request_animation_frame(&self, task: Task);

    /// Run `task` on a zero-delay timer.
    fn defer(&self, task: Task);

    /// Run `task` once the document has finished parsing; immediately when it already has.
    fn on_document_ready(&self, task: Task);
}

/// Everything an overlay instance needs from its environment.
pub trait OverlayHost: Scheduler + 'static {}

impl<T: Scheduler + 'static> OverlayHost for T {}
