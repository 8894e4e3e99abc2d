//! A self-contained document and event loop.
//!
//! `MemoryHost` keeps an element tree, per-element layout boxes and a recorded paint log, and
//! queues callbacks instead of running them on a real event loop. Tests and the CLI drive it
//! explicitly: [`MemoryHost::fire_load`], [`MemoryHost::resize_window`],
//! [`MemoryHost::run_animation_frame`], [`MemoryHost::run_deferred`] and
//! [`MemoryHost::finish_loading`].

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, HashMap, HashSet, VecDeque},
};

use crate::{
    foundation::{
        core::Size,
        error::{OverlayError, OverlayResult},
    },
    host::{Dom, Listener, Scheduler, Selector, Task},
    render::plan::OverlayPlan,
};

/// Handle to an element in a [`MemoryHost`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Last painted state of a canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasState {
    /// CSS size applied by the last paint.
    pub css_size: Size,
    /// Backing buffer size applied by the last paint.
    pub backing: (u32, u32),
    /// Every plan painted, oldest first.
    pub plans: Vec<OverlayPlan>,
}

#[derive(Debug)]
struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    css_box: Size,
    complete: bool,
    canvas: Option<CanvasState>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            classes: Vec::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
            css_box: Size::ZERO,
            complete: false,
            canvas: None,
        }
    }

    fn matches(&self, selector: &Selector) -> bool {
        selector.matches(&self.tag, self.classes.iter().map(String::as_str))
    }
}

#[derive(Default)]
struct Callbacks {
    deferred: VecDeque<Task>,
    frames: Vec<Task>,
    ready: Vec<Task>,
    loads: HashMap<NodeId, Vec<Task>>,
    window_resize: Vec<Listener>,
    observers: Vec<(NodeId, Listener)>,
    observations: Vec<NodeId>,
}

/// In-memory [`Dom`] + [`Scheduler`].
pub struct MemoryHost {
    nodes: RefCell<Vec<Element>>,
    callbacks: RefCell<Callbacks>,
    device_pixel_ratio: Cell<f64>,
    loading: Cell<bool>,
    resize_observer: Cell<bool>,
    read_only: Cell<bool>,
    frozen: RefCell<HashSet<NodeId>>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// A parsed document with an empty `<body>`, pixel ratio 1 and element resize observation.
    pub fn new() -> Self {
        Self {
            nodes: RefCell::new(vec![Element::new("body")]),
            callbacks: RefCell::new(Callbacks::default()),
            device_pixel_ratio: Cell::new(1.0),
            loading: Cell::new(false),
            resize_observer: Cell::new(true),
            read_only: Cell::new(false),
            frozen: RefCell::new(HashSet::new()),
        }
    }

    /// A document that is still loading; ready callbacks wait for [`MemoryHost::finish_loading`].
    pub fn loading() -> Self {
        let host = Self::new();
        host.loading.set(true);
        host
    }

    /// The `<body>` element.
    pub fn body(&self) -> NodeId {
        NodeId(0)
    }

    // ---- document building -------------------------------------------------------------

    /// Create an element and append it to `parent`.
    pub fn append(&self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.push_element(Element::new(tag));
        self.attach_last(parent, id);
        id
    }

    /// Set an attribute; `id` and `class` behave as in HTML.
    pub fn set_attr(&self, node: NodeId, name: &str, value: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let el = &mut nodes[node.0];
        if name == "class" {
            el.classes = value.split_whitespace().map(str::to_owned).collect();
        }
        el.attrs.insert(name.to_owned(), value.to_owned());
    }

    /// Add a class.
    pub fn add_class(&self, node: NodeId, class: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let el = &mut nodes[node.0];
        if !el.classes.iter().any(|c| c == class) {
            el.classes.push(class.to_owned());
        }
        let joined = el.classes.join(" ");
        el.attrs.insert("class".to_owned(), joined);
    }

    /// Replace the element's own text.
    pub fn set_text(&self, node: NodeId, text: &str) {
        self.nodes.borrow_mut()[node.0].text = text.to_owned();
    }

    /// Set the displayed box; current resize observers of `node` see the change on the next
    /// frame.
    pub fn set_box(&self, node: NodeId, width: f64, height: f64) {
        let changed = {
            let mut nodes = self.nodes.borrow_mut();
            let el = &mut nodes[node.0];
            let next = Size::new(width, height);
            let changed = el.css_box != next;
            el.css_box = next;
            changed
        };
        let mut cb = self.callbacks.borrow_mut();
        if changed && cb.observers.iter().any(|(n, _)| *n == node) {
            cb.observations.push(node);
        }
    }

    /// Mark an image as already loaded without dispatching a load event.
    pub fn set_complete(&self, image: NodeId, complete: bool) {
        self.nodes.borrow_mut()[image.0].complete = complete;
    }

    /// Set the device pixel ratio.
    pub fn set_device_pixel_ratio(&self, dpr: f64) {
        self.device_pixel_ratio.set(dpr);
    }

    /// Toggle element resize observation support.
    pub fn set_resize_observer_supported(&self, supported: bool) {
        self.resize_observer.set(supported);
    }

    /// Make every mutation fail, to exercise error paths.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    /// Make mutations that touch `node` fail.
    pub fn freeze(&self, node: NodeId) {
        self.frozen.borrow_mut().insert(node);
    }

    // ---- event loop --------------------------------------------------------------------

    /// Complete `image` and dispatch its load event.
    pub fn fire_load(&self, image: NodeId) {
        self.set_complete(image, true);
        let tasks = self
            .callbacks
            .borrow_mut()
            .loads
            .remove(&image)
            .unwrap_or_default();
        for task in tasks {
            task();
        }
    }

    /// Dispatch a window resize event.
    pub fn resize_window(&self) {
        let listeners = self.callbacks.borrow().window_resize.clone();
        for listener in listeners {
            listener();
        }
    }

    /// Run one animation frame: the callbacks queued so far, then pending resize observations.
    /// Returns the number of callbacks run.
    pub fn run_animation_frame(&self) -> usize {
        let frames = std::mem::take(&mut self.callbacks.borrow_mut().frames);
        let mut ran = frames.len();
        for task in frames {
            task();
        }

        let observed: Vec<Listener> = {
            let mut cb = self.callbacks.borrow_mut();
            let nodes = std::mem::take(&mut cb.observations);
            cb.observers
                .iter()
                .filter(|(n, _)| nodes.contains(n))
                .map(|(_, l)| l.clone())
                .collect()
        };
        ran += observed.len();
        for listener in observed {
            listener();
        }
        ran
    }

    /// Run up to `n` animation frames, stopping early when nothing is queued.
    pub fn run_animation_frames(&self, n: usize) -> usize {
        let mut ran = 0;
        for _ in 0..n {
            if self.pending_frames() == 0 && self.callbacks.borrow().observations.is_empty() {
                break;
            }
            ran += self.run_animation_frame();
        }
        ran
    }

    /// Run zero-delay timers until none are left. Returns the number run.
    pub fn run_deferred(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.callbacks.borrow_mut().deferred.pop_front();
            let Some(task) = next else {
                break;
            };
            task();
            ran += 1;
        }
        ran
    }

    /// End document loading and run ready callbacks.
    pub fn finish_loading(&self) {
        self.loading.set(false);
        let ready = std::mem::take(&mut self.callbacks.borrow_mut().ready);
        for task in ready {
            task();
        }
    }

    /// Animation-frame callbacks waiting for the next frame.
    pub fn pending_frames(&self) -> usize {
        self.callbacks.borrow().frames.len()
    }

    /// Zero-delay timers waiting to run.
    pub fn pending_deferred(&self) -> usize {
        self.callbacks.borrow().deferred.len()
    }

    /// Registered window resize listeners.
    pub fn window_resize_listeners(&self) -> usize {
        self.callbacks.borrow().window_resize.len()
    }

    // ---- inspection --------------------------------------------------------------------

    /// Children of `node` in order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[node.0].children.clone()
    }

    /// Tag name of `node`.
    pub fn tag(&self, node: NodeId) -> String {
        self.nodes.borrow()[node.0].tag.clone()
    }

    /// Every descendant of `scope` matching `selector`, in document order.
    pub fn find_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = nodes[scope.0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let el = &nodes[id.0];
            if el.matches(selector) {
                out.push(id);
            }
            stack.extend(el.children.iter().rev().copied());
        }
        out
    }

    /// Paint state of a canvas, `None` before its first paint.
    pub fn canvas_state(&self, surface: NodeId) -> Option<CanvasState> {
        self.nodes.borrow()[surface.0].canvas.clone()
    }

    /// Number of paints recorded on `surface`.
    pub fn paint_count(&self, surface: NodeId) -> usize {
        self.nodes.borrow()[surface.0]
            .canvas
            .as_ref()
            .map_or(0, |c| c.plans.len())
    }

    /// Total paints across every canvas in the document.
    pub fn total_paints(&self) -> usize {
        self.nodes
            .borrow()
            .iter()
            .filter_map(|el| el.canvas.as_ref())
            .map(|c| c.plans.len())
            .sum()
    }

    // ---- internals ---------------------------------------------------------------------

    fn push_element(&self, el: Element) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(el);
        NodeId(nodes.len() - 1)
    }

    fn attach_last(&self, parent: NodeId, node: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        nodes[node.0].parent = Some(parent);
        nodes[parent.0].children.push(node);
    }

    fn check_writable(&self, touched: &[NodeId]) -> OverlayResult<()> {
        if self.read_only.get() {
            return Err(OverlayError::host("document is read-only"));
        }
        let frozen = self.frozen.borrow();
        if let Some(n) = touched.iter().find(|n| frozen.contains(*n)) {
            return Err(OverlayError::host(format!("node {} is frozen", n.0)));
        }
        Ok(())
    }

    fn check_node(&self, node: NodeId) -> OverlayResult<()> {
        if node.0 >= self.nodes.borrow().len() {
            return Err(OverlayError::host(format!("unknown node {}", node.0)));
        }
        Ok(())
    }

    /// Detach `node` from its parent, refusing to move an element into its own subtree.
    fn detach_for_move(&self, node: NodeId, new_parent: NodeId) -> OverlayResult<()> {
        let mut nodes = self.nodes.borrow_mut();

        let mut cursor = Some(new_parent);
        while let Some(c) = cursor {
            if c == node {
                return Err(OverlayError::host("cannot move an element into itself"));
            }
            cursor = nodes[c.0].parent;
        }

        if let Some(old) = nodes[node.0].parent.take() {
            nodes[old.0].children.retain(|c| *c != node);
        }
        Ok(())
    }
}

impl Dom for MemoryHost {
    type Node = NodeId;

    fn elements_by_id(&self, id: &str) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        let mut stack = vec![self.body()];
        while let Some(n) = stack.pop() {
            let el = &nodes[n.0];
            if el.attrs.get("id").is_some_and(|v| v == id) {
                out.push(n);
            }
            stack.extend(el.children.iter().rev().copied());
        }
        out
    }

    fn find_descendant(&self, scope: &NodeId, selector: &Selector) -> Option<NodeId> {
        self.find_all(*scope, selector).into_iter().next()
    }

    fn find_child(&self, parent: &NodeId, selector: &Selector) -> Option<NodeId> {
        let nodes = self.nodes.borrow();
        nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|c| nodes[c.0].matches(selector))
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.nodes.borrow()[node.0].attrs.get(name).cloned()
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) -> OverlayResult<()> {
        self.check_writable(&[*node])?;
        self.check_node(*node)?;
        self.set_attr(*node, name, value);
        Ok(())
    }

    fn text_content(&self, node: &NodeId) -> Option<String> {
        let nodes = self.nodes.borrow();
        let mut out = String::new();
        let mut stack = vec![*node];
        while let Some(n) = stack.pop() {
            let el = &nodes[n.0];
            out.push_str(&el.text);
            stack.extend(el.children.iter().rev().copied());
        }
        Some(out)
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.borrow()[node.0].parent
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.nodes.borrow()[node.0].classes.iter().any(|c| c == class)
    }

    fn create_element(&self, tag: &str, class: &str) -> OverlayResult<NodeId> {
        self.check_writable(&[])?;
        let mut el = Element::new(tag);
        el.classes.push(class.to_owned());
        el.attrs.insert("class".to_owned(), class.to_owned());
        Ok(self.push_element(el))
    }

    fn insert_before(&self, parent: &NodeId, node: &NodeId, reference: &NodeId) -> OverlayResult<()> {
        self.check_writable(&[*parent, *node])?;
        self.check_node(*node)?;
        if self.nodes.borrow()[reference.0].parent != Some(*parent) {
            return Err(OverlayError::host("reference is not a child of parent"));
        }
        self.detach_for_move(*node, *parent)?;

        let mut nodes = self.nodes.borrow_mut();
        let at = nodes[parent.0]
            .children
            .iter()
            .position(|c| c == reference)
            .ok_or_else(|| OverlayError::host("reference is not a child of parent"))?;
        nodes[parent.0].children.insert(at, *node);
        nodes[node.0].parent = Some(*parent);
        Ok(())
    }

    fn append_child(&self, parent: &NodeId, node: &NodeId) -> OverlayResult<()> {
        self.check_writable(&[*parent, *node])?;
        self.check_node(*node)?;
        self.detach_for_move(*node, *parent)?;
        self.attach_last(*parent, *node);
        Ok(())
    }

    fn bounding_box(&self, node: &NodeId) -> Size {
        self.nodes.borrow()[node.0].css_box
    }

    fn image_complete(&self, image: &NodeId) -> bool {
        self.nodes.borrow()[image.0].complete
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio.get()
    }

    fn paint(&self, surface: &NodeId, plan: &OverlayPlan) -> OverlayResult<()> {
        self.check_writable(&[*surface])?;
        let mut nodes = self.nodes.borrow_mut();
        let el = &mut nodes[surface.0];
        if el.tag != "canvas" {
            return Err(OverlayError::host(format!("cannot paint on <{}>", el.tag)));
        }
        let state = el.canvas.get_or_insert_with(|| CanvasState {
            css_size: Size::ZERO,
            backing: (0, 0),
            plans: Vec::new(),
        });
        state.css_size = plan.css_size;
        state.backing = (plan.backing_width, plan.backing_height);
        state.plans.push(plan.clone());
        Ok(())
    }
}

impl Scheduler for MemoryHost {
    fn on_load_once(&self, image: &NodeId, task: Task) {
        self.callbacks
            .borrow_mut()
            .loads
            .entry(*image)
            .or_default()
            .push(task);
    }

    fn on_window_resize(&self, listener: Listener) {
        self.callbacks.borrow_mut().window_resize.push(listener);
    }

    fn observe_resize(&self, node: &NodeId, listener: Listener) -> bool {
        if !self.resize_observer.get() {
            return false;
        }
        self.callbacks.borrow_mut().observers.push((*node, listener));
        true
    }

    fn request_animation_frame(&self, task: Task) {
        self.callbacks.borrow_mut().frames.push(task);
    }

    fn defer(&self, task: Task) {
        self.callbacks.borrow_mut().deferred.push_back(task);
    }

    fn on_document_ready(&self, task: Task) {
        if self.loading.get() {
            self.callbacks.borrow_mut().ready.push(task);
        } else {
            task();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/memory.rs"]
mod tests;
