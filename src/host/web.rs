//! Browser binding over `web-sys`.

use std::{cell::RefCell, rc::Rc};

use wasm_bindgen::{JsCast, JsValue, closure::Closure, prelude::wasm_bindgen};
use web_sys::{
    AddEventListenerOptions, CanvasRenderingContext2d, Document, Element, HtmlCanvasElement,
    HtmlElement, HtmlImageElement, ResizeObserver, Window,
};

use crate::{
    config::OverlayOpts,
    foundation::{
        core::Size,
        error::{OverlayError, OverlayResult},
    },
    host::{Dom, Listener, Scheduler, Selector, Task},
    render::plan::{OverlayPlan, SurfaceOp},
};

fn js_err(what: &str, e: JsValue) -> OverlayError {
    OverlayError::host(format!("{what}: {e:?}"))
}

/// Pin the canvas to the top-left of its wrapper so it covers the image. Inline positioning
/// already present on the wrapper is left alone.
fn stack_over_image(canvas: &HtmlCanvasElement) -> OverlayResult<()> {
    let style = HtmlElement::style(canvas);
    for (name, value) in [
        ("position", "absolute"),
        ("left", "0"),
        ("top", "0"),
        ("pointer-events", "none"),
    ] {
        style
            .set_property(name, value)
            .map_err(|e| js_err("style overlay surface", e))?;
    }

    if let Some(wrapper) = canvas
        .parent_element()
        .and_then(|p| p.dyn_into::<HtmlElement>().ok())
    {
        let ws = wrapper.style();
        if ws.get_property_value("position").unwrap_or_default().is_empty() {
            ws.set_property("position", "relative")
                .map_err(|e| js_err("style overlay wrapper", e))?;
            ws.set_property("display", "inline-block")
                .map_err(|e| js_err("style overlay wrapper", e))?;
        }
    }
    Ok(())
}

/// The live page.
pub struct WebHost {
    window: Window,
    document: Document,
    observers: RefCell<Vec<ResizeObserver>>,
}

impl WebHost {
    pub fn new() -> OverlayResult<Self> {
        let window = web_sys::window().ok_or_else(|| OverlayError::host("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| OverlayError::host("window has no document"))?;
        Ok(Self {
            window,
            document,
            observers: RefCell::new(Vec::new()),
        })
    }

    fn add_once_listener(&self, target: &web_sys::EventTarget, event: &str, task: Task) {
        let callback = Closure::once_into_js(move || task());
        let options = AddEventListenerOptions::new();
        options.set_once(true);
        if let Err(e) = target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            callback.unchecked_ref(),
            &options,
        ) {
            tracing::warn!(event, error = ?e, "failed to add listener");
        }
    }
}

impl Dom for WebHost {
    type Node = Element;

    fn elements_by_id(&self, id: &str) -> Vec<Element> {
        let query = format!("[id=\"{}\"]", id.replace('\\', "\\\\").replace('"', "\\\""));
        let Ok(list) = self.document.query_selector_all(&query) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .collect()
    }

    fn find_descendant(&self, scope: &Element, selector: &Selector) -> Option<Element> {
        scope.query_selector(&selector.to_css()).ok().flatten()
    }

    fn find_child(&self, parent: &Element, selector: &Selector) -> Option<Element> {
        parent
            .query_selector(&format!(":scope > {}", selector.to_css()))
            .ok()
            .flatten()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) -> OverlayResult<()> {
        node.set_attribute(name, value)
            .map_err(|e| js_err("set attribute", e))
    }

    fn text_content(&self, node: &Element) -> Option<String> {
        node.text_content()
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.get_attribute("class")
            .is_some_and(|c| c.split_whitespace().any(|have| have == class))
    }

    fn create_element(&self, tag: &str, class: &str) -> OverlayResult<Element> {
        let el = self
            .document
            .create_element(tag)
            .map_err(|e| js_err("create element", e))?;
        el.set_class_name(class);
        Ok(el)
    }

    fn insert_before(&self, parent: &Element, node: &Element, reference: &Element) -> OverlayResult<()> {
        parent
            .insert_before(node, Some(reference.as_ref()))
            .map(|_| ())
            .map_err(|e| js_err("insert before", e))
    }

    fn append_child(&self, parent: &Element, node: &Element) -> OverlayResult<()> {
        parent
            .append_child(node)
            .map(|_| ())
            .map_err(|e| js_err("append child", e))
    }

    fn bounding_box(&self, node: &Element) -> Size {
        let r = node.get_bounding_client_rect();
        Size::new(r.width(), r.height())
    }

    fn image_complete(&self, image: &Element) -> bool {
        image
            .dyn_ref::<HtmlImageElement>()
            .is_none_or(HtmlImageElement::complete)
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.device_pixel_ratio()
    }

    fn paint(&self, surface: &Element, plan: &OverlayPlan) -> OverlayResult<()> {
        let canvas = surface
            .dyn_ref::<HtmlCanvasElement>()
            .ok_or_else(|| OverlayError::host("overlay surface is not a canvas"))?;

        stack_over_image(canvas)?;
        let style = HtmlElement::style(canvas);
        style
            .set_property("width", &format!("{}px", plan.css_size.width))
            .map_err(|e| js_err("set css width", e))?;
        style
            .set_property("height", &format!("{}px", plan.css_size.height))
            .map_err(|e| js_err("set css height", e))?;
        canvas.set_width(plan.backing_width);
        canvas.set_height(plan.backing_height);

        let ctx = canvas
            .get_context("2d")
            .map_err(|e| js_err("get 2d context", e))?
            .ok_or_else(|| OverlayError::host("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| OverlayError::host("context is not 2d"))?;

        let [a, b, c, d, e, f] = plan.transform.as_coeffs();
        ctx.set_transform(a, b, c, d, e, f)
            .map_err(|e| js_err("set transform", e))?;

        for op in &plan.ops {
            match op {
                SurfaceOp::Clear { rect } => {
                    ctx.clear_rect(rect.x0, rect.y0, rect.width(), rect.height());
                }
                SurfaceOp::FillRect { rect, color, .. } => {
                    ctx.set_fill_style_str(color.as_str());
                    ctx.fill_rect(rect.x0, rect.y0, rect.width(), rect.height());
                }
                SurfaceOp::StrokeRect {
                    rect, color, width, ..
                } => {
                    ctx.set_stroke_style_str(color.as_str());
                    ctx.set_line_width(*width);
                    ctx.stroke_rect(rect.x0, rect.y0, rect.width(), rect.height());
                }
            }
        }
        Ok(())
    }
}

impl Scheduler for WebHost {
    fn on_load_once(&self, image: &Element, task: Task) {
        self.add_once_listener(image, "load", task);
    }

    fn on_window_resize(&self, listener: Listener) {
        let callback = Closure::<dyn Fn()>::new(move || listener());
        if let Err(e) = self
            .window
            .add_event_listener_with_callback("resize", callback.as_ref().unchecked_ref())
        {
            tracing::warn!(error = ?e, "failed to add resize listener");
        }
        callback.forget();
    }

    fn observe_resize(&self, node: &Element, listener: Listener) -> bool {
        let callback = Closure::<dyn Fn()>::new(move || listener());
        let Ok(observer) = ResizeObserver::new(callback.as_ref().unchecked_ref()) else {
            return false;
        };
        observer.observe(node);
        callback.forget();
        self.observers.borrow_mut().push(observer);
        true
    }

    fn request_animation_frame(&self, task: Task) {
        let callback = Closure::once_into_js(move || task());
        if let Err(e) = self
            .window
            .request_animation_frame(callback.unchecked_ref())
        {
            tracing::warn!(error = ?e, "requestAnimationFrame failed");
        }
    }

    fn defer(&self, task: Task) {
        let callback = Closure::once_into_js(move || task());
        if let Err(e) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 0)
        {
            tracing::warn!(error = ?e, "setTimeout failed");
        }
    }

    fn on_document_ready(&self, task: Task) {
        if self.document.ready_state() == "loading" {
            self.add_once_listener(&self.document, "DOMContentLoaded", task);
        } else {
            task();
        }
    }
}

/// Install overlays on the current page with default options.
#[wasm_bindgen(js_name = installOverlays)]
pub fn install_overlays() -> Result<(), JsValue> {
    install_with(OverlayOpts::default())
}

/// Install overlays with a JSON options document.
#[wasm_bindgen(js_name = installOverlaysWith)]
pub fn install_overlays_with(options_json: &str) -> Result<(), JsValue> {
    let opts = OverlayOpts::from_json_str(options_json)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    install_with(opts)
}

fn install_with(opts: OverlayOpts) -> Result<(), JsValue> {
    let host = Rc::new(WebHost::new().map_err(|e| JsValue::from_str(&e.to_string()))?);
    crate::bootstrap::install(&host, opts, |handles| {
        tracing::debug!(live = handles.len(), "overlay pass");
    });
    Ok(())
}
