use base64::{Engine as _, engine::general_purpose::STANDARD};

use super::*;
use crate::host::memory::{MemoryHost, NodeId};

struct Page {
    host: Rc<MemoryHost>,
    root: NodeId,
    img: NodeId,
}

fn page(structured: &str) -> Page {
    let host = Rc::new(MemoryHost::new());
    let root = host.append(host.body(), "div");
    host.set_attr(root, "id", "aioe-root");
    let script = host.append(root, "script");
    host.set_attr(script, "class", "aioe-internal");
    host.set_text(script, structured);
    let img = host.append(root, "img");
    Page { host, root, img }
}

const TWO_MASKS: &str =
    r#"{"v":1,"active":0,"masks":[{"x":0,"y":0,"w":0.5,"h":0.5},{"x":0.5,"y":0.5,"w":0.5,"h":0.5}]}"#;

fn surface(host: &MemoryHost, root: NodeId) -> NodeId {
    host.find_all(root, &Selector::tag_class("canvas", "aioe-canvas"))[0]
}

#[test]
fn complete_image_draws_immediately() {
    let p = page(TWO_MASKS);
    p.host.set_box(p.img, 200.0, 100.0);
    p.host.set_complete(p.img, true);

    let handle = init_one(&p.host, &p.root, &OverlayOpts::default())
        .unwrap()
        .unwrap();
    assert_eq!(handle.source(), PayloadSource::Structured);
    assert_eq!(handle.masks().len(), 2);
    assert_eq!(handle.paints(), 1);
    assert_eq!(p.host.paint_count(surface(&p.host, p.root)), 1);

    p.host.run_animation_frame();
    assert_eq!(handle.paints(), 2);
}

#[test]
fn incomplete_image_draws_on_load() {
    let p = page(TWO_MASKS);
    p.host.set_box(p.img, 200.0, 100.0);

    let handle = init_one(&p.host, &p.root, &OverlayOpts::default())
        .unwrap()
        .unwrap();
    assert_eq!(handle.paints(), 0);
    p.host.fire_load(p.img);
    assert_eq!(handle.paints(), 1);
    p.host.fire_load(p.img);
    assert_eq!(handle.paints(), 1);
}

#[test]
fn scaffold_exists_before_first_paint() {
    let p = page(TWO_MASKS);
    let handle = init_one(&p.host, &p.root, &OverlayOpts::default())
        .unwrap()
        .unwrap();
    let canvas = surface(&p.host, p.root);
    assert!(p.host.canvas_state(canvas).is_none());
    assert_eq!(handle.image(), &p.img);
    assert_eq!(p.host.attribute(&p.root, "data-overlay-ready").as_deref(), Some("1"));
}

#[test]
fn window_and_element_resize_trigger_redraws() {
    let p = page(TWO_MASKS);
    p.host.set_box(p.img, 100.0, 100.0);
    p.host.set_complete(p.img, true);
    let handle = init_one(&p.host, &p.root, &OverlayOpts::default())
        .unwrap()
        .unwrap();
    assert!(handle.observes_resize());
    p.host.run_animation_frame();
    let base = handle.paints();

    p.host.resize_window();
    assert_eq!(handle.paints(), base + 1);

    p.host.set_box(p.img, 300.0, 200.0);
    p.host.run_animation_frame();
    assert_eq!(handle.paints(), base + 2);
    let state = p.host.canvas_state(surface(&p.host, p.root)).unwrap();
    assert_eq!(state.backing, (300, 200));
}

#[test]
fn without_resize_observer_window_resize_still_works() {
    let p = page(TWO_MASKS);
    p.host.set_resize_observer_supported(false);
    p.host.set_box(p.img, 100.0, 100.0);
    p.host.set_complete(p.img, true);
    let handle = init_one(&p.host, &p.root, &OverlayOpts::default())
        .unwrap()
        .unwrap();
    assert!(!handle.observes_resize());

    p.host.set_box(p.img, 50.0, 50.0);
    p.host.resize_window();
    assert_eq!(handle.paints(), 2);
}

#[test]
fn root_without_image_is_inert() {
    let host = Rc::new(MemoryHost::new());
    let root = host.append(host.body(), "div");
    host.set_attr(root, "id", "aioe-root");

    assert!(init_one(&host, &root, &OverlayOpts::default()).unwrap().is_none());
    assert!(host.children(root).is_empty());
    assert_eq!(host.window_resize_listeners(), 0);
    assert_eq!(host.pending_frames(), 0);
}

#[test]
fn second_init_of_same_root_is_skipped() {
    let p = page(TWO_MASKS);
    assert!(init_one(&p.host, &p.root, &OverlayOpts::default()).unwrap().is_some());
    assert!(init_one(&p.host, &p.root, &OverlayOpts::default()).unwrap().is_none());
    assert_eq!(p.host.window_resize_listeners(), 1);
}

#[test]
fn style_and_side_come_from_root_attributes() {
    let p = page(TWO_MASKS);
    p.host.set_attr(p.root, "data-side", "back");
    p.host.set_attr(p.root, "data-stroke", "  ");
    p.host.set_attr(p.root, "data-fill-front", "#ff0000");
    p.host.set_attr(p.root, "data-outline-px", "4px");
    p.host.set_box(p.img, 100.0, 100.0);
    p.host.set_complete(p.img, true);

    let handle = init_one(&p.host, &p.root, &OverlayOpts::default())
        .unwrap()
        .unwrap();
    assert_eq!(handle.side(), &SideMode::Other("back".to_owned()));
    assert_eq!(handle.style().stroke, StyleConfig::default().stroke);
    assert_eq!(handle.style().fill_active.as_str(), "#ff0000");
    assert_eq!(handle.style().outline_width_px, 4.0);

    let plan = p.host.canvas_state(surface(&p.host, p.root)).unwrap().plans[0].clone();
    assert_eq!(plan.fills().map(|(i, _)| i).collect::<Vec<_>>(), vec![1]);
}

#[test]
fn legacy_payload_used_when_no_script() {
    let host = Rc::new(MemoryHost::new());
    let root = host.append(host.body(), "div");
    host.set_attr(root, "data-active", "1");
    host.set_attr(
        root,
        "data-masks-b64",
        &STANDARD.encode(r#"{"v":1,"masks":[{"x":0,"y":0,"w":1,"h":1},{"x":0,"y":0,"w":1,"h":1}]}"#),
    );
    host.append(root, "img");

    let handle = init_one(&host, &root, &OverlayOpts::default()).unwrap().unwrap();
    assert_eq!(handle.source(), PayloadSource::Legacy);
    assert_eq!(handle.active(), ActiveIndex(Some(1)));
    assert_eq!(handle.masks().len(), 2);
}

#[test]
fn cancelled_handle_ignores_triggers() {
    let p = page(TWO_MASKS);
    p.host.set_box(p.img, 100.0, 100.0);
    let handle = init_one(&p.host, &p.root, &OverlayOpts::default())
        .unwrap()
        .unwrap();
    handle.cancel();
    p.host.fire_load(p.img);
    p.host.resize_window();
    p.host.run_animation_frames(3);
    assert_eq!(handle.paints(), 0);
    assert!(handle.is_cancelled());
    assert_eq!(handle.redraw(), DrawOutcome::Cancelled);
}

#[test]
fn host_failure_surfaces_as_error() {
    let p = page(TWO_MASKS);
    p.host.set_read_only(true);
    let err = init_one(&p.host, &p.root, &OverlayOpts::default()).unwrap_err();
    assert!(err.to_string().starts_with("host error:"));
}
