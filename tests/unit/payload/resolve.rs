use base64::{Engine as _, engine::general_purpose::STANDARD};

use super::*;
use crate::host::memory::{MemoryHost, NodeId};

fn root_with_legacy(host: &MemoryHost, active: &str) -> NodeId {
    let root = host.append(host.body(), "div");
    host.set_attr(root, "id", "aioe-root");
    host.set_attr(root, "data-active", active);
    let json = r#"{"v":1,"masks":[{"x":0.1,"y":0.1,"w":0.2,"h":0.2}]}"#;
    host.set_attr(root, "data-masks-b64", &STANDARD.encode(json));
    root
}

fn add_script(host: &MemoryHost, root: NodeId, text: &str) {
    let script = host.append(root, "script");
    host.set_attr(script, "class", "aioe-internal");
    host.set_text(script, text);
}

#[test]
fn structured_payload_wins_over_legacy() {
    let host = MemoryHost::new();
    let root = root_with_legacy(&host, "0");
    add_script(
        &host,
        root,
        r#"{"v":1,"active":1,"masks":[{"x":0,"y":0,"w":0.5,"h":0.5},{"x":0.5,"y":0.5,"w":0.5,"h":0.5}]}"#,
    );

    let resolved = resolve_payload(&host, &root, &Markers::default());
    assert_eq!(resolved.source, PayloadSource::Structured);
    assert_eq!(resolved.payload.masks.len(), 2);
    assert_eq!(resolved.payload.active, ActiveIndex(Some(1)));
}

#[test]
fn unusable_structured_payload_falls_back_to_legacy() {
    for text in [
        r#"{"v":0,"masks":[]}"#,
        r#"{"v":1}"#,
        r#"{"v":1,"masks":{}}"#,
        "not json",
        "   ",
    ] {
        let host = MemoryHost::new();
        let root = root_with_legacy(&host, "0");
        add_script(&host, root, text);

        let resolved = resolve_payload(&host, &root, &Markers::default());
        assert_eq!(resolved.source, PayloadSource::Legacy, "payload {text:?}");
        assert_eq!(resolved.payload.masks, vec![Some(Mask::new(0.1, 0.1, 0.2, 0.2))]);
    }
}

#[test]
fn legacy_without_script() {
    let host = MemoryHost::new();
    let root = root_with_legacy(&host, "3");
    let resolved = resolve_payload(&host, &root, &Markers::default());
    assert_eq!(resolved.source, PayloadSource::Legacy);
    assert_eq!(resolved.payload.active, ActiveIndex(Some(3)));
}

#[test]
fn bare_root_yields_empty_legacy_payload() {
    let host = MemoryHost::new();
    let root = host.append(host.body(), "div");
    let resolved = resolve_payload(&host, &root, &Markers::default());
    assert_eq!(resolved.source, PayloadSource::Legacy);
    assert!(resolved.payload.masks.is_empty());
}

#[test]
fn malformed_mask_entries_keep_their_slot() {
    let items: Vec<Value> = serde_json::from_str(
        r#"[{"x":0,"y":0,"w":1,"h":1},{"x":0,"y":0,"w":1},{"x":null,"y":0,"w":1,"h":1},5,{"x":"0.5","y":0,"w":1,"h":1}]"#,
    )
    .unwrap();
    let masks = masks_from_array(&items);
    assert_eq!(
        masks,
        vec![
            Some(Mask::new(0.0, 0.0, 1.0, 1.0)),
            None,
            None,
            None,
            Some(Mask::new(0.5, 0.0, 1.0, 1.0)),
        ]
    );
}

#[test]
fn resolved_payload_serializes_flat() {
    let host = MemoryHost::new();
    let root = root_with_legacy(&host, "0");
    let v = serde_json::to_value(resolve_payload(&host, &root, &Markers::default())).unwrap();
    assert_eq!(v["source"], "legacy");
    assert_eq!(v["active"], 0);
    assert_eq!(v["masks"][0]["w"], 0.2);
}
