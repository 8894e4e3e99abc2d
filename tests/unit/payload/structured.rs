use super::*;
use crate::foundation::core::Mask;
use serde_json::json;

fn decode(v: serde_json::Value) -> Option<OverlayPayload> {
    decode_structured(&v.to_string())
}

#[test]
fn accepts_versioned_payload_in_order() {
    let p = decode(json!({
        "v": 1,
        "image": "card.png",
        "group": "g1",
        "active": 1,
        "masks": [
            {"x": 0.1, "y": 0.2, "w": 0.3, "h": 0.4},
            {"x": 0.5, "y": 0.5, "w": 0.2, "h": 0.1, "label": "b"},
        ],
        "mask_label": ""
    }))
    .unwrap();
    assert_eq!(
        p.masks,
        vec![
            Some(Mask::new(0.1, 0.2, 0.3, 0.4)),
            Some(Mask::new(0.5, 0.5, 0.2, 0.1))
        ]
    );
    assert_eq!(p.active, ActiveIndex(Some(1)));
}

#[test]
fn empty_masks_array_is_accepted() {
    let p = decode(json!({"v": 2, "masks": []})).unwrap();
    assert!(p.masks.is_empty());
    assert_eq!(p.active, ActiveIndex(Some(0)));
}

#[test]
fn active_is_numeric_coerced() {
    let p = decode(json!({"v": 1, "masks": [], "active": "2"})).unwrap();
    assert_eq!(p.active, ActiveIndex(Some(2)));

    let p = decode(json!({"v": 1, "masks": [], "active": "nope"})).unwrap();
    assert_eq!(p.active, ActiveIndex(Some(0)));

    let p = decode(json!({"v": 1, "masks": [], "active": null})).unwrap();
    assert_eq!(p.active, ActiveIndex(Some(0)));

    let p = decode(json!({"v": 1, "masks": [], "active": -1})).unwrap();
    assert_eq!(p.active, ActiveIndex(None));
}

#[test]
fn version_is_integer_coerced() {
    assert!(decode(json!({"v": "1", "masks": []})).is_some());
    assert!(decode(json!({"v": 1.9, "masks": []})).is_some());
    assert!(decode(json!({"v": 0.5, "masks": []})).is_none());
}

#[test]
fn rejects_bad_version_or_masks() {
    assert!(decode(json!({"masks": []})).is_none());
    assert!(decode(json!({"v": 0, "masks": []})).is_none());
    assert!(decode(json!({"v": "x", "masks": []})).is_none());
    assert!(decode(json!({"v": 1})).is_none());
    assert!(decode(json!({"v": 1, "masks": {"x": 0}})).is_none());
    assert!(decode(json!([1, 2, 3])).is_none());
}

#[test]
fn malformed_text_is_unavailable() {
    assert!(decode_structured("").is_none());
    assert!(decode_structured("   \n").is_none());
    assert!(decode_structured("{\"v\":1,").is_none());
    assert!(decode_structured("{{InternalData}}").is_none());
}

#[test]
fn entries_missing_numeric_fields_keep_their_position() {
    let p = decode(json!({
        "v": 1,
        "masks": [
            {"x": 0.1, "y": 0.1, "w": 0.1},
            {"x": 0.2, "y": "0.2", "w": 0.2, "h": 0.2},
            {"x": null, "y": 0.3, "w": 0.3, "h": 0.3},
            "not a mask",
            {"x": 0.4, "y": 0.4, "w": 0.4, "h": "wide"}
        ],
        "active": 1
    }))
    .unwrap();
    assert_eq!(
        p.masks,
        vec![None, Some(Mask::new(0.2, 0.2, 0.2, 0.2)), None, None, None]
    );
    assert_eq!(p.active, ActiveIndex(Some(1)));
}
