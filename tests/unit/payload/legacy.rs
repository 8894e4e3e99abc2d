use super::*;
use base64::{Engine as _, engine::general_purpose::STANDARD};

fn encode(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

#[test]
fn legacy_round_trip_single_mask() {
    let b64 = encode(r#"{"v":1,"masks":[{"x":0.1,"y":0.2,"w":0.3,"h":0.4}]}"#);
    let p = decode_legacy(Some("0"), Some(&b64));
    assert_eq!(p.masks, vec![Some(Mask::new(0.1, 0.2, 0.3, 0.4))]);
    assert_eq!(p.active, ActiveIndex(Some(0)));
}

#[test]
fn non_ascii_labels_survive_utf8_decode() {
    let b64 = encode(r#"{"v":1,"masks":[{"x":0,"y":0,"w":1,"h":1,"label":"Größe 🖼️"}]}"#);
    let p = decode_legacy(None, Some(&b64));
    assert_eq!(p.masks, vec![Some(Mask::new(0.0, 0.0, 1.0, 1.0))]);
}

#[test]
fn invalid_utf8_falls_back_to_raw_bytes() {
    let mut bytes = br#"{"v":1,"masks":[{"x":0.5,"y":0.5,"w":0.25,"h":0.25}],"label":""#.to_vec();
    bytes.extend_from_slice(&[0xE9, 0xFF]);
    bytes.extend_from_slice(br#""}"#);
    let b64 = STANDARD.encode(&bytes);

    let p = decode_legacy(None, Some(&b64));
    assert_eq!(p.masks, vec![Some(Mask::new(0.5, 0.5, 0.25, 0.25))]);
}

#[test]
fn unpadded_and_wrapped_base64_is_accepted() {
    let b64 = encode(r#"{"masks":[{"x":0.1,"y":0.1,"w":0.1,"h":0.1}]}"#);
    let unpadded = b64.trim_end_matches('=').to_owned();
    let wrapped = format!("{}\n  {}", &unpadded[..10], &unpadded[10..]);
    let p = decode_legacy(None, Some(&wrapped));
    assert_eq!(p.masks.len(), 1);
}

#[test]
fn malformed_inputs_yield_empty_masks() {
    assert!(decode_legacy(None, Some("!!!not base64!!!")).masks.is_empty());
    assert!(decode_legacy(None, Some(&encode("not json"))).masks.is_empty());
    assert!(decode_legacy(None, Some(&encode("[1,2]"))).masks.is_empty());
    assert!(decode_legacy(None, Some(&encode(r#"{"v":1}"#))).masks.is_empty());
    assert!(decode_legacy(None, Some(&encode(r#"{"masks":"x"}"#))).masks.is_empty());
    assert!(decode_legacy(None, Some("")).masks.is_empty());
    assert!(decode_legacy(None, None).masks.is_empty());
}

#[test]
fn active_attribute_parsing() {
    assert_eq!(decode_legacy(Some("3"), None).active, ActiveIndex(Some(3)));
    assert_eq!(decode_legacy(Some(" 2 "), None).active, ActiveIndex(Some(2)));
    assert_eq!(decode_legacy(Some("abc"), None).active, ActiveIndex(Some(0)));
    assert_eq!(decode_legacy(Some(""), None).active, ActiveIndex(Some(0)));
    assert_eq!(decode_legacy(None, None).active, ActiveIndex(Some(0)));
    assert_eq!(decode_legacy(Some("-1"), None).active, ActiveIndex(None));
}

#[test]
fn oversized_active_matches_no_mask() {
    let b64 = encode(r#"{"masks":[{"x":0,"y":0,"w":1,"h":1}]}"#);
    let p = decode_legacy(Some("99999999999999999999"), Some(&b64));
    assert!(matches!(p.active, ActiveIndex(Some(i)) if i > 0));
    assert!(!p.active.matches(0));
}
