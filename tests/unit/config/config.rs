use super::*;

#[test]
fn empty_document_yields_defaults() {
    let opts = OverlayOpts::from_json_str("{}").unwrap();
    assert_eq!(opts, OverlayOpts::default());
    assert_eq!(opts.markers.root_id, "aioe-root");
    assert_eq!(opts.markers.masks_attr, "data-masks-b64");
    assert_eq!(opts.min_box_px, 2.0);
    assert_eq!(opts.retry.max_frames, None);
}

#[test]
fn partial_overrides_keep_other_defaults() {
    let opts = OverlayOpts::from_json_str(
        r#"{
            "markers": { "root_id": "occlusion-root" },
            "retry": { "max_frames": 120 },
            "style_defaults": { "fill_active": "rgba(245,179,39,1)" }
        }"#,
    )
    .unwrap();
    assert_eq!(opts.markers.root_id, "occlusion-root");
    assert_eq!(opts.markers.payload_class, "aioe-internal");
    assert_eq!(opts.retry.max_frames, Some(120));
    assert_eq!(
        opts.style_defaults.fill_active.as_str(),
        "rgba(245,179,39,1)"
    );
    assert_eq!(opts.style_defaults.stroke.as_str(), "rgba(0,0,0,0.65)");
}

#[test]
fn invalid_documents_are_config_errors() {
    let cases = [
        r#"{"min_box_px": -1}"#,
        r#"{"markers": {"root_id": ""}}"#,
        r#"{"markers": {"surface_class": "two words"}}"#,
        r#"{"style_defaults": {"outline_width_px": 0}}"#,
        r#"{"style_defaults": {"stroke": ""}}"#,
        "not json",
    ];
    for raw in cases {
        let err = OverlayOpts::from_json_str(raw).unwrap_err();
        assert!(
            matches!(err, OverlayError::Config(_)),
            "expected config error for {raw}, got {err}"
        );
    }
}

#[test]
fn retry_policy_budget() {
    let unbounded = RetryPolicy::default();
    assert!(unbounded.allows(10_000));

    let bounded = RetryPolicy {
        max_frames: Some(3),
    };
    assert!(bounded.allows(0));
    assert!(bounded.allows(2));
    assert!(!bounded.allows(3));
}
