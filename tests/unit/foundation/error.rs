use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(OverlayError::host("x").to_string().contains("host error:"));
    assert!(
        OverlayError::decode("x")
            .to_string()
            .contains("decode error:")
    );
    assert!(
        OverlayError::config("x")
            .to_string()
            .contains("config error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = OverlayError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
