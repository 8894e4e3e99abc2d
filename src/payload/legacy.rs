use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde_json::Value;

use super::{OverlayPayload, masks_from_array};
use crate::foundation::{
    coerce::parse_int_prefix,
    core::{ActiveIndex, Mask},
    error::{OverlayError, OverlayResult},
};

/// Standard alphabet, padding optional: templates have shipped both padded and unpadded bodies.
const LENIENT_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decode the legacy attribute pair.
///
/// `active` is read as a leading integer (default 0). `masks_b64` goes through
/// base64 → UTF-8 text → JSON object → `masks` array; bytes that are not valid UTF-8 are read as
/// Latin-1 instead. Any failure yields an empty mask list.
pub fn decode_legacy(active: Option<&str>, masks_b64: Option<&str>) -> OverlayPayload {
    let active = active
        .and_then(parse_int_prefix)
        .map(|i| ActiveIndex::from_f64(i as f64))
        .unwrap_or_default();

    let masks = match masks_b64 {
        Some(b64) => decode_masks(b64).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "legacy masks unavailable");
            Vec::new()
        }),
        None => Vec::new(),
    };

    OverlayPayload { masks, active }
}

fn decode_masks(b64: &str) -> OverlayResult<Vec<Option<Mask>>> {
    let compact: String = b64.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Ok(Vec::new());
    }

    let bytes = LENIENT_B64
        .decode(compact.as_bytes())
        .map_err(|e| OverlayError::decode(format!("masks attribute is not base64: {e}")))?;
    let text = bytes_to_text(bytes);

    let value: Value = serde_json::from_str(&text)
        .map_err(|e| OverlayError::decode(format!("masks attribute is not json: {e}")))?;

    Ok(value
        .as_object()
        .and_then(|obj| obj.get("masks"))
        .and_then(Value::as_array)
        .map(|items| masks_from_array(items))
        .unwrap_or_default())
}

/// UTF-8 when valid, otherwise one char per byte.
fn bytes_to_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/payload/legacy.rs"]
mod tests;
