use serde_json::Value;

use super::{OverlayPayload, masks_from_array};
use crate::foundation::{
    coerce::coerce_number,
    core::ActiveIndex,
    error::{OverlayError, OverlayResult},
};

/// Decode the structured payload script text.
///
/// Returns `None` (source unavailable) unless the text is a JSON object whose `v` coerces to an
/// integer of at least 1 and whose `masks` is an array. `active` defaults to 0 when missing or
/// non-finite.
pub fn decode_structured(text: &str) -> Option<OverlayPayload> {
    match parse(text) {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::debug!(error = %e, "structured payload unavailable");
            None
        }
    }
}

fn parse(text: &str) -> OverlayResult<OverlayPayload> {
    let text = text.trim();
    if text.is_empty() {
        return Err(OverlayError::decode("payload script is empty"));
    }

    let value: Value = serde_json::from_str(text)
        .map_err(|e| OverlayError::decode(format!("payload is not json: {e}")))?;
    let obj = value
        .as_object()
        .ok_or_else(|| OverlayError::decode("payload is not an object"))?;

    let version = obj.get("v").map(coerce_number).unwrap_or(0.0);
    if !(version.is_finite() && version.trunc() >= 1.0) {
        return Err(OverlayError::decode(format!(
            "unsupported payload version {version}"
        )));
    }

    let masks = obj
        .get("masks")
        .and_then(Value::as_array)
        .ok_or_else(|| OverlayError::decode("payload has no masks array"))?;

    let active = obj
        .get("active")
        .map(|v| ActiveIndex::from_f64(coerce_number(v)))
        .unwrap_or_default();

    Ok(OverlayPayload {
        masks: masks_from_array(masks),
        active,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/payload/structured.rs"]
mod tests;
