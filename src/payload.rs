//! Mask data resolution from the two markup encodings.
//!
//! Resolution order:
//! 1. the structured JSON `<script>` under the root ([`decode_structured`]),
//! 2. the legacy attributes on the root ([`decode_legacy`]).
//!
//! Both decoders are total. A malformed structured payload is "unavailable" and falls through;
//! a malformed legacy payload degrades to an empty mask list.

mod legacy;
mod structured;

use serde::Serialize;
use serde_json::Value;

pub use legacy::decode_legacy;
pub use structured::decode_structured;

use crate::{
    config::Markers,
    foundation::{
        coerce::coerce_number,
        core::{ActiveIndex, Mask},
    },
    host::{Dom, Selector},
};

/// Masks plus the active index, ready for rendering.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct OverlayPayload {
    /// Masks in payload order. An entry that failed the shape check stays as `None` so later
    /// masks keep the position `active` refers to.
    pub masks: Vec<Option<Mask>>,
    /// Highlighted mask position.
    pub active: ActiveIndex,
}

/// Which encoding produced a payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadSource {
    /// Embedded JSON script.
    Structured,
    /// Base64 + attribute encoding.
    Legacy,
}

/// A payload tagged with its source.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedPayload {
    /// Where the payload came from.
    pub source: PayloadSource,
    /// The decoded payload.
    #[serde(flatten)]
    pub payload: OverlayPayload,
}

/// Resolve the payload for `root`, preferring the structured source.
#[tracing::instrument(skip(dom, root, markers))]
pub fn resolve_payload<D: Dom + ?Sized>(
    dom: &D,
    root: &D::Node,
    markers: &Markers,
) -> ResolvedPayload {
    let script = dom.find_descendant(root, &Selector::tag_class("script", &markers.payload_class));
    if let Some(payload) = script
        .and_then(|s| dom.text_content(&s))
        .and_then(|text| decode_structured(&text))
    {
        tracing::debug!(masks = payload.masks.len(), "using structured payload");
        return ResolvedPayload {
            source: PayloadSource::Structured,
            payload,
        };
    }

    let active = dom.attribute(root, &markers.active_attr);
    let masks_b64 = dom.attribute(root, &markers.masks_attr);
    let payload = decode_legacy(active.as_deref(), masks_b64.as_deref());
    tracing::debug!(masks = payload.masks.len(), "using legacy payload");
    ResolvedPayload {
        source: PayloadSource::Legacy,
        payload,
    }
}

/// Extract masks from a JSON array. Elements without four numeric fields become `None` slots.
pub(crate) fn masks_from_array(items: &[Value]) -> Vec<Option<Mask>> {
    let masks: Vec<Option<Mask>> = items.iter().map(mask_from_value).collect();
    let skipped = masks.iter().filter(|m| m.is_none()).count();
    if skipped > 0 {
        tracing::debug!(skipped, "malformed mask entries will not paint");
    }
    masks
}

fn mask_from_value(v: &Value) -> Option<Mask> {
    let obj = v.as_object()?;
    let field = |key: &str| -> Option<f64> {
        let raw = obj.get(key).filter(|v| !v.is_null())?;
        let n = coerce_number(raw);
        n.is_finite().then_some(n)
    };
    Some(Mask::new(field("x")?, field("y")?, field("w")?, field("h")?))
}

#[cfg(test)]
#[path = "../tests/unit/payload/resolve.rs"]
mod tests;
