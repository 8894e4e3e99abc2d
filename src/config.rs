//! Runtime options: marker names, layout threshold, retry policy and style defaults.

use serde::{Deserialize, Serialize};

use crate::{
    foundation::error::{OverlayError, OverlayResult},
    style::StyleConfig,
};

/// Ids, classes and attribute names that tie the runtime to page markup.
///
/// The defaults match the markup emitted by existing card templates and must stay stable for
/// the legacy encoding to keep working.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    /// Id carried by every overlay root.
    pub root_id: String,
    /// Class of the `<script>` holding the structured payload.
    pub payload_class: String,
    /// Class of the injected wrapper around the image.
    pub wrapper_class: String,
    /// Class of the injected overlay canvas.
    pub surface_class: String,
    /// Side mode attribute.
    pub side_attr: String,
    /// Legacy active index attribute.
    pub active_attr: String,
    /// Legacy base64 masks attribute.
    pub masks_attr: String,
    /// Stroke color attribute.
    pub stroke_attr: String,
    /// Active fill color attribute.
    pub fill_active_attr: String,
    /// Other fill color attribute.
    pub fill_other_attr: String,
    /// Outline width attribute.
    pub outline_width_attr: String,
    /// Attribute set on a root once it has been initialized.
    pub ready_attr: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            root_id: "aioe-root".to_owned(),
            payload_class: "aioe-internal".to_owned(),
            wrapper_class: "aioe-wrap".to_owned(),
            surface_class: "aioe-canvas".to_owned(),
            side_attr: "data-side".to_owned(),
            active_attr: "data-active".to_owned(),
            masks_attr: "data-masks-b64".to_owned(),
            stroke_attr: "data-stroke".to_owned(),
            fill_active_attr: "data-fill-front".to_owned(),
            fill_other_attr: "data-fill-other".to_owned(),
            outline_width_attr: "data-outline-px".to_owned(),
            ready_attr: "data-overlay-ready".to_owned(),
        }
    }
}

impl Markers {
    fn validate(&self) -> OverlayResult<()> {
        let fields = [
            ("root_id", &self.root_id),
            ("payload_class", &self.payload_class),
            ("wrapper_class", &self.wrapper_class),
            ("surface_class", &self.surface_class),
            ("side_attr", &self.side_attr),
            ("active_attr", &self.active_attr),
            ("masks_attr", &self.masks_attr),
            ("stroke_attr", &self.stroke_attr),
            ("fill_active_attr", &self.fill_active_attr),
            ("fill_other_attr", &self.fill_other_attr),
            ("outline_width_attr", &self.outline_width_attr),
            ("ready_attr", &self.ready_attr),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() || value.chars().any(char::is_whitespace) {
                return Err(OverlayError::config(format!(
                    "marker '{name}' must be a non-empty name without whitespace"
                )));
            }
        }
        Ok(())
    }
}

/// Animation-frame retry policy for images that are not laid out yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Give up after this many consecutive frames. `None` retries until the image gets a box
    /// or the instance is cancelled.
    pub max_frames: Option<u32>,
}

impl RetryPolicy {
    /// Return `true` when another retry is allowed after `attempts` have been scheduled.
    pub fn allows(self, attempts: u32) -> bool {
        self.max_frames.is_none_or(|max| attempts < max)
    }
}

/// Options shared by every overlay instance on a page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOpts {
    /// Markup names.
    pub markers: Markers,
    /// Smallest box dimension (CSS px) considered laid out.
    pub min_box_px: f64,
    /// Retry policy for unready images.
    pub retry: RetryPolicy,
    /// Style used where root attributes are blank.
    pub style_defaults: StyleConfig,
}

impl Default for OverlayOpts {
    fn default() -> Self {
        Self {
            markers: Markers::default(),
            min_box_px: 2.0,
            retry: RetryPolicy::default(),
            style_defaults: StyleConfig::default(),
        }
    }
}

impl OverlayOpts {
    /// Parse a JSON override document; missing fields keep their defaults.
    pub fn from_json_str(s: &str) -> OverlayResult<Self> {
        let opts: Self = serde_json::from_str(s)
            .map_err(|e| OverlayError::config(format!("parse overlay options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Check option invariants.
    pub fn validate(&self) -> OverlayResult<()> {
        if !(self.min_box_px.is_finite() && self.min_box_px >= 0.0) {
            return Err(OverlayError::config(format!(
                "min_box_px must be a finite non-negative number, got {}",
                self.min_box_px
            )));
        }
        self.markers.validate()?;
        self.style_defaults.validate().map_err(OverlayError::config)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
