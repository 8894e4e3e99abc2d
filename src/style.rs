//! Overlay presentation: side mode and colors/outline width.

pub mod color;

use serde::{Deserialize, Serialize};

use crate::foundation::coerce::parse_int_prefix;

/// Default outline stroke color.
pub const DEFAULT_STROKE: &str = "rgba(0,0,0,0.65)";
/// Default fill for the active mask on the front side.
pub const DEFAULT_FILL_ACTIVE: &str = "rgba(40,40,40,0.85)";
/// Default fill for every other mask.
pub const DEFAULT_FILL_OTHER: &str = "rgba(255,215,0,0.35)";
/// Default outline width in CSS pixels.
pub const DEFAULT_OUTLINE_WIDTH_PX: f64 = 2.0;

/// A non-empty CSS color string, passed to the surface verbatim.
///
/// No color-syntax validation happens here; an invalid color is ignored by the canvas exactly
/// as it would be in the page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CssColor(String);

impl CssColor {
    /// Trim `s` and wrap it, or `None` when nothing is left.
    pub fn new(s: &str) -> Option<Self> {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(Self(t.to_owned()))
        }
    }

    /// The color text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into channel values, for hosts that rasterize themselves.
    pub fn to_rgba(&self) -> Option<color::Rgba> {
        color::parse_css_color(&self.0)
    }
}

impl TryFrom<String> for CssColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| "css color must not be empty".to_owned())
    }
}

impl From<CssColor> for String {
    fn from(value: CssColor) -> Self {
        value.0
    }
}

impl std::fmt::Display for CssColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which face of the card the overlay belongs to.
///
/// The front fills every mask. Any other side leaves the active mask unfilled so the layer
/// beneath shows through it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideMode {
    /// Every mask is filled.
    #[default]
    Front,
    /// Any non-front mode; the original attribute value is kept for diagnostics.
    Other(String),
}

impl SideMode {
    /// Read the side attribute. Absent or blank values mean [`SideMode::Front`].
    pub fn from_attr(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("front") => Self::Front,
            Some(other) => Self::Other(other.to_owned()),
        }
    }

    /// Return `true` for [`SideMode::Front`].
    pub fn is_front(&self) -> bool {
        matches!(self, Self::Front)
    }
}

/// Raw style attribute values as read from the root element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleAttrs {
    /// Stroke color attribute.
    pub stroke: Option<String>,
    /// Active fill attribute.
    pub fill_active: Option<String>,
    /// Other fill attribute.
    pub fill_other: Option<String>,
    /// Outline width attribute.
    pub outline_width: Option<String>,
}

/// Resolved overlay style.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Outline color for every mask.
    pub stroke: CssColor,
    /// Fill for the active mask (front side only).
    pub fill_active: CssColor,
    /// Fill for non-active masks.
    pub fill_other: CssColor,
    /// Outline width in CSS pixels; always positive.
    pub outline_width_px: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            stroke: CssColor(DEFAULT_STROKE.to_owned()),
            fill_active: CssColor(DEFAULT_FILL_ACTIVE.to_owned()),
            fill_other: CssColor(DEFAULT_FILL_OTHER.to_owned()),
            outline_width_px: DEFAULT_OUTLINE_WIDTH_PX,
        }
    }
}

impl StyleConfig {
    /// Resolve attribute values against `defaults`.
    ///
    /// Blank colors take the default. The outline width is read as a leading integer; anything
    /// unparseable or not positive takes the default width.
    pub fn resolve(attrs: &StyleAttrs, defaults: &StyleConfig) -> Self {
        fn pick(raw: Option<&String>, fallback: &CssColor) -> CssColor {
            raw.and_then(|s| CssColor::new(s))
                .unwrap_or_else(|| fallback.clone())
        }

        let outline_width_px = attrs
            .outline_width
            .as_deref()
            .and_then(parse_int_prefix)
            .filter(|w| *w > 0)
            .map(|w| w as f64)
            .unwrap_or(defaults.outline_width_px);

        Self {
            stroke: pick(attrs.stroke.as_ref(), &defaults.stroke),
            fill_active: pick(attrs.fill_active.as_ref(), &defaults.fill_active),
            fill_other: pick(attrs.fill_other.as_ref(), &defaults.fill_other),
            outline_width_px,
        }
    }

    /// Check the invariants that deserialized defaults must uphold.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if !(self.outline_width_px.is_finite() && self.outline_width_px > 0.0) {
            return Err(format!(
                "outline width must be a positive number, got {}",
                self.outline_width_px
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/style/style.rs"]
mod tests;
