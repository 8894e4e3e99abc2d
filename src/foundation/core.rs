pub use kurbo::{Affine, Point, Rect, Size};

/// A rectangle in image-fractional coordinates.
///
/// Each field is a fraction of the image's rendered width (`x`, `w`) or height (`y`, `h`),
/// nominally in `[0, 1]`. Values outside that range are not rejected; they simply land outside
/// the image box when denormalized.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Mask {
    /// Left edge as a fraction of the image width.
    pub x: f64,
    /// Top edge as a fraction of the image height.
    pub y: f64,
    /// Width as a fraction of the image width.
    pub w: f64,
    /// Height as a fraction of the image height.
    pub h: f64,
}

impl Mask {
    /// Create a mask from fractional coordinates.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Denormalize into CSS pixels for an image box of `size`.
    ///
    /// The rectangle keeps the mask's orientation: a negative `w` produces `x1 < x0`.
    pub fn to_css_rect(self, size: Size) -> Rect {
        let x = self.x * size.width;
        let y = self.y * size.height;
        Rect::new(x, y, x + self.w * size.width, y + self.h * size.height)
    }
}

/// Ordinal position of the highlighted mask.
///
/// `None` means the coerced value can never equal a mask position (negative or fractional), so
/// no mask is treated as active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ActiveIndex(pub Option<usize>);

impl ActiveIndex {
    /// Map a numeric-coerced value onto a mask position.
    ///
    /// Non-finite input falls back to `0`.
    pub fn from_f64(v: f64) -> Self {
        if !v.is_finite() {
            return Self::default();
        }
        if v < 0.0 || v.fract() != 0.0 || v > usize::MAX as f64 {
            return Self(None);
        }
        Self(Some(v as usize))
    }

    /// Return `true` when the mask at `idx` is the active one.
    pub fn matches(self, idx: usize) -> bool {
        self.0 == Some(idx)
    }
}

impl Default for ActiveIndex {
    fn default() -> Self {
        Self(Some(0))
    }
}

/// Per-draw measurement of the image: its displayed box and the device pixel ratio.
///
/// Recomputed on every redraw because layout can change between triggers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderContext {
    /// Displayed image box in CSS pixels.
    pub css_box: Size,
    /// Device pixels per CSS pixel.
    pub device_pixel_ratio: f64,
}

impl RenderContext {
    /// Build a context, replacing a missing or nonsensical ratio with `1.0`.
    pub fn new(css_box: Size, device_pixel_ratio: f64) -> Self {
        let device_pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Self {
            css_box,
            device_pixel_ratio,
        }
    }

    /// Return `true` when both box dimensions reach `min_box_px`.
    pub fn is_laid_out(&self, min_box_px: f64) -> bool {
        self.css_box.width >= min_box_px && self.css_box.height >= min_box_px
    }

    /// Backing buffer size in device pixels: `round(css * dpr)`, at least 1 per axis.
    pub fn backing_size(&self) -> (u32, u32) {
        fn scaled(css: f64, dpr: f64) -> u32 {
            let px = (css * dpr).round();
            if px.is_finite() && px >= 1.0 {
                px.min(u32::MAX as f64) as u32
            } else {
                1
            }
        }

        (
            scaled(self.css_box.width, self.device_pixel_ratio),
            scaled(self.css_box.height, self.device_pixel_ratio),
        )
    }

    /// Transform from CSS pixel space into the backing buffer.
    pub fn css_to_device(&self) -> Affine {
        Affine::scale(self.device_pixel_ratio)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
