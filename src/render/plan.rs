use serde::Serialize;

use crate::{
    foundation::core::{ActiveIndex, Affine, Mask, Rect, RenderContext, Size},
    style::{CssColor, SideMode, StyleConfig},
};

/// Offset applied to stroke origins so thin outlines land on pixel centers.
pub const STROKE_ORIGIN_OFFSET: f64 = 0.5;

#[derive(Clone, Debug, PartialEq, Serialize)]
/// Backend-agnostic paint instructions for one overlay surface.
///
/// A plan consists of:
/// - the surface sizing (`css_size` for layout, `backing_*` for the pixel buffer)
/// - the CSS-to-device `transform` every op is issued under
/// - the ordered `ops`
///
/// Browser hosts replay it on a 2D canvas context; the CPU backend rasterizes it.
pub struct OverlayPlan {
    /// Visible size in CSS pixels.
    pub css_size: Size,
    /// Backing buffer width in device pixels.
    pub backing_width: u32,
    /// Backing buffer height in device pixels.
    pub backing_height: u32,
    /// CSS pixel space to backing buffer.
    pub transform: Affine,
    /// Paint operations in CSS pixel space.
    pub ops: Vec<SurfaceOp>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
/// A single paint operation.
pub enum SurfaceOp {
    /// Clear to transparent.
    Clear {
        /// Area to clear.
        rect: Rect,
    },
    /// Fill a mask rectangle.
    FillRect {
        /// Rectangle in CSS pixels.
        rect: Rect,
        /// Fill color.
        color: CssColor,
        /// Position of the mask in the payload.
        mask: usize,
    },
    /// Outline a mask rectangle.
    StrokeRect {
        /// Rectangle in CSS pixels, origin already offset.
        rect: Rect,
        /// Stroke color.
        color: CssColor,
        /// Line width in CSS pixels.
        width: f64,
        /// Position of the mask in the payload.
        mask: usize,
    },
}

impl OverlayPlan {
    /// Fill ops as `(mask, color)` pairs, in paint order.
    pub fn fills(&self) -> impl Iterator<Item = (usize, &CssColor)> {
        self.ops.iter().filter_map(|op| match op {
            SurfaceOp::FillRect { mask, color, .. } => Some((*mask, color)),
            _ => None,
        })
    }

    /// Masks that received an outline, in paint order.
    pub fn strokes(&self) -> impl Iterator<Item = usize> + '_ {
        self.ops.iter().filter_map(|op| match op {
            SurfaceOp::StrokeRect { mask, .. } => Some(*mask),
            _ => None,
        })
    }
}

/// Compile the overlay for one draw.
///
/// The surface is cleared, then each mask in order gets its fill (front: every mask, active
/// one in the active color; other sides: every mask except the active one) followed by its
/// outline. `None` slots paint nothing but still count toward mask positions.
pub fn compile_overlay(
    ctx: &RenderContext,
    side: &SideMode,
    masks: &[Option<Mask>],
    active: ActiveIndex,
    style: &StyleConfig,
) -> OverlayPlan {
    let size = ctx.css_box;
    let (backing_width, backing_height) = ctx.backing_size();

    let mut ops = Vec::with_capacity(1 + masks.len() * 2);
    ops.push(SurfaceOp::Clear {
        rect: Rect::from_origin_size((0.0, 0.0), size),
    });

    for (idx, mask) in masks.iter().enumerate() {
        let Some(mask) = mask else {
            continue;
        };
        let rect = mask.to_css_rect(size);
        let is_active = active.matches(idx);

        let fill = match (side.is_front(), is_active) {
            (true, true) => Some(&style.fill_active),
            (_, false) => Some(&style.fill_other),
            (false, true) => None,
        };
        if let Some(color) = fill {
            ops.push(SurfaceOp::FillRect {
                rect,
                color: color.clone(),
                mask: idx,
            });
        }

        ops.push(SurfaceOp::StrokeRect {
            rect: Rect::new(
                rect.x0 + STROKE_ORIGIN_OFFSET,
                rect.y0 + STROKE_ORIGIN_OFFSET,
                rect.x1 + STROKE_ORIGIN_OFFSET,
                rect.y1 + STROKE_ORIGIN_OFFSET,
            ),
            color: style.stroke.clone(),
            width: style.outline_width_px,
            mask: idx,
        });
    }

    OverlayPlan {
        css_size: size,
        backing_width,
        backing_height,
        transform: ctx.css_to_device(),
        ops,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
