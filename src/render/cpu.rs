use crate::{
    foundation::{
        core::{Affine, Rect},
        error::{OverlayError, OverlayResult},
    },
    render::plan::{OverlayPlan, SurfaceOp},
    style::CssColor,
};

/// A rasterized overlay as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Software rasterizer for [`OverlayPlan`]s, powered by `vello_cpu`.
///
/// Used for previews outside a browser. Colors the parser does not understand are skipped,
/// matching how a canvas ignores an invalid style string.
#[derive(Clone, Debug, Default)]
pub struct CpuOverlayBackend {
    skipped_ops: usize,
}

impl CpuOverlayBackend {
    /// Create a backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ops skipped so far because of unparseable colors.
    pub fn skipped_ops(&self) -> usize {
        self.skipped_ops
    }

    /// Rasterize `plan` into a premultiplied frame of the plan's backing size.
    #[tracing::instrument(skip(self, plan), fields(w = plan.backing_width, h = plan.backing_height))]
    pub fn render_plan(&mut self, plan: &OverlayPlan) -> OverlayResult<FrameRGBA> {
        let width: u16 = plan
            .backing_width
            .try_into()
            .map_err(|_| OverlayError::host("overlay width exceeds u16"))?;
        let height: u16 = plan
            .backing_height
            .try_into()
            .map_err(|_| OverlayError::host("overlay height exceeds u16"))?;

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        let mut ctx = vello_cpu::RenderContext::new(width, height);
        let transform = affine_to_cpu(plan.transform);

        for op in &plan.ops {
            match op {
                // A fresh pixmap starts transparent.
                SurfaceOp::Clear { .. } => {}
                SurfaceOp::FillRect { rect, color, .. } => {
                    let Some(paint) = self.paint_for(color) else {
                        continue;
                    };
                    ctx.set_transform(transform);
                    ctx.set_paint(paint);
                    ctx.fill_rect(&rect_to_cpu(*rect));
                }
                SurfaceOp::StrokeRect {
                    rect, color, width, ..
                } => {
                    let Some(paint) = self.paint_for(color) else {
                        continue;
                    };
                    ctx.set_transform(transform);
                    ctx.set_paint(paint);
                    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width));
                    ctx.stroke_rect(&rect_to_cpu(*rect));
                }
            }
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: plan.backing_width,
            height: plan.backing_height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn paint_for(&mut self, color: &CssColor) -> Option<vello_cpu::peniko::Color> {
        match color.to_rgba() {
            Some(rgba) => {
                let [r, g, b, a] = rgba.to_rgba8();
                Some(vello_cpu::peniko::Color::from_rgba8(r, g, b, a))
            }
            None => {
                tracing::warn!(color = color.as_str(), "unsupported css color; op skipped");
                self.skipped_ops += 1;
                None
            }
        }
    }
}

/// Blend a premultiplied overlay frame over a straight-alpha RGBA8 image of the same size.
pub fn composite_over_image(frame: &FrameRGBA, image: &mut [u8]) -> OverlayResult<()> {
    if !frame.premultiplied {
        return Err(OverlayError::host("overlay frame must be premultiplied"));
    }
    if image.len() != frame.data.len() || image.len() % 4 != 0 {
        return Err(OverlayError::host(
            "composite_over_image expects equal-length rgba8 buffers",
        ));
    }

    for (d, s) in image.chunks_exact_mut(4).zip(frame.data.chunks_exact(4)) {
        let dst = premultiply([d[0], d[1], d[2], d[3]]);
        let out = unpremultiply(over(dst, [s[0], s[1], s[2], s[3]]));
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    if src[3] == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

fn premultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    let a16 = u16::from(a);
    [
        mul_div255(u16::from(r), a16),
        mul_div255(u16::from(g), a16),
        mul_div255(u16::from(b), a16),
        a,
    ]
}

fn unpremultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let un = |c: u8| -> u8 {
        ((u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8
    };
    [un(r), un(g), un(b), a]
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
