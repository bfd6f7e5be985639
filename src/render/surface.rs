use crate::config::Placement;
use crate::foundation::core::{Affine, Canvas, Rect, Vec2};
use crate::foundation::error::{OverstampError, OverstampResult};
use crate::foundation::math::{mul_div255_u8, unit_to_u8};
use crate::render::blur::blur_alpha8;
use crate::render::composite::{PlacedLayer, over_region};
use crate::render::filter::FilterLut;
use crate::render::frame::FrameRGBA;
use crate::render::layout::OverlayLayout;
use crate::render::overlay::{DropShadow, PreparedOverlay, premul_bytes_to_pixmap};

/// Largest width or height the rasterizer accepts.
pub const MAX_SURFACE_DIM: u32 = u16::MAX as u32;

/// Offscreen premultiplied RGBA8 drawing target at a fixed pixel size.
pub struct Surface {
    canvas: Canvas,
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface").field("canvas", &self.canvas).finish()
    }
}

impl Surface {
    pub fn new(canvas: Canvas) -> OverstampResult<Self> {
        if canvas.is_empty() {
            return Err(OverstampError::encode(format!(
                "cannot allocate an empty {}x{} surface",
                canvas.width, canvas.height
            )));
        }
        let (w, h) = surface_dims(canvas)?;
        Ok(Self {
            canvas,
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub fn clear(&mut self) {
        self.pixmap.data_as_u8_slice_mut().fill(0);
    }

    /// Draw a premultiplied base image over the full extent of the surface, replacing its
    /// contents, then run `lut` over the result.
    pub fn draw_base(
        &mut self,
        rgba8_premul: &[u8],
        width: u32,
        height: u32,
        lut: Option<&FilterLut>,
    ) -> OverstampResult<()> {
        if Canvas::new(width, height) == self.canvas {
            if rgba8_premul.len() != self.canvas.rgba8_len() {
                return Err(OverstampError::validation("base image byte length mismatch"));
            }
            self.pixmap
                .data_as_u8_slice_mut()
                .copy_from_slice(rgba8_premul);
        } else {
            self.draw_base_scaled(rgba8_premul, width, height)?;
        }
        if let Some(lut) = lut {
            lut.apply_premul_in_place(self.pixmap.data_as_u8_slice_mut());
        }
        Ok(())
    }

    fn draw_base_scaled(&mut self, rgba8_premul: &[u8], width: u32, height: u32) -> OverstampResult<()> {
        if width == 0 || height == 0 {
            return Err(OverstampError::validation("base image has zero size"));
        }
        let pixmap = premul_bytes_to_pixmap(rgba8_premul, width, height)?;
        let (w, h) = surface_dims(self.canvas)?;
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(affine_to_cpu(Affine::scale_non_uniform(
            f64::from(self.canvas.width) / f64::from(width),
            f64::from(self.canvas.height) / f64::from(height),
        )));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        });
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));
        ctx.flush();
        self.clear();
        ctx.render_to_pixmap(&mut self.pixmap);
        Ok(())
    }

    /// Draw a watermark (and its optional drop shadow) at `placement` with global alpha
    /// `placement.opacity`.
    ///
    /// The overlay is rasterized into a fresh context sized to its bounding box, so no transform or
    /// paint state carries over between draws.
    pub fn draw_overlay(
        &mut self,
        overlay: &PreparedOverlay,
        placement: &Placement,
        shadow: Option<DropShadow>,
    ) -> OverstampResult<OverlayLayout> {
        let layout = OverlayLayout::compute(self.canvas, placement, overlay.natural_size());
        let pad = f64::from(shadow.map_or(0, |s| s.radius()));

        let region = layout
            .bounds()
            .inflate(pad, pad)
            .intersect(self.canvas.rect().inflate(pad, pad));
        let region = Rect::new(
            region.x0.floor(),
            region.y0.floor(),
            region.x1.ceil(),
            region.y1.ceil(),
        );
        if region.width() <= 0.0 || region.height() <= 0.0 {
            return Ok(layout);
        }
        let layer_canvas = Canvas::new(region.width() as u32, region.height() as u32);
        let (lw, lh) = surface_dims(layer_canvas)?;

        let mut ctx = vello_cpu::RenderContext::new(lw, lh);
        ctx.set_transform(affine_to_cpu(
            Affine::translate(Vec2::new(-region.x0, -region.y0)) * layout.transform(),
        ));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(overlay.paint());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            layout.natural.width,
            layout.natural.height,
        ));
        ctx.flush();
        let mut layer = vello_cpu::Pixmap::new(lw, lh);
        ctx.render_to_pixmap(&mut layer);

        let opacity = unit_to_u8(placement.opacity as f32);
        let origin = (region.x0 as i64, region.y0 as i64);
        let (dst_w, dst_h) = (self.canvas.width, self.canvas.height);

        if let Some(shadow) = shadow {
            let alpha: Vec<u8> = layer.data_as_u8_slice().chunks_exact(4).map(|px| px[3]).collect();
            let blurred = blur_alpha8(
                &alpha,
                layer_canvas.width,
                layer_canvas.height,
                shadow.radius(),
                shadow.sigma(),
            )?;
            let shadow_alpha = unit_to_u8(shadow.alpha) as u16;
            let shadow_rgba: Vec<u8> = blurred
                .iter()
                .flat_map(|&a| [0, 0, 0, mul_div255_u8(u16::from(a), shadow_alpha)])
                .collect();
            over_region(
                self.pixmap.data_as_u8_slice_mut(),
                dst_w,
                dst_h,
                PlacedLayer {
                    data: &shadow_rgba,
                    width: layer_canvas.width,
                    height: layer_canvas.height,
                    origin,
                },
                opacity,
            );
        }

        over_region(
            self.pixmap.data_as_u8_slice_mut(),
            dst_w,
            dst_h,
            PlacedLayer {
                data: layer.data_as_u8_slice(),
                width: layer_canvas.width,
                height: layer_canvas.height,
                origin,
            },
            opacity,
        );

        Ok(layout)
    }

    pub fn to_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.data().to_vec(),
            premultiplied: true,
        }
    }
}

fn surface_dims(canvas: Canvas) -> OverstampResult<(u16, u16)> {
    let w: u16 = canvas.width.try_into().map_err(|_| {
        OverstampError::encode(format!(
            "surface width {} exceeds {MAX_SURFACE_DIM}",
            canvas.width
        ))
    })?;
    let h: u16 = canvas.height.try_into().map_err(|_| {
        OverstampError::encode(format!(
            "surface height {} exceeds {MAX_SURFACE_DIM}",
            canvas.height
        ))
    })?;
    Ok((w, h))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
