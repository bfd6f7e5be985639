use crate::config::Placement;
use crate::foundation::core::{Affine, Canvas, Point, Rect, Size, Vec2};

/// Pixel-space geometry of one watermark draw on a target canvas.
///
/// Only the width comes from the placement; the height follows the watermark's natural aspect
/// ratio, so the watermark is never distorted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayLayout {
    pub center: Point,
    pub width: f64,
    pub height: f64,
    pub rotation_rad: f64,
    /// Natural (decoded) size of the watermark.
    pub natural: Size,
}

impl OverlayLayout {
    pub fn compute(canvas: Canvas, placement: &Placement, natural: Size) -> Self {
        let width = placement.scale / 100.0 * f64::from(canvas.width);
        let height = if natural.width > 0.0 {
            width * (natural.height / natural.width)
        } else {
            0.0
        };
        Self {
            center: placement.center_px(canvas),
            width,
            height,
            rotation_rad: placement.rotation_rad(),
            natural,
        }
    }

    /// Maps natural watermark pixel space onto the canvas:
    /// translate to center, rotate, offset by half the target size, scale to target.
    pub fn transform(&self) -> Affine {
        let (sx, sy) = if self.natural.width > 0.0 && self.natural.height > 0.0 {
            (
                self.width / self.natural.width,
                self.height / self.natural.height,
            )
        } else {
            (0.0, 0.0)
        };
        Affine::translate(self.center.to_vec2())
            * Affine::rotate(self.rotation_rad)
            * Affine::translate(Vec2::new(-self.width / 2.0, -self.height / 2.0))
            * Affine::scale_non_uniform(sx, sy)
    }

    /// Unrotated target rectangle centered on [`OverlayLayout::center`].
    pub fn target_rect(&self) -> Rect {
        Rect::from_center_size(self.center, (self.width, self.height))
    }

    /// Axis-aligned canvas-space bounding box of the rotated watermark.
    pub fn bounds(&self) -> Rect {
        self.transform()
            .transform_rect_bbox(Rect::from_origin_size(Point::ORIGIN, self.natural))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/layout.rs"]
mod tests;
