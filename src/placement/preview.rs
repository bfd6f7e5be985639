use std::str::FromStr;

use crate::config::Placement;
use crate::foundation::core::{Affine, Point, Rect, Vec2};
use crate::foundation::error::OverstampError;

/// Radius of the circular resize affordance drawn at the watermark's bottom-right corner.
pub const RESIZE_HANDLE_RADIUS: f64 = 8.0;

/// Preview shapes offered by the editor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AspectRatio {
    #[default]
    Square,
    Landscape,
    Portrait,
    StandardLandscape,
    StandardPortrait,
}

impl AspectRatio {
    pub const ALL: [Self; 5] = [
        Self::Square,
        Self::Landscape,
        Self::Portrait,
        Self::StandardLandscape,
        Self::StandardPortrait,
    ];

    /// `(width, height)` ratio terms.
    pub fn parts(self) -> (u32, u32) {
        match self {
            Self::Square => (1, 1),
            Self::Landscape => (16, 9),
            Self::Portrait => (9, 16),
            Self::StandardLandscape => (4, 3),
            Self::StandardPortrait => (3, 4),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::StandardLandscape => "4:3",
            Self::StandardPortrait => "3:4",
        }
    }

    /// Width divided by height.
    pub fn ratio(self) -> f64 {
        let (w, h) = self.parts();
        f64::from(w) / f64::from(h)
    }

    /// Lenient parse used for persisted UI state: unknown values become [`AspectRatio::Square`].
    pub fn parse_or_square(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl FromStr for AspectRatio {
    type Err = OverstampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| OverstampError::validation(format!("unknown aspect ratio '{s}'")))
    }
}

/// Largest rectangle of `ratio` that fits inside `container`, centered.
pub fn fit_preview(container: Rect, ratio: AspectRatio) -> Rect {
    let cw = container.width().max(0.0);
    let ch = container.height().max(0.0);
    let r = ratio.ratio();
    let (w, h) = if cw / r <= ch { (cw, cw / r) } else { (ch * r, ch) };
    let c = container.center();
    Rect::from_center_size(c, (w, h))
}

/// What a pointer-down landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    /// The resize affordance. It sits on top of the watermark and wins over [`Hit::Body`].
    ResizeHandle,
    Body,
    Outside,
}

/// The watermark's rotated box inside a preview rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatermarkBox {
    pub center: Point,
    pub width: f64,
    pub height: f64,
    pub rotation_rad: f64,
}

impl WatermarkBox {
    /// `aspect` is the watermark's natural `width / height`.
    pub fn new(rect: Rect, placement: &Placement, aspect: f64) -> Self {
        let center = Point::new(
            rect.x0 + placement.x / 100.0 * rect.width(),
            rect.y0 + placement.y / 100.0 * rect.height(),
        );
        let width = placement.scale / 100.0 * rect.width();
        let height = if aspect.is_finite() && aspect > 0.0 {
            width / aspect
        } else {
            width
        };
        Self {
            center,
            width,
            height,
            rotation_rad: placement.rotation_rad(),
        }
    }

    fn to_world(&self) -> Affine {
        Affine::translate(self.center.to_vec2()) * Affine::rotate(self.rotation_rad)
    }

    /// Center of the resize handle (the rotated bottom-right corner).
    pub fn handle_center(&self) -> Point {
        self.to_world() * Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn contains(&self, pos: Point) -> bool {
        let local = self.to_world().inverse() * pos;
        local.x.abs() <= self.width / 2.0 && local.y.abs() <= self.height / 2.0
    }

    pub fn hit_test(&self, pos: Point) -> Hit {
        let d: Vec2 = pos - self.handle_center();
        if d.hypot() <= RESIZE_HANDLE_RADIUS {
            Hit::ResizeHandle
        } else if self.contains(pos) {
            Hit::Body
        } else {
            Hit::Outside
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/placement/preview.rs"]
mod tests;
