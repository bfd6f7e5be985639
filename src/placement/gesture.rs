use crate::assets::payload::RasterPayload;
use crate::config::{
    DEFAULT_PRESET_NAME, OPACITY_RANGE, Placement, ROTATION_RANGE, SCALE_RANGE, WatermarkConfig,
    X_RANGE, Y_RANGE, generate_preset_id,
};
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{OverstampError, OverstampResult};
use crate::placement::preview::{Hit, WatermarkBox};

/// Identifies one pointer (mouse, pen, or a single touch contact).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointerId(pub u64);

/// Gesture currently in progress. At most one exists at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        pointer: PointerId,
        /// Preview rectangle captured at gesture start.
        rect: Rect,
    },
    Resizing {
        pointer: PointerId,
        rect: Rect,
        /// Distance from the watermark center to the pointer at gesture start.
        baseline_distance: f64,
        /// Scale at gesture start.
        baseline_scale: f64,
    },
}

/// One-click placements offered next to the preview.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuickPosition {
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl QuickPosition {
    pub const ALL: [Self; 9] = [
        Self::TopLeft,
        Self::Top,
        Self::TopRight,
        Self::Left,
        Self::Center,
        Self::Right,
        Self::BottomLeft,
        Self::Bottom,
        Self::BottomRight,
    ];

    /// `(x, y)` in percent.
    pub fn coords(self) -> (f64, f64) {
        match self {
            Self::TopLeft => (10.0, 10.0),
            Self::Top => (50.0, 10.0),
            Self::TopRight => (90.0, 10.0),
            Self::Left => (10.0, 50.0),
            Self::Center => (50.0, 50.0),
            Self::Right => (90.0, 50.0),
            Self::BottomLeft => (10.0, 90.0),
            Self::Bottom => (50.0, 90.0),
            Self::BottomRight => (90.0, 90.0),
        }
    }
}

/// Editor state for one watermark while the editor is open. Never persisted.
#[derive(Clone, Debug)]
pub struct PlacementSession {
    id: Option<String>,
    name: String,
    image: Option<RasterPayload>,
    placement: Placement,
    gesture: Gesture,
}

impl Default for PlacementSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PlacementSession {
    /// Fresh editor: default name and placement, no image yet.
    pub fn new() -> Self {
        Self {
            id: None,
            name: DEFAULT_PRESET_NAME.to_owned(),
            image: None,
            placement: Placement::default(),
            gesture: Gesture::Idle,
        }
    }

    /// Editor opened on an existing preset.
    pub fn edit(cfg: &WatermarkConfig) -> Self {
        Self {
            id: Some(cfg.id.clone()),
            name: cfg.name.clone(),
            image: Some(cfg.image.clone()),
            placement: cfg.placement,
            gesture: Gesture::Idle,
        }
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn image(&self) -> Option<&RasterPayload> {
        self.image.as_ref()
    }

    pub fn set_image(&mut self, image: RasterPayload) {
        self.image = Some(image);
    }

    /// Start moving the watermark. Ignored while another gesture runs or before an image exists.
    pub fn begin_drag(&mut self, pointer: PointerId, rect: Rect) -> bool {
        if self.image.is_none() || self.gesture != Gesture::Idle {
            return false;
        }
        self.gesture = Gesture::Dragging { pointer, rect };
        true
    }

    /// Start resizing from the handle. Captures the center-to-pointer baseline distance.
    pub fn begin_resize(&mut self, pointer: PointerId, rect: Rect, pos: Point) -> bool {
        if self.image.is_none() || self.gesture != Gesture::Idle {
            return false;
        }
        let center = center_in(rect, &self.placement);
        self.gesture = Gesture::Resizing {
            pointer,
            rect,
            baseline_distance: pos.distance(center),
            baseline_scale: self.placement.scale,
        };
        true
    }

    /// Route a pointer-down by hit-testing the watermark box. The resize handle is tested before
    /// the body, so a press on the handle never starts a drag.
    pub fn pointer_down(&mut self, pointer: PointerId, rect: Rect, pos: Point, aspect: f64) -> bool {
        let wm = WatermarkBox::new(rect, &self.placement, aspect);
        match wm.hit_test(pos) {
            Hit::ResizeHandle => self.begin_resize(pointer, rect, pos),
            Hit::Body => self.begin_drag(pointer, rect),
            Hit::Outside => false,
        }
    }

    /// Apply a pointer move. Returns `true` when the placement changed.
    pub fn pointer_move(&mut self, pointer: PointerId, pos: Point) -> bool {
        match self.gesture {
            Gesture::Idle => false,
            Gesture::Dragging { pointer: owner, rect } => {
                if owner != pointer || rect.width() <= 0.0 || rect.height() <= 0.0 {
                    return false;
                }
                let x = 100.0 * (pos.x - rect.x0) / rect.width();
                let y = 100.0 * (pos.y - rect.y0) / rect.height();
                self.placement.x = x.clamp(*X_RANGE.start(), *X_RANGE.end());
                self.placement.y = y.clamp(*Y_RANGE.start(), *Y_RANGE.end());
                true
            }
            Gesture::Resizing {
                pointer: owner,
                rect,
                baseline_distance,
                baseline_scale,
            } => {
                if owner != pointer || !baseline_distance.is_finite() || baseline_distance <= 0.0 {
                    return false;
                }
                let d = pos.distance(center_in(rect, &self.placement));
                let scale = baseline_scale * d / baseline_distance;
                self.placement.scale = scale.clamp(*SCALE_RANGE.start(), *SCALE_RANGE.end());
                true
            }
        }
    }

    /// Pointer released (anywhere) or left the tracked surface.
    pub fn end_gesture(&mut self) {
        self.gesture = Gesture::Idle;
    }

    pub fn apply_quick_position(&mut self, pos: QuickPosition) {
        let (x, y) = pos.coords();
        self.placement.x = x;
        self.placement.y = y;
    }

    /// Numeric position entry, clamped like a drag.
    pub fn set_position(&mut self, x: f64, y: f64) {
        if x.is_finite() {
            self.placement.x = x.clamp(*X_RANGE.start(), *X_RANGE.end());
        }
        if y.is_finite() {
            self.placement.y = y.clamp(*Y_RANGE.start(), *Y_RANGE.end());
        }
    }

    pub fn set_scale(&mut self, scale: f64) {
        if scale.is_finite() {
            self.placement.scale = scale.clamp(*SCALE_RANGE.start(), *SCALE_RANGE.end());
        }
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        if opacity.is_finite() {
            self.placement.opacity = opacity.clamp(*OPACITY_RANGE.start(), *OPACITY_RANGE.end());
        }
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        if degrees.is_finite() {
            self.placement.rotation =
                degrees.clamp(*ROTATION_RANGE.start(), *ROTATION_RANGE.end());
        }
    }

    /// Live `x:NN% y:NN% w:NN%` label shown while a gesture is running.
    pub fn readout(&self) -> Option<String> {
        if !self.is_active() {
            return None;
        }
        let p = self.placement;
        Some(format!(
            "x:{}% y:{}% w:{}%",
            p.x.round(),
            p.y.round(),
            p.scale.round()
        ))
    }

    /// Produce the preset to store. Requires an image.
    pub fn save(&self) -> OverstampResult<WatermarkConfig> {
        let image = self
            .image
            .clone()
            .ok_or_else(|| OverstampError::validation("a watermark image is required"))?;
        let id = self.id.clone().unwrap_or_else(generate_preset_id);
        Ok(WatermarkConfig::new(id, self.name.clone(), image).with_placement(self.placement.clamped()))
    }
}

fn center_in(rect: Rect, placement: &Placement) -> Point {
    Point::new(
        rect.x0 + placement.x / 100.0 * rect.width(),
        rect.y0 + placement.y / 100.0 * rect.height(),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/placement/gesture.rs"]
mod tests;
