//! CSS-style `contrast()` / `brightness()` color filter.
//!
//! Both steps act on straight (non-premultiplied) channel values in `[0, 1]` and clamp after each
//! step, matching the CSS filter-effects definitions:
//!
//! - `contrast(c)`: `v' = (v - 0.5) * c + 0.5`
//! - `brightness(b)`: `v' = v * b`
//!
//! Alpha is untouched. Because each channel maps independently, a filter reduces to a 256-entry
//! lookup table.

use std::fmt;

use crate::foundation::math::mul_div255_u8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StyleFilter {
    pub contrast: f32,
    pub brightness: f32,
}

impl Default for StyleFilter {
    fn default() -> Self {
        Self::ENHANCE
    }
}

impl StyleFilter {
    pub const IDENTITY: Self = Self {
        contrast: 1.0,
        brightness: 1.0,
    };

    /// `contrast(1.1) brightness(1.05)`, applied to every compositor draw.
    pub const ENHANCE: Self = Self {
        contrast: 1.1,
        brightness: 1.05,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    fn map_unit(&self, v: f32) -> f32 {
        let v = ((v - 0.5) * self.contrast + 0.5).clamp(0.0, 1.0);
        (v * self.brightness).clamp(0.0, 1.0)
    }

    pub fn lut(&self) -> FilterLut {
        let mut table = [0u8; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            let v = self.map_unit(i as f32 / 255.0);
            *slot = (v * 255.0).round() as u8;
        }
        FilterLut(table)
    }
}

impl fmt::Display for StyleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contrast({}) brightness({})", self.contrast, self.brightness)
    }
}

/// Precomputed per-channel mapping for a [`StyleFilter`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterLut([u8; 256]);

impl FilterLut {
    pub fn map(&self, v: u8) -> u8 {
        self.0[v as usize]
    }

    /// Filter premultiplied RGBA8 pixels in place.
    pub fn apply_premul_in_place(&self, rgba: &mut [u8]) {
        for px in rgba.chunks_exact_mut(4) {
            let a = px[3] as u16;
            match a {
                0 => {}
                255 => {
                    for c in &mut px[..3] {
                        *c = self.map(*c);
                    }
                }
                _ => {
                    for c in &mut px[..3] {
                        let straight = (((*c as u16) * 255 + a / 2) / a).min(255) as u8;
                        *c = mul_div255_u8(self.map(straight) as u16, a);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/filter.rs"]
mod tests;
