use crate::foundation::math::mul_div255_u16;

pub type PremulRgba8 = [u8; 4];

/// Source-over with an extra 8-bit opacity applied to `src`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: u8) -> PremulRgba8 {
    if opacity == 0 || src[3] == 0 {
        return dst;
    }
    let op = u16::from(opacity);
    let sa = mul_div255_u16(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255 - sa;

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255_u16(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u16(u16::from(src[i]), op);
        let dc = mul_div255_u16(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// A premultiplied layer positioned in destination pixel space by its top-left corner.
#[derive(Clone, Copy, Debug)]
pub struct PlacedLayer<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub origin: (i64, i64),
}

/// Composite `layer` onto a `dst_w x dst_h` buffer. Parts outside the destination are skipped.
pub fn over_region(dst: &mut [u8], dst_w: u32, dst_h: u32, layer: PlacedLayer<'_>, opacity: u8) {
    if opacity == 0 {
        return;
    }
    let (ox, oy) = layer.origin;
    let src_w = i64::from(layer.width);
    let x_start = (-ox).max(0);
    let x_end = (i64::from(dst_w) - ox).min(src_w);
    let y_start = (-oy).max(0);
    let y_end = (i64::from(dst_h) - oy).min(i64::from(layer.height));
    if x_start >= x_end || y_start >= y_end {
        return;
    }
    let src = layer.data;
    for sy in y_start..y_end {
        let dy = sy + oy;
        for sx in x_start..x_end {
            let dx = sx + ox;
            let si = ((sy * src_w + sx) as usize) * 4;
            let di = ((dy * i64::from(dst_w) + dx) as usize) * 4;
            let s = [src[si], src[si + 1], src[si + 2], src[si + 3]];
            let d = [dst[di], dst[di + 1], dst[di + 2], dst[di + 3]];
            dst[di..di + 4].copy_from_slice(&over(d, s, opacity));
        }
    }
}

fn add_sat_u8(a: u16, b: u16) -> u8 {
    (a + b).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
