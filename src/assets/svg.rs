use crate::foundation::error::{OverstampError, OverstampResult};

// Avoid pathological allocations from hostile or broken SVG headers.
pub(crate) const MAX_SVG_DIM: u32 = 16_384;

pub(crate) fn parse_svg(bytes: &[u8]) -> OverstampResult<usvg::Tree> {
    let opts = usvg::Options::default();
    usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| OverstampError::decode(format!("failed to parse svg: {e}")))
}

/// Intrinsic raster size of an SVG tree, rounded up to whole pixels.
pub(crate) fn svg_intrinsic_size(tree: &usvg::Tree) -> OverstampResult<(u32, u32)> {
    fn to_px(v: f32) -> OverstampResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(OverstampError::decode("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    let w = to_px(size.width())?;
    let h = to_px(size.height())?;
    if w > MAX_SVG_DIM || h > MAX_SVG_DIM {
        return Err(OverstampError::decode(format!(
            "svg raster size too large: {w}x{h} (max {MAX_SVG_DIM}x{MAX_SVG_DIM})"
        )));
    }
    Ok((w, h))
}

/// Rasterize `tree` scaled to exactly `width x height` premultiplied RGBA8 pixels.
pub(crate) fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> OverstampResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| OverstampError::decode("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}
