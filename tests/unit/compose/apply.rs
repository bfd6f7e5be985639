use std::io::Cursor;

use super::*;
use crate::config::NONE_ID;

fn png_payload(w: u32, h: u32, px: [u8; 4]) -> RasterPayload {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    RasterPayload::from_bytes(Some("image/png".to_owned()), buf)
}

fn preset() -> WatermarkConfig {
    WatermarkConfig::new("42", "Logo", png_payload(4, 2, [0, 0, 0, 255]))
}

fn garbage() -> RasterPayload {
    RasterPayload::from_bytes(None, b"garbage".to_vec())
}

#[test]
fn no_active_preset_skips_compositor() {
    let out = apply_image(&garbage(), None, &ComposeOpts::default());
    assert!(matches!(out, Applied::Skipped));
}

#[test]
fn sentinel_preset_skips_compositor() {
    let sentinel = WatermarkConfig::new(NONE_ID, "None", garbage());
    // garbage input would fail to decode if the compositor ran
    let out = apply_image(&garbage(), Some(&sentinel), &ComposeOpts::default());
    assert!(matches!(out, Applied::Skipped));
    assert!(out.error().is_none());

    let video = apply_video(
        &VideoSource::parse("missing.mp4"),
        Some(&sentinel),
        &VideoComposeOpts::default(),
        &CancelToken::new(),
    );
    assert!(matches!(video, Applied::Skipped));
}

#[test]
fn failure_falls_back_to_original_and_keeps_error() {
    let original = garbage();
    let out = apply_image(&original, Some(&preset()), &ComposeOpts::default());
    assert!(out.error().is_some_and(|e| e.is_decode()));
    assert_eq!(out.into_payload_or(original.clone()), original);
}

#[test]
fn success_returns_watermarked_png() {
    let out = apply_image(
        &png_payload(16, 16, [255, 255, 255, 255]),
        Some(&preset()),
        &ComposeOpts::default(),
    );
    assert!(out.is_watermarked());
    let png = out.output().unwrap();
    assert_eq!(png.mime, "image/png");
}

#[test]
fn batch_keeps_order_and_isolates_failures() {
    let sources = vec![
        png_payload(8, 8, [255, 255, 255, 255]),
        garbage(),
        png_payload(12, 6, [0, 255, 0, 255]),
    ];
    let results = apply_images(&sources, Some(&preset()), &ComposeOpts::default());
    assert_eq!(results.len(), 3);
    assert!(results[0].is_watermarked());
    assert!(results[1].error().is_some());
    let third = image::load_from_memory(&results.into_iter().nth(2).unwrap().output().unwrap().bytes)
        .unwrap();
    assert_eq!((third.width(), third.height()), (12, 6));
}

#[test]
fn batch_without_preset_is_all_skipped() {
    let results = apply_images(&[garbage(), garbage()], None, &ComposeOpts::default());
    assert!(results.iter().all(|r| matches!(r, Applied::Skipped)));
}
