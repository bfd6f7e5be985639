use super::*;
use crate::assets::decode::DecodedImage;
use crate::render::filter::StyleFilter;

const WHITE: [u8; 4] = [255, 255, 255, 255];
const RED: [u8; 4] = [255, 0, 0, 255];

fn pixel(s: &Surface, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * s.canvas().width + x) * 4) as usize;
    let d = s.data();
    [d[i], d[i + 1], d[i + 2], d[i + 3]]
}

fn white_surface(w: u32, h: u32) -> Surface {
    let mut s = Surface::new(Canvas::new(w, h)).unwrap();
    s.draw_base(&WHITE.repeat((w * h) as usize), w, h, None).unwrap();
    s
}

fn red_overlay() -> PreparedOverlay {
    let img = DecodedImage::from_premul_rgba8(20, 10, RED.repeat(200)).unwrap();
    PreparedOverlay::new(&img, StyleFilter::IDENTITY).unwrap()
}

fn centered(scale: f64, rotation: f64) -> Placement {
    Placement {
        x: 50.0,
        y: 50.0,
        scale,
        opacity: 1.0,
        rotation,
    }
}

#[test]
fn oversized_surface_is_an_encode_error() {
    let err = Surface::new(Canvas::new(70_000, 10)).unwrap_err();
    assert!(matches!(err, OverstampError::Encode(_)));
    assert!(Surface::new(Canvas::new(0, 10)).is_err());
}

#[test]
fn overlay_lands_at_center_with_natural_aspect() {
    let mut s = white_surface(100, 100);
    let layout = s.draw_overlay(&red_overlay(), &centered(40.0, 0.0), None).unwrap();
    assert_eq!(layout.width, 40.0);
    assert_eq!(layout.height, 20.0);
    assert_eq!(pixel(&s, 50, 50), RED);
    assert_eq!(pixel(&s, 31, 41), RED);
    assert_eq!(pixel(&s, 50, 35), WHITE);
    assert_eq!(pixel(&s, 10, 10), WHITE);
}

#[test]
fn rotated_overlay_covers_rotated_box() {
    let mut s = white_surface(100, 100);
    s.draw_overlay(&red_overlay(), &centered(40.0, 90.0), None).unwrap();
    assert_eq!(pixel(&s, 50, 35), RED);
    assert_eq!(pixel(&s, 35, 50), WHITE);
}

#[test]
fn opacity_blends_with_base() {
    let mut s = white_surface(100, 100);
    let placement = Placement {
        opacity: 0.5,
        ..centered(40.0, 0.0)
    };
    s.draw_overlay(&red_overlay(), &placement, None).unwrap();
    let px = pixel(&s, 50, 50);
    assert_eq!(px[0], 255);
    assert!((126..=129).contains(&px[1]));
    assert_eq!(px[3], 255);
}

#[test]
fn shadow_darkens_just_outside_the_box() {
    let mut plain = white_surface(100, 100);
    plain.draw_overlay(&red_overlay(), &centered(40.0, 0.0), None).unwrap();
    let mut shadowed = white_surface(100, 100);
    shadowed
        .draw_overlay(&red_overlay(), &centered(40.0, 0.0), Some(DropShadow::STANDARD))
        .unwrap();

    assert_eq!(pixel(&plain, 50, 38), WHITE);
    let px = pixel(&shadowed, 50, 38);
    assert!(px[0] < 255 && px[0] == px[1] && px[1] == px[2]);
    assert_eq!(pixel(&shadowed, 5, 5), WHITE);
}

#[test]
fn overlay_near_corner_is_clipped_to_canvas() {
    let mut s = white_surface(50, 50);
    let placement = Placement {
        x: 100.0,
        y: 100.0,
        scale: 100.0,
        opacity: 1.0,
        rotation: 0.0,
    };
    s.draw_overlay(&red_overlay(), &placement, Some(DropShadow::STANDARD))
        .unwrap();
    assert_eq!(pixel(&s, 49, 49), RED);
    assert_eq!(pixel(&s, 0, 0), WHITE);
}

#[test]
fn repeated_draws_are_deterministic() {
    let draw = || {
        let mut s = white_surface(64, 48);
        s.draw_overlay(&red_overlay(), &centered(33.0, 17.0), Some(DropShadow::STANDARD))
            .unwrap();
        s.to_frame()
    };
    assert_eq!(draw(), draw());
}

#[test]
fn base_of_other_size_is_scaled_to_full_extent() {
    let mut s = Surface::new(Canvas::new(4, 4)).unwrap();
    s.draw_base(&RED.repeat(4), 2, 2, None).unwrap();
    let px = pixel(&s, 1, 1);
    assert_eq!(px[3], 255);
    assert!(px[0] > 200);
}

#[test]
fn base_lut_is_applied() {
    let mut s = Surface::new(Canvas::new(1, 1)).unwrap();
    let lut = StyleFilter::ENHANCE.lut();
    s.draw_base(&[128, 128, 128, 255], 1, 1, Some(&lut)).unwrap();
    assert_eq!(pixel(&s, 0, 0)[0], lut.map(128));
}
