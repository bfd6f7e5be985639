use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn aspect_ratio_parses_editor_values() {
    assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::Landscape);
    assert_eq!(" 3:4 ".parse::<AspectRatio>().unwrap(), AspectRatio::StandardPortrait);
    assert!("2:1".parse::<AspectRatio>().is_err());
    assert_eq!(AspectRatio::parse_or_square("bogus"), AspectRatio::Square);
    for r in AspectRatio::ALL {
        assert_eq!(AspectRatio::parse_or_square(r.as_str()), r);
    }
}

#[test]
fn fit_preview_landscape_fills_width() {
    let container = Rect::new(0.0, 0.0, 800.0, 800.0);
    let r = fit_preview(container, AspectRatio::Landscape);
    assert!(approx(r.width(), 800.0));
    assert!(approx(r.height(), 450.0));
    assert!(approx(r.y0, 175.0));
}

#[test]
fn fit_preview_portrait_fills_height() {
    let container = Rect::new(100.0, 0.0, 900.0, 600.0);
    let r = fit_preview(container, AspectRatio::Portrait);
    assert!(approx(r.height(), 600.0));
    assert!(approx(r.width(), 337.5));
    assert!(approx(r.center().x, 500.0));
}

#[test]
fn box_geometry_follows_placement() {
    let rect = Rect::new(10.0, 20.0, 410.0, 420.0);
    let placement = Placement {
        x: 50.0,
        y: 50.0,
        scale: 50.0,
        opacity: 1.0,
        rotation: 0.0,
    };
    let b = WatermarkBox::new(rect, &placement, 2.0);
    assert_eq!(b.center, Point::new(210.0, 220.0));
    assert!(approx(b.width, 200.0));
    assert!(approx(b.height, 100.0));
    let h = b.handle_center();
    assert!(approx(h.x, 310.0) && approx(h.y, 270.0));
}

#[test]
fn handle_wins_over_body_and_rotates_with_box() {
    let rect = Rect::new(0.0, 0.0, 400.0, 400.0);
    let placement = Placement {
        x: 50.0,
        y: 50.0,
        scale: 50.0,
        opacity: 1.0,
        rotation: 90.0,
    };
    let b = WatermarkBox::new(rect, &placement, 2.0);
    // 200x100 box rotated 90deg: bottom-right corner maps to (200 - 50, 200 + 100).
    let h = b.handle_center();
    assert!(approx(h.x, 150.0) && approx(h.y, 300.0), "{h:?}");

    assert_eq!(b.hit_test(h), Hit::ResizeHandle);
    assert_eq!(b.hit_test(Point::new(200.0, 200.0)), Hit::Body);
    // Inside the unrotated footprint but outside the rotated one.
    assert_eq!(b.hit_test(Point::new(290.0, 200.0)), Hit::Outside);
}
