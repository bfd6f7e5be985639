use super::*;
use crate::config::NONE_ID;

fn session_with_image() -> PlacementSession {
    let mut s = PlacementSession::new();
    s.set_image(RasterPayload::from_bytes(
        Some("image/png".to_owned()),
        vec![0x89, b'P', b'N', b'G'],
    ));
    s
}

fn preview() -> Rect {
    Rect::new(0.0, 0.0, 400.0, 400.0)
}

#[test]
fn fresh_session_uses_editor_defaults() {
    let s = PlacementSession::new();
    assert_eq!(s.name(), "My Watermark");
    assert_eq!(s.placement(), Placement::default());
    assert_eq!(s.gesture(), Gesture::Idle);
    assert!(s.readout().is_none());
}

#[test]
fn drag_requires_image() {
    let mut s = PlacementSession::new();
    assert!(!s.begin_drag(PointerId(1), preview()));
    assert_eq!(s.gesture(), Gesture::Idle);
}

#[test]
fn drag_maps_pointer_to_percent_and_clamps() {
    let mut s = session_with_image();
    assert!(s.begin_drag(PointerId(1), preview()));
    assert!(s.pointer_move(PointerId(1), Point::new(100.0, 300.0)));
    assert_eq!(s.placement().x, 25.0);
    assert_eq!(s.placement().y, 75.0);

    assert!(s.pointer_move(PointerId(1), Point::new(-50.0, 900.0)));
    assert_eq!(s.placement().x, 0.0);
    assert_eq!(s.placement().y, 100.0);
}

#[test]
fn foreign_pointer_is_ignored_during_drag() {
    let mut s = session_with_image();
    s.begin_drag(PointerId(1), preview());
    let before = s.placement();
    assert!(!s.pointer_move(PointerId(2), Point::new(0.0, 0.0)));
    assert_eq!(s.placement(), before);
    assert!(!s.begin_drag(PointerId(2), preview()));
}

#[test]
fn degenerate_preview_rect_is_noop() {
    let mut s = session_with_image();
    s.begin_drag(PointerId(1), Rect::new(10.0, 10.0, 10.0, 200.0));
    let before = s.placement();
    assert!(!s.pointer_move(PointerId(1), Point::new(50.0, 50.0)));
    assert_eq!(s.placement(), before);
}

#[test]
fn resize_scales_by_distance_ratio() {
    let mut s = session_with_image();
    s.apply_quick_position(QuickPosition::Center);
    s.set_scale(20.0);
    // center is (200, 200); start 50px away
    assert!(s.begin_resize(PointerId(7), preview(), Point::new(250.0, 200.0)));
    assert!(s.pointer_move(PointerId(7), Point::new(300.0, 200.0)));
    assert!((s.placement().scale - 40.0).abs() < 1e-9);
    assert_eq!(s.readout().as_deref(), Some("x:50% y:50% w:40%"));

    assert!(s.pointer_move(PointerId(7), Point::new(2000.0, 200.0)));
    assert_eq!(s.placement().scale, 100.0);
    assert!(s.pointer_move(PointerId(7), Point::new(200.0, 201.0)));
    assert_eq!(s.placement().scale, 5.0);
}

#[test]
fn resize_from_center_is_ignored() {
    let mut s = session_with_image();
    s.apply_quick_position(QuickPosition::Center);
    s.begin_resize(PointerId(1), preview(), Point::new(200.0, 200.0));
    let before = s.placement();
    assert!(!s.pointer_move(PointerId(1), Point::new(300.0, 300.0)));
    assert_eq!(s.placement(), before);
}

#[test]
fn pointer_down_prefers_resize_handle() {
    let mut s = session_with_image();
    s.apply_quick_position(QuickPosition::Center);
    s.set_scale(50.0);
    s.set_rotation(0.0);
    // box is 200x100 around (200, 200); handle at (300, 250)
    assert!(s.pointer_down(PointerId(1), preview(), Point::new(300.0, 250.0), 2.0));
    assert!(matches!(s.gesture(), Gesture::Resizing { .. }));
    s.end_gesture();

    assert!(s.pointer_down(PointerId(1), preview(), Point::new(200.0, 200.0), 2.0));
    assert!(matches!(s.gesture(), Gesture::Dragging { .. }));
    s.end_gesture();

    assert!(!s.pointer_down(PointerId(1), preview(), Point::new(5.0, 5.0), 2.0));
    assert_eq!(s.gesture(), Gesture::Idle);
}

#[test]
fn end_gesture_is_unconditional() {
    let mut s = session_with_image();
    s.begin_drag(PointerId(3), preview());
    s.end_gesture();
    assert!(!s.is_active());
    assert!(!s.pointer_move(PointerId(3), Point::new(10.0, 10.0)));
}

#[test]
fn quick_positions_cover_grid() {
    let xs: Vec<_> = QuickPosition::ALL.iter().map(|q| q.coords()).collect();
    assert_eq!(xs.len(), 9);
    assert!(xs.contains(&(10.0, 10.0)));
    assert!(xs.contains(&(90.0, 90.0)));
    for (x, y) in xs {
        assert!([10.0, 50.0, 90.0].contains(&x));
        assert!([10.0, 50.0, 90.0].contains(&y));
    }
}

#[test]
fn sliders_clamp_and_ignore_nan() {
    let mut s = session_with_image();
    s.set_opacity(0.0);
    assert_eq!(s.placement().opacity, 0.1);
    s.set_rotation(270.0);
    assert_eq!(s.placement().rotation, 180.0);
    s.set_position(-5.0, 130.0);
    assert_eq!((s.placement().x, s.placement().y), (0.0, 100.0));
    s.set_scale(f64::NAN);
    assert_eq!(s.placement().scale, 15.0);
}

#[test]
fn save_requires_image_and_keeps_existing_id() {
    let err = PlacementSession::new().save().unwrap_err();
    assert!(matches!(err, OverstampError::Validation(_)));

    let mut fresh = session_with_image();
    fresh.set_name("Logo");
    let cfg = fresh.save().unwrap();
    assert!(!cfg.id.is_empty());
    assert_ne!(cfg.id, NONE_ID);
    assert_eq!(cfg.name, "Logo");

    let existing = cfg.clone().with_placement(Placement {
        x: 10.0,
        ..Placement::default()
    });
    let reopened = PlacementSession::edit(&existing).save().unwrap();
    assert_eq!(reopened.id, cfg.id);
    assert_eq!(reopened.placement.x, 10.0);
}
