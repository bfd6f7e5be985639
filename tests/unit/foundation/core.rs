use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn fps_parses_ffprobe_ratios() {
    assert_eq!(Fps::parse_ratio("30/1").unwrap(), Fps { num: 30, den: 1 });
    assert_eq!(
        Fps::parse_ratio("30000/1001").unwrap(),
        Fps {
            num: 30000,
            den: 1001
        }
    );
    assert_eq!(Fps::parse_ratio("25").unwrap(), Fps { num: 25, den: 1 });
    assert!(Fps::parse_ratio("0/0").is_err());
    assert!(Fps::parse_ratio("abc").is_err());
}

#[test]
fn secs_to_frames_ceil_covers_partial_frames() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.secs_to_frames_ceil(5.0), 150);
    assert_eq!(fps.secs_to_frames_ceil(5.0000000001), 150);
    assert_eq!(fps.secs_to_frames_ceil(5.01), 151);
    assert_eq!(fps.secs_to_frames_ceil(0.0), 0);
}

#[test]
fn canvas_rect_and_len() {
    let c = Canvas::new(4, 3);
    assert_eq!(c.rgba8_len(), 48);
    assert_eq!(c.rect(), Rect::new(0.0, 0.0, 4.0, 3.0));
    assert!(!c.is_empty());
    assert!(Canvas::new(0, 3).is_empty());
}
