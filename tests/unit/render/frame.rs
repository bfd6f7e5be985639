use super::*;

#[test]
fn straight_copy_unpremultiplies() {
    let f = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![64, 0, 0, 128],
        premultiplied: true,
    };
    assert_eq!(f.to_straight_rgba8(), vec![128, 0, 0, 128]);
}

#[test]
fn png_encode_decodes_back_to_same_size() {
    let f = FrameRGBA {
        width: 3,
        height: 2,
        data: [10u8, 20, 30, 255].repeat(6),
        premultiplied: true,
    };
    let png = f.encode_png().unwrap();
    assert_eq!(png.mime, "image/png");
    let img = image::load_from_memory(&png.bytes).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.get_pixel(2, 1).0, [10, 20, 30, 255]);
    assert_eq!(f.encode_png().unwrap(), png);
}

#[test]
fn png_encode_rejects_short_buffer() {
    let f = FrameRGBA {
        width: 4,
        height: 4,
        data: vec![0; 8],
        premultiplied: false,
    };
    assert!(matches!(f.encode_png(), Err(OverstampError::Encode(_))));
}
