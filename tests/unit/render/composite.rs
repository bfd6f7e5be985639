use super::*;

#[test]
fn over_opaque_replaces() {
    assert_eq!(over([1, 2, 3, 255], [9, 8, 7, 255], 255), [9, 8, 7, 255]);
}

#[test]
fn over_zero_opacity_is_noop() {
    assert_eq!(over([1, 2, 3, 255], [9, 8, 7, 255], 0), [1, 2, 3, 255]);
}

#[test]
fn over_half_opacity_blends() {
    let out = over([0, 0, 0, 255], [255, 255, 255, 255], 128);
    assert_eq!(out[3], 255);
    assert!((127..=129).contains(&out[0]));
}

#[test]
fn region_clips_negative_origin() {
    let mut dst = vec![0u8; 2 * 2 * 4];
    let src = [255u8, 0, 0, 255].repeat(4);
    over_region(
        &mut dst,
        2,
        2,
        PlacedLayer {
            data: &src,
            width: 2,
            height: 2,
            origin: (-1, -1),
        },
        255,
    );
    // only the layer's bottom-right pixel lands on the destination's top-left
    assert_eq!(&dst[..4], &[255, 0, 0, 255]);
    assert!(dst[4..].iter().all(|&b| b == 0));
}

#[test]
fn region_fully_outside_is_ignored() {
    let mut dst = vec![7u8; 2 * 2 * 4];
    let src = [255u8; 4];
    over_region(
        &mut dst,
        2,
        2,
        PlacedLayer {
            data: &src,
            width: 1,
            height: 1,
            origin: (5, 0),
        },
        255,
    );
    assert!(dst.iter().all(|&b| b == 7));
}
