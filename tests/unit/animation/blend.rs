use super::*;

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_dst_transparent_returns_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_half_alpha_on_opaque_mixes() {
    let dst = [0, 0, 0, 255];
    let src = [255, 255, 255, 128];
    let out = over(dst, src);
    assert_eq!(out[3], 255);
    assert_eq!(out[0], 128);
}

#[test]
fn over_region_rejects_out_of_bounds_layer() {
    let mut canvas = RgbaImage::new(4, 4);
    let layer = RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
    assert!(over_region(&mut canvas, &layer, 3, 0).is_err());
    assert!(over_region(&mut canvas, &layer, 2, 2).is_ok());
    assert_eq!(canvas.get_pixel(3, 3).0, [1, 2, 3, 255]);
    assert_eq!(canvas.get_pixel(1, 1).0, [0, 0, 0, 0]);
}
