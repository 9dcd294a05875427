use super::*;
use crate::pixels::buffer::PixelFormat;

#[test]
fn rgba8_is_zero_copy() {
    let raw = RawBitmap::rgba8(1, 1, vec![1, 2, 3, 4]).unwrap();
    let n = normalize(&raw).unwrap();
    assert_eq!(n.storage, Storage::Borrowed);
    assert_eq!(n.flags, FrameFlags { hdr: false, color: true });

    let RawPixels::Rgba8(src) = raw.pixels() else {
        panic!("expected rgba8");
    };
    let PixelBuffer::Rgba8(b) = &n.pixels else {
        panic!("expected rgba8 buffer");
    };
    assert!(Arc::ptr_eq(src, b.shared_samples()));
}

#[test]
fn indexed_expands_to_rgba_and_is_owned() {
    let raw = RawBitmap::indexed(2, 1, vec![1, 0], vec![[0, 0, 0, 0], [255, 0, 0, 255]]).unwrap();
    let n = normalize(&raw).unwrap();
    assert_eq!(n.storage, Storage::Owned);
    assert_eq!(n.pixels.format(), PixelFormat::Rgba8);
    assert!(n.flags.color);
    assert_eq!(n.pixels.pixel_string(0, 0).unwrap(), "RGBA(255, 0, 0, 255)");
    assert_eq!(n.pixels.pixel_string(1, 0).unwrap(), "RGBA(0, 0, 0, 0)");
}

#[test]
fn gray_palette_is_classified_mono() {
    let raw = RawBitmap::indexed(1, 1, vec![0], vec![[7, 7, 7, 255], [9, 9, 9, 255]]).unwrap();
    let n = normalize(&raw).unwrap();
    assert!(!n.flags.color);
}

#[test]
fn palette_index_out_of_range_is_a_decode_failure() {
    let raw = RawBitmap::indexed(1, 1, vec![3], vec![[0, 0, 0, 255]]).unwrap();
    assert!(matches!(normalize(&raw), Err(FlipbookError::Decode(_))));
}

#[test]
fn min_is_white_is_inverted_into_owned_memory() {
    let raw = RawBitmap::new(
        2,
        1,
        RawPixels::Gray8 {
            samples: Arc::new(vec![0, 200]),
            min_is_white: true,
        },
    )
    .unwrap();
    let n = normalize(&raw).unwrap();
    assert_eq!(n.storage, Storage::Owned);
    assert_eq!(n.pixels.pixel_string(0, 0).unwrap(), "L(255)");
    assert_eq!(n.pixels.pixel_string(1, 0).unwrap(), "L(55)");
    assert!(!n.flags.color);
}

#[test]
fn narrow_types_promote_to_float() {
    let raw = RawBitmap::new(1, 1, RawPixels::Rgb16(Arc::new(vec![0, 65535, 65535]))).unwrap();
    let n = normalize(&raw).unwrap();
    assert_eq!(n.pixels.format(), PixelFormat::RgbF32);
    assert_eq!(n.storage, Storage::Owned);
    assert!(n.flags.hdr);

    let raw = RawBitmap::new(1, 1, RawPixels::GrayI16(Arc::new(vec![-12]))).unwrap();
    let n = normalize(&raw).unwrap();
    assert_eq!(n.pixels.pixel_string(0, 0).unwrap(), "L(-12.0000)");
}

#[test]
fn wide_integer_gray_stays_integer() {
    let raw = RawBitmap::new(1, 1, RawPixels::Gray32(Arc::new(vec![42]))).unwrap();
    let n = normalize(&raw).unwrap();
    assert_eq!(n.pixels.format(), PixelFormat::Gray32);
    assert_eq!(n.storage, Storage::Borrowed);
    assert!(!n.flags.hdr);
}

#[test]
fn cmyk_is_unsupported() {
    let raw = RawBitmap::new(1, 1, RawPixels::Cmyk8(Arc::new(vec![0, 0, 0, 0]))).unwrap();
    assert!(matches!(
        normalize(&raw),
        Err(FlipbookError::UnsupportedPixelFormat(_))
    ));
}

#[test]
fn raw_bitmap_rejects_mismatched_sample_count() {
    assert!(RawBitmap::rgba8(2, 2, vec![0; 4]).is_err());
    assert!(RawBitmap::indexed(1, 1, vec![0], vec![]).is_err());
}
