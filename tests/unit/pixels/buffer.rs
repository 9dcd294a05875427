use super::*;

#[test]
fn formats_report_layout() {
    assert_eq!(PixelFormat::Rgba8.bytes_per_pixel(), 4);
    assert_eq!(PixelFormat::Gray16.bytes_per_pixel(), 2);
    assert_eq!(PixelFormat::RgbF32.bytes_per_pixel(), 12);
    assert!(PixelFormat::GrayF32.is_hdr());
    assert!(!PixelFormat::Gray32.is_hdr());
    assert!(!PixelFormat::Gray8.is_color());
    assert!(PixelFormat::RgbaF32.has_alpha());
}

#[test]
fn pixel_string_per_layout() {
    let rgba = PixelBuffer::rgba8(1, 1, vec![255, 0, 10, 128]).unwrap();
    assert_eq!(rgba.pixel_string(0, 0).unwrap(), "RGBA(255, 0, 10, 128)");

    let gray = PixelBuffer::gray16(2, 1, vec![7, 65535]).unwrap();
    assert_eq!(gray.pixel_string(1, 0).unwrap(), "L(65535)");
    assert_eq!(gray.pixel_string(2, 0), None);

    let hdr = PixelBuffer::rgb_f32(1, 1, vec![0.5, 1.25, 0.0]).unwrap();
    assert_eq!(hdr.pixel_string(0, 0).unwrap(), "RGB(0.5000, 1.2500, 0.0000)");
}

#[test]
fn constructors_check_channel_counts() {
    assert!(PixelBuffer::rgb8(2, 2, vec![0; 16]).is_err());
    assert!(PixelBuffer::rgba8(2, 2, vec![0; 16]).is_ok());
}

#[test]
fn swizzle_swap_and_extract() {
    let rgba = PixelBuffer::rgba8(1, 1, vec![1, 2, 3, 4]).unwrap();
    let swapped = rgba.clone().swizzled(ChannelSwizzle::SwapRedBlue);
    assert_eq!(swapped.pixel_string(0, 0).unwrap(), "RGBA(3, 2, 1, 4)");

    let alpha = rgba.clone().swizzled(ChannelSwizzle::Alpha);
    assert_eq!(alpha.format(), PixelFormat::Gray8);
    assert_eq!(alpha.pixel_string(0, 0).unwrap(), "L(4)");

    let hdr = PixelBuffer::rgb_f32(1, 1, vec![0.1, 0.2, 0.3]).unwrap();
    let green = hdr.swizzled(ChannelSwizzle::Green);
    assert_eq!(green.format(), PixelFormat::GrayF32);
    assert_eq!(green.pixel_string(0, 0).unwrap(), "L(0.2000)");
}

#[test]
fn identity_swizzle_keeps_memory() {
    let rgba = PixelBuffer::rgba8(1, 1, vec![1, 2, 3, 4]).unwrap();
    let same = rgba.clone().swizzled(ChannelSwizzle::Identity);
    assert!(same.shares_samples_with(&rgba));
}

#[test]
fn rgba8_image_conversion_only_for_8_bit() {
    let gray = PixelBuffer::gray8(1, 1, vec![9]).unwrap();
    let img = gray.to_rgba8_image().unwrap();
    assert_eq!(img.as_raw(), &vec![9, 9, 9, 255]);

    let wide = PixelBuffer::gray16(1, 1, vec![9]).unwrap();
    assert!(wide.to_rgba8_image().is_none());
}

#[test]
fn dynamic_image_export_narrows_gray32() {
    let gray = PixelBuffer::gray32(1, 1, vec![0x1234_5678]).unwrap();
    match gray.to_dynamic_image().unwrap() {
        DynamicImage::ImageLuma16(b) => assert_eq!(b.as_raw(), &vec![0x1234]),
        other => panic!("unexpected layout {:?}", other.color()),
    }
}
