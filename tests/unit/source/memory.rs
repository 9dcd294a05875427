use super::*;
use crate::foundation::core::Disposal;

fn source() -> MemorySource {
    MemorySource::new(true)
        .with_page(
            RawBitmap::gray8(1, 1, vec![10]).unwrap(),
            AnimationMeta::default(),
        )
        .with_page(
            RawBitmap::gray8(1, 1, vec![20]).unwrap(),
            AnimationMeta::default()
                .with_offset(1, 2)
                .with_disposal(Disposal::Leave)
                .with_duration_ms(40),
        )
}

#[test]
fn decode_hands_out_pages_and_leases() {
    let mut src = source();
    assert_eq!(src.page_count(), 2);
    assert!(src.stores_residual_frames());

    let page = src.decode_page(1).unwrap();
    assert_eq!(page.index, 1);
    assert_eq!(page.meta.offset_x, 1);
    assert_eq!(page.meta.disposal, Disposal::Leave);
    assert_eq!(page.meta.duration_ms, 40);
    assert!(src.is_page_locked(1));

    src.release_page(page.lease);
    assert_eq!(src.outstanding_pages(), 0);
}

#[test]
fn out_of_range_page_is_a_decode_failure() {
    let mut src = source();
    assert!(matches!(src.decode_page(2), Err(FlipbookError::Decode(_))));
    assert_eq!(src.outstanding_pages(), 0);
}

#[test]
fn boxed_source_delegates() {
    let mut boxed: Box<dyn FrameSource> = Box::new(source());
    assert_eq!(boxed.page_count(), 2);
    let page = boxed.decode_page(0).unwrap();
    boxed.release_page(page.lease);
}
