//! Frame sources: where raw pages come from.
//!
//! A source hands out one [`DecodedPage`] per request together with a [`PageLease`]. The
//! player returns the lease as soon as the page has been normalized into independent memory,
//! or keeps it alongside the frame when the normalized buffer aliases the page.

use crate::{
    foundation::{core::AnimationMeta, error::FlipbookResult},
    pixels::raw::RawBitmap,
};

pub mod arena;
pub mod file;
pub mod memory;

pub use arena::{PageArena, PageLease};

/// A page as produced by [`FrameSource::decode_page`].
#[derive(Debug)]
pub struct DecodedPage {
    /// Page the source actually decoded.
    pub index: u32,
    pub bitmap: RawBitmap,
    pub meta: AnimationMeta,
    pub lease: PageLease,
}

/// Random access to the raw pages of a (possibly animated) image.
pub trait FrameSource {
    fn page_count(&self) -> u32;

    /// Decode page `index`. Errors are reported as [`FlipbookError::Decode`](crate::FlipbookError::Decode).
    fn decode_page(&mut self, index: u32) -> FlipbookResult<DecodedPage>;

    fn release_page(&mut self, lease: PageLease);

    /// True when pages carry only changed sub-regions and must be composited in order.
    fn stores_residual_frames(&self) -> bool;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn page_count(&self) -> u32 {
        (**self).page_count()
    }

    fn decode_page(&mut self, index: u32) -> FlipbookResult<DecodedPage> {
        (**self).decode_page(index)
    }

    fn release_page(&mut self, lease: PageLease) {
        (**self).release_page(lease)
    }

    fn stores_residual_frames(&self) -> bool {
        (**self).stores_residual_frames()
    }
}
