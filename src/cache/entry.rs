use crate::{
    foundation::core::{AnimationMeta, FrameFlags},
    pixels::{
        buffer::PixelBuffer,
        normalize::{Normalized, Storage},
    },
    source::PageLease,
};

/// A normalized page with its animation metadata.
///
/// A frame whose pixels alias the source page holds the page lease; see
/// [`Frame::is_borrowed`].
#[derive(Debug)]
pub struct Frame {
    index: u32,
    pixels: PixelBuffer,
    flags: FrameFlags,
    meta: AnimationMeta,
    lease: Option<PageLease>,
}

impl Frame {
    /// `lease` must be `Some` exactly when `normalized.storage` is [`Storage::Borrowed`].
    pub(crate) fn new(
        index: u32,
        normalized: Normalized,
        meta: AnimationMeta,
        lease: Option<PageLease>,
    ) -> Self {
        debug_assert_eq!(lease.is_some(), normalized.storage == Storage::Borrowed);
        Self {
            index,
            pixels: normalized.pixels,
            flags: normalized.flags,
            meta,
            lease,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn flags(&self) -> FrameFlags {
        self.flags
    }

    pub fn meta(&self) -> &AnimationMeta {
        &self.meta
    }

    /// True when the pixels share memory with a still-locked source page.
    pub fn is_borrowed(&self) -> bool {
        self.lease.is_some()
    }

    pub(crate) fn take_lease(&mut self) -> Option<PageLease> {
        self.lease.take()
    }
}

/// One slot of the frame window: a frame plus the canvas compositing produced for it.
#[derive(Debug)]
pub struct CacheEntry {
    frame: Frame,
    composited: Option<PixelBuffer>,
}

impl CacheEntry {
    pub(crate) fn new(frame: Frame, composited: Option<PixelBuffer>) -> Self {
        Self { frame, composited }
    }

    pub fn index(&self) -> u32 {
        self.frame.index
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn composited(&self) -> Option<&PixelBuffer> {
        self.composited.as_ref()
    }

    pub fn is_composited(&self) -> bool {
        self.composited.is_some()
    }

    /// What should be displayed: the composited canvas when there is one.
    pub fn effective(&self) -> &PixelBuffer {
        self.composited.as_ref().unwrap_or(&self.frame.pixels)
    }

    pub fn memory_size(&self) -> usize {
        self.effective().byte_len()
    }

    pub(crate) fn into_lease(mut self) -> Option<PageLease> {
        self.frame.take_lease()
    }
}
