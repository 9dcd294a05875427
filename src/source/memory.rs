use crate::{
    foundation::{
        core::AnimationMeta,
        error::{FlipbookError, FlipbookResult},
    },
    pixels::raw::RawBitmap,
    source::{DecodedPage, FrameSource, PageArena, PageLease},
};

/// Pages that are already decoded and held in memory.
///
/// Handing out a page clones the reference-counted samples, so normalized frames built from
/// it alias this source's storage.
#[derive(Debug, Default)]
pub struct MemorySource {
    pages: Vec<(RawBitmap, AnimationMeta)>,
    residual: bool,
    arena: PageArena,
}

impl MemorySource {
    pub fn new(residual: bool) -> Self {
        Self {
            residual,
            ..Self::default()
        }
    }

    pub fn with_page(mut self, bitmap: RawBitmap, meta: AnimationMeta) -> Self {
        self.push_page(bitmap, meta);
        self
    }

    pub fn push_page(&mut self, bitmap: RawBitmap, meta: AnimationMeta) {
        self.pages.push((bitmap, meta));
    }

    pub fn outstanding_pages(&self) -> usize {
        self.arena.outstanding()
    }

    pub fn is_page_locked(&self, index: u32) -> bool {
        self.arena.is_locked(index)
    }
}

impl FrameSource for MemorySource {
    fn page_count(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
    }

    fn decode_page(&mut self, index: u32) -> FlipbookResult<DecodedPage> {
        let (bitmap, meta) = self.pages.get(index as usize).ok_or_else(|| {
            FlipbookError::decode(format!(
                "page {index} out of range ({} pages)",
                self.pages.len()
            ))
        })?;
        Ok(DecodedPage {
            index,
            bitmap: bitmap.clone(),
            meta: *meta,
            lease: self.arena.lock(index),
        })
    }

    fn release_page(&mut self, lease: PageLease) {
        self.arena.release(lease);
    }

    fn stores_residual_frames(&self) -> bool {
        self.residual
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/memory.rs"]
mod tests;
