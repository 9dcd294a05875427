use std::sync::Arc;

use crate::{
    foundation::{
        core::FrameFlags,
        error::{FlipbookError, FlipbookResult},
    },
    pixels::{
        bitmap::Bitmap,
        buffer::PixelBuffer,
        raw::{RawBitmap, RawPixels},
    },
};

/// Whether a normalized buffer is independent of the source page.
///
/// `Borrowed` buffers share sample memory with the page; the page lease must then be held for
/// as long as the frame lives. `Owned` buffers allow the lease to be returned immediately.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Storage {
    Owned,
    Borrowed,
}

#[derive(Clone, Debug)]
pub struct Normalized {
    pub pixels: PixelBuffer,
    pub storage: Storage,
    pub flags: FrameFlags,
}

/// Map a raw decoded page onto its canonical representation.
pub fn normalize(raw: &RawBitmap) -> FlipbookResult<Normalized> {
    let (w, h) = (raw.width(), raw.height());
    let (pixels, storage) = match raw.pixels() {
        RawPixels::Indexed { indices, palette } => {
            (expand_palette(w, h, indices, palette)?, Storage::Owned)
        }
        RawPixels::Gray8 {
            samples,
            min_is_white: false,
        } => (PixelBuffer::gray8(w, h, Arc::clone(samples))?, Storage::Borrowed),
        RawPixels::Gray8 {
            samples,
            min_is_white: true,
        } => {
            let inverted: Vec<u8> = samples.iter().map(|&v| u8::MAX - v).collect();
            (PixelBuffer::gray8(w, h, inverted)?, Storage::Owned)
        }
        RawPixels::Gray16(s) => (PixelBuffer::gray16(w, h, Arc::clone(s))?, Storage::Borrowed),
        RawPixels::Gray32(s) => (PixelBuffer::gray32(w, h, Arc::clone(s))?, Storage::Borrowed),
        RawPixels::GrayI16(s) => {
            let promoted: Vec<f32> = s.iter().map(|&v| f32::from(v)).collect();
            (PixelBuffer::gray_f32(w, h, promoted)?, Storage::Owned)
        }
        RawPixels::Rgb8(s) => (PixelBuffer::rgb8(w, h, Arc::clone(s))?, Storage::Borrowed),
        RawPixels::Rgba8(s) => (PixelBuffer::rgba8(w, h, Arc::clone(s))?, Storage::Borrowed),
        RawPixels::Rgb16(s) => (PixelBuffer::rgb_f32(w, h, widen_u16(s))?, Storage::Owned),
        RawPixels::Rgba16(s) => (PixelBuffer::rgba_f32(w, h, widen_u16(s))?, Storage::Owned),
        RawPixels::GrayF32(s) => (PixelBuffer::gray_f32(w, h, Arc::clone(s))?, Storage::Borrowed),
        RawPixels::RgbF32(s) => (PixelBuffer::rgb_f32(w, h, Arc::clone(s))?, Storage::Borrowed),
        RawPixels::RgbaF32(s) => {
            (PixelBuffer::rgba_f32(w, h, Arc::clone(s))?, Storage::Borrowed)
        }
        RawPixels::Cmyk8(_) => {
            return Err(FlipbookError::unsupported_format(
                "cmyk8 has no canonical representation",
            ));
        }
    };

    let format = pixels.format();
    let color = match raw.pixels() {
        RawPixels::Indexed { palette, .. } => !palette.iter().all(|[r, g, b, _]| r == g && g == b),
        _ => format.is_color(),
    };
    let flags = FrameFlags {
        hdr: format.is_hdr(),
        color,
    };
    tracing::trace!(
        raw = raw.pixels().kind(),
        ?format,
        ?storage,
        "normalized page"
    );
    Ok(Normalized {
        pixels,
        storage,
        flags,
    })
}

fn expand_palette(
    w: u32,
    h: u32,
    indices: &[u8],
    palette: &[[u8; 4]],
) -> FlipbookResult<PixelBuffer> {
    let mut out = Vec::with_capacity(indices.len() * 4);
    for &i in indices {
        let entry = palette.get(usize::from(i)).ok_or_else(|| {
            FlipbookError::decode(format!(
                "palette index {i} exceeds palette of {} entries",
                palette.len()
            ))
        })?;
        out.extend_from_slice(entry);
    }
    Ok(PixelBuffer::Rgba8(Bitmap::from_vec(w, h, 4, out)?))
}

fn widen_u16(samples: &[u16]) -> Vec<f32> {
    samples
        .iter()
        .map(|&v| f32::from(v) / f32::from(u16::MAX))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/pixels/normalize.rs"]
mod tests;
