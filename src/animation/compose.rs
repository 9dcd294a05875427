use image::{RgbaImage, imageops};

use crate::{
    animation::blend::over_region,
    cache::entry::{CacheEntry, Frame},
    foundation::{
        core::Disposal,
        error::{FlipbookError, FlipbookResult},
    },
    pixels::buffer::PixelBuffer,
};

/// Largest canvas side compositing will grow to.
pub const MAX_CANVAS_SIDE: u32 = 65_535;

/// Composite `next` on top of `previous` according to `next`'s disposal.
///
/// Returns `None` when the frame should be shown on its own. Only `Leave` builds a canvas;
/// `Previous` and `Unspecified` degrade to `Background`. `previous` is never modified.
pub fn compose(previous: &CacheEntry, next: &Frame) -> FlipbookResult<Option<PixelBuffer>> {
    match next.meta().disposal {
        Disposal::Leave => leave(previous, next).map(Some),
        Disposal::Background | Disposal::Previous | Disposal::Unspecified => Ok(None),
    }
}

fn leave(previous: &CacheEntry, next: &Frame) -> FlipbookResult<PixelBuffer> {
    let base = previous.effective();
    let canvas = base.to_rgba8_image().ok_or_else(|| {
        FlipbookError::compositing(format!(
            "page {} has {:?} pixels; only 8-bit frames can be composited",
            previous.index(),
            base.format()
        ))
    })?;
    let layer = next.pixels().to_rgba8_image().ok_or_else(|| {
        FlipbookError::compositing(format!(
            "page {} has {:?} pixels; only 8-bit frames can be composited",
            next.index(),
            next.pixels().format()
        ))
    })?;

    let meta = next.meta();
    let need_w = padded_side(meta.offset_x, layer.width(), "width")?;
    let need_h = padded_side(meta.offset_y, layer.height(), "height")?;
    let mut canvas = pad_canvas(canvas, need_w, need_h);

    over_region(&mut canvas, &layer, meta.offset_x, meta.offset_y)?;
    tracing::trace!(
        page = next.index(),
        x = meta.offset_x,
        y = meta.offset_y,
        w = canvas.width(),
        h = canvas.height(),
        "composited over previous canvas"
    );
    Ok(PixelBuffer::from_rgba_image(canvas))
}

fn padded_side(offset: u32, size: u32, axis: &str) -> FlipbookResult<u32> {
    offset
        .checked_add(size)
        .filter(|&side| side <= MAX_CANVAS_SIDE)
        .ok_or_else(|| {
            FlipbookError::compositing(format!(
                "canvas {axis} {offset} + {size} exceeds {MAX_CANVAS_SIDE}"
            ))
        })
}

/// Grow `canvas` with transparent pixels so it is at least `w` x `h`.
fn pad_canvas(canvas: RgbaImage, w: u32, h: u32) -> RgbaImage {
    if canvas.width() >= w && canvas.height() >= h {
        return canvas;
    }
    let mut padded = RgbaImage::new(w.max(canvas.width()), h.max(canvas.height()));
    imageops::replace(&mut padded, &canvas, 0, 0);
    padded
}

#[cfg(test)]
#[path = "../../tests/unit/animation/compose.rs"]
mod tests;
