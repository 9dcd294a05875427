use std::{io::Cursor, path::Path, sync::Arc};

use anyhow::Context as _;
use image::{
    AnimationDecoder, DynamicImage, Frames, ImageError, ImageFormat,
    codecs::{gif::GifDecoder, png::PngDecoder, webp::WebPDecoder},
};

use crate::{
    foundation::{
        core::{AnimationMeta, Disposal},
        error::{FlipbookError, FlipbookResult},
    },
    pixels::raw::{RawBitmap, RawPixels},
    source::{DecodedPage, FrameSource, PageArena, PageLease},
};

/// An encoded image file decoded on demand with the `image` crate.
///
/// Animated GIF, APNG and animated WebP expose one page per animation frame. The encoded
/// bytes stay in memory and a single forward decoder is kept between requests: asking for
/// the same or a later page resumes it, asking for an earlier page restarts it from the
/// first frame. `image` already composites animation frames onto the full canvas, so this
/// source never reports residual frames.
///
/// The resumable decoder is not `Send`, so neither is this source.
pub struct FileSource {
    bytes: Arc<[u8]>,
    format: ImageFormat,
    animated: bool,
    page_count: u32,
    decoder: Option<FrameCursor>,
    frames_read: u64,
    arena: PageArena,
}

/// Animation decoder positioned just before frame `next_index`.
struct FrameCursor {
    frames: Frames<'static>,
    next_index: u32,
}

impl FileSource {
    pub fn open(path: &Path) -> FlipbookResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        Self::from_bytes(bytes)
    }

    #[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn from_bytes(bytes: Vec<u8>) -> FlipbookResult<Self> {
        let format = image::guess_format(&bytes).map_err(codec_error("guess image format"))?;
        let animated = detect_animation(&bytes, format)?;
        let mut out = Self {
            bytes: bytes.into(),
            format,
            animated,
            page_count: 1,
            decoder: None,
            frames_read: 0,
            arena: PageArena::new(),
        };
        if animated {
            out.page_count = out.count_frames()?;
        }
        tracing::debug!(?format, animated, pages = out.page_count, "opened image");
        Ok(out)
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn is_animated(&self) -> bool {
        self.animated
    }

    pub fn outstanding_pages(&self) -> usize {
        self.arena.outstanding()
    }

    /// Animation frames pulled from the decoder by page requests, skipped ones included.
    /// The page count taken at open time is not part of it.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    fn animation_frames(&self) -> FlipbookResult<Frames<'static>> {
        let reader = Cursor::new(Arc::clone(&self.bytes));
        let frames = match self.format {
            ImageFormat::Gif => GifDecoder::new(reader)
                .map_err(codec_error("open gif"))?
                .into_frames(),
            ImageFormat::Png => PngDecoder::new(reader)
                .and_then(PngDecoder::apng)
                .map_err(codec_error("open apng"))?
                .into_frames(),
            ImageFormat::WebP => WebPDecoder::new(reader)
                .map_err(codec_error("open webp"))?
                .into_frames(),
            other => {
                return Err(FlipbookError::decode(format!(
                    "{other:?} has no animation support"
                )));
            }
        };
        Ok(frames)
    }

    /// One pass over the animation; each frame is dropped as soon as it is counted.
    fn count_frames(&self) -> FlipbookResult<u32> {
        let mut count = 0u32;
        for frame in self.animation_frames()? {
            frame.map_err(codec_error("decode animation frame"))?;
            count += 1;
        }
        if count == 0 {
            return Err(FlipbookError::decode("animation has no frames"));
        }
        Ok(count)
    }

    fn decode_animation_page(&mut self, index: u32) -> FlipbookResult<(RawBitmap, AnimationMeta)> {
        let mut cursor = match self.decoder.take() {
            Some(cursor) if cursor.next_index <= index => cursor,
            stale => {
                if let Some(c) = stale {
                    tracing::debug!(index, at = c.next_index, "restarting animation decoder");
                }
                FrameCursor {
                    frames: self.animation_frames()?,
                    next_index: 0,
                }
            }
        };

        let skip = index - cursor.next_index;
        self.frames_read += u64::from(skip) + 1;
        // A failed frame drops the cursor; the next request starts over.
        let frame = cursor
            .frames
            .nth(skip as usize)
            .ok_or_else(|| FlipbookError::decode(format!("page {index} missing from animation")))?
            .map_err(codec_error("decode animation frame"))?;
        cursor.next_index = index + 1;
        self.decoder = Some(cursor);

        let (numer, denom) = frame.delay().numer_denom_ms();
        let meta = AnimationMeta {
            offset_x: frame.left(),
            offset_y: frame.top(),
            duration_ms: numer / denom.max(1),
            disposal: Disposal::Unspecified,
        };
        let buffer = frame.into_buffer();
        let (w, h) = buffer.dimensions();
        let bitmap = RawBitmap::new(w, h, RawPixels::Rgba8(Arc::new(buffer.into_raw())))?;
        Ok((bitmap, meta))
    }

    fn decode_still(&self) -> FlipbookResult<(RawBitmap, AnimationMeta)> {
        let img = image::load_from_memory_with_format(&self.bytes, self.format)
            .map_err(codec_error("decode image"))?;
        Ok((raw_from_dynamic(img)?, AnimationMeta::default()))
    }
}

impl FrameSource for FileSource {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn decode_page(&mut self, index: u32) -> FlipbookResult<DecodedPage> {
        if index >= self.page_count {
            return Err(FlipbookError::decode(format!(
                "page {index} out of range ({} pages)",
                self.page_count
            )));
        }
        let (bitmap, meta) = if self.animated {
            self.decode_animation_page(index)?
        } else {
            self.decode_still()?
        };
        Ok(DecodedPage {
            index,
            bitmap,
            meta,
            lease: self.arena.lock(index),
        })
    }

    fn release_page(&mut self, lease: PageLease) {
        self.arena.release(lease);
    }

    fn stores_residual_frames(&self) -> bool {
        false
    }
}

fn detect_animation(bytes: &[u8], format: ImageFormat) -> FlipbookResult<bool> {
    let reader = Cursor::new(bytes);
    let animated = match format {
        ImageFormat::Gif => true,
        ImageFormat::Png => PngDecoder::new(reader)
            .and_then(|d| d.is_apng())
            .map_err(codec_error("probe png"))?,
        ImageFormat::WebP => WebPDecoder::new(reader)
            .map_err(codec_error("probe webp"))?
            .has_animation(),
        _ => false,
    };
    Ok(animated)
}

/// Map a decoded still image onto the matching raw layout without converting samples.
fn raw_from_dynamic(img: DynamicImage) -> FlipbookResult<RawBitmap> {
    let (w, h) = (img.width(), img.height());
    let pixels = match img {
        DynamicImage::ImageLuma8(b) => RawPixels::Gray8 {
            samples: Arc::new(b.into_raw()),
            min_is_white: false,
        },
        DynamicImage::ImageLuma16(b) => RawPixels::Gray16(Arc::new(b.into_raw())),
        DynamicImage::ImageRgb8(b) => RawPixels::Rgb8(Arc::new(b.into_raw())),
        DynamicImage::ImageRgba8(b) => RawPixels::Rgba8(Arc::new(b.into_raw())),
        DynamicImage::ImageRgb16(b) => RawPixels::Rgb16(Arc::new(b.into_raw())),
        DynamicImage::ImageRgba16(b) => RawPixels::Rgba16(Arc::new(b.into_raw())),
        DynamicImage::ImageRgb32F(b) => RawPixels::RgbF32(Arc::new(b.into_raw())),
        DynamicImage::ImageRgba32F(b) => RawPixels::RgbaF32(Arc::new(b.into_raw())),
        // Gray+alpha has no raw counterpart.
        other => RawPixels::Rgba8(Arc::new(other.to_rgba8().into_raw())),
    };
    RawBitmap::new(w, h, pixels)
}

fn codec_error(what: &'static str) -> impl Fn(ImageError) -> FlipbookError {
    move |e| FlipbookError::decode(format!("{what}: {e}"))
}

#[cfg(test)]
#[path = "../../tests/unit/source/file.rs"]
mod tests;
