use std::sync::Arc;

use crate::foundation::error::{FlipbookError, FlipbookResult};

/// Pixel layouts a decoder may hand over before normalization.
///
/// Samples are reference-counted so a normalized frame can alias them without copying.
#[derive(Clone, Debug, PartialEq)]
pub enum RawPixels {
    /// One palette index per pixel; palette entries are straight RGBA.
    Indexed {
        indices: Arc<Vec<u8>>,
        palette: Arc<Vec<[u8; 4]>>,
    },
    /// 8-bit gray. `min_is_white` marks inverted photometric polarity.
    Gray8 {
        samples: Arc<Vec<u8>>,
        min_is_white: bool,
    },
    Gray16(Arc<Vec<u16>>),
    Gray32(Arc<Vec<u32>>),
    /// Signed 16-bit gray (elevation maps, scientific data).
    GrayI16(Arc<Vec<i16>>),
    Rgb8(Arc<Vec<u8>>),
    Rgba8(Arc<Vec<u8>>),
    Rgb16(Arc<Vec<u16>>),
    Rgba16(Arc<Vec<u16>>),
    GrayF32(Arc<Vec<f32>>),
    RgbF32(Arc<Vec<f32>>),
    RgbaF32(Arc<Vec<f32>>),
    Cmyk8(Arc<Vec<u8>>),
}

impl RawPixels {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Indexed { .. } => "indexed",
            Self::Gray8 { .. } => "gray8",
            Self::Gray16(_) => "gray16",
            Self::Gray32(_) => "gray32",
            Self::GrayI16(_) => "gray_i16",
            Self::Rgb8(_) => "rgb8",
            Self::Rgba8(_) => "rgba8",
            Self::Rgb16(_) => "rgb16",
            Self::Rgba16(_) => "rgba16",
            Self::GrayF32(_) => "gray_f32",
            Self::RgbF32(_) => "rgb_f32",
            Self::RgbaF32(_) => "rgba_f32",
            Self::Cmyk8(_) => "cmyk8",
        }
    }

    pub fn samples_per_pixel(&self) -> usize {
        match self {
            Self::Indexed { .. }
            | Self::Gray8 { .. }
            | Self::Gray16(_)
            | Self::Gray32(_)
            | Self::GrayI16(_)
            | Self::GrayF32(_) => 1,
            Self::Rgb8(_) | Self::Rgb16(_) | Self::RgbF32(_) => 3,
            Self::Rgba8(_) | Self::Rgba16(_) | Self::RgbaF32(_) | Self::Cmyk8(_) => 4,
        }
    }

    fn sample_count(&self) -> usize {
        match self {
            Self::Indexed { indices, .. } => indices.len(),
            Self::Gray8 { samples, .. } => samples.len(),
            Self::Gray16(s) | Self::Rgb16(s) | Self::Rgba16(s) => s.len(),
            Self::Gray32(s) => s.len(),
            Self::GrayI16(s) => s.len(),
            Self::Rgb8(s) | Self::Rgba8(s) | Self::Cmyk8(s) => s.len(),
            Self::GrayF32(s) | Self::RgbF32(s) | Self::RgbaF32(s) => s.len(),
        }
    }
}

/// One decoded page exactly as the source produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct RawBitmap {
    width: u32,
    height: u32,
    pixels: RawPixels,
}

impl RawBitmap {
    pub fn new(width: u32, height: u32, pixels: RawPixels) -> FlipbookResult<Self> {
        if width == 0 || height == 0 {
            return Err(FlipbookError::decode(format!(
                "{} page has zero dimension: {width}x{height}",
                pixels.kind()
            )));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(pixels.samples_per_pixel()))
            .ok_or_else(|| FlipbookError::decode("page dimensions overflow"))?;
        if pixels.sample_count() != expected {
            return Err(FlipbookError::decode(format!(
                "{} page {width}x{height} expects {expected} samples, got {}",
                pixels.kind(),
                pixels.sample_count()
            )));
        }
        if let RawPixels::Indexed { palette, .. } = &pixels
            && (palette.is_empty() || palette.len() > 256)
        {
            return Err(FlipbookError::decode(format!(
                "palette must hold 1..=256 entries, got {}",
                palette.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn rgba8(width: u32, height: u32, samples: Vec<u8>) -> FlipbookResult<Self> {
        Self::new(width, height, RawPixels::Rgba8(Arc::new(samples)))
    }

    pub fn gray8(width: u32, height: u32, samples: Vec<u8>) -> FlipbookResult<Self> {
        Self::new(
            width,
            height,
            RawPixels::Gray8 {
                samples: Arc::new(samples),
                min_is_white: false,
            },
        )
    }

    pub fn indexed(
        width: u32,
        height: u32,
        indices: Vec<u8>,
        palette: Vec<[u8; 4]>,
    ) -> FlipbookResult<Self> {
        Self::new(
            width,
            height,
            RawPixels::Indexed {
                indices: Arc::new(indices),
                palette: Arc::new(palette),
            },
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &RawPixels {
        &self.pixels
    }
}
