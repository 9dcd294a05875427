use std::sync::Arc;

use image::{DynamicImage, ImageBuffer, RgbaImage};

use crate::{
    display::transform::{ChannelSwizzle, Rotation},
    foundation::error::{FlipbookError, FlipbookResult},
    pixels::bitmap::{Bitmap, Sample},
};

/// The canonical in-memory layouts every downstream stage is written against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    Rgba8,
    Rgb8,
    Gray8,
    Gray16,
    Gray32,
    GrayF32,
    RgbF32,
    RgbaF32,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            Self::Rgba8 | Self::RgbaF32 => 4,
            Self::Rgb8 | Self::RgbF32 => 3,
            Self::Gray8 | Self::Gray16 | Self::Gray32 | Self::GrayF32 => 1,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            Self::Rgba8 | Self::Rgb8 | Self::Gray8 => 1,
            Self::Gray16 => 2,
            Self::Gray32 | Self::GrayF32 | Self::RgbF32 | Self::RgbaF32 => 4,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        self.channels() * self.bytes_per_sample()
    }

    /// Floating-point layouts carry high dynamic range and need tone mapping for display.
    pub fn is_hdr(self) -> bool {
        matches!(self, Self::GrayF32 | Self::RgbF32 | Self::RgbaF32)
    }

    pub fn is_color(self) -> bool {
        self.channels() >= 3
    }

    pub fn has_alpha(self) -> bool {
        self.channels() == 4
    }
}

/// A normalized pixel buffer in one of the [`PixelFormat`] layouts.
#[derive(Clone, Debug, PartialEq)]
pub enum PixelBuffer {
    Rgba8(Bitmap<u8>),
    Rgb8(Bitmap<u8>),
    Gray8(Bitmap<u8>),
    Gray16(Bitmap<u16>),
    Gray32(Bitmap<u32>),
    GrayF32(Bitmap<f32>),
    RgbF32(Bitmap<f32>),
    RgbaF32(Bitmap<f32>),
}

macro_rules! with_bitmap {
    ($buf:expr, $b:ident => $body:expr) => {
        match $buf {
            PixelBuffer::Rgba8($b) | PixelBuffer::Rgb8($b) | PixelBuffer::Gray8($b) => $body,
            PixelBuffer::Gray16($b) => $body,
            PixelBuffer::Gray32($b) => $body,
            PixelBuffer::GrayF32($b) | PixelBuffer::RgbF32($b) | PixelBuffer::RgbaF32($b) => $body,
        }
    };
}

macro_rules! map_bitmap {
    ($buf:expr, $b:ident => $body:expr) => {
        match $buf {
            PixelBuffer::Rgba8($b) => PixelBuffer::Rgba8($body),
            PixelBuffer::Rgb8($b) => PixelBuffer::Rgb8($body),
            PixelBuffer::Gray8($b) => PixelBuffer::Gray8($body),
            PixelBuffer::Gray16($b) => PixelBuffer::Gray16($body),
            PixelBuffer::Gray32($b) => PixelBuffer::Gray32($body),
            PixelBuffer::GrayF32($b) => PixelBuffer::GrayF32($body),
            PixelBuffer::RgbF32($b) => PixelBuffer::RgbF32($body),
            PixelBuffer::RgbaF32($b) => PixelBuffer::RgbaF32($body),
        }
    };
}

impl PixelBuffer {
    pub fn rgba8(width: u32, height: u32, samples: impl Into<Arc<Vec<u8>>>) -> FlipbookResult<Self> {
        Bitmap::from_shared(width, height, 4, samples.into()).map(Self::Rgba8)
    }

    pub fn rgb8(width: u32, height: u32, samples: impl Into<Arc<Vec<u8>>>) -> FlipbookResult<Self> {
        Bitmap::from_shared(width, height, 3, samples.into()).map(Self::Rgb8)
    }

    pub fn gray8(width: u32, height: u32, samples: impl Into<Arc<Vec<u8>>>) -> FlipbookResult<Self> {
        Bitmap::from_shared(width, height, 1, samples.into()).map(Self::Gray8)
    }

    pub fn gray16(
        width: u32,
        height: u32,
        samples: impl Into<Arc<Vec<u16>>>,
    ) -> FlipbookResult<Self> {
        Bitmap::from_shared(width, height, 1, samples.into()).map(Self::Gray16)
    }

    pub fn gray32(
        width: u32,
        height: u32,
        samples: impl Into<Arc<Vec<u32>>>,
    ) -> FlipbookResult<Self> {
        Bitmap::from_shared(width, height, 1, samples.into()).map(Self::Gray32)
    }

    pub fn gray_f32(
        width: u32,
        height: u32,
        samples: impl Into<Arc<Vec<f32>>>,
    ) -> FlipbookResult<Self> {
        Bitmap::from_shared(width, height, 1, samples.into()).map(Self::GrayF32)
    }

    pub fn rgb_f32(
        width: u32,
        height: u32,
        samples: impl Into<Arc<Vec<f32>>>,
    ) -> FlipbookResult<Self> {
        Bitmap::from_shared(width, height, 3, samples.into()).map(Self::RgbF32)
    }

    pub fn rgba_f32(
        width: u32,
        height: u32,
        samples: impl Into<Arc<Vec<f32>>>,
    ) -> FlipbookResult<Self> {
        Bitmap::from_shared(width, height, 4, samples.into()).map(Self::RgbaF32)
    }

    pub fn format(&self) -> PixelFormat {
        match self {
            Self::Rgba8(_) => PixelFormat::Rgba8,
            Self::Rgb8(_) => PixelFormat::Rgb8,
            Self::Gray8(_) => PixelFormat::Gray8,
            Self::Gray16(_) => PixelFormat::Gray16,
            Self::Gray32(_) => PixelFormat::Gray32,
            Self::GrayF32(_) => PixelFormat::GrayF32,
            Self::RgbF32(_) => PixelFormat::RgbF32,
            Self::RgbaF32(_) => PixelFormat::RgbaF32,
        }
    }

    pub fn width(&self) -> u32 {
        with_bitmap!(self, b => b.width())
    }

    pub fn height(&self) -> u32 {
        with_bitmap!(self, b => b.height())
    }

    pub fn byte_len(&self) -> usize {
        with_bitmap!(self, b => b.byte_len())
    }

    /// True when both buffers have the same layout and point at the same sample memory.
    pub fn shares_samples_with(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Rgba8(a), Self::Rgba8(b))
            | (Self::Rgb8(a), Self::Rgb8(b))
            | (Self::Gray8(a), Self::Gray8(b)) => a.shares_samples_with(b),
            (Self::Gray16(a), Self::Gray16(b)) => a.shares_samples_with(b),
            (Self::Gray32(a), Self::Gray32(b)) => a.shares_samples_with(b),
            (Self::GrayF32(a), Self::GrayF32(b))
            | (Self::RgbF32(a), Self::RgbF32(b))
            | (Self::RgbaF32(a), Self::RgbaF32(b)) => a.shares_samples_with(b),
            _ => false,
        }
    }

    /// Human-readable value of the pixel at `(x, y)`, e.g. `RGBA(255, 0, 0, 255)`.
    pub fn pixel_string(&self, x: u32, y: u32) -> Option<String> {
        with_bitmap!(self, b => b.pixel(x, y).map(describe_pixel))
    }

    pub fn rotated(&self, rotation: Rotation) -> Self {
        map_bitmap!(self, b => b.rotated(rotation))
    }

    pub fn flip_horizontal(&mut self) {
        with_bitmap!(self, b => b.flip_horizontal())
    }

    pub fn flip_vertical(&mut self) {
        with_bitmap!(self, b => b.flip_vertical())
    }

    pub fn apply_gamma(&mut self, gamma: f64) {
        with_bitmap!(self, b => b.apply_gamma(gamma))
    }

    pub fn swizzled(self, swizzle: ChannelSwizzle) -> Self {
        let channel = match swizzle {
            ChannelSwizzle::Identity => return self,
            ChannelSwizzle::SwapRedBlue => {
                let mut out = self;
                with_bitmap!(&mut out, b => b.swap_channels(0, 2));
                return out;
            }
            ChannelSwizzle::Red => 0,
            ChannelSwizzle::Green => 1,
            ChannelSwizzle::Blue => 2,
            ChannelSwizzle::Alpha => 3,
        };
        match &self {
            Self::Rgba8(b) | Self::Rgb8(b) | Self::Gray8(b) => Self::Gray8(b.extract_channel(channel)),
            Self::Gray16(b) => Self::Gray16(b.extract_channel(channel)),
            Self::Gray32(b) => Self::Gray32(b.extract_channel(channel)),
            Self::GrayF32(b) | Self::RgbF32(b) | Self::RgbaF32(b) => {
                Self::GrayF32(b.extract_channel(channel))
            }
        }
    }

    /// Straight-alpha RGBA8 copy; `None` for layouts wider than 8 bits per sample.
    pub fn to_rgba8_image(&self) -> Option<RgbaImage> {
        let (w, h) = (self.width(), self.height());
        let data = match self {
            Self::Rgba8(b) => b.samples().to_vec(),
            Self::Rgb8(b) => b
                .samples()
                .chunks_exact(3)
                .flat_map(|px| [px[0], px[1], px[2], 255])
                .collect(),
            Self::Gray8(b) => b.samples().iter().flat_map(|&v| [v, v, v, 255]).collect(),
            _ => return None,
        };
        RgbaImage::from_raw(w, h, data)
    }

    pub fn from_rgba_image(img: RgbaImage) -> Self {
        let (w, h) = img.dimensions();
        Self::Rgba8(Bitmap::from_parts(w, h, 4, img.into_raw()))
    }

    /// Convert into an `image` crate buffer for encoding. Gray32 is narrowed to 16 bits and
    /// float gray is widened to float RGB, the closest layouts `image` offers.
    pub fn to_dynamic_image(&self) -> FlipbookResult<DynamicImage> {
        let (w, h) = (self.width(), self.height());
        let img = match self {
            Self::Rgba8(b) => {
                ImageBuffer::from_raw(w, h, b.samples().to_vec()).map(DynamicImage::ImageRgba8)
            }
            Self::Rgb8(b) => {
                ImageBuffer::from_raw(w, h, b.samples().to_vec()).map(DynamicImage::ImageRgb8)
            }
            Self::Gray8(b) => {
                ImageBuffer::from_raw(w, h, b.samples().to_vec()).map(DynamicImage::ImageLuma8)
            }
            Self::Gray16(b) => {
                ImageBuffer::from_raw(w, h, b.samples().to_vec()).map(DynamicImage::ImageLuma16)
            }
            Self::Gray32(b) => {
                let narrowed = b.samples().iter().map(|&v| (v >> 16) as u16).collect();
                ImageBuffer::from_raw(w, h, narrowed).map(DynamicImage::ImageLuma16)
            }
            Self::GrayF32(b) => {
                let widened = b.samples().iter().flat_map(|&v| [v, v, v]).collect();
                ImageBuffer::from_raw(w, h, widened).map(DynamicImage::ImageRgb32F)
            }
            Self::RgbF32(b) => {
                ImageBuffer::from_raw(w, h, b.samples().to_vec()).map(DynamicImage::ImageRgb32F)
            }
            Self::RgbaF32(b) => {
                ImageBuffer::from_raw(w, h, b.samples().to_vec()).map(DynamicImage::ImageRgba32F)
            }
        };
        img.ok_or_else(|| {
            FlipbookError::validation(format!("buffer {w}x{h} does not match its sample count"))
        })
    }
}

fn describe_pixel<T: Sample>(px: &[T]) -> String {
    let label = match px.len() {
        1 => "L",
        3 => "RGB",
        _ => "RGBA",
    };
    let values: Vec<String> = px.iter().map(|v| v.format()).collect();
    format!("{label}({})", values.join(", "))
}

#[cfg(test)]
#[path = "../../tests/unit/pixels/buffer.rs"]
mod tests;
