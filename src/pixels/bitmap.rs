use std::sync::Arc;

use crate::{
    display::transform::Rotation,
    foundation::error::{FlipbookError, FlipbookResult},
};

/// A channel sample type usable in canonical pixel buffers.
pub trait Sample: Copy + Default + PartialEq + std::fmt::Debug + Send + Sync + 'static {
    /// Full-scale value (`1.0` for floats).
    const MAX: Self;

    /// Value relative to full scale. Floats are returned as-is and may exceed `1.0`.
    fn to_unit(self) -> f64;

    /// Inverse of [`Sample::to_unit`]; integer types clamp to `0..=1` and round.
    fn from_unit(v: f64) -> Self;

    fn format(self) -> String;
}

macro_rules! int_sample {
    ($t:ty) => {
        impl Sample for $t {
            const MAX: Self = <$t>::MAX;

            fn to_unit(self) -> f64 {
                f64::from(self) / f64::from(<$t>::MAX)
            }

            fn from_unit(v: f64) -> Self {
                let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
                (v * f64::from(<$t>::MAX)).round() as $t
            }

            fn format(self) -> String {
                self.to_string()
            }
        }
    };
}

int_sample!(u8);
int_sample!(u16);
int_sample!(u32);

impl Sample for f32 {
    const MAX: Self = 1.0;

    fn to_unit(self) -> f64 {
        f64::from(self)
    }

    fn from_unit(v: f64) -> Self {
        v as f32
    }

    fn format(self) -> String {
        format!("{self:.4}")
    }
}

/// Interleaved, row-major pixel storage with copy-on-write sample memory.
///
/// Cloning a bitmap shares its samples; the first mutation through [`Bitmap::samples_mut`]
/// detaches the clone. This is what lets a normalized frame alias the decoded source page and
/// lets the display pipeline skip copies for stages that are no-ops.
#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap<T> {
    width: u32,
    height: u32,
    channels: usize,
    samples: Arc<Vec<T>>,
}

impl<T: Sample> Bitmap<T> {
    pub fn filled(width: u32, height: u32, channels: usize, value: T) -> Self {
        let len = (width as usize) * (height as usize) * channels;
        Self {
            width,
            height,
            channels,
            samples: Arc::new(vec![value; len]),
        }
    }

    pub fn from_vec(width: u32, height: u32, channels: usize, samples: Vec<T>) -> FlipbookResult<Self> {
        Self::from_shared(width, height, channels, Arc::new(samples))
    }

    /// Wrap existing sample memory without copying it.
    pub fn from_shared(
        width: u32,
        height: u32,
        channels: usize,
        samples: Arc<Vec<T>>,
    ) -> FlipbookResult<Self> {
        let expected = expected_len(width, height, channels)?;
        if samples.len() != expected {
            return Err(FlipbookError::validation(format!(
                "bitmap {width}x{height}x{channels} expects {expected} samples, got {}",
                samples.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    /// Caller guarantees `samples.len() == width * height * channels`.
    pub(crate) fn from_parts(width: u32, height: u32, channels: usize, samples: Vec<T>) -> Self {
        debug_assert_eq!(
            samples.len(),
            (width as usize) * (height as usize) * channels
        );
        Self {
            width,
            height,
            channels,
            samples: Arc::new(samples),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    pub fn shared_samples(&self) -> &Arc<Vec<T>> {
        &self.samples
    }

    pub fn shares_samples_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.samples, &other.samples)
    }

    pub fn byte_len(&self) -> usize {
        self.samples.len() * std::mem::size_of::<T>()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<&[T]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some(&self.samples[i..i + self.channels])
    }

    /// Mutable samples, detaching from any shared memory first.
    pub fn samples_mut(&mut self) -> &mut [T] {
        Arc::make_mut(&mut self.samples).as_mut_slice()
    }

    pub fn rotated(&self, rotation: Rotation) -> Self {
        if rotation == Rotation::Deg0 {
            return self.clone();
        }
        let (dw, dh) = rotation.display_dimensions(self.width, self.height);
        let c = self.channels;
        let mut out = Vec::with_capacity(self.samples.len());
        for dy in 0..dh {
            for dx in 0..dw {
                let (sx, sy) = rotation.source_coords(dx, dy, self.width, self.height);
                let i = self.offset(sx, sy);
                out.extend_from_slice(&self.samples[i..i + c]);
            }
        }
        Self::from_parts(dw, dh, c, out)
    }

    pub fn flip_horizontal(&mut self) {
        let (w, c) = (self.width as usize, self.channels);
        for row in self.samples_mut().chunks_exact_mut(w * c) {
            for x in 0..w / 2 {
                let (a, b) = (x * c, (w - 1 - x) * c);
                for k in 0..c {
                    row.swap(a + k, b + k);
                }
            }
        }
    }

    pub fn flip_vertical(&mut self) {
        let (h, row_len) = (self.height as usize, self.width as usize * self.channels);
        let data = self.samples_mut();
        for y in 0..h / 2 {
            let (top, bottom) = data.split_at_mut((h - 1 - y) * row_len);
            top[y * row_len..(y + 1) * row_len].swap_with_slice(&mut bottom[..row_len]);
        }
    }

    /// `out = MAX * (in / MAX)^(1 / gamma)` on color channels; alpha is left alone.
    pub fn apply_gamma(&mut self, gamma: f64) {
        let exponent = 1.0 / gamma;
        let color = color_channels(self.channels);
        let c = self.channels;
        for px in self.samples_mut().chunks_exact_mut(c) {
            for v in &mut px[..color] {
                *v = T::from_unit(v.to_unit().max(0.0).powf(exponent));
            }
        }
    }

    pub fn swap_channels(&mut self, a: usize, b: usize) {
        if a >= self.channels || b >= self.channels || a == b {
            return;
        }
        let c = self.channels;
        for px in self.samples_mut().chunks_exact_mut(c) {
            px.swap(a, b);
        }
    }

    /// Single-channel bitmap holding `channel`.
    ///
    /// A gray bitmap answers every color channel with itself; a channel the bitmap does not
    /// carry (alpha on RGB or gray) reads as full scale.
    pub fn extract_channel(&self, channel: usize) -> Self {
        if self.channels == 1 && channel < 3 {
            return self.clone();
        }
        if channel >= self.channels {
            return Self::filled(self.width, self.height, 1, T::MAX);
        }
        let out = self
            .samples
            .chunks_exact(self.channels)
            .map(|px| px[channel])
            .collect();
        Self::from_parts(self.width, self.height, 1, out)
    }

    pub fn convert<U: Sample>(&self, f: impl Fn(T) -> U) -> Bitmap<U> {
        Bitmap::from_parts(
            self.width,
            self.height,
            self.channels,
            self.samples.iter().map(|&v| f(v)).collect(),
        )
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * self.channels
    }
}

/// Number of leading color channels; a fourth channel is alpha.
pub(crate) fn color_channels(channels: usize) -> usize {
    if channels == 4 { 3 } else { channels }
}

fn expected_len(width: u32, height: u32, channels: usize) -> FlipbookResult<usize> {
    if width == 0 || height == 0 {
        return Err(FlipbookError::validation(format!(
            "bitmap has zero dimension: {width}x{height}"
        )));
    }
    if !matches!(channels, 1 | 3 | 4) {
        return Err(FlipbookError::validation(format!(
            "bitmap channel count must be 1, 3 or 4, got {channels}"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels))
        .ok_or_else(|| FlipbookError::validation("bitmap dimensions overflow"))
}

#[cfg(test)]
#[path = "../../tests/unit/pixels/bitmap.rs"]
mod tests;
