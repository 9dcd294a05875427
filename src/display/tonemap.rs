use crate::{
    display::transform::ToneMapMode,
    pixels::{
        bitmap::{Bitmap, color_channels},
        buffer::PixelBuffer,
    },
};

const REINHARD_KEY: f64 = 0.18;
const DRAGO_BIAS: f64 = 0.85;
/// Keeps `ln` finite on black pixels when averaging luminance.
const LOG_DELTA: f64 = 1e-6;

/// Map a floating point buffer to the 8-bit layout with the same channels.
///
/// Integer buffers are returned as-is (sharing memory). Non-finite and negative samples are
/// treated as black; alpha is clamped, never tone mapped.
pub fn tone_map(pixels: &PixelBuffer, mode: ToneMapMode) -> PixelBuffer {
    match pixels {
        PixelBuffer::GrayF32(b) => PixelBuffer::Gray8(map_bitmap(b, mode)),
        PixelBuffer::RgbF32(b) => PixelBuffer::Rgb8(map_bitmap(b, mode)),
        PixelBuffer::RgbaF32(b) => PixelBuffer::Rgba8(map_bitmap(b, mode)),
        other => other.clone(),
    }
}

fn map_bitmap(src: &Bitmap<f32>, mode: ToneMapMode) -> Bitmap<u8> {
    let c = src.channels();
    let color = color_channels(c);

    // One luminance per pixel, shared by the luminance-driven operators.
    let lum: Vec<f64> = src
        .samples()
        .chunks_exact(c)
        .map(|px| luminance(&px[..color]))
        .collect();

    let scale: Box<dyn Fn(f64, f64) -> f64> = match mode {
        ToneMapMode::Clamp => Box::new(|v: f64, _: f64| v),
        ToneMapMode::Linear => {
            let peak = src
                .samples()
                .chunks_exact(c)
                .flat_map(|px| px[..color].iter().map(|&v| sanitize(v)))
                .fold(0.0f64, f64::max);
            if peak > 0.0 {
                Box::new(move |v: f64, _: f64| v / peak)
            } else {
                Box::new(|_: f64, _: f64| 0.0)
            }
        }
        ToneMapMode::Reinhard => {
            let exposure = REINHARD_KEY / log_average(&lum);
            Box::new(move |v: f64, l: f64| {
                if l <= 0.0 {
                    return 0.0;
                }
                let ls = exposure * l;
                v * (ls / (1.0 + ls)) / l
            })
        }
        ToneMapMode::Drago => {
            let adapt = log_average(&lum);
            let l_max = lum.iter().copied().fold(0.0f64, f64::max) / adapt;
            let norm = 1.0 / (l_max + 1.0).log10().max(f64::EPSILON);
            let bias_exp = DRAGO_BIAS.ln() / 0.5f64.ln();
            Box::new(move |v: f64, l: f64| {
                if l <= 0.0 || l_max <= 0.0 {
                    return 0.0;
                }
                let lw = l / adapt;
                let ld = norm * (lw + 1.0).ln()
                    / (2.0 + 8.0 * (lw / l_max).powf(bias_exp)).ln();
                v * ld / l
            })
        }
    };

    let mut out = Vec::with_capacity(src.samples().len());
    for (px, &l) in src.samples().chunks_exact(c).zip(&lum) {
        for &v in &px[..color] {
            out.push(to_u8(scale(sanitize(v), l)));
        }
        if c == 4 {
            out.push(to_u8(sanitize(px[3])));
        }
    }
    Bitmap::from_parts(src.width(), src.height(), c, out)
}

fn sanitize(v: f32) -> f64 {
    let v = f64::from(v);
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

/// BT.709 relative luminance; a single channel is its own luminance.
fn luminance(color: &[f32]) -> f64 {
    match color {
        [r, g, b] => 0.2126 * sanitize(*r) + 0.7152 * sanitize(*g) + 0.0722 * sanitize(*b),
        [v] => sanitize(*v),
        _ => 0.0,
    }
}

fn log_average(lum: &[f64]) -> f64 {
    if lum.is_empty() {
        return 1.0;
    }
    let sum: f64 = lum.iter().map(|&l| (l + LOG_DELTA).ln()).sum();
    (sum / lum.len() as f64).exp()
}

fn to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/display/tonemap.rs"]
mod tests;
