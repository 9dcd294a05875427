use image::RgbaImage;

use crate::foundation::error::{FlipbookError, FlipbookResult};

pub type Rgba8 = [u8; 4];

/// Source-over for straight (non-premultiplied) alpha, in integer math so replays are
/// bit-identical.
pub fn over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    let sa = u16::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let inv = 255u16 - sa;
    let da = u16::from(mul_div255(u16::from(dst[3]), inv));
    let out_a = sa + da;
    if out_a == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    out[3] = out_a as u8;
    for i in 0..3 {
        let num = u32::from(src[i]) * u32::from(sa) + u32::from(dst[i]) * u32::from(da);
        out[i] = ((num + u32::from(out_a) / 2) / u32::from(out_a)).min(255) as u8;
    }
    out
}

/// Blend `layer` onto `canvas` with its top-left corner at `(x, y)`.
///
/// The layer must fit inside the canvas.
pub fn over_region(canvas: &mut RgbaImage, layer: &RgbaImage, x: u32, y: u32) -> FlipbookResult<()> {
    let fits_w = x.checked_add(layer.width()).is_some_and(|r| r <= canvas.width());
    let fits_h = y.checked_add(layer.height()).is_some_and(|b| b <= canvas.height());
    if !fits_w || !fits_h {
        return Err(FlipbookError::compositing(format!(
            "layer {}x{} at ({x}, {y}) exceeds canvas {}x{}",
            layer.width(),
            layer.height(),
            canvas.width(),
            canvas.height()
        )));
    }
    for (lx, ly, px) in layer.enumerate_pixels() {
        let dst = canvas.get_pixel_mut(x + lx, y + ly);
        dst.0 = over(dst.0, px.0);
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/animation/blend.rs"]
mod tests;
