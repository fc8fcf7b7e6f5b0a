use crate::foundation::error::{EaselError, EaselResult};
use crate::raster::bitmap::Bitmap;

/// Separable gaussian blur of a premultiplied bitmap. `radius == 0` returns the input.
pub fn blur_bitmap(src: &Bitmap, radius: u32) -> EaselResult<Bitmap> {
    if radius == 0 || src.width() == 0 || src.height() == 0 {
        return Ok(src.clone());
    }
    // Canvas-style blur radius ~ 2 sigma.
    let sigma = (radius as f32 / 2.0).max(0.5);
    let kernel = gaussian_kernel_q16(radius, sigma)?;

    let (w, h) = (src.width(), src.height());
    let mut tmp = vec![0u8; src.byte_len()];
    let mut out = vec![0u8; src.byte_len()];
    horizontal_pass(src.pixels(), &mut tmp, w, h, &kernel);
    vertical_pass(&tmp, &mut out, w, h, &kernel);
    Bitmap::from_premul(w, h, out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> EaselResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(EaselError::validation("blur sigma must be finite and > 0"));
    }

    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights_f = (-r..=r)
        .map(|i| (-(f64::from(i) * f64::from(i)) / denom).exp())
        .collect::<Vec<_>>();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(EaselError::validation("gaussian kernel sum is zero"));
    }

    let mut weights = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect::<Vec<_>>();

    // Push the rounding residue into the centre tap so the kernel sums to exactly 1.0.
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let mid = weights.len() / 2;
    weights[mid] = (i64::from(weights[mid]) + (65536 - acc)).clamp(0, 65536) as u32;
    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}
