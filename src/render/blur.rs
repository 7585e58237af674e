//! Gaussian blur used for shape glow.
//!
//! A glowing recipe draws a blurred copy of its instances beneath the crisp
//! pass. The blur is a separable gaussian over premultiplied RGBA8 with a
//! fixed-point (q16) kernel, clamped at the buffer edges.

use crate::foundation::core::Frame;
use crate::foundation::error::{ScatterwallError, ScatterwallResult};

/// Blur `src` with a gaussian of the given pixel radius.
///
/// Radius 0 returns an identical copy. Sigma is derived from the radius
/// (`radius / 2`), which tracks how canvas-style shadow blurs read visually.
pub fn gaussian_blur(src: &Frame, radius: u32) -> ScatterwallResult<Frame> {
    if radius == 0 {
        return Ok(src.clone());
    }

    let kernel = gaussian_kernel_q16(radius, radius as f32 / 2.0)?;
    let mut tmp = Frame::transparent(src.size());
    let mut out = Frame::transparent(src.size());

    separable_pass(src, &mut tmp, &kernel, Axis::Horizontal);
    separable_pass(&tmp, &mut out, &kernel, Axis::Vertical);
    Ok(out)
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> ScatterwallResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(ScatterwallError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }

    // Quantize to q16 and push any rounding drift into the center tap so the
    // kernel sums to exactly 1.0.
    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let mid_val = i64::from(weights[mid]);
        weights[mid] = (mid_val + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

fn separable_pass(src: &Frame, dst: &mut Frame, k: &[u32], axis: Axis) {
    let radius = (k.len() / 2) as i32;
    let w = src.width as i32;
    let h = src.height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let d = ki as i32 - radius;
                let (sx, sy) = match axis {
                    Axis::Horizontal => ((x + d).clamp(0, w - 1), y),
                    Axis::Vertical => (x, (y + d).clamp(0, h - 1)),
                };
                let idx = ((sy * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src.data[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst.data[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}
