//! Gradient fills for silhouette tinting.
//!
//! A gradient layer is rasterized twice: an opaque-white silhouette pass,
//! then this module's keep-destination-alpha tint. Only pixel color changes;
//! coverage is exactly the silhouette's.

use crate::foundation::color::Color;
use crate::foundation::core::Frame;
use crate::foundation::error::{ScatterwallError, ScatterwallResult};

/// Geometry of a gradient fill in buffer coordinates.
#[derive(Clone, Copy, Debug)]
pub enum GradientShape {
    /// Horizontal ramp from `x0` to `x1`.
    Linear { x0: f64, x1: f64 },
    /// Radial ramp between two radii around a center point.
    Radial { cx: f64, cy: f64, r0: f64, r1: f64 },
}

impl GradientShape {
    fn t_at(&self, x: f64, y: f64) -> f64 {
        match *self {
            Self::Linear { x0, x1 } => {
                let span = x1 - x0;
                if span.abs() < f64::EPSILON {
                    0.0
                } else {
                    (x - x0) / span
                }
            }
            Self::Radial { cx, cy, r0, r1 } => {
                let span = r1 - r0;
                if span.abs() < f64::EPSILON {
                    0.0
                } else {
                    let d = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
                    (d - r0) / span
                }
            }
        }
    }
}

/// Evaluate the gradient color at position `t`.
///
/// Stop `i` of `n` sits at `i / n`, so the last color holds from
/// `(n - 1) / n` onward; positions outside `[0, 1]` clamp to the end stops.
pub fn color_at(colors: &[Color], t: f64) -> Color {
    debug_assert!(!colors.is_empty());
    let n = colors.len();
    if n == 1 {
        return colors[0];
    }

    let pos = t * n as f64;
    if pos <= 0.0 {
        return colors[0];
    }
    let i = pos.floor() as usize;
    if i >= n - 1 {
        return colors[n - 1];
    }

    let frac = pos - i as f64;
    let a = colors[i];
    let b = colors[i + 1];
    Color::rgba(
        a.r + (b.r - a.r) * frac,
        a.g + (b.g - a.g) * frac,
        a.b + (b.b - a.b) * frac,
        a.a + (b.a - a.a) * frac,
    )
}

/// Replace every pixel's color with the gradient color at that position
/// while keeping the destination alpha ("source-in" with an opaque source).
pub fn tint_keep_alpha(
    frame: &mut Frame,
    colors: &[Color],
    shape: &GradientShape,
) -> ScatterwallResult<()> {
    if colors.is_empty() {
        return Err(ScatterwallError::validation(
            "gradient fill requires at least one color",
        ));
    }

    let width = frame.width as usize;
    for (row, row_px) in frame.data.chunks_exact_mut(width * 4).enumerate() {
        for (col, px) in row_px.chunks_exact_mut(4).enumerate() {
            let a = px[3];
            if a == 0 {
                continue;
            }
            let t = shape.t_at(col as f64, row as f64);
            let c = color_at(colors, t).to_rgba8();
            px[0] = mul_div255(c[0], a);
            px[1] = mul_div255(c[1], a);
            px[2] = mul_div255(c[2], a);
        }
    }
    Ok(())
}

fn mul_div255(x: u8, y: u8) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::SurfaceSize;

    #[test]
    fn single_color_is_constant() {
        let colors = [Color::rgb(1.0, 0.0, 0.0)];
        for t in [-1.0, 0.0, 0.3, 1.0, 2.0] {
            assert_eq!(color_at(&colors, t).to_rgba8(), [255, 0, 0, 255]);
        }
    }

    #[test]
    fn endpoints_clamp_to_first_and_last_stop() {
        let colors = [Color::rgb(0.0, 0.0, 0.0), Color::rgb(1.0, 1.0, 1.0)];
        assert_eq!(color_at(&colors, -0.5).to_rgba8(), [0, 0, 0, 255]);
        assert_eq!(color_at(&colors, 0.0).to_rgba8(), [0, 0, 0, 255]);
        // Stops sit at 0 and 1/2, so the last color holds from t = 0.5 on.
        assert_eq!(color_at(&colors, 0.5).to_rgba8(), [255, 255, 255, 255]);
        assert_eq!(color_at(&colors, 2.0).to_rgba8(), [255, 255, 255, 255]);
    }

    #[test]
    fn midpoint_interpolates_between_stops() {
        let colors = [Color::rgb(0.0, 0.0, 0.0), Color::rgb(1.0, 1.0, 1.0)];
        // Halfway between the stops at 0 and 0.5.
        let mid = color_at(&colors, 0.25).to_rgba8();
        assert!(mid[0] > 100 && mid[0] < 155);
    }

    #[test]
    fn tint_preserves_alpha_mask_exactly() {
        let mut frame = Frame::transparent(SurfaceSize::new(4, 2).unwrap());
        // A few white pixels at assorted alphas.
        frame.data[0..4].copy_from_slice(&[255, 255, 255, 255]);
        frame.data[12..16].copy_from_slice(&[128, 128, 128, 128]);
        frame.data[20..24].copy_from_slice(&[30, 30, 30, 30]);
        let mask_before = frame.alpha_mask();

        tint_keep_alpha(
            &mut frame,
            &[Color::rgb(1.0, 0.0, 0.5), Color::rgb(0.0, 1.0, 0.0)],
            &GradientShape::Linear { x0: 0.0, x1: 4.0 },
        )
        .unwrap();

        assert_eq!(frame.alpha_mask(), mask_before);
    }

    #[test]
    fn tint_leaves_transparent_pixels_untouched() {
        let mut frame = Frame::transparent(SurfaceSize::new(2, 1).unwrap());
        tint_keep_alpha(
            &mut frame,
            &[Color::rgb(1.0, 1.0, 1.0)],
            &GradientShape::Radial {
                cx: 0.0,
                cy: 0.0,
                r0: 200.0,
                r1: 400.0,
            },
        )
        .unwrap();
        assert!(frame.data.iter().all(|&b| b == 0));
    }

    #[test]
    fn empty_palette_is_rejected() {
        let mut frame = Frame::transparent(SurfaceSize::new(1, 1).unwrap());
        let err = tint_keep_alpha(&mut frame, &[], &GradientShape::Linear { x0: 0.0, x1: 1.0 });
        assert!(err.is_err());
    }
}
