//! Reconstituting and persisting the wallpaper image.
//!
//! The composition surface carries the bezel gap as a dead strip in its
//! middle; export excises it, yielding one contiguous logical-width image.
//! Pure and synchronous; the only side effect is the optional file write.

use std::io::Cursor;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::Frame;
use crate::foundation::error::ScatterwallResult;
use crate::render::compositor::Compositor;

/// Join the two display halves of the composition surface into one
/// contiguous `logical width × height` image, skipping the gap strip.
///
/// With a zero gap this is an exact copy of the surface.
pub fn contiguous(compositor: &Compositor) -> Frame {
    let logical = compositor.logical_size();
    let gap = compositor.gap() as usize;
    let surface = compositor.surface();

    let mut out = Frame::transparent(logical);
    let half = (logical.width / 2) as usize;
    let out_w = logical.width as usize;
    let src_w = surface.width as usize;

    for y in 0..logical.height as usize {
        let src_row = &surface.data[y * src_w * 4..(y + 1) * src_w * 4];
        let out_row = &mut out.data[y * out_w * 4..(y + 1) * out_w * 4];
        out_row[..half * 4].copy_from_slice(&src_row[..half * 4]);
        let right_src_start = (half + gap) * 4;
        let right_len = (out_w - half) * 4;
        out_row[half * 4..].copy_from_slice(&src_row[right_src_start..right_src_start + right_len]);
    }
    out
}

/// Encode a frame as PNG bytes.
pub fn encode_png(frame: &Frame) -> ScatterwallResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
        .context("frame buffer does not match its dimensions")?;

    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(bytes)
}

/// Write a frame to disk as PNG.
pub fn write_png(frame: &Frame, path: &Path) -> ScatterwallResult<()> {
    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use kurbo::Point;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::foundation::color::Color;
    use crate::foundation::core::{Rgba8Premul, SurfaceSize};
    use crate::scene::model::Scene;

    fn rendered_compositor(gap: u32) -> Compositor {
        let logical = SurfaceSize::new(64, 32).unwrap();
        let mut scene = Scene::from_recipes(
            logical,
            gap,
            Color::from_hex("#336699").unwrap(),
            Some(Point::new(32.0, 16.0)),
            vec![],
        )
        .unwrap();
        let mut compositor = Compositor::new(
            logical,
            gap,
            Rgba8Premul::from_straight_rgba(0x33, 0x66, 0x99, 255),
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        compositor.render_static(&mut scene, &mut rng).unwrap();
        compositor
    }

    #[test]
    fn zero_gap_export_equals_the_surface() {
        let compositor = rendered_compositor(0);
        let exported = contiguous(&compositor);
        assert_eq!(&exported, compositor.surface());
    }

    #[test]
    fn gapped_export_has_logical_width() {
        let compositor = rendered_compositor(6);
        assert_eq!(compositor.surface().width, 70);
        let exported = contiguous(&compositor);
        assert_eq!(exported.width, 64);
        assert_eq!(exported.height, 32);
        assert!(exported.data.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn png_bytes_decode_back_to_the_same_pixels() {
        let compositor = rendered_compositor(4);
        let exported = contiguous(&compositor);
        let bytes = encode_png(&exported).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.width(), exported.width);
        assert_eq!(decoded.height(), exported.height);
        assert_eq!(decoded.into_raw(), exported.data);
    }
}
