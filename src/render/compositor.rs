//! The visible-surface owner: static composition and seam-free tiling.
//!
//! The target display is two monitors separated by a bezel. The composition
//! surface is `logical width + gap` pixels wide and the gap strip in its
//! middle is a dead zone that is never shown: every presented draw splits
//! into two blits that skip it, so the image reads as seamless across the
//! bezel.

use rand::rand_core::RngCore;

use crate::foundation::core::{Frame, Rgba8Premul, SurfaceSize};
use crate::foundation::error::ScatterwallResult;
use crate::render::composite::{ClipX, blit_over, over_in_place};
use crate::render::raster::buffer_margins;
use crate::scene::model::Scene;

/// Owns the composition surface and the presented output frame.
pub struct Compositor {
    logical: SurfaceSize,
    gap: u32,
    background: Rgba8Premul,
    /// Static composition, `(logical width + gap) × height`.
    surface: Frame,
    /// Seam-free presented frame, `logical width × height`.
    output: Frame,
}

impl Compositor {
    /// Create a compositor for a `logical`-sized pair of monitors separated
    /// by a `gap`-pixel bezel, over the given `background`.
    pub fn new(
        logical: SurfaceSize,
        gap: u32,
        background: Rgba8Premul,
    ) -> ScatterwallResult<Self> {
        let surface_size = SurfaceSize::new(logical.width + gap, logical.height)?;
        Ok(Self {
            logical,
            gap,
            background,
            surface: Frame::transparent(surface_size),
            output: Frame::transparent(logical),
        })
    }

    /// Compose the background and every non-dynamic layer, in declaration
    /// order, onto the composition surface.
    ///
    /// Layer buffers materialize lazily here; a layer that fails to
    /// rasterize is logged and left empty rather than failing the scene.
    #[tracing::instrument(skip_all)]
    pub fn render_static(&mut self, scene: &mut Scene, rng: &mut dyn RngCore) -> ScatterwallResult<()> {
        self.surface.fill(self.background);

        let size = self.surface.size();
        let center = scene.center();
        for layer in scene.layers_mut().iter_mut().filter(|l| !l.is_dynamic()) {
            if let Err(err) = layer.ensure_buffer(size.width, size.height, center, rng) {
                tracing::warn!(%err, "static layer failed to rasterize; leaving it empty");
                continue;
            }
            let opacity = layer.opacity() as f32;
            if let Some(buffer) = layer.buffer() {
                over_in_place(&mut self.surface.data, &buffer.data, opacity)?;
            }
        }
        Ok(())
    }

    /// Recompose the presented output for one animation tick.
    ///
    /// Dynamic layer buffers must already exist; layers without one are
    /// skipped for this tick.
    pub fn compose_tick(&mut self, scene: &Scene, elapsed_ms: f64) {
        self.output.fill(self.background);
        tile_blit(
            &mut self.output,
            self.logical.width,
            self.gap,
            &self.surface,
            0,
            0,
            1.0,
        );

        for layer in scene.layers().iter().filter(|l| l.is_dynamic()) {
            let Some(buffer) = layer.buffer() else {
                continue;
            };
            let (dx, dy) = layer.displaced_position(elapsed_ms);
            let (margin_x, margin_y) = buffer_margins(layer.recipe());
            tile_blit(
                &mut self.output,
                self.logical.width,
                self.gap,
                buffer,
                dx.round() as i64 - i64::from(margin_x),
                dy.round() as i64 - i64::from(margin_y),
                layer.opacity() as f32,
            );
        }
    }

    /// Draw a buffer onto the presented output through the seam split.
    pub fn draw_tiled(&mut self, src: &Frame, x: i64, y: i64, opacity: f32) {
        tile_blit(
            &mut self.output,
            self.logical.width,
            self.gap,
            src,
            x,
            y,
            opacity,
        );
    }

    /// Reallocate both surfaces for new logical dimensions.
    pub fn resize(&mut self, logical: SurfaceSize) -> ScatterwallResult<()> {
        let surface_size = SurfaceSize::new(logical.width + self.gap, logical.height)?;
        self.logical = logical;
        self.surface = Frame::transparent(surface_size);
        self.output = Frame::transparent(logical);
        Ok(())
    }

    /// The static composition surface (logical width + gap).
    pub fn surface(&self) -> &Frame {
        &self.surface
    }

    /// The presented, seam-free output frame (logical width).
    pub fn present(&self) -> &Frame {
        &self.output
    }

    /// The logical (per-monitor) surface size.
    pub fn logical_size(&self) -> SurfaceSize {
        self.logical
    }

    /// The bezel gap width in pixels.
    pub fn gap(&self) -> u32 {
        self.gap
    }
}

/// The seam-elimination draw: the left half of the output takes the source
/// as-is, the right half reads `gap` pixels further into the source, so the
/// gap strip lands behind the bezel and is never shown.
fn tile_blit(
    output: &mut Frame,
    logical_width: u32,
    gap: u32,
    src: &Frame,
    x: i64,
    y: i64,
    opacity: f32,
) {
    let half = logical_width / 2;
    blit_over(output, src, x, y, opacity, Some(ClipX { x0: 0, x1: half }));
    blit_over(
        output,
        src,
        x - i64::from(gap),
        y,
        opacity,
        Some(ClipX {
            x0: half,
            x1: logical_width,
        }),
    );
}
