//! Shape stamps: the pluggable per-instance drawing capability.
//!
//! A stamp draws exactly one randomized shape instance relative to an origin
//! the rasterizer has already translated to the instance's placement point.
//! Stamps own their random variation and mutate nothing but the surface.

use kurbo::{Affine, BezPath, Shape as _};
use rand::rand_core::RngCore;

use crate::scatter::rand01;

/// Drawing surface handed to a stamp, pre-translated to the instance origin.
///
/// Paint (fill color) is owned by the rasterizer; stamps only contribute
/// geometry and local transforms.
pub struct StampSurface<'a> {
    ctx: &'a mut vello_cpu::RenderContext,
    origin: Affine,
}

impl<'a> StampSurface<'a> {
    pub(crate) fn new(ctx: &'a mut vello_cpu::RenderContext, origin: Affine) -> Self {
        Self { ctx, origin }
    }

    /// Fill `path` under a stamp-local transform.
    pub fn fill(&mut self, local: Affine, path: &BezPath) {
        self.ctx.set_transform(affine_to_cpu(self.origin * local));
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    /// Stroke `path` at the given width under a stamp-local transform.
    ///
    /// The outline is expanded on the CPU and filled; the raster backend is
    /// fill-only.
    pub fn stroke(&mut self, local: Affine, path: &BezPath, width: f64) {
        let outline = kurbo::stroke(
            path.elements().iter().copied(),
            &kurbo::Stroke::new(width),
            &kurbo::StrokeOpts::default(),
            0.25,
        );
        self.fill(local, &outline);
    }
}

/// Capability for drawing one randomized shape instance.
pub trait ShapeStamp: std::fmt::Debug + Send + Sync {
    /// Draw one instance. `surface` is already translated to the placement
    /// point; all variation is sampled from `rng`.
    fn stamp(&self, surface: &mut StampSurface<'_>, rng: &mut dyn RngCore);

    /// Blur radius in pixels for the glow underlay pass; 0 disables it.
    fn glow_radius(&self) -> u32 {
        0
    }
}

/// An elongated, fully-rounded bar: the wallpaper's signature shape.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct RoundedBarStamp {
    /// Base width of the bar in pixels.
    pub size: f64,
    /// Random widening, as a fraction of `size` (`0` = uniform width).
    #[serde(default)]
    pub size_variation: f64,
    /// Length as a multiple of the effective width.
    #[serde(default = "default_elongation")]
    pub elongation: f64,
    /// Random extra elongation, sharing the width's random sample.
    #[serde(default)]
    pub elongation_variation: f64,
    /// Outline the bar instead of filling it.
    #[serde(default)]
    pub stroke: bool,
    /// Stroke width as a fraction of `size`.
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    /// Glow blur, as a multiple of `size`.
    #[serde(default)]
    pub glow: f64,
}

fn default_elongation() -> f64 {
    2.0
}

fn default_line_width() -> f64 {
    0.1
}

impl RoundedBarStamp {
    /// A rounded-bar stamp with the given base size and default proportions.
    pub fn new(size: f64) -> Self {
        Self {
            size,
            size_variation: 0.0,
            elongation: default_elongation(),
            elongation_variation: 0.0,
            stroke: false,
            line_width: default_line_width(),
            glow: 0.0,
        }
    }
}

impl ShapeStamp for RoundedBarStamp {
    fn stamp(&self, surface: &mut StampSurface<'_>, rng: &mut dyn RngCore) {
        // One sample drives both width and length variation, so wide
        // instances are also long ones.
        let v = rand01(rng);
        let width = self.size * (1.0 + v * self.size_variation);
        let length = width * (self.elongation + v * self.elongation_variation);

        let mut local = Affine::IDENTITY;
        if rand01(rng) > 0.5 {
            let sx = if rand01(rng) > 0.5 { 1.0 } else { -1.0 };
            let sy = if rand01(rng) > 0.5 { 1.0 } else { -1.0 };
            local = local * Affine::scale_non_uniform(sx, sy);
        }
        local = local
            * Affine::rotate(std::f64::consts::FRAC_PI_4)
            * Affine::translate((-width / 2.0, -length / 2.0));

        // Corner radius equal to the width gives fully rounded ends (kurbo
        // clamps it to the half-extents).
        let path = kurbo::RoundedRect::new(0.0, 0.0, width, length, width).to_path(0.1);
        if self.stroke {
            surface.stroke(local, &path, self.size * self.line_width);
        } else {
            surface.fill(local, &path);
        }
    }

    fn glow_radius(&self) -> u32 {
        (self.glow * self.size).round().max(0.0) as u32
    }
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
