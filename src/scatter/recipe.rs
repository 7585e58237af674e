//! The scatter recipe: immutable configuration for one rendered layer.

use std::sync::Arc;

use crate::foundation::color::Color;
use crate::foundation::error::{ScatterwallError, ScatterwallResult};
use crate::scatter::stamp::ShapeStamp;

/// How a layer's shape silhouette is colored.
#[derive(Clone, Debug)]
pub enum Fill {
    /// Every instance in one solid color.
    Color(Color),
    /// The silhouette tinted by a gradient over the whole buffer.
    Gradient(GradientFill),
}

/// Gradient fill configuration.
///
/// The palette is reshuffled (and re-truncated when `take` is set) on every
/// rasterization, so regenerated layers recolor as well as reposition.
#[derive(Clone, Debug)]
pub struct GradientFill {
    /// Ordered color palette; stops are distributed as `i / n`.
    pub palette: Vec<Color>,
    /// Use only this many colors of the shuffled palette.
    pub take: Option<usize>,
    /// Horizontal ramp; `None` selects the radial form around the scene
    /// center (inner radius 200, outer radius = buffer height).
    pub span: Option<GradientSpan>,
}

/// Start/end offsets of a horizontal linear gradient, in buffer pixels.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct GradientSpan {
    /// Start offset in buffer pixels.
    #[serde(default)]
    pub start: f64,
    /// End offset in buffer pixels. Defaults to the buffer width.
    #[serde(default)]
    pub end: Option<f64>,
}

/// Where instances are placed on the surface.
#[derive(Clone, Copy, Debug)]
pub enum Placement {
    /// Uniform over the whole buffer.
    Random,
    /// Polar offset around the scene center: distance `offset` plus a
    /// uniform draw of `offset_variation`, at a uniformly random angle.
    Centered {
        /// Base polar distance from the scene center.
        offset: f64,
        /// Uniform random distance added to `offset`.
        offset_variation: f64,
    },
}

/// Slow oscillating displacement amplitude, marking a recipe as dynamic.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct Displacement {
    /// Horizontal oscillation amplitude in pixels.
    pub dx: f64,
    /// Vertical oscillation amplitude in pixels.
    pub dy: f64,
}

/// Declarative description of one scatter layer.
#[derive(Clone, Debug)]
pub struct ScatterRecipe {
    /// Shape density: the target instance count is
    /// `density × bufferWidth × sqrt(bufferHeight)`.
    pub density: f64,
    /// Layer opacity, applied at composite time.
    pub opacity: f64,
    /// How each instance is painted.
    pub fill: Fill,
    /// Where instances are placed on the surface.
    pub placement: Placement,
    /// The shape stamped for each instance.
    pub shape: Arc<dyn ShapeStamp>,
    /// Split into this many independently regenerating sub-layers.
    pub repeat: u32,
    /// Present iff the layer animates.
    pub displacement: Option<Displacement>,
    /// Oscillation speed factor for dynamic layers.
    pub displacement_interval: Option<f64>,
    /// Interval between cross-faded regenerations, in milliseconds.
    pub regenerate_every_ms: Option<f64>,
}

impl ScatterRecipe {
    /// A static, randomly placed recipe at full opacity.
    pub fn new(density: f64, fill: Fill, shape: Arc<dyn ShapeStamp>) -> Self {
        Self {
            density,
            opacity: 1.0,
            fill,
            placement: Placement::Random,
            shape,
            repeat: 1,
            displacement: None,
            displacement_interval: None,
            regenerate_every_ms: None,
        }
    }

    /// Set the layer opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Set the instance placement strategy.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Split the layer into `repeat` independently regenerating sub-layers.
    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }

    /// Mark the recipe dynamic with the given oscillation amplitude/speed.
    pub fn animated(mut self, displacement: Displacement, interval: f64) -> Self {
        self.displacement = Some(displacement);
        self.displacement_interval = Some(interval);
        self
    }

    /// Regenerate (cross-fade to a fresh buffer) on this interval.
    pub fn regenerating_every_ms(mut self, interval_ms: f64) -> Self {
        self.regenerate_every_ms = Some(interval_ms);
        self
    }

    /// Whether the layer participates in the animation loop.
    pub fn is_dynamic(&self) -> bool {
        self.displacement.is_some()
    }

    /// Expand `repeat > 1` into that many independent single recipes, each
    /// carrying `density / repeat` so the aggregate density is invariant to
    /// the split.
    pub fn expand(self) -> Vec<ScatterRecipe> {
        if self.repeat <= 1 {
            return vec![self];
        }
        let n = self.repeat;
        let split = ScatterRecipe {
            density: self.density / f64::from(n),
            repeat: 1,
            ..self
        };
        (0..n).map(|_| split.clone()).collect()
    }

    /// Validate recipe invariants.
    pub fn validate(&self) -> ScatterwallResult<()> {
        if !self.density.is_finite() || self.density < 0.0 {
            return Err(ScatterwallError::validation(
                "recipe density must be finite and >= 0",
            ));
        }
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(ScatterwallError::validation(
                "recipe opacity must be within [0, 1]",
            ));
        }
        if self.repeat == 0 {
            return Err(ScatterwallError::validation("recipe repeat must be >= 1"));
        }
        if let Placement::Centered {
            offset,
            offset_variation,
        } = self.placement
        {
            if !offset.is_finite() || offset < 0.0 {
                return Err(ScatterwallError::validation(
                    "centered placement offset must be finite and >= 0",
                ));
            }
            if !offset_variation.is_finite() || offset_variation < 0.0 {
                return Err(ScatterwallError::validation(
                    "centered placement offset variation must be finite and >= 0",
                ));
            }
        }
        if let Some(d) = self.displacement {
            if !d.dx.is_finite() || !d.dy.is_finite() {
                return Err(ScatterwallError::validation(
                    "displacement amplitudes must be finite",
                ));
            }
            match self.displacement_interval {
                Some(i) if i.is_finite() && i > 0.0 => {}
                _ => {
                    return Err(ScatterwallError::validation(
                        "dynamic recipes need a finite displacement interval > 0",
                    ));
                }
            }
        }
        if let Some(every) = self.regenerate_every_ms {
            if self.displacement.is_none() {
                return Err(ScatterwallError::validation(
                    "regeneration intervals apply to dynamic recipes only",
                ));
            }
            if !every.is_finite() || every <= 0.0 {
                return Err(ScatterwallError::validation(
                    "regeneration interval must be finite and > 0",
                ));
            }
        }
        if let Fill::Gradient(g) = &self.fill {
            if g.palette.is_empty() {
                return Err(ScatterwallError::validation(
                    "gradient fill palette must be non-empty",
                ));
            }
            if let Some(take) = g.take
                && take == 0
            {
                return Err(ScatterwallError::validation(
                    "gradient take must be >= 1 when set",
                ));
            }
            if let Some(span) = g.span {
                if !span.start.is_finite() || !span.end.unwrap_or(0.0).is_finite() {
                    return Err(ScatterwallError::validation(
                        "gradient span offsets must be finite",
                    ));
                }
            }
        }
        Ok(())
    }
}
