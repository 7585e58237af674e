//! Scene configuration and runtime layer render state.
//!
//! The configuration surface is a plain-data scene description (built
//! programmatically or parsed from JSON) resolved once at startup into a
//! [`Scene`]: immutable recipes paired with mutable per-layer render state.
//! The render-state record is deliberately separate from the recipe so the
//! animation loop never aliases configuration objects.

use std::sync::Arc;

use kurbo::Point;
use rand::rand_core::RngCore;

use crate::animation::transition::RegenerationTransition;
use crate::foundation::color::Color;
use crate::foundation::core::{Frame, Rgba8Premul, SurfaceSize};
use crate::foundation::error::{ScatterwallError, ScatterwallResult};
use crate::render::raster::rasterize;
use crate::scatter::rand01;
use crate::scatter::recipe::{
    Displacement, Fill, GradientFill, GradientSpan, Placement, ScatterRecipe,
};
use crate::scatter::stamp::RoundedBarStamp;

/// Declarative scene description: the system's sole configuration input.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneConfig {
    /// Logical wallpaper width in pixels (without the bezel gap).
    pub width: u32,
    /// Logical wallpaper height in pixels.
    pub height: u32,
    /// Bezel gap between the two monitor halves, in pixels.
    #[serde(default)]
    pub gap_size: u32,
    /// Background color behind every layer.
    #[serde(default = "default_background")]
    pub background: Color,
    /// Center point for centered placement and radial gradients;
    /// defaults to the surface midpoint.
    #[serde(default)]
    pub center: Option<Point>,
    /// Ordered layer recipes; later layers draw over earlier ones.
    pub layers: Vec<RecipeDef>,
}

fn default_background() -> Color {
    // The original wallpaper's near-black.
    Color::from_hex("#2c2c2c").unwrap_or(Color::rgb(0.17, 0.17, 0.17))
}

impl SceneConfig {
    /// Validate scene-level invariants (layers are validated on resolution).
    pub fn validate(&self) -> ScatterwallResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ScatterwallError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !self.background.is_finite() {
            return Err(ScatterwallError::validation(
                "background color must be finite",
            ));
        }
        if let Some(c) = self.center
            && (!c.x.is_finite() || !c.y.is_finite())
        {
            return Err(ScatterwallError::validation("center must be finite"));
        }
        Ok(())
    }
}

/// Raw recipe as it appears on the configuration surface.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RecipeDef {
    /// Shape density for the layer.
    pub density: f64,
    /// Layer opacity, applied at composite time.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// How each instance is painted.
    pub fill: FillDef,
    /// Where instances are placed on the surface.
    #[serde(default)]
    pub placement: PlacementDef,
    /// The shape stamped for each instance.
    pub shape: RoundedBarStamp,
    /// Number of independently regenerating sub-layers.
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    /// Oscillating displacement amplitude; present iff the layer animates.
    #[serde(default)]
    pub displacement: Option<Displacement>,
    /// Oscillation speed factor for dynamic layers.
    #[serde(default)]
    pub displacement_interval: Option<f64>,
    /// Interval between cross-faded regenerations, in milliseconds.
    #[serde(default)]
    pub regenerate_every_ms: Option<f64>,
}

fn default_opacity() -> f64 {
    1.0
}

fn default_repeat() -> u32 {
    1
}

impl RecipeDef {
    /// Resolve the raw definition into a typed recipe.
    pub fn resolve(&self) -> ScatterwallResult<ScatterRecipe> {
        let mut recipe = ScatterRecipe::new(
            self.density,
            self.fill.resolve()?,
            Arc::new(self.shape),
        )
        .with_opacity(self.opacity)
        .with_placement(self.placement.resolve())
        .with_repeat(self.repeat);
        recipe.displacement = self.displacement;
        recipe.displacement_interval = self.displacement_interval;
        recipe.regenerate_every_ms = self.regenerate_every_ms;
        recipe.validate()?;
        Ok(recipe)
    }
}

/// Raw fill with an open kind string.
///
/// The typed renderer knows `color` and `gradient`; any other kind resolves
/// to [`ScatterwallError::UnsupportedFill`], which the scene loader
/// downgrades to an empty, skipped layer.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct FillDef {
    /// Fill kind: `color`, `gradient`, or an unsupported string.
    pub kind: String,
    /// Solid color, for `color` fills.
    #[serde(default)]
    pub color: Option<Color>,
    /// Palette, for `gradient` fills.
    #[serde(default)]
    pub colors: Vec<Color>,
    /// Number of palette entries to sample, for `gradient` fills.
    #[serde(default)]
    pub take: Option<usize>,
    /// Gradient span override, for `gradient` fills.
    #[serde(default)]
    pub span: Option<GradientSpan>,
}

impl FillDef {
    /// Shorthand for a solid color fill.
    pub fn solid(color: Color) -> Self {
        Self {
            kind: "color".to_owned(),
            color: Some(color),
            colors: Vec::new(),
            take: None,
            span: None,
        }
    }

    /// Shorthand for a gradient fill over `colors`.
    pub fn gradient(colors: Vec<Color>) -> Self {
        Self {
            kind: "gradient".to_owned(),
            color: None,
            colors,
            take: None,
            span: None,
        }
    }

    fn resolve(&self) -> ScatterwallResult<Fill> {
        match self.kind.trim().to_ascii_lowercase().as_str() {
            "color" => {
                let color = self.color.ok_or_else(|| {
                    ScatterwallError::validation("color fill requires a 'color' value")
                })?;
                Ok(Fill::Color(color))
            }
            "gradient" => {
                if self.colors.is_empty() {
                    return Err(ScatterwallError::validation(
                        "gradient fill requires a non-empty 'colors' list",
                    ));
                }
                Ok(Fill::Gradient(GradientFill {
                    palette: self.colors.clone(),
                    take: self.take,
                    span: self.span,
                }))
            }
            other => Err(ScatterwallError::UnsupportedFill {
                kind: other.to_owned(),
            }),
        }
    }
}

/// Raw placement policy.
#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PlacementDef {
    /// Uniform placement over the whole buffer.
    #[default]
    Random,
    /// Polar placement around the scene center.
    Centered {
        /// Base polar distance from the scene center.
        #[serde(default)]
        offset: f64,
        /// Uniform random distance added to `offset`.
        #[serde(default)]
        offset_variation: f64,
    },
}

impl PlacementDef {
    fn resolve(self) -> Placement {
        match self {
            Self::Random => Placement::Random,
            Self::Centered {
                offset,
                offset_variation,
            } => Placement::Centered {
                offset,
                offset_variation,
            },
        }
    }
}

/// Mutable render state for one expanded recipe instance.
///
/// The buffer is replaced, never mutated in place; whoever holds the scene
/// always reads a fully-formed buffer.
pub struct LayerState {
    recipe: ScatterRecipe,
    buffer: Option<Frame>,
    /// Randomized at first render so dynamic layers don't oscillate in
    /// lockstep.
    phase_offset: f64,
    /// Start of the current regeneration interval on the scheduler clock;
    /// seeded negative so staggered layers don't all regenerate at once.
    pub(crate) last_regenerate_ms: f64,
    pub(crate) transition: Option<RegenerationTransition>,
}

impl LayerState {
    fn new(recipe: ScatterRecipe) -> Self {
        Self {
            recipe,
            buffer: None,
            phase_offset: 0.0,
            last_regenerate_ms: 0.0,
            transition: None,
        }
    }

    pub fn recipe(&self) -> &ScatterRecipe {
        &self.recipe
    }

    pub fn is_dynamic(&self) -> bool {
        self.recipe.is_dynamic()
    }

    pub fn opacity(&self) -> f64 {
        self.recipe.opacity
    }

    /// The most recently produced buffer, if one has been rendered.
    pub fn buffer(&self) -> Option<&Frame> {
        self.buffer.as_ref()
    }

    /// Whether a regeneration cross-fade is currently in flight.
    pub fn is_regenerating(&self) -> bool {
        self.transition.is_some()
    }

    pub(crate) fn replace_buffer(&mut self, frame: Frame) {
        self.buffer = Some(frame);
    }

    /// Rasterize the layer if it has no buffer yet, randomizing its phase
    /// and regeneration stagger on first render.
    pub(crate) fn ensure_buffer(
        &mut self,
        width: u32,
        height: u32,
        center: Point,
        rng: &mut dyn RngCore,
    ) -> ScatterwallResult<()> {
        if self.buffer.is_some() {
            return Ok(());
        }
        let frame = rasterize(&self.recipe, width, height, center, rng)?;
        self.phase_offset = rand01(rng);
        if let Some(every) = self.recipe.regenerate_every_ms {
            self.last_regenerate_ms = -(rand01(rng) * every);
        }
        self.buffer = Some(frame);
        Ok(())
    }

    /// Oscillation offset at `elapsed_ms` on the scheduler clock.
    ///
    /// Both axes ride the same sine of the same amplitude (`dx`), with the
    /// horizontal negated: the motion is a diagonal locked to a single
    /// phase, as the wallpaper has always moved.
    pub fn displaced_position(&self, elapsed_ms: f64) -> (f64, f64) {
        let Some(d) = self.recipe.displacement else {
            return (0.0, 0.0);
        };
        let interval = self.recipe.displacement_interval.unwrap_or(0.0);
        let arg = (interval * elapsed_ms + self.phase_offset) * std::f64::consts::PI;
        (-d.dx * arg.sin(), d.dx * arg.sin())
    }

    /// Drop render state so the next render starts fresh.
    fn invalidate(&mut self) {
        self.buffer = None;
        self.transition = None;
    }
}

/// A resolved scene: dimensions, background, center, and layer states in
/// declaration order.
pub struct Scene {
    logical: SurfaceSize,
    gap: u32,
    background: Color,
    center: Point,
    layers: Vec<LayerState>,
}

impl Scene {
    /// Build a scene from the configuration surface.
    ///
    /// Layers with an unsupported fill kind are skipped with a warning;
    /// other malformed layers fail the whole scene.
    pub fn from_config(config: &SceneConfig) -> ScatterwallResult<Self> {
        config.validate()?;

        let mut recipes = Vec::with_capacity(config.layers.len());
        for def in &config.layers {
            match def.resolve() {
                Ok(recipe) => recipes.push(recipe),
                Err(ScatterwallError::UnsupportedFill { kind }) => {
                    tracing::warn!(kind = %kind, "skipping layer with unsupported fill kind");
                }
                Err(err) => return Err(err),
            }
        }

        Self::from_recipes(
            SurfaceSize::new(config.width, config.height)?,
            config.gap_size,
            config.background,
            config.center,
            recipes,
        )
    }

    /// Build a scene from already-typed recipes (programmatic use, custom
    /// stamps).
    pub fn from_recipes(
        logical: SurfaceSize,
        gap: u32,
        background: Color,
        center: Option<Point>,
        recipes: Vec<ScatterRecipe>,
    ) -> ScatterwallResult<Self> {
        let center = center.unwrap_or(Point::new(
            f64::from(logical.width) / 2.0,
            f64::from(logical.height) / 2.0,
        ));

        let mut layers = Vec::new();
        for recipe in recipes {
            recipe.validate()?;
            layers.extend(recipe.expand().into_iter().map(LayerState::new));
        }

        Ok(Self {
            logical,
            gap,
            background,
            center,
            layers,
        })
    }

    pub fn logical_size(&self) -> SurfaceSize {
        self.logical
    }

    pub fn gap(&self) -> u32 {
        self.gap
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn background_premul(&self) -> Rgba8Premul {
        self.background.to_rgba8_premul()
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn layers(&self) -> &[LayerState] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [LayerState] {
        &mut self.layers
    }

    pub fn has_dynamic_layers(&self) -> bool {
        self.layers.iter().any(LayerState::is_dynamic)
    }

    /// Update logical dimensions, rescale the center with them, and drop all
    /// render state so the next render recomposes from scratch.
    pub fn resize(&mut self, width: u32, height: u32) -> ScatterwallResult<()> {
        let new = SurfaceSize::new(width, height)?;
        self.center = Point::new(
            self.center.x * f64::from(new.width) / f64::from(self.logical.width),
            self.center.y * f64::from(new.height) / f64::from(self.logical.height),
        );
        self.logical = new;
        for layer in &mut self.layers {
            layer.invalidate();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SceneConfig {
        SceneConfig {
            width: 320,
            height: 200,
            gap_size: 16,
            background: Color::from_hex("#2c2c2c").unwrap(),
            center: None,
            layers: vec![RecipeDef {
                density: 0.001,
                opacity: 0.8,
                fill: FillDef::solid(Color::from_hex("#111111").unwrap()),
                placement: PlacementDef::Random,
                shape: RoundedBarStamp::new(10.0),
                repeat: 1,
                displacement: None,
                displacement_interval: None,
                regenerate_every_ms: None,
            }],
        }
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = small_config();
        let json = serde_json::to_string(&config).unwrap();
        let back: SceneConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.width, 320);
        assert_eq!(back.layers.len(), 1);
        assert_eq!(back.layers[0].fill.kind, "color");
    }

    #[test]
    fn unknown_fill_kind_is_skipped_not_fatal() {
        let mut config = small_config();
        config.layers.push(RecipeDef {
            fill: FillDef {
                kind: "texture".to_owned(),
                color: None,
                colors: Vec::new(),
                take: None,
                span: None,
            },
            ..config.layers[0].clone()
        });

        let scene = Scene::from_config(&config).unwrap();
        assert_eq!(scene.layers().len(), 1);
    }

    #[test]
    fn malformed_known_fill_is_fatal() {
        let mut config = small_config();
        config.layers[0].fill = FillDef {
            kind: "color".to_owned(),
            color: None,
            colors: Vec::new(),
            take: None,
            span: None,
        };
        assert!(Scene::from_config(&config).is_err());
    }

    #[test]
    fn repeat_expands_into_layer_states() {
        let mut config = small_config();
        config.layers[0].repeat = 3;
        config.layers[0].displacement = Some(Displacement { dx: 20.0, dy: 20.0 });
        config.layers[0].displacement_interval = Some(0.0001);

        let scene = Scene::from_config(&config).unwrap();
        assert_eq!(scene.layers().len(), 3);
        let total: f64 = scene.layers().iter().map(|l| l.recipe().density).sum();
        assert!((total - 0.001).abs() < 1e-12);
    }

    #[test]
    fn default_center_is_the_midpoint_and_resize_rescales_it() {
        let mut scene = Scene::from_config(&small_config()).unwrap();
        assert_eq!(scene.center(), Point::new(160.0, 100.0));

        scene.resize(640, 100).unwrap();
        assert_eq!(scene.center(), Point::new(320.0, 50.0));
        assert_eq!(scene.logical_size().width, 640);
        assert!(scene.layers().iter().all(|l| l.buffer().is_none()));
    }

    #[test]
    fn zero_size_scene_is_rejected() {
        let mut config = small_config();
        config.width = 0;
        assert!(matches!(
            Scene::from_config(&config),
            Err(ScatterwallError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn displacement_is_a_phase_locked_diagonal() {
        let mut config = small_config();
        config.layers[0].displacement = Some(Displacement { dx: 40.0, dy: 12.0 });
        config.layers[0].displacement_interval = Some(0.001);
        let scene = Scene::from_config(&config).unwrap();

        let layer = &scene.layers()[0];
        for elapsed in [0.0, 130.0, 770.0, 5000.0] {
            let (x, y) = layer.displaced_position(elapsed);
            // Vertical reuses the horizontal amplitude and sine, negated
            // horizontally: a fixed diagonal, ignoring dy.
            assert!((x + y).abs() < 1e-9);
            assert!(x.abs() <= 40.0 + 1e-9);
        }
    }
}
