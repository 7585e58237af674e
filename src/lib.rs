//! Scatterwall procedurally generates seamless dual-monitor wallpapers.
//!
//! A wallpaper is a stack of *scatter layers*: each layer is a declarative
//! [`ScatterRecipe`] (density, placement, fill, shape) rasterized into an
//! owned offscreen buffer and composited over a background. Because the
//! target display is two monitors separated by a bezel, the composition
//! surface carries a dead gap strip in its middle and every presented draw
//! splits around it, so the image reads as continuous across the bezel.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: [`SceneConfig`] (JSON or programmatic) `->` [`Scene`]
//!    (expanded recipes + per-layer render state)
//! 2. **Rasterize**: [`rasterize`] bakes one recipe into a premultiplied
//!    RGBA8 [`Frame`], gradient-tinted when the recipe asks for it
//! 3. **Compose**: [`Compositor`] draws the background and static layers
//!    once, then tile-blits everything into the seam-free output
//! 4. **Animate** (optional): [`AnimationScheduler`] recomposes at a fixed
//!    tick, drifting dynamic layers and cross-fading in regenerated buffers
//! 5. **Export**: [`export`] reconstitutes one contiguous image and encodes
//!    PNG
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Seedable randomness**: every random decision draws from an injected
//!   `rand` source, so a seed reproduces a wallpaper exactly.
//! - **Premultiplied RGBA8 end-to-end**: buffers are baked at full opacity;
//!   every configured opacity is applied at composite time.
//! - **No wall clock in the core**: the animation loop is polled with an
//!   explicit time, so tests drive it virtually.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod animation;
mod foundation;
mod render;
mod scatter;
mod scene;

/// Reconstituting and persisting the wallpaper image.
pub mod export;

pub use animation::scheduler::{AnimationScheduler, TICK_RATE_HZ};
pub use animation::timer::PeriodicTimer;
pub use animation::transition::{RegenerationTransition, TRANSITION_TICK_MS};
pub use foundation::color::Color;
pub use foundation::core::{Frame, Rgba8Premul, SurfaceSize};
pub use foundation::error::{ScatterwallError, ScatterwallResult};
pub use render::compositor::Compositor;
pub use render::raster::rasterize;
pub use scatter::recipe::{
    Displacement, Fill, GradientFill, GradientSpan, Placement, ScatterRecipe,
};
pub use scatter::stamp::{RoundedBarStamp, ShapeStamp, StampSurface};
pub use scene::model::{FillDef, LayerState, PlacementDef, RecipeDef, Scene, SceneConfig};
pub use scene::preset::dual_monitor;
