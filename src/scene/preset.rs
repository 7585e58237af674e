//! The built-in dual-monitor wallpaper scene.
//!
//! Two 1920×1080 monitors with a 64 px bezel gap: a dark background field of
//! large bars, a midground ring around the focal point, and three gradient
//! foreground layers that drift and periodically regenerate.

use crate::foundation::color::Color;
use crate::scatter::recipe::{Displacement, GradientSpan};
use crate::scatter::stamp::RoundedBarStamp;
use crate::scene::model::{FillDef, PlacementDef, RecipeDef, SceneConfig};

const WIDTH: u32 = 3840;
const HEIGHT: u32 = 1080;
const GAP: u32 = 64;
const BASE_SIZE: f64 = 200.0;

fn hex(s: &str) -> Color {
    Color::from_hex(s).unwrap_or(Color::rgb(1.0, 0.0, 1.0))
}

fn palette() -> Vec<Color> {
    let cycle = ["#e91e63", "#9c27b0", "#8bc34a", "#03a9f4"];
    cycle
        .iter()
        .cycle()
        .take(cycle.len() * 3)
        .map(|s| hex(s))
        .collect()
}

/// The default ultrawide scene, focal point at three quarters of the width.
pub fn dual_monitor() -> SceneConfig {
    let charcoal = hex("#222222");
    let near_black = hex("#111111");

    SceneConfig {
        width: WIDTH,
        height: HEIGHT,
        gap_size: GAP,
        background: hex("#2c2c2c"),
        center: Some(kurbo::Point::new(
            f64::from(WIDTH) * 0.75,
            f64::from(HEIGHT) / 2.0,
        )),
        layers: vec![
            // Background: large dim bars across the whole surface.
            RecipeDef {
                density: 0.0001,
                opacity: 1.0,
                fill: FillDef::solid(charcoal),
                placement: PlacementDef::Random,
                shape: RoundedBarStamp {
                    size_variation: 0.3,
                    elongation_variation: 3.0,
                    ..RoundedBarStamp::new(BASE_SIZE / 1.25)
                },
                repeat: 1,
                displacement: None,
                displacement_interval: None,
                regenerate_every_ms: None,
            },
            RecipeDef {
                density: 0.0001,
                opacity: 1.0,
                fill: FillDef::solid(charcoal),
                placement: PlacementDef::Random,
                shape: RoundedBarStamp {
                    size_variation: 0.3,
                    elongation_variation: 4.0,
                    stroke: true,
                    line_width: 0.05,
                    ..RoundedBarStamp::new(BASE_SIZE / 1.25)
                },
                repeat: 1,
                displacement: None,
                displacement_interval: None,
                regenerate_every_ms: None,
            },
            RecipeDef {
                density: 0.00025,
                opacity: 0.8,
                fill: FillDef::solid(near_black),
                placement: PlacementDef::Random,
                shape: RoundedBarStamp {
                    elongation_variation: 3.0,
                    ..RoundedBarStamp::new(BASE_SIZE / 2.0)
                },
                repeat: 1,
                displacement: None,
                displacement_interval: None,
                regenerate_every_ms: None,
            },
            RecipeDef {
                density: 0.0001,
                opacity: 0.8,
                fill: FillDef::solid(near_black),
                placement: PlacementDef::Random,
                shape: RoundedBarStamp {
                    elongation_variation: 3.0,
                    stroke: true,
                    line_width: 0.05,
                    ..RoundedBarStamp::new(BASE_SIZE / 2.0)
                },
                repeat: 1,
                displacement: None,
                displacement_interval: None,
                regenerate_every_ms: None,
            },
            // Midground: a dim ring hugging the focal point.
            RecipeDef {
                density: 0.00025,
                opacity: 0.8,
                fill: FillDef::solid(near_black),
                placement: PlacementDef::Centered {
                    offset: BASE_SIZE / 4.0,
                    offset_variation: BASE_SIZE,
                },
                shape: RoundedBarStamp {
                    elongation_variation: 4.0,
                    ..RoundedBarStamp::new(BASE_SIZE / 3.0)
                },
                repeat: 1,
                displacement: None,
                displacement_interval: None,
                regenerate_every_ms: None,
            },
            // Foreground: drifting gradient sprays around the focal point.
            RecipeDef {
                density: 0.0005,
                opacity: 0.5,
                fill: FillDef {
                    span: Some(GradientSpan {
                        start: 0.0,
                        end: None,
                    }),
                    ..FillDef::gradient(palette())
                },
                placement: PlacementDef::Centered {
                    offset: BASE_SIZE * 2.0,
                    offset_variation: BASE_SIZE * 8.0,
                },
                shape: RoundedBarStamp {
                    size_variation: 4.0,
                    elongation_variation: 3.0,
                    stroke: true,
                    ..RoundedBarStamp::new(BASE_SIZE / 8.0)
                },
                repeat: 1,
                displacement: Some(Displacement { dx: 40.0, dy: 40.0 }),
                displacement_interval: Some(0.00002),
                regenerate_every_ms: Some(90_000.0),
            },
            RecipeDef {
                density: 0.0005,
                opacity: 1.0,
                fill: FillDef {
                    take: Some(4),
                    ..FillDef::gradient(palette())
                },
                placement: PlacementDef::Centered {
                    offset: BASE_SIZE,
                    offset_variation: BASE_SIZE * 1.5,
                },
                shape: RoundedBarStamp {
                    elongation_variation: 3.0,
                    stroke: true,
                    glow: 1.0,
                    ..RoundedBarStamp::new(BASE_SIZE / 6.0)
                },
                repeat: 1,
                displacement: Some(Displacement { dx: 25.0, dy: 25.0 }),
                displacement_interval: Some(0.00003),
                regenerate_every_ms: Some(60_000.0),
            },
            RecipeDef {
                density: 0.0015,
                opacity: 1.0,
                fill: FillDef {
                    span: Some(GradientSpan {
                        start: 0.0,
                        end: None,
                    }),
                    ..FillDef::gradient(palette())
                },
                placement: PlacementDef::Centered {
                    offset: BASE_SIZE * 2.0,
                    offset_variation: BASE_SIZE * 27.0,
                },
                shape: RoundedBarStamp {
                    elongation_variation: 3.0,
                    stroke: true,
                    glow: 2.0,
                    ..RoundedBarStamp::new(BASE_SIZE / 6.0)
                },
                // Split so the sub-groups drift and regenerate out of step.
                repeat: 3,
                displacement: Some(Displacement { dx: 40.0, dy: 40.0 }),
                displacement_interval: Some(0.00002),
                regenerate_every_ms: Some(45_000.0),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::model::Scene;

    #[test]
    fn preset_resolves_into_a_scene() {
        let config = dual_monitor();
        config.validate().unwrap();
        let scene = Scene::from_config(&config).unwrap();
        // Eight declared recipes, the last split three ways.
        assert_eq!(scene.layers().len(), 10);
        assert!(scene.has_dynamic_layers());
        assert_eq!(scene.gap(), 64);
        assert_eq!(scene.center(), kurbo::Point::new(2880.0, 540.0));
    }

    #[test]
    fn preset_round_trips_through_json() {
        let config = dual_monitor();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: SceneConfig = serde_json::from_str(&json).unwrap();
        let scene = Scene::from_config(&back).unwrap();
        assert_eq!(scene.layers().len(), 10);
    }

    #[test]
    fn static_and_dynamic_layers_are_split_as_designed() {
        let scene = Scene::from_config(&dual_monitor()).unwrap();
        let dynamic = scene.layers().iter().filter(|l| l.is_dynamic()).count();
        assert_eq!(dynamic, 5);
    }
}
