use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgba8Premul;

/// Straight-alpha color with channels in `[0, 1]`.
///
/// The configuration surface accepts `#RRGGBB` / `#RRGGBBAA` strings,
/// `[r, g, b]` / `[r, g, b, a]` arrays, or `{r, g, b, a}` objects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    /// Red channel in `[0, 1]`.
    pub r: f64,
    /// Green channel in `[0, 1]`.
    pub g: f64,
    /// Blue channel in `[0, 1]`.
    pub b: f64,
    /// Alpha channel in `[0, 1]`.
    pub a: f64,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    /// Construct a color from straight-alpha channels.
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Construct an opaque color from RGB channels.
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Parse a `#RRGGBB` or `#RRGGBBAA` hex string (leading `#` optional).
    pub fn from_hex(s: &str) -> Result<Self, String> {
        parse_hex(s)
    }

    /// Convert to premultiplied RGBA8 for compositing.
    pub fn to_rgba8_premul(self) -> Rgba8Premul {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        Rgba8Premul::from_straight_rgba(to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a))
    }

    /// Straight-alpha RGBA8 channels, for vector-rasterizer paints.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }

    /// Whether every channel is a finite number.
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            RgbaObj {
                r: f64,
                g: f64,
                b: f64,
                #[serde(default = "one")]
                a: f64,
            },
            Arr(Vec<f64>),
        }

        fn one() -> f64 {
            1.0
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::RgbaObj { r, g, b, a } => Ok(Self::rgba(r, g, b, a)),
            Repr::Arr(v) => {
                if v.len() == 3 {
                    Ok(Self::rgba(v[0], v[1], v[2], 1.0))
                } else if v.len() == 4 {
                    Ok(Self::rgba(v[0], v[1], v[2], v[3]))
                } else {
                    Err(serde::de::Error::custom(
                        "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                    ))
                }
            }
        }
    }
}

fn parse_hex(s: &str) -> Result<Color, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    let (r, g, b, a) = match s.len() {
        6 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            (r, g, b, 255)
        }
        8 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            let a = hex_byte(&s[6..8])?;
            (r, g, b, a)
        }
        _ => {
            return Err("hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)".to_owned());
        }
    };

    Ok(Color::rgba(
        (r as f64) / 255.0,
        (g as f64) / 255.0,
        (b as f64) / 255.0,
        (a as f64) / 255.0,
    ))
}
