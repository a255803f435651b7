// Configuration loading

pub mod error;
pub mod settings;

use serde::{Deserialize, Serialize};

pub use error::ConfigError;
pub use settings::Settings;

/// Framework-agnostic RGBA color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Convert from hex u32 (0xRRGGBB)
    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self { r, g, b, a: 1.0 }
    }

    /// Linear blend, `t` clamped to 0..=1.
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |x: f32, y: f32| x + (y - x) * t;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b))
    }
}

/// Sequential colour maps used for heatmaps, low value first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    Reds,
    Blues,
    Greens,
    Greys,
    /// Black to white.
    Gray,
}

impl Palette {
    fn stops(self) -> &'static [u32] {
        match self {
            Self::Reds => &[
                0xfff5f0, 0xfee0d2, 0xfcbba1, 0xfc9272, 0xfb6a4a, 0xef3b2c, 0xcb181d, 0xa50f15,
                0x67000d,
            ],
            Self::Blues => &[
                0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c,
                0x08306b,
            ],
            Self::Greens => &[
                0xf7fcf5, 0xe5f5e0, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x006d2c,
                0x00441b,
            ],
            Self::Greys => &[
                0xffffff, 0xf0f0f0, 0xd9d9d9, 0xbdbdbd, 0x969696, 0x737373, 0x525252, 0x252525,
                0x000000,
            ],
            Self::Gray => &[0x000000, 0xffffff],
        }
    }

    /// Colour at position `t` (0 = low end, 1 = high end), clamped.
    pub fn sample(self, t: f64) -> Color {
        let stops = self.stops();
        let segments = (stops.len() - 1) as f64;
        let x = if t.is_finite() { t.clamp(0.0, 1.0) * segments } else { 0.0 };
        let i = (x.floor() as usize).min(stops.len() - 2);
        let local = (x - i as f64) as f32;
        Color::from_hex(stops[i]).lerp(Color::from_hex(stops[i + 1]), local)
    }
}
