use serde::{Deserialize, Serialize};

use crate::error::{MapError, MapResult};
use crate::render::Color;

/// One color stop at a normalized gradient position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub position: f64,
    pub color: Color,
}

impl GradientStop {
    #[must_use]
    pub const fn new(position: f64, color: Color) -> Self {
        Self { position, color }
    }
}

/// Built-in gradients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GradientPreset {
    /// Black to white.
    Grayscale,
    /// Black to red to yellow to white.
    #[default]
    Hot,
    /// Dark purple to teal to yellow (five-stop approximation).
    Viridis,
    /// Blue to cyan to green to yellow to red.
    Rainbow,
}

/// Continuous piecewise-linear map from `[0, 1]` to colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorGradient {
    stops: Vec<GradientStop>,
}

impl ColorGradient {
    /// Builds a validated gradient.
    ///
    /// Invariants:
    /// - at least two stops
    /// - positions strictly increasing, first at `0.0`, last at `1.0`
    /// - every color is valid
    pub fn new(stops: Vec<GradientStop>) -> MapResult<Self> {
        if stops.len() < 2 {
            return Err(MapError::InvalidData(
                "gradient needs at least two stops".to_owned(),
            ));
        }
        for stop in &stops {
            if !stop.position.is_finite() {
                return Err(MapError::InvalidData(
                    "gradient stop position must be finite".to_owned(),
                ));
            }
            stop.color.validate()?;
        }
        if stops.windows(2).any(|pair| pair[0].position >= pair[1].position) {
            return Err(MapError::InvalidData(
                "gradient stop positions must be strictly increasing".to_owned(),
            ));
        }
        let first = stops[0].position;
        let last = stops[stops.len() - 1].position;
        if first != 0.0 || last != 1.0 {
            return Err(MapError::InvalidData(
                "gradient stops must start at 0 and end at 1".to_owned(),
            ));
        }
        Ok(Self { stops })
    }

    /// Two-stop gradient.
    pub fn linear(start: Color, end: Color) -> MapResult<Self> {
        Self::new(vec![GradientStop::new(0.0, start), GradientStop::new(1.0, end)])
    }

    #[must_use]
    pub fn preset(preset: GradientPreset) -> Self {
        let stops = match preset {
            GradientPreset::Grayscale => vec![
                GradientStop::new(0.0, Color::BLACK),
                GradientStop::new(1.0, Color::WHITE),
            ],
            GradientPreset::Hot => vec![
                GradientStop::new(0.0, Color::BLACK),
                GradientStop::new(0.375, Color::rgb(1.0, 0.0, 0.0)),
                GradientStop::new(0.75, Color::rgb(1.0, 1.0, 0.0)),
                GradientStop::new(1.0, Color::WHITE),
            ],
            GradientPreset::Viridis => vec![
                GradientStop::new(0.0, Color::from_rgb8(0x44, 0x01, 0x54)),
                GradientStop::new(0.25, Color::from_rgb8(0x3b, 0x52, 0x8b)),
                GradientStop::new(0.5, Color::from_rgb8(0x21, 0x91, 0x8c)),
                GradientStop::new(0.75, Color::from_rgb8(0x5e, 0xc9, 0x62)),
                GradientStop::new(1.0, Color::from_rgb8(0xfd, 0xe7, 0x25)),
            ],
            GradientPreset::Rainbow => vec![
                GradientStop::new(0.0, Color::rgb(0.0, 0.0, 1.0)),
                GradientStop::new(0.25, Color::rgb(0.0, 1.0, 1.0)),
                GradientStop::new(0.5, Color::rgb(0.0, 1.0, 0.0)),
                GradientStop::new(0.75, Color::rgb(1.0, 1.0, 0.0)),
                GradientStop::new(1.0, Color::rgb(1.0, 0.0, 0.0)),
            ],
        };
        Self { stops }
    }

    #[must_use]
    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Color at normalized position `t`, clamped to `[0, 1]`.
    #[must_use]
    pub fn at(&self, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        // First stop whose position is >= t; stops are sorted.
        let upper = self
            .stops
            .partition_point(|stop| stop.position < t)
            .clamp(1, self.stops.len() - 1);
        let lo = self.stops[upper - 1];
        let hi = self.stops[upper];
        let local = (t - lo.position) / (hi.position - lo.position);
        if local >= 1.0 {
            return hi.color;
        }
        lo.color.lerp(hi.color, local.max(0.0))
    }
}

impl Default for ColorGradient {
    fn default() -> Self {
        Self::preset(GradientPreset::default())
    }
}
