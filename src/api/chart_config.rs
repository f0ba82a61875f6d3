use serde::{Deserialize, Serialize};

use crate::core::{DeviceRect, Orientation, Viewport};
use crate::error::{MapError, MapResult};
use crate::interaction::OverlayStyle;
use crate::raster::{GradientPreset, MaskPolicy, OutsideRangeColors, RangeSelector};
use crate::render::Color;

/// Public chart bootstrap configuration.
///
/// Serializable so host applications can persist and reload a map setup
/// without inventing their own format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapChartConfig {
    pub viewport: Viewport,
    /// Device rectangle the data is plotted into.
    pub data_area: DeviceRect,
    pub domain_start: f64,
    pub domain_end: f64,
    pub range_start: f64,
    pub range_end: f64,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub gradient: GradientPreset,
    #[serde(default = "default_nan_color")]
    pub nan_color: Color,
    #[serde(default = "default_underflow_color")]
    pub underflow_color: Color,
    #[serde(default = "default_overflow_color")]
    pub overflow_color: Color,
    #[serde(default)]
    pub use_outside_range_colors: bool,
    #[serde(default)]
    pub mask_policy: MaskPolicy,
    #[serde(default = "default_mask_color")]
    pub mask_color: Color,
    #[serde(default)]
    pub range_selector: RangeSelector,
    /// Device-pixel radius used for anchor and knob hits.
    #[serde(default = "default_hit_tolerance")]
    pub hit_tolerance: f64,
    #[serde(default)]
    pub overlay_style: OverlayStyle,
}

impl MapChartConfig {
    /// Creates a config with default colors, `FULL` range selection and no mask.
    #[must_use]
    pub fn new(
        viewport: Viewport,
        data_area: DeviceRect,
        domain: (f64, f64),
        range: (f64, f64),
    ) -> Self {
        Self {
            viewport,
            data_area,
            domain_start: domain.0,
            domain_end: domain.1,
            range_start: range.0,
            range_end: range.1,
            orientation: Orientation::default(),
            gradient: GradientPreset::default(),
            nan_color: default_nan_color(),
            underflow_color: default_underflow_color(),
            overflow_color: default_overflow_color(),
            use_outside_range_colors: false,
            mask_policy: MaskPolicy::default(),
            mask_color: default_mask_color(),
            range_selector: RangeSelector::default(),
            hit_tolerance: default_hit_tolerance(),
            overlay_style: OverlayStyle::default(),
        }
    }

    /// Config whose data area fills the whole viewport.
    #[must_use]
    pub fn filling(viewport: Viewport, domain: (f64, f64), range: (f64, f64)) -> Self {
        let data_area = DeviceRect::new(
            0.0,
            0.0,
            f64::from(viewport.width),
            f64::from(viewport.height),
        );
        Self::new(viewport, data_area, domain, range)
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub fn with_gradient(mut self, gradient: GradientPreset) -> Self {
        self.gradient = gradient;
        self
    }

    #[must_use]
    pub fn with_nan_color(mut self, color: Color) -> Self {
        self.nan_color = color;
        self
    }

    /// Enables distinct colors for values below/above the active bounds.
    #[must_use]
    pub fn with_outside_range_colors(mut self, underflow: Color, overflow: Color) -> Self {
        self.underflow_color = underflow;
        self.overflow_color = overflow;
        self.use_outside_range_colors = true;
        self
    }

    #[must_use]
    pub fn with_mask(mut self, policy: MaskPolicy, color: Color) -> Self {
        self.mask_policy = policy;
        self.mask_color = color;
        self
    }

    #[must_use]
    pub fn with_range_selector(mut self, selector: RangeSelector) -> Self {
        self.range_selector = selector;
        self
    }

    #[must_use]
    pub fn with_hit_tolerance(mut self, hit_tolerance: f64) -> Self {
        self.hit_tolerance = hit_tolerance;
        self
    }

    #[must_use]
    pub fn with_overlay_style(mut self, style: OverlayStyle) -> Self {
        self.overlay_style = style;
        self
    }

    #[must_use]
    pub fn outside_range_colors(&self) -> OutsideRangeColors {
        OutsideRangeColors {
            underflow: self.underflow_color,
            overflow: self.overflow_color,
            enabled: self.use_outside_range_colors,
        }
    }

    /// Checks everything that does not need a constructed chart.
    pub fn validate(&self) -> MapResult<()> {
        if !self.viewport.is_valid() {
            return Err(MapError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        if !self.hit_tolerance.is_finite() || self.hit_tolerance < 0.0 {
            return Err(MapError::InvalidData(
                "hit tolerance must be finite and >= 0".to_owned(),
            ));
        }
        if !self.overlay_style.stroke_width.is_finite()
            || self.overlay_style.stroke_width <= 0.0
            || !self.overlay_style.knob_half_size.is_finite()
            || self.overlay_style.knob_half_size < 0.0
        {
            return Err(MapError::InvalidData(
                "overlay stroke width must be > 0 and knob size >= 0".to_owned(),
            ));
        }
        for color in [
            self.nan_color,
            self.underflow_color,
            self.overflow_color,
            self.mask_color,
            self.overlay_style.stroke,
            self.overlay_style.knob_color,
        ] {
            color.validate()?;
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> MapResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MapError::InvalidData(format!("failed to serialize chart config: {e}")))
    }

    pub fn from_json_str(input: &str) -> MapResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| MapError::InvalidData(format!("failed to parse chart config json: {e}")))
    }
}

fn default_nan_color() -> Color {
    Color::TRANSPARENT
}

fn default_underflow_color() -> Color {
    OutsideRangeColors::default().underflow
}

fn default_overflow_color() -> Color {
    OutsideRangeColors::default().overflow
}

fn default_mask_color() -> Color {
    Color::rgb(0.5, 0.5, 0.5)
}

fn default_hit_tolerance() -> f64 {
    4.0
}
