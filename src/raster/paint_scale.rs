use crate::error::{MapError, MapResult};
use crate::raster::ColorGradient;
use crate::render::Color;

const LUT_SIZE: usize = 1024;

/// Value-to-pixel lookup consumed by the compositor.
///
/// Kept as a static-dispatch seam so the per-cell loop never goes through a
/// vtable.
pub trait ScaleLookup {
    fn argb(&self, z: f64) -> u32;
}

/// Outside-range coloring options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutsideRangeColors {
    pub underflow: Color,
    pub overflow: Color,
    pub enabled: bool,
}

impl Default for OutsideRangeColors {
    fn default() -> Self {
        Self {
            underflow: Color::rgb(0.0, 0.0, 0.5),
            overflow: Color::rgb(0.5, 0.0, 0.0),
            enabled: false,
        }
    }
}

/// Immutable value-to-color mapping over `[lower, upper]`.
///
/// Replaced as a whole whenever bounds, gradient or outside-range colors
/// change. A 1024-entry packed lookup table is precomputed for the raster
/// path; `color` evaluates the gradient exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintScale {
    lower: f64,
    upper: f64,
    gradient: ColorGradient,
    outside: OutsideRangeColors,
    nan_color: Color,
    lut: Vec<u32>,
}

impl PaintScale {
    pub fn new(lower: f64, upper: f64, gradient: ColorGradient) -> MapResult<Self> {
        Self::build(
            lower,
            upper,
            gradient,
            OutsideRangeColors::default(),
            Color::TRANSPARENT,
        )
    }

    fn build(
        lower: f64,
        upper: f64,
        gradient: ColorGradient,
        outside: OutsideRangeColors,
        nan_color: Color,
    ) -> MapResult<Self> {
        validate_bounds(lower, upper)?;
        outside.underflow.validate()?;
        outside.overflow.validate()?;
        nan_color.validate()?;
        Ok(Self::assemble(lower, upper, gradient, outside, nan_color))
    }

    /// Scale over `[0, 1]`, used before any data is loaded.
    #[must_use]
    pub fn unit(gradient: ColorGradient) -> Self {
        Self::assemble(
            0.0,
            1.0,
            gradient,
            OutsideRangeColors::default(),
            Color::TRANSPARENT,
        )
    }

    fn assemble(
        lower: f64,
        upper: f64,
        gradient: ColorGradient,
        outside: OutsideRangeColors,
        nan_color: Color,
    ) -> Self {
        let lut = (0..LUT_SIZE)
            .map(|index| {
                gradient
                    .at(index as f64 / (LUT_SIZE - 1) as f64)
                    .to_argb32()
            })
            .collect();
        Self {
            lower,
            upper,
            gradient,
            outside,
            nan_color,
            lut,
        }
    }

    /// Copy of this scale with new bounds.
    pub fn with_bounds(&self, lower: f64, upper: f64) -> MapResult<Self> {
        validate_bounds(lower, upper)?;
        let mut next = self.clone();
        next.lower = lower;
        next.upper = upper;
        Ok(next)
    }

    pub fn with_gradient(&self, gradient: ColorGradient) -> MapResult<Self> {
        Self::build(self.lower, self.upper, gradient, self.outside, self.nan_color)
    }

    pub fn with_outside_range_colors(&self, outside: OutsideRangeColors) -> MapResult<Self> {
        outside.underflow.validate()?;
        outside.overflow.validate()?;
        let mut next = self.clone();
        next.outside = outside;
        Ok(next)
    }

    pub fn with_nan_color(&self, nan_color: Color) -> MapResult<Self> {
        nan_color.validate()?;
        let mut next = self.clone();
        next.nan_color = nan_color;
        Ok(next)
    }

    #[must_use]
    pub fn lower_bound(&self) -> f64 {
        self.lower
    }

    #[must_use]
    pub fn upper_bound(&self) -> f64 {
        self.upper
    }

    #[must_use]
    pub fn gradient(&self) -> &ColorGradient {
        &self.gradient
    }

    #[must_use]
    pub fn outside_range_colors(&self) -> OutsideRangeColors {
        self.outside
    }

    #[must_use]
    pub fn nan_color(&self) -> Color {
        self.nan_color
    }

    /// Gradient position of `z`; a degenerate range puts every value at 0.
    #[must_use]
    pub fn fraction(&self, z: f64) -> f64 {
        let span = self.upper - self.lower;
        if span <= 0.0 {
            return 0.0;
        }
        ((z - self.lower) / span).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn color(&self, z: f64) -> Color {
        if z.is_nan() {
            return self.nan_color;
        }
        if let Some(color) = self.outside_color(z) {
            return color;
        }
        self.gradient.at(self.fraction(z))
    }

    fn outside_color(&self, z: f64) -> Option<Color> {
        if !self.outside.enabled {
            return None;
        }
        if z < self.lower {
            Some(self.outside.underflow)
        } else if z > self.upper {
            Some(self.outside.overflow)
        } else {
            None
        }
    }
}

impl Default for PaintScale {
    fn default() -> Self {
        Self::unit(ColorGradient::default())
    }
}

impl ScaleLookup for PaintScale {
    fn argb(&self, z: f64) -> u32 {
        if z.is_nan() {
            return self.nan_color.to_argb32();
        }
        if let Some(color) = self.outside_color(z) {
            return color.to_argb32();
        }
        let index = (self.fraction(z) * (LUT_SIZE - 1) as f64).round() as usize;
        self.lut[index.min(LUT_SIZE - 1)]
    }
}

pub(crate) fn validate_bounds(lower: f64, upper: f64) -> MapResult<()> {
    if !lower.is_finite() || !upper.is_finite() || lower > upper {
        return Err(MapError::InvalidBounds { lower, upper });
    }
    Ok(())
}
