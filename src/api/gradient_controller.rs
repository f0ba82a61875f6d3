use crate::error::MapResult;
use crate::interaction::Supervisor;
use crate::raster::{
    Bounds, ColorGradient, GradientPreset, MaskPolicy, OutsideRangeColors, PaintScale,
    RangeSelector,
};
use crate::render::{Color, Renderer};

use super::MapChart;

impl<R: Renderer, S: Supervisor> MapChart<R, S> {
    #[must_use]
    pub fn paint_scale(&self) -> &PaintScale {
        self.layer.paint_scale()
    }

    #[must_use]
    pub fn gradient_range_selector(&self) -> RangeSelector {
        self.layer.gradient_range_selector()
    }

    /// Active `(lower, upper)` paint-scale bounds.
    #[must_use]
    pub fn gradient_bounds(&self) -> (f64, f64) {
        (self.layer.lower_bound(), self.layer.upper_bound())
    }

    #[must_use]
    pub fn full_bounds(&self) -> Option<Bounds> {
        self.layer.range_state().full()
    }

    pub fn set_gradient(&mut self, gradient: ColorGradient) -> MapResult<()> {
        self.layer.set_gradient(gradient)
    }

    pub fn set_gradient_preset(&mut self, preset: GradientPreset) -> MapResult<()> {
        self.config.gradient = preset;
        self.layer.set_gradient(ColorGradient::preset(preset))
    }

    /// Switches the bound selector. Entering `ROI_FULL` pulls samples from
    /// the current ROIs right away.
    pub fn set_gradient_range_selector(&mut self, selector: RangeSelector) -> MapResult<()> {
        self.layer.set_gradient_range_selector(selector);
        self.refresh_roi_samples()
    }

    pub fn set_lens_to_full(&mut self) {
        self.layer.set_lens_to_full();
    }

    /// Sets explicit bounds; the selector becomes `MANUAL`.
    pub fn set_gradient_bounds(&mut self, lower: f64, upper: f64) -> MapResult<()> {
        self.layer.set_gradient_bounds(lower, upper)
    }

    pub fn set_lower_bound(&mut self, lower: f64) -> MapResult<()> {
        self.layer.set_lower_bound(lower)
    }

    pub fn set_upper_bound(&mut self, upper: f64) -> MapResult<()> {
        self.layer.set_upper_bound(upper)
    }

    pub fn set_outside_range_colors(&mut self, outside: OutsideRangeColors) -> MapResult<()> {
        self.layer.set_outside_range_colors(outside)?;
        self.config.underflow_color = outside.underflow;
        self.config.overflow_color = outside.overflow;
        self.config.use_outside_range_colors = outside.enabled;
        Ok(())
    }

    pub fn set_nan_color(&mut self, color: Color) -> MapResult<()> {
        self.layer.set_nan_color(color)?;
        self.config.nan_color = color;
        Ok(())
    }

    #[must_use]
    pub fn mask_policy(&self) -> MaskPolicy {
        self.layer.mask_policy()
    }

    /// Masks cells against the union of the current ROIs.
    pub fn set_mask_policy(&mut self, policy: MaskPolicy) {
        self.layer.set_mask_policy(policy);
        self.config.mask_policy = policy;
    }

    pub fn set_mask_color(&mut self, color: Color) -> MapResult<()> {
        self.layer.set_mask_color(color)?;
        self.config.mask_color = color;
        Ok(())
    }
}
