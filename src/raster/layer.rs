use tracing::debug;

use crate::core::{Grid2D, PlotArea, SharedField, ensure_field_matches, finite_min_max};
use crate::error::{MapError, MapResult};
use crate::raster::{
    AutomaticBounds, Bounds, ColorGradient, GradientRangeState, MaskPolicy, MaskSpec, NoRegion,
    OutsideRangeColors, PaintScale, PercentileBounds, RangeSelector, RasterOutput, Region,
    composite,
};
use crate::render::Color;

/// Named properties broadcast to layer listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerProperty {
    LowerBound,
    UpperBound,
    LowerFullBound,
    UpperFullBound,
    LowerAutomaticBound,
    UpperAutomaticBound,
    LowerRoiBound,
    UpperRoiBound,
    GradientRangeSelector,
    RoiSamplesNeeded,
    PaintScale,
    Mask,
    DataChanged,
}

impl LayerProperty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LowerBound => "LOWER_BOUND",
            Self::UpperBound => "UPPER_BOUND",
            Self::LowerFullBound => "LOWER_FULL_BOUND",
            Self::UpperFullBound => "UPPER_FULL_BOUND",
            Self::LowerAutomaticBound => "LOWER_AUTOMATIC_BOUND",
            Self::UpperAutomaticBound => "UPPER_AUTOMATIC_BOUND",
            Self::LowerRoiBound => "LOWER_ROI_BOUND",
            Self::UpperRoiBound => "UPPER_ROI_BOUND",
            Self::GradientRangeSelector => "GRADIENT_RANGE_SELECTOR",
            Self::RoiSamplesNeeded => "ROI_SAMPLES_NEEDED",
            Self::PaintScale => "PAINT_SCALE",
            Self::Mask => "MASK",
            Self::DataChanged => "DATA_CHANGED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChangeValue {
    /// No value (bound pair not computed yet).
    Missing,
    Number(f64),
    Flag(bool),
    Selector(RangeSelector),
    /// Pure signal without payload.
    Signal,
}

/// Fire-and-forget property change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerChange {
    pub property: LayerProperty,
    pub old: ChangeValue,
    pub new: ChangeValue,
}

/// Observer of raster layer changes (legends, linked displays).
pub trait LayerListener {
    fn id(&self) -> &str;
    fn on_change(&mut self, change: &LayerChange);
}

/// Color-mapping renderer for one scalar field.
///
/// Owns the paint scale, the gradient range state machine and the mask
/// configuration. Every bound change rebuilds the paint scale immediately
/// and is broadcast to listeners.
pub struct RasterLayer {
    data: Option<(Grid2D, SharedField)>,
    paint_scale: PaintScale,
    range: GradientRangeState,
    automatic_bounds: Box<dyn AutomaticBounds>,
    mask_policy: MaskPolicy,
    mask_region: Box<dyn Region + Send + Sync>,
    mask_color: Color,
    listeners: Vec<Box<dyn LayerListener>>,
}

impl std::fmt::Debug for RasterLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterLayer")
            .field("grid", &self.data.as_ref().map(|(grid, _)| *grid))
            .field("paint_scale", &self.paint_scale)
            .field("range", &self.range)
            .field("mask_policy", &self.mask_policy)
            .field("mask_region", &self.mask_region)
            .field("mask_color", &self.mask_color)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for RasterLayer {
    fn default() -> Self {
        Self::new(ColorGradient::default())
    }
}

impl RasterLayer {
    #[must_use]
    pub fn new(gradient: ColorGradient) -> Self {
        Self {
            data: None,
            paint_scale: PaintScale::unit(gradient),
            range: GradientRangeState::default(),
            automatic_bounds: Box::new(PercentileBounds::default()),
            mask_policy: MaskPolicy::NoMask,
            mask_region: Box::new(NoRegion),
            mask_color: Color::TRANSPARENT,
            listeners: Vec::new(),
        }
    }

    #[must_use]
    pub fn paint_scale(&self) -> &PaintScale {
        &self.paint_scale
    }

    #[must_use]
    pub fn range_state(&self) -> &GradientRangeState {
        &self.range
    }

    #[must_use]
    pub fn gradient_range_selector(&self) -> RangeSelector {
        self.range.selector()
    }

    #[must_use]
    pub fn lower_bound(&self) -> f64 {
        self.paint_scale.lower_bound()
    }

    #[must_use]
    pub fn upper_bound(&self) -> f64 {
        self.paint_scale.upper_bound()
    }

    #[must_use]
    pub fn grid(&self) -> Option<Grid2D> {
        self.data.as_ref().map(|(grid, _)| *grid)
    }

    #[must_use]
    pub fn field(&self) -> Option<&SharedField> {
        self.data.as_ref().map(|(_, field)| field)
    }

    #[must_use]
    pub fn mask_policy(&self) -> MaskPolicy {
        self.mask_policy
    }

    #[must_use]
    pub fn mask_color(&self) -> Color {
        self.mask_color
    }

    #[must_use]
    pub fn mask_region(&self) -> &(dyn Region + Send + Sync) {
        self.mask_region.as_ref()
    }

    /// Whether a collaborator must compute and push ROI samples.
    #[must_use]
    pub fn are_roi_samples_needed(&self) -> bool {
        self.range.roi_samples_needed()
    }

    /// Registers a listener with unique identifier.
    pub fn register_listener(&mut self, listener: Box<dyn LayerListener>) -> MapResult<()> {
        let listener_id = listener.id().to_owned();
        if listener_id.is_empty() {
            return Err(MapError::InvalidData(
                "listener id must not be empty".to_owned(),
            ));
        }
        if self.has_listener(&listener_id) {
            return Err(MapError::InvalidData(format!(
                "listener with id `{listener_id}` is already registered"
            )));
        }
        self.listeners.push(listener);
        Ok(())
    }

    /// Unregisters a listener by id. Returns `true` when removed.
    pub fn unregister_listener(&mut self, listener_id: &str) -> bool {
        if let Some(position) = self
            .listeners
            .iter()
            .position(|entry| entry.id() == listener_id)
        {
            self.listeners.remove(position);
            return true;
        }
        false
    }

    #[must_use]
    pub fn has_listener(&self, listener_id: &str) -> bool {
        self.listeners.iter().any(|entry| entry.id() == listener_id)
    }

    /// Replaces the field. Full bounds are recomputed right away; automatic
    /// bounds only when `Automatic` is the active selector.
    pub fn set_data(&mut self, grid: Grid2D, field: SharedField) -> MapResult<()> {
        ensure_field_matches(field.as_ref(), grid)?;
        let full = finite_min_max(field.as_ref()).and_then(|(lo, hi)| Bounds::new(lo, hi).ok());
        self.data = Some((grid, field));
        self.replace_full_bounds(full);
        Ok(())
    }

    pub fn clear_data(&mut self) {
        self.data = None;
        self.replace_full_bounds(None);
    }

    fn replace_full_bounds(&mut self, full: Option<Bounds>) {
        let old = self.range.full();
        self.range.data_changed(full);
        debug!(?full, "raster data changed");
        self.emit_bound_pair(
            (LayerProperty::LowerFullBound, LayerProperty::UpperFullBound),
            old,
            full,
        );
        self.emit(LayerProperty::DataChanged, ChangeValue::Signal, ChangeValue::Signal);
        self.refresh_automatic_if_needed();
        self.apply_active_bounds();
    }

    pub fn set_gradient_range_selector(&mut self, selector: RangeSelector) {
        let old_selector = self.range.selector();
        let old_needed = self.range.roi_samples_needed();
        self.range.select(selector);
        if old_selector != selector {
            debug!(
                from = old_selector.as_str(),
                to = selector.as_str(),
                "gradient range selector changed"
            );
            self.emit(
                LayerProperty::GradientRangeSelector,
                ChangeValue::Selector(old_selector),
                ChangeValue::Selector(selector),
            );
        }
        self.emit(
            LayerProperty::RoiSamplesNeeded,
            ChangeValue::Flag(old_needed),
            ChangeValue::Flag(self.range.roi_samples_needed()),
        );
        self.refresh_automatic_if_needed();
        self.apply_active_bounds();
    }

    /// Shortcut for selecting the full data range.
    pub fn set_lens_to_full(&mut self) {
        self.set_gradient_range_selector(RangeSelector::Full);
    }

    pub fn set_lower_bound(&mut self, lower: f64) -> MapResult<()> {
        let upper = self.range.active().upper();
        self.set_manual_bounds(Bounds::new(lower, upper)?);
        Ok(())
    }

    pub fn set_upper_bound(&mut self, upper: f64) -> MapResult<()> {
        let lower = self.range.active().lower();
        self.set_manual_bounds(Bounds::new(lower, upper)?);
        Ok(())
    }

    pub fn set_gradient_bounds(&mut self, lower: f64, upper: f64) -> MapResult<()> {
        self.set_manual_bounds(Bounds::new(lower, upper)?);
        Ok(())
    }

    fn set_manual_bounds(&mut self, bounds: Bounds) {
        let old_selector = self.range.selector();
        let old_needed = self.range.roi_samples_needed();
        self.range.set_manual(bounds);
        if old_selector != RangeSelector::Manual {
            self.emit(
                LayerProperty::GradientRangeSelector,
                ChangeValue::Selector(old_selector),
                ChangeValue::Selector(RangeSelector::Manual),
            );
            self.emit(
                LayerProperty::RoiSamplesNeeded,
                ChangeValue::Flag(old_needed),
                ChangeValue::Flag(false),
            );
        }
        self.apply_active_bounds();
    }

    /// Pushes the sample used by `RoiFull`; an empty or all-NaN sample clears it.
    pub fn set_roi_samples(&mut self, samples: impl IntoIterator<Item = f64>) {
        let roi = Bounds::of_samples(samples);
        let old = self.range.roi();
        self.range.set_roi(roi);
        self.emit_bound_pair(
            (LayerProperty::LowerRoiBound, LayerProperty::UpperRoiBound),
            old,
            roi,
        );
        self.apply_active_bounds();
    }

    /// Swaps the automatic-bounds heuristic and invalidates its cache.
    pub fn set_automatic_bounds(&mut self, automatic_bounds: Box<dyn AutomaticBounds>) {
        self.automatic_bounds = automatic_bounds;
        self.range.data_changed(self.range.full());
        self.refresh_automatic_if_needed();
        self.apply_active_bounds();
    }

    pub fn set_gradient(&mut self, gradient: ColorGradient) -> MapResult<()> {
        self.paint_scale = self.paint_scale.with_gradient(gradient)?;
        self.emit(LayerProperty::PaintScale, ChangeValue::Signal, ChangeValue::Signal);
        Ok(())
    }

    pub fn set_outside_range_colors(&mut self, outside: OutsideRangeColors) -> MapResult<()> {
        self.paint_scale = self.paint_scale.with_outside_range_colors(outside)?;
        self.emit(LayerProperty::PaintScale, ChangeValue::Signal, ChangeValue::Signal);
        Ok(())
    }

    pub fn set_nan_color(&mut self, nan_color: Color) -> MapResult<()> {
        self.paint_scale = self.paint_scale.with_nan_color(nan_color)?;
        self.emit(LayerProperty::PaintScale, ChangeValue::Signal, ChangeValue::Signal);
        Ok(())
    }

    pub fn set_mask_policy(&mut self, policy: MaskPolicy) {
        if self.mask_policy != policy {
            self.mask_policy = policy;
            self.emit(LayerProperty::Mask, ChangeValue::Signal, ChangeValue::Signal);
        }
    }

    pub fn set_mask_region(&mut self, region: Box<dyn Region + Send + Sync>) {
        self.mask_region = region;
        self.emit(LayerProperty::Mask, ChangeValue::Signal, ChangeValue::Signal);
    }

    pub fn set_mask_color(&mut self, color: Color) -> MapResult<()> {
        color.validate()?;
        self.mask_color = color;
        self.emit(LayerProperty::Mask, ChangeValue::Signal, ChangeValue::Signal);
        Ok(())
    }

    /// Composites the loaded field for the given plot geometry.
    pub fn composite(&self, plot_area: &PlotArea) -> MapResult<Option<RasterOutput>> {
        let Some((grid, field)) = &self.data else {
            return Ok(None);
        };
        let mask = MaskSpec {
            policy: self.mask_policy,
            region: self.mask_region.as_ref(),
            color: self.mask_color,
        };
        composite(field.as_ref(), *grid, &self.paint_scale, mask, plot_area)
    }

    /// Sample under a data cell, if data is loaded and the cell exists.
    #[must_use]
    pub fn value_at(&self, row: usize, col: usize) -> Option<f64> {
        let (grid, field) = self.data.as_ref()?;
        (row < grid.row_count() && col < grid.column_count()).then(|| field.z(row, col))
    }

    fn refresh_automatic_if_needed(&mut self) {
        if !self.range.needs_automatic_refresh() {
            return;
        }
        let automatic = self
            .data
            .as_ref()
            .and_then(|(_, field)| self.automatic_bounds.compute(field.as_ref()));
        let old = self.range.automatic();
        self.range.set_automatic(automatic);
        debug!(?automatic, "automatic bounds refreshed");
        self.emit_bound_pair(
            (
                LayerProperty::LowerAutomaticBound,
                LayerProperty::UpperAutomaticBound,
            ),
            old,
            automatic,
        );
    }

    /// Rebuilds the paint scale when the active pair moved.
    fn apply_active_bounds(&mut self) {
        let active = self.range.active();
        let old_lower = self.paint_scale.lower_bound();
        let old_upper = self.paint_scale.upper_bound();
        if old_lower == active.lower() && old_upper == active.upper() {
            return;
        }
        match self.paint_scale.with_bounds(active.lower(), active.upper()) {
            Ok(scale) => self.paint_scale = scale,
            Err(err) => {
                tracing::warn!(error = %err, "keeping previous paint scale");
                return;
            }
        }
        if old_lower != active.lower() {
            self.emit(
                LayerProperty::LowerBound,
                ChangeValue::Number(old_lower),
                ChangeValue::Number(active.lower()),
            );
        }
        if old_upper != active.upper() {
            self.emit(
                LayerProperty::UpperBound,
                ChangeValue::Number(old_upper),
                ChangeValue::Number(active.upper()),
            );
        }
        self.emit(LayerProperty::PaintScale, ChangeValue::Signal, ChangeValue::Signal);
    }

    fn emit_bound_pair(
        &mut self,
        (lower, upper): (LayerProperty, LayerProperty),
        old: Option<Bounds>,
        new: Option<Bounds>,
    ) {
        let value = |bounds: Option<Bounds>, pick: fn(Bounds) -> f64| {
            bounds.map_or(ChangeValue::Missing, |b| ChangeValue::Number(pick(b)))
        };
        let (old_lower, new_lower) = (value(old, Bounds::lower), value(new, Bounds::lower));
        let (old_upper, new_upper) = (value(old, Bounds::upper), value(new, Bounds::upper));
        if old_lower != new_lower {
            self.emit(lower, old_lower, new_lower);
        }
        if old_upper != new_upper {
            self.emit(upper, old_upper, new_upper);
        }
    }

    fn emit(&mut self, property: LayerProperty, old: ChangeValue, new: ChangeValue) {
        let change = LayerChange { property, old, new };
        for listener in &mut self.listeners {
            listener.on_change(&change);
        }
    }
}

