use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::{ScalarField, finite_samples};
use crate::error::{MapError, MapResult};
use crate::raster::paint_scale::validate_bounds;

/// Which bound pair drives the active paint-scale bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RangeSelector {
    /// Global min/max of the current field.
    #[default]
    Full,
    /// Cached data-driven heuristic range.
    Automatic,
    /// Last explicit user bounds.
    Manual,
    /// Min/max of a caller-supplied sample (typically the ROI interior).
    RoiFull,
}

impl RangeSelector {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "FULL",
            Self::Automatic => "AUTOMATIC",
            Self::Manual => "MANUAL",
            Self::RoiFull => "ROI_FULL",
        }
    }
}

/// Validated `[lower, upper]` pair with `lower <= upper`, both finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    lower: f64,
    upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> MapResult<Self> {
        validate_bounds(lower, upper)?;
        Ok(Self { lower, upper })
    }

    /// Min/max of the finite values in `samples`; `None` when there are none.
    #[must_use]
    pub fn of_samples(samples: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut range: Option<(OrderedFloat<f64>, OrderedFloat<f64>)> = None;
        for z in samples.into_iter().filter(|z| z.is_finite()) {
            let z = OrderedFloat(z);
            range = Some(match range {
                Some((lo, hi)) => (lo.min(z), hi.max(z)),
                None => (z, z),
            });
        }
        range.map(|(lo, hi)| Self {
            lower: lo.0,
            upper: hi.0,
        })
    }

    #[must_use]
    pub fn lower(self) -> f64 {
        self.lower
    }

    #[must_use]
    pub fn upper(self) -> f64 {
        self.upper
    }
}

/// Data-driven heuristic for the `Automatic` range.
pub trait AutomaticBounds {
    fn compute(&self, field: &dyn ScalarField) -> Option<Bounds>;
}

/// Percentile clip of the finite samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileBounds {
    pub low: f64,
    pub high: f64,
}

impl Default for PercentileBounds {
    fn default() -> Self {
        Self {
            low: 0.02,
            high: 0.98,
        }
    }
}

impl PercentileBounds {
    pub fn new(low: f64, high: f64) -> MapResult<Self> {
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low > high {
            return Err(MapError::InvalidData(
                "percentiles must satisfy 0 <= low <= high <= 1".to_owned(),
            ));
        }
        Ok(Self { low, high })
    }
}

impl AutomaticBounds for PercentileBounds {
    fn compute(&self, field: &dyn ScalarField) -> Option<Bounds> {
        let mut samples = finite_samples(field);
        if samples.is_empty() {
            return None;
        }
        samples.sort_unstable_by_key(|z| OrderedFloat(*z));
        let last = (samples.len() - 1) as f64;
        let lower = samples[(self.low * last).round() as usize];
        let upper = samples[(self.high * last).round() as usize];
        Some(Bounds { lower, upper })
    }
}

/// Gradient range state machine.
///
/// The active bounds are always the pair named by the selector. Missing
/// pairs fall back to the full bounds, then to `[0, 1]` when no data is
/// loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientRangeState {
    selector: RangeSelector,
    full: Option<Bounds>,
    automatic: Option<Bounds>,
    automatic_refreshed: bool,
    roi: Option<Bounds>,
    manual: Option<Bounds>,
}

const FALLBACK: Bounds = Bounds {
    lower: 0.0,
    upper: 1.0,
};

impl Default for GradientRangeState {
    fn default() -> Self {
        Self {
            selector: RangeSelector::Full,
            full: None,
            automatic: None,
            automatic_refreshed: false,
            roi: None,
            manual: None,
        }
    }
}

impl GradientRangeState {
    #[must_use]
    pub fn selector(&self) -> RangeSelector {
        self.selector
    }

    #[must_use]
    pub fn full(&self) -> Option<Bounds> {
        self.full
    }

    #[must_use]
    pub fn automatic(&self) -> Option<Bounds> {
        self.automatic
    }

    #[must_use]
    pub fn roi(&self) -> Option<Bounds> {
        self.roi
    }

    #[must_use]
    pub fn manual(&self) -> Option<Bounds> {
        self.manual
    }

    #[must_use]
    pub fn active(&self) -> Bounds {
        let selected = match self.selector {
            RangeSelector::Full => self.full,
            RangeSelector::Automatic => self.automatic,
            RangeSelector::Manual => self.manual,
            RangeSelector::RoiFull => self.roi,
        };
        selected.or(self.full).unwrap_or(FALLBACK)
    }

    /// Switches selector. Entering `Manual` without prior manual bounds pins
    /// the currently active bounds.
    pub fn select(&mut self, selector: RangeSelector) {
        if selector == RangeSelector::Manual && self.manual.is_none() {
            self.manual = Some(self.active());
        }
        self.selector = selector;
    }

    /// Stores explicit bounds and forces `Manual`.
    pub fn set_manual(&mut self, bounds: Bounds) {
        self.manual = Some(bounds);
        self.selector = RangeSelector::Manual;
    }

    /// Replaces the full bounds and marks the automatic cache stale.
    pub fn data_changed(&mut self, full: Option<Bounds>) {
        self.full = full;
        self.automatic_refreshed = false;
    }

    /// True when the automatic cache is stale and actually in use.
    #[must_use]
    pub fn needs_automatic_refresh(&self) -> bool {
        self.selector == RangeSelector::Automatic && !self.automatic_refreshed
    }

    pub fn set_automatic(&mut self, automatic: Option<Bounds>) {
        self.automatic = automatic;
        self.automatic_refreshed = true;
    }

    pub fn set_roi(&mut self, roi: Option<Bounds>) {
        self.roi = roi;
    }

    #[must_use]
    pub fn roi_samples_needed(&self) -> bool {
        self.selector == RangeSelector::RoiFull
    }
}
