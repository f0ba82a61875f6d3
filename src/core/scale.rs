use serde::{Deserialize, Serialize};

use crate::error::{MapError, MapResult};

/// Affine axis model mapping a finite, non-degenerate domain onto a device span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64) -> MapResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(MapError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    /// Smallest and largest domain value regardless of axis direction.
    #[must_use]
    pub fn extent(self) -> (f64, f64) {
        (
            self.domain_start.min(self.domain_end),
            self.domain_start.max(self.domain_end),
        )
    }

    /// Maps `value` to `span_start + fraction * span_length`.
    ///
    /// A negative `span_length` produces an upward-growing device axis.
    #[must_use]
    pub fn value_to_device(self, value: f64, span_start: f64, span_length: f64) -> f64 {
        let span = self.domain_end - self.domain_start;
        let normalized = (value - self.domain_start) / span;
        span_start + normalized * span_length
    }

    #[must_use]
    pub fn device_to_value(self, device: f64, span_start: f64, span_length: f64) -> f64 {
        let span = self.domain_end - self.domain_start;
        let normalized = (device - span_start) / span_length;
        self.domain_start + normalized * span
    }

    /// Returns the scale shifted by `delta` domain units.
    #[must_use]
    pub fn shifted(self, delta: f64) -> Self {
        Self {
            domain_start: self.domain_start + delta,
            domain_end: self.domain_end + delta,
        }
    }
}
