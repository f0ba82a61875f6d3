use serde::{Deserialize, Serialize};

use crate::core::{DataPoint, DevicePoint, DeviceRect, LinearScale, Orientation};
use crate::error::{MapError, MapResult};

/// Coordinate transform between data space and the plotted device rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotArea {
    data_area: DeviceRect,
    domain: LinearScale,
    range: LinearScale,
    orientation: Orientation,
}

impl PlotArea {
    pub fn new(
        data_area: DeviceRect,
        domain: LinearScale,
        range: LinearScale,
        orientation: Orientation,
    ) -> MapResult<Self> {
        if !data_area.is_finite() || data_area.is_empty() {
            return Err(MapError::InvalidData(
                "data area must be finite with positive width and height".to_owned(),
            ));
        }
        Ok(Self {
            data_area,
            domain,
            range,
            orientation,
        })
    }

    #[must_use]
    pub fn data_area(&self) -> DeviceRect {
        self.data_area
    }

    #[must_use]
    pub fn domain(&self) -> LinearScale {
        self.domain
    }

    #[must_use]
    pub fn range(&self) -> LinearScale {
        self.range
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn set_data_area(&mut self, data_area: DeviceRect) -> MapResult<()> {
        *self = Self::new(data_area, self.domain, self.range, self.orientation)?;
        Ok(())
    }

    pub fn set_axes(&mut self, domain: LinearScale, range: LinearScale) {
        self.domain = domain;
        self.range = range;
    }

    /// Device coordinate along the horizontal/vertical axis used by the domain axis.
    #[must_use]
    pub fn domain_to_device(&self, x: f64) -> f64 {
        let area = self.data_area;
        match self.orientation {
            Orientation::Vertical => self.domain.value_to_device(x, area.x, area.width),
            Orientation::Horizontal => {
                self.domain.value_to_device(x, area.bottom(), -area.height)
            }
        }
    }

    #[must_use]
    pub fn range_to_device(&self, y: f64) -> f64 {
        let area = self.data_area;
        match self.orientation {
            Orientation::Vertical => self.range.value_to_device(y, area.bottom(), -area.height),
            Orientation::Horizontal => self.range.value_to_device(y, area.x, area.width),
        }
    }

    #[must_use]
    pub fn data_to_device(&self, point: DataPoint) -> DevicePoint {
        let along_domain = self.domain_to_device(point.x);
        let along_range = self.range_to_device(point.y);
        match self.orientation {
            Orientation::Vertical => DevicePoint::new(along_domain, along_range),
            Orientation::Horizontal => DevicePoint::new(along_range, along_domain),
        }
    }

    #[must_use]
    pub fn device_to_data(&self, point: DevicePoint) -> DataPoint {
        let area = self.data_area;
        match self.orientation {
            Orientation::Vertical => DataPoint::new(
                self.domain.device_to_value(point.x, area.x, area.width),
                self.range
                    .device_to_value(point.y, area.bottom(), -area.height),
            ),
            Orientation::Horizontal => DataPoint::new(
                self.domain
                    .device_to_value(point.y, area.bottom(), -area.height),
                self.range.device_to_value(point.x, area.x, area.width),
            ),
        }
    }

    #[must_use]
    pub fn contains(&self, point: DevicePoint) -> bool {
        self.data_area.contains(point)
    }

    /// Shifts both axes by data-space deltas.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.domain = self.domain.shifted(dx);
        self.range = self.range.shifted(dy);
    }
}
