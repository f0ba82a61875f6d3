use serde::{Deserialize, Serialize};

use crate::error::{MapError, MapResult};

/// Immutable regular grid geometry.
///
/// Columns run along the domain axis (`x`), rows along the range axis (`y`).
/// `origin_x`/`origin_y` locate the center of cell `(0, 0)`; cell `(row, col)`
/// is centered at `(origin_x + col * x_increment, origin_y + row * y_increment)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid2D {
    row_count: usize,
    column_count: usize,
    x_increment: f64,
    y_increment: f64,
    origin_x: f64,
    origin_y: f64,
}

impl Grid2D {
    /// Builds a validated grid.
    ///
    /// Invariants:
    /// - `row_count > 0` and `column_count > 0`
    /// - increments are finite and `> 0`
    /// - origin is finite
    pub fn new(
        row_count: usize,
        column_count: usize,
        x_increment: f64,
        y_increment: f64,
        origin_x: f64,
        origin_y: f64,
    ) -> MapResult<Self> {
        if row_count == 0 || column_count == 0 {
            return Err(MapError::InvalidData(
                "grid row and column counts must be > 0".to_owned(),
            ));
        }
        for (value, name) in [(x_increment, "x_increment"), (y_increment, "y_increment")] {
            if !value.is_finite() || value <= 0.0 {
                return Err(MapError::InvalidData(format!(
                    "grid `{name}` must be finite and > 0"
                )));
            }
        }
        if !origin_x.is_finite() || !origin_y.is_finite() {
            return Err(MapError::InvalidData(
                "grid origin must be finite".to_owned(),
            ));
        }

        Ok(Self {
            row_count,
            column_count,
            x_increment,
            y_increment,
            origin_x,
            origin_y,
        })
    }

    /// Unit-pitch grid with its first cell centered at the origin.
    pub fn with_unit_pitch(row_count: usize, column_count: usize) -> MapResult<Self> {
        Self::new(row_count, column_count, 1.0, 1.0, 0.0, 0.0)
    }

    #[must_use]
    pub fn row_count(self) -> usize {
        self.row_count
    }

    #[must_use]
    pub fn column_count(self) -> usize {
        self.column_count
    }

    #[must_use]
    pub fn cell_count(self) -> usize {
        self.row_count * self.column_count
    }

    #[must_use]
    pub fn x_increment(self) -> f64 {
        self.x_increment
    }

    #[must_use]
    pub fn y_increment(self) -> f64 {
        self.y_increment
    }

    #[must_use]
    pub fn origin(self) -> (f64, f64) {
        (self.origin_x, self.origin_y)
    }

    #[must_use]
    pub fn column_to_x(self, col: usize) -> f64 {
        self.origin_x + col as f64 * self.x_increment
    }

    #[must_use]
    pub fn row_to_y(self, row: usize) -> f64 {
        self.origin_y + row as f64 * self.y_increment
    }

    /// Fractional column coordinate of `x` (cell centers are integers).
    #[must_use]
    pub fn x_to_fractional_column(self, x: f64) -> f64 {
        (x - self.origin_x) / self.x_increment
    }

    #[must_use]
    pub fn y_to_fractional_row(self, y: f64) -> f64 {
        (y - self.origin_y) / self.y_increment
    }

    /// Column whose cell contains `x`, if inside the grid.
    #[must_use]
    pub fn nearest_column(self, x: f64) -> Option<usize> {
        index_in_bounds(self.x_to_fractional_column(x).round(), self.column_count)
    }

    #[must_use]
    pub fn nearest_row(self, y: f64) -> Option<usize> {
        index_in_bounds(self.y_to_fractional_row(y).round(), self.row_count)
    }

    /// Cell `(row, col)` containing the data point, if any.
    #[must_use]
    pub fn cell_at(self, x: f64, y: f64) -> Option<(usize, usize)> {
        Some((self.nearest_row(y)?, self.nearest_column(x)?))
    }

    /// Row-major flat index of a cell.
    #[must_use]
    pub fn flat_index(self, row: usize, col: usize) -> usize {
        row * self.column_count + col
    }
}

fn index_in_bounds(index: f64, count: usize) -> Option<usize> {
    if !index.is_finite() || index < 0.0 || index >= count as f64 {
        return None;
    }
    Some(index as usize)
}
