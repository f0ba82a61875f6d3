use serde::{Deserialize, Serialize};

use crate::core::{DataPoint, Grid2D};
use crate::error::{MapError, MapResult};
use crate::raster::CellWindow;

/// How region membership affects rendered cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MaskPolicy {
    #[default]
    NoMask,
    /// Cells inside the region show the mask color.
    MaskInside,
    /// Cells outside the region show the mask color.
    MaskOutside,
}

/// Point-in-region test with a bulk classification entry point.
///
/// `classify` writes one flag per cell of `window` in row-major window order
/// (`(row - min_row) * window.column_count() + (col - min_col)`), `true`
/// meaning inside. Implementations override it with an incremental scan so
/// the compositor never pays a virtual call per cell.
pub trait Region: std::fmt::Debug {
    fn contains(&self, point: DataPoint) -> bool;

    fn classify(&self, grid: &Grid2D, window: CellWindow, inside: &mut [bool]) {
        let cols = window.column_count();
        for row in window.min_row..=window.max_row {
            let y = grid.row_to_y(row);
            let base = (row - window.min_row) * cols;
            for col in window.min_col..=window.max_col {
                inside[base + col - window.min_col] =
                    self.contains(DataPoint::new(grid.column_to_x(col), y));
            }
        }
    }
}

/// Empty region: every cell classifies as outside.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRegion;

impl Region for NoRegion {
    fn contains(&self, _point: DataPoint) -> bool {
        false
    }

    fn classify(&self, _grid: &Grid2D, _window: CellWindow, inside: &mut [bool]) {
        inside.fill(false);
    }
}

/// Closed axis-aligned rectangle in data units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectRegion {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl RectRegion {
    /// Rectangle spanned by two arbitrary corners.
    pub fn from_corners(a: DataPoint, b: DataPoint) -> MapResult<Self> {
        if !a.is_finite() || !b.is_finite() {
            return Err(MapError::InvalidData(
                "rect region corners must be finite".to_owned(),
            ));
        }
        Ok(Self {
            x_min: a.x.min(b.x),
            x_max: a.x.max(b.x),
            y_min: a.y.min(b.y),
            y_max: a.y.max(b.y),
        })
    }
}

impl Region for RectRegion {
    fn contains(&self, point: DataPoint) -> bool {
        point.x >= self.x_min && point.x <= self.x_max && point.y >= self.y_min && point.y <= self.y_max
    }

    fn classify(&self, grid: &Grid2D, window: CellWindow, inside: &mut [bool]) {
        inside.fill(false);
        let cols = window.column_count();
        let col_lo = grid.x_to_fractional_column(self.x_min).ceil();
        let col_hi = grid.x_to_fractional_column(self.x_max).floor();
        let row_lo = grid.y_to_fractional_row(self.y_min).ceil();
        let row_hi = grid.y_to_fractional_row(self.y_max).floor();
        let Some((c0, c1)) = clamp_span(col_lo, col_hi, window.min_col, window.max_col) else {
            return;
        };
        let Some((r0, r1)) = clamp_span(row_lo, row_hi, window.min_row, window.max_row) else {
            return;
        };
        for row in r0..=r1 {
            let base = (row - window.min_row) * cols;
            inside[base + c0 - window.min_col..=base + c1 - window.min_col].fill(true);
        }
    }
}

/// Simple polygon in data units (even-odd rule), typically derived from a
/// freehand lasso.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonRegion {
    vertices: Vec<DataPoint>,
}

impl PolygonRegion {
    pub fn new(vertices: Vec<DataPoint>) -> MapResult<Self> {
        if vertices.len() < 3 {
            return Err(MapError::InvalidData(
                "polygon region needs at least three vertices".to_owned(),
            ));
        }
        if vertices.iter().any(|vertex| !vertex.is_finite()) {
            return Err(MapError::InvalidData(
                "polygon region vertices must be finite".to_owned(),
            ));
        }
        Ok(Self { vertices })
    }

    #[must_use]
    pub fn vertices(&self) -> &[DataPoint] {
        &self.vertices
    }

    /// Sorted x positions where the horizontal line at `y` crosses an edge.
    fn crossings(&self, y: f64, out: &mut Vec<f64>) {
        out.clear();
        let n = self.vertices.len();
        let mut j = n - 1;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[j];
            if (a.y > y) != (b.y > y) {
                out.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
            }
            j = i;
        }
        out.sort_unstable_by(f64::total_cmp);
    }
}

impl Region for PolygonRegion {
    fn contains(&self, point: DataPoint) -> bool {
        let mut crossings = Vec::new();
        self.crossings(point.y, &mut crossings);
        crossings.iter().filter(|x| **x > point.x).count() % 2 == 1
    }

    fn classify(&self, grid: &Grid2D, window: CellWindow, inside: &mut [bool]) {
        inside.fill(false);
        let cols = window.column_count();
        let mut crossings = Vec::with_capacity(self.vertices.len());
        for row in window.min_row..=window.max_row {
            self.crossings(grid.row_to_y(row), &mut crossings);
            let base = (row - window.min_row) * cols;
            // Cells whose center lies in [c(2k), c(2k+1)) are inside.
            for span in crossings.chunks_exact(2) {
                let lo = grid.x_to_fractional_column(span[0]).ceil();
                let hi = grid.x_to_fractional_column(span[1]).ceil() - 1.0;
                if let Some((c0, c1)) = clamp_span(lo, hi, window.min_col, window.max_col) {
                    inside[base + c0 - window.min_col..=base + c1 - window.min_col].fill(true);
                }
            }
        }
    }
}

/// Union of regions.
#[derive(Debug, Default)]
pub struct CompositeRegion {
    parts: Vec<Box<dyn Region + Send + Sync>>,
}

impl CompositeRegion {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, region: Box<dyn Region + Send + Sync>) {
        self.parts.push(region);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl Region for CompositeRegion {
    fn contains(&self, point: DataPoint) -> bool {
        self.parts.iter().any(|part| part.contains(point))
    }

    fn classify(&self, grid: &Grid2D, window: CellWindow, inside: &mut [bool]) {
        inside.fill(false);
        let mut scratch = vec![false; inside.len()];
        for part in &self.parts {
            part.classify(grid, window, &mut scratch);
            for (flag, part_flag) in inside.iter_mut().zip(&scratch) {
                *flag |= *part_flag;
            }
        }
    }
}

/// Intersects a fractional index span with `[min, max]`.
fn clamp_span(lo: f64, hi: f64, min: usize, max: usize) -> Option<(usize, usize)> {
    if !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    let lo = lo.max(min as f64);
    let hi = hi.min(max as f64);
    (lo <= hi).then(|| (lo as usize, hi as usize))
}
