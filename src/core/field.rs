use std::sync::{Arc, Mutex, PoisonError};

use ordered_float::OrderedFloat;

use crate::core::Grid2D;
use crate::error::{MapError, MapResult};

/// Row-major scalar accessor over a regular grid. `NaN` marks missing samples.
pub trait ScalarField {
    fn row_count(&self) -> usize;
    fn column_count(&self) -> usize;
    fn z(&self, row: usize, col: usize) -> f64;
}

/// Field shared between the data layer and the event thread.
pub type SharedField = Arc<dyn ScalarField + Send + Sync>;

/// Default dense field backed by a row-major `Vec<f64>`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridField {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl GridField {
    pub fn new(rows: usize, cols: usize, values: Vec<f64>) -> MapResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(MapError::InvalidData(
                "field dimensions must be > 0".to_owned(),
            ));
        }
        if values.len() != rows * cols {
            return Err(MapError::InvalidData(format!(
                "field holds {} samples, expected {rows}x{cols}",
                values.len()
            )));
        }
        Ok(Self { rows, cols, values })
    }

    /// Builds a field by evaluating `f(row, col)` for every cell.
    pub fn from_fn(
        rows: usize,
        cols: usize,
        mut f: impl FnMut(usize, usize) -> f64,
    ) -> MapResult<Self> {
        let mut values = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                values.push(f(row, col));
            }
        }
        Self::new(rows, cols, values)
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn into_shared(self) -> SharedField {
        Arc::new(self)
    }
}

impl ScalarField for GridField {
    fn row_count(&self) -> usize {
        self.rows
    }

    fn column_count(&self) -> usize {
        self.cols
    }

    fn z(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }
}

/// Fails when the field's logical size differs from the grid geometry.
pub fn ensure_field_matches<F: ScalarField + ?Sized>(field: &F, grid: Grid2D) -> MapResult<()> {
    if field.row_count() != grid.row_count() || field.column_count() != grid.column_count() {
        return Err(MapError::InvalidData(format!(
            "field size {}x{} does not match grid {}x{}",
            field.row_count(),
            field.column_count(),
            grid.row_count(),
            grid.column_count()
        )));
    }
    Ok(())
}

/// Minimum and maximum over finite samples; `None` when no sample is finite.
#[must_use]
pub fn finite_min_max<F: ScalarField + ?Sized>(field: &F) -> Option<(f64, f64)> {
    let mut min = OrderedFloat(f64::INFINITY);
    let mut max = OrderedFloat(f64::NEG_INFINITY);
    let mut seen = false;
    for row in 0..field.row_count() {
        for col in 0..field.column_count() {
            let z = field.z(row, col);
            if z.is_finite() {
                min = min.min(OrderedFloat(z));
                max = max.max(OrderedFloat(z));
                seen = true;
            }
        }
    }
    seen.then_some((min.0, max.0))
}

/// Finite samples of the field in row-major order.
#[must_use]
pub fn finite_samples<F: ScalarField + ?Sized>(field: &F) -> Vec<f64> {
    let mut samples = Vec::with_capacity(field.row_count() * field.column_count());
    for row in 0..field.row_count() {
        for col in 0..field.column_count() {
            let z = field.z(row, col);
            if z.is_finite() {
                samples.push(z);
            }
        }
    }
    samples
}

/// Thread-safe "data changed" slot.
///
/// A background producer publishes the latest field; the event thread takes
/// it before the next repaint. Only the most recent publication is kept.
#[derive(Clone, Default)]
pub struct DataHandoff {
    pending: Arc<Mutex<Option<(Grid2D, SharedField)>>>,
}

impl DataHandoff {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a field after checking it against the grid.
    pub fn publish(&self, grid: Grid2D, field: SharedField) -> MapResult<()> {
        ensure_field_matches(field.as_ref(), grid)?;
        let mut slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some((grid, field));
        Ok(())
    }

    #[must_use]
    pub fn take(&self) -> Option<(Grid2D, SharedField)> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl std::fmt::Debug for DataHandoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataHandoff")
            .field("has_pending", &self.has_pending())
            .finish()
    }
}
