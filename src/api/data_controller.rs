use crate::core::{DataHandoff, Grid2D, GridField, SharedField};
use crate::error::MapResult;
use crate::interaction::Supervisor;
use crate::render::Renderer;

use super::MapChart;

impl<R: Renderer, S: Supervisor> MapChart<R, S> {
    /// Replaces the plotted field. Full bounds are recomputed immediately and
    /// ROI samples are refreshed when `ROI_FULL` is active.
    pub fn set_data(&mut self, grid: Grid2D, field: SharedField) -> MapResult<()> {
        self.layer.set_data(grid, field)?;
        self.occupied_area = None;
        self.refresh_roi_samples()
    }

    /// Convenience for dense row-major fields.
    pub fn set_grid_field(&mut self, grid: Grid2D, field: GridField) -> MapResult<()> {
        self.set_data(grid, field.into_shared())
    }

    pub fn clear_data(&mut self) {
        self.layer.clear_data();
        self.occupied_area = None;
    }

    /// Applies data published by a background producer, if any.
    ///
    /// Returns `true` when new data was taken. Call from the event thread
    /// before repainting.
    pub fn accept_pending_data(&mut self, handoff: &DataHandoff) -> MapResult<bool> {
        let Some((grid, field)) = handoff.take() else {
            return Ok(false);
        };
        self.set_data(grid, field)?;
        Ok(true)
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        self.layer.grid().is_some()
    }

    /// Sample at a grid cell.
    #[must_use]
    pub fn value_at(&self, row: usize, col: usize) -> Option<f64> {
        self.layer.value_at(row, col)
    }
}
