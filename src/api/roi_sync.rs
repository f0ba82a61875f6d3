use tracing::debug;

use crate::error::MapResult;
use crate::interaction::Supervisor;
use crate::render::Renderer;

use super::MapChart;

impl<R: Renderer, S: Supervisor> MapChart<R, S> {
    /// Rebuilds the mask region from the ROI set and refreshes ROI samples.
    ///
    /// Pointer entry points call this after every dispatch; hosts that edit
    /// ROIs through `overlays_mut` call it themselves.
    pub fn sync_roi_region(&mut self) -> MapResult<()> {
        if !self.arbiter.rois.take_changed() {
            return Ok(());
        }
        let region = self.arbiter.rois.composite_region()?;
        debug!(rois = region.len(), "mask region rebuilt from rois");
        self.layer.set_mask_region(Box::new(region));
        self.refresh_roi_samples()
    }

    /// Pushes samples inside the ROIs while `ROI_FULL` is active.
    pub(super) fn refresh_roi_samples(&mut self) -> MapResult<()> {
        if !self.layer.are_roi_samples_needed() {
            return Ok(());
        }
        let (Some(grid), Some(field)) = (self.layer.grid(), self.layer.field()) else {
            return Ok(());
        };
        let samples = self.arbiter.rois.samples_inside(field.as_ref(), grid)?;
        self.layer.set_roi_samples(samples);
        Ok(())
    }
}
