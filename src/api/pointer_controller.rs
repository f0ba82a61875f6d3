use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{DataPoint, DevicePoint};
use crate::interaction::{
    ChartContext, ConsumptionFlags, InteractionMode, PointerButton, PointerEvent, PointerKind,
    Supervisor,
};
use crate::render::Renderer;

use super::MapChart;

/// Outcome of one pointer dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerOutcome {
    pub consumed: ConsumptionFlags,
    /// Number of overlay managers whose handler failed.
    pub failures: usize,
}

/// Sample under the pointer, resolved through the raster hit-test entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub row: usize,
    pub col: usize,
    /// Cell center in data units.
    pub position: DataPoint,
    pub value: f64,
}

impl<R: Renderer, S: Supervisor> MapChart<R, S> {
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Switches the interaction mode. Unfinished constructions are dropped
    /// and ROI/profile visibility follows the new mode.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        if self.mode == mode {
            return;
        }
        debug!(from = ?self.mode, to = ?mode, "interaction mode changed");
        self.arbiter.profiles.cancel_construction();
        self.arbiter.rois.cancel_construction();
        self.mode = mode;
        self.apply_mode_visibility();
    }

    pub(super) fn apply_mode_visibility(&mut self) {
        self.arbiter.rois.set_visible(self.mode.shows_rois());
        self.arbiter.profiles.set_visible(self.mode.shows_profiles());
    }

    pub fn pointer_pressed(&mut self, point: DevicePoint, button: PointerButton) -> PointerOutcome {
        let event = self.pointer_event(point).with_button(button);
        self.dispatch_pointer(PointerKind::Pressed, event)
    }

    pub fn pointer_released(&mut self, point: DevicePoint, button: PointerButton) -> PointerOutcome {
        let event = self.pointer_event(point).with_button(button);
        self.dispatch_pointer(PointerKind::Released, event)
    }

    pub fn pointer_dragged(&mut self, point: DevicePoint) -> PointerOutcome {
        let event = self.pointer_event(point);
        self.dispatch_pointer(PointerKind::Dragged, event)
    }

    pub fn pointer_moved(&mut self, point: DevicePoint) -> PointerOutcome {
        let event = self.pointer_event(point);
        self.dispatch_pointer(PointerKind::Moved, event)
    }

    pub fn pointer_clicked(
        &mut self,
        point: DevicePoint,
        button: PointerButton,
        click_count: u32,
    ) -> PointerOutcome {
        let event = self
            .pointer_event(point)
            .with_button(button)
            .with_click_count(click_count);
        self.dispatch_pointer(PointerKind::Clicked, event)
    }

    /// Routes a prepared event through the arbiter, then resyncs the ROI mask.
    pub fn dispatch_pointer(&mut self, kind: PointerKind, mut event: PointerEvent) -> PointerOutcome {
        let mut context = ChartContext::new(
            self.mode,
            &mut self.plot_area,
            &mut self.supervisor,
            &mut self.cursor,
            self.config.hit_tolerance,
        );
        let mut failures = self.arbiter.dispatch(kind, &mut event, &mut context);
        if let Err(err) = self.sync_roi_region() {
            failures += 1;
            warn!(error = %err, "roi mask sync failed");
        }
        PointerOutcome {
            consumed: event.consumed(),
            failures,
        }
    }

    /// Whether a context menu may open at `point`. Denied while a drawing
    /// is in progress or a manager reserved the right click there.
    #[must_use]
    pub fn is_popup_allowed(&self, point: DevicePoint) -> bool {
        !self.arbiter.is_complex_element_under_construction()
            && !self
                .arbiter
                .is_right_click_reserved(self.plot_area.data_area(), point)
    }

    /// Background dataset tooltips are hidden while any overlay is caught or
    /// under construction.
    #[must_use]
    pub fn suppress_dataset_tooltips(&self) -> bool {
        self.arbiter.is_chart_element_caught()
            || self.arbiter.is_complex_element_under_construction()
    }

    /// Sample drawn under `point` in the last rendered raster.
    #[must_use]
    pub fn tooltip_at(&self, point: DevicePoint) -> Option<Tooltip> {
        let area = self.occupied_area?;
        let grid = self.layer.grid()?;
        let (row, col) = area.cell_at(point)?;
        let value = self.layer.value_at(row, col)?;
        Some(Tooltip {
            row,
            col,
            position: DataPoint::new(grid.column_to_x(col), grid.row_to_y(row)),
            value,
        })
    }

    fn pointer_event(&self, point: DevicePoint) -> PointerEvent {
        PointerEvent::new(point, self.plot_area.device_to_data(point))
    }
}
