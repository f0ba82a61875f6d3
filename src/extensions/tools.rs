use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{DataPoint, PlotArea};
use crate::error::MapResult;
use crate::interaction::{ChartHost, Consumption, CursorKind, OverlayStyle, PointerEvent};
use crate::render::RenderFrame;

/// Result of one ruler gesture, in data units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub start: DataPoint,
    pub end: DataPoint,
    pub distance: f64,
}

impl Measurement {
    #[must_use]
    pub fn between(start: DataPoint, end: DataPoint) -> Self {
        Self {
            start,
            end,
            distance: (end.x - start.x).hypot(end.y - start.y),
        }
    }
}

/// Pluggable pointer-driven tool active in `Tool` mode.
///
/// Tools only see events the tool manager forwards to them and reach the
/// chart through the same narrow host as the built-in managers.
pub trait MeasurementTool {
    fn id(&self) -> &str;

    fn mouse_pressed(&mut self, _event: &mut PointerEvent, _host: &mut dyn ChartHost) -> MapResult<()> {
        Ok(())
    }

    fn mouse_released(&mut self, _event: &mut PointerEvent, _host: &mut dyn ChartHost) -> MapResult<()> {
        Ok(())
    }

    fn mouse_dragged(&mut self, _event: &mut PointerEvent, _host: &mut dyn ChartHost) -> MapResult<()> {
        Ok(())
    }

    fn mouse_moved(&mut self, _event: &mut PointerEvent, _host: &mut dyn ChartHost) -> MapResult<()> {
        Ok(())
    }

    fn mouse_clicked(&mut self, _event: &mut PointerEvent, _host: &mut dyn ChartHost) -> MapResult<()> {
        Ok(())
    }

    fn is_chart_element_caught(&self) -> bool {
        false
    }

    fn append_primitives(&self, _plot_area: &PlotArea, _frame: &mut RenderFrame) {}
}

/// Press-drag-release ruler.
#[derive(Debug, Clone, Default)]
pub struct DistanceTool {
    active: Option<(DataPoint, DataPoint)>,
    measurements: Vec<Measurement>,
    style: OverlayStyle,
}

impl DistanceTool {
    pub const ID: &'static str = "distance";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    #[must_use]
    pub fn last_measurement(&self) -> Option<Measurement> {
        self.measurements.last().copied()
    }

    pub fn clear(&mut self) {
        self.measurements.clear();
        self.active = None;
    }
}

impl MeasurementTool for DistanceTool {
    fn id(&self) -> &str {
        Self::ID
    }

    fn mouse_pressed(&mut self, event: &mut PointerEvent, _host: &mut dyn ChartHost) -> MapResult<()> {
        if !event.is_primary() || event.is_consumed(Consumption::ChartEdition) {
            return Ok(());
        }
        event.consume(Consumption::ChartEdition);
        self.active = Some((event.data(), event.data()));
        Ok(())
    }

    fn mouse_dragged(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        let Some((start, _)) = self.active else {
            return Ok(());
        };
        if !event.try_consume(Consumption::MouseDragged) {
            return Ok(());
        }
        if event.try_consume(Consumption::CursorChange) {
            host.request_cursor(CursorKind::Crosshair);
        }
        self.active = Some((start, event.data()));
        Ok(())
    }

    fn mouse_released(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        let Some((start, _)) = self.active.take() else {
            return Ok(());
        };
        let end = event.data();
        if start == end {
            return Ok(());
        }
        let measurement = Measurement::between(start, end);
        debug!(distance = measurement.distance, "distance measured");
        self.measurements.push(measurement);
        host.supervisor().measurement_completed(Self::ID, measurement);
        Ok(())
    }

    fn is_chart_element_caught(&self) -> bool {
        self.active.is_some()
    }

    fn append_primitives(&self, plot_area: &PlotArea, frame: &mut RenderFrame) {
        let segments = self
            .measurements
            .iter()
            .map(|m| (m.start, m.end))
            .chain(self.active);
        for (start, end) in segments {
            frame.lines.push(
                self.style
                    .line(plot_area.data_to_device(start), plot_area.data_to_device(end)),
            );
        }
    }
}
