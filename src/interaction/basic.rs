use crate::core::DevicePoint;
use crate::error::MapResult;
use crate::interaction::{
    ChartHost, Consumption, CursorKind, InteractionMode, MouseInputResponse, PointerEvent,
};

/// Plain panning with a caught device point. Dispatched last so it only
/// reacts to drags no overlay claimed.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicResponse {
    caught: Option<DevicePoint>,
}

impl BasicResponse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn caught_point(&self) -> Option<DevicePoint> {
        self.caught
    }
}

impl MouseInputResponse for BasicResponse {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn mouse_pressed(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        if host.mode() != InteractionMode::Pan {
            return Ok(());
        }
        if event.is_primary() && !event.is_consumed(Consumption::ChartEdition) {
            self.caught = Some(event.device());
        }
        Ok(())
    }

    fn mouse_released(&mut self, _event: &mut PointerEvent, _host: &mut dyn ChartHost) -> MapResult<()> {
        self.caught = None;
        Ok(())
    }

    fn mouse_dragged(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        if host.mode() != InteractionMode::Pan {
            return Ok(());
        }
        let Some(previous) = self.caught else {
            return Ok(());
        };
        if !event.try_consume(Consumption::MouseDragged) {
            return Ok(());
        }
        if event.try_consume(Consumption::CursorChange) {
            host.request_cursor(CursorKind::Grab);
        }
        // Content follows the pointer: the old data point moves under it.
        let from = host.plot_area().device_to_data(previous);
        let to = host.plot_area().device_to_data(event.device());
        host.pan_by(from.x - to.x, from.y - to.y);
        self.caught = Some(event.device());
        Ok(())
    }

    fn mouse_moved(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        if event.try_consume(Consumption::CursorChange) {
            host.request_cursor(CursorKind::Default);
        }
        Ok(())
    }

    fn mouse_clicked(&mut self, _event: &mut PointerEvent, _host: &mut dyn ChartHost) -> MapResult<()> {
        Ok(())
    }

    fn is_chart_element_caught(&self) -> bool {
        false
    }
}
