use tracing::{trace, warn};

use crate::core::{DevicePoint, DeviceRect};
use crate::error::MapResult;
use crate::interaction::{
    BasicResponse, ChartHost, CursorKind, MapMarkerManager, PointerEvent, ProfileManager,
    RoiManager, ToolManager, ValueMarkerManager,
};

/// Pointer contract shared by every overlay manager.
///
/// Each handler checks the chart mode first and is a no-op outside the
/// manager's modes. Side effects that only one manager may own are claimed
/// through the event's consumption flags.
pub trait MouseInputResponse {
    /// Short name used in logs and `MapError::Overlay`.
    fn name(&self) -> &'static str;

    fn mouse_pressed(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()>;
    fn mouse_released(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()>;
    fn mouse_dragged(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()>;
    fn mouse_moved(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()>;
    fn mouse_clicked(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()>;

    fn is_chart_element_caught(&self) -> bool;

    fn is_complex_element_under_construction(&self) -> bool {
        false
    }

    fn is_right_click_reserved(&self, _data_area: DeviceRect, _point: DevicePoint) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Pressed,
    Released,
    Dragged,
    Moved,
    Clicked,
}

/// Runs one handler on each response in order. A failing response is
/// logged and skipped; the rest still run. Returns the number of failures.
pub fn dispatch_in_order(
    responses: &mut [&mut dyn MouseInputResponse],
    kind: PointerKind,
    event: &mut PointerEvent,
    host: &mut dyn ChartHost,
) -> usize {
    let mut failures = 0;
    for response in responses.iter_mut() {
        trace!(manager = response.name(), ?kind, "dispatch pointer event");
        let result = match kind {
            PointerKind::Pressed => response.mouse_pressed(event, host),
            PointerKind::Released => response.mouse_released(event, host),
            PointerKind::Dragged => response.mouse_dragged(event, host),
            PointerKind::Moved => response.mouse_moved(event, host),
            PointerKind::Clicked => response.mouse_clicked(event, host),
        };
        if let Err(err) = result {
            failures += 1;
            warn!(
                manager = response.name(),
                ?kind,
                error = %err,
                "overlay manager failed; continuing dispatch"
            );
        }
    }
    failures
}

/// Per-chart dispatcher in fixed precedence order: value markers, ROIs,
/// profiles, map markers, tools, then basic panning.
#[derive(Debug, Default)]
pub struct PointerEventArbiter {
    pub value_markers: ValueMarkerManager,
    pub rois: RoiManager,
    pub profiles: ProfileManager,
    pub map_markers: MapMarkerManager,
    pub tools: ToolManager,
    pub basic: BasicResponse,
}

impl PointerEventArbiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatches one event. Events outside the data area only reset the
    /// cursor. Returns the number of managers that failed.
    pub fn dispatch(
        &mut self,
        kind: PointerKind,
        event: &mut PointerEvent,
        host: &mut dyn ChartHost,
    ) -> usize {
        if !host.plot_area().contains(event.device()) {
            host.request_cursor(CursorKind::Default);
            return 0;
        }
        let mut responses: [&mut dyn MouseInputResponse; 6] = [
            &mut self.value_markers,
            &mut self.rois,
            &mut self.profiles,
            &mut self.map_markers,
            &mut self.tools,
            &mut self.basic,
        ];
        dispatch_in_order(&mut responses, kind, event, host)
    }

    fn responses(&self) -> [&dyn MouseInputResponse; 6] {
        [
            &self.value_markers,
            &self.rois,
            &self.profiles,
            &self.map_markers,
            &self.tools,
            &self.basic,
        ]
    }

    #[must_use]
    pub fn is_chart_element_caught(&self) -> bool {
        self.responses()
            .iter()
            .any(|response| response.is_chart_element_caught())
    }

    #[must_use]
    pub fn is_complex_element_under_construction(&self) -> bool {
        self.responses()
            .iter()
            .any(|response| response.is_complex_element_under_construction())
    }

    #[must_use]
    pub fn is_right_click_reserved(&self, data_area: DeviceRect, point: DevicePoint) -> bool {
        self.responses()
            .iter()
            .any(|response| response.is_right_click_reserved(data_area, point))
    }
}
