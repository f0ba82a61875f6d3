use scanmap_rs::MapError;
use scanmap_rs::MapResult;
use scanmap_rs::core::{
    DataPoint, DevicePoint, DeviceRect, LinearScale, Orientation, PlotArea, Viewport,
};
use scanmap_rs::extensions::MeasurementTool;
use scanmap_rs::interaction::{
    ChartContext, ChartHost, Consumption, CursorKind, InteractionMode, MouseInputResponse,
    NoopSupervisor, OverlayKey, PointerButton, PointerEvent, PointerKind, Profile, ProfileShape,
    Roi, RoiShape, Supervisor, dispatch_in_order,
};
use scanmap_rs::render::NullRenderer;
use scanmap_rs::{MapChart, MapChartConfig};

#[derive(Debug, Default)]
struct CursorLog {
    cursors: Vec<CursorKind>,
}

impl Supervisor for CursorLog {
    fn request_cursor_change(&mut self, cursor: CursorKind) {
        self.cursors.push(cursor);
    }
}

struct FailingResponse;

impl FailingResponse {
    fn fail() -> MapResult<()> {
        Err(MapError::Overlay {
            manager: "failing",
            message: "boom".to_owned(),
        })
    }
}

impl MouseInputResponse for FailingResponse {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn mouse_pressed(&mut self, _event: &mut PointerEvent, _host: &mut dyn ChartHost) -> MapResult<()> {
        Self::fail()
    }

    fn mouse_released(&mut self, _event: &mut PointerEvent, _host: &mut dyn ChartHost) -> MapResult<()> {
        Self::fail()
    }

    fn mouse_dragged(&mut self, _event: &mut PointerEvent, _host: &mut dyn ChartHost) -> MapResult<()> {
        Self::fail()
    }

    fn mouse_moved(&mut self, _event: &mut PointerEvent, _host: &mut dyn ChartHost) -> MapResult<()> {
        Self::fail()
    }

    fn mouse_clicked(&mut self, _event: &mut PointerEvent, _host: &mut dyn ChartHost) -> MapResult<()> {
        Self::fail()
    }

    fn is_chart_element_caught(&self) -> bool {
        false
    }
}

/// Claims the cursor on every press and counts what it saw.
#[derive(Default)]
struct CountingResponse {
    pressed: usize,
    saw_cursor_consumed: bool,
}

impl MouseInputResponse for CountingResponse {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn mouse_pressed(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        self.pressed += 1;
        if event.try_consume(Consumption::CursorChange) {
            host.request_cursor(CursorKind::Hand);
        } else {
            self.saw_cursor_consumed = true;
        }
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
}

struct BrokenTool;

impl MeasurementTool for BrokenTool {
    fn id(&self) -> &str {
        "broken"
    }

    fn mouse_pressed(&mut self, _event: &mut PointerEvent, _host: &mut dyn ChartHost) -> MapResult<()> {
        Err(MapError::InvalidData("tool state corrupted".to_owned()))
    }
}

fn plot_area() -> PlotArea {
    PlotArea::new(
        DeviceRect::new(0.0, 0.0, 100.0, 100.0),
        LinearScale::new(0.0, 10.0).expect("domain"),
        LinearScale::new(0.0, 10.0).expect("range"),
        Orientation::Vertical,
    )
    .expect("plot area")
}

fn chart(config: MapChartConfig, mode: InteractionMode) -> MapChart<NullRenderer, CursorLog> {
    let mut chart =
        MapChart::new(NullRenderer::default(), CursorLog::default(), config).expect("chart init");
    chart.set_mode(mode);
    chart
}

fn filling() -> MapChartConfig {
    MapChartConfig::filling(Viewport::new(100, 100), (0.0, 10.0), (0.0, 10.0))
}

#[test]
fn failing_response_does_not_stop_later_responses() {
    let mut area = plot_area();
    let mut supervisor = NoopSupervisor;
    let mut cursor = CursorKind::Default;
    let mut host = ChartContext::new(
        InteractionMode::Pan,
        &mut area,
        &mut supervisor,
        &mut cursor,
        4.0,
    );

    let mut failing = FailingResponse;
    let mut first = CountingResponse::default();
    let mut second = CountingResponse::default();
    let mut event = PointerEvent::new(DevicePoint::new(5.0, 5.0), DataPoint::new(0.5, 9.5));
    let failures = {
        let mut responses: [&mut dyn MouseInputResponse; 3] = [&mut failing, &mut first, &mut second];
        dispatch_in_order(&mut responses, PointerKind::Pressed, &mut event, &mut host)
    };

    assert_eq!(failures, 1);
    assert_eq!((first.pressed, second.pressed), (1, 1));
    // Only the first counting response may claim the cursor.
    assert!(!first.saw_cursor_consumed);
    assert!(second.saw_cursor_consumed);
    assert!(event.is_consumed(Consumption::CursorChange));
    assert_eq!(host.cursor(), CursorKind::Hand);
}

#[test]
fn failing_tool_is_counted_and_dispatch_continues() {
    let mut chart = chart(filling(), InteractionMode::Tool);
    let tools = &mut chart.overlays_mut().tools;
    tools.register_tool(Box::new(BrokenTool)).expect("register");
    tools.set_active_tool("broken").expect("activate");

    let outcome = chart.pointer_pressed(DevicePoint::new(50.0, 50.0), PointerButton::Primary);
    assert_eq!(outcome.failures, 1);
    let moved = chart.pointer_moved(DevicePoint::new(40.0, 40.0));
    assert_eq!(moved.failures, 0);
}

#[test]
fn edit_mode_gives_rois_precedence_over_profiles() {
    let mut chart = chart(filling(), InteractionMode::Edit);
    let roi = Roi::rectangle(OverlayKey(0), DataPoint::new(2.0, 2.0), DataPoint::new(8.0, 8.0))
        .expect("roi");
    let profile = Profile::new(
        OverlayKey(0),
        ProfileShape::Line,
        vec![DataPoint::new(1.0, 5.0), DataPoint::new(9.0, 5.0)],
    )
    .expect("profile");
    chart.overlays_mut().rois.add_or_replace(&roi);
    chart.overlays_mut().profiles.add_or_replace(&profile);

    // (50, 50) is inside the ROI and on the profile.
    let pressed = chart.pointer_pressed(DevicePoint::new(50.0, 50.0), PointerButton::Primary);
    assert!(pressed.consumed.contains(Consumption::ChartEdition));
    for x in [55.0, 60.0, 65.0] {
        let dragged = chart.pointer_dragged(DevicePoint::new(x, 50.0));
        assert!(dragged.consumed.contains(Consumption::MouseDragged));
    }
    chart.pointer_released(DevicePoint::new(65.0, 50.0), PointerButton::Primary);

    let RoiShape::Rectangle { min, .. } = chart.overlays().rois.get(OverlayKey(0)).expect("roi").shape()
    else {
        panic!("expected rectangle");
    };
    assert!((min.x - 3.5).abs() <= 1e-9);
    let points = chart
        .overlays()
        .profiles
        .get(OverlayKey(0))
        .expect("profile")
        .points()
        .to_vec();
    assert_eq!(points[0], DataPoint::new(1.0, 5.0));
    // A single cursor request for the whole drag.
    assert_eq!(chart.supervisor().cursors, vec![CursorKind::Grab]);
}

#[test]
fn events_outside_the_data_area_only_reset_the_cursor() {
    let config = MapChartConfig::new(
        Viewport::new(100, 100),
        DeviceRect::new(10.0, 10.0, 80.0, 80.0),
        (0.0, 10.0),
        (0.0, 10.0),
    );
    let mut chart = chart(config, InteractionMode::MapMarker);

    chart.pointer_moved(DevicePoint::new(50.0, 50.0));
    assert_eq!(chart.cursor(), CursorKind::Crosshair);

    let outside = chart.pointer_moved(DevicePoint::new(5.0, 50.0));
    assert!(outside.consumed.is_empty());
    assert_eq!(chart.cursor(), CursorKind::Default);

    let clicked = chart.pointer_clicked(DevicePoint::new(95.0, 95.0), PointerButton::Primary, 1);
    assert!(clicked.consumed.is_empty());
    assert!(chart.overlays().map_markers.is_empty());
    assert_eq!(
        chart.supervisor().cursors,
        vec![CursorKind::Crosshair, CursorKind::Default]
    );
}

#[test]
fn pan_drag_moves_content_with_the_pointer() {
    let mut chart = chart(filling(), InteractionMode::Pan);
    chart.pointer_pressed(DevicePoint::new(50.0, 50.0), PointerButton::Primary);
    let dragged = chart.pointer_dragged(DevicePoint::new(60.0, 40.0));
    assert!(dragged.consumed.contains(Consumption::MouseDragged));
    assert_eq!(chart.cursor(), CursorKind::Grab);

    let (x0, x1) = chart.plot_area().domain().domain();
    let (y0, y1) = chart.plot_area().range().domain();
    assert!((x0 + 1.0).abs() <= 1e-9 && (x1 - 9.0).abs() <= 1e-9);
    assert!((y0 + 1.0).abs() <= 1e-9 && (y1 - 9.0).abs() <= 1e-9);

    chart.pointer_released(DevicePoint::new(60.0, 40.0), PointerButton::Primary);
    chart.pointer_moved(DevicePoint::new(60.0, 40.0));
    assert_eq!(chart.cursor(), CursorKind::Default);

    // Without a press there is nothing to pan.
    chart.pointer_dragged(DevicePoint::new(10.0, 10.0));
    assert!((chart.plot_area().domain().domain().0 + 1.0).abs() <= 1e-9);
}

#[test]
fn panning_is_disabled_outside_pan_mode() {
    let mut chart = chart(filling(), InteractionMode::Edit);
    chart.pointer_pressed(DevicePoint::new(50.0, 50.0), PointerButton::Primary);
    let dragged = chart.pointer_dragged(DevicePoint::new(60.0, 40.0));
    assert!(!dragged.consumed.contains(Consumption::MouseDragged));
    assert_eq!(chart.plot_area().domain().domain(), (0.0, 10.0));
}
