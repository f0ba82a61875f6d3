use scanmap_rs::core::{DataPoint, DevicePoint, Grid2D, GridField, Viewport};
use scanmap_rs::interaction::{
    Consumption, CursorKind, InteractionMode, OverlayKey, PointerButton, Roi, RoiShape,
    Supervisor,
};
use scanmap_rs::raster::{MaskPolicy, RangeSelector};
use scanmap_rs::render::{Color, NullRenderer};
use scanmap_rs::{MapChart, MapChartConfig};

#[derive(Debug, Default)]
struct RecordingSupervisor {
    stored: Vec<OverlayKey>,
    removed: Vec<OverlayKey>,
    reject_removal: bool,
}

impl Supervisor for RecordingSupervisor {
    fn add_or_replace_roi(&mut self, roi: Roi) -> Option<Roi> {
        self.stored.push(roi.key());
        Some(roi)
    }

    fn remove_roi(&mut self, key: OverlayKey) -> bool {
        self.removed.push(key);
        !self.reject_removal
    }
}

type Chart = MapChart<NullRenderer, RecordingSupervisor>;

/// 100x100 pixels over `[0, 10]^2`, with a 10x10 grid whose cell centers sit
/// at half-integers and `z = row * 10 + col`.
fn chart(mode: InteractionMode) -> Chart {
    let config = MapChartConfig::filling(Viewport::new(100, 100), (0.0, 10.0), (0.0, 10.0))
        .with_mask(MaskPolicy::MaskInside, Color::rgb(0.5, 0.5, 0.5));
    let mut chart =
        MapChart::new(NullRenderer::default(), RecordingSupervisor::default(), config)
            .expect("chart init");
    let grid = Grid2D::new(10, 10, 1.0, 1.0, 0.5, 0.5).expect("grid");
    let field = GridField::from_fn(10, 10, |row, col| (row * 10 + col) as f64).expect("field");
    chart.set_grid_field(grid, field).expect("set data");
    chart.set_mode(mode);
    chart
}

fn draw(chart: &mut Chart, path: &[(f64, f64)]) {
    let (first, rest) = path.split_first().expect("non-empty path");
    chart.pointer_pressed(DevicePoint::new(first.0, first.1), PointerButton::Primary);
    for (x, y) in rest {
        chart.pointer_dragged(DevicePoint::new(*x, *y));
    }
    let (x, y) = *path.last().expect("non-empty path");
    chart.pointer_released(DevicePoint::new(x, y), PointerButton::Primary);
}

fn masked_pixel_count(chart: &mut Chart) -> usize {
    let mask = Color::rgb(0.5, 0.5, 0.5).to_argb32();
    let frame = chart.build_frame().expect("frame");
    frame.images[0]
        .image
        .pixels()
        .iter()
        .filter(|argb| **argb == mask)
        .count()
}

#[test]
fn press_drag_release_draws_a_rectangle() {
    let mut chart = chart(InteractionMode::RoiRectangle);
    let pressed = chart.pointer_pressed(DevicePoint::new(20.0, 80.0), PointerButton::Primary);
    assert!(pressed.consumed.contains(Consumption::ChartEdition));
    assert!(
        chart
            .overlays()
            .is_right_click_reserved(chart.plot_area().data_area(), DevicePoint::new(30.0, 30.0))
    );

    let dragged = chart.pointer_dragged(DevicePoint::new(50.0, 50.0));
    assert!(dragged.consumed.contains(Consumption::MouseDragged));
    assert_eq!(chart.cursor(), CursorKind::Crosshair);
    // Rectangles are not complex constructions.
    assert!(!chart.overlays().is_complex_element_under_construction());

    chart.pointer_released(DevicePoint::new(50.0, 50.0), PointerButton::Primary);
    let rois = chart.overlays().rois.rois();
    assert_eq!(rois.len(), 1);
    let roi = &rois[0];
    let RoiShape::Rectangle { min, max } = roi.shape() else {
        panic!("expected rectangle, got {:?}", roi.shape());
    };
    assert!((min.x - 2.0).abs() <= 1e-9 && (min.y - 2.0).abs() <= 1e-9);
    assert!((max.x - 5.0).abs() <= 1e-9 && (max.y - 5.0).abs() <= 1e-9);
    assert_eq!(chart.supervisor().stored, vec![roi.key()]);
}

#[test]
fn zero_area_rectangle_is_discarded() {
    let mut chart = chart(InteractionMode::RoiRectangle);
    draw(&mut chart, &[(20.0, 80.0), (20.0, 40.0)]);
    assert!(chart.overlays().rois.is_empty());
    assert!(chart.supervisor().stored.is_empty());
}

#[test]
fn lasso_needs_three_points_and_is_complex_while_drawn() {
    let mut chart = chart(InteractionMode::RoiFreehand);
    chart.pointer_pressed(DevicePoint::new(10.0, 90.0), PointerButton::Primary);
    chart.pointer_dragged(DevicePoint::new(90.0, 90.0));
    assert!(chart.overlays().is_complex_element_under_construction());
    assert!(!chart.is_popup_allowed(DevicePoint::new(50.0, 50.0)));
    chart.pointer_dragged(DevicePoint::new(90.0, 10.0));
    chart.pointer_released(DevicePoint::new(90.0, 10.0), PointerButton::Primary);

    let roi = &chart.overlays().rois.rois()[0];
    assert!(matches!(roi.shape(), RoiShape::Freehand { vertices } if vertices.len() == 3));
    assert!(!chart.overlays().is_complex_element_under_construction());

    // A two-point lasso is dropped.
    draw(&mut chart, &[(10.0, 50.0), (20.0, 50.0)]);
    assert_eq!(chart.overlays().rois.len(), 1);
}

#[test]
fn finished_rectangle_updates_mask_and_roi_samples() {
    let mut chart = chart(InteractionMode::RoiRectangle);
    assert_eq!(masked_pixel_count(&mut chart), 0);

    draw(&mut chart, &[(20.0, 80.0), (50.0, 50.0)]);
    assert!(chart.layer().mask_region().contains(DataPoint::new(3.0, 3.0)));
    assert!(!chart.layer().mask_region().contains(DataPoint::new(6.0, 3.0)));
    // Cell centers 2.5, 3.5 and 4.5 on both axes.
    assert_eq!(masked_pixel_count(&mut chart), 9);

    chart
        .set_gradient_range_selector(RangeSelector::RoiFull)
        .expect("selector");
    assert_eq!(chart.gradient_bounds(), (22.0, 44.0));
}

#[test]
fn double_click_removes_roi_and_clears_mask() {
    let mut chart = chart(InteractionMode::RoiRectangle);
    draw(&mut chart, &[(20.0, 80.0), (50.0, 50.0)]);
    let key = chart.overlays().rois.rois()[0].key();

    let single = chart.pointer_clicked(DevicePoint::new(35.0, 65.0), PointerButton::Primary, 1);
    assert!(!single.consumed.contains(Consumption::ChartEdition));
    assert_eq!(chart.overlays().rois.len(), 1);

    let double = chart.pointer_clicked(DevicePoint::new(35.0, 65.0), PointerButton::Primary, 2);
    assert!(double.consumed.contains(Consumption::ChartEdition));
    assert!(chart.overlays().rois.is_empty());
    assert_eq!(chart.supervisor().removed, vec![key]);
    assert!(!chart.layer().mask_region().contains(DataPoint::new(3.0, 3.0)));
    assert_eq!(masked_pixel_count(&mut chart), 0);
}

#[test]
fn rejected_removal_keeps_the_roi() {
    let mut chart = chart(InteractionMode::RoiRectangle);
    draw(&mut chart, &[(20.0, 80.0), (50.0, 50.0)]);
    chart.supervisor_mut().reject_removal = true;
    chart.pointer_clicked(DevicePoint::new(35.0, 65.0), PointerButton::Primary, 2);
    assert_eq!(chart.overlays().rois.len(), 1);
}

#[test]
fn edit_mode_drags_corners_and_bodies() {
    let mut chart = chart(InteractionMode::RoiRectangle);
    draw(&mut chart, &[(20.0, 80.0), (50.0, 50.0)]);
    chart.set_mode(InteractionMode::Edit);
    let key = chart.overlays().rois.rois()[0].key();

    // Top-right device corner is the data-space max corner.
    draw(&mut chart, &[(51.0, 49.0), (70.0, 30.0)]);
    assert_eq!(chart.cursor(), CursorKind::Grab);
    let RoiShape::Rectangle { min, max } = chart.overlays().rois.get(key).expect("roi").shape()
    else {
        panic!("expected rectangle");
    };
    assert!((min.x - 2.0).abs() <= 1e-9 && (max.x - 7.0).abs() <= 1e-9);
    assert!((min.y - 2.0).abs() <= 1e-9 && (max.y - 7.0).abs() <= 1e-9);

    draw(&mut chart, &[(40.0, 60.0), (30.0, 60.0)]);
    let RoiShape::Rectangle { min, max } = chart.overlays().rois.get(key).expect("roi").shape()
    else {
        panic!("expected rectangle");
    };
    assert!((min.x - 1.0).abs() <= 1e-9 && (max.x - 6.0).abs() <= 1e-9);
    assert!((min.y - 2.0).abs() <= 1e-9 && (max.y - 7.0).abs() <= 1e-9);
    assert!(!chart.overlays().is_chart_element_caught());
    assert!(chart.layer().mask_region().contains(DataPoint::new(1.5, 6.5)));
}

#[test]
fn corner_dragged_across_the_opposite_edge_keeps_its_anchor() {
    let mut chart = chart(InteractionMode::RoiRectangle);
    draw(&mut chart, &[(20.0, 80.0), (50.0, 50.0)]);
    chart.set_mode(InteractionMode::Edit);
    let key = chart.overlays().rois.rois()[0].key();

    // Grab the max corner (5, 5), cross x = 2 to (1, 7), then nudge to (0.9, 7).
    draw(&mut chart, &[(50.0, 50.0), (10.0, 30.0), (9.0, 30.0)]);
    let RoiShape::Rectangle { min, max } = chart.overlays().rois.get(key).expect("roi").shape()
    else {
        panic!("expected rectangle");
    };
    assert!((min.x - 0.9).abs() <= 1e-9 && (max.x - 2.0).abs() <= 1e-9);
    assert!((min.y - 2.0).abs() <= 1e-9 && (max.y - 7.0).abs() <= 1e-9);
}

#[test]
fn rois_are_hidden_outside_roi_and_edit_modes() {
    let mut chart = chart(InteractionMode::RoiRectangle);
    draw(&mut chart, &[(20.0, 80.0), (50.0, 50.0)]);
    let frame = chart.build_frame().expect("frame");
    assert_eq!(frame.lines.len(), 4);
    assert_eq!(frame.rects.len(), 4);

    chart.set_mode(InteractionMode::Pan);
    assert!(!chart.overlays().rois.is_visible());
    let frame = chart.build_frame().expect("frame");
    assert!(frame.lines.is_empty());
    assert!(frame.rects.is_empty());
    assert_eq!(chart.overlays().rois.len(), 1);
}
