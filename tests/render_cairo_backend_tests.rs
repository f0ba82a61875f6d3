#![cfg(feature = "cairo-backend")]

use cairo::{Context, Format, ImageSurface};
use scanmap_rs::MapError;
use scanmap_rs::core::{DevicePoint, Grid2D, GridField, Viewport};
use scanmap_rs::interaction::{InteractionMode, NoopSupervisor, PointerButton};
use scanmap_rs::render::{CairoRenderer, Color};
use scanmap_rs::{MapChart, MapChartConfig};

fn chart_with_marker(renderer: CairoRenderer) -> MapChart<CairoRenderer, NoopSupervisor> {
    let config = MapChartConfig::filling(Viewport::new(300, 200), (-0.5, 2.5), (-0.5, 1.5));
    let mut chart = MapChart::new(renderer, NoopSupervisor, config).expect("chart init");
    let grid = Grid2D::with_unit_pitch(2, 3).expect("grid");
    let field = GridField::from_fn(2, 3, |row, col| (row * 3 + col) as f64).expect("field");
    chart.set_grid_field(grid, field).expect("set data");
    chart.set_mode(InteractionMode::MapMarker);
    chart.pointer_clicked(DevicePoint::new(150.0, 100.0), PointerButton::Primary, 1);
    chart
}

#[test]
fn cairo_renderer_rejects_invalid_surface_size() {
    let err = CairoRenderer::new(0, 480).expect_err("invalid width must fail");
    assert!(matches!(err, MapError::InvalidData(_)));

    let mut renderer = CairoRenderer::new(10, 10).expect("renderer");
    assert!(renderer.set_clear_color(Color::rgba(-1.0, 0.0, 0.0, 1.0)).is_err());
}

#[test]
fn cairo_renderer_paints_raster_and_overlays() {
    let renderer = CairoRenderer::new(300, 200).expect("renderer");
    let mut chart = chart_with_marker(renderer);
    chart.render().expect("render");

    let renderer = chart.into_renderer();
    let stats = renderer.last_stats();
    assert_eq!(stats.images_drawn, 1);
    assert_eq!(stats.lines_drawn, 2);
    assert_eq!(stats.rects_drawn, 0);
    assert_eq!(renderer.surface().width(), 300);
}

#[test]
fn cairo_renderer_can_draw_on_external_context() {
    let renderer = CairoRenderer::new(300, 200).expect("renderer");
    let mut chart = chart_with_marker(renderer);

    let surface = ImageSurface::create(Format::ARgb32, 300, 200).expect("surface");
    let context = Context::new(&surface).expect("context");
    chart
        .render_on_cairo_context(&context)
        .expect("render on context");

    let renderer = chart.into_renderer();
    assert_eq!(renderer.last_stats().images_drawn, 1);
}
