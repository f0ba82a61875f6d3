use criterion::{Criterion, criterion_group, criterion_main};
use scanmap_rs::core::{
    DataPoint, DeviceRect, Grid2D, GridField, LinearScale, Orientation, PlotArea, Viewport,
};
use scanmap_rs::interaction::{NoopSupervisor, OverlayKey, Roi};
use scanmap_rs::raster::{
    ColorGradient, GradientPreset, MaskPolicy, MaskSpec, PaintScale, PolygonRegion, ScaleLookup,
    composite,
};
use scanmap_rs::render::{Color, NullRenderer};
use scanmap_rs::{MapChart, MapChartConfig};
use std::hint::black_box;

const SIDE: usize = 512;

fn wave_field() -> (Grid2D, GridField) {
    let grid = Grid2D::with_unit_pitch(SIDE, SIDE).expect("valid grid");
    let field = GridField::from_fn(SIDE, SIDE, |row, col| {
        let (x, y) = (col as f64 * 0.05, row as f64 * 0.05);
        x.sin() * y.cos()
    })
    .expect("valid field");
    (grid, field)
}

fn full_plot_area() -> PlotArea {
    let extent = SIDE as f64 - 0.5;
    PlotArea::new(
        DeviceRect::new(0.0, 0.0, 1024.0, 1024.0),
        LinearScale::new(-0.5, extent).expect("domain"),
        LinearScale::new(-0.5, extent).expect("range"),
        Orientation::Vertical,
    )
    .expect("plot area")
}

fn bench_paint_scale_lookup(c: &mut Criterion) {
    let scale = PaintScale::new(-1.0, 1.0, ColorGradient::preset(GradientPreset::Viridis))
        .expect("valid scale");
    let samples: Vec<f64> = (0..10_000).map(|i| (i as f64 / 5_000.0) - 1.0).collect();

    c.bench_function("paint_scale_lookup_10k", |b| {
        b.iter(|| {
            let mut acc = 0_u32;
            for z in &samples {
                acc ^= scale.argb(black_box(*z));
            }
            acc
        })
    });
}

fn bench_composite_512(c: &mut Criterion) {
    let (grid, field) = wave_field();
    let scale = PaintScale::new(-1.0, 1.0, ColorGradient::preset(GradientPreset::Hot))
        .expect("valid scale");
    let area = full_plot_area();

    c.bench_function("composite_512x512_unmasked", |b| {
        b.iter(|| {
            let _ = composite(
                black_box(&field),
                grid,
                &scale,
                MaskSpec::none(),
                black_box(&area),
            )
            .expect("composite should succeed");
        })
    });

    let lasso = PolygonRegion::new(vec![
        DataPoint::new(50.0, 50.0),
        DataPoint::new(450.0, 80.0),
        DataPoint::new(300.0, 300.0),
        DataPoint::new(480.0, 470.0),
        DataPoint::new(60.0, 400.0),
    ])
    .expect("valid polygon");
    c.bench_function("composite_512x512_lasso_mask", |b| {
        b.iter(|| {
            let mask = MaskSpec {
                policy: MaskPolicy::MaskOutside,
                region: &lasso,
                color: Color::BLACK,
            };
            let _ = composite(black_box(&field), grid, &scale, mask, black_box(&area))
                .expect("composite should succeed");
        })
    });
}

fn bench_chart_frame_with_rois(c: &mut Criterion) {
    let (grid, field) = wave_field();
    let config = MapChartConfig::filling(
        Viewport::new(1024, 1024),
        (-0.5, SIDE as f64 - 0.5),
        (-0.5, SIDE as f64 - 0.5),
    )
    .with_mask(MaskPolicy::MaskInside, Color::rgb(0.5, 0.5, 0.5));
    let mut chart =
        MapChart::new(NullRenderer::default(), NoopSupervisor, config).expect("chart init");
    chart.set_grid_field(grid, field).expect("set data");
    for key in 0..8_u64 {
        let offset = key as f64 * 60.0;
        let roi = Roi::rectangle(
            OverlayKey(key),
            DataPoint::new(offset, offset),
            DataPoint::new(offset + 40.0, offset + 40.0),
        )
        .expect("roi");
        chart.overlays_mut().rois.add_or_replace(&roi);
    }
    chart.sync_roi_region().expect("roi sync");

    c.bench_function("chart_frame_512x512_8_rois", |b| {
        b.iter(|| {
            let frame = chart.build_frame().expect("frame");
            black_box(frame.images.len())
        })
    });
}

criterion_group!(
    benches,
    bench_paint_scale_lookup,
    bench_composite_512,
    bench_chart_frame_with_rois
);
criterion_main!(benches);
