use std::sync::atomic::{AtomicUsize, Ordering};

use scanmap_rs::core::{
    DataPoint, DevicePoint, DeviceRect, Grid2D, GridField, LinearScale, Orientation, PlotArea,
};
use scanmap_rs::raster::{
    ColorGradient, GradientPreset, MaskPolicy, MaskSpec, PaintScale, RectRegion, ScaleLookup,
    buffer_index, composite, visible_window,
};
use scanmap_rs::render::Color;

/// Encodes the sample itself as the pixel so tests can read cells back.
struct EncodeLookup;

impl ScaleLookup for EncodeLookup {
    fn argb(&self, z: f64) -> u32 {
        z as u32
    }
}

#[derive(Default)]
struct CountingLookup {
    calls: AtomicUsize,
}

impl ScaleLookup for CountingLookup {
    fn argb(&self, _z: f64) -> u32 {
        self.calls.fetch_add(1, Ordering::Relaxed);
        0xff00_0000
    }
}

/// 3 rows by 2 columns, unit pitch, `z = row * 10 + col`.
fn three_by_two() -> (Grid2D, GridField) {
    let grid = Grid2D::with_unit_pitch(3, 2).expect("grid");
    let field = GridField::from_fn(3, 2, |row, col| (row * 10 + col) as f64).expect("field");
    (grid, field)
}

fn plot(orientation: Orientation) -> PlotArea {
    let (domain, range) = (
        LinearScale::new(-0.5, 1.5).expect("domain"),
        LinearScale::new(-0.5, 2.5).expect("range"),
    );
    PlotArea::new(DeviceRect::new(0.0, 0.0, 100.0, 100.0), domain, range, orientation)
        .expect("plot area")
}

#[test]
fn vertical_image_puts_highest_row_on_top() {
    let (grid, field) = three_by_two();
    let output = composite(&field, grid, &EncodeLookup, MaskSpec::none(), &plot(Orientation::Vertical))
        .expect("composite")
        .expect("visible cells");

    assert_eq!((output.image.width(), output.image.height()), (2, 3));
    assert_eq!(output.image.pixels(), &[20_u32, 21, 10, 11, 0, 1]);

    let rect = output.placement();
    assert!((rect.x - 0.0).abs() <= 1e-9);
    assert!((rect.y - 0.0).abs() <= 1e-9);
    assert!((rect.width - 100.0).abs() <= 1e-9);
    assert!((rect.height - 100.0).abs() <= 1e-9);
}

#[test]
fn horizontal_image_runs_rows_along_device_x() {
    let (grid, field) = three_by_two();
    let output = composite(
        &field,
        grid,
        &EncodeLookup,
        MaskSpec::none(),
        &plot(Orientation::Horizontal),
    )
    .expect("composite")
    .expect("visible cells");

    assert_eq!((output.image.width(), output.image.height()), (3, 2));
    // Top image row is the highest column, rows grow to the right.
    assert_eq!(output.image.pixels(), &[1_u32, 11, 21, 0, 10, 20]);
}

#[test]
fn both_orientations_show_every_cell_once() {
    let (grid, field) = three_by_two();
    for orientation in [Orientation::Vertical, Orientation::Horizontal] {
        let area = plot(orientation);
        let window = visible_window(grid, &area).expect("window");
        let output = composite(&field, grid, &EncodeLookup, MaskSpec::none(), &area)
            .expect("composite")
            .expect("visible cells");
        for row in 0..3 {
            for col in 0..2 {
                let index = buffer_index(row, col, window, orientation);
                assert_eq!(output.image.pixels()[index], (row * 10 + col) as u32);
            }
        }
    }
}

#[test]
fn occupied_area_resolves_device_points_to_cells() {
    let (grid, field) = three_by_two();
    let output = composite(&field, grid, &EncodeLookup, MaskSpec::none(), &plot(Orientation::Vertical))
        .expect("composite")
        .expect("visible cells");
    let area = output.area;

    assert_eq!(area.cell_at(DevicePoint::new(10.0, 10.0)), Some((2, 0)));
    assert_eq!(area.cell_at(DevicePoint::new(90.0, 90.0)), Some((0, 1)));
    // Inclusive edges clamp onto the last pixel.
    assert_eq!(area.cell_at(DevicePoint::new(100.0, 100.0)), Some((0, 1)));
    assert_eq!(area.cell_at(DevicePoint::new(101.0, 50.0)), None);
    assert_eq!(area.value_at(&field, DevicePoint::new(60.0, 50.0)), Some(11.0));
}

#[test]
fn reversed_domain_mirrors_the_image_columns() {
    let (grid, field) = three_by_two();
    let area = PlotArea::new(
        DeviceRect::new(0.0, 0.0, 100.0, 100.0),
        LinearScale::new(1.5, -0.5).expect("reversed domain"),
        LinearScale::new(-0.5, 2.5).expect("range"),
        Orientation::Vertical,
    )
    .expect("plot area");
    let output = composite(&field, grid, &EncodeLookup, MaskSpec::none(), &area)
        .expect("composite")
        .expect("visible cells");

    assert_eq!(output.image.pixels(), &[21_u32, 20, 11, 10, 1, 0]);
    assert_eq!(output.area.cell_at(DevicePoint::new(10.0, 10.0)), Some((2, 1)));
}

#[test]
fn image_and_hit_area_follow_the_axes_in_every_direction() {
    let (grid, field) = three_by_two();
    let forward = |lo: f64, hi: f64, reversed: bool| {
        if reversed {
            LinearScale::new(hi, lo).expect("scale")
        } else {
            LinearScale::new(lo, hi).expect("scale")
        }
    };
    for orientation in [Orientation::Vertical, Orientation::Horizontal] {
        for (domain_reversed, range_reversed) in
            [(false, false), (true, false), (false, true), (true, true)]
        {
            let area = PlotArea::new(
                DeviceRect::new(0.0, 0.0, 100.0, 100.0),
                forward(-0.5, 1.5, domain_reversed),
                forward(-0.5, 2.5, range_reversed),
                orientation,
            )
            .expect("plot area");
            let output = composite(&field, grid, &EncodeLookup, MaskSpec::none(), &area)
                .expect("composite")
                .expect("visible cells");
            let (width, height) = (output.image.width(), output.image.height());

            for x in [10.0, 30.0, 70.0, 90.0] {
                for y in [10.0, 30.0, 70.0, 90.0] {
                    let device = DevicePoint::new(x, y);
                    let data = area.device_to_data(device);
                    let expected = grid.cell_at(data.x, data.y);
                    let case = format!("{orientation:?} {domain_reversed} {range_reversed} ({x}, {y})");
                    assert_eq!(output.area.cell_at(device), expected, "{case}");

                    let (row, col) = expected.expect("cell under point");
                    let px = (x / 100.0 * width as f64) as usize;
                    let py = (y / 100.0 * height as f64) as usize;
                    assert_eq!(
                        output.image.pixel(px, py),
                        Some((row * 10 + col) as u32),
                        "{case}"
                    );
                }
            }
        }
    }
}

#[test]
fn visible_window_widens_by_one_cell_and_clamps() {
    let grid = Grid2D::with_unit_pitch(10, 10).expect("grid");
    let area = PlotArea::new(
        DeviceRect::new(0.0, 0.0, 50.0, 50.0),
        LinearScale::new(3.0, 5.0).expect("domain"),
        LinearScale::new(-2.0, 0.2).expect("range"),
        Orientation::Vertical,
    )
    .expect("plot area");
    let window = visible_window(grid, &area).expect("window");
    assert_eq!((window.min_col, window.max_col), (2, 6));
    assert_eq!((window.min_row, window.max_row), (0, 1));
}

#[test]
fn no_overlap_yields_no_image() {
    let (grid, field) = three_by_two();
    let far_away = PlotArea::new(
        DeviceRect::new(0.0, 0.0, 100.0, 100.0),
        LinearScale::new(10.0, 20.0).expect("domain"),
        LinearScale::new(-0.5, 2.5).expect("range"),
        Orientation::Vertical,
    )
    .expect("plot area");
    assert_eq!(visible_window(grid, &far_away), None);
    let output = composite(&field, grid, &EncodeLookup, MaskSpec::none(), &far_away)
        .expect("composite");
    assert!(output.is_none());
}

#[test]
fn mismatched_field_is_rejected() {
    let grid = Grid2D::with_unit_pitch(2, 3).expect("grid");
    let (_, field) = three_by_two();
    assert!(
        composite(&field, grid, &EncodeLookup, MaskSpec::none(), &plot(Orientation::Vertical))
            .is_err()
    );
}

#[test]
fn masked_cells_skip_the_scale_lookup() {
    let (grid, field) = three_by_two();
    let bottom_row = RectRegion::from_corners(DataPoint::new(-0.5, -0.5), DataPoint::new(1.5, 0.4))
        .expect("region");
    let mask_color = Color::rgb(0.5, 0.5, 0.5);
    let area = plot(Orientation::Vertical);

    for (policy, expected_lookups, expected_masked) in [
        (MaskPolicy::NoMask, 6, 0),
        (MaskPolicy::MaskInside, 4, 2),
        (MaskPolicy::MaskOutside, 2, 4),
    ] {
        let lookup = CountingLookup::default();
        let mask = MaskSpec {
            policy,
            region: &bottom_row,
            color: mask_color,
        };
        let output = composite(&field, grid, &lookup, mask, &area)
            .expect("composite")
            .expect("visible cells");
        assert_eq!(lookup.calls.load(Ordering::Relaxed), expected_lookups, "{policy:?}");
        let masked = output
            .image
            .pixels()
            .iter()
            .filter(|argb| **argb == mask_color.to_argb32())
            .count();
        assert_eq!(masked, expected_masked, "{policy:?}");
    }
}

#[test]
fn nan_cells_use_the_scale_nan_color() {
    let grid = Grid2D::with_unit_pitch(1, 2).expect("grid");
    let field = GridField::new(1, 2, vec![f64::NAN, 1.0]).expect("field");
    let scale = PaintScale::new(0.0, 1.0, ColorGradient::preset(GradientPreset::Grayscale))
        .expect("scale")
        .with_nan_color(Color::rgb(1.0, 0.0, 0.0))
        .expect("nan color");
    let area = PlotArea::new(
        DeviceRect::new(0.0, 0.0, 20.0, 10.0),
        LinearScale::new(-0.5, 1.5).expect("domain"),
        LinearScale::new(-0.5, 0.5).expect("range"),
        Orientation::Vertical,
    )
    .expect("plot area");
    let output = composite(&field, grid, &scale, MaskSpec::none(), &area)
        .expect("composite")
        .expect("visible cells");
    assert_eq!(output.image.pixel(0, 0), Some(0xffff_0000));
    assert_eq!(output.image.pixel(1, 0), Some(Color::WHITE.to_argb32()));
    assert_eq!(output.image.pixel(2, 0), None);
}
