use scanmap_rs::core::{DataPoint, Grid2D};
use scanmap_rs::raster::{CellWindow, CompositeRegion, NoRegion, PolygonRegion, RectRegion, Region};

fn full_window(grid: Grid2D) -> CellWindow {
    CellWindow {
        min_row: 0,
        max_row: grid.row_count() - 1,
        min_col: 0,
        max_col: grid.column_count() - 1,
    }
}

/// Bulk classification must agree with per-point `contains` on cell centers.
fn assert_classify_matches_contains(region: &dyn Region, grid: Grid2D, window: CellWindow) {
    let mut flags = vec![false; window.cell_count()];
    region.classify(&grid, window, &mut flags);
    for row in window.min_row..=window.max_row {
        for col in window.min_col..=window.max_col {
            let center = DataPoint::new(grid.column_to_x(col), grid.row_to_y(row));
            let flag = flags[(row - window.min_row) * window.column_count() + col - window.min_col];
            assert_eq!(flag, region.contains(center), "cell ({row}, {col})");
        }
    }
}

#[test]
fn rect_region_is_closed_and_order_independent() {
    let region = RectRegion::from_corners(DataPoint::new(3.0, 4.0), DataPoint::new(1.0, 2.0))
        .expect("region");
    assert!(region.contains(DataPoint::new(1.0, 2.0)));
    assert!(region.contains(DataPoint::new(3.0, 4.0)));
    assert!(region.contains(DataPoint::new(2.0, 3.0)));
    assert!(!region.contains(DataPoint::new(3.01, 3.0)));
    assert!(RectRegion::from_corners(DataPoint::new(f64::NAN, 0.0), DataPoint::new(1.0, 1.0)).is_err());
}

#[test]
fn rect_classification_matches_point_test() {
    let grid = Grid2D::new(8, 12, 0.5, 0.25, -1.0, 2.0).expect("grid");
    let region = RectRegion::from_corners(DataPoint::new(0.2, 2.3), DataPoint::new(3.0, 3.25))
        .expect("region");
    assert_classify_matches_contains(&region, grid, full_window(grid));

    let partial = CellWindow {
        min_row: 2,
        max_row: 5,
        min_col: 3,
        max_col: 9,
    };
    assert_classify_matches_contains(&region, grid, partial);
}

#[test]
fn polygon_needs_three_finite_vertices() {
    assert!(PolygonRegion::new(vec![DataPoint::new(0.0, 0.0), DataPoint::new(1.0, 0.0)]).is_err());
    assert!(
        PolygonRegion::new(vec![
            DataPoint::new(0.0, 0.0),
            DataPoint::new(1.0, f64::INFINITY),
            DataPoint::new(1.0, 1.0),
        ])
        .is_err()
    );
}

#[test]
fn polygon_classification_matches_point_test() {
    let grid = Grid2D::with_unit_pitch(16, 16).expect("grid");
    // Concave "L" lasso plus a triangle, exercising several crossings per row.
    let lasso = PolygonRegion::new(vec![
        DataPoint::new(1.3, 1.2),
        DataPoint::new(12.6, 1.7),
        DataPoint::new(12.1, 5.4),
        DataPoint::new(5.2, 5.9),
        DataPoint::new(4.8, 13.3),
        DataPoint::new(0.9, 12.8),
    ])
    .expect("polygon");
    assert_classify_matches_contains(&lasso, grid, full_window(grid));

    let triangle = PolygonRegion::new(vec![
        DataPoint::new(8.0, 7.5),
        DataPoint::new(15.5, 9.0),
        DataPoint::new(9.5, 14.2),
    ])
    .expect("polygon");
    assert_classify_matches_contains(&triangle, grid, full_window(grid));
    assert!(triangle.contains(DataPoint::new(11.0, 10.0)));
    assert!(!triangle.contains(DataPoint::new(2.0, 10.0)));
}

#[test]
fn composite_region_is_a_union() {
    let grid = Grid2D::with_unit_pitch(10, 10).expect("grid");
    let mut union = CompositeRegion::new();
    assert!(union.is_empty());
    assert!(!union.contains(DataPoint::new(1.0, 1.0)));

    union.push(Box::new(
        RectRegion::from_corners(DataPoint::new(0.0, 0.0), DataPoint::new(2.0, 2.0)).expect("rect"),
    ));
    union.push(Box::new(
        PolygonRegion::new(vec![
            DataPoint::new(5.5, 5.5),
            DataPoint::new(9.5, 5.5),
            DataPoint::new(7.5, 9.5),
        ])
        .expect("polygon"),
    ));
    assert_eq!(union.len(), 2);
    assert!(union.contains(DataPoint::new(1.0, 1.0)));
    assert!(union.contains(DataPoint::new(7.5, 7.0)));
    assert!(!union.contains(DataPoint::new(4.0, 4.0)));
    assert_classify_matches_contains(&union, grid, full_window(grid));
}

#[test]
fn no_region_classifies_everything_outside() {
    let grid = Grid2D::with_unit_pitch(3, 3).expect("grid");
    let mut flags = vec![true; 9];
    NoRegion.classify(&grid, full_window(grid), &mut flags);
    assert!(flags.iter().all(|flag| !flag));
}
