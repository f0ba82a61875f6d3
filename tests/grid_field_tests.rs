use std::sync::Arc;
use std::thread;

use scanmap_rs::MapError;
use scanmap_rs::core::{
    DataHandoff, Grid2D, GridField, ScalarField, ensure_field_matches, finite_min_max,
};

#[test]
fn grid_rejects_degenerate_geometry() {
    assert!(matches!(
        Grid2D::new(0, 3, 1.0, 1.0, 0.0, 0.0),
        Err(MapError::InvalidData(_))
    ));
    assert!(Grid2D::new(2, 3, 0.0, 1.0, 0.0, 0.0).is_err());
    assert!(Grid2D::new(2, 3, 1.0, -2.0, 0.0, 0.0).is_err());
    assert!(Grid2D::new(2, 3, 1.0, 1.0, f64::NAN, 0.0).is_err());
    assert!(Grid2D::new(2, 3, f64::INFINITY, 1.0, 0.0, 0.0).is_err());
}

#[test]
fn grid_maps_cells_to_centers_and_back() {
    let grid = Grid2D::new(4, 5, 0.5, 2.0, 10.0, -3.0).expect("valid grid");
    assert_eq!(grid.cell_count(), 20);
    assert_eq!(grid.column_to_x(0), 10.0);
    assert_eq!(grid.column_to_x(4), 12.0);
    assert_eq!(grid.row_to_y(3), 3.0);

    // Anything within half a pitch of a center resolves to that cell.
    assert_eq!(grid.cell_at(11.2, -2.1), Some((0, 2)));
    assert_eq!(grid.cell_at(9.76, 3.9), Some((3, 0)));
    assert_eq!(grid.cell_at(9.7, 0.0), None);
    assert_eq!(grid.cell_at(11.0, 4.1), None);
    assert_eq!(grid.cell_at(f64::NAN, 0.0), None);
}

#[test]
fn field_size_must_match_grid() {
    assert!(GridField::new(2, 3, vec![0.0; 5]).is_err());
    let field = GridField::new(2, 3, vec![0.0; 6]).expect("valid field");
    let grid = Grid2D::with_unit_pitch(3, 2).expect("valid grid");
    let err = ensure_field_matches(&field, grid).expect_err("transposed size must fail");
    assert!(err.to_string().contains("does not match"));
}

#[test]
fn finite_min_max_skips_nan_and_infinities() {
    let field = GridField::new(
        2,
        3,
        vec![f64::NAN, 4.0, -1.5, f64::INFINITY, 2.0, f64::NEG_INFINITY],
    )
    .expect("valid field");
    assert_eq!(finite_min_max(&field), Some((-1.5, 4.0)));

    let empty = GridField::new(1, 2, vec![f64::NAN, f64::NAN]).expect("valid field");
    assert_eq!(finite_min_max(&empty), None);
}

#[test]
fn from_fn_fills_row_major() {
    let field = GridField::from_fn(2, 3, |row, col| (row * 10 + col) as f64).expect("field");
    assert_eq!(field.values(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
    assert_eq!(field.z(1, 2), 12.0);
}

#[test]
fn handoff_keeps_only_latest_publication() {
    let handoff = DataHandoff::new();
    let grid = Grid2D::with_unit_pitch(2, 2).expect("grid");

    let producer = {
        let handoff = handoff.clone();
        thread::spawn(move || {
            for step in 0..4 {
                let field = GridField::new(2, 2, vec![f64::from(step); 4]).expect("field");
                handoff.publish(grid, Arc::new(field)).expect("publish");
            }
        })
    };
    producer.join().expect("producer thread");

    assert!(handoff.has_pending());
    let (taken_grid, field) = handoff.take().expect("pending data");
    assert_eq!(taken_grid, grid);
    assert_eq!(field.z(1, 1), 3.0);
    assert!(!handoff.has_pending());
    assert!(handoff.take().is_none());
}

#[test]
fn handoff_rejects_mismatched_field() {
    let handoff = DataHandoff::new();
    let grid = Grid2D::with_unit_pitch(2, 2).expect("grid");
    let field = GridField::new(1, 4, vec![0.0; 4]).expect("field");
    assert!(handoff.publish(grid, field.into_shared()).is_err());
    assert!(!handoff.has_pending());
}
