use scanmap_rs::core::{
    DataPoint, DevicePoint, DeviceRect, LinearScale, Orientation, PlotArea,
};

fn plot(orientation: Orientation) -> PlotArea {
    PlotArea::new(
        DeviceRect::new(20.0, 10.0, 200.0, 100.0),
        LinearScale::new(0.0, 50.0).expect("domain"),
        LinearScale::new(-1.0, 1.0).expect("range"),
        orientation,
    )
    .expect("plot area")
}

#[test]
fn scale_round_trip_within_tolerance() {
    let scale = LinearScale::new(10.0, 110.0).expect("valid scale");
    let original = 42.5;
    let px = scale.value_to_device(original, 0.0, 1000.0);
    let recovered = scale.device_to_value(px, 0.0, 1000.0);
    assert!((recovered - original).abs() <= 1e-9);
}

#[test]
fn degenerate_scales_are_rejected() {
    assert!(LinearScale::new(1.0, 1.0).is_err());
    assert!(LinearScale::new(f64::NAN, 1.0).is_err());
    assert!(LinearScale::new(0.0, f64::INFINITY).is_err());
}

#[test]
fn reversed_scale_reports_sorted_extent() {
    let scale = LinearScale::new(5.0, -5.0).expect("reversed scale");
    assert_eq!(scale.domain(), (5.0, -5.0));
    assert_eq!(scale.extent(), (-5.0, 5.0));
    assert!((scale.value_to_device(5.0, 0.0, 100.0) - 0.0).abs() <= 1e-9);
    assert!((scale.shifted(2.0).extent().1 - 7.0).abs() <= 1e-9);
}

#[test]
fn vertical_plot_grows_range_upwards() {
    let area = plot(Orientation::Vertical);
    let bottom_left = area.data_to_device(DataPoint::new(0.0, -1.0));
    assert!((bottom_left.x - 20.0).abs() <= 1e-9);
    assert!((bottom_left.y - 110.0).abs() <= 1e-9);

    let top_right = area.data_to_device(DataPoint::new(50.0, 1.0));
    assert!((top_right.x - 220.0).abs() <= 1e-9);
    assert!((top_right.y - 10.0).abs() <= 1e-9);
}

#[test]
fn horizontal_plot_swaps_axes() {
    let area = plot(Orientation::Horizontal);
    // Domain runs up the device y axis, range along device x.
    let origin = area.data_to_device(DataPoint::new(0.0, -1.0));
    assert!((origin.x - 20.0).abs() <= 1e-9);
    assert!((origin.y - 110.0).abs() <= 1e-9);

    let p = area.data_to_device(DataPoint::new(50.0, 0.0));
    assert!((p.x - 120.0).abs() <= 1e-9);
    assert!((p.y - 10.0).abs() <= 1e-9);
}

#[test]
fn device_to_data_inverts_both_orientations() {
    for orientation in [Orientation::Vertical, Orientation::Horizontal] {
        let area = plot(orientation);
        let original = DataPoint::new(12.5, 0.25);
        let back = area.device_to_data(area.data_to_device(original));
        assert!((back.x - original.x).abs() <= 1e-9, "{orientation:?}");
        assert!((back.y - original.y).abs() <= 1e-9, "{orientation:?}");
    }
}

#[test]
fn plot_area_rejects_empty_rectangles_and_pans_axes() {
    let empty = PlotArea::new(
        DeviceRect::new(0.0, 0.0, 0.0, 10.0),
        LinearScale::new(0.0, 1.0).expect("domain"),
        LinearScale::new(0.0, 1.0).expect("range"),
        Orientation::Vertical,
    );
    assert!(empty.is_err());

    let mut area = plot(Orientation::Vertical);
    assert!(area.contains(DevicePoint::new(100.0, 50.0)));
    assert!(!area.contains(DevicePoint::new(5.0, 50.0)));
    assert!(area.set_data_area(DeviceRect::new(0.0, 0.0, -1.0, 1.0)).is_err());

    area.pan_by(5.0, -0.5);
    assert_eq!(area.domain().domain(), (5.0, 55.0));
    assert_eq!(area.range().domain(), (-1.5, 0.5));
}
