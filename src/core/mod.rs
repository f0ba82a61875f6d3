pub mod field;
pub mod grid;
pub mod plot_area;
pub mod scale;
pub mod types;

pub use field::{
    DataHandoff, GridField, ScalarField, SharedField, ensure_field_matches, finite_min_max,
    finite_samples,
};
pub use grid::Grid2D;
pub use plot_area::PlotArea;
pub use scale::LinearScale;
pub use types::{DataPoint, DevicePoint, DeviceRect, Orientation, Viewport};
