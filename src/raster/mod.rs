//! Grid-to-raster color mapping.
//!
//! `PaintScale` maps values to colors, `GradientRangeState` decides its
//! bounds, `Region`/`MaskPolicy` select masked cells and `composite` turns the
//! visible part of a field into a packed image. `RasterLayer` ties them
//! together and broadcasts property changes.

pub mod compositor;
pub mod gradient;
pub mod layer;
pub mod mask;
pub mod paint_scale;
pub mod range_policy;

pub use compositor::{
    CellWindow, MaskSpec, OccupiedArea, RasterImage, RasterOutput, Traversal, buffer_index, composite,
    occupied_rect, pixel_cell, visible_window,
};
pub use gradient::{ColorGradient, GradientPreset, GradientStop};
pub use layer::{ChangeValue, LayerChange, LayerListener, LayerProperty, RasterLayer};
pub use mask::{CompositeRegion, MaskPolicy, NoRegion, PolygonRegion, RectRegion, Region};
pub use paint_scale::{OutsideRangeColors, PaintScale, ScaleLookup};
pub use range_policy::{AutomaticBounds, Bounds, GradientRangeState, PercentileBounds, RangeSelector};
