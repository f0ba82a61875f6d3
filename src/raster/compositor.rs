#[cfg(feature = "parallel-raster")]
use rayon::prelude::*;

use crate::core::{DataPoint, DevicePoint, DeviceRect, Grid2D, Orientation, PlotArea, ScalarField};
use crate::core::ensure_field_matches;
use crate::error::MapResult;
use crate::raster::{MaskPolicy, NoRegion, Region, ScaleLookup};
use crate::render::Color;

/// Inclusive block of grid cells selected for one composite pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellWindow {
    pub min_row: usize,
    pub max_row: usize,
    pub min_col: usize,
    pub max_col: usize,
}

impl CellWindow {
    #[must_use]
    pub fn row_count(self) -> usize {
        self.max_row - self.min_row + 1
    }

    #[must_use]
    pub fn column_count(self) -> usize {
        self.max_col - self.min_col + 1
    }

    #[must_use]
    pub fn cell_count(self) -> usize {
        self.row_count() * self.column_count()
    }

    #[must_use]
    pub fn contains(self, row: usize, col: usize) -> bool {
        (self.min_row..=self.max_row).contains(&row) && (self.min_col..=self.max_col).contains(&col)
    }

    /// Image `(width, height)` for the given orientation.
    #[must_use]
    pub fn image_size(self, orientation: Orientation) -> (usize, usize) {
        match orientation {
            Orientation::Vertical => (self.column_count(), self.row_count()),
            Orientation::Horizontal => (self.row_count(), self.column_count()),
        }
    }
}

/// Pixel walk of one composite pass: orientation plus the direction of
/// each axis on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Traversal {
    pub orientation: Orientation,
    /// Domain values shrink where they normally grow (rightwards or upwards).
    pub domain_reversed: bool,
    pub range_reversed: bool,
}

impl Traversal {
    #[must_use]
    pub fn of(plot_area: &PlotArea) -> Self {
        let reversed = |(start, end): (f64, f64)| end < start;
        Self {
            orientation: plot_area.orientation(),
            domain_reversed: reversed(plot_area.domain().domain()),
            range_reversed: reversed(plot_area.range().domain()),
        }
    }
}

impl From<Orientation> for Traversal {
    fn from(orientation: Orientation) -> Self {
        Self {
            orientation,
            domain_reversed: false,
            range_reversed: false,
        }
    }
}

fn offset_of(index: usize, low: usize, high: usize, from_high: bool) -> usize {
    if from_high { high - index } else { index - low }
}

fn index_at(offset: usize, low: usize, high: usize, from_high: bool) -> usize {
    if from_high { high - offset } else { low + offset }
}

/// Row-major buffer index of cell `(row, col)`.
///
/// With increasing axes: vertical image rows walk grid rows from `max_row`
/// down and image columns walk grid columns upwards; horizontal image rows
/// walk grid columns from `max_col` down and image columns walk grid rows
/// upwards. A reversed axis flips its walk. The result matches the device
/// rectangle produced by `PlotArea` without a transpose pass.
#[must_use]
pub fn buffer_index(
    row: usize,
    col: usize,
    window: CellWindow,
    traversal: impl Into<Traversal>,
) -> usize {
    let t = traversal.into();
    let (w, r, d) = (window, t.range_reversed, t.domain_reversed);
    match t.orientation {
        Orientation::Vertical => {
            offset_of(row, w.min_row, w.max_row, !r) * w.column_count()
                + offset_of(col, w.min_col, w.max_col, d)
        }
        Orientation::Horizontal => {
            offset_of(col, w.min_col, w.max_col, !d) * w.row_count()
                + offset_of(row, w.min_row, w.max_row, r)
        }
    }
}

/// Inverse of `buffer_index`: grid cell shown at image pixel `(px, py)`.
#[must_use]
pub fn pixel_cell(
    px: usize,
    py: usize,
    window: CellWindow,
    traversal: impl Into<Traversal>,
) -> (usize, usize) {
    let t = traversal.into();
    let (w, r, d) = (window, t.range_reversed, t.domain_reversed);
    match t.orientation {
        Orientation::Vertical => (
            index_at(py, w.min_row, w.max_row, !r),
            index_at(px, w.min_col, w.max_col, d),
        ),
        Orientation::Horizontal => (
            index_at(px, w.min_row, w.max_row, r),
            index_at(py, w.min_col, w.max_col, !d),
        ),
    }
}

/// Cells that can be visible in the plot's current axis extents, widened
/// by one cell on every side and clamped to the grid.
#[must_use]
pub fn visible_window(grid: Grid2D, plot_area: &PlotArea) -> Option<CellWindow> {
    let (x_lo, x_hi) = plot_area.domain().extent();
    let (y_lo, y_hi) = plot_area.range().extent();
    let (min_col, max_col) = clamped_indices(
        grid.x_to_fractional_column(x_lo),
        grid.x_to_fractional_column(x_hi),
        grid.column_count(),
    )?;
    let (min_row, max_row) = clamped_indices(
        grid.y_to_fractional_row(y_lo),
        grid.y_to_fractional_row(y_hi),
        grid.row_count(),
    )?;
    Some(CellWindow {
        min_row,
        max_row,
        min_col,
        max_col,
    })
}

fn clamped_indices(lo: f64, hi: f64, count: usize) -> Option<(usize, usize)> {
    // A cell centered at index i covers [i - 0.5, i + 0.5].
    let first = (lo - 0.5).ceil() - 1.0;
    let last = (hi + 0.5).floor() + 1.0;
    let first = first.max(0.0);
    let last = last.min((count - 1) as f64);
    if !first.is_finite() || !last.is_finite() || first > last {
        return None;
    }
    Some((first as usize, last as usize))
}

/// Device rectangle exactly covering the cells of `window`.
#[must_use]
pub fn occupied_rect(grid: Grid2D, window: CellWindow, plot_area: &PlotArea) -> DeviceRect {
    let half_x = 0.5 * grid.x_increment();
    let half_y = 0.5 * grid.y_increment();
    let low = DataPoint::new(
        grid.column_to_x(window.min_col) - half_x,
        grid.row_to_y(window.min_row) - half_y,
    );
    let high = DataPoint::new(
        grid.column_to_x(window.max_col) + half_x,
        grid.row_to_y(window.max_row) + half_y,
    );
    DeviceRect::from_corners(plot_area.data_to_device(low), plot_area.data_to_device(high))
}

/// Packed straight-alpha `0xAARRGGBB` image, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RasterImage {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl RasterImage {
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

/// Hit-test entity covering the composited cells, used by tooltips.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupiedArea {
    rect: DeviceRect,
    window: CellWindow,
    traversal: Traversal,
}

impl OccupiedArea {
    #[must_use]
    pub fn rect(&self) -> DeviceRect {
        self.rect
    }

    #[must_use]
    pub fn window(&self) -> CellWindow {
        self.window
    }

    /// Grid cell `(row, col)` drawn under the device point.
    #[must_use]
    pub fn cell_at(&self, point: DevicePoint) -> Option<(usize, usize)> {
        if !self.rect.contains(point) || self.rect.is_empty() {
            return None;
        }
        let (width, height) = self.window.image_size(self.traversal.orientation);
        let px = ((point.x - self.rect.x) / self.rect.width * width as f64).floor() as usize;
        let py = ((point.y - self.rect.y) / self.rect.height * height as f64).floor() as usize;
        Some(pixel_cell(
            px.min(width - 1),
            py.min(height - 1),
            self.window,
            self.traversal,
        ))
    }

    /// Sample value drawn under the device point.
    #[must_use]
    pub fn value_at<F: ScalarField + ?Sized>(&self, field: &F, point: DevicePoint) -> Option<f64> {
        let (row, col) = self.cell_at(point)?;
        Some(field.z(row, col))
    }
}

/// Output of one composite pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterOutput {
    pub image: RasterImage,
    pub area: OccupiedArea,
}

impl RasterOutput {
    #[must_use]
    pub fn placement(&self) -> DeviceRect {
        self.area.rect
    }
}

/// Mask configuration for one pass.
#[derive(Debug, Clone, Copy)]
pub struct MaskSpec<'a> {
    pub policy: MaskPolicy,
    pub region: &'a dyn Region,
    pub color: Color,
}

impl MaskSpec<'_> {
    #[must_use]
    pub fn none() -> MaskSpec<'static> {
        MaskSpec {
            policy: MaskPolicy::NoMask,
            region: &NoRegion,
            color: Color::TRANSPARENT,
        }
    }
}

/// Converts the visible part of `field` into a packed raster.
///
/// Returns `Ok(None)` when no cell overlaps the plot's axis extents. Masked
/// cells get the mask color without any scale lookup.
pub fn composite<F, L>(
    field: &F,
    grid: Grid2D,
    lookup: &L,
    mask: MaskSpec<'_>,
    plot_area: &PlotArea,
) -> MapResult<Option<RasterOutput>>
where
    F: ScalarField + Sync + ?Sized,
    L: ScaleLookup + Sync,
{
    ensure_field_matches(field, grid)?;
    let Some(window) = visible_window(grid, plot_area) else {
        return Ok(None);
    };
    let traversal = Traversal::of(plot_area);
    let rect = occupied_rect(grid, window, plot_area);

    let inside = match mask.policy {
        MaskPolicy::NoMask => None,
        MaskPolicy::MaskInside | MaskPolicy::MaskOutside => {
            let mut flags = vec![false; window.cell_count()];
            mask.region.classify(&grid, window, &mut flags);
            Some(flags)
        }
    };
    let masked_value = mask.policy == MaskPolicy::MaskInside;
    let mask_argb = mask.color.to_argb32();

    let (width, height) = window.image_size(traversal.orientation);
    let mut pixels = vec![0_u32; width * height];
    let cols = window.column_count();

    let fill_line = |py: usize, line: &mut [u32]| {
        for (px, out) in line.iter_mut().enumerate() {
            let (row, col) = pixel_cell(px, py, window, traversal);
            *out = match &inside {
                Some(flags)
                    if flags[(row - window.min_row) * cols + col - window.min_col]
                        == masked_value =>
                {
                    mask_argb
                }
                _ => lookup.argb(field.z(row, col)),
            };
        }
    };

    #[cfg(feature = "parallel-raster")]
    pixels
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(py, line)| fill_line(py, line));

    #[cfg(not(feature = "parallel-raster"))]
    for (py, line) in pixels.chunks_mut(width).enumerate() {
        fill_line(py, line);
    }

    Ok(Some(RasterOutput {
        image: RasterImage {
            width,
            height,
            pixels,
        },
        area: OccupiedArea {
            rect,
            window,
            traversal,
        },
    }))
}
