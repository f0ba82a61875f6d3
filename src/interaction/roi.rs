use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{DataPoint, DevicePoint, DeviceRect, Grid2D, PlotArea, ScalarField};
use crate::error::{MapError, MapResult};
use crate::interaction::hit::{nearest_on_polyline, point_within, polygon_contains, to_device};
use crate::interaction::{
    ChartHost, Consumption, CursorKind, InteractionMode, MouseInputResponse, OverlayKey,
    OverlayStyle, PointerEvent,
};
use crate::raster::{CellWindow, CompositeRegion, PolygonRegion, RectRegion, Region};
use crate::render::RenderFrame;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoiShape {
    Rectangle { min: DataPoint, max: DataPoint },
    /// Closed lasso path.
    Freehand { vertices: Vec<DataPoint> },
}

/// Region of interest drawn over the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Roi {
    key: OverlayKey,
    shape: RoiShape,
    style: OverlayStyle,
}

impl Roi {
    /// Axis-aligned rectangle with non-zero extent on both axes.
    pub fn rectangle(key: OverlayKey, a: DataPoint, b: DataPoint) -> MapResult<Self> {
        if !a.is_finite() || !b.is_finite() {
            return Err(MapError::InvalidData(
                "roi corners must be finite".to_owned(),
            ));
        }
        if a.x == b.x || a.y == b.y {
            return Err(MapError::InvalidData(
                "roi rectangle must have a non-zero area".to_owned(),
            ));
        }
        Ok(Self {
            key,
            shape: RoiShape::Rectangle {
                min: DataPoint::new(a.x.min(b.x), a.y.min(b.y)),
                max: DataPoint::new(a.x.max(b.x), a.y.max(b.y)),
            },
            style: OverlayStyle::default(),
        })
    }

    pub fn freehand(key: OverlayKey, vertices: Vec<DataPoint>) -> MapResult<Self> {
        // Validates vertex count and finiteness.
        PolygonRegion::new(vertices.clone())?;
        Ok(Self {
            key,
            shape: RoiShape::Freehand { vertices },
            style: OverlayStyle::default(),
        })
    }

    #[must_use]
    pub fn key(&self) -> OverlayKey {
        self.key
    }

    #[must_use]
    pub fn shape(&self) -> &RoiShape {
        &self.shape
    }

    #[must_use]
    pub fn style(&self) -> OverlayStyle {
        self.style
    }

    #[must_use]
    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    /// Outline vertices; rectangles list corners counter-clockwise from `min`.
    #[must_use]
    pub fn outline(&self) -> Vec<DataPoint> {
        match &self.shape {
            RoiShape::Rectangle { min, max } => vec![
                *min,
                DataPoint::new(max.x, min.y),
                *max,
                DataPoint::new(min.x, max.y),
            ],
            RoiShape::Freehand { vertices } => vertices.clone(),
        }
    }

    pub fn region(&self) -> MapResult<Box<dyn Region + Send + Sync>> {
        Ok(match &self.shape {
            RoiShape::Rectangle { min, max } => Box::new(RectRegion::from_corners(*min, *max)?),
            RoiShape::Freehand { vertices } => Box::new(PolygonRegion::new(vertices.clone())?),
        })
    }

    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let shift = |p: DataPoint| DataPoint::new(p.x + dx, p.y + dy);
        let shape = match &self.shape {
            RoiShape::Rectangle { min, max } => RoiShape::Rectangle {
                min: shift(*min),
                max: shift(*max),
            },
            RoiShape::Freehand { vertices } => RoiShape::Freehand {
                vertices: vertices.iter().copied().map(shift).collect(),
            },
        };
        Self {
            shape,
            ..self.clone()
        }
    }

    /// Corner diagonally across from outline corner `index`.
    pub fn opposite_corner(&self, index: usize) -> MapResult<DataPoint> {
        let RoiShape::Rectangle { .. } = self.shape else {
            return Err(MapError::InvalidData(format!(
                "roi {} has no corners",
                self.key
            )));
        };
        self.outline()
            .get((index + 2) % 4)
            .copied()
            .ok_or_else(|| MapError::InvalidData(format!("roi {} has no corner {index}", self.key)))
    }

    /// Rectangle spanned by `point` and the fixed corner `anchor`.
    pub fn with_corners(&self, point: DataPoint, anchor: DataPoint) -> MapResult<Self> {
        Ok(Self::rectangle(self.key, point, anchor)?.with_style(self.style))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DraftKind {
    Rectangle,
    Freehand,
}

#[derive(Debug, Clone, PartialEq)]
struct RoiDraft {
    kind: DraftKind,
    points: Vec<DataPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RoiHit {
    Corner { key: OverlayKey, index: usize },
    Body { key: OverlayKey },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Caught {
    /// `anchor` stays put for the whole drag, even when the corners swap.
    Corner { key: OverlayKey, anchor: DataPoint },
    Body { key: OverlayKey, last: DataPoint },
}

/// Owns regions of interest; rectangles and lassos are drawn by
/// press-drag-release.
#[derive(Debug, Default)]
pub struct RoiManager {
    rois: IndexMap<OverlayKey, Roi>,
    draft: Option<RoiDraft>,
    caught: Option<Caught>,
    next_key: u64,
    style: OverlayStyle,
    visible: bool,
    changed: bool,
}

impl RoiManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rois(&self) -> &IndexMap<OverlayKey, Roi> {
        &self.rois
    }

    #[must_use]
    pub fn get(&self, key: OverlayKey) -> Option<&Roi> {
        self.rois.get(&key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rois.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rois.is_empty()
    }

    pub fn add_or_replace(&mut self, roi: &Roi) -> Option<Roi> {
        self.next_key = self.next_key.max(roi.key.0.saturating_add(1));
        self.changed = true;
        self.rois
            .insert(roi.key, roi.clone().with_style(self.style))
    }

    pub fn remove(&mut self, key: OverlayKey) -> Option<Roi> {
        let removed = self.rois.shift_remove(&key);
        self.changed |= removed.is_some();
        removed
    }

    pub fn set_rois<'a>(&mut self, rois: impl IntoIterator<Item = &'a Roi>) {
        self.rois.clear();
        self.changed = true;
        for roi in rois {
            self.add_or_replace(roi);
        }
    }

    pub fn clear(&mut self) {
        self.changed |= !self.rois.is_empty();
        self.rois.clear();
        self.draft = None;
        self.caught = None;
    }

    /// Drops an unfinished rectangle or lasso.
    pub fn cancel_construction(&mut self) {
        if self.draft.take().is_some() {
            debug!("roi construction cancelled");
        }
        self.caught = None;
    }

    /// Returns and resets the "ROI set changed" flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    #[must_use]
    pub fn style(&self) -> OverlayStyle {
        self.style
    }

    pub fn set_style(&mut self, style: OverlayStyle) {
        self.style = style;
        for roi in self.rois.values_mut() {
            roi.style = style;
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if !visible {
            self.draft = None;
            self.caught = None;
        }
    }

    /// Union of every ROI, used as the mask region.
    pub fn composite_region(&self) -> MapResult<CompositeRegion> {
        let mut region = CompositeRegion::new();
        for roi in self.rois.values() {
            region.push(roi.region()?);
        }
        Ok(region)
    }

    /// Finite samples whose cell center lies inside any ROI.
    pub fn samples_inside<F: ScalarField + ?Sized>(
        &self,
        field: &F,
        grid: Grid2D,
    ) -> MapResult<Vec<f64>> {
        let window = CellWindow {
            min_row: 0,
            max_row: grid.row_count() - 1,
            min_col: 0,
            max_col: grid.column_count() - 1,
        };
        let mut inside = vec![false; window.cell_count()];
        self.composite_region()?.classify(&grid, window, &mut inside);
        Ok(inside
            .iter()
            .enumerate()
            .filter(|(_, flag)| **flag)
            .map(|(index, _)| field.z(index / grid.column_count(), index % grid.column_count()))
            .filter(|z| z.is_finite())
            .collect())
    }

    pub fn append_primitives(&self, plot_area: &PlotArea, frame: &mut RenderFrame) {
        if !self.visible {
            return;
        }
        for roi in self.rois.values() {
            let mut outline = to_device(plot_area, &roi.outline());
            if let Some(first) = outline.first().copied() {
                outline.push(first);
            }
            roi.style.polyline(&outline, &mut frame.lines);
            if matches!(roi.shape, RoiShape::Rectangle { .. }) {
                for corner in &outline[..outline.len().saturating_sub(1)] {
                    frame.rects.push(roi.style.knob(*corner));
                }
            }
        }
        if let Some(draft) = &self.draft {
            let mut path = match (draft.kind, draft.points.as_slice()) {
                (DraftKind::Rectangle, [a, b]) => vec![
                    *a,
                    DataPoint::new(b.x, a.y),
                    *b,
                    DataPoint::new(a.x, b.y),
                ],
                _ => draft.points.clone(),
            };
            if let Some(first) = path.first().copied() {
                path.push(first);
            }
            self.style
                .polyline(&to_device(plot_area, &path), &mut frame.lines);
        }
    }

    fn accepts(&self, mode: InteractionMode) -> bool {
        mode.is_roi() || mode == InteractionMode::Edit
    }

    fn hit_test(&self, p: DevicePoint, plot_area: &PlotArea, tolerance: f64) -> Option<RoiHit> {
        for roi in self.rois.values().rev() {
            if let RoiShape::Rectangle { .. } = roi.shape {
                let corners = to_device(plot_area, &roi.outline());
                if let Some(index) = point_within(p, &corners, tolerance) {
                    return Some(RoiHit::Corner {
                        key: roi.key,
                        index,
                    });
                }
            }
        }
        for roi in self.rois.values().rev() {
            let mut outline = to_device(plot_area, &roi.outline());
            let inside = polygon_contains(p, &outline);
            if let Some(first) = outline.first().copied() {
                outline.push(first);
            }
            let near_edge =
                nearest_on_polyline(p, &outline).is_some_and(|hit| hit.distance <= tolerance);
            if inside || near_edge {
                return Some(RoiHit::Body { key: roi.key });
            }
        }
        None
    }

    fn push_copy(&mut self, copy: Roi, host: &mut dyn ChartHost) {
        let key = copy.key;
        match host.supervisor().add_or_replace_roi(copy.with_style(self.style)) {
            Some(accepted) => {
                self.rois.insert(accepted.key, accepted);
                self.changed = true;
            }
            None => warn!(%key, "supervisor rejected roi update"),
        }
    }

    fn finish_draft(&mut self, host: &mut dyn ChartHost) -> MapResult<()> {
        let Some(draft) = self.draft.take() else {
            return Ok(());
        };
        let key = OverlayKey(self.next_key);
        let roi = match (draft.kind, draft.points.as_slice()) {
            (DraftKind::Rectangle, [a, b]) if a.x != b.x && a.y != b.y => {
                Roi::rectangle(key, *a, *b)?
            }
            (DraftKind::Freehand, points) if points.len() >= 3 => {
                Roi::freehand(key, points.to_vec())?
            }
            _ => {
                debug!("roi construction cancelled");
                return Ok(());
            }
        };
        self.next_key += 1;
        debug!(%key, "roi construction finished");
        self.push_copy(roi, host);
        Ok(())
    }
}

impl MouseInputResponse for RoiManager {
    fn name(&self) -> &'static str {
        "roi"
    }

    fn mouse_pressed(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        if !self.accepts(host.mode()) {
            return Ok(());
        }
        if !event.is_primary() || event.is_consumed(Consumption::ChartEdition) {
            return Ok(());
        }
        match self.hit_test(event.device(), host.plot_area(), host.hit_tolerance()) {
            Some(RoiHit::Corner { key, index }) => {
                event.consume(Consumption::ChartEdition);
                let anchor = match self.rois.get(&key) {
                    Some(roi) => roi.opposite_corner(index)?,
                    None => return Ok(()),
                };
                self.caught = Some(Caught::Corner { key, anchor });
            }
            Some(RoiHit::Body { key }) => {
                event.consume(Consumption::ChartEdition);
                self.caught = Some(Caught::Body {
                    key,
                    last: event.data(),
                });
            }
            None => {
                let kind = match host.mode() {
                    InteractionMode::RoiRectangle => DraftKind::Rectangle,
                    InteractionMode::RoiFreehand => DraftKind::Freehand,
                    _ => return Ok(()),
                };
                event.consume(Consumption::ChartEdition);
                self.draft = Some(RoiDraft {
                    kind,
                    points: vec![event.data()],
                });
            }
        }
        Ok(())
    }

    fn mouse_released(&mut self, _event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        if !self.accepts(host.mode()) {
            return Ok(());
        }
        self.caught = None;
        self.finish_draft(host)
    }

    fn mouse_dragged(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        if !self.accepts(host.mode()) {
            return Ok(());
        }
        if self.caught.is_none() && self.draft.is_none() {
            return Ok(());
        }
        if !event.try_consume(Consumption::MouseDragged) {
            return Ok(());
        }
        let data = event.data();
        if let Some(draft) = &mut self.draft {
            match draft.kind {
                DraftKind::Rectangle => {
                    draft.points.truncate(1);
                    draft.points.push(data);
                }
                DraftKind::Freehand => draft.points.push(data),
            }
            if event.try_consume(Consumption::CursorChange) {
                host.request_cursor(CursorKind::Crosshair);
            }
            return Ok(());
        }
        let Some(caught) = self.caught else {
            return Ok(());
        };
        if event.try_consume(Consumption::CursorChange) {
            host.request_cursor(CursorKind::Grab);
        }
        let key = match caught {
            Caught::Corner { key, .. } | Caught::Body { key, .. } => key,
        };
        let Some(roi) = self.rois.get(&key).cloned() else {
            self.caught = None;
            return Ok(());
        };
        match caught {
            Caught::Corner { anchor, .. } => {
                // Collapsing the rectangle onto its anchor is skipped.
                if let Ok(updated) = roi.with_corners(data, anchor) {
                    self.push_copy(updated, host);
                }
            }
            Caught::Body { last, .. } => {
                self.push_copy(roi.translated(data.x - last.x, data.y - last.y), host);
                self.caught = Some(Caught::Body { key, last: data });
            }
        }
        Ok(())
    }

    fn mouse_moved(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        if !self.accepts(host.mode()) {
            return Ok(());
        }
        if event.is_consumed(Consumption::CursorChange) {
            return Ok(());
        }
        let cursor = match self.hit_test(event.device(), host.plot_area(), host.hit_tolerance()) {
            Some(RoiHit::Corner { .. }) => CursorKind::Hand,
            Some(RoiHit::Body { .. }) => CursorKind::Move,
            None if host.mode().is_roi() => CursorKind::Crosshair,
            None => return Ok(()),
        };
        if event.try_consume(Consumption::CursorChange) {
            host.request_cursor(cursor);
        }
        Ok(())
    }

    fn mouse_clicked(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        if !self.accepts(host.mode()) {
            return Ok(());
        }
        if !event.is_primary() || !event.is_multi_click() || event.is_consumed(Consumption::ChartEdition)
        {
            return Ok(());
        }
        let Some(hit) = self.hit_test(event.device(), host.plot_area(), host.hit_tolerance()) else {
            return Ok(());
        };
        let key = match hit {
            RoiHit::Corner { key, .. } | RoiHit::Body { key } => key,
        };
        event.consume(Consumption::ChartEdition);
        if host.supervisor().remove_roi(key) {
            self.rois.shift_remove(&key);
            self.changed = true;
            debug!(%key, "roi removed");
        } else {
            warn!(%key, "supervisor rejected roi removal");
        }
        Ok(())
    }

    fn is_chart_element_caught(&self) -> bool {
        self.caught.is_some()
    }

    fn is_complex_element_under_construction(&self) -> bool {
        self.draft
            .as_ref()
            .is_some_and(|draft| draft.kind == DraftKind::Freehand)
    }

    fn is_right_click_reserved(&self, data_area: DeviceRect, point: DevicePoint) -> bool {
        self.draft.is_some() && data_area.contains(point)
    }
}
