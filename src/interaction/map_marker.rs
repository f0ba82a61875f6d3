use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::core::{DataPoint, DevicePoint, PlotArea};
use crate::error::{MapError, MapResult};
use crate::interaction::{
    ChartHost, Consumption, CursorKind, InteractionMode, MouseInputResponse, OverlayKey,
    OverlayStyle, PointerEvent,
};
use crate::render::RenderFrame;

/// Positional marker pinned to one data point.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    key: OverlayKey,
    position: DataPoint,
    style: OverlayStyle,
}

impl MapMarker {
    pub fn new(key: OverlayKey, position: DataPoint) -> MapResult<Self> {
        if !position.is_finite() {
            return Err(MapError::InvalidData(
                "map marker position must be finite".to_owned(),
            ));
        }
        Ok(Self {
            key,
            position,
            style: OverlayStyle::default(),
        })
    }

    #[must_use]
    pub fn key(&self) -> OverlayKey {
        self.key
    }

    #[must_use]
    pub fn position(&self) -> DataPoint {
        self.position
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

    pub fn moved_to(&self, position: DataPoint) -> MapResult<Self> {
        Ok(Self::new(self.key, position)?.with_style(self.style))
    }
}

/// Owns positional markers. New markers are keyed by `current_index`.
#[derive(Debug, Default)]
pub struct MapMarkerManager {
    markers: IndexMap<OverlayKey, MapMarker>,
    current_index: u64,
    caught: Option<OverlayKey>,
    style: OverlayStyle,
}

impl MapMarkerManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn markers(&self) -> &IndexMap<OverlayKey, MapMarker> {
        &self.markers
    }

    #[must_use]
    pub fn get(&self, key: OverlayKey) -> Option<&MapMarker> {
        self.markers.get(&key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Key the next interactively created marker receives.
    #[must_use]
    pub fn current_index(&self) -> u64 {
        self.current_index
    }

    /// Stores a styled copy. `current_index` always stays past every stored key.
    pub fn add_or_replace(&mut self, marker: &MapMarker) -> Option<MapMarker> {
        self.current_index = self.current_index.max(marker.key.0.saturating_add(1));
        self.markers
            .insert(marker.key, marker.clone().with_style(self.style))
    }

    /// Adds a marker under the next free key.
    pub fn add_at(&mut self, position: DataPoint) -> MapResult<OverlayKey> {
        let marker = MapMarker::new(OverlayKey(self.current_index), position)?;
        self.current_index = self.current_index.saturating_add(1);
        let key = marker.key;
        self.add_or_replace(&marker);
        Ok(key)
    }

    pub fn remove(&mut self, key: OverlayKey) -> Option<MapMarker> {
        if self.caught == Some(key) {
            self.caught = None;
        }
        self.markers.shift_remove(&key)
    }

    /// Replaces every marker and advances `current_index` past the largest key.
    pub fn set_markers<'a>(&mut self, markers: impl IntoIterator<Item = &'a MapMarker>) {
        self.markers.clear();
        self.caught = None;
        for marker in markers {
            self.add_or_replace(marker);
        }
        if let Some(max_key) = self.markers.keys().max() {
            self.current_index = self.current_index.max(max_key.0.saturating_add(1));
        }
    }

    pub fn set_style(&mut self, style: OverlayStyle) {
        self.style = style;
        for marker in self.markers.values_mut() {
            marker.style = style;
        }
    }

    pub fn append_primitives(&self, plot_area: &PlotArea, frame: &mut RenderFrame) {
        for marker in self.markers.values() {
            let at = plot_area.data_to_device(marker.position);
            let arm = 2.0 * marker.style.knob_half_size;
            frame.lines.push(marker.style.line(
                DevicePoint::new(at.x - arm, at.y),
                DevicePoint::new(at.x + arm, at.y),
            ));
            frame.lines.push(marker.style.line(
                DevicePoint::new(at.x, at.y - arm),
                DevicePoint::new(at.x, at.y + arm),
            ));
        }
    }

    fn accepts(&self, mode: InteractionMode) -> bool {
        matches!(mode, InteractionMode::MapMarker | InteractionMode::Edit)
    }

    fn hit_test(&self, p: DevicePoint, plot_area: &PlotArea, tolerance: f64) -> Option<OverlayKey> {
        self.markers
            .values()
            .rev()
            .find(|marker| plot_area.data_to_device(marker.position).distance_to(p) <= tolerance)
            .map(|marker| marker.key)
    }

    fn push_copy(&mut self, copy: MapMarker, host: &mut dyn ChartHost) {
        let key = copy.key;
        match host
            .supervisor()
            .add_or_replace_map_marker(copy.with_style(self.style))
        {
            Some(accepted) => {
                self.current_index = self.current_index.max(accepted.key.0.saturating_add(1));
                self.markers.insert(accepted.key, accepted);
            }
            None => warn!(%key, "supervisor rejected map marker update"),
        }
    }
}

impl MouseInputResponse for MapMarkerManager {
    fn name(&self) -> &'static str {
        "map-marker"
    }

    fn mouse_pressed(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        if !self.accepts(host.mode()) {
            return Ok(());
        }
        if !event.is_primary() || event.is_consumed(Consumption::ChartEdition) {
            return Ok(());
        }
        if let Some(key) = self.hit_test(event.device(), host.plot_area(), host.hit_tolerance()) {
            event.consume(Consumption::ChartEdition);
            self.caught = Some(key);
        }
        Ok(())
    }

    fn mouse_released(&mut self, _event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        if !self.accepts(host.mode()) {
            return Ok(());
        }
        self.caught = None;
        Ok(())
    }

    fn mouse_dragged(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        if !self.accepts(host.mode()) {
            return Ok(());
        }
        let Some(key) = self.caught else {
            return Ok(());
        };
        if !event.try_consume(Consumption::MouseDragged) {
            return Ok(());
        }
        if event.try_consume(Consumption::CursorChange) {
            host.request_cursor(CursorKind::Grab);
        }
        let Some(marker) = self.markers.get(&key) else {
            self.caught = None;
            return Ok(());
        };
        let moved = marker.moved_to(event.data())?;
        self.push_copy(moved, host);
        Ok(())
    }

    fn mouse_moved(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        if !self.accepts(host.mode()) {
            return Ok(());
        }
        if event.is_consumed(Consumption::CursorChange) {
            return Ok(());
        }
        let cursor = if self
            .hit_test(event.device(), host.plot_area(), host.hit_tolerance())
            .is_some()
        {
            CursorKind::Hand
        } else if host.mode() == InteractionMode::MapMarker {
            CursorKind::Crosshair
        } else {
            return Ok(());
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
        if !event.is_primary() || event.is_consumed(Consumption::ChartEdition) {
            return Ok(());
        }
        match self.hit_test(event.device(), host.plot_area(), host.hit_tolerance()) {
            Some(key) => {
                event.consume(Consumption::ChartEdition);
                if !event.is_multi_click() {
                    return Ok(());
                }
                if host.supervisor().remove_map_marker(key) {
                    self.remove(key);
                    debug!(%key, "map marker removed");
                } else {
                    warn!(%key, "supervisor rejected map marker removal");
                }
            }
            None if host.mode() == InteractionMode::MapMarker && !event.is_multi_click() => {
                event.consume(Consumption::ChartEdition);
                let marker = MapMarker::new(OverlayKey(self.current_index), event.data())?;
                self.current_index = self.current_index.saturating_add(1);
                debug!(key = %marker.key, "map marker created");
                self.push_copy(marker, host);
            }
            None => {}
        }
        Ok(())
    }

    fn is_chart_element_caught(&self) -> bool {
        self.caught.is_some()
    }
}
