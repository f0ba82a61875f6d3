use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::core::{DataPoint, DevicePoint, PlotArea};
use crate::error::{MapError, MapResult};
use crate::interaction::hit::point_within;
use crate::interaction::{
    ChartHost, Consumption, CursorKind, InteractionMode, MouseInputResponse, OverlayKey,
    OverlayStyle, PointerEvent,
};
use crate::render::RenderFrame;

/// Axis a value marker sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerAxis {
    /// Line of constant `x`.
    Domain,
    /// Line of constant `y`.
    Range,
}

impl MarkerAxis {
    #[must_use]
    pub fn for_mode(mode: InteractionMode) -> Option<Self> {
        match mode {
            InteractionMode::DomainValueMarker => Some(Self::Domain),
            InteractionMode::RangeValueMarker => Some(Self::Range),
            _ => None,
        }
    }

    /// Component of `point` this axis measures.
    #[must_use]
    pub fn value_of(self, point: DataPoint) -> f64 {
        match self {
            Self::Domain => point.x,
            Self::Range => point.y,
        }
    }

    /// Component of `point` along the marker line.
    #[must_use]
    pub fn along(self, point: DataPoint) -> f64 {
        match self {
            Self::Domain => point.y,
            Self::Range => point.x,
        }
    }
}

/// Marker line at one axis value. Knobs are coordinates along the line.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueMarker {
    key: OverlayKey,
    axis: MarkerAxis,
    value: f64,
    knobs: SmallVec<[f64; 4]>,
    style: OverlayStyle,
}

impl ValueMarker {
    pub fn new(key: OverlayKey, axis: MarkerAxis, value: f64) -> MapResult<Self> {
        if !value.is_finite() {
            return Err(MapError::InvalidData(
                "value marker position must be finite".to_owned(),
            ));
        }
        Ok(Self {
            key,
            axis,
            value,
            knobs: SmallVec::new(),
            style: OverlayStyle::default(),
        })
    }

    #[must_use]
    pub fn key(&self) -> OverlayKey {
        self.key
    }

    #[must_use]
    pub fn axis(&self) -> MarkerAxis {
        self.axis
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn knobs(&self) -> &[f64] {
        &self.knobs
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

    pub fn with_value(&self, value: f64) -> MapResult<Self> {
        if !value.is_finite() {
            return Err(MapError::InvalidData(
                "value marker position must be finite".to_owned(),
            ));
        }
        let mut next = self.clone();
        next.value = value;
        Ok(next)
    }

    pub fn with_knob(&self, position: f64) -> MapResult<Self> {
        validate_knob(position)?;
        let mut next = self.clone();
        next.knobs.push(position);
        Ok(next)
    }

    pub fn with_knob_moved(&self, index: usize, position: f64) -> MapResult<Self> {
        validate_knob(position)?;
        let mut next = self.clone();
        let slot = next.knobs.get_mut(index).ok_or_else(|| {
            MapError::InvalidData(format!("value marker {} has no knob {index}", self.key))
        })?;
        *slot = position;
        Ok(next)
    }

    pub fn without_knob(&self, index: usize) -> MapResult<Self> {
        if index >= self.knobs.len() {
            return Err(MapError::InvalidData(format!(
                "value marker {} has no knob {index}",
                self.key
            )));
        }
        let mut next = self.clone();
        next.knobs.remove(index);
        Ok(next)
    }

    /// Data point of a coordinate along the line.
    #[must_use]
    pub fn point_along(&self, along: f64) -> DataPoint {
        match self.axis {
            MarkerAxis::Domain => DataPoint::new(self.value, along),
            MarkerAxis::Range => DataPoint::new(along, self.value),
        }
    }

    /// Device distance from `p` to the marker line.
    #[must_use]
    pub fn distance_to(&self, p: DevicePoint, plot_area: &PlotArea) -> f64 {
        let on_line = self.point_along(self.axis.along(plot_area.device_to_data(p)));
        plot_area.data_to_device(on_line).distance_to(p)
    }

    fn knob_devices(&self, plot_area: &PlotArea) -> Vec<DevicePoint> {
        self.knobs
            .iter()
            .map(|knob| plot_area.data_to_device(self.point_along(*knob)))
            .collect()
    }
}

fn validate_knob(position: f64) -> MapResult<()> {
    if !position.is_finite() {
        return Err(MapError::InvalidData(
            "value marker knob must be finite".to_owned(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum MarkerHit {
    Knob { key: OverlayKey, index: usize },
    Line { key: OverlayKey },
}

/// Owns domain and range value markers.
#[derive(Debug, Default)]
pub struct ValueMarkerManager {
    markers: IndexMap<OverlayKey, ValueMarker>,
    current_index: u64,
    caught: Option<MarkerHit>,
    just_added_knob: Option<(OverlayKey, usize)>,
    style: OverlayStyle,
}

impl ValueMarkerManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn markers(&self) -> &IndexMap<OverlayKey, ValueMarker> {
        &self.markers
    }

    #[must_use]
    pub fn get(&self, key: OverlayKey) -> Option<&ValueMarker> {
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

    #[must_use]
    pub fn current_index(&self) -> u64 {
        self.current_index
    }

    /// Stores a styled copy. `current_index` always stays past every stored key.
    pub fn add_or_replace(&mut self, marker: &ValueMarker) -> Option<ValueMarker> {
        self.current_index = self.current_index.max(marker.key.0.saturating_add(1));
        self.markers
            .insert(marker.key, marker.clone().with_style(self.style))
    }

    /// Adds a marker under the next free key.
    pub fn add_at(&mut self, axis: MarkerAxis, value: f64) -> MapResult<OverlayKey> {
        let marker = ValueMarker::new(OverlayKey(self.current_index), axis, value)?;
        self.current_index = self.current_index.saturating_add(1);
        let key = marker.key;
        self.add_or_replace(&marker);
        Ok(key)
    }

    pub fn remove(&mut self, key: OverlayKey) -> Option<ValueMarker> {
        self.caught = None;
        self.markers.shift_remove(&key)
    }

    /// Replaces every marker and advances `current_index` past the largest key.
    pub fn set_markers<'a>(&mut self, markers: impl IntoIterator<Item = &'a ValueMarker>) {
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

    /// Marker lines span the data area; knobs are drawn as handles.
    pub fn append_primitives(&self, plot_area: &PlotArea, frame: &mut RenderFrame) {
        let area = plot_area.data_area();
        let corners = [
            plot_area.device_to_data(DevicePoint::new(area.x, area.y)),
            plot_area.device_to_data(DevicePoint::new(area.right(), area.bottom())),
        ];
        for marker in self.markers.values() {
            let start = plot_area.data_to_device(marker.point_along(marker.axis.along(corners[0])));
            let end = plot_area.data_to_device(marker.point_along(marker.axis.along(corners[1])));
            frame.lines.push(marker.style.line(start, end));
            for knob in marker.knob_devices(plot_area) {
                frame.rects.push(marker.style.knob(knob));
            }
        }
    }

    fn accepts(&self, mode: InteractionMode) -> bool {
        mode.is_value_marker() || mode == InteractionMode::Edit
    }

    fn hit_test(&self, p: DevicePoint, plot_area: &PlotArea, tolerance: f64) -> Option<MarkerHit> {
        for marker in self.markers.values().rev() {
            if let Some(index) = point_within(p, &marker.knob_devices(plot_area), tolerance) {
                return Some(MarkerHit::Knob {
                    key: marker.key,
                    index,
                });
            }
        }
        self.markers
            .values()
            .rev()
            .find(|marker| marker.distance_to(p, plot_area) <= tolerance)
            .map(|marker| MarkerHit::Line { key: marker.key })
    }

    fn push_copy(&mut self, copy: ValueMarker, host: &mut dyn ChartHost) {
        let key = copy.key;
        match host
            .supervisor()
            .add_or_replace_value_marker(copy.with_style(self.style))
        {
            Some(accepted) => {
                self.current_index = self.current_index.max(accepted.key.0.saturating_add(1));
                self.markers.insert(accepted.key, accepted);
            }
            None => warn!(%key, "supervisor rejected value marker update"),
        }
    }

    fn clicked_on_marker(
        &mut self,
        hit: MarkerHit,
        event: &PointerEvent,
        just_added: Option<(OverlayKey, usize)>,
        host: &mut dyn ChartHost,
    ) -> MapResult<()> {
        let multi_click = event.is_multi_click();
        match hit {
            MarkerHit::Knob { key, index } if multi_click && just_added != Some((key, index)) => {
                let Some(marker) = self.markers.get(&key) else {
                    return Ok(());
                };
                let updated = marker.without_knob(index)?;
                if host.supervisor().remove_value_marker_knob(key, index) {
                    self.markers.insert(key, updated);
                }
            }
            MarkerHit::Knob { key, .. } | MarkerHit::Line { key } if multi_click => {
                if host.supervisor().remove_value_marker(key) {
                    self.remove(key);
                    debug!(%key, "value marker removed");
                } else {
                    warn!(%key, "supervisor rejected value marker removal");
                }
            }
            MarkerHit::Line { key } => {
                let Some(marker) = self.markers.get(&key) else {
                    return Ok(());
                };
                let along = marker
                    .axis
                    .along(host.plot_area().device_to_data(event.device()));
                let updated = marker.with_knob(along)?;
                if host.supervisor().add_value_marker_knob(key, along) {
                    self.just_added_knob = Some((key, updated.knobs.len() - 1));
                    self.markers.insert(key, updated);
                }
            }
            MarkerHit::Knob { .. } => {}
        }
        Ok(())
    }
}

impl MouseInputResponse for ValueMarkerManager {
    fn name(&self) -> &'static str {
        "value-marker"
    }

    fn mouse_pressed(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        if !self.accepts(host.mode()) {
            return Ok(());
        }
        if !event.is_primary() || event.is_consumed(Consumption::ChartEdition) {
            return Ok(());
        }
        if let Some(hit) = self.hit_test(event.device(), host.plot_area(), host.hit_tolerance()) {
            event.consume(Consumption::ChartEdition);
            self.caught = Some(hit);
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
        let Some(caught) = self.caught else {
            return Ok(());
        };
        if !event.try_consume(Consumption::MouseDragged) {
            return Ok(());
        }
        if event.try_consume(Consumption::CursorChange) {
            host.request_cursor(CursorKind::Grab);
        }
        let key = match caught {
            MarkerHit::Knob { key, .. } | MarkerHit::Line { key } => key,
        };
        let Some(marker) = self.markers.get(&key).cloned() else {
            self.caught = None;
            return Ok(());
        };
        let data = event.data();
        match caught {
            MarkerHit::Knob { index, .. } => {
                let along = marker.axis.along(data);
                let updated = marker.with_knob_moved(index, along)?;
                if host.supervisor().move_value_marker_knob(key, index, along) {
                    self.markers.insert(key, updated);
                }
            }
            MarkerHit::Line { .. } => {
                let updated = marker.with_value(marker.axis.value_of(data))?;
                self.push_copy(updated, host);
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
            Some(MarkerHit::Knob { .. }) => CursorKind::Hand,
            Some(MarkerHit::Line { .. }) => CursorKind::Move,
            None if host.mode().is_value_marker() => CursorKind::Crosshair,
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
        let just_added = self.just_added_knob.take();
        if !event.is_primary() || event.is_consumed(Consumption::ChartEdition) {
            return Ok(());
        }
        match self.hit_test(event.device(), host.plot_area(), host.hit_tolerance()) {
            Some(hit) => {
                event.consume(Consumption::ChartEdition);
                self.clicked_on_marker(hit, event, just_added, host)?;
            }
            None => {
                let Some(axis) = MarkerAxis::for_mode(host.mode()) else {
                    return Ok(());
                };
                if event.is_multi_click() {
                    return Ok(());
                }
                event.consume(Consumption::ChartEdition);
                let marker = ValueMarker::new(
                    OverlayKey(self.current_index),
                    axis,
                    axis.value_of(event.data()),
                )?;
                self.current_index = self.current_index.saturating_add(1);
                debug!(key = %marker.key, ?axis, "value marker created");
                self.push_copy(marker, host);
            }
        }
        Ok(())
    }

    fn is_chart_element_caught(&self) -> bool {
        self.caught.is_some()
    }
}
