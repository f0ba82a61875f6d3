use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::core::{DataPoint, DevicePoint, DeviceRect, PlotArea};
use crate::error::{MapError, MapResult};
use crate::interaction::hit::{
    fraction_of, nearest_on_polyline, point_at_fraction, point_within, to_device,
};
use crate::interaction::{
    ChartHost, Consumption, CursorKind, InteractionMode, MouseInputResponse, OverlayKey,
    OverlayStyle, PointerEvent,
};
use crate::render::RenderFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileShape {
    /// Single segment, two clicks.
    Line,
    /// One vertex per click, finished by right click or multi-click.
    Polyline,
    /// Pointer path sampled on move, finished by the next click.
    Freehand,
}

impl ProfileShape {
    #[must_use]
    pub fn for_mode(mode: InteractionMode) -> Option<Self> {
        match mode {
            InteractionMode::ProfileLine => Some(Self::Line),
            InteractionMode::ProfilePolyline => Some(Self::Polyline),
            InteractionMode::ProfileFreehand => Some(Self::Freehand),
            _ => None,
        }
    }

    /// Shapes built over more than two steps.
    #[must_use]
    pub fn is_complex(self) -> bool {
        !matches!(self, Self::Line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConstructionState {
    #[default]
    Idle,
    UnderConstruction,
    Finished,
}

/// Measurement path over the map with optional knobs.
///
/// Knobs are arc-length fractions in `[0, 1]`, kept in insertion order so
/// their indices stay stable for supervisor callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    key: OverlayKey,
    shape: ProfileShape,
    points: Vec<DataPoint>,
    knobs: SmallVec<[f64; 4]>,
    state: ConstructionState,
    style: OverlayStyle,
}

impl Profile {
    /// Builds a finished profile.
    ///
    /// Invariants:
    /// - at least two finite points
    /// - a `Line` has exactly two points
    pub fn new(key: OverlayKey, shape: ProfileShape, points: Vec<DataPoint>) -> MapResult<Self> {
        if points.len() < 2 {
            return Err(MapError::InvalidData(
                "profile needs at least two points".to_owned(),
            ));
        }
        if shape == ProfileShape::Line && points.len() != 2 {
            return Err(MapError::InvalidData(
                "line profile must have exactly two points".to_owned(),
            ));
        }
        if points.iter().any(|point| !point.is_finite()) {
            return Err(MapError::InvalidData(
                "profile points must be finite".to_owned(),
            ));
        }
        Ok(Self {
            key,
            shape,
            points,
            knobs: SmallVec::new(),
            state: ConstructionState::Finished,
            style: OverlayStyle::default(),
        })
    }

    fn draft(key: OverlayKey, shape: ProfileShape, first: DataPoint) -> Self {
        Self {
            key,
            shape,
            points: vec![first],
            knobs: SmallVec::new(),
            state: ConstructionState::UnderConstruction,
            style: OverlayStyle::default(),
        }
    }

    #[must_use]
    pub fn key(&self) -> OverlayKey {
        self.key
    }

    #[must_use]
    pub fn shape(&self) -> ProfileShape {
        self.shape
    }

    #[must_use]
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    #[must_use]
    pub fn knobs(&self) -> &[f64] {
        &self.knobs
    }

    #[must_use]
    pub fn state(&self) -> ConstructionState {
        self.state
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

    /// Point at arc-length fraction `t`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Option<DataPoint> {
        point_at_fraction(&self.points, t)
    }

    #[must_use]
    pub fn knob_points(&self) -> Vec<DataPoint> {
        self.knobs
            .iter()
            .filter_map(|knob| self.point_at(*knob))
            .collect()
    }

    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let mut next = self.clone();
        for point in &mut next.points {
            point.x += dx;
            point.y += dy;
        }
        next
    }

    pub fn with_point(&self, index: usize, point: DataPoint) -> MapResult<Self> {
        if !point.is_finite() {
            return Err(MapError::InvalidData(
                "profile points must be finite".to_owned(),
            ));
        }
        let mut next = self.clone();
        let slot = next.points.get_mut(index).ok_or_else(|| {
            MapError::InvalidData(format!("profile {} has no vertex {index}", self.key))
        })?;
        *slot = point;
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
            MapError::InvalidData(format!("profile {} has no knob {index}", self.key))
        })?;
        *slot = position;
        Ok(next)
    }

    pub fn without_knob(&self, index: usize) -> MapResult<Self> {
        if index >= self.knobs.len() {
            return Err(MapError::InvalidData(format!(
                "profile {} has no knob {index}",
                self.key
            )));
        }
        let mut next = self.clone();
        next.knobs.remove(index);
        Ok(next)
    }
}

fn validate_knob(position: f64) -> MapResult<()> {
    if !(0.0..=1.0).contains(&position) {
        return Err(MapError::InvalidData(format!(
            "profile knob {position} must lie in [0, 1]"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ProfileHit {
    Knob { key: OverlayKey, index: usize },
    Vertex { key: OverlayKey, index: usize },
    Body { key: OverlayKey, fraction: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Caught {
    Knob { key: OverlayKey, index: usize },
    Vertex { key: OverlayKey, index: usize },
    Body { key: OverlayKey, last: DataPoint },
}

/// Owns profiles and drives their click-by-click construction.
#[derive(Debug, Default)]
pub struct ProfileManager {
    profiles: IndexMap<OverlayKey, Profile>,
    draft: Option<Profile>,
    preview: Option<DataPoint>,
    caught: Option<Caught>,
    just_added_knob: Option<(OverlayKey, usize)>,
    /// Set when the last construction completed; cleared by the next start or cancel.
    finished: bool,
    next_key: u64,
    style: OverlayStyle,
    visible: bool,
}

impl ProfileManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn profiles(&self) -> &IndexMap<OverlayKey, Profile> {
        &self.profiles
    }

    #[must_use]
    pub fn get(&self, key: OverlayKey) -> Option<&Profile> {
        self.profiles.get(&key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Stores a styled copy; returns the replaced profile, if any.
    pub fn add_or_replace(&mut self, profile: &Profile) -> Option<Profile> {
        self.next_key = self.next_key.max(profile.key.0.saturating_add(1));
        let mut copy = profile.clone().with_style(self.style);
        copy.state = ConstructionState::Finished;
        self.profiles.insert(copy.key, copy)
    }

    pub fn remove(&mut self, key: OverlayKey) -> Option<Profile> {
        self.profiles.shift_remove(&key)
    }

    /// Replaces every profile.
    pub fn set_profiles<'a>(&mut self, profiles: impl IntoIterator<Item = &'a Profile>) {
        self.profiles.clear();
        for profile in profiles {
            self.add_or_replace(profile);
        }
    }

    pub fn clear(&mut self) {
        self.profiles.clear();
        self.cancel_construction();
        self.caught = None;
    }

    #[must_use]
    pub fn draft(&self) -> Option<&Profile> {
        self.draft.as_ref()
    }

    /// `Finished` persists after a completed construction until the next one
    /// starts or the manager is cancelled.
    #[must_use]
    pub fn construction_state(&self) -> ConstructionState {
        if self.draft.is_some() {
            ConstructionState::UnderConstruction
        } else if self.finished {
            ConstructionState::Finished
        } else {
            ConstructionState::Idle
        }
    }

    pub fn cancel_construction(&mut self) {
        self.finished = false;
        if self.draft.take().is_some() {
            debug!("profile construction cancelled");
        }
        self.preview = None;
    }

    #[must_use]
    pub fn style(&self) -> OverlayStyle {
        self.style
    }

    /// Restyles every stored profile.
    pub fn set_style(&mut self, style: OverlayStyle) {
        self.style = style;
        for profile in self.profiles.values_mut() {
            profile.style = style;
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if !visible {
            self.cancel_construction();
            self.caught = None;
        }
    }

    /// Appends profile strokes and knob handles.
    pub fn append_primitives(&self, plot_area: &PlotArea, frame: &mut RenderFrame) {
        if !self.visible {
            return;
        }
        for profile in self.profiles.values() {
            profile
                .style
                .polyline(&to_device(plot_area, &profile.points), &mut frame.lines);
            for knob in profile.knob_points() {
                frame
                    .rects
                    .push(profile.style.knob(plot_area.data_to_device(knob)));
            }
        }
        if let Some(draft) = &self.draft {
            let mut path = to_device(plot_area, &draft.points);
            if let Some(preview) = self.preview {
                path.push(plot_area.data_to_device(preview));
            }
            self.style.polyline(&path, &mut frame.lines);
        }
    }

    fn accepts(&self, mode: InteractionMode) -> bool {
        mode.is_profile() || mode == InteractionMode::Edit
    }

    fn hit_test(&self, p: DevicePoint, plot_area: &PlotArea, tolerance: f64) -> Option<ProfileHit> {
        for profile in self.profiles.values().rev() {
            let knobs: Vec<DevicePoint> = profile
                .knob_points()
                .into_iter()
                .map(|knob| plot_area.data_to_device(knob))
                .collect();
            if let Some(index) = point_within(p, &knobs, tolerance) {
                return Some(ProfileHit::Knob {
                    key: profile.key,
                    index,
                });
            }
        }
        for profile in self.profiles.values().rev() {
            let vertices = to_device(plot_area, &profile.points);
            if let Some(index) = point_within(p, &vertices, tolerance) {
                return Some(ProfileHit::Vertex {
                    key: profile.key,
                    index,
                });
            }
        }
        for profile in self.profiles.values().rev() {
            let vertices = to_device(plot_area, &profile.points);
            let Some(hit) = nearest_on_polyline(p, &vertices) else {
                continue;
            };
            if hit.distance <= tolerance {
                return Some(ProfileHit::Body {
                    key: profile.key,
                    fraction: fraction_of(&profile.points, hit.segment, hit.t),
                });
            }
        }
        None
    }

    /// Sends an edited copy through the supervisor and stores what it approves.
    fn push_copy(&mut self, copy: Profile, host: &mut dyn ChartHost) {
        let key = copy.key;
        match host
            .supervisor()
            .add_or_replace_profile(copy.with_style(self.style))
        {
            Some(accepted) => {
                self.profiles.insert(accepted.key, accepted);
            }
            None => warn!(%key, "supervisor rejected profile update"),
        }
    }

    fn start_construction(&mut self, shape: ProfileShape, first: DataPoint) {
        let key = OverlayKey(self.next_key);
        self.next_key = self.next_key.saturating_add(1);
        self.finished = false;
        debug!(%key, ?shape, "profile construction started");
        self.draft = Some(Profile::draft(key, shape, first).with_style(self.style));
        self.preview = None;
    }

    fn finish_construction(&mut self, host: &mut dyn ChartHost) -> MapResult<()> {
        let Some(draft) = self.draft.take() else {
            return Ok(());
        };
        self.preview = None;
        if draft.points.len() < 2 {
            debug!(key = %draft.key, "profile construction cancelled");
            return Ok(());
        }
        let profile = Profile::new(draft.key, draft.shape, draft.points)?;
        debug!(
            key = %profile.key,
            vertices = profile.points.len(),
            "profile construction finished"
        );
        self.finished = true;
        self.push_copy(profile, host);
        Ok(())
    }

    fn remove_interactive(&mut self, key: OverlayKey, host: &mut dyn ChartHost) {
        if host.supervisor().remove_profile(key) {
            self.profiles.shift_remove(&key);
            debug!(%key, "profile removed");
        } else {
            warn!(%key, "supervisor rejected profile removal");
        }
    }

    fn clicked_on_entity(
        &mut self,
        hit: ProfileHit,
        multi_click: bool,
        just_added: Option<(OverlayKey, usize)>,
        host: &mut dyn ChartHost,
    ) -> MapResult<()> {
        match hit {
            // The first click of a double click on the body created this knob.
            ProfileHit::Knob { key, index } if multi_click && just_added == Some((key, index)) => {
                self.remove_interactive(key, host);
            }
            ProfileHit::Knob { key, index } if multi_click => {
                let Some(profile) = self.profiles.get(&key) else {
                    return Ok(());
                };
                let updated = profile.without_knob(index)?;
                if host.supervisor().remove_profile_knob(key, index) {
                    self.profiles.insert(key, updated);
                }
            }
            ProfileHit::Vertex { key, .. } | ProfileHit::Body { key, .. } if multi_click => {
                self.remove_interactive(key, host);
            }
            ProfileHit::Body { key, fraction } => {
                let Some(profile) = self.profiles.get(&key) else {
                    return Ok(());
                };
                let updated = profile.with_knob(fraction)?;
                if host.supervisor().add_profile_knob(key, fraction) {
                    self.just_added_knob = Some((key, updated.knobs.len() - 1));
                    self.profiles.insert(key, updated);
                }
            }
            ProfileHit::Knob { .. } | ProfileHit::Vertex { .. } => {}
        }
        Ok(())
    }
}

impl MouseInputResponse for ProfileManager {
    fn name(&self) -> &'static str {
        "profile"
    }

    fn mouse_pressed(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        if !self.accepts(host.mode()) {
            return Ok(());
        }
        if !event.is_primary() || self.draft.is_some() || event.is_consumed(Consumption::ChartEdition)
        {
            return Ok(());
        }
        let Some(hit) = self.hit_test(event.device(), host.plot_area(), host.hit_tolerance()) else {
            return Ok(());
        };
        event.consume(Consumption::ChartEdition);
        self.caught = Some(match hit {
            ProfileHit::Knob { key, index } => Caught::Knob { key, index },
            ProfileHit::Vertex { key, index } => Caught::Vertex { key, index },
            ProfileHit::Body { key, .. } => Caught::Body {
                key,
                last: event.data(),
            },
        });
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
            Caught::Knob { key, .. } | Caught::Vertex { key, .. } | Caught::Body { key, .. } => key,
        };
        let Some(profile) = self.profiles.get(&key).cloned() else {
            self.caught = None;
            return Ok(());
        };
        let data = event.data();
        match caught {
            Caught::Knob { index, .. } => {
                let path = to_device(host.plot_area(), &profile.points);
                let Some(hit) = nearest_on_polyline(event.device(), &path) else {
                    return Ok(());
                };
                let fraction = fraction_of(&profile.points, hit.segment, hit.t);
                let updated = profile.with_knob_moved(index, fraction)?;
                if host.supervisor().move_profile_knob(key, index, fraction) {
                    self.profiles.insert(key, updated);
                }
            }
            Caught::Vertex { index, .. } => {
                self.push_copy(profile.with_point(index, data)?, host);
            }
            Caught::Body { last, .. } => {
                self.push_copy(profile.translated(data.x - last.x, data.y - last.y), host);
                self.caught = Some(Caught::Body { key, last: data });
            }
        }
        Ok(())
    }

    fn mouse_moved(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        if !self.accepts(host.mode()) {
            return Ok(());
        }
        if let Some(draft) = &mut self.draft {
            if draft.shape == ProfileShape::Freehand {
                draft.points.push(event.data());
            } else {
                self.preview = Some(event.data());
            }
        }
        if event.is_consumed(Consumption::CursorChange) {
            return Ok(());
        }
        let cursor = match self.hit_test(event.device(), host.plot_area(), host.hit_tolerance()) {
            Some(ProfileHit::Knob { .. } | ProfileHit::Vertex { .. }) => CursorKind::Hand,
            Some(ProfileHit::Body { .. }) => CursorKind::Move,
            None if self.draft.is_some() || host.mode().is_profile() => CursorKind::Crosshair,
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
        if event.is_secondary() {
            if self.draft.is_some() && event.try_consume(Consumption::RightClick) {
                self.finish_construction(host)?;
            }
            return Ok(());
        }
        if !event.is_primary() || event.is_consumed(Consumption::ChartEdition) {
            return Ok(());
        }
        if let Some(draft) = &mut self.draft {
            event.consume(Consumption::ChartEdition);
            if event.is_multi_click() {
                return self.finish_construction(host);
            }
            draft.points.push(event.data());
            return match draft.shape {
                ProfileShape::Polyline => {
                    debug!(key = %draft.key, vertices = draft.points.len(), "profile vertex added");
                    Ok(())
                }
                ProfileShape::Line | ProfileShape::Freehand => self.finish_construction(host),
            };
        }
        match self.hit_test(event.device(), host.plot_area(), host.hit_tolerance()) {
            Some(hit) => {
                event.consume(Consumption::ChartEdition);
                self.clicked_on_entity(hit, event.is_multi_click(), just_added, host)?;
            }
            None => {
                if let Some(shape) = ProfileShape::for_mode(host.mode()) {
                    event.consume(Consumption::ChartEdition);
                    self.start_construction(shape, event.data());
                }
            }
        }
        Ok(())
    }

    fn is_chart_element_caught(&self) -> bool {
        self.caught.is_some()
    }

    fn is_complex_element_under_construction(&self) -> bool {
        self.draft
            .as_ref()
            .is_some_and(|draft| draft.shape.is_complex())
    }

    fn is_right_click_reserved(&self, data_area: DeviceRect, point: DevicePoint) -> bool {
        self.draft.is_some() && data_area.contains(point)
    }
}
