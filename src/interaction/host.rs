use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::PlotArea;
use crate::extensions::Measurement;
use crate::interaction::{MapMarker, OverlayKey, Profile, Roi, ValueMarker};

/// Current chart interaction mode. Managers only react to their own modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InteractionMode {
    #[default]
    Pan,
    /// Edit existing overlays of every kind; nothing is constructed.
    Edit,
    RoiRectangle,
    RoiFreehand,
    ProfileLine,
    ProfilePolyline,
    ProfileFreehand,
    MapMarker,
    DomainValueMarker,
    RangeValueMarker,
    Tool,
}

impl InteractionMode {
    #[must_use]
    pub fn is_roi(self) -> bool {
        matches!(self, Self::RoiRectangle | Self::RoiFreehand)
    }

    #[must_use]
    pub fn is_profile(self) -> bool {
        matches!(
            self,
            Self::ProfileLine | Self::ProfilePolyline | Self::ProfileFreehand
        )
    }

    #[must_use]
    pub fn is_value_marker(self) -> bool {
        matches!(self, Self::DomainValueMarker | Self::RangeValueMarker)
    }

    /// ROIs are shown while drawing or editing them.
    #[must_use]
    pub fn shows_rois(self) -> bool {
        self.is_roi() || self == Self::Edit
    }

    #[must_use]
    pub fn shows_profiles(self) -> bool {
        self.is_profile() || self == Self::Edit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CursorKind {
    #[default]
    Default,
    Crosshair,
    Move,
    Hand,
    Grab,
}

/// Application callbacks for overlay changes made interactively.
///
/// `add_or_replace_*` receive the manager's styled copy and return the
/// entity to store (possibly adjusted), or `None` to reject the change.
/// Knob and removal callbacks return whether the change is approved. Every
/// default approves unchanged.
pub trait Supervisor {
    fn request_cursor_change(&mut self, _cursor: CursorKind) {}

    fn add_or_replace_profile(&mut self, profile: Profile) -> Option<Profile> {
        Some(profile)
    }

    fn remove_profile(&mut self, _key: OverlayKey) -> bool {
        true
    }

    fn add_or_replace_roi(&mut self, roi: Roi) -> Option<Roi> {
        Some(roi)
    }

    fn remove_roi(&mut self, _key: OverlayKey) -> bool {
        true
    }

    fn add_or_replace_map_marker(&mut self, marker: MapMarker) -> Option<MapMarker> {
        Some(marker)
    }

    fn remove_map_marker(&mut self, _key: OverlayKey) -> bool {
        true
    }

    fn add_or_replace_value_marker(&mut self, marker: ValueMarker) -> Option<ValueMarker> {
        Some(marker)
    }

    fn remove_value_marker(&mut self, _key: OverlayKey) -> bool {
        true
    }

    fn add_profile_knob(&mut self, _key: OverlayKey, _position: f64) -> bool {
        true
    }

    fn move_profile_knob(&mut self, _key: OverlayKey, _index: usize, _position: f64) -> bool {
        true
    }

    fn remove_profile_knob(&mut self, _key: OverlayKey, _index: usize) -> bool {
        true
    }

    fn add_value_marker_knob(&mut self, _key: OverlayKey, _position: f64) -> bool {
        true
    }

    fn move_value_marker_knob(&mut self, _key: OverlayKey, _index: usize, _position: f64) -> bool {
        true
    }

    fn remove_value_marker_knob(&mut self, _key: OverlayKey, _index: usize) -> bool {
        true
    }

    fn measurement_completed(&mut self, _tool_id: &str, _measurement: Measurement) {}
}

/// Supervisor that approves everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSupervisor;

impl Supervisor for NoopSupervisor {}

/// Narrow view of the chart handed to managers during dispatch.
pub trait ChartHost {
    fn mode(&self) -> InteractionMode;
    fn plot_area(&self) -> &PlotArea;
    /// Device-pixel radius for anchor and knob hits.
    fn hit_tolerance(&self) -> f64;
    fn supervisor(&mut self) -> &mut dyn Supervisor;
    fn request_cursor(&mut self, cursor: CursorKind);
    fn pan_by(&mut self, dx: f64, dy: f64);
}

/// `ChartHost` over borrowed chart state.
pub struct ChartContext<'a> {
    mode: InteractionMode,
    plot_area: &'a mut PlotArea,
    supervisor: &'a mut dyn Supervisor,
    cursor: &'a mut CursorKind,
    hit_tolerance: f64,
}

impl<'a> ChartContext<'a> {
    #[must_use]
    pub fn new(
        mode: InteractionMode,
        plot_area: &'a mut PlotArea,
        supervisor: &'a mut dyn Supervisor,
        cursor: &'a mut CursorKind,
        hit_tolerance: f64,
    ) -> Self {
        Self {
            mode,
            plot_area,
            supervisor,
            cursor,
            hit_tolerance,
        }
    }

    #[must_use]
    pub fn cursor(&self) -> CursorKind {
        *self.cursor
    }
}

impl ChartHost for ChartContext<'_> {
    fn mode(&self) -> InteractionMode {
        self.mode
    }

    fn plot_area(&self) -> &PlotArea {
        self.plot_area
    }

    fn hit_tolerance(&self) -> f64 {
        self.hit_tolerance
    }

    fn supervisor(&mut self) -> &mut dyn Supervisor {
        self.supervisor
    }

    fn request_cursor(&mut self, cursor: CursorKind) {
        if *self.cursor != cursor {
            trace!(?cursor, "cursor change");
            *self.cursor = cursor;
            self.supervisor.request_cursor_change(cursor);
        }
    }

    fn pan_by(&mut self, dx: f64, dy: f64) {
        self.plot_area.pan_by(dx, dy);
    }
}
