use serde::{Deserialize, Serialize};

use crate::core::{DataPoint, DevicePoint, PlotArea};
use crate::render::{Color, LinePrimitive, RectPrimitive};

/// Opaque overlay identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OverlayKey(pub u64);

impl std::fmt::Display for OverlayKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stroke and handle style applied by a manager to the entities it stores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub stroke: Color,
    pub stroke_width: f64,
    pub knob_color: Color,
    pub knob_half_size: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            stroke: Color::rgb(1.0, 1.0, 1.0),
            stroke_width: 1.0,
            knob_color: Color::rgb(1.0, 0.8, 0.0),
            knob_half_size: 3.0,
        }
    }
}

impl OverlayStyle {
    pub(crate) fn line(&self, a: DevicePoint, b: DevicePoint) -> LinePrimitive {
        LinePrimitive::new(a.x, a.y, b.x, b.y, self.stroke_width, self.stroke)
    }

    pub(crate) fn knob(&self, at: DevicePoint) -> RectPrimitive {
        RectPrimitive::handle(at.x, at.y, self.knob_half_size, self.knob_color)
    }

    pub(crate) fn polyline(&self, points: &[DevicePoint], lines: &mut Vec<LinePrimitive>) {
        lines.extend(points.windows(2).map(|pair| self.line(pair[0], pair[1])));
    }
}

/// Closest point of a polyline to a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PolylineHit {
    pub segment: usize,
    /// Parameter along `segment` in `[0, 1]`.
    pub t: f64,
    pub distance: f64,
}

pub(crate) fn to_device(plot_area: &PlotArea, points: &[DataPoint]) -> Vec<DevicePoint> {
    points
        .iter()
        .map(|point| plot_area.data_to_device(*point))
        .collect()
}

/// Projection parameter and distance of `p` onto segment `[a, b]`.
pub(crate) fn project_on_segment(p: DevicePoint, a: DevicePoint, b: DevicePoint) -> (f64, f64) {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    let t = if len2 > 0.0 {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let foot = DevicePoint::new(a.x + t * dx, a.y + t * dy);
    (t, p.distance_to(foot))
}

pub(crate) fn nearest_on_polyline(p: DevicePoint, points: &[DevicePoint]) -> Option<PolylineHit> {
    points
        .windows(2)
        .enumerate()
        .map(|(segment, pair)| {
            let (t, distance) = project_on_segment(p, pair[0], pair[1]);
            PolylineHit {
                segment,
                t,
                distance,
            }
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Index of the first point within `tolerance` of `p`.
pub(crate) fn point_within(p: DevicePoint, points: &[DevicePoint], tolerance: f64) -> Option<usize> {
    points
        .iter()
        .position(|candidate| candidate.distance_to(p) <= tolerance)
}

/// Cumulative arc lengths in data units, starting at 0.
pub(crate) fn cumulative_lengths(points: &[DataPoint]) -> Vec<f64> {
    let mut acc = 0.0;
    let mut lengths = Vec::with_capacity(points.len());
    lengths.push(0.0);
    for pair in points.windows(2) {
        acc += (pair[1].x - pair[0].x).hypot(pair[1].y - pair[0].y);
        lengths.push(acc);
    }
    lengths
}

/// Point at arc-length fraction `t` of a data polyline.
pub(crate) fn point_at_fraction(points: &[DataPoint], t: f64) -> Option<DataPoint> {
    let first = *points.first()?;
    let lengths = cumulative_lengths(points);
    let total = *lengths.last()?;
    if total <= 0.0 {
        return Some(first);
    }
    let target = t.clamp(0.0, 1.0) * total;
    let segment = lengths
        .partition_point(|len| *len < target)
        .clamp(1, points.len() - 1);
    let (start, end) = (lengths[segment - 1], lengths[segment]);
    let local = if end > start {
        (target - start) / (end - start)
    } else {
        0.0
    };
    let (a, b) = (points[segment - 1], points[segment]);
    Some(DataPoint::new(
        a.x + local * (b.x - a.x),
        a.y + local * (b.y - a.y),
    ))
}

/// Arc-length fraction of a position given as `(segment, t)`.
pub(crate) fn fraction_of(points: &[DataPoint], segment: usize, t: f64) -> f64 {
    let lengths = cumulative_lengths(points);
    let total = lengths.last().copied().unwrap_or(0.0);
    if total <= 0.0 || segment + 1 >= lengths.len() {
        return 0.0;
    }
    let along = lengths[segment] + t * (lengths[segment + 1] - lengths[segment]);
    (along / total).clamp(0.0, 1.0)
}

/// Even-odd point-in-polygon test in device space.
pub(crate) fn polygon_contains(p: DevicePoint, vertices: &[DevicePoint]) -> bool {
    let Some(mut previous) = vertices.last().copied() else {
        return false;
    };
    let mut inside = false;
    for current in vertices {
        if (current.y > p.y) != (previous.y > p.y) {
            let x = current.x + (p.y - current.y) * (previous.x - current.x) / (previous.y - current.y);
            if p.x < x {
                inside = !inside;
            }
        }
        previous = *current;
    }
    inside
}
