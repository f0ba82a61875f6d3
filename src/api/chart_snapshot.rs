use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::error::{MapError, MapResult};
use crate::interaction::{CursorKind, InteractionMode, Supervisor};
use crate::raster::{Bounds, MaskPolicy, RangeSelector};
use crate::render::Renderer;

use super::MapChart;

pub const MAP_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

/// Serializable chart state used by regression tests and debugging tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapChartSnapshot {
    pub viewport: Viewport,
    pub mode: InteractionMode,
    pub cursor: CursorKind,
    /// `(rows, columns)` of the loaded grid.
    pub grid_size: Option<(usize, usize)>,
    pub range_selector: RangeSelector,
    pub active_bounds: (f64, f64),
    pub full_bounds: Option<Bounds>,
    pub mask_policy: MaskPolicy,
    pub roi_count: usize,
    pub profile_count: usize,
    pub map_marker_count: usize,
    pub value_marker_count: usize,
    pub active_tool: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapChartSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: MapChartSnapshot,
}

impl MapChartSnapshot {
    pub fn to_json_contract_v1_pretty(&self) -> MapResult<String> {
        let payload = MapChartSnapshotJsonContractV1 {
            schema_version: MAP_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            MapError::InvalidData(format!("failed to serialize snapshot contract v1: {e}"))
        })
    }

    /// Accepts either a bare snapshot or a versioned contract payload.
    pub fn from_json_compat_str(input: &str) -> MapResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<MapChartSnapshot>(input) {
            return Ok(snapshot);
        }
        let payload: MapChartSnapshotJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            MapError::InvalidData(format!("failed to parse snapshot json payload: {e}"))
        })?;
        if payload.schema_version != MAP_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(MapError::InvalidData(format!(
                "unsupported snapshot schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.snapshot)
    }
}

impl<R: Renderer, S: Supervisor> MapChart<R, S> {
    #[must_use]
    pub fn snapshot(&self) -> MapChartSnapshot {
        let overlays = &self.arbiter;
        MapChartSnapshot {
            viewport: self.config.viewport,
            mode: self.mode,
            cursor: self.cursor,
            grid_size: self
                .layer
                .grid()
                .map(|grid| (grid.row_count(), grid.column_count())),
            range_selector: self.layer.gradient_range_selector(),
            active_bounds: (self.layer.lower_bound(), self.layer.upper_bound()),
            full_bounds: self.layer.range_state().full(),
            mask_policy: self.layer.mask_policy(),
            roi_count: overlays.rois.len(),
            profile_count: overlays.profiles.len(),
            map_marker_count: overlays.map_markers.len(),
            value_marker_count: overlays.value_markers.len(),
            active_tool: overlays.tools.active_tool_id().map(str::to_owned),
        }
    }

    pub fn snapshot_json_contract_v1_pretty(&self) -> MapResult<String> {
        self.snapshot().to_json_contract_v1_pretty()
    }
}
