//! Host-facing chart facade.
//!
//! `MapChart` is split across controller files the same way a host uses it:
//! data, gradient range and mask, pointer input, ROI sync and rendering.

mod chart_config;
mod chart_snapshot;
mod data_controller;
mod gradient_controller;
mod map_chart;
mod pointer_controller;
mod render_coordinator;
mod roi_sync;

pub use chart_config::MapChartConfig;
pub use chart_snapshot::{
    MAP_SNAPSHOT_JSON_SCHEMA_V1, MapChartSnapshot, MapChartSnapshotJsonContractV1,
};
pub use map_chart::MapChart;
pub use pointer_controller::{PointerOutcome, Tooltip};
