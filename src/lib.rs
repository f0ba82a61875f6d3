//! scanmap-rs: false-color rendering of 2D scan data with interactive overlays.
//!
//! The crate splits into a grid-to-raster color-mapping pipeline (`raster`)
//! and a pointer-event arbitration engine for ROIs, profiles, markers and
//! measurement tools (`interaction`, `extensions`). `api::MapChart` ties both
//! to a `render::Renderer`.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod raster;
pub mod render;
pub mod telemetry;

pub use api::{MapChart, MapChartConfig};
pub use error::{MapError, MapResult};
