//! Optional pointer-driven tools plugged into the tool manager.
//!
//! Tools stay outside the built-in overlay managers and talk to the chart
//! only through `ChartHost`.

pub mod tools;

pub use tools::{DistanceTool, Measurement, MeasurementTool};
