//! Pointer-event arbitration across overlay managers.

pub mod arbiter;
pub mod basic;
pub mod event;
pub(crate) mod hit;
pub mod host;
pub mod map_marker;
pub mod profile;
pub mod roi;
pub mod tool;
pub mod value_marker;

pub use arbiter::{MouseInputResponse, PointerEventArbiter, PointerKind, dispatch_in_order};
pub use basic::BasicResponse;
pub use event::{Consumption, ConsumptionFlags, PointerButton, PointerEvent};
pub use hit::{OverlayKey, OverlayStyle};
pub use host::{ChartContext, ChartHost, CursorKind, InteractionMode, NoopSupervisor, Supervisor};
pub use map_marker::{MapMarker, MapMarkerManager};
pub use profile::{ConstructionState, Profile, ProfileManager, ProfileShape};
pub use roi::{Roi, RoiManager, RoiShape};
pub use tool::ToolManager;
pub use value_marker::{MarkerAxis, ValueMarker, ValueMarkerManager};
