mod canvas;
mod frame;
mod null_renderer;
mod primitives;

pub use canvas::PixelCanvas;
pub use frame::RenderFrame;
pub use null_renderer::NullRenderer;
pub use primitives::{Color, ImagePrimitive, LinePrimitive, RectPrimitive};

use crate::error::MapResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized, deterministic `RenderFrame` so
/// drawing code remains isolated from color mapping and interaction logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> MapResult<()>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoContextRenderer, CairoRenderStats, CairoRenderer};
