use tracing::trace;

use crate::error::MapResult;
use crate::interaction::Supervisor;
use crate::render::{ImagePrimitive, RenderFrame, Renderer};

#[cfg(feature = "cairo-backend")]
use crate::render::CairoContextRenderer;

use super::MapChart;

pub(super) struct RenderCoordinator;

impl RenderCoordinator {
    pub(super) fn render<R: Renderer, S: Supervisor>(chart: &mut MapChart<R, S>) -> MapResult<()> {
        let frame = Self::build_frame(chart)?;
        chart.renderer.render(&frame)
    }

    #[cfg(feature = "cairo-backend")]
    pub(super) fn render_on_cairo_context<R: Renderer + CairoContextRenderer, S: Supervisor>(
        chart: &mut MapChart<R, S>,
        context: &cairo::Context,
    ) -> MapResult<()> {
        let frame = Self::build_frame(chart)?;
        chart.renderer.render_on_cairo_context(context, &frame)
    }

    /// Raster first, then overlays in a fixed order so later managers draw
    /// on top: ROIs, profiles, value markers, map markers, tools.
    pub(super) fn build_frame<R: Renderer, S: Supervisor>(
        chart: &mut MapChart<R, S>,
    ) -> MapResult<RenderFrame> {
        let mut frame = RenderFrame::new(chart.config.viewport);
        let raster = chart.layer.composite(&chart.plot_area)?;
        chart.occupied_area = raster.as_ref().map(|output| output.area);
        if let Some(output) = raster {
            let target = output.placement();
            frame.images.push(ImagePrimitive::new(output.image, target));
        }

        let plot_area = &chart.plot_area;
        let overlays = &chart.arbiter;
        overlays.rois.append_primitives(plot_area, &mut frame);
        overlays.profiles.append_primitives(plot_area, &mut frame);
        overlays.value_markers.append_primitives(plot_area, &mut frame);
        overlays.map_markers.append_primitives(plot_area, &mut frame);
        overlays.tools.append_primitives(plot_area, &mut frame);
        trace!(
            images = frame.images.len(),
            rects = frame.rects.len(),
            lines = frame.lines.len(),
            "chart frame built"
        );
        Ok(frame)
    }
}

impl<R: Renderer, S: Supervisor> MapChart<R, S> {
    /// Builds the frame `render` would draw without touching the renderer.
    pub fn build_frame(&mut self) -> MapResult<RenderFrame> {
        RenderCoordinator::build_frame(self)
    }

    /// Renders the frame into an external cairo context.
    #[cfg(feature = "cairo-backend")]
    pub fn render_on_cairo_context(&mut self, context: &cairo::Context) -> MapResult<()>
    where
        R: CairoContextRenderer,
    {
        RenderCoordinator::render_on_cairo_context(self, context)
    }
}
