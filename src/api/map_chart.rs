use tracing::debug;

use crate::core::{LinearScale, PlotArea, Viewport};
use crate::error::MapResult;
use crate::interaction::{CursorKind, InteractionMode, PointerEventArbiter, Supervisor};
use crate::raster::{ColorGradient, OccupiedArea, RasterLayer};
use crate::render::Renderer;

use super::MapChartConfig;
use super::render_coordinator::RenderCoordinator;

/// Main orchestration facade consumed by host applications.
///
/// `MapChart` owns the plot geometry, the color-mapping layer and the
/// overlay arbiter, and forwards finished frames to the renderer. Overlay
/// changes made interactively are reported to the supervisor `S`.
pub struct MapChart<R: Renderer, S: Supervisor> {
    pub(super) renderer: R,
    pub(super) supervisor: S,
    pub(super) config: MapChartConfig,
    pub(super) plot_area: PlotArea,
    pub(super) layer: RasterLayer,
    pub(super) arbiter: PointerEventArbiter,
    pub(super) mode: InteractionMode,
    pub(super) cursor: CursorKind,
    /// Hit-test entity of the last composited raster.
    pub(super) occupied_area: Option<OccupiedArea>,
}

impl<R: Renderer, S: Supervisor> MapChart<R, S> {
    /// Creates a chart from a validated config.
    pub fn new(renderer: R, supervisor: S, config: MapChartConfig) -> MapResult<Self> {
        config.validate()?;
        let domain = LinearScale::new(config.domain_start, config.domain_end)?;
        let range = LinearScale::new(config.range_start, config.range_end)?;
        let plot_area = PlotArea::new(config.data_area, domain, range, config.orientation)?;

        let mut layer = RasterLayer::new(ColorGradient::preset(config.gradient));
        layer.set_outside_range_colors(config.outside_range_colors())?;
        layer.set_nan_color(config.nan_color)?;
        layer.set_mask_policy(config.mask_policy);
        layer.set_mask_color(config.mask_color)?;
        layer.set_gradient_range_selector(config.range_selector);

        let mut arbiter = PointerEventArbiter::new();
        arbiter.rois.set_style(config.overlay_style);
        arbiter.profiles.set_style(config.overlay_style);
        arbiter.map_markers.set_style(config.overlay_style);
        arbiter.value_markers.set_style(config.overlay_style);

        let mut chart = Self {
            renderer,
            supervisor,
            config,
            plot_area,
            layer,
            arbiter,
            mode: InteractionMode::default(),
            cursor: CursorKind::default(),
            occupied_area: None,
        };
        chart.apply_mode_visibility();
        debug!(
            width = config.viewport.width,
            height = config.viewport.height,
            "map chart created"
        );
        Ok(chart)
    }

    #[must_use]
    pub fn config(&self) -> &MapChartConfig {
        &self.config
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.config.viewport
    }

    #[must_use]
    pub fn plot_area(&self) -> &PlotArea {
        &self.plot_area
    }

    /// Replaces the plot geometry, e.g. after the host re-laid out its axes.
    pub fn set_plot_area(&mut self, plot_area: PlotArea) {
        self.plot_area = plot_area;
        self.occupied_area = None;
    }

    #[must_use]
    pub fn layer(&self) -> &RasterLayer {
        &self.layer
    }

    /// Direct layer access for listener registration and custom regions.
    pub fn layer_mut(&mut self) -> &mut RasterLayer {
        &mut self.layer
    }

    #[must_use]
    pub fn overlays(&self) -> &PointerEventArbiter {
        &self.arbiter
    }

    /// Direct access to the overlay managers for programmatic edits.
    pub fn overlays_mut(&mut self) -> &mut PointerEventArbiter {
        &mut self.arbiter
    }

    #[must_use]
    pub fn supervisor(&self) -> &S {
        &self.supervisor
    }

    pub fn supervisor_mut(&mut self) -> &mut S {
        &mut self.supervisor
    }

    #[must_use]
    pub fn cursor(&self) -> CursorKind {
        self.cursor
    }

    #[must_use]
    pub fn occupied_area(&self) -> Option<OccupiedArea> {
        self.occupied_area
    }

    pub fn render(&mut self) -> MapResult<()> {
        RenderCoordinator::render(self)
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
