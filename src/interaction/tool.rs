use tracing::debug;

use crate::core::PlotArea;
use crate::error::{MapError, MapResult};
use crate::extensions::MeasurementTool;
use crate::interaction::{ChartHost, InteractionMode, MouseInputResponse, PointerEvent};
use crate::render::RenderFrame;

/// Registry of measurement tools; forwards events to the active one while
/// the chart is in `Tool` mode.
#[derive(Default)]
pub struct ToolManager {
    tools: Vec<Box<dyn MeasurementTool>>,
    active: Option<usize>,
}

impl std::fmt::Debug for ToolManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<&str> = self.tools.iter().map(|tool| tool.id()).collect();
        f.debug_struct("ToolManager")
            .field("tools", &ids)
            .field("active", &self.active_tool_id())
            .finish()
    }
}

impl ToolManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool with unique identifier.
    pub fn register_tool(&mut self, tool: Box<dyn MeasurementTool>) -> MapResult<()> {
        let tool_id = tool.id().to_owned();
        if tool_id.is_empty() {
            return Err(MapError::InvalidData("tool id must not be empty".to_owned()));
        }
        if self.has_tool(&tool_id) {
            return Err(MapError::InvalidData(format!(
                "tool with id `{tool_id}` is already registered"
            )));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Unregisters a tool by id. Returns `true` when removed.
    pub fn unregister_tool(&mut self, tool_id: &str) -> bool {
        let Some(position) = self.position(tool_id) else {
            return false;
        };
        self.tools.remove(position);
        self.active = match self.active {
            Some(active) if active == position => None,
            Some(active) if active > position => Some(active - 1),
            other => other,
        };
        true
    }

    #[must_use]
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn has_tool(&self, tool_id: &str) -> bool {
        self.position(tool_id).is_some()
    }

    pub fn set_active_tool(&mut self, tool_id: &str) -> MapResult<()> {
        let position = self.position(tool_id).ok_or_else(|| {
            MapError::InvalidData(format!("tool with id `{tool_id}` is not registered"))
        })?;
        debug!(tool = tool_id, "active tool changed");
        self.active = Some(position);
        Ok(())
    }

    pub fn clear_active_tool(&mut self) {
        self.active = None;
    }

    #[must_use]
    pub fn active_tool_id(&self) -> Option<&str> {
        self.active.map(|index| self.tools[index].id())
    }

    #[must_use]
    pub fn tool(&self, tool_id: &str) -> Option<&dyn MeasurementTool> {
        self.position(tool_id).map(|index| self.tools[index].as_ref())
    }

    pub fn append_primitives(&self, plot_area: &PlotArea, frame: &mut RenderFrame) {
        for tool in &self.tools {
            tool.append_primitives(plot_area, frame);
        }
    }

    fn position(&self, tool_id: &str) -> Option<usize> {
        self.tools.iter().position(|tool| tool.id() == tool_id)
    }

    /// Runs `handler` on the active tool in `Tool` mode, tagging failures
    /// with the tool id.
    fn forward(
        &mut self,
        mode: InteractionMode,
        handler: impl FnOnce(&mut dyn MeasurementTool) -> MapResult<()>,
    ) -> MapResult<()> {
        if mode != InteractionMode::Tool {
            return Ok(());
        }
        let Some(tool) = self.active.and_then(|index| self.tools.get_mut(index)) else {
            return Ok(());
        };
        handler(tool.as_mut()).map_err(|err| MapError::Overlay {
            manager: "tool",
            message: format!("tool `{}`: {err}", tool.id()),
        })
    }
}

impl MouseInputResponse for ToolManager {
    fn name(&self) -> &'static str {
        "tool"
    }

    fn mouse_pressed(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        self.forward(host.mode(), |tool| tool.mouse_pressed(event, host))
    }

    fn mouse_released(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        self.forward(host.mode(), |tool| tool.mouse_released(event, host))
    }

    fn mouse_dragged(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        self.forward(host.mode(), |tool| tool.mouse_dragged(event, host))
    }

    fn mouse_moved(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        self.forward(host.mode(), |tool| tool.mouse_moved(event, host))
    }

    fn mouse_clicked(&mut self, event: &mut PointerEvent, host: &mut dyn ChartHost) -> MapResult<()> {
        self.forward(host.mode(), |tool| tool.mouse_clicked(event, host))
    }

    fn is_chart_element_caught(&self) -> bool {
        self.active
            .is_some_and(|index| self.tools[index].is_chart_element_caught())
    }
}
