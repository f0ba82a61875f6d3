use crate::error::MapResult;
use crate::render::{RenderFrame, Renderer};

/// No-op renderer used by tests and headless chart usage.
///
/// It still validates frame content so tests can catch invalid geometry
/// before a real backend is involved.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub last_image_count: usize,
    pub last_line_count: usize,
    pub last_rect_count: usize,
    pub frames_rendered: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> MapResult<()> {
        frame.validate()?;
        self.last_image_count = frame.images.len();
        self.last_line_count = frame.lines.len();
        self.last_rect_count = frame.rects.len();
        self.frames_rendered += 1;
        Ok(())
    }
}
