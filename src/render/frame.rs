use crate::core::Viewport;
use crate::error::{MapError, MapResult};
use crate::render::{ImagePrimitive, LinePrimitive, RectPrimitive};

/// Backend-agnostic scene for one chart draw pass.
///
/// Images are drawn first, then rects, then lines, so overlays always sit on
/// top of the data raster.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub images: Vec<ImagePrimitive>,
    pub rects: Vec<RectPrimitive>,
    pub lines: Vec<LinePrimitive>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            images: Vec::new(),
            rects: Vec::new(),
            lines: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: ImagePrimitive) -> Self {
        self.images.push(image);
        self
    }

    #[must_use]
    pub fn with_line(mut self, line: LinePrimitive) -> Self {
        self.lines.push(line);
        self
    }

    #[must_use]
    pub fn with_rect(mut self, rect: RectPrimitive) -> Self {
        self.rects.push(rect);
        self
    }

    pub fn validate(&self) -> MapResult<()> {
        if !self.viewport.is_valid() {
            return Err(MapError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        for image in &self.images {
            image.validate()?;
        }
        for rect in &self.rects {
            rect.validate()?;
        }
        for line in &self.lines {
            line.validate()?;
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.lines.is_empty() && self.rects.is_empty()
    }
}
