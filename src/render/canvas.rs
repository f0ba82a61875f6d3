use crate::core::{DeviceRect, Viewport};
use crate::error::{MapError, MapResult};
use crate::raster::RasterImage;
use crate::render::{Color, LinePrimitive, RectPrimitive, RenderFrame, Renderer};

/// Software render target holding straight-alpha `0xAARRGGBB` pixels.
///
/// Rasters are stretched with nearest-neighbour sampling: every device pixel
/// whose center falls inside the target rect shows exactly one source cell.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelCanvas {
    width: usize,
    height: usize,
    background: u32,
    pixels: Vec<u32>,
}

impl PixelCanvas {
    pub fn new(viewport: Viewport, background: Color) -> MapResult<Self> {
        if !viewport.is_valid() {
            return Err(MapError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        background.validate()?;
        let width = viewport.width as usize;
        let height = viewport.height as usize;
        let background = background.to_argb32();
        Ok(Self {
            width,
            height,
            background,
            pixels: vec![background; width * height],
        })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    pub fn clear(&mut self) {
        self.pixels.fill(self.background);
    }

    /// Stretches `image` into `target` with nearest-neighbour sampling.
    pub fn blit_nearest(&mut self, image: &RasterImage, target: DeviceRect) {
        if image.is_empty() || target.is_empty() {
            return;
        }
        let Some((x0, x1, y0, y1)) = self.covered_pixels(target) else {
            return;
        };
        let src_w = image.width();
        let src_h = image.height();
        for dy in y0..y1 {
            let fy = (dy as f64 + 0.5 - target.y) / target.height;
            let sy = ((fy * src_h as f64).floor() as usize).min(src_h - 1);
            for dx in x0..x1 {
                let fx = (dx as f64 + 0.5 - target.x) / target.width;
                let sx = ((fx * src_w as f64).floor() as usize).min(src_w - 1);
                let src = image.pixels()[sy * src_w + sx];
                self.blend(dx, dy, src);
            }
        }
    }

    pub fn fill_rect(&mut self, rect: RectPrimitive) {
        let outer = DeviceRect::new(rect.x, rect.y, rect.width, rect.height);
        if let Some((x0, x1, y0, y1)) = self.covered_pixels(outer) {
            let fill = rect.fill_color.to_argb32();
            let border = rect.border_color.to_argb32();
            for y in y0..y1 {
                for x in x0..x1 {
                    let cx = x as f64 + 0.5;
                    let cy = y as f64 + 0.5;
                    let on_border = rect.border_width > 0.0
                        && (cx - rect.x < rect.border_width
                            || outer.right() - cx < rect.border_width
                            || cy - rect.y < rect.border_width
                            || outer.bottom() - cy < rect.border_width);
                    self.blend(x, y, if on_border { border } else { fill });
                }
            }
        }
    }

    /// Draws a one-pixel-wide segment by uniform sampling along its length.
    pub fn draw_line(&mut self, line: LinePrimitive) {
        let color = line.color.to_argb32();
        let steps = (line.x2 - line.x1)
            .abs()
            .max((line.y2 - line.y1).abs())
            .ceil()
            .max(1.0) as usize;
        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            let x = line.x1 + (line.x2 - line.x1) * t;
            let y = line.y1 + (line.y2 - line.y1) * t;
            if x >= 0.0 && y >= 0.0 {
                let (px, py) = (x.floor() as usize, y.floor() as usize);
                if px < self.width && py < self.height {
                    self.blend(px, py, color);
                }
            }
        }
    }

    fn covered_pixels(&self, rect: DeviceRect) -> Option<(usize, usize, usize, usize)> {
        let clamp = |value: f64, max: usize| value.clamp(0.0, max as f64) as usize;
        // Pixel centers inside [rect.x, rect.right()) are covered.
        let x0 = clamp((rect.x - 0.5).ceil(), self.width);
        let x1 = clamp((rect.right() - 0.5).ceil(), self.width);
        let y0 = clamp((rect.y - 0.5).ceil(), self.height);
        let y1 = clamp((rect.bottom() - 0.5).ceil(), self.height);
        (x0 < x1 && y0 < y1).then_some((x0, x1, y0, y1))
    }

    fn blend(&mut self, x: usize, y: usize, src: u32) {
        let index = y * self.width + x;
        self.pixels[index] = source_over(src, self.pixels[index]);
    }
}

impl Renderer for PixelCanvas {
    fn render(&mut self, frame: &RenderFrame) -> MapResult<()> {
        frame.validate()?;
        self.clear();
        for image in &frame.images {
            self.blit_nearest(&image.image, image.target);
        }
        for rect in &frame.rects {
            self.fill_rect(*rect);
        }
        for line in &frame.lines {
            self.draw_line(*line);
        }
        Ok(())
    }
}

fn source_over(src: u32, dst: u32) -> u32 {
    let src_a = src >> 24;
    if src_a == 0xff {
        return src;
    }
    if src_a == 0 {
        return dst;
    }
    let dst_a = dst >> 24;
    let out_a = src_a + dst_a * (255 - src_a) / 255;
    if out_a == 0 {
        return 0;
    }
    let channel = |shift: u32| {
        let s = (src >> shift) & 0xff;
        let d = (dst >> shift) & 0xff;
        (s * src_a + d * dst_a * (255 - src_a) / 255) / out_a
    };
    (out_a << 24) | (channel(16) << 16) | (channel(8) << 8) | channel(0)
}
