use cairo::{Context, Filter, Format, ImageSurface};

use crate::error::{MapError, MapResult};
use crate::raster::RasterImage;
use crate::render::{Color, ImagePrimitive, RectPrimitive, RenderFrame, Renderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub images_drawn: usize,
    pub lines_drawn: usize,
    pub rects_drawn: usize,
}

/// Optional extension trait for renderers that can draw into an external Cairo
/// context (for example a toolkit draw callback).
pub trait CairoContextRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> MapResult<()>;
}

/// Cairo renderer backend.
///
/// Supports offscreen image-surface rendering through `Renderer::render` and
/// in-place rendering on an external Cairo context through
/// `CairoContextRenderer`. Data rasters are painted with `Filter::Nearest`.
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    clear_color: Color,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    pub fn new(width: i32, height: i32) -> MapResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(MapError::InvalidData(
                "cairo surface size must be > 0".to_owned(),
            ));
        }

        let surface = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
        Ok(Self {
            surface,
            clear_color: Color::WHITE,
            last_stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    pub fn set_clear_color(&mut self, color: Color) -> MapResult<()> {
        color.validate()?;
        self.clear_color = color;
        Ok(())
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    fn render_with_context(&mut self, context: &Context, frame: &RenderFrame) -> MapResult<()> {
        frame.validate()?;

        apply_color(context, self.clear_color);
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;

        let mut stats = CairoRenderStats::default();

        for image in &frame.images {
            paint_image(context, image)?;
            stats.images_drawn += 1;
        }

        for rect in &frame.rects {
            paint_rect(context, *rect)?;
            stats.rects_drawn += 1;
        }

        for line in &frame.lines {
            apply_color(context, line.color);
            context.set_line_width(line.stroke_width);
            context.move_to(line.x1, line.y1);
            context.line_to(line.x2, line.y2);
            context
                .stroke()
                .map_err(|err| map_backend_error("failed to stroke line", err))?;
            stats.lines_drawn += 1;
        }

        self.last_stats = stats;
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, frame: &RenderFrame) -> MapResult<()> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        self.render_with_context(&context, frame)
    }
}

impl CairoContextRenderer for CairoRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> MapResult<()> {
        self.render_with_context(context, frame)
    }
}

fn paint_image(context: &Context, primitive: &ImagePrimitive) -> MapResult<()> {
    let image = &primitive.image;
    if image.is_empty() || primitive.target.is_empty() {
        return Ok(());
    }
    let surface = raster_surface(image)?;
    let target = primitive.target;

    context
        .save()
        .map_err(|err| map_backend_error("failed to save context", err))?;
    context.translate(target.x, target.y);
    context.scale(
        target.width / image.width() as f64,
        target.height / image.height() as f64,
    );
    context
        .set_source_surface(&surface, 0.0, 0.0)
        .map_err(|err| map_backend_error("failed to set raster source", err))?;
    context.source().set_filter(Filter::Nearest);
    context
        .paint()
        .map_err(|err| map_backend_error("failed to paint raster", err))?;
    context
        .restore()
        .map_err(|err| map_backend_error("failed to restore context", err))
}

/// Converts straight-alpha ARGB pixels into Cairo's premultiplied native-endian layout.
fn raster_surface(image: &RasterImage) -> MapResult<ImageSurface> {
    let width = u32::try_from(image.width())
        .map_err(|_| MapError::InvalidData("raster too wide for cairo".to_owned()))?;
    let stride = Format::ARgb32
        .stride_for_width(width)
        .map_err(|err| map_backend_error("invalid raster stride", err))?;
    let stride_bytes = stride as usize;
    let mut data = vec![0_u8; stride_bytes * image.height()];
    for (row, chunk) in image.pixels().chunks(image.width()).enumerate() {
        for (col, &argb) in chunk.iter().enumerate() {
            let offset = row * stride_bytes + col * 4;
            data[offset..offset + 4].copy_from_slice(&premultiply(argb).to_ne_bytes());
        }
    }
    ImageSurface::create_for_data(
        data,
        Format::ARgb32,
        width as i32,
        image.height() as i32,
        stride,
    )
    .map_err(|err| map_backend_error("failed to create raster surface", err))
}

fn premultiply(argb: u32) -> u32 {
    let alpha = argb >> 24;
    if alpha == 0xff {
        return argb;
    }
    let channel = |shift: u32| (((argb >> shift) & 0xff) * alpha + 127) / 255;
    (alpha << 24) | (channel(16) << 16) | (channel(8) << 8) | channel(0)
}

fn paint_rect(context: &Context, rect: RectPrimitive) -> MapResult<()> {
    context.rectangle(rect.x, rect.y, rect.width, rect.height);
    apply_color(context, rect.fill_color);
    if rect.border_width > 0.0 {
        context
            .fill_preserve()
            .map_err(|err| map_backend_error("failed to fill rectangle", err))?;
        apply_color(context, rect.border_color);
        context.set_line_width(rect.border_width);
        context
            .stroke()
            .map_err(|err| map_backend_error("failed to stroke rectangle border", err))
    } else {
        context
            .fill()
            .map_err(|err| map_backend_error("failed to fill rectangle", err))
    }
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> MapError {
    MapError::InvalidData(format!("{prefix}: {err}"))
}
