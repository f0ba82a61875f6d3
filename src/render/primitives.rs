use serde::{Deserialize, Serialize};

use crate::core::DeviceRect;
use crate::error::{MapError, MapResult};
use crate::raster::RasterImage;

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Builds a color from 8-bit channels.
    #[must_use]
    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self::rgb(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
        )
    }

    /// Decodes a packed `0xAARRGGBB` pixel.
    #[must_use]
    pub fn from_argb32(argb: u32) -> Self {
        let channel = |shift: u32| f64::from(((argb >> shift) & 0xff) as u8) / 255.0;
        Self::rgba(channel(16), channel(8), channel(0), channel(24))
    }

    /// Packs the color as straight-alpha `0xAARRGGBB`.
    #[must_use]
    pub fn to_argb32(self) -> u32 {
        let channel = |value: f64| u32::from((value.clamp(0.0, 1.0) * 255.0).round() as u8);
        (channel(self.alpha) << 24)
            | (channel(self.red) << 16)
            | (channel(self.green) << 8)
            | channel(self.blue)
    }

    /// Linear interpolation in RGBA space.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self::rgba(
            mix(self.red, other.red),
            mix(self.green, other.green),
            mix(self.blue, other.blue),
            mix(self.alpha, other.alpha),
        )
    }

    pub fn validate(self) -> MapResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(MapError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Draw command for one line segment in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePrimitive {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke_width: f64,
    pub color: Color,
}

impl LinePrimitive {
    #[must_use]
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64, stroke_width: f64, color: Color) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            stroke_width,
            color,
        }
    }

    pub fn validate(self) -> MapResult<()> {
        if !self.x1.is_finite()
            || !self.y1.is_finite()
            || !self.x2.is_finite()
            || !self.y2.is_finite()
        {
            return Err(MapError::InvalidData(
                "line coordinates must be finite".to_owned(),
            ));
        }
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(MapError::InvalidData(
                "line stroke width must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

/// Filled (and optionally bordered) rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectPrimitive {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill_color: Color,
    pub border_width: f64,
    pub border_color: Color,
}

impl RectPrimitive {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64, fill_color: Color) -> Self {
        Self {
            x,
            y,
            width,
            height,
            fill_color,
            border_width: 0.0,
            border_color: fill_color,
        }
    }

    /// Square centered on a device point, used for knob handles.
    #[must_use]
    pub fn handle(cx: f64, cy: f64, half_size: f64, fill_color: Color) -> Self {
        Self::new(
            cx - half_size,
            cy - half_size,
            2.0 * half_size,
            2.0 * half_size,
            fill_color,
        )
    }

    #[must_use]
    pub const fn with_border(mut self, border_width: f64, border_color: Color) -> Self {
        self.border_width = border_width;
        self.border_color = border_color;
        self
    }

    pub fn validate(self) -> MapResult<()> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(MapError::InvalidData(
                "rect origin must be finite".to_owned(),
            ));
        }
        if !self.width.is_finite() || !self.height.is_finite() || self.width < 0.0 || self.height < 0.0
        {
            return Err(MapError::InvalidData(
                "rect size must be finite and >= 0".to_owned(),
            ));
        }
        if !self.border_width.is_finite() || self.border_width < 0.0 {
            return Err(MapError::InvalidData(
                "rect border width must be finite and >= 0".to_owned(),
            ));
        }
        self.fill_color.validate()?;
        self.border_color.validate()
    }
}

/// Packed raster stretched into `target` without smoothing.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePrimitive {
    pub image: RasterImage,
    pub target: DeviceRect,
}

impl ImagePrimitive {
    #[must_use]
    pub fn new(image: RasterImage, target: DeviceRect) -> Self {
        Self { image, target }
    }

    pub fn validate(&self) -> MapResult<()> {
        if !self.target.is_finite() || self.target.width < 0.0 || self.target.height < 0.0 {
            return Err(MapError::InvalidData(
                "image target rect must be finite and >= 0".to_owned(),
            ));
        }
        if self.image.pixels().len() != self.image.width() * self.image.height() {
            return Err(MapError::InvalidData(
                "image buffer does not match its dimensions".to_owned(),
            ));
        }
        Ok(())
    }
}
