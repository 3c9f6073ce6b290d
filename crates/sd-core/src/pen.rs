//! Pen state: color, stroke radius, and font.
//!
//! Setters only affect commands issued afterwards. Each shape command
//! carries a by-value [`Pen`] snapshot, so later pen changes never reach
//! back into an already-issued shape.

use crate::color::Color;
use crate::error::DrawError;
use crate::viewport::{Axis, CoordinateMapper};
use serde::{Deserialize, Serialize};

/// Default stroke radius in user units (a small fraction of the unit canvas).
pub const DEFAULT_PEN_RADIUS: f64 = 0.002;

/// Thinnest stroke the rasterizer emits, in pixels.
pub const MIN_STROKE_WIDTH: f32 = 1.0;

// ─── Font ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Plain,
    Bold,
    Italic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    /// Size in pixels.
    pub size: f32,
    #[serde(default)]
    pub style: FontStyle,
}

impl Font {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            style: FontStyle::Plain,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("SansSerif", 16.0)
    }
}

// ─── Pen ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pen {
    pub color: Color,
    /// Stroke radius in user units. `0.0` means a hairline.
    pub radius: f64,
    pub font: Font,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            radius: DEFAULT_PEN_RADIUS,
            font: Font::default(),
        }
    }
}

/// The client's mutable pen plus the defaults that `reset_*` restores.
#[derive(Debug, Clone)]
pub struct PenState {
    pen: Pen,
    defaults: Pen,
    /// `(mapper generation, width in px)` for the current radius.
    cached_width: Option<(u64, f32)>,
}

impl Default for PenState {
    fn default() -> Self {
        Self::new(Pen::default())
    }
}

impl PenState {
    pub fn new(defaults: Pen) -> Self {
        Self {
            pen: defaults.clone(),
            defaults,
            cached_width: None,
        }
    }

    /// By-value copy of the current pen.
    pub fn snapshot(&self) -> Pen {
        self.pen.clone()
    }

    pub fn color(&self) -> Color {
        self.pen.color
    }

    pub fn radius(&self) -> f64 {
        self.pen.radius
    }

    pub fn font(&self) -> &Font {
        &self.pen.font
    }

    pub fn set_color(&mut self, color: Color) {
        self.pen.color = color;
    }

    pub fn reset_color(&mut self) {
        self.pen.color = self.defaults.color;
    }

    pub fn set_stroke_radius(&mut self, r: f64) -> Result<(), DrawError> {
        if r.is_nan() || r < 0.0 || r.is_infinite() {
            return Err(DrawError::invalid(format!(
                "pen radius must be a non-negative finite number, got {r}"
            )));
        }
        self.pen.radius = r;
        self.cached_width = None;
        log::debug!("pen radius set to {r}");
        Ok(())
    }

    pub fn reset_stroke_radius(&mut self) {
        self.pen.radius = self.defaults.radius;
        self.cached_width = None;
    }

    pub fn set_font(&mut self, font: Font) {
        self.pen.font = font;
    }

    pub fn reset_font(&mut self) {
        self.pen.font = self.defaults.font.clone();
    }

    /// Pixel stroke width for the current radius under `mapper`'s scale.
    ///
    /// Cached until the radius or the mapper generation changes; never below
    /// [`MIN_STROKE_WIDTH`].
    pub fn stroke_width(&mut self, mapper: &CoordinateMapper) -> f32 {
        if let Some((generation, width)) = self.cached_width
            && generation == mapper.generation()
        {
            return width;
        }
        let width = (mapper.scale_length(self.pen.radius, Axis::X) as f32).max(MIN_STROKE_WIDTH);
        self.cached_width = Some((mapper.generation(), width));
        width
    }
}
