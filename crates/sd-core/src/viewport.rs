//! User ↔ device coordinate mapping.
//!
//! Clients draw in an arbitrary real-valued range per axis. The mapper turns
//! those coordinates into pixel positions on a fixed-size buffer: device X
//! grows rightward like user X, device Y grows downward while user Y grows
//! upward. Every requested range is padded by [`BORDER`] on both sides so
//! the requested extremes never sit flush with the canvas edge.

use crate::error::DrawError;

/// Fraction of the requested span added on each side of an axis range.
pub const BORDER: f64 = 0.05;

pub const DEFAULT_MIN: f64 = 0.0;
pub const DEFAULT_MAX: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Effective (bordered) user range plus the fixed pixel dimensions.
///
/// Invariants: `x_max > x_min`, `y_max > y_min`, both pixel dimensions ≥ 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    pixel_width: u32,
    pixel_height: u32,
}

impl Viewport {
    /// A viewport over the default `[0, 1] × [0, 1]` range.
    pub fn new(pixel_width: u32, pixel_height: u32) -> Result<Self, DrawError> {
        if pixel_width == 0 || pixel_height == 0 {
            return Err(DrawError::invalid(format!(
                "canvas must be at least 1x1 pixels, got {pixel_width}x{pixel_height}"
            )));
        }
        let (x_min, x_max) = bordered(DEFAULT_MIN, DEFAULT_MAX);
        let (y_min, y_max) = bordered(DEFAULT_MIN, DEFAULT_MAX);
        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
            pixel_width,
            pixel_height,
        })
    }

    pub fn x_range(&self) -> (f64, f64) {
        (self.x_min, self.x_max)
    }

    pub fn y_range(&self) -> (f64, f64) {
        (self.y_min, self.y_max)
    }

    pub fn pixel_width(&self) -> u32 {
        self.pixel_width
    }

    pub fn pixel_height(&self) -> u32 {
        self.pixel_height
    }
}

fn bordered(min: f64, max: f64) -> (f64, f64) {
    let size = max - min;
    (min - BORDER * size, max + BORDER * size)
}

fn checked_range(axis: Axis, min: f64, max: f64) -> Result<(f64, f64), DrawError> {
    if !min.is_finite() || !max.is_finite() {
        return Err(DrawError::invalid(format!(
            "{axis:?} range must be finite, got [{min}, {max}]"
        )));
    }
    if max <= min {
        return Err(DrawError::invalid(format!(
            "{axis:?} range must satisfy min < max, got [{min}, {max}]"
        )));
    }
    let (lo, hi) = bordered(min, max);
    // The border must survive rounding, and the span must stay representable.
    if !(lo < min && hi > max && (hi - lo).is_finite()) {
        return Err(DrawError::invalid(format!(
            "{axis:?} range [{min}, {max}] is too large or too narrow to map"
        )));
    }
    Ok((lo, hi))
}

// ─── Mapper ──────────────────────────────────────────────────────────────

/// Converts between user and device coordinates for one canvas.
///
/// Each range change bumps `generation`, which lets pixel-space values
/// derived from the old scale (the pen's stroke width) notice they are stale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    viewport: Viewport,
    generation: u64,
}

impl CoordinateMapper {
    pub fn new(pixel_width: u32, pixel_height: u32) -> Result<Self, DrawError> {
        Ok(Self {
            viewport: Viewport::new(pixel_width, pixel_height)?,
            generation: 0,
        })
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Set the requested user X range; the effective range adds the border.
    pub fn set_x_range(&mut self, min: f64, max: f64) -> Result<(), DrawError> {
        let (lo, hi) = checked_range(Axis::X, min, max)?;
        self.viewport.x_min = lo;
        self.viewport.x_max = hi;
        self.generation += 1;
        log::debug!("x range [{min}, {max}] -> effective [{lo}, {hi}]");
        Ok(())
    }

    /// Set the requested user Y range; the effective range adds the border.
    pub fn set_y_range(&mut self, min: f64, max: f64) -> Result<(), DrawError> {
        let (lo, hi) = checked_range(Axis::Y, min, max)?;
        self.viewport.y_min = lo;
        self.viewport.y_max = hi;
        self.generation += 1;
        log::debug!("y range [{min}, {max}] -> effective [{lo}, {hi}]");
        Ok(())
    }

    /// Set both axes to the same range. Validates before touching either axis.
    pub fn set_range(&mut self, min: f64, max: f64) -> Result<(), DrawError> {
        checked_range(Axis::X, min, max)?;
        self.set_x_range(min, max)?;
        self.set_y_range(min, max)
    }

    pub fn reset_x_range(&mut self) {
        let (lo, hi) = bordered(DEFAULT_MIN, DEFAULT_MAX);
        self.viewport.x_min = lo;
        self.viewport.x_max = hi;
        self.generation += 1;
    }

    pub fn reset_y_range(&mut self) {
        let (lo, hi) = bordered(DEFAULT_MIN, DEFAULT_MAX);
        self.viewport.y_min = lo;
        self.viewport.y_max = hi;
        self.generation += 1;
    }

    fn width(&self) -> f64 {
        f64::from(self.viewport.pixel_width)
    }

    fn height(&self) -> f64 {
        f64::from(self.viewport.pixel_height)
    }

    pub fn to_device_x(&self, x: f64) -> f64 {
        let v = &self.viewport;
        self.width() * (x - v.x_min) / (v.x_max - v.x_min)
    }

    pub fn to_device_y(&self, y: f64) -> f64 {
        let v = &self.viewport;
        self.height() * (v.y_max - y) / (v.y_max - v.y_min)
    }

    pub fn to_user_x(&self, px: f64) -> f64 {
        let v = &self.viewport;
        v.x_min + px * (v.x_max - v.x_min) / self.width()
    }

    pub fn to_user_y(&self, py: f64) -> f64 {
        let v = &self.viewport;
        v.y_max - py * (v.y_max - v.y_min) / self.height()
    }

    /// Map a length (radius, width) to pixels along `axis`. No translation,
    /// and never negative for a positive length.
    pub fn scale_length(&self, d: f64, axis: Axis) -> f64 {
        let v = &self.viewport;
        match axis {
            Axis::X => d * self.width() / (v.x_max - v.x_min).abs(),
            Axis::Y => d * self.height() / (v.y_max - v.y_min).abs(),
        }
    }
}
