//! Canvas construction settings.
//!
//! Every field has a default, so a JSON config only needs the keys it wants
//! to change:
//!
//! ```json
//! { "width": 800, "height": 600, "pen_color": "#095AA6" }
//! ```

use sd_core::pen::DEFAULT_PEN_RADIUS;
use sd_core::{Color, DrawError, Font, Pen};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_SIZE: u32 = 512;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Canvas width in pixels. Default: **512**.
    pub width: u32,
    /// Canvas height in pixels. Default: **512**.
    pub height: u32,
    /// Initial and reset pen radius in user units. Default: **0.002**.
    pub pen_radius: f64,
    pub pen_color: Color,
    /// Color used by `clear()` and for a fresh canvas. Default: white.
    pub clear_color: Color,
    pub font: Font,
    /// Directories searched for relative picture locators.
    pub asset_roots: Vec<PathBuf>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            pen_radius: DEFAULT_PEN_RADIUS,
            pen_color: Color::BLACK,
            clear_color: Color::WHITE,
            font: Font::default(),
            asset_roots: Vec::new(),
        }
    }
}

impl CanvasConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, DrawError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DrawError::invalid(format!("invalid canvas config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DrawError> {
        if self.width == 0 || self.height == 0 {
            return Err(DrawError::invalid(format!(
                "width and height must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.pen_radius >= 0.0) || self.pen_radius.is_infinite() {
            return Err(DrawError::invalid(format!(
                "pen radius must be non-negative, got {}",
                self.pen_radius
            )));
        }
        if !(self.font.size > 0.0) {
            return Err(DrawError::invalid(format!(
                "font size must be positive, got {}",
                self.font.size
            )));
        }
        Ok(())
    }

    /// The pen a fresh canvas starts with and `reset_*` returns to.
    pub fn default_pen(&self) -> Pen {
        Pen {
            color: self.pen_color,
            radius: self.pen_radius,
            font: self.font.clone(),
        }
    }
}
