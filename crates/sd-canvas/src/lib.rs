pub mod canvas;
pub mod config;
pub mod input;

pub use canvas::Canvas;
pub use config::CanvasConfig;
pub use input::{EventSender, InputCapture, InputEvent, KeyCode};

// Re-export the model so clients need a single dependency
pub use sd_core::{Color, DrawError, Font, FontStyle, TextAlign};
pub use sd_render::{DisplayMode, Image};
