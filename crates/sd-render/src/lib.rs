pub mod backend;
pub mod buffers;
pub mod display;
pub mod save;
pub mod surface;

pub use backend::{
    AssetLoader, FileAssetLoader, FixedMetrics, Image, NullPresenter, Presenter, TextBackend,
    TextMetrics,
};
pub use buffers::FrameBuffers;
pub use display::{DisplayController, DisplayMode};
pub use save::save_buffers;
pub use surface::OffscreenSurface;

// Re-export tiny-skia so downstream crates and hosts can name pixel types
pub use tiny_skia;
