//! The offscreen/onscreen pixel buffer pair.

use sd_core::{Color, DrawError};
use tiny_skia::Pixmap;

/// Two equally sized pixmaps: drawing targets `offscreen`, presentation reads
/// `onscreen`. The only way pixels reach `onscreen` is [`FrameBuffers::copy_to_onscreen`].
#[derive(Debug, Clone)]
pub struct FrameBuffers {
    offscreen: Pixmap,
    onscreen: Pixmap,
}

impl FrameBuffers {
    pub fn new(width: u32, height: u32) -> Result<Self, DrawError> {
        let make = || {
            Pixmap::new(width, height).ok_or_else(|| {
                DrawError::invalid(format!("cannot allocate a {width}x{height} pixel buffer"))
            })
        };
        Ok(Self {
            offscreen: make()?,
            onscreen: make()?,
        })
    }

    pub fn width(&self) -> u32 {
        self.offscreen.width()
    }

    pub fn height(&self) -> u32 {
        self.offscreen.height()
    }

    pub fn offscreen(&self) -> &Pixmap {
        &self.offscreen
    }

    pub fn offscreen_mut(&mut self) -> &mut Pixmap {
        &mut self.offscreen
    }

    pub fn onscreen(&self) -> &Pixmap {
        &self.onscreen
    }

    pub fn copy_to_onscreen(&mut self) {
        self.onscreen.data_mut().copy_from_slice(self.offscreen.data());
    }

    /// Straight-alpha color of an offscreen pixel.
    pub fn offscreen_pixel(&self, x: u32, y: u32) -> Option<Color> {
        pixel_at(&self.offscreen, x, y)
    }

    /// Straight-alpha color of an onscreen pixel.
    pub fn onscreen_pixel(&self, x: u32, y: u32) -> Option<Color> {
        pixel_at(&self.onscreen, x, y)
    }
}

pub(crate) fn pixel_at(pixmap: &Pixmap, x: u32, y: u32) -> Option<Color> {
    // Pixmap::pixel only bounds-checks the flat index, so x past the row end
    // would wrap onto the next row.
    if x >= pixmap.width() || y >= pixmap.height() {
        return None;
    }
    let px = pixmap.pixel(x, y)?.demultiply();
    Some(Color::rgba(px.red(), px.green(), px.blue(), px.alpha()))
}
