//! Persist frame buffers to image files.
//!
//! The format follows the file extension:
//! - `.png` writes the offscreen buffer losslessly, alpha included.
//! - `.jpg` / `.jpeg` writes the onscreen buffer with alpha stripped.

use crate::buffers::FrameBuffers;
use sd_core::DrawError;
use std::path::Path;
use tiny_skia::Pixmap;

pub fn save_buffers(buffers: &FrameBuffers, path: &Path) -> Result<(), DrawError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("png") => {
            let (w, h) = (buffers.width(), buffers.height());
            let img = image::RgbaImage::from_raw(w, h, straight_rgba(buffers.offscreen()))
                .ok_or_else(|| DrawError::IoFailure("buffer size mismatch".into()))?;
            img.save_with_format(path, image::ImageFormat::Png)
                .map_err(|e| DrawError::IoFailure(format!("{}: {e}", path.display())))?;
        }
        Some("jpg" | "jpeg") => {
            let (w, h) = (buffers.width(), buffers.height());
            let img = image::RgbImage::from_raw(w, h, straight_rgb(buffers.onscreen()))
                .ok_or_else(|| DrawError::IoFailure("buffer size mismatch".into()))?;
            img.save_with_format(path, image::ImageFormat::Jpeg)
                .map_err(|e| DrawError::IoFailure(format!("{}: {e}", path.display())))?;
        }
        other => {
            return Err(DrawError::IoFailure(format!(
                "unsupported image file type {:?} for {}",
                other.unwrap_or(""),
                path.display()
            )));
        }
    }

    log::debug!("saved {}x{} canvas to {}", buffers.width(), buffers.height(), path.display());
    Ok(())
}

fn straight_rgba(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|px| {
            let c = px.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}

fn straight_rgb(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|px| {
            let c = px.demultiply();
            [c.red(), c.green(), c.blue()]
        })
        .collect()
}
