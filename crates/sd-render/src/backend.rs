//! Host collaborators consumed by the rasterizer.
//!
//! The surface never decodes images, shapes text, or talks to a window
//! system itself. It calls these traits instead. Headless defaults are
//! provided so a canvas works without any host:
//!
//! | Trait | Default | Behavior |
//! |-------|---------|----------|
//! | [`TextBackend`] | [`FixedMetrics`] | monospace metrics, glyphs not painted |
//! | [`AssetLoader`] | [`FileAssetLoader`] | decodes files via the `image` crate |
//! | [`Presenter`] | [`NullPresenter`] | records the repaint request only |

use kurbo::{Affine, Point};
use sd_core::{Color, DrawError, Font};
use std::path::{Path, PathBuf};
use tiny_skia::{ColorU8, IntSize, Pixmap};

// ─── Images ──────────────────────────────────────────────────────────────

/// Decoded raster image, stored premultiplied for tiny-skia.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pixmap: Pixmap,
}

impl Image {
    /// Build from straight-alpha RGBA8 rows.
    pub fn from_rgba8(width: u32, height: u32, data: &[u8]) -> Result<Self, DrawError> {
        let size = IntSize::from_wh(width, height)
            .ok_or_else(|| DrawError::invalid(format!("image must be non-empty, got {width}x{height}")))?;
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(DrawError::invalid(format!(
                "image data has {} bytes, expected {expected}",
                data.len()
            )));
        }
        let mut pixmap = Pixmap::new(size.width(), size.height())
            .ok_or_else(|| DrawError::invalid("image too large"))?;
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(data.chunks_exact(4)) {
            *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }
        Ok(Self { pixmap })
    }

    /// A single-color image, mostly useful for tests and placeholders.
    pub fn solid(width: u32, height: u32, color: Color) -> Result<Self, DrawError> {
        let pixel = [color.r, color.g, color.b, color.a];
        let data: Vec<u8> = pixel
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::from_rgba8(width, height, &data)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

// ─── Text ────────────────────────────────────────────────────────────────

/// Horizontal extent and descent of a string, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub descent: f64,
}

pub trait TextBackend: Send {
    fn measure(&self, font: &Font, text: &str) -> TextMetrics;

    /// Paint `text` with its baseline starting at `origin` (device pixels),
    /// under `transform`.
    fn draw(
        &mut self,
        target: &mut Pixmap,
        text: &str,
        origin: Point,
        font: &Font,
        color: Color,
        transform: Affine,
    );
}

/// Monospace approximation: every char advances `0.6 × size`, descent is
/// `0.2 × size`. Glyph painting needs a shaping engine and is skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedMetrics;

impl TextBackend for FixedMetrics {
    fn measure(&self, font: &Font, text: &str) -> TextMetrics {
        let size = f64::from(font.size);
        TextMetrics {
            width: 0.6 * size * text.chars().count() as f64,
            descent: 0.2 * size,
        }
    }

    fn draw(
        &mut self,
        _target: &mut Pixmap,
        text: &str,
        origin: Point,
        font: &Font,
        _color: Color,
        _transform: Affine,
    ) {
        log::trace!(
            "TEXT {:?} at ({:.1}, {:.1}) in {} {}px",
            text,
            origin.x,
            origin.y,
            font.family,
            font.size
        );
    }
}

// ─── Assets ──────────────────────────────────────────────────────────────

pub trait AssetLoader: Send {
    /// Resolve `locator` to decoded pixels, or fail with `DecodeFailure`.
    fn load(&mut self, locator: &str) -> Result<Image, DrawError>;
}

/// Loads images from disk. The locator is tried as given, then relative to
/// each search root in order.
#[derive(Debug, Clone, Default)]
pub struct FileAssetLoader {
    roots: Vec<PathBuf>,
}

impl FileAssetLoader {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    fn candidates(&self, locator: &str) -> Vec<PathBuf> {
        let direct = PathBuf::from(locator);
        let mut out = vec![direct.clone()];
        if direct.is_relative() {
            out.extend(self.roots.iter().map(|root| root.join(locator)));
        }
        out
    }

    fn decode(locator: &str, path: &Path) -> Result<Image, DrawError> {
        let decoded = image::open(path).map_err(|e| DrawError::decode(locator, e))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(DrawError::decode(locator, "image has no pixel dimensions"));
        }
        Image::from_rgba8(width, height, rgba.as_raw()).map_err(|e| DrawError::decode(locator, e))
    }
}

impl AssetLoader for FileAssetLoader {
    fn load(&mut self, locator: &str) -> Result<Image, DrawError> {
        for path in self.candidates(locator) {
            // A missing file is an expected miss; keep probing.
            if !path.is_file() {
                log::debug!("asset probe missed {}", path.display());
                continue;
            }
            return Self::decode(locator, &path);
        }
        Err(DrawError::decode(locator, "image not found"))
    }
}

// ─── Presentation ────────────────────────────────────────────────────────

/// Receives the onscreen buffer whenever it changes.
pub trait Presenter: Send {
    fn present(&mut self, onscreen: &Pixmap);
}

/// Headless presenter: counts repaint requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter {
    presented: u64,
}

impl NullPresenter {
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl Presenter for NullPresenter {
    fn present(&mut self, onscreen: &Pixmap) {
        self.presented += 1;
        log::trace!(
            "present #{} ({}x{})",
            self.presented,
            onscreen.width(),
            onscreen.height()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn image_from_rgba_premultiplies() {
        let img = Image::from_rgba8(1, 1, &[255, 0, 0, 128]).unwrap();
        let px = img.pixmap().pixel(0, 0).unwrap();
        assert_eq!(px.alpha(), 128);
        assert_eq!(px.red(), 128);
        assert_eq!(px.demultiply().red(), 255);
    }

    #[test]
    fn image_rejects_bad_buffers() {
        assert!(Image::from_rgba8(0, 4, &[]).is_err());
        assert!(Image::from_rgba8(2, 2, &[0; 15]).is_err());
    }

    #[test]
    fn solid_image_has_requested_size() {
        let img = Image::solid(3, 2, Color::BOOK_BLUE).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
        let px = img.pixmap().pixel(2, 1).unwrap().demultiply();
        assert_eq!((px.red(), px.green(), px.blue()), (9, 90, 166));
    }

    #[test]
    fn fixed_metrics_scale_with_font_size() {
        let m = FixedMetrics.measure(&Font::new("Mono", 10.0), "abcd");
        assert!((m.width - 24.0).abs() < 1e-9);
        assert!((m.descent - 2.0).abs() < 1e-9);
    }

    #[test]
    fn missing_asset_is_decode_failure() {
        let mut loader = FileAssetLoader::new(vec![PathBuf::from("/nonexistent-root")]);
        let err = loader.load("no-such-image.png").unwrap_err();
        assert!(matches!(err, DrawError::DecodeFailure { .. }));
    }

    #[test]
    fn relative_locators_probe_search_roots() {
        let loader = FileAssetLoader::new(vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(
            loader.candidates("img/x.png"),
            vec![
                PathBuf::from("img/x.png"),
                PathBuf::from("/a/img/x.png"),
                PathBuf::from("/b/img/x.png"),
            ]
        );
        assert_eq!(loader.candidates("/abs.png"), vec![PathBuf::from("/abs.png")]);
    }
}
