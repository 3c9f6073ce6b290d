//! The drawing canvas.
//!
//! A [`Canvas`] is one independent drawing surface: its own viewport, pen,
//! double buffer, display mode, and input capture. Drawing happens on the
//! client thread through `&mut self`; input arrives on the delivery thread
//! and is read back through the shared [`InputCapture`].
//!
//! ```no_run
//! use sd_canvas::{Canvas, CanvasConfig, Color};
//! use std::time::Duration;
//!
//! let mut canvas = Canvas::new(CanvasConfig::default())?;
//! canvas.set_scale(-1.0, 1.0)?;
//! for frame in 0..100 {
//!     let t = f64::from(frame) / 100.0;
//!     canvas.clear();
//!     canvas.set_pen_color(Color::BOOK_RED);
//!     canvas.filled_circle(t.cos(), t.sin(), 0.05)?;
//!     canvas.show_for(Duration::from_millis(16));
//! }
//! # Ok::<(), sd_canvas::DrawError>(())
//! ```

use crate::config::CanvasConfig;
use crate::input::{EventSender, InputCapture, KeyCode};
use sd_core::{Color, CoordinateMapper, DrawError, Font, PenState, Shape, ShapeCommand, TextAlign};
use sd_render::tiny_skia::Pixmap;
use sd_render::{
    AssetLoader, DisplayController, DisplayMode, FileAssetLoader, FixedMetrics, NullPresenter,
    OffscreenSurface, Presenter, TextBackend, save_buffers,
};
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

pub struct Canvas {
    config: CanvasConfig,
    mapper: CoordinateMapper,
    pen: PenState,
    surface: OffscreenSurface,
    display: DisplayController,
    input: Arc<InputCapture>,
    /// Sender and delivery thread, once a host has connected.
    delivery: Option<(EventSender, JoinHandle<()>)>,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("viewport", self.mapper.viewport())
            .field("pen", &self.pen)
            .field("mode", &self.display.mode())
            .finish_non_exhaustive()
    }
}

impl Canvas {
    /// Create a headless canvas with the default backends.
    pub fn new(config: CanvasConfig) -> Result<Self, DrawError> {
        let assets = FileAssetLoader::new(config.asset_roots.clone());
        Self::with_backends(
            config,
            Box::new(FixedMetrics),
            Box::new(assets),
            Box::new(NullPresenter::default()),
        )
    }

    /// Create a canvas wired to host-supplied backends.
    pub fn with_backends(
        config: CanvasConfig,
        text: Box<dyn TextBackend>,
        assets: Box<dyn AssetLoader>,
        presenter: Box<dyn Presenter>,
    ) -> Result<Self, DrawError> {
        config.validate()?;
        let mapper = CoordinateMapper::new(config.width, config.height)?;
        let surface = OffscreenSurface::new(config.width, config.height, text, assets)?;
        let mut canvas = Self {
            pen: PenState::new(config.default_pen()),
            input: Arc::new(InputCapture::new(mapper)),
            display: DisplayController::new(presenter),
            delivery: None,
            mapper,
            surface,
            config,
        };
        canvas.clear();
        log::debug!("canvas {}x{} ready", canvas.width(), canvas.height());
        Ok(canvas)
    }

    /// Re-create the buffers at `width × height` and restore the default
    /// scale, pen, and font. Display mode and input state are kept; both
    /// buffers start from the clear color even in deferred mode.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), DrawError> {
        let mapper = CoordinateMapper::new(width, height)?;
        self.surface.resize(width, height)?;
        self.mapper = mapper;
        self.pen = PenState::new(self.config.default_pen());
        self.config.width = width;
        self.config.height = height;
        self.input.set_mapping(self.mapper);
        self.clear();
        self.surface.buffers_mut().copy_to_onscreen();
        log::debug!("canvas resized to {width}x{height}");
        Ok(())
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn width(&self) -> u32 {
        self.mapper.viewport().pixel_width()
    }

    pub fn height(&self) -> u32 {
        self.mapper.viewport().pixel_height()
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    // ─── Scale ───────────────────────────────────────────────────────────

    pub fn set_x_scale(&mut self, min: f64, max: f64) -> Result<(), DrawError> {
        self.mapper.set_x_range(min, max)?;
        self.input.set_mapping(self.mapper);
        Ok(())
    }

    pub fn set_y_scale(&mut self, min: f64, max: f64) -> Result<(), DrawError> {
        self.mapper.set_y_range(min, max)?;
        self.input.set_mapping(self.mapper);
        Ok(())
    }

    /// Set both axes to `[min, max]`.
    pub fn set_scale(&mut self, min: f64, max: f64) -> Result<(), DrawError> {
        self.mapper.set_range(min, max)?;
        self.input.set_mapping(self.mapper);
        Ok(())
    }

    pub fn reset_x_scale(&mut self) {
        self.mapper.reset_x_range();
        self.input.set_mapping(self.mapper);
    }

    pub fn reset_y_scale(&mut self) {
        self.mapper.reset_y_range();
        self.input.set_mapping(self.mapper);
    }

    pub fn reset_scale(&mut self) {
        self.mapper.reset_x_range();
        self.mapper.reset_y_range();
        self.input.set_mapping(self.mapper);
    }

    // ─── Pen ─────────────────────────────────────────────────────────────

    pub fn pen_color(&self) -> Color {
        self.pen.color()
    }

    pub fn set_pen_color(&mut self, color: Color) {
        self.pen.set_color(color);
    }

    pub fn reset_pen_color(&mut self) {
        self.pen.reset_color();
    }

    pub fn pen_radius(&self) -> f64 {
        self.pen.radius()
    }

    pub fn set_pen_radius(&mut self, r: f64) -> Result<(), DrawError> {
        self.pen.set_stroke_radius(r)
    }

    pub fn reset_pen_radius(&mut self) {
        self.pen.reset_stroke_radius();
    }

    /// Current pen width in pixels.
    pub fn stroke_width(&mut self) -> f32 {
        self.pen.stroke_width(&self.mapper)
    }

    pub fn font(&self) -> &Font {
        self.pen.font()
    }

    pub fn set_font(&mut self, font: Font) {
        self.pen.set_font(font);
    }

    pub fn reset_font(&mut self) {
        self.pen.reset_font();
    }

    // ─── Drawing ─────────────────────────────────────────────────────────

    /// Fill the canvas with the configured clear color.
    pub fn clear(&mut self) {
        self.clear_with(self.config.clear_color);
    }

    pub fn clear_with(&mut self, color: Color) {
        self.surface.clear(color, &mut self.display);
    }

    /// Issue a shape with a snapshot of the current pen.
    pub fn draw(&mut self, shape: Shape) -> Result<(), DrawError> {
        let command = ShapeCommand {
            shape,
            pen: self.pen.snapshot(),
            stroke_width: self.pen.stroke_width(&self.mapper),
        };
        self.surface.execute(&command, &self.mapper, &mut self.display)
    }

    pub fn point(&mut self, x: f64, y: f64) -> Result<(), DrawError> {
        self.draw(Shape::Point { x, y })
    }

    pub fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> Result<(), DrawError> {
        self.draw(Shape::Line { x0, y0, x1, y1 })
    }

    pub fn circle(&mut self, x: f64, y: f64, r: f64) -> Result<(), DrawError> {
        self.draw(Shape::Circle { x, y, r, filled: false })
    }

    pub fn filled_circle(&mut self, x: f64, y: f64, r: f64) -> Result<(), DrawError> {
        self.draw(Shape::Circle { x, y, r, filled: true })
    }

    pub fn ellipse(&mut self, x: f64, y: f64, semi_major: f64, semi_minor: f64) -> Result<(), DrawError> {
        self.draw(Shape::Ellipse {
            x,
            y,
            semi_major,
            semi_minor,
            filled: false,
        })
    }

    pub fn filled_ellipse(
        &mut self,
        x: f64,
        y: f64,
        semi_major: f64,
        semi_minor: f64,
    ) -> Result<(), DrawError> {
        self.draw(Shape::Ellipse {
            x,
            y,
            semi_major,
            semi_minor,
            filled: true,
        })
    }

    /// Circular arc from `angle1` counterclockwise to `angle2` (degrees).
    pub fn arc(&mut self, x: f64, y: f64, r: f64, angle1: f64, angle2: f64) -> Result<(), DrawError> {
        self.draw(Shape::Arc {
            x,
            y,
            r,
            angle1,
            angle2,
        })
    }

    pub fn square(&mut self, x: f64, y: f64, half_side: f64) -> Result<(), DrawError> {
        self.draw(Shape::Square {
            x,
            y,
            half_side,
            filled: false,
        })
    }

    pub fn filled_square(&mut self, x: f64, y: f64, half_side: f64) -> Result<(), DrawError> {
        self.draw(Shape::Square {
            x,
            y,
            half_side,
            filled: true,
        })
    }

    pub fn rectangle(&mut self, x: f64, y: f64, half_width: f64, half_height: f64) -> Result<(), DrawError> {
        self.draw(Shape::Rectangle {
            x,
            y,
            half_width,
            half_height,
            filled: false,
        })
    }

    pub fn filled_rectangle(
        &mut self,
        x: f64,
        y: f64,
        half_width: f64,
        half_height: f64,
    ) -> Result<(), DrawError> {
        self.draw(Shape::Rectangle {
            x,
            y,
            half_width,
            half_height,
            filled: true,
        })
    }

    /// Closed polygon outline through `(xs[i], ys[i])`.
    pub fn polygon(&mut self, xs: &[f64], ys: &[f64]) -> Result<(), DrawError> {
        self.draw(Shape::polygon(xs, ys, false)?)
    }

    pub fn filled_polygon(&mut self, xs: &[f64], ys: &[f64]) -> Result<(), DrawError> {
        self.draw(Shape::polygon(xs, ys, true)?)
    }

    /// Image centered at `(x, y)` at its natural pixel size.
    pub fn picture(&mut self, x: f64, y: f64, locator: &str) -> Result<(), DrawError> {
        self.picture_rotated(x, y, locator, 0.0)
    }

    pub fn picture_rotated(&mut self, x: f64, y: f64, locator: &str, degrees: f64) -> Result<(), DrawError> {
        self.draw(Shape::Picture {
            x,
            y,
            locator: locator.to_string(),
            size: None,
            degrees,
        })
    }

    /// Image centered at `(x, y)` stretched to `w × h` user units.
    pub fn picture_scaled(&mut self, x: f64, y: f64, locator: &str, w: f64, h: f64) -> Result<(), DrawError> {
        self.picture_scaled_rotated(x, y, locator, w, h, 0.0)
    }

    pub fn picture_scaled_rotated(
        &mut self,
        x: f64,
        y: f64,
        locator: &str,
        w: f64,
        h: f64,
        degrees: f64,
    ) -> Result<(), DrawError> {
        self.draw(Shape::Picture {
            x,
            y,
            locator: locator.to_string(),
            size: Some((w, h)),
            degrees,
        })
    }

    /// Text centered on `(x, y)`.
    pub fn text(&mut self, x: f64, y: f64, text: &str) -> Result<(), DrawError> {
        self.text_aligned(x, y, text, TextAlign::Center, 0.0)
    }

    pub fn text_rotated(&mut self, x: f64, y: f64, text: &str, degrees: f64) -> Result<(), DrawError> {
        self.text_aligned(x, y, text, TextAlign::Center, degrees)
    }

    /// Text starting at `(x, y)`.
    pub fn text_left(&mut self, x: f64, y: f64, text: &str) -> Result<(), DrawError> {
        self.text_aligned(x, y, text, TextAlign::Left, 0.0)
    }

    /// Text ending at `(x, y)`.
    pub fn text_right(&mut self, x: f64, y: f64, text: &str) -> Result<(), DrawError> {
        self.text_aligned(x, y, text, TextAlign::Right, 0.0)
    }

    pub fn text_aligned(
        &mut self,
        x: f64,
        y: f64,
        text: &str,
        align: TextAlign,
        degrees: f64,
    ) -> Result<(), DrawError> {
        self.draw(Shape::Text {
            x,
            y,
            text: text.to_string(),
            align,
            degrees,
        })
    }

    // ─── Display ─────────────────────────────────────────────────────────

    pub fn mode(&self) -> DisplayMode {
        self.display.mode()
    }

    /// Return to live mode and present everything drawn so far.
    pub fn show(&mut self) {
        self.display.show(self.surface.buffers_mut());
    }

    /// Present, pause the calling thread for `pause`, then defer further
    /// drawing until the next `show`.
    pub fn show_for(&mut self, pause: Duration) {
        self.display.show_for(self.surface.buffers_mut(), pause);
    }

    /// Defer presentation without presenting first.
    pub fn enable_deferred(&mut self) {
        self.display.enable_deferred();
    }

    pub fn offscreen(&self) -> &Pixmap {
        self.surface.buffers().offscreen()
    }

    pub fn onscreen(&self) -> &Pixmap {
        self.surface.buffers().onscreen()
    }

    pub fn offscreen_pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.surface.buffers().offscreen_pixel(x, y)
    }

    pub fn onscreen_pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.surface.buffers().onscreen_pixel(x, y)
    }

    /// Write the canvas to `path` (`.png`, `.jpg`, or `.jpeg`).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DrawError> {
        let path = path.as_ref();
        save_buffers(self.surface.buffers(), path).inspect_err(|e| {
            log::warn!("could not save canvas to {}: {e}", path.display());
        })
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Shared input state, for hosts that deliver events directly.
    pub fn input(&self) -> Arc<InputCapture> {
        Arc::clone(&self.input)
    }

    /// Sender for the host's event thread. The delivery thread is started
    /// on first use; later calls hand out clones of the same channel.
    pub fn event_sender(&mut self) -> Result<EventSender, DrawError> {
        if let Some((sender, _)) = &self.delivery {
            return Ok(sender.clone());
        }
        let (sender, handle) = self.input.spawn_delivery()?;
        self.delivery = Some((sender.clone(), handle));
        Ok(sender)
    }

    pub fn mouse_pressed(&self) -> bool {
        self.input.mouse_pressed()
    }

    pub fn mouse_x(&self) -> f64 {
        self.input.mouse_x()
    }

    pub fn mouse_y(&self) -> f64 {
        self.input.mouse_y()
    }

    pub fn has_next_key_typed(&self) -> bool {
        self.input.has_next_key_typed()
    }

    pub fn next_key_typed(&self) -> Result<char, DrawError> {
        self.input.next_key_typed()
    }

    pub fn is_key_pressed(&self, code: KeyCode) -> bool {
        self.input.is_key_pressed(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn canvas() -> Canvas {
        Canvas::new(CanvasConfig::default()).unwrap()
    }

    #[test]
    fn stroke_width_follows_scale_changes() {
        let mut canvas = canvas();
        canvas.set_pen_radius(0.01).unwrap();
        let narrow = canvas.stroke_width();
        canvas.set_scale(0.0, 0.5).unwrap();
        let wide = canvas.stroke_width();
        assert!((wide - 2.0 * narrow).abs() < 1e-3, "{narrow} vs {wide}");
        canvas.reset_scale();
        assert_eq!(canvas.stroke_width(), narrow);
    }

    #[test]
    fn scale_changes_reach_input_capture() {
        let mut canvas = canvas();
        canvas.set_x_scale(0.0, 10.0).unwrap();
        canvas.input().apply(crate::InputEvent::PointerMove { x: 256.0, y: 256.0 });
        assert!((canvas.mouse_x() - 5.0).abs() < 1e-9);
        assert!((canvas.mouse_y() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn font_and_radius_reset_to_config() {
        let mut canvas = Canvas::new(CanvasConfig {
            pen_radius: 0.01,
            ..CanvasConfig::default()
        })
        .unwrap();
        canvas.set_font(Font::new("Serif", 30.0));
        canvas.set_pen_radius(0.2).unwrap();
        canvas.reset_font();
        canvas.reset_pen_radius();
        assert_eq!(canvas.font(), &Font::default());
        assert_eq!(canvas.pen_radius(), 0.01);
    }

    #[test]
    fn clear_uses_configured_color() {
        let mut canvas = Canvas::new(CanvasConfig {
            clear_color: Color::BOOK_LIGHT_BLUE,
            ..CanvasConfig::default()
        })
        .unwrap();
        assert_eq!(canvas.onscreen_pixel(5, 5), Some(Color::BOOK_LIGHT_BLUE));
        canvas.clear_with(Color::GRAY);
        canvas.clear();
        assert_eq!(canvas.offscreen_pixel(5, 5), Some(Color::BOOK_LIGHT_BLUE));
    }

    #[test]
    fn text_variants_draw_without_error() {
        let mut canvas = canvas();
        canvas.text(0.5, 0.5, "center").unwrap();
        canvas.text_left(0.1, 0.2, "left").unwrap();
        canvas.text_right(0.9, 0.2, "right").unwrap();
        canvas.text_rotated(0.5, 0.8, "tilted", 30.0).unwrap();
        canvas.text(0.5, 0.5, "").unwrap();
    }
}
