//! Integration tests: drawing → offscreen → deferred/live presentation.
//!
//! Exercises the full pipeline through the public `Canvas` API, checking
//! what reaches the onscreen buffer and when.

use pretty_assertions::assert_eq;
use sd_canvas::{Canvas, CanvasConfig, Color, DisplayMode, DrawError, Image};
use sd_render::{AssetLoader, FixedMetrics, Presenter};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tiny_skia::Pixmap;

fn canvas() -> Canvas {
    Canvas::new(CanvasConfig::default()).unwrap()
}

fn changed(before: &Pixmap, after: &Pixmap) -> Vec<(u32, u32)> {
    let width = before.width();
    before
        .pixels()
        .iter()
        .zip(after.pixels())
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(i, _)| (i as u32 % width, i as u32 / width))
        .collect()
}

struct Counting(Arc<AtomicUsize>);

impl Presenter for Counting {
    fn present(&mut self, _onscreen: &Pixmap) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

struct Checkerboard;

impl AssetLoader for Checkerboard {
    fn load(&mut self, locator: &str) -> Result<Image, DrawError> {
        match locator {
            "board.png" => Image::solid(8, 8, Color::BOOK_BLUE),
            _ => Err(DrawError::decode(locator, "unknown asset")),
        }
    }
}

fn counting_canvas() -> (Canvas, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let canvas = Canvas::with_backends(
        CanvasConfig::default(),
        Box::new(FixedMetrics),
        Box::new(Checkerboard),
        Box::new(Counting(count.clone())),
    )
    .unwrap();
    (canvas, count)
}

// ─── Live mode ──────────────────────────────────────────────────────────

#[test]
fn fresh_canvas_is_live_and_white() {
    let canvas = canvas();
    assert_eq!(canvas.mode(), DisplayMode::Live);
    assert_eq!(canvas.onscreen_pixel(0, 0), Some(Color::WHITE));
    assert_eq!(canvas.onscreen().data(), canvas.offscreen().data());
}

#[test]
fn live_drawing_is_presented_immediately() {
    let (mut canvas, count) = counting_canvas();
    let after_init = count.load(Ordering::SeqCst);
    canvas.filled_square(0.5, 0.5, 0.1).unwrap();
    assert_eq!(canvas.onscreen_pixel(256, 256), Some(Color::BLACK));
    assert_eq!(count.load(Ordering::SeqCst), after_init + 1);
}

// ─── Deferred mode ──────────────────────────────────────────────────────

#[test]
fn show_for_zero_presents_then_freezes_onscreen() {
    let mut canvas = canvas();
    canvas.filled_circle(0.3, 0.3, 0.1).unwrap();
    canvas.show_for(Duration::ZERO);
    assert_eq!(canvas.mode(), DisplayMode::Deferred);
    let presented = canvas.onscreen().clone();
    assert_eq!(&presented, canvas.offscreen());

    canvas.filled_circle(0.7, 0.7, 0.1).unwrap();
    canvas.clear_with(Color::BOOK_LIGHT_BLUE);
    assert_eq!(canvas.onscreen(), &presented);
    assert_ne!(canvas.onscreen().data(), canvas.offscreen().data());

    canvas.show();
    assert_eq!(canvas.mode(), DisplayMode::Live);
    assert_eq!(canvas.onscreen().data(), canvas.offscreen().data());
    assert_eq!(canvas.onscreen_pixel(10, 10), Some(Color::BOOK_LIGHT_BLUE));
}

#[test]
fn deferred_batch_presents_once() {
    let (mut canvas, count) = counting_canvas();
    canvas.enable_deferred();
    let before = count.load(Ordering::SeqCst);
    for i in 0..50 {
        canvas.point(f64::from(i) / 50.0, 0.5).unwrap();
    }
    assert_eq!(count.load(Ordering::SeqCst), before);
    canvas.show_for(Duration::ZERO);
    assert_eq!(count.load(Ordering::SeqCst), before + 1);
}

#[test]
fn tiny_circle_changes_only_the_center_pixel() {
    let mut canvas = canvas();
    canvas.enable_deferred();
    let before = canvas.onscreen().clone();
    canvas.circle(0.5, 0.5, 0.001).unwrap();
    assert_eq!(canvas.onscreen(), &before);
    canvas.show();

    let diff = changed(&before, canvas.onscreen());
    assert!(!diff.is_empty());
    for (x, y) in diff {
        assert!(x.abs_diff(256) <= 1 && y.abs_diff(256) <= 1, "pixel ({x}, {y}) changed");
    }
}

// ─── Pen and failure isolation ──────────────────────────────────────────

#[test]
fn pen_radius_validation() {
    let mut canvas = canvas();
    assert!(matches!(canvas.set_pen_radius(-0.1), Err(DrawError::InvalidArgument(_))));
    canvas.set_pen_radius(0.0).unwrap();
    assert_eq!(canvas.stroke_width(), 1.0);
    let before = canvas.offscreen().clone();
    canvas.line(0.1, 0.5, 0.9, 0.5).unwrap();
    assert!(!changed(&before, canvas.offscreen()).is_empty());
}

#[test]
fn pen_changes_do_not_touch_issued_shapes() {
    let mut canvas = canvas();
    canvas.set_pen_color(Color::RED);
    canvas.filled_circle(0.5, 0.5, 0.2).unwrap();
    canvas.set_pen_color(Color::BLUE);
    canvas.set_pen_radius(0.05).unwrap();
    assert_eq!(canvas.onscreen_pixel(256, 256), Some(Color::RED));
    canvas.reset_pen_color();
    assert_eq!(canvas.pen_color(), Color::BLACK);
}

#[test]
fn failed_calls_leave_state_unchanged() {
    let mut canvas = canvas();
    let viewport = *canvas.mapper().viewport();
    let pixels = canvas.offscreen().clone();

    assert!(canvas.set_scale(5.0, 5.0).is_err());
    assert!(canvas.filled_rectangle(0.5, 0.5, -0.1, 0.1).is_err());
    assert!(canvas.polygon(&[0.1, 0.2], &[0.3]).is_err());
    assert!(canvas.filled_polygon(&[], &[]).is_err());
    assert!(canvas.arc(0.5, 0.5, -1.0, 0.0, 90.0).is_err());
    assert!(canvas.picture_scaled(0.5, 0.5, "board.png", 0.0, 0.1).is_err());

    assert_eq!(*canvas.mapper().viewport(), viewport);
    assert_eq!(canvas.offscreen(), &pixels);
}

#[test]
fn decode_failure_surfaces_from_picture() {
    let (mut canvas, _) = counting_canvas();
    let err = canvas.picture(0.5, 0.5, "missing.png").unwrap_err();
    assert!(matches!(err, DrawError::DecodeFailure { .. }));
    canvas.picture_rotated(0.5, 0.5, "board.png", 45.0).unwrap();
    assert_eq!(canvas.onscreen_pixel(256, 256), Some(Color::BOOK_BLUE));
}

// ─── Resize and save ────────────────────────────────────────────────────

#[test]
fn resize_restores_defaults() {
    let mut canvas = canvas();
    canvas.set_scale(-10.0, 10.0).unwrap();
    canvas.set_pen_color(Color::MAGENTA);
    canvas.resize(200, 100).unwrap();
    assert_eq!((canvas.width(), canvas.height()), (200, 100));
    assert_eq!(canvas.pen_color(), Color::BLACK);
    assert!((canvas.mapper().to_device_x(0.5) - 100.0).abs() < 1e-9);
    assert_eq!(canvas.onscreen_pixel(199, 99), Some(Color::WHITE));
    assert!(canvas.resize(0, 100).is_err());
}

#[test]
fn resize_while_deferred_starts_onscreen_clear() {
    let mut canvas = canvas();
    canvas.filled_square(0.5, 0.5, 0.25).unwrap();
    canvas.enable_deferred();
    canvas.resize(64, 32).unwrap();
    assert_eq!(canvas.mode(), DisplayMode::Deferred);
    assert_eq!(canvas.onscreen_pixel(0, 0), Some(Color::WHITE));
    assert_eq!(canvas.onscreen_pixel(32, 16), Some(Color::WHITE));
    assert_eq!(canvas.onscreen().data(), canvas.offscreen().data());

    canvas.filled_square(0.5, 0.5, 0.25).unwrap();
    assert_eq!(canvas.onscreen_pixel(32, 16), Some(Color::WHITE));
}

#[test]
fn save_png_and_reject_unknown_format() {
    let mut canvas = canvas();
    canvas.filled_square(0.5, 0.5, 0.25).unwrap();
    let path = std::env::temp_dir().join(format!("sd-canvas-{}.png", std::process::id()));
    canvas.save(&path).unwrap();
    assert!(path.is_file());
    let _ = std::fs::remove_file(&path);

    let err = canvas.save(path.with_extension("gif")).unwrap_err();
    assert!(matches!(err, DrawError::IoFailure(_)));
}
