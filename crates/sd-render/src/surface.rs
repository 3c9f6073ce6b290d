//! Shape commands → offscreen pixels.
//!
//! Geometry is built with kurbo in device space, then filled or stroked
//! into the offscreen tiny-skia pixmap. Every successful command ends with
//! [`DisplayController::flush_if_live`], so whether a shape becomes visible
//! immediately is decided in one place.
//!
//! Shapes whose mapped bounding box is at most one pixel in both dimensions
//! are drawn as a single pixel at the mapped center, so tiny shapes never
//! vanish at small scales.

use crate::backend::{AssetLoader, Image, TextBackend};
use crate::buffers::FrameBuffers;
use crate::display::DisplayController;
use kurbo::{Affine, Arc as KurboArc, BezPath, Circle, Ellipse, PathEl, Point, Rect, Vec2};
use sd_core::{Axis, Color, CoordinateMapper, DrawError, Shape, ShapeCommand, TextAlign, normalize_arc};
use tiny_skia::{FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, PixmapPaint, Stroke, Transform};

/// Flattening tolerance for curves, in device pixels.
const PATH_TOLERANCE: f64 = 0.1;

pub struct OffscreenSurface {
    buffers: FrameBuffers,
    /// Device-space transform applied to everything drawn. Identity except
    /// while a rotated picture or text run is being placed.
    transform: Affine,
    text: Box<dyn TextBackend>,
    assets: Box<dyn AssetLoader>,
}

impl std::fmt::Debug for OffscreenSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OffscreenSurface")
            .field("width", &self.buffers.width())
            .field("height", &self.buffers.height())
            .field("transform", &self.transform)
            .finish_non_exhaustive()
    }
}

impl OffscreenSurface {
    pub fn new(
        width: u32,
        height: u32,
        text: Box<dyn TextBackend>,
        assets: Box<dyn AssetLoader>,
    ) -> Result<Self, DrawError> {
        Ok(Self {
            buffers: FrameBuffers::new(width, height)?,
            transform: Affine::IDENTITY,
            text,
            assets,
        })
    }

    /// Swap in fresh buffers of a new size. Backends are kept.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), DrawError> {
        self.buffers = FrameBuffers::new(width, height)?;
        self.transform = Affine::IDENTITY;
        Ok(())
    }

    pub fn buffers(&self) -> &FrameBuffers {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut FrameBuffers {
        &mut self.buffers
    }

    pub fn transform(&self) -> Affine {
        self.transform
    }

    pub fn text_backend(&self) -> &dyn TextBackend {
        self.text.as_ref()
    }

    /// Fill the whole offscreen buffer with `color`.
    pub fn clear(&mut self, color: Color, display: &mut DisplayController) {
        self.buffers
            .offscreen_mut()
            .fill(tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a));
        display.flush_if_live(&mut self.buffers);
    }

    /// Validate and rasterize one command, then run the display flush check.
    ///
    /// On error nothing has been drawn and nothing is presented.
    pub fn execute(
        &mut self,
        command: &ShapeCommand,
        mapper: &CoordinateMapper,
        display: &mut DisplayController,
    ) -> Result<(), DrawError> {
        command.shape.validate()?;
        log::trace!("DRAW {} {:?}", command.shape.kind(), command.shape);
        self.rasterize(command, mapper)?;
        display.flush_if_live(&mut self.buffers);
        Ok(())
    }

    fn rasterize(&mut self, command: &ShapeCommand, mapper: &CoordinateMapper) -> Result<(), DrawError> {
        let pen = &command.pen;
        let color = pen.color;
        let width = command.stroke_width;
        let device = |x: f64, y: f64| Point::new(mapper.to_device_x(x), mapper.to_device_y(y));

        match &command.shape {
            Shape::Point { x, y } => {
                let center = device(*x, *y);
                let diameter = f64::from(width);
                if diameter <= 1.0 {
                    self.pixel(center, color);
                } else {
                    self.fill(&Circle::new(center, diameter / 2.0), center, color);
                }
            }

            Shape::Line { x0, y0, x1, y1 } => {
                let (start, end) = (device(*x0, *y0), device(*x1, *y1));
                let mut path = BezPath::new();
                path.move_to(start);
                path.line_to(end);
                self.stroke(&path, start.midpoint(end), color, width);
            }

            Shape::Circle { x, y, r, filled } => {
                let center = device(*x, *y);
                let (ws, hs) = extent(mapper, 2.0 * r, 2.0 * r);
                let ellipse = Ellipse::new(center, (ws / 2.0, hs / 2.0), 0.0);
                self.paint_bounded(&ellipse, center, (ws, hs), *filled, color, width);
            }

            Shape::Ellipse {
                x,
                y,
                semi_major,
                semi_minor,
                filled,
            } => {
                let center = device(*x, *y);
                let (ws, hs) = extent(mapper, 2.0 * semi_major, 2.0 * semi_minor);
                let ellipse = Ellipse::new(center, (ws / 2.0, hs / 2.0), 0.0);
                self.paint_bounded(&ellipse, center, (ws, hs), *filled, color, width);
            }

            Shape::Arc {
                x,
                y,
                r,
                angle1,
                angle2,
            } => {
                let (a1, a2) = normalize_arc(*angle1, *angle2);
                let center = device(*x, *y);
                let (ws, hs) = extent(mapper, 2.0 * r, 2.0 * r);
                // Device Y points down, so user angle θ sits at device angle -θ.
                // Sweeping from -a2 forward by (a2 - a1) covers the same points.
                let arc = KurboArc {
                    center,
                    radii: Vec2::new(ws / 2.0, hs / 2.0),
                    start_angle: -a2.to_radians(),
                    sweep_angle: (a2 - a1).to_radians(),
                    x_rotation: 0.0,
                };
                if ws <= 1.0 && hs <= 1.0 {
                    self.pixel(center, color);
                } else {
                    // A zero sweep builds no path; its only point is the start.
                    let (sin, cos) = arc.start_angle.sin_cos();
                    let start = center + Vec2::new(arc.radii.x * cos, arc.radii.y * sin);
                    self.stroke(&arc, start, color, width);
                }
            }

            Shape::Square {
                x,
                y,
                half_side,
                filled,
            } => {
                let center = device(*x, *y);
                let (ws, hs) = extent(mapper, 2.0 * half_side, 2.0 * half_side);
                let rect = Rect::from_center_size(center, (ws, hs));
                self.paint_bounded(&rect, center, (ws, hs), *filled, color, width);
            }

            Shape::Rectangle {
                x,
                y,
                half_width,
                half_height,
                filled,
            } => {
                let center = device(*x, *y);
                let (ws, hs) = extent(mapper, 2.0 * half_width, 2.0 * half_height);
                let rect = Rect::from_center_size(center, (ws, hs));
                self.paint_bounded(&rect, center, (ws, hs), *filled, color, width);
            }

            Shape::Polygon { vertices, filled } => {
                let Some(&(fx, fy)) = vertices.first() else {
                    return Err(DrawError::invalid("polygon needs at least one vertex"));
                };
                let first = device(fx, fy);
                let mut path = BezPath::new();
                path.move_to(first);
                for &(vx, vy) in &vertices[1..] {
                    path.line_to(device(vx, vy));
                }
                path.close_path();
                if *filled {
                    self.fill(&path, first, color);
                } else {
                    self.stroke(&path, first, color, width);
                }
            }

            Shape::Picture {
                x,
                y,
                locator,
                size,
                degrees,
            } => {
                let image = self.assets.load(locator)?;
                if image.width() == 0 || image.height() == 0 {
                    return Err(DrawError::decode(locator.as_str(), "image has no pixel dimensions"));
                }
                let center = device(*x, *y);
                let (ws, hs) = match size {
                    Some((w, h)) => extent(mapper, *w, *h),
                    None => (f64::from(image.width()), f64::from(image.height())),
                };
                if size.is_some() && ws <= 1.0 && hs <= 1.0 {
                    self.pixel(center, color);
                } else {
                    let placement = image_placement(&image, center, ws, hs);
                    self.rotated(*degrees, center, |surface| surface.draw_image(&image, placement));
                }
            }

            Shape::Text {
                x,
                y,
                text,
                align,
                degrees,
            } => {
                let anchor = device(*x, *y);
                let metrics = self.text.measure(&pen.font, text);
                let left = match align {
                    TextAlign::Left => anchor.x,
                    TextAlign::Center => anchor.x - metrics.width / 2.0,
                    TextAlign::Right => anchor.x - metrics.width,
                };
                let origin = Point::new(left, anchor.y + metrics.descent);
                self.rotated(*degrees, anchor, |surface| {
                    let transform = surface.transform;
                    surface
                        .text
                        .draw(surface.buffers.offscreen_mut(), text, origin, &pen.font, color, transform);
                });
            }
        }
        Ok(())
    }

    // ─── Transform scope ─────────────────────────────────────────────────

    /// Run `draw` with the surface rotated `degrees` counterclockwise about
    /// `pivot`, then restore the exact previous transform.
    fn rotated<R>(&mut self, degrees: f64, pivot: Point, draw: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.transform;
        if degrees != 0.0 {
            self.transform = saved * Affine::rotate_about(-degrees.to_radians(), pivot);
        }
        let out = draw(self);
        self.transform = saved;
        out
    }

    // ─── Painters ────────────────────────────────────────────────────────

    fn paint_bounded<S: kurbo::Shape>(
        &mut self,
        shape: &S,
        center: Point,
        (ws, hs): (f64, f64),
        filled: bool,
        color: Color,
        width: f32,
    ) {
        if ws <= 1.0 && hs <= 1.0 {
            self.pixel(center, color);
        } else if filled {
            self.fill(shape, center, color);
        } else {
            self.stroke(shape, center, color, width);
        }
    }

    fn fill<S: kurbo::Shape>(&mut self, shape: &S, fallback: Point, color: Color) {
        let Some(path) = to_skia_path(shape) else {
            self.pixel(fallback, color);
            return;
        };
        let transform = to_skia_transform(self.transform);
        self.buffers
            .offscreen_mut()
            .fill_path(&path, &solid(color), FillRule::Winding, transform, None);
    }

    fn stroke<S: kurbo::Shape>(&mut self, shape: &S, fallback: Point, color: Color, width: f32) {
        let Some(path) = to_skia_path(shape) else {
            self.pixel(fallback, color);
            return;
        };
        let stroke = Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        let transform = to_skia_transform(self.transform);
        self.buffers
            .offscreen_mut()
            .stroke_path(&path, &solid(color), &stroke, transform, None);
    }

    /// One hard-edged pixel at the rounded device position.
    fn pixel(&mut self, at: Point, color: Color) {
        let Some(rect) = tiny_skia::Rect::from_xywh(at.x.round() as f32, at.y.round() as f32, 1.0, 1.0)
        else {
            return;
        };
        let mut paint = solid(color);
        paint.anti_alias = false;
        let transform = to_skia_transform(self.transform);
        self.buffers.offscreen_mut().fill_rect(rect, &paint, transform, None);
    }

    fn draw_image(&mut self, image: &Image, placement: Affine) {
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        let transform = to_skia_transform(self.transform * placement);
        self.buffers
            .offscreen_mut()
            .draw_pixmap(0, 0, image.pixmap().as_ref(), &paint, transform, None);
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

/// Device-pixel size of a user-space `(w, h)` box.
fn extent(mapper: &CoordinateMapper, w: f64, h: f64) -> (f64, f64) {
    (mapper.scale_length(w, Axis::X), mapper.scale_length(h, Axis::Y))
}

/// Map image pixels onto a `ws × hs` box centered at `center`, snapped to
/// whole pixels.
fn image_placement(image: &Image, center: Point, ws: f64, hs: f64) -> Affine {
    let left = (center.x - ws / 2.0).round();
    let top = (center.y - hs / 2.0).round();
    let w = ws.round().max(1.0);
    let h = hs.round().max(1.0);
    Affine::translate((left, top))
        * Affine::scale_non_uniform(w / f64::from(image.width()), h / f64::from(image.height()))
}

fn solid(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn to_skia_path<S: kurbo::Shape>(shape: &S) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in shape.path_elements(PATH_TOLERANCE) {
        match el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn to_skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}
