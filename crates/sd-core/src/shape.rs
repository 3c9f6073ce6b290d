//! Shape commands: user-space geometry plus the pen at issue time.

use crate::error::DrawError;
use crate::pen::Pen;
use smallvec::SmallVec;

/// Horizontal anchoring of a text run relative to its placement point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// A drawing primitive in user coordinates.
///
/// Radii and half-extents are in user units; angles are degrees,
/// counterclockwise from the positive X axis.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point {
        x: f64,
        y: f64,
    },
    Line {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
    },
    Circle {
        x: f64,
        y: f64,
        r: f64,
        filled: bool,
    },
    Ellipse {
        x: f64,
        y: f64,
        semi_major: f64,
        semi_minor: f64,
        filled: bool,
    },
    Arc {
        x: f64,
        y: f64,
        r: f64,
        angle1: f64,
        angle2: f64,
    },
    Square {
        x: f64,
        y: f64,
        half_side: f64,
        filled: bool,
    },
    Rectangle {
        x: f64,
        y: f64,
        half_width: f64,
        half_height: f64,
        filled: bool,
    },
    Polygon {
        vertices: SmallVec<[(f64, f64); 8]>,
        filled: bool,
    },
    /// Image centered at `(x, y)`. `size` is `(width, height)` in user
    /// units; `None` draws the image at its natural pixel size.
    Picture {
        x: f64,
        y: f64,
        locator: String,
        size: Option<(f64, f64)>,
        degrees: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        align: TextAlign,
        degrees: f64,
    },
}

fn non_negative(what: &str, value: f64) -> Result<(), DrawError> {
    if value < 0.0 || value.is_nan() {
        return Err(DrawError::invalid(format!("{what} can't be negative, got {value}")));
    }
    Ok(())
}

impl Shape {
    /// Build a polygon from parallel coordinate slices.
    pub fn polygon(xs: &[f64], ys: &[f64], filled: bool) -> Result<Self, DrawError> {
        if xs.len() != ys.len() {
            return Err(DrawError::invalid(format!(
                "polygon needs matching coordinate counts, got {} x and {} y",
                xs.len(),
                ys.len()
            )));
        }
        let shape = Self::Polygon {
            vertices: xs.iter().copied().zip(ys.iter().copied()).collect(),
            filled,
        };
        shape.validate()?;
        Ok(shape)
    }

    /// Check argument constraints. Runs before any pixel is touched.
    pub fn validate(&self) -> Result<(), DrawError> {
        match self {
            Self::Point { .. } | Self::Line { .. } | Self::Text { .. } => Ok(()),
            Self::Circle { r, .. } => non_negative("circle radius", *r),
            Self::Ellipse {
                semi_major,
                semi_minor,
                ..
            } => {
                non_negative("ellipse semimajor axis", *semi_major)?;
                non_negative("ellipse semiminor axis", *semi_minor)
            }
            Self::Arc {
                r, angle1, angle2, ..
            } => {
                non_negative("arc radius", *r)?;
                if !angle1.is_finite() || !angle2.is_finite() {
                    return Err(DrawError::invalid(format!(
                        "arc angles must be finite, got {angle1} and {angle2}"
                    )));
                }
                Ok(())
            }
            Self::Square { half_side, .. } => non_negative("square half side", *half_side),
            Self::Rectangle {
                half_width,
                half_height,
                ..
            } => {
                non_negative("rectangle half width", *half_width)?;
                non_negative("rectangle half height", *half_height)
            }
            Self::Polygon { vertices, .. } => {
                if vertices.is_empty() {
                    return Err(DrawError::invalid("polygon needs at least one vertex"));
                }
                Ok(())
            }
            Self::Picture { size, .. } => match size {
                Some((w, h)) if !(*w > 0.0) || !(*h > 0.0) => Err(DrawError::invalid(format!(
                    "picture size must be positive, got {w} x {h}"
                ))),
                _ => Ok(()),
            },
        }
    }

    /// Short tag for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Point { .. } => "point",
            Self::Line { .. } => "line",
            Self::Circle { .. } => "circle",
            Self::Ellipse { .. } => "ellipse",
            Self::Arc { .. } => "arc",
            Self::Square { .. } => "square",
            Self::Rectangle { .. } => "rectangle",
            Self::Polygon { .. } => "polygon",
            Self::Picture { .. } => "picture",
            Self::Text { .. } => "text",
        }
    }
}

/// Bring `angle2` to the smallest `angle2 + 360k` that is `>= angle1`.
///
/// Angles must be finite.
pub fn normalize_arc(angle1: f64, mut angle2: f64) -> (f64, f64) {
    if angle2 < angle1 {
        angle2 += 360.0 * ((angle1 - angle2) / 360.0).ceil();
        while angle2 < angle1 {
            angle2 += 360.0;
        }
    }
    (angle1, angle2)
}

/// A shape bound to the pen that was current when it was issued.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeCommand {
    pub shape: Shape,
    pub pen: Pen,
    /// Pen stroke width in pixels, resolved at issue time.
    pub stroke_width: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn arc_end_wraps_forward_past_start() {
        assert_eq!(normalize_arc(200.0, 45.0), (200.0, 405.0));
        assert_eq!(normalize_arc(0.0, -720.0), (0.0, 0.0));
        assert_eq!(normalize_arc(10.0, -1.0), (10.0, 359.0));
        assert_eq!(normalize_arc(30.0, 90.0), (30.0, 90.0));
    }

    #[test]
    fn backward_end_equals_end_plus_full_turn() {
        for (a1, a2) in [(200.0, 45.0), (359.0, 0.0), (90.0, -1000.0)] {
            let wrapped = normalize_arc(a1, a2);
            assert_eq!(wrapped, normalize_arc(a1, a2 + 360.0));
            assert!(wrapped.1 >= a1 && wrapped.1 - a1 < 360.0);
        }
    }

    #[test]
    fn negative_extents_are_invalid() {
        let shapes = [
            Shape::Circle { x: 0.0, y: 0.0, r: -1.0, filled: false },
            Shape::Ellipse { x: 0.0, y: 0.0, semi_major: 1.0, semi_minor: -0.1, filled: true },
            Shape::Arc { x: 0.0, y: 0.0, r: -0.1, angle1: 0.0, angle2: 90.0 },
            Shape::Square { x: 0.0, y: 0.0, half_side: -2.0, filled: false },
            Shape::Rectangle { x: 0.0, y: 0.0, half_width: 1.0, half_height: -1.0, filled: false },
        ];
        for shape in shapes {
            assert!(
                matches!(shape.validate(), Err(DrawError::InvalidArgument(_))),
                "{} should be rejected",
                shape.kind()
            );
        }
    }

    #[test]
    fn zero_extents_are_valid() {
        let shape = Shape::Rectangle { x: 0.0, y: 0.0, half_width: 0.0, half_height: 0.0, filled: true };
        assert_eq!(shape.validate(), Ok(()));
    }

    #[test]
    fn polygon_requires_vertices_and_matching_lengths() {
        assert!(Shape::polygon(&[], &[], false).is_err());
        assert!(Shape::polygon(&[0.1, 0.2], &[0.1], true).is_err());
        let tri = Shape::polygon(&[0.1, 0.2, 0.3], &[0.1, 0.3, 0.1], true).unwrap();
        match tri {
            Shape::Polygon { vertices, filled } => {
                assert_eq!(vertices.len(), 3);
                assert!(filled);
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn picture_size_must_be_positive() {
        let pic = |w, h| Shape::Picture {
            x: 0.5,
            y: 0.5,
            locator: "ball.png".into(),
            size: Some((w, h)),
            degrees: 0.0,
        };
        assert!(pic(0.0, 1.0).validate().is_err());
        assert!(pic(1.0, -1.0).validate().is_err());
        assert!(pic(0.2, 0.1).validate().is_ok());
    }
}
