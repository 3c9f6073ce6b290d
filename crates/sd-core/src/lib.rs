pub mod color;
pub mod error;
pub mod pen;
pub mod shape;
pub mod viewport;

pub use color::Color;
pub use error::DrawError;
pub use pen::{Font, FontStyle, Pen, PenState};
pub use shape::{Shape, ShapeCommand, TextAlign, normalize_arc};
pub use viewport::{Axis, CoordinateMapper, Viewport};
