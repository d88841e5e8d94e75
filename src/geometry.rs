//! Plain geometry used by the zoom controller.
//!
//! Everything here is side-effect free. The transform model matches CSS
//! `translate3d(t) scale(s)` with a separate `transform-origin: o`: a point `p`
//! of the untransformed box ends up at `o + (p - o) * s + t`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(self, o: Point) -> Point {
        Point::new(self.x + o.x, self.y + o.y)
    }

    pub fn sub(self, o: Point) -> Point {
        Point::new(self.x - o.x, self.y - o.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Absolute rectangle given by its two corners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, x2: f64, y2: f64) -> Self {
        Self { x, y, x2, y2 }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(
            origin.x,
            origin.y,
            origin.x + size.width,
            origin.y + size.height,
        )
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y
    }

    /// Shrinks the rectangle by `by` on every side.
    pub fn inset(&self, by: f64) -> Rect {
        Rect::new(self.x + by, self.y + by, self.x2 - by, self.y2 - by)
    }
}

/// Pixel distance between two touches, rounded like the browser reports it.
pub fn point_distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt().round()
}

/// Rounded centroid; `Point::ZERO` for an empty slice.
pub fn center_of_points(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::ZERO;
    }
    let n = points.len() as f64;
    let sx: f64 = points.iter().map(|p| p.x).sum();
    let sy: f64 = points.iter().map(|p| p.y).sum();
    Point::new((sx / n).round(), (sy / n).round())
}

/// On-screen rectangle of a box at `position` with `size` after scaling by
/// `scale` about `origin` (relative to `position`) and translating.
pub fn simulate_transformation(
    position: Point,
    size: Size,
    origin: Point,
    translation: Point,
    scale: f64,
) -> Rect {
    Rect {
        x: position.x + origin.x - origin.x * scale + translation.x,
        y: position.y + origin.y - origin.y * scale + translation.y,
        x2: position.x + origin.x + (size.width - origin.x) * scale + translation.x,
        y2: position.y + origin.y + (size.height - origin.y) * scale + translation.y,
    }
}

/// Inverse of [`simulate_transformation`] for the top-left corner: the origin
/// that puts the box's low edges at `target`. `scale` must not be 1.
pub fn transform_origin_from_target(
    target: Point,
    position: Point,
    translation: Point,
    scale: f64,
) -> Point {
    Point::new(
        (position.x + translation.x - target.x) / (scale - 1.0),
        (position.y + translation.y - target.y) / (scale - 1.0),
    )
}
