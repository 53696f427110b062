use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Screen-space point. Coordinates follow the accessibility convention:
/// origin at the top-left of the primary display, y grows downwards.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }

    pub fn scale(self, factor: f64) -> Self { Self::new(self.x * factor, self.y * factor) }

    pub fn is_zero(self) -> bool { self.x == 0.0 && self.y == 0.0 }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point { Point::new(self.x + rhs.x, self.y + rhs.y) }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point { Point::new(self.x - rhs.x, self.y - rhs.y) }
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self { Self { width, height } }
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Self { Self { origin, size } }

    pub const fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(Point::new(x, y), Size::new(width, height))
    }

    pub fn min_x(&self) -> f64 { self.origin.x }

    pub fn min_y(&self) -> f64 { self.origin.y }

    pub fn max_x(&self) -> f64 { self.origin.x + self.size.width }

    pub fn max_y(&self) -> f64 { self.origin.y + self.size.height }

    pub fn mid_x(&self) -> f64 { self.origin.x + self.size.width / 2.0 }

    pub fn mid_y(&self) -> f64 { self.origin.y + self.size.height / 2.0 }

    pub fn is_empty(&self) -> bool { self.size.width <= 0.0 || self.size.height <= 0.0 }

    /// Half-open containment: the max edges belong to the neighbour.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x < self.max_x()
            && point.y >= self.min_y()
            && point.y < self.max_y()
    }

    /// Grows the rect by `amount` on every side (shrinks for negative amounts).
    pub fn outset(&self, amount: f64) -> Rect {
        Rect::from_xywh(
            self.origin.x - amount,
            self.origin.y - amount,
            (self.size.width + 2.0 * amount).max(0.0),
            (self.size.height + 2.0 * amount).max(0.0),
        )
    }

    pub fn translate(&self, delta: Point) -> Rect {
        Rect::new(self.origin + delta, self.size)
    }

    /// Rounds position and size independently so sizes do not jitter with position.
    pub fn round(&self) -> Rect {
        Rect::from_xywh(
            self.origin.x.round(),
            self.origin.y.round(),
            self.size.width.round(),
            self.size.height.round(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_is_half_open() {
        let r = Rect::from_xywh(10.0, 10.0, 100.0, 50.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(109.9, 59.9)));
        assert!(!r.contains(Point::new(110.0, 30.0)));
        assert!(!r.contains(Point::new(50.0, 60.0)));
    }

    #[test]
    fn outset_never_produces_negative_size() {
        let r = Rect::from_xywh(0.0, 0.0, 4.0, 4.0).outset(-10.0);
        assert_eq!(r.size, Size::new(0.0, 0.0));
        assert!(r.is_empty());
    }
}
