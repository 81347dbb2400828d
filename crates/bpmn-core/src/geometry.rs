//! Points, rectangles and the small set of geometric helpers the modeler
//! needs (mid points, containment, deltas).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn translate(self, delta: Delta) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y)
    }

    pub fn delta_to(self, other: Point) -> Delta {
        Delta::new(other.x - self.x, other.y - self.y)
    }
}

/// A relative movement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Delta {
    pub x: f64,
    pub y: f64,
}

impl Delta {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn invert(self) -> Self {
        Self::new(-self.x, -self.y)
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Axis-aligned rectangle in absolute diagram coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn mid(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translate(self, delta: Delta) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn trbl(&self) -> Trbl {
        Trbl {
            top: self.y,
            right: self.right(),
            bottom: self.bottom(),
            left: self.x,
        }
    }

    pub fn from_trbl(trbl: Trbl) -> Self {
        Self::new(
            trbl.left,
            trbl.top,
            trbl.right - trbl.left,
            trbl.bottom - trbl.top,
        )
    }

    /// Mirror across the diagonal, swapping the axes.
    pub fn transpose(self) -> Self {
        Self::new(self.y, self.x, self.height, self.width)
    }

    /// Boundary-inclusive point containment.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Strict containment: points on the border are outside.
    pub fn contains_strict(&self, p: Point) -> bool {
        p.x > self.x && p.x < self.right() && p.y > self.y && p.y < self.bottom()
    }
}

/// Top/right/bottom/left representation, used for lane and space computations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Trbl {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Trbl {
    pub fn sub(&self, other: &Trbl) -> Trbl {
        Trbl {
            top: self.top - other.top,
            right: self.right - other.right,
            bottom: self.bottom - other.bottom,
            left: self.left - other.left,
        }
    }

    pub fn add(&self, other: &Trbl) -> Trbl {
        Trbl {
            top: self.top + other.top,
            right: self.right + other.right,
            bottom: self.bottom + other.bottom,
            left: self.left + other.left,
        }
    }
}

/// Cardinal direction of one element relative to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Top,
    Right,
    Bottom,
    Left,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Intersect,
}

impl Orientation {
    /// The cardinal parts of a (possibly diagonal) orientation.
    pub fn cardinals(self) -> &'static [Orientation] {
        match self {
            Orientation::Top => &[Orientation::Top],
            Orientation::Right => &[Orientation::Right],
            Orientation::Bottom => &[Orientation::Bottom],
            Orientation::Left => &[Orientation::Left],
            Orientation::TopLeft => &[Orientation::Top, Orientation::Left],
            Orientation::TopRight => &[Orientation::Top, Orientation::Right],
            Orientation::BottomLeft => &[Orientation::Bottom, Orientation::Left],
            Orientation::BottomRight => &[Orientation::Bottom, Orientation::Right],
            Orientation::Intersect => &[],
        }
    }

    pub fn opposite(self) -> Orientation {
        match self {
            Orientation::Top => Orientation::Bottom,
            Orientation::Right => Orientation::Left,
            Orientation::Bottom => Orientation::Top,
            Orientation::Left => Orientation::Right,
            Orientation::TopLeft => Orientation::BottomRight,
            Orientation::TopRight => Orientation::BottomLeft,
            Orientation::BottomLeft => Orientation::TopRight,
            Orientation::BottomRight => Orientation::TopLeft,
            Orientation::Intersect => Orientation::Intersect,
        }
    }
}

/// Orientation of `rect` relative to `reference`, with `padding` tolerance.
pub fn get_orientation(rect: &Bounds, reference: &Bounds, padding: f64) -> Orientation {
    let r = rect.trbl();
    let o = reference.trbl();

    let top = r.bottom + padding <= o.top;
    let right = r.left - padding >= o.right;
    let bottom = r.top - padding >= o.bottom;
    let left = r.right + padding <= o.left;

    match (top, right, bottom, left) {
        (true, true, _, _) => Orientation::TopRight,
        (true, _, _, true) => Orientation::TopLeft,
        (_, true, true, _) => Orientation::BottomRight,
        (_, _, true, true) => Orientation::BottomLeft,
        (true, _, _, _) => Orientation::Top,
        (_, true, _, _) => Orientation::Right,
        (_, _, true, _) => Orientation::Bottom,
        (_, _, _, true) => Orientation::Left,
        _ => Orientation::Intersect,
    }
}

/// Orientation of a point relative to a rectangle.
pub fn get_point_orientation(point: Point, reference: &Bounds) -> Orientation {
    get_orientation(&Bounds::new(point.x, point.y, 0.0, 0.0), reference, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_containment_excludes_border() {
        let b = Bounds::new(0.0, 0.0, 100.0, 100.0);
        assert!(b.contains(Point::new(100.0, 50.0)));
        assert!(!b.contains_strict(Point::new(100.0, 50.0)));
        assert!(b.contains_strict(Point::new(50.0, 50.0)));
    }

    #[test]
    fn orientation_of_neighbours() {
        let reference = Bounds::new(100.0, 100.0, 100.0, 100.0);
        let above = Bounds::new(100.0, 0.0, 100.0, 50.0);
        let right = Bounds::new(250.0, 120.0, 20.0, 20.0);
        let below_left = Bounds::new(0.0, 250.0, 20.0, 20.0);

        assert_eq!(get_orientation(&above, &reference, 0.0), Orientation::Top);
        assert_eq!(get_orientation(&right, &reference, 0.0), Orientation::Right);
        assert_eq!(
            get_orientation(&below_left, &reference, 0.0),
            Orientation::BottomLeft
        );
        assert_eq!(
            get_orientation(&reference, &reference, 0.0),
            Orientation::Intersect
        );
    }

    #[test]
    fn transpose_swaps_axes() {
        let b = Bounds::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(b.transpose(), Bounds::new(20.0, 10.0, 40.0, 30.0));
        assert_eq!(b.transpose().transpose(), b);
    }

    #[test]
    fn trbl_roundtrip() {
        let b = Bounds::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(Bounds::from_trbl(b.trbl()), b);
    }
}
