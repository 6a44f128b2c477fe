//! Positions and axis-aligned bounding boxes, in millimetres.

/// A 2D point or offset in board coordinates (mm, Y axis pointing down).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Rotate around the origin by `deg` degrees, KiCad convention
    /// (positive angles rotate counter-clockwise on screen, Y down).
    pub fn rotated_deg(self, deg: f64) -> Vec2 {
        let rad = deg.to_radians();
        let (sin, cos) = rad.sin_cos();
        Vec2 {
            x: self.x * cos + self.y * sin,
            y: -self.x * sin + self.y * cos,
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// An axis-aligned bounding box. Starts out empty; an empty box has zero
/// area and intersects nothing, which is how "no plate geometry present"
/// is signalled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    min: Vec2,
    max: Vec2,
}

impl Default for BBox {
    fn default() -> Self {
        BBox::empty()
    }
}

impl BBox {
    pub const fn empty() -> Self {
        BBox {
            min: Vec2::new(f64::INFINITY, f64::INFINITY),
            max: Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn from_points<I: IntoIterator<Item = Vec2>>(points: I) -> Self {
        let mut bbox = BBox::empty();
        for p in points {
            bbox.include(p);
        }
        bbox
    }

    pub fn include(&mut self, p: Vec2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Grow to cover a circle of radius `r` centred at `c`.
    pub fn include_circle(&mut self, c: Vec2, r: f64) {
        self.include(Vec2::new(c.x - r, c.y - r));
        self.include(Vec2::new(c.x + r, c.y + r));
    }

    pub fn merge(&mut self, other: &BBox) {
        if !other.is_empty() {
            self.include(other.min);
            self.include(other.max);
        }
    }

    pub fn min(&self) -> Vec2 {
        self.min
    }

    pub fn max(&self) -> Vec2 {
        self.max
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.max.x - self.min.x }
    }

    pub fn height(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.max.y - self.min.y }
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Inclusive intersection test: boxes that merely touch count as
    /// intersecting. Empty boxes intersect nothing.
    pub fn intersects(&self, other: &BBox) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    pub fn translated(&self, by: Vec2) -> BBox {
        if self.is_empty() {
            return *self;
        }
        BBox {
            min: self.min + by,
            max: self.max + by,
        }
    }

    /// The four corner points. Empty boxes have none.
    pub fn corners(&self) -> Vec<Vec2> {
        if self.is_empty() {
            return Vec::new();
        }
        vec![
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }
}
