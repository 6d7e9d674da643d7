//! Collision primitives. Everything here is pure and allocation free.

/// A 2D vector used for positions and extents in playfield units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2D {
    pub x: f32,
    pub y: f32,
}

impl Vector2D {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(&self, other: &Vector2D) -> f32 {
        (*self - *other).magnitude()
    }
}

impl core::ops::Add for Vector2D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl core::ops::Sub for Vector2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl core::ops::Mul<f32> for Vector2D {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

/// Axis-aligned rectangle covering `[x, x + w] × [y, y + h]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Vector2D,
    pub size: Vector2D,
}

impl Rect {
    pub fn new(origin: Vector2D, size: Vector2D) -> Self {
        Self { origin, size }
    }

    /// Rectangle spanning two vertical bounds, centered horizontally on `center_x`
    pub fn from_spans(center_x: f32, width: f32, bottom: f32, top: f32) -> Self {
        Self {
            origin: Vector2D::new(center_x - width / 2.0, bottom),
            size: Vector2D::new(width, (top - bottom).max(0.0)),
        }
    }

    pub fn left(&self) -> f32 {
        self.origin.x
    }

    pub fn right(&self) -> f32 {
        self.origin.x + self.size.x
    }

    pub fn bottom(&self) -> f32 {
        self.origin.y
    }

    pub fn top(&self) -> f32 {
        self.origin.y + self.size.y
    }

    pub fn intersects_circle(&self, center: Vector2D, radius: f32) -> bool {
        circle_rectangle_collides(center, radius, self.origin, self.size)
    }
}

/// Circle against axis-aligned rectangle.
///
/// The center is clamped into the rectangle to find the closest point; the
/// shapes touch when that point is no further than `radius` away.
pub fn circle_rectangle_collides(
    center: Vector2D,
    radius: f32,
    rect_top_left: Vector2D,
    rect_dim: Vector2D,
) -> bool {
    let closest = Vector2D::new(
        center.x.clamp(rect_top_left.x, rect_top_left.x + rect_dim.x),
        center.y.clamp(rect_top_left.y, rect_top_left.y + rect_dim.y),
    );
    center.distance(&closest) <= radius
}

/// Inclusive overlap of `[a_min, a_max]` and `[b_min, b_max]`
pub fn spans_overlap(a_min: f32, a_max: f32, b_min: f32, b_max: f32) -> bool {
    a_max >= b_min && a_min <= b_max
}
