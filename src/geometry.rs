//! Geometry primitives and analytic membership tests.
//!
//! Everything here works in integer pixel space. Analytic shape tests are
//! evaluated at pixel centers (x + 0.5, y + 0.5) so that rasterized output
//! is symmetric regardless of where a shape sits on the grid.

/// Axis-aligned integer rectangle in pixel space.
///
/// A zero-area rect (width or height of 0) is valid and is used as a
/// "no selection" signal on some paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Rect { x, y, width, height }
    }

    /// Rect spanning two corner points, inclusive of both pixels.
    pub fn from_points(ax: i32, ay: i32, bx: i32, by: i32) -> Self {
        let x = ax.min(bx);
        let y = ay.min(by);
        Rect {
            x,
            y,
            width: (ax.max(bx) - x) as u32 + 1,
            height: (ay.max(by) - y) as u32 + 1,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Smallest rect enclosing both. An empty rect is the identity.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: (self.right().max(other.right()) - x) as u32,
            height: (self.bottom().max(other.bottom()) - y) as u32,
        }
    }

    /// Overlapping area of both rects, or `None` when they do not overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return None;
        }
        Some(Rect {
            x,
            y,
            width: (right - x) as u32,
            height: (bottom - y) as u32,
        })
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Center of the rect in continuous pixel coordinates.
    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }
}

/// Ellipse membership for the pixel (px, py), evaluated at its center.
///
/// The ellipse is inscribed in `bounds`. Uses the normalized-distance test
/// `((px + 0.5 - cx) / rx)^2 + ((py + 0.5 - cy) / ry)^2 <= 1`.
pub fn ellipse_contains(bounds: &Rect, px: i32, py: i32) -> bool {
    if bounds.is_empty() {
        return false;
    }
    let (cx, cy) = bounds.center();
    let rx = bounds.width as f32 / 2.0;
    let ry = bounds.height as f32 / 2.0;
    let dx = (px as f32 + 0.5 - cx) / rx;
    let dy = (py as f32 + 0.5 - cy) / ry;
    dx * dx + dy * dy <= 1.0
}

/// Hit test against a rectangle rotated by `angle_degrees` about `pivot`.
///
/// The query point is inverse-rotated about the pivot, then tested against
/// the axis-aligned bounds. Used by the editor to hit-test the handles of a
/// transforming selection.
pub fn rotated_rect_contains(
    bounds: &Rect,
    angle_degrees: f32,
    pivot: (f32, f32),
    px: f32,
    py: f32,
) -> bool {
    let rad = -angle_degrees.to_radians();
    let (sin, cos) = rad.sin_cos();
    let dx = px - pivot.0;
    let dy = py - pivot.1;
    let qx = pivot.0 + dx * cos - dy * sin;
    let qy = pivot.1 + dx * sin + dy * cos;
    qx >= bounds.x as f32
        && qx < bounds.right() as f32
        && qy >= bounds.y as f32
        && qy < bounds.bottom() as f32
}
