use nalgebra::Vector2;

/// Axis-aligned bounding box in min/max form.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bb {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bb {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        debug_assert!(min_x <= max_x && min_y <= max_y);
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn from_center(x: f32, y: f32, half_width: f32, half_height: f32) -> Self {
        Self::new(x - half_width, y - half_height, x + half_width, y + half_height)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Vector2<f32> {
        Vector2::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    pub fn intersects(&self, other: &Bb) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    pub fn contains(&self, other: &Bb) -> bool {
        self.min_x <= other.min_x
            && self.max_x >= other.max_x
            && self.min_y <= other.min_y
            && self.max_y >= other.max_y
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        self.min_x <= x && x <= self.max_x && self.min_y <= y && y <= self.max_y
    }

    pub fn merged(&self, other: &Bb) -> Bb {
        Bb {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grow the box by `margin` on every side.
    pub fn grown(&self, margin: f32) -> Bb {
        debug_assert!(margin >= 0.0);
        Bb {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    /// Extend the box along a displacement, covering where the owner is
    /// headed. Used for motion prediction when reindexing moving shapes.
    pub fn swept(&self, displacement: Vector2<f32>) -> Bb {
        Bb {
            min_x: self.min_x + displacement.x.min(0.0),
            min_y: self.min_y + displacement.y.min(0.0),
            max_x: self.max_x + displacement.x.max(0.0),
            max_y: self.max_y + displacement.y.max(0.0),
        }
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }
}
