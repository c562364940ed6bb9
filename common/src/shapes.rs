use nalgebra::{Isometry2, Point2, Vector2};

use crate::bb::Bb;

/// Collision geometry attached to a body, expressed in body-local
/// coordinates. The world-space footprint depends on the owning body's
/// transform, so bounding boxes are computed against an `Isometry2`.
#[derive(Debug, Copy, Clone)]
pub enum ShapeGeometry {
    Circle(Circle),
    Box(BoxShape),
}

#[derive(Debug, Copy, Clone)]
pub struct Circle {
    pub offset: Vector2<f32>,
    pub radius: f32,
}

#[derive(Debug, Copy, Clone)]
pub struct BoxShape {
    pub offset: Vector2<f32>,
    pub half_extents: Vector2<f32>,
}

impl ShapeGeometry {
    pub fn circle(radius: f32) -> Self {
        Self::circle_at(Vector2::zeros(), radius)
    }

    pub fn circle_at(offset: Vector2<f32>, radius: f32) -> Self {
        debug_assert!(radius.is_finite() && radius > 0.0);
        ShapeGeometry::Circle(Circle { offset, radius })
    }

    pub fn cuboid(half_width: f32, half_height: f32) -> Self {
        Self::cuboid_at(Vector2::zeros(), half_width, half_height)
    }

    pub fn cuboid_at(offset: Vector2<f32>, half_width: f32, half_height: f32) -> Self {
        debug_assert!(half_width.is_finite() && half_width > 0.0);
        debug_assert!(half_height.is_finite() && half_height > 0.0);
        ShapeGeometry::Box(BoxShape {
            offset,
            half_extents: Vector2::new(half_width, half_height),
        })
    }

    /// World-space bounding box under the owning body's transform.
    pub fn bb(&self, transform: &Isometry2<f32>) -> Bb {
        match self {
            ShapeGeometry::Circle(circle) => {
                let center = transform * Point2::from(circle.offset);
                Bb::from_center(center.x, center.y, circle.radius, circle.radius)
            }
            ShapeGeometry::Box(cuboid) => {
                let center = transform * Point2::from(cuboid.offset);
                // Tight bb of a rotated box: project the half extents onto
                // the world axes.
                let (sin, cos) = transform.rotation.angle().sin_cos();
                let hw = cuboid.half_extents.x * cos.abs() + cuboid.half_extents.y * sin.abs();
                let hh = cuboid.half_extents.x * sin.abs() + cuboid.half_extents.y * cos.abs();
                Bb::from_center(center.x, center.y, hw, hh)
            }
        }
    }
}
