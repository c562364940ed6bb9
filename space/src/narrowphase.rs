use common::shapes::ShapeGeometry;
use nalgebra::{Isometry2, Translation2};
use parry2d::shape::{Ball, Cuboid, Shape as ParryShape};
use smallvec::SmallVec;

use crate::arbiter::ContactPoint;

enum Collider {
    Ball(Ball),
    Cuboid(Cuboid),
}

impl Collider {
    fn from_geometry(geometry: &ShapeGeometry) -> (Self, Isometry2<f32>) {
        match geometry {
            ShapeGeometry::Circle(circle) => (
                Collider::Ball(Ball::new(circle.radius)),
                Translation2::from(circle.offset).into(),
            ),
            ShapeGeometry::Box(cuboid) => (
                Collider::Cuboid(Cuboid::new(cuboid.half_extents)),
                Translation2::from(cuboid.offset).into(),
            ),
        }
    }

    fn as_shape(&self) -> &dyn ParryShape {
        match self {
            Collider::Ball(ball) => ball,
            Collider::Cuboid(cuboid) => cuboid,
        }
    }
}

/// Contact points between two shapes in world space, oriented with the
/// normal pointing from the first shape towards the second. Pairs that
/// are further apart than `prediction` produce no contacts.
pub(crate) fn contact_points(
    geometry_a: &ShapeGeometry,
    transform_a: &Isometry2<f32>,
    geometry_b: &ShapeGeometry,
    transform_b: &Isometry2<f32>,
    prediction: f32,
) -> SmallVec<[ContactPoint; 2]> {
    let (collider_a, local_a) = Collider::from_geometry(geometry_a);
    let (collider_b, local_b) = Collider::from_geometry(geometry_b);
    let pos_a = transform_a * local_a;
    let pos_b = transform_b * local_b;

    let mut contacts = SmallVec::new();
    let contact = parry2d::query::contact(
        &pos_a,
        collider_a.as_shape(),
        &pos_b,
        collider_b.as_shape(),
        prediction,
    )
    .ok()
    .flatten();
    if let Some(contact) = contact {
        let point = (contact.point1.coords + contact.point2.coords) * 0.5;
        contacts.push(ContactPoint::new(
            point,
            contact.normal1.into_inner(),
            contact.dist,
        ));
    }
    contacts
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Vector2;

    #[test]
    fn test_overlapping_circles_touch() {
        let a = ShapeGeometry::circle(1.0);
        let b = ShapeGeometry::circle(1.0);
        let ta = Isometry2::new(Vector2::new(0.0, 0.0), 0.0);
        let tb = Isometry2::new(Vector2::new(1.5, 0.0), 0.0);
        let contacts = contact_points(&a, &ta, &b, &tb, 0.0);
        assert_eq!(contacts.len(), 1);
        let contact = &contacts[0];
        assert!(contact.dist < 0.0);
        assert!((contact.normal - Vector2::new(1.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_distant_circles_do_not_touch() {
        let a = ShapeGeometry::circle(1.0);
        let b = ShapeGeometry::circle(1.0);
        let ta = Isometry2::identity();
        let tb = Isometry2::new(Vector2::new(10.0, 0.0), 0.0);
        assert!(contact_points(&a, &ta, &b, &tb, 0.1).is_empty());
    }

    #[test]
    fn test_circle_rests_on_box() {
        let floor = ShapeGeometry::cuboid(5.0, 0.5);
        let ball = ShapeGeometry::circle(1.0);
        let tf = Isometry2::identity();
        let tb = Isometry2::new(Vector2::new(0.0, 1.4), 0.0);
        let contacts = contact_points(&floor, &tf, &ball, &tb, 0.0);
        assert_eq!(contacts.len(), 1);
        assert!((contacts[0].normal - Vector2::new(0.0, 1.0)).norm() < 1e-4);
    }
}
