use common::bb::Bb;
use common::shapes::ShapeGeometry;
use nalgebra::{Isometry2, Vector2};

#[test]
fn test_bb_intersects() {
    let a = Bb::new(0.0, 0.0, 10.0, 10.0);
    let b = Bb::new(5.0, 5.0, 15.0, 15.0);
    let c = Bb::new(11.0, 11.0, 20.0, 20.0);
    assert!(a.intersects(&b));
    assert!(b.intersects(&a));
    assert!(!a.intersects(&c));
    // Touching edges count as intersecting.
    let d = Bb::new(10.0, 0.0, 20.0, 10.0);
    assert!(a.intersects(&d));
}

#[test]
fn test_bb_contains() {
    let outer = Bb::new(0.0, 0.0, 10.0, 10.0);
    let inner = Bb::new(2.0, 2.0, 8.0, 8.0);
    assert!(outer.contains(&inner));
    assert!(!inner.contains(&outer));
    assert!(outer.contains_point(5.0, 5.0));
    assert!(!outer.contains_point(-1.0, 5.0));
}

#[test]
fn test_bb_merged() {
    let a = Bb::new(0.0, 0.0, 4.0, 4.0);
    let b = Bb::new(6.0, -2.0, 8.0, 3.0);
    let m = a.merged(&b);
    assert_eq!(m, Bb::new(0.0, -2.0, 8.0, 4.0));
}

#[test]
fn test_bb_swept_follows_displacement() {
    let bb = Bb::new(0.0, 0.0, 2.0, 2.0);
    let swept = bb.swept(Vector2::new(3.0, -1.0));
    assert_eq!(swept.min_x, 0.0);
    assert_eq!(swept.max_x, 5.0);
    assert_eq!(swept.min_y, -1.0);
    assert_eq!(swept.max_y, 2.0);
}

#[test]
fn test_circle_bb_under_transform() {
    let geom = ShapeGeometry::circle_at(Vector2::new(1.0, 0.0), 2.0);
    let transform = Isometry2::new(Vector2::new(10.0, 5.0), 0.0);
    let bb = geom.bb(&transform);
    assert_eq!(bb, Bb::new(9.0, 3.0, 13.0, 7.0));
}

#[test]
fn test_box_bb_rotated() {
    let geom = ShapeGeometry::cuboid(2.0, 1.0);
    let transform = Isometry2::new(Vector2::zeros(), std::f32::consts::FRAC_PI_2);
    let bb = geom.bb(&transform);
    // A quarter turn swaps the half extents.
    assert!((bb.width() - 2.0).abs() < 1e-5);
    assert!((bb.height() - 4.0).abs() < 1e-5);
}
