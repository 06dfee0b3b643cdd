//! Integration tests for loom-math.

use loom_math::{Ray, Vec3};

fn unit_triangle() -> (Vec3, Vec3, Vec3) {
    (
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    )
}

// ─── Construction Tests ───────────────────────────────────────

#[test]
fn direction_is_normalized() {
    let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -5.0)).unwrap();
    assert!((ray.direction.length() - 1.0).abs() < 1e-6);
}

#[test]
fn zero_direction_rejected() {
    assert!(Ray::new(Vec3::ZERO, Vec3::ZERO).is_none());
}

// ─── Triangle Intersection Tests ──────────────────────────────

#[test]
fn hits_triangle_interior() {
    let (a, b, c) = unit_triangle();
    let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
    let hit = ray.intersect_triangle(a, b, c).unwrap();
    assert!((hit.t - 1.0).abs() < 1e-6);
    assert!((hit.u - 0.25).abs() < 1e-6);
    assert!((hit.v - 0.25).abs() < 1e-6);
    assert!((ray.at(hit.t) - Vec3::new(0.25, 0.25, 0.0)).length() < 1e-6);
}

#[test]
fn hits_back_face() {
    let (a, b, c) = unit_triangle();
    let ray = Ray::new(Vec3::new(0.25, 0.25, -1.0), Vec3::new(0.0, 0.0, 1.0)).unwrap();
    assert!(ray.intersect_triangle(a, b, c).is_some());
}

#[test]
fn misses_outside_triangle() {
    let (a, b, c) = unit_triangle();
    let ray = Ray::new(Vec3::new(0.9, 0.9, 1.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
    assert!(ray.intersect_triangle(a, b, c).is_none());
}

#[test]
fn misses_when_parallel() {
    let (a, b, c) = unit_triangle();
    let ray = Ray::new(Vec3::new(-1.0, 0.2, 0.0), Vec3::new(1.0, 0.0, 0.0)).unwrap();
    assert!(ray.intersect_triangle(a, b, c).is_none());
}

#[test]
fn rejects_hit_behind_origin() {
    let (a, b, c) = unit_triangle();
    let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, 1.0)).unwrap();
    assert!(ray.intersect_triangle(a, b, c).is_none());
}

// ─── Point Distance Tests ─────────────────────────────────────

#[test]
fn distance_to_point_perpendicular() {
    let ray = Ray::new(Vec3::ZERO, Vec3::X).unwrap();
    let d = ray.distance_to_point(Vec3::new(3.0, 2.0, 0.0));
    assert!((d - 2.0).abs() < 1e-6);
}

#[test]
fn distance_to_point_behind_origin_uses_origin() {
    let ray = Ray::new(Vec3::ZERO, Vec3::X).unwrap();
    let d = ray.distance_to_point(Vec3::new(-3.0, 4.0, 0.0));
    assert!((d - 5.0).abs() < 1e-6);
}
