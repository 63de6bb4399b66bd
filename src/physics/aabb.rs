//! Axis-aligned bounding boxes.
//!
//! Plain data plus free functions; the physics world uses them as a cheap
//! broad phase before triangle contact queries.

use glam::{Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

/// Create AABB from min/max points
pub fn create_aabb(min: Vec3, max: Vec3) -> AABB {
    AABB { min, max }
}

/// Create AABB from center point and half extents
pub fn aabb_from_center_half_extents(center: Vec3, half_extents: Vec3) -> AABB {
    AABB {
        min: center - half_extents,
        max: center + half_extents,
    }
}

/// Smallest AABB containing a triangle
pub fn aabb_from_triangle(tri: &[Vec3; 3]) -> AABB {
    AABB {
        min: tri[0].min(tri[1]).min(tri[2]),
        max: tri[0].max(tri[1]).max(tri[2]),
    }
}

pub fn aabb_center(aabb: &AABB) -> Vec3 {
    (aabb.min + aabb.max) * 0.5
}

pub fn aabb_half_extents(aabb: &AABB) -> Vec3 {
    (aabb.max - aabb.min) * 0.5
}

pub fn aabb_intersects(a: &AABB, b: &AABB) -> bool {
    a.min.cmple(b.max).all() && a.max.cmpge(b.min).all()
}

pub fn aabb_contains_point(aabb: &AABB, point: Vec3) -> bool {
    point.cmpge(aabb.min).all() && point.cmple(aabb.max).all()
}

pub fn aabb_translated(aabb: &AABB, offset: Vec3) -> AABB {
    AABB {
        min: aabb.min + offset,
        max: aabb.max + offset,
    }
}

/// Grow every face outward by `margin`
pub fn aabb_expanded(aabb: &AABB, margin: f32) -> AABB {
    AABB {
        min: aabb.min - Vec3::splat(margin),
        max: aabb.max + Vec3::splat(margin),
    }
}

/// World bounds of a local box after rotation and translation
pub fn aabb_transformed(aabb: &AABB, rotation: Quat, translation: Vec3) -> AABB {
    let center = rotation * aabb_center(aabb) + translation;
    let half = aabb_half_extents(aabb);
    let m = glam::Mat3::from_quat(rotation);
    let extent = Vec3::new(
        m.row(0).abs().dot(half),
        m.row(1).abs().dot(half),
        m.row(2).abs().dot(half),
    );
    aabb_from_center_half_extents(center, extent)
}

pub fn aabb_union(a: &AABB, b: &AABB) -> AABB {
    AABB {
        min: a.min.min(b.min),
        max: a.max.max(b.max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection_and_containment() {
        let a = aabb_from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        let b = aabb_translated(&a, Vec3::new(1.5, 0.0, 0.0));
        let c = aabb_translated(&a, Vec3::new(3.0, 0.0, 0.0));

        assert!(aabb_intersects(&a, &b));
        assert!(!aabb_intersects(&a, &c));
        assert!(aabb_contains_point(&a, Vec3::new(0.5, -0.5, 1.0)));
        assert!(!aabb_contains_point(&a, Vec3::new(0.5, -1.5, 0.0)));
    }

    #[test]
    fn test_rotated_box_grows() {
        let a = aabb_from_center_half_extents(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0));
        let rotated = aabb_transformed(
            &a,
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_4),
            Vec3::new(0.0, 5.0, 0.0),
        );
        let half = aabb_half_extents(&rotated);
        assert!((half.x - std::f32::consts::SQRT_2).abs() < 1e-5);
        assert!((half.y - 1.0).abs() < 1e-5);
        assert!((aabb_center(&rotated) - Vec3::new(0.0, 5.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_union_and_expand() {
        let a = create_aabb(Vec3::ZERO, Vec3::ONE);
        let b = create_aabb(Vec3::splat(2.0), Vec3::splat(3.0));
        let u = aabb_union(&a, &b);
        assert_eq!(u.min, Vec3::ZERO);
        assert_eq!(u.max, Vec3::splat(3.0));
        let e = aabb_expanded(&a, 0.5);
        assert_eq!(e.min, Vec3::splat(-0.5));
    }
}
