//! Collision detection and response for triangle actors
//!
//! Every actor shares one silhouette, a unit triangle. Detection is a
//! separating axis test over the six edge normals of two world-space
//! triangles; response is a single impulse plus partial positional
//! correction, weighted by inverse mass.

use glam::Vec2;

use super::actor::Transform;
use crate::consts::{CORRECTION_PERCENT, PENETRATION_SLOP, RESTITUTION};

/// Triangle with a diameter of ~1, counter-clockwise
pub const UNIT_TRIANGLE: [Vec2; 3] = [
    Vec2::new(0.5, 0.0),
    Vec2::new(-0.25, 0.433),
    Vec2::new(-0.25, -0.433),
];

pub type Triangle = [Vec2; 3];

/// The unit triangle placed by `transform`.
pub fn world_triangle(transform: &Transform) -> Triangle {
    let model = transform.model_2d();
    UNIT_TRIANGLE.map(|p| model.transform_point2(p))
}

/// Result of a triangle/triangle test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Whether the triangles overlap (touching counts)
    pub hit: bool,
    /// Unit normal of the minimum translation axis, pointing from the
    /// origin actor toward the other one
    pub normal: Vec2,
    /// Overlap along `normal`
    pub depth: f32,
    /// Whether the first triangle passed in is the normal's origin
    pub a_is_origin: bool,
}

impl Intersection {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            depth: 0.0,
            a_is_origin: true,
        }
    }
}

/// Outward normal of edge p1→p2 for a counter-clockwise triangle
#[inline]
fn edge_normal(p1: Vec2, p2: Vec2) -> Vec2 {
    let d = (p2 - p1).normalize_or_zero();
    Vec2::new(d.y, -d.x)
}

#[inline]
fn project(tri: &Triangle, axis: Vec2) -> (f32, f32) {
    tri.iter().fold((f32::MAX, f32::MIN), |(lo, hi), p| {
        let d = p.dot(axis);
        (lo.min(d), hi.max(d))
    })
}

/// Overlap length of both projections on `axis`, `None` when separated.
/// Touching intervals count as overlapping.
#[inline]
fn axis_overlap(t1: &Triangle, t2: &Triangle, axis: Vec2) -> Option<f32> {
    let (min1, max1) = project(t1, axis);
    let (min2, max2) = project(t2, axis);

    if max2 >= min1 && max1 >= min2 {
        Some(max1.min(max2) - min1.max(min2))
    } else {
        None
    }
}

/// Separating axis test between triangles `a` and `b`.
///
/// `a_ref` and `b_ref` are the actors' positions, used to orient the normal
/// so it always points from the origin actor toward the other. Degenerate
/// edges (zero-scale actors) contribute no axis; two fully degenerate
/// triangles never intersect.
pub fn intersect(a_ref: Vec2, b_ref: Vec2, a: &Triangle, b: &Triangle) -> Intersection {
    let mut depth = f32::MAX;
    let mut normal = Vec2::ZERO;
    let mut a_is_origin = true;

    for (owner_is_a, tri) in [(true, a), (false, b)] {
        for i in 0..3 {
            let axis = edge_normal(tri[i], tri[(i + 1) % 3]);
            if axis == Vec2::ZERO {
                continue;
            }
            let Some(overlap) = axis_overlap(a, b, axis) else {
                return Intersection::miss();
            };
            if overlap < depth {
                depth = overlap;
                normal = axis;
                a_is_origin = owner_is_a;
            }
        }
    }

    if normal == Vec2::ZERO {
        return Intersection::miss();
    }

    let dir = if a_is_origin { b_ref - a_ref } else { a_ref - b_ref };
    if normal.dot(dir) < 0.0 {
        a_is_origin = !a_is_origin;
    }

    Intersection {
        hit: true,
        normal,
        depth,
        a_is_origin,
    }
}

/// `1 / mass`, or zero for immovable actors
#[inline]
pub fn inverse_mass(mass: f32) -> f32 {
    if mass > 0.0 { 1.0 / mass } else { 0.0 }
}

/// Tunables for the contact response
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactParams {
    pub restitution: f32,
    pub slop: f32,
    pub correction_percent: f32,
}

impl Default for ContactParams {
    fn default() -> Self {
        Self {
            restitution: RESTITUTION,
            slop: PENETRATION_SLOP,
            correction_percent: CORRECTION_PERCENT,
        }
    }
}

/// The slice of actor state the resolver touches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub linear: Vec2,
    pub mass: f32,
}

/// Apply impulse and positional correction to a colliding pair.
///
/// `first` must be the normal's origin. Returns `false` and leaves both
/// bodies untouched when neither can move.
pub fn resolve(
    hit: &Intersection,
    first: &mut Body,
    second: &mut Body,
    params: &ContactParams,
) -> bool {
    let inv1 = inverse_mass(first.mass);
    let inv2 = inverse_mass(second.mass);
    let sum_inv = inv1 + inv2;

    if sum_inv == 0.0 {
        return false;
    }

    let n = hit.normal;
    let vel_along_normal = (second.linear - first.linear).dot(n);

    // Only bounce when approaching
    if vel_along_normal < 0.0 {
        let j = -(1.0 + params.restitution) * vel_along_normal / sum_inv;
        let impulse = n * j;
        first.linear -= impulse * inv1;
        second.linear += impulse * inv2;
    }

    let correction_mag = (hit.depth - params.slop).max(0.0) / sum_inv * params.correction_percent;
    let correction = n * correction_mag;
    first.position -= correction * inv1;
    second.position += correction * inv2;

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri_at(x: f32, y: f32) -> (Vec2, Triangle) {
        let t = Transform::at(Vec2::new(x, y));
        (t.position, world_triangle(&t))
    }

    #[test]
    fn test_identical_triangles_overlap() {
        let (pa, a) = tri_at(0.0, 0.0);
        let (pb, b) = tri_at(0.0, 0.0);
        let hit = intersect(pa, pb, &a, &b);
        assert!(hit.hit);
        assert!(hit.depth > 0.0);
        assert!((hit.normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_far_triangles_miss() {
        let (pa, a) = tri_at(0.0, 0.0);
        let (pb, b) = tri_at(10.0, 0.0);
        let hit = intersect(pa, pb, &a, &b);
        assert!(!hit.hit);
        assert_eq!(hit.depth, 0.0);
    }

    #[test]
    fn test_touching_triangles_count() {
        // Tip of A (x = 0.5) rests exactly on B's back edge (-0.25 + 0.75)
        let (pa, a) = tri_at(0.0, 0.0);
        let (pb, b) = tri_at(0.75, 0.0);
        let hit = intersect(pa, pb, &a, &b);
        assert!(hit.hit);
        assert!(hit.depth.abs() < 1e-4);
        assert!(hit.normal.x.abs() > 0.999);

        // Normal points from the origin actor toward the other one
        let (from, to) = if hit.a_is_origin { (pa, pb) } else { (pb, pa) };
        assert!(hit.normal.dot(to - from) >= 0.0);
    }

    #[test]
    fn test_normal_points_away_from_origin() {
        let (pa, a) = tri_at(0.0, 0.0);
        let (pb, b) = tri_at(0.3, 0.2);
        for (p1, p2, t1, t2) in [(pa, pb, &a, &b), (pb, pa, &b, &a)] {
            let hit = intersect(p1, p2, t1, t2);
            assert!(hit.hit);
            let (from, to) = if hit.a_is_origin { (p1, p2) } else { (p2, p1) };
            assert!(hit.normal.dot(to - from) >= 0.0);
        }
    }

    #[test]
    fn test_rotated_triangles_separated_by_b_axis() {
        let a = Transform::at(Vec2::ZERO);
        let b = Transform {
            position: Vec2::new(0.9, 0.0),
            rotation: std::f32::consts::PI,
            ..Default::default()
        };
        // Two tips facing each other, 0.9 apart with 0.5 reach each: overlap
        let hit = intersect(a.position, b.position, &world_triangle(&a), &world_triangle(&b));
        assert!(hit.hit);

        let b = Transform {
            position: Vec2::new(1.1, 0.0),
            ..b
        };
        let hit = intersect(a.position, b.position, &world_triangle(&a), &world_triangle(&b));
        assert!(!hit.hit);
    }

    #[test]
    fn test_zero_scale_keeps_unit_normal() {
        let point = Transform {
            scale: Vec2::ZERO,
            ..Transform::at(Vec2::new(0.05, 0.0))
        };
        let (pb, b) = tri_at(0.0, 0.0);

        let hit = intersect(point.position, pb, &world_triangle(&point), &b);
        assert!(hit.hit);
        assert!((hit.normal.length() - 1.0).abs() < 1e-5);

        let far = Transform {
            position: Vec2::new(5.0, 0.0),
            ..point
        };
        assert!(!intersect(far.position, pb, &world_triangle(&far), &b).hit);

        // Two points at the same spot have no axis to separate on
        let tri = world_triangle(&point);
        let hit = intersect(point.position, point.position, &tri, &tri);
        assert!(!hit.hit);
        assert_eq!(hit.normal, Vec2::ZERO);
    }

    #[test]
    fn test_resolve_bounces_with_restitution() {
        let params = ContactParams::default();
        let hit = Intersection {
            hit: true,
            normal: Vec2::X,
            depth: 0.2,
            a_is_origin: true,
        };
        let mut a = Body {
            position: Vec2::ZERO,
            linear: Vec2::new(3.0, 0.0),
            mass: 1.0,
        };
        let mut b = Body {
            position: Vec2::new(0.5, 0.0),
            linear: Vec2::new(-1.0, 0.0),
            mass: 2.0,
        };

        let before = (b.linear - a.linear).dot(hit.normal);
        assert!(resolve(&hit, &mut a, &mut b, &params));
        let after = (b.linear - a.linear).dot(hit.normal);

        assert!(before < 0.0);
        assert!(after >= -params.restitution * before - 1e-5);
        // Momentum is conserved by the impulse
        let p_before = Vec2::new(3.0, 0.0) * 1.0 + Vec2::new(-1.0, 0.0) * 2.0;
        let p_after = a.linear * a.mass + b.linear * b.mass;
        assert!((p_before - p_after).length() < 1e-5);
        // Pushed apart, lighter body moves further
        assert!(a.position.x < 0.0 && b.position.x > 0.5);
        assert!(a.position.x.abs() > (b.position.x - 0.5).abs());
    }

    #[test]
    fn test_resolve_separating_only_corrects_position() {
        let hit = Intersection {
            hit: true,
            normal: Vec2::Y,
            depth: 0.11,
            a_is_origin: true,
        };
        let mut a = Body {
            position: Vec2::ZERO,
            linear: Vec2::new(0.0, -1.0),
            mass: 1.0,
        };
        let mut b = Body {
            position: Vec2::new(0.0, 0.4),
            linear: Vec2::new(0.0, 1.0),
            mass: 1.0,
        };
        resolve(&hit, &mut a, &mut b, &ContactParams::default());
        assert_eq!(a.linear, Vec2::new(0.0, -1.0));
        assert_eq!(b.linear, Vec2::new(0.0, 1.0));
        // (0.11 - 0.01) / 2 * 0.6 = 0.03 each
        assert!((a.position.y + 0.03).abs() < 1e-5);
        assert!((b.position.y - 0.43).abs() < 1e-5);
    }

    #[test]
    fn test_resolve_skips_two_static_bodies() {
        let hit = Intersection {
            hit: true,
            normal: Vec2::X,
            depth: 0.5,
            a_is_origin: true,
        };
        let mut a = Body {
            position: Vec2::ZERO,
            linear: Vec2::X,
            mass: 0.0,
        };
        let mut b = Body {
            position: Vec2::X,
            linear: -Vec2::X,
            mass: -1.0,
        };
        let (a0, b0) = (a, b);
        assert!(!resolve(&hit, &mut a, &mut b, &ContactParams::default()));
        assert_eq!((a, b), (a0, b0));
    }

    #[test]
    fn test_static_body_does_not_move() {
        let hit = Intersection {
            hit: true,
            normal: Vec2::X,
            depth: 0.3,
            a_is_origin: true,
        };
        let mut wall = Body {
            position: Vec2::ZERO,
            linear: Vec2::ZERO,
            mass: 0.0,
        };
        let mut ball = Body {
            position: Vec2::new(0.5, 0.0),
            linear: Vec2::new(-2.0, 0.0),
            mass: 1.0,
        };
        resolve(&hit, &mut wall, &mut ball, &ContactParams::default());
        assert_eq!(wall.position, Vec2::ZERO);
        assert_eq!(wall.linear, Vec2::ZERO);
        assert!((ball.linear.x - 1.0).abs() < 1e-5);
    }
}
