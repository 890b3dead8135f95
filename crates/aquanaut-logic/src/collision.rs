//! Pool bounds and hazard-box collision for the player capsule.
//!
//! Algorithm: "clamp then block"
//! 1. Clamp the proposed capsule center into the water rectangle on X and Z,
//!    inset by the capsule radius
//! 2. Try the X change alone; reject it if the point lands inside an
//!    expanded hazard box
//! 3. Try the Z change (with the accepted X), then the Y change (with the
//!    accepted X and Z), rejecting each the same way
//!
//! Only the destination point is sampled, so a fast mover can tunnel through
//! a thin hazard, and a corner hit resolves X before Z before Y. No contact
//! state is kept between ticks.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// `min(max(v, lo), hi)`. Unlike `f32::clamp` this never panics when
/// `lo > hi`; the upper bound wins.
#[inline]
pub fn clamp_lenient(v: f32, lo: f32, hi: f32) -> f32 {
    v.max(lo).min(hi)
}

/// Axis-aligned box in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Grow by `radius` on X/Z and `half_height` on Y.
    pub fn expand(&self, radius: f32, half_height: f32) -> Aabb {
        let pad = Vec3::new(radius, half_height, radius);
        Aabb::new(self.min - pad, self.max + pad)
    }

    /// Strict containment: points on a face are outside.
    pub fn contains_strict(&self, p: Vec3) -> bool {
        p.x > self.min.x
            && p.x < self.max.x
            && p.y > self.min.y
            && p.y < self.max.y
            && p.z > self.min.z
            && p.z < self.max.z
    }

    /// Inclusive containment: points on a face are inside.
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Horizontal limits of the water volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizontalBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl HorizontalBounds {
    /// Distance from `(x, z)` to the nearest wall, zero when outside.
    pub fn wall_distance(&self, x: f32, z: f32) -> f32 {
        let dx = (x - self.min_x).min(self.max_x - x);
        let dz = (z - self.min_z).min(self.max_z - z);
        dx.min(dz).max(0.0)
    }
}

/// Allowed head-height range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerticalBounds {
    pub min_y: f32,
    pub max_y: f32,
}

impl Default for VerticalBounds {
    fn default() -> Self {
        Self {
            min_y: 1.75,
            max_y: 12.0,
        }
    }
}

impl VerticalBounds {
    pub fn mid(&self) -> f32 {
        (self.min_y + self.max_y) * 0.5
    }

    pub fn clamp(&self, y: f32) -> f32 {
        clamp_lenient(y, self.min_y, self.max_y)
    }
}

/// Push `center` inside the water rectangle, inset by `radius`.
pub fn clamp_xz_inside(center: Vec3, bounds: &HorizontalBounds, radius: f32) -> Vec3 {
    Vec3::new(
        clamp_lenient(center.x, bounds.min_x + radius, bounds.max_x - radius),
        center.y,
        clamp_lenient(center.z, bounds.min_z + radius, bounds.max_z - radius),
    )
}

/// True if `center` lies strictly inside any hazard grown by the capsule.
pub fn collides(center: Vec3, hazards: &[Aabb], radius: f32, half_height: f32) -> bool {
    hazards
        .iter()
        .any(|b| b.expand(radius, half_height).contains_strict(center))
}

/// Apply the move from `current` to `proposed` one axis at a time (X, Z, Y),
/// keeping the current value on any axis whose trial point collides.
pub fn block_by_hazards(
    current: Vec3,
    proposed: Vec3,
    hazards: &[Aabb],
    radius: f32,
    half_height: f32,
) -> Vec3 {
    let mut out = current;

    let try_x = Vec3::new(proposed.x, current.y, current.z);
    if !collides(try_x, hazards, radius, half_height) {
        out.x = proposed.x;
    }

    let try_z = Vec3::new(out.x, current.y, proposed.z);
    if !collides(try_z, hazards, radius, half_height) {
        out.z = proposed.z;
    }

    let try_y = Vec3::new(out.x, proposed.y, out.z);
    if !collides(try_y, hazards, radius, half_height) {
        out.y = proposed.y;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const R: f32 = 0.38;
    const H: f32 = 0.875;

    fn hull() -> Aabb {
        Aabb::new(Vec3::new(4.0, 0.0, -12.0), Vec3::new(10.0, 6.0, -4.0))
    }

    fn pool() -> HorizontalBounds {
        HorizontalBounds {
            min_x: -18.0,
            max_x: 18.0,
            min_z: -34.0,
            max_z: 22.0,
        }
    }

    // --- Box helpers ---

    #[test]
    fn expand_grows_each_axis() {
        let e = hull().expand(R, H);
        assert_eq!(e.min, Vec3::new(4.0 - R, -H, -12.0 - R));
        assert_eq!(e.max, Vec3::new(10.0 + R, 6.0 + H, -4.0 + R));
    }

    #[test]
    fn strict_vs_inclusive_containment() {
        let b = hull();
        let on_face = Vec3::new(4.0, 3.0, -8.0);
        assert!(!b.contains_strict(on_face));
        assert!(b.contains_point(on_face));
        assert!(b.contains_strict(b.center()));
    }

    #[test]
    fn union_covers_both() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::splat(-1.0), Vec3::splat(0.5));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::splat(-1.0));
        assert_eq!(u.max, Vec3::ONE);
    }

    #[test]
    fn wall_distance_picks_nearest_wall() {
        let b = pool();
        assert_eq!(b.wall_distance(17.0, 0.0), 1.0);
        assert_eq!(b.wall_distance(0.0, -33.5), 0.5);
        assert_eq!(b.wall_distance(30.0, 0.0), 0.0);
    }

    // --- Bounds clamping ---

    #[test]
    fn clamp_xz_insets_by_radius() {
        let p = clamp_xz_inside(Vec3::new(100.0, 2.0, -100.0), &pool(), R);
        assert!((p.x - (18.0 - R)).abs() < 1e-5);
        assert!((p.z - (-34.0 + R)).abs() < 1e-5);
        assert_eq!(p.y, 2.0);
    }

    #[test]
    fn clamp_xz_leaves_interior_points() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(clamp_xz_inside(p, &pool(), R), p);
    }

    #[test]
    fn clamp_xz_narrow_pool_does_not_panic() {
        let narrow = HorizontalBounds {
            min_x: 0.0,
            max_x: 0.5,
            min_z: 0.0,
            max_z: 0.5,
        };
        let p = clamp_xz_inside(Vec3::new(0.25, 0.0, 0.25), &narrow, R);
        assert!(p.x.is_finite() && p.z.is_finite());
    }

    #[test]
    fn vertical_clamp_inverted_range_prefers_max() {
        let b = VerticalBounds {
            min_y: 5.0,
            max_y: 3.0,
        };
        assert_eq!(b.clamp(4.0), 3.0);
    }

    // --- Hazard blocking ---

    #[test]
    fn free_move_accepted() {
        let cur = Vec3::new(0.0, 2.0, 0.0);
        let prop = Vec3::new(0.5, 2.2, -0.5);
        assert_eq!(block_by_hazards(cur, prop, &[hull()], R, H), prop);
    }

    #[test]
    fn x_blocked_z_slides() {
        // Just west of the hull, pushing east and north.
        let cur = Vec3::new(3.5, 2.0, -8.0);
        let prop = Vec3::new(3.8, 2.0, -8.3);
        let out = block_by_hazards(cur, prop, &[hull()], R, H);
        assert_eq!(out.x, cur.x, "X rejected");
        assert_eq!(out.z, prop.z, "Z accepted");
    }

    #[test]
    fn y_blocked_when_descending_onto_hull() {
        // Above the hull roof: expanded top is 6.875.
        let cur = Vec3::new(7.0, 7.0, -8.0);
        let prop = Vec3::new(7.0, 6.5, -8.0);
        let out = block_by_hazards(cur, prop, &[hull()], R, H);
        assert_eq!(out.y, 7.0);
    }

    #[test]
    fn order_is_x_then_z() {
        // Diagonal move into a corner: each axis alone is outside, but Z is
        // tested with the accepted X, so it gets rejected.
        let b = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 2.0));
        let cur = Vec3::new(-1.0, 1.0, -1.0);
        let prop = Vec3::new(0.0, 1.0, 0.0);
        let out = block_by_hazards(cur, prop, &[b], R, H);
        assert_eq!(out.x, 0.0);
        assert_eq!(out.z, -1.0);
    }

    #[test]
    fn never_ends_inside_single_axis_hazard() {
        let hazards = [hull()];
        let expanded = hull().expand(R, H);
        for i in 0..40 {
            let start_x = 2.0 + i as f32 * 0.05;
            let cur = Vec3::new(start_x, 2.0, -8.0);
            let prop = Vec3::new(start_x + 0.3, 2.0, -8.0);
            if expanded.contains_strict(cur) {
                continue;
            }
            let out = block_by_hazards(cur, prop, &hazards, R, H);
            assert!(!expanded.contains_strict(out), "ended inside at {out:?}");
        }
    }

    #[test]
    fn no_hazards_is_identity() {
        let cur = Vec3::ZERO;
        let prop = Vec3::new(1.0, -1.0, 2.0);
        assert_eq!(block_by_hazards(cur, prop, &[], R, H), prop);
    }
}
