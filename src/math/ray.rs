//! Ray type and operations

use crate::core::types::{IVec3, UVec3, Vec3};

/// A ray defined by origin and direction
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    /// Precomputed 1/direction for fast slab intersection
    pub inv_direction: Vec3,
}

impl Ray {
    /// Create a new ray (direction should be normalized)
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            inv_direction: Vec3::new(
                1.0 / direction.x,
                1.0 / direction.y,
                1.0 / direction.z,
            ),
        }
    }

    /// Get point along ray at parameter t
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Intersect against the grid box [0, dims] using the slab method.
    ///
    /// Returns the entry parameter and the outward normal of the entered
    /// face. Only entries in front of the origin count; a ray starting
    /// inside the box has no front-facing entry plane and returns None.
    pub fn entry_into_grid(&self, dims: UVec3) -> Option<(f32, IVec3)> {
        let max = dims.as_vec3();
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        let mut entry_axis = 0usize;

        for axis in 0..3 {
            let o = self.origin[axis];
            let d = self.direction[axis];
            if d.abs() < 1e-8 {
                if o < 0.0 || o > max[axis] {
                    return None;
                }
                continue;
            }
            let inv = self.inv_direction[axis];
            let mut t1 = (0.0 - o) * inv;
            let mut t2 = (max[axis] - o) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            if t1 > t_near {
                t_near = t1;
                entry_axis = axis;
            }
            t_far = t_far.min(t2);
        }

        if t_near > t_far || t_near < 0.0 {
            return None;
        }

        let mut normal = IVec3::ZERO;
        normal[entry_axis] = if self.direction[entry_axis] > 0.0 { -1 } else { 1 };
        Some((t_near, normal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(ray.at(5.0), Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_entry_from_outside() {
        let ray = Ray::new(Vec3::new(-2.0, 8.0, 8.0), Vec3::X);
        let (t, normal) = ray.entry_into_grid(UVec3::splat(16)).unwrap();
        assert!((t - 2.0).abs() < 0.001);
        assert_eq!(normal, IVec3::new(-1, 0, 0));
    }

    #[test]
    fn test_entry_from_above() {
        let ray = Ray::new(Vec3::new(8.0, 20.0, 8.0), Vec3::NEG_Y);
        let (t, normal) = ray.entry_into_grid(UVec3::splat(16)).unwrap();
        assert!((t - 4.0).abs() < 0.001);
        assert_eq!(normal, IVec3::new(0, 1, 0));
    }

    #[test]
    fn test_entry_miss() {
        let ray = Ray::new(Vec3::new(-2.0, 40.0, 8.0), Vec3::X);
        assert!(ray.entry_into_grid(UVec3::splat(16)).is_none());
    }

    #[test]
    fn test_no_entry_from_inside() {
        let ray = Ray::new(Vec3::splat(8.0), Vec3::X);
        assert!(ray.entry_into_grid(UVec3::splat(16)).is_none());
    }

    #[test]
    fn test_entry_axis_parallel() {
        let ray = Ray::new(Vec3::new(-3.0, 8.0, 8.0), Vec3::new(1.0, 0.0, 0.0));
        let (_, normal) = ray.entry_into_grid(UVec3::new(16, 16, 16)).unwrap();
        assert_eq!(normal, IVec3::new(-1, 0, 0));
    }
}
