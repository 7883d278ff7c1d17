//! Grid raycasting for cursor picking
//!
//! Integer DDA walk in the style of Amanatides-Woo: track the ray
//! parameter at which each axis next crosses a cell boundary and always
//! advance the nearest crossing. Rays that traverse the grid without
//! stopping still produce a synthetic boundary hit so build tools always
//! have a cell to anchor on.

use crate::core::types::{IVec3, UVec3};
use crate::math::Ray;
use super::voxel::Voxel;

/// Result of a pick ray walk
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RaycastHit {
    /// Hit cell, always inside the grid
    pub grid_pos: IVec3,
    /// Face normal the ray arrived through
    pub normal: IVec3,
    /// Stored voxel for real hits, [`Voxel::BOUNDARY`] for synthetic ones
    pub value: Voxel,
}

impl RaycastHit {
    /// Check if this is a synthetic boundary hit rather than a solid cell
    pub fn is_boundary(&self) -> bool {
        self.value == Voxel::BOUNDARY
    }
}

/// Walk a ray through the grid and return the first raycastable cell.
///
/// `lookup` resolves a grid position to its effective voxel; ghost cells
/// (raycast-excluded) are stepped through. When the walk exits the far
/// side of the grid, the last in-bounds cell comes back as a boundary
/// hit with the exit face normal. When the ray never enters the grid at
/// all, the six bounding planes are tested and the nearest front-facing
/// one produces the boundary hit instead.
pub fn raycast(
    ray: Ray,
    dims: UVec3,
    max_distance: f32,
    lookup: impl Fn(IVec3) -> Voxel,
) -> Option<RaycastHit> {
    if ray.direction.length_squared() < 1e-12 {
        return None;
    }
    let bounds_max = dims.as_ivec3() - IVec3::ONE;
    let in_bounds = |c: IVec3| {
        c.x >= 0 && c.y >= 0 && c.z >= 0
            && c.x <= bounds_max.x && c.y <= bounds_max.y && c.z <= bounds_max.z
    };

    let mut cell = ray.origin.floor().as_ivec3();
    let mut step = IVec3::ZERO;
    let mut t_max = [f32::INFINITY; 3];
    let mut t_delta = [f32::INFINITY; 3];
    for axis in 0..3 {
        let d = ray.direction[axis];
        if d > 1e-8 {
            step[axis] = 1;
            t_delta[axis] = 1.0 / d;
            t_max[axis] = (cell[axis] as f32 + 1.0 - ray.origin[axis]) / d;
        } else if d < -1e-8 {
            step[axis] = -1;
            t_delta[axis] = -1.0 / d;
            t_max[axis] = (ray.origin[axis] - cell[axis] as f32) * t_delta[axis];
        }
    }
    if step == IVec3::ZERO {
        return None;
    }

    let mut was_inside = in_bounds(cell);
    if was_inside {
        let v = lookup(cell);
        if v.is_raycastable() {
            return Some(RaycastHit {
                grid_pos: cell,
                normal: start_cell_normal(&ray, cell, step),
                value: v,
            });
        }
    }

    let max_steps = ((dims.x + dims.y + dims.z) * 2 + 16) as usize;
    for _ in 0..max_steps {
        let axis = nearest_axis(&t_max);
        let t = t_max[axis];
        if t > max_distance {
            return None;
        }
        cell[axis] += step[axis];
        t_max[axis] += t_delta[axis];

        if in_bounds(cell) {
            was_inside = true;
            let v = lookup(cell);
            if v.is_raycastable() {
                return Some(RaycastHit {
                    grid_pos: cell,
                    normal: axis_normal(axis, -step[axis]),
                    value: v,
                });
            }
        } else if was_inside {
            // Walked out the far side: clamp back to the last boundary cell
            return Some(RaycastHit {
                grid_pos: cell.clamp(IVec3::ZERO, bounds_max),
                normal: axis_normal(axis, -step[axis]),
                value: Voxel::BOUNDARY,
            });
        }
    }

    if !was_inside {
        // Never reached the grid within the step budget; intersect the
        // bounding planes directly
        if let Some((t, normal)) = ray.entry_into_grid(dims) {
            if t <= max_distance {
                let grid_pos = ray.at(t).floor().as_ivec3().clamp(IVec3::ZERO, bounds_max);
                return Some(RaycastHit {
                    grid_pos,
                    normal,
                    value: Voxel::BOUNDARY,
                });
            }
        }
    }

    None
}

fn nearest_axis(t_max: &[f32; 3]) -> usize {
    let mut axis = 0;
    if t_max[1] < t_max[axis] {
        axis = 1;
    }
    if t_max[2] < t_max[axis] {
        axis = 2;
    }
    axis
}

fn axis_normal(axis: usize, sign: i32) -> IVec3 {
    let mut n = IVec3::ZERO;
    n[axis] = sign;
    n
}

/// Normal for a hit on the cell the ray starts in.
///
/// Uses the face the ray crossed most recently: the stepping axis with
/// the greatest entry parameter. With the origin inside the cell all
/// entry parameters sit at or below zero, so the greatest one is the
/// best available face.
fn start_cell_normal(ray: &Ray, cell: IVec3, step: IVec3) -> IVec3 {
    let mut best_axis = None;
    let mut best_t = f32::NEG_INFINITY;
    for axis in 0..3 {
        if step[axis] == 0 {
            continue;
        }
        let plane = if step[axis] > 0 {
            cell[axis] as f32
        } else {
            cell[axis] as f32 + 1.0
        };
        let t = (plane - ray.origin[axis]) / ray.direction[axis];
        if t > best_t {
            best_t = t;
            best_axis = Some(axis);
        }
    }
    match best_axis {
        Some(axis) => axis_normal(axis, -step[axis]),
        None => IVec3::ZERO,
    }
}
