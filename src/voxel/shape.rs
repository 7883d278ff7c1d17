//! Fill shape library for box-bounded editing tools
//!
//! A tool drag defines integer bounds; the shape decides which cells
//! inside those bounds get filled. All tests run against cell centers,
//! with extents precomputed once per fill so the per-cell work is a few
//! multiplies.

use serde::{Deserialize, Serialize};

use crate::core::types::{IVec3, Vec3};
use crate::math::GridBounds;
use super::frame::VoxelFrame;
use super::voxel::Voxel;

/// Shape profiles for fill and brush tools
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillShape {
    /// Full box
    Rect,
    /// Ellipsoid inscribed in the box
    Sphere,
    /// Vertical elliptic cylinder
    Cylinder,
    /// Octahedron (diamond) inscribed in the box
    Diamond,
    /// Circular profile narrowing to a point at the top
    Cone,
    /// Square profile narrowing to a point at the top
    Pyramid,
    /// Hexagonal prism
    Hexagon,
    /// Triangular profile narrowing along x with height
    Wedge,
}

/// Precomputed per-fill extents
///
/// Rotation is quarter turns about y; odd turns swap the x and z
/// extents so oriented shapes still fill a non-square box.
#[derive(Clone, Copy, Debug)]
pub struct FillParams {
    center: Vec3,
    radius: Vec3,
    inv_radius: Vec3,
    inv_height: f32,
    max_y: i32,
    rotation: u8,
}

impl FillParams {
    /// Precompute extents for a fill over the given bounds
    pub fn new(bounds: GridBounds, rotation: u8) -> Self {
        let size = bounds.size().as_vec3();
        let rotation = rotation & 3;
        let radius = if rotation & 1 == 1 {
            Vec3::new(size.z, size.y, size.x) * 0.5
        } else {
            size * 0.5
        };
        Self {
            center: bounds.min.as_vec3() + (size - Vec3::ONE) * 0.5,
            radius,
            inv_radius: radius.recip(),
            inv_height: size.y.recip(),
            max_y: bounds.max.y - 1,
            rotation,
        }
    }

    /// Cell offset from center, rotated into shape-local space
    fn shape_delta(&self, cell: IVec3) -> Vec3 {
        let d = cell.as_vec3() - self.center;
        let (x, z) = match self.rotation {
            0 => (d.x, d.z),
            1 => (d.z, -d.x),
            2 => (-d.x, -d.z),
            _ => (-d.z, d.x),
        };
        Vec3::new(x, d.y, z)
    }

    /// Height fraction for a cell's row: small at the top, 1.0 at the base
    fn row_fraction(&self, cell: IVec3) -> f32 {
        ((self.max_y - cell.y) as f32 + 1.0) * self.inv_height
    }
}

impl FillShape {
    /// Test whether a cell inside the fill bounds belongs to the shape
    pub fn contains(&self, params: &FillParams, cell: IVec3) -> bool {
        let d = params.shape_delta(cell);
        let nd = d * params.inv_radius;
        match self {
            FillShape::Rect => true,
            FillShape::Sphere => nd.length_squared() <= 1.0,
            FillShape::Cylinder => nd.x * nd.x + nd.z * nd.z <= 1.0,
            FillShape::Diamond => nd.x.abs() + nd.y.abs() + nd.z.abs() <= 1.0,
            FillShape::Hexagon => {
                nd.x.abs() <= 1.0 && nd.z.abs() + 0.5 * nd.x.abs() <= 1.0
            }
            FillShape::Cone => {
                let t = params.row_fraction(cell);
                nd.x * nd.x + nd.z * nd.z <= t * t
            }
            FillShape::Wedge => d.x.abs() <= params.radius.x * params.row_fraction(cell) - 0.5,
            FillShape::Pyramid => {
                // Both axes step in by the same whole-cell inset per row so
                // the silhouette stays symmetric even on non-square bases
                let t = params.row_fraction(cell);
                let inset = (params.radius.x.min(params.radius.z) * (1.0 - t)).floor();
                d.x.abs() <= params.radius.x - 0.5 - inset
                    && d.z.abs() <= params.radius.z - 0.5 - inset
            }
        }
    }
}

/// Stamp a shape into a frame, writing `value` to every contained cell.
///
/// Cells outside the frame are skipped. Returns the number of cells
/// written.
pub fn stamp(
    shape: FillShape,
    bounds: GridBounds,
    rotation: u8,
    value: Voxel,
    frame: &mut VoxelFrame,
) -> usize {
    let params = FillParams::new(bounds, rotation);
    let target = bounds.intersection(&frame.bounds());
    let mut count = 0;
    for cell in target.iter() {
        if shape.contains(&params, cell) {
            frame.set(cell, value);
            count += 1;
        }
    }
    count
}
