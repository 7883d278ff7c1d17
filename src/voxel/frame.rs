//! Rectangular voxel patches
//!
//! A [`VoxelFrame`] is a dense, row-major box of voxels anchored at a
//! grid position. Chunks, previews, selection masks, diffs, and lifted
//! selections are all frames; the codec and remote sync move frames as
//! flat byte buffers.

use crate::core::types::{IVec3, UVec3, Result};
use crate::core::Error;
use crate::math::GridBounds;
use super::voxel::Voxel;

/// Dense box of voxels with a world-grid anchor
///
/// Layout is row-major with x outermost: `index = x*dy*dz + y*dz + z`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelFrame {
    min_pos: IVec3,
    dims: UVec3,
    data: Vec<Voxel>,
}

impl VoxelFrame {
    /// Create an empty (all-air) frame
    pub fn new(min_pos: IVec3, dims: UVec3) -> Self {
        Self {
            min_pos,
            dims,
            data: vec![Voxel::EMPTY; volume_of(dims)],
        }
    }

    /// Create a frame covering the given bounds
    pub fn from_bounds(bounds: GridBounds) -> Self {
        Self::new(bounds.min, bounds.size())
    }

    /// Create a frame from raw bytes; length must equal the frame volume
    pub fn from_bytes(min_pos: IVec3, dims: UVec3, bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() != volume_of(dims) {
            return Err(Error::Voxel(format!(
                "frame data length {} does not match dims {}x{}x{}",
                bytes.len(),
                dims.x,
                dims.y,
                dims.z
            )));
        }
        Ok(Self {
            min_pos,
            dims,
            data: bytemuck::cast_vec(bytes),
        })
    }

    /// Get the anchor (minimum corner) position
    pub fn min_pos(&self) -> IVec3 {
        self.min_pos
    }

    /// Get the frame dimensions
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    /// Get frame extent as grid bounds
    pub fn bounds(&self) -> GridBounds {
        GridBounds::from_min_size(self.min_pos, self.dims)
    }

    /// Number of cells
    pub fn volume(&self) -> usize {
        self.data.len()
    }

    /// Check if a world position falls inside the frame
    pub fn contains(&self, pos: IVec3) -> bool {
        let local = pos - self.min_pos;
        local.x >= 0 && (local.x as u32) < self.dims.x &&
        local.y >= 0 && (local.y as u32) < self.dims.y &&
        local.z >= 0 && (local.z as u32) < self.dims.z
    }

    fn index_of(&self, pos: IVec3) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        let local = (pos - self.min_pos).as_uvec3();
        Some(
            (local.x * self.dims.y * self.dims.z + local.y * self.dims.z + local.z) as usize,
        )
    }

    /// Read a voxel; out-of-range positions read as empty
    pub fn get(&self, pos: IVec3) -> Voxel {
        match self.index_of(pos) {
            Some(i) => self.data[i],
            None => Voxel::EMPTY,
        }
    }

    /// Write a voxel; out-of-range positions are a no-op.
    ///
    /// Returns true if the stored value changed.
    pub fn set(&mut self, pos: IVec3, v: Voxel) -> bool {
        match self.index_of(pos) {
            Some(i) if self.data[i] != v => {
                self.data[i] = v;
                true
            }
            _ => false,
        }
    }

    /// Fill every cell with the same value
    pub fn fill(&mut self, v: Voxel) {
        self.data.fill(v);
    }

    /// Reset every cell to empty
    pub fn clear(&mut self) {
        self.data.fill(Voxel::EMPTY);
    }

    /// Count cells with a non-zero block type
    pub fn count_non_empty(&self) -> usize {
        self.data.iter().filter(|v| !v.is_empty()).count()
    }

    /// Check if every cell is empty
    pub fn is_all_empty(&self) -> bool {
        self.data.iter().all(|v| v.is_empty())
    }

    /// Iterate all cells as (world position, value)
    pub fn cells(&self) -> impl Iterator<Item = (IVec3, Voxel)> + '_ {
        self.bounds().iter().map(move |pos| (pos, self.get(pos)))
    }

    /// Iterate non-empty cells as (world position, value)
    pub fn iter_non_empty(&self) -> impl Iterator<Item = (IVec3, Voxel)> + '_ {
        self.cells().filter(|(_, v)| !v.is_empty())
    }

    /// Reshape to a new anchor and dimensions, keeping overlapping cells
    pub fn resize(&mut self, min_pos: IVec3, dims: UVec3) {
        let mut next = VoxelFrame::new(min_pos, dims);
        let overlap = self.bounds().intersection(&next.bounds());
        for pos in overlap.iter() {
            next.set(pos, self.get(pos));
        }
        *self = next;
    }

    /// View cell data as raw bytes (codec input)
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

fn volume_of(dims: UVec3) -> usize {
    dims.x as usize * dims.y as usize * dims.z as usize
}
