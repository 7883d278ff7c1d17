//! Chunk partitions of a voxel object's grid

use crate::core::types::{IVec3, UVec3};
use crate::math::GridBounds;
use super::frame::VoxelFrame;
use super::voxel::Voxel;

/// Number of voxels per chunk side
pub const CHUNK_SIZE: u32 = 16;

/// Integer coordinate identifying a chunk within an object's grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkCoord {
    /// Create a new chunk coordinate
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Convert a voxel position to the coordinate of its containing chunk
    pub fn from_voxel_pos(pos: IVec3) -> Self {
        let size = CHUNK_SIZE as i32;
        Self {
            x: pos.x.div_euclid(size),
            y: pos.y.div_euclid(size),
            z: pos.z.div_euclid(size),
        }
    }

    /// Get the minimum voxel position covered by this chunk
    pub fn min_pos(&self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z) * CHUNK_SIZE as i32
    }
}

/// A chunk of an object's voxel grid
///
/// Chunks on the high edges of an object are clamped so the chunk grid
/// exactly tiles the object dimensions. Each chunk carries its own
/// selection mask frame and two version counters so the mesher can skip
/// unchanged chunks and take a selection-only fast path.
#[derive(Clone, Debug)]
pub struct Chunk {
    /// Coordinate of this chunk within its object
    pub coord: ChunkCoord,
    voxels: VoxelFrame,
    selection: VoxelFrame,
    data_version: u64,
    selection_version: u64,
}

impl Chunk {
    /// Create an empty chunk, clamping extent to the object dimensions
    pub fn new(coord: ChunkCoord, object_dims: UVec3) -> Self {
        let min = coord.min_pos();
        let dims = clamped_chunk_dims(min, object_dims);
        Self {
            coord,
            voxels: VoxelFrame::new(min, dims),
            selection: VoxelFrame::new(min, dims),
            data_version: 0,
            selection_version: 0,
        }
    }

    /// Get the minimum voxel position of this chunk
    pub fn min_pos(&self) -> IVec3 {
        self.voxels.min_pos()
    }

    /// Get the clamped chunk dimensions
    pub fn dims(&self) -> UVec3 {
        self.voxels.dims()
    }

    /// Get chunk extent in the object grid
    pub fn bounds(&self) -> GridBounds {
        self.voxels.bounds()
    }

    /// Read a voxel at an object-grid position
    pub fn get(&self, pos: IVec3) -> Voxel {
        self.voxels.get(pos)
    }

    /// Write a voxel at an object-grid position.
    ///
    /// Returns true and bumps the data version if the value changed.
    pub fn set(&mut self, pos: IVec3, v: Voxel) -> bool {
        let changed = self.voxels.set(pos, v);
        if changed {
            self.data_version += 1;
        }
        changed
    }

    /// Check if every cell is empty
    pub fn is_all_empty(&self) -> bool {
        self.voxels.is_all_empty()
    }

    /// Count non-empty cells
    pub fn count_non_empty(&self) -> usize {
        self.voxels.count_non_empty()
    }

    /// Access the voxel frame
    pub fn voxels(&self) -> &VoxelFrame {
        &self.voxels
    }

    /// Check if a cell is selected
    pub fn is_selected(&self, pos: IVec3) -> bool {
        !self.selection.get(pos).is_empty()
    }

    /// Mark or unmark a cell in the selection mask.
    ///
    /// Returns true and bumps the selection version if the mask changed.
    pub fn set_selected(&mut self, pos: IVec3, selected: bool) -> bool {
        let v = if selected { Voxel::new(1) } else { Voxel::EMPTY };
        let changed = self.selection.set(pos, v);
        if changed {
            self.selection_version += 1;
        }
        changed
    }

    /// Clear the selection mask
    pub fn clear_selection(&mut self) {
        if !self.selection.is_all_empty() {
            self.selection.clear();
            self.selection_version += 1;
        }
    }

    /// Access the selection mask frame
    pub fn selection(&self) -> &VoxelFrame {
        &self.selection
    }

    /// Version counter for voxel data
    pub fn data_version(&self) -> u64 {
        self.data_version
    }

    /// Version counter for the selection mask
    pub fn selection_version(&self) -> u64 {
        self.selection_version
    }
}

/// Chunk dimensions at `min`, clamped against the object's dimensions
pub fn clamped_chunk_dims(min: IVec3, object_dims: UVec3) -> UVec3 {
    let d = object_dims.as_ivec3();
    let size = CHUNK_SIZE as i32;
    IVec3::new(
        size.min(d.x - min.x).max(0),
        size.min(d.y - min.y).max(0),
        size.min(d.z - min.z).max(0),
    )
    .as_uvec3()
}
