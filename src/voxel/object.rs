//! Voxel objects: named, positioned voxel grids

use crate::core::types::{IVec3, UVec3};
use crate::math::GridBounds;
use super::store::ChunkStore;
use super::voxel::Voxel;

/// Stable identifier for a voxel object within a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

/// One object in the scene: a chunked voxel grid plus metadata
///
/// The object's grid starts at local (0,0,0); `position` places that
/// origin on the shared world grid for compositing.
#[derive(Clone, Debug)]
pub struct VoxelObject {
    pub id: ObjectId,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    /// World-grid position of the object's local origin
    pub position: IVec3,
    store: ChunkStore,
}

impl VoxelObject {
    /// Create an empty object with the given grid dimensions
    pub fn new(id: ObjectId, name: impl Into<String>, dims: UVec3) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            locked: false,
            position: IVec3::ZERO,
            store: ChunkStore::new(dims),
        }
    }

    /// Get the grid dimensions
    pub fn dims(&self) -> UVec3 {
        self.store.dims()
    }

    /// Access the chunk store
    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    /// Mutable access to the chunk store
    pub fn store_mut(&mut self) -> &mut ChunkStore {
        &mut self.store
    }

    /// Read a voxel at a world-grid position
    pub fn get_world(&self, world: IVec3) -> Voxel {
        self.store.get(world - self.position)
    }

    /// Object extent on the world grid
    pub fn world_bounds(&self) -> GridBounds {
        GridBounds::from_min_size(self.position, self.dims())
    }

    /// Check if any cell is selected
    pub fn has_selection(&self) -> bool {
        self.store.count_selected() > 0
    }

    /// Bounds of the selected cells in object-local coordinates
    pub fn selection_bounds(&self) -> GridBounds {
        let mut bounds = GridBounds::default();
        for chunk in self.store.chunks() {
            for (pos, _) in chunk.selection().iter_non_empty() {
                bounds.expand_to_include(pos);
            }
        }
        bounds
    }
}
