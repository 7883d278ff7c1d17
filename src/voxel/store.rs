//! Chunk store managing one object's voxel grid

use std::collections::HashMap;

use crate::core::types::{IVec3, UVec3};
use crate::math::GridBounds;
use super::chunk::{Chunk, ChunkCoord};
use super::frame::VoxelFrame;
use super::voxel::Voxel;

/// Sparse chunked container for a fixed-dimension voxel grid
///
/// Chunks are created lazily on the first write that lands in them.
/// Reads outside any chunk, and reads or writes outside the grid
/// dimensions, follow the silent out-of-bounds policy: reads return
/// empty, writes do nothing.
#[derive(Clone, Debug)]
pub struct ChunkStore {
    dims: UVec3,
    chunks: HashMap<ChunkCoord, Chunk>,
    modified: Vec<ChunkCoord>,
}

impl ChunkStore {
    /// Create an empty store with the given grid dimensions
    pub fn new(dims: UVec3) -> Self {
        Self {
            dims,
            chunks: HashMap::new(),
            modified: Vec::new(),
        }
    }

    /// Get the grid dimensions
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    /// Whole-grid bounds: [0, dims)
    pub fn bounds(&self) -> GridBounds {
        GridBounds::from_min_size(IVec3::ZERO, self.dims)
    }

    /// Check if a position is inside the grid
    pub fn contains(&self, pos: IVec3) -> bool {
        self.bounds().contains(pos)
    }

    /// Read a voxel; positions outside the grid or any chunk read as empty
    pub fn get(&self, pos: IVec3) -> Voxel {
        if !self.contains(pos) {
            return Voxel::EMPTY;
        }
        match self.chunks.get(&ChunkCoord::from_voxel_pos(pos)) {
            Some(chunk) => chunk.get(pos),
            None => Voxel::EMPTY,
        }
    }

    /// Write a voxel; positions outside the grid are a no-op.
    ///
    /// Returns true if the stored value changed. The containing chunk is
    /// created on the first write that actually changes something.
    pub fn set(&mut self, pos: IVec3, v: Voxel) -> bool {
        if !self.contains(pos) {
            return false;
        }
        let coord = ChunkCoord::from_voxel_pos(pos);
        if v == Voxel::EMPTY && !self.chunks.contains_key(&coord) {
            // Writing air into a missing chunk changes nothing
            return false;
        }
        let dims = self.dims;
        let chunk = self
            .chunks
            .entry(coord)
            .or_insert_with(|| Chunk::new(coord, dims));
        let changed = chunk.set(pos, v);
        if changed {
            self.mark_modified(coord);
        }
        changed
    }

    /// Get immutable reference to a chunk by coordinate
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Number of allocated chunks
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Iterate allocated chunks in arbitrary order
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// Allocated chunk coordinates in sorted order (stable for snapshots)
    pub fn coords_sorted(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = self.chunks.keys().copied().collect();
        coords.sort();
        coords
    }

    /// Count non-empty voxels across all chunks
    pub fn count_non_empty(&self) -> usize {
        self.chunks.values().map(|c| c.count_non_empty()).sum()
    }

    /// Copy a region into a frame anchored at the region's min corner
    pub fn extract(&self, bounds: GridBounds) -> VoxelFrame {
        let clipped = bounds.clamped_to_dims(self.dims);
        let mut frame = VoxelFrame::from_bounds(clipped);
        for pos in clipped.iter() {
            frame.set(pos, self.get(pos));
        }
        frame
    }

    /// Write every cell of a frame into the grid (out-of-grid cells skipped).
    ///
    /// Unlike merge-style application this writes air cells too, so a frame
    /// extracted with [`extract`](Self::extract) restores exactly.
    pub fn blit(&mut self, frame: &VoxelFrame) {
        for (pos, v) in frame.cells() {
            self.set(pos, v);
        }
    }

    /// Mark or unmark a cell in its chunk's selection mask
    pub fn set_selected(&mut self, pos: IVec3, selected: bool) -> bool {
        if !self.contains(pos) {
            return false;
        }
        let coord = ChunkCoord::from_voxel_pos(pos);
        if !selected && !self.chunks.contains_key(&coord) {
            return false;
        }
        let dims = self.dims;
        let chunk = self
            .chunks
            .entry(coord)
            .or_insert_with(|| Chunk::new(coord, dims));
        let changed = chunk.set_selected(pos, selected);
        if changed {
            self.mark_modified(coord);
        }
        changed
    }

    /// Check a cell's selection mask
    pub fn is_selected(&self, pos: IVec3) -> bool {
        self.chunks
            .get(&ChunkCoord::from_voxel_pos(pos))
            .map(|c| c.is_selected(pos))
            .unwrap_or(false)
    }

    /// Clear every chunk's selection mask
    pub fn clear_selection(&mut self) {
        let mut cleared = Vec::new();
        for (coord, chunk) in self.chunks.iter_mut() {
            if !chunk.selection().is_all_empty() {
                chunk.clear_selection();
                cleared.push(*coord);
            }
        }
        for coord in cleared {
            self.mark_modified(coord);
        }
    }

    /// Count selected cells across all chunks
    pub fn count_selected(&self) -> usize {
        self.chunks
            .values()
            .map(|c| c.selection().count_non_empty())
            .sum()
    }

    fn mark_modified(&mut self, coord: ChunkCoord) {
        if !self.modified.contains(&coord) {
            self.modified.push(coord);
        }
    }

    /// Take the list of chunks modified since the last call
    pub fn take_modified(&mut self) -> Vec<ChunkCoord> {
        std::mem::take(&mut self.modified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_chunk_creation() {
        let mut store = ChunkStore::new(UVec3::splat(48));
        assert_eq!(store.chunk_count(), 0);

        // Writing air creates nothing
        assert!(!store.set(IVec3::new(1, 1, 1), Voxel::EMPTY));
        assert_eq!(store.chunk_count(), 0);

        assert!(store.set(IVec3::new(1, 1, 1), Voxel::new(4)));
        assert_eq!(store.chunk_count(), 1);
        assert_eq!(store.get(IVec3::new(1, 1, 1)), Voxel::new(4));
    }

    #[test]
    fn test_out_of_bounds_policy() {
        let mut store = ChunkStore::new(UVec3::splat(16));
        assert_eq!(store.get(IVec3::new(-1, 0, 0)), Voxel::EMPTY);
        assert_eq!(store.get(IVec3::new(16, 0, 0)), Voxel::EMPTY);
        assert!(!store.set(IVec3::new(16, 0, 0), Voxel::new(1)));
        assert!(!store.set(IVec3::new(0, -1, 0), Voxel::new(1)));
        assert_eq!(store.chunk_count(), 0);
    }

    #[test]
    fn test_modified_tracking() {
        let mut store = ChunkStore::new(UVec3::splat(48));
        store.set(IVec3::new(0, 0, 0), Voxel::new(1));
        store.set(IVec3::new(1, 0, 0), Voxel::new(1));
        store.set(IVec3::new(17, 0, 0), Voxel::new(2));

        let modified = store.take_modified();
        assert_eq!(modified.len(), 2);
        assert!(modified.contains(&ChunkCoord::new(0, 0, 0)));
        assert!(modified.contains(&ChunkCoord::new(1, 0, 0)));
        assert!(store.take_modified().is_empty());
    }

    #[test]
    fn test_extract_blit_round_trip() {
        let mut store = ChunkStore::new(UVec3::splat(32));
        store.set(IVec3::new(3, 4, 5), Voxel::new(7));
        store.set(IVec3::new(6, 4, 5), Voxel::new(2));

        let bounds = GridBounds::from_corners(IVec3::new(3, 4, 5), IVec3::new(6, 4, 5));
        let saved = store.extract(bounds);
        assert_eq!(saved.count_non_empty(), 2);

        store.set(IVec3::new(3, 4, 5), Voxel::EMPTY);
        store.set(IVec3::new(4, 4, 5), Voxel::new(9));
        store.blit(&saved);

        assert_eq!(store.get(IVec3::new(3, 4, 5)), Voxel::new(7));
        assert_eq!(store.get(IVec3::new(4, 4, 5)), Voxel::EMPTY);
        assert_eq!(store.get(IVec3::new(6, 4, 5)), Voxel::new(2));
    }

    #[test]
    fn test_extract_clips_to_dims() {
        let mut store = ChunkStore::new(UVec3::splat(8));
        store.set(IVec3::new(7, 7, 7), Voxel::new(3));
        let frame = store.extract(GridBounds::from_corners(IVec3::splat(6), IVec3::splat(12)));
        assert_eq!(frame.dims(), UVec3::splat(2));
        assert_eq!(frame.get(IVec3::new(7, 7, 7)), Voxel::new(3));
    }

    #[test]
    fn test_selection_mask() {
        let mut store = ChunkStore::new(UVec3::splat(32));
        assert!(store.set_selected(IVec3::new(2, 2, 2), true));
        assert!(store.is_selected(IVec3::new(2, 2, 2)));
        assert_eq!(store.count_selected(), 1);

        // Deselecting in a missing chunk is a no-op
        assert!(!store.set_selected(IVec3::new(20, 20, 20), false));

        store.clear_selection();
        assert_eq!(store.count_selected(), 0);
    }
}
