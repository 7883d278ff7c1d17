//! Composite view of the scene
//!
//! Visible objects merge into one world grid for rendering and picking.
//! When objects overlap, the first non-empty cell found scanning from
//! the highest list index wins. Tool previews and floating selections
//! layer in at composite time only, so committed data never reflects an
//! in-progress gesture. Rebuilds are chunk grained: mutations mark
//! world regions dirty and the next rebuild recomputes exactly those
//! chunks, leaving untouched chunk versions stable for the mesher.

use std::collections::{HashMap, HashSet};

use crate::core::types::{IVec3, UVec3};
use crate::edit::preview::PreviewOverlay;
use crate::edit::selection::FloatingSelection;
use crate::math::GridBounds;
use crate::voxel::chunk::{Chunk, ChunkCoord, CHUNK_SIZE};
use crate::voxel::object::VoxelObject;
use crate::voxel::voxel::Voxel;

/// Merged world grid over all visible objects
pub struct Compositor {
    dims: UVec3,
    chunks: HashMap<ChunkCoord, Chunk>,
    dirty: HashSet<ChunkCoord>,
}

impl Compositor {
    /// Create a compositor for a world grid, with everything dirty
    pub fn new(dims: UVec3) -> Self {
        let mut compositor = Self {
            dims,
            chunks: HashMap::new(),
            dirty: HashSet::new(),
        };
        compositor.mark_all_dirty();
        compositor
    }

    /// World grid dimensions
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    /// Whole-grid bounds: [0, dims)
    pub fn bounds(&self) -> GridBounds {
        GridBounds::from_min_size(IVec3::ZERO, self.dims)
    }

    /// Mark every chunk for recomposition
    pub fn mark_all_dirty(&mut self) {
        let size = CHUNK_SIZE as i32;
        let max = self.dims.as_ivec3();
        let count = |d: i32| (d + size - 1) / size;
        for x in 0..count(max.x) {
            for y in 0..count(max.y) {
                for z in 0..count(max.z) {
                    self.dirty.insert(ChunkCoord::new(x, y, z));
                }
            }
        }
    }

    /// Mark the chunks overlapping a world region for recomposition
    pub fn mark_dirty_bounds(&mut self, bounds: GridBounds) {
        let clipped = bounds.clamped_to_dims(self.dims);
        if clipped.is_empty() {
            return;
        }
        let lo = ChunkCoord::from_voxel_pos(clipped.min);
        let hi = ChunkCoord::from_voxel_pos(clipped.max - IVec3::ONE);
        for x in lo.x..=hi.x {
            for y in lo.y..=hi.y {
                for z in lo.z..=hi.z {
                    self.dirty.insert(ChunkCoord::new(x, y, z));
                }
            }
        }
    }

    /// Check if any chunk awaits recomposition
    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Recompute every dirty chunk against the current scene.
    ///
    /// Returns the recomputed coordinates in sorted order. Chunk version
    /// counters only move where cell values actually changed, so
    /// downstream meshers still skip untouched chunks.
    pub fn rebuild(
        &mut self,
        objects: &[VoxelObject],
        preview: Option<&PreviewOverlay>,
        floating: Option<&FloatingSelection>,
    ) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = self.dirty.drain().collect();
        coords.sort();
        for &coord in &coords {
            let dims = self.dims;
            let chunk = self
                .chunks
                .entry(coord)
                .or_insert_with(|| Chunk::new(coord, dims));
            for pos in chunk.bounds().iter() {
                let (value, selected) = resolve_cell(objects, preview, floating, pos);
                chunk.set(pos, value);
                chunk.set_selected(pos, selected);
            }
        }
        coords
    }

    /// Read a composite cell; empty where nothing renders
    pub fn get(&self, pos: IVec3) -> Voxel {
        self.chunks
            .get(&ChunkCoord::from_voxel_pos(pos))
            .map(|c| c.get(pos))
            .unwrap_or(Voxel::EMPTY)
    }

    /// Check a composite cell's selection highlight
    pub fn is_selected(&self, pos: IVec3) -> bool {
        self.chunks
            .get(&ChunkCoord::from_voxel_pos(pos))
            .map(|c| c.is_selected(pos))
            .unwrap_or(false)
    }

    /// Get a composite chunk by coordinate
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Iterate composite chunks in arbitrary order
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// Count non-empty composite cells
    pub fn count_non_empty(&self) -> usize {
        self.chunks.values().map(|c| c.count_non_empty()).sum()
    }
}

/// Resolve one world cell against the object stack and overlays
fn resolve_cell(
    objects: &[VoxelObject],
    preview: Option<&PreviewOverlay>,
    floating: Option<&FloatingSelection>,
    pos: IVec3,
) -> (Voxel, bool) {
    for object in objects.iter().rev() {
        if !object.visible {
            continue;
        }
        let local = pos - object.position;
        let mut value = object.store().get(local);
        let mut selected = object.store().is_selected(local);
        if let Some(f) = floating {
            if f.object == object.id {
                if let Some(ghost) = f.ghost_at(local, object) {
                    value = ghost;
                    selected = true;
                }
            }
        }
        if let Some(overlay) = preview {
            if overlay.object == object.id {
                value = overlay.composite_value(local, value);
            }
        }
        if !value.is_empty() {
            return (value, selected);
        }
    }
    (Voxel::EMPTY, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::preview::PreviewMode;
    use crate::voxel::frame::VoxelFrame;
    use crate::voxel::object::ObjectId;

    fn object_with(id: u32, pos: IVec3, v: u8) -> VoxelObject {
        let mut object = VoxelObject::new(ObjectId(id), format!("obj{id}"), UVec3::splat(16));
        object.store_mut().set(pos, Voxel::new(v));
        object
    }

    #[test]
    fn test_higher_index_wins() {
        let p = IVec3::new(3, 3, 3);
        let objects = vec![object_with(1, p, 1), object_with(2, p, 2)];
        let mut compositor = Compositor::new(UVec3::splat(16));
        compositor.rebuild(&objects, None, None);
        assert_eq!(compositor.get(p), Voxel::new(2));

        let mut hidden = objects;
        hidden[1].visible = false;
        compositor.mark_all_dirty();
        compositor.rebuild(&hidden, None, None);
        assert_eq!(compositor.get(p), Voxel::new(1));
    }

    #[test]
    fn test_object_position_offsets_cells() {
        let mut object = object_with(1, IVec3::new(2, 0, 0), 4);
        object.position = IVec3::new(10, 0, 0);
        let mut compositor = Compositor::new(UVec3::splat(32));
        compositor.rebuild(&[object], None, None);
        assert_eq!(compositor.get(IVec3::new(12, 0, 0)), Voxel::new(4));
        assert_eq!(compositor.get(IVec3::new(2, 0, 0)), Voxel::EMPTY);
    }

    #[test]
    fn test_erase_preview_reveals_lower_object() {
        let p = IVec3::new(5, 5, 5);
        let objects = vec![object_with(1, p, 1), object_with(2, p, 2)];

        let mut frame = VoxelFrame::new(p, UVec3::ONE);
        frame.set(p, Voxel::new(1));
        let overlay = PreviewOverlay::new(ObjectId(2), PreviewMode::Erase, frame);

        let mut compositor = Compositor::new(UVec3::splat(16));
        compositor.rebuild(&objects, Some(&overlay), None);
        // The erased top cell exposes the object beneath it
        assert_eq!(compositor.get(p), Voxel::new(1));
    }

    #[test]
    fn test_attach_preview_ghost_is_not_committed() {
        let objects = vec![object_with(1, IVec3::new(1, 1, 1), 3)];
        let ghost_pos = IVec3::new(4, 4, 4);
        let mut frame = VoxelFrame::new(ghost_pos, UVec3::ONE);
        frame.set(ghost_pos, Voxel::new(7));
        let overlay = PreviewOverlay::new(ObjectId(1), PreviewMode::Attach, frame);

        let mut compositor = Compositor::new(UVec3::splat(16));
        compositor.rebuild(&objects, Some(&overlay), None);

        let v = compositor.get(ghost_pos);
        assert_eq!(v.block_type(), 7);
        assert!(v.is_raycast_excluded());
        // Committed store stays clean
        assert_eq!(objects[0].store().get(ghost_pos), Voxel::EMPTY);
    }

    #[test]
    fn test_floating_ghost_renders_selected() {
        let mut object = object_with(1, IVec3::new(2, 2, 2), 5);
        object.store_mut().set_selected(IVec3::new(2, 2, 2), true);
        let mut floating = FloatingSelection::lift(&mut object).unwrap();
        floating.set_offset(IVec3::new(3, 0, 0));

        let mut compositor = Compositor::new(UVec3::splat(16));
        compositor.rebuild(&[object], None, Some(&floating));

        let dest = IVec3::new(5, 2, 2);
        assert_eq!(compositor.get(dest).block_type(), 5);
        assert!(compositor.get(dest).is_raycast_excluded());
        assert!(compositor.is_selected(dest));
        assert_eq!(compositor.get(IVec3::new(2, 2, 2)), Voxel::EMPTY);
    }

    #[test]
    fn test_rebuild_only_touches_dirty_chunks() {
        let objects = vec![object_with(1, IVec3::new(1, 1, 1), 2)];
        let mut compositor = Compositor::new(UVec3::splat(32));
        let first = compositor.rebuild(&objects, None, None);
        assert_eq!(first.len(), 8);
        assert!(!compositor.has_dirty());
        assert!(compositor.rebuild(&objects, None, None).is_empty());

        compositor.mark_dirty_bounds(GridBounds::from_corners(
            IVec3::new(17, 0, 0),
            IVec3::new(18, 0, 0),
        ));
        let again = compositor.rebuild(&objects, None, None);
        assert_eq!(again, vec![ChunkCoord::new(1, 0, 0)]);
    }

    #[test]
    fn test_unchanged_rebuild_keeps_chunk_versions() {
        let objects = vec![object_with(1, IVec3::new(1, 1, 1), 2)];
        let mut compositor = Compositor::new(UVec3::splat(16));
        compositor.rebuild(&objects, None, None);
        let version = compositor.chunk(ChunkCoord::new(0, 0, 0)).unwrap().data_version();

        compositor.mark_all_dirty();
        compositor.rebuild(&objects, None, None);
        let after = compositor.chunk(ChunkCoord::new(0, 0, 0)).unwrap().data_version();
        assert_eq!(version, after);
    }
}
