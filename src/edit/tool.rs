//! Fill and brush tools
//!
//! A tool gesture produces a preview frame of the cells it would touch.
//! Committing the gesture turns the preview into a before/after pair
//! over the touched region, clipped to the object, with the mode applied
//! cell by cell. The pair is what history records and what gets written.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::core::types::IVec3;
use crate::edit::history::diff_frames;
use crate::edit::preview::PreviewMode;
use crate::math::GridBounds;
use crate::voxel::frame::VoxelFrame;
use crate::voxel::shape::{stamp, FillShape};
use crate::voxel::store::ChunkStore;
use crate::voxel::voxel::Voxel;

/// Tool identity tagged onto outbound edits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolKind {
    /// Single-cell or small-radius dabs
    Pencil,
    /// Two-corner drag fills
    Rect,
    /// Region fill from a picked cell
    Fill,
    /// Selection relocation
    Move,
}

/// Preview frame for a two-corner drag fill
pub fn rect_preview(start: IVec3, end: IVec3, shape: FillShape, rotation: u8, block: Voxel) -> VoxelFrame {
    let bounds = GridBounds::from_corners(start, end);
    let mut frame = VoxelFrame::from_bounds(bounds);
    stamp(shape, bounds, rotation, block, &mut frame);
    frame
}

/// Preview frame for a brush dab centered on a cell
pub fn brush_preview(center: IVec3, radius: u32, shape: FillShape, block: Voxel) -> VoxelFrame {
    let r = radius as i32;
    let bounds = GridBounds::new(center - IVec3::splat(r), center + IVec3::splat(r + 1));
    let mut frame = VoxelFrame::from_bounds(bounds);
    stamp(shape, bounds, 0, block, &mut frame);
    frame
}

/// Resolve a preview against committed data into a sparse diff pair.
///
/// Returns None when the preview misses the object entirely or changes
/// nothing. Erase and Paint only touch cells that already hold a visible
/// voxel; Attach overwrites. The returned frames follow the sparse diff
/// convention of [`diff_frames`].
pub fn build_diff(
    store: &ChunkStore,
    preview: &VoxelFrame,
    mode: PreviewMode,
) -> Option<(VoxelFrame, VoxelFrame)> {
    let bounds = GridBounds::from_min_size(preview.min_pos(), preview.dims())
        .clamped_to_dims(store.dims());
    if bounds.is_empty() {
        return None;
    }

    let committed = store.extract(bounds);
    let mut after = committed.clone();
    for (pos, p) in preview.iter_non_empty() {
        if !bounds.contains(pos) {
            continue;
        }
        let existing = after.get(pos);
        match mode {
            PreviewMode::Attach => {
                after.set(pos, p.committed());
            }
            PreviewMode::Erase => {
                if existing.is_visible() {
                    after.set(pos, Voxel::EMPTY);
                }
            }
            PreviewMode::Paint => {
                if existing.is_visible() {
                    after.set(pos, Voxel::new(p.block_type()));
                }
            }
        }
    }

    diff_frames(&committed, &after)
}

/// Preview frame for a flood fill from a seed cell.
///
/// Expands through the 6-connected region of cells holding the seed's
/// value. Returns a frame trimmed to the filled region, or None when
/// the seed is out of bounds or already holds the fill value.
pub fn flood_fill_preview(store: &ChunkStore, seed: IVec3, block: Voxel) -> Option<VoxelFrame> {
    if !store.contains(seed) {
        return None;
    }
    let target = store.get(seed);
    if target == block {
        return None;
    }

    let mut frame = VoxelFrame::new(IVec3::ZERO, store.dims());
    let mut filled = GridBounds::default();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(seed);
    queue.push_back(seed);
    while let Some(pos) = queue.pop_front() {
        frame.set(pos, block);
        filled.expand_to_include(pos);
        let steps = [
            IVec3::X,
            IVec3::NEG_X,
            IVec3::Y,
            IVec3::NEG_Y,
            IVec3::Z,
            IVec3::NEG_Z,
        ];
        for step in steps {
            let next = pos + step;
            if store.contains(next) && store.get(next) == target && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    frame.resize(filled.min, filled.size());
    Some(frame)
}
