//! Undo/redo history
//!
//! The history is a linear list of entries plus a cursor counting how
//! many are applied. Undo and redo only move the cursor; pushing a new
//! entry with redoable entries ahead of the cursor discards them, which
//! is the usual branch-free editor behavior.

use crate::core::types::PaletteColor;
use crate::voxel::frame::VoxelFrame;
use crate::voxel::object::{ObjectId, VoxelObject};
use crate::voxel::store::ChunkStore;
use crate::voxel::voxel::Voxel;

/// One undoable operation
#[derive(Clone, Debug)]
pub enum HistoryEntry {
    /// Voxel edit: sparse before/after frames over the same extent.
    ///
    /// A cell holding zero in both frames was never touched by the
    /// edit; the two frames are always read as a pair, never alone.
    VoxelDiff {
        object: ObjectId,
        before: VoxelFrame,
        after: VoxelFrame,
    },
    /// Single palette slot change
    ColorChange {
        index: u8,
        before: PaletteColor,
        after: PaletteColor,
    },
    /// Whole palette replacement
    PaletteReplace {
        before: Vec<PaletteColor>,
        after: Vec<PaletteColor>,
    },
    /// Object renamed
    ObjectRename {
        object: ObjectId,
        before: String,
        after: String,
    },
    /// Object created at a list index
    ObjectAdd {
        snapshot: Box<VoxelObject>,
        index: usize,
    },
    /// Object removed from a list index, with its full contents
    ObjectDelete {
        snapshot: Box<VoxelObject>,
        index: usize,
    },
    /// Object moved between list indices
    ObjectReorder { from: usize, to: usize },
}

impl HistoryEntry {
    /// Build a voxel diff entry, or None when nothing changed
    pub fn voxel_diff(object: ObjectId, before: VoxelFrame, after: VoxelFrame) -> Option<Self> {
        if before == after {
            return None;
        }
        Some(HistoryEntry::VoxelDiff { object, before, after })
    }
}

/// Which side of a diff to write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyDirection {
    /// Write the after side (redo, inbound edits)
    Forward,
    /// Write the before side (undo)
    Reverse,
}

/// Reduce two same-extent frames to a sparse before/after pair.
///
/// Cells equal on both sides become zero in both output frames, so
/// applying either side later skips them. Returns None when the frames
/// are identical or their extents differ.
pub fn diff_frames(before: &VoxelFrame, after: &VoxelFrame) -> Option<(VoxelFrame, VoxelFrame)> {
    if before.min_pos() != after.min_pos() || before.dims() != after.dims() {
        return None;
    }
    let mut sparse_before = VoxelFrame::new(before.min_pos(), before.dims());
    let mut sparse_after = VoxelFrame::new(after.min_pos(), after.dims());
    let mut changed = false;
    for (pos, b) in before.cells() {
        let a = after.get(pos);
        if a != b {
            sparse_before.set(pos, b);
            sparse_after.set(pos, a);
            changed = true;
        }
    }
    changed.then_some((sparse_before, sparse_after))
}

/// Write one side of a sparse voxel diff into a store.
///
/// Cells holding zero in both frames are skipped; every other cell is
/// written from the chosen side. Local undo/redo and inbound remote
/// diffs all come through here. Returns the number of cells that
/// actually changed.
pub fn apply_voxel_diff(
    store: &mut ChunkStore,
    before: &VoxelFrame,
    after: &VoxelFrame,
    direction: ApplyDirection,
) -> usize {
    let mut written = 0;
    for (pos, b) in before.cells() {
        let a = after.get(pos);
        if b == Voxel::EMPTY && a == Voxel::EMPTY {
            continue;
        }
        let v = match direction {
            ApplyDirection::Forward => a,
            ApplyDirection::Reverse => b,
        };
        if store.set(pos, v) {
            written += 1;
        }
    }
    written
}

/// Linear history with an applied-count cursor
#[derive(Debug, Default)]
pub struct EditHistory {
    entries: Vec<HistoryEntry>,
    applied: usize,
    capacity: usize,
}

impl EditHistory {
    /// Create a history retaining at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            applied: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record an already-applied entry, discarding any redoable tail
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.applied);
        self.entries.push(entry);
        if self.entries.len() > self.capacity {
            let overflow = self.entries.len() - self.capacity;
            self.entries.drain(..overflow);
        }
        self.applied = self.entries.len();
    }

    /// Entry the next undo would revert
    pub fn undo_target(&self) -> Option<&HistoryEntry> {
        self.applied.checked_sub(1).map(|i| &self.entries[i])
    }

    /// Entry the next redo would reapply
    pub fn redo_target(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.applied)
    }

    /// Move the cursor back one entry (caller has applied the inverse)
    pub fn step_back(&mut self) {
        if self.applied > 0 {
            self.applied -= 1;
        }
    }

    /// Move the cursor forward one entry (caller has reapplied it)
    pub fn step_forward(&mut self) {
        if self.applied < self.entries.len() {
            self.applied += 1;
        }
    }

    /// Check if an undo is available
    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    /// Check if a redo is available
    pub fn can_redo(&self) -> bool {
        self.applied < self.entries.len()
    }

    /// Number of applied entries
    pub fn undo_depth(&self) -> usize {
        self.applied
    }

    /// Number of redoable entries ahead of the cursor
    pub fn redo_depth(&self) -> usize {
        self.entries.len() - self.applied
    }

    /// Total retained entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.entries.clear();
        self.applied = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color_entry(index: u8) -> HistoryEntry {
        HistoryEntry::ColorChange {
            index,
            before: [0, 0, 0],
            after: [index, index, index],
        }
    }

    fn entry_index(entry: &HistoryEntry) -> u8 {
        match entry {
            HistoryEntry::ColorChange { index, .. } => *index,
            _ => panic!("unexpected entry"),
        }
    }

    #[test]
    fn test_push_and_cursor() {
        let mut history = EditHistory::new(8);
        assert!(!history.can_undo());
        assert!(!history.can_redo());

        history.push(color_entry(1));
        history.push(color_entry(2));
        assert_eq!(history.undo_depth(), 2);
        assert_eq!(entry_index(history.undo_target().unwrap()), 2);

        history.step_back();
        assert_eq!(entry_index(history.undo_target().unwrap()), 1);
        assert_eq!(entry_index(history.redo_target().unwrap()), 2);
        assert_eq!(history.redo_depth(), 1);

        history.step_forward();
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_discards_redo_tail() {
        let mut history = EditHistory::new(8);
        history.push(color_entry(1));
        history.push(color_entry(2));
        history.step_back();

        history.push(color_entry(3));
        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(entry_index(history.undo_target().unwrap()), 3);
        history.step_back();
        assert_eq!(entry_index(history.undo_target().unwrap()), 1);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = EditHistory::new(3);
        for i in 1..=5 {
            history.push(color_entry(i));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo_depth(), 3);
        history.step_back();
        history.step_back();
        history.step_back();
        assert!(!history.can_undo());
        assert_eq!(entry_index(history.redo_target().unwrap()), 3);
    }

    #[test]
    fn test_voxel_diff_skips_identity() {
        use crate::core::types::{IVec3, UVec3};

        let a = VoxelFrame::new(IVec3::ZERO, UVec3::splat(2));
        let mut b = a.clone();
        assert!(HistoryEntry::voxel_diff(ObjectId(1), a.clone(), b.clone()).is_none());

        b.set(IVec3::ZERO, Voxel::new(1));
        assert!(HistoryEntry::voxel_diff(ObjectId(1), a, b).is_some());
    }

    #[test]
    fn test_diff_frames_sparsifies() {
        use crate::core::types::{IVec3, UVec3};

        let mut before = VoxelFrame::new(IVec3::ZERO, UVec3::splat(2));
        before.set(IVec3::new(0, 0, 0), Voxel::new(5));
        before.set(IVec3::new(1, 0, 0), Voxel::new(5));
        let mut after = before.clone();
        after.set(IVec3::new(1, 0, 0), Voxel::new(7));
        after.set(IVec3::new(0, 1, 0), Voxel::new(2));

        let (b, a) = diff_frames(&before, &after).unwrap();
        // Untouched cell drops out of both sides
        assert_eq!(b.get(IVec3::new(0, 0, 0)), Voxel::EMPTY);
        assert_eq!(a.get(IVec3::new(0, 0, 0)), Voxel::EMPTY);
        // Changed cells keep both sides
        assert_eq!(b.get(IVec3::new(1, 0, 0)), Voxel::new(5));
        assert_eq!(a.get(IVec3::new(1, 0, 0)), Voxel::new(7));
        // Created cell: zero before, value after
        assert_eq!(b.get(IVec3::new(0, 1, 0)), Voxel::EMPTY);
        assert_eq!(a.get(IVec3::new(0, 1, 0)), Voxel::new(2));

        assert!(diff_frames(&before, &before.clone()).is_none());
    }

    #[test]
    fn test_apply_voxel_diff_round_trip() {
        use crate::core::types::{IVec3, UVec3};

        let mut store = ChunkStore::new(UVec3::splat(16));
        store.set(IVec3::new(1, 1, 1), Voxel::new(5));
        store.set(IVec3::new(3, 1, 1), Voxel::new(9));

        // Edit erases (1,1,1) and creates (2,1,1)
        let mut before = VoxelFrame::new(IVec3::ZERO, UVec3::splat(4));
        let mut after = before.clone();
        before.set(IVec3::new(1, 1, 1), Voxel::new(5));
        after.set(IVec3::new(2, 1, 1), Voxel::new(6));

        apply_voxel_diff(&mut store, &before, &after, ApplyDirection::Forward);
        assert_eq!(store.get(IVec3::new(1, 1, 1)), Voxel::EMPTY);
        assert_eq!(store.get(IVec3::new(2, 1, 1)), Voxel::new(6));
        // Cell inside the extent but zero in both frames is untouched
        assert_eq!(store.get(IVec3::new(3, 1, 1)), Voxel::new(9));

        apply_voxel_diff(&mut store, &before, &after, ApplyDirection::Reverse);
        assert_eq!(store.get(IVec3::new(1, 1, 1)), Voxel::new(5));
        assert_eq!(store.get(IVec3::new(2, 1, 1)), Voxel::EMPTY);
        assert_eq!(store.get(IVec3::new(3, 1, 1)), Voxel::new(9));
    }
}
