//! Floating selections
//!
//! Lifting pulls the selected voxels out of committed data into a
//! floating frame; moving only changes a render offset, so dragging is
//! free of data writes. Offsets wrap toroidally across the object
//! dimensions. Commit stamps the cells back down at the wrapped
//! positions; cancel restores the exact lifted bytes in place.

use crate::core::types::IVec3;
use crate::math::wrap_to_dims;
use crate::voxel::frame::VoxelFrame;
use crate::voxel::object::{ObjectId, VoxelObject};
use crate::voxel::voxel::Voxel;

/// Selection contents lifted off an object
#[derive(Clone, Debug)]
pub struct FloatingSelection {
    pub object: ObjectId,
    cells: VoxelFrame,
    offset: IVec3,
    lifted: usize,
}

impl FloatingSelection {
    /// Lift the object's selected, non-empty cells into a floating frame.
    ///
    /// The lifted cells are cleared from committed data. Returns None if
    /// the selection covers no solid voxels.
    pub fn lift(object: &mut VoxelObject) -> Option<Self> {
        let bounds = object.selection_bounds();
        if bounds.is_empty() {
            return None;
        }

        let mut cells = VoxelFrame::from_bounds(bounds);
        let mut lifted_positions = Vec::new();
        for coord in object.store().coords_sorted() {
            let Some(chunk) = object.store().chunk(coord) else {
                continue;
            };
            for (pos, _) in chunk.selection().iter_non_empty() {
                let v = chunk.get(pos);
                if !v.is_empty() {
                    cells.set(pos, v);
                    lifted_positions.push(pos);
                }
            }
        }
        if lifted_positions.is_empty() {
            return None;
        }
        for pos in lifted_positions {
            object.store_mut().set(pos, Voxel::EMPTY);
        }

        let lifted = cells.count_non_empty();
        Some(Self {
            object: object.id,
            cells,
            offset: IVec3::ZERO,
            lifted,
        })
    }

    /// Current render offset
    pub fn offset(&self) -> IVec3 {
        self.offset
    }

    /// Set the render offset; cell data is untouched
    pub fn set_offset(&mut self, offset: IVec3) {
        self.offset = offset;
    }

    /// Number of lifted voxels
    pub fn lifted_count(&self) -> usize {
        self.lifted
    }

    /// Access the lifted frame (cells at their original positions)
    pub fn cells(&self) -> &VoxelFrame {
        &self.cells
    }

    /// Ghost value rendered at an object position, if any.
    ///
    /// A position shows a floating cell when its wrapped pre-offset
    /// source holds one, which is the inverse of rendering every source
    /// cell at its wrapped destination. Positions outside the object's
    /// grid never show a ghost.
    pub fn ghost_at(&self, pos: IVec3, object: &VoxelObject) -> Option<Voxel> {
        if !object.store().contains(pos) {
            return None;
        }
        let source = wrap_to_dims(pos - self.offset, object.dims());
        let v = self.cells.get(source);
        if v.is_empty() {
            None
        } else {
            Some(v.as_ghost())
        }
    }

    /// Stamp the floating cells down at their wrapped destinations.
    ///
    /// Destination cells are overwritten. The selection mask moves to
    /// the destinations so the placed voxels stay selected.
    pub fn commit(&self, object: &mut VoxelObject) {
        object.store_mut().clear_selection();
        for (pos, v) in self.cells.iter_non_empty() {
            let dest = wrap_to_dims(pos + self.offset, object.dims());
            object.store_mut().set(dest, v.committed());
            object.store_mut().set_selected(dest, true);
        }
    }

    /// Put the lifted bytes back exactly where they came from
    pub fn cancel(&self, object: &mut VoxelObject) {
        for (pos, v) in self.cells.iter_non_empty() {
            object.store_mut().set(pos, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::UVec3;
    use crate::voxel::object::ObjectId;

    fn object_with_selection() -> VoxelObject {
        let mut obj = VoxelObject::new(ObjectId(1), "part", UVec3::splat(16));
        obj.store_mut().set(IVec3::new(3, 3, 3), Voxel::new(5));
        obj.store_mut().set(IVec3::new(4, 3, 3), Voxel::new(6));
        obj.store_mut().set(IVec3::new(8, 8, 8), Voxel::new(7));
        obj.store_mut().set_selected(IVec3::new(3, 3, 3), true);
        obj.store_mut().set_selected(IVec3::new(4, 3, 3), true);
        // Selected but empty: must not lift anything
        obj.store_mut().set_selected(IVec3::new(5, 3, 3), true);
        obj
    }

    #[test]
    fn test_lift_conservation() {
        let mut obj = object_with_selection();
        let total_before = obj.store().count_non_empty();

        let floating = FloatingSelection::lift(&mut obj).unwrap();
        assert_eq!(floating.lifted_count(), 2);
        // Lifted cells cleared from committed data, the rest untouched
        assert_eq!(obj.store().get(IVec3::new(3, 3, 3)), Voxel::EMPTY);
        assert_eq!(obj.store().get(IVec3::new(4, 3, 3)), Voxel::EMPTY);
        assert_eq!(obj.store().get(IVec3::new(8, 8, 8)), Voxel::new(7));
        assert_eq!(
            obj.store().count_non_empty() + floating.lifted_count(),
            total_before
        );
    }

    #[test]
    fn test_lift_empty_selection_is_none() {
        let mut obj = VoxelObject::new(ObjectId(2), "empty", UVec3::splat(8));
        assert!(FloatingSelection::lift(&mut obj).is_none());

        // Mask over air only
        obj.store_mut().set_selected(IVec3::new(1, 1, 1), true);
        assert!(FloatingSelection::lift(&mut obj).is_none());
    }

    #[test]
    fn test_move_is_render_only() {
        let mut obj = object_with_selection();
        let mut floating = FloatingSelection::lift(&mut obj).unwrap();
        let cells_before = floating.cells().clone();

        floating.set_offset(IVec3::new(5, 0, 0));
        assert_eq!(floating.cells(), &cells_before);
        assert_eq!(
            floating.ghost_at(IVec3::new(8, 3, 3), &obj).unwrap().block_type(),
            5
        );
        assert!(floating.ghost_at(IVec3::new(3, 3, 3), &obj).is_none());
    }

    #[test]
    fn test_commit_wraps_toroidally() {
        let mut obj = VoxelObject::new(ObjectId(3), "wrap", UVec3::splat(16));
        obj.store_mut().set(IVec3::new(0, 8, 8), Voxel::new(9));
        obj.store_mut().set_selected(IVec3::new(0, 8, 8), true);

        let mut floating = FloatingSelection::lift(&mut obj).unwrap();
        floating.set_offset(IVec3::new(-2, 0, 0));
        floating.commit(&mut obj);

        assert_eq!(obj.store().get(IVec3::new(14, 8, 8)), Voxel::new(9));
        assert_eq!(obj.store().get(IVec3::new(0, 8, 8)), Voxel::EMPTY);
        assert!(obj.store().is_selected(IVec3::new(14, 8, 8)));
        assert!(!obj.store().is_selected(IVec3::new(0, 8, 8)));
    }

    #[test]
    fn test_commit_overwrites_destination() {
        let mut obj = VoxelObject::new(ObjectId(4), "over", UVec3::splat(16));
        obj.store_mut().set(IVec3::new(2, 2, 2), Voxel::new(1));
        obj.store_mut().set(IVec3::new(5, 2, 2), Voxel::new(8));
        obj.store_mut().set_selected(IVec3::new(2, 2, 2), true);

        let mut floating = FloatingSelection::lift(&mut obj).unwrap();
        floating.set_offset(IVec3::new(3, 0, 0));
        floating.commit(&mut obj);

        assert_eq!(obj.store().get(IVec3::new(5, 2, 2)), Voxel::new(1));
    }

    #[test]
    fn test_cancel_restores_exact_bytes() {
        let mut obj = object_with_selection();
        let snapshot: Vec<(IVec3, Voxel)> = vec![
            (IVec3::new(3, 3, 3), Voxel::new(5)),
            (IVec3::new(4, 3, 3), Voxel::new(6)),
        ];

        let mut floating = FloatingSelection::lift(&mut obj).unwrap();
        floating.set_offset(IVec3::new(7, 1, 0));
        floating.cancel(&mut obj);

        for (pos, v) in snapshot {
            assert_eq!(obj.store().get(pos), v);
        }
        assert_eq!(obj.store().get(IVec3::new(10, 4, 3)), Voxel::EMPTY);
    }
}
