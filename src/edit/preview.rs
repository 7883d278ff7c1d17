//! Live tool previews
//!
//! While a tool drag is in progress its pending cells live in an
//! overlay frame, never in committed chunk data. The compositor layers
//! the overlay over its object; committing or cancelling is then a
//! separate step.

use serde::{Deserialize, Serialize};

use crate::core::types::IVec3;
use crate::voxel::frame::VoxelFrame;
use crate::voxel::object::ObjectId;
use crate::voxel::voxel::Voxel;

/// How preview cells combine with committed data
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreviewMode {
    /// Add voxels where the preview is set
    Attach,
    /// Hide committed voxels where the preview is set
    Erase,
    /// Recolor committed voxels where the preview is set
    Paint,
}

/// Pending edit overlay on one object
#[derive(Clone, Debug)]
pub struct PreviewOverlay {
    pub object: ObjectId,
    pub mode: PreviewMode,
    frame: VoxelFrame,
    version: u64,
}

impl PreviewOverlay {
    /// Create an overlay from a stamped preview frame
    pub fn new(object: ObjectId, mode: PreviewMode, frame: VoxelFrame) -> Self {
        Self {
            object,
            mode,
            frame,
            version: 0,
        }
    }

    /// Access the preview frame
    pub fn frame(&self) -> &VoxelFrame {
        &self.frame
    }

    /// Replace the preview frame (drag update), bumping the version
    pub fn set_frame(&mut self, frame: VoxelFrame) {
        self.frame = frame;
        self.version += 1;
    }

    /// Version counter, bumped on every frame replacement
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Effective cell value with the overlay applied.
    ///
    /// Attach and paint results carry the ghost flag so a pending stroke
    /// renders but never captures the pick ray.
    pub fn composite_value(&self, pos: IVec3, committed: Voxel) -> Voxel {
        let p = self.frame.get(pos);
        if p.is_empty() {
            return committed;
        }
        match self.mode {
            PreviewMode::Attach => p.as_ghost(),
            PreviewMode::Erase => Voxel::EMPTY,
            PreviewMode::Paint => {
                if committed.is_visible() {
                    Voxel::new(p.block_type()).as_ghost()
                } else {
                    committed
                }
            }
        }
    }
}
