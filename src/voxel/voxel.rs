//! Voxel data type

use bytemuck::{Pod, Zeroable};

/// Voxel flags
pub mod flags {
    /// Bit 7 excludes a cell from ray picking. Ghost previews set it so a
    /// pending stroke never captures the cursor. The raycaster reuses the
    /// same bit alone (type bits zero) to tag synthetic boundary hits.
    pub const RAYCAST_EXCLUDED: u8 = 1 << 7;
}

/// Mask covering the block type bits (0-6)
pub const TYPE_MASK: u8 = 0x7F;

/// Single voxel - exactly 1 byte
///
/// Bits 0-6 hold the block type index (0 = empty), bit 7 the raycast
/// exclusion flag.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Voxel(pub u8);

impl Voxel {
    /// Empty/air voxel
    pub const EMPTY: Voxel = Voxel(0);

    /// Synthetic value returned for boundary hits: flag bit set, type empty
    pub const BOUNDARY: Voxel = Voxel(flags::RAYCAST_EXCLUDED);

    /// Create a voxel from a block type index (type bits only)
    pub fn new(block_type: u8) -> Self {
        Voxel(block_type & TYPE_MASK)
    }

    /// Get the block type index
    pub fn block_type(self) -> u8 {
        self.0 & TYPE_MASK
    }

    /// Check if the voxel is empty (air), ignoring flag bits
    pub fn is_empty(self) -> bool {
        self.block_type() == 0
    }

    /// Check if the voxel renders (any non-zero block type, flagged or not)
    pub fn is_visible(self) -> bool {
        self.block_type() != 0
    }

    /// Check if the exclusion flag is set
    pub fn is_raycast_excluded(self) -> bool {
        self.0 & flags::RAYCAST_EXCLUDED != 0
    }

    /// Check if a pick ray may stop on this voxel.
    ///
    /// Empty cells never stop a ray, regardless of flag bits.
    pub fn is_raycastable(self) -> bool {
        self.block_type() != 0 && !self.is_raycast_excluded()
    }

    /// Copy with the exclusion flag set (ghost rendering)
    pub fn as_ghost(self) -> Self {
        Voxel(self.0 | flags::RAYCAST_EXCLUDED)
    }

    /// Copy with flag bits cleared
    pub fn committed(self) -> Self {
        Voxel(self.block_type())
    }
}

impl From<u8> for Voxel {
    fn from(raw: u8) -> Self {
        Voxel(raw)
    }
}
