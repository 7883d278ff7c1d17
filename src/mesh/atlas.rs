//! Texture atlas lookup for block types

use std::collections::HashMap;

use crate::core::config::EditorConfig;

/// Rectangle in normalized UV space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

/// Maps block types to cells of a square texture atlas
///
/// The atlas is a grid of `cells_across` by `cells_across` tiles, each
/// `cell_px` pixels wide. Unmapped block types fall back to cell 0, the
/// neutral tile, so a stale palette never breaks meshing.
#[derive(Clone, Debug)]
pub struct AtlasMap {
    id: u64,
    cells_across: u32,
    cell_px: u32,
    flip_v: bool,
    cells: HashMap<u8, u32>,
}

impl AtlasMap {
    /// Create an empty map; every block type falls back to cell 0
    pub fn new(id: u64, cells_across: u32, cell_px: u32, flip_v: bool) -> Self {
        Self {
            id,
            cells_across: cells_across.max(1),
            cell_px: cell_px.max(1),
            flip_v,
            cells: HashMap::new(),
        }
    }

    /// Create a map from session config with block type N in cell N
    pub fn from_config(id: u64, config: &EditorConfig) -> Self {
        let mut map = Self::new(
            id,
            config.atlas_cells_across,
            config.atlas_cell_px,
            config.atlas_flip_v,
        );
        let total = map.cells_across * map.cells_across;
        for block_type in 1..=0x7Fu8 {
            if (block_type as u32) < total {
                map.assign(block_type, block_type as u32);
            }
        }
        map
    }

    /// Identity of this atlas layout, for change detection
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Assign a block type to an atlas cell index
    pub fn assign(&mut self, block_type: u8, cell: u32) {
        self.cells.insert(block_type, cell);
    }

    /// Cell index for a block type, falling back to the neutral cell
    pub fn cell_of(&self, block_type: u8) -> u32 {
        self.cells.get(&block_type).copied().unwrap_or(0)
    }

    /// Normalized UV rectangle for a block type
    pub fn uv_rect(&self, block_type: u8) -> UvRect {
        let cell = self.cell_of(block_type);
        let col = cell % self.cells_across;
        let row = cell / self.cells_across;
        let atlas_px = (self.cells_across * self.cell_px) as f32;
        let cell_px = self.cell_px as f32;

        let u0 = col as f32 * cell_px / atlas_px;
        let u1 = (col + 1) as f32 * cell_px / atlas_px;
        let v_lo = row as f32 * cell_px / atlas_px;
        let v_hi = (row + 1) as f32 * cell_px / atlas_px;

        if self.flip_v {
            UvRect { u0, v0: 1.0 - v_lo, u1, v1: 1.0 - v_hi }
        } else {
            UvRect { u0, v0: v_lo, u1, v1: v_hi }
        }
    }
}
