//! Editor session configuration

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for an editor session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Default dimensions for new voxel objects
    pub default_dims: [u32; 3],
    /// Maximum number of retained history entries
    pub history_capacity: usize,
    /// Number of atlas cells per row
    pub atlas_cells_across: u32,
    /// Pixel width of one atlas cell
    pub atlas_cell_px: u32,
    /// Flip the V axis of atlas coordinates
    pub atlas_flip_v: bool,
    /// Darkening applied per occluding neighbor at a face corner (0.0-0.33)
    pub ao_strength: f32,
    /// Maximum pick ray travel distance in voxels
    pub raycast_distance: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_dims: [64, 64, 64],
            history_capacity: 64,
            atlas_cells_across: 16,
            atlas_cell_px: 16,
            atlas_flip_v: true,
            ao_strength: 0.25,
            raycast_distance: 1024.0,
        }
    }
}

impl EditorConfig {
    /// Save to file (sync)
    pub fn save_sync(&self, path: &Path) -> Result<(), io::Error> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)
    }

    /// Load from file (sync)
    pub fn load_sync(path: &Path) -> Result<Self, io::Error> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    }
}
