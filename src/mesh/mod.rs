//! Surface extraction and texture atlas mapping

pub mod atlas;
pub mod mesher;

pub use atlas::{AtlasMap, UvRect};
pub use mesher::{ChunkMesher, MeshBuffers, MeshUpdate};
