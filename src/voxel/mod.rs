//! Voxel data structures and operations

pub mod voxel;
pub mod frame;
pub mod chunk;
pub mod store;
pub mod object;
pub mod octree;
pub mod raycast;
pub mod shape;

pub use chunk::{clamped_chunk_dims, Chunk, ChunkCoord, CHUNK_SIZE};
pub use frame::VoxelFrame;
pub use object::{ObjectId, VoxelObject};
pub use octree::SparseVoxelOctree;
pub use raycast::{raycast, RaycastHit};
pub use shape::{stamp, FillShape};
pub use store::ChunkStore;
pub use voxel::Voxel;
