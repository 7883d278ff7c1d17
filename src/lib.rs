//! Voxelforge - a chunked voxel editing engine
//!
//! The crate is organized bottom-up: [`voxel`] holds the grid data
//! structures, [`mesh`] turns chunks into render geometry, [`edit`]
//! models gestures and history, and [`session`] ties a whole scene
//! together with compositing, events, persistence, and the remote
//! sync seam. [`codec`] is the shared compression for files and wire
//! payloads.

pub mod codec;
pub mod core;
pub mod edit;
pub mod math;
pub mod mesh;
pub mod session;
pub mod voxel;
