//! Mathematical utilities and data structures

pub mod bounds;
pub mod ray;

pub use bounds::{wrap_to_dims, GridBounds};
pub use ray::Ray;
