//! Spatial data structures used by the planners

pub mod nearest_neighbors;

pub use nearest_neighbors::*;
