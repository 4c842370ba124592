//! Spatial partitioning for the collision broad-phase

pub mod grid;
pub mod spatial_query;

pub use grid::{CellRange, SpatialGrid};
pub use spatial_query::SpatialQuery;
