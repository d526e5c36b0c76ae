//! Utility modules for rust_motion_planning

pub mod planner_data;
pub mod visualization;

pub use planner_data::*;
pub use visualization::{circle_outline, colors, tree_polyline, PathStyle, PointStyle, TreeVisualizer};
