//! rust_motion_planning - sampling-based motion planning in Rust
//!
//! This crate provides a ball-tree RRT* planner together with the
//! collaborators it plans against: state spaces, goals, termination
//! conditions and nearest-neighbor indices.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod datastructures;
pub mod path_planning;

// Concrete collaborators
pub mod goals;
pub mod spaces;

// Re-export common types for convenience
pub use common::{Goal, GoalSampler, GraphRecorder, StateSpace, TerminationCondition};
pub use common::{GoalCheck, MotionCheck, PlannerStatus};
pub use common::{PlanningError, PlanningResult};
pub use path_planning::{BallTreeRRTStar, BallTreeRRTStarConfig, SimpleSetup};
