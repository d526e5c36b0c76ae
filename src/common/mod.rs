//! Common types, traits, and error definitions for rust_motion_planning
//!
//! This module provides the collaborator interfaces a planner consumes
//! (state space, goal, termination, graph export) and the shared result
//! types.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
