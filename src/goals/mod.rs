//! Goal and termination collaborators

pub mod goal;
pub mod termination;

pub use goal::*;
pub use termination::*;
