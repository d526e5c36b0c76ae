//! Common types used throughout rust_motion_planning

use std::fmt;

/// Outcome of validating the straight motion between two states
#[derive(Debug, Clone, PartialEq)]
pub enum MotionCheck<S> {
    /// Every state along the motion is valid
    Valid,
    /// The motion hits an invalid state
    Invalid {
        /// Furthest valid state reached from the start of the motion
        last_valid: S,
        /// Fraction of the motion covered by `last_valid`, in `[0, 1)`
        fraction: f64,
    },
}

impl<S> MotionCheck<S> {
    pub fn is_valid(&self) -> bool {
        matches!(self, MotionCheck::Valid)
    }
}

/// Result of testing a state against a goal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalCheck {
    pub satisfied: bool,
    /// Distance to the goal; `0` or below the threshold when satisfied
    pub distance: f64,
}

impl GoalCheck {
    pub fn new(satisfied: bool, distance: f64) -> Self {
        Self { satisfied, distance }
    }
}

/// Result of a call to `solve`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerStatus {
    /// A goal-satisfying path within the path length bound was found
    ExactSolution,
    /// Only a best-effort path toward the goal was found
    ApproximateSolution,
    /// Termination fired before anything usable was recorded
    Timeout,
    /// No start state was supplied
    InvalidStart,
    /// No goal was supplied
    InvalidGoal,
}

impl PlannerStatus {
    /// True when a path (exact or approximate) is available
    pub fn has_solution(&self) -> bool {
        matches!(
            self,
            PlannerStatus::ExactSolution | PlannerStatus::ApproximateSolution
        )
    }

    pub fn is_exact(&self) -> bool {
        *self == PlannerStatus::ExactSolution
    }
}

impl fmt::Display for PlannerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PlannerStatus::ExactSolution => "Exact solution",
            PlannerStatus::ApproximateSolution => "Approximate solution",
            PlannerStatus::Timeout => "Timeout",
            PlannerStatus::InvalidStart => "Invalid start",
            PlannerStatus::InvalidGoal => "Invalid goal",
        };
        write!(f, "{}", text)
    }
}

/// Circular obstacle (x, y, radius)
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CircleObstacle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl CircleObstacle {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self { x, y, radius }
    }

    /// True if `(x, y)` lies inside the disc inflated by `margin`
    pub fn contains(&self, x: f64, y: f64, margin: f64) -> bool {
        let dx = self.x - x;
        let dy = self.y - y;
        dx * dx + dy * dy <= (self.radius + margin).powi(2)
    }
}

impl From<(f64, f64, f64)> for CircleObstacle {
    fn from(tuple: (f64, f64, f64)) -> Self {
        Self::new(tuple.0, tuple.1, tuple.2)
    }
}
