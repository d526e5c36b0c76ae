//! Common traits defining the collaborators a planner consumes

use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

use rand::RngCore;

use crate::common::types::{GoalCheck, MotionCheck};

/// Configuration space a planner searches
///
/// Supplies the metric, interpolation, sampling and validity primitives.
/// States are owned values; the planner obtains copies through
/// [`clone_state`](StateSpace::clone_state) and hands them back through
/// [`free_state`](StateSpace::free_state) when they leave the tree.
pub trait StateSpace {
    /// A point of the space
    type State: Clone + Debug;

    /// Distance between two states
    fn distance(&self, a: &Self::State, b: &Self::State) -> f64;

    /// State at fraction `t` of the way from `from` to `to`
    fn interpolate(&self, from: &Self::State, to: &Self::State, t: f64) -> Self::State;

    /// Draw a state uniformly from the space
    fn sample_uniform(&self, rng: &mut dyn RngCore) -> Self::State;

    /// True when the state is inside the bounds and collision-free
    fn is_valid(&self, state: &Self::State) -> bool;

    /// Validate the straight motion from `from` to `to`
    fn check_motion(&self, from: &Self::State, to: &Self::State) -> MotionCheck<Self::State>;

    /// Largest distance between any two states of the space
    fn maximum_extent(&self) -> f64;

    /// Number of degrees of freedom
    fn dimension(&self) -> usize;

    fn clone_state(&self, state: &Self::State) -> Self::State {
        state.clone()
    }

    fn free_state(&self, state: Self::State) {
        drop(state);
    }
}

/// Goal specification
pub trait Goal<S> {
    /// Test a state and report its distance to the goal
    fn is_satisfied(&self, state: &S) -> GoalCheck;

    /// True if a path of this cost is short enough to be accepted
    fn is_path_length_satisfied(&self, _cost: f64) -> bool {
        true
    }

    /// Optional capability: direct sampling of goal states
    fn sampler(&self) -> Option<&dyn GoalSampler<S>> {
        None
    }
}

/// Goal regions that can be sampled directly
pub trait GoalSampler<S> {
    /// True while more goal samples can be produced
    fn can_sample(&self) -> bool {
        true
    }

    fn sample_goal(&self, rng: &mut dyn RngCore) -> S;
}

/// Stop predicate polled once per planner iteration
pub trait TerminationCondition {
    fn should_terminate(&mut self) -> bool;
}

impl<F> TerminationCondition for F
where
    F: FnMut() -> bool,
{
    fn should_terminate(&mut self) -> bool {
        self()
    }
}

/// Sink for the tree edges a planner produces
pub trait GraphRecorder<S> {
    /// Record `child`, attached to `parent` (`None` for a root)
    fn record_edge(&mut self, parent: Option<&S>, child: &S);
}

/// Shared recorder, inspectable while a planner holds a handle to it
impl<S, R> GraphRecorder<S> for Rc<RefCell<R>>
where
    R: GraphRecorder<S> + ?Sized,
{
    fn record_edge(&mut self, parent: Option<&S>, child: &S) {
        self.borrow_mut().record_edge(parent, child);
    }
}
