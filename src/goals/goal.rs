//! Goal definitions
//!
//! `GoalState` is a single configuration with a tolerance and can be sampled
//! directly. `GoalRegion` wraps an arbitrary distance-to-goal function and
//! cannot.

use std::sync::Arc;

use rand::RngCore;

use crate::common::{Goal, GoalCheck, GoalSampler, PlanningError, PlanningResult, StateSpace};

/// A goal configuration and the tolerance around it
pub struct GoalState<Sp: StateSpace> {
    space: Arc<Sp>,
    state: Sp::State,
    threshold: f64,
    max_path_length: f64,
}

impl<Sp: StateSpace> GoalState<Sp> {
    pub fn new(space: Arc<Sp>, state: Sp::State, threshold: f64) -> PlanningResult<Self> {
        if !(threshold >= 0.0) {
            return Err(PlanningError::InvalidParameter(format!(
                "goal threshold must be non-negative, got {}",
                threshold
            )));
        }
        Ok(Self {
            space,
            state,
            threshold,
            max_path_length: f64::INFINITY,
        })
    }

    /// Accept solutions only when their cost is at most `length`
    pub fn with_max_path_length(mut self, length: f64) -> Self {
        self.max_path_length = length;
        self
    }

    pub fn state(&self) -> &Sp::State {
        &self.state
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl<Sp: StateSpace> Goal<Sp::State> for GoalState<Sp> {
    fn is_satisfied(&self, state: &Sp::State) -> GoalCheck {
        let distance = self.space.distance(state, &self.state);
        GoalCheck::new(distance <= self.threshold, distance)
    }

    fn is_path_length_satisfied(&self, cost: f64) -> bool {
        cost <= self.max_path_length
    }

    fn sampler(&self) -> Option<&dyn GoalSampler<Sp::State>> {
        Some(self)
    }
}

impl<Sp: StateSpace> GoalSampler<Sp::State> for GoalState<Sp> {
    fn sample_goal(&self, _rng: &mut dyn RngCore) -> Sp::State {
        self.space.clone_state(&self.state)
    }
}

/// Goal given by a distance function and a tolerance
pub struct GoalRegion<S> {
    distance: Box<dyn Fn(&S) -> f64>,
    threshold: f64,
    max_path_length: f64,
}

impl<S> GoalRegion<S> {
    pub fn new(distance: impl Fn(&S) -> f64 + 'static, threshold: f64) -> Self {
        Self {
            distance: Box::new(distance),
            threshold,
            max_path_length: f64::INFINITY,
        }
    }

    pub fn with_max_path_length(mut self, length: f64) -> Self {
        self.max_path_length = length;
        self
    }
}

impl<S> Goal<S> for GoalRegion<S> {
    fn is_satisfied(&self, state: &S) -> GoalCheck {
        let distance = (self.distance)(state);
        GoalCheck::new(distance <= self.threshold, distance)
    }

    fn is_path_length_satisfied(&self, cost: f64) -> bool {
        cost <= self.max_path_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spaces::{RealVectorBounds, RealVectorState, RealVectorStateSpace};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn plane() -> Arc<RealVectorStateSpace> {
        Arc::new(RealVectorStateSpace::new(RealVectorBounds::uniform(2, 0.0, 10.0)).unwrap())
    }

    #[test]
    fn test_goal_state_threshold() {
        let space = plane();
        let goal = GoalState::new(space.clone(), space.state(&[9.0, 9.0]), 0.5)
            .unwrap()
            .with_max_path_length(20.0);
        let near = goal.is_satisfied(&space.state(&[9.0, 9.4]));
        assert!(near.satisfied);
        let far = goal.is_satisfied(&space.state(&[9.0, 8.0]));
        assert!(!far.satisfied);
        assert!((far.distance - 1.0).abs() < 1e-12);
        assert!(goal.is_path_length_satisfied(20.0));
        assert!(!goal.is_path_length_satisfied(20.5));
    }

    #[test]
    fn test_goal_state_is_sampleable() {
        let space = plane();
        let goal = GoalState::new(space.clone(), space.state(&[1.0, 2.0]), 0.1).unwrap();
        let sampler = goal.sampler().expect("goal state can be sampled");
        assert!(sampler.can_sample());
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sampler.sample_goal(&mut rng), space.state(&[1.0, 2.0]));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let space = plane();
        assert!(GoalState::new(space.clone(), space.state(&[1.0, 1.0]), -1.0).is_err());
    }

    #[test]
    fn test_goal_region_is_not_sampleable() {
        let goal = GoalRegion::new(|s: &RealVectorState| (s[0] - 5.0).abs(), 0.25);
        assert!(goal.sampler().is_none());
        assert!(goal.is_satisfied(&RealVectorState::from_vec(vec![5.2, 0.0])).satisfied);
        assert!(!goal.is_satisfied(&RealVectorState::from_vec(vec![4.0, 0.0])).satisfied);
    }
}
