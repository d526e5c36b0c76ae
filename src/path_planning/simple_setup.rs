//! One-stop planning context
//!
//! Bundles a state space, a ball-tree RRT* planner and the problem (start
//! states and goal) behind a small API for timed or condition-driven solves.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use crate::common::{
    Goal, GraphRecorder, PlannerStatus, PlanningError, PlanningResult, StateSpace, TerminationCondition,
};
use crate::goals::TimedTermination;
use crate::path_planning::ball_tree_rrt_star::{BallTreeRRTStar, BallTreeRRTStarConfig};
use crate::path_planning::path::PathGeometric;

pub struct SimpleSetup<Sp: StateSpace> {
    space: Arc<Sp>,
    planner: BallTreeRRTStar<Sp>,
    last_status: Option<PlannerStatus>,
    last_plan_time: Duration,
}

impl<Sp: StateSpace> SimpleSetup<Sp> {
    pub fn new(space: Arc<Sp>, config: BallTreeRRTStarConfig) -> PlanningResult<Self> {
        let planner = BallTreeRRTStar::new(Arc::clone(&space), config)?;
        Ok(Self {
            space,
            planner,
            last_status: None,
            last_plan_time: Duration::ZERO,
        })
    }

    pub fn space(&self) -> &Arc<Sp> {
        &self.space
    }

    pub fn planner(&self) -> &BallTreeRRTStar<Sp> {
        &self.planner
    }

    pub fn planner_mut(&mut self) -> &mut BallTreeRRTStar<Sp> {
        &mut self.planner
    }

    /// Add a start state; rejects states the space considers invalid
    pub fn add_start_state(&mut self, state: Sp::State) -> PlanningResult<()> {
        if !self.space.is_valid(&state) {
            return Err(PlanningError::InvalidStart(format!("{:?}", state)));
        }
        self.planner.add_start_state(state);
        Ok(())
    }

    pub fn set_goal(&mut self, goal: impl Goal<Sp::State> + 'static) {
        self.planner.set_goal(goal);
    }

    /// Solve until the wall-clock budget runs out
    pub fn solve_for(&mut self, budget: Duration) -> PlannerStatus {
        self.solve_with(&mut TimedTermination::new(budget))
    }

    pub fn solve_with(&mut self, ptc: &mut dyn TerminationCondition) -> PlannerStatus {
        let started = Instant::now();
        let status = self.planner.solve(ptc);
        self.last_plan_time = started.elapsed();
        self.last_status = Some(status);
        info!(
            "Solution status: {} ({:.3} s)",
            status,
            self.last_plan_time.as_secs_f64()
        );
        status
    }

    pub fn last_status(&self) -> Option<PlannerStatus> {
        self.last_status
    }

    /// Wall-clock duration of the last solve
    pub fn last_plan_time(&self) -> Duration {
        self.last_plan_time
    }

    pub fn have_solution_path(&self) -> bool {
        self.planner.solution().is_some()
    }

    pub fn have_exact_solution_path(&self) -> bool {
        self.planner.solution().map_or(false, |s| !s.approximate)
    }

    pub fn solution_path(&self) -> PlanningResult<&PathGeometric<Sp::State>> {
        self.planner
            .solution()
            .map(|s| &s.path)
            .ok_or(PlanningError::NoSolutionPath)
    }

    pub fn planner_data(&self, recorder: &mut dyn GraphRecorder<Sp::State>) {
        self.planner.planner_data(recorder);
    }

    /// Drop the tree and any solution; start states and goal are kept
    pub fn clear(&mut self) {
        self.planner.clear();
        self.last_status = None;
        self.last_plan_time = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::CircleObstacle;
    use crate::goals::{GoalState, IterationTermination};
    use crate::spaces::{RealVectorBounds, RealVectorStateSpace};
    use crate::utils::PlannerData;

    fn setup() -> SimpleSetup<RealVectorStateSpace> {
        let space = Arc::new(
            RealVectorStateSpace::new(RealVectorBounds::uniform(2, 0.0, 10.0))
                .unwrap()
                .with_circle_obstacles(vec![CircleObstacle::new(5.0, 5.0, 2.0)], 0.0)
                .unwrap(),
        );
        SimpleSetup::new(space, BallTreeRRTStarConfig::default().with_seed(3)).unwrap()
    }

    #[test]
    fn test_solve_and_fetch_path() {
        let mut ss = setup();
        let space = Arc::clone(ss.space());
        ss.add_start_state(space.state(&[1.0, 1.0])).unwrap();
        ss.set_goal(GoalState::new(space.clone(), space.state(&[9.0, 9.0]), 0.5).unwrap());

        assert!(matches!(ss.solution_path(), Err(PlanningError::NoSolutionPath)));
        let status = ss.solve_with(&mut IterationTermination::new(3000));
        assert_eq!(status, PlannerStatus::ExactSolution);
        assert!(ss.have_exact_solution_path());
        assert_eq!(ss.last_status(), Some(PlannerStatus::ExactSolution));
        let path = ss.solution_path().unwrap();
        assert!(path.check(space.as_ref()));

        let mut data = PlannerData::new();
        ss.planner_data(&mut data);
        assert_eq!(data.len(), ss.planner().tree().len());

        ss.clear();
        assert!(!ss.have_solution_path());
        assert!(ss.planner().tree().is_empty());
    }

    #[test]
    fn test_invalid_start_rejected() {
        let mut ss = setup();
        let space = Arc::clone(ss.space());
        assert!(matches!(
            ss.add_start_state(space.state(&[5.0, 5.0])),
            Err(PlanningError::InvalidStart(_))
        ));
    }

    #[test]
    fn test_solve_for_respects_budget() {
        let mut ss = setup();
        let space = Arc::clone(ss.space());
        ss.add_start_state(space.state(&[1.0, 1.0])).unwrap();
        // unreachable: inside the obstacle
        ss.set_goal(GoalState::new(space.clone(), space.state(&[5.0, 5.0]), 0.1).unwrap());
        let status = ss.solve_for(Duration::from_millis(200));
        assert_ne!(status, PlannerStatus::ExactSolution);
        assert!(ss.last_plan_time() >= Duration::from_millis(200));
        assert!(ss.last_plan_time() < Duration::from_secs(10));
    }
}
