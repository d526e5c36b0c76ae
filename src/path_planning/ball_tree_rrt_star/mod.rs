//! Ball-tree RRT*
//!
//! Asymptotically optimal tree planner that keeps, for every motion, a ball
//! of space believed to hold nothing new. Valid samples landing inside a
//! ball are discarded; invalid samples and failed motion checks shrink the
//! ball of the motion they were measured against, so sampling concentrates
//! on the frontier of the tree.
//!
//! Growth per iteration: sample (goal biased, ball rejected), extend the
//! nearest motion by at most `range`, connect the new motion to the cheapest
//! neighbor inside the shrinking radius `min(K sqrt(ln(n + 1) / n), r_max)`,
//! then rewire neighbors through it when that lowers their cost.

pub mod config;
pub mod connection;
pub mod motion;

pub use config::*;
pub use connection::*;
pub use motion::*;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tracing::{debug, error, info, trace, warn};

use crate::common::{
    Goal, GoalSampler, GraphRecorder, MotionCheck, PlannerStatus, PlanningError, PlanningResult,
    StateSpace, TerminationCondition,
};
use crate::datastructures::NearestNeighbors;
use crate::path_planning::path::{PathGeometric, Solution};

/// Counters collected while planning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlannerStats {
    /// Outer iterations run
    pub iterations: usize,
    /// States drawn from the space or the goal
    pub samples: usize,
    /// Samples discarded because they fell inside a ball
    pub volume_rejections: usize,
    /// Balls shrunk
    pub volume_trims: usize,
    /// Times the rejection cap forced a sample through
    pub rejection_overflows: usize,
    /// Extensions whose motion check failed
    pub extension_failures: usize,
    /// Motion checks issued
    pub motion_checks: usize,
    /// Neighbors gathered for connection and rewiring
    pub rewire_tests: usize,
    /// Motions reparented to a new motion
    pub rewires: usize,
    /// Descendant cost updates after rewiring
    pub cost_propagations: usize,
    /// Motions in the tree
    pub motions: usize,
}

/// Parameters resolved against the state space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerParams {
    pub range: f64,
    pub ball_radius_constant: f64,
    pub max_ball_radius: f64,
    pub initial_volume_radius: f64,
}

impl PlannerParams {
    fn resolve<Sp: StateSpace>(config: &BallTreeRRTStarConfig, space: &Sp) -> Self {
        let extent = space.maximum_extent();
        let range = if config.range > 0.0 { config.range } else { 0.2 * extent };
        Self {
            range,
            ball_radius_constant: config
                .ball_radius_constant
                .unwrap_or(range * (space.dimension() as f64).sqrt()),
            max_ball_radius: config.max_ball_radius.unwrap_or(extent),
            initial_volume_radius: config.initial_volume_radius.unwrap_or(extent),
        }
    }
}

/// Best exact and approximate goal motions seen during one `solve`
#[derive(Debug, Default)]
struct SolutionTracker {
    exact: Option<(MotionId, f64)>,
    approximate: Option<(MotionId, f64)>,
    approx_solved: bool,
}

impl SolutionTracker {
    fn difference(&self) -> f64 {
        self.approximate.map_or(f64::INFINITY, |(_, d)| d)
    }

    /// Test `candidates` against the goal; true once an exact solution is found
    fn check<S>(&mut self, goal: &dyn Goal<S>, tree: &MotionTree<S>, candidates: &[MotionId]) -> bool {
        for &id in candidates {
            let check = goal.is_satisfied(tree.state(id));
            if check.satisfied {
                if goal.is_path_length_satisfied(tree.cost(id)) {
                    self.exact = Some((id, check.distance));
                    return true;
                }
                // reached the goal but too long: best approximate candidate
                if !self.approx_solved || check.distance < self.difference() {
                    self.approximate = Some((id, check.distance));
                    self.approx_solved = true;
                }
            } else if !self.approx_solved && check.distance < self.difference() {
                self.approximate = Some((id, check.distance));
            }
        }
        false
    }
}

/// Ball-tree RRT* planner over a state space `Sp`
pub struct BallTreeRRTStar<Sp: StateSpace> {
    space: Arc<Sp>,
    config: BallTreeRRTStarConfig,
    params: PlannerParams,
    tree: MotionTree<Sp::State>,
    nn: Box<dyn NearestNeighbors<MotionId>>,
    connection: Box<dyn ConnectionStrategy<Sp>>,
    rng: Box<dyn RngCore>,
    starts: Vec<Sp::State>,
    next_start: usize,
    goal: Option<Box<dyn Goal<Sp::State>>>,
    recorder: Option<Box<dyn GraphRecorder<Sp::State>>>,
    stats: PlannerStats,
    solution: Option<Solution<Sp::State>>,
}

impl<Sp: StateSpace> BallTreeRRTStar<Sp> {
    pub fn new(space: Arc<Sp>, config: BallTreeRRTStarConfig) -> PlanningResult<Self> {
        config.validate()?;
        let extent = space.maximum_extent();
        if !(extent > 0.0 && extent.is_finite()) {
            return Err(PlanningError::InvalidParameter(format!(
                "state space extent must be finite and positive, got {}",
                extent
            )));
        }
        let rng: Box<dyn RngCore> = match config.seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(StdRng::from_entropy()),
        };
        let params = PlannerParams::resolve(&config, space.as_ref());
        Ok(Self {
            nn: config.nearest_neighbors.build(),
            connection: config.connection.build(),
            space,
            config,
            params,
            tree: MotionTree::new(),
            rng,
            starts: Vec::new(),
            next_start: 0,
            goal: None,
            recorder: None,
            stats: PlannerStats::default(),
            solution: None,
        })
    }

    /// Replace the random source
    pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Resolve automatic parameters against the state space
    pub fn setup(&mut self) {
        self.params = PlannerParams::resolve(&self.config, self.space.as_ref());
    }

    pub fn add_start_state(&mut self, state: Sp::State) {
        self.starts.push(state);
    }

    pub fn set_goal(&mut self, goal: impl Goal<Sp::State> + 'static) {
        self.goal = Some(Box::new(goal));
    }

    /// Record every inserted or rewired edge while planning
    pub fn set_graph_recorder(&mut self, recorder: impl GraphRecorder<Sp::State> + 'static) {
        self.recorder = Some(Box::new(recorder));
    }

    pub fn space(&self) -> &Arc<Sp> {
        &self.space
    }

    pub fn config(&self) -> &BallTreeRRTStarConfig {
        &self.config
    }

    pub fn params(&self) -> &PlannerParams {
        &self.params
    }

    pub fn tree(&self) -> &MotionTree<Sp::State> {
        &self.tree
    }

    pub fn stats(&self) -> PlannerStats {
        PlannerStats {
            motions: self.tree.len(),
            ..self.stats
        }
    }

    /// Latest solution found by `solve`
    pub fn solution(&self) -> Option<&Solution<Sp::State>> {
        self.solution.as_ref()
    }

    /// Neighborhood radius for a tree of `n` motions
    pub fn connection_radius(&self, n: usize) -> f64 {
        if n == 0 {
            return self.params.max_ball_radius;
        }
        let n = n as f64;
        (self.params.ball_radius_constant * ((n + 1.0).ln() / n).sqrt()).min(self.params.max_ball_radius)
    }

    /// True if `state` lies inside the ball of any motion
    pub fn in_volume(&self, state: &Sp::State) -> bool {
        self.tree
            .iter()
            .any(|(_, m)| self.space.distance(m.state(), state) < m.vol_radius())
    }

    /// Release every motion; start states are inserted again by the next `solve`
    pub fn clear(&mut self) {
        for state in self.tree.drain_states() {
            self.space.free_state(state);
        }
        self.nn.clear();
        self.next_start = 0;
        if let Some(solution) = self.solution.take() {
            for state in solution.path.states {
                self.space.free_state(state);
            }
        }
        self.stats = PlannerStats::default();
    }

    /// Dump every tree edge into `recorder`
    pub fn planner_data(&self, recorder: &mut dyn GraphRecorder<Sp::State>) {
        for &id in self.nn.list() {
            let parent = self.tree.parent(id).map(|p| self.tree.state(p));
            recorder.record_edge(parent, self.tree.state(id));
        }
    }

    /// Grow the tree until `ptc` fires or an exact solution is found
    pub fn solve(&mut self, ptc: &mut dyn TerminationCondition) -> PlannerStatus {
        self.setup();
        let goal = match self.goal.take() {
            Some(goal) => goal,
            None => {
                error!("Goal undefined");
                return PlannerStatus::InvalidGoal;
            }
        };
        let status = self.grow(&*goal, ptc);
        self.goal = Some(goal);
        status
    }

    fn grow(&mut self, goal: &dyn Goal<Sp::State>, ptc: &mut dyn TerminationCondition) -> PlannerStatus {
        let space = Arc::clone(&self.space);
        self.insert_pending_starts(space.as_ref());
        if self.nn.is_empty() {
            error!("There are no valid initial states");
            return PlannerStatus::InvalidStart;
        }
        info!("Starting with {} states", self.nn.size());

        let sampler = goal.sampler();
        let rewire_tests = self.stats.rewire_tests;
        let mut tracker = SolutionTracker::default();

        // new roots and motions grown by earlier solves
        let existing = self.nn.list().to_vec();
        if !tracker.check(goal, &self.tree, &existing) {
            while !ptc.should_terminate() {
                self.stats.iterations += 1;
                if let Some(candidates) = self.iterate(space.as_ref(), sampler) {
                    if tracker.check(goal, &self.tree, &candidates) {
                        break;
                    }
                }
            }
        }

        let status = self.finish(space.as_ref(), &tracker);
        info!(
            "Created {} states. Checked {} rewire options",
            self.nn.size(),
            self.stats.rewire_tests - rewire_tests
        );
        status
    }

    fn insert_pending_starts(&mut self, space: &Sp) {
        while self.next_start < self.starts.len() {
            let start = space.clone_state(&self.starts[self.next_start]);
            self.next_start += 1;
            if !space.is_valid(&start) {
                warn!("Skipping invalid start state {:?}", start);
                space.free_state(start);
                continue;
            }
            let id = self.tree.add_root(start, self.params.initial_volume_radius);
            self.nn.add(id);
            self.record(id);
        }
    }

    /// One growth step; returns the motions to test against the goal
    fn iterate(
        &mut self,
        space: &Sp,
        sampler: Option<&dyn GoalSampler<Sp::State>>,
    ) -> Option<Vec<MotionId>> {
        let rstate = self.sample(space, sampler);
        let Some(nmotion) = self.nearest(&rstate) else {
            space.free_state(rstate);
            return None;
        };

        let d = space.distance(self.tree.state(nmotion), &rstate);
        let dstate = if d > self.params.range {
            let steered = space.interpolate(self.tree.state(nmotion), &rstate, self.params.range / d);
            space.free_state(rstate);
            steered
        } else {
            rstate
        };

        self.stats.motion_checks += 1;
        if let MotionCheck::Invalid { last_valid, .. } = space.check_motion(self.tree.state(nmotion), &dstate) {
            self.stats.extension_failures += 1;
            trim_volume(space, &mut self.tree, nmotion, &last_valid, &mut self.stats);
            space.free_state(last_valid);
            space.free_state(dstate);
            return None;
        }

        let mut neighbors = self.neighborhood(space, &dstate, nmotion);
        self.stats.rewire_tests += neighbors.len();
        let connection = self.connection.connect(
            space,
            &mut self.tree,
            &mut neighbors,
            &dstate,
            nmotion,
            &mut self.stats,
        );

        let motion = self.tree.add_child(
            dstate,
            connection.parent,
            connection.cost,
            self.params.initial_volume_radius,
        );
        self.nn.add(motion);
        self.record(motion);
        trace!(motion = %motion, parent = %connection.parent, cost = connection.cost, "motion added");

        let mut candidates = vec![motion];
        self.rewire(space, motion, connection.parent, &mut neighbors, &mut candidates);
        Some(candidates)
    }

    /// Draw a state outside every ball, trimming balls with invalid draws
    fn sample(&mut self, space: &Sp, sampler: Option<&dyn GoalSampler<Sp::State>>) -> Sp::State {
        let mut rejections = 0;
        loop {
            let state = match sampler {
                Some(gs) if self.rng.gen::<f64>() < self.config.goal_bias && gs.can_sample() => {
                    gs.sample_goal(&mut *self.rng)
                }
                _ => space.sample_uniform(&mut *self.rng),
            };
            self.stats.samples += 1;
            if !self.in_volume(&state) {
                return state;
            }

            self.stats.volume_rejections += 1;
            if !space.is_valid(&state) {
                if let Some(id) = self.nearest(&state) {
                    trim_volume(space, &mut self.tree, id, &state, &mut self.stats);
                }
            }

            rejections += 1;
            if let Some(limit) = self.config.max_volume_rejections {
                if rejections > limit {
                    self.stats.rejection_overflows += 1;
                    debug!(rejections, "volume rejection cap reached, using last sample");
                    return state;
                }
            }
            space.free_state(state);
        }
    }

    fn nearest(&self, state: &Sp::State) -> Option<MotionId> {
        let distance = |id: MotionId| self.space.distance(self.tree.state(id), state);
        self.nn.nearest(&distance)
    }

    /// Motions within the connection radius of `state`, always including `nearest`
    fn neighborhood(&self, space: &Sp, state: &Sp::State, nearest: MotionId) -> Vec<Neighbor> {
        let radius = self.connection_radius(self.nn.size());
        let distance = |id: MotionId| space.distance(self.tree.state(id), state);
        let mut ids = self.nn.nearest_r(&distance, radius);
        if !ids.contains(&nearest) {
            ids.push(nearest);
        }
        ids.into_iter()
            .map(|id| Neighbor {
                id,
                distance: distance(id),
                validity: EdgeValidity::Unknown,
            })
            .collect()
    }

    /// Reparent neighbors through `motion` when that lowers their cost
    fn rewire(
        &mut self,
        space: &Sp,
        motion: MotionId,
        parent: MotionId,
        neighbors: &mut [Neighbor],
        candidates: &mut Vec<MotionId>,
    ) {
        let motion_cost = self.tree.cost(motion);
        let new_state = space.clone_state(self.tree.state(motion));
        for neighbor in neighbors.iter_mut().filter(|n| n.id != parent) {
            let cost = motion_cost + neighbor.distance;
            if cost >= self.tree.cost(neighbor.id) {
                continue;
            }
            let valid = match neighbor.validity {
                EdgeValidity::Valid => true,
                EdgeValidity::Invalid => false,
                EdgeValidity::Unknown => validate_edge(space, &mut self.tree, neighbor, &new_state, &mut self.stats),
            };
            if !valid {
                continue;
            }

            self.tree.reparent(neighbor.id, motion, cost);
            self.stats.rewires += 1;
            if self.config.cost_propagation == CostPropagation::Subtree {
                self.stats.cost_propagations += self.tree.propagate_cost(neighbor.id, |a, b| space.distance(a, b));
            }
            self.record(neighbor.id);
            trace!(motion = %neighbor.id, parent = %motion, cost, "rewired");
            candidates.push(neighbor.id);
        }
        space.free_state(new_state);
    }

    fn record(&mut self, id: MotionId) {
        if let Some(recorder) = self.recorder.as_mut() {
            let parent = self.tree.parent(id).map(|p| self.tree.state(p));
            recorder.record_edge(parent, self.tree.state(id));
        }
    }

    fn finish(&mut self, space: &Sp, tracker: &SolutionTracker) -> PlannerStatus {
        let (found, approximate) = match (tracker.exact, tracker.approximate) {
            (Some(exact), _) => (exact, false),
            (None, Some(approx)) => (approx, true),
            (None, None) => return PlannerStatus::Timeout,
        };
        let (id, difference) = found;
        let states = self
            .tree
            .path_to(id)
            .into_iter()
            .map(|m| space.clone_state(self.tree.state(m)))
            .collect();
        if let Some(previous) = self.solution.replace(Solution {
            path: PathGeometric::from_states(states),
            cost: self.tree.cost(id),
            approximate,
            difference,
        }) {
            for state in previous.path.states {
                space.free_state(state);
            }
        }
        if approximate {
            warn!("Found approximate solution");
            PlannerStatus::ApproximateSolution
        } else {
            PlannerStatus::ExactSolution
        }
    }
}
