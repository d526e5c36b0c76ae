//! Parent selection for newly extended motions
//!
//! Both policies pick the neighbor minimising `cost + distance` over a
//! collision-free edge. `Eager` validates every neighbor that could improve
//! the current best; `Delayed` orders neighbors by prospective cost first and
//! stops at the first one whose edge validates.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::common::{MotionCheck, StateSpace};

use super::motion::{MotionId, MotionTree};
use super::PlannerStats;

/// Cached outcome of validating the edge between a neighbor and the new state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeValidity {
    Unknown,
    Valid,
    Invalid,
}

/// A motion of the neighborhood around a new state
#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    pub id: MotionId,
    /// Distance from the neighbor's state to the new state
    pub distance: f64,
    pub validity: EdgeValidity,
}

/// Parent chosen for a new motion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub parent: MotionId,
    pub cost: f64,
}

/// Connection policy selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPolicy {
    Eager,
    #[default]
    Delayed,
}

impl ConnectionPolicy {
    pub fn build<Sp: StateSpace>(self) -> Box<dyn ConnectionStrategy<Sp>> {
        match self {
            ConnectionPolicy::Eager => Box::new(EagerConnection),
            ConnectionPolicy::Delayed => Box::new(DelayedConnection),
        }
    }
}

/// Strategy choosing the parent of a new motion among its neighbors
///
/// `nearest` must be part of `neighbors` and its edge must already be known
/// to be valid. Validation results are written back into `neighbors` so the
/// rewiring step can reuse them.
pub trait ConnectionStrategy<Sp: StateSpace> {
    fn connect(
        &self,
        space: &Sp,
        tree: &mut MotionTree<Sp::State>,
        neighbors: &mut [Neighbor],
        new_state: &Sp::State,
        nearest: MotionId,
        stats: &mut PlannerStats,
    ) -> Connection;
}

/// Validate every neighbor that beats the best cost found so far
#[derive(Debug, Clone, Copy, Default)]
pub struct EagerConnection;

/// Sort by prospective cost, validate in order, stop at the first success
#[derive(Debug, Clone, Copy, Default)]
pub struct DelayedConnection;

fn initial_connection<S>(tree: &MotionTree<S>, neighbors: &mut [Neighbor], nearest: MotionId) -> Connection {
    let mut cost = f64::INFINITY;
    for n in neighbors.iter_mut().filter(|n| n.id == nearest) {
        n.validity = EdgeValidity::Valid;
        cost = tree.cost(nearest) + n.distance;
    }
    debug_assert!(cost.is_finite(), "nearest motion {} missing from its neighborhood", nearest);
    Connection { parent: nearest, cost }
}

/// Validate the edge from `neighbor` to `new_state`, trimming its ball on failure
pub(crate) fn validate_edge<Sp: StateSpace>(
    space: &Sp,
    tree: &mut MotionTree<Sp::State>,
    neighbor: &mut Neighbor,
    new_state: &Sp::State,
    stats: &mut PlannerStats,
) -> bool {
    stats.motion_checks += 1;
    match space.check_motion(tree.state(neighbor.id), new_state) {
        MotionCheck::Valid => {
            neighbor.validity = EdgeValidity::Valid;
            true
        }
        MotionCheck::Invalid { last_valid, .. } => {
            neighbor.validity = EdgeValidity::Invalid;
            trim_volume(space, tree, neighbor.id, &last_valid, stats);
            space.free_state(last_valid);
            false
        }
    }
}

/// Shrink the ball of `id` to the distance of `witness`
pub(crate) fn trim_volume<Sp: StateSpace>(
    space: &Sp,
    tree: &mut MotionTree<Sp::State>,
    id: MotionId,
    witness: &Sp::State,
    stats: &mut PlannerStats,
) {
    let radius = space.distance(tree.state(id), witness);
    if tree.shrink_volume(id, radius) {
        stats.volume_trims += 1;
        trace!(motion = %id, radius, "volume trimmed");
    }
}

impl<Sp: StateSpace> ConnectionStrategy<Sp> for EagerConnection {
    fn connect(
        &self,
        space: &Sp,
        tree: &mut MotionTree<Sp::State>,
        neighbors: &mut [Neighbor],
        new_state: &Sp::State,
        nearest: MotionId,
        stats: &mut PlannerStats,
    ) -> Connection {
        let mut best = initial_connection(tree, neighbors, nearest);
        for neighbor in neighbors.iter_mut().filter(|n| n.id != nearest) {
            let cost = tree.cost(neighbor.id) + neighbor.distance;
            if cost < best.cost && validate_edge(space, tree, neighbor, new_state, stats) {
                best = Connection {
                    parent: neighbor.id,
                    cost,
                };
            }
        }
        best
    }
}

impl<Sp: StateSpace> ConnectionStrategy<Sp> for DelayedConnection {
    fn connect(
        &self,
        space: &Sp,
        tree: &mut MotionTree<Sp::State>,
        neighbors: &mut [Neighbor],
        new_state: &Sp::State,
        nearest: MotionId,
        stats: &mut PlannerStats,
    ) -> Connection {
        let mut best = initial_connection(tree, neighbors, nearest);
        neighbors.sort_by_key(|n| OrderedFloat(tree.cost(n.id) + n.distance));
        for neighbor in neighbors.iter_mut() {
            if neighbor.id == nearest {
                // nothing cheaper validated; the nearest motion stays parent
                break;
            }
            let cost = tree.cost(neighbor.id) + neighbor.distance;
            if cost >= best.cost {
                break;
            }
            if validate_edge(space, tree, neighbor, new_state, stats) {
                best = Connection {
                    parent: neighbor.id,
                    cost,
                };
                break;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::CircleObstacle;
    use crate::spaces::{RealVectorBounds, RealVectorState, RealVectorStateSpace};

    /// Root at the origin, a cheap motion whose edge crosses a disc, and two
    /// costlier motions; the new state sits at (4, 0).
    fn scene() -> (RealVectorStateSpace, MotionTree<RealVectorState>, Vec<MotionId>) {
        let space = RealVectorStateSpace::new(RealVectorBounds::uniform(2, -10.0, 10.0))
            .unwrap()
            .with_circle_obstacles(vec![CircleObstacle::new(3.0, 2.0, 0.5)], 0.0)
            .unwrap();
        let mut tree = MotionTree::new();
        let root = tree.add_root(space.state(&[0.0, 0.0]), 100.0);
        // cheapest prospective parent (0.1 + 3.16), but its edge is blocked
        let blocked = tree.add_child(space.state(&[3.0, 3.0]), root, 0.1, 100.0);
        let clear = tree.add_child(space.state(&[3.0, -1.0]), root, 3.2, 100.0);
        let nearest = tree.add_child(space.state(&[4.0, -2.0]), root, 4.5, 100.0);
        (space, tree, vec![root, blocked, clear, nearest])
    }

    fn neighborhood(
        space: &RealVectorStateSpace,
        tree: &MotionTree<RealVectorState>,
        ids: &[MotionId],
        target: &RealVectorState,
    ) -> Vec<Neighbor> {
        ids.iter()
            .map(|&id| Neighbor {
                id,
                distance: space.distance(tree.state(id), target),
                validity: EdgeValidity::Unknown,
            })
            .collect()
    }

    #[test]
    fn test_policies_agree_on_parent() {
        for policy in [ConnectionPolicy::Eager, ConnectionPolicy::Delayed] {
            let (space, mut tree, ids) = scene();
            let target = space.state(&[4.0, 0.0]);
            let mut neighbors = neighborhood(&space, &tree, &ids, &target);
            let mut stats = PlannerStats::default();
            let strategy = policy.build::<RealVectorStateSpace>();
            let connection = strategy.connect(&space, &mut tree, &mut neighbors, &target, ids[3], &mut stats);
            // the root costs 0 + 4 and beats clear (3.2 + 1.41) and nearest (4.5 + 2)
            assert_eq!(connection.parent, ids[0], "policy {:?}", policy);
            assert!((connection.cost - 4.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_blocked_neighbor_gets_trimmed() {
        let (space, mut tree, ids) = scene();
        let target = space.state(&[4.0, 0.0]);
        let mut neighbors = neighborhood(&space, &tree, &ids, &target);
        let mut stats = PlannerStats::default();
        let before = tree.vol_radius(ids[1]);
        DelayedConnection.connect(&space, &mut tree, &mut neighbors, &target, ids[3], &mut stats);
        assert!(tree.vol_radius(ids[1]) < before);
        assert_eq!(stats.volume_trims, 1);
        let blocked = neighbors.iter().find(|n| n.id == ids[1]).unwrap();
        assert_eq!(blocked.validity, EdgeValidity::Invalid);
    }

    #[test]
    fn test_delayed_skips_hopeless_candidates() {
        let (space, mut tree, ids) = scene();
        let target = space.state(&[4.0, 0.0]);
        let mut eager_neighbors = neighborhood(&space, &tree, &ids, &target);
        let mut delayed_neighbors = eager_neighbors.clone();
        let mut eager_stats = PlannerStats::default();
        let mut delayed_stats = PlannerStats::default();
        let (_, mut tree2, _) = scene();
        EagerConnection.connect(&space, &mut tree, &mut eager_neighbors, &target, ids[3], &mut eager_stats);
        DelayedConnection.connect(&space, &mut tree2, &mut delayed_neighbors, &target, ids[3], &mut delayed_stats);
        assert!(delayed_stats.motion_checks <= eager_stats.motion_checks);
    }
}
