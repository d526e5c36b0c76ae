//! Motion tree
//!
//! Tree nodes live in an arena and refer to each other by [`MotionId`].
//! Nodes are only ever appended, and a child may only attach to a node that
//! is already present, so parent chains always end at a root.

use std::fmt;

/// Stable handle of a motion inside its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MotionId(usize);

impl MotionId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for MotionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tree node
#[derive(Debug, Clone)]
pub struct Motion<S> {
    state: S,
    parent: Option<MotionId>,
    children: Vec<MotionId>,
    /// Cumulative cost from the root
    cost: f64,
    /// Radius of the ball around `state` believed to hold nothing new
    vol_radius: f64,
}

impl<S> Motion<S> {
    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn parent(&self) -> Option<MotionId> {
        self.parent
    }

    pub fn children(&self) -> &[MotionId] {
        &self.children
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn vol_radius(&self) -> f64 {
        self.vol_radius
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Arena of motions forming a forest
#[derive(Debug, Clone)]
pub struct MotionTree<S> {
    motions: Vec<Motion<S>>,
}

impl<S> Default for MotionTree<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> MotionTree<S> {
    pub fn new() -> Self {
        Self {
            motions: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.motions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motions.is_empty()
    }

    pub fn get(&self, id: MotionId) -> &Motion<S> {
        &self.motions[id.0]
    }

    pub fn state(&self, id: MotionId) -> &S {
        &self.motions[id.0].state
    }

    pub fn cost(&self, id: MotionId) -> f64 {
        self.motions[id.0].cost
    }

    pub fn parent(&self, id: MotionId) -> Option<MotionId> {
        self.motions[id.0].parent
    }

    pub fn vol_radius(&self, id: MotionId) -> f64 {
        self.motions[id.0].vol_radius
    }

    pub fn ids(&self) -> impl Iterator<Item = MotionId> {
        (0..self.motions.len()).map(MotionId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MotionId, &Motion<S>)> {
        self.motions
            .iter()
            .enumerate()
            .map(|(i, m)| (MotionId(i), m))
    }

    /// Insert a start motion with zero cost
    pub fn add_root(&mut self, state: S, vol_radius: f64) -> MotionId {
        self.push(state, None, 0.0, vol_radius)
    }

    /// Insert `state` below an existing `parent`
    pub fn add_child(&mut self, state: S, parent: MotionId, cost: f64, vol_radius: f64) -> MotionId {
        assert!(parent.0 < self.motions.len(), "parent {} is not in the tree", parent);
        let id = self.push(state, Some(parent), cost, vol_radius);
        self.motions[parent.0].children.push(id);
        id
    }

    fn push(&mut self, state: S, parent: Option<MotionId>, cost: f64, vol_radius: f64) -> MotionId {
        let id = MotionId(self.motions.len());
        self.motions.push(Motion {
            state,
            parent,
            children: Vec::new(),
            cost,
            vol_radius,
        });
        id
    }

    /// Shrink the exploration ball; larger radii are ignored
    pub fn shrink_volume(&mut self, id: MotionId, radius: f64) -> bool {
        let motion = &mut self.motions[id.0];
        if radius < motion.vol_radius {
            motion.vol_radius = radius;
            true
        } else {
            false
        }
    }

    /// Move `id` below `new_parent` with the given cost
    pub fn reparent(&mut self, id: MotionId, new_parent: MotionId, cost: f64) {
        debug_assert!(
            id != new_parent && !self.is_ancestor(id, new_parent),
            "reparenting {} below {} would close a cycle",
            id,
            new_parent
        );
        if let Some(old) = self.motions[id.0].parent {
            self.motions[old.0].children.retain(|&c| c != id);
        }
        self.motions[new_parent.0].children.push(id);
        let motion = &mut self.motions[id.0];
        motion.parent = Some(new_parent);
        motion.cost = cost;
    }

    /// Recompute the costs of every descendant of `id` from its current cost
    ///
    /// Returns the number of motions updated.
    pub fn propagate_cost(&mut self, id: MotionId, edge_cost: impl Fn(&S, &S) -> f64) -> usize {
        let mut updated = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let parent_cost = self.motions[current.0].cost;
            for k in 0..self.motions[current.0].children.len() {
                let child = self.motions[current.0].children[k];
                let edge = edge_cost(&self.motions[current.0].state, &self.motions[child.0].state);
                self.motions[child.0].cost = parent_cost + edge;
                updated += 1;
                stack.push(child);
            }
        }
        updated
    }

    /// True if `ancestor` lies on the parent chain of `id`
    pub fn is_ancestor(&self, ancestor: MotionId, id: MotionId) -> bool {
        let mut current = self.motions[id.0].parent;
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.motions[p.0].parent;
        }
        false
    }

    /// Motions from the root of `id` down to `id`
    pub fn path_to(&self, id: MotionId) -> Vec<MotionId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.motions[current.0].parent {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// Largest deviation between stored costs and costs summed along
    /// parent chains
    pub fn max_cost_error(&self, edge_cost: impl Fn(&S, &S) -> f64) -> f64 {
        self.iter()
            .map(|(_, motion)| match motion.parent {
                Some(p) => {
                    let parent = &self.motions[p.0];
                    (parent.cost + edge_cost(&parent.state, &motion.state) - motion.cost).abs()
                }
                None => motion.cost.abs(),
            })
            .fold(0.0, f64::max)
    }

    /// Remove every motion, handing the owned states to the caller
    pub fn drain_states(&mut self) -> Vec<S> {
        self.motions.drain(..).map(|m| m.state).collect()
    }
}
