//! Recorded planner graphs

use crate::common::GraphRecorder;

/// Edge list captured from a planner
///
/// Edges are kept in recording order; a motion that was rewired appears once
/// per parent it had.
#[derive(Debug, Clone)]
pub struct PlannerData<S> {
    edges: Vec<(Option<S>, S)>,
}

impl<S> Default for PlannerData<S> {
    fn default() -> Self {
        Self { edges: Vec::new() }
    }
}

impl<S> PlannerData<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// `(parent, child)` pairs; roots have no parent
    pub fn edges(&self) -> impl Iterator<Item = (Option<&S>, &S)> {
        self.edges.iter().map(|(p, c)| (p.as_ref(), c))
    }

    /// States recorded without a parent
    pub fn roots(&self) -> impl Iterator<Item = &S> {
        self.edges
            .iter()
            .filter(|(p, _)| p.is_none())
            .map(|(_, c)| c)
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }
}

impl<S: Clone> GraphRecorder<S> for PlannerData<S> {
    fn record_edge(&mut self, parent: Option<&S>, child: &S) {
        self.edges.push((parent.cloned(), child.clone()));
    }
}
