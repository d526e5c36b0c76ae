//! Nearest-neighbor indices over externally owned items
//!
//! Items are cheap handles (typically arena indices). Queries receive the
//! metric as a closure mapping an item to its distance from the query
//! point, so the index never needs to see the states themselves.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

/// Distance from the query point to an indexed item
pub type QueryDistance<'a, T> = &'a dyn Fn(T) -> f64;

/// Insert-only spatial index
pub trait NearestNeighbors<T: Copy> {
    fn add(&mut self, item: T);

    /// Some previously inserted item close to the query; `None` when empty
    fn nearest(&self, distance: QueryDistance<'_, T>) -> Option<T>;

    /// Every item within `radius` of the query, in no particular order
    fn nearest_r(&self, distance: QueryDistance<'_, T>, radius: f64) -> Vec<T>;

    fn size(&self) -> usize;

    fn list(&self) -> &[T];

    fn clear(&mut self);

    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

/// Index variants selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NearestNeighborsKind {
    /// Exact brute-force search
    Linear,
    /// Examines about `sqrt(n)` items for `nearest`; radius queries stay exact
    #[default]
    SqrtApprox,
}

impl NearestNeighborsKind {
    pub fn build<T: Copy + 'static>(self) -> Box<dyn NearestNeighbors<T>> {
        match self {
            NearestNeighborsKind::Linear => Box::new(LinearNearestNeighbors::new()),
            NearestNeighborsKind::SqrtApprox => Box::new(SqrtApproxNearestNeighbors::new()),
        }
    }
}

fn nearest_of<T: Copy>(items: impl Iterator<Item = T>, distance: QueryDistance<'_, T>) -> Option<T> {
    let mut best: Option<(T, f64)> = None;
    for item in items {
        let d = distance(item);
        // strict comparison keeps the earliest candidate on ties
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((item, d));
        }
    }
    best.map(|(item, _)| item)
}

fn scan_radius<T: Copy>(items: &[T], distance: QueryDistance<'_, T>, radius: f64) -> Vec<T> {
    items
        .iter()
        .copied()
        .filter(|&item| distance(item) <= radius)
        .collect()
}

/// Brute-force exact index
#[derive(Debug, Clone, Default)]
pub struct LinearNearestNeighbors<T> {
    items: Vec<T>,
}

impl<T: Copy> LinearNearestNeighbors<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Copy> NearestNeighbors<T> for LinearNearestNeighbors<T> {
    fn add(&mut self, item: T) {
        self.items.push(item);
    }

    fn nearest(&self, distance: QueryDistance<'_, T>) -> Option<T> {
        nearest_of(self.items.iter().copied(), distance)
    }

    fn nearest_r(&self, distance: QueryDistance<'_, T>, radius: f64) -> Vec<T> {
        scan_radius(&self.items, distance, radius)
    }

    fn size(&self) -> usize {
        self.items.len()
    }

    fn list(&self) -> &[T] {
        &self.items
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}

/// Approximate index checking `1 + floor(sqrt(n))` strided items per query
///
/// The stride start rotates after every `nearest` call so successive
/// queries cover different subsets.
#[derive(Debug, Clone, Default)]
pub struct SqrtApproxNearestNeighbors<T> {
    items: Vec<T>,
    checks: usize,
    offset: Cell<usize>,
}

impl<T: Copy> SqrtApproxNearestNeighbors<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            checks: 0,
            offset: Cell::new(0),
        }
    }

    fn update_check_count(&mut self) {
        self.checks = 1 + (self.items.len() as f64).sqrt().floor() as usize;
    }
}

impl<T: Copy> NearestNeighbors<T> for SqrtApproxNearestNeighbors<T> {
    fn add(&mut self, item: T) {
        self.items.push(item);
        self.update_check_count();
    }

    fn nearest(&self, distance: QueryDistance<'_, T>) -> Option<T> {
        let n = self.items.len();
        if n == 0 {
            return None;
        }
        if n <= self.checks {
            return nearest_of(self.items.iter().copied(), distance);
        }
        let offset = self.offset.get();
        let checks = self.checks;
        let found = nearest_of(
            (0..checks).map(|j| self.items[(j * checks + offset) % n]),
            distance,
        );
        self.offset.set((offset + 1) % checks);
        found
    }

    fn nearest_r(&self, distance: QueryDistance<'_, T>, radius: f64) -> Vec<T> {
        scan_radius(&self.items, distance, radius)
    }

    fn size(&self) -> usize {
        self.items.len()
    }

    fn list(&self) -> &[T] {
        &self.items
    }

    fn clear(&mut self) {
        self.items.clear();
        self.checks = 0;
        self.offset.set(0);
    }
}
