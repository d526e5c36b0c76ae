//! Bounded Euclidean configuration space
//!
//! States are `nalgebra::DVector<f64>`. Validity is the bounds test plus a
//! pluggable checker; motions are validated by stepping along the segment
//! at a fixed fraction of the space extent.

use nalgebra::DVector;
use rand::RngCore;
use rand_distr::{Distribution, Uniform};

use crate::common::{CircleObstacle, MotionCheck, PlanningError, PlanningResult, StateSpace};

pub type RealVectorState = DVector<f64>;

type ValidityFn = Box<dyn Fn(&RealVectorState) -> bool>;

/// Axis-aligned bounds of a real vector space
#[derive(Debug, Clone, PartialEq)]
pub struct RealVectorBounds {
    pub low: Vec<f64>,
    pub high: Vec<f64>,
}

impl RealVectorBounds {
    pub fn new(low: Vec<f64>, high: Vec<f64>) -> Self {
        Self { low, high }
    }

    /// Same `[low, high]` interval on every axis
    pub fn uniform(dimension: usize, low: f64, high: f64) -> Self {
        Self {
            low: vec![low; dimension],
            high: vec![high; dimension],
        }
    }

    pub fn check(&self) -> PlanningResult<()> {
        if self.low.is_empty() || self.low.len() != self.high.len() {
            return Err(PlanningError::InvalidParameter(format!(
                "bounds need matching non-empty low/high, got {} and {}",
                self.low.len(),
                self.high.len()
            )));
        }
        if let Some(axis) = (0..self.low.len()).find(|&i| !(self.low[i] < self.high[i])) {
            return Err(PlanningError::InvalidParameter(format!(
                "bounds on axis {} are empty: [{}, {}]",
                axis, self.low[axis], self.high[axis]
            )));
        }
        Ok(())
    }
}

/// Euclidean space with box bounds
pub struct RealVectorStateSpace {
    bounds: RealVectorBounds,
    samplers: Vec<Uniform<f64>>,
    validity: ValidityFn,
    longest_valid_segment_fraction: f64,
    extent: f64,
}

impl RealVectorStateSpace {
    pub fn new(bounds: RealVectorBounds) -> PlanningResult<Self> {
        bounds.check()?;
        let samplers = bounds
            .low
            .iter()
            .zip(bounds.high.iter())
            .map(|(&low, &high)| Uniform::new_inclusive(low, high))
            .collect();
        let extent = bounds
            .low
            .iter()
            .zip(bounds.high.iter())
            .map(|(low, high)| (high - low).powi(2))
            .sum::<f64>()
            .sqrt();
        Ok(Self {
            bounds,
            samplers,
            validity: Box::new(|_| true),
            longest_valid_segment_fraction: 0.01,
            extent,
        })
    }

    /// Replace the collision checker; the bounds test always applies
    pub fn with_validity_checker(
        mut self,
        checker: impl Fn(&RealVectorState) -> bool + 'static,
    ) -> Self {
        self.validity = Box::new(checker);
        self
    }

    /// Disc obstacles in the first two coordinates, inflated by `robot_radius`
    pub fn with_circle_obstacles(
        self,
        obstacles: Vec<CircleObstacle>,
        robot_radius: f64,
    ) -> PlanningResult<Self> {
        if self.bounds.low.len() < 2 {
            return Err(PlanningError::InvalidParameter(format!(
                "disc obstacles need at least 2 dimensions, space has {}",
                self.bounds.low.len()
            )));
        }
        Ok(self.with_validity_checker(move |s| {
            obstacles
                .iter()
                .all(|obs| !obs.contains(s[0], s[1], robot_radius))
        }))
    }

    /// Resolution of motion validation as a fraction of the space extent
    pub fn with_longest_valid_segment_fraction(mut self, fraction: f64) -> PlanningResult<Self> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(PlanningError::InvalidParameter(format!(
                "longest valid segment fraction must be in (0, 1], got {}",
                fraction
            )));
        }
        self.longest_valid_segment_fraction = fraction;
        Ok(self)
    }

    pub fn bounds(&self) -> &RealVectorBounds {
        &self.bounds
    }

    /// Build a state of this space
    pub fn state(&self, values: &[f64]) -> RealVectorState {
        DVector::from_column_slice(values)
    }

    pub fn satisfies_bounds(&self, state: &RealVectorState) -> bool {
        state.len() == self.bounds.low.len()
            && state
                .iter()
                .zip(self.bounds.low.iter().zip(self.bounds.high.iter()))
                .all(|(&v, (&low, &high))| v >= low && v <= high)
    }

    fn segment_count(&self, from: &RealVectorState, to: &RealVectorState) -> usize {
        let step = self.longest_valid_segment_fraction * self.extent;
        ((self.distance(from, to) / step).ceil() as usize).max(1)
    }
}

impl StateSpace for RealVectorStateSpace {
    type State = RealVectorState;

    fn distance(&self, a: &RealVectorState, b: &RealVectorState) -> f64 {
        (a - b).norm()
    }

    fn interpolate(&self, from: &RealVectorState, to: &RealVectorState, t: f64) -> RealVectorState {
        from + (to - from) * t
    }

    fn sample_uniform(&self, rng: &mut dyn RngCore) -> RealVectorState {
        DVector::from_iterator(
            self.samplers.len(),
            self.samplers.iter().map(|u| u.sample(&mut *rng)),
        )
    }

    fn is_valid(&self, state: &RealVectorState) -> bool {
        self.satisfies_bounds(state) && (self.validity)(state)
    }

    fn check_motion(&self, from: &RealVectorState, to: &RealVectorState) -> MotionCheck<RealVectorState> {
        let segments = self.segment_count(from, to);
        for j in 1..=segments {
            let t = j as f64 / segments as f64;
            if !self.is_valid(&self.interpolate(from, to, t)) {
                let fraction = (j - 1) as f64 / segments as f64;
                return MotionCheck::Invalid {
                    last_valid: self.interpolate(from, to, fraction),
                    fraction,
                };
            }
        }
        MotionCheck::Valid
    }

    fn maximum_extent(&self) -> f64 {
        self.extent
    }

    fn dimension(&self) -> usize {
        self.bounds.low.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn plane() -> RealVectorStateSpace {
        RealVectorStateSpace::new(RealVectorBounds::uniform(2, 0.0, 10.0)).unwrap()
    }

    #[test]
    fn test_extent_and_distance() {
        let space = plane();
        assert_relative_eq!(space.maximum_extent(), 200.0_f64.sqrt());
        assert_eq!(space.dimension(), 2);
        let a = space.state(&[0.0, 0.0]);
        let b = space.state(&[3.0, 4.0]);
        assert_relative_eq!(space.distance(&a, &b), 5.0);
        let mid = space.interpolate(&a, &b, 0.5);
        assert_relative_eq!(mid[0], 1.5);
        assert_relative_eq!(mid[1], 2.0);
    }

    #[test]
    fn test_samples_stay_in_bounds() {
        let space = plane();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let s = space.sample_uniform(&mut rng);
            assert!(space.satisfies_bounds(&s));
        }
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        assert!(RealVectorStateSpace::new(RealVectorBounds::uniform(2, 1.0, 1.0)).is_err());
        assert!(RealVectorStateSpace::new(RealVectorBounds::new(vec![0.0], vec![])).is_err());
        assert!(plane().with_longest_valid_segment_fraction(0.0).is_err());
    }

    #[test]
    fn test_check_motion_reports_last_valid() {
        let space = plane()
            .with_circle_obstacles(vec![CircleObstacle::new(5.0, 5.0, 1.0)], 0.0)
            .unwrap();
        let a = space.state(&[1.0, 5.0]);
        let b = space.state(&[9.0, 5.0]);
        match space.check_motion(&a, &b) {
            MotionCheck::Invalid { last_valid, fraction } => {
                assert!(space.is_valid(&last_valid));
                assert!(last_valid[0] < 4.0 + 1e-9);
                assert!(fraction > 0.0 && fraction < 1.0);
            }
            MotionCheck::Valid => panic!("motion through the obstacle must fail"),
        }
        let c = space.state(&[1.0, 1.0]);
        let d = space.state(&[9.0, 1.0]);
        assert!(space.check_motion(&c, &d).is_valid());
    }

    #[test]
    fn test_out_of_bounds_is_invalid() {
        let space = plane();
        assert!(!space.is_valid(&space.state(&[-0.1, 5.0])));
        assert!(!space.is_valid(&space.state(&[5.0])));
        assert!(space.is_valid(&space.state(&[10.0, 0.0])));
    }

    #[test]
    fn test_circle_obstacles_need_a_plane() {
        let line = RealVectorStateSpace::new(RealVectorBounds::uniform(1, 0.0, 10.0)).unwrap();
        assert!(matches!(
            line.with_circle_obstacles(vec![CircleObstacle::new(5.0, 0.0, 1.0)], 0.0),
            Err(PlanningError::InvalidParameter(_))
        ));
    }
}
