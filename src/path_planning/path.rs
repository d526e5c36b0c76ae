//! Geometric paths and planner solutions

use itertools::Itertools;

use crate::common::StateSpace;

/// Sequence of states connected by straight motions
#[derive(Debug, Clone, PartialEq)]
pub struct PathGeometric<S> {
    pub states: Vec<S>,
}

impl<S: Clone> PathGeometric<S> {
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    pub fn from_states(states: Vec<S>) -> Self {
        Self { states }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Sum of segment lengths
    pub fn length<Sp>(&self, space: &Sp) -> f64
    where
        Sp: StateSpace<State = S>,
    {
        self.states
            .iter()
            .tuple_windows()
            .map(|(a, b)| space.distance(a, b))
            .sum()
    }

    /// True if every state and every segment is valid
    pub fn check<Sp>(&self, space: &Sp) -> bool
    where
        Sp: StateSpace<State = S>,
    {
        self.states.iter().all(|s| space.is_valid(s))
            && self
                .states
                .iter()
                .tuple_windows()
                .all(|(a, b)| space.check_motion(a, b).is_valid())
    }

    pub fn reverse(&mut self) {
        self.states.reverse();
    }

    pub fn append(&mut self, other: &PathGeometric<S>) {
        self.states.extend(other.states.iter().cloned());
    }

    /// Insert states so the path holds exactly `count` states
    ///
    /// New states are spread over segments in proportion to their length.
    /// Paths that already hold `count` or more states are left unchanged.
    pub fn interpolate<Sp>(&mut self, space: &Sp, count: usize)
    where
        Sp: StateSpace<State = S>,
    {
        let n = self.states.len();
        if n < 2 || count <= n {
            return;
        }
        let total = self.length(space);
        let segment_lengths: Vec<f64> = self
            .states
            .iter()
            .tuple_windows()
            .map(|(a, b)| space.distance(a, b))
            .collect();

        let mut to_add = count - n;
        let mut extra: Vec<usize> = segment_lengths
            .iter()
            .map(|&len| {
                if total > 0.0 {
                    ((len / total) * (count - n) as f64).floor() as usize
                } else {
                    0
                }
            })
            .collect();
        to_add -= extra.iter().sum::<usize>();
        // hand the remainder to the longest segments per inserted state
        while to_add > 0 {
            let (i, _) = segment_lengths
                .iter()
                .enumerate()
                .map(|(i, &len)| (i, len / (extra[i] + 1) as f64))
                .fold((0, f64::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });
            extra[i] += 1;
            to_add -= 1;
        }

        let mut states = Vec::with_capacity(count);
        for (i, (a, b)) in self.states.iter().tuple_windows().enumerate() {
            states.push(a.clone());
            let pieces = extra[i] + 1;
            for j in 1..pieces {
                states.push(space.interpolate(a, b, j as f64 / pieces as f64));
            }
        }
        states.push(self.states[n - 1].clone());
        self.states = states;
    }
}

impl<S: Clone> Default for PathGeometric<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Path reported by a planner
#[derive(Debug, Clone)]
pub struct Solution<S> {
    pub path: PathGeometric<S>,
    /// Cost of the last motion of the path as recorded in the tree
    pub cost: f64,
    /// True when the path does not reach the goal
    pub approximate: bool,
    /// Distance from the path end to the goal
    pub difference: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::CircleObstacle;
    use crate::spaces::{RealVectorBounds, RealVectorStateSpace};
    use approx::assert_relative_eq;

    fn plane() -> RealVectorStateSpace {
        RealVectorStateSpace::new(RealVectorBounds::uniform(2, 0.0, 10.0)).unwrap()
    }

    #[test]
    fn test_path_length() {
        let space = plane();
        let path = PathGeometric::from_states(vec![
            space.state(&[0.0, 0.0]),
            space.state(&[1.0, 0.0]),
            space.state(&[1.0, 1.0]),
        ]);
        assert_relative_eq!(path.length(&space), 2.0);
        assert_relative_eq!(PathGeometric::from_states(vec![space.state(&[1.0, 1.0])]).length(&space), 0.0);
    }

    #[test]
    fn test_path_check() {
        let space = plane().with_circle_obstacles(vec![CircleObstacle::new(5.0, 5.0, 1.0)], 0.0).unwrap();
        let blocked = PathGeometric::from_states(vec![space.state(&[2.0, 5.0]), space.state(&[8.0, 5.0])]);
        assert!(!blocked.check(&space));
        let around = PathGeometric::from_states(vec![
            space.state(&[2.0, 5.0]),
            space.state(&[5.0, 8.0]),
            space.state(&[8.0, 5.0]),
        ]);
        assert!(around.check(&space));
    }

    #[test]
    fn test_interpolate_count_and_endpoints() {
        let space = plane();
        let mut path = PathGeometric::from_states(vec![
            space.state(&[0.0, 0.0]),
            space.state(&[3.0, 0.0]),
            space.state(&[3.0, 1.0]),
        ]);
        let length = path.length(&space);
        path.interpolate(&space, 9);
        assert_eq!(path.len(), 9);
        assert_eq!(path.states[0], space.state(&[0.0, 0.0]));
        assert_eq!(path.states[8], space.state(&[3.0, 1.0]));
        assert_relative_eq!(path.length(&space), length, epsilon = 1e-9);
        // the long segment receives most of the new states
        let on_long = path.states.iter().filter(|s| s[1] == 0.0).count();
        assert!(on_long >= 6);
    }

    #[test]
    fn test_reverse_and_append() {
        let space = plane();
        let mut a = PathGeometric::from_states(vec![space.state(&[0.0, 0.0]), space.state(&[1.0, 0.0])]);
        let b = PathGeometric::from_states(vec![space.state(&[2.0, 0.0])]);
        a.append(&b);
        assert_eq!(a.len(), 3);
        a.reverse();
        assert_eq!(a.states[0], space.state(&[2.0, 0.0]));
    }
}
