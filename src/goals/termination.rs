//! Termination conditions
//!
//! Each condition is polled once per planner iteration.

use std::time::{Duration, Instant};

use crate::common::TerminationCondition;

/// Stop after a fixed number of polls
#[derive(Debug, Clone)]
pub struct IterationTermination {
    max_iterations: usize,
    polled: usize,
}

impl IterationTermination {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            polled: 0,
        }
    }

    /// Number of polls answered with "continue"
    pub fn iterations(&self) -> usize {
        self.polled.min(self.max_iterations)
    }
}

impl TerminationCondition for IterationTermination {
    fn should_terminate(&mut self) -> bool {
        if self.polled >= self.max_iterations {
            return true;
        }
        self.polled += 1;
        false
    }
}

/// Stop once a wall-clock budget has elapsed
#[derive(Debug, Clone)]
pub struct TimedTermination {
    deadline: Instant,
}

impl TimedTermination {
    pub fn new(budget: Duration) -> Self {
        Self {
            deadline: Instant::now() + budget,
        }
    }
}

impl TerminationCondition for TimedTermination {
    fn should_terminate(&mut self) -> bool {
        Instant::now() >= self.deadline
    }
}

/// Stop as soon as any inner condition fires
#[derive(Default)]
pub struct AnyTermination {
    conditions: Vec<Box<dyn TerminationCondition>>,
}

impl AnyTermination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, condition: impl TerminationCondition + 'static) -> Self {
        self.conditions.push(Box::new(condition));
        self
    }
}

impl TerminationCondition for AnyTermination {
    fn should_terminate(&mut self) -> bool {
        // Poll every condition so iteration counters stay in step.
        let mut stop = false;
        for condition in self.conditions.iter_mut() {
            stop |= condition.should_terminate();
        }
        stop
    }
}
