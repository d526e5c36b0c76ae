//! Ball-tree RRT* parameters

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{PlanningError, PlanningResult};
use crate::datastructures::NearestNeighborsKind;

use super::connection::ConnectionPolicy;

/// How costs are updated when a motion is rewired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostPropagation {
    /// Update the rewired motion and every descendant
    #[default]
    Subtree,
    /// Update the rewired motion only; descendants keep stale costs
    LocalOnly,
}

/// Configuration for the ball-tree RRT* planner
///
/// Unset values are derived from the state space in `setup`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallTreeRRTStarConfig {
    /// Maximum extension distance; `0` selects 20% of the space extent
    pub range: f64,
    /// Probability of sampling the goal when the goal can be sampled
    pub goal_bias: f64,
    /// Constant K of the connection radius; default `range * sqrt(dim)`
    pub ball_radius_constant: Option<f64>,
    /// Upper bound of the connection radius; default the space extent
    pub max_ball_radius: Option<f64>,
    /// Exploration radius given to new motions; default the space extent
    pub initial_volume_radius: Option<f64>,
    /// Consecutive ball rejections tolerated before a draw is used anyway
    pub max_volume_rejections: Option<usize>,
    /// Parent selection policy
    pub connection: ConnectionPolicy,
    /// Index used for neighbor queries
    pub nearest_neighbors: NearestNeighborsKind,
    /// Cost update policy on rewire
    pub cost_propagation: CostPropagation,
    /// Random seed; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for BallTreeRRTStarConfig {
    fn default() -> Self {
        Self {
            range: 0.0,
            goal_bias: 0.05,
            ball_radius_constant: None,
            max_ball_radius: None,
            initial_volume_radius: None,
            max_volume_rejections: Some(100),
            connection: ConnectionPolicy::Delayed,
            nearest_neighbors: NearestNeighborsKind::SqrtApprox,
            cost_propagation: CostPropagation::Subtree,
            seed: None,
        }
    }
}

impl BallTreeRRTStarConfig {
    pub fn with_range(mut self, range: f64) -> Self {
        self.range = range;
        self
    }

    pub fn with_goal_bias(mut self, goal_bias: f64) -> Self {
        self.goal_bias = goal_bias;
        self
    }

    pub fn with_ball_radius_constant(mut self, k: f64) -> Self {
        self.ball_radius_constant = Some(k);
        self
    }

    pub fn with_max_ball_radius(mut self, radius: f64) -> Self {
        self.max_ball_radius = Some(radius);
        self
    }

    pub fn with_initial_volume_radius(mut self, radius: f64) -> Self {
        self.initial_volume_radius = Some(radius);
        self
    }

    pub fn with_max_volume_rejections(mut self, limit: Option<usize>) -> Self {
        self.max_volume_rejections = limit;
        self
    }

    pub fn with_connection(mut self, connection: ConnectionPolicy) -> Self {
        self.connection = connection;
        self
    }

    pub fn with_nearest_neighbors(mut self, kind: NearestNeighborsKind) -> Self {
        self.nearest_neighbors = kind;
        self
    }

    pub fn with_cost_propagation(mut self, propagation: CostPropagation) -> Self {
        self.cost_propagation = propagation;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check parameter ranges
    pub fn validate(&self) -> PlanningResult<()> {
        if !(self.range >= 0.0) || !self.range.is_finite() {
            return Err(invalid(format!("range must be finite and >= 0, got {}", self.range)));
        }
        if !(0.0..=1.0).contains(&self.goal_bias) {
            return Err(invalid(format!("goal_bias must be in [0, 1], got {}", self.goal_bias)));
        }
        for (name, value) in [
            ("ball_radius_constant", self.ball_radius_constant),
            ("max_ball_radius", self.max_ball_radius),
            ("initial_volume_radius", self.initial_volume_radius),
        ] {
            if let Some(v) = value {
                if !(v > 0.0) {
                    return Err(invalid(format!("{} must be > 0, got {}", name, v)));
                }
            }
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> PlanningResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> PlanningResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

fn invalid(msg: String) -> PlanningError {
    PlanningError::InvalidParameter(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = BallTreeRRTStarConfig::default();
        assert_eq!(config.goal_bias, 0.05);
        assert_eq!(config.connection, ConnectionPolicy::Delayed);
        assert_eq!(config.cost_propagation, CostPropagation::Subtree);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(BallTreeRRTStarConfig::default().with_goal_bias(1.5).validate().is_err());
        assert!(BallTreeRRTStarConfig::default().with_range(-1.0).validate().is_err());
        assert!(BallTreeRRTStarConfig::default().with_range(f64::NAN).validate().is_err());
        assert!(BallTreeRRTStarConfig::default()
            .with_initial_volume_radius(0.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_config_from_toml() {
        let config = BallTreeRRTStarConfig::from_toml_str(
            r#"
            range = 1.5
            goal_bias = 0.1
            connection = "eager"
            nearest_neighbors = "linear"
            cost_propagation = "local_only"
            seed = 42
            "#,
        )
        .unwrap();
        assert_eq!(config.range, 1.5);
        assert_eq!(config.connection, ConnectionPolicy::Eager);
        assert_eq!(config.nearest_neighbors, NearestNeighborsKind::Linear);
        assert_eq!(config.cost_propagation, CostPropagation::LocalOnly);
        assert_eq!(config.seed, Some(42));
        // untouched fields keep their defaults
        assert_eq!(config.max_volume_rejections, Some(100));
    }

    #[test]
    fn test_demo_config_file_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/ball_tree_rrt_star.toml");
        let config = BallTreeRRTStarConfig::from_file(&path).unwrap();
        assert_eq!(config.range, 2.0);
        assert_eq!(config.seed, Some(42));
        assert!(matches!(
            BallTreeRRTStarConfig::from_file(Path::new("does/not/exist.toml")),
            Err(PlanningError::Io(_))
        ));
    }

    #[test]
    fn test_config_from_toml_rejects_bad_values() {
        assert!(matches!(
            BallTreeRRTStarConfig::from_toml_str("goal_bias = 2.0"),
            Err(PlanningError::InvalidParameter(_))
        ));
        assert!(matches!(
            BallTreeRRTStarConfig::from_toml_str("connection = \"sometimes\""),
            Err(PlanningError::ConfigParse(_))
        ));
    }
}
