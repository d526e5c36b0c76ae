//! Visualization utilities for rust_motion_planning
//!
//! Plots planar planner trees, disc obstacles and solution paths with gnuplot.

use std::f64::consts::PI;

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{CircleObstacle, PlanningError, PlanningResult};
use crate::path_planning::PathGeometric;
use crate::spaces::RealVectorState;
use crate::utils::planner_data::PlannerData;

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00AA00";
    pub const BLUE: &str = "#0066FF";
    pub const GRAY: &str = "#AAAAAA";

    // Semantic colors
    pub const OBSTACLE: &str = BLACK;
    pub const START: &str = BLUE;
    pub const GOAL: &str = RED;
    pub const PATH: &str = GREEN;
    pub const TREE: &str = GRAY;
}

/// Style for path rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::new(colors::PATH, "Path").with_line_width(3.0)
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.5,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }
}

/// Outline of a disc as a closed polyline
pub fn circle_outline(obstacle: &CircleObstacle, segments: usize) -> (Vec<f64>, Vec<f64>) {
    (0..=segments)
        .map(|i| {
            let theta = 2.0 * PI * i as f64 / segments as f64;
            (
                obstacle.x + obstacle.radius * theta.cos(),
                obstacle.y + obstacle.radius * theta.sin(),
            )
        })
        .unzip()
}

/// Flatten tree edges into one polyline, separating edges with NaN gaps
pub fn tree_polyline(data: &PlannerData<RealVectorState>) -> (Vec<f64>, Vec<f64>) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for (parent, child) in data.edges() {
        if let Some(parent) = parent {
            x.extend([parent[0], child[0], f64::NAN]);
            y.extend([parent[1], child[1], f64::NAN]);
        }
    }
    (x, y)
}

/// Plot of a planar planner run
pub struct TreeVisualizer {
    figure: Figure,
    title: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
}

impl TreeVisualizer {
    pub fn new(title: &str) -> Self {
        Self {
            figure: Figure::new(),
            title: title.to_string(),
            x_range: None,
            y_range: None,
        }
    }

    pub fn set_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self.y_range = Some((min, max));
        self
    }

    /// Plot every recorded edge
    pub fn plot_tree(&mut self, data: &PlannerData<RealVectorState>) -> &mut Self {
        let (x, y) = tree_polyline(data);
        self.figure
            .axes2d()
            .lines(&x, &y, &[Caption("Tree"), Color(colors::TREE), LineWidth(0.5)]);
        self
    }

    pub fn plot_obstacles(&mut self, obstacles: &[CircleObstacle]) -> &mut Self {
        for (i, obstacle) in obstacles.iter().enumerate() {
            let (x, y) = circle_outline(obstacle, 36);
            let caption = if i == 0 { "Obstacles" } else { "" };
            self.figure.axes2d().lines(
                &x,
                &y,
                &[Caption(caption), Color(colors::OBSTACLE), LineWidth(1.5)],
            );
        }
        self
    }

    pub fn plot_path(&mut self, path: &PathGeometric<RealVectorState>, style: &PathStyle) -> &mut Self {
        let x: Vec<f64> = path.states.iter().map(|s| s[0]).collect();
        let y: Vec<f64> = path.states.iter().map(|s| s[1]).collect();
        self.figure.axes2d().lines(
            &x,
            &y,
            &[
                Caption(&style.caption),
                Color(&style.color),
                LineWidth(style.line_width),
            ],
        );
        self
    }

    pub fn plot_point(&mut self, state: &RealVectorState, style: &PointStyle) -> &mut Self {
        self.figure.axes2d().points(
            &[state[0]],
            &[state[1]],
            &[
                Caption(&style.caption),
                Color(&style.color),
                PointSymbol(style.symbol),
                PointSize(style.size),
            ],
        );
        self
    }

    pub fn plot_start(&mut self, state: &RealVectorState) -> &mut Self {
        self.plot_point(state, &PointStyle::new(colors::START, "Start"))
    }

    pub fn plot_goal(&mut self, state: &RealVectorState) -> &mut Self {
        self.plot_point(state, &PointStyle::new(colors::GOAL, "Goal"))
    }

    pub fn show(&mut self) -> PlanningResult<()> {
        self.apply_settings();
        self.figure
            .show()
            .map(|_| ())
            .map_err(|e| PlanningError::Visualization(e.to_string()))
    }

    pub fn save_png(&mut self, path: &str, width: u32, height: u32) -> PlanningResult<()> {
        self.apply_settings();
        self.figure
            .save_to_png(path, width, height)
            .map_err(|e| PlanningError::Visualization(e.to_string()))
    }

    pub fn save_svg(&mut self, path: &str) -> PlanningResult<()> {
        self.apply_settings();
        self.figure
            .save_to_svg(path, 800, 800)
            .map_err(|e| PlanningError::Visualization(e.to_string()))
    }

    fn apply_settings(&mut self) {
        let axes = self.figure.axes2d();
        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label("X [m]", &[]);
        axes.set_y_label("Y [m]", &[]);
        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.y_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        axes.set_aspect_ratio(AutoOption::Fix(1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::GraphRecorder;
    use approx::assert_relative_eq;

    #[test]
    fn test_circle_outline_is_closed() {
        let (x, y) = circle_outline(&CircleObstacle::new(1.0, 2.0, 0.5), 12);
        assert_eq!(x.len(), 13);
        assert_relative_eq!(x[0], x[12], epsilon = 1e-12);
        assert_relative_eq!(y[0], y[12], epsilon = 1e-12);
        for (px, py) in x.iter().zip(y.iter()) {
            assert_relative_eq!(((px - 1.0).powi(2) + (py - 2.0).powi(2)).sqrt(), 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_tree_polyline_skips_roots() {
        let mut data = PlannerData::new();
        let root = RealVectorState::from_vec(vec![0.0, 0.0]);
        let child = RealVectorState::from_vec(vec![1.0, 2.0]);
        data.record_edge(None, &root);
        data.record_edge(Some(&root), &child);
        let (x, y) = tree_polyline(&data);
        assert_eq!(x.len(), 3);
        assert_eq!(&y[..2], &[0.0, 2.0]);
        assert!(x[2].is_nan());
    }

    #[test]
    fn test_path_style() {
        let style = PathStyle::new(colors::RED, "Test Path").with_line_width(1.0);
        assert_eq!(style.line_width, 1.0);
        assert_eq!(PathStyle::default().color, colors::PATH);
    }
}
