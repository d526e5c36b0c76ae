// Ball-tree RRT* path planning demo
//
// usage: ball_tree_rrt_star [config.toml]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use rust_motion_planning::common::{CircleObstacle, PlanningResult, StateSpace};
use rust_motion_planning::goals::GoalState;
use rust_motion_planning::path_planning::{BallTreeRRTStarConfig, SimpleSetup};
use rust_motion_planning::spaces::{RealVectorBounds, RealVectorStateSpace};
use rust_motion_planning::utils::{PathStyle, PlannerData, TreeVisualizer};

const OUTPUT_DIR: &str = "img/path_planning";

fn main() -> PlanningResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = match args.get(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            BallTreeRRTStarConfig::from_file(Path::new(path))?
        }
        None => BallTreeRRTStarConfig::default().with_range(2.0).with_goal_bias(0.2),
    };

    // Obstacle list [x, y, radius]
    let obstacles: Vec<CircleObstacle> = vec![
        (5.0, 5.0, 1.0),
        (3.0, 6.0, 2.0),
        (3.0, 8.0, 2.0),
        (3.0, 10.0, 2.0),
        (7.0, 5.0, 2.0),
        (9.0, 5.0, 2.0),
        (8.0, 10.0, 1.0),
        (6.0, 12.0, 1.0),
    ]
    .into_iter()
    .map(CircleObstacle::from)
    .collect();
    let robot_radius = 0.3;

    let space = Arc::new(
        RealVectorStateSpace::new(RealVectorBounds::uniform(2, -2.0, 15.0))?
            .with_circle_obstacles(obstacles.clone(), robot_radius)?,
    );
    let start = space.state(&[0.0, 0.0]);
    let goal = space.state(&[6.0, 10.0]);

    let mut ss = SimpleSetup::new(Arc::clone(&space), config)?;
    ss.add_start_state(space.clone_state(&start))?;
    ss.set_goal(GoalState::new(Arc::clone(&space), space.clone_state(&goal), 0.5)?);

    let status = ss.solve_for(Duration::from_secs(2));
    let stats = ss.planner().stats();
    info!(
        "{} motions, {} rewires, {} volume rejections, {} volume trims",
        stats.motions, stats.rewires, stats.volume_rejections, stats.volume_trims
    );

    let mut data = PlannerData::new();
    ss.planner_data(&mut data);

    let mut vis = TreeVisualizer::new("Ball-tree RRT*");
    vis.set_range(-2.0, 15.0)
        .plot_tree(&data)
        .plot_obstacles(&obstacles);

    match ss.solution_path() {
        Ok(path) => {
            info!(
                "{}: {} states, length {:.3}",
                status,
                path.len(),
                path.length(space.as_ref())
            );
            let mut path = path.clone();
            path.interpolate(space.as_ref(), 100);
            vis.plot_path(&path, &PathStyle::default());
        }
        Err(e) => warn!("{}", e),
    }
    vis.plot_start(&start).plot_goal(&goal);

    std::fs::create_dir_all(OUTPUT_DIR)?;
    let output = format!("{}/ball_tree_rrt_star_result.png", OUTPUT_DIR);
    vis.save_png(&output, 800, 800)?;
    info!("Ball-tree RRT* result saved to {}", output);
    Ok(())
}
