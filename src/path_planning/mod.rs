// Path Planning algorithms module

pub mod ball_tree_rrt_star;
pub mod path;
pub mod simple_setup;

pub use ball_tree_rrt_star::*;
pub use path::*;
pub use simple_setup::*;
