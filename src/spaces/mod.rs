//! Concrete configuration spaces

pub mod real_vector;

pub use real_vector::*;
