//! Numerical helpers around the compiled expressions.

pub mod finite_difference;

#[cfg(feature = "parallel")]
pub mod parallel;

#[cfg(feature = "parallel")]
pub use parallel::{assemble_columns, map_indices, run_all};
