//! Sentinel algebra, evaluation and differentiation tests.

mod algebra_tests;
mod diff_tests;
