//! # exprdiff-rs
//!
//! `exprdiff-rs` compiles textual formulas such as `S0*exp(-b*ADC)` into
//! expression trees that can be evaluated and differentiated exactly,
//! without a general automatic differentiation engine.
//!
//! The library provides:
//! - A context-sensitive lexer with configurable operators, functions and variables
//! - A shunting-yard parser and an AST builder with pluggable node constructors
//! - Sentinel algebra (`0`, `1`, `-1`, `NaN`) that keeps constant sub-trees exact
//! - Numeric (`diff`) and symbolic (`derivative`) differentiation
//! - A model layer assembling values, Jacobians and Hessians for least-squares solvers
//!
//! ## Basic Usage
//!
//! ```
//! use exprdiff_rs::{Expression, LexContext};
//! use exprdiff_rs::node::{constant_fetcher, FetcherMap};
//! use ndarray::arr1;
//!
//! let ctx = LexContext::new().with_variables(["x", "b", "y"]);
//! let mut fetchers = FetcherMap::new();
//! fetchers.insert("x".to_string(), constant_fetcher(arr1(&[2.0]).into_dyn()));
//! fetchers.insert("b".to_string(), constant_fetcher(arr1(&[0.5]).into_dyn()));
//! fetchers.insert("y".to_string(), constant_fetcher(arr1(&[0.0]).into_dyn()));
//!
//! let expr = Expression::compile("x*exp(-b*y)", &ctx, &fetchers).unwrap();
//! assert_eq!(expr.eval_tensor().unwrap()[[0]], 2.0);
//!
//! let dy = expr.diff("y").unwrap().to_tensor().unwrap();
//! assert_eq!(dy[[0]], -1.0);
//! ```

pub mod error;
pub mod evaluated;
pub mod expression;
pub mod lexer;
pub mod model;
pub mod node;
pub mod problem;
pub mod shunter;
pub mod tensor;
pub mod token;
pub mod utils;

// Re-exports for convenience
pub use error::{ExprError, Result};
pub use evaluated::Evaluated;
pub use expression::{Expression, Runner};
pub use lexer::{lex, LexContext, Lexer};
pub use model::{ExprModel, ModelSpec, VariableStore};
pub use node::{build, BinaryFn, Node, NodeConstructorMap, UnaryFn};
pub use problem::{ExprProblem, Problem};
pub use shunter::Shunter;
pub use tensor::{Shape, Tensor};
pub use token::{Constant, Token};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
