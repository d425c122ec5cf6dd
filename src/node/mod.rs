//! # Expression trees
//!
//! A compiled expression is an owned tree of [`Node`]s. Leaves are constants,
//! literal tensors and variables; interior nodes apply a [`UnaryFn`] or a
//! [`BinaryFn`], so every interior node has exactly the number of children
//! its operator takes.
//!
//! Variables hold the [`Fetcher`] they were bound to when the tree was built.
//! Each evaluation calls the fetcher again, so a tree always sees the current
//! values of whatever state the fetcher reads.

pub mod builder;
mod diff;
mod display;
mod eval;

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

pub use crate::token::algebra::{BinaryFn, UnaryFn};
pub use builder::{build, NodeConstructor, NodeConstructorMap};

use crate::tensor::Tensor;
use crate::token::Constant;

/// Zero-argument callback returning the current value of a variable.
pub type Fetcher = Arc<dyn Fn() -> Tensor + Send + Sync>;

/// Variable name to fetcher.
pub type FetcherMap = HashMap<String, Fetcher>;

/// Wrap a closure as a [`Fetcher`].
pub fn fetcher<F>(f: F) -> Fetcher
where
    F: Fn() -> Tensor + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A fetcher that always returns a copy of `value`.
pub fn constant_fetcher(value: Tensor) -> Fetcher {
    Arc::new(move || value.clone())
}

/// A variable leaf bound to its fetcher.
#[derive(Clone)]
pub struct VariableLeaf {
    name: String,
    fetcher: Fetcher,
}

impl VariableLeaf {
    pub fn new(name: impl Into<String>, fetcher: Fetcher) -> Self {
        Self {
            name: name.into(),
            fetcher,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the current value.
    pub fn fetch(&self) -> Tensor {
        (self.fetcher)()
    }
}

impl fmt::Debug for VariableLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableLeaf")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Leaves compare by name; fetchers are not comparable.
impl PartialEq for VariableLeaf {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// A node of an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Exactly known constant
    Number(Constant),

    /// Literal tensor
    Tensor(Tensor),

    /// Variable read through its fetcher
    Variable(VariableLeaf),

    /// Unary operator or single-argument function
    Unary(UnaryFn, Box<Node>),

    /// Binary operator or two-argument function
    Binary(BinaryFn, Box<Node>, Box<Node>),
}

impl Node {
    pub fn unary(func: UnaryFn, child: Node) -> Self {
        Node::Unary(func, Box::new(child))
    }

    pub fn binary(op: BinaryFn, lhs: Node, rhs: Node) -> Self {
        Node::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn variable(name: impl Into<String>, fetcher: Fetcher) -> Self {
        Node::Variable(VariableLeaf::new(name, fetcher))
    }

    /// Names of the variables referenced by the tree, sorted and deduplicated.
    pub fn variables(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        self.collect_variables(&mut names);
        names.into_iter().collect()
    }

    fn collect_variables(&self, names: &mut BTreeSet<String>) {
        match self {
            Self::Number(_) | Self::Tensor(_) => {}
            Self::Variable(leaf) => {
                names.insert(leaf.name.clone());
            }
            Self::Unary(_, child) => child.collect_variables(names),
            Self::Binary(_, lhs, rhs) => {
                lhs.collect_variables(names);
                rhs.collect_variables(names);
            }
        }
    }

    /// Whether the tree contains no variable leaves.
    pub fn is_constant(&self) -> bool {
        match self {
            Self::Number(_) | Self::Tensor(_) => true,
            Self::Variable(_) => false,
            Self::Unary(_, child) => child.is_constant(),
            Self::Binary(_, lhs, rhs) => lhs.is_constant() && rhs.is_constant(),
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Self::Number(_) | Self::Tensor(_) | Self::Variable(_) => 1,
            Self::Unary(_, child) => 1 + child.node_count(),
            Self::Binary(_, lhs, rhs) => 1 + lhs.node_count() + rhs.node_count(),
        }
    }
}
