//! Postfix tokens to node trees.
//!
//! A stack machine: operands push leaves, operator and function tokens pop
//! exactly as many sub-trees as they take and push the node built by the
//! constructor registered for their id. Adding a function only needs a new
//! entry in the [`NodeConstructorMap`].

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use log::debug;

use super::{BinaryFn, FetcherMap, Node, UnaryFn, VariableLeaf};
use crate::error::{BindingError, BuildError, Result};
use crate::token::{ids, Token, TokenId};

/// Builds an interior node from its children, left operand first.
pub type NodeConstructor = Arc<dyn Fn(Vec<Node>) -> std::result::Result<Node, BuildError> + Send + Sync>;

/// Token id to node constructor.
#[derive(Clone)]
pub struct NodeConstructorMap {
    constructors: HashMap<TokenId, NodeConstructor>,
}

impl fmt::Debug for NodeConstructorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registered: Vec<_> = self.constructors.keys().copied().collect();
        registered.sort_unstable();
        f.debug_struct("NodeConstructorMap")
            .field("ids", &registered)
            .finish()
    }
}

/// Registers every default operator and function.
impl Default for NodeConstructorMap {
    fn default() -> Self {
        let mut map = Self::empty();
        for func in UnaryFn::ALL {
            map.register(func.id(), unary_constructor(func));
        }
        for (id, op) in [
            (ids::ADD, BinaryFn::Add),
            (ids::SUB, BinaryFn::Sub),
            (ids::MUL, BinaryFn::Mul),
            (ids::DIV, BinaryFn::Div),
            (ids::POW, BinaryFn::Pow),
            (ids::POW_FN, BinaryFn::Pow),
            (ids::ATAN2, BinaryFn::Atan2),
        ] {
            map.register(id, binary_constructor(id, op));
        }
        map
    }
}

impl NodeConstructorMap {
    /// A map with no constructors.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Register a constructor, replacing any previous one for `id`.
    pub fn register(&mut self, id: TokenId, constructor: NodeConstructor) {
        self.constructors.insert(id, constructor);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, id: TokenId, constructor: NodeConstructor) -> Self {
        self.register(id, constructor);
        self
    }

    pub fn get(&self, id: TokenId) -> Option<&NodeConstructor> {
        self.constructors.get(&id)
    }

    pub fn contains(&self, id: TokenId) -> bool {
        self.constructors.contains_key(&id)
    }
}

fn take_children<const N: usize>(
    id: TokenId,
    children: Vec<Node>,
) -> std::result::Result<[Node; N], BuildError> {
    let found = children.len();
    children
        .try_into()
        .map_err(|_| BuildError::ArityMismatch {
            id,
            expected: N,
            found,
        })
}

/// Constructor for a unary node of `func`.
pub fn unary_constructor(func: UnaryFn) -> NodeConstructor {
    Arc::new(move |children: Vec<Node>| -> std::result::Result<Node, BuildError> {
        let [child] = take_children::<1>(func.id(), children)?;
        Ok(Node::unary(func, child))
    })
}

/// Constructor for a binary node of `op`, registered under `id`.
pub fn binary_constructor(id: TokenId, op: BinaryFn) -> NodeConstructor {
    Arc::new(move |children: Vec<Node>| -> std::result::Result<Node, BuildError> {
        let [lhs, rhs] = take_children::<2>(id, children)?;
        Ok(Node::binary(op, lhs, rhs))
    })
}

/// Build a node tree from postfix tokens.
///
/// Variables are bound to their fetchers here; a name missing from
/// `fetchers` is a [`BindingError`].
pub fn build(
    postfix: VecDeque<Token>,
    constructors: &NodeConstructorMap,
    fetchers: &FetcherMap,
) -> Result<Node> {
    let mut stack: Vec<Node> = Vec::with_capacity(postfix.len());

    for token in postfix {
        match token {
            Token::Constant(c) => stack.push(Node::Number(c)),
            Token::Variable(var) => {
                let fetcher = fetchers
                    .get(&var.name)
                    .ok_or_else(|| BindingError::UnboundVariable {
                        name: var.name.clone(),
                    })?;
                stack.push(Node::Variable(VariableLeaf::new(var.name, Arc::clone(fetcher))));
            }
            Token::UnaryOperator(_) | Token::BinaryOperator(_) | Token::Function(_) => {
                let id = token.id();
                let needed = token.arity();
                let constructor = constructors
                    .get(id)
                    .ok_or(BuildError::MissingConstructor { id })?;
                if stack.len() < needed {
                    return Err(BuildError::StackUnderflow {
                        id,
                        needed,
                        available: stack.len(),
                    }
                    .into());
                }
                let children = stack.split_off(stack.len() - needed);
                stack.push(constructor(children)?);
            }
            other => return Err(BuildError::UnexpectedToken { id: other.id() }.into()),
        }
    }

    if stack.len() != 1 {
        return Err(BuildError::Unreduced {
            remaining: stack.len(),
        }
        .into());
    }

    let root = stack.pop().ok_or(BuildError::Unreduced { remaining: 0 })?;
    debug!("built expression tree with {} nodes", root.node_count());
    Ok(root)
}
