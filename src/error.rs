use thiserror::Error;

use crate::token::TokenId;

/// Errors raised while turning an expression string into tokens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    /// No lexing rule matched the remaining input.
    #[error("no token matches the remaining input: '{remaining}'")]
    NoMatch { remaining: String },

    /// A binary operator followed a token that is on its disallow list.
    #[error("token with id {previous} is disallowed before binary operator with id {operator}")]
    DisallowedAdjacency { previous: TokenId, operator: TokenId },

    /// A function name was not immediately followed by '('.
    #[error("function '{name}' must be followed by '('")]
    MissingCallParen { name: String },

    /// The parentheses of a function call never closed.
    #[error("parentheses after function '{name}' did not match")]
    UnbalancedCall { name: String },

    /// The number of top-level commas in a function call did not match its arity.
    #[error("function '{name}' expects {expected} argument(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    /// A number literal could not be converted to a float.
    #[error("invalid number literal: '{literal}'")]
    InvalidNumber { literal: String },
}

/// Errors raised by the shunting-yard pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("mismatched parentheses")]
    MismatchedParentheses,

    #[error("operator stack was not empty after shunting ({remaining} token(s) left)")]
    LeftoverOperators { remaining: usize },

    #[error("token with id {id} can not appear in a lexed expression")]
    UnexpectedToken { id: TokenId },

    #[error("token with id {id} must not be on the operator stack")]
    UnexpectedStackToken { id: TokenId },
}

/// Errors raised while building a node tree from postfix tokens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("no node constructor registered for token id {id}")]
    MissingConstructor { id: TokenId },

    #[error("token with id {id} needs {needed} operand(s) but only {available} were available")]
    StackUnderflow {
        id: TokenId,
        needed: usize,
        available: usize,
    },

    #[error("constructor for token id {id} received {found} children, expected {expected}")]
    ArityMismatch {
        id: TokenId,
        expected: usize,
        found: usize,
    },

    #[error("expression did not reduce to a single node ({remaining} left)")]
    Unreduced { remaining: usize },

    #[error("token with id {id} can not be turned into a node")]
    UnexpectedToken { id: TokenId },
}

/// Errors raised by the sentinel algebra and the tensor backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlgebraError {
    /// Two shapes could not be broadcast together.
    #[error("shapes {lhs:?} and {rhs:?} can not be broadcast together")]
    Broadcast { lhs: Vec<usize>, rhs: Vec<usize> },

    /// A combination of operands the algebra tables do not cover.
    #[error("unsupported operator application: {operation}")]
    Unsupported { operation: String },

    /// A complex constant would have to be materialized into the real tensor backend.
    #[error("complex value {re}{im:+}i can not be combined with a real tensor in {operation}")]
    ComplexMaterialization { re: f64, im: f64, operation: String },
}

/// Errors raised while binding variables to fetchers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindingError {
    #[error("variable '{name}' has no fetcher bound to it")]
    UnboundVariable { name: String },
}

/// Error types for the exprdiff-rs library.
#[derive(Error, Debug)]
pub enum ExprError {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Algebra error: {0}")]
    Algebra(#[from] AlgebraError),

    #[error("Binding error: {0}")]
    Binding(#[from] BindingError),

    /// Error indicating a mismatch in array dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error for cases that don't fit the other categories.
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for exprdiff-rs operations.
pub type Result<T> = std::result::Result<T, ExprError>;

impl From<String> for ExprError {
    fn from(s: String) -> Self {
        ExprError::Other(s)
    }
}

impl From<&str> for ExprError {
    fn from(s: &str) -> Self {
        ExprError::Other(s.to_string())
    }
}
