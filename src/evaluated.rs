//! The result of evaluating or differentiating a node.
//!
//! A result is either a real tensor or an exactly known [`Constant`]. Callers
//! always branch on the variant; [`Evaluated::binary`] and
//! [`Evaluated::unary`] pick the matching algebra table.

use crate::error::AlgebraError;
use crate::tensor::{filled, Shape, Tensor};
use crate::token::algebra::{self, mixed, BinaryFn, UnaryFn};
use crate::token::Constant;

/// A tensor value or a symbolic constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluated {
    Value(Tensor),
    Symbol(Constant),
}

impl Evaluated {
    /// Combine two results with a binary operator.
    pub fn binary(op: BinaryFn, lhs: &Evaluated, rhs: &Evaluated) -> Result<Evaluated, AlgebraError> {
        match (lhs, rhs) {
            (Evaluated::Symbol(a), Evaluated::Symbol(b)) => {
                algebra::binary(op, a, b).map(Evaluated::Symbol)
            }
            (Evaluated::Value(a), Evaluated::Symbol(b)) => mixed::tensor_constant(op, a, b),
            (Evaluated::Symbol(a), Evaluated::Value(b)) => mixed::constant_tensor(op, a, b),
            (Evaluated::Value(a), Evaluated::Value(b)) => {
                mixed::tensor_tensor(op, a, b).map(Evaluated::Value)
            }
        }
    }

    /// Apply a unary function.
    pub fn unary(func: UnaryFn, input: &Evaluated) -> Result<Evaluated, AlgebraError> {
        match input {
            Evaluated::Symbol(c) => algebra::unary(func, c).map(Evaluated::Symbol),
            Evaluated::Value(t) => Ok(Evaluated::Value(mixed::tensor_unary(func, t))),
        }
    }

    pub fn add(&self, other: &Evaluated) -> Result<Evaluated, AlgebraError> {
        Evaluated::binary(BinaryFn::Add, self, other)
    }

    pub fn sub(&self, other: &Evaluated) -> Result<Evaluated, AlgebraError> {
        Evaluated::binary(BinaryFn::Sub, self, other)
    }

    pub fn mul(&self, other: &Evaluated) -> Result<Evaluated, AlgebraError> {
        Evaluated::binary(BinaryFn::Mul, self, other)
    }

    pub fn div(&self, other: &Evaluated) -> Result<Evaluated, AlgebraError> {
        Evaluated::binary(BinaryFn::Div, self, other)
    }

    pub fn pow(&self, other: &Evaluated) -> Result<Evaluated, AlgebraError> {
        Evaluated::binary(BinaryFn::Pow, self, other)
    }

    pub fn apply(&self, func: UnaryFn) -> Result<Evaluated, AlgebraError> {
        Evaluated::unary(func, self)
    }

    pub fn neg(&self) -> Result<Evaluated, AlgebraError> {
        Evaluated::unary(UnaryFn::Neg, self)
    }

    /// Shape of the tensor, or broadcast shape of the constant.
    pub fn shape(&self) -> Shape {
        match self {
            Evaluated::Value(t) => t.shape().to_vec(),
            Evaluated::Symbol(c) => c.shape().to_vec(),
        }
    }

    /// Whether the result is the `Zero` sentinel.
    pub fn is_zero(&self) -> bool {
        matches!(self, Evaluated::Symbol(Constant::Zero(_)))
    }

    /// Materialize the result as a real tensor.
    ///
    /// Sentinels become tensors of their shape filled with their value. A
    /// complex number has no real tensor form and is an error.
    pub fn to_tensor(&self) -> Result<Tensor, AlgebraError> {
        match self {
            Evaluated::Value(t) => Ok(t.clone()),
            Evaluated::Symbol(c) => {
                let value = c.value();
                if value.im != 0.0 {
                    return Err(AlgebraError::ComplexMaterialization {
                        re: value.re,
                        im: value.im,
                        operation: "materialize".to_string(),
                    });
                }
                Ok(filled(c.shape(), value.re))
            }
        }
    }

    /// Consume the result, returning the tensor if this is a value.
    pub fn into_tensor(self) -> Option<Tensor> {
        match self {
            Evaluated::Value(t) => Some(t),
            Evaluated::Symbol(_) => None,
        }
    }

    /// The constant, if this is a symbol.
    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Evaluated::Symbol(c) => Some(c),
            Evaluated::Value(_) => None,
        }
    }
}

impl From<Tensor> for Evaluated {
    fn from(t: Tensor) -> Self {
        Evaluated::Value(t)
    }
}

impl From<Constant> for Evaluated {
    fn from(c: Constant) -> Self {
        Evaluated::Symbol(c)
    }
}
