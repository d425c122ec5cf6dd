//! # Sentinel algebra
//!
//! Finite rewrite tables over the [`Constant`] kinds `Zero`, `Unity`,
//! `NegUnity`, `Nan` and `Number`, plus the mixed tensor/constant cases in
//! [`mixed`]. The tables let differentiation collapse provably constant
//! sub-expressions into exact sentinels without touching a real tensor.
//!
//! Every result carries the broadcast of its operand shapes. Combinations the
//! tables do not cover are reported as [`AlgebraError`]s rather than being
//! pushed through the tensor path with the sentinel's literal value.

pub mod binary;
pub mod mixed;
pub mod unary;

use std::fmt;

use crate::error::AlgebraError;
use crate::token::{ids, Constant, Token, TokenId};

/// Unary operators and single-argument functions understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryFn {
    Neg,
    Abs,
    Sqrt,
    Square,
    Exp,
    Log,
    Log10,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
}

impl UnaryFn {
    pub const ALL: [UnaryFn; 19] = [
        UnaryFn::Neg,
        UnaryFn::Abs,
        UnaryFn::Sqrt,
        UnaryFn::Square,
        UnaryFn::Exp,
        UnaryFn::Log,
        UnaryFn::Log10,
        UnaryFn::Sin,
        UnaryFn::Cos,
        UnaryFn::Tan,
        UnaryFn::Asin,
        UnaryFn::Acos,
        UnaryFn::Atan,
        UnaryFn::Sinh,
        UnaryFn::Cosh,
        UnaryFn::Tanh,
        UnaryFn::Asinh,
        UnaryFn::Acosh,
        UnaryFn::Atanh,
    ];

    /// The name the function is spelled with in expressions.
    pub fn name(self) -> &'static str {
        match self {
            UnaryFn::Neg => "neg",
            UnaryFn::Abs => "abs",
            UnaryFn::Sqrt => "sqrt",
            UnaryFn::Square => "square",
            UnaryFn::Exp => "exp",
            UnaryFn::Log => "log",
            UnaryFn::Log10 => "log10",
            UnaryFn::Sin => "sin",
            UnaryFn::Cos => "cos",
            UnaryFn::Tan => "tan",
            UnaryFn::Asin => "asin",
            UnaryFn::Acos => "acos",
            UnaryFn::Atan => "atan",
            UnaryFn::Sinh => "sinh",
            UnaryFn::Cosh => "cosh",
            UnaryFn::Tanh => "tanh",
            UnaryFn::Asinh => "asinh",
            UnaryFn::Acosh => "acosh",
            UnaryFn::Atanh => "atanh",
        }
    }

    pub fn id(self) -> TokenId {
        match self {
            UnaryFn::Neg => ids::NEG,
            UnaryFn::Abs => ids::ABS,
            UnaryFn::Sqrt => ids::SQRT,
            UnaryFn::Square => ids::SQUARE,
            UnaryFn::Exp => ids::EXP,
            UnaryFn::Log => ids::LOG,
            UnaryFn::Log10 => ids::LOG10,
            UnaryFn::Sin => ids::SIN,
            UnaryFn::Cos => ids::COS,
            UnaryFn::Tan => ids::TAN,
            UnaryFn::Asin => ids::ASIN,
            UnaryFn::Acos => ids::ACOS,
            UnaryFn::Atan => ids::ATAN,
            UnaryFn::Sinh => ids::SINH,
            UnaryFn::Cosh => ids::COSH,
            UnaryFn::Tanh => ids::TANH,
            UnaryFn::Asinh => ids::ASINH,
            UnaryFn::Acosh => ids::ACOSH,
            UnaryFn::Atanh => ids::ATANH,
        }
    }

    pub fn from_id(id: TokenId) -> Option<Self> {
        UnaryFn::ALL.iter().copied().find(|f| f.id() == id)
    }
}

impl fmt::Display for UnaryFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binary operators and two-argument functions understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryFn {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Atan2,
}

impl BinaryFn {
    pub const ALL: [BinaryFn; 6] = [
        BinaryFn::Add,
        BinaryFn::Sub,
        BinaryFn::Mul,
        BinaryFn::Div,
        BinaryFn::Pow,
        BinaryFn::Atan2,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BinaryFn::Add => "add",
            BinaryFn::Sub => "sub",
            BinaryFn::Mul => "mul",
            BinaryFn::Div => "div",
            BinaryFn::Pow => "pow",
            BinaryFn::Atan2 => "atan2",
        }
    }

    /// Infix spelling, for the operators that have one.
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            BinaryFn::Add => Some("+"),
            BinaryFn::Sub => Some("-"),
            BinaryFn::Mul => Some("*"),
            BinaryFn::Div => Some("/"),
            BinaryFn::Pow => Some("^"),
            BinaryFn::Atan2 => None,
        }
    }

    pub fn is_commutative(self) -> bool {
        matches!(self, BinaryFn::Add | BinaryFn::Mul)
    }

    pub fn from_id(id: TokenId) -> Option<Self> {
        match id {
            ids::ADD => Some(BinaryFn::Add),
            ids::SUB => Some(BinaryFn::Sub),
            ids::MUL => Some(BinaryFn::Mul),
            ids::DIV => Some(BinaryFn::Div),
            ids::POW | ids::POW_FN => Some(BinaryFn::Pow),
            ids::ATAN2 => Some(BinaryFn::Atan2),
            _ => None,
        }
    }
}

impl fmt::Display for BinaryFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Combine two constants with a binary operator.
pub fn binary(op: BinaryFn, lhs: &Constant, rhs: &Constant) -> Result<Constant, AlgebraError> {
    binary::apply(op, lhs, rhs)
}

/// Apply a unary function to a constant.
pub fn unary(func: UnaryFn, input: &Constant) -> Result<Constant, AlgebraError> {
    unary::apply(func, input)
}

/// Apply an operator or function token to constant operand tokens.
///
/// Operands that are not constants, and operator ids without a table, are
/// reported as unsupported.
pub fn apply_tokens(operator: &Token, operands: &[Token]) -> Result<Constant, AlgebraError> {
    let constants = operands
        .iter()
        .map(|token| match token {
            Token::Constant(c) => Ok(c),
            other => Err(AlgebraError::Unsupported {
                operation: format!(
                    "token with id {} is not a constant operand for id {}",
                    other.id(),
                    operator.id()
                ),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    match (operator.arity(), constants.as_slice()) {
        (1, [input]) => {
            let func = UnaryFn::from_id(operator.id()).ok_or_else(|| unsupported_id(operator.id()))?;
            unary(func, input)
        }
        (2, [lhs, rhs]) => {
            let op = BinaryFn::from_id(operator.id()).ok_or_else(|| unsupported_id(operator.id()))?;
            binary(op, lhs, rhs)
        }
        (arity, _) => Err(AlgebraError::Unsupported {
            operation: format!(
                "token with id {} takes {} operand(s), got {}",
                operator.id(),
                arity,
                constants.len()
            ),
        }),
    }
}

fn unsupported_id(id: TokenId) -> AlgebraError {
    AlgebraError::Unsupported {
        operation: format!("no algebra table for token id {}", id),
    }
}
