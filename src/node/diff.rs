//! Differentiation.
//!
//! The chain rules are written once over [`Terms`] and interpreted twice:
//! [`Node::diff`] runs them on evaluated values, [`Node::derivative`] runs
//! them on nodes and returns a new tree. When every child derivative is the
//! `Zero` sentinel the node's derivative is `Zero` and no operand is
//! evaluated, so constant sub-trees always differentiate to exactly `Zero`.

use std::f64::consts::LN_10;

use super::{BinaryFn, Node, UnaryFn};
use crate::error::Result;
use crate::evaluated::Evaluated;
use crate::token::{algebra, Constant};

/// The operations the chain rules need from the values they combine.
trait Terms: Sized + Clone {
    fn constant(value: Constant) -> Self;
    fn is_symbolic_zero(&self) -> bool;
    fn map_unary(func: UnaryFn, input: Self) -> Result<Self>;
    fn combine(op: BinaryFn, lhs: Self, rhs: Self) -> Result<Self>;
}

impl Terms for Evaluated {
    fn constant(value: Constant) -> Self {
        Evaluated::Symbol(value)
    }

    fn is_symbolic_zero(&self) -> bool {
        self.is_zero()
    }

    fn map_unary(func: UnaryFn, input: Self) -> Result<Self> {
        Ok(input.apply(func)?)
    }

    fn combine(op: BinaryFn, lhs: Self, rhs: Self) -> Result<Self> {
        Ok(Evaluated::binary(op, &lhs, &rhs)?)
    }
}

/// Building nodes folds constant operands and applies the `Zero`/`Unity`
/// identities, so derivative trees stay small.
impl Terms for Node {
    fn constant(value: Constant) -> Self {
        Node::Number(value)
    }

    fn is_symbolic_zero(&self) -> bool {
        matches!(self, Node::Number(Constant::Zero(_)))
    }

    fn map_unary(func: UnaryFn, input: Self) -> Result<Self> {
        match (func, input) {
            (func, Node::Number(c)) => Ok(Node::Number(algebra::unary(func, &c)?)),
            (UnaryFn::Neg, Node::Unary(UnaryFn::Neg, inner)) => Ok(*inner),
            (func, input) => Ok(Node::unary(func, input)),
        }
    }

    fn combine(op: BinaryFn, lhs: Self, rhs: Self) -> Result<Self> {
        use BinaryFn::{Add, Div, Mul, Pow, Sub};
        use Constant::{NegUnity, Unity, Zero};

        match (op, lhs, rhs) {
            (op, Node::Number(a), Node::Number(b)) => Ok(Node::Number(algebra::binary(op, &a, &b)?)),

            (Add, Node::Number(Zero(_)), x)
            | (Add, x, Node::Number(Zero(_)))
            | (Sub, x, Node::Number(Zero(_))) => Ok(x),
            (Sub, Node::Number(Zero(_)), x) => Node::map_unary(UnaryFn::Neg, x),

            (Mul, Node::Number(Zero(shape)), _) | (Mul, _, Node::Number(Zero(shape))) => {
                Ok(Node::Number(Zero(shape)))
            }
            (Mul, Node::Number(Unity(_)), x)
            | (Mul, x, Node::Number(Unity(_)))
            | (Div, x, Node::Number(Unity(_))) => Ok(x),
            (Mul, Node::Number(NegUnity(_)), x)
            | (Mul, x, Node::Number(NegUnity(_)))
            | (Div, x, Node::Number(NegUnity(_))) => Node::map_unary(UnaryFn::Neg, x),

            (Pow, x, Node::Number(Unity(_))) => Ok(x),
            (Pow, _, Node::Number(Zero(shape))) => Ok(Node::Number(Unity(shape))),

            (op, lhs, rhs) => Ok(Node::binary(op, lhs, rhs)),
        }
    }
}

fn apply<T: Terms>(func: UnaryFn, input: T) -> Result<T> {
    T::map_unary(func, input)
}

fn neg<T: Terms>(input: T) -> Result<T> {
    T::map_unary(UnaryFn::Neg, input)
}

fn add<T: Terms>(lhs: T, rhs: T) -> Result<T> {
    T::combine(BinaryFn::Add, lhs, rhs)
}

fn sub<T: Terms>(lhs: T, rhs: T) -> Result<T> {
    T::combine(BinaryFn::Sub, lhs, rhs)
}

fn mul<T: Terms>(lhs: T, rhs: T) -> Result<T> {
    T::combine(BinaryFn::Mul, lhs, rhs)
}

fn div<T: Terms>(lhs: T, rhs: T) -> Result<T> {
    T::combine(BinaryFn::Div, lhs, rhs)
}

fn pow<T: Terms>(lhs: T, rhs: T) -> Result<T> {
    T::combine(BinaryFn::Pow, lhs, rhs)
}

/// Chain rule for `func(u)` given `u` and `du`.
fn unary_rule<T: Terms>(func: UnaryFn, u: T, du: T) -> Result<T> {
    use UnaryFn::*;

    let one = || T::constant(Constant::unity());
    let real = |value: f64| T::constant(Constant::real(value));

    match func {
        Neg => neg(du),
        Abs => mul(div(u.clone(), apply(Abs, u)?)?, du),
        Sqrt => div(mul(real(0.5), du)?, apply(Sqrt, u)?),
        Square => mul(mul(real(2.0), u)?, du),
        Exp => mul(apply(Exp, u)?, du),
        Log => div(du, u),
        Log10 => div(du, mul(u, real(LN_10))?),
        Sin => mul(apply(Cos, u)?, du),
        Cos => mul(neg(apply(Sin, u)?)?, du),
        Tan => div(du, apply(Square, apply(Cos, u)?)?),
        Asin => div(du, apply(Sqrt, sub(one(), apply(Square, u)?)?)?),
        Acos => div(neg(du)?, apply(Sqrt, sub(one(), apply(Square, u)?)?)?),
        Atan => div(du, add(one(), apply(Square, u)?)?),
        Sinh => mul(apply(Cosh, u)?, du),
        Cosh => mul(apply(Sinh, u)?, du),
        Tanh => div(du, apply(Square, apply(Cosh, u)?)?),
        Asinh => div(du, apply(Sqrt, add(apply(Square, u)?, one())?)?),
        Acosh => div(du, apply(Sqrt, sub(apply(Square, u)?, one())?)?),
        Atanh => div(du, sub(one(), apply(Square, u)?)?),
    }
}

/// Derivative of `op(l, r)` given both operands and their derivatives.
fn binary_rule<T: Terms>(op: BinaryFn, l: T, r: T, dl: T, dr: T) -> Result<T> {
    match op {
        BinaryFn::Add => add(dl, dr),
        BinaryFn::Sub => sub(dl, dr),
        BinaryFn::Mul => add(mul(dl, r)?, mul(l, dr)?),
        BinaryFn::Div => {
            let numerator = add(mul(dl, r.clone())?, mul(neg(l)?, dr)?)?;
            div(numerator, apply(UnaryFn::Square, r)?)
        }
        BinaryFn::Pow => {
            if dr.is_symbolic_zero() {
                // Constant exponent: r * l^(r - 1) * dl
                let exponent = sub(r.clone(), T::constant(Constant::unity()))?;
                mul(mul(r, pow(l, exponent)?)?, dl)
            } else {
                let log_term = mul(dr, apply(UnaryFn::Log, l.clone())?)?;
                let base_term = div(mul(r.clone(), dl)?, l.clone())?;
                mul(pow(l, r)?, add(log_term, base_term)?)
            }
        }
        BinaryFn::Atan2 => {
            let (y, x, dy, dx) = (l, r, dl, dr);
            let numerator = add(mul(x.clone(), dy)?, mul(neg(y.clone())?, dx)?)?;
            let denominator = add(apply(UnaryFn::Square, x)?, apply(UnaryFn::Square, y)?)?;
            div(numerator, denominator)
        }
    }
}

impl Node {
    /// Evaluate the partial derivative of the tree with respect to `wrt`.
    ///
    /// Leaves differentiate to `Zero` of their own shape; a variable gives
    /// `Unity` or `Zero` with the shape of its current value.
    pub fn diff(&self, wrt: &str) -> Result<Evaluated> {
        match self {
            Self::Number(c) => Ok(Evaluated::Symbol(Constant::Zero(c.shape().to_vec()))),

            Self::Tensor(t) => Ok(Evaluated::Symbol(Constant::Zero(t.shape().to_vec()))),

            Self::Variable(leaf) => {
                let shape = leaf.fetch().shape().to_vec();
                if leaf.name() == wrt {
                    Ok(Evaluated::Symbol(Constant::Unity(shape)))
                } else {
                    Ok(Evaluated::Symbol(Constant::Zero(shape)))
                }
            }

            Self::Unary(func, child) => {
                let du = child.diff(wrt)?;
                if du.is_zero() {
                    return Ok(du);
                }
                unary_rule(*func, child.eval()?, du)
            }

            Self::Binary(op, lhs, rhs) => {
                let dl = lhs.diff(wrt)?;
                let dr = rhs.diff(wrt)?;
                if dl.is_zero() && dr.is_zero() {
                    // Zero + Zero keeps the broadcast shape.
                    return add(dl, dr);
                }
                binary_rule(*op, lhs.eval()?, rhs.eval()?, dl, dr)
            }
        }
    }

    /// Build the tree of the partial derivative with respect to `wrt`.
    ///
    /// Constant sub-trees are folded through the sentinel algebra. A variable
    /// differentiates to a scalar `Unity` or `Zero`, which broadcasts against
    /// the rest of the tree. Second derivatives are `derivative(a)?.diff(b)`.
    pub fn derivative(&self, wrt: &str) -> Result<Node> {
        match self {
            Self::Number(c) => Ok(Node::Number(Constant::Zero(c.shape().to_vec()))),

            Self::Tensor(t) => Ok(Node::Number(Constant::Zero(t.shape().to_vec()))),

            Self::Variable(leaf) => {
                if leaf.name() == wrt {
                    Ok(Node::Number(Constant::unity()))
                } else {
                    Ok(Node::Number(Constant::zero()))
                }
            }

            Self::Unary(func, child) => {
                let du = child.derivative(wrt)?;
                if du.is_symbolic_zero() {
                    return Ok(du);
                }
                unary_rule(*func, (**child).clone(), du)
            }

            Self::Binary(op, lhs, rhs) => {
                let dl = lhs.derivative(wrt)?;
                let dr = rhs.derivative(wrt)?;
                if dl.is_symbolic_zero() && dr.is_symbolic_zero() {
                    return add(dl, dr);
                }
                binary_rule(*op, (**lhs).clone(), (**rhs).clone(), dl, dr)
            }
        }
    }
}
