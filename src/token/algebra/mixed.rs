//! Mixed tensor/constant tables and plain tensor arithmetic.
//!
//! A sentinel combined with a tensor short-circuits where the result is known
//! exactly, such as `T * Zero` or anything with `Nan`. `T ^ Zero` is `Unity`
//! even for NaN elements, as `f64::powf` gives. `Zero / T` stays symbolic only
//! while `T` has no zero or NaN element. Otherwise the constant's real value
//! enters the elementwise kernel. Complex numbers have no tensor
//! representation and are rejected.

use super::{BinaryFn, UnaryFn};
use crate::error::AlgebraError;
use crate::evaluated::Evaluated;
use crate::tensor::{broadcast_shapes, zip_scalar, zip_with, Tensor};
use crate::token::Constant;

use Constant::{Nan, NegUnity, Unity, Zero};

/// The real value of a constant that is about to enter a tensor kernel.
pub(crate) fn real_scalar(c: &Constant, op: BinaryFn) -> Result<f64, AlgebraError> {
    let value = c.value();
    if value.im == 0.0 {
        Ok(value.re)
    } else {
        Err(AlgebraError::ComplexMaterialization {
            re: value.re,
            im: value.im,
            operation: op.name().to_string(),
        })
    }
}

fn real_kernel(op: BinaryFn) -> fn(f64, f64) -> f64 {
    match op {
        BinaryFn::Add => |a, b| a + b,
        BinaryFn::Sub => |a, b| a - b,
        BinaryFn::Mul => |a, b| a * b,
        BinaryFn::Div => |a, b| a / b,
        BinaryFn::Pow => f64::powf,
        BinaryFn::Atan2 => f64::atan2,
    }
}

/// Elementwise kernel for a unary function on real tensors.
pub(crate) fn unary_kernel(func: UnaryFn) -> fn(f64) -> f64 {
    match func {
        UnaryFn::Neg => |x| -x,
        UnaryFn::Abs => f64::abs,
        UnaryFn::Sqrt => f64::sqrt,
        UnaryFn::Square => |x| x * x,
        UnaryFn::Exp => f64::exp,
        UnaryFn::Log => f64::ln,
        UnaryFn::Log10 => f64::log10,
        UnaryFn::Sin => f64::sin,
        UnaryFn::Cos => f64::cos,
        UnaryFn::Tan => f64::tan,
        UnaryFn::Asin => f64::asin,
        UnaryFn::Acos => f64::acos,
        UnaryFn::Atan => f64::atan,
        UnaryFn::Sinh => f64::sinh,
        UnaryFn::Cosh => f64::cosh,
        UnaryFn::Tanh => f64::tanh,
        UnaryFn::Asinh => f64::asinh,
        UnaryFn::Acosh => f64::acosh,
        UnaryFn::Atanh => f64::atanh,
    }
}

/// Combine two tensors elementwise.
pub fn tensor_tensor(op: BinaryFn, lhs: &Tensor, rhs: &Tensor) -> Result<Tensor, AlgebraError> {
    zip_with(lhs, rhs, real_kernel(op))
}

/// Apply a unary function to every element of a tensor.
pub fn tensor_unary(func: UnaryFn, input: &Tensor) -> Tensor {
    input.mapv(unary_kernel(func))
}

/// `tensor op constant`
pub fn tensor_constant(
    op: BinaryFn,
    lhs: &Tensor,
    rhs: &Constant,
) -> Result<Evaluated, AlgebraError> {
    let shape = broadcast_shapes(lhs.shape(), rhs.shape())?;
    let value = |f: fn(f64, f64) -> f64, c: f64| {
        zip_scalar(lhs, rhs.shape(), |x| f(x, c)).map(Evaluated::Value)
    };
    let same = || zip_scalar(lhs, rhs.shape(), |x| x).map(Evaluated::Value);

    match (op, rhs) {
        (_, Nan(_)) => Ok(Evaluated::Symbol(Nan(shape))),

        (BinaryFn::Add | BinaryFn::Sub, Zero(_)) => same(),
        (BinaryFn::Mul, Zero(_)) => Ok(Evaluated::Symbol(Zero(shape))),
        (BinaryFn::Div, Zero(_)) => Ok(Evaluated::Symbol(Nan(shape))),
        (BinaryFn::Pow, Zero(_)) => Ok(Evaluated::Symbol(Unity(shape))),

        (BinaryFn::Mul | BinaryFn::Div | BinaryFn::Pow, Unity(_)) => same(),
        (BinaryFn::Mul | BinaryFn::Div, NegUnity(_)) => value(|x, _| -x, -1.0),
        (BinaryFn::Pow, NegUnity(_)) => value(|x, _| 1.0 / x, -1.0),

        (op, c) => value(real_kernel(op), real_scalar(c, op)?),
    }
}

/// `constant op tensor`
pub fn constant_tensor(
    op: BinaryFn,
    lhs: &Constant,
    rhs: &Tensor,
) -> Result<Evaluated, AlgebraError> {
    let shape = broadcast_shapes(lhs.shape(), rhs.shape())?;
    let value = |f: fn(f64, f64) -> f64, c: f64| {
        zip_scalar(rhs, lhs.shape(), |x| f(c, x)).map(Evaluated::Value)
    };

    match (op, lhs) {
        (_, Nan(_)) => Ok(Evaluated::Symbol(Nan(shape))),

        (BinaryFn::Add, Zero(_)) => zip_scalar(rhs, lhs.shape(), |x| x).map(Evaluated::Value),
        (BinaryFn::Sub, Zero(_)) => zip_scalar(rhs, lhs.shape(), |x| -x).map(Evaluated::Value),
        (BinaryFn::Mul, Zero(_)) => Ok(Evaluated::Symbol(Zero(shape))),
        (BinaryFn::Div, Zero(_)) if rhs.iter().all(|x| *x != 0.0 && !x.is_nan()) => {
            Ok(Evaluated::Symbol(Zero(shape)))
        }
        (BinaryFn::Div, Zero(_)) => zip_scalar(rhs, lhs.shape(), |x| 0.0 / x).map(Evaluated::Value),

        (BinaryFn::Mul, Unity(_)) => zip_scalar(rhs, lhs.shape(), |x| x).map(Evaluated::Value),
        (BinaryFn::Mul, NegUnity(_)) => zip_scalar(rhs, lhs.shape(), |x| -x).map(Evaluated::Value),
        (BinaryFn::Pow, Unity(_)) => Ok(Evaluated::Symbol(Unity(shape))),

        (op, c) => value(real_kernel(op), real_scalar(c, op)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Number;
    use approx::assert_relative_eq;
    use ndarray::arr1;

    fn tensor(values: &[f64]) -> Tensor {
        arr1(values).into_dyn()
    }

    fn value_of(e: Evaluated) -> Tensor {
        match e {
            Evaluated::Value(t) => t,
            other => panic!("Expected tensor, got {:?}", other),
        }
    }

    #[test]
    fn test_tensor_with_zero() {
        let t = tensor(&[1.0, 2.0, 3.0]);

        let sum = value_of(tensor_constant(BinaryFn::Add, &t, &Constant::zero()).unwrap());
        assert_eq!(sum, t);

        assert_eq!(
            tensor_constant(BinaryFn::Mul, &t, &Constant::zero()).unwrap(),
            Evaluated::Symbol(Constant::Zero(vec![3]))
        );
        assert_eq!(
            tensor_constant(BinaryFn::Div, &t, &Constant::zero()).unwrap(),
            Evaluated::Symbol(Constant::Nan(vec![3]))
        );
        assert_eq!(
            tensor_constant(BinaryFn::Pow, &t, &Constant::zero()).unwrap(),
            Evaluated::Symbol(Constant::Unity(vec![3]))
        );
        assert_eq!(
            constant_tensor(BinaryFn::Div, &Constant::zero(), &t).unwrap(),
            Evaluated::Symbol(Constant::Zero(vec![3]))
        );
    }

    #[test]
    fn test_zero_over_tensor_with_zero_elements() {
        let quotient = value_of(
            constant_tensor(BinaryFn::Div, &Constant::Zero(vec![1]), &tensor(&[0.0, 2.0])).unwrap(),
        );
        assert!(quotient[0].is_nan());
        assert_eq!(quotient[1], 0.0);

        let quotient =
            value_of(constant_tensor(BinaryFn::Div, &Constant::zero(), &tensor(&[f64::NAN])).unwrap());
        assert!(quotient[0].is_nan());

        // Products still short-circuit.
        assert_eq!(
            constant_tensor(BinaryFn::Mul, &Constant::zero(), &tensor(&[0.0, f64::NAN])).unwrap(),
            Evaluated::Symbol(Constant::Zero(vec![2]))
        );
    }

    #[test]
    fn test_zero_exponent_wins_over_nan_elements() {
        let t = tensor(&[f64::NAN, 2.0]);
        assert_eq!(
            tensor_constant(BinaryFn::Pow, &t, &Constant::zero()).unwrap(),
            Evaluated::Symbol(Constant::Unity(vec![2]))
        );
        // The kernel agrees elementwise.
        assert_eq!(f64::NAN.powf(0.0), 1.0);

        let t = tensor(&[2.0]);
        assert_eq!(
            tensor_constant(BinaryFn::Pow, &t, &Constant::nan()).unwrap(),
            Evaluated::Symbol(Constant::Nan(vec![1]))
        );
        assert_eq!(
            constant_tensor(BinaryFn::Pow, &Constant::nan(), &t).unwrap(),
            Evaluated::Symbol(Constant::Nan(vec![1]))
        );
    }

    #[test]
    fn test_tensor_with_unity_kinds() {
        let t = tensor(&[2.0, 4.0]);

        let neg = value_of(constant_tensor(BinaryFn::Mul, &Constant::neg_unity(), &t).unwrap());
        assert_eq!(neg, tensor(&[-2.0, -4.0]));

        let inv = value_of(tensor_constant(BinaryFn::Pow, &t, &Constant::neg_unity()).unwrap());
        assert_eq!(inv, tensor(&[0.5, 0.25]));

        let recip = value_of(constant_tensor(BinaryFn::Div, &Constant::unity(), &t).unwrap());
        assert_eq!(recip, tensor(&[0.5, 0.25]));

        let diff = value_of(constant_tensor(BinaryFn::Sub, &Constant::unity(), &t).unwrap());
        assert_eq!(diff, tensor(&[-1.0, -3.0]));
    }

    #[test]
    fn test_tensor_with_number() {
        let t = tensor(&[1.0, 2.0]);
        let out = value_of(tensor_constant(BinaryFn::Pow, &t, &Constant::real(3.0)).unwrap());
        assert_relative_eq!(out[1], 8.0);

        let out = value_of(constant_tensor(BinaryFn::Sub, &Constant::real(10.0), &t).unwrap());
        assert_eq!(out, tensor(&[9.0, 8.0]));
    }

    #[test]
    fn test_constant_shape_expands_tensor() {
        let t = tensor(&[5.0]);
        let out = value_of(tensor_constant(BinaryFn::Add, &t, &Constant::Unity(vec![3])).unwrap());
        assert_eq!(out, tensor(&[6.0, 6.0, 6.0]));
    }

    #[test]
    fn test_complex_number_is_rejected() {
        let t = tensor(&[1.0]);
        let i = Constant::Number(Number::imaginary(1.0));
        let err = tensor_constant(BinaryFn::Add, &t, &i).unwrap_err();
        assert!(matches!(err, AlgebraError::ComplexMaterialization { .. }));
    }

    #[test]
    fn test_tensor_tensor_and_unary() {
        let a = tensor(&[1.0, 4.0]);
        let b = tensor(&[2.0]);
        assert_eq!(
            tensor_tensor(BinaryFn::Mul, &a, &b).unwrap(),
            tensor(&[2.0, 8.0])
        );
        assert_eq!(tensor_unary(UnaryFn::Sqrt, &a), tensor(&[1.0, 2.0]));
    }
}
