//! Binary operator tables over constants.
//!
//! Rows are indexed by the left operand kind, columns by the right one. Every
//! arm receives the broadcast shape of both operands.
//!
//! Computed numbers go through [`Constant::from_number`], so a folded `2-2`
//! is the `Zero` sentinel and divides like a literal `0`. `Nan` absorbs every
//! operation except `x^0`, which is `Unity` for any base as with `f64::powf`.

use num_complex::Complex64;

use super::BinaryFn;
use crate::error::AlgebraError;
use crate::tensor::{broadcast_shapes, Shape};
use crate::token::{Constant, Number};

use Constant::{Nan, NegUnity, Unity, Zero};

/// Combine two constants with `op`.
pub fn apply(op: BinaryFn, lhs: &Constant, rhs: &Constant) -> Result<Constant, AlgebraError> {
    let shape = broadcast_shapes(lhs.shape(), rhs.shape())?;
    match op {
        BinaryFn::Add => Ok(add(lhs, rhs, shape)),
        BinaryFn::Sub => Ok(sub(lhs, rhs, shape)),
        BinaryFn::Mul => Ok(mul(lhs, rhs, shape)),
        BinaryFn::Div => Ok(div(lhs, rhs, shape)),
        BinaryFn::Pow => Ok(pow(lhs, rhs, shape)),
        BinaryFn::Atan2 => atan2(lhs, rhs, shape),
    }
}

fn number(value: Complex64, is_imaginary: bool, shape: Shape) -> Constant {
    Constant::from_number(Number::new(value, is_imaginary, shape))
}

fn is_zero_number(n: &Number) -> bool {
    n.value == Complex64::new(0.0, 0.0)
}

fn real(value: f64, shape: Shape) -> Constant {
    number(Complex64::new(value, 0.0), false, shape)
}

/// Combine two numbers, staying on the real path when both are real.
fn combine(
    a: &Number,
    b: &Number,
    shape: Shape,
    real_op: fn(f64, f64) -> f64,
    complex_op: fn(Complex64, Complex64) -> Complex64,
) -> Constant {
    let value = match (a.as_real(), b.as_real()) {
        (Some(x), Some(y)) => Complex64::new(real_op(x, y), 0.0),
        _ => complex_op(a.value, b.value),
    };
    number(value, a.is_imaginary || b.is_imaginary, shape)
}

fn negate(c: &Constant, shape: Shape) -> Constant {
    match c {
        Zero(_) => Zero(shape),
        Unity(_) => NegUnity(shape),
        NegUnity(_) => Unity(shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => number(-n.value, n.is_imaginary, shape),
    }
}

fn add(lhs: &Constant, rhs: &Constant, shape: Shape) -> Constant {
    match (lhs, rhs) {
        (Nan(_), _) | (_, Nan(_)) => Nan(shape),

        (Zero(_), other) | (other, Zero(_)) => other.with_shape(shape),

        (NegUnity(_), NegUnity(_)) => real(-2.0, shape),
        (NegUnity(_), Unity(_)) | (Unity(_), NegUnity(_)) => Zero(shape),
        (Unity(_), Unity(_)) => real(2.0, shape),

        (NegUnity(_), Constant::Number(n)) | (Constant::Number(n), NegUnity(_)) => {
            number(n.value - 1.0, n.is_imaginary, shape)
        }
        (Unity(_), Constant::Number(n)) | (Constant::Number(n), Unity(_)) => {
            number(n.value + 1.0, n.is_imaginary, shape)
        }

        (Constant::Number(a), Constant::Number(b)) => {
            combine(a, b, shape, |x, y| x + y, |x, y| x + y)
        }
    }
}

fn sub(lhs: &Constant, rhs: &Constant, shape: Shape) -> Constant {
    match (lhs, rhs) {
        (Nan(_), _) | (_, Nan(_)) => Nan(shape),
        (Constant::Number(a), Constant::Number(b)) => {
            combine(a, b, shape, |x, y| x - y, |x, y| x - y)
        }
        _ => {
            let negated = negate(rhs, shape.clone());
            add(lhs, &negated, shape)
        }
    }
}

fn mul(lhs: &Constant, rhs: &Constant, shape: Shape) -> Constant {
    match (lhs, rhs) {
        (Nan(_), _) | (_, Nan(_)) => Nan(shape),

        (Zero(_), _) | (_, Zero(_)) => Zero(shape),

        (Unity(_), other) | (other, Unity(_)) => other.with_shape(shape),

        (NegUnity(_), NegUnity(_)) => Unity(shape),
        (NegUnity(_), Constant::Number(n)) | (Constant::Number(n), NegUnity(_)) => {
            number(-n.value, n.is_imaginary, shape)
        }

        (Constant::Number(a), Constant::Number(b)) => {
            combine(a, b, shape, |x, y| x * y, |x, y| x * y)
        }
    }
}

fn div(lhs: &Constant, rhs: &Constant, shape: Shape) -> Constant {
    match (lhs, rhs) {
        // Zero/Zero is Nan as well.
        (_, Zero(_)) => Nan(shape),
        (Nan(_), _) | (_, Nan(_)) => Nan(shape),

        (_, Constant::Number(n)) if is_zero_number(n) => Nan(shape),
        (Zero(_), _) => Zero(shape),

        (other, Unity(_)) => other.with_shape(shape),
        (other, NegUnity(_)) => negate(other, shape),

        (Unity(_), Constant::Number(n)) => {
            let one = Number::real(1.0);
            combine(&one, n, shape, |x, y| x / y, |x, y| x / y)
        }
        (NegUnity(_), Constant::Number(n)) => {
            let minus_one = Number::real(-1.0);
            combine(&minus_one, n, shape, |x, y| x / y, |x, y| x / y)
        }
        (Constant::Number(a), Constant::Number(b)) => {
            combine(a, b, shape, |x, y| x / y, |x, y| x / y)
        }
    }
}

/// `a^b` on numbers. The real path is used when it is defined.
pub(crate) fn pow_value(base: Complex64, exponent: Complex64) -> Complex64 {
    if base.im == 0.0 && exponent.im == 0.0 {
        let (a, b) = (base.re, exponent.re);
        if a >= 0.0 || b.fract() == 0.0 {
            return Complex64::new(a.powf(b), 0.0);
        }
    }
    base.powc(exponent)
}

fn pow_numbers(a: &Number, b: &Number, shape: Shape) -> Constant {
    let value = pow_value(a.value, b.value);
    number(value, a.is_imaginary || b.is_imaginary || value.im != 0.0, shape)
}

fn pow(lhs: &Constant, rhs: &Constant, shape: Shape) -> Constant {
    match (lhs, rhs) {
        (Constant::Number(n), _) if is_zero_number(n) => pow(&Zero(shape.clone()), rhs, shape),

        // Zero base
        (Zero(_), Zero(_)) => Unity(shape),
        (Zero(_), NegUnity(_)) => Nan(shape),
        (Zero(_), Unity(_)) => Zero(shape),
        (Zero(_), Nan(_)) => Nan(shape),
        (Zero(_), Constant::Number(n)) => match n.as_real() {
            Some(b) if b > 0.0 => Zero(shape),
            Some(b) if b == 0.0 => Unity(shape),
            Some(_) => Nan(shape),
            None if n.value.re > 0.0 => Zero(shape),
            None => Nan(shape),
        },

        // NegUnity base
        (NegUnity(_), Zero(_)) => Unity(shape),
        (NegUnity(_), NegUnity(_)) => NegUnity(shape),
        (NegUnity(_), Unity(_)) => NegUnity(shape),
        (NegUnity(_), Nan(_)) => Nan(shape),
        (NegUnity(_), Constant::Number(n)) => pow_numbers(&Number::real(-1.0), n, shape),

        // Unity base
        (Unity(_), Nan(_)) => Nan(shape),
        (Unity(_), _) => Unity(shape),

        // Nan base, where only a zero exponent escapes
        (Nan(_), Zero(_)) => Unity(shape),
        (Nan(_), _) => Nan(shape),

        // Number base
        (Constant::Number(_), Zero(_)) => Unity(shape),
        (Constant::Number(n), NegUnity(_)) => {
            let one = Number::real(1.0);
            combine(&one, n, shape, |x, y| x / y, |x, y| x / y)
        }
        (Constant::Number(n), Unity(_)) => number(n.value, n.is_imaginary, shape),
        (Constant::Number(_), Nan(_)) => Nan(shape),
        (Constant::Number(a), Constant::Number(b)) => pow_numbers(a, b, shape),
    }
}

fn atan2(y: &Constant, x: &Constant, shape: Shape) -> Result<Constant, AlgebraError> {
    if matches!(y, Nan(_)) || matches!(x, Nan(_)) {
        return Ok(Nan(shape));
    }

    let real_part = |c: &Constant| {
        let value = c.value();
        if value.im == 0.0 {
            Ok(value.re)
        } else {
            Err(AlgebraError::Unsupported {
                operation: format!("atan2 of complex value {}", c),
            })
        }
    };

    let result = real_part(y)?.atan2(real_part(x)?);
    Ok(real(result, shape))
}
