//! Unary function tables over constants.
//!
//! Each function has one arm per sentinel kind and a general `Number` arm.
//! Numbers stay on the real `f64` path while their value is real and inside
//! the function's real domain; otherwise the complex function is used and the
//! imaginary flag is raised when the result leaves the real line.
//!
//! `log`, `log10` and `acosh` are the exception: a real argument outside their
//! domain is `Nan`, matching their sentinel rows. Only imaginary-flagged or
//! complex arguments reach the complex branch.

use std::f64::consts::{E, FRAC_PI_2, FRAC_PI_4, LN_10, PI};

use num_complex::Complex64;

use super::UnaryFn;
use crate::error::AlgebraError;
use crate::tensor::Shape;
use crate::token::{Constant, Number};

use Constant::{Nan, NegUnity, Unity, Zero};

/// Apply `func` to a constant.
pub fn apply(func: UnaryFn, input: &Constant) -> Result<Constant, AlgebraError> {
    let shape = input.shape().to_vec();
    let result = match func {
        UnaryFn::Neg => neg(input, shape),
        UnaryFn::Abs => abs(input, shape),
        UnaryFn::Sqrt => sqrt(input, shape),
        UnaryFn::Square => square(input, shape),
        UnaryFn::Exp => exp(input, shape),
        UnaryFn::Log => log(input, shape),
        UnaryFn::Log10 => log10(input, shape),
        UnaryFn::Sin => sin(input, shape),
        UnaryFn::Cos => cos(input, shape),
        UnaryFn::Tan => tan(input, shape),
        UnaryFn::Asin => asin(input, shape),
        UnaryFn::Acos => acos(input, shape),
        UnaryFn::Atan => atan(input, shape),
        UnaryFn::Sinh => sinh(input, shape),
        UnaryFn::Cosh => cosh(input, shape),
        UnaryFn::Tanh => tanh(input, shape),
        UnaryFn::Asinh => asinh(input, shape),
        UnaryFn::Acosh => acosh(input, shape),
        UnaryFn::Atanh => atanh(input, shape),
    };
    Ok(result)
}

fn real(value: f64, shape: Shape) -> Constant {
    Constant::from_number(Number::new(Complex64::new(value, 0.0), false, shape))
}

/// Evaluate a function on a number, choosing the real or complex kernel.
fn map_number(
    n: &Number,
    shape: Shape,
    in_domain: fn(f64) -> bool,
    real_fn: fn(f64) -> f64,
    complex_fn: fn(Complex64) -> Complex64,
) -> Constant {
    let value = match n.as_real() {
        Some(x) if in_domain(x) => Complex64::new(real_fn(x), 0.0),
        _ => complex_fn(n.value),
    };
    Constant::from_number(Number::new(value, n.is_imaginary || value.im != 0.0, shape))
}

/// Like [`map_number`], but a real argument outside the domain is `Nan`.
fn map_real_domain(
    n: &Number,
    shape: Shape,
    in_domain: fn(f64) -> bool,
    real_fn: fn(f64) -> f64,
    complex_fn: fn(Complex64) -> Complex64,
) -> Constant {
    match n.as_real() {
        Some(x) if !n.is_imaginary && !in_domain(x) => Nan(shape),
        _ => map_number(n, shape, in_domain, real_fn, complex_fn),
    }
}

fn everywhere(_: f64) -> bool {
    true
}

fn neg(input: &Constant, shape: Shape) -> Constant {
    match input {
        Zero(_) => Zero(shape),
        NegUnity(_) => Unity(shape),
        Unity(_) => NegUnity(shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => Constant::from_number(Number::new(-n.value, n.is_imaginary, shape)),
    }
}

fn abs(input: &Constant, shape: Shape) -> Constant {
    match input {
        Zero(_) => Zero(shape),
        NegUnity(_) => Unity(shape),
        Unity(_) => Unity(shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => real(n.value.norm(), shape),
    }
}

fn sqrt(input: &Constant, shape: Shape) -> Constant {
    match input {
        Zero(_) => Zero(shape),
        NegUnity(_) => Constant::Number(Number::new(Complex64::new(0.0, 1.0), true, shape)),
        Unity(_) => Unity(shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => map_number(n, shape, |x| x >= 0.0, f64::sqrt, |z| z.sqrt()),
    }
}

fn square(input: &Constant, shape: Shape) -> Constant {
    match input {
        Zero(_) => Zero(shape),
        NegUnity(_) => Unity(shape),
        Unity(_) => Unity(shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => map_number(n, shape, everywhere, |x| x * x, |z| z * z),
    }
}

fn exp(input: &Constant, shape: Shape) -> Constant {
    match input {
        Zero(_) => Unity(shape),
        NegUnity(_) => real(1.0 / E, shape),
        Unity(_) => real(E, shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => map_number(n, shape, everywhere, f64::exp, |z| z.exp()),
    }
}

fn log(input: &Constant, shape: Shape) -> Constant {
    match input {
        Zero(_) => Nan(shape),
        NegUnity(_) => Nan(shape),
        Unity(_) => Zero(shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => map_real_domain(n, shape, |x| x > 0.0, f64::ln, |z| z.ln()),
    }
}

fn log10(input: &Constant, shape: Shape) -> Constant {
    match input {
        Zero(_) => Nan(shape),
        NegUnity(_) => Nan(shape),
        Unity(_) => Zero(shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => {
            map_real_domain(n, shape, |x| x > 0.0, f64::log10, |z| z.ln() / LN_10)
        }
    }
}

fn sin(input: &Constant, shape: Shape) -> Constant {
    match input {
        Zero(_) => Zero(shape),
        NegUnity(_) => real((-1.0f64).sin(), shape),
        Unity(_) => real(1.0f64.sin(), shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => map_number(n, shape, everywhere, f64::sin, |z| z.sin()),
    }
}

fn cos(input: &Constant, shape: Shape) -> Constant {
    match input {
        Zero(_) => Unity(shape),
        NegUnity(_) => real((-1.0f64).cos(), shape),
        Unity(_) => real(1.0f64.cos(), shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => map_number(n, shape, everywhere, f64::cos, |z| z.cos()),
    }
}

fn tan(input: &Constant, shape: Shape) -> Constant {
    match input {
        Zero(_) => Zero(shape),
        NegUnity(_) => real((-1.0f64).tan(), shape),
        Unity(_) => real(1.0f64.tan(), shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => map_number(n, shape, everywhere, f64::tan, |z| z.tan()),
    }
}

fn asin(input: &Constant, shape: Shape) -> Constant {
    match input {
        Zero(_) => Zero(shape),
        NegUnity(_) => real(-FRAC_PI_2, shape),
        Unity(_) => real(FRAC_PI_2, shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => map_number(n, shape, |x| x.abs() <= 1.0, f64::asin, |z| z.asin()),
    }
}

fn acos(input: &Constant, shape: Shape) -> Constant {
    match input {
        Zero(_) => real(FRAC_PI_2, shape),
        NegUnity(_) => real(PI, shape),
        Unity(_) => Zero(shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => map_number(n, shape, |x| x.abs() <= 1.0, f64::acos, |z| z.acos()),
    }
}

fn atan(input: &Constant, shape: Shape) -> Constant {
    match input {
        Zero(_) => Zero(shape),
        NegUnity(_) => real(-FRAC_PI_4, shape),
        Unity(_) => real(FRAC_PI_4, shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => map_number(n, shape, everywhere, f64::atan, |z| z.atan()),
    }
}

fn sinh(input: &Constant, shape: Shape) -> Constant {
    match input {
        Zero(_) => Zero(shape),
        NegUnity(_) => real((-1.0f64).sinh(), shape),
        Unity(_) => real(1.0f64.sinh(), shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => map_number(n, shape, everywhere, f64::sinh, |z| z.sinh()),
    }
}

fn cosh(input: &Constant, shape: Shape) -> Constant {
    match input {
        Zero(_) => Unity(shape),
        NegUnity(_) => real((-1.0f64).cosh(), shape),
        Unity(_) => real(1.0f64.cosh(), shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => map_number(n, shape, everywhere, f64::cosh, |z| z.cosh()),
    }
}

fn tanh(input: &Constant, shape: Shape) -> Constant {
    match input {
        Zero(_) => Zero(shape),
        NegUnity(_) => real((-1.0f64).tanh(), shape),
        Unity(_) => real(1.0f64.tanh(), shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => map_number(n, shape, everywhere, f64::tanh, |z| z.tanh()),
    }
}

fn asinh(input: &Constant, shape: Shape) -> Constant {
    match input {
        Zero(_) => Zero(shape),
        NegUnity(_) => real((-1.0f64).asinh(), shape),
        Unity(_) => real(1.0f64.asinh(), shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => map_number(n, shape, everywhere, f64::asinh, |z| z.asinh()),
    }
}

fn acosh(input: &Constant, shape: Shape) -> Constant {
    match input {
        Zero(_) => Nan(shape),
        NegUnity(_) => Nan(shape),
        Unity(_) => Zero(shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => map_real_domain(n, shape, |x| x >= 1.0, f64::acosh, |z| z.acosh()),
    }
}

fn atanh(input: &Constant, shape: Shape) -> Constant {
    match input {
        Zero(_) => Zero(shape),
        NegUnity(_) => Nan(shape),
        Unity(_) => Nan(shape),
        Nan(_) => Nan(shape),
        Constant::Number(n) => map_number(n, shape, |x| x.abs() < 1.0, f64::atanh, |z| z.atanh()),
    }
}
