//! Integration tests for the sentinel algebra tables.

use approx::assert_relative_eq;
use exprdiff_rs::error::AlgebraError;
use exprdiff_rs::node::{constant_fetcher, FetcherMap};
use exprdiff_rs::token::algebra::{self, BinaryFn, UnaryFn};
use exprdiff_rs::token::{Constant, Number, Token, VariableToken};
use exprdiff_rs::Evaluated;
use ndarray::arr1;
use num_complex::Complex64;

use crate::test_helpers::{compile, eval_scalar};

fn sample_constants() -> Vec<Constant> {
    vec![
        Constant::zero(),
        Constant::unity(),
        Constant::neg_unity(),
        Constant::nan(),
        Constant::real(2.5),
        Constant::real(-0.75),
        Constant::Number(Number::imaginary(3.0)),
    ]
}

#[test]
fn test_commutative_operators_commute() {
    let constants = sample_constants();
    for op in [BinaryFn::Add, BinaryFn::Mul] {
        for a in &constants {
            for b in &constants {
                assert_eq!(
                    algebra::binary(op, a, b).unwrap(),
                    algebra::binary(op, b, a).unwrap(),
                    "{:?} {} {}",
                    op,
                    a,
                    b
                );
            }
        }
    }
}

#[test]
fn test_identities() {
    let x = Constant::real(2.5);
    assert_eq!(algebra::binary(BinaryFn::Add, &Constant::zero(), &x).unwrap(), x);
    assert_eq!(algebra::binary(BinaryFn::Mul, &Constant::unity(), &x).unwrap(), x);
    assert_eq!(
        algebra::binary(BinaryFn::Mul, &Constant::neg_unity(), &x).unwrap(),
        Constant::real(-2.5)
    );
    for c in sample_constants() {
        for op in BinaryFn::ALL {
            if op == BinaryFn::Atan2 && c.is_imaginary() {
                continue;
            }
            assert_eq!(
                algebra::binary(op, &c, &Constant::nan()).unwrap(),
                Constant::nan(),
                "{:?} {}",
                op,
                c
            );
        }
    }
}

#[test]
fn test_zero_cases() {
    let zero = Constant::zero();
    assert_eq!(algebra::binary(BinaryFn::Div, &zero, &zero).unwrap(), Constant::nan());
    assert_eq!(
        algebra::binary(BinaryFn::Div, &Constant::real(3.0), &zero).unwrap(),
        Constant::nan()
    );
    assert_eq!(algebra::binary(BinaryFn::Pow, &zero, &zero).unwrap(), Constant::unity());
    assert_eq!(
        algebra::binary(BinaryFn::Pow, &zero, &Constant::neg_unity()).unwrap(),
        Constant::nan()
    );
    assert_eq!(algebra::binary(BinaryFn::Pow, &zero, &Constant::unity()).unwrap(), zero);
}

#[test]
fn test_imaginary_flag_propagates() {
    let sum = algebra::binary(
        BinaryFn::Add,
        &Constant::real(2.0),
        &Constant::Number(Number::imaginary(3.0)),
    )
    .unwrap();
    assert!(sum.is_imaginary());
    assert_eq!(sum.value(), Complex64::new(2.0, 3.0));
}

#[test]
fn test_unary_table() {
    assert_eq!(algebra::unary(UnaryFn::Cos, &Constant::zero()).unwrap(), Constant::unity());
    assert_eq!(algebra::unary(UnaryFn::Log, &Constant::zero()).unwrap(), Constant::nan());
    assert_eq!(algebra::unary(UnaryFn::Log, &Constant::unity()).unwrap(), Constant::zero());
    assert_eq!(algebra::unary(UnaryFn::Acosh, &Constant::zero()).unwrap(), Constant::nan());
    assert_eq!(algebra::unary(UnaryFn::Acosh, &Constant::unity()).unwrap(), Constant::zero());

    let root = algebra::unary(UnaryFn::Sqrt, &Constant::neg_unity()).unwrap();
    assert!(root.is_imaginary());
    assert_eq!(root.value(), Complex64::new(0.0, 1.0));

    let e = algebra::unary(UnaryFn::Exp, &Constant::unity()).unwrap();
    assert_relative_eq!(e.value().re, std::f64::consts::E);
}

#[test]
fn test_shapes_broadcast() {
    let lhs = Constant::Zero(vec![3]);
    let rhs = Constant::Unity(vec![2, 1]);
    let sum = algebra::binary(BinaryFn::Add, &lhs, &rhs).unwrap();
    assert_eq!(sum, Constant::Unity(vec![2, 3]));

    let err = algebra::binary(BinaryFn::Add, &Constant::Zero(vec![3]), &Constant::Zero(vec![2]))
        .unwrap_err();
    assert!(matches!(err, AlgebraError::Broadcast { .. }));
}

#[test]
fn test_uncovered_combinations_are_errors() {
    let err = algebra::binary(
        BinaryFn::Atan2,
        &Constant::Number(Number::imaginary(1.0)),
        &Constant::real(2.0),
    )
    .unwrap_err();
    assert!(matches!(err, AlgebraError::Unsupported { .. }));

    let variable = Token::Variable(VariableToken::new("x"));
    let add = exprdiff_rs::lex("1+1", &exprdiff_rs::LexContext::new()).unwrap()[1].clone();
    let err = algebra::apply_tokens(&add, &[variable, Token::from(Constant::unity())]).unwrap_err();
    assert!(matches!(err, AlgebraError::Unsupported { .. }));

    // A complex constant can not be materialized into a real tensor.
    let tensor = Evaluated::Value(arr1(&[1.0, 2.0]).into_dyn());
    let complex = Evaluated::Symbol(Constant::Number(Number::imaginary(1.0)));
    assert!(matches!(
        tensor.add(&complex),
        Err(AlgebraError::ComplexMaterialization { .. })
    ));
}

#[test]
fn test_tensor_times_zero_is_exact() {
    let tensor = Evaluated::Value(arr1(&[1.0, f64::INFINITY, 3.0]).into_dyn());
    let product = tensor.mul(&Evaluated::Symbol(Constant::zero())).unwrap();
    assert!(product.is_zero());
    assert_eq!(product.shape(), vec![3]);

    let quotient = tensor.div(&Evaluated::Symbol(Constant::unity())).unwrap();
    assert_eq!(quotient, tensor);
}

#[test]
fn test_folded_zero_divides_like_literal_zero() {
    for source in ["3/(2-2)", "3/0", "(2-2)/(2-2)", "0/0", "(2-2)^(0-1)", "0^(0-1)"] {
        assert!(eval_scalar(source).is_nan(), "{}", source);
    }
    assert_eq!(eval_scalar("(2-2)^(3-3)"), 1.0);
    assert_eq!(eval_scalar("(4-2)/(3-1)"), 1.0);
}

#[test]
fn test_zero_over_tensor_divides_elementwise() {
    let mut fetchers = FetcherMap::new();
    fetchers.insert("x".to_string(), constant_fetcher(arr1(&[0.0, 2.0]).into_dyn()));
    fetchers.insert("y".to_string(), constant_fetcher(arr1(&[4.0, 2.0]).into_dyn()));

    let quotient = compile("0/x", &fetchers).eval_tensor().unwrap();
    assert!(quotient[[0]].is_nan());
    assert_eq!(quotient[[1]], 0.0);

    assert!(compile("0/y", &fetchers).eval().unwrap().is_zero());
    assert!(compile("0*x", &fetchers).eval().unwrap().is_zero());
}

#[test]
fn test_nan_powers() {
    assert_eq!(eval_scalar("(0/0)^0"), 1.0);
    assert!(eval_scalar("(0/0)^2").is_nan());
    assert!(eval_scalar("2^(0/0)").is_nan());
    assert!(eval_scalar("0^(0/0)").is_nan());

    let mut fetchers = FetcherMap::new();
    fetchers.insert("x".to_string(), constant_fetcher(arr1(&[f64::NAN, 2.0]).into_dyn()));
    let power = compile("x^0", &fetchers).eval_tensor().unwrap();
    assert_eq!(power, arr1(&[1.0, 1.0]).into_dyn());
}

#[test]
fn test_negative_log_arguments_are_nan() {
    for source in ["log(-1)", "log(0-1)", "log(1-3)", "log10(-1)", "log10(2-4)", "acosh(-1)"] {
        assert!(eval_scalar(source).is_nan(), "{}", source);
    }
}
