//! Integration tests for evaluation and differentiation.

use approx::assert_relative_eq;
use exprdiff_rs::model::VariableStore;
use exprdiff_rs::node::{constant_fetcher, FetcherMap};
use exprdiff_rs::token::Constant;
use exprdiff_rs::{Evaluated, Expression, LexContext, Node};
use ndarray::arr1;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::test_helpers::{compile, scalar_fetchers};

#[test]
fn test_exponential_decay_derivatives() {
    let mut fetchers = FetcherMap::new();
    fetchers.insert("x".to_string(), constant_fetcher(arr1(&[1.0, 2.0, 3.0]).into_dyn()));
    fetchers.insert("b".to_string(), constant_fetcher(arr1(&[0.5]).into_dyn()));
    fetchers.insert("y".to_string(), constant_fetcher(arr1(&[2.0]).into_dyn()));
    let expr = compile("x*exp(-b*y)", &fetchers);

    let e = (-1.0f64).exp();
    let dx = expr.diff("x").unwrap().to_tensor().unwrap();
    let dy = expr.diff("y").unwrap().to_tensor().unwrap();
    let db = expr.diff("b").unwrap().to_tensor().unwrap();

    assert_eq!(dx.shape(), &[3]);
    for (i, x) in [1.0, 2.0, 3.0].iter().enumerate() {
        assert_relative_eq!(dx[[i]], e, max_relative = 1e-12);
        assert_relative_eq!(dy[[i]], -0.5 * x * e, max_relative = 1e-12);
        assert_relative_eq!(db[[i]], -2.0 * x * e, max_relative = 1e-12);
    }
}

#[test]
fn test_constant_subtrees_differentiate_to_exact_zero() {
    let fetchers = scalar_fetchers(&[("x", 1.5), ("y", 0.25)]);

    let expr = compile("2*3+sin(1)-pow(4,0.5)", &fetchers);
    assert_eq!(expr.diff("x").unwrap(), Evaluated::Symbol(Constant::zero()));
    assert_eq!(expr.derivative("x").unwrap().root(), &Node::Number(Constant::zero()));

    let expr = compile("y^2*3", &fetchers);
    assert!(expr.diff("x").unwrap().is_zero());
}

#[test]
fn test_symbolic_derivative_agrees_with_diff() {
    let fetchers = scalar_fetchers(&[("x", 0.7), ("y", 1.3)]);
    for source in ["x*exp(-x*y)", "atan2(y,x)", "x/y+log(x)", "tanh(x)^y"] {
        let expr = compile(source, &fetchers);
        for wrt in ["x", "y"] {
            let numeric = expr.diff(wrt).unwrap().to_tensor().unwrap();
            let symbolic = expr.derivative(wrt).unwrap().eval_tensor().unwrap();
            assert_relative_eq!(numeric[[0]], symbolic[[0]], max_relative = 1e-12);
        }
    }
}

#[test]
fn test_second_derivative() {
    let fetchers = scalar_fetchers(&[("x", 2.0), ("y", 3.0)]);
    let expr = compile("x^3*y", &fetchers);

    let dxx = expr.derivative("x").unwrap().diff("x").unwrap().to_tensor().unwrap();
    assert_relative_eq!(dxx[[0]], 6.0 * 2.0 * 3.0, max_relative = 1e-12);

    let dxy = expr.derivative("x").unwrap().diff("y").unwrap().to_tensor().unwrap();
    assert_relative_eq!(dxy[[0]], 3.0 * 4.0, max_relative = 1e-12);
}

/// Central difference of `expr` with respect to `name`, moving the value in `store`.
fn central_difference(expr: &Expression, store: &VariableStore, name: &str, value: f64) -> f64 {
    let h = 1e-6 * value.abs().max(1.0);

    store.set(name, arr1(&[value + h]).into_dyn());
    let forward = expr.eval_tensor().unwrap()[[0]];
    store.set(name, arr1(&[value - h]).into_dyn());
    let backward = expr.eval_tensor().unwrap()[[0]];
    store.set(name, arr1(&[value]).into_dyn());

    (forward - backward) / (2.0 * h)
}

#[test]
fn test_derivatives_match_finite_differences() {
    let names: Vec<String> = ["x", "y", "b"].iter().map(|s| s.to_string()).collect();
    let store = VariableStore::new();
    let fetchers = store.fetchers(&names);
    let ctx = LexContext::new().with_variables(names.iter().cloned());

    let sources = [
        "x*exp(-b*y)",
        "sin(x)*cos(y)+x^2",
        "log(x)*sqrt(y)-log10(b)",
        "atan2(y,x)*b",
        "x/y-b/x",
        "tanh(x*y)+asinh(b)",
        "pow(x,y)*square(b)",
        "abs(x-y)+sinh(b)*cosh(x)",
        "atan(x*b)+asin(b/2)+acos(b/3)",
        "acosh(x+1)*atanh(b/2)",
        "tan(b)*exp(y)/x",
    ];
    let expressions: Vec<Expression> = sources
        .iter()
        .map(|s| Expression::compile(s, &ctx, &fetchers).unwrap())
        .collect();

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..20 {
        let x: f64 = rng.gen_range(0.5..2.0);
        let y: f64 = rng.gen_range(0.5..2.0);
        let b: f64 = rng.gen_range(0.1..1.0);
        // Keep |x - y| away from the kink of abs.
        if (x - y).abs() < 1e-3 {
            continue;
        }
        for (name, value) in [("x", x), ("y", y), ("b", b)] {
            store.set(name, arr1(&[value]).into_dyn());
        }

        for expr in &expressions {
            for (name, value) in [("x", x), ("y", y), ("b", b)] {
                let analytic = expr.diff(name).unwrap().to_tensor().unwrap()[[0]];
                let numeric = central_difference(expr, &store, name, value);
                assert_relative_eq!(analytic, numeric, epsilon = 1e-6, max_relative = 1e-4);
            }
        }
    }
}

#[test]
fn test_printed_derivative_recompiles() {
    let fetchers = scalar_fetchers(&[("x", 0.4), ("b", 1.1)]);
    let expr = compile("sin(x)*exp(-b*x)", &fetchers);
    let derivative = expr.derivative("x").unwrap();

    let ctx = LexContext::new().with_variables(["x", "b"]);
    let reparsed = Expression::compile(&derivative.to_string(), &ctx, &fetchers).unwrap();
    assert_relative_eq!(
        reparsed.eval_tensor().unwrap()[[0]],
        expr.diff("x").unwrap().to_tensor().unwrap()[[0]],
        max_relative = 1e-12
    );
}

#[test]
fn test_derivative_with_nan_constant_recompiles() {
    let fetchers = scalar_fetchers(&[("x", 0.4)]);
    let ctx = LexContext::new().with_variables(["x"]);

    let expr = compile("log(0)*x", &fetchers);
    let printed = expr.derivative("x").unwrap().to_string();
    let reparsed = Expression::compile(&printed, &ctx, &fetchers).unwrap();
    assert!(reparsed.eval_tensor().unwrap()[[0]].is_nan(), "{}", printed);

    let tree = Node::binary(
        exprdiff_rs::BinaryFn::Add,
        Node::Number(Constant::nan()),
        Node::variable("x", constant_fetcher(arr1(&[0.4]).into_dyn())),
    );
    let reparsed = Expression::compile(&tree.to_string(), &ctx, &fetchers).unwrap();
    assert!(reparsed.eval_tensor().unwrap()[[0]].is_nan());
}
