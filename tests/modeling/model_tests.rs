//! Integration tests for the model layer and the problem adapter.

use approx::assert_relative_eq;
use exprdiff_rs::utils::finite_difference;
use exprdiff_rs::{ExprError, ExprModel, ExprProblem, ModelSpec, Problem};
use ndarray::{arr1, Array1};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const B_VALUES: [f64; 4] = [0.0, 200.0, 400.0, 800.0];

fn adc_model(b: &[f64]) -> ExprModel {
    let model = ExprModel::new(ModelSpec::new("S0*exp(-b*ADC)", ["S0", "ADC"], ["b"])).unwrap();
    model.set_parameter("S0", arr1(&[1000.0]).into_dyn()).unwrap();
    model.set_parameter("ADC", arr1(&[0.002]).into_dyn()).unwrap();
    model.set_constant("b", arr1(b).into_dyn()).unwrap();
    model
}

#[test]
fn test_adc_end_to_end() {
    let model = adc_model(&[400.0]);

    let value = model.values().unwrap();
    assert_relative_eq!(value[0], 449.3289641172216, max_relative = 1e-12);

    let d_adc = model.derivative(1).unwrap();
    assert_relative_eq!(d_adc[0], -179731.58564688865, max_relative = 1e-12);

    let d_s0 = model.derivative(0).unwrap();
    assert_relative_eq!(d_s0[0], (-0.8f64).exp(), max_relative = 1e-12);
}

#[test]
fn test_jacobian_matches_finite_differences() {
    let model = adc_model(&B_VALUES);
    let data = Array1::zeros(B_VALUES.len());
    let problem = ExprProblem::new(model, data).unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..10 {
        let params = arr1(&[rng.gen_range(500.0..1500.0), rng.gen_range(0.0005..0.003)]);
        let analytic = problem.jacobian(&params).unwrap();
        let numeric = finite_difference::jacobian(&problem, &params, None).unwrap();

        assert_eq!(analytic.shape(), &[4, 2]);
        for (a, n) in analytic.iter().zip(numeric.iter()) {
            assert_relative_eq!(*a, *n, epsilon = 1e-6, max_relative = 1e-4);
        }
    }
}

#[test]
fn test_hessian_matches_finite_differences() {
    let model = adc_model(&B_VALUES);
    let problem = ExprProblem::new(model, Array1::zeros(B_VALUES.len())).unwrap();
    let params = arr1(&[1000.0, 0.002]);

    problem.model().set_parameter_values(&params).unwrap();
    let analytic = problem.model().hessian().unwrap();
    let numeric = finite_difference::hessian(&problem, &params, None).unwrap();

    assert_eq!(analytic.shape(), &[4, 2, 2]);
    for (a, n) in analytic.iter().zip(numeric.iter()) {
        assert_relative_eq!(*a, *n, epsilon = 1e-3, max_relative = 1e-2);
    }
}

#[test]
fn test_residuals_are_model_minus_data() {
    let model = adc_model(&[0.0, 400.0]);
    let residuals = model.residuals(&arr1(&[1000.0, 400.0])).unwrap();
    assert_relative_eq!(residuals[0], 0.0);
    assert_relative_eq!(residuals[1], 49.3289641172216, max_relative = 1e-10);

    let err = model.residuals(&arr1(&[1.0])).unwrap_err();
    assert!(matches!(err, ExprError::DimensionMismatch(_)));
}

#[test]
fn test_model_from_json_with_supplied_derivatives() {
    let json = r#"{
        "expression": "a*exp(k*t)",
        "parameters": ["a", "k"],
        "constants": ["t"],
        "derivatives": ["exp(k*t)", "a*t*exp(k*t)"],
        "second_derivatives": ["0", "t*exp(k*t)", "a*t*t*exp(k*t)"]
    }"#;
    let model = ExprModel::from_json(json).unwrap();
    model.set_parameter_values(&arr1(&[2.0, 0.5])).unwrap();
    model.set_constant("t", arr1(&[0.0, 1.0, 2.0]).into_dyn()).unwrap();

    let (values, jacobian, hessian) = model.eval_diff_hess().unwrap();
    assert_eq!(values.len(), 3);
    assert_relative_eq!(jacobian[[2, 0]], 1.0f64.exp(), max_relative = 1e-12);
    assert_relative_eq!(jacobian[[2, 1]], 4.0 * 1.0f64.exp(), max_relative = 1e-12);
    assert_relative_eq!(hessian[[2, 0, 0]], 0.0);
    assert_relative_eq!(hessian[[1, 1, 0]], 0.5f64.exp(), max_relative = 1e-12);
    assert_relative_eq!(hessian[[2, 1, 1]], 8.0 * 1.0f64.exp(), max_relative = 1e-12);

    // The symbolic model gives the same numbers.
    let symbolic = ExprModel::new(ModelSpec::new("a*exp(k*t)", ["a", "k"], ["t"])).unwrap();
    symbolic.set_parameter_values(&arr1(&[2.0, 0.5])).unwrap();
    symbolic.set_constant("t", arr1(&[0.0, 1.0, 2.0]).into_dyn()).unwrap();
    let (_, sym_jacobian, sym_hessian) = symbolic.eval_diff_hess().unwrap();
    for (a, b) in jacobian.iter().zip(sym_jacobian.iter()) {
        assert_relative_eq!(*a, *b, max_relative = 1e-12);
    }
    for (a, b) in hessian.iter().zip(sym_hessian.iter()) {
        assert_relative_eq!(*a, *b, max_relative = 1e-12);
    }
}

#[test]
fn test_bad_specs_are_rejected() {
    let err = ExprModel::from_json(r#"{"expression": "a*", "parameters": ["a"]}"#).unwrap_err();
    assert!(matches!(err, ExprError::Parse(_) | ExprError::Build(_)));

    let err = ExprModel::from_json(r#"{"expression": "a"}"#).unwrap_err();
    assert!(matches!(err, ExprError::JsonError(_)));

    let spec = ModelSpec::new("a*b", ["a", "b"], Vec::<String>::new())
        .with_second_derivatives(["0", "1"]);
    assert!(matches!(
        ExprModel::new(spec).unwrap_err(),
        ExprError::DimensionMismatch(_)
    ));
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_jacobian() {
    let model = adc_model(&B_VALUES);
    assert_eq!(model.jacobian_parallel().unwrap(), model.jacobian().unwrap());
}
