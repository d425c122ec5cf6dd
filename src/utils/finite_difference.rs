//! Finite difference reference derivatives.
//!
//! Central differences over a [`Problem`]'s residuals. They are the default
//! Jacobian for problems without an analytic one, and the yardstick the
//! compiled derivatives are checked against.

use crate::error::{ExprError, Result};
use crate::problem::Problem;
use ndarray::{Array1, Array3, Array2};

/// Default relative step for first derivatives.
const DEFAULT_EPSILON: f64 = 1e-6;

/// Default relative step for second derivatives.
const DEFAULT_SECOND_EPSILON: f64 = 1e-4;

/// Step for parameter `value`, scaled to its magnitude.
fn step(value: f64, eps: f64) -> f64 {
    if value.abs() > 1.0 {
        value.abs() * eps
    } else {
        eps
    }
}

fn checked_eval(problem: &dyn Problem, params: &Array1<f64>) -> Result<Array1<f64>> {
    let residuals = problem.eval(params)?;
    if residuals.len() != problem.residual_count() {
        return Err(ExprError::DimensionMismatch(format!(
            "Expected {} residuals, got {}",
            problem.residual_count(),
            residuals.len()
        )));
    }
    Ok(residuals)
}

/// Compute the Jacobian matrix using central finite differences.
///
/// `J[i,j] = ∂residual[i]/∂param[j]`, shape `n_residuals x n_params`.
pub fn jacobian(
    problem: &dyn Problem,
    params: &Array1<f64>,
    epsilon: Option<f64>,
) -> Result<Array2<f64>> {
    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    let mut jac = Array2::zeros((problem.residual_count(), params.len()));

    for j in 0..params.len() {
        let h = step(params[j], eps);

        let mut forward = params.clone();
        forward[j] += h;
        let mut backward = params.clone();
        backward[j] -= h;

        let column = (checked_eval(problem, &forward)? - checked_eval(problem, &backward)?) / (2.0 * h);
        jac.column_mut(j).assign(&column);
    }

    Ok(jac)
}

/// Compute the second derivatives of every residual using central finite
/// differences.
///
/// `H[p,i,j] = ∂²residual[p]/∂param[i]∂param[j]`, shape
/// `n_residuals x n_params x n_params`.
pub fn hessian(
    problem: &dyn Problem,
    params: &Array1<f64>,
    epsilon: Option<f64>,
) -> Result<Array3<f64>> {
    let eps = epsilon.unwrap_or(DEFAULT_SECOND_EPSILON);
    let n = params.len();
    let mut hess = Array3::zeros((problem.residual_count(), n, n));
    let center = checked_eval(problem, params)?;

    let shifted = |moves: &[(usize, f64)]| -> Result<Array1<f64>> {
        let mut p = params.clone();
        for &(k, delta) in moves {
            p[k] += delta;
        }
        checked_eval(problem, &p)
    };

    for i in 0..n {
        let hi = step(params[i], eps);
        for j in 0..=i {
            let entry = if i == j {
                let pp = shifted(&[(i, hi)])?;
                let mm = shifted(&[(i, -hi)])?;
                (pp - &center * 2.0 + mm) / (hi * hi)
            } else {
                let hj = step(params[j], eps);
                let pp = shifted(&[(i, hi), (j, hj)])?;
                let pm = shifted(&[(i, hi), (j, -hj)])?;
                let mp = shifted(&[(i, -hi), (j, hj)])?;
                let mm = shifted(&[(i, -hi), (j, -hj)])?;
                (pp - pm - mp + mm) / (4.0 * hi * hj)
            };

            for (p, &value) in entry.iter().enumerate() {
                hess[[p, i, j]] = value;
                hess[[p, j, i]] = value;
            }
        }
    }

    Ok(hess)
}
