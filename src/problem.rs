//! Least-squares problem interface.
//!
//! This module defines the `Problem` trait, the shape a nonlinear
//! least-squares solver expects: residuals and a Jacobian as functions of a
//! flat parameter vector. [`ExprProblem`] adapts an [`ExprModel`] and a set
//! of observations to it, with the Jacobian taken from the model's compiled
//! derivatives.

use ndarray::{Array1, Array2};

use crate::error::{ExprError, Result};
use crate::model::ExprModel;

/// A nonlinear least-squares problem.
pub trait Problem {
    /// Evaluate the residuals at the given parameters.
    ///
    /// # Arguments
    ///
    /// * `params` - The parameter values at which to evaluate the residuals
    ///
    /// # Returns
    ///
    /// * A vector of residuals, or an error if the evaluation fails
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>>;

    /// Get the number of parameters in the problem.
    fn parameter_count(&self) -> usize;

    /// Get the number of residuals in the problem.
    fn residual_count(&self) -> usize;

    /// Evaluate the Jacobian matrix at the given parameters.
    ///
    /// The default implementation uses central finite differences.
    fn jacobian(&self, params: &Array1<f64>) -> Result<Array2<f64>>
    where
        Self: Sized,
    {
        crate::utils::finite_difference::jacobian(self, params, None)
    }

    /// Whether `jacobian` is computed analytically.
    fn has_custom_jacobian(&self) -> bool {
        false
    }

    /// Evaluate the sum of squared residuals at the given parameters.
    fn eval_cost(&self, params: &Array1<f64>) -> Result<f64> {
        let residuals = self.eval(params)?;
        Ok(residuals.iter().map(|r| r.powi(2)).sum())
    }
}

/// An [`ExprModel`] fitted to observed data.
///
/// Parameters are scalars in the model's parameter order. Evaluation writes
/// them into the model's variable store, so one `ExprProblem` must not be
/// evaluated from several threads at different parameter values at once.
#[derive(Debug)]
pub struct ExprProblem {
    model: ExprModel,
    data: Array1<f64>,
}

impl ExprProblem {
    /// Pair a model with observations. The model's constants must already be
    /// set so the output length can be checked against `data`.
    pub fn new(model: ExprModel, data: Array1<f64>) -> Result<Self> {
        let n_points: usize = model.output_shape()?.iter().product();
        if n_points != data.len() {
            return Err(ExprError::DimensionMismatch(format!(
                "model produces {} values but {} observations were given",
                n_points,
                data.len()
            )));
        }
        Ok(Self { model, data })
    }

    pub fn model(&self) -> &ExprModel {
        &self.model
    }

    pub fn data(&self) -> &Array1<f64> {
        &self.data
    }
}

impl Problem for ExprProblem {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        self.model.set_parameter_values(params)?;
        self.model.residuals(&self.data)
    }

    fn parameter_count(&self) -> usize {
        self.model.parameter_count()
    }

    fn residual_count(&self) -> usize {
        self.data.len()
    }

    fn jacobian(&self, params: &Array1<f64>) -> Result<Array2<f64>> {
        self.model.set_parameter_values(params)?;
        self.model.jacobian()
    }

    fn has_custom_jacobian(&self) -> bool {
        true
    }
}
