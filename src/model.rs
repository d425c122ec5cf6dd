//! # Expression models
//!
//! A model is an expression over named parameters and constants, compiled
//! once together with its first and second partial derivatives. Variables
//! read their values from a shared [`VariableStore`], so updating a
//! parameter between solver iterations is a store write and never a
//! recompilation.
//!
//! Derivatives are symbolic by default. A [`ModelSpec`] may supply its own
//! derivative expressions instead, which then replace the symbolic ones.
//!
//! ```
//! use exprdiff_rs::model::{ExprModel, ModelSpec};
//! use ndarray::arr1;
//!
//! let spec = ModelSpec::new("S0*exp(-b*ADC)", ["S0", "ADC"], ["b"]);
//! let model = ExprModel::new(spec).unwrap();
//! model.set_parameter("S0", arr1(&[1000.0]).into_dyn()).unwrap();
//! model.set_parameter("ADC", arr1(&[0.002]).into_dyn()).unwrap();
//! model.set_constant("b", arr1(&[0.0, 400.0]).into_dyn()).unwrap();
//!
//! let (values, jacobian) = model.eval_diff().unwrap();
//! assert_eq!(values.len(), 2);
//! assert_eq!(jacobian.shape(), &[2, 2]);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, warn};
use ndarray::{Array1, Array2, Array3};
use serde::{Deserialize, Serialize};

use crate::error::{ExprError, Result};
use crate::expression::{Expression, Runner};
use crate::lexer::LexContext;
use crate::node::{Fetcher, FetcherMap};
use crate::tensor::{broadcast_to, filled, Shape, Tensor};

/// Serializable description of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// The model expression.
    pub expression: String,

    /// Names of the parameters, in Jacobian column order.
    pub parameters: Vec<String>,

    /// Names of variables that are not differentiated.
    #[serde(default)]
    pub constants: Vec<String>,

    /// First derivative expressions, one per parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivatives: Option<Vec<String>>,

    /// Second derivative expressions for the upper triangle `i <= j`, row-major.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_derivatives: Option<Vec<String>>,
}

impl ModelSpec {
    pub fn new<P, C, S, T>(expression: impl Into<String>, parameters: P, constants: C) -> Self
    where
        P: IntoIterator<Item = S>,
        C: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            expression: expression.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
            constants: constants.into_iter().map(Into::into).collect(),
            derivatives: None,
            second_derivatives: None,
        }
    }

    /// Supply first derivative expressions, one per parameter.
    pub fn with_derivatives<I, S>(mut self, derivatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.derivatives = Some(derivatives.into_iter().map(Into::into).collect());
        self
    }

    /// Supply second derivative expressions for the upper triangle.
    pub fn with_second_derivatives<I, S>(mut self, derivatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.second_derivatives = Some(derivatives.into_iter().map(Into::into).collect());
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parameters followed by constants.
    pub fn variables(&self) -> impl Iterator<Item = &String> {
        self.parameters.iter().chain(self.constants.iter())
    }

    fn validate(&self) -> Result<()> {
        if self.parameters.is_empty() {
            return Err(ExprError::InvalidInput(
                "a model needs at least one parameter".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for name in self.variables() {
            if !seen.insert(name) {
                return Err(ExprError::InvalidInput(format!(
                    "variable '{}' is declared more than once",
                    name
                )));
            }
        }

        let n = self.parameters.len();
        if let Some(derivatives) = &self.derivatives {
            if derivatives.len() != n {
                return Err(ExprError::DimensionMismatch(format!(
                    "expected {} derivative expressions, got {}",
                    n,
                    derivatives.len()
                )));
            }
        }
        if let Some(second) = &self.second_derivatives {
            let expected = n * (n + 1) / 2;
            if second.len() != expected {
                return Err(ExprError::DimensionMismatch(format!(
                    "expected {} second derivative expressions, got {}",
                    expected,
                    second.len()
                )));
            }
        }
        Ok(())
    }
}

/// Position of `(i, j)` in a row-major upper triangle of an `n x n` matrix.
fn triangle_index(i: usize, j: usize, n: usize) -> usize {
    let (i, j) = if i <= j { (i, j) } else { (j, i) };
    i * n - i * (i + 1) / 2 + j
}

/// Current values of a model's variables, shared with its fetchers.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    values: Arc<RwLock<HashMap<String, Tensor>>>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: &str, value: Tensor) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<Tensor> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values.get(name).cloned()
    }

    /// A fetcher reading `name` from the store. Unset names read as a scalar NaN.
    pub fn fetcher(&self, name: &str) -> Fetcher {
        let values = Arc::clone(&self.values);
        let name = name.to_string();
        Arc::new(move || {
            let values = values.read().unwrap_or_else(PoisonError::into_inner);
            values
                .get(&name)
                .cloned()
                .unwrap_or_else(|| filled(&[1], f64::NAN))
        })
    }

    pub fn fetchers<'a, I>(&self, names: I) -> FetcherMap
    where
        I: IntoIterator<Item = &'a String>,
    {
        names
            .into_iter()
            .map(|name| (name.clone(), self.fetcher(name)))
            .collect()
    }
}

/// A compiled model with value, Jacobian and Hessian runners.
pub struct ExprModel {
    spec: ModelSpec,
    store: VariableStore,
    value: Arc<Expression>,
    value_runner: Runner,
    first: Vec<Arc<Expression>>,
    first_runners: Vec<Runner>,
    second_runners: Vec<Runner>,
}

impl fmt::Debug for ExprModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExprModel")
            .field("spec", &self.spec)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl ExprModel {
    /// Compile a model. Every variable starts out as a scalar zero.
    pub fn new(spec: ModelSpec) -> Result<Self> {
        spec.validate()?;

        let store = VariableStore::new();
        for name in spec.variables() {
            store.set(name, filled(&[1], 0.0));
        }

        let ctx = LexContext::new().with_variables(spec.variables().cloned());
        let fetchers = store.fetchers(spec.variables());
        let compile = |source: &str| -> Result<Arc<Expression>> {
            Ok(Arc::new(Expression::compile(source, &ctx, &fetchers)?))
        };

        let value = compile(&spec.expression)?;
        let value_runner = value.value_runner();

        let (first, first_runners) = match &spec.derivatives {
            Some(sources) => {
                let mut first = Vec::with_capacity(sources.len());
                for (param, source) in spec.parameters.iter().zip(sources) {
                    warn!(
                        "using supplied derivative '{}' for parameter '{}' instead of the symbolic one",
                        source, param
                    );
                    first.push(compile(source)?);
                }
                let runners: Vec<Runner> = first.iter().map(|e| e.value_runner()).collect();
                (first, runners)
            }
            None => {
                let first = spec
                    .parameters
                    .iter()
                    .map(|param| value.derivative(param).map(Arc::new))
                    .collect::<Result<Vec<_>>>()?;
                (first, value.derivative_runners(&spec.parameters))
            }
        };

        let n = spec.parameters.len();
        let second_runners = match &spec.second_derivatives {
            Some(sources) => {
                warn!("using {} supplied second derivative expressions", sources.len());
                sources
                    .iter()
                    .map(|source| compile(source).map(|e| e.value_runner()))
                    .collect::<Result<Vec<_>>>()?
            }
            None => {
                let mut runners = Vec::with_capacity(n * (n + 1) / 2);
                for (i, first_i) in first.iter().enumerate() {
                    runners.extend(first_i.derivative_runners(&spec.parameters[i..]));
                }
                runners
            }
        };

        debug!(
            "compiled model '{}' with {} parameters and {} constants",
            spec.expression,
            n,
            spec.constants.len()
        );

        Ok(Self {
            spec,
            store,
            value,
            value_runner,
            first,
            first_runners,
            second_runners,
        })
    }

    /// Compile a model from its JSON description.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(ModelSpec::from_json(json)?)
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    pub fn parameter_names(&self) -> &[String] {
        &self.spec.parameters
    }

    pub fn constant_names(&self) -> &[String] {
        &self.spec.constants
    }

    pub fn parameter_count(&self) -> usize {
        self.spec.parameters.len()
    }

    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    pub fn expression(&self) -> &Expression {
        &self.value
    }

    /// The first derivative expression for parameter `index`.
    pub fn derivative_expression(&self, index: usize) -> Option<&Expression> {
        self.first.get(index).map(|e| e.as_ref())
    }

    pub fn set_parameter(&self, name: &str, value: Tensor) -> Result<()> {
        if !self.spec.parameters.iter().any(|p| p == name) {
            return Err(ExprError::InvalidInput(format!("'{}' is not a parameter", name)));
        }
        self.store.set(name, value);
        Ok(())
    }

    pub fn set_constant(&self, name: &str, value: Tensor) -> Result<()> {
        if !self.spec.constants.iter().any(|c| c == name) {
            return Err(ExprError::InvalidInput(format!("'{}' is not a constant", name)));
        }
        self.store.set(name, value);
        Ok(())
    }

    /// Set every parameter to a scalar, in parameter order.
    pub fn set_parameter_values(&self, values: &Array1<f64>) -> Result<()> {
        if values.len() != self.parameter_count() {
            return Err(ExprError::DimensionMismatch(format!(
                "expected {} parameter values, got {}",
                self.parameter_count(),
                values.len()
            )));
        }
        for (name, &value) in self.spec.parameters.iter().zip(values.iter()) {
            self.store.set(name, filled(&[1], value));
        }
        Ok(())
    }

    /// Shape of the model output at the current values.
    pub fn output_shape(&self) -> Result<Shape> {
        Ok((self.value_runner)()?.shape())
    }

    fn flatten(&self, runner: &Runner, shape: &[usize]) -> Result<Array1<f64>> {
        let tensor = (runner)()?.to_tensor()?;
        let full = broadcast_to(&tensor, shape)?;
        Ok(full.iter().copied().collect())
    }

    /// Model values at the current parameters, flattened.
    pub fn values(&self) -> Result<Array1<f64>> {
        let tensor = (self.value_runner)()?.to_tensor()?;
        Ok(tensor.iter().copied().collect())
    }

    /// `values - data`.
    pub fn residuals(&self, data: &Array1<f64>) -> Result<Array1<f64>> {
        let values = self.values()?;
        if values.len() != data.len() {
            return Err(ExprError::DimensionMismatch(format!(
                "expected {} observed values, got {}",
                values.len(),
                data.len()
            )));
        }
        Ok(values - data)
    }

    fn parameter_index(&self, index: usize) -> Result<()> {
        if index >= self.parameter_count() {
            return Err(ExprError::InvalidInput(format!(
                "parameter index {} out of range for {} parameters",
                index,
                self.parameter_count()
            )));
        }
        Ok(())
    }

    /// Partial derivative with respect to parameter `index`, broadcast to the
    /// output shape and flattened.
    pub fn derivative(&self, index: usize) -> Result<Array1<f64>> {
        self.parameter_index(index)?;
        let shape = self.output_shape()?;
        self.flatten(&self.first_runners[index], &shape)
    }

    /// Second partial derivative with respect to parameters `i` and `j`.
    pub fn second_derivative(&self, i: usize, j: usize) -> Result<Array1<f64>> {
        self.parameter_index(i)?;
        self.parameter_index(j)?;
        let shape = self.output_shape()?;
        let runner = &self.second_runners[triangle_index(i, j, self.parameter_count())];
        self.flatten(runner, &shape)
    }

    /// Jacobian of the flattened output, `n_points x n_params`.
    pub fn jacobian(&self) -> Result<Array2<f64>> {
        let shape = self.output_shape()?;
        let n_points: usize = shape.iter().product();
        let mut jac = Array2::zeros((n_points, self.parameter_count()));

        for (j, runner) in self.first_runners.iter().enumerate() {
            let column = self.flatten(runner, &shape)?;
            jac.column_mut(j).assign(&column);
        }
        Ok(jac)
    }

    /// [`jacobian`](Self::jacobian) with the columns evaluated in parallel.
    #[cfg(feature = "parallel")]
    pub fn jacobian_parallel(&self) -> Result<Array2<f64>> {
        let shape = self.output_shape()?;
        let n_points: usize = shape.iter().product();
        let columns = crate::utils::parallel::map_indices(self.first_runners.len(), |j| {
            self.flatten(&self.first_runners[j], &shape)
        })?;
        crate::utils::parallel::assemble_columns(columns, n_points)
    }

    /// Hessian of the flattened output, `n_points x n_params x n_params`.
    pub fn hessian(&self) -> Result<Array3<f64>> {
        let shape = self.output_shape()?;
        let n_points: usize = shape.iter().product();
        let n = self.parameter_count();
        let mut hess = Array3::zeros((n_points, n, n));

        for i in 0..n {
            for j in i..n {
                let column = self.flatten(&self.second_runners[triangle_index(i, j, n)], &shape)?;
                for (p, &value) in column.iter().enumerate() {
                    hess[[p, i, j]] = value;
                    hess[[p, j, i]] = value;
                }
            }
        }
        Ok(hess)
    }

    /// Values and Jacobian at the current parameters.
    pub fn eval_diff(&self) -> Result<(Array1<f64>, Array2<f64>)> {
        Ok((self.values()?, self.jacobian()?))
    }

    /// Values, Jacobian and Hessian at the current parameters.
    pub fn eval_diff_hess(&self) -> Result<(Array1<f64>, Array2<f64>, Array3<f64>)> {
        Ok((self.values()?, self.jacobian()?, self.hessian()?))
    }
}
