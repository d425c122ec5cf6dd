//! Parallel evaluation of runners and Jacobian columns.
//!
//! Compiled trees are immutable and variables are read through shared
//! fetchers, so independent derivative runners can be evaluated on the rayon
//! pool as long as nobody writes the variable store meanwhile.

use ndarray::{Array1, Array2};
use rayon::prelude::*;

use crate::error::{ExprError, Result};
use crate::evaluated::Evaluated;
use crate::expression::Runner;

/// Evaluate `f` for every index in `0..n` in parallel, keeping index order.
/// The first error encountered is returned.
pub fn map_indices<T, F>(n: usize, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync + Send,
{
    (0..n).into_par_iter().map(f).collect()
}

/// Call every runner in parallel.
pub fn run_all(runners: &[Runner]) -> Result<Vec<Evaluated>> {
    runners.par_iter().map(|runner| runner()).collect()
}

/// Stack equally long columns into an `n_rows x columns.len()` matrix.
pub fn assemble_columns(columns: Vec<Array1<f64>>, n_rows: usize) -> Result<Array2<f64>> {
    let mut jac = Array2::zeros((n_rows, columns.len()));
    for (j, column) in columns.into_iter().enumerate() {
        if column.len() != n_rows {
            return Err(ExprError::DimensionMismatch(format!(
                "Column {} has {} rows, expected {}",
                j,
                column.len(),
                n_rows
            )));
        }
        jac.column_mut(j).assign(&column);
    }
    Ok(jac)
}
