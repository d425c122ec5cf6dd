//! Tensor backend.
//!
//! Expressions are evaluated over dynamically shaped `ndarray` arrays of
//! `f64`. Binary operations follow NumPy broadcasting: shapes are aligned on
//! their trailing axes and axes of length one stretch to match.

use ndarray::{ArrayD, IxDyn, Zip};

use crate::error::AlgebraError;

/// A broadcastable real tensor.
pub type Tensor = ArrayD<f64>;

/// The shape of a tensor or of a sentinel constant.
pub type Shape = Vec<usize>;

/// Shape given to constants that carry no explicit shape.
pub fn scalar_shape() -> Shape {
    vec![1]
}

/// Compute the shape two operands broadcast to.
///
/// # Examples
///
/// ```
/// use exprdiff_rs::tensor::broadcast_shapes;
///
/// assert_eq!(broadcast_shapes(&[3, 1], &[4]).unwrap(), vec![3, 4]);
/// assert!(broadcast_shapes(&[2], &[3]).is_err());
/// ```
pub fn broadcast_shapes(lhs: &[usize], rhs: &[usize]) -> Result<Shape, AlgebraError> {
    let ndim = lhs.len().max(rhs.len());
    let lpad = ndim - lhs.len();
    let rpad = ndim - rhs.len();

    let mut out = Vec::with_capacity(ndim);
    for axis in 0..ndim {
        let l = if axis < lpad { 1 } else { lhs[axis - lpad] };
        let r = if axis < rpad { 1 } else { rhs[axis - rpad] };

        let dim = if l == r || r == 1 {
            l
        } else if l == 1 {
            r
        } else {
            return Err(AlgebraError::Broadcast {
                lhs: lhs.to_vec(),
                rhs: rhs.to_vec(),
            });
        };
        out.push(dim);
    }
    Ok(out)
}

/// Broadcast a tensor to `shape`, returning an owned copy.
pub fn broadcast_to(tensor: &Tensor, shape: &[usize]) -> Result<Tensor, AlgebraError> {
    tensor
        .broadcast(IxDyn(shape))
        .map(|view| view.to_owned())
        .ok_or_else(|| AlgebraError::Broadcast {
            lhs: tensor.shape().to_vec(),
            rhs: shape.to_vec(),
        })
}

/// A tensor of `shape` filled with `value`.
pub fn filled(shape: &[usize], value: f64) -> Tensor {
    Tensor::from_elem(IxDyn(shape), value)
}

/// Combine two tensors elementwise after broadcasting them to a common shape.
pub fn zip_with<F>(lhs: &Tensor, rhs: &Tensor, f: F) -> Result<Tensor, AlgebraError>
where
    F: Fn(f64, f64) -> f64,
{
    let shape = broadcast_shapes(lhs.shape(), rhs.shape())?;
    let broadcast_err = || AlgebraError::Broadcast {
        lhs: lhs.shape().to_vec(),
        rhs: rhs.shape().to_vec(),
    };
    let lview = lhs.broadcast(IxDyn(&shape)).ok_or_else(broadcast_err)?;
    let rview = rhs.broadcast(IxDyn(&shape)).ok_or_else(broadcast_err)?;

    Ok(Zip::from(lview).and(rview).map_collect(|&l, &r| f(l, r)))
}

/// Combine a tensor with a scalar elementwise, broadcasting the result to
/// the common shape of the tensor and `scalar_shape`.
pub fn zip_scalar<F>(
    tensor: &Tensor,
    scalar_shape: &[usize],
    f: F,
) -> Result<Tensor, AlgebraError>
where
    F: Fn(f64) -> f64,
{
    let shape = broadcast_shapes(tensor.shape(), scalar_shape)?;
    broadcast_to(&tensor.mapv(f), &shape)
}
