//! Bringing raw arrays into the shape the network works with.
//!
//! Every array entering the network goes through [`canonicalize`] first, which turns a
//! scalar, a vector or a matrix into a sample-major matrix (one row per sample). Feature
//! scaling, mean-centering and bias augmentation all operate on that matrix.

use log::debug;
use ndarray::{Array1, Array2, ArrayView2, ArrayViewD, Axis, Ix1, Ix2, s};

use crate::{NetErr, Result};

/// Largest value of an 8-bit encoded feature.
const BYTE_MAX: f64 = 255.0;

/// How a raw array was laid out before canonicalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// A single number, treated as a one element vector.
    Scalar,
    /// A vector read as `n` samples of a single feature (`n × 1`).
    Column,
    /// A vector read as one sample with `n` features (`1 × n`).
    Row,
    /// Already sample-major.
    Matrix,
}

/// A sample-major matrix together with the layout it was inferred from.
#[derive(Debug, Clone, PartialEq)]
pub struct Canonical {
    data: Array2<f64>,
    layout: Layout,
}

impl Canonical {
    /// Returns the canonical matrix.
    pub fn data(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Returns the layout the raw array was read with.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Consumes the wrapper, returning the matrix.
    pub fn into_data(self) -> Array2<f64> {
        self.data
    }
}

/// Converts a scalar, 1-D or 2-D array into a sample-major matrix.
///
/// A vector is ambiguous: it can be `n` single-feature samples or a single sample with `n`
/// features. It's resolved by looking at the width of the layer the array is meant for,
/// the input layer for features and the output layer for labels. When that width is 1 the
/// vector becomes an `n × 1` column, otherwise a `1 × n` row. Scalars follow the same rule
/// as a one element vector.
///
/// # Arguments
/// * `x` - The raw array.
/// * `width` - The width of the layer `x` is meant for.
///
/// # Returns
/// The canonical matrix, or `NetErr::Shape` if `x` has more than two dimensions.
pub fn canonicalize(x: ArrayViewD<'_, f64>, width: usize) -> Result<Canonical> {
    let (data, layout) = match x.ndim() {
        0 => {
            let value = x.first().copied().unwrap_or_default();
            (Array2::from_elem((1, 1), value), Layout::Scalar)
        }
        1 => {
            let v = x
                .into_dimensionality::<Ix1>()
                .map_err(|_| NetErr::Shape { rank: 1 })?;

            if width == 1 {
                (v.insert_axis(Axis(1)).to_owned(), Layout::Column)
            } else {
                (v.insert_axis(Axis(0)).to_owned(), Layout::Row)
            }
        }
        2 => {
            let m = x
                .into_dimensionality::<Ix2>()
                .map_err(|_| NetErr::Shape { rank: 2 })?;
            (m.to_owned(), Layout::Matrix)
        }
        rank => return Err(NetErr::Shape { rank }),
    };

    Ok(Canonical { data, layout })
}

/// Scales 8-bit encoded features into `[0, 1]`.
///
/// The data is only divided by 255 when its maximum exceeds 1, so inputs that are already
/// scaled are left untouched.
///
/// # Returns
/// Whether the data was rescaled.
pub fn normalize(x: &mut Array2<f64>) -> bool {
    let max = x.fold(f64::NEG_INFINITY, |max, &v| max.max(v));
    if max <= 1.0 {
        return false;
    }

    debug!(max = max; "rescaling 8-bit encoded inputs");
    x.mapv_inplace(|v| v / BYTE_MAX);
    true
}

/// Computes the per-feature mean over all samples.
///
/// # Returns
/// A vector with one entry per column, or `NetErr::EmptyDataset` if there are no rows.
pub fn mean_vector(x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
    x.mean_axis(Axis(0)).ok_or(NetErr::EmptyDataset)
}

/// Subtracts `mean` from every sample of `x`.
pub fn center(x: &mut Array2<f64>, mean: &Array1<f64>) {
    *x -= mean;
}

/// Prepends a column of ones to `x`, so a layer's bias is learned as an ordinary weight.
pub fn add_bias(x: ArrayView2<'_, f64>) -> Array2<f64> {
    let mut augmented = Array2::ones((x.nrows(), x.ncols() + 1));
    augmented.slice_mut(s![.., 1..]).assign(&x);
    augmented
}
