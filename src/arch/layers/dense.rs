use ndarray::{Array2, ArrayView2, linalg, s};

use crate::{arch::activations::Sigmoid, preprocessing::add_bias};

/// A fully connected sigmoid layer over a borrowed weight matrix.
///
/// The matrix has shape `(dim_in + 1, dim_out)`, its first row holds the biases and the
/// remaining `dim_in` rows the feature weights. Inputs are bias-augmented on the fly, so
/// the layer never stores them.
#[derive(Clone, Copy)]
pub struct Dense<'w> {
    weights: ArrayView2<'w, f64>,
    act_fn: Sigmoid,
}

impl<'w> Dense<'w> {
    pub fn new(weights: ArrayView2<'w, f64>) -> Self {
        Self {
            weights,
            act_fn: Sigmoid,
        }
    }

    /// Returns the `(dim_in, dim_out)` of this layer, not counting the bias.
    pub fn dim(&self) -> (usize, usize) {
        let (rows, cols) = self.weights.dim();
        (rows - 1, cols)
    }

    /// Computes `sigmoid([1 | x] · W)`.
    ///
    /// # Arguments
    /// * `x` - The layer's input, one sample per row and `dim_in` columns.
    ///
    /// # Returns
    /// The layer's activations, one row per sample and `dim_out` columns.
    pub fn forward(&self, x: ArrayView2<f64>) -> Array2<f64> {
        let x = add_bias(x);
        let mut a = Array2::zeros((x.nrows(), self.weights.ncols()));

        linalg::general_mat_mul(1.0, &x, &self.weights, 0.0, &mut a);
        self.act_fn.activate(&mut a);
        a
    }

    /// Turns the error arriving at this layer's output into its delta, `err ⊙ a ⊙ (1 - a)`.
    ///
    /// # Arguments
    /// * `err` - The error at the layer's output.
    /// * `a` - The activations this layer produced on the forward pass.
    pub fn delta(&self, err: Array2<f64>, a: ArrayView2<f64>) -> Array2<f64> {
        self.act_fn.backprop(err, a)
    }

    /// Averages the weight gradient over the batch, `[1 | x]ᵗ · delta / n`.
    ///
    /// # Arguments
    /// * `x` - The input this layer received on the forward pass.
    /// * `delta` - This layer's delta.
    ///
    /// # Returns
    /// A matrix shaped like the layer's weights, bias row included.
    pub fn gradient(&self, x: ArrayView2<f64>, delta: ArrayView2<f64>) -> Array2<f64> {
        let x = add_bias(x);
        let n = x.nrows() as f64;
        let mut grad = Array2::zeros(self.weights.raw_dim());

        linalg::general_mat_mul(1.0 / n, &x.t(), &delta, 0.0, &mut grad);
        grad
    }

    /// Sends the delta back through the feature weights, `delta · W[1:, :]ᵗ`.
    ///
    /// The bias row takes no part: the bias input is a constant with nothing behind it.
    pub fn propagate(&self, delta: ArrayView2<f64>) -> Array2<f64> {
        let w = self.weights.slice(s![1.., ..]);
        let mut err = Array2::zeros((delta.nrows(), w.nrows()));

        linalg::general_mat_mul(1.0, &delta, &w.t(), 0.0, &mut err);
        err
    }
}
