use log::trace;
use ndarray::{Array2, ArrayView2};

use super::{
    forward::ActivationCache,
    layers::Dense,
    loss::{HalfMse, LossFn},
    weights::Weights,
};
use crate::{NetErr, Result, optimization::Optimizer};

/// The gradient of the cost with respect to every weight matrix, bias row included.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    layers: Vec<Array2<f64>>,
}

impl Gradients {
    /// Creates all zero gradients shaped like `weights`.
    pub fn zeros_like(weights: &[Array2<f64>]) -> Self {
        Self {
            layers: weights.iter().map(|w| Array2::zeros(w.raw_dim())).collect(),
        }
    }

    pub(crate) fn from_layers(layers: Vec<Array2<f64>>) -> Self {
        Self { layers }
    }

    /// Returns the gradient of the `l`-th weight matrix.
    pub fn layer(&self, l: usize) -> ArrayView2<'_, f64> {
        self.layers[l].view()
    }

    pub fn layers(&self) -> &[Array2<f64>] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Computes the gradients for a batch from the activations of its forward pass.
///
/// Walks the layers from last to first. Each layer turns the error at its output into a
/// delta, derives its weight gradient from the delta and the (bias-augmented) input it saw,
/// and hands `delta · W[1:, :]ᵗ` to the layer before it. Weights are only read here, so
/// every layer propagates through the same weights the forward pass used.
///
/// # Arguments
/// * `weights` - The weights the forward pass ran with.
/// * `x` - The canonical input batch.
/// * `y` - The targets for `x`.
/// * `cache` - The activations of the forward pass over `x`.
///
/// # Errors
/// * `NetErr::BatchSizeMismatch` if `x` and `y` have different sample counts.
/// * `NetErr::EmptyDataset` if the batch is empty.
/// * `NetErr::LabelDimension` if `y` does not match the output layer.
/// * `NetErr::CacheLengthMismatch` if `cache` does not hold one entry per layer.
/// * `NetErr::InputDimension` if `x` does not match the input layer.
/// * `NetErr::CacheShapeMismatch` if `cache` was computed on another batch or network.
pub fn backward(
    weights: &[Array2<f64>],
    x: ArrayView2<f64>,
    y: ArrayView2<f64>,
    cache: &ActivationCache,
) -> Result<Gradients> {
    if x.nrows() != y.nrows() {
        return Err(NetErr::BatchSizeMismatch {
            x: x.nrows(),
            y: y.nrows(),
        });
    }

    if x.nrows() == 0 {
        return Err(NetErr::EmptyDataset);
    }

    if cache.len() != weights.len() || cache.is_empty() {
        return Err(NetErr::CacheLengthMismatch {
            got: cache.len(),
            expected: weights.len(),
        });
    }

    let expected = weights[0].nrows().saturating_sub(1);
    if x.ncols() != expected {
        return Err(NetErr::InputDimension {
            got: x.ncols(),
            expected,
        });
    }

    for (l, w) in weights.iter().enumerate() {
        let got = cache.layer(l).dim();
        let expected = (x.nrows(), w.ncols());
        if got != expected {
            return Err(NetErr::CacheShapeMismatch {
                layer: l,
                got,
                expected,
            });
        }
    }

    let output = cache.output();
    if y.ncols() != output.ncols() {
        return Err(NetErr::LabelDimension {
            got: y.ncols(),
            expected: output.ncols(),
        });
    }

    let mut layers = vec![Array2::zeros((0, 0)); weights.len()];
    let mut err = HalfMse.loss_prime(output, y);

    for l in (0..weights.len()).rev() {
        let layer = Dense::new(weights[l].view());
        let input = match l {
            0 => x,
            _ => cache.layer(l - 1),
        };

        let delta = layer.delta(err, cache.layer(l));
        layers[l] = layer.gradient(input, delta.view());
        trace!(layer = l, rows = delta.nrows(); "backward layer done");

        if l == 0 {
            break;
        }

        err = layer.propagate(delta.view());
    }

    Ok(Gradients { layers })
}

/// Runs [`backward`] and applies the resulting gradients with `optimizer`.
///
/// Nothing is written unless the gradients could be computed.
pub fn backprop<O: Optimizer>(
    weights: &mut Weights,
    x: ArrayView2<f64>,
    y: ArrayView2<f64>,
    cache: &ActivationCache,
    optimizer: &O,
) -> Result<Gradients> {
    let grads = backward(weights.matrices(), x, y, cache)?;
    optimizer.step(weights, &grads);
    Ok(grads)
}
