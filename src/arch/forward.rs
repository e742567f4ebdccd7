use log::trace;
use ndarray::{Array2, ArrayView2};

use super::layers::Dense;
use crate::{NetErr, Result};

/// The activations of every layer produced by one forward pass.
///
/// Only valid for the batch it was computed on, and only until the weights change.
#[derive(Debug, Clone)]
pub struct ActivationCache {
    outputs: Vec<Array2<f64>>,
}

impl ActivationCache {
    /// Returns the activations of the `l`-th layer transition.
    ///
    /// # Panics
    /// If `l` is not below [`ActivationCache::len`].
    pub fn layer(&self, l: usize) -> ArrayView2<'_, f64> {
        self.outputs[l].view()
    }

    /// Returns the output of the network.
    pub fn output(&self) -> ArrayView2<'_, f64> {
        // `forward` never builds a cache for a network without layers
        self.outputs[self.outputs.len() - 1].view()
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn into_output(mut self) -> Option<Array2<f64>> {
        self.outputs.pop()
    }
}

/// Makes a forward pass through the network, keeping every layer's output.
///
/// # Arguments
/// * `weights` - The weight matrices in layer order.
/// * `x` - The canonical input batch.
///
/// # Returns
/// The cache of activations, whose last entry is the network's output.
///
/// # Errors
/// `NetErr::InputDimension` if `x` does not have as many columns as the input layer is wide.
pub fn forward(weights: &[Array2<f64>], x: ArrayView2<f64>) -> Result<ActivationCache> {
    check_input(weights, x)?;

    let mut outputs: Vec<Array2<f64>> = Vec::with_capacity(weights.len());
    for (l, w) in weights.iter().enumerate() {
        let input = match outputs.last() {
            Some(prev) => prev.view(),
            None => x,
        };

        let a = Dense::new(w.view()).forward(input);
        trace!(layer = l, rows = a.nrows(), cols = a.ncols(); "forward layer done");
        outputs.push(a);
    }

    Ok(ActivationCache { outputs })
}

/// Makes a forward pass without caching, returning only the network's output.
///
/// # Errors
/// `NetErr::InputDimension` if `x` does not have as many columns as the input layer is wide.
pub fn propagate(weights: &[Array2<f64>], x: ArrayView2<f64>) -> Result<Array2<f64>> {
    check_input(weights, x)?;

    let mut a = x.to_owned();
    for w in weights {
        a = Dense::new(w.view()).forward(a.view());
    }

    Ok(a)
}

fn check_input(weights: &[Array2<f64>], x: ArrayView2<f64>) -> Result<()> {
    let expected = weights
        .first()
        .map(|w| w.nrows() - 1)
        .ok_or_else(|| NetErr::Configuration("the network has no layers".to_string()))?;

    if x.ncols() != expected {
        return Err(NetErr::InputDimension {
            got: x.ncols(),
            expected,
        });
    }

    Ok(())
}
