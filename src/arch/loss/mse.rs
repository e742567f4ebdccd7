use ndarray::{Array2, ArrayView2};

use super::LossFn;

/// Half the summed squared error, averaged over the samples: `0.5 * Σ(ŷ - y)² / n`.
///
/// The one half cancels the square's derivative, so the error signal is the plain
/// difference `ŷ - y`. Averaging over samples happens when the gradient is formed.
#[derive(Default, Clone, Copy, Debug)]
pub struct HalfMse;

impl LossFn for HalfMse {
    fn loss(&self, y_pred: ArrayView2<f64>, y: ArrayView2<f64>) -> f64 {
        let n = y.nrows();
        if n == 0 {
            return 0.;
        }

        0.5 * (&y_pred - &y).mapv(|d| d * d).sum() / n as f64
    }

    fn loss_prime(&self, y_pred: ArrayView2<f64>, y: ArrayView2<f64>) -> Array2<f64> {
        &y_pred - &y
    }
}
