use ndarray::{Array2, ArrayView2};

pub trait LossFn {
    /// The cost of the predictions `y_pred` against the targets `y`, averaged over samples.
    fn loss(&self, y_pred: ArrayView2<f64>, y: ArrayView2<f64>) -> f64;

    /// The error signal fed into the output layer on the backward pass.
    fn loss_prime(&self, y_pred: ArrayView2<f64>, y: ArrayView2<f64>) -> Array2<f64>;
}
