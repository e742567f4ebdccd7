use ndarray::{Axis, Zip};

use super::Optimizer;
use crate::arch::{Gradients, Weights};

/// Gradient descent with L2 weight decay on the feature weights.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    learning_rate: f64,
    reg_lambda: f64,
}

impl GradientDescent {
    /// Returns a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps taken on `step`.
    /// * `reg_lambda` - The weight decay applied to every non-bias weight.
    pub fn new(learning_rate: f64, reg_lambda: f64) -> Self {
        Self {
            learning_rate,
            reg_lambda,
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    pub fn reg_lambda(&self) -> f64 {
        self.reg_lambda
    }
}

impl Optimizer for GradientDescent {
    /// Makes a step in the opposite direction of the regularized gradient,
    /// `W := W - learning_rate * (grad + reg_lambda * W)`, where the decay term is zero on the
    /// bias row.
    ///
    /// # Arguments
    /// * `weights` - The weights that are going to be modified.
    /// * `grads` - The gradient used for taking the step, one matrix per weight matrix.
    fn step(&self, weights: &mut Weights, grads: &Gradients) {
        let Self {
            learning_rate: lr,
            reg_lambda: lambda,
        } = *self;

        weights.update(|matrices| {
            for (w, g) in matrices.iter_mut().zip(grads.layers()) {
                // bias row: plain gradient step
                Zip::from(w.row_mut(0))
                    .and(g.row(0))
                    .for_each(|w, &g| *w -= lr * g);

                let (_, features) = w.view_mut().split_at(Axis(0), 1);
                let (_, g_features) = g.view().split_at(Axis(0), 1);
                Zip::from(features)
                    .and(g_features)
                    .for_each(|w, &g| *w -= lr * (g + lambda * *w));
            }
        });
    }
}
