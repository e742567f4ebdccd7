use crate::arch::{Gradients, Weights};

pub trait Optimizer {
    /// Applies one update to `weights` given the gradients of the last batch.
    fn step(&self, weights: &mut Weights, grads: &Gradients);
}
