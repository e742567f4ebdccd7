use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::{NetErr, Result};

const DEFAULT_LEARNING_RATE: f64 = 0.05;
const DEFAULT_MINIBATCH_SIZE: NonZeroUsize = NonZeroUsize::new(100).unwrap();

/// The knobs of the learning procedure that are kept on the model between runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
    pub learning_rate: f64,
    /// L2 weight decay, never applied to the bias row.
    pub reg_lambda: f64,
    pub adapt_learning_rate: bool,
    /// Divide inputs by 255 when their maximum exceeds 1.
    pub normalize_inputs: bool,
    /// Subtract the training set's per-feature mean from every input.
    pub mean_centering: bool,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            reg_lambda: 0.,
            adapt_learning_rate: false,
            normalize_inputs: false,
            mean_centering: false,
        }
    }
}

impl Hyperparameters {
    /// Checks every value is in range.
    ///
    /// # Errors
    /// `NetErr::Configuration` if the learning rate is not a positive finite number or the
    /// regularization factor is negative or not finite.
    pub fn validate(&self) -> Result<()> {
        let Self {
            learning_rate,
            reg_lambda,
            ..
        } = *self;

        if !learning_rate.is_finite() || learning_rate <= 0. {
            return Err(NetErr::Configuration(format!(
                "learning rate must be positive and finite, got {learning_rate}"
            )));
        }

        if !reg_lambda.is_finite() || reg_lambda < 0. {
            return Err(NetErr::Configuration(format!(
                "regularization factor must be non negative and finite, got {reg_lambda}"
            )));
        }

        Ok(())
    }
}

/// Describes a training run.
///
/// Can be read from JSON, where every hyperparameter sits at the top level next to `epochs`:
///
/// ```json
/// { "epochs": 500, "minibatch_size": 4, "learning_rate": 0.5, "seed": 7 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub epochs: NonZeroUsize,
    #[serde(default = "default_minibatch_size")]
    pub minibatch_size: NonZeroUsize,
    #[serde(flatten)]
    pub hyperparameters: Hyperparameters,
    /// Seeds the shuffling, the OS entropy source is used when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_minibatch_size() -> NonZeroUsize {
    DEFAULT_MINIBATCH_SIZE
}

impl TrainConfig {
    /// Creates a new `TrainConfig` with default hyperparameters and mini-batches of 100.
    pub fn new(epochs: NonZeroUsize) -> Self {
        Self {
            epochs,
            minibatch_size: DEFAULT_MINIBATCH_SIZE,
            hyperparameters: Hyperparameters::default(),
            seed: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.hyperparameters.validate()
    }
}
