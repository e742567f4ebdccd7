use log::{debug, info};
use ndarray::{Array2, ArrayViewD, Axis};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use super::{EpochReport, TrainConfig, TrainingReport};
use crate::{
    NetErr, Network, Result,
    arch::{backward, forward},
    evaluation::{self, Evaluation},
    optimization::{AdaptiveLearningRate, GradientDescent},
};

/// Runs mini-batch gradient descent over a [`Network`].
pub struct Trainer<R: Rng = StdRng> {
    config: TrainConfig,
    rng: R,
}

impl Trainer<StdRng> {
    /// Creates a new `Trainer` whose shuffling is seeded from `config.seed`, or from the OS
    /// entropy source when there's no seed.
    pub fn from_config(config: TrainConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self::new(config, rng)
    }
}

impl<R: Rng> Trainer<R> {
    /// Creates a new `Trainer`.
    ///
    /// # Arguments
    /// * `config` - The description of the training run.
    /// * `rng` - The random number generator used to shuffle the samples every epoch.
    pub fn new(config: TrainConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Trains `network` on `x` and `y` for the configured number of epochs.
    ///
    /// Every input is validated before the network is touched: on error the weights, the
    /// mean vector and the hyperparameters are exactly what they were before the call. The
    /// hyperparameters of the config are stored on the network, and the learning rate the run
    /// ends with is written back to them.
    ///
    /// # Arguments
    /// * `network` - The network to train.
    /// * `x` - The training inputs, read as in [`crate::preprocessing::canonicalize`].
    /// * `y` - The training targets.
    /// * `test_x` - The test inputs, if any.
    /// * `test_y` - The test targets, given if and only if `test_x` is.
    ///
    /// # Returns
    /// The per-epoch history and the metrics of the final weights.
    ///
    /// # Errors
    /// * `NetErr::Configuration` for out of range hyperparameters.
    /// * `NetErr::Shape`, `NetErr::InputDimension` or `NetErr::LabelDimension` for arrays that
    ///   don't fit the network.
    /// * `NetErr::BatchSizeMismatch` or `NetErr::EmptyDataset` for a bad training set.
    /// * `NetErr::IncompleteTestData` or `NetErr::TestDataLengthMismatch` for a bad test set.
    pub fn train(
        &mut self,
        network: &mut Network,
        x: ArrayViewD<'_, f64>,
        y: ArrayViewD<'_, f64>,
        test_x: Option<ArrayViewD<'_, f64>>,
        test_y: Option<ArrayViewD<'_, f64>>,
    ) -> Result<TrainingReport> {
        self.config.validate()?;
        let hp = self.config.hyperparameters;

        let mut x = network.prepare_features_with(x, hp.normalize_inputs)?;
        let y = network.prepare_labels(y)?;

        if x.nrows() != y.nrows() {
            return Err(NetErr::BatchSizeMismatch {
                x: x.nrows(),
                y: y.nrows(),
            });
        }

        if x.nrows() == 0 {
            return Err(NetErr::EmptyDataset);
        }

        let mut test = match (test_x, test_y) {
            (None, None) => None,
            (Some(_), None) => return Err(NetErr::IncompleteTestData { missing: "labels" }),
            (None, Some(_)) => return Err(NetErr::IncompleteTestData { missing: "inputs" }),
            (Some(test_x), Some(test_y)) => {
                let test_x = network.prepare_features_with(test_x, hp.normalize_inputs)?;
                let test_y = network.prepare_labels(test_y)?;

                if test_x.nrows() != test_y.nrows() {
                    return Err(NetErr::TestDataLengthMismatch {
                        x: test_x.nrows(),
                        y: test_y.nrows(),
                    });
                }

                Some((test_x, test_y))
            }
        };

        // from here on nothing can fail because of the caller's input
        network.set_hyperparameters(hp)?;
        if hp.mean_centering {
            network.init_mean(&x)?;
            network.center(&mut x);
            if let Some((test_x, _)) = test.as_mut() {
                network.center(test_x);
            }
        }

        let n = x.nrows();
        let batch_size = self.batch_size(n);

        let mut optimizer = GradientDescent::new(hp.learning_rate, hp.reg_lambda);
        let initial = evaluate(network, &x, &y)?;
        debug!(accuracy = initial.accuracy, cost = initial.cost; "evaluated untrained network");

        let mut controller = hp
            .adapt_learning_rate
            .then(|| AdaptiveLearningRate::new(hp.learning_rate, initial.cost));

        let epochs = self.config.epochs.get();
        let mut history = Vec::with_capacity(epochs);
        let mut indices: Vec<usize> = (0..n).collect();

        for epoch in 0..epochs {
            let snapshot = controller.as_ref().map(|_| network.snapshot());

            indices.shuffle(&mut self.rng);
            for (i, batch) in indices.chunks(batch_size).enumerate() {
                let x_batch = x.select(Axis(0), batch);
                let y_batch = y.select(Axis(0), batch);

                let cache = forward::forward(network.weights(), x_batch.view())?;
                backward::backprop(
                    network.weights_mut(),
                    x_batch.view(),
                    y_batch.view(),
                    &cache,
                    &optimizer,
                )?;

                debug!(epoch = epoch, batch = i, samples = batch.len(); "mini-batch done");
            }

            let train = evaluate(network, &x, &y)?;
            let test_eval = match &test {
                Some((test_x, test_y)) => Some(evaluate(network, test_x, test_y)?),
                None => None,
            };

            let adjustment = match (controller.as_mut(), snapshot) {
                (Some(controller), Some(snapshot)) => {
                    let adj = controller.adapt(train.cost, network.weights_mut(), snapshot);
                    optimizer.set_learning_rate(controller.learning_rate());
                    Some(adj)
                }
                _ => None,
            };

            info!(
                epoch = epoch,
                accuracy = train.accuracy,
                correct = train.correct,
                total = train.total,
                cost = train.cost,
                learning_rate = optimizer.learning_rate();
                "epoch done"
            );

            history.push(EpochReport {
                epoch,
                train_accuracy: train.accuracy,
                train_cost: train.cost,
                test_accuracy: test_eval.map(|e| e.accuracy),
                test_cost: test_eval.map(|e| e.cost),
                learning_rate: optimizer.learning_rate(),
                adjustment,
            });
        }

        let learning_rate = optimizer.learning_rate();
        network.set_learning_rate(learning_rate);

        let train = evaluate(network, &x, &y)?;
        let test_eval = match &test {
            Some((test_x, test_y)) => Some(evaluate(network, test_x, test_y)?),
            None => None,
        };

        Ok(TrainingReport {
            train_accuracy: train.accuracy,
            train_cost: train.cost,
            test_accuracy: test_eval.map(|e| e.accuracy),
            test_cost: test_eval.map(|e| e.cost),
            learning_rate,
            epochs: history,
        })
    }

    /// Returns the configured mini-batch size, or `n / 10 + 1` if it exceeds the `n` samples.
    fn batch_size(&self, n: usize) -> usize {
        let size = self.config.minibatch_size.get();
        if size <= n {
            return size;
        }

        let clamped = n / 10 + 1;
        debug!(requested = size, samples = n, clamped = clamped; "mini-batch size clamped");
        clamped
    }
}

fn evaluate(network: &Network, x: &Array2<f64>, y: &Array2<f64>) -> Result<Evaluation> {
    let y_pred = forward::propagate(network.weights(), x.view())?;
    Ok(evaluation::evaluate(y_pred.view(), y.view()))
}
