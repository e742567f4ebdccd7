use serde::Serialize;

use crate::optimization::Adjustment;

/// Metrics measured at the end of one epoch, before any rollback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpochReport {
    pub epoch: usize,
    pub train_accuracy: f64,
    pub train_cost: f64,
    pub test_accuracy: Option<f64>,
    pub test_cost: Option<f64>,
    /// The learning rate the next epoch runs with.
    pub learning_rate: f64,
    /// What the adaptive controller did, `None` when it is disabled.
    pub adjustment: Option<Adjustment>,
}

/// The outcome of a training run.
///
/// The top level metrics are measured on the weights the network ends up with, which after a
/// final rollback are not the ones the last epoch report was measured on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub train_accuracy: f64,
    pub train_cost: f64,
    pub test_accuracy: Option<f64>,
    pub test_cost: Option<f64>,
    pub learning_rate: f64,
    pub epochs: Vec<EpochReport>,
}
