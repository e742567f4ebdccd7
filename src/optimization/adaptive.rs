use log::{info, warn};
use serde::Serialize;

use crate::arch::{WeightSnapshot, Weights};

const DECAY: f64 = 0.5;
const GROWTH: f64 = 1.05;

/// What the controller did at the end of an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    /// The cost went up: the learning rate was halved and the epoch's updates discarded.
    RolledBack,
    /// The cost did not go up: the learning rate was raised by 5%.
    Increased,
}

/// Epoch-level learning rate heuristic.
///
/// When an epoch ends with a higher cost than the one before, the learning rate is halved
/// and the weights go back to what they were when the epoch started. Otherwise the learning
/// rate grows by 5%. This is best-effort hysteresis, it does not guarantee convergence.
#[derive(Debug, Clone)]
pub struct AdaptiveLearningRate {
    learning_rate: f64,
    previous_cost: f64,
}

impl AdaptiveLearningRate {
    /// Creates a new controller.
    ///
    /// # Arguments
    /// * `learning_rate` - The starting learning rate.
    /// * `initial_cost` - The cost the first epoch is compared against.
    pub fn new(learning_rate: f64, initial_cost: f64) -> Self {
        Self {
            learning_rate,
            previous_cost: initial_cost,
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn previous_cost(&self) -> f64 {
        self.previous_cost
    }

    /// Reacts to the cost of the epoch that just finished.
    ///
    /// On a regression the weights are restored from `snapshot`, which must have been taken
    /// right before the epoch began. Either way `cost` is what the next epoch is compared
    /// against.
    ///
    /// # Arguments
    /// * `cost` - The cost over the training set after the epoch.
    /// * `weights` - The weights the epoch produced.
    /// * `snapshot` - The weights from before the epoch.
    pub fn adapt(
        &mut self,
        cost: f64,
        weights: &mut Weights,
        snapshot: WeightSnapshot,
    ) -> Adjustment {
        let previous_cost = self.previous_cost;
        self.previous_cost = cost;

        if cost > previous_cost {
            self.learning_rate *= DECAY;
            weights.restore(snapshot);

            warn!(
                cost = cost,
                previous_cost = previous_cost,
                learning_rate = self.learning_rate;
                "cost increased, learning rate halved and weights reverted"
            );
            return Adjustment::RolledBack;
        }

        self.learning_rate *= GROWTH;

        info!(learning_rate = self.learning_rate; "learning rate increased by 5%");
        Adjustment::Increased
    }
}
