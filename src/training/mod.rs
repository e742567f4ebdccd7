mod config;
mod report;
mod trainer;

pub use config::{Hyperparameters, TrainConfig};
pub use report::{EpochReport, TrainingReport};
pub use trainer::Trainer;
