pub mod arch;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod optimization;
pub mod preprocessing;
pub mod training;

pub use arch::Network;
pub use error::{NetErr, Result};
pub use training::{EpochReport, Hyperparameters, TrainConfig, Trainer, TrainingReport};
