use std::{env, fs, num::NonZeroUsize};

use backprop_net::{
    Hyperparameters, Network, TrainConfig,
    dataset::{DataProvider, InlineDataset},
};
use log::info;

const XOR: [f64; 12] = [
    0.0, 0.0, 0.0, //
    0.0, 1.0, 1.0, //
    1.0, 0.0, 1.0, //
    1.0, 1.0, 0.0, //
];

fn default_config() -> anyhow::Result<TrainConfig> {
    let epochs = NonZeroUsize::new(20_000).ok_or_else(|| anyhow::anyhow!("zero epochs"))?;
    let mut config = TrainConfig::new(epochs);
    config.minibatch_size = NonZeroUsize::new(4).ok_or_else(|| anyhow::anyhow!("zero batch"))?;
    config.hyperparameters = Hyperparameters {
        learning_rate: 0.5,
        ..Default::default()
    };
    config.seed = Some(1);
    Ok(config)
}

/// Trains a 2-2-1 network on XOR.
///
/// A JSON `TrainConfig` can be given through the `CONFIG` environment variable, logging is
/// controlled with `RUST_LOG`.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match env::var("CONFIG") {
        Ok(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        Err(_) => default_config()?,
    };
    info!("training with {config:?}");

    let data = InlineDataset::new(XOR.into(), 2, 1)?.load()?;
    let mut net = Network::with_seed(&[2, 2, 1], config.seed.unwrap_or_default())?;
    let report = data.train(&mut net, &config)?;

    println!(
        "accuracy: {:.3}, cost: {:.6}, learning rate: {}",
        report.train_accuracy, report.train_cost, report.learning_rate
    );

    let y_pred = net.predict(&data.train_x)?;
    for (x, y) in data.train_x.outer_iter().zip(y_pred.outer_iter()) {
        println!("{x} -> {y:.3}");
    }

    Ok(())
}
