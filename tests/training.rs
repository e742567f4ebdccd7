use std::num::NonZeroUsize;

use backprop_net::{
    Hyperparameters, NetErr, Network, TrainConfig, Trainer, TrainingReport,
    dataset::{DataProvider, InlineDataset, one_hot},
};
use ndarray::{Array2, ArrayViewD, array};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config(epochs: usize, minibatch_size: usize) -> TrainConfig {
    TrainConfig {
        epochs: NonZeroUsize::new(epochs).unwrap(),
        minibatch_size: NonZeroUsize::new(minibatch_size).unwrap(),
        hyperparameters: Hyperparameters {
            learning_rate: 0.5,
            ..Default::default()
        },
        seed: Some(0),
    }
}

fn train(
    net: &mut Network,
    config: TrainConfig,
    x: ArrayViewD<'_, f64>,
    y: ArrayViewD<'_, f64>,
    test: Option<(ArrayViewD<'_, f64>, ArrayViewD<'_, f64>)>,
) -> Result<TrainingReport, NetErr> {
    let (test_x, test_y) = test.unzip();
    Trainer::from_config(config).train(net, x, y, test_x, test_y)
}

#[test]
fn wrong_input_width_leaves_the_network_untouched() {
    init_logger();

    let mut net = Network::with_seed(&[3, 4, 2], 1).unwrap();
    let weights = net.weights().to_vec();
    let x = array![[0.1, 0.2], [0.3, 0.4]];
    let y = array![[1., 0.], [0., 1.]];

    let mut config = config(5, 2);
    config.hyperparameters.mean_centering = true;
    let err = train(&mut net, config, x.view().into_dyn(), y.view().into_dyn(), None).unwrap_err();

    assert_eq!(
        err,
        NetErr::InputDimension {
            got: 2,
            expected: 3
        }
    );
    assert_eq!(net.weights(), weights.as_slice());
    assert_eq!(net.version(), 0);
    assert!(net.mean().is_none());
    assert_eq!(net.hyperparameters(), &Hyperparameters::default());
}

#[test]
fn half_a_test_set_is_rejected() {
    init_logger();

    let mut net = Network::with_seed(&[2, 1], 0).unwrap();
    let x = array![[0., 1.], [1., 0.]];
    let y = array![[1.], [0.]];

    let err = Trainer::from_config(config(1, 2))
        .train(
            &mut net,
            x.view().into_dyn(),
            y.view().into_dyn(),
            Some(x.view().into_dyn()),
            None,
        )
        .unwrap_err();
    assert_eq!(err, NetErr::IncompleteTestData { missing: "labels" });

    let err = Trainer::from_config(config(1, 2))
        .train(
            &mut net,
            x.view().into_dyn(),
            y.view().into_dyn(),
            None,
            Some(y.view().into_dyn()),
        )
        .unwrap_err();
    assert_eq!(err, NetErr::IncompleteTestData { missing: "inputs" });
    assert_eq!(net.version(), 0);
}

#[test]
fn test_set_lengths_must_agree() {
    let mut net = Network::with_seed(&[2, 1], 0).unwrap();
    let x = array![[0., 1.], [1., 0.]];
    let y = array![[1.], [0.]];
    let test_y = array![[1.]];

    let err = train(
        &mut net,
        config(1, 2),
        x.view().into_dyn(),
        y.view().into_dyn(),
        Some((x.view().into_dyn(), test_y.view().into_dyn())),
    )
    .unwrap_err();

    assert_eq!(err, NetErr::TestDataLengthMismatch { x: 2, y: 1 });
}

#[test]
fn training_set_lengths_must_agree() {
    let mut net = Network::with_seed(&[2, 1], 0).unwrap();
    let x = array![[0., 1.], [1., 0.], [1., 1.]];
    let y = array![[1.], [0.]];

    let err = train(&mut net, config(1, 2), x.view().into_dyn(), y.view().into_dyn(), None)
        .unwrap_err();
    assert_eq!(err, NetErr::BatchSizeMismatch { x: 3, y: 2 });
}

#[test]
fn empty_training_set_is_rejected() {
    let mut net = Network::with_seed(&[2, 1], 0).unwrap();
    let x = Array2::<f64>::zeros((0, 2));
    let y = Array2::<f64>::zeros((0, 1));

    let err = train(&mut net, config(1, 2), x.view().into_dyn(), y.view().into_dyn(), None)
        .unwrap_err();
    assert_eq!(err, NetErr::EmptyDataset);
}

#[test]
fn invalid_learning_rate_is_rejected() {
    let mut net = Network::with_seed(&[2, 1], 0).unwrap();
    let x = array![[0., 1.]];
    let y = array![[1.]];

    let mut config = config(1, 1);
    config.hyperparameters.learning_rate = 0.;
    let err = train(&mut net, config, x.view().into_dyn(), y.view().into_dyn(), None)
        .unwrap_err();
    assert!(matches!(err, NetErr::Configuration(_)));
}

#[test]
fn oversized_minibatches_are_clamped() {
    init_logger();

    // 25 samples with batches of 100 become batches of 3, so 9 updates per epoch
    let mut net = Network::with_seed(&[1, 2, 1], 3).unwrap();
    let x = Array2::from_shape_fn((25, 1), |(i, _)| i as f64 / 25.);
    let y = x.mapv(|v| if v > 0.5 { 1. } else { 0. });

    train(&mut net, config(2, 100), x.view().into_dyn(), y.view().into_dyn(), None).unwrap();
    assert_eq!(net.version(), 18);
}

#[test]
fn vectors_are_accepted_for_single_unit_layers() {
    let mut net = Network::with_seed(&[1, 3, 1], 5).unwrap();
    let x = array![0.1, 0.4, 0.6, 0.9];
    let y = array![0., 0., 1., 1.];

    let report = train(&mut net, config(3, 2), x.view().into_dyn(), y.view().into_dyn(), None)
        .unwrap();
    assert_eq!(report.epochs.len(), 3);
    assert_eq!(net.predict(&x).unwrap().dim(), (4, 1));
}

#[test]
fn byte_inputs_are_normalized_at_train_and_predict_time() {
    let mut net = Network::with_seed(&[2, 3, 2], 2).unwrap();
    let x = array![[0., 255.], [255., 0.], [51., 102.]];
    let y = one_hot(&[1, 0, 1], 2).unwrap();

    let mut config = config(2, 3);
    config.hyperparameters.normalize_inputs = true;
    train(&mut net, config, x.view().into_dyn(), y.view().into_dyn(), None).unwrap();

    let raw = net.predict(&x).unwrap();
    let scaled = net.predict(&x.mapv(|v| v / 255.)).unwrap();
    assert_eq!(raw, scaled);
}

#[test]
fn config_is_read_from_json() -> anyhow::Result<()> {
    let json = r#"{
        "epochs": 20,
        "minibatch_size": 4,
        "learning_rate": 0.5,
        "reg_lambda": 0.001,
        "adapt_learning_rate": true,
        "seed": 42
    }"#;

    let config: TrainConfig = serde_json::from_str(json)?;
    assert_eq!(config.epochs.get(), 20);
    assert_eq!(config.minibatch_size.get(), 4);
    assert_eq!(config.hyperparameters.learning_rate, 0.5);
    assert_eq!(config.hyperparameters.reg_lambda, 0.001);
    assert!(config.hyperparameters.adapt_learning_rate);
    assert!(!config.hyperparameters.mean_centering);
    assert_eq!(config.seed, Some(42));

    let minimal: TrainConfig = serde_json::from_str(r#"{ "epochs": 1 }"#)?;
    assert_eq!(minimal, TrainConfig::new(NonZeroUsize::new(1).unwrap()));

    assert!(serde_json::from_str::<TrainConfig>(r#"{ "epochs": 0 }"#).is_err());
    Ok(())
}

#[test]
fn report_serializes_to_json() -> anyhow::Result<()> {
    let mut dataset = InlineDataset::new(vec![0., 0., 0., 1., 1., 1.], 2, 1)?.with_test_split(1)?;
    let data = dataset.load()?;

    let mut net = Network::with_seed(&[2, 2, 1], 0)?;
    let mut config = config(2, 1);
    config.hyperparameters.adapt_learning_rate = true;
    let report = data.train(&mut net, &config)?;

    let value = serde_json::to_value(&report)?;
    assert_eq!(value["epochs"].as_array().map(Vec::len), Some(2));
    assert!(value["test_cost"].is_number());
    assert!(value["epochs"][0]["adjustment"].is_string());
    Ok(())
}

#[test]
fn weights_round_trip_through_from_weights() -> anyhow::Result<()> {
    let mut net = Network::with_seed(&[2, 3, 1], 9)?;
    let x = array![[0., 1.], [1., 0.]];
    let y = array![[1.], [0.]];
    train(&mut net, config(3, 2), x.view().into_dyn(), y.view().into_dyn(), None)?;

    let loaded = Network::from_weights(net.weights().to_vec())?;
    assert_eq!(loaded.predict(&x)?, net.predict(&x)?);
    Ok(())
}
