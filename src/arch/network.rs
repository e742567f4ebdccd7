use log::debug;
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, ArrayViewD, Data, Dimension};
use ndarray_rand::RandomExt;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;

use super::{
    forward,
    weights::{WeightSnapshot, Weights},
};
use crate::{
    NetErr, Result,
    preprocessing::{self, Layout},
    training::{Hyperparameters, TrainConfig, Trainer, TrainingReport},
};

/// A fully connected feed-forward network with a sigmoid after every layer.
///
/// Owns the layer widths, one weight matrix per layer transition and the preprocessing
/// state (hyperparameters and the mean vector) that every input goes through, so that
/// inference sees its inputs exactly the way training did.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<usize>,
    weights: Weights,
    mean: Option<Array1<f64>>,
    hyperparameters: Hyperparameters,
}

impl Network {
    /// Creates a new `Network` with weights drawn from the OS entropy source.
    ///
    /// # Arguments
    /// * `layers` - The width of every layer, input first and output last.
    ///
    /// # Errors
    /// `NetErr::Configuration` if there are fewer than two layers or any width is zero.
    pub fn new(layers: &[usize]) -> Result<Self> {
        Self::with_rng(layers, &mut StdRng::from_os_rng())
    }

    /// Creates a new `Network` whose weights are fully determined by `seed`.
    pub fn with_seed(layers: &[usize], seed: u64) -> Result<Self> {
        Self::with_rng(layers, &mut StdRng::seed_from_u64(seed))
    }

    /// Creates a new `Network` with every weight drawn independently from a standard normal
    /// distribution.
    ///
    /// # Arguments
    /// * `layers` - The width of every layer, input first and output last.
    /// * `rng` - A random number generator.
    ///
    /// # Errors
    /// `NetErr::Configuration` if there are fewer than two layers or any width is zero.
    pub fn with_rng<R: Rng + ?Sized>(layers: &[usize], rng: &mut R) -> Result<Self> {
        if layers.len() < 2 {
            return Err(NetErr::Configuration(
                "layers must include at least the input and output widths".to_string(),
            ));
        }

        if let Some(i) = layers.iter().position(|&w| w == 0) {
            return Err(NetErr::Configuration(format!(
                "layer {i} has width 0, all widths must be > 0"
            )));
        }

        let matrices = layers
            .windows(2)
            .map(|dim| {
                Array2::random_using((dim[0] + 1, dim[1]), StandardNormal, &mut *rng)
            })
            .collect();

        Ok(Self::from_parts(layers.to_vec(), matrices))
    }

    /// Creates a new `Network` from existing weight matrices, bias row first.
    ///
    /// This is the counterpart of [`Network::weights`] and lets parameters that were stored
    /// elsewhere be loaded back.
    ///
    /// # Errors
    /// `NetErr::Configuration` if the list is empty, a matrix has no feature rows or columns,
    /// or consecutive matrices don't chain (`rows(i + 1) != cols(i) + 1`).
    pub fn from_weights(matrices: Vec<Array2<f64>>) -> Result<Self> {
        let first = matrices
            .first()
            .ok_or_else(|| NetErr::Configuration("no weight matrices given".to_string()))?;

        let mut layers = vec![first.nrows().saturating_sub(1)];
        for (i, w) in matrices.iter().enumerate() {
            let (rows, cols) = w.dim();
            if rows < 2 || cols == 0 {
                return Err(NetErr::Configuration(format!(
                    "weight matrix {i} has shape ({rows}, {cols}), expected at least (2, 1)"
                )));
            }

            let prev = layers[layers.len() - 1];
            if rows != prev + 1 {
                return Err(NetErr::Configuration(format!(
                    "weight matrix {i} has {rows} rows, expected {} for an input of width {prev}",
                    prev + 1
                )));
            }

            layers.push(cols);
        }

        Ok(Self::from_parts(layers, matrices))
    }

    fn from_parts(layers: Vec<usize>, matrices: Vec<Array2<f64>>) -> Self {
        Self {
            layers,
            weights: Weights::new(matrices),
            mean: None,
            hyperparameters: Hyperparameters::default(),
        }
    }

    /// Returns the width of every layer.
    pub fn layers(&self) -> &[usize] {
        &self.layers
    }

    pub fn input_width(&self) -> usize {
        self.layers[0]
    }

    pub fn output_width(&self) -> usize {
        self.layers[self.layers.len() - 1]
    }

    /// Returns the weight matrices in layer order, each with its bias row first.
    pub fn weights(&self) -> &[Array2<f64>] {
        self.weights.matrices()
    }

    /// Returns how many times the weights have been written to.
    pub fn version(&self) -> u64 {
        self.weights.version()
    }

    pub fn into_weights(self) -> Vec<Array2<f64>> {
        self.weights.into_matrices()
    }

    /// Returns the per-feature mean subtracted from inputs, if it was computed.
    pub fn mean(&self) -> Option<ArrayView1<'_, f64>> {
        self.mean.as_ref().map(|m| m.view())
    }

    /// Forgets the mean vector, the next mean-centered training run recomputes it.
    pub fn reset_mean(&mut self) {
        self.mean = None;
    }

    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyperparameters
    }

    /// Replaces the hyperparameters.
    ///
    /// # Errors
    /// `NetErr::Configuration` if any value is out of range, in which case nothing changes.
    pub fn set_hyperparameters(&mut self, hyperparameters: Hyperparameters) -> Result<()> {
        hyperparameters.validate()?;
        self.hyperparameters = hyperparameters;
        Ok(())
    }

    /// Runs the network over `x` and returns its output.
    ///
    /// `x` may be a scalar, a vector or a matrix with one sample per row; vectors are read
    /// as described in [`preprocessing::canonicalize`]. The input is normalized and
    /// mean-centered the same way training inputs were.
    ///
    /// # Returns
    /// One row of output activations per sample.
    ///
    /// # Errors
    /// * `NetErr::Shape` if `x` has more than two dimensions.
    /// * `NetErr::InputDimension` if the samples don't match the input layer.
    pub fn predict<S, D>(&self, x: &ArrayBase<S, D>) -> Result<Array2<f64>>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let mut x = self.prepare_features(x.view().into_dyn())?;
        self.center(&mut x);
        forward::propagate(self.weights(), x.view())
    }

    /// Trains the network with a [`Trainer`] built from `config`.
    ///
    /// See [`Trainer::train`].
    pub fn train(
        &mut self,
        x: ArrayViewD<'_, f64>,
        y: ArrayViewD<'_, f64>,
        config: &TrainConfig,
        test_x: Option<ArrayViewD<'_, f64>>,
        test_y: Option<ArrayViewD<'_, f64>>,
    ) -> Result<TrainingReport> {
        Trainer::from_config(config.clone()).train(self, x, y, test_x, test_y)
    }

    /// Canonicalizes `x` against the input layer, checks its width and normalizes it when
    /// the hyperparameters ask for it.
    pub(crate) fn prepare_features(&self, x: ArrayViewD<'_, f64>) -> Result<Array2<f64>> {
        self.prepare_features_with(x, self.hyperparameters.normalize_inputs)
    }

    pub(crate) fn prepare_features_with(
        &self,
        x: ArrayViewD<'_, f64>,
        normalize: bool,
    ) -> Result<Array2<f64>> {
        let expected = self.input_width();
        let canonical = preprocessing::canonicalize(x, expected)?;
        if canonical.layout() != Layout::Matrix {
            debug!(layout:? = canonical.layout(); "inputs were not sample-major");
        }

        let mut x = canonical.into_data();
        if x.ncols() != expected {
            return Err(NetErr::InputDimension {
                got: x.ncols(),
                expected,
            });
        }

        if normalize {
            preprocessing::normalize(&mut x);
        }

        Ok(x)
    }

    /// Canonicalizes `y` against the output layer and checks its width.
    pub(crate) fn prepare_labels(&self, y: ArrayViewD<'_, f64>) -> Result<Array2<f64>> {
        let expected = self.output_width();
        let y = preprocessing::canonicalize(y, expected)?.into_data();

        if y.ncols() != expected {
            return Err(NetErr::LabelDimension {
                got: y.ncols(),
                expected,
            });
        }

        Ok(y)
    }

    /// Subtracts the mean vector from `x` when mean-centering is on and a mean exists.
    pub(crate) fn center(&self, x: &mut Array2<f64>) {
        if !self.hyperparameters.mean_centering {
            return;
        }

        if let Some(mean) = &self.mean {
            preprocessing::center(x, mean);
        }
    }

    /// Computes the mean vector from `x` unless one is already set.
    pub(crate) fn init_mean(&mut self, x: &Array2<f64>) -> Result<()> {
        if self.mean.is_some() {
            return Ok(());
        }

        let mean = preprocessing::mean_vector(x.view())?;
        debug!(features = mean.len(); "computed mean vector for centering");
        self.mean = Some(mean);
        Ok(())
    }

    pub(crate) fn set_learning_rate(&mut self, learning_rate: f64) {
        self.hyperparameters.learning_rate = learning_rate;
    }

    pub(crate) fn snapshot(&self) -> WeightSnapshot {
        self.weights.snapshot()
    }

    pub(crate) fn weights_mut(&mut self) -> &mut Weights {
        &mut self.weights
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array0, Array3, array};

    use super::*;

    #[test]
    fn weights_have_a_bias_row() {
        let net = Network::with_seed(&[3, 5, 2], 0).unwrap();

        assert_eq!(net.layers(), [3, 5, 2]);
        assert_eq!(net.weights().len(), 2);
        assert_eq!(net.weights()[0].dim(), (4, 5));
        assert_eq!(net.weights()[1].dim(), (6, 2));
        assert!(net.mean().is_none());
        assert_eq!(net.version(), 0);
    }

    #[test]
    fn invalid_layer_widths_are_rejected() {
        assert!(matches!(
            Network::with_seed(&[3], 0),
            Err(NetErr::Configuration(_))
        ));
        assert!(matches!(
            Network::with_seed(&[], 0),
            Err(NetErr::Configuration(_))
        ));
        assert!(matches!(
            Network::with_seed(&[2, 0, 1], 0),
            Err(NetErr::Configuration(_))
        ));
    }

    #[test]
    fn same_seed_same_weights() {
        let a = Network::with_seed(&[2, 3, 1], 42).unwrap();
        let b = Network::with_seed(&[2, 3, 1], 42).unwrap();
        assert_eq!(a.weights(), b.weights());
    }

    #[test]
    fn from_weights_round_trips() {
        let net = Network::with_seed(&[4, 3, 2], 5).unwrap();
        let weights = net.weights().to_vec();

        let loaded = Network::from_weights(weights.clone()).unwrap();
        assert_eq!(loaded.layers(), [4, 3, 2]);

        let x = array![[0.1, 0.2, 0.3, 0.4]];
        assert_eq!(net.predict(&x).unwrap(), loaded.predict(&x).unwrap());
        assert_eq!(loaded.into_weights(), weights);
    }

    #[test]
    fn from_weights_checks_the_chain() {
        assert!(Network::from_weights(vec![]).is_err());
        assert!(Network::from_weights(vec![Array2::zeros((1, 3))]).is_err());

        let broken = vec![Array2::zeros((3, 4)), Array2::zeros((4, 1))];
        assert!(matches!(
            Network::from_weights(broken),
            Err(NetErr::Configuration(_))
        ));
    }

    #[test]
    fn predict_stays_in_the_sigmoid_range() {
        let net = Network::with_seed(&[3, 8, 4], 1).unwrap();
        let x = array![[0.5, -1.0, 2.0], [0.0, 0.0, 0.0], [-3.0, 1.5, 0.25]];

        let y = net.predict(&x).unwrap();
        assert_eq!(y.dim(), (3, 4));
        assert!(y.iter().all(|&v| v > 0. && v < 1.));
    }

    #[test]
    fn predict_is_deterministic() {
        let net = Network::with_seed(&[2, 4, 3], 9).unwrap();
        let x = array![[0.3, 0.7], [1.0, -1.0]];
        assert_eq!(net.predict(&x).unwrap(), net.predict(&x).unwrap());
    }

    #[test]
    fn predict_accepts_vectors_and_scalars() {
        let wide = Network::with_seed(&[2, 2, 1], 4).unwrap();
        let one = wide.predict(&array![0.2, 0.9]).unwrap();
        assert_eq!(one.dim(), (1, 1));
        assert_eq!(one, wide.predict(&array![[0.2, 0.9]]).unwrap());

        let narrow = Network::with_seed(&[1, 3, 2], 4).unwrap();
        assert_eq!(narrow.predict(&array![0.1, 0.2, 0.3]).unwrap().dim(), (3, 2));
        assert_eq!(
            narrow.predict(&Array0::from_elem((), 0.5)).unwrap().dim(),
            (1, 2)
        );
    }

    #[test]
    fn predict_rejects_bad_shapes() {
        let net = Network::with_seed(&[2, 2, 1], 4).unwrap();

        assert_eq!(
            net.predict(&Array3::<f64>::zeros((1, 1, 2))),
            Err(NetErr::Shape { rank: 3 })
        );
        assert_eq!(
            net.predict(&array![[1., 2., 3.]]),
            Err(NetErr::InputDimension {
                got: 3,
                expected: 2
            })
        );
    }

    #[test]
    fn invalid_hyperparameters_are_not_stored() {
        let mut net = Network::with_seed(&[2, 1], 0).unwrap();
        let bad = Hyperparameters {
            learning_rate: -1.,
            ..Default::default()
        };

        assert!(net.set_hyperparameters(bad).is_err());
        assert_eq!(net.hyperparameters(), &Hyperparameters::default());
    }
}
