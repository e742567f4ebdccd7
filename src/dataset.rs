//! Plugging labeled data into a training run.
//!
//! Loading and decoding data files is left to the host: anything that can produce arrays
//! implements [`DataProvider`]. [`InlineDataset`] covers the case where the samples are
//! already in memory as a flat buffer.

use ndarray::{Array2, ArrayD, ArrayViewD, s};

use crate::{NetErr, Network, Result, TrainConfig, TrainingReport};

/// A training set and an optional test set, as raw arrays of any supported rank.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledData {
    pub train_x: ArrayD<f64>,
    pub train_y: ArrayD<f64>,
    pub test_x: Option<ArrayD<f64>>,
    pub test_y: Option<ArrayD<f64>>,
}

impl LabeledData {
    /// Trains `network` on this data with a trainer built from `config`.
    pub fn train(&self, network: &mut Network, config: &TrainConfig) -> Result<TrainingReport> {
        network.train(
            self.train_x.view(),
            self.train_y.view(),
            config,
            self.test_x.as_ref().map(|x| x.view()),
            self.test_y.as_ref().map(|y| y.view()),
        )
    }
}

/// A source of labeled data.
pub trait DataProvider {
    /// Produces the data, reading or decoding it if needed.
    fn load(&mut self) -> Result<LabeledData>;
}

/// Samples stored row after row in a single buffer, each row being `x_size` features
/// followed by `y_size` targets.
#[derive(Debug, Clone)]
pub struct InlineDataset {
    x_size: usize,
    y_size: usize,
    data: Vec<f64>,
    test_rows: usize,
}

impl InlineDataset {
    /// Creates a new `InlineDataset`.
    ///
    /// # Arguments
    /// * `data` - The samples, row-major.
    /// * `x_size` - The amount of features per sample.
    /// * `y_size` - The amount of targets per sample.
    ///
    /// # Errors
    /// `NetErr::Configuration` if a size is zero or `data` doesn't hold a whole number of rows.
    pub fn new(data: Vec<f64>, x_size: usize, y_size: usize) -> Result<Self> {
        if x_size == 0 || y_size == 0 {
            return Err(NetErr::Configuration(format!(
                "sample sizes must be > 0, got x_size = {x_size} and y_size = {y_size}"
            )));
        }

        let row = x_size + y_size;
        if data.len() % row != 0 {
            return Err(NetErr::Configuration(format!(
                "{} values don't split into rows of {row}",
                data.len()
            )));
        }

        Ok(Self {
            x_size,
            y_size,
            data,
            test_rows: 0,
        })
    }

    /// Holds out the last `test_rows` rows as the test set.
    ///
    /// # Errors
    /// `NetErr::Configuration` if no training rows would be left.
    pub fn with_test_split(mut self, test_rows: usize) -> Result<Self> {
        let rows = self.len();
        if test_rows >= rows {
            return Err(NetErr::Configuration(format!(
                "cannot hold out {test_rows} test rows out of {rows}"
            )));
        }

        self.test_rows = test_rows;
        Ok(self)
    }

    /// Returns the total amount of rows.
    pub fn len(&self) -> usize {
        self.data.len() / (self.x_size + self.y_size)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl DataProvider for InlineDataset {
    fn load(&mut self) -> Result<LabeledData> {
        let Self {
            x_size,
            y_size,
            ref data,
            test_rows,
        } = *self;

        let rows = self.len();
        let full = Array2::from_shape_vec((rows, x_size + y_size), data.clone())
            .map_err(|e| NetErr::Configuration(e.to_string()))?;

        let split = rows - test_rows;
        let train = full.slice(s![..split, ..]);
        let test = full.slice(s![split.., ..]);

        let (test_x, test_y) = match test_rows {
            0 => (None, None),
            _ => (
                Some(test.slice(s![.., ..x_size]).to_owned().into_dyn()),
                Some(test.slice(s![.., x_size..]).to_owned().into_dyn()),
            ),
        };

        Ok(LabeledData {
            train_x: train.slice(s![.., ..x_size]).to_owned().into_dyn(),
            train_y: train.slice(s![.., x_size..]).to_owned().into_dyn(),
            test_x,
            test_y,
        })
    }
}

/// Encodes class indices as one-hot rows.
///
/// # Errors
/// `NetErr::Configuration` if a label is not below `classes`.
pub fn one_hot(labels: &[usize], classes: usize) -> Result<Array2<f64>> {
    let mut encoded = Array2::zeros((labels.len(), classes));
    for (i, &label) in labels.iter().enumerate() {
        if label >= classes {
            return Err(NetErr::Configuration(format!(
                "label {label} at row {i} is out of range for {classes} classes"
            )));
        }

        encoded[[i, label]] = 1.;
    }

    Ok(encoded)
}

/// Flattens every sample of a batch into a row, e.g. `n` images of `h × w` pixels into an
/// `n × (h · w)` matrix.
///
/// # Errors
/// `NetErr::Shape` if `x` has no sample axis.
pub fn flatten_samples(x: ArrayViewD<'_, f64>) -> Result<Array2<f64>> {
    let n = match x.shape().first() {
        Some(&n) => n,
        None => return Err(NetErr::Shape { rank: 0 }),
    };

    let width = x.shape()[1..].iter().product();
    Array2::from_shape_vec((n, width), x.iter().copied().collect())
        .map_err(|e| NetErr::Configuration(e.to_string()))
}

#[cfg(test)]
mod tests {
    use ndarray::{Array3, array};

    use super::*;

    #[test]
    fn rows_are_split_into_features_and_targets() {
        let data = vec![0., 0., 0., 0., 1., 1., 1., 0., 1., 1., 1., 0.];
        let mut dataset = InlineDataset::new(data, 2, 1).unwrap();
        assert_eq!(dataset.len(), 4);

        let loaded = dataset.load().unwrap();
        assert_eq!(
            loaded.train_x,
            array![[0., 0.], [0., 1.], [1., 0.], [1., 1.]].into_dyn()
        );
        assert_eq!(loaded.train_y, array![[0.], [1.], [1.], [0.]].into_dyn());
        assert!(loaded.test_x.is_none() && loaded.test_y.is_none());
    }

    #[test]
    fn test_split_takes_the_last_rows() {
        let data = (0..12).map(|v| v as f64).collect();
        let mut dataset = InlineDataset::new(data, 2, 1)
            .unwrap()
            .with_test_split(1)
            .unwrap();

        let loaded = dataset.load().unwrap();
        assert_eq!(loaded.train_x.shape(), &[3, 2]);
        assert_eq!(loaded.test_x.unwrap(), array![[9., 10.]].into_dyn());
        assert_eq!(loaded.test_y.unwrap(), array![[11.]].into_dyn());
    }

    #[test]
    fn invalid_layouts_are_rejected() {
        assert!(InlineDataset::new(vec![1., 2., 3.], 1, 1).is_err());
        assert!(InlineDataset::new(vec![1., 2.], 0, 2).is_err());

        let dataset = InlineDataset::new(vec![1., 2.], 1, 1).unwrap();
        assert!(dataset.with_test_split(1).is_err());
    }

    #[test]
    fn one_hot_sets_a_single_one_per_row() {
        let encoded = one_hot(&[2, 0, 1], 3).unwrap();
        assert_eq!(encoded, array![[0., 0., 1.], [1., 0., 0.], [0., 1., 0.]]);

        assert!(matches!(one_hot(&[3], 3), Err(NetErr::Configuration(_))));
    }

    #[test]
    fn images_are_flattened_row_major() {
        let images = Array3::from_shape_fn((2, 2, 3), |(n, i, j)| (n * 6 + i * 3 + j) as f64);
        let flat = flatten_samples(images.view().into_dyn()).unwrap();

        assert_eq!(flat.dim(), (2, 6));
        assert_eq!(flat.row(1), array![6., 7., 8., 9., 10., 11.]);
    }
}
