use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, NetErr>;

/// The network's error type.
///
/// Every variant is detected before the failing call touches the weights, so the model is
/// left exactly as it was before the call.
#[derive(Debug, Clone, PartialEq)]
pub enum NetErr {
    /// Invalid layer widths, weight list or hyperparameter.
    Configuration(String),
    /// The array could not be brought into sample-major 2-D form.
    Shape {
        rank: usize,
    },
    /// The feature count does not match the width of the input layer.
    InputDimension {
        got: usize,
        expected: usize,
    },
    /// The label width does not match the width of the output layer.
    LabelDimension {
        got: usize,
        expected: usize,
    },
    BatchSizeMismatch {
        x: usize,
        y: usize,
    },
    CacheLengthMismatch {
        got: usize,
        expected: usize,
    },
    /// A cached layer output is not shaped `(samples, layer width)` for the batch at hand.
    CacheShapeMismatch {
        layer: usize,
        got: (usize, usize),
        expected: (usize, usize),
    },
    EmptyDataset,
    /// Only one half of the test set was given.
    IncompleteTestData {
        missing: &'static str,
    },
    TestDataLengthMismatch {
        x: usize,
        y: usize,
    },
}

impl Display for NetErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NetErr::Configuration(msg) => format!("invalid configuration: {msg}"),
            NetErr::Shape { rank } => {
                format!("expected a scalar, one or two dimensional array, got rank {rank}")
            }
            NetErr::InputDimension { got, expected } => format!(
                "input has {got} features but the network's input layer has width {expected}"
            ),
            NetErr::LabelDimension { got, expected } => format!(
                "labels have width {got} but the network's output layer has width {expected}"
            ),
            NetErr::BatchSizeMismatch { x, y } => {
                format!("there are {x} input samples but {y} label samples")
            }
            NetErr::CacheLengthMismatch { got, expected } => format!(
                "the activation cache holds {got} layer outputs, expected {expected}"
            ),
            NetErr::CacheShapeMismatch {
                layer,
                got,
                expected,
            } => format!(
                "the cached output of layer {layer} has shape {got:?}, expected {expected:?}"
            ),
            NetErr::EmptyDataset => "the training set has no samples".to_string(),
            NetErr::IncompleteTestData { missing } => {
                format!("test data is incomplete, missing the {missing}")
            }
            NetErr::TestDataLengthMismatch { x, y } => {
                format!("test data is not of the same length, got {x} inputs and {y} labels")
            }
        };

        write!(f, "{s}")
    }
}

impl Error for NetErr {}
