//! Metrics computed over a whole set of predictions.
//!
//! These don't take part in training, they only report how well the current weights fit.

use ndarray::{ArrayView1, ArrayView2, Axis, Zip};
use serde::Serialize;

use crate::arch::loss::{HalfMse, LossFn};

/// Accuracy and cost of a set of predictions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub cost: f64,
    pub correct: usize,
    pub total: usize,
}

/// Returns the index of the largest value, the first one on ties.
fn argmax(row: ArrayView1<'_, f64>) -> usize {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }

    best
}

/// Counts the samples whose predicted class matches the target class.
///
/// The class of a row is the index of its largest value. With a single output unit every
/// row has class 0, so every sample counts as correct.
///
/// # Panics
/// If `y_pred` and `y` don't have the same number of rows.
pub fn correct(y_pred: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>) -> usize {
    Zip::from(y_pred.rows())
        .and(y.rows())
        .fold(0, |acc, pred, target| {
            acc + usize::from(argmax(pred) == argmax(target))
        })
}

/// The fraction of samples classified correctly, 0 for an empty set.
///
/// # Panics
/// If `y_pred` and `y` don't have the same number of rows.
pub fn accuracy(y_pred: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>) -> f64 {
    ratio(correct(y_pred, y), y_pred.len_of(Axis(0)))
}

fn ratio(correct: usize, total: usize) -> f64 {
    match total {
        0 => 0.,
        n => correct as f64 / n as f64,
    }
}

/// Half the mean over samples of the squared error, `0.5 · Σ(y_pred - y)² / n`.
///
/// # Panics
/// If `y_pred` and `y` are not shaped alike.
pub fn cost(y_pred: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>) -> f64 {
    HalfMse.loss(y_pred, y)
}

/// Computes every metric at once.
///
/// # Arguments
/// * `y_pred` - The network's output, one row per sample.
/// * `y` - The expected output, shaped like `y_pred`.
///
/// # Panics
/// If `y_pred` and `y` are not shaped alike.
pub fn evaluate(y_pred: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>) -> Evaluation {
    let total = y_pred.nrows();
    let correct = correct(y_pred, y);

    Evaluation {
        accuracy: ratio(correct, total),
        cost: cost(y_pred, y),
        correct,
        total,
    }
}
