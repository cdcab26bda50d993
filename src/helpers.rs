use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Fraction of predictions equal to their target.
///
/// `predictions` usually comes from [`Activation::predictions`]: 0/1 labels
/// for sigmoid heads, class indices for softmax heads. When predictions are a
/// single column and the targets are one-hot rows, the targets are reduced to
/// class indices first.
///
/// [`Activation::predictions`]: crate::activation_functions::Activation::predictions
pub fn accuracy(predictions: &Tensor, targets: &Tensor) -> Result<f64> {
    if predictions.rows() != targets.rows() || predictions.rows() == 0 {
        return Err(Error::shape("accuracy", predictions.shape(), targets.shape()));
    }

    let targets = if predictions.cols() == 1 && targets.cols() > 1 {
        let classes = targets.argmax_rows().into_iter().map(|c| c as f64).collect::<Vec<_>>();
        Tensor::new_2d(classes, targets.rows(), 1)
    } else {
        targets.clone()
    };
    if predictions.shape() != targets.shape() {
        return Err(Error::shape("accuracy", predictions.shape(), targets.shape()));
    }

    let correct = predictions.data.iter()
        .zip(targets.data.iter())
        .filter(|(p, t)| p == t)
        .count();
    Ok(correct as f64 / predictions.size() as f64)
}
