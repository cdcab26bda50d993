use tracing::warn;

use crate::error::{Error, Result};
use crate::layer::{check_matrix, check_shape, Layer};
use crate::tensor::Tensor;

/// Predictions are clipped to `[CLIP_EPSILON, 1 - CLIP_EPSILON]` before any logarithm.
pub const CLIP_EPSILON: f64 = 1e-7;

pub trait LossFunction {

    /// Per-sample losses as a `batch x 1` column.
    fn forward(&self, predicted: &Tensor, target: &Tensor) -> Result<Tensor>;

    /// Gradient of the batch-mean loss w.r.t. `predicted`.
    fn backward(&self, predicted: &Tensor, target: &Tensor) -> Result<Tensor>;

    /// Batch-mean data loss.
    fn calculate(&self, predicted: &Tensor, target: &Tensor) -> Result<f64> {
        Ok(self.forward(predicted, target)?.mean())
    }

    /// L1/L2 penalty of a layer's parameters; zero for layers without
    /// parameters or coefficients. Frozen layers still contribute, since
    /// their backward pass still adds the penalty gradient.
    fn regularization_loss(&self, layer: &dyn Layer) -> f64 {
        let Some(params) = layer.as_trainable() else {
            return 0.0;
        };
        let reg = params.regularizers();
        if reg.is_zero() {
            return 0.0;
        }

        let mut loss = 0.0;
        if reg.weight_l1 > 0.0 {
            loss += reg.weight_l1 * params.weights().abs().sum();
        }
        if reg.weight_l2 > 0.0 {
            loss += reg.weight_l2 * params.weights().square().sum();
        }
        if reg.bias_l1 > 0.0 {
            loss += reg.bias_l1 * params.biases().abs().sum();
        }
        if reg.bias_l2 > 0.0 {
            loss += reg.bias_l2 * params.biases().square().sum();
        }
        loss
    }

}

fn clipped(context: &'static str, predicted: &Tensor) -> Tensor {
    if !predicted.all_finite() {
        warn!(context, "non-finite predictions clipped before computing the loss");
    }
    predicted.clip(CLIP_EPSILON, 1.0 - CLIP_EPSILON)
}

/// Cross-entropy for independent binary outputs (sigmoid heads).
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCrossEntropy;

impl LossFunction for BinaryCrossEntropy {

    fn forward(&self, predicted: &Tensor, target: &Tensor) -> Result<Tensor> {
        check_matrix("binary cross-entropy", predicted)?;
        check_shape("binary cross-entropy", predicted.shape(), target)?;

        let p = clipped("binary cross-entropy", predicted);
        let losses = p.zip_map(target, |p, y| -(y * p.ln() + (1.0 - y) * (1.0 - p).ln()));
        Ok(losses.mean_cols())
    }

    fn backward(&self, predicted: &Tensor, target: &Tensor) -> Result<Tensor> {
        check_matrix("binary cross-entropy", predicted)?;
        check_shape("binary cross-entropy", predicted.shape(), target)?;

        let (samples, outputs) = predicted.dims();
        let p = clipped("binary cross-entropy", predicted);
        let gradient = p.zip_map(target, |p, y| -(y / p - (1.0 - y) / (1.0 - p)) / outputs as f64);
        Ok(gradient.scale(1.0 / samples as f64))
    }

}

/// Cross-entropy over softmax outputs.
///
/// Targets are either one-hot rows shaped like the predictions, or a
/// `batch x 1` column of class indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoricalCrossEntropy;

impl CategoricalCrossEntropy {

    fn one_hot_targets(predicted: &Tensor, target: &Tensor) -> Result<Tensor> {
        check_matrix("categorical cross-entropy", predicted)?;
        let (samples, classes) = predicted.dims();
        if target.shape() == predicted.shape() {
            return Ok(target.clone());
        }
        check_shape("categorical cross-entropy", &[samples, 1], target)?;

        let mut one_hot = Tensor::zeros_2d(samples, classes);
        for (row, &label) in target.data.iter().enumerate() {
            if label < 0.0 || label.fract() != 0.0 || label as usize >= classes {
                return Err(Error::invalid(format!(
                    "class index {label} in row {row} is not in 0..{classes}"
                )));
            }
            one_hot.data[row * classes + label as usize] = 1.0;
        }
        Ok(one_hot)
    }

}

impl LossFunction for CategoricalCrossEntropy {

    fn forward(&self, predicted: &Tensor, target: &Tensor) -> Result<Tensor> {
        let target = Self::one_hot_targets(predicted, target)?;
        let p = clipped("categorical cross-entropy", predicted);

        let cols = p.cols();
        let data = p.data.chunks(cols)
            .zip(target.data.chunks(cols))
            .map(|(p_row, y_row)| {
                let confidence: f64 = p_row.iter().zip(y_row).map(|(p, y)| p * y).sum();
                -confidence.ln()
            })
            .collect();
        Ok(Tensor::new_2d(data, p.rows(), 1))
    }

    fn backward(&self, predicted: &Tensor, target: &Tensor) -> Result<Tensor> {
        let target = Self::one_hot_targets(predicted, target)?;
        let samples = predicted.rows();
        let p = clipped("categorical cross-entropy", predicted);

        let gradient = target.zip_map(&p, |y, p| -y / p);
        Ok(gradient.scale(1.0 / samples as f64))
    }

}

/// Mean squared error, averaged over outputs then over the batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanSquaredError;

impl LossFunction for MeanSquaredError {

    fn forward(&self, predicted: &Tensor, target: &Tensor) -> Result<Tensor> {
        check_matrix("mean squared error", predicted)?;
        check_shape("mean squared error", predicted.shape(), target)?;

        let diff = target - predicted;
        Ok(diff.square().mean_cols())
    }

    fn backward(&self, predicted: &Tensor, target: &Tensor) -> Result<Tensor> {
        check_matrix("mean squared error", predicted)?;
        check_shape("mean squared error", predicted.shape(), target)?;

        let (samples, outputs) = predicted.dims();
        let diff = target - predicted;
        Ok(diff.scale(-2.0 / (outputs * samples) as f64))
    }

}
