use tracing::debug;

use crate::error::{Error, Result};
use crate::layer::Layer;
use crate::loss_functions::LossFunction;
use crate::optimizers::Optimizer;
use crate::tensor::Tensor;

/// Outcome of one [`MLP::train_step`].
#[derive(Debug, Clone)]
pub struct StepReport {
    /// Network output from the training-mode forward pass.
    pub output: Tensor,
    pub data_loss: f64,
    pub regularization_loss: f64,
}

impl StepReport {
    pub fn total_loss(&self) -> f64 {
        self.data_loss + self.regularization_loss
    }
}

/// A stack of layers run in order on the forward pass and in reverse on the
/// backward pass.
#[derive(Default)]
pub struct MLP {
    pub layers: Vec<Box<dyn Layer>>,
}

impl MLP {
    pub fn new(layers: Vec<Box<dyn Layer>>) -> Self {
        MLP { layers }
    }

    pub fn push<L: Layer + 'static>(&mut self, layer: L) -> &mut Self {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn forward(&mut self, input: &Tensor, training: bool) -> Result<Tensor> {
        if self.layers.is_empty() {
            return Err(Error::invalid("cannot run forward on an MLP without layers"));
        }
        let mut current_input = input.clone();
        for layer in self.layers.iter_mut() {
            current_input = layer.forward(&current_input, training)?;
        }
        Ok(current_input)
    }

    pub fn backward(&mut self, gradient: &Tensor) -> Result<Tensor> {
        let mut current_gradient = gradient.clone();
        for layer in self.layers.iter_mut().rev() {
            current_gradient = layer.backward(&current_gradient)?;
        }
        Ok(current_gradient)
    }

    pub fn regularization_loss(&self, loss: &dyn LossFunction) -> f64 {
        self.layers.iter().map(|layer| loss.regularization_loss(&**layer)).sum()
    }

    /// Updates every trainable layer, then advances the learning-rate schedule once.
    pub fn update_params(&mut self, optimizer: &mut dyn Optimizer) -> Result<()> {
        for layer in self.layers.iter_mut().filter(|layer| layer.is_trainable()) {
            if let Some(params) = layer.as_trainable_mut() {
                optimizer.update_params(params)?;
            }
        }
        optimizer.update_learning_rate();
        Ok(())
    }

    /// Forward pass, loss, backward pass and parameter update on one batch.
    pub fn train_step(
        &mut self,
        input: &Tensor,
        target: &Tensor,
        loss: &dyn LossFunction,
        optimizer: &mut dyn Optimizer,
    ) -> Result<StepReport> {
        let output = self.forward(input, true)?;
        let data_loss = loss.calculate(&output, target)?;
        let regularization_loss = self.regularization_loss(loss);

        let gradient = loss.backward(&output, target)?;
        self.backward(&gradient)?;
        self.update_params(optimizer)?;

        debug!(
            iteration = optimizer.iterations(),
            data_loss,
            regularization_loss,
            learning_rate = optimizer.current_learning_rate(),
            "training step"
        );
        Ok(StepReport { output, data_loss, regularization_loss })
    }

    pub fn summary(&self) -> String {
        self.layers.iter().map(|layer| layer.details()).collect::<Vec<_>>().join("\n")
    }
}
