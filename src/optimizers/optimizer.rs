//! Shared optimizer plumbing: the [`Optimizer`] trait, the decaying
//! learning-rate schedule every optimizer carries, and per-layer buffers.
//!
//! Optimizer state (momentums, squared-gradient caches) is kept inside the
//! optimizer, keyed by the [`LayerId`] of the layer it belongs to, and
//! allocated the first time that layer is updated. Layers never see it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::layer::{LayerId, Trainable};
use crate::optimizers::{AdaGrad, AdaGradConfig, Adam, AdamConfig, RmsProp, RmsPropConfig, Sgd, SgdConfig};
use crate::tensor::Tensor;

pub trait Optimizer {

    /// Applies one update to the layer's weights and biases from its last
    /// backward pass.
    fn update_params(&mut self, layer: &mut dyn Trainable) -> Result<()>;

    fn schedule(&self) -> &LearningRate;

    fn schedule_mut(&mut self) -> &mut LearningRate;

    /// Drops every per-layer buffer; the learning-rate schedule is kept.
    fn reset(&mut self);

    /// Decays the learning rate and advances the iteration counter. Call once
    /// per training step, after every layer has been updated.
    fn update_learning_rate(&mut self) {
        self.schedule_mut().step();
    }

    fn current_learning_rate(&self) -> f64 {
        self.schedule().current()
    }

    fn iterations(&self) -> u64 {
        self.schedule().iterations()
    }

}

/// `current = initial / (1 + decay * iterations)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningRate {
    initial: f64,
    current: f64,
    decay: f64,
    iterations: u64,
}

impl LearningRate {
    pub fn new(initial: f64, decay: f64) -> Result<Self> {
        if !initial.is_finite() || initial <= 0.0 {
            return Err(Error::invalid(format!("learning_rate must be positive, got {initial}")));
        }
        if !decay.is_finite() || decay < 0.0 {
            return Err(Error::invalid(format!("decay must be non-negative, got {decay}")));
        }
        Ok(LearningRate { initial, current: initial, decay, iterations: 0 })
    }

    pub fn initial(&self) -> f64 {
        self.initial
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn step(&mut self) {
        self.current = self.initial / (1.0 + self.decay * self.iterations as f64);
        trace!(iterations = self.iterations, learning_rate = self.current, "decayed learning rate");
        self.iterations += 1;
    }
}

/// Hyperparameters for any optimizer, as read from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptimizerConfig {
    Sgd(SgdConfig),
    AdaGrad(AdaGradConfig),
    RmsProp(RmsPropConfig),
    Adam(AdamConfig),
}

impl OptimizerConfig {
    pub fn build(&self) -> Result<Box<dyn Optimizer>> {
        Ok(match self {
            OptimizerConfig::Sgd(config) => Box::new(Sgd::new(config.clone())?),
            OptimizerConfig::AdaGrad(config) => Box::new(AdaGrad::new(config.clone())?),
            OptimizerConfig::RmsProp(config) => Box::new(RmsProp::new(config.clone())?),
            OptimizerConfig::Adam(config) => Box::new(Adam::new(config.clone())?),
        })
    }
}

pub(crate) type LayerBuffers = HashMap<LayerId, ParamBuffers>;

/// One buffer per parameter tensor of a layer, zeroed to the parameter shapes.
#[derive(Debug, Clone)]
pub(crate) struct ParamBuffers {
    pub(crate) weights: Tensor,
    pub(crate) biases: Tensor,
}

impl ParamBuffers {
    pub(crate) fn zeros_for(layer: &dyn Trainable) -> Self {
        debug!(layer = ?layer.id(), "allocating optimizer buffers");
        ParamBuffers {
            weights: Tensor::zeros_like(layer.weights()),
            biases: Tensor::zeros_like(layer.biases()),
        }
    }
}

pub(crate) fn check_positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::invalid(format!("{field} must be positive, got {value}")));
    }
    Ok(())
}

/// Accepts `[0, 1)`.
pub(crate) fn check_fraction(field: &str, value: f64) -> Result<()> {
    if !(0.0..1.0).contains(&value) {
        return Err(Error::invalid(format!("{field} must be in [0, 1), got {value}")));
    }
    Ok(())
}
