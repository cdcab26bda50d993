use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layer::Trainable;
use crate::optimizers::optimizer::{check_fraction, check_positive, LayerBuffers, ParamBuffers};
use crate::optimizers::{LearningRate, Optimizer};
use crate::tensor::Tensor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RmsPropConfig {
    pub learning_rate: f64,
    pub decay: f64,
    pub epsilon: f64,
    pub rho: f64,
}

impl Default for RmsPropConfig {
    fn default() -> Self {
        RmsPropConfig {
            learning_rate: 0.001,
            decay: 0.0,
            epsilon: 1e-7,
            rho: 0.9,
        }
    }
}

/// Like AdaGrad, but the squared-gradient cache is a moving average with
/// decay `rho` instead of a running sum.
#[derive(Debug, Clone)]
pub struct RmsProp {
    schedule: LearningRate,
    epsilon: f64,
    rho: f64,
    caches: LayerBuffers,
}

impl RmsProp {
    pub fn new(config: RmsPropConfig) -> Result<Self> {
        let schedule = LearningRate::new(config.learning_rate, config.decay)?;
        check_positive("epsilon", config.epsilon)?;
        check_fraction("rho", config.rho)?;
        Ok(RmsProp {
            schedule,
            epsilon: config.epsilon,
            rho: config.rho,
            caches: LayerBuffers::new(),
        })
    }

    pub fn with_learning_rate(learning_rate: f64, decay: f64) -> Result<Self> {
        Self::new(RmsPropConfig { learning_rate, decay, ..RmsPropConfig::default() })
    }

    fn delta(&self, cache: &mut Tensor, gradient: &Tensor) -> Tensor {
        let learning_rate = self.schedule.current();
        *cache = &cache.scale(self.rho) + &gradient.square().scale(1.0 - self.rho);
        gradient.zip_map(cache, |g, c| -learning_rate * g / (c.sqrt() + self.epsilon))
    }
}

impl Optimizer for RmsProp {
    fn update_params(&mut self, layer: &mut dyn Trainable) -> Result<()> {
        let params: &dyn Trainable = &*layer;
        let d_weights = params.d_weights()?;
        let d_biases = params.d_biases()?;

        let id = params.id();
        let mut cache = self.caches.remove(&id).unwrap_or_else(|| ParamBuffers::zeros_for(params));
        let weight_delta = self.delta(&mut cache.weights, d_weights);
        let bias_delta = self.delta(&mut cache.biases, d_biases);
        self.caches.insert(id, cache);

        layer.apply_update(&weight_delta, &bias_delta);
        Ok(())
    }

    fn schedule(&self) -> &LearningRate {
        &self.schedule
    }

    fn schedule_mut(&mut self) -> &mut LearningRate {
        &mut self.schedule
    }

    fn reset(&mut self) {
        self.caches.clear();
    }
}
