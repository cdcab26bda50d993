//! Adam: momentum plus a per-parameter adaptive step size.
//!
//! For each parameter `p` with gradient `g`, at iteration `t`:
//!
//! ```text
//! m = β₁ m + (1 - β₁) g
//! v = β₂ v + (1 - β₂) g²
//! m̂ = m / (1 - β₁^(t+1))
//! v̂ = v / (1 - β₂^(t+1))
//! p = p - lr · m̂ / (√v̂ + ε)
//! ```
//!
//! On the first step the bias corrections cancel the `(1 - β)` factors, so
//! every parameter moves by roughly `lr`.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layer::Trainable;
use crate::optimizers::optimizer::{check_fraction, check_positive, LayerBuffers, ParamBuffers};
use crate::optimizers::{LearningRate, Optimizer};
use crate::tensor::Tensor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdamConfig {
    pub learning_rate: f64,
    pub decay: f64,
    pub epsilon: f64,
    pub beta_1: f64,
    pub beta_2: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        AdamConfig {
            learning_rate: 0.001,
            decay: 0.0,
            epsilon: 1e-7,
            beta_1: 0.9,
            beta_2: 0.999,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Adam {
    schedule: LearningRate,
    epsilon: f64,
    beta_1: f64,
    beta_2: f64,
    momentums: LayerBuffers,
    caches: LayerBuffers,
}

impl Adam {
    pub fn new(config: AdamConfig) -> Result<Self> {
        let schedule = LearningRate::new(config.learning_rate, config.decay)?;
        check_positive("epsilon", config.epsilon)?;
        check_fraction("beta_1", config.beta_1)?;
        check_fraction("beta_2", config.beta_2)?;
        Ok(Adam {
            schedule,
            epsilon: config.epsilon,
            beta_1: config.beta_1,
            beta_2: config.beta_2,
            momentums: LayerBuffers::new(),
            caches: LayerBuffers::new(),
        })
    }

    pub fn with_learning_rate(learning_rate: f64, decay: f64) -> Result<Self> {
        Self::new(AdamConfig { learning_rate, decay, ..AdamConfig::default() })
    }

    fn delta(&self, momentum: &mut Tensor, cache: &mut Tensor, gradient: &Tensor) -> Tensor {
        let step = (self.schedule.iterations() + 1) as f64;
        let learning_rate = self.schedule.current();

        *momentum = &momentum.scale(self.beta_1) + &gradient.scale(1.0 - self.beta_1);
        *cache = &cache.scale(self.beta_2) + &gradient.square().scale(1.0 - self.beta_2);

        let corrected_momentum = momentum.scale(1.0 / (1.0 - self.beta_1.powf(step)));
        let corrected_cache = cache.scale(1.0 / (1.0 - self.beta_2.powf(step)));

        corrected_momentum.zip_map(&corrected_cache, |m, v| -learning_rate * m / (v.sqrt() + self.epsilon))
    }
}

impl Optimizer for Adam {
    fn update_params(&mut self, layer: &mut dyn Trainable) -> Result<()> {
        let params: &dyn Trainable = &*layer;
        let d_weights = params.d_weights()?;
        let d_biases = params.d_biases()?;

        let id = params.id();
        let mut momentum = self.momentums.remove(&id).unwrap_or_else(|| ParamBuffers::zeros_for(params));
        let mut cache = self.caches.remove(&id).unwrap_or_else(|| ParamBuffers::zeros_for(params));

        let weight_delta = self.delta(&mut momentum.weights, &mut cache.weights, d_weights);
        let bias_delta = self.delta(&mut momentum.biases, &mut cache.biases, d_biases);

        self.momentums.insert(id, momentum);
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
        self.momentums.clear();
        self.caches.clear();
    }
}
