use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layer::Trainable;
use crate::optimizers::optimizer::{check_fraction, LayerBuffers, ParamBuffers};
use crate::optimizers::{LearningRate, Optimizer};
use crate::tensor::Tensor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SgdConfig {
    pub learning_rate: f64,
    pub decay: f64,
    pub momentum: f64,
}

impl Default for SgdConfig {
    fn default() -> Self {
        SgdConfig {
            learning_rate: 1.0,
            decay: 0.0,
            momentum: 0.0,
        }
    }
}

/// Stochastic gradient descent, optionally with momentum.
#[derive(Debug, Clone)]
pub struct Sgd {
    schedule: LearningRate,
    momentum: f64,
    velocities: LayerBuffers,
}

impl Sgd {
    pub fn new(config: SgdConfig) -> Result<Self> {
        let schedule = LearningRate::new(config.learning_rate, config.decay)?;
        check_fraction("momentum", config.momentum)?;
        Ok(Sgd {
            schedule,
            momentum: config.momentum,
            velocities: LayerBuffers::new(),
        })
    }

    pub fn with_learning_rate(learning_rate: f64, decay: f64) -> Result<Self> {
        Self::new(SgdConfig { learning_rate, decay, ..SgdConfig::default() })
    }

    fn delta(&self, velocity: Option<&mut Tensor>, gradient: &Tensor) -> Tensor {
        let step = gradient.scale(-self.schedule.current());
        match velocity {
            Some(velocity) => {
                *velocity = &velocity.scale(self.momentum) + &step;
                velocity.clone()
            }
            None => step,
        }
    }
}

impl Optimizer for Sgd {
    fn update_params(&mut self, layer: &mut dyn Trainable) -> Result<()> {
        let params: &dyn Trainable = &*layer;
        let d_weights = params.d_weights()?;
        let d_biases = params.d_biases()?;

        let (weight_delta, bias_delta) = if self.momentum > 0.0 {
            let id = params.id();
            let mut velocity = self.velocities.remove(&id).unwrap_or_else(|| ParamBuffers::zeros_for(params));
            let deltas = (
                self.delta(Some(&mut velocity.weights), d_weights),
                self.delta(Some(&mut velocity.biases), d_biases),
            );
            self.velocities.insert(id, velocity);
            deltas
        } else {
            (self.delta(None, d_weights), self.delta(None, d_biases))
        };

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
        self.velocities.clear();
    }
}
