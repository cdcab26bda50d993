use rand::distributions::{Bernoulli, Distribution};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use tracing::trace;

use crate::error::{Error, Result};
use crate::layer::{cached, check_shape, describe, Layer, LayerState};
use crate::tensor::Tensor;

/// Inverted dropout.
///
/// During training every element is kept with probability `1 - rate` and the
/// survivors are scaled by `1 / (1 - rate)`, so nothing needs rescaling at
/// inference time, where the layer is the identity.
#[derive(Debug, Clone)]
pub struct Dropout {
    state: LayerState,
    rate: f64,
    keep_probability: f64,
    keep: Bernoulli,
    binary_mask: Option<Tensor>,
    rng: Pcg64,
}

impl Dropout {
    /// `rate` is the probability of dropping an element and must lie strictly
    /// between 0 and 1.
    pub fn new(rate: f64) -> Result<Self> {
        Self::with_rng(rate, Pcg64::from_entropy())
    }

    pub fn with_seed(rate: f64, seed: u64) -> Result<Self> {
        Self::with_rng(rate, Pcg64::seed_from_u64(seed))
    }

    fn with_rng(rate: f64, rng: Pcg64) -> Result<Self> {
        if !(rate > 0.0 && rate < 1.0) {
            return Err(Error::invalid(format!(
                "dropout rate must be strictly between 0 and 1, got {rate}"
            )));
        }
        let keep_probability = 1.0 - rate;
        let keep = Bernoulli::new(keep_probability).map_err(|e| Error::invalid(e.to_string()))?;
        Ok(Dropout {
            state: LayerState::default(),
            rate,
            keep_probability,
            keep,
            binary_mask: None,
            rng,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.state.name = Some(name.into());
        self
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn keep_probability(&self) -> f64 {
        self.keep_probability
    }

    /// The scaled mask from the last training forward pass.
    pub fn binary_mask(&self) -> Result<&Tensor> {
        cached(&self.binary_mask, "binary_mask")
    }
}

impl Layer for Dropout {
    fn forward(&mut self, inputs: &Tensor, training: bool) -> Result<Tensor> {
        self.state.inputs = Some(inputs.clone());

        if !training {
            self.binary_mask = None;
            self.state.output = Some(inputs.clone());
            return Ok(inputs.clone());
        }

        let scale = 1.0 / self.keep_probability;
        let data = (0..inputs.size())
            .map(|_| if self.keep.sample(&mut self.rng) { scale } else { 0.0 })
            .collect();
        let mask = Tensor::new(data, inputs.shape.clone());
        let output = inputs.hadamard(&mask);
        trace!(shape = ?inputs.shape(), rate = self.rate, "dropout forward");

        self.binary_mask = Some(mask);
        self.state.output = Some(output.clone());
        Ok(output)
    }

    fn backward(&mut self, gradient: &Tensor) -> Result<Tensor> {
        let inputs = self.state.inputs()?;
        check_shape("dropout backward", inputs.shape(), gradient)?;

        // The last forward ran in inference mode: nothing was masked.
        let d_inputs = match &self.binary_mask {
            Some(mask) => gradient.hadamard(mask),
            None => gradient.clone(),
        };
        self.state.d_inputs = Some(d_inputs.clone());
        Ok(d_inputs)
    }

    fn details(&self) -> String {
        let width = self.state.inputs.as_ref().map(Tensor::cols);
        describe(&self.state, "Dropout", width)
    }

    fn state(&self) -> &LayerState {
        &self.state
    }
}
