use crate::activation_functions::Activation;
use crate::error::Result;
use crate::layer::{check_shape, describe, Layer, LayerState};
use crate::tensor::Tensor;

/// Logistic sigmoid, `1 / (1 + e^-x)`.
#[derive(Debug, Clone, Default)]
pub struct Sigmoid {
    state: LayerState,
}

impl Sigmoid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Sigmoid { state: LayerState::named(Some(name.into())) }
    }
}

impl Layer for Sigmoid {
    fn forward(&mut self, inputs: &Tensor, _training: bool) -> Result<Tensor> {
        let output = inputs.sigmoid();
        self.state.inputs = Some(inputs.clone());
        self.state.output = Some(output.clone());
        Ok(output)
    }

    /// Sigmoid derivative: sigmoid(x) * (1 - sigmoid(x)), taken from the cached output.
    fn backward(&mut self, gradient: &Tensor) -> Result<Tensor> {
        let output = self.state.output()?;
        check_shape("sigmoid backward", output.shape(), gradient)?;

        let d_inputs = gradient.zip_map(output, |g, o| g * o * (1.0 - o));
        self.state.d_inputs = Some(d_inputs.clone());
        Ok(d_inputs)
    }

    fn details(&self) -> String {
        describe(&self.state, "Sigmoid", self.state.inputs.as_ref().map(Tensor::cols))
    }

    fn state(&self) -> &LayerState {
        &self.state
    }
}

impl Activation for Sigmoid {
    fn predictions(&self, outputs: &Tensor) -> Result<Tensor> {
        Ok(outputs.map(|o| if o > 0.5 { 1.0 } else { 0.0 }))
    }
}
