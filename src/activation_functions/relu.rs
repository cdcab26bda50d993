use crate::activation_functions::Activation;
use crate::error::Result;
use crate::layer::{check_shape, describe, Layer, LayerState};
use crate::tensor::Tensor;

/// `max(0, x)`, elementwise.
#[derive(Debug, Clone, Default)]
pub struct ReLU {
    state: LayerState,
}

impl ReLU {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        ReLU { state: LayerState::named(Some(name.into())) }
    }
}

impl Layer for ReLU {
    fn forward(&mut self, inputs: &Tensor, _training: bool) -> Result<Tensor> {
        let output = inputs.relu();
        self.state.inputs = Some(inputs.clone());
        self.state.output = Some(output.clone());
        Ok(output)
    }

    fn backward(&mut self, gradient: &Tensor) -> Result<Tensor> {
        let inputs = self.state.inputs()?;
        check_shape("relu backward", inputs.shape(), gradient)?;

        // zero wherever the input was not positive
        let d_inputs = gradient.zip_map(inputs, |g, x| if x <= 0.0 { 0.0 } else { g });
        self.state.d_inputs = Some(d_inputs.clone());
        Ok(d_inputs)
    }

    fn details(&self) -> String {
        describe(&self.state, "ReLU", self.state.inputs.as_ref().map(Tensor::cols))
    }

    fn state(&self) -> &LayerState {
        &self.state
    }
}

impl Activation for ReLU {
    fn predictions(&self, outputs: &Tensor) -> Result<Tensor> {
        Ok(outputs.clone())
    }
}
