use crate::activation_functions::Activation;
use crate::error::Result;
use crate::layer::{check_shape, describe, Layer, LayerState};
use crate::tensor::Tensor;

/// Identity activation, for regression outputs.
#[derive(Debug, Clone, Default)]
pub struct Linear {
    state: LayerState,
}

impl Linear {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Linear { state: LayerState::named(Some(name.into())) }
    }
}

impl Layer for Linear {
    fn forward(&mut self, inputs: &Tensor, _training: bool) -> Result<Tensor> {
        self.state.inputs = Some(inputs.clone());
        self.state.output = Some(inputs.clone());
        Ok(inputs.clone())
    }

    fn backward(&mut self, gradient: &Tensor) -> Result<Tensor> {
        let output = self.state.output()?;
        check_shape("linear backward", output.shape(), gradient)?;

        self.state.d_inputs = Some(gradient.clone());
        Ok(gradient.clone())
    }

    fn details(&self) -> String {
        describe(&self.state, "Linear", self.state.inputs.as_ref().map(Tensor::cols))
    }

    fn state(&self) -> &LayerState {
        &self.state
    }
}

impl Activation for Linear {
    fn predictions(&self, outputs: &Tensor) -> Result<Tensor> {
        Ok(outputs.clone())
    }
}
