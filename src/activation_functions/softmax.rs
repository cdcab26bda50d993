use crate::activation_functions::Activation;
use crate::error::Result;
use crate::layer::{check_matrix, check_shape, describe, Layer, LayerState};
use crate::tensor::Tensor;

/// Row-wise softmax over a batch of logits.
#[derive(Debug, Clone, Default)]
pub struct Softmax {
    state: LayerState,
}

impl Softmax {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Softmax { state: LayerState::named(Some(name.into())) }
    }
}

impl Layer for Softmax {
    fn forward(&mut self, inputs: &Tensor, _training: bool) -> Result<Tensor> {
        check_matrix("softmax forward", inputs)?;
        let output = inputs.softmax_rows();
        self.state.inputs = Some(inputs.clone());
        self.state.output = Some(output.clone());
        Ok(output)
    }

    // to get the derivative of the softmax we need the Jacobian of every sample
    fn backward(&mut self, gradient: &Tensor) -> Result<Tensor> {
        let output = self.state.output()?;
        check_shape("softmax backward", output.shape(), gradient)?;

        let cols = output.cols();
        let mut data = Vec::with_capacity(output.size());
        for r in 0..output.rows() {
            let jacobian = Tensor::softmax_jacobian(output.row(r));
            let partial = Tensor::new_2d(gradient.row(r).to_vec(), cols, 1);
            data.extend(jacobian.matmul(&partial).data);
        }

        let d_inputs = Tensor::new(data, output.shape.clone());
        self.state.d_inputs = Some(d_inputs.clone());
        Ok(d_inputs)
    }

    fn details(&self) -> String {
        describe(&self.state, "Softmax", self.state.inputs.as_ref().map(Tensor::cols))
    }

    fn state(&self) -> &LayerState {
        &self.state
    }
}

impl Activation for Softmax {
    /// Index of the largest probability in each row, as a `rows x 1` column.
    fn predictions(&self, outputs: &Tensor) -> Result<Tensor> {
        check_matrix("softmax predictions", outputs)?;
        let classes = outputs.argmax_rows().into_iter().map(|c| c as f64).collect::<Vec<_>>();
        let rows = classes.len();
        Ok(Tensor::new_2d(classes, rows, 1))
    }
}
