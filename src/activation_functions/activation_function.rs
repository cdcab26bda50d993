use crate::error::Result;
use crate::layer::Layer;
use crate::tensor::Tensor;

/// A parameter-free layer applying a fixed nonlinearity.
pub trait Activation: Layer {

    /// Decodes layer outputs into predictions (class indices, 0/1 labels or
    /// raw values, depending on the activation).
    fn predictions(&self, outputs: &Tensor) -> Result<Tensor>;

}
