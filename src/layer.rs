//! The layer abstraction shared by dense, dropout and activation layers.
//!
//! Every layer caches what it saw on the last forward call and what it
//! produced on the last backward call. Those slots start out empty and are
//! read through accessors that fail with [`Error::UnsetState`] until the call
//! that fills them has run, so calling `backward` before `forward` is an error
//! rather than a panic.

mod dense;
mod dropout;

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tensor::Tensor;

pub use self::dense::{Dense, DenseConfig};
pub use self::dropout::Dropout;

/// Identity of a parameterized layer, used by optimizers to key their state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

impl LayerId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        LayerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// L1/L2 penalty coefficients for a layer's weights and biases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Regularizers {
    pub weight_l1: f64,
    pub weight_l2: f64,
    pub bias_l1: f64,
    pub bias_l2: f64,
}

impl Regularizers {
    pub fn validate(&self) -> Result<()> {
        let coefficients = [
            ("weight_regularizer_l1", self.weight_l1),
            ("weight_regularizer_l2", self.weight_l2),
            ("bias_regularizer_l1", self.bias_l1),
            ("bias_regularizer_l2", self.bias_l2),
        ];
        for (field, value) in coefficients {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid(format!(
                    "{field} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn is_zero(&self) -> bool {
        self.weight_l1 == 0.0 && self.weight_l2 == 0.0 && self.bias_l1 == 0.0 && self.bias_l2 == 0.0
    }
}

/// Name and cached tensors carried by every layer between calls.
#[derive(Debug, Clone, Default)]
pub struct LayerState {
    pub(crate) name: Option<String>,
    pub(crate) inputs: Option<Tensor>,
    pub(crate) output: Option<Tensor>,
    pub(crate) d_inputs: Option<Tensor>,
}

impl LayerState {
    pub fn named(name: Option<String>) -> Self {
        LayerState { name, ..Default::default() }
    }

    pub fn inputs(&self) -> Result<&Tensor> {
        cached(&self.inputs, "inputs")
    }

    pub fn output(&self) -> Result<&Tensor> {
        cached(&self.output, "output")
    }

    pub fn d_inputs(&self) -> Result<&Tensor> {
        cached(&self.d_inputs, "d_inputs")
    }
}

pub(crate) fn cached<'a>(slot: &'a Option<Tensor>, field: &'static str) -> Result<&'a Tensor> {
    slot.as_ref().ok_or(Error::UnsetState(field))
}

pub(crate) fn check_shape(context: &'static str, expected: &[usize], actual: &Tensor) -> Result<()> {
    if actual.shape() != expected {
        return Err(Error::shape(context, expected, actual.shape()));
    }
    Ok(())
}

pub(crate) fn check_matrix(context: &'static str, tensor: &Tensor) -> Result<()> {
    if tensor.rank() != 2 || tensor.size() == 0 {
        return Err(Error::shape(context, &[tensor.rows(), tensor.cols()], tensor.shape()));
    }
    Ok(())
}

pub(crate) fn describe(state: &LayerState, kind: &str, output_size: Option<usize>) -> String {
    let size = output_size.map_or_else(|| "?".to_string(), |n| n.to_string());
    format!(
        "Name: {} || Type: {} || Output Size: {}",
        state.name.as_deref().unwrap_or("-"),
        kind,
        size
    )
}

pub trait Layer {
    /// Computes the layer output, caching what `backward` needs.
    ///
    /// `training` only changes behaviour for layers that act differently at
    /// inference time, such as [`Dropout`].
    fn forward(&mut self, inputs: &Tensor, training: bool) -> Result<Tensor>;

    /// Turns the gradient w.r.t. the last output into the gradient w.r.t. the
    /// last input.
    fn backward(&mut self, gradient: &Tensor) -> Result<Tensor>;

    /// One-line description: name, layer type and output width.
    fn details(&self) -> String;

    fn state(&self) -> &LayerState;

    fn name(&self) -> Option<&str> {
        self.state().name.as_deref()
    }

    fn inputs(&self) -> Result<&Tensor> {
        self.state().inputs()
    }

    fn output(&self) -> Result<&Tensor> {
        self.state().output()
    }

    fn d_inputs(&self) -> Result<&Tensor> {
        self.state().d_inputs()
    }

    fn is_trainable(&self) -> bool {
        false
    }

    fn as_trainable(&self) -> Option<&dyn Trainable> {
        None
    }

    fn as_trainable_mut(&mut self) -> Option<&mut dyn Trainable> {
        None
    }
}

/// A layer owning weights and biases that an optimizer can update.
pub trait Trainable {
    fn id(&self) -> LayerId;

    fn weights(&self) -> &Tensor;

    fn biases(&self) -> &Tensor;

    fn d_weights(&self) -> Result<&Tensor>;

    fn d_biases(&self) -> Result<&Tensor>;

    fn regularizers(&self) -> Regularizers;

    /// Adds the given deltas to the weights and biases in place.
    fn apply_update(&mut self, weight_delta: &Tensor, bias_delta: &Tensor);
}
