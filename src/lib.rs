//! Feed-forward neural network training core: dense and dropout layers,
//! activations, losses and optimizers with hand-derived gradients, composed
//! into a manual backpropagation loop.

pub mod activation_functions;
pub mod error;
pub mod helpers;
pub mod layer;
pub mod loss_functions;
pub mod mlp;
pub mod optimizers;
pub mod tensor;

pub use error::{Error, Result};
pub use tensor::Tensor;
