mod activation_function;
mod linear;
mod relu;
mod sigmoid;
mod softmax;

pub use self::activation_function::Activation;
pub use self::linear::Linear;
pub use self::relu::ReLU;
pub use self::sigmoid::Sigmoid;
pub use self::softmax::Softmax;
