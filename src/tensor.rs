mod basic_ops;
mod tensor;
mod tensor_2d;

pub use self::tensor::Tensor;
