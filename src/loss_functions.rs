mod loss_function;

pub use self::loss_function::{BinaryCrossEntropy, CategoricalCrossEntropy, LossFunction, MeanSquaredError, CLIP_EPSILON};
