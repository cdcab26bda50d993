mod ada_grad;
mod adam;
mod optimizer;
mod rms_prop;
mod sgd;

pub use self::ada_grad::{AdaGrad, AdaGradConfig};
pub use self::adam::{Adam, AdamConfig};
pub use self::optimizer::{LearningRate, Optimizer, OptimizerConfig};
pub use self::rms_prop::{RmsProp, RmsPropConfig};
pub use self::sgd::{Sgd, SgdConfig};
