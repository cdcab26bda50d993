use approx::assert_abs_diff_eq;
use backprop_core::layer::{Dense, Layer, Trainable};
use backprop_core::optimizers::{
    AdaGrad, AdaGradConfig, Adam, AdamConfig, LearningRate, Optimizer, OptimizerConfig, RmsProp,
    RmsPropConfig, Sgd, SgdConfig,
};
use backprop_core::{Error, Tensor};

/// A 1x2 layer with weights `[1, 2]`, zero biases and gradient `[0.5, -3]`
/// on both parameters.
fn layer_with_gradients() -> Dense {
    let mut layer = Dense::from_parameters(
        Tensor::new_2d(vec![1.0, 2.0], 1, 2),
        Tensor::zeros_2d(1, 2),
    ).unwrap();
    layer.forward(&Tensor::new_2d(vec![1.0], 1, 1), true).unwrap();
    layer.backward(&Tensor::new_2d(vec![0.5, -3.0], 1, 2)).unwrap();
    layer
}

#[cfg(test)]
mod learning_rate_tests {
    use super::*;

    #[test]
    fn test_decay_formula() {
        let mut schedule = LearningRate::new(1.0, 0.5).unwrap();
        assert_eq!(schedule.current(), 1.0);
        assert_eq!(schedule.iterations(), 0);

        schedule.step();
        assert_eq!(schedule.current(), 1.0);
        assert_eq!(schedule.iterations(), 1);

        schedule.step();
        assert_abs_diff_eq!(schedule.current(), 1.0 / 1.5, epsilon = 1e-12);
        schedule.step();
        assert_abs_diff_eq!(schedule.current(), 0.5, epsilon = 1e-12);
        assert_eq!(schedule.iterations(), 3);
        assert_eq!(schedule.initial(), 1.0);
    }

    #[test]
    fn test_zero_decay_keeps_rate() {
        let mut optimizer = Adam::with_learning_rate(0.01, 0.0).unwrap();
        for _ in 0..10 {
            optimizer.update_learning_rate();
        }
        assert_eq!(optimizer.current_learning_rate(), 0.01);
        assert_eq!(optimizer.iterations(), 10);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(LearningRate::new(0.0, 0.0).is_err());
        assert!(LearningRate::new(-1.0, 0.0).is_err());
        assert!(LearningRate::new(f64::NAN, 0.0).is_err());
        assert!(LearningRate::new(1.0, -0.1).is_err());
    }
}

#[cfg(test)]
mod adam_tests {
    use super::*;

    #[test]
    fn test_first_step_moves_each_parameter_by_learning_rate() {
        let mut layer = layer_with_gradients();
        let mut optimizer = Adam::with_learning_rate(0.01, 0.0).unwrap();
        optimizer.update_params(&mut layer).unwrap();

        assert_abs_diff_eq!(layer.weights().data[0], 1.0 - 0.01, epsilon = 1e-6);
        assert_abs_diff_eq!(layer.weights().data[1], 2.0 + 0.01, epsilon = 1e-6);
        assert_abs_diff_eq!(layer.biases().data[0], -0.01, epsilon = 1e-6);
        assert_abs_diff_eq!(layer.biases().data[1], 0.01, epsilon = 1e-6);
    }

    #[test]
    fn test_update_before_backward_is_an_error() {
        let mut layer = Dense::from_parameters(Tensor::ones_2d(2, 2), Tensor::zeros_2d(1, 2)).unwrap();
        let mut optimizer = Adam::new(AdamConfig::default()).unwrap();

        let result = optimizer.update_params(&mut layer);
        assert_eq!(result.unwrap_err(), Error::UnsetState("d_weights"));
        assert_eq!(layer.weights(), &Tensor::ones_2d(2, 2));
    }

    #[test]
    fn test_rejects_invalid_hyperparameters() {
        let invalid = [
            AdamConfig { learning_rate: 0.0, ..AdamConfig::default() },
            AdamConfig { decay: -1.0, ..AdamConfig::default() },
            AdamConfig { epsilon: 0.0, ..AdamConfig::default() },
            AdamConfig { beta_1: 1.0, ..AdamConfig::default() },
            AdamConfig { beta_2: -0.1, ..AdamConfig::default() },
        ];
        for config in invalid {
            assert!(matches!(Adam::new(config), Err(Error::InvalidArgument(_))));
        }
    }

    #[test]
    fn test_training_moves_toward_target() {
        // minimize (w - 3)^2 through a 1x1 dense layer fed a constant 1
        let mut layer = Dense::from_parameters(Tensor::zeros_2d(1, 1), Tensor::zeros_2d(1, 1)).unwrap();
        let mut optimizer = Adam::with_learning_rate(0.1, 0.0).unwrap();
        let input = Tensor::ones_2d(1, 1);

        for _ in 0..500 {
            let output = layer.forward(&input, true).unwrap();
            let gradient = output.map(|o| 2.0 * (o - 3.0));
            layer.backward(&gradient).unwrap();
            optimizer.update_params(&mut layer).unwrap();
            optimizer.update_learning_rate();
        }

        let output = layer.forward(&input, false).unwrap();
        assert_abs_diff_eq!(output.data[0], 3.0, epsilon = 0.05);
    }
}

#[cfg(test)]
mod sgd_tests {
    use super::*;

    #[test]
    fn test_plain_step() {
        let mut layer = layer_with_gradients();
        let mut optimizer = Sgd::with_learning_rate(0.5, 0.0).unwrap();
        optimizer.update_params(&mut layer).unwrap();

        assert_eq!(layer.weights().data, vec![0.75, 3.5]);
        assert_eq!(layer.biases().data, vec![-0.25, 1.5]);
    }

    #[test]
    fn test_momentum_state_is_per_layer() {
        let config = SgdConfig { learning_rate: 1.0, decay: 0.0, momentum: 0.5 };
        let mut optimizer = Sgd::new(config).unwrap();
        let mut first = layer_with_gradients();
        let mut second = layer_with_gradients();

        // velocity on `first` after two steps: -g, then 0.5 * -g - g
        optimizer.update_params(&mut first).unwrap();
        optimizer.update_params(&mut first).unwrap();
        assert_abs_diff_eq!(first.weights().data[0], 1.0 - 0.5 - 0.75, epsilon = 1e-12);

        // `second` starts from a zero velocity
        optimizer.update_params(&mut second).unwrap();
        assert_abs_diff_eq!(second.weights().data[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(second.weights().data[1], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reset_clears_momentum() {
        let mut optimizer = Sgd::new(SgdConfig { momentum: 0.9, ..SgdConfig::default() }).unwrap();
        let mut layer = layer_with_gradients();

        optimizer.update_params(&mut layer).unwrap();
        optimizer.reset();
        let before = layer.weights().data[0];
        optimizer.update_params(&mut layer).unwrap();

        assert_abs_diff_eq!(layer.weights().data[0], before - 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_momentum_of_one() {
        let config = SgdConfig { momentum: 1.0, ..SgdConfig::default() };
        assert!(Sgd::new(config).is_err());
    }
}

#[cfg(test)]
mod ada_grad_tests {
    use super::*;

    #[test]
    fn test_steps_shrink_as_cache_grows() {
        let mut layer = layer_with_gradients();
        let mut optimizer = AdaGrad::new(AdaGradConfig::default()).unwrap();

        optimizer.update_params(&mut layer).unwrap();
        assert_abs_diff_eq!(layer.weights().data[0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(layer.weights().data[1], 3.0, epsilon = 1e-6);

        optimizer.update_params(&mut layer).unwrap();
        let second_step = 1.0 / 2f64.sqrt();
        assert_abs_diff_eq!(layer.weights().data[0], -second_step, epsilon = 1e-6);
        assert_abs_diff_eq!(layer.weights().data[1], 3.0 + second_step, epsilon = 1e-6);
    }
}

#[cfg(test)]
mod rms_prop_tests {
    use super::*;

    #[test]
    fn test_first_step() {
        let mut layer = layer_with_gradients();
        let mut optimizer = RmsProp::with_learning_rate(0.01, 0.0).unwrap();
        optimizer.update_params(&mut layer).unwrap();

        let step = 0.01 / 0.1f64.sqrt();
        assert_abs_diff_eq!(layer.weights().data[0], 1.0 - step, epsilon = 1e-6);
        assert_abs_diff_eq!(layer.weights().data[1], 2.0 + step, epsilon = 1e-6);
    }

    #[test]
    fn test_rejects_rho_outside_unit_interval() {
        assert!(RmsProp::new(RmsPropConfig { rho: -0.1, ..RmsPropConfig::default() }).is_err());
        assert!(RmsProp::new(RmsPropConfig { rho: 1.0, ..RmsPropConfig::default() }).is_err());
    }
}

#[cfg(test)]
mod optimizer_config_tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: OptimizerConfig = serde_json::from_str(r#"{"type": "adam"}"#).unwrap();
        assert_eq!(config, OptimizerConfig::Adam(AdamConfig::default()));

        let config: OptimizerConfig = serde_json::from_str(r#"{"type": "rms_prop", "rho": 0.95}"#).unwrap();
        assert_eq!(config, OptimizerConfig::RmsProp(RmsPropConfig { rho: 0.95, ..RmsPropConfig::default() }));
    }

    #[test]
    fn test_build() {
        let config: OptimizerConfig =
            serde_json::from_str(r#"{"type": "sgd", "learning_rate": 0.1, "momentum": 0.9}"#).unwrap();
        let mut optimizer = config.build().unwrap();
        assert_eq!(optimizer.current_learning_rate(), 0.1);

        let mut layer = layer_with_gradients();
        optimizer.update_params(&mut layer).unwrap();
        assert_abs_diff_eq!(layer.weights().data[0], 1.0 - 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_build_validates() {
        let config: OptimizerConfig = serde_json::from_str(r#"{"type": "ada_grad", "epsilon": 0.0}"#).unwrap();
        assert!(matches!(config.build(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_unknown_type_fails_to_parse() {
        assert!(serde_json::from_str::<OptimizerConfig>(r#"{"type": "lion"}"#).is_err());
    }
}
