use backprop_core::activation_functions::{Activation, ReLU, Sigmoid};
use backprop_core::helpers::accuracy;
use backprop_core::layer::{Dense, DenseConfig, Layer};
use backprop_core::loss_functions::{BinaryCrossEntropy, LossFunction};
use backprop_core::optimizers::{Adam, Optimizer};
use backprop_core::Tensor;

use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_pcg::Pcg64;
use tracing::info;
use tracing_subscriber::EnvFilter;

const EPOCHS: usize = 10_001;
const LEARNING_RATE: f64 = 0.001;

/// Two interleaved spirals, one per class. Labels are a `samples*classes x 1` column.
fn spiral_data(samples: usize, classes: usize, rng: &mut Pcg64) -> (Tensor, Tensor) {
    let mut points = Vec::with_capacity(samples * classes * 2);
    let mut labels = Vec::with_capacity(samples * classes);
    for class in 0..classes {
        for i in 0..samples {
            let fraction = i as f64 / (samples - 1) as f64;
            let radius = fraction;
            let noise: f64 = rng.sample(StandardNormal);
            let theta = (class as f64 + fraction) * 4.0 + noise * 0.2;
            points.push(radius * (theta * 2.5).sin());
            points.push(radius * (theta * 2.5).cos());
            labels.push(class as f64);
        }
    }
    let rows = samples * classes;
    (Tensor::new_2d(points, rows, 2), Tensor::new_2d(labels, rows, 1))
}

fn main() -> backprop_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut rng = Pcg64::seed_from_u64(0);
    let (x, y) = spiral_data(100, 2, &mut rng);

    let mut dense1 = Dense::new(
        DenseConfig::new(2, 64)
            .weight_regularizer_l2(5e-4)
            .bias_regularizer_l2(5e-4)
            .name("dense1"),
        &mut rng,
    )?;
    let mut relu1 = ReLU::with_name("relu1");
    let mut dense2 = Dense::new(DenseConfig::new(64, 1).name("dense2"), &mut rng)?;
    let mut sigmoid1 = Sigmoid::with_name("sigmoid1");

    let loss_function = BinaryCrossEntropy;
    let mut optimizer = Adam::with_learning_rate(LEARNING_RATE, 5e-7)?;

    for epoch in 0..EPOCHS {
        let out = dense1.forward(&x, true)?;
        let out = relu1.forward(&out, true)?;
        let out = dense2.forward(&out, true)?;
        let output = sigmoid1.forward(&out, true)?;

        let data_loss = loss_function.calculate(&output, &y)?;
        let regularization_loss =
            loss_function.regularization_loss(&dense1) + loss_function.regularization_loss(&dense2);
        let loss = data_loss + regularization_loss;
        let acc = accuracy(&sigmoid1.predictions(&output)?, &y)?;

        if epoch % 100 == 0 {
            info!(
                epoch,
                accuracy = %format!("{acc:.3}"),
                loss = %format!("{loss:.3}"),
                learning_rate = optimizer.current_learning_rate(),
                "epoch {epoch}/{EPOCHS}"
            );
        }

        let grad = loss_function.backward(&output, &y)?;
        let grad = sigmoid1.backward(&grad)?;
        let grad = dense2.backward(&grad)?;
        let grad = relu1.backward(&grad)?;
        dense1.backward(&grad)?;

        optimizer.update_params(&mut dense1)?;
        optimizer.update_params(&mut dense2)?;
        optimizer.update_learning_rate();
    }

    let (x_test, y_test) = spiral_data(100, 2, &mut rng);

    let out = dense1.forward(&x_test, false)?;
    let out = relu1.forward(&out, false)?;
    let out = dense2.forward(&out, false)?;
    let output = sigmoid1.forward(&out, false)?;

    let val_loss = loss_function.calculate(&output, &y_test)?;
    let val_acc = accuracy(&sigmoid1.predictions(&output)?, &y_test)?;
    info!(val_acc, val_loss, "validation");

    for layer in [&dense1 as &dyn Layer, &relu1, &dense2, &sigmoid1] {
        info!("{}", layer.details());
    }
    Ok(())
}
