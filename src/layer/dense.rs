use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::layer::{cached, check_matrix, check_shape, describe, Layer, LayerId, LayerState, Regularizers, Trainable};
use crate::tensor::Tensor;

const WEIGHT_INIT_SCALE: f64 = 0.1;

fn default_trainable() -> bool {
    true
}

/// Construction parameters for a [`Dense`] layer.
///
/// Every regularizer defaults to `0.0` and `trainable` defaults to `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseConfig {
    pub input_size: usize,
    pub n_neurons: usize,
    #[serde(default)]
    pub weight_regularizer_l1: f64,
    #[serde(default)]
    pub bias_regularizer_l1: f64,
    #[serde(default)]
    pub weight_regularizer_l2: f64,
    #[serde(default)]
    pub bias_regularizer_l2: f64,
    #[serde(default = "default_trainable")]
    pub trainable: bool,
    #[serde(default)]
    pub name: Option<String>,
}

impl DenseConfig {
    pub fn new(input_size: usize, n_neurons: usize) -> Self {
        DenseConfig {
            input_size,
            n_neurons,
            weight_regularizer_l1: 0.0,
            bias_regularizer_l1: 0.0,
            weight_regularizer_l2: 0.0,
            bias_regularizer_l2: 0.0,
            trainable: true,
            name: None,
        }
    }

    pub fn weight_regularizer_l1(mut self, value: f64) -> Self {
        self.weight_regularizer_l1 = value;
        self
    }

    pub fn bias_regularizer_l1(mut self, value: f64) -> Self {
        self.bias_regularizer_l1 = value;
        self
    }

    pub fn weight_regularizer_l2(mut self, value: f64) -> Self {
        self.weight_regularizer_l2 = value;
        self
    }

    pub fn bias_regularizer_l2(mut self, value: f64) -> Self {
        self.bias_regularizer_l2 = value;
        self
    }

    pub fn trainable(mut self, trainable: bool) -> Self {
        self.trainable = trainable;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn regularizers(&self) -> Regularizers {
        Regularizers {
            weight_l1: self.weight_regularizer_l1,
            weight_l2: self.weight_regularizer_l2,
            bias_l1: self.bias_regularizer_l1,
            bias_l2: self.bias_regularizer_l2,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            return Err(Error::invalid("input_size must be a positive integer"));
        }
        if self.n_neurons == 0 {
            return Err(Error::invalid("n_neurons must be a positive integer"));
        }
        self.regularizers().validate()
    }
}

/// Fully connected layer computing `inputs · weights + biases`.
#[derive(Debug)]
pub struct Dense {
    id: LayerId,
    state: LayerState,
    trainable: bool,
    weights: Tensor,
    biases: Tensor,
    d_weights: Option<Tensor>,
    d_biases: Option<Tensor>,
    regularizers: Regularizers,
}

impl Dense {
    /// Builds a layer with weights drawn from `0.1 * N(0, 1)` and zero biases.
    pub fn new<R: Rng + ?Sized>(config: DenseConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let weights = Tensor::randn(vec![config.input_size, config.n_neurons], rng).scale(WEIGHT_INIT_SCALE);
        let biases = Tensor::zeros_2d(1, config.n_neurons);
        let layer = Dense {
            id: LayerId::next(),
            state: LayerState::named(config.name.clone()),
            trainable: config.trainable,
            weights,
            biases,
            d_weights: None,
            d_biases: None,
            regularizers: config.regularizers(),
        };
        debug!(
            id = ?layer.id,
            input_size = config.input_size,
            n_neurons = config.n_neurons,
            regularizers = ?layer.regularizers,
            "created dense layer"
        );
        Ok(layer)
    }

    /// Builds a layer around existing parameters.
    ///
    /// `weights` must be a non-empty `input_size x n_neurons` matrix and
    /// `biases` a `1 x n_neurons` row.
    pub fn from_parameters(weights: Tensor, biases: Tensor) -> Result<Self> {
        check_matrix("dense weights", &weights)?;
        check_shape("dense biases", &[1, weights.cols()], &biases)?;
        Ok(Dense {
            id: LayerId::next(),
            state: LayerState::default(),
            trainable: true,
            weights,
            biases,
            d_weights: None,
            d_biases: None,
            regularizers: Regularizers::default(),
        })
    }

    pub fn with_regularizers(mut self, regularizers: Regularizers) -> Result<Self> {
        regularizers.validate()?;
        self.regularizers = regularizers;
        Ok(self)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.state.name = Some(name.into());
        self
    }

    pub fn set_trainable(&mut self, trainable: bool) {
        self.trainable = trainable;
    }

    pub fn input_size(&self) -> usize {
        self.weights.rows()
    }

    pub fn n_neurons(&self) -> usize {
        self.weights.cols()
    }
}

impl Clone for Dense {
    // A clone is a distinct layer and must not share optimizer state.
    fn clone(&self) -> Self {
        Dense {
            id: LayerId::next(),
            state: self.state.clone(),
            trainable: self.trainable,
            weights: self.weights.clone(),
            biases: self.biases.clone(),
            d_weights: self.d_weights.clone(),
            d_biases: self.d_biases.clone(),
            regularizers: self.regularizers,
        }
    }
}

impl Layer for Dense {
    fn forward(&mut self, inputs: &Tensor, _training: bool) -> Result<Tensor> {
        check_matrix("dense forward", inputs)?;
        check_shape("dense forward", &[inputs.rows(), self.input_size()], inputs)?;

        let output = inputs.matmul(&self.weights).add_row(&self.biases);
        trace!(id = ?self.id, input = ?inputs.shape(), output = ?output.shape(), "dense forward");

        self.state.inputs = Some(inputs.clone());
        self.state.output = Some(output.clone());
        Ok(output)
    }

    fn backward(&mut self, gradient: &Tensor) -> Result<Tensor> {
        let inputs = self.state.inputs()?;
        check_shape("dense backward", &[inputs.rows(), self.n_neurons()], gradient)?;

        let mut d_weights = inputs.transpose().matmul(gradient);
        let mut d_biases = gradient.sum_rows();

        let reg = self.regularizers;
        if reg.weight_l1 > 0.0 {
            d_weights = &d_weights + &self.weights.sign().scale(reg.weight_l1);
        }
        if reg.weight_l2 > 0.0 {
            d_weights = &d_weights + &self.weights.scale(2.0 * reg.weight_l2);
        }
        if reg.bias_l1 > 0.0 {
            d_biases = &d_biases + &self.biases.sign().scale(reg.bias_l1);
        }
        if reg.bias_l2 > 0.0 {
            d_biases = &d_biases + &self.biases.scale(2.0 * reg.bias_l2);
        }

        let d_inputs = gradient.matmul(&self.weights.transpose());
        trace!(id = ?self.id, gradient = ?gradient.shape(), d_inputs = ?d_inputs.shape(), "dense backward");

        self.d_weights = Some(d_weights);
        self.d_biases = Some(d_biases);
        self.state.d_inputs = Some(d_inputs.clone());
        Ok(d_inputs)
    }

    fn details(&self) -> String {
        describe(&self.state, "Dense", Some(self.n_neurons()))
    }

    fn state(&self) -> &LayerState {
        &self.state
    }

    fn is_trainable(&self) -> bool {
        self.trainable
    }

    fn as_trainable(&self) -> Option<&dyn Trainable> {
        Some(self)
    }

    fn as_trainable_mut(&mut self) -> Option<&mut dyn Trainable> {
        Some(self)
    }
}

impl Trainable for Dense {
    fn id(&self) -> LayerId {
        self.id
    }

    fn weights(&self) -> &Tensor {
        &self.weights
    }

    fn biases(&self) -> &Tensor {
        &self.biases
    }

    fn d_weights(&self) -> Result<&Tensor> {
        cached(&self.d_weights, "d_weights")
    }

    fn d_biases(&self) -> Result<&Tensor> {
        cached(&self.d_biases, "d_biases")
    }

    fn regularizers(&self) -> Regularizers {
        self.regularizers
    }

    fn apply_update(&mut self, weight_delta: &Tensor, bias_delta: &Tensor) {
        self.weights += weight_delta;
        self.biases += bias_delta;
    }
}
