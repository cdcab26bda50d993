use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::StandardNormal;

#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    pub data: Vec<f64>,
    pub shape: Vec<usize>,
}

impl Tensor {

    pub fn new(data: Vec<f64>, shape: Vec<usize>) -> Tensor {
        let expected_size: usize = shape.iter().product();
        assert_eq!(data.len(), expected_size,
            "Data length {} doesn't match shape {:?} (expected {})",
            data.len(), shape, expected_size);
        Tensor {
            data,
            shape,
        }
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rows(&self) -> usize {
        if self.shape.len() >= 1 { self.shape[0] } else { 1 }
    }

    pub fn cols(&self) -> usize {
        if self.shape.len() >= 2 { self.shape[1] } else { 1 }
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    pub fn ones(shape: Vec<usize>) -> Tensor {
        let size: usize = shape.iter().product();
        Tensor::new(vec![1.0; size], shape)
    }

    pub fn zeros(shape: Vec<usize>) -> Tensor {
        let size: usize = shape.iter().product();
        Tensor::new(vec![0.0; size], shape)
    }

    pub fn zeros_like(other: &Tensor) -> Tensor {
        Self::zeros(other.shape.clone())
    }

    /// Samples every element from the standard normal distribution.
    pub fn randn<R: Rng + ?Sized>(shape: Vec<usize>, rng: &mut R) -> Tensor {
        let size: usize = shape.iter().product();
        let data = (0..size)
            .map(|_| rng.sample::<f64, _>(StandardNormal))
            .collect::<Vec<f64>>();
        Tensor::new(data, shape)
    }

    /// Samples every element uniformly from `[low, high)`.
    pub fn uniform<R: Rng + ?Sized>(shape: Vec<usize>, low: f64, high: f64, rng: &mut R) -> Tensor {
        let size: usize = shape.iter().product();
        let uniform = Uniform::new(low, high);
        let data = (0..size)
            .map(|_| uniform.sample(rng))
            .collect::<Vec<f64>>();
        Tensor::new(data, shape)
    }

    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Tensor {
        let data = self.data.iter().map(|&x| f(x)).collect();
        Tensor::new(data, self.shape.clone())
    }

    pub fn zip_map<F: Fn(f64, f64) -> f64>(&self, other: &Tensor, f: F) -> Tensor {
        assert_eq!(self.shape, other.shape, "Tensor zip_map: shape mismatch {:?} vs {:?}", self.shape, other.shape);
        let data = self.data.iter().zip(other.data.iter()).map(|(&a, &b)| f(a, b)).collect();
        Tensor::new(data, self.shape.clone())
    }

    pub fn scale(&self, scalar: f64) -> Tensor {
        self.map(|x| x * scalar)
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    pub fn mean(&self) -> f64 {
        self.sum() / self.size() as f64
    }

    pub fn square(&self) -> Tensor {
        self.map(|x| x * x)
    }

    pub fn abs(&self) -> Tensor {
        self.map(f64::abs)
    }

    pub fn clip(&self, min: f64, max: f64) -> Tensor {
        self.map(|x| x.max(min).min(max))
    }

    // Element wise multiplication
    pub fn hadamard(&self, other: &Tensor) -> Tensor {
        self.zip_map(other, |a, b| a * b)
    }

    pub fn relu(&self) -> Tensor {
        self.map(|x| if x > 0.0 { x } else { 0.0 })
    }

    pub fn sigmoid(&self) -> Tensor {
        self.map(|x| 1.0 / (1.0 + (-x).exp()))
    }

    /// `-1.0` for negative elements, `1.0` otherwise (zero included).
    pub fn sign(&self) -> Tensor {
        self.map(|x| if x < 0.0 { -1.0 } else { 1.0 })
    }

    pub fn all_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

}
