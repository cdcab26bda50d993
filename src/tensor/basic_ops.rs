use std::ops::{Add, AddAssign, Neg, Sub};

use crate::tensor::Tensor;

fn elementwise(op: &str, lhs: &Tensor, rhs: &Tensor, f: impl Fn(f64, f64) -> f64) -> Tensor {
    assert_eq!(lhs.shape, rhs.shape, "Tensor {op}: shape mismatch {:?} vs {:?}", lhs.shape, rhs.shape);
    let data = lhs.data.iter().zip(&rhs.data).map(|(&a, &b)| f(a, b)).collect();
    Tensor::new(data, lhs.shape.clone())
}

impl Add for &Tensor {
    type Output = Tensor;

    fn add(self, rhs: &Tensor) -> Tensor {
        elementwise("add", self, rhs, |a, b| a + b)
    }
}

impl Add for Tensor {
    type Output = Tensor;

    fn add(self, rhs: Tensor) -> Tensor {
        &self + &rhs
    }
}

impl Sub for &Tensor {
    type Output = Tensor;

    fn sub(self, rhs: &Tensor) -> Tensor {
        elementwise("sub", self, rhs, |a, b| a - b)
    }
}

impl Sub for Tensor {
    type Output = Tensor;

    fn sub(self, rhs: Tensor) -> Tensor {
        &self - &rhs
    }
}

// in place, for parameter updates
impl AddAssign<&Tensor> for Tensor {
    fn add_assign(&mut self, rhs: &Tensor) {
        assert_eq!(self.shape, rhs.shape, "Tensor add_assign: shape mismatch {:?} vs {:?}", self.shape, rhs.shape);
        self.data.iter_mut().zip(&rhs.data).for_each(|(a, b)| *a += b);
    }
}

impl Neg for &Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        self.scale(-1.0)
    }
}
