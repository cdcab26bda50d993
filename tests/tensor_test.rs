use backprop_core::Tensor;
use rand::SeedableRng;
use rand_pcg::Pcg64;

// Helper function to compare tensors with floating point tolerance
fn tensors_equal(a: &Tensor, b: &Tensor, tolerance: f64) -> bool {
    if a.shape != b.shape {
        return false;
    }

    a.data.iter()
        .zip(b.data.iter())
        .all(|(x, y)| (x - y).abs() < tolerance)
}

#[cfg(test)]
mod tensor_tests {
    use super::*;

    // CONSTRUCTOR TESTS
    #[test]
    fn test_new_2d_constructor() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let tensor = Tensor::new_2d(data.clone(), 2, 3);

        assert_eq!(tensor.dims(), (2, 3));
        assert_eq!(tensor.size(), 6);
        assert_eq!(tensor.data, data);
    }

    #[test]
    #[should_panic(expected = "doesn't match shape")]
    fn test_new_rejects_wrong_length() {
        Tensor::new_2d(vec![1.0, 2.0, 3.0], 2, 2);
    }

    #[test]
    fn test_from_rows() {
        let tensor = Tensor::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);
        assert_eq!(tensor.dims(), (3, 2));
        assert_eq!(tensor.row(1), &[3.0, 4.0]);
        assert_eq!(tensor.get(2, 0), 5.0);
    }

    #[test]
    fn test_zeros_and_ones() {
        assert_eq!(Tensor::zeros_2d(3, 2).data, vec![0.0; 6]);
        assert_eq!(Tensor::ones_2d(2, 3).data, vec![1.0; 6]);

        let like = Tensor::zeros_like(&Tensor::ones_2d(4, 5));
        assert_eq!(like.dims(), (4, 5));
        assert_eq!(like.sum(), 0.0);
    }

    #[test]
    fn test_randn_is_reproducible_with_same_seed() {
        let a = Tensor::randn(vec![3, 4], &mut Pcg64::seed_from_u64(42));
        let b = Tensor::randn(vec![3, 4], &mut Pcg64::seed_from_u64(42));
        let c = Tensor::randn(vec![3, 4], &mut Pcg64::seed_from_u64(43));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_uniform_stays_in_range() {
        let tensor = Tensor::uniform(vec![10, 10], -0.5, 0.5, &mut Pcg64::seed_from_u64(7));
        assert!(tensor.data.iter().all(|&x| (-0.5..0.5).contains(&x)));
    }

    // BASIC OPERATIONS TESTS
    #[test]
    fn test_transpose() {
        let tensor = Tensor::new_2d(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        let transposed = tensor.transpose();

        assert_eq!(transposed.dims(), (3, 2));
        assert_eq!(transposed.data, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_scale_and_neg() {
        let tensor = Tensor::new_2d(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        assert_eq!(tensor.scale(2.0).data, vec![2.0, 4.0, 6.0, 8.0]);
        assert_eq!((-&tensor).data, vec![-1.0, -2.0, -3.0, -4.0]);
    }

    #[test]
    fn test_add_and_sub() {
        let a = Tensor::new_2d(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        let b = Tensor::new_2d(vec![4.0, 3.0, 2.0, 1.0], 2, 2);

        assert_eq!((&a + &b).data, vec![5.0; 4]);
        assert_eq!((&a - &b).data, vec![-3.0, -1.0, 1.0, 3.0]);
        assert_eq!((a.clone() + b.clone()).data, vec![5.0; 4]);

        let mut c = a.clone();
        c += &b;
        assert_eq!(c.data, vec![5.0; 4]);
    }

    #[test]
    #[should_panic(expected = "shape mismatch")]
    fn test_add_assign_dimension_mismatch() {
        let mut a = Tensor::zeros_2d(2, 2);
        a += &Tensor::zeros_2d(1, 2);
    }

    #[test]
    fn test_sign_treats_zero_as_positive() {
        let tensor = Tensor::new_2d(vec![-2.0, 0.0, 3.0], 1, 3);
        assert_eq!(tensor.sign().data, vec![-1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_clip() {
        let tensor = Tensor::new_2d(vec![-1.0, 0.5, 2.0], 1, 3);
        assert_eq!(tensor.clip(0.0, 1.0).data, vec![0.0, 0.5, 1.0]);
    }

    // HADAMARD TESTS
    #[test]
    fn test_hadamard_basic_2x2() {
        let a = Tensor::new_2d(vec![2.0, 3.0, 4.0, 5.0], 2, 2);
        let b = Tensor::new_2d(vec![1.0, 2.0, 3.0, 4.0], 2, 2);

        let result = a.hadamard(&b);
        let expected = Tensor::new_2d(vec![2.0, 6.0, 12.0, 20.0], 2, 2);

        assert!(tensors_equal(&result, &expected, 1e-10));
    }

    #[test]
    fn test_hadamard_commutative_property() {
        let a = Tensor::new_2d(vec![1.5, -2.0, 0.0, 4.25], 2, 2);
        let b = Tensor::new_2d(vec![-3.0, 0.5, 7.0, 2.0], 2, 2);

        assert!(tensors_equal(&a.hadamard(&b), &b.hadamard(&a), 1e-12));
    }

    #[test]
    #[should_panic(expected = "shape mismatch")]
    fn test_hadamard_dimension_mismatch() {
        let a = Tensor::new_2d(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        let b = Tensor::new_2d(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        a.hadamard(&b);
    }

    // MATRIX MULTIPLICATION TESTS
    #[test]
    fn test_basic_matrix_multiplication() {
        let a = Tensor::new_2d(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        let b = Tensor::new_2d(vec![5.0, 6.0, 7.0, 8.0], 2, 2);

        // Expected result: [[19, 22], [43, 50]]
        let expected = Tensor::new_2d(vec![19.0, 22.0, 43.0, 50.0], 2, 2);

        assert!(tensors_equal(&a.matmul(&b), &expected, 1e-12));
    }

    #[test]
    fn test_identity_matrix_multiplication() {
        let a = Tensor::new_2d(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        let identity = Tensor::new_2d(vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0], 3, 3);

        assert!(tensors_equal(&a.matmul(&identity), &a, 1e-12));
    }

    #[test]
    fn test_rectangular_matrix_multiplication() {
        // (1x2) * (2x3)
        let a = Tensor::new_2d(vec![1.0, 2.0], 1, 2);
        let b = Tensor::new_2d(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);

        let result = a.matmul(&b);
        assert_eq!(result.dims(), (1, 3));
        assert_eq!(result.data, vec![9.0, 12.0, 15.0]);
    }

    #[test]
    #[should_panic(expected = "Matrix dimensions don't match")]
    fn test_matrix_multiplication_dimension_mismatch() {
        let a = Tensor::new_2d(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        let b = Tensor::new_2d(vec![1.0, 2.0, 3.0], 3, 1);
        a.matmul(&b);
    }

    // AXIS TESTS
    #[test]
    fn test_add_row_broadcasts_over_batch() {
        let a = Tensor::new_2d(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);
        let bias = Tensor::new_2d(vec![10.0, 20.0], 1, 2);

        assert_eq!(a.add_row(&bias).data, vec![11.0, 22.0, 13.0, 24.0, 15.0, 26.0]);
    }

    #[test]
    fn test_sum_rows_keeps_row_vector() {
        let a = Tensor::new_2d(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);
        let sums = a.sum_rows();

        assert_eq!(sums.dims(), (1, 2));
        assert_eq!(sums.data, vec![9.0, 12.0]);
    }

    #[test]
    fn test_mean_cols() {
        let a = Tensor::new_2d(vec![1.0, 3.0, 2.0, 6.0], 2, 2);
        let means = a.mean_cols();

        assert_eq!(means.dims(), (2, 1));
        assert_eq!(means.data, vec![2.0, 4.0]);
    }

    #[test]
    fn test_argmax_rows() {
        let a = Tensor::new_2d(vec![0.1, 0.7, 0.2, 0.9, 0.05, 0.05], 2, 3);
        assert_eq!(a.argmax_rows(), vec![1, 0]);
    }

    #[test]
    fn test_softmax_rows_is_shift_invariant() {
        let a = Tensor::new_2d(vec![1.0, 2.0, 3.0], 1, 3);
        let shifted = Tensor::new_2d(vec![1001.0, 1002.0, 1003.0], 1, 3);

        let expected = a.softmax_rows();
        let result = shifted.softmax_rows();

        assert!(result.all_finite());
        assert!(tensors_equal(&result, &expected, 1e-12));
        assert!((result.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_softmax_jacobian() {
        let jacobian = Tensor::softmax_jacobian(&[0.2, 0.8]);
        let expected = Tensor::new_2d(vec![0.16, -0.16, -0.16, 0.16], 2, 2);

        assert!(tensors_equal(&jacobian, &expected, 1e-12));
    }
}
