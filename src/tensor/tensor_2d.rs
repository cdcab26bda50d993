use crate::tensor::Tensor;

impl Tensor {

    pub fn new_2d(data: Vec<f64>, rows: usize, cols: usize) -> Tensor {
        Self::new(data, vec![rows, cols])
    }

    pub fn zeros_2d(rows: usize, cols: usize) -> Tensor {
        Self::zeros(vec![rows, cols])
    }

    pub fn ones_2d(rows: usize, cols: usize) -> Tensor {
        Self::ones(vec![rows, cols])
    }

    /// Builds a matrix from equally sized rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Tensor {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            assert_eq!(row.len(), cols, "from_rows: ragged row of length {} (expected {})", row.len(), cols);
            data.extend_from_slice(row);
        }
        Tensor::new_2d(data, rows.len(), cols)
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols() + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let cols = self.cols();
        &self.data[row * cols..(row + 1) * cols]
    }

    pub fn matmul(&self, matrix: &Tensor) -> Tensor {
        let c1 = self.cols();
        let r1 = self.rows();
        let c2 = matrix.cols();
        let r2 = matrix.rows();

        assert_eq!(c1, r2, "Matrix dimensions don't match: {}x{} * {}x{}", r1, c1, r2, c2);

        let mut result = vec![0.0; r1 * c2];

        for i in 0..r1 {
            for k in 0..c1 {
                let a = self.data[i * c1 + k];
                for j in 0..c2 {
                    result[i * c2 + j] += a * matrix.data[k * c2 + j];
                }
            }
        }
        Tensor::new_2d(result, r1, c2)
    }

    pub fn transpose(&self) -> Tensor {
        assert_eq!(self.rank(), 2, "Transpose only supported for 2D tensors");
        let rows = self.rows();
        let cols = self.cols();
        let mut data = vec![0.0; rows * cols];
        for i in 0..rows {
            for j in 0..cols {
                data[j * rows + i] = self.data[i * cols + j];
            }
        }
        Tensor::new_2d(data, cols, rows)
    }

    /// Adds a `1 x cols` row vector to every row.
    pub fn add_row(&self, row: &Tensor) -> Tensor {
        assert_eq!(row.dims(), (1, self.cols()), "add_row: expected 1x{} row, got {:?}", self.cols(), row.shape);
        let cols = self.cols();
        let data = self.data.iter().enumerate().map(|(i, x)| x + row.data[i % cols]).collect();
        Tensor::new(data, self.shape.clone())
    }

    /// Sums over the batch axis, keeping a `1 x cols` row.
    pub fn sum_rows(&self) -> Tensor {
        let cols = self.cols();
        let mut sums = vec![0.0; cols];
        for chunk in self.data.chunks(cols) {
            for (acc, x) in sums.iter_mut().zip(chunk) {
                *acc += x;
            }
        }
        Tensor::new_2d(sums, 1, cols)
    }

    /// Mean of every row, as a `rows x 1` column.
    pub fn mean_cols(&self) -> Tensor {
        let cols = self.cols();
        let data = self.data.chunks(cols).map(|row| row.iter().sum::<f64>() / cols as f64).collect();
        Tensor::new_2d(data, self.rows(), 1)
    }

    pub fn argmax_rows(&self) -> Vec<usize> {
        (0..self.rows())
            .map(|r| {
                let row = self.row(r);
                let mut max_idx = 0;
                let mut max_val = row[0];
                for (i, &val) in row.iter().enumerate() {
                    if val > max_val {
                        max_val = val;
                        max_idx = i;
                    }
                }
                max_idx
            })
            .collect()
    }

    /// Row-wise softmax, shifted by each row's maximum before exponentiating.
    pub fn softmax_rows(&self) -> Tensor {
        let cols = self.cols();
        let mut data = Vec::with_capacity(self.size());
        for row in self.data.chunks(cols) {
            let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let exp_vals: Vec<f64> = row.iter().map(|&x| (x - max).exp()).collect();
            let sum: f64 = exp_vals.iter().sum();
            data.extend(exp_vals.iter().map(|&x| x / sum));
        }
        Tensor::new(data, self.shape.clone())
    }

    // diag(s) - s * s^T for a single softmax output row
    pub fn softmax_jacobian(softmax: &[f64]) -> Tensor {
        let len = softmax.len();
        let mut jacobian = vec![0.0; len * len];

        for i in 0..len {
            for j in 0..len {
                let s_i = softmax[i];
                let s_j = softmax[j];
                jacobian[i * len + j] = if i == j {
                    s_i * (1.0 - s_i)
                } else {
                    -s_i * s_j
                };
            }
        }

        Tensor::new_2d(jacobian, len, len)
    }

}
