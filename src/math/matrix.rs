use rand::prelude::*;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Wraps a single sample as a `1 × n` row matrix.
    pub fn row(values: Vec<f64>) -> Matrix {
        Matrix {
            rows: 1,
            cols: values.len(),
            data: vec![values]
        }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal(rng: &mut ThreadRng) -> f64 {
        // Both uniforms in (0, 1] so ln() never sees zero.
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    fn normal(rows: usize, cols: usize, std_dev: f64) -> Matrix {
        let mut rng = rand::thread_rng();
        let mut res = Matrix::zeros(rows, cols);
        for row in res.data.iter_mut() {
            for value in row.iter_mut() {
                *value = Matrix::sample_standard_normal(&mut rng) * std_dev;
            }
        }
        res
    }

    /// He initialization: samples from N(0, sqrt(2 / rows)).
    ///
    /// Used in front of ReLU layers. Weights are stored as `fan_in × fan_out`,
    /// so `rows` is the number of input connections.
    pub fn he(rows: usize, cols: usize) -> Matrix {
        Matrix::normal(rows, cols, (2.0 / rows as f64).sqrt())
    }

    /// Xavier (Glorot) initialization: samples from N(0, sqrt(1 / rows)).
    ///
    /// Used in front of the Softmax output layer.
    pub fn xavier(rows: usize, cols: usize) -> Matrix {
        Matrix::normal(rows, cols, (1.0 / rows as f64).sqrt())
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect()
        }
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map(|row| row.len()).unwrap_or(0),
            data
        }
    }

    /// Matrix product `self · rhs`.
    ///
    /// Loops run i-k-j so the inner loop walks both `rhs` and the output
    /// row contiguously; the 33856-wide input layer depends on this.
    pub fn dot(&self, rhs: &Matrix) -> Matrix {
        assert_eq!(self.cols, rhs.rows, "Matrices are of incorrect sizes");

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for (out_row, lhs_row) in res.data.iter_mut().zip(self.data.iter()) {
            for (&a, rhs_row) in lhs_row.iter().zip(rhs.data.iter()) {
                if a == 0.0 {
                    continue;
                }
                for (out, &b) in out_row.iter_mut().zip(rhs_row.iter()) {
                    *out += a * b;
                }
            }
        }

        res
    }

    /// In-place `self += other * factor`.
    pub fn add_scaled(&mut self, other: &Matrix, factor: f64) {
        assert_eq!(self.rows, other.rows, "Matrices are of incorrect sizes");
        assert_eq!(self.cols, other.cols, "Matrices are of incorrect sizes");

        for (row, other_row) in self.data.iter_mut().zip(other.data.iter()) {
            for (value, &o) in row.iter_mut().zip(other_row.iter()) {
                *value += o * factor;
            }
        }
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.rows, other.rows);
        assert_eq!(self.cols, other.cols);
        let data = self.data.iter().zip(other.data.iter())
            .map(|(row_a, row_b)| {
                row_a.iter().zip(row_b.iter()).map(|(x, y)| x * y).collect()
            })
            .collect();
        Matrix { rows: self.rows, cols: self.cols, data }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_matches_hand_computed_product() {
        let a = Matrix::from_data(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let b = Matrix::from_data(vec![vec![7.0, 8.0], vec![9.0, 10.0], vec![11.0, 12.0]]);
        let c = a.dot(&b);
        assert_eq!(c.rows, 2);
        assert_eq!(c.cols, 2);
        assert_eq!(c.data, vec![vec![58.0, 64.0], vec![139.0, 154.0]]);
    }

    #[test]
    fn transpose_swaps_shape() {
        let a = Matrix::from_data(vec![vec![1.0, 2.0, 3.0]]);
        let t = a.transpose();
        assert_eq!((t.rows, t.cols), (3, 1));
        assert_eq!(t.data, vec![vec![1.0], vec![2.0], vec![3.0]]);
    }

    #[test]
    fn add_scaled_accumulates_in_place() {
        let mut acc = Matrix::zeros(1, 2);
        let g = Matrix::row(vec![1.0, -2.0]);
        acc.add_scaled(&g, 1.0);
        acc.add_scaled(&g, 0.5);
        assert_eq!(acc.data, vec![vec![1.5, -3.0]]);
    }

    #[test]
    fn he_init_has_requested_shape_and_spread() {
        let w = Matrix::he(400, 50);
        assert_eq!((w.rows, w.cols), (400, 50));
        let n = (w.rows * w.cols) as f64;
        let mean: f64 = w.data.iter().flatten().sum::<f64>() / n;
        let var: f64 = w.data.iter().flatten().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        // Expected variance is 2 / 400.
        assert!((var - 0.005).abs() < 0.001, "variance {}", var);
    }

    #[test]
    #[should_panic(expected = "incorrect sizes")]
    fn dot_rejects_mismatched_shapes() {
        let a = Matrix::zeros(1, 3);
        let b = Matrix::zeros(2, 1);
        let _ = a.dot(&b);
    }
}
