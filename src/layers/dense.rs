use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};

#[derive(Debug, Serialize, Deserialize)]
pub struct Layer{
    pub size: usize,
    /// Shape `input_size × size`.
    pub weights: Matrix,
    /// Shape `1 × size`.
    pub biases: Matrix,
    pub activator: ActivationFunction,
    /// Fraction of this layer's outputs zeroed during training passes.
    #[serde(default)]
    pub dropout: Option<f64>,
    /// Output of the last training pass (after dropout), fed to the next layer's gradient.
    #[serde(skip)]
    pub neurons: Matrix,
    #[serde(skip)]
    pre_neurons: Matrix,  // pre-activation values (z = Wx + b) needed for correct derivative
    #[serde(skip)]
    dropout_mask: Option<Matrix>,
}

impl Layer {
    pub fn new(size: usize, input_size: usize, activation: ActivationFunction) -> Layer {
        let weights = match activation {
            ActivationFunction::ReLU => Matrix::he(input_size, size),
            ActivationFunction::Softmax => Matrix::xavier(input_size, size),
        };

        Layer {
            size,
            weights,
            biases: Matrix::zeros(1, size),
            activator: activation,
            dropout: None,
            neurons: Matrix::zeros(1, size),
            pre_neurons: Matrix::zeros(1, size),
            dropout_mask: None,
        }
    }

    pub fn with_dropout(mut self, rate: f64) -> Layer {
        self.dropout = if rate > 0.0 { Some(rate.min(0.95)) } else { None };
        self
    }

    pub fn input_size(&self) -> usize {
        self.weights.rows
    }

    fn linear(&self, input: Vec<f64>) -> Matrix {
        let mut z = Matrix::row(input).dot(&self.weights);
        z.add_scaled(&self.biases, 1.0);
        z
    }

    /// Training pass: caches z and the (dropped-out) activation for backprop.
    pub fn feed_from(&mut self, input: Vec<f64>) -> Vec<f64> {
        let z = self.linear(input);
        let mut a = Matrix::row(self.activator.apply(&z.data[0]));

        self.dropout_mask = self.dropout.map(|rate| {
            // Inverted dropout: survivors are scaled so inference needs no rescale.
            let keep = 1.0 - rate;
            let mut rng = rand::thread_rng();
            let mask: Vec<f64> = (0..self.size)
                .map(|_| if rng.gen::<f64>() < rate { 0.0 } else { 1.0 / keep })
                .collect();
            Matrix::row(mask)
        });
        if let Some(mask) = &self.dropout_mask {
            a = a.hadamard(mask);
        }

        self.pre_neurons = z;
        self.neurons = a.clone();
        a.data.swap_remove(0)
    }

    /// Inference pass: no caching, no dropout.
    pub fn infer(&self, input: Vec<f64>) -> Vec<f64> {
        let z = self.linear(input);
        self.activator.apply(&z.data[0])
    }

    /// Computes gradient adjustments. Returns (weights_grad, biases_grad).
    /// `next_layer_delta` is ∂L/∂a for this layer (error in activation space).
    pub fn compute_gradients(
        &self,
        next_layer_delta: Matrix,
        inputs: &Matrix,
    ) -> (Matrix, Matrix) {
        let next_layer_delta = match &self.dropout_mask {
            Some(mask) => next_layer_delta.hadamard(mask),
            None => next_layer_delta,
        };
        let act_derivative = self.pre_neurons.map(|x| self.activator.derivative(x));
        // δ = error ⊙ σ'(z)
        let layer_delta = next_layer_delta.hadamard(&act_derivative);

        let weights_adjustment = inputs.transpose().dot(&layer_delta);
        let biases_adjustment = layer_delta;

        (weights_adjustment, biases_adjustment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_and_feed_from_agree_without_dropout() {
        let mut layer = Layer::new(3, 4, ActivationFunction::ReLU);
        let input = vec![0.1, 0.5, -0.2, 0.9];
        let a = layer.infer(input.clone());
        let b = layer.feed_from(input);
        assert_eq!(a, b);
    }

    #[test]
    fn dropout_zeroes_or_rescales_every_output() {
        let mut layer = Layer::new(200, 2, ActivationFunction::ReLU).with_dropout(0.5);
        let input = vec![1.0, 1.0];
        let clean = layer.infer(input.clone());
        let dropped = layer.feed_from(input);
        for (c, d) in clean.iter().zip(dropped.iter()) {
            assert!(*d == 0.0 || (d - c * 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn gradients_have_parameter_shapes() {
        let mut layer = Layer::new(2, 3, ActivationFunction::Softmax);
        let input = vec![0.2, 0.4, 0.6];
        layer.feed_from(input.clone());
        let delta = Matrix::row(vec![0.3, -0.3]);
        let (w, b) = layer.compute_gradients(delta, &Matrix::row(input));
        assert_eq!((w.rows, w.cols), (3, 2));
        assert_eq!((b.rows, b.cols), (1, 2));
        // Softmax passes the combined CE delta through unchanged.
        assert_eq!(b.data[0], vec![0.3, -0.3]);
        assert!((w.data[2][0] - 0.6 * 0.3).abs() < 1e-12);
    }

    #[test]
    fn dropout_survives_serialization() {
        let layer = Layer::new(2, 2, ActivationFunction::ReLU).with_dropout(0.3);
        let json = serde_json::to_string(&layer).unwrap();
        let back: Layer = serde_json::from_str(&json).unwrap();
        assert_eq!(back.dropout, Some(0.3));
        assert_eq!(back.weights, layer.weights);
    }
}
