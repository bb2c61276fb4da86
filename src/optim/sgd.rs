use crate::{math::matrix::Matrix, layers::dense::Layer};
use crate::optim::Optimizer;

/// Plain stochastic gradient descent.
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, _index: usize, layer: &mut Layer, weights_grad: &Matrix, biases_grad: &Matrix) {
        layer.weights.add_scaled(weights_grad, -self.learning_rate);
        layer.biases.add_scaled(biases_grad, -self.learning_rate);
    }
}
