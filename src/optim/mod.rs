pub mod sgd;
pub mod adam;

pub use sgd::Sgd;
pub use adam::Adam;

use std::fmt;

use crate::{math::matrix::Matrix, layers::dense::Layer};

/// A parameter update rule applied once per mini-batch.
///
/// `index` identifies the layer so stateful optimizers can keep per-layer
/// moments; the gradients are already averaged over the batch.
pub trait Optimizer {
    /// Called once before the per-layer updates of each mini-batch.
    fn begin_step(&mut self) {}

    fn step(&mut self, index: usize, layer: &mut Layer, weights_grad: &Matrix, biases_grad: &Matrix);
}

/// Which update rule a training run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizerKind {
    #[default]
    Adam,
    Sgd,
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizerKind::Adam => write!(f, "adam"),
            OptimizerKind::Sgd => write!(f, "sgd"),
        }
    }
}
