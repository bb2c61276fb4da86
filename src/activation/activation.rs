use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    ReLU,
    /// Softmax is vector-valued; `apply()` normalizes the whole row instead
    /// of mapping element-wise.
    Softmax,
}

impl ActivationFunction {
    /// Applies the activation to one row of pre-activation values.
    pub fn apply(&self, z: &[f64]) -> Vec<f64> {
        match self {
            ActivationFunction::ReLU => z.iter().map(|&x| if x > 0.0 { x } else { 0.0 }).collect(),
            ActivationFunction::Softmax => softmax(z),
        }
    }

    /// Element-wise derivative of the activation.
    ///
    /// For `Softmax`, the layer pairs it with cross-entropy and the combined
    /// gradient is `predicted - expected` (already computed by
    /// `CrossEntropyLoss::derivative()`). Returning `1.0` here lets
    /// `compute_gradients()` pass that delta through unchanged without
    /// double-applying the Jacobian.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Softmax => 1.0,
        }
    }
}

/// Numerically stable softmax (shifted by the row maximum).
pub fn softmax(z: &[f64]) -> Vec<f64> {
    let max = z.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = z.iter().map(|&x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_sums_to_one_and_preserves_order() {
        let p = ActivationFunction::Softmax.apply(&[1.0, 3.0, 2.0]);
        let sum: f64 = p.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(p[1] > p[2] && p[2] > p[0]);
    }

    #[test]
    fn softmax_survives_large_logits() {
        let p = softmax(&[1000.0, 1000.0]);
        assert!((p[0] - 0.5).abs() < 1e-12);
        assert!(p.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn relu_clamps_negatives() {
        assert_eq!(ActivationFunction::ReLU.apply(&[-1.0, 0.0, 2.5]), vec![0.0, 0.0, 2.5]);
        assert_eq!(ActivationFunction::ReLU.derivative(-0.1), 0.0);
        assert_eq!(ActivationFunction::ReLU.derivative(0.1), 1.0);
    }
}
