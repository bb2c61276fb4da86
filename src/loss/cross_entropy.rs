/// Sparse categorical cross-entropy for a Softmax output layer.
///
/// Targets are class indices rather than one-hot vectors; the dataset loader
/// already yields indices and the label map is keyed by them.
pub struct CrossEntropyLoss;

/// Keeps ln() finite when a probability underflows to zero.
const EPS: f64 = 1e-12;

impl CrossEntropyLoss {
    /// L = -ln(predicted[class] + eps)
    ///
    /// `predicted` holds softmax probabilities; an out-of-range `class` is
    /// scored as probability zero.
    pub fn loss(predicted: &[f64], class: usize) -> f64 {
        let p = predicted.get(class).copied().unwrap_or(0.0);
        -(p + EPS).ln()
    }

    /// Combined Softmax + cross-entropy gradient w.r.t. the logits:
    ///   ∂L/∂z_i = predicted[i] - [i == class]
    ///
    /// The Softmax layer's own derivative is identity, so this is the delta
    /// the backward pass starts from.
    pub fn derivative(predicted: &[f64], class: usize) -> Vec<f64> {
        predicted.iter()
            .enumerate()
            .map(|(i, p)| if i == class { p - 1.0 } else { *p })
            .collect()
    }
}

/// Index of the largest probability; ties resolve to the lowest index and an
/// empty slice yields `0`.
pub fn argmax(values: &[f64]) -> usize {
    values.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confident_correct_prediction_has_low_loss() {
        let good = CrossEntropyLoss::loss(&[0.98, 0.01, 0.01], 0);
        let bad = CrossEntropyLoss::loss(&[0.01, 0.98, 0.01], 0);
        assert!(good < 0.05);
        assert!(bad > 4.0);
    }

    #[test]
    fn loss_is_finite_for_zero_probability() {
        assert!(CrossEntropyLoss::loss(&[0.0, 1.0], 0).is_finite());
        assert!(CrossEntropyLoss::loss(&[0.5, 0.5], 7).is_finite());
    }

    #[test]
    fn derivative_is_predicted_minus_one_hot() {
        let d = CrossEntropyLoss::derivative(&[0.7, 0.3], 1);
        assert!((d[0] - 0.7).abs() < 1e-12);
        assert!((d[1] + 0.7).abs() < 1e-12);
    }

    #[test]
    fn argmax_prefers_first_of_ties() {
        assert_eq!(argmax(&[0.2, 0.5, 0.5, 0.1]), 1);
        assert_eq!(argmax(&[]), 0);
        assert_eq!(argmax(&[f64::NAN, 0.3]), 1);
    }
}
