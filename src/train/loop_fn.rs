use std::time::Instant;

use log::info;
use rand::seq::SliceRandom;

use crate::error::TrainError;
use crate::loss::cross_entropy::{argmax, CrossEntropyLoss};
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::optim::Optimizer;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

/// A labeled sample set: feature rows and their class indices.
#[derive(Debug, Clone, Copy)]
pub struct Samples<'a> {
    pub inputs: &'a [Vec<f64>],
    pub classes: &'a [usize],
}

impl<'a> Samples<'a> {
    pub fn new(inputs: &'a [Vec<f64>], classes: &'a [usize]) -> Self {
        Samples { inputs, classes }
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` with cross-entropy for `config.epochs` epochs and returns
/// the statistics of every completed epoch.
///
/// When `validation` is given it is scored (loss and accuracy, no dropout)
/// after each epoch. Each epoch is also logged at `info` level.
pub fn train_loop<O: Optimizer>(
    network: &mut Network,
    train: Samples<'_>,
    validation: Option<Samples<'_>>,
    optimizer: &mut O,
    config: &TrainConfig,
) -> Result<Vec<EpochStats>, TrainError> {
    if config.batch_size == 0 {
        return Err(TrainError::ZeroBatchSize);
    }
    if train.is_empty() {
        return Err(TrainError::EmptyTrainingSet);
    }
    check_samples(network, train)?;
    if let Some(val) = validation {
        check_samples(network, val)?;
    }

    let mut history = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        let train_loss = run_one_epoch(network, train, optimizer, config.batch_size);
        let (_, train_accuracy) = evaluate(network, train);
        let (val_loss, val_accuracy) = match validation {
            Some(val) if !val.is_empty() => {
                let (loss, acc) = evaluate(network, val);
                (Some(loss), Some(acc))
            }
            _ => (None, None),
        };

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss,
            train_accuracy,
            val_loss,
            val_accuracy,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        info!("{}", stats);
        history.push(stats);
    }

    Ok(history)
}

/// Mean cross-entropy loss and accuracy of `network` over `samples`, using
/// the inference pass (no dropout). An empty set scores `(0.0, 0.0)`.
pub fn evaluate(network: &Network, samples: Samples<'_>) -> (f64, f64) {
    let n = samples.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let (total_loss, correct) = samples.inputs.iter().zip(samples.classes.iter())
        .fold((0.0, 0usize), |(loss, correct), (input, &class)| {
            let output = network.predict(input);
            let hit = usize::from(argmax(&output) == class);
            (loss + CrossEntropyLoss::loss(&output, class), correct + hit)
        });
    (total_loss / n as f64, correct as f64 / n as f64)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn check_samples(network: &Network, samples: Samples<'_>) -> Result<(), TrainError> {
    if samples.inputs.len() != samples.classes.len() {
        return Err(TrainError::LengthMismatch {
            inputs: samples.inputs.len(),
            labels: samples.classes.len(),
        });
    }
    let expected = network.input_size();
    let classes = network.output_size();
    for (index, (input, &class)) in samples.inputs.iter().zip(samples.classes.iter()).enumerate() {
        if input.len() != expected {
            return Err(TrainError::FeatureMismatch { index, expected, actual: input.len() });
        }
        if class >= classes {
            return Err(TrainError::ClassOutOfRange { index, class, classes });
        }
    }
    Ok(())
}

/// Runs one full epoch of shuffled mini-batch updates.
/// Returns the mean loss over all samples.
fn run_one_epoch<O: Optimizer>(
    network: &mut Network,
    train: Samples<'_>,
    optimizer: &mut O,
    batch_size: usize,
) -> f64 {
    let n = train.len();
    let mut total_loss = 0.0;

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rand::thread_rng());

    for batch in indices.chunks(batch_size) {
        let mut acc_grads: Vec<(Matrix, Matrix)> = network.layers.iter()
            .map(|layer| (
                Matrix::zeros(layer.weights.rows, layer.weights.cols),
                Matrix::zeros(layer.biases.rows, layer.biases.cols),
            ))
            .collect();

        for &idx in batch {
            let input = &train.inputs[idx];
            let class = train.classes[idx];

            let output = network.forward(input.clone());
            total_loss += CrossEntropyLoss::loss(&output, class);

            let mut delta = Matrix::row(CrossEntropyLoss::derivative(&output, class));

            // Backward pass.
            for i in (0..network.layers.len()).rev() {
                let (w_grad, b_grad) = if i == 0 {
                    network.layers[0].compute_gradients(delta, &Matrix::row(input.clone()))
                } else {
                    network.layers[i].compute_gradients(delta, &network.layers[i - 1].neurons)
                };

                // ∂L/∂a for the layer below: δ_i · W_iᵀ
                delta = if i > 0 {
                    b_grad.dot(&network.layers[i].weights.transpose())
                } else {
                    Matrix::default()
                };

                acc_grads[i].0.add_scaled(&w_grad, 1.0);
                acc_grads[i].1.add_scaled(&b_grad, 1.0);
            }
        }

        let inv_batch = 1.0 / batch.len() as f64;
        optimizer.begin_step();
        for (i, (w_acc, b_acc)) in acc_grads.iter().enumerate() {
            let w_avg = w_acc.map(|x| x * inv_batch);
            let b_avg = b_acc.map(|x| x * inv_batch);
            optimizer.step(i, &mut network.layers[i], &w_avg, &b_avg);
        }
    }

    total_loss / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::optim::{Adam, Sgd};

    /// Two well-separated clusters in 4 dimensions.
    fn clusters() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut inputs = Vec::new();
        let mut classes = Vec::new();
        for i in 0..40 {
            let jitter = (i as f64 * 0.37).sin() * 0.05;
            if i % 2 == 0 {
                inputs.push(vec![0.9 + jitter, 0.8, 0.1, 0.0 + jitter.abs()]);
                classes.push(0);
            } else {
                inputs.push(vec![0.1, 0.0 + jitter.abs(), 0.9 + jitter, 0.8]);
                classes.push(1);
            }
        }
        (inputs, classes)
    }

    fn small_network() -> Network {
        Network::new(vec![
            (8, 4, ActivationFunction::ReLU),
            (2, 8, ActivationFunction::Softmax),
        ])
    }

    #[test]
    fn adam_learns_separable_clusters() {
        let (inputs, classes) = clusters();
        let mut network = small_network();
        let mut adam = Adam::new(0.01);
        let history = train_loop(
            &mut network,
            Samples::new(&inputs, &classes),
            Some(Samples::new(&inputs[..10], &classes[..10])),
            &mut adam,
            &TrainConfig::new(60, 8),
        ).unwrap();

        assert_eq!(history.len(), 60);
        let last = history.last().unwrap();
        assert!(last.train_accuracy > 0.95, "accuracy {}", last.train_accuracy);
        assert!(last.val_accuracy.unwrap() > 0.9);
        assert!(last.train_loss < history[0].train_loss);
    }

    #[test]
    fn sgd_reduces_loss() {
        let (inputs, classes) = clusters();
        let mut network = small_network();
        let samples = Samples::new(&inputs, &classes);
        let (before, _) = evaluate(&network, samples);
        train_loop(&mut network, samples, None, &mut Sgd::new(0.1), &TrainConfig::new(50, 4)).unwrap();
        let (after, _) = evaluate(&network, samples);
        assert!(after < before, "loss went from {} to {}", before, after);
    }

    #[test]
    fn rejects_bad_inputs() {
        let mut network = small_network();
        let mut sgd = Sgd::new(0.1);
        let inputs = vec![vec![0.0; 4]];

        let err = train_loop(&mut network, Samples::new(&[], &[]), None, &mut sgd, &TrainConfig::default());
        assert!(matches!(err, Err(TrainError::EmptyTrainingSet)));

        let err = train_loop(&mut network, Samples::new(&inputs, &[5]), None, &mut sgd, &TrainConfig::default());
        assert!(matches!(err, Err(TrainError::ClassOutOfRange { class: 5, .. })));

        let short = vec![vec![0.0; 3]];
        let err = train_loop(&mut network, Samples::new(&short, &[0]), None, &mut sgd, &TrainConfig::default());
        assert!(matches!(err, Err(TrainError::FeatureMismatch { expected: 4, actual: 3, .. })));

        let err = train_loop(&mut network, Samples::new(&inputs, &[0]), None, &mut sgd, &TrainConfig::new(1, 0));
        assert!(matches!(err, Err(TrainError::ZeroBatchSize)));
    }

    #[test]
    fn evaluate_on_empty_set_is_zero() {
        let network = small_network();
        assert_eq!(evaluate(&network, Samples::new(&[], &[])), (0.0, 0.0));
    }
}
