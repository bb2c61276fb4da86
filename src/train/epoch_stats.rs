use serde::{Serialize, Deserialize};

/// Per-epoch training statistics produced by `train_loop`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Mean cross-entropy over the training samples, measured during the
    /// (dropout-active) training pass.
    pub train_loss: f64,
    /// Fraction of training samples classified correctly by the updated network.
    pub train_accuracy: f64,
    /// Mean loss on the held-out partition, when one was provided.
    pub val_loss: Option<f64>,
    pub val_accuracy: Option<f64>,
    /// Wall-clock duration of this epoch in milliseconds.
    pub elapsed_ms: u64,
}

impl std::fmt::Display for EpochStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "epoch {}/{} - loss {:.4} - accuracy {:.4}",
            self.epoch, self.total_epochs, self.train_loss, self.train_accuracy
        )?;
        if let (Some(loss), Some(acc)) = (self.val_loss, self.val_accuracy) {
            write!(f, " - val_loss {:.4} - val_accuracy {:.4}", loss, acc)?;
        }
        write!(f, " ({} ms)", self.elapsed_ms)
    }
}
