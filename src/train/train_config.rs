/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`    : total number of full passes over the training data
/// - `batch_size`: samples per mini-batch; use `1` for online updates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
}

impl TrainConfig {
    pub fn new(epochs: usize, batch_size: usize) -> Self {
        TrainConfig { epochs, batch_size }
    }
}

impl Default for TrainConfig {
    /// Ten epochs of 32-sample batches.
    fn default() -> Self {
        TrainConfig::new(10, 32)
    }
}
