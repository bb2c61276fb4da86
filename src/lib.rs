pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;
pub mod error;
pub mod dataset;
pub mod currency;
pub mod vision;
pub mod service;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::{Network, NetworkSpec, LayerSpec};
pub use loss::CrossEntropyLoss;
pub use optim::{Adam, Optimizer, OptimizerKind, Sgd};
pub use train::{train_loop, EpochStats, TrainConfig};
pub use error::{ClassifierError, DatasetError, EngineError, ServiceError, TrainError};
pub use currency::{CurrencyClassifier, TrainingOptions, train_currency_model};
pub use service::{Assistant, Engines, Mode, SpeechQueue, UploadPolicy, UploadedFile};
