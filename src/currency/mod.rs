//! Currency recognition: preprocessing, the classifier network, its label
//! map, and the offline training run that produces both artifacts.

pub mod preprocess;
pub mod labels;
pub mod classifier;
pub mod training;

pub use classifier::{currency_network_spec, CurrencyClassifier, CurrencyPrediction};
pub use labels::{LabelMap, UNKNOWN_CURRENCY};
pub use preprocess::{grayscale_features, FEATURE_LEN, INPUT_SIDE};
pub use training::{train_currency_model, TrainingOptions, TrainingReport};
