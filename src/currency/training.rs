use std::path::{Path, PathBuf};

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::currency::classifier::currency_network_spec;
use crate::currency::labels::LabelMap;
use crate::dataset::{load_image_folder, train_test_split};
use crate::error::TrainError;
use crate::network::Network;
use crate::optim::{Adam, OptimizerKind, Sgd};
use crate::train::{train_loop, EpochStats, Samples, TrainConfig};

/// Settings of one currency training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOptions {
    /// Folder of class subfolders.
    pub dataset_dir: PathBuf,
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub optimizer: OptimizerKind,
    /// Share of samples held out for per-epoch evaluation.
    pub test_fraction: f64,
    /// Dropout after the first hidden layer.
    pub dropout: f64,
    /// Fixes the train/test split when set.
    pub seed: Option<u64>,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        TrainingOptions {
            dataset_dir: PathBuf::from("dataset"),
            model_path: PathBuf::from("currency_model.json"),
            labels_path: PathBuf::from("label_dict.json"),
            epochs: 10,
            batch_size: 32,
            learning_rate: 0.001,
            optimizer: OptimizerKind::Adam,
            test_fraction: 0.2,
            dropout: 0.3,
            seed: None,
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub class_names: Vec<String>,
    pub train_samples: usize,
    pub test_samples: usize,
    pub skipped_images: usize,
    pub history: Vec<EpochStats>,
}

/// Loads the dataset, trains the currency network and writes both artifacts.
pub fn train_currency_model(opts: &TrainingOptions) -> Result<TrainingReport, TrainError> {
    let data = load_image_folder(&opts.dataset_dir)?;
    info!(
        "loaded {} images in {} classes from {} ({} skipped)",
        data.len(),
        data.class_names.len(),
        opts.dataset_dir.display(),
        data.skipped
    );

    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let split = train_test_split(data.features, data.classes, opts.test_fraction, &mut rng);
    info!("split: {} train / {} test", split.train_inputs.len(), split.test_inputs.len());

    let spec = currency_network_spec(data.class_names.len(), opts.dropout);
    spec.validate().map_err(TrainError::InvalidNetwork)?;
    let mut network = Network::from_spec(&spec);

    let train = Samples::new(&split.train_inputs, &split.train_classes);
    let test = Samples::new(&split.test_inputs, &split.test_classes);
    let validation = (!test.is_empty()).then_some(test);
    let config = TrainConfig::new(opts.epochs, opts.batch_size);
    info!("optimizer: {} (learning rate {})", opts.optimizer, opts.learning_rate);
    let history = match opts.optimizer {
        OptimizerKind::Adam => {
            train_loop(&mut network, train, validation, &mut Adam::new(opts.learning_rate), &config)?
        }
        OptimizerKind::Sgd => {
            train_loop(&mut network, train, validation, &mut Sgd::new(opts.learning_rate), &config)?
        }
    };

    persist(&opts.model_path, |p| network.save_json(p))?;
    let labels = LabelMap::from_class_names(data.class_names.iter().cloned());
    persist(&opts.labels_path, |p| labels.save_json(p))?;
    info!(
        "saved model to {} and labels to {}",
        opts.model_path.display(),
        opts.labels_path.display()
    );

    Ok(TrainingReport {
        class_names: data.class_names,
        train_samples: split.train_inputs.len(),
        test_samples: split.test_inputs.len(),
        skipped_images: data.skipped,
        history,
    })
}

fn persist<F>(path: &Path, write: F) -> Result<(), TrainError>
where
    F: FnOnce(&Path) -> std::io::Result<()>,
{
    let to_err = |source| TrainError::Persist { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(to_err)?;
    }
    write(path).map_err(to_err)
}
