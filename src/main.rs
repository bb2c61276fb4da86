use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use env_logger::{Builder, Env};
use log::info;
use sightline::{train_currency_model, OptimizerKind, TrainingOptions};

#[derive(Clone, Copy, ValueEnum)]
enum OptimizerChoice {
    Adam,
    Sgd,
}

impl From<OptimizerChoice> for OptimizerKind {
    fn from(choice: OptimizerChoice) -> Self {
        match choice {
            OptimizerChoice::Adam => OptimizerKind::Adam,
            OptimizerChoice::Sgd => OptimizerKind::Sgd,
        }
    }
}

/// Trains the currency classifier from a folder of labeled banknote photos.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Folder with one subfolder of images per currency class
    #[arg(long, env = "SIGHTLINE_DATASET", default_value = "dataset")]
    dataset: PathBuf,

    /// Where to write the trained network
    #[arg(long, env = "SIGHTLINE_MODEL", default_value = "currency_model.json")]
    model_out: PathBuf,

    /// Where to write the class index to name map
    #[arg(long, env = "SIGHTLINE_LABELS", default_value = "label_dict.json")]
    labels_out: PathBuf,

    #[arg(long, default_value_t = 10)]
    epochs: usize,

    #[arg(long, default_value_t = 32)]
    batch_size: usize,

    #[arg(long, default_value_t = 0.001)]
    learning_rate: f64,

    /// Weight update rule
    #[arg(long, value_enum, default_value_t = OptimizerChoice::Adam)]
    optimizer: OptimizerChoice,

    /// Share of images held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    test_fraction: f64,

    /// Dropout rate after the first hidden layer
    #[arg(long, default_value_t = 0.3)]
    dropout: f64,

    /// Seed for a reproducible train/test split
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let opts = TrainingOptions {
        dataset_dir: args.dataset,
        model_path: args.model_out,
        labels_path: args.labels_out,
        epochs: args.epochs,
        batch_size: args.batch_size,
        learning_rate: args.learning_rate,
        optimizer: args.optimizer.into(),
        test_fraction: args.test_fraction,
        dropout: args.dropout,
        seed: args.seed,
    };

    info!("=== Training currency classifier ===");
    let report = train_currency_model(&opts)?;

    println!("Classes: {}", report.class_names.join(", "));
    println!(
        "Samples: {} train / {} test ({} skipped)",
        report.train_samples, report.test_samples, report.skipped_images
    );
    if let Some(last) = report.history.last() {
        println!("{}", last);
    }
    println!("Model saved to {}", opts.model_path.display());
    println!("Labels saved to {}", opts.labels_path.display());
    Ok(())
}
