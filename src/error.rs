use std::path::PathBuf;

use thiserror::Error;

/// Failures of the offline training run.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("{inputs} training inputs but {labels} labels")]
    LengthMismatch { inputs: usize, labels: usize },

    #[error("batch size must be at least 1")]
    ZeroBatchSize,

    #[error("sample {index} has {actual} features but the network expects {expected}")]
    FeatureMismatch { index: usize, expected: usize, actual: usize },

    #[error("sample {index} has class {class} but the network only has {classes} outputs")]
    ClassOutOfRange { index: usize, class: usize, classes: usize },

    #[error("invalid network: {0}")]
    InvalidNetwork(String),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while reading a labeled image folder.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no class subdirectories found in {0}")]
    NoClasses(PathBuf),

    #[error("no readable images found under {0}")]
    NoImages(PathBuf),
}

/// Failures of the currency classifier.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("cannot load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid currency model: {0}")]
    InvalidModel(String),

    #[error("classifier expects {expected} input values, got {actual}")]
    InputMismatch { expected: usize, actual: usize },

    #[error("classifier has no output classes")]
    NoOutputs,

    #[error("classifier produced no finite probabilities")]
    NonFiniteOutput,
}

/// Failures of the external vision and speech engines.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0} is not configured")]
    Unavailable(&'static str),

    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    Failed { program: String, status: String, stderr: String },

    #[error("cannot hand image to engine: {0}")]
    Staging(String),

    #[error("engine output is not valid UTF-8")]
    InvalidOutput,
}

/// Everything the HTTP boundary can report. `status_code()` is the single
/// place where failures become HTTP statuses.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("No file part")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Invalid file: extension {0:?} is not allowed")]
    DisallowedExtension(String),

    #[error("Uploaded file is empty")]
    EmptyFile,

    #[error("Could not read image file: {0}")]
    UndecodableImage(String),

    #[error("Unknown mode {0:?}; expected object, currency or text")]
    UnknownMode(String),

    #[error("Upload exceeds the {0} byte limit")]
    PayloadTooLarge(usize),

    #[error("Malformed request body: {0}")]
    InvalidBody(String),

    #[error("No text provided")]
    EmptyText,

    #[error("Speech queue is full, try again later")]
    SpeechQueueFull,

    #[error("Speech output is unavailable")]
    SpeechUnavailable,

    #[error("Could not store upload at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Currency detection failed: {0}")]
    Classifier(#[from] ClassifierError),
}

impl ServiceError {
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::MissingFile
            | ServiceError::EmptyFilename
            | ServiceError::DisallowedExtension(_)
            | ServiceError::EmptyFile
            | ServiceError::UndecodableImage(_)
            | ServiceError::UnknownMode(_)
            | ServiceError::InvalidBody(_)
            | ServiceError::EmptyText => 400,
            ServiceError::PayloadTooLarge(_) => 413,
            ServiceError::SpeechQueueFull
            | ServiceError::SpeechUnavailable
            | ServiceError::Engine(EngineError::Unavailable(_)) => 503,
            ServiceError::Storage { .. }
            | ServiceError::Engine(_)
            | ServiceError::Classifier(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_mistakes_map_to_400() {
        assert_eq!(ServiceError::DisallowedExtension("gif".into()).status_code(), 400);
        assert_eq!(ServiceError::UnknownMode("colour".into()).status_code(), 400);
        assert_eq!(ServiceError::EmptyText.status_code(), 400);
    }

    #[test]
    fn missing_engines_are_unavailable_not_broken() {
        let unavailable = ServiceError::from(EngineError::Unavailable("captioner"));
        assert_eq!(unavailable.status_code(), 503);

        let crashed = ServiceError::from(EngineError::Failed {
            program: "tesseract".into(),
            status: "exit status: 1".into(),
            stderr: "boom".into(),
        });
        assert_eq!(crashed.status_code(), 500);
    }

    #[test]
    fn inference_failures_are_server_errors() {
        let err = ServiceError::from(ClassifierError::InputMismatch { expected: 33856, actual: 10 });
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().starts_with("Currency detection failed"));
    }
}
