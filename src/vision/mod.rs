//! Seams for the pretrained engines the service consumes as black boxes.
//!
//! Each engine is a trait so the service can be wired to whatever runs the
//! model; `adapters` provides implementations that shell out to a configured
//! command, and `Unavailable` stands in for an engine that was not set up.

pub mod command;
pub mod adapters;

use image::DynamicImage;

use crate::error::EngineError;

pub use adapters::{CommandCaptioner, CommandDetector, CommandSpeech, CommandTextReader};
pub use command::ExternalCommand;

/// Detects objects and returns one class label per detection (duplicates allowed).
pub trait ObjectDetector: Send + Sync {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<String>, EngineError>;
}

/// Produces a one-sentence description of an image.
pub trait Captioner: Send + Sync {
    fn caption(&self, image: &DynamicImage) -> Result<String, EngineError>;
}

/// Extracts printed text from an image.
pub trait TextReader: Send + Sync {
    fn read_text(&self, image: &DynamicImage) -> Result<String, EngineError>;
}

/// Speaks text aloud, returning once playback has finished.
pub trait SpeechEngine: Send {
    fn speak(&self, text: &str) -> Result<(), EngineError>;
}

/// Placeholder for an engine with no backing model; every call fails with
/// `EngineError::Unavailable`.
#[derive(Debug, Clone, Copy)]
pub struct Unavailable(pub &'static str);

impl ObjectDetector for Unavailable {
    fn detect(&self, _image: &DynamicImage) -> Result<Vec<String>, EngineError> {
        Err(EngineError::Unavailable(self.0))
    }
}

impl Captioner for Unavailable {
    fn caption(&self, _image: &DynamicImage) -> Result<String, EngineError> {
        Err(EngineError::Unavailable(self.0))
    }
}

impl TextReader for Unavailable {
    fn read_text(&self, _image: &DynamicImage) -> Result<String, EngineError> {
        Err(EngineError::Unavailable(self.0))
    }
}

impl SpeechEngine for Unavailable {
    fn speak(&self, _text: &str) -> Result<(), EngineError> {
        Err(EngineError::Unavailable(self.0))
    }
}
