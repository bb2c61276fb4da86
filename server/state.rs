use std::error::Error;
use std::fs;
use std::sync::Arc;

use log::{error, info, warn};
use sightline::currency::CurrencyClassifier;
use sightline::service::{Assistant, Engines, SpeechQueue, UploadPolicy};
use sightline::vision::{
    CommandCaptioner, CommandDetector, CommandSpeech, CommandTextReader, ExternalCommand, SpeechEngine, Unavailable,
};

use crate::config::ServerConfig;

/// Everything a request needs. Built once at startup and never mutated.
pub struct AppState {
    pub assistant: Assistant,
    pub speech: SpeechQueue,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> Result<AppState, Box<dyn Error>> {
        fs::create_dir_all(&config.upload_dir)?;

        let currency = match CurrencyClassifier::load(&config.model, &config.labels) {
            Ok(classifier) => Some(classifier),
            Err(e) => {
                error!("Error loading currency model: {}", e);
                None
            }
        };

        let engines = Engines {
            detector: match configured("object detector", config.detector_cmd.as_deref()) {
                Some(cmd) => Box::new(CommandDetector::new(cmd)),
                None => Box::new(Unavailable("object detector")),
            },
            captioner: match configured("captioner", config.captioner_cmd.as_deref()) {
                Some(cmd) => Box::new(CommandCaptioner::new(cmd)),
                None => Box::new(Unavailable("captioner")),
            },
            reader: match configured("text reader", Some(config.ocr_cmd.as_str())) {
                Some(cmd) => Box::new(CommandTextReader::new(cmd)),
                None => Box::new(Unavailable("text reader")),
            },
        };

        let speech_engine: Box<dyn SpeechEngine> = match configured("speech", Some(config.speech_cmd.as_str())) {
            Some(cmd) => Box::new(CommandSpeech::new(cmd)),
            None => Box::new(Unavailable("speech")),
        };

        let policy = UploadPolicy::new(&config.upload_dir, &config.allowed_extensions);
        Ok(AppState {
            assistant: Assistant::new(policy, engines, currency),
            speech: SpeechQueue::spawn(speech_engine, config.speech_queue)?,
            max_upload_bytes: config.max_upload_bytes,
        })
    }
}

fn configured(engine: &str, line: Option<&str>) -> Option<ExternalCommand> {
    let command = line.and_then(ExternalCommand::parse);
    match &command {
        Some(cmd) => info!("{}: `{}`", engine, cmd),
        None => warn!("{} not configured; requests that need it answer 503", engine),
    }
    command
}

/// Handle passed to every request thread.
pub type SharedState = Arc<AppState>;
