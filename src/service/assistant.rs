use image::DynamicImage;
use log::{debug, info, warn};

use crate::currency::CurrencyClassifier;
use crate::error::ServiceError;
use crate::service::mode::Mode;
use crate::service::upload::{UploadPolicy, UploadedFile};
use crate::vision::{Captioner, ObjectDetector, TextReader, Unavailable};

/// Result of currency mode when no classifier was loaded at startup.
pub const CURRENCY_MODEL_NOT_LOADED: &str = "Currency model not loaded.";
/// Result of text mode when the reader finds nothing.
pub const NO_TEXT_DETECTED: &str = "No text detected.";

/// The black-box engines behind object and text mode.
pub struct Engines {
    pub detector: Box<dyn ObjectDetector>,
    pub captioner: Box<dyn Captioner>,
    pub reader: Box<dyn TextReader>,
}

impl Engines {
    /// Every engine unavailable; requests needing one fail with 503.
    pub fn unavailable() -> Self {
        Engines {
            detector: Box::new(Unavailable("object detector")),
            captioner: Box::new(Unavailable("captioner")),
            reader: Box::new(Unavailable("text reader")),
        }
    }
}

/// Turns an uploaded photo into one spoken-style sentence.
///
/// Holds only read-only state after construction and is shared by all
/// request threads.
pub struct Assistant {
    policy: UploadPolicy,
    engines: Engines,
    currency: Option<CurrencyClassifier>,
}

impl Assistant {
    pub fn new(policy: UploadPolicy, engines: Engines, currency: Option<CurrencyClassifier>) -> Self {
        if currency.is_none() {
            warn!("currency classifier not loaded; currency mode will report it");
        }
        Assistant { policy, engines, currency }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn currency_loaded(&self) -> bool {
        self.currency.is_some()
    }

    /// Full upload flow: mode check, file validation and storage, decode, then
    /// the mode's pipeline.
    pub fn handle_upload(&self, file: Option<UploadedFile>, mode: Option<&str>) -> Result<String, ServiceError> {
        let mode = Mode::from_field(mode)?;
        let image = self.policy.accept(file)?;
        debug!("processing {}x{} image in {} mode", image.width(), image.height(), mode);
        self.run(mode, &image)
    }

    pub fn run(&self, mode: Mode, image: &DynamicImage) -> Result<String, ServiceError> {
        match mode {
            Mode::Object => self.describe_scene(image),
            Mode::Currency => self.detect_currency(image),
            Mode::Text => self.read_text(image),
        }
    }

    /// `"<caption>. I see: <labels>."`, or the caption alone when nothing
    /// was detected.
    pub fn describe_scene(&self, image: &DynamicImage) -> Result<String, ServiceError> {
        let labels = unique_labels(self.engines.detector.detect(image)?);
        let caption = self.engines.captioner.caption(image)?;
        Ok(compose_description(&caption, &labels))
    }

    pub fn detect_currency(&self, image: &DynamicImage) -> Result<String, ServiceError> {
        let Some(classifier) = &self.currency else {
            return Ok(CURRENCY_MODEL_NOT_LOADED.to_owned());
        };
        let prediction = classifier.classify(image)?;
        info!("currency: {} ({:.3})", prediction.label, prediction.confidence);
        Ok(format!("I see: {}.", prediction.label))
    }

    pub fn read_text(&self, image: &DynamicImage) -> Result<String, ServiceError> {
        let text = self.engines.reader.read_text(image)?;
        let text = text.trim();
        if text.is_empty() {
            Ok(NO_TEXT_DETECTED.to_owned())
        } else {
            Ok(text.to_owned())
        }
    }
}

/// Drops repeated labels, keeping the first occurrence of each.
pub fn unique_labels(labels: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        if !unique.contains(&label) {
            unique.push(label);
        }
    }
    unique
}

pub fn compose_description(caption: &str, labels: &[String]) -> String {
    let caption = caption.trim();
    if labels.is_empty() {
        return caption.to_owned();
    }
    format!("{}. I see: {}.", caption.trim_end_matches('.'), labels.join(", "))
}
