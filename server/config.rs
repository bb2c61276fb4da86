use std::path::PathBuf;

use clap::Parser;

/// Assistive vision web service: describes scenes, recognizes banknotes and
/// reads printed text from uploaded photos, and speaks results aloud.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "SIGHTLINE_ADDR", default_value = "127.0.0.1:5000")]
    pub addr: String,

    /// Directory uploads are written to
    #[arg(long, env = "SIGHTLINE_UPLOAD_DIR", default_value = "static/uploads")]
    pub upload_dir: PathBuf,

    /// Accepted upload extensions
    #[arg(long, env = "SIGHTLINE_ALLOWED_EXTENSIONS", value_delimiter = ',', default_value = "png,jpg,jpeg")]
    pub allowed_extensions: Vec<String>,

    /// Trained currency network
    #[arg(long, env = "SIGHTLINE_MODEL", default_value = "currency_model.json")]
    pub model: PathBuf,

    /// Currency class index to name map
    #[arg(long, env = "SIGHTLINE_LABELS", default_value = "label_dict.json")]
    pub labels: PathBuf,

    /// Largest accepted request body in bytes
    #[arg(long, env = "SIGHTLINE_MAX_UPLOAD_BYTES", default_value_t = 16 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// Object detector command; prints one label per detection. `{image}` is the photo path
    #[arg(long, env = "SIGHTLINE_DETECTOR_CMD")]
    pub detector_cmd: Option<String>,

    /// Image captioning command; prints one sentence
    #[arg(long, env = "SIGHTLINE_CAPTIONER_CMD")]
    pub captioner_cmd: Option<String>,

    /// OCR command; prints the recognized text. Empty disables text mode
    #[arg(long, env = "SIGHTLINE_OCR_CMD", default_value = "tesseract {image} stdout")]
    pub ocr_cmd: String,

    /// Text-to-speech command; reads the utterance on stdin unless an argument
    /// contains `{text}`. Empty disables speech
    #[arg(long, env = "SIGHTLINE_SPEECH_CMD", default_value = "espeak-ng -s 150 --stdin")]
    pub speech_cmd: String,

    /// Utterances that may wait for the speech worker
    #[arg(long, env = "SIGHTLINE_SPEECH_QUEUE", default_value_t = 8)]
    pub speech_queue: usize,
}
