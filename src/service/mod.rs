//! Request-level logic behind the HTTP endpoints, kept free of HTTP types.

pub mod mode;
pub mod upload;
pub mod assistant;
pub mod speech;

pub use assistant::{Assistant, Engines, CURRENCY_MODEL_NOT_LOADED, NO_TEXT_DETECTED};
pub use mode::Mode;
pub use speech::SpeechQueue;
pub use upload::{secure_filename, UploadPolicy, UploadedFile, DEFAULT_ALLOWED_EXTENSIONS};
