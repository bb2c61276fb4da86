use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use log::debug;

use crate::error::ServiceError;

/// Extensions accepted by default.
pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// A file part taken from a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        UploadedFile { filename: filename.into(), bytes }
    }
}

/// Where uploads are stored and which extensions are accepted.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    dir: PathBuf,
    allowed_extensions: Vec<String>,
}

impl UploadPolicy {
    /// Extensions are matched case-insensitively; a leading dot is ignored.
    pub fn new<I, S>(dir: impl Into<PathBuf>, allowed_extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_extensions = allowed_extensions
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        UploadPolicy { dir: dir.into(), allowed_extensions }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    /// True when `filename` has a dot and its last extension is allowed.
    pub fn is_allowed(&self, filename: &str) -> bool {
        extension(filename)
            .map(|ext| self.allowed_extensions.iter().any(|a| *a == ext))
            .unwrap_or(false)
    }

    /// Validates the upload, stores it under the upload directory and decodes it.
    pub fn accept(&self, file: Option<UploadedFile>) -> Result<DynamicImage, ServiceError> {
        let file = file.ok_or(ServiceError::MissingFile)?;
        if file.filename.is_empty() {
            return Err(ServiceError::EmptyFilename);
        }
        if !self.is_allowed(&file.filename) {
            return Err(ServiceError::DisallowedExtension(extension(&file.filename).unwrap_or_default()));
        }
        if file.bytes.is_empty() {
            return Err(ServiceError::EmptyFile);
        }

        self.store(&file)?;
        image::load_from_memory(&file.bytes).map_err(|e| ServiceError::UndecodableImage(e.to_string()))
    }

    /// Writes the upload under a sanitized name, replacing any earlier file
    /// with the same name.
    pub fn store(&self, file: &UploadedFile) -> Result<PathBuf, ServiceError> {
        let mut name = secure_filename(&file.filename);
        if name.is_empty() {
            name = format!("upload.{}", extension(&file.filename).unwrap_or_default());
        }
        let path = self.dir.join(name);
        fs::write(&path, &file.bytes).map_err(|source| ServiceError::Storage { path: path.clone(), source })?;
        debug!("stored upload ({} bytes) at {}", file.bytes.len(), path.display());
        Ok(path)
    }
}

fn extension(filename: &str) -> Option<String> {
    filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Reduces a client-supplied name to a safe file name: directory parts are
/// dropped, whitespace becomes `_`, and only ASCII letters, digits, `.`, `_`
/// and `-` are kept. Leading and trailing dots and underscores are stripped.
pub fn secure_filename(name: &str) -> String {
    let base = name.rsplit(|c| c == '/' || c == '\\').next().unwrap_or("");
    let joined = base.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_owned()
}
