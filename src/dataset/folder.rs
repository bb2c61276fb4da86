use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::currency::preprocess::decode_grayscale_features;
use crate::error::DatasetError;

/// File extensions picked up from class folders (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Feature rows read from a labeled image folder.
#[derive(Debug, Clone, Default)]
pub struct LabeledImages {
    /// Class names in index order (sorted subfolder names).
    pub class_names: Vec<String>,
    pub features: Vec<Vec<f64>>,
    /// Class index of each row in `features`.
    pub classes: Vec<usize>,
    /// Image files that could not be decoded.
    pub skipped: usize,
}

impl LabeledImages {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Reads `root/<class>/<image>` into grayscale feature rows.
///
/// Every subdirectory is a class, numbered in sorted name order; a class
/// folder without usable images still takes an index. Files with other
/// extensions are ignored and images that fail to decode are skipped with a
/// warning.
pub fn load_image_folder(root: &Path) -> Result<LabeledImages, DatasetError> {
    let class_dirs = sorted_entries(root, |p| p.is_dir())?;
    if class_dirs.is_empty() {
        return Err(DatasetError::NoClasses(root.to_path_buf()));
    }

    let mut data = LabeledImages::default();

    for (class, dir) in class_dirs.iter().enumerate() {
        let name = dir.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let files = sorted_entries(dir, |p| p.is_file() && has_image_extension(p))?;
        let before = data.len();
        for path in files {
            match fs::read(&path).map_err(|e| e.to_string()).and_then(|b| decode_grayscale_features(&b)) {
                Ok(features) => {
                    data.features.push(features);
                    data.classes.push(class);
                }
                Err(e) => {
                    warn!("Skipped unreadable image: {} ({})", path.display(), e);
                    data.skipped += 1;
                }
            }
        }
        debug!("class {} '{}': {} images", class, name, data.len() - before);
        data.class_names.push(name);
    }

    if data.is_empty() {
        return Err(DatasetError::NoImages(root.to_path_buf()));
    }
    Ok(data)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|allowed| e.eq_ignore_ascii_case(allowed)))
        .unwrap_or(false)
}

fn sorted_entries<F>(dir: &Path, keep: F) -> Result<Vec<PathBuf>, DatasetError>
where
    F: Fn(&Path) -> bool,
{
    let io_err = |source| DatasetError::Io { path: dir.to_path_buf(), source };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if keep(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Luma};

    fn write_png(path: &Path, shade: u8) {
        GrayImage::from_pixel(30, 20, Luma([shade]))
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    }

    #[test]
    fn classes_are_sorted_and_bad_images_skipped() {
        let root = tempfile::tempdir().unwrap();
        for class in ["usd_5", "usd_1", "usd_10"] {
            fs::create_dir(root.path().join(class)).unwrap();
        }
        write_png(&root.path().join("usd_1/a.png"), 10);
        write_png(&root.path().join("usd_1/b.PNG"), 20);
        write_png(&root.path().join("usd_5/a.png"), 200);
        fs::write(root.path().join("usd_5/broken.jpg"), b"not a jpeg").unwrap();
        fs::write(root.path().join("usd_5/notes.txt"), b"ignored").unwrap();
        fs::write(root.path().join("stray.png"), b"top-level files are not classes").unwrap();

        let data = load_image_folder(root.path()).unwrap();
        assert_eq!(data.class_names, vec!["usd_1", "usd_10", "usd_5"]);
        assert_eq!(data.classes, vec![0, 0, 2]);
        assert_eq!(data.skipped, 1);
        assert!(data.features.iter().all(|f| f.len() == 33856));
    }

    #[test]
    fn empty_root_has_no_classes() {
        let root = tempfile::tempdir().unwrap();
        assert!(matches!(load_image_folder(root.path()), Err(DatasetError::NoClasses(_))));
    }

    #[test]
    fn classes_without_images_are_an_error() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("only")).unwrap();
        fs::write(root.path().join("only/bad.png"), b"nope").unwrap();
        assert!(matches!(load_image_folder(root.path()), Err(DatasetError::NoImages(_))));
    }

    #[test]
    fn missing_root_is_an_io_error() {
        let root = tempfile::tempdir().unwrap();
        let err = load_image_folder(&root.path().join("absent")).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }
}
