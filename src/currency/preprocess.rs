//! Image → feature-vector preprocessing shared by training and inference.
//!
//! Both sides must agree exactly: grayscale, resize to 184×184, scale to
//! [0, 1], flatten row-major.

use image::{imageops::FilterType, DynamicImage, GrayImage};

/// Side length of the square grayscale image fed to the classifier.
pub const INPUT_SIDE: u32 = 184;

/// Number of input features: `INPUT_SIDE²` = 33856.
pub const FEATURE_LEN: usize = (INPUT_SIDE * INPUT_SIDE) as usize;

/// Converts a decoded image into the classifier's 33856-value input.
pub fn grayscale_features(image: &DynamicImage) -> Vec<f64> {
    let gray = image.to_luma8();
    let resized = image::imageops::resize(&gray, INPUT_SIDE, INPUT_SIDE, FilterType::Triangle);
    resized.pixels().map(|p| p.0[0] as f64 / 255.0).collect()
}

/// Decodes encoded image bytes (format sniffed from content) and converts
/// them with `grayscale_features`.
pub fn decode_grayscale_features(bytes: &[u8]) -> Result<Vec<f64>, String> {
    let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    Ok(grayscale_features(&img))
}

/// Reshapes a feature vector back into a 184×184 grayscale image.
///
/// Returns `None` unless `features` has exactly `FEATURE_LEN` values.
pub fn features_to_image(features: &[f64]) -> Option<GrayImage> {
    if features.len() != FEATURE_LEN {
        return None;
    }
    let pixels = features.iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();
    GrayImage::from_raw(INPUT_SIDE, INPUT_SIDE, pixels)
}
