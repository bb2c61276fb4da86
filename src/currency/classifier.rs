use std::path::Path;

use image::DynamicImage;
use log::{info, warn};
use rand::Rng;

use crate::activation::activation::ActivationFunction;
use crate::currency::labels::LabelMap;
use crate::currency::preprocess::{grayscale_features, FEATURE_LEN};
use crate::error::ClassifierError;
use crate::loss::cross_entropy::argmax;
use crate::network::{Network, NetworkSpec, LayerSpec};

/// Widths of the two hidden layers.
pub const HIDDEN_UNITS: [usize; 2] = [128, 64];

/// Topology of the currency network:
/// 33856 → 128 (ReLU, dropout) → 64 (ReLU) → `class_count` (Softmax).
pub fn currency_network_spec(class_count: usize, dropout: f64) -> NetworkSpec {
    let [h1, h2] = HIDDEN_UNITS;
    NetworkSpec {
        layers: vec![
            LayerSpec {
                size: h1,
                input_size: FEATURE_LEN,
                activation: ActivationFunction::ReLU,
                dropout: (dropout > 0.0).then_some(dropout),
            },
            LayerSpec { size: h2, input_size: h1, activation: ActivationFunction::ReLU, dropout: None },
            LayerSpec { size: class_count, input_size: h2, activation: ActivationFunction::Softmax, dropout: None },
        ],
    }
}

/// One classification result.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyPrediction {
    pub index: usize,
    /// Class name, or `"Unknown currency"` when the label map has no entry.
    pub label: String,
    pub confidence: f64,
}

/// Trained network plus its label map. Immutable after construction, so one
/// instance can be shared across request threads behind an `Arc`.
#[derive(Debug)]
pub struct CurrencyClassifier {
    network: Network,
    labels: LabelMap,
}

impl CurrencyClassifier {
    pub fn new(network: Network, labels: LabelMap) -> Result<CurrencyClassifier, ClassifierError> {
        network.validate().map_err(ClassifierError::InvalidModel)?;
        if network.input_size() != FEATURE_LEN {
            return Err(ClassifierError::InputMismatch {
                expected: network.input_size(),
                actual: FEATURE_LEN,
            });
        }
        if network.output_size() == 0 {
            return Err(ClassifierError::NoOutputs);
        }
        let missing = labels.missing(network.output_size());
        if !missing.is_empty() {
            warn!("label map has no names for output indices {:?}; they will read as unknown", missing);
        }
        Ok(CurrencyClassifier { network, labels })
    }

    /// Loads the model and label artifacts written by the trainer and checks
    /// the network with one prediction on random input.
    pub fn load(
        model_path: impl AsRef<Path>,
        labels_path: impl AsRef<Path>,
    ) -> Result<CurrencyClassifier, ClassifierError> {
        let model_path = model_path.as_ref();
        let labels_path = labels_path.as_ref();

        let network = Network::load_json(model_path).map_err(|source| ClassifierError::Load {
            path: model_path.to_path_buf(),
            source,
        })?;
        let labels = LabelMap::load_json(labels_path).map_err(|source| ClassifierError::Load {
            path: labels_path.to_path_buf(),
            source,
        })?;
        let classifier = CurrencyClassifier::new(network, labels)?;

        let mut rng = rand::thread_rng();
        let sample: Vec<f64> = (0..FEATURE_LEN).map(|_| rng.gen::<f64>()).collect();
        let sample_out = classifier.network.predict(&sample);
        info!(
            "currency model loaded from {}: {} classes, test prediction shape (1, {})",
            model_path.display(),
            classifier.class_count(),
            sample_out.len()
        );
        Ok(classifier)
    }

    pub fn class_count(&self) -> usize {
        self.network.output_size()
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    /// Classifies an already preprocessed feature vector.
    pub fn classify_features(&self, features: &[f64]) -> Result<CurrencyPrediction, ClassifierError> {
        if features.len() != FEATURE_LEN {
            return Err(ClassifierError::InputMismatch { expected: FEATURE_LEN, actual: features.len() });
        }
        let probabilities = self.network.predict(features);
        if !probabilities.iter().any(|p| p.is_finite()) {
            return Err(ClassifierError::NonFiniteOutput);
        }
        let index = argmax(&probabilities);
        Ok(CurrencyPrediction {
            index,
            label: self.labels.name(index).to_owned(),
            confidence: probabilities[index],
        })
    }

    /// Preprocesses `image` and classifies it.
    pub fn classify(&self, image: &DynamicImage) -> Result<CurrencyPrediction, ClassifierError> {
        self.classify_features(&grayscale_features(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn classifier(labels: LabelMap) -> CurrencyClassifier {
        let network = Network::from_spec(&currency_network_spec(3, 0.3));
        CurrencyClassifier::new(network, labels).unwrap()
    }

    #[test]
    fn spec_has_expected_shape() {
        let spec = currency_network_spec(5, 0.3);
        assert!(spec.validate().is_ok());
        assert_eq!(spec.input_size(), 33856);
        assert_eq!(spec.output_size(), 5);
        assert_eq!(spec.layers[0].dropout, Some(0.3));
        assert_eq!(currency_network_spec(5, 0.0).layers[0].dropout, None);
    }

    #[test]
    fn classify_returns_a_known_label() {
        let c = classifier(LabelMap::from_class_names(["a", "b", "c"]));
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(300, 200, Luma([90])));
        let prediction = c.classify(&image).unwrap();
        assert!(prediction.index < 3);
        assert!(["a", "b", "c"].contains(&prediction.label.as_str()));
        assert!(prediction.confidence > 0.0 && prediction.confidence <= 1.0);
    }

    #[test]
    fn missing_labels_read_as_unknown_currency() {
        let c = classifier(LabelMap::default());
        let prediction = c.classify_features(&vec![0.5; FEATURE_LEN]).unwrap();
        assert_eq!(prediction.label, "Unknown currency");
    }

    #[test]
    fn rejects_wrong_feature_count() {
        let c = classifier(LabelMap::default());
        let err = c.classify_features(&[0.0; 10]).unwrap_err();
        assert!(matches!(err, ClassifierError::InputMismatch { actual: 10, .. }));
    }

    #[test]
    fn rejects_network_with_wrong_input_width() {
        let network = Network::new(vec![(2, 10, ActivationFunction::Softmax)]);
        let err = CurrencyClassifier::new(network, LabelMap::default()).unwrap_err();
        assert!(matches!(err, ClassifierError::InputMismatch { expected: 10, .. }));
    }

    #[test]
    fn rejects_layers_that_do_not_chain() {
        let network = Network::new(vec![
            (128, FEATURE_LEN, ActivationFunction::ReLU),
            (64, 7, ActivationFunction::ReLU),
            (3, 64, ActivationFunction::Softmax),
        ]);
        let err = CurrencyClassifier::new(network, LabelMap::default()).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidModel(_)));
    }

    #[test]
    fn load_returns_an_error_for_a_corrupt_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.json");
        let labels = dir.path().join("labels.json");
        Network::new(vec![(4, 10, ActivationFunction::ReLU), (2, 7, ActivationFunction::Softmax)])
            .save_json(&model)
            .unwrap();
        LabelMap::from_class_names(["a", "b"]).save_json(&labels).unwrap();

        let err = CurrencyClassifier::load(&model, &labels).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidModel(_)));
    }

    #[test]
    fn load_reports_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let err = CurrencyClassifier::load(dir.path().join("nope.json"), dir.path().join("labels.json"))
            .unwrap_err();
        assert!(matches!(err, ClassifierError::Load { .. }));
    }
}
