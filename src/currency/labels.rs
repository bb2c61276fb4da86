use std::collections::BTreeMap;
use std::path::Path;

use serde::{Serialize, Deserialize};

/// Answer for a classifier output index that has no entry in the map.
pub const UNKNOWN_CURRENCY: &str = "Unknown currency";

/// Dense class-index → class-name table written next to the trained model.
///
/// Stored as a JSON object keyed by the decimal index, e.g.
/// `{"0": "10_rupees", "1": "20_rupees"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap {
    labels: BTreeMap<usize, String>,
}

impl LabelMap {
    /// Numbers the names in iteration order, starting at 0.
    pub fn from_class_names<I, S>(names: I) -> LabelMap
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LabelMap {
            labels: names.into_iter().map(Into::into).enumerate().collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(&index).map(String::as_str)
    }

    /// Class name for `index`, or `UNKNOWN_CURRENCY` when the map has no entry.
    pub fn name(&self, index: usize) -> &str {
        self.get(index).unwrap_or(UNKNOWN_CURRENCY)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Indices in `0..outputs` that have no name.
    pub fn missing(&self, outputs: usize) -> Vec<usize> {
        (0..outputs).filter(|i| !self.labels.contains_key(i)).collect()
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    pub fn load_json(path: impl AsRef<Path>) -> std::io::Result<LabelMap> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
