use serde::{Serialize, Deserialize};
use crate::activation::activation::ActivationFunction;

/// Describes one layer in a network specification.
///
/// Fields:
/// - `size`      : number of neurons in this layer
/// - `input_size`: number of neurons feeding into this layer (i.e. the output
///                  size of the previous layer, or the raw input dimension for
///                  the first layer)
/// - `activation`: activation function applied after the linear transform
/// - `dropout`   : optional dropout rate applied to this layer's output while training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub input_size: usize,
    pub activation: ActivationFunction,
    #[serde(default)]
    pub dropout: Option<f64>,
}

/// Ordered list of layer descriptions (input → output).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub layers: Vec<LayerSpec>,
}

impl NetworkSpec {
    /// Input dimension of the first layer, `0` for an empty spec.
    pub fn input_size(&self) -> usize {
        self.layers.first().map(|l| l.input_size).unwrap_or(0)
    }

    /// Output dimension of the last layer, `0` for an empty spec.
    pub fn output_size(&self) -> usize {
        self.layers.last().map(|l| l.size).unwrap_or(0)
    }

    /// Returns a description of the first place where consecutive layers do
    /// not chain (`layers[i].size != layers[i + 1].input_size`).
    pub fn validate(&self) -> Result<(), String> {
        if self.layers.is_empty() {
            return Err("network spec has no layers".into());
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[0].size != pair[1].input_size {
                return Err(format!(
                    "layer {} outputs {} values but layer {} expects {}",
                    i, pair[0].size, i + 1, pair[1].input_size
                ));
            }
        }
        Ok(())
    }
}
