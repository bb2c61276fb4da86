use std::path::Path;

use crate::{activation::activation::ActivationFunction, layers::dense::Layer};
use crate::network::spec::{LayerSpec, NetworkSpec};
use serde::{Serialize, Deserialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Network {
    pub layers: Vec<Layer>,
}

impl Network {
    /// Builds a network from (size, input_size, activation) tuples.
    pub fn new(layer_specs: Vec<(usize, usize, ActivationFunction)>) -> Network {
        let layers = layer_specs.into_iter()
            .map(|(size, input_size, activation)| Layer::new(size, input_size, activation))
            .collect();
        Network { layers }
    }

    /// Builds a freshly initialised network from a spec.
    pub fn from_spec(spec: &NetworkSpec) -> Network {
        let layers = spec.layers.iter()
            .map(|l| {
                let layer = Layer::new(l.size, l.input_size, l.activation);
                match l.dropout {
                    Some(rate) => layer.with_dropout(rate),
                    None => layer,
                }
            })
            .collect();
        Network { layers }
    }

    /// Describes the trained network's topology.
    pub fn spec(&self) -> NetworkSpec {
        NetworkSpec {
            layers: self.layers.iter()
                .map(|l| LayerSpec {
                    size: l.size,
                    input_size: l.input_size(),
                    activation: l.activator,
                    dropout: l.dropout,
                })
                .collect(),
        }
    }

    /// Checks that consecutive layers chain and that every layer's weights
    /// (`input_size × size`) and biases (`1 × size`) have consistent shapes.
    /// A network that passes never trips a dimension assertion in `predict`.
    pub fn validate(&self) -> Result<(), String> {
        self.spec().validate()?;
        for (i, layer) in self.layers.iter().enumerate() {
            let w = &layer.weights;
            if w.cols != layer.size || w.data.len() != w.rows || w.data.iter().any(|r| r.len() != w.cols) {
                return Err(format!("layer {} weights are not a {}x{} matrix", i, w.rows, layer.size));
            }
            let b = &layer.biases;
            if b.rows != 1 || b.cols != layer.size || b.data.len() != 1 || b.data[0].len() != layer.size {
                return Err(format!("layer {} biases are not a 1x{} row", i, layer.size));
            }
        }
        Ok(())
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map(|l| l.input_size()).unwrap_or(0)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map(|l| l.size).unwrap_or(0)
    }

    /// Training forward pass; stores activations in each layer for backprop
    /// and applies dropout where configured.
    pub fn forward(&mut self, input: Vec<f64>) -> Vec<f64> {
        let mut current = input;
        for layer in &mut self.layers {
            current = layer.feed_from(current);
        }
        current
    }

    /// Inference pass. Takes `&self`, so one loaded network can serve many
    /// threads at once.
    pub fn predict(&self, input: &[f64]) -> Vec<f64> {
        let mut current = input.to_vec();
        for layer in &self.layers {
            current = layer.infer(current);
        }
        current
    }

    /// Serializes the network weights to a JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json(path: impl AsRef<Path>) -> std::io::Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
