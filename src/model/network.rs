//! Surrogate Network Module
//! Handles loading and evaluating pretrained dense surrogate models
//! exported as JSON weight dumps.

use std::fs;
use std::path::Path;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Variance floor used when a batch-norm layer omits its epsilon.
pub const DEFAULT_EPSILON: f64 = 1e-3;

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse model file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model contains no layers")]
    Empty,
    #[error("layer {layer}: empty weight matrix")]
    EmptyWeights { layer: usize },
    #[error("layer {layer}: ragged weight matrix")]
    RaggedWeights { layer: usize },
    #[error("layer {layer}: expected width {expected}, found {found}")]
    WidthMismatch {
        layer: usize,
        expected: usize,
        found: usize,
    },
    #[error("input has {found} values but the model takes {expected}")]
    InputSize { expected: usize, found: usize },
    #[error("internal shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Pointwise nonlinearity applied after a dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Swish,
    Linear,
}

impl Activation {
    fn apply(self, z: Array1<f64>) -> Array1<f64> {
        match self {
            // swish(x) = x * sigmoid(x)
            Activation::Swish => z.mapv_into(|v| v / (1.0 + (-v).exp())),
            Activation::Linear => z,
        }
    }
}

/// One layer of the serialized model, as it appears in the JSON dump.
/// Dense weights are row-major with one row per input feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerSpec {
    Dense {
        weights: Vec<Vec<f64>>,
        biases: Vec<f64>,
        activation: Activation,
    },
    BatchNorm {
        gamma: Vec<f64>,
        beta: Vec<f64>,
        mean: Vec<f64>,
        variance: Vec<f64>,
        #[serde(default = "default_epsilon")]
        epsilon: f64,
    },
}

/// Top-level structure of a model file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub layers: Vec<LayerSpec>,
}

enum Layer {
    Dense {
        weights: Array2<f64>,
        biases: Array1<f64>,
        activation: Activation,
    },
    BatchNorm {
        gamma: Array1<f64>,
        beta: Array1<f64>,
        mean: Array1<f64>,
        variance: Array1<f64>,
        epsilon: f64,
    },
}

impl Layer {
    fn forward(&self, x: Array1<f64>) -> Array1<f64> {
        match self {
            Layer::Dense {
                weights,
                biases,
                activation,
            } => activation.apply(x.dot(weights) + biases),
            Layer::BatchNorm {
                gamma,
                beta,
                mean,
                variance,
                epsilon,
            } => {
                // inference form: gamma * (x - mean) / sqrt(var + eps) + beta
                let scale = variance.mapv(|v| (v + *epsilon).sqrt());
                (x - mean) / &scale * gamma + beta
            }
        }
    }
}

/// A validated, ready-to-evaluate surrogate network.
pub struct SurrogateModel {
    name: Option<String>,
    layers: Vec<Layer>,
    input_size: usize,
    output_size: usize,
}

impl SurrogateModel {
    /// Read a JSON weight dump from disk and compile it.
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let raw = fs::read_to_string(path)?;
        let spec: ModelSpec = serde_json::from_str(&raw)?;
        debug!(path = %path.display(), layers = spec.layers.len(), "parsed model file");
        Self::from_spec(spec)
    }

    /// Validate a parsed spec and compile its layers into ndarray form.
    /// Layer widths must chain: each layer has to accept exactly the
    /// width the previous layer emits.
    pub fn from_spec(spec: ModelSpec) -> Result<Self, ModelError> {
        if spec.layers.is_empty() {
            return Err(ModelError::Empty);
        }

        let mut layers = Vec::with_capacity(spec.layers.len());
        let mut width: Option<usize> = None;
        let mut input_size = 0;

        for (idx, layer) in spec.layers.into_iter().enumerate() {
            let (compiled, accepts, emits) = match layer {
                LayerSpec::Dense {
                    weights,
                    biases,
                    activation,
                } => {
                    let rows = weights.len();
                    if rows == 0 {
                        return Err(ModelError::EmptyWeights { layer: idx });
                    }
                    let cols = weights[0].len();
                    if cols == 0 {
                        return Err(ModelError::EmptyWeights { layer: idx });
                    }
                    if weights.iter().any(|row| row.len() != cols) {
                        return Err(ModelError::RaggedWeights { layer: idx });
                    }
                    if biases.len() != cols {
                        return Err(ModelError::WidthMismatch {
                            layer: idx,
                            expected: cols,
                            found: biases.len(),
                        });
                    }

                    let flat: Vec<f64> = weights.into_iter().flatten().collect();
                    let weights = Array2::from_shape_vec((rows, cols), flat)?;
                    let compiled = Layer::Dense {
                        weights,
                        biases: Array1::from_vec(biases),
                        activation,
                    };
                    (compiled, rows, cols)
                }
                LayerSpec::BatchNorm {
                    gamma,
                    beta,
                    mean,
                    variance,
                    epsilon,
                } => {
                    let len = gamma.len();
                    if len == 0 {
                        return Err(ModelError::EmptyWeights { layer: idx });
                    }
                    for other in [beta.len(), mean.len(), variance.len()] {
                        if other != len {
                            return Err(ModelError::WidthMismatch {
                                layer: idx,
                                expected: len,
                                found: other,
                            });
                        }
                    }
                    let compiled = Layer::BatchNorm {
                        gamma: Array1::from_vec(gamma),
                        beta: Array1::from_vec(beta),
                        mean: Array1::from_vec(mean),
                        variance: Array1::from_vec(variance),
                        epsilon,
                    };
                    (compiled, len, len)
                }
            };

            match width {
                None => input_size = accepts,
                Some(w) if w != accepts => {
                    return Err(ModelError::WidthMismatch {
                        layer: idx,
                        expected: w,
                        found: accepts,
                    });
                }
                Some(_) => {}
            }
            width = Some(emits);
            layers.push(compiled);
        }

        Ok(Self {
            name: spec.name,
            layers,
            input_size,
            // the loop runs at least once, so width is always set here
            output_size: width.unwrap_or(0),
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Run one forward pass through every layer.
    pub fn predict(&self, input: &Array1<f64>) -> Result<Array1<f64>, ModelError> {
        if input.len() != self.input_size {
            return Err(ModelError::InputSize {
                expected: self.input_size,
                found: input.len(),
            });
        }
        let mut x = input.to_owned();
        for layer in &self.layers {
            x = layer.forward(x);
        }
        Ok(x)
    }
}

/// Default input profile: one full sine period sampled uniformly with
/// both endpoints included.
pub fn sine_profile(len: usize) -> Array1<f64> {
    Array1::linspace(0.0, std::f64::consts::TAU, len).mapv_into(f64::sin)
}
