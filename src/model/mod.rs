//! Model module - surrogate network loading and inference

mod network;

pub use network::{
    sine_profile, Activation, LayerSpec, ModelError, ModelSpec, SurrogateModel, DEFAULT_EPSILON,
};
