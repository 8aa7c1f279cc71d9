//! abepitope models
//!
//! Scoring of encoded antibody-antigen complexes. Two backends are supported:
//! a small candle scoring head loaded from safetensors, and ONNX models run with
//! ONNX Runtime. Model files are read from disk or downloaded from the HuggingFace hub.
//!
pub mod config;
pub mod device;
pub mod evaluator;
pub mod onnx;
pub mod report;
pub mod scorer;
pub mod source;
pub mod utilities;

pub use config::ScorerConfig;
pub use device::DeviceSelector;
pub use evaluator::{EvalAbAgs, Prediction, Predictor};
pub use onnx::OnnxScorer;
pub use scorer::{ComplexScorer, ComplexScores, EpitopeScorer};
pub use source::{ModelFiles, ModelKind, ModelSource};
pub use utilities::tensor_to_ndarray_f32;
