//! ONNX scoring backend.
//!
//! Expected model signature:
//!
//! * inputs: `features` `[1, L, 26]` f32, `epitope_mask` `[1, L]` f32
//! * outputs: `residue_scores` `[1, L]`, `abepiscore` `[1]`, `abepitarget` `[1]`
//!
use crate::device::DeviceSelector;
use crate::scorer::{ComplexScorer, ComplexScores};
use crate::utilities::tensor_to_ndarray_f32;
use abepitope_core::EncodedComplex;
use anyhow::{anyhow, Result};
use ort::{
    execution_providers::CUDAExecutionProvider,
    session::{builder::GraphOptimizationLevel, Session},
};
use std::path::Path;

pub struct OnnxScorer {
    session: Session,
}

impl OnnxScorer {
    pub fn load(model_path: &Path, device: &DeviceSelector) -> Result<Self> {
        let environment = ort::init().with_name("abepitope");
        let environment = if device.wants_cuda() {
            environment.with_execution_providers([CUDAExecutionProvider::default().build()])
        } else {
            environment
        };
        environment.commit()?;

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level1)?
            .with_intra_threads(1)?
            .commit_from_file(model_path)?;
        for input in &session.inputs {
            log::debug!("ONNX input {}: {:?}", input.name, input.input_type);
        }
        Ok(Self { session })
    }
}

impl ComplexScorer for OnnxScorer {
    fn score(&self, encoded: &EncodedComplex) -> Result<ComplexScores> {
        let features = tensor_to_ndarray_f32(&encoded.features.unsqueeze(0)?)?;
        let mask = tensor_to_ndarray_f32(&encoded.epitope_mask.unsqueeze(0)?)?;
        let outputs = self.session.run(ort::inputs![
            "features" => features,
            "epitope_mask" => mask,
        ]?)?;

        let residue_scores: Vec<f32> = outputs["residue_scores"]
            .try_extract_tensor::<f32>()?
            .iter()
            .copied()
            .collect();
        let scalar = |name: &str| -> Result<f32> {
            outputs[name]
                .try_extract_tensor::<f32>()?
                .iter()
                .next()
                .copied()
                .ok_or_else(|| anyhow!("model output {} is empty", name))
        };
        Ok(ComplexScores {
            residue_scores,
            abepiscore: scalar("abepiscore")?,
            abepitarget: scalar("abepitarget")?,
        })
    }
}
