//! Epitope evaluation over a set of encoded complexes.
use crate::config::ScorerConfig;
use crate::device::DeviceSelector;
use crate::onnx::OnnxScorer;
use crate::report::{write_residue_scores, write_summary};
use crate::scorer::{ComplexScorer, EpitopeScorer};
use crate::source::{ModelKind, ModelSource};
use abepitope_core::{EncodedSet, EpitopeError};
use anyhow::{bail, Result};
use candle_core::Device;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub name: String,
    pub abepiscore: f32,
    pub abepitarget: f32,
    pub epitope_residues: usize,
    pub antigen_chains: Vec<String>,
    pub residue_scores: Vec<f32>,
}

/// Prediction capability: score everything it was built with and write the results.
pub trait Predictor {
    fn predict(&self, outdir: &Path) -> Result<Vec<Prediction>>;
}

pub struct EvalAbAgs {
    data: EncodedSet,
    scorer: Box<dyn ComplexScorer>,
}

impl EvalAbAgs {
    pub fn new(data: EncodedSet, device: DeviceSelector, source: &ModelSource) -> Result<Self> {
        let files = source.fetch()?;
        let scorer: Box<dyn ComplexScorer> = match ModelKind::from_path(&files.weights)? {
            ModelKind::Safetensors => {
                let config = match &files.config {
                    Some(path) => ScorerConfig::load(path)?,
                    None => ScorerConfig::default(),
                };
                let device = device.resolve()?;
                log::info!("Loading scoring head on {:?}", device);
                Box::new(EpitopeScorer::from_safetensors(
                    &files.weights,
                    &config,
                    &device,
                )?)
            }
            ModelKind::Onnx => {
                log::info!("Loading ONNX model {} ({})", files.weights.display(), device);
                Box::new(OnnxScorer::load(&files.weights, &device)?)
            }
        };
        Ok(Self::with_scorer(data, scorer))
    }

    pub fn with_scorer(data: EncodedSet, scorer: Box<dyn ComplexScorer>) -> Self {
        Self { data, scorer }
    }

    pub fn data(&self) -> &EncodedSet {
        &self.data
    }

    pub fn predict(&self, outdir: &Path) -> Result<Vec<Prediction>> {
        if self.data.is_empty() {
            return Err(EpitopeError::MissingEncodings(self.data.dir().to_path_buf()).into());
        }
        std::fs::create_dir_all(outdir)?;

        let mut predictions = Vec::with_capacity(self.data.len());
        for record in self.data.records() {
            let encoded = self.data.load_tensors(record, &Device::Cpu)?;
            let scores = self.scorer.score(&encoded)?;
            if scores.residue_scores.len() != record.residues.len() {
                bail!(
                    "{}: model returned {} residue scores for {} residues",
                    record.name,
                    scores.residue_scores.len(),
                    record.residues.len()
                );
            }
            let epitope_residues = record.epitope_count();
            if epitope_residues == 0 {
                log::warn!(
                    "{}: no antigen residues within {} Å of the antibody, scores are 0",
                    record.name,
                    record.interface_cutoff
                );
            }
            log::info!(
                "{}: AbEpiScore {:.4} AbEpiTarget {:.4}",
                record.name,
                scores.abepiscore,
                scores.abepitarget
            );
            write_residue_scores(outdir, record, &scores.residue_scores)?;
            predictions.push(Prediction {
                name: record.name.clone(),
                abepiscore: scores.abepiscore,
                abepitarget: scores.abepitarget,
                epitope_residues,
                antigen_chains: record
                    .antigen_chains()
                    .into_iter()
                    .map(String::from)
                    .collect(),
                residue_scores: scores.residue_scores,
            });
        }
        let summary = write_summary(outdir, &predictions)?;
        log::info!("Wrote {}", summary.display());
        Ok(predictions)
    }
}

impl Predictor for EvalAbAgs {
    fn predict(&self, outdir: &Path) -> Result<Vec<Prediction>> {
        EvalAbAgs::predict(self, outdir)
    }
}
