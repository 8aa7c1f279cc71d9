//! Candle scoring head.
//!
//! A two-layer network over the per-residue features:
//!
//! * `h = relu(hidden(x))`
//! * residue score `sigmoid(residue_head(h))`
//! * AbEpiScore: mean residue score over the epitope residues
//! * AbEpiTarget: `sigmoid(target_head(mean(h over the epitope residues)))`
//!
use crate::config::ScorerConfig;
use abepitope_core::EncodedComplex;
use anyhow::{bail, Result};
use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{linear, ops::sigmoid, Linear, VarBuilder};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct ComplexScores {
    pub residue_scores: Vec<f32>,
    pub abepiscore: f32,
    pub abepitarget: f32,
}

/// Model seam: anything that can turn an encoded complex into scores.
pub trait ComplexScorer {
    fn score(&self, encoded: &EncodedComplex) -> Result<ComplexScores>;
}

pub struct EpitopeScorer {
    hidden: Linear,
    residue_head: Linear,
    target_head: Linear,
    config: ScorerConfig,
    device: Device,
}

impl EpitopeScorer {
    pub fn load(vb: VarBuilder, config: &ScorerConfig) -> Result<Self> {
        let device = vb.device().clone();
        Ok(Self {
            hidden: linear(config.input_dim, config.hidden_dim, vb.pp("hidden"))?,
            residue_head: linear(config.hidden_dim, 1, vb.pp("residue_head"))?,
            target_head: linear(config.hidden_dim, 1, vb.pp("target_head"))?,
            config: config.clone(),
            device,
        })
    }

    pub fn from_safetensors(weights: &Path, config: &ScorerConfig, device: &Device) -> Result<Self> {
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, device)? };
        Self::load(vb, config)
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// `[L, input_dim]` -> (hidden `[L, hidden_dim]`, residue scores `[L]`)
    pub fn forward(&self, features: &Tensor) -> Result<(Tensor, Tensor)> {
        let (_, input_dim) = features.dims2()?;
        if input_dim != self.config.input_dim {
            bail!(
                "features have {} columns, the scorer expects {}",
                input_dim,
                self.config.input_dim
            );
        }
        let hidden = self.hidden.forward(features)?.relu()?;
        let residue_scores = sigmoid(&self.residue_head.forward(&hidden)?)?.squeeze(1)?;
        Ok((hidden, residue_scores))
    }
}

impl ComplexScorer for EpitopeScorer {
    fn score(&self, encoded: &EncodedComplex) -> Result<ComplexScores> {
        let encoded = encoded.to_device(&self.device)?;
        let (hidden, residue_scores) = self.forward(&encoded.features)?;

        let epitope = encoded.epitope_indices()?;
        let (abepiscore, abepitarget) = if epitope.is_empty() {
            (0.0, 0.0)
        } else {
            let idx = Tensor::new(epitope.as_slice(), &self.device)?;
            let abepiscore = residue_scores
                .index_select(&idx, 0)?
                .mean_all()?
                .to_scalar::<f32>()?;
            let pooled = hidden.index_select(&idx, 0)?.mean_keepdim(0)?;
            let abepitarget = sigmoid(&self.target_head.forward(&pooled)?)?
                .squeeze(0)?
                .squeeze(0)?
                .to_scalar::<f32>()?;
            (abepiscore, abepitarget)
        };

        Ok(ComplexScores {
            residue_scores: residue_scores.to_vec1::<f32>()?,
            abepiscore,
            abepitarget,
        })
    }
}
