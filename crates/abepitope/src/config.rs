//! Run configuration.
//!
//! Loaded from an optional JSON file; command line flags are applied on top.
use abepitope_core::constants::DEFAULT_INTERFACE_CUTOFF;
use abepitope_core::{ChainAssignment, EncodingOptions, WorkDirs};
use abepitope_models::{DeviceSelector, ModelSource};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    /// Base of `encodings/`, `temporary/` and `output/`. Defaults to the current directory.
    pub workdir: Option<PathBuf>,
    pub device: String,
    #[validate(range(min = 0.5, max = 20.0))]
    pub interface_cutoff: f32,
    pub weights: Option<PathBuf>,
    pub hub_repo: Option<String>,
    pub hub_revision: Option<String>,
    pub hub_file: Option<String>,
    pub heavy: Option<String>,
    pub light: Option<String>,
    pub antigen: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workdir: None,
            device: DeviceSelector::Auto.to_string(),
            interface_cutoff: DEFAULT_INTERFACE_CUTOFF,
            weights: None,
            hub_repo: None,
            hub_revision: None,
            hub_file: None,
            heavy: None,
            light: None,
            antigen: Vec::new(),
        }
    }
}

impl PipelineConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&config_str)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn device(&self) -> Result<DeviceSelector> {
        self.device.parse()
    }

    pub fn work_dirs(&self) -> Result<WorkDirs> {
        match &self.workdir {
            Some(dir) => Ok(WorkDirs::under(dir)),
            None => Ok(WorkDirs::from_current_dir()?),
        }
    }

    pub fn chain_assignment(&self) -> Result<ChainAssignment> {
        match (&self.heavy, self.antigen.is_empty()) {
            (None, true) if self.light.is_none() => Ok(ChainAssignment::FileOrder),
            (Some(heavy), false) => Ok(ChainAssignment::Explicit {
                heavy: heavy.clone(),
                light: self.light.clone(),
                antigen: self.antigen.clone(),
            }),
            _ => bail!("explicit chains need both a heavy chain and at least one antigen chain"),
        }
    }

    pub fn encoding_options(&self) -> Result<EncodingOptions> {
        Ok(EncodingOptions {
            interface_cutoff: self.interface_cutoff,
            assignment: self.chain_assignment()?,
        })
    }

    pub fn model_source(&self) -> Result<ModelSource> {
        match (&self.weights, &self.hub_repo) {
            (Some(weights), None) => Ok(ModelSource::Local(weights.clone())),
            (None, Some(repo)) => Ok(ModelSource::hub(
                repo,
                self.hub_revision.as_deref(),
                self.hub_file.as_deref(),
            )),
            (Some(_), Some(_)) => bail!("give either model weights or a hub repository, not both"),
            (None, None) => bail!("no model given: pass --weights <FILE> or --hub-repo <ID>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.device().unwrap(), DeviceSelector::Auto);
        assert_eq!(config.chain_assignment().unwrap(), ChainAssignment::FileOrder);
        assert!(config.model_source().is_err());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abepitope.json");
        std::fs::write(
            &path,
            r#"{"device": "cpu", "weights": "/models/model.safetensors", "interface_cutoff": 5.0}"#,
        )
        .unwrap();
        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.device().unwrap(), DeviceSelector::Cpu);
        assert_eq!(config.interface_cutoff, 5.0);
        assert_eq!(
            config.model_source().unwrap(),
            ModelSource::Local(PathBuf::from("/models/model.safetensors"))
        );
    }

    #[test]
    fn test_cutoff_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abepitope.json");
        std::fs::write(&path, r#"{"interface_cutoff": 50.0}"#).unwrap();
        assert!(PipelineConfig::load(&path).is_err());
    }

    #[test]
    fn test_explicit_chains() {
        let config = PipelineConfig {
            heavy: Some("B".to_string()),
            antigen: vec!["C".to_string(), "D".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            config.chain_assignment().unwrap(),
            ChainAssignment::Explicit { .. }
        ));

        let heavy_only = PipelineConfig {
            heavy: Some("B".to_string()),
            ..Default::default()
        };
        assert!(heavy_only.chain_assignment().is_err());
    }

    #[test]
    fn test_conflicting_model_sources() {
        let config = PipelineConfig {
            weights: Some(PathBuf::from("model.safetensors")),
            hub_repo: Some("org/model".to_string()),
            ..Default::default()
        };
        assert!(config.model_source().is_err());
    }
}
