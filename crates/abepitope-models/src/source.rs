//! Locating model files, locally or on the HuggingFace hub.
use anyhow::{anyhow, bail, Result};
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_HUB_FILE: &str = "model.safetensors";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Local(PathBuf),
    Hub {
        repo: String,
        revision: String,
        filename: String,
    },
}

/// Which backend runs a model file, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Safetensors,
    Onnx,
}

impl ModelKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("safetensors") => Ok(ModelKind::Safetensors),
            Some("onnx") => Ok(ModelKind::Onnx),
            _ => bail!(
                "unsupported model file {}: expected .safetensors or .onnx",
                path.display()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub weights: PathBuf,
    pub config: Option<PathBuf>,
}

impl ModelSource {
    pub fn hub(repo: &str, revision: Option<&str>, filename: Option<&str>) -> Self {
        ModelSource::Hub {
            repo: repo.to_string(),
            revision: revision.unwrap_or("main").to_string(),
            filename: filename.unwrap_or(DEFAULT_HUB_FILE).to_string(),
        }
    }

    /// Resolve to files on disk, downloading from the hub when needed.
    pub fn fetch(&self) -> Result<ModelFiles> {
        match self {
            ModelSource::Local(weights) => {
                if !weights.is_file() {
                    bail!("model weights not found: {}", weights.display());
                }
                let config = weights.with_file_name(CONFIG_FILE);
                Ok(ModelFiles {
                    weights: weights.clone(),
                    config: config.is_file().then_some(config),
                })
            }
            ModelSource::Hub {
                repo,
                revision,
                filename,
            } => {
                log::info!("Fetching {} from {}@{}", filename, repo, revision);
                let api = Api::new()?;
                let api = api.repo(Repo::with_revision(
                    repo.clone(),
                    RepoType::Model,
                    revision.clone(),
                ));
                let weights = api
                    .get(filename)
                    .map_err(|e| anyhow!("failed to fetch {} from {}: {}", filename, repo, e))?;
                let config = match ModelKind::from_path(&weights)? {
                    ModelKind::Safetensors => api.get(CONFIG_FILE).ok(),
                    ModelKind::Onnx => None,
                };
                Ok(ModelFiles { weights, config })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(
            ModelKind::from_path(Path::new("a/model.safetensors")).unwrap(),
            ModelKind::Safetensors
        );
        assert_eq!(
            ModelKind::from_path(Path::new("model.onnx")).unwrap(),
            ModelKind::Onnx
        );
        assert!(ModelKind::from_path(Path::new("model.pt")).is_err());
    }

    #[test]
    fn test_local() {
        let dir = tempfile::tempdir().unwrap();
        let weights = dir.path().join("model.safetensors");
        assert!(ModelSource::Local(weights.clone()).fetch().is_err());

        std::fs::write(&weights, b"").unwrap();
        let files = ModelSource::Local(weights.clone()).fetch().unwrap();
        assert_eq!(files.config, None);

        std::fs::write(dir.path().join(CONFIG_FILE), "{}").unwrap();
        let files = ModelSource::Local(weights).fetch().unwrap();
        assert_eq!(files.config, Some(dir.path().join(CONFIG_FILE)));
    }

    #[test]
    fn test_hub_defaults() {
        assert_eq!(
            ModelSource::hub("org/model", None, None),
            ModelSource::Hub {
                repo: "org/model".to_string(),
                revision: "main".to_string(),
                filename: DEFAULT_HUB_FILE.to_string(),
            }
        );
    }
}
