use abepitope_core::constants::NUM_FEATURES;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Dimensions of the candle scoring head. Stored as `config.json` beside the weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ScorerConfig {
    #[validate(range(min = 1))]
    pub input_dim: usize,
    #[validate(range(min = 1))]
    pub hidden_dim: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            input_dim: NUM_FEATURES,
            hidden_dim: 64,
        }
    }
}

impl ScorerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("reading scorer config {}", path.display()))?;
        let config: ScorerConfig = serde_json::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }
}
