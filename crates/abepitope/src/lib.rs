//! abepitope
//!
//! - encode antibody-antigen structures (PDB; mmcif) into ML-ready tensors.
//! - score the encoded complexes for epitope prediction.
//! - CLI to handle the above.
//!
pub mod config;
pub mod pipeline;

pub use config::PipelineConfig;
pub use pipeline::{Pipeline, PipelineOutput};
