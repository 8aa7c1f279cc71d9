//! abepitope-core
//!
//! - load antibody-antigen complexes (PDB; mmcif) and assign chain roles.
//! - detect the antibody/antigen interface.
//! - encode complexes into ML-ready tensors on disk.
//!
pub mod chains;
pub mod constants;
pub mod encoding;
pub mod error;
pub mod interface;
pub mod structure;
pub mod workdirs;

pub use chains::{ChainAssignment, ChainRole};
pub use encoding::{
    EncodedComplex, EncodedSet, Encoder, EncodingOptions, EncodingRecord, ResidueLabel,
    StructureData,
};
pub use error::EpitopeError;
pub use structure::{Complex, Residue};
pub use workdirs::WorkDirs;
