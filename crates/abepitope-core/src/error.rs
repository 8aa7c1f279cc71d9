use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EpitopeError>;

#[derive(Debug, Error)]
pub enum EpitopeError {
    #[error("structure path does not exist: {0}")]
    MissingStructure(PathBuf),

    #[error("unsupported structure format: {0} (expected .pdb, .ent, .cif or .mmcif)")]
    UnsupportedFormat(PathBuf),

    #[error("no structure files found in {0}")]
    NoStructures(PathBuf),

    #[error("{name}: both {first} and {second} would be encoded under this name")]
    DuplicateName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("failed to parse {path}: {messages}")]
    Parse { path: PathBuf, messages: String },

    #[error("{name}: found {found} protein chain(s), need an antibody and an antigen")]
    TooFewChains { name: String, found: usize },

    #[error("{name}: chain {chain} is not present in the structure")]
    UnknownChain { name: String, chain: String },

    #[error("{name}: chain {chain} is assigned more than one role")]
    OverlappingChain { name: String, chain: String },

    #[error("{name}: no antigen chains assigned")]
    NoAntigen { name: String },

    #[error("no encodings found in {0}; run the encoding step first")]
    MissingEncodings(PathBuf),

    #[error("invalid encoding file {path}: {reason}")]
    InvalidEncoding { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Candle(#[from] candle_core::Error),

    #[error(transparent)]
    SafeTensor(#[from] safetensors::SafeTensorError),
}
