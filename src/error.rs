//! Error types for the validation lab

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabError {
    #[error("Invalid hex string: {0}")]
    InvalidHex(String),

    #[error("Invalid compact target: {0}")]
    InvalidCompactTarget(String),

    #[error("Merkle proof failed: {0}")]
    MerkleProof(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, LabError>;
