//! Real merkle roots and inclusion proofs
//!
//! Unlike the structural builder in [`crate::merkle`], this module does
//! compute SHA-256d over txids. Display-order txids are byte-reversed to
//! Bitcoin's internal order, paired with the odd-node duplication rule,
//! double-SHA-256 hashed, and the final node is reversed back to display
//! order. Because the leaves here are txids (already hashes), the result
//! matches the header's merkle root for any block whose txid list is
//! complete and in block order.

use crate::error::{LabError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Which side of the pair the sibling sits on, from the leaf's view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiblingPosition {
    Left,
    Right,
}

/// One level of an inclusion proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProofStep {
    pub level: usize,
    /// Sibling hash in display order
    pub sibling: String,
    pub sibling_position: SiblingPosition,
}

/// Inclusion proof for one transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub txid: String,
    pub tx_index: usize,
    pub leaf_count: usize,
    pub root: String,
    pub path: Vec<MerkleProofStep>,
}

/// ComputeMerkleRoot: 𝕊* → 𝕊
///
/// SHA-256d merkle root of the given display-order txids.
pub fn compute_merkle_root(txids: &[String]) -> Result<String> {
    if txids.is_empty() {
        return Err(LabError::MerkleProof(
            "cannot build a merkle root with zero txids".to_string(),
        ));
    }

    let mut layer = to_internal_layer(txids)?;
    while layer.len() > 1 {
        layer = next_layer(&layer);
    }

    Ok(from_internal(&layer[0]))
}

/// Build the inclusion proof for the transaction at `tx_index`.
pub fn build_merkle_proof(txids: &[String], tx_index: usize) -> Result<MerkleProof> {
    if txids.is_empty() {
        return Err(LabError::MerkleProof(
            "cannot build a proof without txids".to_string(),
        ));
    }
    if tx_index >= txids.len() {
        return Err(LabError::MerkleProof(format!(
            "transaction index out of range: {}",
            tx_index
        )));
    }

    let mut path = Vec::new();
    let mut layer = to_internal_layer(txids)?;
    let mut index = tx_index;
    let mut level = 0;

    while layer.len() > 1 {
        let mut working = layer.clone();
        if working.len() % 2 != 0 {
            let last = working[working.len() - 1];
            working.push(last);
        }

        let sibling_index = if index % 2 == 0 { index + 1 } else { index - 1 };
        path.push(MerkleProofStep {
            level,
            sibling: from_internal(&working[sibling_index]),
            sibling_position: if index % 2 == 0 {
                SiblingPosition::Right
            } else {
                SiblingPosition::Left
            },
        });

        layer = next_layer(&layer);
        index /= 2;
        level += 1;
    }

    Ok(MerkleProof {
        txid: txids[tx_index].clone(),
        tx_index,
        leaf_count: txids.len(),
        root: from_internal(&layer[0]),
        path,
    })
}

/// Pair a layer (duplicating an odd tail) into its parent layer.
fn next_layer(layer: &[[u8; 32]]) -> Vec<[u8; 32]> {
    let mut working = layer.to_vec();
    if working.len() % 2 != 0 {
        let last = working[working.len() - 1];
        working.push(last);
    }

    working
        .chunks(2)
        .map(|pair| {
            let mut payload = [0u8; 64];
            payload[..32].copy_from_slice(&pair[0]);
            payload[32..].copy_from_slice(&pair[1]);
            sha256d(&payload)
        })
        .collect()
}

fn sha256d(payload: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(payload);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    out
}

fn to_internal_layer(txids: &[String]) -> Result<Vec<[u8; 32]>> {
    txids.iter().map(|txid| to_internal(txid)).collect()
}

/// Display-order hex to internal (reversed) bytes
fn to_internal(hash_hex: &str) -> Result<[u8; 32]> {
    let clean = hash_hex.trim().to_ascii_lowercase();
    if clean.len() != 64 || !clean.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(LabError::InvalidHex(hash_hex.to_string()));
    }

    let mut out = [0u8; 32];
    for (i, byte) in out.iter_mut().enumerate() {
        let pos = clean.len() - 2 * (i + 1);
        *byte = u8::from_str_radix(&clean[pos..pos + 2], 16)
            .map_err(|_| LabError::InvalidHex(hash_hex.to_string()))?;
    }
    Ok(out)
}

/// Internal bytes back to display-order hex
fn from_internal(internal: &[u8; 32]) -> String {
    let mut out = String::with_capacity(64);
    for byte in internal.iter().rev() {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}
