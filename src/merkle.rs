//! Merkle tree structure builder
//!
//! Builds the layered pairing structure a merkle root commits to, for
//! step-by-step display. The combined node values are placeholders that
//! mark where a SHA-256d of the concatenated pair would go — raw
//! transaction bytes are not reconstructable from an indexer record, so
//! this routine teaches tree *shape*, and its root must never be compared
//! against the header's merkle root. The real-hash path lives in
//! [`crate::merkle_proof`].

use serde::{Deserialize, Serialize};

/// The layered pairing structure of a block's transactions.
///
/// `layers[0]` is the input txid sequence unchanged; each later layer
/// pairs the one below, and the last layer holds exactly the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleLayers {
    pub root: String,
    pub layers: Vec<Vec<String>>,
}

/// BuildLayers: 𝕊* → 𝕊 × 𝕊**
///
/// Standard Bitcoin pairing: an odd layer duplicates its last element,
/// then pairs combine left to right. Empty input yields an empty root
/// and no layers.
pub fn build_layers(txids: &[String]) -> MerkleLayers {
    if txids.is_empty() {
        return MerkleLayers {
            root: String::new(),
            layers: Vec::new(),
        };
    }

    let mut layer: Vec<String> = txids.to_vec();
    let mut layers = vec![layer.clone()];

    while layer.len() > 1 {
        if layer.len() % 2 != 0 {
            let last = layer[layer.len() - 1].clone();
            layer.push(last);
        }

        let mut next = Vec::with_capacity(layer.len() / 2);
        for pair in layer.chunks(2) {
            next.push(pair_placeholder(&pair[0], &pair[1]));
        }

        layer = next;
        layers.push(layer.clone());
    }

    MerkleLayers {
        root: layer[0].clone(),
        layers,
    }
}

/// Placeholder for "SHA256d(left ‖ right)"
fn pair_placeholder(left: &str, right: &str) -> String {
    format!("hash({}...+{}...)", prefix(left, 8), prefix(right, 8))
}

fn prefix(value: &str, len: usize) -> &str {
    &value[..value.len().min(len)]
}
