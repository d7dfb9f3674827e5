//! # Consensus-Lab
//!
//! A block consensus-rule walkthrough engine: given a parsed block
//! record from a node or indexer, it reproduces the core rules a full
//! node applies to accept or reject the block as an ordered sequence of
//! discrete, inspectable validation steps - compact-target decoding,
//! proof-of-work comparison, the subsidy schedule, merkle aggregation,
//! and per-transaction and per-block constraint checks - grouped into
//! five stages and replayable one step at a time.
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: the pipeline is deterministic and
//!    side-effect-free; every call allocates only local data
//! 2. **Total over its input**: any well-typed [`BlockRecord`] yields the
//!    full fixed-length step sequence - missing or malformed fields
//!    degrade individual steps to `info`, never abort the run
//! 3. **Honest verdicts**: a rule that cannot be judged from the data at
//!    hand says so; "unknown" is never folded into pass or fail
//! 4. **Teaching aid, not enforcement**: no script execution, no UTXO
//!    set, and the pipeline's merkle step aggregates structure rather
//!    than recomputing hashes (the standalone [`merkle_proof`] module
//!    does the real SHA-256d math)
//!
//! ## Usage
//!
//! ```rust
//! use consensus_lab::ConsensusLab;
//! use consensus_lab::types::BlockRecord;
//!
//! let lab = ConsensusLab::new();
//! let block = BlockRecord::from_json(r#"{ "header": { "height": 0, "hash": "" } }"#).unwrap();
//!
//! let steps = lab.validate_block(&block);
//! assert_eq!(steps.len(), 19);
//! ```

pub mod types;
pub mod constants;
pub mod error;
pub mod target;
pub mod pow;
pub mod subsidy;
pub mod merkle;
pub mod merkle_proof;
pub mod stage;
pub mod pipeline;
pub mod replay;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use error::{LabError, Result};
pub use merkle::MerkleLayers;
pub use merkle_proof::{MerkleProof, MerkleProofStep, SiblingPosition};
pub use replay::{StageProgress, StepReplay};
pub use stage::{StageDescriptor, STAGES, TOTAL_STEPS};

/// Main entry point to the validation lab
///
/// # Examples
///
/// ```
/// use consensus_lab::ConsensusLab;
///
/// let lab = ConsensusLab::new();
/// assert_eq!(lab.block_subsidy_sats(0), 5_000_000_000);
/// ```
pub struct ConsensusLab;

impl ConsensusLab {
    /// Create a new lab instance
    pub fn new() -> Self {
        Self
    }

    /// Run the full rule pipeline against a block record
    ///
    /// # Examples
    ///
    /// ```
    /// use consensus_lab::ConsensusLab;
    /// use consensus_lab::types::{BlockRecord, StepStatus};
    ///
    /// let lab = ConsensusLab::new();
    /// let block = BlockRecord::from_json(r#"{ "header": { "height": 0, "hash": "" } }"#).unwrap();
    ///
    /// // A record with everything stripped still yields every step,
    /// // degraded to pass/info - never fail, never an error.
    /// let steps = lab.validate_block(&block);
    /// assert!(steps.iter().all(|s| s.status != StepStatus::Fail));
    /// ```
    pub fn validate_block(&self, block: &BlockRecord) -> Vec<ValidationStep> {
        pipeline::validate_block(block)
    }

    /// Same as [`Self::validate_block`], with an explicit "now" in Unix
    /// seconds for the timestamp rule
    pub fn validate_block_at(&self, block: &BlockRecord, now: Natural) -> Vec<ValidationStep> {
        pipeline::validate_block_at(block, now)
    }

    /// Wrap a step sequence for one-step-at-a-time replay
    ///
    /// # Examples
    ///
    /// ```
    /// use consensus_lab::ConsensusLab;
    /// use consensus_lab::types::BlockRecord;
    ///
    /// let lab = ConsensusLab::new();
    /// let block = BlockRecord::from_json(r#"{ "header": { "height": 0, "hash": "" } }"#).unwrap();
    ///
    /// let mut replay = lab.replay(lab.validate_block(&block));
    /// assert_eq!(replay.cursor(), 0);
    /// replay.next_step();
    /// assert_eq!(replay.current().unwrap().id, "1.2");
    /// ```
    pub fn replay(&self, steps: Vec<ValidationStep>) -> StepReplay {
        StepReplay::new(steps)
    }

    /// Decode a compact "bits" value to a 64-character target hex string
    ///
    /// # Examples
    ///
    /// ```
    /// use consensus_lab::ConsensusLab;
    ///
    /// let lab = ConsensusLab::new();
    /// let target = lab.compact_to_target("1d00ffff").unwrap();
    /// assert_eq!(
    ///     target,
    ///     "00000000ffff0000000000000000000000000000000000000000000000000000"
    /// );
    /// ```
    pub fn compact_to_target(&self, bits: &str) -> Result<String> {
        target::compact_to_target(bits)
    }

    /// Re-encode a 64-character target hex string to compact form
    pub fn target_to_compact(&self, target_hex: &str) -> Result<String> {
        target::target_to_compact(target_hex)
    }

    /// Check whether a block hash satisfies a target
    ///
    /// # Examples
    ///
    /// ```
    /// use consensus_lab::ConsensusLab;
    ///
    /// let lab = ConsensusLab::new();
    /// let target = lab.compact_to_target("1d00ffff").unwrap();
    /// let hash = "00000000839a8e6886ab5951d76f411475428afc90947ee320161bbf18eb6048";
    /// assert!(lab.is_below_target(hash, &target));
    /// ```
    pub fn is_below_target(&self, hash: &str, target: &str) -> bool {
        pow::is_below_target(hash, target)
    }

    /// Difficulty of a compact target relative to the genesis target
    ///
    /// # Examples
    ///
    /// ```
    /// use consensus_lab::ConsensusLab;
    ///
    /// let lab = ConsensusLab::new();
    /// assert_eq!(lab.difficulty_ratio("1d00ffff").unwrap(), 1);
    /// ```
    pub fn difficulty_ratio(&self, bits: &str) -> Result<u128> {
        pow::difficulty_ratio(bits)
    }

    /// Block subsidy at a height, in satoshis
    ///
    /// # Examples
    ///
    /// ```
    /// use consensus_lab::ConsensusLab;
    ///
    /// let lab = ConsensusLab::new();
    /// assert_eq!(lab.block_subsidy_sats(210_000), 2_500_000_000);
    /// ```
    pub fn block_subsidy_sats(&self, height: Natural) -> Integer {
        subsidy::block_subsidy_sats(height)
    }

    /// Block subsidy at a height, in BTC
    pub fn block_subsidy_btc(&self, height: Natural) -> f64 {
        subsidy::block_subsidy_btc(height)
    }

    /// Build the layered merkle pairing structure for a txid list
    ///
    /// # Examples
    ///
    /// ```
    /// use consensus_lab::ConsensusLab;
    ///
    /// let lab = ConsensusLab::new();
    /// let txids: Vec<String> = (0..4).map(|i| format!("{:064x}", i)).collect();
    /// let tree = lab.build_merkle_layers(&txids);
    /// assert_eq!(tree.layers.len(), 3);
    /// ```
    pub fn build_merkle_layers(&self, txids: &[String]) -> MerkleLayers {
        merkle::build_layers(txids)
    }

    /// Compute the real SHA-256d merkle root of a txid list
    pub fn compute_merkle_root(&self, txids: &[String]) -> Result<String> {
        merkle_proof::compute_merkle_root(txids)
    }

    /// Build the SHA-256d inclusion proof for one transaction
    pub fn build_merkle_proof(&self, txids: &[String], tx_index: usize) -> Result<MerkleProof> {
        merkle_proof::build_merkle_proof(txids, tx_index)
    }

    /// Look up display metadata for a stage number
    pub fn stage_info(&self, stage: u8) -> Option<&'static StageDescriptor> {
        stage::stage_info(stage)
    }
}

impl Default for ConsensusLab {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facade_delegates_match_module_functions() {
        let lab = ConsensusLab::new();
        assert_eq!(
            lab.compact_to_target("1d00ffff").unwrap(),
            target::compact_to_target("1d00ffff").unwrap()
        );
        assert_eq!(lab.block_subsidy_sats(840_000), subsidy::block_subsidy_sats(840_000));
        assert_eq!(lab.stage_info(3).unwrap().name, "Coinbase Checks");
    }

    #[test]
    fn test_default_constructs() {
        let lab = ConsensusLab::default();
        assert_eq!(lab.difficulty_ratio("1d00ffff").unwrap(), 1);
    }
}
