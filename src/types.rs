//! Core block and validation-step types
//!
//! The block-side records mirror the JSON a node/indexer returns
//! (`previousblockhash`, `vin`/`vout`, `scriptPubKey`, ...), so a caller
//! can deserialize a raw block response straight into a [`BlockRecord`].
//! Every field an indexer may strip carries a default: absence is a
//! documented input signal, not an error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Natural number type
pub type Natural = u64;

/// Integer type
pub type Integer = i64;

/// Block Header: ℋ = ℤ × 𝕊 × 𝕊 × ℕ × 𝕊 × ℕ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Version field; 0 means "not provided by the data source"
    #[serde(default)]
    pub version: Integer,
    /// 64-hex-char parent hash; empty or all-zero for genesis / missing data
    #[serde(default, rename = "previousblockhash")]
    pub previous_block_hash: String,
    #[serde(default, rename = "merkleroot")]
    pub merkle_root: String,
    /// Unix seconds
    #[serde(default)]
    pub time: Natural,
    /// Compact difficulty target in hex; "0" means "not provided"
    #[serde(default = "default_bits")]
    pub bits: String,
    #[serde(default)]
    pub nonce: Natural,
    /// The block's own identifying hash (64 hex chars)
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub height: Natural,
}

fn default_bits() -> String {
    "0".to_string()
}

/// Transaction input. The coinbase input has no previous output; an
/// indexer running in stripped mode may omit inputs entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vout: Option<u32>,
    /// Arbitrary miner payload; present only on the coinbase input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coinbase: Option<String>,
    #[serde(default)]
    pub sequence: Natural,
}

/// Output script descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptPubKey {
    #[serde(default)]
    pub hex: String,
    #[serde(default, rename = "type")]
    pub script_type: String,
}

/// Transaction output, value in BTC as the node reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub n: u32,
    #[serde(default, rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKey,
}

/// Transaction: 𝒯𝒳 = 𝕊 × 𝕊 × ℕ³ × ℐ* × 𝒯*
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub txid: String,
    /// Differs from txid for witness transactions
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub size: Natural,
    #[serde(default)]
    pub vsize: Natural,
    #[serde(default)]
    pub weight: Natural,
    #[serde(default)]
    pub vin: Vec<TxInput>,
    #[serde(default)]
    pub vout: Vec<TxOutput>,
}

impl Transaction {
    /// Sum of output values, rounded to whole satoshis.
    ///
    /// The node reports values as fractional BTC; comparisons against the
    /// subsidy schedule must happen at satoshi precision, so the float
    /// leaves the picture here.
    pub fn output_sats(&self) -> Integer {
        let btc: f64 = self.vout.iter().map(|out| out.value).sum();
        (btc * crate::constants::SATOSHIS_PER_BTC as f64).round() as Integer
    }
}

/// Block: ℬ = ℋ × 𝒯𝒳*
///
/// The declared `tx_count` is informational input from the data source;
/// the pipeline reports on a mismatch with `transactions.len()` but does
/// not reject the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub header: BlockHeader,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default, rename = "txCount")]
    pub tx_count: Natural,
    #[serde(default)]
    pub size: Natural,
    #[serde(default)]
    pub weight: Natural,
    #[serde(default, rename = "strippedsize")]
    pub stripped_size: Natural,
}

impl BlockRecord {
    /// Deserialize a block record from the raw JSON an indexer returns.
    pub fn from_json(raw: &str) -> crate::error::Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| crate::error::LabError::Serialization(e.to_string()))
    }
}

/// Verdict of a single validation step
///
/// `Info` is the "cannot judge" outcome: the record lacks the field the
/// rule needs, so the step explains itself instead of guessing. It is
/// never folded into `Pass` or `Fail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Pass,
    Fail,
    Info,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StepStatus::Pending => "pending",
            StepStatus::Pass => "pass",
            StepStatus::Fail => "fail",
            StepStatus::Info => "info",
        };
        f.write_str(label)
    }
}

/// A supplementary fact attached to a step: text, number, or flag.
/// Keeping the three kinds tagged lets a renderer format each safely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl fmt::Display for DetailValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailValue::Text(s) => f.write_str(s),
            // Whole numbers render without the trailing ".0"
            DetailValue::Number(n) if n.fract() == 0.0 && n.is_finite() => {
                write!(f, "{}", *n as i64)
            }
            DetailValue::Number(n) => write!(f, "{}", n),
            DetailValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for DetailValue {
    fn from(value: &str) -> Self {
        DetailValue::Text(value.to_string())
    }
}

impl From<String> for DetailValue {
    fn from(value: String) -> Self {
        DetailValue::Text(value)
    }
}

impl From<bool> for DetailValue {
    fn from(value: bool) -> Self {
        DetailValue::Flag(value)
    }
}

impl From<f64> for DetailValue {
    fn from(value: f64) -> Self {
        DetailValue::Number(value)
    }
}

impl From<u64> for DetailValue {
    fn from(value: u64) -> Self {
        DetailValue::Number(value as f64)
    }
}

impl From<i64> for DetailValue {
    fn from(value: i64) -> Self {
        DetailValue::Number(value as f64)
    }
}

impl From<usize> for DetailValue {
    fn from(value: usize) -> Self {
        DetailValue::Number(value as f64)
    }
}

/// Ordered key→value mapping of supplementary facts
pub type Details = Vec<(String, DetailValue)>;

/// One named, independently-judged rule check.
///
/// Steps are produced once per pipeline run, in full and in fixed order,
/// and are immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationStep {
    /// Stage-scoped identifier, e.g. "3.2"
    pub id: String,
    /// Stage number, 1 through 5
    pub stage: u8,
    pub name: String,
    pub description: String,
    /// The abstract consensus rule being illustrated
    pub rule: String,
    /// The concrete computed fact for this block
    pub check: String,
    /// Why the rule exists
    pub explanation: String,
    pub status: StepStatus,
    #[serde(default)]
    pub details: Details,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_record_from_indexer_json() {
        let raw = r#"{
            "header": {
                "version": 536870912,
                "previousblockhash": "00000000000000000002a7c4c1e48d76c5a37902165a270156b7a8d72728a054",
                "merkleroot": "5b7b9d4a1a1a68c5a6b0a79a4bfa1a63a9e1b3be1e2a8d72728a0545b7b9d4a1",
                "time": 1713571767,
                "bits": "17034219",
                "nonce": 3932395645,
                "hash": "00000000000000000000a7c4c1e48d76c5a37902165a270156b7a8d72728a054",
                "height": 840000
            },
            "transactions": [],
            "txCount": 3050,
            "size": 2325617,
            "weight": 3991770,
            "strippedsize": 555384
        }"#;

        let block = BlockRecord::from_json(raw).unwrap();
        assert_eq!(block.header.height, 840000);
        assert_eq!(block.header.bits, "17034219");
        assert_eq!(block.tx_count, 3050);
        assert_eq!(block.stripped_size, 555384);
    }

    #[test]
    fn test_block_record_defaults_for_stripped_fields() {
        let raw = r#"{ "header": { "hash": "" } }"#;
        let block = BlockRecord::from_json(raw).unwrap();

        assert_eq!(block.header.version, 0);
        assert_eq!(block.header.bits, "0");
        assert_eq!(block.header.previous_block_hash, "");
        assert!(block.transactions.is_empty());
        assert_eq!(block.weight, 0);
    }

    #[test]
    fn test_block_record_from_json_rejects_garbage() {
        let result = BlockRecord::from_json("not json");
        assert!(result.is_err());
    }

    #[test]
    fn test_output_sats_rounding() {
        let tx = Transaction {
            txid: "a".repeat(64),
            hash: "a".repeat(64),
            size: 200,
            vsize: 200,
            weight: 800,
            vin: vec![],
            vout: vec![
                TxOutput {
                    value: 3.12345678,
                    n: 0,
                    script_pub_key: ScriptPubKey {
                        hex: "0014".to_string(),
                        script_type: "witness_v0_keyhash".to_string(),
                    },
                },
                TxOutput {
                    value: 0.00000001,
                    n: 1,
                    script_pub_key: ScriptPubKey::default(),
                },
            ],
        };

        assert_eq!(tx.output_sats(), 312345679);
    }

    #[test]
    fn test_step_status_serde_lowercase() {
        assert_eq!(serde_json::to_string(&StepStatus::Pass).unwrap(), "\"pass\"");
        assert_eq!(serde_json::to_string(&StepStatus::Info).unwrap(), "\"info\"");
        let status: StepStatus = serde_json::from_str("\"fail\"").unwrap();
        assert_eq!(status, StepStatus::Fail);
    }

    #[test]
    fn test_detail_value_display() {
        assert_eq!(DetailValue::from(4_000_000u64).to_string(), "4000000");
        assert_eq!(DetailValue::from(3.125).to_string(), "3.125");
        assert_eq!(DetailValue::from(true).to_string(), "true");
        assert_eq!(DetailValue::from("abc").to_string(), "abc");
    }

    #[test]
    fn test_validation_step_serde_round_trip() {
        let step = ValidationStep {
            id: "1.5".to_string(),
            stage: 1,
            name: "Proof of Work".to_string(),
            description: "desc".to_string(),
            rule: "rule".to_string(),
            check: "check".to_string(),
            explanation: "why".to_string(),
            status: StepStatus::Pass,
            details: vec![("nonce".to_string(), DetailValue::from(12345u64))],
        };

        let json = serde_json::to_string(&step).unwrap();
        let back: ValidationStep = serde_json::from_str(&json).unwrap();
        assert_eq!(back, step);
    }
}
