//! Bitcoin consensus constants used by the validation pipeline

/// Halving interval: 210,000 blocks
pub const HALVING_INTERVAL: u64 = 210_000;

/// Initial block subsidy: 50 BTC
pub const INITIAL_SUBSIDY: i64 = 50 * 100_000_000;

/// Satoshis per BTC
pub const SATOSHIS_PER_BTC: i64 = 100_000_000;

/// Subsidy is exactly zero from this many halvings on
pub const MAX_HALVINGS: u64 = 64;

/// Minimum valid block version
pub const BLOCK_VERSION_MIN: i64 = 1;

/// Maximum valid block version (signed 32-bit range)
pub const BLOCK_VERSION_MAX: i64 = 0x7fff_ffff;

/// Maximum block weight: 4M weight units (SegWit)
pub const MAX_BLOCK_WEIGHT: u64 = 4_000_000;

/// Maximum signature operations per block
pub const MAX_BLOCK_SIGOPS: u64 = 80_000;

/// Coinbase outputs are spendable after this many confirmations
pub const COINBASE_MATURITY: u64 = 100;

/// Wall-clock tolerance for header timestamps: 2 hours
pub const MAX_FUTURE_BLOCK_TIME: u64 = 2 * 60 * 60;

/// Compact target of the genesis block (minimum difficulty)
pub const GENESIS_BITS: &str = "1d00ffff";

/// Length of a 256-bit hash rendered as hex
pub const HASH_HEX_LEN: usize = 64;

/// Default auto-advance interval for step replay, in milliseconds
pub const AUTO_ADVANCE_INTERVAL_MS: u64 = 1500;
