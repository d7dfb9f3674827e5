//! Block subsidy schedule

use crate::constants::*;
use crate::types::{Integer, Natural};

/// GetBlockSubsidy: ℕ → ℤ
///
/// Subsidy in satoshis at a given height. Halves every 210,000 blocks;
/// exactly zero from the 64th halving on. The right shift is integer
/// division by 2^halvings, so the schedule never sees floating point.
pub fn block_subsidy_sats(height: Natural) -> Integer {
    let halvings = height / HALVING_INTERVAL;

    if halvings >= MAX_HALVINGS {
        return 0;
    }

    INITIAL_SUBSIDY >> halvings
}

/// Subsidy in BTC. The satoshi amount is computed first and converted at
/// the edge, so the value is exact to one satoshi.
pub fn block_subsidy_btc(height: Natural) -> f64 {
    block_subsidy_sats(height) as f64 / SATOSHIS_PER_BTC as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsidy_genesis() {
        assert_eq!(block_subsidy_sats(0), INITIAL_SUBSIDY);
        assert_eq!(block_subsidy_btc(0), 50.0);
    }

    #[test]
    fn test_subsidy_halvings() {
        assert_eq!(block_subsidy_sats(HALVING_INTERVAL - 1), INITIAL_SUBSIDY);
        assert_eq!(block_subsidy_sats(HALVING_INTERVAL), INITIAL_SUBSIDY / 2);
        assert_eq!(block_subsidy_sats(HALVING_INTERVAL * 2), INITIAL_SUBSIDY / 4);
        // Height 840,000: fourth epoch, 3.125 BTC
        assert_eq!(block_subsidy_sats(840_000), 312_500_000);
        assert_eq!(block_subsidy_btc(840_000), 3.125);
    }

    #[test]
    fn test_subsidy_caps_at_64_halvings() {
        assert_eq!(block_subsidy_sats(HALVING_INTERVAL * 64), 0);
        assert_eq!(block_subsidy_sats(HALVING_INTERVAL * 100), 0);
        assert_eq!(
            block_subsidy_sats(HALVING_INTERVAL * 64 - 1),
            INITIAL_SUBSIDY >> 63
        );
    }

    #[test]
    fn test_subsidy_halving_law() {
        // subsidy(h) == subsidy(h mod interval) >> (h / interval)
        for height in [0u64, 1, 12_345, 209_999, 210_000, 500_000, 840_000, 6_930_000] {
            let halvings = height / HALVING_INTERVAL;
            let base = block_subsidy_sats(height % HALVING_INTERVAL);
            let expected = if halvings >= MAX_HALVINGS {
                0
            } else {
                base >> halvings
            };
            assert_eq!(block_subsidy_sats(height), expected, "height {}", height);
        }
    }
}
