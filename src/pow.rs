//! Proof-of-work comparison and difficulty
//!
//! A hash satisfies proof of work when, read as a 256-bit unsigned
//! integer, it is numerically below the target. Both values travel
//! through this crate as fixed-width 64-character hex strings, so plain
//! lexicographic comparison *is* the numeric comparison — no big-integer
//! type is needed on this path. The difficulty ratio does need real
//! 256-bit division and gets it from [`crate::target`].

use crate::constants::GENESIS_BITS;
use crate::error::Result;
use crate::target::{compact_to_target, U256};

/// IsBelowTarget: 𝕊 × 𝕊 → {true, false}
///
/// Both operands are lower-cased and stripped of an optional `0x`
/// prefix before comparing.
///
/// # Panics
///
/// Panics when the normalized operands differ in length. Equal width is
/// what makes string order equal numeric order; unequal operands mean
/// the caller built a hash or target incorrectly, and tolerating that
/// silently would corrupt every pass/fail verdict downstream.
pub fn is_below_target(hash: &str, target: &str) -> bool {
    let hash = normalize(hash);
    let target = normalize(target);

    assert_eq!(
        hash.len(),
        target.len(),
        "hash and target must be equal-width hex strings"
    );

    hash < target
}

fn normalize(hex: &str) -> String {
    hex.trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X")
        .to_ascii_lowercase()
}

/// DifficultyRatio: 𝕊 → ℕ
///
/// Difficulty of a compact target, as the unscaled integer ratio
/// `genesis_target / current_target`, computed with 256-bit integer
/// division. A zero target has no defined difficulty and yields the
/// sentinel 0. Saturates at `u128::MAX` for targets below 2^96, far
/// under anything a real chain has produced.
pub fn difficulty_ratio(bits: &str) -> Result<u128> {
    let current = U256::from_hex(&compact_to_target(bits)?)?;
    if current.is_zero() {
        return Ok(0);
    }

    let max_target = U256::from_hex(&compact_to_target(GENESIS_BITS)?)?;
    let ratio = max_target.div(&current);

    if ratio.0[2] != 0 || ratio.0[3] != 0 {
        return Ok(u128::MAX);
    }
    Ok((ratio.0[1] as u128) << 64 | ratio.0[0] as u128)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS_TARGET: &str =
        "00000000ffff0000000000000000000000000000000000000000000000000000";

    #[test]
    fn test_is_below_target_true() {
        let hash = "00000000000000000002a7c4c1e48d76c5a37902165a270156b7a8d72728a054";
        assert!(is_below_target(hash, GENESIS_TARGET));
    }

    #[test]
    fn test_is_below_target_false() {
        let hash = "f".repeat(64);
        assert!(!is_below_target(&hash, GENESIS_TARGET));
    }

    #[test]
    fn test_is_below_target_equal_is_not_below() {
        assert!(!is_below_target(GENESIS_TARGET, GENESIS_TARGET));
    }

    #[test]
    fn test_is_below_target_normalizes_prefix_and_case() {
        let hash = format!("0x{}1", "0".repeat(63));
        let target = GENESIS_TARGET.to_ascii_uppercase();
        assert!(is_below_target(&hash, &target));
    }

    #[test]
    #[should_panic(expected = "equal-width")]
    fn test_is_below_target_rejects_unequal_width() {
        is_below_target("00ff", GENESIS_TARGET);
    }

    #[test]
    fn test_difficulty_ratio_genesis_is_one() {
        assert_eq!(difficulty_ratio("1d00ffff").unwrap(), 1);
    }

    #[test]
    fn test_difficulty_ratio_one_byte_harder() {
        // Same mantissa, exponent one lower: exactly 256x harder
        assert_eq!(difficulty_ratio("1c00ffff").unwrap(), 256);
        assert_eq!(difficulty_ratio("1b00ffff").unwrap(), 65536);
    }

    #[test]
    fn test_difficulty_ratio_known_value() {
        // 0x1b0404cb is the classic worked example; true difficulty is
        // 16307.42..., so the integer ratio floors to 16307
        assert_eq!(difficulty_ratio("1b0404cb").unwrap(), 16307);
    }

    #[test]
    fn test_difficulty_ratio_monotonic() {
        // Larger target => easier => strictly smaller difficulty
        let easier = difficulty_ratio("1d00ffff").unwrap();
        let harder = difficulty_ratio("17034219").unwrap();
        assert!(easier < harder);
    }

    #[test]
    fn test_difficulty_ratio_zero_target_sentinel() {
        assert_eq!(difficulty_ratio("1d000000").unwrap(), 0);
    }

    #[test]
    fn test_difficulty_ratio_rejects_malformed_bits() {
        assert!(difficulty_ratio("xyz").is_err());
    }
}
