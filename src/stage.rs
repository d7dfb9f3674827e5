//! The fixed stage/step catalogue
//!
//! The pipeline always emits the same steps in the same order. Making the
//! stages and their step counts a static table keeps any addition or
//! removal of a step a visible data change, enforced by the invariant
//! tests against the pipeline output.

use serde::Serialize;

/// Display metadata for one of the five validation stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageDescriptor {
    pub stage: u8,
    pub name: &'static str,
    /// Accent color hint for renderers
    pub accent: &'static str,
    /// Number of steps the pipeline emits for this stage
    pub step_count: usize,
}

/// The five stages, in pipeline order.
pub const STAGES: [StageDescriptor; 5] = [
    StageDescriptor {
        stage: 1,
        name: "Header Validation",
        accent: "cyan",
        step_count: 5,
    },
    StageDescriptor {
        stage: 2,
        name: "Merkle Verification",
        accent: "emerald",
        step_count: 2,
    },
    StageDescriptor {
        stage: 3,
        name: "Coinbase Checks",
        accent: "amber",
        step_count: 4,
    },
    StageDescriptor {
        stage: 4,
        name: "Transaction Validation",
        accent: "violet",
        step_count: 5,
    },
    StageDescriptor {
        stage: 5,
        name: "Block Constraints",
        accent: "rose",
        step_count: 3,
    },
];

/// Total number of steps a pipeline run emits
pub const TOTAL_STEPS: usize = 19;

/// Look up a stage descriptor by stage number (1-based).
pub fn stage_info(stage: u8) -> Option<&'static StageDescriptor> {
    STAGES.iter().find(|s| s.stage == stage)
}

/// The full ordered step-identifier catalogue ("1.1" .. "5.3"), derived
/// from the stage table.
pub fn catalogue_ids() -> Vec<String> {
    STAGES
        .iter()
        .flat_map(|s| (1..=s.step_count).map(move |i| format!("{}.{}", s.stage, i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_counts_sum_to_total() {
        let sum: usize = STAGES.iter().map(|s| s.step_count).sum();
        assert_eq!(sum, TOTAL_STEPS);
    }

    #[test]
    fn test_stage_info_lookup() {
        assert_eq!(stage_info(1).unwrap().name, "Header Validation");
        assert_eq!(stage_info(5).unwrap().name, "Block Constraints");
        assert!(stage_info(0).is_none());
        assert!(stage_info(6).is_none());
    }

    #[test]
    fn test_catalogue_ids_shape() {
        let ids = catalogue_ids();
        assert_eq!(ids.len(), TOTAL_STEPS);
        assert_eq!(ids[0], "1.1");
        assert_eq!(ids[4], "1.5");
        assert_eq!(ids[5], "2.1");
        assert_eq!(ids[18], "5.3");
    }
}
