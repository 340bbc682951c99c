//! Reporting utilities: collision-probability weighting, artifact statistics,
//! and formatted terminal output.

use std::collections::BTreeMap;

use crate::domain::OutputRecord;

pub mod format;

pub use format::*;

/// Highest weight level a probability can earn.
pub const MAX_WEIGHT_LEVEL: u32 = 4;

/// Heat-map weight for a collision probability.
///
/// Each leading zero after the decimal point costs one level:
/// `0.5 → 4`, `0.05 → 3`, `0.0012 → 2`, `0.00012 → 1`, anything smaller `→ 0`.
/// Unparseable, zero, or negative probabilities weigh nothing.
pub fn pc_weight_level(pc: &str) -> u32 {
    let Ok(value) = pc.trim().parse::<f64>() else {
        return 0;
    };
    if !(value.is_finite() && value > 0.0) {
        return 0;
    }
    let leading_zeros = (-value.log10().floor() - 1.0).max(0.0);
    (MAX_WEIGHT_LEVEL as f64 - leading_zeros).max(0.0) as u32
}

/// Summary of an output artifact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactStats {
    pub count: usize,
    /// Records per weight level (records without a probability are level 0).
    pub weight_levels: BTreeMap<u32, usize>,
    pub without_pc: usize,
    pub altitude_min: Option<f64>,
    pub altitude_max: Option<f64>,
}

impl ArtifactStats {
    pub fn from_records(records: &[OutputRecord]) -> Self {
        let mut stats = Self {
            count: records.len(),
            ..Self::default()
        };

        for r in records {
            let level = match r.pc.as_deref() {
                Some(pc) => pc_weight_level(pc),
                None => {
                    stats.without_pc += 1;
                    0
                }
            };
            *stats.weight_levels.entry(level).or_insert(0) += 1;

            let alt = r.position.altitude;
            if alt.is_finite() {
                stats.altitude_min = Some(stats.altitude_min.map_or(alt, |m| m.min(alt)));
                stats.altitude_max = Some(stats.altitude_max.map_or(alt, |m| m.max(alt)));
            }
        }

        stats
    }
}
