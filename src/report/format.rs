//! Formatted terminal output.
//!
//! Kept separate from the pipeline so output changes stay localized.

use crate::app::pipeline::RunStats;
use crate::domain::RunConfig;
use crate::report::{ArtifactStats, MAX_WEIGHT_LEVEL};
use crate::resolve::SkipKind;

/// Summary printed after `cdmgeo run`.
pub fn format_run_summary(stats: &RunStats, config: &RunConfig) -> String {
    let mut out = String::new();

    out.push_str("=== cdmgeo - conjunction geolocation ===\n");
    out.push_str(&format!("Conjunctions: {} ({})\n", stats.records_read, config.cdm_path.display()));
    out.push_str(&format!(
        "Element sets: {} indexed ({})",
        stats.catalog_indexed,
        config.gp_path.display()
    ));
    if stats.catalog_duplicates > 0 || stats.catalog_unidentified > 0 {
        out.push_str(&format!(
            ", {} duplicate and {} unidentified ignored",
            stats.catalog_duplicates, stats.catalog_unidentified
        ));
    }
    out.push('\n');
    out.push_str(&format!(
        "Presence rule: {:?}, selection: {:?}, {}\n",
        config.presence,
        config.selection,
        if config.parallel { "parallel" } else { "sequential" }
    ));

    out.push_str(&format!("\nGeolocated: {}\n", stats.emitted));
    out.push_str(&format!(
        "  position from rso1: {}, from rso2: {} ({} by fallback)\n",
        stats.chose_first, stats.chose_second, stats.fallbacks
    ));

    out.push_str(&format!("Skipped: {}\n", stats.skipped_total()));
    for kind in SkipKind::ALL {
        let n = stats.skipped_of(kind);
        if n > 0 {
            out.push_str(&format!("  {}: {n}\n", kind.label()));
        }
    }

    if let Some(budget) = config.record_budget {
        out.push_str(&format!(
            "Over the {} ms record budget: {}\n",
            budget.as_millis(),
            stats.over_budget
        ));
    }

    out.push_str(&format!("\nWrote {}\n", config.output_path.display()));
    if let Some(path) = &config.export_csv {
        out.push_str(&format!("Exported {}\n", path.display()));
    }

    out
}

/// Summary printed by `cdmgeo stats`.
pub fn format_artifact_stats(stats: &ArtifactStats) -> String {
    let mut out = String::new();

    out.push_str(&format!("Records: {}\n", stats.count));
    if let (Some(lo), Some(hi)) = (stats.altitude_min, stats.altitude_max) {
        out.push_str(&format!("Altitude: {lo:.1} .. {hi:.1} km\n"));
    }

    out.push_str("PC weight levels:\n");
    let widest = stats.weight_levels.values().copied().max().unwrap_or(0).max(1);
    for level in (0..=MAX_WEIGHT_LEVEL).rev() {
        let n = stats.weight_levels.get(&level).copied().unwrap_or(0);
        let bar = "#".repeat((n * 40).div_ceil(widest));
        out.push_str(&format!("  {level} | {n:>6} {bar}\n"));
    }
    if stats.without_pc > 0 {
        out.push_str(&format!("  ({} records without PC counted at level 0)\n", stats.without_pc));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::time::Duration;

    #[test]
    fn run_summary_lists_nonzero_skip_reasons() {
        let stats = RunStats {
            records_read: 10,
            catalog_indexed: 20,
            catalog_duplicates: 1,
            emitted: 6,
            skipped: BTreeMap::from([(SkipKind::MissingCatalogEntry, 3), (SkipKind::NoUsableParticipant, 1)]),
            chose_first: 2,
            chose_second: 4,
            fallbacks: 1,
            over_budget: 2,
            ..RunStats::default()
        };
        let config = RunConfig {
            record_budget: Some(Duration::from_millis(250)),
            ..RunConfig::default()
        };

        let text = format_run_summary(&stats, &config);
        assert!(text.contains("Conjunctions: 10 (cdm_public.json)"));
        assert!(text.contains("1 duplicate and 0 unidentified ignored"));
        assert!(text.contains("Geolocated: 6"));
        assert!(text.contains("from rso2: 4 (1 by fallback)"));
        assert!(text.contains("Skipped: 4"));
        assert!(text.contains("  missing catalog entry: 3\n"));
        assert!(!text.contains("invalid encounter time"));
        assert!(text.contains("Over the 250 ms record budget: 2"));
        assert!(text.contains("Wrote public/cdmsWithPositions.json"));
    }

    #[test]
    fn artifact_stats_render_every_level() {
        let stats = ArtifactStats {
            count: 3,
            weight_levels: BTreeMap::from([(2, 2), (0, 1)]),
            without_pc: 1,
            altitude_min: Some(400.0),
            altitude_max: Some(812.25),
        };
        let text = format_artifact_stats(&stats);
        assert!(text.contains("Altitude: 400.0 .. 812.2 km") || text.contains("Altitude: 400.0 .. 812.3 km"));
        for level in 0..=MAX_WEIGHT_LEVEL {
            assert!(text.contains(&format!("  {level} | ")));
        }
        assert!(text.contains(&format!("  2 |      2 {}", "#".repeat(40))));
        assert!(text.contains("1 records without PC"));
    }
}
