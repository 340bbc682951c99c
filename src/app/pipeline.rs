//! The geolocation pipeline shared by every front end.
//!
//! load catalogs -> index elements -> resolve each conjunction -> collect -> persist
//!
//! Resolution is map-then-collect: every record is resolved independently
//! against the read-only index (optionally on the rayon pool), and the results
//! are folded back in input order. Parallel and sequential runs therefore write
//! byte-identical artifacts.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::catalog::CatalogIndex;
use crate::domain::{ConjunctionRecord, OutputRecord, Participant, RunConfig};
use crate::error::AppError;
use crate::geo::{GeodeticConverter, Wgs84Converter};
use crate::propagation::{Sgp4Propagator, StatePropagator};
use crate::resolve::{EventResolver, Resolved, SkipKind};

/// Counters describing one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub records_read: usize,
    pub catalog_indexed: usize,
    pub catalog_duplicates: usize,
    pub catalog_unidentified: usize,
    pub emitted: usize,
    pub skipped: BTreeMap<SkipKind, usize>,
    pub chose_first: usize,
    pub chose_second: usize,
    /// Events kept only because the other participant was unusable.
    pub fallbacks: usize,
    pub over_budget: usize,
}

impl RunStats {
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn skipped_of(&self, kind: SkipKind) -> usize {
        self.skipped.get(&kind).copied().unwrap_or(0)
    }
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub records: Vec<OutputRecord>,
    pub stats: RunStats,
}

/// Load inputs, geolocate every conjunction, and persist the artifact.
pub fn run_pipeline(config: &RunConfig) -> Result<RunOutput, AppError> {
    // 1) Load both catalogs; either failing aborts the run before any output.
    let conjunctions = crate::io::load_conjunctions(&config.cdm_path)?;
    let catalog = crate::io::load_catalog(&config.gp_path)?;

    // 2) Index element sets by object identifier.
    let index = CatalogIndex::build(catalog);

    // 3) Resolve.
    let output = geolocate(&conjunctions, &index, &Sgp4Propagator::new(), &Wgs84Converter, config);

    // 4) Persist once.
    crate::io::write_artifact(&config.output_path, &output.records, config.pretty)?;
    if let Some(path) = &config.export_csv {
        crate::io::write_records_csv(path, &output.records)?;
    }

    Ok(output)
}

struct Outcome {
    resolved: Resolved,
    elapsed: Duration,
}

/// Resolve every conjunction against `index`. Output order is input order.
pub fn geolocate<P, G>(
    conjunctions: &[ConjunctionRecord],
    index: &CatalogIndex,
    propagator: &P,
    converter: &G,
    config: &RunConfig,
) -> RunOutput
where
    P: StatePropagator + Sync,
    G: GeodeticConverter + Sync,
{
    let resolver = EventResolver::new(index, propagator, converter, config.presence, config.selection);

    let resolve_one = |cdm: &ConjunctionRecord| {
        let started = Instant::now();
        let resolved = resolver.resolve(cdm);
        Outcome {
            resolved,
            elapsed: started.elapsed(),
        }
    };

    let outcomes: Vec<Outcome> = if config.parallel {
        conjunctions.par_iter().map(resolve_one).collect()
    } else {
        conjunctions.iter().map(resolve_one).collect()
    };

    let mut stats = RunStats {
        records_read: conjunctions.len(),
        catalog_indexed: index.len(),
        catalog_duplicates: index.duplicates(),
        catalog_unidentified: index.unidentified(),
        ..RunStats::default()
    };
    let mut records = Vec::with_capacity(outcomes.len());

    for (cdm, outcome) in conjunctions.iter().zip(outcomes) {
        let label = cdm.cdm_id.as_deref().unwrap_or("<no id>");

        if let Some(budget) = config.record_budget {
            if outcome.elapsed > budget {
                stats.over_budget += 1;
                log::warn!(
                    "CDM {label}: resolution took {:?}, over the {:?} budget",
                    outcome.elapsed,
                    budget
                );
            }
        }

        match outcome.resolved {
            Ok(resolution) => {
                match resolution.chosen {
                    Participant::First => stats.chose_first += 1,
                    Participant::Second => stats.chose_second += 1,
                }
                if let Some((participant, failure)) = &resolution.rejected {
                    stats.fallbacks += 1;
                    log::warn!(
                        "CDM {label}: {} unusable ({failure}); using {}",
                        participant.label(),
                        resolution.chosen.label()
                    );
                }
                records.push(resolution.record);
            }
            Err(reason) => {
                log::log!(reason.log_level(), "CDM {label}: skipped, {reason}");
                *stats.skipped.entry(reason.kind()).or_insert(0) += 1;
            }
        }
    }

    stats.emitted = records.len();
    log::info!(
        "Geolocated {} of {} conjunctions ({} skipped)",
        stats.emitted,
        stats.records_read,
        stats.skipped_total()
    );

    RunOutput { records, stats }
}
