//! Per-event resolution: one conjunction record in, zero or one output record out.
//!
//! The steps for a record are:
//!
//! 1. gate on probability / minimum range ([`PresenceRule`])
//! 2. look both participants up in the [`CatalogIndex`]
//! 3. propagate both to the encounter time and check validity
//! 4. pick one state ([`SelectionPolicy`])
//! 5. convert it to geodetic coordinates and assemble the [`OutputRecord`]
//!
//! Every failure along the way is a [`SkipReason`] value. Nothing here is fatal
//! to the run.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::catalog::CatalogIndex;
use crate::domain::{
    CatalogEntry, ConjunctionRecord, ObjectId, OutputRecord, Participant, PresenceRule, SelectionPolicy, StateVector,
};
use crate::geo::{GeodeticConverter, gmst};
use crate::propagation::{PropagationError, StatePropagator, is_valid};

/// Why one participant's state could not be used.
#[derive(Debug, Clone, PartialEq)]
pub enum ParticipantFailure {
    Propagation(PropagationError),
    /// The propagator returned a state with NaN or infinite components.
    NumericInvalidity,
}

impl fmt::Display for ParticipantFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantFailure::Propagation(e) => write!(f, "{e}"),
            ParticipantFailure::NumericInvalidity => write!(f, "propagated state is not finite"),
        }
    }
}

/// Why a record produced no output.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Neither probability nor minimum range is present.
    NotAConjunction,
    /// The TCA field is missing or not a recognizable UTC timestamp.
    InvalidEncounterTime(Option<String>),
    /// A participant identifier has no element set (or no identifier at all).
    MissingCatalogEntry {
        participant: Participant,
        id: Option<ObjectId>,
    },
    /// Neither participant yielded a usable state.
    NoUsableParticipant {
        first: ParticipantFailure,
        second: ParticipantFailure,
    },
}

/// Coarse skip category, for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkipKind {
    NotAConjunction,
    InvalidEncounterTime,
    MissingCatalogEntry,
    NoUsableParticipant,
}

impl SkipKind {
    pub const ALL: [SkipKind; 4] = [
        SkipKind::NotAConjunction,
        SkipKind::InvalidEncounterTime,
        SkipKind::MissingCatalogEntry,
        SkipKind::NoUsableParticipant,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SkipKind::NotAConjunction => "no probability or minimum range",
            SkipKind::InvalidEncounterTime => "invalid encounter time",
            SkipKind::MissingCatalogEntry => "missing catalog entry",
            SkipKind::NoUsableParticipant => "no usable participant",
        }
    }
}

impl SkipReason {
    pub fn kind(&self) -> SkipKind {
        match self {
            SkipReason::NotAConjunction => SkipKind::NotAConjunction,
            SkipReason::InvalidEncounterTime(_) => SkipKind::InvalidEncounterTime,
            SkipReason::MissingCatalogEntry { .. } => SkipKind::MissingCatalogEntry,
            SkipReason::NoUsableParticipant { .. } => SkipKind::NoUsableParticipant,
        }
    }

    /// Numerical trouble is worth an operator's attention; the rest is routine.
    pub fn log_level(&self) -> log::Level {
        match self {
            SkipReason::NoUsableParticipant { .. } | SkipReason::InvalidEncounterTime(_) => log::Level::Warn,
            SkipReason::NotAConjunction | SkipReason::MissingCatalogEntry { .. } => log::Level::Debug,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotAConjunction => write!(f, "neither PC nor MIN_RNG present"),
            SkipReason::InvalidEncounterTime(Some(raw)) => write!(f, "unparseable TCA '{raw}'"),
            SkipReason::InvalidEncounterTime(None) => write!(f, "missing TCA"),
            SkipReason::MissingCatalogEntry { participant, id: Some(id) } => {
                write!(f, "{} {id} not in element catalog", participant.label())
            }
            SkipReason::MissingCatalogEntry { participant, id: None } => {
                write!(f, "{} has no identifier", participant.label())
            }
            SkipReason::NoUsableParticipant { first, second } => {
                write!(f, "no usable state (rso1: {first}; rso2: {second})")
            }
        }
    }
}

/// A successfully geolocated event.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub record: OutputRecord,
    /// Whose state the position came from.
    pub chosen: Participant,
    /// The other participant, if it failed (the event was rescued by fallback).
    pub rejected: Option<(Participant, ParticipantFailure)>,
}

pub type Resolved = Result<Resolution, SkipReason>;

/// Resolves conjunction records against a catalog with the given capabilities.
pub struct EventResolver<'a, P, G> {
    index: &'a CatalogIndex,
    propagator: &'a P,
    converter: &'a G,
    presence: PresenceRule,
    selection: SelectionPolicy,
}

impl<'a, P, G> EventResolver<'a, P, G>
where
    P: StatePropagator,
    G: GeodeticConverter,
{
    pub fn new(
        index: &'a CatalogIndex,
        propagator: &'a P,
        converter: &'a G,
        presence: PresenceRule,
        selection: SelectionPolicy,
    ) -> Self {
        Self {
            index,
            propagator,
            converter,
            presence,
            selection,
        }
    }

    pub fn resolve(&self, cdm: &ConjunctionRecord) -> Resolved {
        if !self.presence.probability_counts(cdm.pc.as_deref()) && !self.presence.min_range_counts(cdm.min_rng) {
            return Err(SkipReason::NotAConjunction);
        }

        let (id1, entry1) = self.lookup(Participant::First, cdm.sat1_id.as_deref())?;
        let (id2, entry2) = self.lookup(Participant::Second, cdm.sat2_id.as_deref())?;

        let tca_raw = cdm.tca.as_deref().ok_or(SkipReason::InvalidEncounterTime(None))?;
        let tca = parse_encounter_time(tca_raw)
            .ok_or_else(|| SkipReason::InvalidEncounterTime(Some(tca_raw.to_string())))?;

        let first = assess(self.propagator.propagate(&entry1.elements, tca));
        let second = assess(self.propagator.propagate(&entry2.elements, tca));

        let Some((chosen, state)) = select(self.selection, &first, &second).map(|(p, s)| (p, *s)) else {
            return Err(SkipReason::NoUsableParticipant {
                first: first.err().unwrap_or(ParticipantFailure::NumericInvalidity),
                second: second.err().unwrap_or(ParticipantFailure::NumericInvalidity),
            });
        };
        let position = self.converter.to_geodetic(&state.position, gmst(tca));

        let rejected = match chosen {
            Participant::First => second.err().map(|e| (Participant::Second, e)),
            Participant::Second => first.err().map(|e| (Participant::First, e)),
        };

        Ok(Resolution {
            record: OutputRecord {
                position,
                rso1_id: id1.to_string(),
                rso2_id: id2.to_string(),
                rso1_name: cdm.sat1_name.clone(),
                rso2_name: cdm.sat2_name.clone(),
                rso1_type: cdm.sat1_type.clone(),
                rso2_type: cdm.sat2_type.clone(),
                cdm_id: cdm.cdm_id.clone(),
                pc: cdm.pc.clone(),
                md: cdm.min_rng,
                tca: tca_raw.to_string(),
            },
            chosen,
            rejected,
        })
    }

    /// Returns the identifier as written in the record alongside its element set.
    fn lookup<'r>(
        &self,
        participant: Participant,
        raw_id: Option<&'r str>,
    ) -> Result<(&'r str, &'a CatalogEntry), SkipReason> {
        let missing = |id: Option<ObjectId>| SkipReason::MissingCatalogEntry { participant, id };
        let raw_id = raw_id.ok_or_else(|| missing(None))?;
        let id = ObjectId::new(raw_id);
        match self.index.lookup(&id) {
            Some(entry) => Ok((raw_id, entry)),
            None => Err(missing(Some(id))),
        }
    }
}

fn assess(result: Result<StateVector, PropagationError>) -> Result<StateVector, ParticipantFailure> {
    match result {
        Ok(state) if is_valid(&state) => Ok(state),
        Ok(_) => Err(ParticipantFailure::NumericInvalidity),
        Err(e) => Err(ParticipantFailure::Propagation(e)),
    }
}

/// Pick the representative state.
///
/// With [`SelectionPolicy::LastValidWins`], participant 2 overrides participant 1
/// whenever both are valid. With only one valid participant, that one is used
/// regardless of policy.
pub fn select<'s, E>(
    policy: SelectionPolicy,
    first: &'s Result<StateVector, E>,
    second: &'s Result<StateVector, E>,
) -> Option<(Participant, &'s StateVector)> {
    let first = first.as_ref().ok().map(|s| (Participant::First, s));
    let second = second.as_ref().ok().map(|s| (Participant::Second, s));
    match policy {
        SelectionPolicy::LastValidWins => second.or(first),
        SelectionPolicy::FirstValidWins => first.or(second),
    }
}

/// Parse a TCA string as UTC.
///
/// Space-Track emits `2024-03-01T12:34:56.123000` with no zone; an explicit `Z`
/// or offset is honored when present.
pub fn parse_encounter_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::collections::HashMap;

    use chrono::{DateTime, Utc};
    use nalgebra::Vector3;

    use crate::domain::{ElementSet, GeodeticPosition, StateVector};
    use crate::geo::GeodeticConverter;
    use crate::propagation::{PropagationError, StatePropagator};

    pub type Canned = Result<(Vector3<f64>, Vector3<f64>), PropagationError>;

    /// Returns canned (position, velocity) results keyed by element line 1.
    pub struct FakePropagator {
        pub results: HashMap<String, Canned>,
    }

    impl StatePropagator for FakePropagator {
        fn propagate(&self, elements: &ElementSet, at: DateTime<Utc>) -> Result<StateVector, PropagationError> {
            let (position, velocity) = self
                .results
                .get(&elements.line1)
                .cloned()
                .unwrap_or_else(|| Err(PropagationError::MalformedElementSet("unknown".to_string())))?;
            Ok(StateVector {
                position,
                velocity,
                epoch: at,
            })
        }
    }

    /// Echoes the inertial position so tests can tell participants apart.
    pub struct EchoConverter;

    impl GeodeticConverter for EchoConverter {
        fn to_geodetic(&self, position: &Vector3<f64>, _gmst: f64) -> GeodeticPosition {
            GeodeticPosition {
                longitude: position.x,
                latitude: position.y,
                altitude: position.z,
            }
        }
    }
}
