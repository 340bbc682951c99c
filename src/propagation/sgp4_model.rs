//! SGP4 propagation backed by the `sgp4` crate.

use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use sgp4::{Constants, Elements};

use crate::domain::{ElementSet, StateVector};
use crate::propagation::{PropagationError, StatePropagator};

/// Stateless SGP4 propagator. Element lines are parsed on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sgp4Propagator;

impl Sgp4Propagator {
    pub fn new() -> Self {
        Self
    }
}

impl StatePropagator for Sgp4Propagator {
    fn propagate(&self, elements: &ElementSet, at: DateTime<Utc>) -> Result<StateVector, PropagationError> {
        let parsed = Elements::from_tle(None, elements.line1.trim().as_bytes(), elements.line2.trim().as_bytes())
            .map_err(|e| PropagationError::MalformedElementSet(e.to_string()))?;
        let constants = Constants::from_elements(&parsed)
            .map_err(|e| PropagationError::MalformedElementSet(e.to_string()))?;

        let minutes = parsed
            .datetime_to_minutes_since_epoch(&at.naive_utc())
            .map_err(|e| PropagationError::PropagationFailure(e.to_string()))?;
        let prediction = constants
            .propagate(minutes)
            .map_err(|e| PropagationError::PropagationFailure(e.to_string()))?;

        Ok(StateVector {
            position: Vector3::from(prediction.position),
            velocity: Vector3::from(prediction.velocity),
            epoch: at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::fixtures::{iss, iss_epoch};
    use crate::propagation::is_valid;
    use chrono::Duration;

    #[test]
    fn iss_propagates_to_low_earth_orbit() {
        let at = iss_epoch() + Duration::minutes(90);
        let state = Sgp4Propagator::new().propagate(&iss(), at).unwrap();

        assert!(is_valid(&state));
        assert_eq!(state.epoch, at);
        let r = state.position.norm();
        let v = state.velocity.norm();
        assert!((6600.0..6800.0).contains(&r), "radius {r} km");
        assert!((7.4..7.9).contains(&v), "speed {v} km/s");
    }

    #[test]
    fn garbage_lines_are_malformed() {
        let bad = ElementSet {
            line1: "not a tle".to_string(),
            line2: "still not a tle".to_string(),
        };
        let err = Sgp4Propagator::new().propagate(&bad, iss_epoch()).unwrap_err();
        assert!(matches!(err, PropagationError::MalformedElementSet(_)));
    }

    #[test]
    fn empty_lines_are_malformed() {
        let err = Sgp4Propagator::new()
            .propagate(&ElementSet::default(), iss_epoch())
            .unwrap_err();
        assert!(matches!(err, PropagationError::MalformedElementSet(_)));
    }
}
