//! Orbital state propagation.
//!
//! The resolver only sees the [`StatePropagator`] trait: element set plus an
//! absolute target time in, inertial state (or an explicit failure) out. The
//! production implementation is SGP4 ([`Sgp4Propagator`]); tests substitute
//! fakes that return canned states.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::{ElementSet, StateVector};

mod sgp4_model;

pub use sgp4_model::Sgp4Propagator;

/// Why a propagator could not produce a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropagationError {
    /// The two-line element encoding could not be parsed or initialized.
    MalformedElementSet(String),
    /// The model could not produce a result at the requested time
    /// (decayed orbit, divergence, epoch out of range).
    PropagationFailure(String),
}

impl fmt::Display for PropagationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropagationError::MalformedElementSet(msg) => write!(f, "malformed element set: {msg}"),
            PropagationError::PropagationFailure(msg) => write!(f, "propagation failed: {msg}"),
        }
    }
}

impl std::error::Error for PropagationError {}

/// Elements + absolute time → inertial state vector.
///
/// Implementations must be pure: the same inputs always give the same output.
pub trait StatePropagator {
    fn propagate(&self, elements: &ElementSet, at: DateTime<Utc>) -> Result<StateVector, PropagationError>;
}

/// A state is usable iff every position and velocity component is finite.
///
/// No range or plausibility check is made beyond that.
pub fn is_valid(state: &StateVector) -> bool {
    state
        .position
        .iter()
        .chain(state.velocity.iter())
        .all(|v| v.is_finite())
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nalgebra::Vector3;

    fn state(position: Vector3<f64>, velocity: Vector3<f64>) -> StateVector {
        StateVector {
            position,
            velocity,
            epoch: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn finite_state_is_valid() {
        let s = state(Vector3::new(6778.0, 0.0, 0.0), Vector3::new(0.0, 7.6, 0.0));
        assert!(is_valid(&s));
    }

    #[test]
    fn nan_velocity_component_is_invalid() {
        let s = state(Vector3::new(6778.0, 0.0, 0.0), Vector3::new(0.0, f64::NAN, 0.0));
        assert!(!is_valid(&s));
    }

    #[test]
    fn infinite_position_component_is_invalid() {
        let s = state(Vector3::new(f64::INFINITY, 0.0, 0.0), Vector3::zeros());
        assert!(!is_valid(&s));
    }

    #[test]
    fn implausible_but_finite_state_is_still_valid() {
        let s = state(Vector3::new(1.0, 1.0, 1.0), Vector3::new(1e9, 0.0, 0.0));
        assert!(is_valid(&s));
    }
}
