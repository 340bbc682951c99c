//! Inertial → geodetic conversion.
//!
//! - `sidereal`: Earth rotation angle (GMST) for an epoch
//! - [`GeodeticConverter`]: inertial position + GMST → longitude/latitude/altitude
//! - [`Wgs84Converter`]: iterative conversion on the WGS-84 ellipsoid

use std::f64::consts::{PI, TAU};

use nalgebra::Vector3;

use crate::domain::GeodeticPosition;

pub mod sidereal;

pub use sidereal::gmst;

/// WGS-84 equatorial radius (km).
pub const WGS84_A: f64 = 6378.137;
/// WGS-84 polar radius (km).
pub const WGS84_B: f64 = 6356.752_314_2;

const LATITUDE_ITERATIONS: usize = 20;

/// Converts an inertial position to geodetic coordinates.
///
/// Callers are expected to pass only finite positions; non-finite input yields
/// non-finite output.
pub trait GeodeticConverter {
    /// `gmst` is the Greenwich sidereal angle in radians at the position's epoch.
    fn to_geodetic(&self, position: &Vector3<f64>, gmst: f64) -> GeodeticPosition;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Wgs84Converter;

impl GeodeticConverter for Wgs84Converter {
    fn to_geodetic(&self, position: &Vector3<f64>, gmst: f64) -> GeodeticPosition {
        let a = WGS84_A;
        let f = (WGS84_A - WGS84_B) / WGS84_A;
        let e2 = 2.0 * f - f * f;

        let (x, y, z) = (position.x, position.y, position.z);
        let r = x.hypot(y);

        let longitude = wrap_pi(y.atan2(x) - gmst);

        let mut latitude = z.atan2(r);
        let mut c = 1.0;
        for _ in 0..LATITUDE_ITERATIONS {
            let sin_lat = latitude.sin();
            c = 1.0 / (1.0 - e2 * sin_lat * sin_lat).sqrt();
            latitude = (z + a * c * e2 * sin_lat).atan2(r);
        }
        let altitude = r / latitude.cos() - a * c;

        GeodeticPosition {
            longitude: longitude.to_degrees(),
            latitude: latitude.to_degrees(),
            altitude,
        }
    }
}

fn wrap_pi(mut angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    while angle < -PI {
        angle += TAU;
    }
    while angle > PI {
        angle -= TAU;
    }
    angle
}
