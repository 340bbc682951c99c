//! Greenwich mean sidereal time.

use std::f64::consts::TAU;

use chrono::{DateTime, Utc};

/// Julian date of the Unix epoch.
const JD_UNIX_EPOCH: f64 = 2_440_587.5;
const JD_J2000: f64 = 2_451_545.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;
const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Julian date of a UTC instant (UT1 ≈ UTC).
pub fn julian_date(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / MILLIS_PER_DAY + JD_UNIX_EPOCH
}

/// IAU-1982 GMST in radians, normalized to `[0, 2π)`.
pub fn gmst(at: DateTime<Utc>) -> f64 {
    gmst_from_julian(julian_date(at))
}

pub fn gmst_from_julian(jd_ut1: f64) -> f64 {
    let t = (jd_ut1 - JD_J2000) / DAYS_PER_CENTURY;

    // Seconds of sidereal time.
    let seconds = -6.2e-6 * t * t * t
        + 0.093_104 * t * t
        + (876_600.0 * 3600.0 + 8_640_184.812_866) * t
        + 67_310.548_41;

    // 240 s of sidereal time per degree.
    let theta = (seconds / 240.0).to_radians() % TAU;
    if theta < 0.0 { theta + TAU } else { theta }
}
