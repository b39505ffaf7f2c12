//! Frame handling: propagation produces true-equator mean-equinox (TEME)
//! inertial states; ground-track work needs them in the rotating
//! earth-fixed frame.

use serde::Serialize;
use std::f64::consts::PI;

const TWO_PI: f64 = 2.0 * PI;
const DEG2RAD: f64 = PI / 180.0;

/// Earth rotation rate, radians per second.
pub const EARTH_ROTATION_RAD_S: f64 = 7.292_115e-5;

/// Position/velocity pair; the frame is whatever the producer documents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateVector {
    /// Kilometers.
    pub position_km: [f64; 3],
    /// Kilometers per second.
    pub velocity_km_s: [f64; 3],
}

/// Greenwich mean sidereal time in radians for a UT1 Julian date
/// (IAU-82 polynomial).
pub fn sidereal_time(jd_ut1: f64) -> f64 {
    let tut1 = (jd_ut1 - 2_451_545.0) / 36_525.0;
    let seconds = -6.2e-6 * tut1 * tut1 * tut1
        + 0.093104 * tut1 * tut1
        + (876_600.0 * 3600.0 + 8_640_184.812_866) * tut1
        + 67_310.548_41;
    // seconds of time to radians
    (seconds * DEG2RAD / 240.0).rem_euclid(TWO_PI)
}

/// Rotate a TEME state into the earth-fixed frame at the given UT1 Julian
/// date. The position rotates about the pole by GMST; the velocity picks up
/// the transport term from the rotating frame.
pub fn to_earth_fixed(state: &StateVector, jd_ut1: f64) -> StateVector {
    let gmst = sidereal_time(jd_ut1);
    let position_km = rotate_z(state.position_km, gmst);
    let rotated_velocity = rotate_z(state.velocity_km_s, gmst);
    StateVector {
        position_km,
        velocity_km_s: [
            rotated_velocity[0] + EARTH_ROTATION_RAD_S * position_km[1],
            rotated_velocity[1] - EARTH_ROTATION_RAD_S * position_km[0],
            rotated_velocity[2],
        ],
    }
}

fn rotate_z(v: [f64; 3], angle: f64) -> [f64; 3] {
    let (sin_a, cos_a) = angle.sin_cos();
    [
        v[0] * cos_a + v[1] * sin_a,
        -v[0] * sin_a + v[1] * cos_a,
        v[2],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: [f64; 3]) -> f64 {
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }

    #[test]
    fn sidereal_time_j2000() {
        // GMST at the J2000 epoch is about 280.46 degrees.
        let gmst = sidereal_time(2_451_545.0);
        assert!((gmst.to_degrees() - 280.4606).abs() < 1.0e-3);
    }

    #[test]
    fn sidereal_time_wraps_into_revolution() {
        for offset in [-3650.0, 0.0, 12.3, 10_000.5] {
            let gmst = sidereal_time(2_451_545.0 + offset);
            assert!((0.0..TWO_PI).contains(&gmst));
        }
    }

    #[test]
    fn rotation_preserves_radius_and_z() {
        let state = StateVector {
            position_km: [6500.0, 1200.0, -300.0],
            velocity_km_s: [1.0, -7.2, 0.3],
        };
        let fixed = to_earth_fixed(&state, 2_454_730.0);
        assert!((norm(fixed.position_km) - norm(state.position_km)).abs() < 1.0e-9);
        assert!((fixed.position_km[2] - state.position_km[2]).abs() < 1.0e-12);
    }

    #[test]
    fn equatorial_point_velocity_picks_up_earth_rate() {
        // A point at rest in TEME moves westward in the earth-fixed frame at
        // roughly the surface rotation speed.
        let state = StateVector {
            position_km: [7000.0, 0.0, 0.0],
            velocity_km_s: [0.0, 0.0, 0.0],
        };
        let fixed = to_earth_fixed(&state, 2_454_730.0);
        let speed = norm(fixed.velocity_km_s);
        assert!((speed - EARTH_ROTATION_RAD_S * 7000.0).abs() < 1.0e-9);
    }
}
