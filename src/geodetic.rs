//! Earth-fixed Cartesian to geodetic conversion on the WGS-84 ellipsoid,
//! and the inverse mapping.

use serde::Serialize;
use std::f64::consts::FRAC_PI_2;

/// WGS-84 equatorial radius, km.
pub const EQUATORIAL_RADIUS_KM: f64 = 6378.137;
/// WGS-84 flattening.
pub const FLATTENING: f64 = 1.0 / 298.257_223_563;

/// First eccentricity squared of the ellipsoid.
const E2: f64 = FLATTENING * (2.0 - FLATTENING);

const MAX_ITERATIONS: u32 = 10;
const TOLERANCE: f64 = 1.0e-12;

/// Cylindrical radii below this are treated as exactly polar, where the
/// longitude is undefined (reported as zero by convention).
const POLAR_AXIS_KM: f64 = 1.0e-9;

/// Geodetic location referenced to the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Geodetic {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

/// Convert an earth-fixed position to geodetic latitude, longitude and
/// altitude by successive substitution on the latitude.
///
/// Degenerate inputs never fail: at the poles the longitude is zero by
/// convention, and a zero-radius position maps to the all-zero location.
pub fn from_earth_fixed(position_km: [f64; 3]) -> Geodetic {
    let [x, y, z] = position_km;
    let p = (x * x + y * y).sqrt();

    if p < POLAR_AXIS_KM {
        if z.abs() < POLAR_AXIS_KM {
            // Geometric center; nothing meaningful to report.
            return Geodetic {
                latitude_deg: 0.0,
                longitude_deg: 0.0,
                altitude_km: 0.0,
            };
        }
        let polar_radius = EQUATORIAL_RADIUS_KM * (1.0 - FLATTENING);
        return Geodetic {
            latitude_deg: FRAC_PI_2.copysign(z).to_degrees(),
            longitude_deg: 0.0,
            altitude_km: z.abs() - polar_radius,
        };
    }

    let longitude = y.atan2(x);

    let mut latitude = z.atan2(p);
    let mut n = EQUATORIAL_RADIUS_KM;
    let mut converged = false;
    for _ in 0..MAX_ITERATIONS {
        let sin_lat = latitude.sin();
        n = EQUATORIAL_RADIUS_KM / (1.0 - E2 * sin_lat * sin_lat).sqrt();
        let next = (z + E2 * n * sin_lat).atan2(p);
        let delta = next - latitude;
        latitude = next;
        if delta.abs() < TOLERANCE {
            converged = true;
            break;
        }
    }
    if !converged {
        // Bounded iteration: carry on with the best estimate.
        let sin_lat = latitude.sin();
        n = EQUATORIAL_RADIUS_KM / (1.0 - E2 * sin_lat * sin_lat).sqrt();
    }

    let cos_lat = latitude.cos();
    let altitude_km = if cos_lat.abs() > 1.0e-10 {
        p / cos_lat - n
    } else {
        z / latitude.sin() - n * (1.0 - E2)
    };

    Geodetic {
        latitude_deg: latitude.to_degrees(),
        longitude_deg: longitude.to_degrees(),
        altitude_km,
    }
}

/// Geodetic location back to earth-fixed Cartesian coordinates.
pub fn to_earth_fixed(geodetic: &Geodetic) -> [f64; 3] {
    let lat = geodetic.latitude_deg.to_radians();
    let lon = geodetic.longitude_deg.to_radians();
    let (sin_lat, cos_lat) = lat.sin_cos();
    let n = EQUATORIAL_RADIUS_KM / (1.0 - E2 * sin_lat * sin_lat).sqrt();
    let alt = geodetic.altitude_km;
    [
        (n + alt) * cos_lat * lon.cos(),
        (n + alt) * cos_lat * lon.sin(),
        (n * (1.0 - E2) + alt) * sin_lat,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() < tol, "{a} vs {b}");
    }

    #[test]
    fn equatorial_surface_point() {
        let g = from_earth_fixed([EQUATORIAL_RADIUS_KM, 0.0, 0.0]);
        assert_close(g.latitude_deg, 0.0, 1.0e-9);
        assert_close(g.longitude_deg, 0.0, 1.0e-9);
        assert_close(g.altitude_km, 0.0, 1.0e-9);
    }

    #[test]
    fn known_leo_altitude() {
        // 400 km above the equator at 90 degrees east.
        let g = from_earth_fixed([0.0, EQUATORIAL_RADIUS_KM + 400.0, 0.0]);
        assert_close(g.latitude_deg, 0.0, 1.0e-9);
        assert_close(g.longitude_deg, 90.0, 1.0e-9);
        assert_close(g.altitude_km, 400.0, 1.0e-9);
    }

    #[test]
    fn round_trip_mid_latitude() {
        let original = [3194.469, 3194.469, 4487.419];
        let g = from_earth_fixed(original);
        let back = to_earth_fixed(&g);
        for i in 0..3 {
            assert_close(back[i], original[i], 1.0e-6);
        }
    }

    #[test]
    fn round_trip_southern_orbit_altitude() {
        let original = [-4400.594, 1932.870, -4760.712];
        let g = from_earth_fixed(original);
        assert!(g.latitude_deg < 0.0);
        let back = to_earth_fixed(&g);
        for i in 0..3 {
            assert_close(back[i], original[i], 1.0e-6);
        }
    }

    #[test]
    fn polar_longitude_convention() {
        let g = from_earth_fixed([0.0, 0.0, 7000.0]);
        assert_close(g.latitude_deg, 90.0, 1.0e-9);
        assert_close(g.longitude_deg, 0.0, 1.0e-12);
        let polar_radius = EQUATORIAL_RADIUS_KM * (1.0 - FLATTENING);
        assert_close(g.altitude_km, 7000.0 - polar_radius, 1.0e-9);

        let south = from_earth_fixed([0.0, 0.0, -7000.0]);
        assert_close(south.latitude_deg, -90.0, 1.0e-9);
    }

    #[test]
    fn zero_radius_is_all_zero() {
        let g = from_earth_fixed([0.0, 0.0, 0.0]);
        assert_eq!(g.latitude_deg, 0.0);
        assert_eq!(g.longitude_deg, 0.0);
        assert_eq!(g.altitude_km, 0.0);
    }
}
