use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Earth gravity field selector carried by each element record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GravityModel {
    #[strum(serialize = "wgs72old")]
    #[serde(rename = "wgs72old")]
    Wgs72Old,
    Wgs72,
    #[default]
    Wgs84,
}

impl FromStr for GravityModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wgs72old" => Ok(GravityModel::Wgs72Old),
            "wgs72" => Ok(GravityModel::Wgs72),
            "wgs84" => Ok(GravityModel::Wgs84),
            other => Err(format!(
                "unknown gravity model {other:?} (wgs72old, wgs72, wgs84)"
            )),
        }
    }
}

/// Geopotential constants used throughout initialization and propagation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityConstants {
    /// Time units per minute, 1/ke.
    pub tumin: f64,
    /// Gravitational parameter, km^3/s^2.
    pub mu: f64,
    /// Equatorial radius, km.
    pub radius_km: f64,
    /// Square root of mu in earth-radii^1.5 per minute.
    pub ke: f64,
    pub j2: f64,
    pub j3: f64,
    pub j4: f64,
    pub j3_over_j2: f64,
}

impl GravityModel {
    pub fn constants(self) -> GravityConstants {
        match self {
            GravityModel::Wgs72Old => {
                let mu = 398600.79964;
                let radius_km = 6378.135;
                let ke = 0.0743669161;
                build(mu, radius_km, ke, 0.001082616, -0.00000253881, -0.00000165597)
            }
            GravityModel::Wgs72 => {
                let mu: f64 = 398600.8;
                let radius_km: f64 = 6378.135;
                let ke = 60.0 / (radius_km * radius_km * radius_km / mu).sqrt();
                build(mu, radius_km, ke, 0.001082616, -0.00000253881, -0.00000165597)
            }
            GravityModel::Wgs84 => {
                let mu: f64 = 398600.5;
                let radius_km: f64 = 6378.137;
                let ke = 60.0 / (radius_km * radius_km * radius_km / mu).sqrt();
                build(
                    mu,
                    radius_km,
                    ke,
                    0.00108262998905,
                    -0.00000253215306,
                    -0.00000161098761,
                )
            }
        }
    }
}

fn build(mu: f64, radius_km: f64, ke: f64, j2: f64, j3: f64, j4: f64) -> GravityConstants {
    GravityConstants {
        tumin: 1.0 / ke,
        mu,
        radius_km,
        ke,
        j2,
        j3,
        j4,
        j3_over_j2: j3 / j2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wgs84_values() {
        let gc = GravityModel::Wgs84.constants();
        assert!((gc.radius_km - 6378.137).abs() < 1.0e-9);
        assert!((gc.ke - 0.07436685316871385).abs() < 1.0e-12);
        assert!((gc.tumin * gc.ke - 1.0).abs() < 1.0e-14);
    }

    #[test]
    fn model_parses_by_name() {
        assert_eq!("wgs84".parse::<GravityModel>().unwrap(), GravityModel::Wgs84);
        assert_eq!(
            "WGS72OLD".parse::<GravityModel>().unwrap(),
            GravityModel::Wgs72Old
        );
        assert!("egm96".parse::<GravityModel>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for model in [GravityModel::Wgs72Old, GravityModel::Wgs72, GravityModel::Wgs84] {
            assert_eq!(model.to_string().parse::<GravityModel>().unwrap(), model);
        }
    }
}
