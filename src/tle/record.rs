use serde::Serialize;

use crate::propagator::GravityModel;
use crate::time::JulianDate;

/// Mean-element snapshot decoded from one two-line element set.
///
/// Values are kept in the units the format prints them in (degrees,
/// revolutions per day); the propagator converts once at initialization.
#[derive(Debug, Clone, Serialize)]
pub struct TleRecord {
    pub catalog_number: String,
    pub classification: char,
    pub international_designator: String,

    /// Epoch as a split Julian date.
    #[serde(skip)]
    pub epoch: JulianDate,
    pub epoch_year: i32,
    pub epoch_day: f64,

    /// First derivative of mean motion as printed (rev/day^2, halved per
    /// the format convention). Carried for completeness; not used by SGP4.
    pub mean_motion_dot: f64,
    /// Second derivative field (rev/day^3, sixth), implied-exponent form.
    pub mean_motion_ddot: f64,
    /// Drag term, inverse earth radii.
    pub bstar: f64,

    pub inclination_deg: f64,
    pub right_ascension_deg: f64,
    pub eccentricity: f64,
    pub arg_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
    pub mean_motion_rev_day: f64,

    pub element_set_number: u32,
    pub revolution_number: u32,

    pub gravity_model: GravityModel,
}

impl TleRecord {
    /// Orbital period implied by the mean motion, in minutes.
    pub fn period_minutes(&self) -> f64 {
        1440.0 / self.mean_motion_rev_day
    }
}
