//! SGP4 orbit propagation: a `Propagator` is derived once from a parsed
//! element record and then evaluated at arbitrary offsets from epoch.
//!
//! Initialization picks an orbit regime — near-earth, or deep-space for
//! periods of 225 minutes and up — and precomputes exactly the term tables
//! that regime needs. After that every call is a pure function of the
//! fixed state and the requested time, so samples can be computed in any
//! order (or in parallel) without coordination.

mod deep_space;
mod gravity;
mod init;
pub mod kepler;

pub use gravity::{GravityConstants, GravityModel};

use std::f64::consts::PI;

use thiserror::Error;

use crate::frames::StateVector;
use crate::time::JulianDate;
use crate::tle::TleRecord;
use deep_space::{DeepSpace, SecularState};

const TWO_PI: f64 = 2.0 * PI;
const X2O3: f64 = 2.0 / 3.0;
// Divisor guard for inclinations within float noise of 180 degrees.
const TEMP4: f64 = 1.5e-12;

/// Derived orbital state is physically invalid before any sampling starts.
#[derive(Debug, Error)]
pub enum InvalidOrbitError {
    #[error("recovered mean motion {value} is not positive")]
    MeanMotion { value: f64 },
    #[error("perigee {radius_er} earth radii is below the surface")]
    SubOrbital { radius_er: f64 },
    #[error("non-finite {name} derived from the element set")]
    NonFinite { name: &'static str },
    #[error("element set is already invalid at its epoch: {0}")]
    AtEpoch(#[from] PropagationError),
}

/// A specific sample's numerical solution failed, or the object is gone.
/// `code()` exposes the conventional SGP4 numeric failure code.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PropagationError {
    #[error("mean eccentricity {value} drifted outside [0, 1) at {minutes} min")]
    MeanEccentricity { value: f64, minutes: f64 },
    #[error("mean motion {value} not positive at {minutes} min")]
    MeanMotion { value: f64, minutes: f64 },
    #[error("perturbed eccentricity {value} outside [0, 1] at {minutes} min")]
    PerturbedEccentricity { value: f64, minutes: f64 },
    #[error("semi-latus rectum {value} negative at {minutes} min")]
    SemiLatusRectum { value: f64, minutes: f64 },
    #[error("satellite decayed (radius {radius_km} km) at {minutes} min")]
    Decayed { radius_km: f64, minutes: f64 },
}

impl PropagationError {
    /// Numeric failure code, following the Vallado SGP4 convention.
    pub fn code(&self) -> u8 {
        match self {
            PropagationError::MeanEccentricity { .. } => 1,
            PropagationError::MeanMotion { .. } => 2,
            PropagationError::PerturbedEccentricity { .. } => 3,
            PropagationError::SemiLatusRectum { .. } => 4,
            PropagationError::Decayed { .. } => 6,
        }
    }

    pub fn is_decay(&self) -> bool {
        matches!(self, PropagationError::Decayed { .. })
    }
}

/// Orbit regime selected at initialization.
#[derive(Debug, Clone)]
enum Regime {
    NearEarth,
    DeepSpace(Box<DeepSpace>),
}

/// High-order drag series, dropped for low-perigee and deep-space orbits.
#[derive(Debug, Clone)]
struct DragSeries {
    d2: f64,
    d3: f64,
    d4: f64,
    t3cof: f64,
    t4cof: f64,
    t5cof: f64,
}

/// Immutable propagation state for one element set.
#[derive(Debug, Clone)]
pub struct Propagator {
    gravity: GravityConstants,
    epoch: JulianDate,

    // mean elements at epoch, radians and radians per minute
    bstar: f64,
    ecco: f64,
    argpo: f64,
    inclo: f64,
    mo: f64,
    nodeo: f64,
    no_unkozai: f64,
    gsto: f64,

    // secular and short-period coefficients shared by both regimes
    con41: f64,
    cc1: f64,
    cc4: f64,
    cc5: f64,
    eta: f64,
    mdot: f64,
    argpdot: f64,
    nodedot: f64,
    nodecf: f64,
    omgcof: f64,
    xmcof: f64,
    t2cof: f64,
    x1mth2: f64,
    x7thm1: f64,
    aycof: f64,
    xlcof: f64,
    delmo: f64,
    sinmao: f64,

    drag: Option<DragSeries>,
    regime: Regime,
}

impl Propagator {
    /// Derive the propagation state from a parsed record. Fails when the
    /// recovered orbit is physically invalid (sub-orbital perigee,
    /// non-positive mean motion) or already unsolvable at its own epoch.
    pub fn new(record: &TleRecord) -> Result<Self, InvalidOrbitError> {
        let propagator = init::build(record)?;
        // Evaluating at the epoch itself flushes out element sets that are
        // invalid from the first sample.
        propagator.propagate(0.0)?;
        Ok(propagator)
    }

    pub fn epoch(&self) -> JulianDate {
        self.epoch
    }

    pub fn gravity(&self) -> &GravityConstants {
        &self.gravity
    }

    pub fn is_deep_space(&self) -> bool {
        matches!(self.regime, Regime::DeepSpace(_))
    }

    /// Propagate to `minutes` after epoch, returning the TEME state.
    pub fn propagate(&self, minutes: f64) -> Result<StateVector, PropagationError> {
        let t = minutes;
        let gravity = &self.gravity;
        let vkmpersec = gravity.radius_km * gravity.ke / 60.0;

        // Secular drift from gravity harmonics and drag.
        let xmdf = self.mo + self.mdot * t;
        let argpdf = self.argpo + self.argpdot * t;
        let nodedf = self.nodeo + self.nodedot * t;
        let t2 = t * t;

        let mut argpm = argpdf;
        let mut mm = xmdf;
        let mut nodem = nodedf + self.nodecf * t2;
        let mut tempa = 1.0 - self.cc1 * t;
        let mut tempe = self.bstar * self.cc4 * t;
        let mut templ = self.t2cof * t2;

        if let Some(drag) = &self.drag {
            let delomg = self.omgcof * t;
            let delmtemp = 1.0 + self.eta * xmdf.cos();
            let delm = self.xmcof * (delmtemp * delmtemp * delmtemp - self.delmo);
            let temp = delomg + delm;
            mm = xmdf + temp;
            argpm = argpdf - temp;
            let t3 = t2 * t;
            let t4 = t3 * t;
            tempa -= drag.d2 * t2 + drag.d3 * t3 + drag.d4 * t4;
            tempe += self.bstar * self.cc5 * (mm.sin() - self.sinmao);
            templ += drag.t3cof * t3 + t4 * (drag.t4cof + t * drag.t5cof);
        }

        let mut state = SecularState {
            em: self.ecco,
            inclm: self.inclo,
            argpm,
            nodem,
            mm,
            nm: self.no_unkozai,
        };
        if let Regime::DeepSpace(ds) = &self.regime {
            state = ds.secular(t, self.no_unkozai, self.argpo, self.argpdot, self.gsto, state);
        }
        let SecularState {
            mut em,
            inclm,
            mut argpm,
            mut nodem,
            mut mm,
            nm,
        } = state;

        if nm <= 0.0 {
            return Err(PropagationError::MeanMotion {
                value: nm,
                minutes: t,
            });
        }
        let am = (gravity.ke / nm).powf(X2O3) * tempa * tempa;
        let nm = gravity.ke / am.powf(1.5);
        em -= tempe;

        if !(-0.001..1.0).contains(&em) {
            return Err(PropagationError::MeanEccentricity {
                value: em,
                minutes: t,
            });
        }
        // Avoid a singular equinoctial conversion for tiny eccentricities.
        if em < 1.0e-6 {
            em = 1.0e-6;
        }
        mm += self.no_unkozai * templ;
        let mut xlm = mm + argpm + nodem;

        nodem %= TWO_PI;
        argpm %= TWO_PI;
        xlm %= TWO_PI;
        mm = (xlm - argpm - nodem) % TWO_PI;

        // Long-period lunar/solar periodics (deep space only).
        let mut ep = em;
        let mut xincp = inclm;
        let mut argpp = argpm;
        let mut nodep = nodem;
        let mut mp = mm;
        if let Regime::DeepSpace(ds) = &self.regime {
            (ep, xincp, nodep, argpp, mp) = ds.long_period(t, ep, xincp, nodep, argpp, mp);
            if xincp < 0.0 {
                xincp = -xincp;
                nodep += PI;
                argpp -= PI;
            }
            if !(0.0..=1.0).contains(&ep) {
                return Err(PropagationError::PerturbedEccentricity {
                    value: ep,
                    minutes: t,
                });
            }
        }

        let sinip = xincp.sin();
        let cosip = xincp.cos();

        // The perturbed inclination shifts these in the deep-space regime.
        let (aycof, xlcof) = match self.regime {
            Regime::NearEarth => (self.aycof, self.xlcof),
            Regime::DeepSpace(_) => {
                let aycof = -0.5 * gravity.j3_over_j2 * sinip;
                let xlcof = if (cosip + 1.0).abs() > TEMP4 {
                    -0.25 * gravity.j3_over_j2 * sinip * (3.0 + 5.0 * cosip) / (1.0 + cosip)
                } else {
                    -0.25 * gravity.j3_over_j2 * sinip * (3.0 + 5.0 * cosip) / TEMP4
                };
                (aycof, xlcof)
            }
        };

        // Orbital-plane solution: Kepler's equation in equinoctial form.
        let axnl = ep * argpp.cos();
        let temp = 1.0 / (am * (1.0 - ep * ep));
        let aynl = ep * argpp.sin() + temp * aycof;
        let xl = mp + argpp + nodep + temp * xlcof * axnl;

        let u = (xl - nodep) % TWO_PI;
        let solution = kepler::solve(u, axnl, aynl);
        if !solution.converged {
            log::warn!(
                "kepler iteration hit its bound at t={t} min; using best estimate after {} steps",
                solution.iterations
            );
        }
        let (sineo1, coseo1) = solution.eccentric_longitude.sin_cos();

        let ecose = axnl * coseo1 + aynl * sineo1;
        let esine = axnl * sineo1 - aynl * coseo1;
        let el2 = axnl * axnl + aynl * aynl;
        let pl = am * (1.0 - el2);
        if pl < 0.0 {
            return Err(PropagationError::SemiLatusRectum {
                value: pl,
                minutes: t,
            });
        }

        let rl = am * (1.0 - ecose);
        let rdotl = am.sqrt() * esine / rl;
        let rvdotl = pl.sqrt() / rl;
        let betal = (1.0 - el2).sqrt();
        let temp = esine / (1.0 + betal);
        let sinu = am / rl * (sineo1 - aynl - axnl * temp);
        let cosu = am / rl * (coseo1 - axnl + aynl * temp);
        let mut su = sinu.atan2(cosu);
        let sin2u = (cosu + cosu) * sinu;
        let cos2u = 1.0 - 2.0 * sinu * sinu;

        // Short-period gravity corrections.
        let temp = 1.0 / pl;
        let temp1 = 0.5 * gravity.j2 * temp;
        let temp2 = temp1 * temp;
        let (con41, x1mth2, x7thm1) = match self.regime {
            Regime::NearEarth => (self.con41, self.x1mth2, self.x7thm1),
            Regime::DeepSpace(_) => {
                let cosisq = cosip * cosip;
                (3.0 * cosisq - 1.0, 1.0 - cosisq, 7.0 * cosisq - 1.0)
            }
        };

        let mrt = rl * (1.0 - 1.5 * temp2 * betal * con41) + 0.5 * temp1 * x1mth2 * cos2u;
        su -= 0.25 * temp2 * x7thm1 * sin2u;
        let xnode = nodep + 1.5 * temp2 * cosip * sin2u;
        let xinc = xincp + 1.5 * temp2 * cosip * sinip * cos2u;
        let mvt = rdotl - nm * temp1 * x1mth2 * sin2u / gravity.ke;
        let rvdot = rvdotl + nm * temp1 * (x1mth2 * cos2u + 1.5 * con41) / gravity.ke;

        // Orientation vectors from the three rotation angles.
        let (sinsu, cossu) = su.sin_cos();
        let (snod, cnod) = xnode.sin_cos();
        let (sini, cosi) = xinc.sin_cos();
        let xmx = -snod * cosi;
        let xmy = cnod * cosi;
        let ux = xmx * sinsu + cnod * cossu;
        let uy = xmy * sinsu + snod * cossu;
        let uz = sini * sinsu;
        let vx = xmx * cossu - cnod * sinsu;
        let vy = xmy * cossu - snod * sinsu;
        let vz = sini * cossu;

        let mr = mrt * gravity.radius_km;
        if mrt < 1.0 {
            return Err(PropagationError::Decayed {
                radius_km: mr,
                minutes: t,
            });
        }

        Ok(StateVector {
            position_km: [mr * ux, mr * uy, mr * uz],
            velocity_km_s: [
                (mvt * ux + rvdot * vx) * vkmpersec,
                (mvt * uy + rvdot * vy) * vkmpersec,
                (mvt * uz + rvdot * vz) * vkmpersec,
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tle;

    const ISS_LINE1: &str =
        "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_LINE2: &str =
        "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    // Vallado verification set: Molniya 2-14, a half-day resonant orbit.
    const MOLNIYA_LINE1: &str =
        "1 08195U 75081A   06176.33215444  .00000099  00000-0  11873-3 0   813";
    const MOLNIYA_LINE2: &str =
        "2 08195  64.1586 279.0717 6877146 264.7651  20.2257  2.00491383225656";

    fn norm(v: [f64; 3]) -> f64 {
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }

    #[test]
    fn iss_selects_near_earth_regime() {
        let record = tle::parse(ISS_LINE1, ISS_LINE2).unwrap();
        let propagator = Propagator::new(&record).unwrap();
        assert!(!propagator.is_deep_space());
    }

    #[test]
    fn iss_epoch_state_is_leo() {
        let record = tle::parse(ISS_LINE1, ISS_LINE2).unwrap();
        let propagator = Propagator::new(&record).unwrap();
        let state = propagator.propagate(0.0).unwrap();
        let radius = norm(state.position_km);
        let speed = norm(state.velocity_km_s);
        // low circular orbit
        assert!((6600.0..6810.0).contains(&radius), "radius {radius}");
        assert!((7.2..7.9).contains(&speed), "speed {speed}");
    }

    #[test]
    fn propagation_is_pure_per_call() {
        let record = tle::parse(ISS_LINE1, ISS_LINE2).unwrap();
        let propagator = Propagator::new(&record).unwrap();
        let later = propagator.propagate(360.0).unwrap();
        let epoch_again = propagator.propagate(0.0).unwrap();
        let later_again = propagator.propagate(360.0).unwrap();
        assert_eq!(later, later_again);
        assert_eq!(epoch_again, propagator.propagate(0.0).unwrap());
    }

    #[test]
    fn orbit_returns_near_start_after_one_period() {
        let record = tle::parse(ISS_LINE1, ISS_LINE2).unwrap();
        let propagator = Propagator::new(&record).unwrap();
        let start = propagator.propagate(0.0).unwrap();
        let after = propagator.propagate(record.period_minutes()).unwrap();
        // Perturbations move the orbit a little; it must still come back to
        // the same neighborhood.
        let dx = [
            after.position_km[0] - start.position_km[0],
            after.position_km[1] - start.position_km[1],
            after.position_km[2] - start.position_km[2],
        ];
        assert!(norm(dx) < 250.0, "drift {} km", norm(dx));
    }

    #[test]
    fn molniya_selects_deep_space_regime() {
        let record = tle::parse(MOLNIYA_LINE1, MOLNIYA_LINE2).unwrap();
        assert!(record.period_minutes() >= 225.0);
        let propagator = Propagator::new(&record).unwrap();
        assert!(propagator.is_deep_space());
    }

    #[test]
    fn molniya_propagates_finitely_over_a_day() {
        let record = tle::parse(MOLNIYA_LINE1, MOLNIYA_LINE2).unwrap();
        let propagator = Propagator::new(&record).unwrap();
        for hours in 0..24 {
            let state = propagator.propagate(hours as f64 * 60.0).unwrap();
            let radius = norm(state.position_km);
            assert!(radius.is_finite());
            // Between perigee and apogee of a Molniya orbit.
            assert!((6400.0..50_000.0).contains(&radius), "radius {radius}");
        }
    }

    #[test]
    fn suborbital_elements_rejected_at_initialization() {
        let record = tle::parse(ISS_LINE1, ISS_LINE2).unwrap();
        let mut sunk = record.clone();
        // 18 rev/day puts the semi-major axis inside the earth.
        sunk.mean_motion_rev_day = 18.0;
        let err = Propagator::new(&sunk).unwrap_err();
        assert!(matches!(err, InvalidOrbitError::SubOrbital { .. }));
    }

    #[test]
    fn error_codes_follow_convention() {
        let decay = PropagationError::Decayed {
            radius_km: 6300.0,
            minutes: 10.0,
        };
        assert_eq!(decay.code(), 6);
        assert!(decay.is_decay());
        let ecc = PropagationError::MeanEccentricity {
            value: 1.2,
            minutes: 5.0,
        };
        assert_eq!(ecc.code(), 1);
        assert!(!ecc.is_decay());
    }
}
