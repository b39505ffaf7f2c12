//! Orbit propagation from two-line element sets.
//!
//! The pipeline parses a TLE into a mean-element record, derives an
//! immutable SGP4 propagation state from it, and samples the trajectory on
//! a regular grid: inertial (TEME) position and velocity per point, plus
//! the geodetic ground location obtained through the earth-fixed frame.
//!
//! ```no_run
//! let line1 = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
//! let line2 = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";
//! let samples = groundtrack::propagate_tle(line1, line2, 90.0, 10.0)?;
//! assert_eq!(samples.len(), 541);
//! # Ok::<(), groundtrack::Error>(())
//! ```

mod error;
pub mod frames;
pub mod geodetic;
pub mod propagator;
pub mod scenario;
pub mod time;
pub mod tle;
pub mod trajectory;

pub use error::Error;
pub use frames::StateVector;
pub use geodetic::Geodetic;
pub use propagator::{GravityModel, InvalidOrbitError, PropagationError, Propagator};
pub use tle::{TleError, TleRecord};
pub use trajectory::{SampleError, TrajectorySample};

/// Parse, initialize and sample in one call: the duration is in hours and
/// the step in minutes, matching the historical boundary of this pipeline.
pub fn propagate_tle(
    line1: &str,
    line2: &str,
    duration_hours: f64,
    step_minutes: f64,
) -> Result<Vec<TrajectorySample>, Error> {
    let record = tle::parse(line1, line2)?;
    let propagator = Propagator::new(&record)?;
    let samples = trajectory::sample_trajectory(&propagator, duration_hours * 60.0, step_minutes)?;
    log::info!(
        "propagated catalog {} for {duration_hours} h: {} samples",
        record.catalog_number,
        samples.len()
    );
    Ok(samples)
}
