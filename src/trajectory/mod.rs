//! Trajectory sampling: drives the propagator across a regular time grid
//! and attaches the earth-fixed geodetic location to every sample.

use serde::Serialize;
use thiserror::Error;

use crate::frames::{self, StateVector};
use crate::geodetic::{self, Geodetic};
use crate::propagator::{PropagationError, Propagator};

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("sampling step must be positive, got {0} min")]
    Step(f64),
    #[error("duration must be finite, got {0} min")]
    Duration(f64),
    #[error("sample {index} at {minutes} min failed: {source}")]
    Propagation {
        index: usize,
        minutes: f64,
        source: PropagationError,
    },
    #[error("could not allocate a {samples}-sample trajectory")]
    Allocation { samples: u64 },
}

/// One point of a sampled trajectory: the inertial (TEME) state plus the
/// geodetic ground location at that instant.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrajectorySample {
    pub minutes_from_epoch: f64,
    #[serde(flatten)]
    pub state: StateVector,
    #[serde(flatten)]
    pub geodetic: Geodetic,
}

/// Number of points a run over `duration_minutes` at `step_minutes` yields:
/// the epoch sample plus one per full step. A trailing partial step gets no
/// sample, so the grid may end short of the nominal duration; a negative
/// duration degenerates to the epoch sample alone.
fn sample_count(duration_minutes: f64, step_minutes: f64) -> Result<u64, SampleError> {
    if !(step_minutes > 0.0) {
        return Err(SampleError::Step(step_minutes));
    }
    if !duration_minutes.is_finite() {
        return Err(SampleError::Duration(duration_minutes));
    }
    let steps = (duration_minutes / step_minutes).floor().max(0.0);
    (steps as u64)
        .checked_add(1)
        .ok_or(SampleError::Allocation { samples: u64::MAX })
}

/// Sample the trajectory on the grid `0, S, 2S, ...` covering
/// `duration_minutes`. Either every point propagates, or the whole run
/// fails carrying the index of the first bad sample — no partial output.
pub fn sample_trajectory(
    propagator: &Propagator,
    duration_minutes: f64,
    step_minutes: f64,
) -> Result<Vec<TrajectorySample>, SampleError> {
    let count = sample_count(duration_minutes, step_minutes)?;
    let capacity =
        usize::try_from(count).map_err(|_| SampleError::Allocation { samples: count })?;

    let mut samples: Vec<TrajectorySample> = Vec::new();
    samples
        .try_reserve_exact(capacity)
        .map_err(|_| SampleError::Allocation { samples: count })?;

    log::debug!("sampling {count} points every {step_minutes} min");

    for index in 0..capacity {
        let minutes = index as f64 * step_minutes;
        let state = propagator
            .propagate(minutes)
            .map_err(|source| SampleError::Propagation {
                index,
                minutes,
                source,
            })?;

        let jd = propagator.epoch().offset_minutes(minutes);
        let fixed = frames::to_earth_fixed(&state, jd);
        let geodetic = geodetic::from_earth_fixed(fixed.position_km);

        samples.push(TrajectorySample {
            minutes_from_epoch: minutes,
            state,
            geodetic,
        });
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tle;

    const ISS_LINE1: &str =
        "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_LINE2: &str =
        "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    // Synthetic low orbit with an extreme drag term; the drag secular
    // terms push it below the decay threshold within the first hours.
    const DECAY_LINE1: &str =
        "1 90001U 24001A   24001.50000000  .00000000  00000-0  10000-0 0  9990";
    const DECAY_LINE2: &str =
        "2 90001  51.6000 100.0000 0010000  50.0000 300.0000 16.30000000 12344";

    fn iss_propagator() -> Propagator {
        let record = tle::parse(ISS_LINE1, ISS_LINE2).unwrap();
        Propagator::new(&record).unwrap()
    }

    #[test]
    fn count_is_floor_plus_one() {
        assert_eq!(sample_count(5400.0, 10.0).unwrap(), 541);
        assert_eq!(sample_count(95.0, 10.0).unwrap(), 10);
        assert_eq!(sample_count(0.0, 1.0).unwrap(), 1);
        assert_eq!(sample_count(9.99, 10.0).unwrap(), 1);
        assert_eq!(sample_count(10.0, 10.0).unwrap(), 2);
        assert_eq!(sample_count(-30.0, 10.0).unwrap(), 1);
    }

    #[test]
    fn step_must_be_positive() {
        assert!(matches!(sample_count(60.0, 0.0), Err(SampleError::Step(_))));
        assert!(matches!(
            sample_count(60.0, -1.0),
            Err(SampleError::Step(_))
        ));
        assert!(matches!(
            sample_count(60.0, f64::NAN),
            Err(SampleError::Step(_))
        ));
    }

    #[test]
    fn non_finite_duration_rejected() {
        assert!(matches!(
            sample_count(f64::INFINITY, 10.0),
            Err(SampleError::Duration(_))
        ));
    }

    #[test]
    fn elapsed_time_is_the_sample_grid() {
        let samples = sample_trajectory(&iss_propagator(), 95.0, 10.0).unwrap();
        assert_eq!(samples.len(), 10);
        for (i, sample) in samples.iter().enumerate() {
            assert_eq!(sample.minutes_from_epoch, i as f64 * 10.0);
        }
        for pair in samples.windows(2) {
            assert!(pair[1].minutes_from_epoch > pair[0].minutes_from_epoch);
        }
    }

    #[test]
    fn zero_duration_yields_epoch_sample() {
        let propagator = iss_propagator();
        let samples = sample_trajectory(&propagator, 0.0, 1.0).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].minutes_from_epoch, 0.0);
        assert_eq!(
            samples[0].state.position_km,
            propagator.propagate(0.0).unwrap().position_km
        );
    }

    #[test]
    fn geodetic_fields_are_plausible() {
        let samples = sample_trajectory(&iss_propagator(), 90.0, 5.0).unwrap();
        for sample in &samples {
            assert!(sample.geodetic.latitude_deg.abs() <= 52.0);
            assert!(sample.geodetic.longitude_deg.abs() <= 180.0);
            assert!((150.0..500.0).contains(&sample.geodetic.altitude_km));
        }
    }

    #[test]
    fn decaying_orbit_fails_with_index_and_no_output() {
        let record = tle::parse(DECAY_LINE1, DECAY_LINE2).unwrap();
        let propagator = Propagator::new(&record).unwrap();
        let err = sample_trajectory(&propagator, 1440.0, 10.0).unwrap_err();
        match err {
            SampleError::Propagation { index, minutes, .. } => {
                assert!(index >= 1, "failed already at epoch");
                assert!(index <= 20, "expected failure within hours, index {index}");
                assert_eq!(minutes, index as f64 * 10.0);
            }
            other => panic!("expected propagation failure, got {other}"),
        }
    }

    #[test]
    fn sample_serializes_flat() {
        let samples = sample_trajectory(&iss_propagator(), 0.0, 1.0).unwrap();
        let json = serde_json::to_value(samples[0]).unwrap();
        for key in [
            "minutes_from_epoch",
            "position_km",
            "velocity_km_s",
            "latitude_deg",
            "longitude_deg",
            "altitude_km",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
