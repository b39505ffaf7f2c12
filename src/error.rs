use thiserror::Error;

use crate::propagator::InvalidOrbitError;
use crate::tle::TleError;
use crate::trajectory::SampleError;

/// Boundary error surface: everything a full parse-and-propagate run can
/// report, distinguishable by variant.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid element set: {0}")]
    Tle(#[from] TleError),
    #[error("invalid orbit: {0}")]
    InvalidOrbit(#[from] InvalidOrbitError),
    #[error(transparent)]
    Sample(#[from] SampleError),
}
