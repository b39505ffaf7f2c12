/// Newton iteration bound for Kepler's equation.
pub const MAX_ITERATIONS: u32 = 10;
/// Convergence tolerance on the correction term, radians.
pub const TOLERANCE: f64 = 1.0e-12;

/// Outcome of a bounded fixed-point solve: the best estimate reached and
/// whether the correction fell under tolerance within the iteration cap.
#[derive(Debug, Clone, Copy)]
pub struct Solution {
    pub eccentric_longitude: f64,
    pub converged: bool,
    pub iterations: u32,
}

/// Solve Kepler's equation in equinoctial form for the eccentric
/// longitude E + omega: `u = (E + omega) - axn*sin + ayn*cos` given the
/// mean longitude `u` (already node-relative) and the equinoctial
/// eccentricity components `axn`, `ayn`.
///
/// Newton steps are clamped to 0.95 rad so a near-parabolic guess cannot
/// overshoot; the loop never runs past `MAX_ITERATIONS` and returns its
/// best estimate either way.
pub fn solve(u: f64, axn: f64, ayn: f64) -> Solution {
    let mut eo1 = u;
    let mut correction = f64::MAX;
    let mut iterations = 0;

    while correction.abs() >= TOLERANCE && iterations < MAX_ITERATIONS {
        let sin_eo1 = eo1.sin();
        let cos_eo1 = eo1.cos();
        let denominator = 1.0 - cos_eo1 * axn - sin_eo1 * ayn;
        correction = (u - ayn * cos_eo1 + axn * sin_eo1 - eo1) / denominator;
        if correction.abs() >= 0.95 {
            correction = 0.95_f64.copysign(correction);
        }
        eo1 += correction;
        iterations += 1;
    }

    Solution {
        eccentric_longitude: eo1,
        converged: correction.abs() < TOLERANCE,
        iterations,
    }
}
