use crate::errors::{FlashError, FlashResult};
use itertools::Itertools;
use std::f64::consts::PI;

/// Smallest and largest real root of `x³ + a x² + b x + c = 0`.
///
/// Uses the trigonometric solution, which requires three distinct real roots.
/// Otherwise [FlashError::DegenerateEosRoot] is returned.
pub fn cubic_min_max_roots(a: f64, b: f64, c: f64) -> FlashResult<(f64, f64)> {
    let q = (a * a - 3.0 * b) / 9.0;
    let r = (2.0 * a.powi(3) - 9.0 * a * b + 27.0 * c) / 54.0;
    if !(r * r - q.powi(3) < 0.0) {
        return Err(FlashError::DegenerateEosRoot);
    }

    let theta = (r / q.powi(3).sqrt()).acos();
    let sqrt_q = q.sqrt();
    [theta, theta + 2.0 * PI, theta - 2.0 * PI]
        .into_iter()
        .map(|t| -2.0 * sqrt_q * (t / 3.0).cos() - a / 3.0)
        .minmax_by(f64::total_cmp)
        .into_option()
        .ok_or(FlashError::DegenerateEosRoot)
}
