use crate::errors::{FlashError, FlashResult};
use crate::SolverOptions;

const MAX_ITER_RIDDER: usize = 2000;
const TOL_RIDDER: f64 = 1e-10;

/// Result of a bracketed root search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootEstimate {
    /// Best estimate of the root.
    pub root: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the relative change between successive estimates dropped below
    /// the tolerance (or the root was hit exactly).
    pub converged: bool,
}

impl RootEstimate {
    fn exact(root: f64, iterations: usize) -> Self {
        Self {
            root,
            iterations,
            converged: true,
        }
    }
}

/// Find `x` in `bracket` such that `f(x) = target` using Ridder's method.
///
/// `f(x) - target` has to change sign on the bracket. The iteration stops as soon
/// as the relative change between two successive estimates is smaller than the
/// tolerance. If the maximum number of iterations is exceeded, the last estimate
/// is returned with `converged = false`, or [FlashError::NotConverged] is
/// returned if `options.strict` is set.
///
/// Errors returned by `f` are passed on unchanged.
pub fn ridder<F>(
    mut f: F,
    bracket: [f64; 2],
    target: f64,
    options: SolverOptions,
) -> FlashResult<RootEstimate>
where
    F: FnMut(f64) -> FlashResult<f64>,
{
    let (max_iter, tol, verbosity) = options.unwrap_or(MAX_ITER_RIDDER, TOL_RIDDER);

    let mut x_l = bracket[0].min(bracket[1]);
    let mut x_u = bracket[0].max(bracket[1]);
    let mut f_l = f(x_l)? - target;
    if f_l == 0.0 {
        return Ok(RootEstimate::exact(x_l, 0));
    }
    let mut f_u = f(x_u)? - target;
    if f_u == 0.0 {
        return Ok(RootEstimate::exact(x_u, 0));
    }
    if !(f_l * f_u < 0.0) {
        return Err(no_real_root(x_l, x_u));
    }

    log_iter!(
        verbosity,
        " iter |      root      |    residual    | relative change"
    );
    log_iter!(verbosity, "{:-<59}", "");

    let mut x_r = 0.5 * (x_l + x_u);
    let mut x_r_old: Option<f64> = None;
    for iter in 1..=max_iter {
        let x_m = 0.5 * (x_l + x_u);
        let f_m = f(x_m)? - target;
        if f_m == 0.0 {
            return Ok(RootEstimate::exact(x_m, iter));
        }

        let discriminant = f_m * f_m - f_l * f_u;
        if discriminant < 0.0 {
            return Err(no_real_root(x_l, x_u));
        }
        x_r = x_m + (x_m - x_l) * (f_l - f_u).signum() * f_m / discriminant.sqrt();
        if x_r == x_m {
            return Ok(RootEstimate::exact(x_r, iter));
        }
        let f_r = f(x_r)? - target;
        if f_r == 0.0 {
            return Ok(RootEstimate::exact(x_r, iter));
        }

        // shrink the bracket around the sign change
        if x_r < x_m {
            if f_l * f_r < 0.0 {
                (x_u, f_u) = (x_r, f_r);
            } else if f_r * f_m < 0.0 {
                (x_l, f_l, x_u, f_u) = (x_r, f_r, x_m, f_m);
            } else if f_m * f_u < 0.0 {
                (x_l, f_l) = (x_m, f_m);
            } else {
                return Ok(RootEstimate::exact(x_r, iter));
            }
        } else if f_l * f_m < 0.0 {
            (x_u, f_u) = (x_m, f_m);
        } else if f_m * f_r < 0.0 {
            (x_l, f_l, x_u, f_u) = (x_m, f_m, x_r, f_r);
        } else if f_r * f_u < 0.0 {
            (x_l, f_l) = (x_r, f_r);
        } else {
            return Ok(RootEstimate::exact(x_r, iter));
        }

        if let Some(x_old) = x_r_old {
            let change = if x_r != 0.0 {
                ((x_r - x_old) / x_r).abs()
            } else {
                (x_r - x_old).abs()
            };
            log_iter!(
                verbosity,
                " {:4} | {:14.8e} | {:14.8e} | {:14.8e}",
                iter,
                x_r,
                f_r,
                change
            );
            if change < tol {
                log_result!(
                    verbosity,
                    "Ridder's method: converged in {} step(s)\n",
                    iter
                );
                return Ok(RootEstimate {
                    root: x_r,
                    iterations: iter,
                    converged: true,
                });
            }
        } else {
            log_iter!(verbosity, " {:4} | {:14.8e} | {:14.8e} |", iter, x_r, f_r);
        }
        x_r_old = Some(x_r);
    }

    log_result!(
        verbosity,
        "Ridder's method: no convergence within {} step(s), returning the last estimate\n",
        max_iter
    );
    if options.strict {
        return Err(FlashError::NotConverged("Ridder's method".into()));
    }
    Ok(RootEstimate {
        root: x_r,
        iterations: max_iter,
        converged: false,
    })
}

fn no_real_root(x_l: f64, x_u: f64) -> FlashError {
    FlashError::NoBracketFound(format!("no real root in [{x_l}, {x_u}]"))
}
