use crate::errors::{FlashError, FlashResult};
use crate::flash_tank::FlashTank;
use crate::models::VleModel;
use crate::SolverOptions;
use nalgebra::DVector;

mod adiabatic;
mod bubble_dew;
mod isothermal;
mod rachford_rice;
pub use rachford_rice::rachford_rice;

const MAX_ITER_K: usize = 1000;
const TOL_K: f64 = 1e-4;

/// Boundary conditions of a flash calculation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlashSpecification {
    /// Flash temperature given, heat duty calculated.
    Isothermal,
    /// Adiabatic tank with given feed temperature, flash temperature calculated.
    AdiabaticGivenFeedTemperature,
    /// Adiabatic tank with given flash temperature, feed temperature calculated.
    AdiabaticGivenFlashTemperature,
}

impl FlashTank {
    /// Solve the tank for the given boundary conditions.
    ///
    /// The first options control the K-value iteration, the second options
    /// the temperature search of the adiabatic cases.
    pub fn solve(
        &self,
        specification: FlashSpecification,
        model: VleModel,
        (inner, outer): (SolverOptions, SolverOptions),
    ) -> FlashResult<Self> {
        match specification {
            FlashSpecification::Isothermal => self.isothermal_flash(model, inner),
            FlashSpecification::AdiabaticGivenFeedTemperature => {
                self.adiabatic_flash_given_feed_temperature(model, (inner, outer))
            }
            FlashSpecification::AdiabaticGivenFlashTemperature => {
                self.adiabatic_flash_given_flash_temperature(model, (inner, outer))
            }
        }
    }

    /// K-values of the Wilson correlation at the flash conditions.
    pub(crate) fn wilson_k_values(&self) -> FlashResult<DVector<f64>> {
        VleModel::WilsonCorrelation.k_values(self)
    }

    /// Successive substitution of the K-values at fixed temperature and pressure.
    ///
    /// Starts from `k`, alternates the phase split and the update of the
    /// K-values with `model` until the largest change of a K-value drops
    /// below the tolerance. Exhausting the iteration limit marks the tank as
    /// not converged or fails in strict mode.
    pub(crate) fn converge_k_values(
        &mut self,
        model: VleModel,
        mut k: DVector<f64>,
        options: SolverOptions,
    ) -> FlashResult<DVector<f64>> {
        let (max_iter, tol, verbosity) = options.unwrap_or(MAX_ITER_K, TOL_K);

        log_iter!(
            verbosity,
            " iter |    max |ΔK|    |      V/F       | K-values"
        );
        log_iter!(verbosity, "{:-<70}", "");

        for iter in 1..=max_iter {
            if !self.equilibrium_step(&k, options)? {
                self.converged = false;
            }
            let k_new = model.k_values(self)?;
            let delta = (&k_new - &k).amax();
            k = k_new;
            log_iter!(
                verbosity,
                " {:4} | {:14.8e} | {:14.8} | {:.8}",
                iter,
                delta,
                self.vapor_fraction(),
                k.transpose()
            );
            if delta < tol {
                log_result!(
                    verbosity,
                    "K-value iteration ({}): converged in {} step(s) at T = {:.5} K\n",
                    model,
                    iter,
                    self.temperature
                );
                return Ok(k);
            }
        }

        log_result!(
            verbosity,
            "K-value iteration ({}): no convergence within {} step(s)\n",
            model,
            max_iter
        );
        if options.strict {
            return Err(FlashError::NotConverged("K-value iteration".into()));
        }
        self.converged = false;
        Ok(k)
    }
}
