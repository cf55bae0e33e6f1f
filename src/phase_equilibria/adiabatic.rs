use crate::errors::{FlashError, FlashResult};
use crate::flash_tank::FlashTank;
use crate::models::VleModel;
use crate::numerics::ridder;
use crate::SolverOptions;

const MAX_ITER_T: usize = 2000;
const TOL_T: f64 = 1e-8;
/// First temperature (K) of the scan for the flashable range.
const SCAN_START: f64 = 100.0;
/// Search interval (K) of the feed temperature.
const FEED_TEMPERATURE_BRACKET: [f64; 2] = [1.0, 2000.0];

/// # Adiabatic flash
impl FlashTank {
    /// Solve an adiabatic tank (Q = 0) for the flash temperature.
    ///
    /// The temperature range in which the feed splits into two phases is
    /// located by scanning upwards from 100 K in steps of 1 K. The flash
    /// temperature is then found on that range with Ridder's method.
    /// The first options control the K-value iteration at every
    /// temperature, the second options the temperature search.
    pub fn adiabatic_flash_given_feed_temperature(
        &self,
        model: VleModel,
        (inner, outer): (SolverOptions, SolverOptions),
    ) -> FlashResult<Self> {
        let (max_iter, tol, verbosity) = outer.unwrap_or(MAX_ITER_T, TOL_T);
        let mut tank = self.clone();
        tank.reset_outlets();

        let bounds = tank.flashable_temperature_range(model, inner, outer)?;
        log_result!(
            verbosity,
            "Adiabatic flash ({}): feed splits between {} K and {} K",
            model,
            bounds[0],
            bounds[1]
        );

        log_iter!(verbosity, " flash temperature |     heat duty     ");
        log_iter!(verbosity, "{:-<40}", "");
        let outer_options = SolverOptions {
            max_iter: Some(max_iter),
            tol: Some(tol),
            ..outer
        };
        let estimate = ridder(
            |t| {
                let q = tank.energy_balance_at(t, model, inner)?;
                log_iter!(verbosity, " {:17.8} | {:17.8e}", t, q);
                Ok(q)
            },
            bounds,
            0.0,
            outer_options,
        )
        .map_err(|e| match e {
            FlashError::NoBracketFound(_) => FlashError::NoBracketFound(format!(
                "the heat duty does not vanish between {} K and {} K",
                bounds[0], bounds[1]
            )),
            e => e,
        })?;

        // final state at the adiabatic flash temperature
        tank.converged = true;
        tank.heat_duty = tank.energy_balance_at(estimate.root, model, inner)?;
        tank.converged &= estimate.converged;

        log_result!(
            verbosity,
            "Adiabatic flash ({}): T = {:.5} K after {} iteration(s), V/F = {:.8}",
            model,
            tank.temperature,
            estimate.iterations,
            tank.vapor_fraction()
        );
        Ok(tank)
    }

    /// Solve an adiabatic tank (Q = 0) for the feed temperature.
    ///
    /// The phase split is converged once at the known flash temperature,
    /// then the feed temperature that closes the energy balance is found on
    /// [1 K, 2000 K] with Ridder's method and written to the feed stream.
    pub fn adiabatic_flash_given_flash_temperature(
        &self,
        model: VleModel,
        (inner, outer): (SolverOptions, SolverOptions),
    ) -> FlashResult<Self> {
        let (max_iter, tol, verbosity) = outer.unwrap_or(MAX_ITER_T, TOL_T);
        let mut tank = self.clone();
        tank.reset_outlets();
        tank.converged = true;

        tank.check_flashable(model, inner)?;
        let k = tank.wilson_k_values()?;
        tank.converge_k_values(model, k, inner)?;

        log_iter!(verbosity, " feed temperature  |     heat duty     ");
        log_iter!(verbosity, "{:-<40}", "");
        let outer_options = SolverOptions {
            max_iter: Some(max_iter),
            tol: Some(tol),
            ..outer
        };
        let estimate = ridder(
            |t| {
                tank.set_feed_temperature(t);
                let q = tank.energy_balance();
                log_iter!(verbosity, " {:17.8} | {:17.8e}", t, q);
                Ok(q)
            },
            FEED_TEMPERATURE_BRACKET,
            0.0,
            outer_options,
        )
        .map_err(|e| match e {
            FlashError::NoBracketFound(_) => FlashError::NoBracketFound(format!(
                "no feed temperature between {} K and {} K closes the energy balance",
                FEED_TEMPERATURE_BRACKET[0], FEED_TEMPERATURE_BRACKET[1]
            )),
            e => e,
        })?;

        tank.set_feed_temperature(estimate.root);
        tank.heat_duty = tank.energy_balance();
        tank.converged &= estimate.converged;

        log_result!(
            verbosity,
            "Adiabatic flash ({}): feed temperature = {:.5} K after {} iteration(s)",
            model,
            estimate.root,
            estimate.iterations
        );
        Ok(tank)
    }

    /// Converge the phase split at the given flash temperature and return the heat duty.
    fn energy_balance_at(
        &mut self,
        temperature: f64,
        model: VleModel,
        options: SolverOptions,
    ) -> FlashResult<f64> {
        self.set_temperature(temperature);
        let k = self.wilson_k_values()?;
        self.converge_k_values(model, k, options)?;
        Ok(self.energy_balance())
    }

    fn is_flashable_at(
        &mut self,
        temperature: f64,
        model: VleModel,
        options: SolverOptions,
    ) -> FlashResult<bool> {
        self.set_temperature(temperature);
        match self.check_flashable(model, options) {
            Ok(()) => Ok(true),
            Err(FlashError::NotFlashable(_) | FlashError::DegenerateEosRoot) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Lowest temperature at which the feed splits and the first temperature
    /// above it at which it does not split anymore.
    fn flashable_temperature_range(
        &mut self,
        model: VleModel,
        inner: SolverOptions,
        outer: SolverOptions,
    ) -> FlashResult<[f64; 2]> {
        let verbosity = outer.verbosity;
        let mut steps = 0;
        let mut temperature = SCAN_START;

        let mut lower = None;
        while steps <= MAX_ITER_T {
            if self.is_flashable_at(temperature, model, inner)? {
                lower = Some(temperature);
                break;
            }
            temperature += 1.0;
            steps += 1;
        }
        let lower = lower.ok_or_else(|| {
            FlashError::NoBracketFound(format!(
                "the feed does not split between {} K and {} K",
                SCAN_START, temperature
            ))
        })?;
        log_iter!(verbosity, "Temperature scan: lower bound {} K", lower);

        let mut upper = None;
        while steps <= MAX_ITER_T {
            if !self.is_flashable_at(temperature, model, inner)? {
                upper = Some(temperature);
                break;
            }
            temperature += 1.0;
            steps += 1;
        }
        let upper = upper.ok_or_else(|| {
            FlashError::NoBracketFound(format!("the feed still splits at {} K", temperature))
        })?;
        log_iter!(verbosity, "Temperature scan: upper bound {} K", upper);
        Ok([lower, upper])
    }
}
