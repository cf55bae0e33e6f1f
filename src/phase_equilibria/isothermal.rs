use crate::errors::FlashResult;
use crate::flash_tank::FlashTank;
use crate::models::VleModel;
use crate::SolverOptions;

/// # Isothermal flash
impl FlashTank {
    /// Solve the tank at its flash temperature and pressure.
    ///
    /// The feed is checked for a two-phase split, the K-values are seeded
    /// with the Wilson correlation and converged with `model`. The heat duty
    /// required to hold the flash temperature is stored in the returned tank.
    pub fn isothermal_flash(&self, model: VleModel, options: SolverOptions) -> FlashResult<Self> {
        let mut tank = self.clone();
        tank.reset_outlets();
        tank.converged = true;

        tank.check_flashable(model, options)?;
        let k = tank.wilson_k_values()?;
        tank.converge_k_values(model, k, options)?;
        tank.heat_duty = tank.energy_balance();

        log_result!(
            options.verbosity,
            "Isothermal flash ({}): T = {:.5} K, V/F = {:.8}, Q = {:.5} W",
            model,
            tank.temperature,
            tank.vapor_fraction(),
            tank.heat_duty
        );
        Ok(tank)
    }
}
