use super::{MAX_ITER_K, TOL_K};
use crate::errors::{FlashError, FlashResult, Infeasibility};
use crate::flash_tank::FlashTank;
use crate::models::{wilson, VleModel};
use crate::species::Species;
use crate::SolverOptions;
use nalgebra::DVector;
use quantity::{Temperature, KELVIN};

const MAX_STEPS_T: usize = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum IncipientPhase {
    /// Incipient vapor of a saturated liquid (x = z).
    Bubble,
    /// Incipient liquid of a saturated vapor (y = z).
    Dew,
}

/// Composition of the incipient phase (not normalized).
fn incipient_molefracs(
    species: &[Species],
    z: &DVector<f64>,
    k: &DVector<f64>,
    phase: IncipientPhase,
) -> DVector<f64> {
    DVector::from_iterator(
        z.len(),
        species.iter().enumerate().map(|(i, s)| match (phase, s.condensable) {
            (IncipientPhase::Bubble, true) => z[i] * k[i],
            (IncipientPhase::Bubble, false) => z[i],
            (IncipientPhase::Dew, true) => z[i] / k[i],
            (IncipientPhase::Dew, false) => 0.0,
        }),
    )
}

/// # Bubble and dew points
impl FlashTank {
    /// Sum of the incipient phase mole fractions at the given temperature.
    ///
    /// The K-values are converged for the incipient phase starting from `k`.
    fn incipient_sum(
        &self,
        model: VleModel,
        phase: IncipientPhase,
        temperature: f64,
        mut k: DVector<f64>,
        options: SolverOptions,
    ) -> FlashResult<(f64, DVector<f64>)> {
        let (max_iter, tol, verbosity) = options.unwrap_or(MAX_ITER_K, TOL_K);
        let species = self.species();
        let z = self.z();

        let mut converged = false;
        for _ in 0..max_iter {
            let w = incipient_molefracs(species, z, &k, phase);
            let (y, x) = match phase {
                IncipientPhase::Bubble => (&w, z),
                IncipientPhase::Dew => (z, &w),
            };
            let k_new = model.compute_k(species, temperature, self.pressure, y, x)?;
            let delta = (&k_new - &k).amax();
            k = k_new;
            if delta < tol {
                converged = true;
                break;
            }
        }
        if !converged {
            log_result!(
                verbosity,
                "{:?} point test: no convergence within {} step(s)",
                phase,
                max_iter
            );
            if options.strict {
                return Err(FlashError::NotConverged(format!("{phase:?} point test")));
            }
        }

        let sum = incipient_molefracs(species, z, &k, phase).sum();
        Ok((sum, k))
    }

    fn wilson_k_values_at(&self, temperature: f64) -> FlashResult<DVector<f64>> {
        let z = self.z();
        VleModel::WilsonCorrelation.compute_k(self.species(), temperature, self.pressure, z, z)
    }

    /// Sum of K z over all components of a liquid with the feed composition.
    ///
    /// A value below one means that the pressure of the tank is above the
    /// bubble pressure of the feed.
    pub fn bubble_sum(&self, model: VleModel, options: SolverOptions) -> FlashResult<f64> {
        let k = self.wilson_k_values()?;
        let (sum, _) =
            self.incipient_sum(model, IncipientPhase::Bubble, self.temperature, k, options)?;
        Ok(sum)
    }

    /// Sum of z / K over all condensable components of a vapor with the feed composition.
    ///
    /// A value below one means that the pressure of the tank is below the
    /// dew pressure of the feed.
    pub fn dew_sum(&self, model: VleModel, options: SolverOptions) -> FlashResult<f64> {
        let k = self.wilson_k_values()?;
        let (sum, _) = self.incipient_sum(model, IncipientPhase::Dew, self.temperature, k, options)?;
        Ok(sum)
    }

    /// Check whether the feed splits into two phases at the conditions of the tank.
    pub fn check_flashable(&self, model: VleModel, options: SolverOptions) -> FlashResult<()> {
        let dew_sum = self.dew_sum(model, options)?;
        let bubble_sum = self.bubble_sum(model, options)?;
        log_iter!(
            options.verbosity,
            "Feasibility at T = {:.5} K: bubble sum = {:.8}, dew sum = {:.8}",
            self.temperature,
            bubble_sum,
            dew_sum
        );
        if bubble_sum < 1.0 {
            return Err(FlashError::NotFlashable(Infeasibility::AboveBubblePressure));
        }
        if dew_sum < 1.0 {
            return Err(FlashError::NotFlashable(Infeasibility::BelowDewPressure));
        }
        Ok(())
    }

    /// Estimate the bubble temperature of the feed at the pressure of the tank.
    ///
    /// The temperature is stepped in increments of 1 K, starting from an
    /// estimate based on the critical properties, until the bubble sum crosses one.
    pub fn bubble_temperature(
        &self,
        model: VleModel,
        options: SolverOptions,
    ) -> FlashResult<Temperature> {
        self.incipient_temperature(model, IncipientPhase::Bubble, options)
    }

    /// Estimate the dew temperature of the feed at the pressure of the tank.
    ///
    /// The temperature is stepped in increments of 1 K, starting from an
    /// estimate based on the critical properties, until the dew sum crosses one.
    pub fn dew_temperature(
        &self,
        model: VleModel,
        options: SolverOptions,
    ) -> FlashResult<Temperature> {
        self.incipient_temperature(model, IncipientPhase::Dew, options)
    }

    fn incipient_temperature(
        &self,
        model: VleModel,
        phase: IncipientPhase,
        options: SolverOptions,
    ) -> FlashResult<Temperature> {
        let verbosity = options.verbosity;
        let z = self.z();

        // initial guess: mole fraction average over the condensable species
        let (weighted, weight) = self
            .species()
            .iter()
            .zip(z.iter())
            .filter(|(s, _)| s.condensable)
            .fold((0.0, 0.0), |(t, w), (s, &z)| {
                (t + z * wilson::saturation_temperature(s, self.pressure), w + z)
            });
        if !(weight > 0.0) {
            return Err(FlashError::InvalidComposition(
                "the feed contains no condensable species".into(),
            ));
        }
        let mut temperature = weighted / weight;
        let mut k = self.wilson_k_values_at(temperature)?;

        log_iter!(verbosity, " step |  temperature   |      sum      ");
        log_iter!(verbosity, "{:-<42}", "");

        let mut sum_old: Option<f64> = None;
        for step in 0..MAX_STEPS_T {
            let (sum, k_new) = self.incipient_sum(model, phase, temperature, k, options)?;
            k = k_new;
            log_iter!(verbosity, " {:4} | {:14.8} | {:14.8}", step, temperature, sum);

            let crossed = sum_old.is_some_and(|old| (old - 1.0) * (sum - 1.0) < 0.0);
            if crossed || sum == 1.0 {
                log_result!(
                    verbosity,
                    "{:?} temperature: T = {:.5} K after {} step(s)\n",
                    phase,
                    temperature,
                    step
                );
                return Ok(temperature * KELVIN);
            }
            sum_old = Some(sum);

            // the bubble sum rises with temperature, the dew sum falls
            let too_cold = match phase {
                IncipientPhase::Bubble => sum < 1.0,
                IncipientPhase::Dew => sum > 1.0,
            };
            temperature += if too_cold { 1.0 } else { -1.0 };
            if temperature <= 0.0 {
                break;
            }
        }
        Err(FlashError::NotConverged(format!("{phase:?} temperature")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{Phase, Stream};
    use approx::assert_relative_eq;
    use quantity::PASCAL;

    fn tank(pressure: f64) -> FlashTank {
        let species: Vec<Species> = serde_json::from_str(
            r#"[
                {
                    "name": "n-pentane",
                    "atom_count": 17,
                    "condensable": true,
                    "antoine": [13.7667, 2451.88, 232.014],
                    "normal_boiling_point": 309.21,
                    "gas_cp": [2.464, 45.351e-3, -14.111e-6, 0.0],
                    "tc": 469.7,
                    "pc": 3.370e6,
                    "acentric_factor": 0.252
                },
                {
                    "name": "n-hexane",
                    "atom_count": 20,
                    "condensable": true,
                    "antoine": [13.8193, 2696.04, 224.317],
                    "normal_boiling_point": 341.88,
                    "gas_cp": [3.025, 53.722e-3, -16.791e-6, 0.0],
                    "tc": 507.6,
                    "pc": 3.025e6,
                    "acentric_factor": 0.301
                }
            ]"#,
        )
        .unwrap();
        let t = 328.15 * KELVIN;
        let p = pressure * PASCAL;
        let feed =
            Stream::from_total_molar_flow(species, Phase::Liquid, 1.0, &[0.5, 0.5], t, p).unwrap();
        FlashTank::new(feed, t, p)
    }

    #[test]
    fn ideal_sums() -> FlashResult<()> {
        let tank = tank(101325.0);
        let psat: Vec<f64> = tank.species().iter().map(|s| s.psat(328.15)).collect();
        let options = SolverOptions::default();
        let bubble = tank.bubble_sum(VleModel::Ideal, options)?;
        let dew = tank.dew_sum(VleModel::Ideal, options)?;
        assert_relative_eq!(
            bubble,
            0.5 * (psat[0] + psat[1]) / 101325.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            dew,
            0.5 * 101325.0 * (1.0 / psat[0] + 1.0 / psat[1]),
            max_relative = 1e-12
        );
        Ok(())
    }

    #[test]
    fn feasibility() {
        let options = SolverOptions::default();
        assert!(tank(101325.0).check_flashable(VleModel::Ideal, options).is_ok());
        assert!(matches!(
            tank(130000.0).check_flashable(VleModel::Ideal, options),
            Err(FlashError::NotFlashable(Infeasibility::AboveBubblePressure))
        ));
        assert!(matches!(
            tank(90000.0).check_flashable(VleModel::Ideal, options),
            Err(FlashError::NotFlashable(Infeasibility::BelowDewPressure))
        ));
    }

    #[test]
    fn bubble_and_dew_temperatures() -> FlashResult<()> {
        let tank = tank(101325.0);
        let options = SolverOptions::default();
        let t_bubble = tank
            .bubble_temperature(VleModel::Ideal, options)?
            .convert_into(KELVIN);
        let t_dew = tank
            .dew_temperature(VleModel::Ideal, options)?
            .convert_into(KELVIN);
        assert!(t_bubble < t_dew);

        // the bubble sum crossed one within the last step
        let mut tank = tank;
        tank.temperature = t_bubble;
        let above = tank.bubble_sum(VleModel::Ideal, options)?;
        tank.temperature = t_bubble - 1.0;
        let below = tank.bubble_sum(VleModel::Ideal, options)?;
        tank.temperature = t_bubble + 1.0;
        let further_above = tank.bubble_sum(VleModel::Ideal, options)?;
        assert!((above - 1.0) * (below - 1.0) < 0.0 || (above - 1.0) * (further_above - 1.0) < 0.0);
        Ok(())
    }
}
