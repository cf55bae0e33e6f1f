//! Peng-Robinson equation of state.
//!
//! The K-values follow from the fugacity coefficients of both phases. The
//! compressibility factor of each phase is taken from the cubic in Z: the
//! smallest root for the liquid and the largest root for the vapor.
use crate::errors::FlashResult;
use crate::numerics::cubic_min_max_roots;
use crate::species::{Species, RGAS};
use crate::stream::Phase;
use nalgebra::DVector;
use std::f64::consts::SQRT_2;

/// A simple version of the Peng-Robinson equation of state
/// without binary interaction parameters.
#[derive(Clone, Debug)]
pub struct PengRobinson {
    /// Critical temperature in Kelvin
    tc: DVector<f64>,
    a: DVector<f64>,
    b: DVector<f64>,
    kappa: DVector<f64>,
}

impl PengRobinson {
    /// Pure component parameters from the critical properties of the species.
    pub fn new(species: &[Species]) -> Self {
        let collate = |f: fn(&Species) -> f64| {
            DVector::from_iterator(species.len(), species.iter().map(f))
        };
        let tc = collate(|s| s.tc);
        let pc = collate(|s| s.pc);
        let ac = collate(|s| s.acentric_factor);

        let a = 0.45724 * RGAS * RGAS * tc.component_mul(&tc).component_div(&pc);
        let b = 0.07780 * RGAS * tc.component_div(&pc);
        let kappa = ac.map(|ac| 0.37464 + (1.54226 - 0.26992 * ac) * ac);
        Self { tc, a, b, kappa }
    }

    pub fn components(&self) -> usize {
        self.tc.len()
    }

    fn sqrt_a_alpha(&self, temperature: f64) -> DVector<f64> {
        self.tc.zip_zip_map(&self.kappa, &self.a, |tc, kappa, a| {
            (a * (1.0 + kappa * (1.0 - (temperature / tc).sqrt())).powi(2)).sqrt()
        })
    }

    /// Dimensionless mixture parameters A and B and the compressibility factor.
    fn state(
        &self,
        temperature: f64,
        pressure: f64,
        x: &DVector<f64>,
        sqrt_a_alpha: &DVector<f64>,
        phase: Phase,
    ) -> FlashResult<(f64, f64, f64)> {
        // zero binary interaction: (a alpha)_ij = sqrt((a alpha)_i (a alpha)_j)
        let a_mix = x.dot(sqrt_a_alpha).powi(2);
        let b_mix = x.dot(&self.b);
        let rt = RGAS * temperature;
        let a = a_mix * pressure / (rt * rt);
        let b = b_mix * pressure / rt;

        let (z_min, z_max) = cubic_min_max_roots(
            -(1.0 - b),
            a - 2.0 * b - 3.0 * b * b,
            -(a * b - b * b - b.powi(3)),
        )?;
        let z = match phase {
            Phase::Liquid => z_min,
            Phase::Vapor => z_max,
        };
        Ok((a, b, z))
    }

    /// Compressibility factor of the given phase.
    pub fn compressibility_factor(
        &self,
        temperature: f64,
        pressure: f64,
        molefracs: &DVector<f64>,
        phase: Phase,
    ) -> FlashResult<f64> {
        let x = normalize(molefracs);
        let sqrt_a_alpha = self.sqrt_a_alpha(temperature);
        let (_, _, z) = self.state(temperature, pressure, &x, &sqrt_a_alpha, phase)?;
        Ok(z)
    }

    /// Logarithm of the fugacity coefficients of all components in the given phase.
    ///
    /// Temperature in K, pressure in Pa. The composition is normalized before use.
    pub fn ln_phi(
        &self,
        temperature: f64,
        pressure: f64,
        molefracs: &DVector<f64>,
        phase: Phase,
    ) -> FlashResult<DVector<f64>> {
        let x = normalize(molefracs);
        let sqrt_a_alpha = self.sqrt_a_alpha(temperature);
        let (a, b, z) = self.state(temperature, pressure, &x, &sqrt_a_alpha, phase)?;

        let s = x.dot(&sqrt_a_alpha);
        let b_mix = x.dot(&self.b);
        let ln_z_b = (z - b).ln();
        let log_term = ((z + (1.0 + SQRT_2) * b) / (z + (1.0 - SQRT_2) * b)).ln();
        let prefactor = a / (2.0 * SQRT_2 * b);
        Ok(DVector::from_iterator(
            self.components(),
            (0..self.components()).map(|i| {
                let b_i = self.b[i] / b_mix;
                let a_i = 2.0 * sqrt_a_alpha[i] / s;
                b_i * (z - 1.0) - ln_z_b - prefactor * (a_i - b_i) * log_term
            }),
        ))
    }

    /// K-values from the fugacity coefficients of the liquid (`x`) and the vapor (`y`).
    pub fn k_values(
        &self,
        temperature: f64,
        pressure: f64,
        y: &DVector<f64>,
        x: &DVector<f64>,
    ) -> FlashResult<DVector<f64>> {
        let ln_phi_l = self.ln_phi(temperature, pressure, x, Phase::Liquid)?;
        let ln_phi_v = self.ln_phi(temperature, pressure, y, Phase::Vapor)?;
        Ok((ln_phi_l - ln_phi_v).map(f64::exp))
    }
}

fn normalize(molefracs: &DVector<f64>) -> DVector<f64> {
    let sum = molefracs.sum();
    if sum > 0.0 {
        molefracs / sum
    } else {
        molefracs.clone()
    }
}
