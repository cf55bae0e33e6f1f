//! K-value models.
use crate::errors::FlashResult;
use crate::flash_tank::FlashTank;
use crate::species::Species;
use nalgebra::DVector;
use std::fmt;

mod ideal;
mod peng_robinson;
pub(crate) mod wilson;
pub use peng_robinson::PengRobinson;

/// K-value assigned to species that do not condense.
pub const NON_CONDENSABLE_K: f64 = 1e30;

/// Thermodynamic model used to calculate the equilibrium ratios K = y/x.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VleModel {
    /// Raoult's law: K = psat(T) / p.
    Ideal,
    /// Wilson's correlation from critical properties. Mostly used as an
    /// initial estimate for the other models.
    WilsonCorrelation,
    /// Fugacity coefficients of both phases from the Peng-Robinson equation of state.
    PengRobinson,
}

impl fmt::Display for VleModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ideal => write!(f, "ideal (Raoult's law)"),
            Self::WilsonCorrelation => write!(f, "Wilson correlation"),
            Self::PengRobinson => write!(f, "Peng-Robinson"),
        }
    }
}

impl VleModel {
    /// K-values at the flash conditions and the current outlet compositions of the tank.
    pub fn k_values(&self, tank: &FlashTank) -> FlashResult<DVector<f64>> {
        self.compute_k(
            tank.species(),
            tank.temperature,
            tank.pressure,
            tank.vapor.molefracs(),
            tank.liquid.molefracs(),
        )
    }

    pub(crate) fn compute_k(
        &self,
        species: &[Species],
        temperature: f64,
        pressure: f64,
        y: &DVector<f64>,
        x: &DVector<f64>,
    ) -> FlashResult<DVector<f64>> {
        let mut k = match self {
            Self::Ideal => ideal::k_values(species, temperature, pressure),
            Self::WilsonCorrelation => wilson::k_values(species, temperature, pressure),
            Self::PengRobinson => PengRobinson::new(species).k_values(temperature, pressure, y, x)?,
        };
        species
            .iter()
            .zip(k.iter_mut())
            .filter(|(s, _)| !s.condensable)
            .for_each(|(_, k)| *k = NON_CONDENSABLE_K);
        Ok(k)
    }
}
