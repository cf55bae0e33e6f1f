use crate::errors::{FlashError, FlashResult};
use crate::species::Species;
use nalgebra::DVector;
use quantity::{MolarEnergy, Pressure, Temperature, JOULE, KELVIN, MOL, PASCAL};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

const TOL_MOLEFRACS: f64 = 1e-8;

/// Aggregate state of a component in a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Liquid,
    Vapor,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Liquid => write!(f, "liquid"),
            Self::Vapor => write!(f, "vapor"),
        }
    }
}

/// A material stream with an ordered list of species.
///
/// Component molar flows (mol/s) and mole fractions are kept consistent:
/// changing one of them rescales the other.
#[derive(Clone, Debug)]
pub struct Stream {
    species: Arc<Vec<Species>>,
    phases: Vec<Phase>,
    molar_flows: DVector<f64>,
    molefracs: DVector<f64>,
    total_molar_flow: f64,
    temperature: f64,
    pressure: f64,
}

impl Stream {
    /// Create a stream from the molar flows (mol/s) of all components.
    pub fn from_molar_flows(
        species: Vec<Species>,
        phase: Phase,
        molar_flows: &[f64],
        temperature: Temperature,
        pressure: Pressure,
    ) -> FlashResult<Self> {
        validate_species(&species, molar_flows.len())?;
        if molar_flows.iter().any(|&n| !(n >= 0.0)) {
            return Err(FlashError::InvalidComposition(
                "molar flows have to be non-negative".into(),
            ));
        }
        let molar_flows = DVector::from_column_slice(molar_flows);
        let total_molar_flow = molar_flows.sum();
        if !(total_molar_flow > 0.0) {
            return Err(FlashError::InvalidComposition(
                "the total molar flow has to be positive".into(),
            ));
        }
        let molefracs = &molar_flows / total_molar_flow;
        Ok(Self {
            phases: vec![phase; species.len()],
            species: Arc::new(species),
            molar_flows,
            molefracs,
            total_molar_flow,
            temperature: temperature.convert_into(KELVIN),
            pressure: pressure.convert_into(PASCAL),
        })
    }

    /// Create a stream from the total molar flow (mol/s) and the mole fractions.
    pub fn from_total_molar_flow(
        species: Vec<Species>,
        phase: Phase,
        total_molar_flow: f64,
        molefracs: &[f64],
        temperature: Temperature,
        pressure: Pressure,
    ) -> FlashResult<Self> {
        validate_species(&species, molefracs.len())?;
        if molefracs.iter().any(|&x| !(x >= 0.0)) {
            return Err(FlashError::InvalidComposition(
                "mole fractions have to be non-negative".into(),
            ));
        }
        let sum: f64 = molefracs.iter().sum();
        if (sum - 1.0).abs() > TOL_MOLEFRACS {
            return Err(FlashError::InvalidComposition(format!(
                "mole fractions sum up to {sum} instead of 1"
            )));
        }
        if !(total_molar_flow > 0.0) {
            return Err(FlashError::InvalidComposition(
                "the total molar flow has to be positive".into(),
            ));
        }
        let molefracs = DVector::from_column_slice(molefracs);
        Ok(Self {
            phases: vec![phase; species.len()],
            species: Arc::new(species),
            molar_flows: &molefracs * total_molar_flow,
            molefracs,
            total_molar_flow,
            temperature: temperature.convert_into(KELVIN),
            pressure: pressure.convert_into(PASCAL),
        })
    }

    /// Stream without flow sharing the species of another stream.
    pub(crate) fn empty(
        species: Arc<Vec<Species>>,
        phase: Phase,
        molefracs: DVector<f64>,
        temperature: f64,
        pressure: f64,
    ) -> Self {
        Self {
            phases: vec![phase; species.len()],
            molar_flows: DVector::zeros(species.len()),
            species,
            molefracs,
            total_molar_flow: 0.0,
            temperature,
            pressure,
        }
    }

    /// Assign a phase to every component individually.
    pub fn with_phases(mut self, phases: &[Phase]) -> FlashResult<Self> {
        if phases.len() != self.components() {
            return Err(FlashError::IncompatibleComponents(
                self.components(),
                phases.len(),
            ));
        }
        self.phases = phases.to_vec();
        Ok(self)
    }

    pub fn components(&self) -> usize {
        self.species.len()
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub(crate) fn shared_species(&self) -> Arc<Vec<Species>> {
        Arc::clone(&self.species)
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Component molar flows in mol/s.
    pub fn molar_flows(&self) -> &DVector<f64> {
        &self.molar_flows
    }

    pub fn molefracs(&self) -> &DVector<f64> {
        &self.molefracs
    }

    /// Total molar flow in mol/s.
    pub fn total_molar_flow(&self) -> f64 {
        self.total_molar_flow
    }

    pub fn temperature(&self) -> Temperature {
        self.temperature * KELVIN
    }

    pub fn pressure(&self) -> Pressure {
        self.pressure * PASCAL
    }

    pub(crate) fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
    }

    /// Set total flow and composition; the component flows follow.
    pub(crate) fn set_flow_and_composition(&mut self, total_molar_flow: f64, molefracs: DVector<f64>) {
        self.molar_flows = &molefracs * total_molar_flow;
        self.molefracs = molefracs;
        self.total_molar_flow = total_molar_flow;
    }

    /// Molar enthalpy in J/mol at the stream temperature.
    pub(crate) fn h(&self) -> f64 {
        self.species
            .iter()
            .zip(&self.phases)
            .zip(self.molefracs.iter())
            .map(|((s, &phase), &x)| x * s.enthalpy(self.temperature, phase))
            .sum()
    }

    /// Molar enthalpy of the stream relative to the liquid at 273.15 K.
    pub fn molar_enthalpy(&self) -> MolarEnergy {
        self.h() * (JOULE / MOL)
    }

    /// Enthalpy flow of the stream in J/s.
    pub fn total_enthalpy(&self) -> f64 {
        self.h() * self.total_molar_flow
    }
}

fn validate_species(species: &[Species], n: usize) -> FlashResult<()> {
    if species.is_empty() {
        return Err(FlashError::InvalidComposition(
            "a stream needs at least one species".into(),
        ));
    }
    if species.len() != n {
        return Err(FlashError::IncompatibleComponents(species.len(), n));
    }
    species.iter().try_for_each(Species::validate)
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "T = {:.5} K, p = {:.5} Pa, n = {:.5} mol/s",
            self.temperature, self.pressure, self.total_molar_flow
        )?;
        for (i, s) in self.species.iter().enumerate() {
            writeln!(
                f,
                "  {:<16} {:<7} x = {:.5}, n = {:.5} mol/s",
                s.name, self.phases[i], self.molefracs[i], self.molar_flows[i]
            )?;
        }
        Ok(())
    }
}
