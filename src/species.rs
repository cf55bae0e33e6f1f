//! Physical property records of pure species.
use crate::errors::{FlashError, FlashResult};
use crate::stream::Phase;
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use num_dual::{first_derivative, DualNum};
use quantity::{MolarEnergy, MolarEntropy, Pressure, Temperature, JOULE, KELVIN, MOL, PASCAL};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::ops::Deref;
use std::path::Path;

/// Ideal gas constant in J/(mol K).
pub(crate) const RGAS: f64 = 8.314;
/// Reference state of all enthalpies: liquid at this temperature (K).
pub(crate) const T_REF: f64 = 273.15;
const CELSIUS_OFFSET: f64 = 273.15;

/// Immutable physical property record of a species.
///
/// All properties are stored in SI units except where noted:
/// the Antoine constants yield the vapor pressure in kPa for a temperature
/// in degrees Celsius, the liquid heat capacity constants yield J/(kmol K)
/// and the gas heat capacity constants yield Cp/R.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Species {
    #[serde(default)]
    pub id: usize,
    pub name: String,
    #[serde(default)]
    pub formula: String,
    /// Number of atoms in the molecule.
    pub atom_count: usize,
    /// Molar mass in kg/mol.
    #[serde(default)]
    pub molar_mass: f64,
    pub condensable: bool,
    /// Antoine constants: ln(p / kPa) = A - B / (C + T / °C).
    #[serde(default)]
    pub antoine: [f64; 3],
    /// Lower limit of the Antoine equation in K.
    #[serde(default)]
    pub t_min: f64,
    /// Upper limit of the Antoine equation in K.
    #[serde(default)]
    pub t_max: f64,
    /// Heat of vaporization at the normal boiling point in J/mol.
    #[serde(default)]
    pub latent_heat: f64,
    /// Normal boiling point in K.
    #[serde(default)]
    pub normal_boiling_point: f64,
    /// Liquid heat capacity constants (J/(kmol K)).
    #[serde(default)]
    pub liquid_cp: [f64; 5],
    /// Use the form of the liquid heat capacity in the reduced
    /// temperature difference 1 - T/Tc instead of the polynomial in T.
    #[serde(default)]
    pub special_liquid_cp: bool,
    /// Ideal gas heat capacity constants: Cp/R = A + BT + CT² + D/T².
    pub gas_cp: [f64; 4],
    /// Critical temperature in K.
    pub tc: f64,
    /// Critical pressure in Pa.
    pub pc: f64,
    pub acentric_factor: f64,
}

impl Species {
    /// Check the record for data that can not be used in a calculation.
    pub fn validate(&self) -> FlashResult<()> {
        let invalid = |reason: &str| {
            Err(FlashError::InvalidSpecies(format!(
                "{}: {reason}",
                self.name
            )))
        };
        if !(self.tc > 0.0 && self.pc > 0.0) {
            return invalid("critical temperature and pressure have to be positive");
        }
        if self.gas_cp.iter().all(|&c| c == 0.0) && self.atom_count == 0 {
            return invalid("the gas heat capacity can not be estimated without an atom count");
        }
        if self.condensable && !(self.normal_boiling_point > 0.0) {
            return invalid("condensable species require a normal boiling point");
        }
        if self.condensable && self.antoine.iter().all(|&c| c == 0.0) {
            return invalid("condensable species require Antoine constants");
        }
        Ok(())
    }

    /// Vapor pressure in Pa from the Antoine equation.
    pub(crate) fn psat(&self, temperature: f64) -> f64 {
        let [a, b, c] = self.antoine;
        (a - b / (c + temperature - CELSIUS_OFFSET)).exp() * 1000.0
    }

    /// Vapor pressure from the Antoine equation.
    pub fn vapor_pressure(&self, temperature: Temperature) -> Pressure {
        self.psat(temperature.convert_into(KELVIN)) * PASCAL
    }

    /// Enthalpy change of the liquid between `t0` and `t` in J/mol.
    fn liquid_enthalpy_change<D: DualNum<f64> + Copy>(&self, t0: f64, t: D) -> D {
        let c = &self.liquid_cp;
        let h = if self.special_liquid_cp {
            let tc = self.tc;
            let primitive = |tau: D| {
                // ln|tau|
                (tau * tau).ln() * (0.5 * c[0] * c[0])
                    + tau * c[1]
                    - tau.powi(2) * (c[0] * c[2])
                    - tau.powi(3) * (c[0] * c[3] / 3.0)
                    - tau.powi(4) * (c[2] * c[2] / 12.0)
                    - tau.powi(5) * (c[2] * c[3] / 10.0)
                    - tau.powi(6) * (c[3] * c[3] / 30.0)
            };
            let tau = -t / tc + 1.0;
            let tau0 = D::from(1.0 - t0 / tc);
            (primitive(tau) - primitive(tau0)) * (-tc)
        } else {
            (t - t0) * c[0]
                + (t.powi(2) - t0.powi(2)) * (c[1] / 2.0)
                + (t.powi(3) - t0.powi(3)) * (c[2] / 3.0)
                + (t.powi(4) - t0.powi(4)) * (c[3] / 4.0)
                + (t.powi(5) - t0.powi(5)) * (c[4] / 5.0)
        };
        h / 1000.0
    }

    /// Enthalpy change of the ideal gas between `t0` and `t` in J/mol.
    fn gas_enthalpy_change<D: DualNum<f64> + Copy>(&self, t0: f64, t: D) -> D {
        let [a, b, c, d] = self.gas_cp;
        if [a, b, c, d].iter().all(|&x| x == 0.0) {
            let cp = match self.atom_count {
                1 => 1.5,
                2 => 2.5,
                _ => 3.0,
            };
            return (t - t0) * (cp * RGAS);
        }
        ((t - t0) * a + (t.powi(2) - t0.powi(2)) * (b / 2.0) + (t.powi(3) - t0.powi(3)) * (c / 3.0)
            - (t.recip() - t0.recip()) * d)
            * RGAS
    }

    /// Molar enthalpy in J/mol relative to the liquid at 273.15 K.
    pub(crate) fn enthalpy<D: DualNum<f64> + Copy>(&self, temperature: D, phase: Phase) -> D {
        match (phase, self.condensable) {
            (Phase::Liquid, true) => self.liquid_enthalpy_change(T_REF, temperature),
            (Phase::Liquid, false) => D::from(0.0),
            (Phase::Vapor, true) => {
                let tb = self.normal_boiling_point;
                self.gas_enthalpy_change(tb, temperature)
                    + self.liquid_enthalpy_change(T_REF, tb)
                    + self.latent_heat
            }
            (Phase::Vapor, false) => self.gas_enthalpy_change(T_REF, temperature),
        }
    }

    /// Molar enthalpy relative to the liquid at 273.15 K.
    ///
    /// The vapor is treated as an ideal gas and pressure effects are neglected.
    pub fn molar_enthalpy(&self, temperature: Temperature, phase: Phase) -> MolarEnergy {
        self.enthalpy(temperature.convert_into(KELVIN), phase) * (JOULE / MOL)
    }

    /// Molar isobaric heat capacity of the given phase.
    pub fn molar_isobaric_heat_capacity(
        &self,
        temperature: Temperature,
        phase: Phase,
    ) -> MolarEntropy {
        let t = temperature.convert_into(KELVIN);
        let (_, cp) = first_derivative(|t| self.enthalpy(t, phase), t);
        cp * (JOULE / MOL / KELVIN)
    }

    /// Read the records of the given species from a json file.
    ///
    /// The records are identified by their name and returned in the
    /// order in which the names are given.
    pub fn from_json<P, S>(names: &[S], file: P) -> FlashResult<Vec<Self>>
    where
        P: AsRef<Path>,
        S: Deref<Target = str>,
    {
        let mut queried: IndexSet<&str> = names.iter().map(|s| s.deref()).collect();
        if queried.len() != names.len() {
            return Err(FlashError::InvalidSpecies(
                "A species was requested more than once.".to_string(),
            ));
        }

        let reader = BufReader::new(File::open(file)?);
        let file_records: Vec<Self> = serde_json::from_reader(reader)?;
        let mut records: IndexMap<&str, Self> = IndexMap::with_capacity(names.len());

        // build map, draining the set of queried species in the process
        for record in file_records {
            if let Some(name) = queried.swap_take(record.name.as_str()) {
                records.insert(name, record);
            }
            if queried.is_empty() {
                break;
            }
        }

        if !queried.is_empty() {
            return Err(FlashError::ComponentsNotFound(queried.iter().join(", ")));
        }

        names
            .iter()
            .map(|name| {
                let record = records
                    .swap_remove(name.deref())
                    .ok_or_else(|| FlashError::ComponentsNotFound(name.to_string()))?;
                record.validate()?;
                Ok(record)
            })
            .collect()
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Species(name={}, formula={}, condensable={}, tc={} K, pc={} Pa, acentric_factor={})",
            self.name, self.formula, self.condensable, self.tc, self.pc, self.acentric_factor
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pentane() -> Species {
        serde_json::from_str(
            r#"{
                "id": 1,
                "name": "n-pentane",
                "formula": "C5H12",
                "atom_count": 17,
                "molar_mass": 0.07215,
                "condensable": true,
                "antoine": [13.7667, 2451.88, 232.014],
                "t_min": 228.0,
                "t_max": 330.0,
                "latent_heat": 25790.0,
                "normal_boiling_point": 309.21,
                "liquid_cp": [159080.0, -270.5, 0.99536, 0.0, 0.0],
                "gas_cp": [2.464, 45.351e-3, -14.111e-6, 0.0],
                "tc": 469.7,
                "pc": 3.370e6,
                "acentric_factor": 0.252
            }"#,
        )
        .unwrap()
    }

    fn nitrogen() -> Species {
        serde_json::from_str(
            r#"{
                "name": "nitrogen",
                "formula": "N2",
                "atom_count": 2,
                "molar_mass": 0.028014,
                "condensable": false,
                "gas_cp": [3.280, 0.593e-3, 0.0, 0.040e5],
                "tc": 126.2,
                "pc": 3.4e6,
                "acentric_factor": 0.038
            }"#,
        )
        .unwrap()
    }

    fn ethane() -> Species {
        serde_json::from_str(
            r#"{
                "name": "ethane",
                "formula": "C2H6",
                "atom_count": 8,
                "condensable": true,
                "antoine": [13.8797, 1582.18, 268.5],
                "latent_heat": 14700.0,
                "normal_boiling_point": 184.55,
                "liquid_cp": [44.009, 89718.0, 918.77, -1886.0, 0.0],
                "special_liquid_cp": true,
                "gas_cp": [1.131, 19.225e-3, -5.561e-6, 0.0],
                "tc": 305.32,
                "pc": 4.872e6,
                "acentric_factor": 0.099
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn vapor_pressure_at_normal_boiling_point() {
        let s = pentane();
        let p = s.vapor_pressure(s.normal_boiling_point * KELVIN);
        assert_relative_eq!(p.convert_into(PASCAL), 101325.0, max_relative = 1e-2);
    }

    #[test]
    fn liquid_reference_state() {
        let s = pentane();
        let h = s.molar_enthalpy(T_REF * KELVIN, Phase::Liquid);
        assert_relative_eq!(h.convert_into(JOULE / MOL), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn latent_heat_at_normal_boiling_point() {
        let s = pentane();
        let tb = s.normal_boiling_point * KELVIN;
        let dh = s.molar_enthalpy(tb, Phase::Vapor) - s.molar_enthalpy(tb, Phase::Liquid);
        assert_relative_eq!(dh.convert_into(JOULE / MOL), 25790.0, max_relative = 1e-12);
    }

    #[test]
    fn liquid_heat_capacity() {
        let s = pentane();
        let cp = s.molar_isobaric_heat_capacity(300.0 * KELVIN, Phase::Liquid);
        let expected = (159080.0 - 270.5 * 300.0 + 0.99536 * 300.0f64.powi(2)) / 1000.0;
        assert_relative_eq!(
            cp.convert_into(JOULE / MOL / KELVIN),
            expected,
            max_relative = 1e-10
        );
    }

    #[test]
    fn special_liquid_heat_capacity() {
        let s = ethane();
        let t = 250.0;
        let [a, b, c, d, _] = s.liquid_cp;
        let tau = 1.0 - t / s.tc;
        let expected = (a * a / tau + b
            - 2.0 * a * c * tau
            - a * d * tau.powi(2)
            - c * c * tau.powi(3) / 3.0
            - c * d * tau.powi(4) / 2.0
            - d * d * tau.powi(5) / 5.0)
            / 1000.0;
        let cp = s.molar_isobaric_heat_capacity(t * KELVIN, Phase::Liquid);
        assert_relative_eq!(
            cp.convert_into(JOULE / MOL / KELVIN),
            expected,
            max_relative = 1e-8
        );
    }

    #[test]
    fn non_condensable_enthalpies() {
        let s = nitrogen();
        let t = 400.0;
        let h_liquid = s.molar_enthalpy(t * KELVIN, Phase::Liquid);
        assert_eq!(h_liquid.convert_into(JOULE / MOL), 0.0);

        let cp = s.molar_isobaric_heat_capacity(t * KELVIN, Phase::Vapor);
        let expected = RGAS * (3.280 + 0.593e-3 * t + 0.040e5 / (t * t));
        assert_relative_eq!(
            cp.convert_into(JOULE / MOL / KELVIN),
            expected,
            max_relative = 1e-10
        );
    }

    #[test]
    fn heat_capacity_estimated_from_atom_count() {
        let mut s = nitrogen();
        s.gas_cp = [0.0; 4];
        s.atom_count = 1;
        let h = s.molar_enthalpy((T_REF + 100.0) * KELVIN, Phase::Vapor);
        assert_relative_eq!(
            h.convert_into(JOULE / MOL),
            1.5 * RGAS * 100.0,
            max_relative = 1e-10
        );
        s.atom_count = 2;
        let cp = s.molar_isobaric_heat_capacity(500.0 * KELVIN, Phase::Vapor);
        assert_relative_eq!(
            cp.convert_into(JOULE / MOL / KELVIN),
            2.5 * RGAS,
            max_relative = 1e-10
        );
    }

    #[test]
    fn invalid_records() {
        let mut s = nitrogen();
        assert!(s.validate().is_ok());
        s.gas_cp = [0.0; 4];
        s.atom_count = 0;
        assert!(matches!(s.validate(), Err(FlashError::InvalidSpecies(_))));

        let mut s = pentane();
        assert!(s.validate().is_ok());
        s.pc = 0.0;
        assert!(matches!(s.validate(), Err(FlashError::InvalidSpecies(_))));

        let mut s = pentane();
        s.antoine = [0.0; 3];
        assert!(matches!(s.validate(), Err(FlashError::InvalidSpecies(_))));
        // only condensable species need a vapor pressure
        s.condensable = false;
        assert!(s.validate().is_ok());
    }
}
