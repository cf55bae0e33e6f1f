use crate::species::Species;
use crate::stream::{Phase, Stream};
use nalgebra::DVector;
use quantity::{Pressure, Temperature, KELVIN, PASCAL};
use std::fmt;

/// A single-stage flash separator.
///
/// The tank splits the feed into a vapor and a liquid outlet at the flash
/// temperature and pressure. All three streams share the species of the feed.
/// Solving a tank never mutates it: the solvers return a solved copy.
#[derive(Clone, Debug)]
pub struct FlashTank {
    pub(crate) feed: Stream,
    pub(crate) vapor: Stream,
    pub(crate) liquid: Stream,
    pub(crate) temperature: f64,
    pub(crate) pressure: f64,
    pub(crate) heat_duty: f64,
    pub(crate) converged: bool,
}

impl FlashTank {
    /// Create a tank operating at the given flash temperature and pressure.
    ///
    /// If the flash temperature is the unknown of the calculation, the given
    /// value is only used as a placeholder.
    pub fn new(feed: Stream, temperature: Temperature, pressure: Pressure) -> Self {
        let temperature = temperature.convert_into(KELVIN);
        let pressure = pressure.convert_into(PASCAL);
        let (vapor, liquid) = Self::empty_outlets(&feed, temperature, pressure);
        Self {
            feed,
            vapor,
            liquid,
            temperature,
            pressure,
            heat_duty: 0.0,
            converged: false,
        }
    }

    fn empty_outlets(feed: &Stream, temperature: f64, pressure: f64) -> (Stream, Stream) {
        let z = feed.molefracs().clone();
        let vapor = Stream::empty(feed.shared_species(), Phase::Vapor, z.clone(), temperature, pressure);
        let liquid = Stream::empty(feed.shared_species(), Phase::Liquid, z, temperature, pressure);
        (vapor, liquid)
    }

    /// Replace the outlets by streams without flow at the flash conditions.
    pub(crate) fn reset_outlets(&mut self) {
        let (vapor, liquid) = Self::empty_outlets(&self.feed, self.temperature, self.pressure);
        self.vapor = vapor;
        self.liquid = liquid;
        self.converged = false;
    }

    pub fn feed(&self) -> &Stream {
        &self.feed
    }

    pub fn vapor(&self) -> &Stream {
        &self.vapor
    }

    pub fn liquid(&self) -> &Stream {
        &self.liquid
    }

    pub fn species(&self) -> &[Species] {
        self.feed.species()
    }

    pub fn components(&self) -> usize {
        self.feed.components()
    }

    /// Flash temperature.
    pub fn temperature(&self) -> Temperature {
        self.temperature * KELVIN
    }

    pub fn pressure(&self) -> Pressure {
        self.pressure * PASCAL
    }

    /// Heat duty in J/s (W) required to keep the tank at the flash temperature.
    pub fn heat_duty(&self) -> f64 {
        self.heat_duty
    }

    /// Fraction of the feed leaving the tank as vapor.
    pub fn vapor_fraction(&self) -> f64 {
        self.vapor.total_molar_flow() / self.feed.total_molar_flow()
    }

    /// Whether every iteration of the last solve converged within its
    /// iteration limit.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Set the flash temperature of the tank and both outlets.
    pub(crate) fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
        self.vapor.set_temperature(temperature);
        self.liquid.set_temperature(temperature);
    }

    pub(crate) fn set_feed_temperature(&mut self, temperature: f64) {
        self.feed.set_temperature(temperature);
    }

    pub(crate) fn z(&self) -> &DVector<f64> {
        self.feed.molefracs()
    }

    /// Energy balance of the tank in J/s: enthalpy leaving minus enthalpy entering.
    pub(crate) fn energy_balance(&self) -> f64 {
        self.vapor.total_enthalpy() + self.liquid.total_enthalpy() - self.feed.total_enthalpy()
    }
}

impl fmt::Display for FlashTank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "T = {:.5} K, p = {:.5} Pa, Q = {:.5} W, V/F = {:.5}",
            self.temperature,
            self.pressure,
            self.heat_duty,
            self.vapor_fraction()
        )?;
        writeln!(f, "feed: {}", self.feed)?;
        writeln!(f, "vapor: {}", self.vapor)?;
        write!(f, "liquid: {}", self.liquid)
    }
}
