//! Single-stage vapor-liquid equilibrium flash calculations.
//!
//! A [FlashTank] holds a feed [Stream], the two outlet streams and the
//! operating conditions. Depending on which temperature is known, the tank
//! is solved as an isothermal flash, an adiabatic flash with known feed
//! temperature or an adiabatic flash with known flash temperature. K-values
//! are supplied by one of the models in [VleModel].
//!
//! ```no_run
//! # use vle_flash::*;
//! # use quantity::{KELVIN, PASCAL};
//! # fn main() -> FlashResult<()> {
//! let species = Species::from_json(&["n-pentane", "n-hexane"], "species.json")?;
//! let feed = Stream::from_total_molar_flow(
//!     species,
//!     Phase::Liquid,
//!     1.0,
//!     &[0.5, 0.5],
//!     328.15 * KELVIN,
//!     101325.0 * PASCAL,
//! )?;
//! let tank = FlashTank::new(feed, 328.15 * KELVIN, 101325.0 * PASCAL);
//! let solved = tank.isothermal_flash(VleModel::PengRobinson, SolverOptions::default())?;
//! println!("{solved}");
//! # Ok(())
//! # }
//! ```
#![warn(clippy::all)]
#![allow(clippy::many_single_char_names)]

/// Print messages with level `Verbosity::Iter` or higher.
#[macro_export]
macro_rules! log_iter {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::Verbosity::Iter {
            println!($($arg)*);
        }
    }
}

/// Print messages with level `Verbosity::Result` or higher.
#[macro_export]
macro_rules! log_result {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::Verbosity::Result {
            println!($($arg)*);
        }
    }
}

mod errors;
mod flash_tank;
mod models;
pub mod numerics;
mod phase_equilibria;
mod species;
mod stream;
pub use errors::{FlashError, FlashResult, Infeasibility};
pub use flash_tank::FlashTank;
pub use models::{PengRobinson, VleModel, NON_CONDENSABLE_K};
pub use phase_equilibria::{rachford_rice, FlashSpecification};
pub use species::Species;
pub use stream::{Phase, Stream};

/// Level of detail in the iteration output.
#[derive(Copy, Clone, Debug, PartialOrd, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Do not print output.
    #[default]
    None,
    /// Print information about the success or failure of the iteration.
    Result,
    /// Print a detailed output for every iteration.
    Iter,
}

/// Options for the iterative solvers.
///
/// If the values are [None], solver specific default
/// values are used.
#[derive(Copy, Clone, Debug, Default)]
pub struct SolverOptions {
    /// Maximum number of iterations.
    pub max_iter: Option<usize>,
    /// Tolerance.
    pub tol: Option<f64>,
    /// Iteration output indicated by the [Verbosity] enum.
    pub verbosity: Verbosity,
    /// Report exhausting the iteration limit as [FlashError::NotConverged]
    /// instead of returning the last estimate.
    pub strict: bool,
}

impl From<(Option<usize>, Option<f64>, Option<Verbosity>)> for SolverOptions {
    fn from(options: (Option<usize>, Option<f64>, Option<Verbosity>)) -> Self {
        Self {
            max_iter: options.0,
            tol: options.1,
            verbosity: options.2.unwrap_or(Verbosity::None),
            strict: false,
        }
    }
}

impl SolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = Some(max_iter);
        self
    }

    pub fn tol(mut self, tol: f64) -> Self {
        self.tol = Some(tol);
        self
    }

    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn unwrap_or(self, max_iter: usize, tol: f64) -> (usize, f64, Verbosity) {
        (
            self.max_iter.unwrap_or(max_iter),
            self.tol.unwrap_or(tol),
            self.verbosity,
        )
    }
}
