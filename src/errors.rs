use std::fmt;
use std::io;
use thiserror::Error;

/// Side of the two-phase region on which an infeasible operating point lies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Infeasibility {
    /// The operating pressure is above the bubble pressure: the feed stays liquid.
    AboveBubblePressure,
    /// The operating pressure is below the dew pressure: the feed stays vapor.
    BelowDewPressure,
}

impl fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AboveBubblePressure => write!(f, "above the bubble pressure"),
            Self::BelowDewPressure => write!(f, "below the dew pressure"),
        }
    }
}

/// Error type for infeasible flash problems, improperly defined inputs and
/// convergence problems.
#[derive(Error, Debug)]
pub enum FlashError {
    // physical infeasibility
    #[error("System is not flashable: the operating pressure is {0}.")]
    NotFlashable(Infeasibility),
    #[error("No bracket found: {0}.")]
    NoBracketFound(String),
    #[error("The cubic equation of state has fewer than three real roots.")]
    DegenerateEosRoot,

    // errors related to algorithms
    #[error("`{0}` did not converge within the maximum number of iterations.")]
    NotConverged(String),

    // errors related to malformed input
    #[error("Expected {0} components while the input specifies {1} components.")]
    IncompatibleComponents(usize, usize),
    #[error("Invalid composition: {0}")]
    InvalidComposition(String),
    #[error("Invalid species record: {0}")]
    InvalidSpecies(String),

    // errors related to file handling
    #[error(transparent)]
    FileIO(#[from] io::Error),

    // json errors
    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    #[error("The following component(s) were not found: {0}")]
    ComponentsNotFound(String),
}

impl FlashError {
    /// Whether the error denotes a physically infeasible operating point
    /// (as opposed to malformed input or numerical failure).
    pub fn is_infeasible(&self) -> bool {
        matches!(
            self,
            Self::NotFlashable(_) | Self::NoBracketFound(_) | Self::DegenerateEosRoot
        )
    }
}

/// Convenience type for `Result<T, FlashError>`.
pub type FlashResult<T> = Result<T, FlashError>;
